use crate::config::ignore::load_ignore_file;
use crate::config::provenance::{ProvenanceMap, Source};
use crate::config::schema::FileConfig;
use crate::config::ResolvedConfig;
use crate::errors::{Result, TallyError};
use crate::metrics::ResultOption;
use crate::output::OutputFormat;
use crate::rules::ruleset::RuleProperties;
use crate::rules::{Priority, PropertyValue};
use crate::walk::Language;
use std::path::{Path, PathBuf};

pub const PROJECT_CONFIG: &str = ".tally.toml";

pub const ENV_RULESETS: &str = "TALLY_RULESETS";
pub const ENV_FORMAT: &str = "TALLY_FORMAT";
pub const ENV_MIN_PRIORITY: &str = "TALLY_MIN_PRIORITY";

/// CLI overrides extracted from command arguments.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub lang: Option<Language>,
    pub format: Option<OutputFormat>,
    pub quiet: bool,
    pub rulesets: Option<String>,
    pub min_priority: Option<Priority>,
    pub aggregation: Option<ResultOption>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Resolve configuration by applying layers bottom-up:
/// 1. Built-in defaults
/// 2. User config (~/.config/tally/config.toml)
/// 3. Project config (nearest .tally.toml walking up from working_dir)
/// 4. Environment variables
/// 5. CLI overrides
pub fn resolve_config(working_dir: &Path, cli: &CliOverrides) -> Result<ResolvedConfig> {
    resolve_with(working_dir, cli, find_user_config(), |key| {
        std::env::var(key).ok()
    })
}

/// Layering with the user config location and environment injected.
fn resolve_with(
    working_dir: &Path,
    cli: &CliOverrides,
    user_config: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let mut config = ResolvedConfig::default();
    let mut prov = ProvenanceMap::new();
    set_default_provenance(&mut prov);

    if let Some(path) = user_config.filter(|p| p.is_file()) {
        let file = load_file_config(&path, "user")?;
        apply_file_config(&mut config, &file, Source::UserConfig(path.clone()), &mut prov)?;
        config.loaded_files.push(path);
    }

    if let Some(path) = find_project_config(working_dir) {
        let file = load_file_config(&path, "project")?;
        apply_file_config(&mut config, &file, Source::ProjectConfig(path.clone()), &mut prov)?;
        config.loaded_files.push(path);
    }

    apply_env_vars(&mut config, &mut prov, env)?;
    apply_cli_overrides(&mut config, cli, &mut prov);

    if let Some(ignore) = load_ignore_file(working_dir) {
        config.ignore_patterns = ignore.patterns;
        config.loaded_files.push(ignore.path);
    }

    config.provenance = prov;
    Ok(config)
}

fn find_user_config() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tally").join("config.toml"))
}

fn find_project_config(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(PROJECT_CONFIG);
        if config_path.is_file() {
            return Some(config_path);
        }
        if !dir.pop() {
            return None;
        }
    }
}

fn load_file_config(path: &Path, layer: &str) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        TallyError::Config(format!(
            "Could not read {layer} config {}: {e}",
            path.display()
        ))
    })?;
    FileConfig::from_toml(&content).map_err(|e| {
        TallyError::Config(format!("Invalid {layer} config {}: {e}", path.display()))
    })
}

fn set_default_provenance(prov: &mut ProvenanceMap) {
    let defaults = [
        "defaults.lang",
        "defaults.format",
        "defaults.quiet",
        "defaults.rulesets",
        "defaults.min_priority",
        "defaults.aggregation",
        "targeting.include",
        "targeting.exclude",
    ];
    for key in defaults {
        prov.set(key, Source::Default);
    }
}

fn parse_priority(raw: &str, origin: &str) -> Result<Priority> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .and_then(Priority::from_level)
        .ok_or_else(|| {
            TallyError::Config(format!(
                "{origin}: minimum priority must be 1..5, got '{raw}'"
            ))
        })
}

fn apply_file_config(
    config: &mut ResolvedConfig,
    file: &FileConfig,
    source: Source,
    prov: &mut ProvenanceMap,
) -> Result<()> {
    let defaults = &file.defaults;
    if let Some(ref lang) = defaults.lang {
        let lang = lang.parse::<Language>().map_err(TallyError::Config)?;
        config.lang = Some(lang);
        prov.set("defaults.lang", source.clone());
    }
    if let Some(ref format) = defaults.format {
        config.format = format.clone();
        prov.set("defaults.format", source.clone());
    }
    if let Some(quiet) = defaults.quiet {
        config.quiet = quiet;
        prov.set("defaults.quiet", source.clone());
    }
    if let Some(ref rulesets) = defaults.rulesets {
        config.rulesets = rulesets.clone();
        prov.set("defaults.rulesets", source.clone());
    }
    if let Some(level) = defaults.min_priority {
        config.min_priority = parse_priority(&level.to_string(), &source.to_string())?;
        prov.set("defaults.min_priority", source.clone());
    }
    if let Some(ref aggregation) = defaults.aggregation {
        config.aggregation = ResultOption::parse(aggregation);
        prov.set("defaults.aggregation", source.clone());
    }

    if !file.targeting.include.is_empty() {
        config.include = file.targeting.include.clone();
        prov.set("targeting.include", source.clone());
    }
    if !file.targeting.exclude.is_empty() {
        config.exclude = file.targeting.exclude.clone();
        prov.set("targeting.exclude", source.clone());
    }

    // Rule tables merge key by key across layers.
    for (rule, table) in &file.rules {
        let properties = config.rule_properties.entry(rule.clone()).or_default();
        for (name, value) in table {
            let value = property_value(value).ok_or_else(|| {
                TallyError::Config(format!(
                    "{source}: rules.{rule}.{name} must be a number, boolean, string or list of strings"
                ))
            })?;
            properties.insert(name.clone(), value);
            prov.set(format!("rules.{rule}.{name}"), source.clone());
        }
    }
    Ok(())
}

/// Convert a TOML value into a rule property value.
pub fn property_value(value: &toml::Value) -> Option<PropertyValue> {
    match value {
        toml::Value::Integer(n) => Some(PropertyValue::Number(*n as f64)),
        toml::Value::Float(n) => Some(PropertyValue::Number(*n)),
        toml::Value::Boolean(b) => Some(PropertyValue::Flag(*b)),
        toml::Value::String(s) => Some(PropertyValue::Text(s.clone())),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(PropertyValue::List),
        _ => None,
    }
}

fn apply_env_vars(
    config: &mut ResolvedConfig,
    prov: &mut ProvenanceMap,
    env: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(val) = env(ENV_RULESETS) {
        config.rulesets = val;
        prov.set("defaults.rulesets", Source::EnvVar(ENV_RULESETS.into()));
    }
    if let Some(val) = env(ENV_FORMAT) {
        config.format = val;
        prov.set("defaults.format", Source::EnvVar(ENV_FORMAT.into()));
    }
    if let Some(val) = env(ENV_MIN_PRIORITY) {
        config.min_priority = parse_priority(&val, ENV_MIN_PRIORITY)?;
        prov.set(
            "defaults.min_priority",
            Source::EnvVar(ENV_MIN_PRIORITY.into()),
        );
    }
    Ok(())
}

fn apply_cli_overrides(config: &mut ResolvedConfig, cli: &CliOverrides, prov: &mut ProvenanceMap) {
    if let Some(lang) = cli.lang {
        config.lang = Some(lang);
        prov.set("defaults.lang", Source::CliFlag("--lang".into()));
    }
    if let Some(format) = cli.format {
        config.format = format.to_string();
        prov.set("defaults.format", Source::CliFlag("--format".into()));
    }
    if cli.quiet {
        config.quiet = true;
        prov.set("defaults.quiet", Source::CliFlag("--quiet".into()));
    }
    if let Some(ref rulesets) = cli.rulesets {
        config.rulesets = rulesets.clone();
        prov.set("defaults.rulesets", Source::CliFlag("--rulesets".into()));
    }
    if let Some(priority) = cli.min_priority {
        config.min_priority = priority;
        prov.set("defaults.min_priority", Source::CliFlag("--min-priority".into()));
    }
    if let Some(aggregation) = cli.aggregation {
        config.aggregation = aggregation;
        prov.set("defaults.aggregation", Source::CliFlag("--aggregation".into()));
    }
    if !cli.include.is_empty() {
        config.include = cli.include.clone();
        prov.set("targeting.include", Source::CliFlag("--include".into()));
    }
    if !cli.exclude.is_empty() {
        config.exclude = cli.exclude.clone();
        prov.set("targeting.exclude", Source::CliFlag("--exclude".into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn resolve(dir: &Path, cli: &CliOverrides, env: &[(&str, &str)]) -> Result<ResolvedConfig> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        resolve_with(dir, cli, None, |key| env.get(key).cloned())
    }

    fn project(content: &str) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(PROJECT_CONFIG), content).unwrap();
        tmp
    }

    #[test]
    fn defaults_only() {
        let tmp = tempfile::tempdir().unwrap();
        let config = resolve(tmp.path(), &CliOverrides::default(), &[]).unwrap();

        assert_eq!(config.format, "text");
        assert_eq!(config.rulesets, "all");
        assert_eq!(config.min_priority, Priority::Low);
        assert_eq!(config.aggregation, ResultOption::Sum);
        assert!(config.rule_properties.is_empty());
        assert_eq!(
            config.provenance.get("defaults.rulesets"),
            Some(&Source::Default)
        );
    }

    #[test]
    fn project_config_applied() {
        let tmp = project(
            r#"
[defaults]
format = "json"
rulesets = "design"
min_priority = 2
aggregation = "average"

[rules.ExcessiveImports]
minimum = 12
enabled = true
"#,
        );
        let config = resolve(tmp.path(), &CliOverrides::default(), &[]).unwrap();

        assert_eq!(config.format, "json");
        assert_eq!(config.rulesets, "design");
        assert_eq!(config.min_priority, Priority::MediumHigh);
        assert_eq!(config.aggregation, ResultOption::Average);
        let imports = &config.rule_properties["ExcessiveImports"];
        assert_eq!(imports["minimum"], PropertyValue::Number(12.0));
        assert_eq!(imports["enabled"], PropertyValue::Flag(true));
        assert_eq!(config.loaded_files, vec![tmp.path().join(PROJECT_CONFIG)]);
        assert!(matches!(
            config.provenance.get("rules.ExcessiveImports.minimum"),
            Some(Source::ProjectConfig(_))
        ));
    }

    #[test]
    fn env_overrides_project_and_cli_overrides_env() {
        let tmp = project("[defaults]\nrulesets = \"design\"\nformat = \"json\"\n");
        let cli = CliOverrides {
            format: Some(OutputFormat::Sarif),
            ..Default::default()
        };
        let config = resolve(
            tmp.path(),
            &cli,
            &[
                (ENV_RULESETS, "metrics"),
                (ENV_FORMAT, "text"),
                (ENV_MIN_PRIORITY, "3"),
            ],
        )
        .unwrap();

        assert_eq!(config.rulesets, "metrics");
        assert_eq!(config.min_priority, Priority::Medium);
        assert_eq!(config.format, "sarif");
        assert!(matches!(
            config.provenance.get("defaults.rulesets"),
            Some(Source::EnvVar(_))
        ));
        assert!(matches!(
            config.provenance.get("defaults.format"),
            Some(Source::CliFlag(_))
        ));
    }

    #[test]
    fn invalid_priority_is_a_configuration_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = resolve(tmp.path(), &CliOverrides::default(), &[(ENV_MIN_PRIORITY, "9")])
            .unwrap_err();
        assert!(err.is_configuration());

        let tmp = project("[defaults]\nmin_priority = 0\n");
        assert!(resolve(tmp.path(), &CliOverrides::default(), &[]).is_err());
    }

    #[test]
    fn malformed_project_config_is_reported() {
        let tmp = project("[defaults\nformat = ");
        let err = resolve(tmp.path(), &CliOverrides::default(), &[]).unwrap_err();
        assert!(err.to_string().contains("Invalid project config"));
    }

    #[test]
    fn user_and_project_rule_tables_merge() {
        let user_dir = tempfile::tempdir().unwrap();
        let user = user_dir.path().join("config.toml");
        std::fs::write(
            &user,
            "[rules.NcssCount]\nminimum = 40\nclass_minimum = 900\n",
        )
        .unwrap();
        let tmp = project("[rules.NcssCount]\nminimum = 80\n");

        let config = resolve_with(tmp.path(), &CliOverrides::default(), Some(user), |_| None)
            .unwrap();
        let ncss = &config.rule_properties["NcssCount"];
        assert_eq!(ncss["minimum"], PropertyValue::Number(80.0));
        assert_eq!(ncss["class_minimum"], PropertyValue::Number(900.0));
        assert_eq!(config.loaded_files.len(), 2);
    }

    #[test]
    fn tallyignore_patterns_are_loaded() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(".tallyignore"), "gen/\n").unwrap();
        let config = resolve(tmp.path(), &CliOverrides::default(), &[]).unwrap();
        assert_eq!(config.ignore_patterns, vec!["gen/**"]);
        assert!(config.all_excludes().contains(&"gen/**".to_string()));
    }

    #[test]
    fn property_values_from_toml() {
        assert_eq!(
            property_value(&toml::Value::Integer(3)),
            Some(PropertyValue::Number(3.0))
        );
        assert_eq!(
            property_value(&toml::Value::Array(vec![toml::Value::String("a".into())])),
            Some(PropertyValue::List(vec!["a".into()]))
        );
        assert_eq!(
            property_value(&toml::Value::Array(vec![toml::Value::Integer(1)])),
            None
        );
    }
}
