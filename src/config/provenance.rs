use std::collections::BTreeMap;
use std::path::PathBuf;

/// Where a configuration value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Default,
    UserConfig(PathBuf),
    ProjectConfig(PathBuf),
    EnvVar(String),
    CliFlag(String),
}

impl Source {
    /// Whether the value was set by any layer above the built-in defaults.
    pub fn is_explicit(&self) -> bool {
        !matches!(self, Source::Default)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Default => write!(f, "default"),
            Source::UserConfig(path) => write!(f, "user config ({})", path.display()),
            Source::ProjectConfig(path) => write!(f, "project config ({})", path.display()),
            Source::EnvVar(name) => write!(f, "env var ({})", name),
            Source::CliFlag(name) => write!(f, "CLI flag ({})", name),
        }
    }
}

/// Tracks the source of each configuration value by dotted key.
///
/// Every layer that sets a key is kept in application order, so a value can
/// be explained together with the layers it shadowed.
#[derive(Debug, Clone, Default)]
pub struct ProvenanceMap {
    entries: BTreeMap<String, Vec<Source>>,
}

impl ProvenanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `source` set `key`, on top of any earlier layer.
    pub fn set(&mut self, key: impl Into<String>, source: Source) {
        let layers = self.entries.entry(key.into()).or_default();
        if layers.last() != Some(&source) {
            layers.push(source);
        }
    }

    /// The layer whose value is in effect.
    pub fn get(&self, key: &str) -> Option<&Source> {
        self.entries.get(key).and_then(|layers| layers.last())
    }

    /// Explicit layers that set `key` before the effective one, most recent first.
    pub fn shadowed(&self, key: &str) -> Vec<&Source> {
        self.entries
            .get(key)
            .map(|layers| {
                layers
                    .iter()
                    .rev()
                    .skip(1)
                    .filter(|s| s.is_explicit())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Effective source of every key, sorted by key.
    pub fn sorted_entries(&self) -> Vec<(&str, &Source)> {
        self.entries_with_prefix("")
    }

    /// Provenance of the properties configured for one rule.
    pub fn rule_entries(&self, rule: &str) -> Vec<(&str, &Source)> {
        self.entries_with_prefix(&format!("rules.{rule}."))
    }

    pub fn entries_with_prefix(&self, prefix: &str) -> Vec<(&str, &Source)> {
        self.entries
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .filter_map(|(k, layers)| layers.last().map(|s| (k.as_str(), s)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut map = ProvenanceMap::new();
        map.set("defaults.format", Source::Default);
        map.set(
            "rules.ExcessiveImports.minimum",
            Source::ProjectConfig(PathBuf::from("/project/.tally.toml")),
        );

        assert_eq!(map.get("defaults.format"), Some(&Source::Default));
        assert_eq!(
            map.get("rules.ExcessiveImports.minimum"),
            Some(&Source::ProjectConfig(PathBuf::from("/project/.tally.toml")))
        );
        assert_eq!(map.get("nonexistent"), None);
    }

    #[test]
    fn sorted_entries_order() {
        let mut map = ProvenanceMap::new();
        map.set("rules.NcssCount.minimum", Source::Default);
        map.set("defaults.format", Source::Default);
        map.set("defaults.quiet", Source::Default);

        let entries = map.sorted_entries();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                "defaults.format",
                "defaults.quiet",
                "rules.NcssCount.minimum"
            ]
        );
    }

    #[test]
    fn entries_with_prefix() {
        let mut map = ProvenanceMap::new();
        map.set("rules.NcssCount.enabled", Source::Default);
        map.set("rules.NcssCount.minimum", Source::Default);
        map.set("rules.ExcessiveImports.minimum", Source::Default);
        map.set("defaults.format", Source::Default);

        let ncss = map.entries_with_prefix("rules.NcssCount.");
        assert_eq!(ncss.len(), 2);

        let rules = map.entries_with_prefix("rules.");
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn rule_entries_do_not_match_rule_name_prefixes() {
        let mut map = ProvenanceMap::new();
        map.set("rules.Ncss.minimum", Source::Default);
        map.set("rules.NcssCount.minimum", Source::EnvVar("X".into()));
        assert_eq!(map.rule_entries("Ncss").len(), 1);
        assert!(map.rule_entries("NcssCount")[0].1.is_explicit());
    }

    #[test]
    fn display_sources() {
        assert_eq!(format!("{}", Source::Default), "default");
        assert_eq!(
            format!(
                "{}",
                Source::ProjectConfig(PathBuf::from("/project/.tally.toml"))
            ),
            "project config (/project/.tally.toml)"
        );
        assert_eq!(
            format!("{}", Source::EnvVar("TALLY_FORMAT".to_string())),
            "env var (TALLY_FORMAT)"
        );
        assert_eq!(
            format!("{}", Source::CliFlag("--format".to_string())),
            "CLI flag (--format)"
        );
    }

    #[test]
    fn later_layers_shadow_earlier_ones() {
        let mut map = ProvenanceMap::new();
        let user = Source::UserConfig(PathBuf::from("/home/me/.config/tally/config.toml"));
        let project = Source::ProjectConfig(PathBuf::from("/project/.tally.toml"));
        map.set("rules.NcssCount.minimum", user.clone());
        map.set("rules.NcssCount.minimum", project.clone());
        map.set("defaults.format", Source::Default);
        map.set("defaults.format", Source::EnvVar("TALLY_FORMAT".into()));

        assert_eq!(map.get("rules.NcssCount.minimum"), Some(&project));
        assert_eq!(map.shadowed("rules.NcssCount.minimum"), vec![&user]);
        // Defaults are never reported as shadowed.
        assert!(map.shadowed("defaults.format").is_empty());
        assert!(map.shadowed("missing").is_empty());
    }
}
