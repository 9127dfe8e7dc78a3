use crate::config::ResolvedConfig;
use std::io::Write;

/// Render `config show` output.
pub fn render_show<W: Write>(w: &mut W, config: &ResolvedConfig) -> std::io::Result<()> {
    if config.loaded_files.is_empty() {
        writeln!(w, "Loaded config files: (none)")?;
    } else {
        writeln!(w, "Loaded config files:")?;
        for (i, path) in config.loaded_files.iter().enumerate() {
            writeln!(w, "  {}. {}", i + 1, path.display())?;
        }
    }
    writeln!(w)?;

    writeln!(w, "Resolved settings:")?;
    for (key, source) in config.provenance.sorted_entries() {
        let value = value_for_key(config, key);
        writeln!(w, "  {key}: {value} <- {source}")?;
    }

    if !config.ignore_patterns.is_empty() {
        writeln!(w)?;
        writeln!(w, "Ignored paths: {}", config.ignore_patterns.join(", "))?;
    }

    Ok(())
}

/// Render `config explain <Rule>` output: the properties configured for one
/// rule and where each came from.
pub fn render_explain<W: Write>(
    w: &mut W,
    config: &ResolvedConfig,
    rule: &str,
) -> std::io::Result<()> {
    let entries = config.provenance.rule_entries(rule);

    writeln!(w, "Rule: {rule}")?;
    writeln!(w)?;
    if entries.is_empty() {
        writeln!(w, "  (no configured properties; built-in defaults apply)")?;
        return Ok(());
    }
    for (key, source) in &entries {
        let value = value_for_key(config, key);
        write!(w, "  {key}: {value} <- {source}")?;
        let shadowed = config.provenance.shadowed(key);
        if !shadowed.is_empty() {
            let layers: Vec<String> = shadowed.iter().map(|s| s.to_string()).collect();
            write!(w, " (overrides {})", layers.join(", "))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn list_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

fn value_for_key(config: &ResolvedConfig, key: &str) -> String {
    match key {
        "defaults.lang" => config
            .lang
            .map_or("(auto-detect)".to_string(), |l| l.to_string()),
        "defaults.format" => config.format.clone(),
        "defaults.quiet" => config.quiet.to_string(),
        "defaults.rulesets" => config.rulesets.clone(),
        "defaults.min_priority" => config.min_priority.to_string(),
        "defaults.aggregation" => config.aggregation.to_string(),
        "targeting.include" => list_or(&config.include, "(all files)"),
        "targeting.exclude" => list_or(&config.exclude, "(none)"),
        _ => key
            .strip_prefix("rules.")
            .and_then(|rest| rest.split_once('.'))
            .and_then(|(rule, property)| config.rule_properties.get(rule)?.get(property))
            .map_or("(unknown)".to_string(), |v| v.to_string()),
    }
}
