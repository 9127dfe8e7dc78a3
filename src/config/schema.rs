use serde::Deserialize;
use std::collections::BTreeMap;

/// TOML-deserializable config file. All fields are Option for layered merging.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub defaults: DefaultsFileConfig,
    #[serde(default)]
    pub targeting: TargetingFileConfig,
    /// `[rules.<RuleName>]` tables. Values stay untyped here; each rule
    /// validates its own properties when instantiated.
    #[serde(default)]
    pub rules: BTreeMap<String, toml::Table>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefaultsFileConfig {
    pub lang: Option<String>,
    pub format: Option<String>,
    pub quiet: Option<bool>,
    pub rulesets: Option<String>,
    pub min_priority: Option<u8>,
    pub aggregation: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TargetingFileConfig {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl FileConfig {
    /// Load from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
