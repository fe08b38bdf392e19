// SPDX-License-Identifier: MIT

//! Configuration management for Repowarden

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Target root layout for `enforce`
    pub structure: StructureConfig,

    /// Watcher settings
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Declared target layout: destination folder -> name patterns
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StructureConfig {
    /// Rules in declaration order. First matching folder wins, then
    /// first matching pattern within that folder.
    #[serde(with = "rule_map")]
    pub rules: Vec<StructureRule>,

    /// Catch-all folder for entries no rule matches
    #[serde(default = "default_catch_all")]
    pub default_folder: String,

    /// Extra root entries to leave untouched (the config file itself
    /// and version-control metadata are always skipped)
    #[serde(default)]
    pub skip: Vec<String>,
}

/// One destination folder and its ordered pattern list
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct StructureRule {
    pub folder: String,
    pub patterns: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WatchConfig {
    /// Base branch pull requests target
    #[serde(default = "default_base_branch")]
    pub base_branch: String,

    /// Remote name branches are pushed to
    #[serde(default = "default_remote")]
    pub remote: String,
}

// Default value functions
fn default_catch_all() -> String { "misc".to_string() }
fn default_base_branch() -> String { "main".to_string() }
fn default_remote() -> String { "origin".to_string() }

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            base_branch: default_base_branch(),
            remote: default_remote(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        // Each destination folder names itself first so a second run
        // classifies the folders a first run created as already placed
        // instead of sweeping them into the catch-all.
        let rules = [
            ("frontend", vec!["frontend/", "components", "pages", "storybook", "public"]),
            ("backend", vec!["backend/", "mcp", "auth", "payments", "storage", "monitoring", "scripts"]),
            ("config", vec!["config/", ".eslintrc.json", "tsconfig.json", "next.config.js", "tailwind.config.js"]),
            ("docs", vec!["docs/", "README.md", "CHANGELOG.md", "COMMIT_SUMMARY.md"]),
            ("cursor-rules", vec!["cursor-rules/", ".cursorrules", ".cursor/"]),
            (".github", vec![".github/"]),
        ]
        .into_iter()
        .map(|(folder, patterns)| StructureRule {
            folder: folder.to_string(),
            patterns: patterns.into_iter().map(String::from).collect(),
        })
        .collect();

        Self {
            structure: StructureConfig {
                rules,
                default_folder: default_catch_all(),
                skip: Vec::new(),
            },
            watch: WatchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file. A missing file is a fatal
    /// configuration error; `enforce` must never run without a declared
    /// layout.
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Err(crate::RepowardenError::Config(format!(
                "Config file not found at {:?}",
                path
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| crate::RepowardenError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is
    /// absent. Used by the watcher, which only needs branch/remote names.
    pub fn load_or_default(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate structural invariants the type system can't express
    pub fn validate(&self) -> crate::Result<()> {
        let mut seen = std::collections::HashSet::new();
        for rule in &self.structure.rules {
            if rule.folder.is_empty() {
                return Err(crate::RepowardenError::Config(
                    "Empty destination folder name in rules".to_string(),
                ));
            }
            if !seen.insert(rule.folder.as_str()) {
                return Err(crate::RepowardenError::Config(format!(
                    "Duplicate destination folder '{}' in rules",
                    rule.folder
                )));
            }
            if rule.patterns.iter().any(|p| p.is_empty()) {
                return Err(crate::RepowardenError::Config(format!(
                    "Empty pattern under folder '{}'",
                    rule.folder
                )));
            }
        }
        if self.structure.default_folder.is_empty() {
            return Err(crate::RepowardenError::Config(
                "Empty default folder name".to_string(),
            ));
        }
        Ok(())
    }
}

/// (De)serialize the rules as a JSON object so the config file reads as
/// `{"folder": ["pattern", ...], ...}` while keeping declaration order.
mod rule_map {
    use super::StructureRule;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(rules: &[StructureRule], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(rules.len()))?;
        for rule in rules {
            map.serialize_entry(&rule.folder, &rule.patterns)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<StructureRule>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RuleMapVisitor;

        impl<'de> Visitor<'de> for RuleMapVisitor {
            type Value = Vec<StructureRule>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of destination folder to pattern list")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut rules = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((folder, patterns)) = access.next_entry::<String, Vec<String>>()? {
                    rules.push(StructureRule { folder, patterns });
                }
                Ok(rules)
            }
        }

        deserializer.deserialize_map(RuleMapVisitor)
    }
}
