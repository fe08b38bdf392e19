// SPDX-License-Identifier: MIT

//! Root-layout classification and relocation
//!
//! Classifies every entry directly under the repository root against the
//! declared folder rules, then moves misplaced entries into their
//! destination folders. Planning is pure; only `relocate` touches the
//! filesystem.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

use crate::config::StructureConfig;
use crate::Result;

/// Root entries never considered for relocation
const ALWAYS_SKIP: [&str; 2] = [".git", ".hg"];

/// Where a single root entry should go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Entry matched a rule whose folder equals its own name, or it is
    /// the catch-all folder itself
    AlreadyPlaced,
    /// Entry matched a rule and belongs in `folder`
    Move { folder: String },
    /// No rule matched; entry goes to the catch-all folder
    Fallback { folder: String },
}

/// Planned placement for one root entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub name: String,
    pub decision: Decision,
}

impl Placement {
    /// Destination folder if this placement requires a move
    pub fn destination(&self) -> Option<&str> {
        match &self.decision {
            Decision::AlreadyPlaced => None,
            Decision::Move { folder } | Decision::Fallback { folder } => Some(folder),
        }
    }
}

/// List classifiable entries under `root`, sorted lexicographically so a
/// run's order (and its log output) is reproducible regardless of how the
/// platform orders directory listings.
pub fn list_root_entries(
    root: &Path,
    config: &StructureConfig,
    config_file_name: &str,
) -> Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();

        if name == config_file_name
            || ALWAYS_SKIP.contains(&name.as_str())
            || config.skip.iter().any(|s| s == &name)
        {
            debug!("Skipping root entry: {}", name);
            continue;
        }

        names.push(name);
    }

    names.sort();
    Ok(names)
}

/// Classify root entries against the declared rules. First matching folder
/// wins (folders in declaration order, patterns in declared order within
/// each folder).
pub fn classify(entries: &[String], config: &StructureConfig) -> Vec<Placement> {
    entries
        .iter()
        .map(|name| Placement {
            name: name.clone(),
            decision: classify_one(name, config),
        })
        .collect()
}

fn classify_one(name: &str, config: &StructureConfig) -> Decision {
    for rule in &config.rules {
        for pattern in &rule.patterns {
            if name == pattern || name.starts_with(pattern.trim_end_matches('/')) {
                if rule.folder == name {
                    return Decision::AlreadyPlaced;
                }
                return Decision::Move {
                    folder: rule.folder.clone(),
                };
            }
        }
    }

    if name == config.default_folder {
        return Decision::AlreadyPlaced;
    }

    Decision::Fallback {
        folder: config.default_folder.clone(),
    }
}

/// Apply a classification plan: create destination folders as needed and
/// move each misplaced entry, preserving its base name. Fails fast if the
/// destination already holds an entry with the same name; half-moved roots
/// are worse than an aborted run.
///
/// Returns the number of entries moved.
pub fn relocate(root: &Path, placements: &[Placement]) -> Result<usize> {
    let mut moved = 0;

    for placement in placements {
        let folder = match placement.destination() {
            Some(f) => f,
            None => {
                debug!("Already placed: {}", placement.name);
                continue;
            }
        };

        let src = root.join(&placement.name);
        let dest_dir = root.join(folder);
        let dest = dest_dir.join(&placement.name);

        if dest.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!(
                    "Destination {:?} already exists; refusing to overwrite",
                    dest
                ),
            )
            .into());
        }

        fs::create_dir_all(&dest_dir)?;
        fs::rename(&src, &dest)?;
        info!("Moved {} -> {}/{}", placement.name, folder, placement.name);
        moved += 1;
    }

    Ok(moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StructureRule;

    fn config(rules: &[(&str, &[&str])]) -> StructureConfig {
        StructureConfig {
            rules: rules
                .iter()
                .map(|(folder, patterns)| StructureRule {
                    folder: folder.to_string(),
                    patterns: patterns.iter().map(|p| p.to_string()).collect(),
                })
                .collect(),
            default_folder: "misc".to_string(),
            skip: Vec::new(),
        }
    }

    #[test]
    fn first_matching_folder_wins() {
        let config = config(&[("a", &["x"]), ("b", &["x"])]);
        let placements = classify(&["x".to_string()], &config);
        assert_eq!(
            placements[0].decision,
            Decision::Move {
                folder: "a".to_string()
            }
        );
    }

    #[test]
    fn prefix_match_strips_trailing_separator() {
        let config = config(&[("cursor-rules", &[".cursorrules", ".cursor/"])]);
        let placements = classify(&[".cursor".to_string(), ".cursorrules".to_string()], &config);
        for p in placements {
            assert_eq!(
                p.decision,
                Decision::Move {
                    folder: "cursor-rules".to_string()
                }
            );
        }
    }

    #[test]
    fn entry_matching_its_own_folder_stays() {
        let config = config(&[("docs", &["docs/", "README.md"])]);
        let placements = classify(&["docs".to_string(), "README.md".to_string()], &config);
        assert_eq!(placements[0].decision, Decision::AlreadyPlaced);
        assert_eq!(
            placements[1].decision,
            Decision::Move {
                folder: "docs".to_string()
            }
        );
    }

    #[test]
    fn unmatched_entry_falls_back_to_catch_all() {
        let config = config(&[("docs", &["README.md"])]);
        let placements = classify(&["notes.txt".to_string()], &config);
        assert_eq!(
            placements[0].decision,
            Decision::Fallback {
                folder: "misc".to_string()
            }
        );
    }

    #[test]
    fn catch_all_folder_never_moves_into_itself() {
        let config = config(&[("docs", &["README.md"])]);
        let placements = classify(&["misc".to_string()], &config);
        assert_eq!(placements[0].decision, Decision::AlreadyPlaced);
    }

    #[test]
    fn relocate_moves_files_and_creates_folders() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "hi").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "scratch").unwrap();

        let config = config(&[("docs", &["README.md"])]);
        let entries = list_root_entries(dir.path(), &config, "repowarden.json").unwrap();
        let placements = classify(&entries, &config);
        let moved = relocate(dir.path(), &placements).unwrap();

        assert_eq!(moved, 2);
        assert!(dir.path().join("docs/README.md").is_file());
        assert!(dir.path().join("misc/notes.txt").is_file());
        assert!(!dir.path().join("README.md").exists());
    }

    #[test]
    fn relocate_moves_whole_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("components")).unwrap();
        std::fs::write(dir.path().join("components/Button.tsx"), "x").unwrap();

        let config = config(&[("frontend", &["components"])]);
        let entries = list_root_entries(dir.path(), &config, "repowarden.json").unwrap();
        let placements = classify(&entries, &config);
        relocate(dir.path(), &placements).unwrap();

        assert!(dir.path().join("frontend/components/Button.tsx").is_file());
    }

    #[test]
    fn relocate_fails_fast_on_destination_collision() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "new").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/README.md"), "old").unwrap();

        let config = config(&[("docs", &["docs/", "README.md"])]);
        let entries = list_root_entries(dir.path(), &config, "repowarden.json").unwrap();
        let placements = classify(&entries, &config);
        let err = relocate(dir.path(), &placements).unwrap_err();

        assert!(matches!(err, crate::RepowardenError::FileSystem(_)));
        // Nothing overwritten
        assert_eq!(
            std::fs::read_to_string(dir.path().join("docs/README.md")).unwrap(),
            "old"
        );
    }

    #[test]
    fn second_run_produces_no_moves() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "hi").unwrap();
        std::fs::create_dir(dir.path().join("components")).unwrap();

        let config = config(&[
            ("docs", &["docs/", "README.md"]),
            ("frontend", &["frontend/", "components"]),
        ]);

        let entries = list_root_entries(dir.path(), &config, "repowarden.json").unwrap();
        let moved = relocate(dir.path(), &classify(&entries, &config)).unwrap();
        assert_eq!(moved, 2);

        let entries = list_root_entries(dir.path(), &config, "repowarden.json").unwrap();
        let moved = relocate(dir.path(), &classify(&entries, &config)).unwrap();
        assert_eq!(moved, 0);
    }

    #[test]
    fn default_config_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "hi").unwrap();
        std::fs::create_dir(dir.path().join("components")).unwrap();

        let structure = crate::config::AppConfig::default().structure;

        let entries = list_root_entries(dir.path(), &structure, "repowarden.json").unwrap();
        let moved = relocate(dir.path(), &classify(&entries, &structure)).unwrap();
        assert_eq!(moved, 2);
        assert!(dir.path().join("docs/README.md").is_file());
        assert!(dir.path().join("frontend/components").is_dir());

        // Folders the first run created must classify as already placed
        let entries = list_root_entries(dir.path(), &structure, "repowarden.json").unwrap();
        let moved = relocate(dir.path(), &classify(&entries, &structure)).unwrap();
        assert_eq!(moved, 0);
    }

    #[test]
    fn config_file_and_git_metadata_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("repowarden.json"), "{}").unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join("kept.txt"), "x").unwrap();

        let mut config = config(&[]);
        config.skip.push("kept.txt".to_string());

        let entries = list_root_entries(dir.path(), &config, "repowarden.json").unwrap();
        assert!(entries.is_empty());
    }
}
