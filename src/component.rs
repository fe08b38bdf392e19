// SPDX-License-Identifier: MIT

//! Component detection and the branch-per-component workflow
//!
//! A created file counts as a component when its extension is one of the
//! recognized front-end extensions and its path runs through a recognized
//! component directory. Each detected component gets its own branch,
//! commit, push, and (when a token is configured) pull request, then the
//! watcher returns to the branch it started on.

use std::path::Path;
use tracing::{error, info, warn};

use crate::git::VersionControl;
use crate::github::{PullRequestClient, PullRequestSpec, RepoSlug};
use crate::Result;

/// Recognized component file extensions (case-sensitive)
const COMPONENT_EXTENSIONS: [&str; 4] = ["tsx", "jsx", "vue", "svelte"];

/// Path substrings marking component directories (case-sensitive)
const COMPONENT_DIRECTORIES: [&str; 6] = [
    "components",
    "src/components",
    "frontend/src/components",
    "pages",
    "src/pages",
    "frontend/src/pages",
];

/// Conventional stem suffixes stripped when deriving a branch identifier,
/// checked in order, first match only
const STEM_SUFFIXES: [&str; 3] = [".component", ".page", ".view"];

/// Check whether a created path is a component file
pub fn is_component_file(path: &Path) -> bool {
    if path.is_dir() {
        return false;
    }

    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(e) => e,
        None => return false,
    };
    if !COMPONENT_EXTENSIONS.contains(&ext) {
        return false;
    }

    let path_str = path.to_string_lossy();
    COMPONENT_DIRECTORIES.iter().any(|d| path_str.contains(d))
}

/// Derive the component identifier: lower-cased file stem with one
/// conventional suffix stripped
pub fn component_identifier(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_lowercase();

    for suffix in &STEM_SUFFIXES {
        if let Some(stripped) = stem.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }

    stem
}

/// Generate a branch name absent from `existing` at call time. Collisions
/// get a `-1`, `-2`, ... counter appended to the base name.
pub fn generate_branch_name(path: &Path, existing: &[String]) -> String {
    let base = format!("feature/component-{}", component_identifier(path));

    if !existing.iter().any(|b| b == &base) {
        return base;
    }

    let mut counter = 1;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if !existing.iter().any(|b| b == &candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Drives one component file from detection to pull request.
///
/// Per-step failure policy: a failed branch creation aborts with nothing to
/// undo; a failed commit skips push and PR; push and PR failures are logged
/// and never fatal; the original branch is always restored last, best
/// effort. Partial work is never rolled back.
pub struct ComponentWorkflow<'a, V: VersionControl> {
    vcs: &'a V,
    pr_client: Option<&'a dyn PullRequestClient>,
    base_branch: String,
    remote: String,
}

impl<'a, V: VersionControl> ComponentWorkflow<'a, V> {
    pub fn new(
        vcs: &'a V,
        pr_client: Option<&'a dyn PullRequestClient>,
        base_branch: &str,
        remote: &str,
    ) -> Self {
        Self {
            vcs,
            pr_client,
            base_branch: base_branch.to_string(),
            remote: remote.to_string(),
        }
    }

    /// Handle one detected component file end to end
    pub async fn handle(&self, path: &Path) -> Result<()> {
        let original_branch = self.vcs.current_branch()?;
        let existing = self.vcs.branch_names()?;
        let branch = generate_branch_name(path, &existing);
        let identifier = component_identifier(path);

        if let Err(e) = self
            .vcs
            .create_branch(&branch)
            .and_then(|_| self.vcs.checkout(&branch))
        {
            // Still on the original branch, nothing to undo
            error!("Failed to create branch {}: {}", branch, e);
            return Ok(());
        }
        info!("Created and switched to branch: {}", branch);

        match self.commit_component(path, &identifier) {
            Ok(()) => {
                info!("Committed {:?} to branch {}", path, branch);

                match self.vcs.push(&self.remote, &branch) {
                    Ok(()) => info!("Pushed branch {} to {}", branch, self.remote),
                    Err(e) => warn!("Failed to push branch {}: {}", branch, e),
                }

                self.open_pull_request(path, &identifier, &branch).await;

                info!("Finished processing {:?} on branch {}", path, branch);
            }
            Err(e) => {
                // Branch exists locally with uncommitted work; accepted
                // partial-failure outcome, fall through to restoration
                error!("Failed to commit {:?}: {}", path, e);
            }
        }

        match self.vcs.checkout(&original_branch) {
            Ok(()) => info!("Returned to branch: {}", original_branch),
            Err(e) => error!("Failed to return to branch {}: {}", original_branch, e),
        }

        Ok(())
    }

    fn commit_component(&self, path: &Path, identifier: &str) -> Result<()> {
        self.vcs.stage(path)?;
        let message = format!(
            "feat: add {} component\n\nAutomatically created branch and committed new component file.",
            identifier
        );
        self.vcs.commit(&message)
    }

    async fn open_pull_request(&self, path: &Path, identifier: &str, branch: &str) {
        let client = match self.pr_client {
            Some(c) => c,
            None => return,
        };

        let url = match self.vcs.remote_url(&self.remote) {
            Ok(u) => u,
            Err(e) => {
                warn!("Cannot read remote URL for {}: {}", self.remote, e);
                return;
            }
        };

        let slug = match RepoSlug::parse(&url) {
            Some(s) => s,
            None => {
                warn!("Cannot parse owner/repository from remote URL: {}", url);
                return;
            }
        };

        let spec = PullRequestSpec {
            title: format!("Add {} component", identifier),
            body: format!(
                "## New component: {}\n\n\
                 This pull request adds a new component file: `{}`\n\n\
                 Opened automatically by repowarden on {}.",
                identifier,
                path.display(),
                chrono::Utc::now().format("%Y-%m-%d %H:%M UTC"),
            ),
            head: branch.to_string(),
            base: self.base_branch.clone(),
        };

        match client.create_pull(&slug, &spec).await {
            Ok(url) => info!("Created pull request: {}", url),
            Err(e) => error!("Failed to create pull request: {}", e),
        }
    }
}
