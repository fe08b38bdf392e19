// SPDX-License-Identifier: MIT

//! Repowarden: repository structure enforcement and component branch automation
//!
//! Two tools over one git capability layer: `enforce` reshapes the
//! repository root to a declared layout and commits the result; `watch`
//! reacts to newly created front-end component files by branching,
//! committing, pushing, and opening a pull request for each.

pub mod classifier;
pub mod component;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod watcher;

pub use config::AppConfig;
pub use error::{RepowardenError, Result};
