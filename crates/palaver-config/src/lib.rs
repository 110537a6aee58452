// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Palaver chat client.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use palaver_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("endpoint: {}", config.connection.endpoint);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::PalaverConfig;

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<PalaverConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<PalaverConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<PalaverConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

#[allow(clippy::result_large_err)]
fn finish(
    loaded: Result<PalaverConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<PalaverConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut candidates = vec![std::path::PathBuf::from(loader::SYSTEM_CONFIG)];
    candidates.extend(loader::user_config_path());
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(loader::LOCAL_CONFIG));
    }

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
