// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./palaver.toml` > `~/.config/palaver/palaver.toml` > `/etc/palaver/palaver.toml`
//! with environment variable overrides via `PALAVER_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::PalaverConfig;

/// Config sections that environment variables may address.
const SECTIONS: &[&str] = &["agent", "connection", "storage", "conversation"];

/// System-wide config file.
pub const SYSTEM_CONFIG: &str = "/etc/palaver/palaver.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG: &str = "palaver.toml";

/// Per-user config file under the XDG config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("palaver").join("palaver.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/palaver/palaver.toml`
/// 3. `~/.config/palaver/palaver.toml`
/// 4. `./palaver.toml`
/// 5. `PALAVER_*` environment variables
pub fn load_config() -> Result<PalaverConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<PalaverConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PalaverConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PalaverConfig, figment::Error> {
    tracing::debug!(path = %path.display(), "loading configuration file");
    Figment::new()
        .merge(Serialized::defaults(PalaverConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PalaverConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider mapping `PALAVER_<SECTION>_<KEY>` to `section.key`.
///
/// Only the leading section name is turned into a dot so keys that contain
/// underscores (or another section's name) stay intact. Figment keeps the
/// variable's original case, so the name is lowercased before mapping.
fn env_provider() -> Env {
    Env::prefixed("PALAVER_")
        .map(|key| map_env_key(&key.as_str().to_ascii_lowercase()).into())
}

/// Maps a lowercased, prefix-stripped env var name to a config path.
pub fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
