//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `DISTGEN_*` environment variables, `__` separating sections
//!    (`DISTGEN_DEFAULTS__NETWORK=goerli`)
//! 3. `--config FILE` (must exist) or `./distgen.toml` (optional)
//! 4. User config file in the platform config directory (optional)
//! 5. Built-in defaults (always present)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use distgen_core::domain::MissingVariablePolicy;

/// Project-local configuration file, looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "distgen.toml";

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "DISTGEN";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Fallbacks for the generator flags.
    pub defaults: Defaults,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub template: PathBuf,
    pub output: PathBuf,
    pub network: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            template: PathBuf::from("./contracts/MerkleDistributor.template"),
            output: PathBuf::from("./contracts/MerkleDistributor.sol"),
            network: "mainnet".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Policy for placeholders naming unbound variables.
    pub on_missing: MissingVariablePolicy,
    /// Extra bindings; `--define` entries take precedence.
    pub defines: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
}

impl AppConfig {
    /// Load configuration from files and the environment over the defaults.
    ///
    /// `config_file` is the path the user passed via `--config`.  When given
    /// it replaces `./distgen.toml` and must exist.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let mut builder = Config::builder();

        if let Some(user) = Self::config_path() {
            builder = builder.add_source(toml_file(&user).required(false));
        }

        builder = match config_file {
            Some(path) => builder.add_source(toml_file(path).required(true)),
            None => builder.add_source(toml_file(Path::new(LOCAL_CONFIG_FILE)).required(false)),
        };

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("failed to read configuration")?;

        settings
            .try_deserialize()
            .context("invalid configuration value")
    }

    /// Path to the user configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness; `None`
    /// when no home directory can be determined.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "distgen", "distgen")
            .map(|d| d.config_dir().join("config.toml"))
    }
}

fn toml_file(path: &Path) -> File<config::FileSourceFile, FileFormat> {
    File::from(path).format(FileFormat::Toml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_match_contract_layout() {
        let cfg = AppConfig::default();
        assert_eq!(
            cfg.defaults.template,
            PathBuf::from("./contracts/MerkleDistributor.template")
        );
        assert_eq!(
            cfg.defaults.output,
            PathBuf::from("./contracts/MerkleDistributor.sol")
        );
    }

    #[test]
    fn default_network_is_mainnet() {
        assert_eq!(AppConfig::default().defaults.network, "mainnet");
    }

    #[test]
    fn default_policy_is_empty() {
        assert_eq!(
            AppConfig::default().render.on_missing,
            MissingVariablePolicy::Empty
        );
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            r#"
[defaults]
network = "rinkeby"

[render]
on_missing = "strict"

[render.defines]
token = "0xabc"
"#,
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.defaults.network, "rinkeby");
        assert_eq!(cfg.render.on_missing, MissingVariablePolicy::Strict);
        assert_eq!(cfg.render.defines.get("token").map(String::as_str), Some("0xabc"));
        // Untouched keys keep their defaults.
        assert_eq!(
            cfg.defaults.output,
            PathBuf::from("./contracts/MerkleDistributor.sol")
        );
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[render]\non_missing = \"sometimes\"\n").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }
}
