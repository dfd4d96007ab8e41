//! Configuration system for the `OpenRPC` bridge server.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/openrpc-bridge/config.toml`)
//! 4. Compiled defaults

use std::path::PathBuf;

/// Default port the HTTP server listens on.
pub const DEFAULT_PORT: u16 = 8080;

/// Default Discord application ID used when none is configured.
pub const DEFAULT_CLIENT_ID: &str = "1436600503692824586";

/// Errors that can occur when loading bridge configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure for the bridge.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct BridgeConfigFile {
    server: ServerFileConfig,
    presence: PresenceFileConfig,
}

/// `[server]` section of the bridge config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerFileConfig {
    port: Option<u16>,
}

/// `[presence]` section of the bridge config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct PresenceFileConfig {
    client_id: Option<String>,
}

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

/// CLI arguments for the bridge server.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "OpenRPC bridge server")]
pub struct BridgeCliArgs {
    /// Port to serve the HTTP API on.
    #[arg(short, long, env = "BRIDGE_PORT")]
    pub port: Option<u16>,

    /// Discord application (client) ID.
    #[arg(long, env = "BRIDGE_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Path to config file (default: `~/.config/openrpc-bridge/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", env = "BRIDGE_LOG")]
    pub log_level: String,

    /// Log every presence update with timestamps and targets.
    #[arg(short, long)]
    pub verbose: bool,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved bridge server configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Port the HTTP server binds on the loopback interface.
    pub port: u16,
    /// Discord application (client) ID.
    pub client_id: String,
    /// Log level filter string.
    pub log_level: String,
    /// Verbose per-update logging.
    pub verbose: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            client_id: DEFAULT_CLIENT_ID.to_string(),
            log_level: "info".to_string(),
            verbose: false,
        }
    }
}

impl BridgeConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path is tried and a missing
    /// file is treated as empty config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read
    /// or parsed.
    pub fn load(cli: &BridgeCliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Resolve a `BridgeConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    #[must_use]
    fn resolve(cli: &BridgeCliArgs, file: &BridgeConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            port: cli.port.or(file.server.port).unwrap_or(defaults.port),
            client_id: cli
                .client_id
                .clone()
                .or_else(|| file.presence.client_id.clone())
                .unwrap_or(defaults.client_id),
            log_level: cli.log_level.clone(),
            verbose: cli.verbose,
        }
    }

    /// Loopback bind address for the configured port.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file for the bridge.
fn load_config_file(
    explicit_path: Option<&std::path::Path>,
) -> Result<BridgeConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(BridgeConfigFile::default());
        };
        config_dir.join("openrpc-bridge").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BridgeConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
