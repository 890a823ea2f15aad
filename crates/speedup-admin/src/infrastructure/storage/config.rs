//! TOML-based configuration persistence for speedup.
//!
//! Reads and writes `AppConfig` to `--config PATH` or to the
//! platform-appropriate config file:
//! - Windows:  `%APPDATA%\Speedup\config.toml`
//! - Linux:    `~/.config/speedup/config.toml`
//! - macOS:    `~/Library/Application Support/Speedup/config.toml`
//!
//! ```toml
//! [site]
//! base_url = "https://example.com/"
//! document_root = "/var/www/html"
//!
//! [admin]
//! settings_location = "options-general.php?page=speed-up-wordpress"
//! log_level = "info"
//!
//! [probe]
//! timeout_secs = 30
//!
//! [detection]
//! policy = "byte-distance"
//! threshold = 50
//! ```
//!
//! Every field has a `#[serde(default = "...")]` so a partial file (or no
//! file at all on first run) still yields a usable config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use speedup_core::section::presence::DEFAULT_BYTE_THRESHOLD;
use speedup_core::{ByteDistancePolicy, LineCountPolicy, PresencePolicy};
use thiserror::Error;

/// Name of the managed file inside the document root.
pub const HTACCESS_FILE_NAME: &str = ".htaccess";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
}

/// The site whose `.htaccess` is managed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteConfig {
    /// Public base URL.  Its host parameterizes the hotlink rules and the
    /// compression probe requests it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Directory holding the managed `.htaccess`.
    #[serde(default = "default_document_root")]
    pub document_root: PathBuf,
}

/// Admin-side behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminConfig {
    /// Where the front end is sent after every action.
    #[serde(default = "default_settings_location")]
    pub settings_location: String,
    /// TOML file holding the persisted flags.  Defaults to `state.toml` next
    /// to the platform config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Compression probe settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeConfig {
    /// Upper bound for the whole probe request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// How a section's presence is detected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum DetectionConfig {
    /// Marker offsets more than `threshold` bytes apart.
    ByteDistance {
        #[serde(default = "default_threshold")]
        threshold: usize,
    },
    /// At least `min_lines` non-blank body lines in a well-formed section.
    LineCount {
        #[serde(default = "default_min_lines")]
        min_lines: usize,
    },
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "http://localhost/".to_string()
}
fn default_document_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_settings_location() -> String {
    "options-general.php?page=speed-up-wordpress".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_threshold() -> usize {
    DEFAULT_BYTE_THRESHOLD
}
fn default_min_lines() -> usize {
    1
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            document_root: default_document_root(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            settings_location: default_settings_location(),
            state_file: None,
            log_level: default_log_level(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig::ByteDistance {
            threshold: default_threshold(),
        }
    }
}

impl SiteConfig {
    /// Full path of the managed `.htaccess`.
    pub fn htaccess_path(&self) -> PathBuf {
        self.document_root.join(HTACCESS_FILE_NAME)
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DetectionConfig {
    /// Builds the configured policy.
    pub fn policy(&self) -> Box<dyn PresencePolicy> {
        match *self {
            DetectionConfig::ByteDistance { threshold } => {
                Box::new(ByteDistancePolicy { threshold })
            }
            DetectionConfig::LineCount { min_lines } => Box::new(LineCountPolicy { min_lines }),
        }
    }
}

impl AdminConfig {
    /// The configured state file, or `state.toml` in the platform config
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoPlatformConfigDir`] when no state file is
    /// configured and the platform directory cannot be determined.
    pub fn state_file_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.state_file {
            Some(path) => Ok(path.clone()),
            None => Ok(config_dir()?.join("state.toml")),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from `path` (or the platform default), returning
/// `AppConfig::default()` if the file does not exist yet.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Persists `config` to `path`, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    super::write_atomically(path, &content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config base directory including the `speedup` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Speedup"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("speedup"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library").join("Application Support").join("Speedup"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
