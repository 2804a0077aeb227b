use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Default worker-pool bound.
pub const DEFAULT_MAX_CONCURRENT: usize = 16;

/// HTTP client parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Total transfer timeout in seconds (per archive).
    pub timeout_secs: u64,
    /// User-Agent header sent with every archive request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 300,
            user_agent: format!("amirror/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Global configuration loaded from `~/.config/amirror/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Maximum number of archives fetched at once.
    pub max_concurrent: usize,
    /// Branch used when a source URL names a repository rather than a zip.
    pub default_branch: String,
    /// Destination root; `--dest` overrides it, otherwise `./bundle`.
    #[serde(default)]
    pub destination_dir: Option<PathBuf>,
    /// Catalog file; `--catalog` overrides it, otherwise the built-in catalog.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// Parent directory for the per-run scratch root (None = system temp dir).
    #[serde(default)]
    pub scratch_parent: Option<PathBuf>,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            default_branch: "master".to_string(),
            destination_dir: None,
            catalog_path: None,
            scratch_parent: None,
            http: HttpConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("amirror")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MirrorConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MirrorConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: MirrorConfig = toml::from_str(&data)?;
    Ok(cfg)
}
