use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

const DEFAULT_TOML: &str = include_str!("../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory uploaded files are written below.
    pub media_root: String,
    /// URL prefix the local backend hands out for stored files (usually relative).
    pub media_url: String,
    /// Absolute prefix used when a relative storage URL has to be turned into
    /// something a phone can open (QR codes).
    pub public_base_url: String,
    pub verify_on_startup: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QrConfig {
    /// Pixels per QR module.
    pub module_size: u32,
    /// Number of rendered PNGs kept in memory; 0 disables the cache.
    pub cache_capacity: usize,
}

impl Default for QrConfig {
    fn default() -> Self {
        // Mirror defaults from config/default.toml
        Self { module_size: 10, cache_capacity: 256 }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    pub enable_hsts: Option<bool>,
    pub hsts_max_age: Option<u64>,
    pub hsts_include_subdomains: Option<bool>,
    pub csp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    /// File kind -> extensions (without dot, lowercase).
    pub file_types: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub qr: QrConfig,
    pub security: Option<SecurityConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        match ::config::Config::builder()
            .add_source(::config::File::from_str(DEFAULT_TOML, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(DEFAULT_TOML, ::config::FileFormat::Toml))
        // Optional local file: resource-hub.toml (in CWD)
        .add_source(::config::File::with_name("resource-hub").required(false));

    if let Ok(custom_path) = std::env::var("RESOURCE_HUB_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(::config::Environment::with_prefix("RESOURCE_HUB").separator("__"));

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

/// Embedded defaults overlaid with a single TOML file, without consulting the
/// process environment.
pub fn load_from_file(path: &Path) -> anyhow::Result<AppConfig> {
    let cfg = ::config::Config::builder()
        .add_source(::config::File::from_str(DEFAULT_TOML, ::config::FileFormat::Toml))
        .add_source(::config::File::from(path).format(::config::FileFormat::Toml))
        .build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    // Server
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    // Warn for privileged ports on Unix-like systems
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }

    // Database
    if cfg.database.max_connections == 0 {
        return Err(anyhow::anyhow!("database.max_connections must be > 0"));
    }

    // Storage
    if cfg.storage.media_root.trim().is_empty() {
        return Err(anyhow::anyhow!("storage.media_root must not be empty"));
    }
    let media_url = cfg.storage.media_url.as_str();
    if !media_url.starts_with('/') || media_url.trim_matches('/').is_empty() {
        return Err(anyhow::anyhow!("storage.media_url must be a non-root path like /media/, got {:?}", media_url));
    }
    let base = cfg.storage.public_base_url.as_str();
    if let Err(reason) = crate::error::validation::parse_http_url(base) {
        return Err(anyhow::anyhow!(
            "storage.public_base_url must be an absolute http(s) URL, got {:?} ({})",
            base,
            reason
        ));
    }

    // QR
    if cfg.qr.module_size == 0 || cfg.qr.module_size > 64 {
        return Err(anyhow::anyhow!("qr.module_size must be in 1..=64"));
    }

    // File type table: every extension belongs to exactly one kind
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for (kind, extensions) in &cfg.file_types {
        for ext in extensions {
            let norm = ext.trim().to_lowercase();
            if norm.is_empty() || norm.contains('.') {
                return Err(anyhow::anyhow!("file_types.{}: invalid extension {:?}", kind, ext));
            }
            if let Some(other) = seen.insert(norm.clone(), kind.as_str()) {
                return Err(anyhow::anyhow!(
                    "file_types: extension {:?} listed under both {} and {}",
                    norm,
                    other,
                    kind
                ));
            }
        }
    }

    Ok(())
}

pub fn ensure_sqlite_parent_dir(url: &str) -> anyhow::Result<()> {
    if let Some(path) = url.strip_prefix("sqlite://") {
        let path = path.split('?').next().unwrap_or(path);
        let p = Path::new(path);
        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}
