use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub dooray: DooraySettings,
    pub recent: RecentSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Request body limit for `uploadFile`.
    pub max_upload_mb: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_ttl_secs: u64,
    pub issuer: String,
}

/// Upstream Drive API settings.
#[derive(Debug, Deserialize, Clone)]
pub struct DooraySettings {
    pub base_url: String,
    /// `size=` sent when listing the files of one folder.
    pub file_page_size: u32,
    /// Keep requesting further pages until a short page comes back.
    /// Off by default: a folder listing stops after `page=0`.
    pub follow_file_pages: bool,
    /// Upper bound on pages read per folder when following pages.
    pub max_file_pages: u32,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecentSettings {
    pub capacity: usize,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("DRIVEGATE"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 8090)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("app.max_upload_mb", 100)?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "drivegate")?
            .set_default("jwt.secret", "change-me-in-production")?
            .set_default("jwt.access_token_ttl_secs", 3600)?
            .set_default("jwt.issuer", "drivegate")?
            .set_default("dooray.base_url", "https://api.dooray.com")?
            .set_default("dooray.file_page_size", 100)?
            .set_default("dooray.follow_file_pages", false)?
            .set_default("dooray.max_file_pages", 50)?
            .set_default("dooray.request_timeout_secs", 60)?
            .set_default("dooray.connect_timeout_secs", 10)?
            .set_default("recent.capacity", 10)?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for DooraySettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.dooray.com".to_string(),
            file_page_size: 100,
            follow_file_pages: false,
            max_file_pages: 50,
            request_timeout_secs: 60,
            connect_timeout_secs: 10,
        }
    }
}
