use common::storage::KeyPolicy;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::{ParseError, Url};

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Allowed origins. Empty allows any origin.
    #[serde(default)]
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetadataBackend {
    Postgres,
    /// In-process table; contents are lost on restart.
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub backend: MetadataBackend,
    /// Full connection URL. Takes precedence over the individual fields.
    pub url: Option<String>,
    pub host: String,
    pub user: String,
    pub password: String,
    pub name: String,
    /// Connection attempts at startup before giving up.
    pub connect_attempts: u32,
    pub connect_retry_delay_secs: u64,
}

impl DatabaseConfig {
    /// The explicit `url`, or one assembled from the individual fields with
    /// the credentials and database name percent-encoded.
    pub fn connection_url(&self) -> Result<String, ParseError> {
        if let Some(url) = self.url.as_ref().filter(|url| !url.is_empty()) {
            return Ok(url.clone());
        }

        let mut assembled = Url::parse(&format!("postgres://{}/", self.host))?;
        // Only a URL without a host refuses credentials.
        assembled
            .set_username(&self.user)
            .map_err(|()| ParseError::EmptyHost)?;
        assembled
            .set_password(Some(&self.password))
            .map_err(|()| ParseError::EmptyHost)?;
        assembled
            .path_segments_mut()
            .map_err(|()| ParseError::EmptyHost)?
            .clear()
            .push(&self.name);
        Ok(assembled.into())
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlobBackend {
    S3,
    Filesystem,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: BlobBackend,
    /// S3 endpoint, e.g. `minio:9000` or `https://s3.example.com`.
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// Root directory for the filesystem backend.
    pub path: String,
    pub key_policy: KeyPolicy,
    /// Largest accepted upload, in bytes.
    pub max_upload_size: u64,
    /// Bound on each individual store call.
    pub operation_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CATALOG_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.backend", "postgres")?
            .set_default("database.host", "localhost")?
            .set_default("database.user", "postgres")?
            .set_default("database.password", "postgres")?
            .set_default("database.name", "images")?
            .set_default("database.connect_attempts", 5)?
            .set_default("database.connect_retry_delay_secs", 2)?
            .set_default("storage.backend", "s3")?
            .set_default("storage.endpoint", "localhost:9000")?
            .set_default("storage.region", "us-east-1")?
            .set_default("storage.access_key", "")?
            .set_default("storage.secret_key", "")?
            .set_default("storage.bucket", "images")?
            .set_default("storage.path", "./data/blobs")?
            .set_default("storage.key_policy", "unique")?
            .set_default("storage.max_upload_size", 10 * 1024 * 1024)?
            .set_default("storage.operation_timeout_secs", 30)?
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., CATALOG__STORAGE__BUCKET)
            .add_source(
                Environment::with_prefix("CATALOG")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
