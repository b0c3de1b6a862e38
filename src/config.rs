use std::env;

use crate::constants::DEFAULT_REMOTE_DELETE_CONCURRENCY;

/// How line-item prices are resolved when aggregating revenue.
///
/// `Live` reads the product's current price, so editing a product
/// retroactively changes historical figures; `Snapshot` uses the unit price
/// captured when the order was ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceMode {
    Live,
    Snapshot,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: String,
    pub allowed_origins: Vec<String>,
    pub environment: String,
    /// Secret used to derive per-store access tokens
    pub app_secret_key: String,
    /// Cloudinary account hosting the image blobs
    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,
    /// Offset applied to stored UTC timestamps before month bucketing
    pub revenue_utc_offset_minutes: i32,
    pub price_mode: PriceMode,
    /// Cap on simultaneous in-flight remote delete calls
    pub remote_delete_concurrency: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/storefront-admin.db".to_string());

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let app_secret_key = env::var("APP_SECRET_KEY")
            .map_err(|_| "APP_SECRET_KEY must be set for store token derivation")?;

        let cloudinary_cloud_name = env::var("CLOUDINARY_CLOUD_NAME")
            .map_err(|_| "CLOUDINARY_CLOUD_NAME must be set")?;
        let cloudinary_api_key =
            env::var("CLOUDINARY_API_KEY").map_err(|_| "CLOUDINARY_API_KEY must be set")?;
        let cloudinary_api_secret =
            env::var("CLOUDINARY_API_SECRET").map_err(|_| "CLOUDINARY_API_SECRET must be set")?;

        // Stored order timestamps are UTC; reports bucket months after applying
        // this offset so a store operating away from UTC sees its own calendar.
        let revenue_utc_offset_minutes = env::var("REVENUE_UTC_OFFSET_MINUTES")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .map_err(|_| "Invalid REVENUE_UTC_OFFSET_MINUTES")?;
        if !(-14 * 60..=14 * 60).contains(&revenue_utc_offset_minutes) {
            return Err("REVENUE_UTC_OFFSET_MINUTES out of range".to_string());
        }

        let price_mode = match env::var("REVENUE_PRICE_MODE")
            .unwrap_or_else(|_| "live".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "live" => PriceMode::Live,
            "snapshot" => PriceMode::Snapshot,
            _ => return Err("Invalid REVENUE_PRICE_MODE (expected 'live' or 'snapshot')".into()),
        };

        let remote_delete_concurrency = env::var("REMOTE_DELETE_CONCURRENCY")
            .unwrap_or_else(|_| DEFAULT_REMOTE_DELETE_CONCURRENCY.to_string())
            .parse()
            .map_err(|_| "Invalid REMOTE_DELETE_CONCURRENCY")?;
        if remote_delete_concurrency == 0 {
            return Err("REMOTE_DELETE_CONCURRENCY must be at least 1".to_string());
        }

        Ok(Config {
            server_host,
            server_port,
            database_path,
            allowed_origins,
            environment,
            app_secret_key,
            cloudinary_cloud_name,
            cloudinary_api_key,
            cloudinary_api_secret,
            revenue_utc_offset_minutes,
            price_mode,
            remote_delete_concurrency,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
