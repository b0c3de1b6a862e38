//! Storefront Admin Server Library
//!
//! This module exports the core types and functions for testing and reuse.

pub mod assets;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod ledger;
pub mod models;
pub mod revenue;
pub mod routes;
pub mod security;
pub mod stores;

pub use config::Config;
pub use db::{open_database, Db};
pub use error::{AppError, Result};

use std::sync::Arc;

use assets::BlobGateway;

/// Application state shared across all handlers
///
/// The remote gateway rides here as a trait object so tests can substitute
/// a scripted one.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Config,
    pub gateway: Arc<dyn BlobGateway>,
}

impl AppState {
    pub fn new(db: Db, config: Config, gateway: Arc<dyn BlobGateway>) -> Self {
        Self {
            db,
            config,
            gateway,
        }
    }
}
