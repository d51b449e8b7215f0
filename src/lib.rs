//! Tychem Catalog API Library
//!
//! This crate provides the catalog, sitemap, and notification core behind
//! the Tychem surplus-chemical site.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod models;
pub mod services;
pub mod store;

use std::sync::Arc;

use services::catalog::CatalogService;
use services::notifications::NotificationRelay;
use services::sitemap::SitemapPublisher;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub catalog: Arc<CatalogService>,
    pub publisher: Arc<SitemapPublisher>,
    pub relay: Arc<NotificationRelay>,
}
