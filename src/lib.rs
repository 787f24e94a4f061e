//! TechNews - A technology headline ingester
//!
//! This crate fetches technology headlines from NewsAPI, upserts them into an
//! `articles` table keyed by URL, and serves the most recent ones as JSON.

pub mod article;
pub mod config;
pub mod error;
pub mod ingest;
pub mod newsapi;
pub mod query;
pub mod routes;
pub mod store;
pub mod telemetry;
