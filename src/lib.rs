//! Image Service
//!
//! Ingests uploaded images, derives a compressed copy and a fixed catalog of
//! thumbnail variants, and tracks pipeline progress through a persisted
//! status that clients poll for completion.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod storage;

pub use config::Config;
