//! Infrastructure layer modules
//!
//! This module contains shared infrastructure components:
//! - `config`: Application configuration and settings
//! - `error`: HTTP-facing error type
//! - `metrics`: Prometheus metrics
//! - `postgres`: PostgreSQL pool manager and query executor

pub mod config;
pub mod error;
pub mod metrics;
pub mod postgres;
