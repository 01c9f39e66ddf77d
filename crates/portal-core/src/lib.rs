//! Shared service plumbing: health checks, request ids, tracing, config and
//! sea-orm helpers.

pub mod config;
pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
