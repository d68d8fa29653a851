//! Service plumbing shared by IELS services.

pub mod config;
pub mod middleware;
pub mod serde;
pub mod tracing;
