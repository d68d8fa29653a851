//! Session types shared across IELS services.
//!
//! Provides session JWT validation and the session cookie builders.

pub mod cookie;
pub mod token;
