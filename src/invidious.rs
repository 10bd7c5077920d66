//! Raw access to the Invidious `/api/v1` REST API
//!
//! Functions here talk to exactly one instance. Walking the instance list is left to
//! [`crate::fallback`].

pub mod api;
pub mod structs;
pub mod utils;
