//! Host-side services: the diff provider and session, and file loading.

pub mod diff_backend;
pub mod loader;
