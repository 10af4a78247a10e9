//! Compact Diff library
//!
//! The decoration engine lives in [`engine`]; the rest is the viewer that
//! hosts it.

pub mod app;
pub mod backend;
pub mod config;
pub mod constant;
pub mod engine;
pub mod style;
pub mod ui;
