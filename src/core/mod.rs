// BotConsole - core/mod.rs
//
// Core business logic layer.
// Dependencies: standard library plus pure data crates (serde, chrono, regex).
// Must NOT depend on: ui, platform, app, or any I/O crate directly.

pub mod buffer;
pub mod export;
pub mod model;
pub mod payload;
pub mod rate_limit;
pub mod sanitize;
pub mod sse;
pub mod viewer;
