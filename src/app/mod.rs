// BotConsole - app/mod.rs
//
// Application layer: state ownership and background workers (log stream
// transport, action requests).
// Dependencies: core, platform, util.

pub mod actions;
pub mod state;
pub mod stream;
