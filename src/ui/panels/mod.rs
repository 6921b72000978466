// BotConsole - ui/panels/mod.rs

pub mod about;
pub mod actions;
pub mod notice;
pub mod rate_limit;
pub mod terminal;
