pub mod agent;
pub mod commands;
pub mod config;
pub mod gemini;
pub mod io;
pub mod logging;
pub mod sqlite;
