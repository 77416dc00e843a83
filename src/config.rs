use std::env;

use anyhow::{Context, Result};

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// variable has a working default; an engine with no configuration at all
/// still runs against ./litmus.db.
pub struct Config {
    pub db_path: String,
    /// Most posts considered per community in one run (LITMUS_BATCH_SIZE).
    pub batch_size: usize,
    /// How many opening hooks each profile keeps (LITMUS_TOP_HOOKS).
    pub top_hooks: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Ok(Self {
            db_path: env::var("LITMUS_DB_PATH").unwrap_or_else(|_| "./litmus.db".to_string()),
            batch_size: parse_var("LITMUS_BATCH_SIZE", 500)?,
            top_hooks: parse_var("LITMUS_TOP_HOOKS", 5)?,
        })
    }
}

fn parse_var(name: &str, default: usize) -> Result<usize> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} must be a positive integer, got {raw:?}")),
        Err(_) => Ok(default),
    }
}
