use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 2500;
pub const DEFAULT_CLOCK_TICK_MS: u64 = 1000;

/// Engine tunables. Carried by value inside the context rather than as a
/// process-global so concurrent sessions (and their tests) stay isolated.
#[derive(Debug, Clone)]
pub struct Config {
    pub autosave_debounce_ms: u64,
    pub clock_tick_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: DEFAULT_AUTOSAVE_DEBOUNCE_MS,
            clock_tick_ms: DEFAULT_CLOCK_TICK_MS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            autosave_debounce_ms: get_env_parse(
                "UJIAN_AUTOSAVE_DEBOUNCE_MS",
                DEFAULT_AUTOSAVE_DEBOUNCE_MS,
            )?,
            clock_tick_ms: get_env_parse("UJIAN_CLOCK_TICK_MS", DEFAULT_CLOCK_TICK_MS)?,
        })
    }

    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    pub fn clock_tick(&self) -> Duration {
        Duration::from_millis(self.clock_tick_ms)
    }
}

fn get_env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}
