//! Server settings read from the environment.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `HOST` | `127.0.0.1` | bind address |
//! | `PORT` | `3000` | bind port |
//! | `TODO_MAX_TITLE_LEN` | `40` | title limit in characters, `0` for none |
//! | `LOG_FORMAT` | text | `json` switches log output to JSON |
//!
//! Unparsable values fall back to the default.

use std::env;
use std::str::FromStr;

use todo_core::{TitlePolicy, DEFAULT_MAX_TITLE_LEN};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub title_policy: TitlePolicy,
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            title_policy: TitlePolicy::default(),
            json_logs: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST")
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT").unwrap_or(defaults.port),
            title_policy: TitlePolicy::with_limit(
                parse_var(&lookup, "TODO_MAX_TITLE_LEN").unwrap_or(DEFAULT_MAX_TITLE_LEN),
            ),
            json_logs: lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    lookup(name).and_then(|v| v.trim().parse().ok())
}
