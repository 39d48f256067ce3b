//! Configuration utilities (ports, static assets, game timings)

use std::{env, net::{Ipv4Addr, SocketAddr}};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Socket address to bind the server to.
///
/// Reads the `PORT` env var or defaults to 8080, binds to 0.0.0.0.
pub fn server_addr() -> SocketAddr {
    let port = env_parse::<u16>("PORT").unwrap_or(8080);
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
}

/// Resolve the static directory holding the browser client.
/// Order:
/// 1) STATIC_DIR env var
/// 2) ./game/frontend/static (container runtime layout)
/// 3) ../frontend/static (local dev from backend dir)
pub fn static_dir() -> PathBuf {
    if let Ok(p) = env::var("STATIC_DIR") {
        return PathBuf::from(p);
    }
    let p1 = Path::new("./game/frontend/static");
    if p1.exists() { return p1.to_path_buf(); }
    PathBuf::from("../frontend/static")
}

/// How long a room whose controller stopped stays queryable over HTTP.
pub fn session_max_age() -> Duration {
    Duration::from_secs(env_parse("PAIRS_SESSION_MAX_AGE_SECS").unwrap_or(3600))
}

/// Timings and randomness for every game played by this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSettings {
    /// How long a mismatched pair stays face up.
    pub mismatch_delay: Duration,
    /// How long the browser takes to flip a card.
    pub flip_duration: Duration,
    /// Fixed shuffle seed; `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            mismatch_delay: Duration::from_millis(1000),
            flip_duration: Duration::from_millis(500),
            seed: None,
        }
    }
}

impl GameSettings {
    /// Reads `PAIRS_MISMATCH_DELAY_MS`, `PAIRS_FLIP_MS` and `PAIRS_SEED`,
    /// keeping defaults for anything missing or unparseable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok()).map(Duration::from_millis);
        Self {
            mismatch_delay: millis("PAIRS_MISMATCH_DELAY_MS").unwrap_or(defaults.mismatch_delay),
            flip_duration: millis("PAIRS_FLIP_MS").unwrap_or(defaults.flip_duration),
            seed: lookup("PAIRS_SEED").and_then(|v| v.trim().parse().ok()),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(GameSettings::from_lookup(lookup(&[])), GameSettings::default());
    }

    #[test]
    fn reads_overrides() {
        let settings = GameSettings::from_lookup(lookup(&[
            ("PAIRS_MISMATCH_DELAY_MS", "250"),
            ("PAIRS_FLIP_MS", " 100 "),
            ("PAIRS_SEED", "99"),
        ]));
        assert_eq!(settings.mismatch_delay, Duration::from_millis(250));
        assert_eq!(settings.flip_duration, Duration::from_millis(100));
        assert_eq!(settings.seed, Some(99));
    }

    #[test]
    fn garbage_falls_back() {
        let settings = GameSettings::from_lookup(lookup(&[("PAIRS_MISMATCH_DELAY_MS", "soon"), ("PAIRS_SEED", "-1")]));
        assert_eq!(settings.mismatch_delay, Duration::from_millis(1000));
        assert_eq!(settings.seed, None);
    }
}
