//! Server runtime configuration loaded from environment variables.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::anticheat::AntiCheatConfig;
use crate::crypto::{ScoreSigner, SignatureError};
use crate::leaderboard::{DEFAULT_CACHE_TTL, DEFAULT_LEADERBOARD_SIZE};
use crate::rate_limit::RateLimitConfig;
use crate::replay::{DEFAULT_REPLAY_CAPACITY, DEFAULT_REPLAY_TTL};
use crate::session::DEFAULT_SESSION_TTL;

pub const SIGNING_KEY_VAR: &str = "SERVER_SIGNING_KEY";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_MESSAGE_AGE: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SERVER_SIGNING_KEY is not set")]
    MissingSigningKey,

    #[error("SERVER_SIGNING_KEY is not a valid secp256k1 private key: {0}")]
    InvalidSigningKey(#[source] SignatureError),
}

/// Tunables of the submission pipeline and its components.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    pub replay_ttl: Duration,
    pub replay_capacity: usize,
    /// Maximum distance between a claim's timestamp and the server clock.
    pub max_message_age: Duration,
    pub anti_cheat: AntiCheatConfig,
    pub leaderboard_cache_ttl: Duration,
    pub leaderboard_size: usize,
    /// `None` keeps unclaimed sessions for the process lifetime.
    pub session_ttl: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            replay_ttl: DEFAULT_REPLAY_TTL,
            replay_capacity: DEFAULT_REPLAY_CAPACITY,
            max_message_age: DEFAULT_MAX_MESSAGE_AGE,
            anti_cheat: AntiCheatConfig::default(),
            leaderboard_cache_ttl: DEFAULT_CACHE_TTL,
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
            session_ttl: Some(DEFAULT_SESSION_TTL),
        }
    }
}

/// Everything the `game-server` binary needs to start.
#[derive(Debug)]
pub struct ServerConfig {
    pub signer: ScoreSigner,
    pub bind: SocketAddr,
    pub static_dir: PathBuf,
    pub log_dir: PathBuf,
    pub service: ServiceConfig,
    pub leaders_rate_limit: RateLimitConfig,
}

impl ServerConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SERVER_SIGNING_KEY` - hex private key for receipts (required)
    /// - `HOST` / `PORT` - bind address (default: 0.0.0.0:8000)
    /// - `STATIC_DIR` - frontend assets (default: frontend)
    /// - `LOG_DIR` - log directory (default: platform cache dir)
    /// - `REPLAY_TTL_SECS` / `REPLAY_CAPACITY` - replay guard (default: 300 / 10000)
    /// - `SIGNATURE_MAX_AGE_SECS` - claim freshness window (default: 60)
    /// - `MIN_HIT_TIME_MS` - anti-cheat bound (default: 300)
    /// - `LEADERBOARD_CACHE_TTL_SECS` / `LEADERBOARD_SIZE` - leaders cache (default: 30 / 10)
    /// - `LEADERS_RATE_LIMIT` - `/leaders` requests per second per client (default: 5)
    /// - `SESSION_TTL_SECS` - abandoned-session expiry, 0 disables (default: 3600)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(SIGNING_KEY_VAR)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingSigningKey)?;
        let signer = ScoreSigner::from_hex(secret.trim()).map_err(ConfigError::InvalidSigningKey)?;

        let host: IpAddr = read_env(&lookup, "HOST").unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let port: u16 = read_env(&lookup, "PORT").unwrap_or(DEFAULT_PORT);

        let mut service = ServiceConfig::default();

        if let Some(secs) = read_env::<u64, _>(&lookup, "REPLAY_TTL_SECS") {
            service.replay_ttl = Duration::from_secs(secs);
        }
        if let Some(capacity) = read_env::<usize, _>(&lookup, "REPLAY_CAPACITY") {
            service.replay_capacity = capacity.max(1);
        }
        if let Some(secs) = read_env::<u64, _>(&lookup, "SIGNATURE_MAX_AGE_SECS") {
            service.max_message_age = Duration::from_secs(secs);
        }
        if let Some(millis) = read_env::<u64, _>(&lookup, "MIN_HIT_TIME_MS") {
            service.anti_cheat.min_hit_time = Duration::from_millis(millis.max(1));
        }
        if let Some(secs) = read_env::<u64, _>(&lookup, "LEADERBOARD_CACHE_TTL_SECS") {
            service.leaderboard_cache_ttl = Duration::from_secs(secs);
        }
        if let Some(size) = read_env::<usize, _>(&lookup, "LEADERBOARD_SIZE") {
            service.leaderboard_size = size.max(1);
        }
        if let Some(secs) = read_env::<u64, _>(&lookup, "SESSION_TTL_SECS") {
            service.session_ttl = (secs > 0).then(|| Duration::from_secs(secs));
        }

        let mut leaders_rate_limit = RateLimitConfig::default();
        if let Some(max) = read_env::<u32, _>(&lookup, "LEADERS_RATE_LIMIT") {
            leaders_rate_limit.max_requests = max.max(1);
        }

        Ok(Self {
            signer,
            bind: SocketAddr::new(host, port),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("frontend")),
            log_dir: lookup("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_log_dir),
            service,
            leaders_rate_limit,
        })
    }
}

/// Platform cache directory for server logs, `./logs` when none is known.
///
/// - macOS: `~/Library/Caches/game-server/logs`
/// - Linux: `~/.cache/game-server/logs` (or `$XDG_CACHE_HOME/game-server/logs`)
/// - Windows: `%LOCALAPPDATA%\game-server\cache\logs`
pub fn default_log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "game-server")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

fn read_env<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_with_only_the_key() {
        let config = load(&[(SIGNING_KEY_VAR, SECRET)]).unwrap();

        assert_eq!(config.bind, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(config.static_dir, PathBuf::from("frontend"));
        assert_eq!(config.service, ServiceConfig::default());
        assert_eq!(config.leaders_rate_limit, RateLimitConfig::default());
    }

    #[test]
    fn missing_or_invalid_key_is_fatal() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingSigningKey)));
        assert!(matches!(
            load(&[(SIGNING_KEY_VAR, "  ")]),
            Err(ConfigError::MissingSigningKey)
        ));
        assert!(matches!(
            load(&[(SIGNING_KEY_VAR, "0xnothex")]),
            Err(ConfigError::InvalidSigningKey(_))
        ));
    }

    #[test]
    fn overrides_are_read_and_bad_values_ignored() {
        let config = load(&[
            (SIGNING_KEY_VAR, SECRET),
            ("HOST", "127.0.0.1"),
            ("PORT", "9001"),
            ("LOG_DIR", "/var/log/game"),
            ("REPLAY_TTL_SECS", "120"),
            ("MIN_HIT_TIME_MS", "250"),
            ("LEADERBOARD_SIZE", "not-a-number"),
            ("SESSION_TTL_SECS", "0"),
            ("LEADERS_RATE_LIMIT", "20"),
        ])
        .unwrap();

        assert_eq!(config.bind, "127.0.0.1:9001".parse().unwrap());
        assert_eq!(config.log_dir, PathBuf::from("/var/log/game"));
        assert_eq!(config.service.replay_ttl, Duration::from_secs(120));
        assert_eq!(
            config.service.anti_cheat.min_hit_time,
            Duration::from_millis(250)
        );
        assert_eq!(config.service.leaderboard_size, DEFAULT_LEADERBOARD_SIZE);
        assert_eq!(config.service.session_ttl, None);
        assert_eq!(config.leaders_rate_limit.max_requests, 20);
    }
}
