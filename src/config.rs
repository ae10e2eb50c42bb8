use std::{env, str::FromStr, time::Duration};

pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Runtime settings read from the environment. Listen address and port are
/// left to Rocket's own `ROCKET_*` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub allowed_origins: Vec<String>,
    pub games_per_minute: u32,
    pub cleanup_interval: Duration,
    pub inactive_game_timeout: Duration,
    pub finished_game_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            games_per_minute: 30,
            cleanup_interval: Duration::from_secs(60),
            inactive_game_timeout: Duration::from_secs(1800),
            finished_game_timeout: Duration::from_secs(300),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.allowed_origins);

        let secs = |key: &str, default: Duration| {
            Duration::from_secs(parse_or(lookup(key), default.as_secs()))
        };

        Self {
            allowed_origins,
            games_per_minute: parse_or(
                lookup("RATE_LIMIT_GAMES_PER_MINUTE"),
                defaults.games_per_minute,
            ),
            cleanup_interval: secs("CLEANUP_INTERVAL_SECONDS", defaults.cleanup_interval),
            inactive_game_timeout: secs(
                "INACTIVE_GAME_TIMEOUT_SECONDS",
                defaults.inactive_game_timeout,
            ),
            finished_game_timeout: secs(
                "FINISHED_GAME_TIMEOUT_SECONDS",
                defaults.finished_game_timeout,
            ),
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config_from(&[]), ServerConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,,"),
            ("RATE_LIMIT_GAMES_PER_MINUTE", "5"),
            ("CLEANUP_INTERVAL_SECONDS", "15"),
            ("INACTIVE_GAME_TIMEOUT_SECONDS", "120"),
            ("FINISHED_GAME_TIMEOUT_SECONDS", " 30 "),
        ]);

        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.games_per_minute, 5);
        assert_eq!(config.cleanup_interval, Duration::from_secs(15));
        assert_eq!(config.inactive_game_timeout, Duration::from_secs(120));
        assert_eq!(config.finished_game_timeout, Duration::from_secs(30));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[
            ("CORS_ALLOWED_ORIGINS", " , "),
            ("RATE_LIMIT_GAMES_PER_MINUTE", "lots"),
            ("CLEANUP_INTERVAL_SECONDS", "-1"),
        ]);

        assert_eq!(config.allowed_origins, vec![DEFAULT_ALLOWED_ORIGIN]);
        assert_eq!(config.games_per_minute, 30);
        assert_eq!(config.cleanup_interval, Duration::from_secs(60));
    }
}
