use crate::store::{FileStore, KeyValueStore};
use crate::words::{
    HttpWordSource, PetnameWordSource, StaticWordSource, WordResult, WordSource,
    WordSourceError, DEFAULT_MAX_ATTEMPTS,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Which word source backs new sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordSourceKind {
    /// Built-in lists
    Static,
    /// Local noun generator (English only)
    Petname,
    /// Remote random-word API
    Http,
}

impl WordSourceKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "static" | "builtin" => Some(Self::Static),
            "petname" | "generator" => Some(Self::Petname),
            "http" | "remote" => Some(Self::Http),
            _ => None,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// JSON file holding sessions, defaults and word history
    pub data_path: PathBuf,
    pub word_source: WordSourceKind,
    /// Endpoint for the HTTP word source
    pub word_url: Option<String>,
    pub word_timeout: Duration,
    /// Candidates requested before accepting a repeated word
    pub max_attempts: usize,
    /// Fixed RNG seed for reproducible games
    pub seed: Option<u64>,
    pub bind_addr: SocketAddr,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("imposter-data.json"),
            word_source: WordSourceKind::Static,
            word_url: None,
            word_timeout: Duration::from_secs(5),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: None,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

/// Read a variable, treating blank values as unset
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let word_source = match env_var("IMPOSTER_WORD_SOURCE") {
            Some(raw) => WordSourceKind::parse(&raw).unwrap_or_else(|| {
                tracing::warn!("Unknown IMPOSTER_WORD_SOURCE {:?}, using static words", raw);
                WordSourceKind::Static
            }),
            None => defaults.word_source,
        };

        Self {
            data_path: env_var("IMPOSTER_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            word_source,
            word_url: env_var("IMPOSTER_WORD_URL"),
            word_timeout: env_var("IMPOSTER_WORD_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.word_timeout),
            max_attempts: env_var("IMPOSTER_MAX_ATTEMPTS")
                .and_then(|s| s.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.max_attempts),
            seed: env_var("IMPOSTER_SEED").and_then(|s| s.parse().ok()),
            bind_addr: env_var("IMPOSTER_BIND")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.bind_addr),
        }
    }

    /// Build the configured word source
    pub fn build_word_source(&self) -> WordResult<Arc<dyn WordSource>> {
        let source: Arc<dyn WordSource> = match self.word_source {
            WordSourceKind::Static => match self.seed {
                Some(seed) => Arc::new(StaticWordSource::with_seed(seed)),
                None => Arc::new(StaticWordSource::new()),
            },
            WordSourceKind::Petname => Arc::new(PetnameWordSource::new()),
            WordSourceKind::Http => {
                let url = self.word_url.clone().ok_or_else(|| {
                    WordSourceError::Request(
                        "IMPOSTER_WORD_URL must be set for the http word source".to_string(),
                    )
                })?;
                Arc::new(HttpWordSource::new(url, self.word_timeout)?)
            }
        };
        Ok(source)
    }

    pub fn build_store(&self) -> Arc<dyn KeyValueStore> {
        Arc::new(FileStore::new(self.data_path.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "IMPOSTER_DATA_PATH",
        "IMPOSTER_WORD_SOURCE",
        "IMPOSTER_WORD_URL",
        "IMPOSTER_WORD_TIMEOUT",
        "IMPOSTER_MAX_ATTEMPTS",
        "IMPOSTER_SEED",
        "IMPOSTER_BIND",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_env();
        let config = AppConfig::from_env();
        assert_eq!(config.data_path, PathBuf::from("imposter-data.json"));
        assert_eq!(config.word_source, WordSourceKind::Static);
        assert_eq!(config.max_attempts, 20);
        assert_eq!(config.word_timeout, Duration::from_secs(5));
        assert!(config.seed.is_none());
    }

    #[test]
    #[serial]
    fn test_reads_env() {
        clear_env();
        std::env::set_var("IMPOSTER_DATA_PATH", "/tmp/imposter.json");
        std::env::set_var("IMPOSTER_WORD_SOURCE", "HTTP");
        std::env::set_var("IMPOSTER_WORD_URL", "http://localhost:9000/word");
        std::env::set_var("IMPOSTER_WORD_TIMEOUT", "2");
        std::env::set_var("IMPOSTER_MAX_ATTEMPTS", "7");
        std::env::set_var("IMPOSTER_SEED", "42");
        std::env::set_var("IMPOSTER_BIND", "127.0.0.1:3000");

        let config = AppConfig::from_env();
        clear_env();

        assert_eq!(config.data_path, PathBuf::from("/tmp/imposter.json"));
        assert_eq!(config.word_source, WordSourceKind::Http);
        assert_eq!(
            config.word_url.as_deref(),
            Some("http://localhost:9000/word")
        );
        assert_eq!(config.word_timeout, Duration::from_secs(2));
        assert_eq!(config.max_attempts, 7);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
    }

    #[test]
    #[serial]
    fn test_blank_and_invalid_values_fall_back() {
        clear_env();
        std::env::set_var("IMPOSTER_DATA_PATH", "   ");
        std::env::set_var("IMPOSTER_WORD_SOURCE", "carrier-pigeon");
        std::env::set_var("IMPOSTER_MAX_ATTEMPTS", "0");
        std::env::set_var("IMPOSTER_SEED", "not-a-number");

        let config = AppConfig::from_env();
        clear_env();

        assert_eq!(config.data_path, PathBuf::from("imposter-data.json"));
        assert_eq!(config.word_source, WordSourceKind::Static);
        assert_eq!(config.max_attempts, 20);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_http_source_requires_url() {
        let config = AppConfig {
            word_source: WordSourceKind::Http,
            ..AppConfig::default()
        };
        let err = config.build_word_source().err().unwrap();
        assert!(err.to_string().contains("IMPOSTER_WORD_URL"));
    }

    #[test]
    fn test_builds_each_source() {
        for (kind, name) in [
            (WordSourceKind::Static, "static"),
            (WordSourceKind::Petname, "petname"),
        ] {
            let config = AppConfig {
                word_source: kind,
                ..AppConfig::default()
            };
            assert_eq!(config.build_word_source().unwrap().name(), name);
        }

        let config = AppConfig {
            word_source: WordSourceKind::Http,
            word_url: Some("http://localhost:1/word".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.build_word_source().unwrap().name(), "http");
    }
}
