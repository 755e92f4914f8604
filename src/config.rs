pub const ENDPOINT_URL_VAR: &str = "MODEL_ENDPOINT_URL";
pub const KEY_VAR: &str = "MODEL_KEY";

fn listen_default() -> std::net::SocketAddr {
    std::net::SocketAddr::from(([127, 0, 0, 1], 7071))
}

const fn timeout_secs_default() -> u64 {
    30
}

pub const fn max_body_bytes_default() -> usize {
    2 * 1024 * 1024
}

#[derive(serde::Deserialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Remote,
    Local,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BackendKind::Remote => "remote",
            BackendKind::Local => "local",
        })
    }
}

/// Fallback values for when the environment does not provide them.
#[derive(serde::Deserialize, Clone, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct DownstreamSection {
    pub endpoint_url: Option<String>,
    pub key: Option<String>,
}

#[derive(serde::Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "listen_default")]
    pub listen: std::net::SocketAddr,
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "timeout_secs_default")]
    pub timeout_secs: u64,
    #[serde(default = "max_body_bytes_default")]
    pub max_body_bytes: usize,
    #[serde(default)]
    pub downstream: DownstreamSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: listen_default(),
            backend: BackendKind::default(),
            timeout_secs: timeout_secs_default(),
            max_body_bytes: max_body_bytes_default(),
            downstream: DownstreamSection::default(),
        }
    }
}

impl Config {
    /// Reads `path` if it exists; a missing file means every setting takes its default.
    pub fn load(path: &std::path::Path) -> Result<Self, anyhow::Error> {
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Ok(toml::from_str::<Config>(std::str::from_utf8(&std::fs::read(path)?)?)?)
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

/// Where downstream settings come from. Looked up by environment variable name.
pub type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

fn is_set(v: &String) -> bool {
    !v.trim().is_empty()
}

/// Environment first, then the config file's `[downstream]` table.
pub fn env_then(section: DownstreamSection) -> Lookup {
    layered(|name: &str| std::env::var(name).ok(), section)
}

/// A blank value in `env` does not hide the section's value.
fn layered<E>(env: E, section: DownstreamSection) -> Lookup
where
    E: Fn(&str) -> Option<String> + Send + Sync + 'static,
{
    Box::new(move |name: &str| {
        env(name).filter(is_set).or_else(|| match name {
            ENDPOINT_URL_VAR => section.endpoint_url.clone(),
            KEY_VAR => section.key.clone(),
            _ => None,
        })
    })
}

#[derive(Clone)]
pub struct DownstreamConfig {
    pub endpoint_url: String,
    pub key: String,
}

impl std::fmt::Debug for DownstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownstreamConfig")
            .field("endpoint_url", &self.endpoint_url)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl DownstreamConfig {
    /// Both values must be present and non-empty; otherwise nothing is returned, not even the half that was found.
    pub fn resolve(lookup: &(dyn Fn(&str) -> Option<String> + Send + Sync)) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(is_set);

        let endpoint_url = get(ENDPOINT_URL_VAR);
        let key = get(KEY_VAR);

        match (endpoint_url, key) {
            (Some(endpoint_url), Some(key)) => Ok(Self { endpoint_url, key }),
            (endpoint_url, key) => Err(ConfigError::Missing(
                [(ENDPOINT_URL_VAR, endpoint_url.is_none()), (KEY_VAR, key.is_none())]
                    .into_iter()
                    .filter_map(|(name, missing)| missing.then_some(name))
                    .collect(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&'static str, &'static str)]) -> Lookup {
        let pairs = pairs.to_vec();
        Box::new(move |name: &str| pairs.iter().find(|(k, _)| *k == name).map(|(_, v)| v.to_string()))
    }

    #[test]
    fn test_resolve_both_present() {
        let config = DownstreamConfig::resolve(&*lookup(&[(ENDPOINT_URL_VAR, "http://model/score"), (KEY_VAR, "secret")])).unwrap();
        assert_eq!(config.endpoint_url, "http://model/score");
        assert_eq!(config.key, "secret");
    }

    #[test]
    fn test_resolve_missing_key() {
        let err = DownstreamConfig::resolve(&*lookup(&[(ENDPOINT_URL_VAR, "http://model/score")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(vec![KEY_VAR]));
    }

    #[test]
    fn test_resolve_missing_both() {
        let err = DownstreamConfig::resolve(&*lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(vec![ENDPOINT_URL_VAR, KEY_VAR]));
        assert_eq!(err.to_string(), "missing MODEL_ENDPOINT_URL, MODEL_KEY");
    }

    #[test]
    fn test_resolve_empty_counts_as_missing() {
        let err = DownstreamConfig::resolve(&*lookup(&[(ENDPOINT_URL_VAR, ""), (KEY_VAR, "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(vec![ENDPOINT_URL_VAR, KEY_VAR]));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = DownstreamConfig {
            endpoint_url: "http://model/score".to_string(),
            key: "hunter2".to_string(),
        };
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn test_config_defaults() {
        let config = toml::from_str::<Config>("").unwrap();
        assert_eq!(config.listen, listen_default());
        assert_eq!(config.backend, BackendKind::Remote);
        assert_eq!(config.timeout(), std::time::Duration::from_secs(30));
        assert_eq!(config.max_body_bytes, 2 * 1024 * 1024);
        assert!(config.downstream.endpoint_url.is_none());
    }

    #[test]
    fn test_config_parse() {
        let config = toml::from_str::<Config>(
            r#"
listen = "0.0.0.0:8080"
backend = "local"
timeout_secs = 5
max_body_bytes = 4096

[downstream]
endpoint_url = "http://model/score"
key = "k"
"#,
        )
        .unwrap();
        assert_eq!(config.listen.port(), 8080);
        assert_eq!(config.backend, BackendKind::Local);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.max_body_bytes, 4096);
        assert_eq!(config.downstream.key.as_deref(), Some("k"));
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        assert!(toml::from_str::<Config>("lisen = \"0.0.0.0:1\"").is_err());
    }

    #[test]
    fn test_load_missing_file_defaults() {
        let config = Config::load(std::path::Path::new("/nonexistent/topicd.toml")).unwrap();
        assert_eq!(config.backend, BackendKind::Remote);
    }

    #[test]
    fn test_env_then_falls_back_to_section() {
        let lookup = env_then(DownstreamSection {
            endpoint_url: Some("http://from-file".to_string()),
            key: None,
        });
        if std::env::var(ENDPOINT_URL_VAR).is_err() {
            assert_eq!(lookup(ENDPOINT_URL_VAR).as_deref(), Some("http://from-file"));
        }
        assert_eq!(lookup("TOPICD_UNSET_FOR_TESTS"), None);
    }

    #[test]
    fn test_blank_env_does_not_hide_section() {
        let lookup = layered(
            |name: &str| match name {
                ENDPOINT_URL_VAR => Some("http://from-env/score".to_string()),
                KEY_VAR => Some("   ".to_string()),
                _ => None,
            },
            DownstreamSection {
                endpoint_url: Some("http://from-file/score".to_string()),
                key: Some("file-key".to_string()),
            },
        );
        let config = DownstreamConfig::resolve(&*lookup).unwrap();
        assert_eq!(config.endpoint_url, "http://from-env/score");
        assert_eq!(config.key, "file-key");
    }

    #[test]
    fn test_blank_env_and_no_section_is_missing() {
        let lookup = layered(|_: &str| Some(" \t".to_string()), DownstreamSection::default());
        assert_eq!(DownstreamConfig::resolve(&*lookup).unwrap_err(), ConfigError::Missing(vec![ENDPOINT_URL_VAR, KEY_VAR]));
    }
}
