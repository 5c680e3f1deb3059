use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_CACHE_SIZE_MB: u64 = 256;
const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub listen_addr: Option<String>,
    pub thread_count: Option<usize>,
    pub content_root: Option<PathBuf>,
    pub cache_size_mb: Option<u64>,
    pub render_timeout_secs: Option<u64>,
    pub max_concurrent_renders: Option<usize>,
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let path = if std::path::Path::new("tacmap.toml").exists() {
            "tacmap.toml"
        } else if std::path::Path::new("tacmap.example.toml").exists() {
            "tacmap.example.toml"
        } else {
            return Err(anyhow::anyhow!("Configuration file not found. Please create tacmap.toml or provide tacmap.example.toml."));
        };

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn listen_addr(&self) -> &str {
        self.listen_addr.as_deref().unwrap_or(DEFAULT_LISTEN_ADDR)
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count.unwrap_or_else(num_cpus::get).max(1)
    }

    pub fn content_root(&self) -> PathBuf {
        self.content_root.clone().unwrap_or_else(|| PathBuf::from("public"))
    }

    pub fn cache_size_mb(&self) -> u64 {
        self.cache_size_mb.unwrap_or(DEFAULT_CACHE_SIZE_MB)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs.unwrap_or(DEFAULT_RENDER_TIMEOUT_SECS))
    }

    pub fn max_concurrent_renders(&self) -> usize {
        self.max_concurrent_renders.unwrap_or_else(num_cpus::get).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
        assert_eq!(config.content_root(), PathBuf::from("public"));
        assert_eq!(config.cache_size_mb(), 256);
        assert_eq!(config.render_timeout(), Duration::from_secs(30));
        assert!(config.thread_count() >= 1);
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = Config::from_toml_str(
            r#"
            listen_addr = "127.0.0.1:8080"
            content_root = "/srv/tacmap"
            cache_size_mb = 0
            render_timeout_secs = 5
            thread_count = 2
            max_concurrent_renders = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
        assert_eq!(config.content_root(), PathBuf::from("/srv/tacmap"));
        assert_eq!(config.cache_size_mb(), 0);
        assert_eq!(config.render_timeout(), Duration::from_secs(5));
        assert_eq!(config.thread_count(), 2);
        assert_eq!(config.max_concurrent_renders(), 1);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml_str("cache_size_gb = 10").is_err());
    }
}
