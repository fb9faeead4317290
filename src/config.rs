use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use dartdex_core::postprocess::HeaderMode;
use dartdex_core::resolve::{ResolveOptions, DEFAULT_FUZZY_CANDIDATES, DEFAULT_FUZZY_THRESHOLD};
use dartdex_core::Period;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub periods: PeriodsConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// Root of the `{year}/Q{quarter}/companies` tree.
    pub base_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PeriodsConfig {
    #[serde(default = "default_years")]
    pub years: Vec<i32>,
    #[serde(default = "default_quarters")]
    pub quarters: Vec<u8>,
}

impl Default for PeriodsConfig {
    fn default() -> Self {
        Self {
            years: default_years(),
            quarters: default_quarters(),
        }
    }
}

fn default_years() -> Vec<i32> {
    vec![2022, 2023, 2024, 2025]
}
fn default_quarters() -> Vec<u8> {
    vec![1, 2, 3, 4]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResolverConfig {
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
    #[serde(default = "default_fuzzy_candidates")]
    pub fuzzy_candidates: usize,
    #[serde(default)]
    pub header_mode: HeaderMode,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
            fuzzy_candidates: default_fuzzy_candidates(),
            header_mode: HeaderMode::default(),
        }
    }
}

fn default_fuzzy_threshold() -> f64 {
    DEFAULT_FUZZY_THRESHOLD
}
fn default_fuzzy_candidates() -> usize {
    DEFAULT_FUZZY_CANDIDATES
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    #[serde(default = "default_index_enabled")]
    pub enabled: bool,
    /// Seconds before a period listing is rebuilt. `0` keeps it until invalidated.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            enabled: default_index_enabled(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_index_enabled() -> bool {
    true
}
fn default_ttl_secs() -> u64 {
    300
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

impl Config {
    /// Defaults for everything except the data root.
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            data: DataConfig {
                base_path: base_path.into(),
            },
            periods: PeriodsConfig::default(),
            resolver: ResolverConfig::default(),
            index: IndexConfig::default(),
            server: ServerConfig::default(),
        }
    }

    /// The bounded set of periods scanned by report enumeration, oldest first.
    pub fn period_grid(&self) -> Vec<Period> {
        let mut grid = Period::grid(&self.periods.years, &self.periods.quarters);
        grid.sort();
        grid.dedup();
        grid
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            fuzzy_threshold: self.resolver.fuzzy_threshold,
            fuzzy_candidates: self.resolver.fuzzy_candidates,
            allow_fuzzy: true,
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    // Validate periods
    if config.periods.years.is_empty() {
        anyhow::bail!("periods.years must not be empty");
    }
    if config.periods.quarters.is_empty() {
        anyhow::bail!("periods.quarters must not be empty");
    }
    if let Some(q) = config.periods.quarters.iter().find(|q| !(1..=4).contains(*q)) {
        anyhow::bail!("periods.quarters must be within 1..=4, got {}", q);
    }
    if let Some(y) = config.periods.years.iter().find(|y| **y <= 0) {
        anyhow::bail!("periods.years must be positive, got {}", y);
    }

    // Validate resolver
    if !(0.0..=1.0).contains(&config.resolver.fuzzy_threshold) {
        anyhow::bail!("resolver.fuzzy_threshold must be in [0.0, 1.0]");
    }
    if config.resolver.fuzzy_candidates == 0 {
        anyhow::bail!("resolver.fuzzy_candidates must be >= 1");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let f = write_config("[data]\nbase_path = \"/srv/dart_api_data\"\n");
        let cfg = load_config(f.path()).unwrap();
        assert_eq!(cfg.data.base_path, PathBuf::from("/srv/dart_api_data"));
        assert_eq!(cfg.periods.years, vec![2022, 2023, 2024, 2025]);
        assert_eq!(cfg.resolver.fuzzy_threshold, 0.5);
        assert_eq!(cfg.resolver.fuzzy_candidates, 5);
        assert_eq!(cfg.resolver.header_mode, HeaderMode::Union);
        assert!(cfg.index.enabled);
        assert_eq!(cfg.server.bind, "127.0.0.1:7340");
        assert_eq!(cfg.period_grid().len(), 16);
    }

    #[test]
    fn test_full_config() {
        let f = write_config(
            r#"
[data]
base_path = "./data"

[periods]
years = [2025, 2024]
quarters = [1, 2]

[resolver]
fuzzy_threshold = 0.6
fuzzy_candidates = 3
header_mode = "first_row"

[index]
enabled = false
ttl_secs = 0

[server]
bind = "0.0.0.0:9000"
"#,
        );
        let cfg = load_config(f.path()).unwrap();
        assert_eq!(cfg.resolver.header_mode, HeaderMode::FirstRow);
        assert!(!cfg.index.enabled);
        let grid: Vec<String> = cfg.period_grid().iter().map(|p| p.to_string()).collect();
        assert_eq!(grid, vec!["2024Q1", "2024Q2", "2025Q1", "2025Q2"]);
        let opts = cfg.resolve_options();
        assert_eq!(opts.fuzzy_threshold, 0.6);
        assert_eq!(opts.fuzzy_candidates, 3);
    }

    #[test]
    fn test_rejects_bad_quarter() {
        let f = write_config("[data]\nbase_path = \"d\"\n[periods]\nquarters = [1, 5]\n");
        let err = load_config(f.path()).unwrap_err();
        assert!(err.to_string().contains("quarters"));
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let f = write_config("[data]\nbase_path = \"d\"\n[resolver]\nfuzzy_threshold = 1.5\n");
        assert!(load_config(f.path()).is_err());
    }

    #[test]
    fn test_example_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/dartdex.example.toml");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.index.ttl_secs, 300);
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = load_config(Path::new("/nonexistent/dartdex.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
