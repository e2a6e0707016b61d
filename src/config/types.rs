use serde::{Deserialize, Serialize};

/// Main configuration structure, loaded from `.syncable.toml` (local then global).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub server: ServerConfig,
    #[serde(default, flatten)]
    pub extra: std::collections::HashMap<String, toml::Value>,
}

/// Analysis configuration (shared with the `analyze_repository` tool body).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub include_dev_dependencies: bool,
    pub deep_analysis: bool,
    pub ignore_patterns: Vec<String>,
    pub max_file_size: usize,
}

/// Server-specific overrides: per-category timeouts, generation attempt
/// budget, and scanner defaults. See SPEC_FULL.md §1.1 and §5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Default timeout (seconds) for tool categories not listed explicitly.
    pub default_timeout_secs: u64,
    /// Scan-category timeout (seconds); spec default: 15 minutes.
    pub scan_timeout_secs: u64,
    /// Verify-category timeout (seconds).
    pub verify_timeout_secs: u64,
    /// Max attempts `N` for the generate-validate-critique engine (§4.I).
    pub max_generation_attempts: u32,
    /// Scanner file walker: included globs.
    pub scan_include_globs: Vec<String>,
    /// Scanner file walker: excluded globs.
    pub scan_exclude_globs: Vec<String>,
    /// Per-file size cap (bytes) for the scanner walker.
    pub scan_max_file_size: usize,
    /// Entropy-based secret detection; off by default per §4.K.
    pub scan_include_high_entropy: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig {
                include_dev_dependencies: false,
                deep_analysis: true,
                ignore_patterns: vec![
                    "node_modules".to_string(),
                    ".git".to_string(),
                    "target".to_string(),
                    "build".to_string(),
                ],
                max_file_size: 1024 * 1024,
            },
            server: ServerConfig::default(),
            extra: Default::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: 5 * 60,
            scan_timeout_secs: 15 * 60,
            verify_timeout_secs: 10 * 60,
            max_generation_attempts: 3,
            scan_include_globs: vec!["**/*".to_string()],
            scan_exclude_globs: vec![
                "**/.git/**".to_string(),
                "**/node_modules/**".to_string(),
                "**/target/**".to_string(),
            ],
            scan_max_file_size: 5 * 1024 * 1024,
            scan_include_high_entropy: false,
        }
    }
}
