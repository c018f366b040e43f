use crate::config::defaults;
use crate::model::Field;
use serde::Deserialize;

/// Main configuration structure for Prospect-Harvest
///
/// Loaded fresh for every run; a run never observes a config change midway.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub address: AddressConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub targets: Vec<TargetEntry>,
}

/// Network fetch behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FetcherConfig {
    /// Global admission rate shared by every fetch in a run
    pub requests_per_second: f64,

    /// Per-request timeout (seconds)
    #[serde(default = "defaults::timeout_seconds")]
    pub timeout_seconds: u64,

    /// User agents rotated uniformly at random
    #[serde(default = "defaults::user_agents")]
    pub user_agents: Vec<String>,

    /// Extra attempts for transient failures (0 disables retrying)
    #[serde(default)]
    pub max_retries: u32,

    /// Base backoff between attempts (milliseconds), multiplied by the attempt number
    #[serde(default = "defaults::retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

/// Orchestration behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineConfig {
    /// Maximum number of fetch/extract tasks in flight
    #[serde(default = "defaults::max_concurrency")]
    pub max_concurrency: usize,

    /// Compare dedup keys in canonical URL form instead of exact strings
    #[serde(default)]
    pub canonicalize_urls: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: defaults::max_concurrency(),
            canonicalize_urls: false,
        }
    }
}

/// One `{label → field}` row of the extraction table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelRule {
    pub label: String,
    pub field: Field,
}

impl LabelRule {
    pub fn new(label: &str, field: Field) -> Self {
        Self {
            label: label.to_string(),
            field,
        }
    }
}

/// Field extraction heuristics
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtractorConfig {
    /// Class names / ids that mark a company-information block
    #[serde(default = "defaults::info_block_keywords")]
    pub info_block_keywords: Vec<String>,

    /// Substrings of a link's href or text that mark a contact page
    #[serde(default = "defaults::contact_keywords")]
    pub contact_keywords: Vec<String>,

    /// Line label table
    #[serde(default = "defaults::label_rules")]
    pub labels: Vec<LabelRule>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            info_block_keywords: defaults::info_block_keywords(),
            contact_keywords: defaults::contact_keywords(),
            labels: defaults::label_rules(),
        }
    }
}

/// Address normalization tables
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AddressConfig {
    /// Known region names, in priority order
    #[serde(default = "defaults::regions")]
    pub regions: Vec<String>,

    /// Suffixes that terminate a locality (city/ward/town/village)
    #[serde(default = "defaults::locality_suffixes")]
    pub locality_suffixes: Vec<String>,
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            regions: defaults::regions(),
            locality_suffixes: defaults::locality_suffixes(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite database backing the company store
    #[serde(default = "defaults::database_path")]
    pub database_path: String,

    /// Path to the markdown run report
    #[serde(default = "defaults::report_path")]
    pub report_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: defaults::database_path(),
            report_path: defaults::report_path(),
        }
    }
}

/// Candidate URLs grouped under a search keyword
#[derive(Debug, Clone, Deserialize)]
pub struct TargetEntry {
    pub keyword: String,
    pub urls: Vec<String>,
}
