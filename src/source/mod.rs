//! Candidate URL sources
//!
//! A source turns a search keyword into candidate company page URLs. Search
//! engine integrations live outside this crate; [`StaticSource`] serves the
//! `[[targets]]` lists from the configuration file.

use crate::config::TargetEntry;
use crate::HarvestError;
use async_trait::async_trait;

/// Produces candidate URLs for a keyword
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Returns candidate URLs for `keyword`, possibly none
    async fn search(&self, keyword: &str) -> Result<Vec<String>, HarvestError>;
}

/// Serves fixed keyword → URL lists
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    targets: Vec<TargetEntry>,
}

impl StaticSource {
    pub fn new(targets: Vec<TargetEntry>) -> Self {
        Self { targets }
    }

    /// Every keyword, in configured order, without repeats
    pub fn keywords(&self) -> Vec<String> {
        let mut keywords: Vec<String> = Vec::new();
        for target in &self.targets {
            if !keywords.iter().any(|k| same_keyword(k, &target.keyword)) {
                keywords.push(target.keyword.clone());
            }
        }
        keywords
    }

    /// URLs of every entry whose keyword matches, case-insensitively
    pub fn urls_for(&self, keyword: &str) -> Vec<String> {
        self.targets
            .iter()
            .filter(|target| same_keyword(&target.keyword, keyword))
            .flat_map(|target| target.urls.iter().cloned())
            .collect()
    }
}

fn same_keyword(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[async_trait]
impl CandidateSource for StaticSource {
    async fn search(&self, keyword: &str) -> Result<Vec<String>, HarvestError> {
        let urls = self.urls_for(keyword);
        tracing::debug!("Static source: {} URL(s) for '{}'", urls.len(), keyword);
        Ok(urls)
    }
}
