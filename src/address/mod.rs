//! Address normalization
//!
//! Splits a free-text address into postal code, region, locality and the
//! remaining detail. This is a heuristic over configured tables, not a
//! geocoder: odd input degrades to partial results and never fails.

use crate::config::AddressConfig;
use crate::model::NormalizedAddress;
use regex::Regex;
use std::sync::LazyLock;

/// Optional `〒` marker, 3 digits, optional separator, 4 digits
static POSTAL_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"〒?\s*(?P<code>\d{3}[-‐－−ー]?\d{4})").expect("valid postal code regex")
});

/// Decomposes addresses using a region priority list and locality suffixes
#[derive(Debug, Clone)]
pub struct AddressNormalizer {
    /// Longest names first; configured order breaks ties
    regions: Vec<String>,
    locality_suffixes: Vec<String>,
}

impl AddressNormalizer {
    pub fn new(config: &AddressConfig) -> Self {
        Self::from_tables(&config.regions, &config.locality_suffixes)
    }

    pub fn from_tables(regions: &[String], locality_suffixes: &[String]) -> Self {
        let mut regions: Vec<String> = regions
            .iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        // Stable sort keeps configured priority among equal lengths
        regions.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

        let locality_suffixes = locality_suffixes
            .iter()
            .filter(|s| !s.is_empty())
            .cloned()
            .collect();

        Self {
            regions,
            locality_suffixes,
        }
    }

    /// Normalizes one address string
    ///
    /// # Algorithm
    ///
    /// 1. Capture and remove a postal code
    /// 2. Split at the first known region name (longest names tried first)
    /// 3. Take the leading run ending in a locality suffix as the locality
    /// 4. Everything left over is the remainder
    ///
    /// Text found before the region name is kept at the front of the
    /// remainder. Reading the components in field order then puts that text
    /// after the region and locality, so the original word order is not
    /// preserved in that case; no characters are dropped. Without a region,
    /// the whole text is the remainder.
    ///
    /// # Example
    ///
    /// ```
    /// use prospect_harvest::address::AddressNormalizer;
    /// use prospect_harvest::config::AddressConfig;
    ///
    /// let normalizer = AddressNormalizer::new(&AddressConfig::default());
    /// let address = normalizer.normalize("〒100-0001 東京都千代田区千代田1-1");
    /// assert_eq!(address.postal_code, "100-0001");
    /// assert_eq!(address.region, "東京都");
    /// assert_eq!(address.locality, "千代田区");
    /// assert_eq!(address.remainder, "千代田1-1");
    /// ```
    pub fn normalize(&self, address: &str) -> NormalizedAddress {
        let mut normalized = NormalizedAddress::default();

        let address = address.trim();
        if address.is_empty() {
            return normalized;
        }

        let working = match find_postal_code(address) {
            Some(found) => {
                normalized.postal_code = found.code;
                format!("{}{}", &address[..found.start], &address[found.end..])
            }
            None => address.to_string(),
        };
        let working = working.trim();

        let Some((region, position)) = self.find_region(working) else {
            normalized.remainder = working.to_string();
            return normalized;
        };

        let leading = working[..position].trim();
        let after = working[position + region.len()..].trim();
        normalized.region = region.to_string();

        let detail = match self.find_locality_end(after) {
            Some(end) => {
                normalized.locality = after[..end].to_string();
                after[end..].trim()
            }
            None => after,
        };

        normalized.remainder = match (leading.is_empty(), detail.is_empty()) {
            (true, _) => detail.to_string(),
            (false, true) => leading.to_string(),
            (false, false) => format!("{} {}", leading, detail),
        };

        normalized
    }

    /// Finds the first region (in priority order) present in `text`
    fn find_region<'a>(&'a self, text: &str) -> Option<(&'a str, usize)> {
        self.regions
            .iter()
            .find_map(|region| text.find(region.as_str()).map(|pos| (region.as_str(), pos)))
    }

    /// Byte offset just past the earliest locality suffix that ends a non-empty run
    ///
    /// A suffix at the very start of `text` means there is no locality, the
    /// same as a text with no suffix at all.
    fn find_locality_end(&self, text: &str) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;

        for suffix in &self.locality_suffixes {
            let Some(pos) = text
                .match_indices(suffix.as_str())
                .map(|(pos, _)| pos)
                .find(|&pos| suffix_has_boundary(text, pos + suffix.len(), suffix))
            else {
                continue;
            };

            let better = match best {
                None => true,
                Some((best_pos, best_len)) => {
                    pos < best_pos || (pos == best_pos && suffix.len() > best_len)
                }
            };
            if better {
                best = Some((pos, suffix.len()));
            }
        }

        match best {
            Some((0, _)) | None => None,
            Some((pos, len)) => Some(pos + len),
        }
    }
}

impl Default for AddressNormalizer {
    fn default() -> Self {
        Self::new(&AddressConfig::default())
    }
}

struct PostalMatch {
    code: String,
    start: usize,
    end: usize,
}

/// Finds a postal code that is not part of a longer digit run
fn find_postal_code(text: &str) -> Option<PostalMatch> {
    POSTAL_CODE_RE.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let code = caps.name("code")?;

        let digit_before = text[..code.start()]
            .chars()
            .next_back()
            .is_some_and(char::is_numeric);
        let digit_after = text[code.end()..]
            .chars()
            .next()
            .is_some_and(char::is_numeric);
        if digit_before || digit_after {
            return None;
        }

        Some(PostalMatch {
            code: code.as_str().to_string(),
            start: whole.start(),
            end: whole.end(),
        })
    })
}

/// Romanized suffixes such as `-cho` must not run into a longer word (`-chome`)
fn suffix_has_boundary(text: &str, end: usize, suffix: &str) -> bool {
    let ends_in_latin = suffix.chars().next_back().is_some_and(|c| c.is_ascii_alphabetic());
    if !ends_in_latin {
        return true;
    }
    !text[end..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric())
}
