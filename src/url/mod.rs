//! URL handling module for Prospect-Harvest
//!
//! Candidate validation and the optional canonical dedup key.

mod normalize;

pub use normalize::{canonical_key, validate_url};

/// Builds the dedup key for a candidate URL
///
/// With `canonicalize` off the key is the exact input string. With it on, the
/// canonical form is used, falling back to the exact string when the URL does
/// not parse (validation reports that case separately).
pub fn dedup_key(url: &str, canonicalize: bool) -> String {
    if canonicalize {
        canonical_key(url).unwrap_or_else(|_| url.to_string())
    } else {
        url.to_string()
    }
}
