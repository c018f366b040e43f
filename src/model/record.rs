use crate::model::fields::{ExtractedFields, Field};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A free-text address decomposed into fixed components
///
/// All components are plain strings; an absent component is `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedAddress {
    pub postal_code: String,
    pub region: String,
    pub locality: String,
    pub remainder: String,
}

impl NormalizedAddress {
    /// Returns true if every component is empty
    pub fn is_empty(&self) -> bool {
        self.postal_code.is_empty()
            && self.region.is_empty()
            && self.locality.is_empty()
            && self.remainder.is_empty()
    }
}

/// A persistence-ready company record
///
/// Built once by the coordinator after a candidate passes validation and
/// deduplication. Later edits belong to the external CRUD layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyRecord {
    /// The candidate URL as submitted
    pub url: String,
    /// Key the store deduplicates on; equals `url` unless canonicalization is on
    pub dedup_key: String,
    /// The URL the page was actually served from, after redirects
    pub source_url: String,
    pub company_name: String,
    pub address: String,
    pub postal_code: String,
    pub region: String,
    pub locality: String,
    pub remainder: String,
    pub tel: String,
    pub fax: String,
    pub representative: String,
    pub business_description: String,
    pub established_date: String,
    pub capital: String,
    pub contact_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompanyRecord {
    pub fn new(
        url: &str,
        dedup_key: &str,
        source_url: &str,
        fields: &ExtractedFields,
        address: NormalizedAddress,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            url: url.to_string(),
            dedup_key: dedup_key.to_string(),
            source_url: source_url.to_string(),
            company_name: fields.get(Field::CompanyName).to_string(),
            address: fields.get(Field::Address).to_string(),
            postal_code: address.postal_code,
            region: address.region,
            locality: address.locality,
            remainder: address.remainder,
            tel: fields.get(Field::Tel).to_string(),
            fax: fields.get(Field::Fax).to_string(),
            representative: fields.get(Field::Representative).to_string(),
            business_description: fields.get(Field::BusinessDescription).to_string(),
            established_date: fields.get(Field::EstablishedDate).to_string(),
            capital: fields.get(Field::Capital).to_string(),
            contact_url: fields.get(Field::ContactUrl).to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The address components as a [`NormalizedAddress`]
    pub fn normalized_address(&self) -> NormalizedAddress {
        NormalizedAddress {
            postal_code: self.postal_code.clone(),
            region: self.region.clone(),
            locality: self.locality.clone(),
            remainder: self.remainder.clone(),
        }
    }
}
