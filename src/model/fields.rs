use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Semantic company fields the extractor knows how to fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    CompanyName,
    Address,
    Tel,
    Fax,
    Representative,
    BusinessDescription,
    EstablishedDate,
    Capital,
    ContactUrl,
}

impl Field {
    /// Every field, in the order records present them
    pub const ALL: [Field; 9] = [
        Field::CompanyName,
        Field::Address,
        Field::Tel,
        Field::Fax,
        Field::Representative,
        Field::BusinessDescription,
        Field::EstablishedDate,
        Field::Capital,
        Field::ContactUrl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::CompanyName => "company_name",
            Field::Address => "address",
            Field::Tel => "tel",
            Field::Fax => "fax",
            Field::Representative => "representative",
            Field::BusinessDescription => "business_description",
            Field::EstablishedDate => "established_date",
            Field::Capital => "capital",
            Field::ContactUrl => "contact_url",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best-effort field values pulled out of one page
///
/// Unmatched fields read back as empty strings; callers never see a
/// missing/present distinction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    values: BTreeMap<Field, String>,
    notes: Vec<String>,
}

impl ExtractedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `field`, or `""` when nothing matched
    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn is_filled(&self, field: Field) -> bool {
        !self.get(field).is_empty()
    }

    /// Stores `value` unless the field already holds a non-empty value
    ///
    /// Returns `true` when the value was stored. Blank values are ignored.
    pub fn fill(&mut self, field: Field, value: impl Into<String>) -> bool {
        let value = value.into();
        let value = value.trim();
        if value.is_empty() || self.is_filled(field) {
            return false;
        }
        self.values.insert(field, value.to_string());
        true
    }

    /// Returns true if no field holds a value
    pub fn is_empty(&self) -> bool {
        self.values.values().all(|v| v.is_empty())
    }

    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Internal notes recorded while extracting (e.g. an empty document)
    pub fn notes(&self) -> &[String] {
        &self.notes
    }
}
