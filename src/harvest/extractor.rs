//! Company field extraction from page markup
//!
//! This module pulls company data out of arbitrary HTML:
//! - Company name from `<title>`, falling back to the first `<h1>`
//! - Labelled fields from "company info" blocks, matched against a label table
//! - A contact page link, resolved to an absolute URL
//!
//! Extraction is best effort and deterministic. Malformed or empty markup
//! produces empty fields, never an error.

use crate::config::{ExtractorConfig, LabelRule};
use crate::model::{ExtractedFields, Field};
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

/// Elements whose opening starts a new text line
const LINE_BREAKING_ELEMENTS: &[&str] = &[
    "address", "article", "br", "dd", "div", "dl", "dt", "h1", "h2", "h3", "h4", "h5", "h6",
    "li", "ol", "p", "section", "table", "tbody", "td", "th", "tr", "ul",
];

/// Heuristic field extractor configured by keyword and label tables
#[derive(Debug, Clone)]
pub struct Extractor {
    info_block_keywords: Vec<String>,
    contact_keywords: Vec<String>,
    /// Longest labels first, so `telephone` is tried before `tel`
    labels: Vec<LabelRule>,
}

impl Extractor {
    pub fn new(config: &ExtractorConfig) -> Self {
        let mut labels: Vec<LabelRule> = config
            .labels
            .iter()
            .filter(|rule| !rule.label.trim().is_empty())
            .map(|rule| LabelRule {
                label: rule.label.trim().to_string(),
                field: rule.field,
            })
            .collect();
        labels.sort_by(|a, b| b.label.chars().count().cmp(&a.label.chars().count()));

        Self {
            info_block_keywords: config.info_block_keywords.clone(),
            contact_keywords: config
                .contact_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            labels,
        }
    }

    /// Extracts company fields from a page
    ///
    /// # Arguments
    ///
    /// * `markup` - The page body
    /// * `source_url` - The URL the page was served from, used to resolve links
    ///
    /// # Returns
    ///
    /// The fields that matched. Unmatched fields read as `""`.
    ///
    /// # Example
    ///
    /// ```
    /// use prospect_harvest::config::ExtractorConfig;
    /// use prospect_harvest::{Extractor, Field};
    ///
    /// let extractor = Extractor::new(&ExtractorConfig::default());
    /// let html = r#"<title>Acme Inc</title>
    ///     <div class="company-info"><p>TEL: 03-0000-0000</p></div>"#;
    /// let fields = extractor.extract(html, "https://a.example/");
    /// assert_eq!(fields.get(Field::CompanyName), "Acme Inc");
    /// assert_eq!(fields.get(Field::Tel), "03-0000-0000");
    /// ```
    pub fn extract(&self, markup: &str, source_url: &str) -> ExtractedFields {
        let mut fields = ExtractedFields::new();

        if markup.trim().is_empty() {
            fields.add_note("empty document");
            return fields;
        }

        let document = Html::parse_document(markup);

        if let Some(name) = extract_company_name(&document) {
            fields.fill(Field::CompanyName, name);
        }

        let blocks = self.info_blocks(&document);
        if blocks.is_empty() {
            fields.add_note("no company info block found");
        }
        for block in blocks {
            for line in block_lines(block) {
                self.apply_line(&line, &mut fields);
            }
        }

        if !fields.is_filled(Field::ContactUrl) {
            if let Some(contact) = self.find_contact_link(&document, source_url) {
                fields.fill(Field::ContactUrl, contact);
            }
        }

        tracing::debug!(
            "Extracted {} field(s) from {}",
            Field::ALL.iter().filter(|f| fields.is_filled(**f)).count(),
            source_url
        );

        fields
    }

    /// Elements tagged as company info, in keyword order then document order
    fn info_blocks<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        let Ok(selector) = Selector::parse("[class], [id]") else {
            return Vec::new();
        };

        let mut blocks: Vec<ElementRef<'a>> = Vec::new();
        for keyword in &self.info_block_keywords {
            for element in document.select(&selector) {
                let value = element.value();
                let matches = value.classes().any(|class| class == keyword)
                    || value.id() == Some(keyword.as_str());
                if matches && !blocks.iter().any(|b| b.id() == element.id()) {
                    blocks.push(element);
                }
            }
        }
        blocks
    }

    /// Fills at most one field from a `label: value` line
    fn apply_line(&self, line: &str, fields: &mut ExtractedFields) {
        for rule in &self.labels {
            if let Some(value) = strip_label(line, &rule.label) {
                fields.fill(rule.field, value);
                return;
            }
        }
    }

    /// First link whose href or text mentions a contact keyword
    fn find_contact_link(&self, document: &Html, source_url: &str) -> Option<String> {
        let selector = Selector::parse("a[href]").ok()?;
        let base_url = Url::parse(source_url).ok();

        document.select(&selector).find_map(|element| {
            let href = element.value().attr("href")?;
            let text = collapse_whitespace(&element.text().collect::<String>()).to_lowercase();
            let href_lower = href.to_lowercase();

            let mentions_contact = self
                .contact_keywords
                .iter()
                .any(|k| href_lower.contains(k.as_str()) || text.contains(k.as_str()));
            if !mentions_contact {
                return None;
            }

            resolve_link(href, base_url.as_ref())
        })
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(&ExtractorConfig::default())
    }
}

/// Title text, or the first `<h1>` when the title is missing or blank
fn extract_company_name(document: &Html) -> Option<String> {
    let from = |css: &str| -> Option<String> {
        let selector = Selector::parse(css).ok()?;
        document
            .select(&selector)
            .map(|element| collapse_whitespace(&element.text().collect::<String>()))
            .find(|text| !text.is_empty())
    };

    from("title").or_else(|| from("h1"))
}

/// Candidate lines of an info block
///
/// Table rows and definition lists come first, rendered as `label: value`,
/// then the block's own text split into lines.
fn block_lines(block: ElementRef<'_>) -> Vec<String> {
    let mut lines = Vec::new();

    if let (Ok(row_selector), Ok(cell_selector)) =
        (Selector::parse("tr"), Selector::parse("th, td"))
    {
        for row in block.select(&row_selector) {
            let cells: Vec<String> = row
                .select(&cell_selector)
                .map(|cell| collapse_whitespace(&cell.text().collect::<String>()))
                .filter(|text| !text.is_empty())
                .collect();
            match cells.split_first() {
                Some((header, rest)) if !rest.is_empty() => {
                    lines.push(format!("{}: {}", header, rest.join(" ")));
                }
                Some((only, _)) => lines.push(only.clone()),
                None => {}
            }
        }
    }

    if let Ok(term_selector) = Selector::parse("dt") {
        for term in block.select(&term_selector) {
            let term_text = collapse_whitespace(&term.text().collect::<String>());
            let definition = term
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .next()
                .filter(|sibling| sibling.value().name() == "dd")
                .map(|dd| collapse_whitespace(&dd.text().collect::<String>()));

            if let Some(definition) = definition {
                if !term_text.is_empty() && !definition.is_empty() {
                    lines.push(format!("{}: {}", term_text, definition));
                }
            }
        }
    }

    lines.extend(text_lines(block));
    lines
}

/// Text of an element split at `<br>` and block-level element boundaries
fn text_lines(element: ElementRef<'_>) -> Vec<String> {
    let mut buffer = String::new();

    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => buffer.push_str(text),
            Node::Element(el) if LINE_BREAKING_ELEMENTS.contains(&el.name()) => {
                buffer.push('\n');
            }
            _ => {}
        }
    }

    buffer
        .lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Matches `label` at the start of `line` and returns the trimmed value
///
/// The label compares case-insensitively, with full-width ASCII folded to
/// half-width. It must be followed by a separator or the end of the line;
/// a value of only separators is empty.
fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let mut chars = line.char_indices();
    for expected in label.chars() {
        let (_, actual) = chars.next()?;
        if fold_char(actual) != fold_char(expected) {
            return None;
        }
    }

    let rest = match chars.next() {
        Some((index, _)) => &line[index..],
        None => return Some(""),
    };

    match rest.chars().next() {
        Some(c) if is_separator(c) => Some(rest.trim_matches(is_separator)),
        _ => None,
    }
}

fn is_separator(c: char) -> bool {
    c == ':' || c == '：' || c.is_whitespace()
}

/// Lowercases and maps full-width ASCII (U+FF01..U+FF5E) to half-width
fn fold_char(c: char) -> char {
    let c = if ('\u{FF01}'..='\u{FF5E}').contains(&c) {
        char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
    } else {
        c
    };
    c.to_lowercase().next().unwrap_or(c)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves a link href to an absolute http(s) URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Relative links with no usable base
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: Option<&Url>) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute = match base_url {
        Some(base) => base.join(href).ok()?,
        None => Url::parse(href).ok()?,
    };

    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }

    Some(absolute.to_string())
}
