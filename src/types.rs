use serde::{Deserialize, Serialize};

/// HTML text as returned by the fetcher.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub url: String,
    pub html: String,
}

/// One `<td>` reduced to what the extractor needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCell {
    /// Concatenated descendant text, exactly as parsed.
    pub text: String,
    /// `src` of the first `<img>` inside the cell, if any.
    pub image_src: Option<String>,
}

impl RawCell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image_src: None,
        }
    }
}

/// Data cells of one table row in document order. Header rows have none.
pub type RawRow = Vec<RawCell>;

/// A record as produced by the extractor, before type coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedStadium {
    pub rank: usize,
    pub stadium: String,
    /// Cleaned digits with thousands separators removed; validated by the transformer.
    pub capacity: String,
    pub region: String,
    pub country: String,
    pub city: String,
    /// Image URL or the `NO_IMAGE` sentinel.
    #[serde(default)]
    pub images: Option<String>,
    pub home_team: String,
}

/// Final row written to the CSV. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StadiumRecord {
    pub rank: usize,
    pub stadium: String,
    pub capacity: u64,
    pub region: String,
    pub country: String,
    pub city: String,
    pub images: String,
    pub home_team: String,
}

pub type ResultTable = Vec<StadiumRecord>;
