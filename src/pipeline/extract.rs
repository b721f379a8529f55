use crate::constants::{DEFAULT_IMAGE_PREFIX, NO_IMAGE_SENTINEL};
use crate::error::{EtlError, Result};
use crate::pipeline::clean::clean_text;
use crate::types::{ExtractedStadium, RawCell, RawRow};
use tracing::{debug, info, instrument};

/// Cell index of each field within a data row.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    pub stadium: usize,
    pub capacity: usize,
    pub region: usize,
    pub country: usize,
    pub city: usize,
    pub images: usize,
    pub home_team: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            stadium: 0,
            capacity: 1,
            region: 2,
            country: 3,
            city: 4,
            images: 5,
            home_team: 6,
        }
    }
}

impl ColumnLayout {
    /// Fewest cells a data row may have.
    pub fn required_cells(&self) -> usize {
        [
            self.stadium,
            self.capacity,
            self.region,
            self.country,
            self.city,
            self.images,
            self.home_team,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

pub struct Extractor {
    layout: ColumnLayout,
    image_prefix: String,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ColumnLayout::default(), DEFAULT_IMAGE_PREFIX)
    }
}

impl Extractor {
    pub fn new(layout: ColumnLayout, image_prefix: &str) -> Self {
        Self {
            layout,
            image_prefix: image_prefix.to_string(),
        }
    }

    /// One record per data row; `rank` is the row's position in `rows`.
    ///
    /// Rows without data cells are skipped. A row with some, but too few,
    /// cells aborts the extraction.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn extract(&self, rows: &[RawRow]) -> Result<Vec<ExtractedStadium>> {
        let expected = self.layout.required_cells();
        let mut records = Vec::with_capacity(rows.len());

        for (i, cells) in rows.iter().enumerate() {
            if cells.is_empty() {
                debug!(row = i, "Skipping row without data cells");
                continue;
            }
            if cells.len() < expected {
                return Err(EtlError::MalformedRow {
                    row_index: i,
                    found: cells.len(),
                    expected,
                });
            }
            records.push(self.extract_row(i, cells));
        }

        info!("Extracted {} records", records.len());
        Ok(records)
    }

    fn extract_row(&self, rank: usize, cells: &[RawCell]) -> ExtractedStadium {
        let text = |idx: usize| clean_text(&cells[idx].text);
        let capacity = text(self.layout.capacity).replace(&[',', '.'][..], "");

        ExtractedStadium {
            rank,
            stadium: text(self.layout.stadium),
            capacity,
            region: text(self.layout.region),
            country: text(self.layout.country).trim().to_string(),
            city: text(self.layout.city).trim().to_string(),
            images: Some(self.image_url(&cells[self.layout.images])),
            home_team: text(self.layout.home_team),
        }
    }

    fn image_url(&self, cell: &RawCell) -> String {
        match cell.image_src.as_deref() {
            // Protocol-relative sources already carry the `//`
            Some(src) if src.starts_with("//") => {
                format!("{}{}", self.image_prefix.trim_end_matches('/'), src)
            }
            Some(src) => format!("{}{}", self.image_prefix, src),
            None => NO_IMAGE_SENTINEL.to_string(),
        }
    }
}
