use crate::constants::{NO_IMAGE_SENTINEL, NO_IMAGE_URL};
use crate::error::{EtlError, Result};
use crate::types::{ExtractedStadium, ResultTable, StadiumRecord};
use tracing::{info, instrument};

/// Substitutes the placeholder image and coerces capacity. Order is preserved.
#[instrument(skip(records), fields(records = records.len()))]
pub fn transform(records: Vec<ExtractedStadium>) -> Result<ResultTable> {
    let mut placeholders = 0usize;
    let table = records
        .into_iter()
        .map(|record| {
            let capacity = parse_capacity(&record.capacity).ok_or_else(|| {
                EtlError::InvalidCapacity {
                    rank: record.rank,
                    value: record.capacity.clone(),
                }
            })?;
            let images = match record.images {
                Some(url) if !url.is_empty() && url != NO_IMAGE_SENTINEL => url,
                _ => {
                    placeholders += 1;
                    NO_IMAGE_URL.to_string()
                }
            };
            Ok(StadiumRecord {
                rank: record.rank,
                stadium: record.stadium,
                capacity,
                region: record.region,
                country: record.country,
                city: record.city,
                images,
                home_team: record.home_team,
            })
        })
        .collect::<Result<ResultTable>>()?;

    info!("Transformed {} records ({} without image)", table.len(), placeholders);
    Ok(table)
}

fn parse_capacity(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
