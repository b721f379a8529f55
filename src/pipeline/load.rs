use crate::app::ports::ObjectStorePort;
use crate::constants::{BLOB_NAME_STEM, CSV_CONTENT_TYPE, CSV_HEADERS};
use crate::error::{EtlError, Result};
use crate::types::StadiumRecord;
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

/// Where the CSV lands: `{container}/{prefix}/{blob}`.
#[derive(Debug, Clone)]
pub struct Destination {
    pub container: String,
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub container: String,
    pub blob_name: String,
    pub bytes: usize,
    pub sha256: String,
}

/// CSV with a header row, standard quoting, UTF-8.
pub fn to_csv(table: &[StadiumRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;
    for record in table {
        writer.serialize(record)?;
    }
    writer.into_inner().map_err(|e| EtlError::Io(e.into_error()))
}

/// `stadium_cleaned_<date>_<time>.csv` under `prefix`, with `:` in the time replaced by `_`.
pub fn blob_name<Tz: TimeZone>(prefix: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let file_name = format!(
        "{}_{}_{}.csv",
        BLOB_NAME_STEM,
        at.format("%Y-%m-%d"),
        at.format("%H:%M:%S%.6f").to_string().replace(':', "_")
    );
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        file_name
    } else {
        format!("{}/{}", prefix, file_name)
    }
}

#[instrument(skip(store, table), fields(records = table.len(), container = %destination.container))]
pub async fn load(
    store: &dyn ObjectStorePort,
    table: &[StadiumRecord],
    destination: &Destination,
) -> Result<UploadReceipt> {
    let bytes = to_csv(table)?;
    let blob_name = blob_name(&destination.prefix, &Local::now());
    let sha256 = hex::encode(Sha256::digest(&bytes));
    let size = bytes.len();

    store
        .put(&destination.container, &blob_name, bytes, CSV_CONTENT_TYPE)
        .await
        .map_err(|cause| EtlError::UploadFailed {
            blob_name: blob_name.clone(),
            cause,
        })?;

    info!(blob_name = %blob_name, bytes = size, sha256 = %sha256, "Uploaded CSV");
    Ok(UploadReceipt {
        container: destination.container.clone(),
        blob_name,
        bytes: size,
        sha256,
    })
}
