use crate::app::ports::{HandoffPort, HttpClientPort, ObjectStorePort, SecretProvider};
use crate::config::{Config, StorageBackend};
use crate::error::{EtlError, Result};
use crate::infra::http_client::ReqwestHttp;
use crate::infra::object_store::{AzureBlobStore, FsObjectStore};
use crate::pipeline::extract::{ColumnLayout, Extractor};
use crate::pipeline::fetch::fetch_with;
use crate::pipeline::load::{load, Destination, UploadReceipt};
use crate::pipeline::locate::{locate_table, TableSignature};
use crate::pipeline::messages::{clear, publish, receive, Stage, StageMessage};
use crate::pipeline::transform::transform;
use crate::types::{ExtractedStadium, ResultTable};
use metrics::{counter, histogram};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};
use uuid::Uuid;

/// Outcome of an in-process run.
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub url: String,
    pub rows_seen: usize,
    pub records: usize,
    pub receipt: UploadReceipt,
}

pub struct Pipeline {
    http: Arc<dyn HttpClientPort>,
    /// Absent for stages that never upload.
    store: Option<Arc<dyn ObjectStorePort>>,
    signature: TableSignature,
    extractor: Extractor,
    destination: Destination,
}

impl Pipeline {
    pub fn new(
        http: Arc<dyn HttpClientPort>,
        store: Arc<dyn ObjectStorePort>,
        config: &Config,
    ) -> Self {
        Self::assemble(http, Some(store), config)
    }

    fn assemble(
        http: Arc<dyn HttpClientPort>,
        store: Option<Arc<dyn ObjectStorePort>>,
        config: &Config,
    ) -> Self {
        Self {
            http,
            store,
            signature: TableSignature::new(config.source.table_classes.iter().cloned()),
            extractor: Extractor::new(ColumnLayout::default(), &config.source.image_prefix),
            destination: Destination {
                container: config.storage.container.clone(),
                prefix: config.storage.prefix.clone(),
            },
        }
    }

    /// Wires the reqwest client and the configured storage backend.
    pub fn from_config(config: &Config, secrets: &dyn SecretProvider) -> Result<Self> {
        let http = ReqwestHttp::new(config.source.timeout()).map_err(EtlError::Config)?;
        Ok(Self::new(Arc::new(http), build_store(config, secrets)?, config))
    }

    /// Wires only the reqwest client; for the extract and transform stages,
    /// which run without storage credentials.
    pub fn without_store(config: &Config) -> Result<Self> {
        let http = ReqwestHttp::new(config.source.timeout()).map_err(EtlError::Config)?;
        Ok(Self::assemble(Arc::new(http), None, config))
    }

    /// Fetch, locate and extract. Returns the number of table rows seen alongside the records.
    #[instrument(skip(self))]
    pub async fn extract_records(&self, url: &str) -> Result<(usize, Vec<ExtractedStadium>)> {
        let t_fetch = Instant::now();
        let page = fetch_with(&*self.http, url).await?;
        histogram!("stadium_etl_fetch_duration_seconds").record(t_fetch.elapsed().as_secs_f64());

        let rows = locate_table(&page, &self.signature)?;
        let records = self.extractor.extract(&rows)?;
        Ok((rows.len(), records))
    }

    /// All stages in-process, strictly in sequence.
    #[instrument(skip(self))]
    pub async fn run(&self, url: &str) -> Result<PipelineResult> {
        let run_id = Uuid::new_v4();
        info!(%run_id, "Starting stadium pipeline");
        counter!("stadium_etl_runs_total").increment(1);

        let (rows_seen, extracted) = self.extract_records(url).await?;
        let table = transform(extracted)?;
        let receipt = self.load_table(&table).await?;

        info!(%run_id, records = table.len(), blob = %receipt.blob_name, "Pipeline finished");
        Ok(PipelineResult {
            run_id,
            url: url.to_string(),
            rows_seen,
            records: table.len(),
            receipt,
        })
    }

    /// Scheduled-task mode, first stage: publishes extracted records.
    ///
    /// Messages left by an earlier run are dropped first, so a failed extract
    /// leaves nothing for the later stages to consume.
    pub async fn extract_stage(&self, url: &str, handoff: &dyn HandoffPort) -> Result<Uuid> {
        let run_id = Uuid::new_v4();
        counter!("stadium_etl_runs_total").increment(1);
        clear(handoff).await?;
        let (_, extracted) = self.extract_records(url).await?;
        publish(handoff, &StageMessage::new(run_id, Stage::Extract, extracted)).await?;
        info!(%run_id, "Published extract output");
        Ok(run_id)
    }

    /// Scheduled-task mode, second stage: consumes extract output, publishes the result table.
    pub async fn transform_stage(&self, handoff: &dyn HandoffPort) -> Result<Uuid> {
        let message: StageMessage<Vec<ExtractedStadium>> = receive(handoff, Stage::Extract).await?;
        let table = transform(message.payload)?;
        publish(handoff, &StageMessage::new(message.run_id, Stage::Transform, table)).await?;
        info!(run_id = %message.run_id, "Published transform output");
        Ok(message.run_id)
    }

    /// Scheduled-task mode, final stage: uploads the transformed table.
    pub async fn load_stage(&self, handoff: &dyn HandoffPort) -> Result<UploadReceipt> {
        let message: StageMessage<ResultTable> = receive(handoff, Stage::Transform).await?;
        let receipt = self.load_table(&message.payload).await?;
        clear(handoff).await?;
        info!(run_id = %message.run_id, blob = %receipt.blob_name, "Loaded transform output");
        Ok(receipt)
    }

    async fn load_table(&self, table: &ResultTable) -> Result<UploadReceipt> {
        counter!("stadium_etl_records_total").increment(table.len() as u64);
        let store = self.store.as_deref().ok_or_else(|| {
            EtlError::Config("pipeline was built without a storage backend".into())
        })?;
        let receipt = load(store, table, &self.destination).await?;
        histogram!("stadium_etl_upload_bytes").record(receipt.bytes as f64);
        Ok(receipt)
    }
}

fn build_store(config: &Config, secrets: &dyn SecretProvider) -> Result<Arc<dyn ObjectStorePort>> {
    Ok(match config.storage.backend {
        StorageBackend::Filesystem => Arc::new(FsObjectStore::new(&config.storage.root)),
        StorageBackend::Azure => {
            let conn = secrets
                .get(&config.storage.connection_string_env)
                .map_err(EtlError::Config)?;
            Arc::new(AzureBlobStore::from_connection_string(&conn).map_err(EtlError::Config)?)
        }
    })
}
