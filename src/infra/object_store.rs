use crate::app::ports::{ObjectStorePort, Secret};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::path::{Path, PathBuf};
use tracing::debug;

const AZURE_API_VERSION: &str = "2021-08-06";

/// Azure Blob Storage authenticated with a shared access signature.
///
/// Accepted connection strings:
/// - `BlobEndpoint=https://acct.blob.core.windows.net;SharedAccessSignature=sv=...`
/// - `DefaultEndpointsProtocol=https;AccountName=acct;EndpointSuffix=core.windows.net;SharedAccessSignature=sv=...`
pub struct AzureBlobStore {
    endpoint: String,
    sas: Secret,
    client: reqwest::Client,
}

impl AzureBlobStore {
    pub fn from_connection_string(conn: &Secret) -> Result<Self, String> {
        let mut blob_endpoint = None;
        let mut protocol = "https".to_string();
        let mut account = None;
        let mut suffix = "core.windows.net".to_string();
        let mut sas = None;
        let mut has_account_key = false;

        for part in conn.expose().split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((key, value)) = part.split_once('=') else {
                return Err("malformed connection string segment".to_string());
            };
            match key {
                "BlobEndpoint" => blob_endpoint = Some(value.trim_end_matches('/').to_string()),
                "DefaultEndpointsProtocol" => protocol = value.to_string(),
                "AccountName" => account = Some(value.to_string()),
                "EndpointSuffix" => suffix = value.to_string(),
                "SharedAccessSignature" => sas = Some(value.trim_start_matches('?').to_string()),
                "AccountKey" => has_account_key = true,
                _ => {}
            }
        }

        let endpoint = match (blob_endpoint, account) {
            (Some(endpoint), _) => endpoint,
            (None, Some(account)) => format!("{protocol}://{account}.blob.{suffix}"),
            (None, None) => {
                return Err("connection string needs BlobEndpoint or AccountName".to_string())
            }
        };
        let sas = match sas {
            Some(sas) if !sas.is_empty() => Secret::new(sas),
            _ if has_account_key => {
                return Err(
                    "account-key connection strings are not supported; supply a SharedAccessSignature"
                        .to_string(),
                )
            }
            _ => return Err("connection string has no SharedAccessSignature".to_string()),
        };

        Ok(Self {
            endpoint,
            sas,
            client: reqwest::Client::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn blob_url(&self, container: &str, blob_name: &str) -> String {
        format!(
            "{}/{}/{}?{}",
            self.endpoint,
            container.trim_matches('/'),
            blob_name.trim_start_matches('/'),
            self.sas.expose()
        )
    }
}

#[async_trait]
impl ObjectStorePort for AzureBlobStore {
    async fn put(
        &self,
        container: &str,
        blob_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), String> {
        debug!(endpoint = %self.endpoint, container, blob_name, "Uploading blob");
        // Single-shot Put Blob commits the whole body or nothing
        let resp = self
            .client
            .put(self.blob_url(container, blob_name))
            .header("x-ms-blob-type", "BlockBlob")
            .header("x-ms-version", AZURE_API_VERSION)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| e.without_url().to_string())?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("Azure upload failed: {} - {}", status, body));
        }
        Ok(())
    }
}

/// Writes objects under `{root}/{container}/{blob_name}` on the local filesystem.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn object_path(&self, container: &str, blob_name: &str) -> PathBuf {
        self.root.join(container).join(Path::new(blob_name.trim_start_matches('/')))
    }
}

#[async_trait]
impl ObjectStorePort for FsObjectStore {
    async fn put(
        &self,
        container: &str,
        blob_name: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), String> {
        let path = self.object_path(container, blob_name);
        let dir = path
            .parent()
            .ok_or_else(|| format!("no parent directory for {}", path.display()))?;
        tokio::fs::create_dir_all(dir).await.map_err(|e| e.to_string())?;

        // Write beside the target, then rename into place
        let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        tmp_name.push(".partial");
        let partial = PartialFile::new(path.with_file_name(tmp_name));
        tokio::fs::write(partial.path(), &bytes).await.map_err(|e| e.to_string())?;
        tokio::fs::rename(partial.path(), &path).await.map_err(|e| e.to_string())?;
        partial.commit();
        Ok(())
    }
}

/// Temporary sibling of an object; deleted on drop unless committed.
///
/// Covers failed writes, failed renames and futures dropped mid-upload.
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self { path, committed: false }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn builds_endpoint_from_account_name() {
        let conn = Secret::new(
            "DefaultEndpointsProtocol=https;AccountName=acct;EndpointSuffix=core.windows.net;SharedAccessSignature=?sv=2022&sig=abc%3D",
        );
        let store = AzureBlobStore::from_connection_string(&conn).unwrap();
        assert_eq!(store.endpoint(), "https://acct.blob.core.windows.net");
        assert_eq!(
            store.blob_url("dateng", "data/x.csv"),
            "https://acct.blob.core.windows.net/dateng/data/x.csv?sv=2022&sig=abc%3D"
        );
    }

    #[test]
    fn rejects_account_key_only() {
        let conn = Secret::new("DefaultEndpointsProtocol=https;AccountName=acct;AccountKey=Zm9v;EndpointSuffix=core.windows.net");
        let err = AzureBlobStore::from_connection_string(&conn).err().unwrap();
        assert!(err.contains("SharedAccessSignature"));
        assert!(!err.contains("Zm9v"));
    }

    #[tokio::test]
    async fn puts_block_blob() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/acct/dateng/data/out.csv"))
            .and(query_param("sig", "abc"))
            .and(header("x-ms-blob-type", "BlockBlob"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let conn = Secret::new(format!(
            "BlobEndpoint={}/acct/;SharedAccessSignature=sv=2022&sig=abc",
            server.uri()
        ));
        let store = AzureBlobStore::from_connection_string(&conn).unwrap();
        store
            .put("dateng", "data/out.csv", b"rank\n".to_vec(), "text/csv")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn surfaces_rejected_upload() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_string("AuthenticationFailed"))
            .mount(&server)
            .await;

        let conn = Secret::new(format!("BlobEndpoint={};SharedAccessSignature=sig=x", server.uri()));
        let store = AzureBlobStore::from_connection_string(&conn).unwrap();
        let err = store.put("c", "b.csv", Vec::new(), "text/csv").await.unwrap_err();
        assert!(err.contains("403"));
        assert!(err.contains("AuthenticationFailed"));
    }

    #[tokio::test]
    async fn fs_store_writes_whole_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        store
            .put("dateng", "data/a.csv", b"hello".to_vec(), "text/csv")
            .await
            .unwrap();

        let written = store.object_path("dateng", "data/a.csv");
        assert_eq!(std::fs::read(&written).unwrap(), b"hello");
        assert!(!written.with_file_name("a.csv.partial").exists());
    }

    #[tokio::test]
    async fn fs_store_removes_partial_file_when_rename_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        // A non-empty directory at the target path makes the rename fail
        let target = store.object_path("dateng", "data/a.csv");
        std::fs::create_dir_all(target.join("occupied")).unwrap();

        let err = store
            .put("dateng", "data/a.csv", b"hello".to_vec(), "text/csv")
            .await
            .unwrap_err();
        assert!(!err.is_empty());
        assert!(!target.with_file_name("a.csv.partial").exists());
        assert!(target.is_dir());
    }
}
