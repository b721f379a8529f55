use async_trait::async_trait;
use std::fmt;

// Fetch-side port
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpGetResult, String>;
}

#[derive(Clone, Debug)]
pub struct HttpGetResult {
    pub status: u16,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

// Load-side port
#[async_trait]
pub trait ObjectStorePort: Send + Sync {
    /// Writes `bytes` as one object. Either the whole object becomes visible or nothing does.
    async fn put(
        &self,
        container: &str,
        blob_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), String>;
}

/// Credential string whose `Debug`/`Display` never reveal the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

pub trait SecretProvider: Send + Sync {
    fn get(&self, name: &str) -> Result<Secret, String>;
}

// Scheduled-task mode: stages exchange JSON text under a shared key
#[async_trait]
pub trait HandoffPort: Send + Sync {
    async fn push(&self, key: &str, json: String) -> Result<(), String>;
    async fn pull(&self, key: &str) -> Result<String, String>;
    /// Deletes `key`; a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), String>;
}
