use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::config::ContextConfig;
use crate::error::{Result, ToydeskError};

/// File stems of the four reference documents, in load order.
pub const DOCUMENT_NAMES: [&str; 4] = ["product", "contact", "privacy", "detail"];

/// The four named reference documents.
///
/// `product` doubles as the catalog: one product URL per line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextDocuments {
    pub product: String,
    pub contact: String,
    pub privacy: String,
    pub detail: String,
}

impl ContextDocuments {
    pub fn is_blank(&self) -> bool {
        [&self.product, &self.contact, &self.privacy, &self.detail]
            .iter()
            .all(|doc| doc.trim().is_empty())
    }

    /// `(name, text)` pairs in [`DOCUMENT_NAMES`] order.
    pub fn named(&self) -> [(&'static str, &str); 4] {
        [
            ("product", self.product.as_str()),
            ("contact", self.contact.as_str()),
            ("privacy", self.privacy.as_str()),
            ("detail", self.detail.as_str()),
        ]
    }

    fn from_parts([product, contact, privacy, detail]: [String; 4]) -> Self {
        Self {
            product,
            contact,
            privacy,
            detail,
        }
    }
}

/// Source of the reference documents.
///
/// `Ok(None)` means the source answered but had nothing to offer; the cache
/// treats it like a failure and falls back to what it already holds.
#[async_trait]
pub trait ContextLoader: Send + Sync {
    async fn load(&self) -> Result<Option<ContextDocuments>>;

    /// Short human-readable origin for logs.
    fn describe(&self) -> String;
}

/// Reads `{dir}/{name}.txt` from local disk.
#[derive(Debug, Clone)]
pub struct FileContextLoader {
    dir: PathBuf,
}

impl FileContextLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ContextLoader for FileContextLoader {
    async fn load(&self) -> Result<Option<ContextDocuments>> {
        let read = |name: &str| {
            let path = self.dir.join(format!("{name}.txt"));
            async move {
                tokio::fs::read_to_string(&path).await.map_err(|e| {
                    ToydeskError::ContextLoad(format!("failed to read {}: {e}", path.display()))
                })
            }
        };

        let (product, contact, privacy, detail) = futures::try_join!(
            read("product"),
            read("contact"),
            read("privacy"),
            read("detail"),
        )?;

        let docs = ContextDocuments::from_parts([product, contact, privacy, detail]);
        Ok((!docs.is_blank()).then_some(docs))
    }

    fn describe(&self) -> String {
        format!("file:{}", self.dir.display())
    }
}

/// Fetches `{base_url}/{name}.txt` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpContextLoader {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpContextLoader {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // Url::join replaces the last segment unless the base ends with '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&normalized)?,
        })
    }

    async fn fetch(&self, name: &str) -> Result<String> {
        let url = self.base_url.join(&format!("{name}.txt"))?;
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToydeskError::ContextLoad(format!(
                "GET {url} returned {status}"
            )));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl ContextLoader for HttpContextLoader {
    async fn load(&self) -> Result<Option<ContextDocuments>> {
        let (product, contact, privacy, detail) = futures::try_join!(
            self.fetch("product"),
            self.fetch("contact"),
            self.fetch("privacy"),
            self.fetch("detail"),
        )?;

        let docs = ContextDocuments::from_parts([product, contact, privacy, detail]);
        Ok((!docs.is_blank()).then_some(docs))
    }

    fn describe(&self) -> String {
        self.base_url.to_string()
    }
}

/// HTTP loader when `base_url` is configured, otherwise the directory loader.
pub fn build_loader(config: &ContextConfig) -> Result<Arc<dyn ContextLoader>> {
    match config.base_url.as_deref() {
        Some(base_url) => Ok(Arc::new(HttpContextLoader::new(
            base_url,
            Duration::from_secs(config.load_timeout_secs),
        )?)),
        None => Ok(Arc::new(FileContextLoader::new(&config.dir))),
    }
}
