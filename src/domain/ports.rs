use crate::domain::model::{DeliveryReceipt, Digest, LookbackWindow, Paper, Source};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// A literature search API that answers one query at a time.
#[async_trait]
pub trait PaperSource: Send + Sync {
    fn source(&self) -> Source;

    async fn search(&self, query: &str, window: &LookbackWindow) -> Result<Vec<Paper>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Paper>>;
    async fn transform(&self, papers: Vec<Paper>) -> Result<Digest>;
    async fn load(&self, digest: Digest) -> Result<DeliveryReceipt>;
}
