use crate::core::Pipeline;
use crate::domain::model::DeliveryReceipt;
use crate::utils::error::Result;

pub struct DigestEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> DigestEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<DeliveryReceipt> {
        tracing::info!("Starting digest run");

        let papers = self.pipeline.extract().await?;
        tracing::info!("Total raw results: {}", papers.len());

        let digest = self.pipeline.transform(papers).await?;
        tracing::info!("Top papers for digest: {}", digest.paper_count);

        let receipt = self.pipeline.load(digest).await?;
        tracing::info!("✅ Digest {}", receipt);

        Ok(receipt)
    }
}
