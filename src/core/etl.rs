use crate::core::{DeliveryStatus, Pipeline};
use crate::utils::error::Result;

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: String,
    pub menus: usize,
    pub artifact: Option<String>,
    pub delivery: DeliveryStatus,
}

pub struct MenuEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> MenuEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Scrape, normalize, then persist and deliver. Errors from the extract
    /// phase abort before anything is sent.
    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Scraping restaurant pages...");
        let scraped = self.pipeline.extract().await?;
        tracing::info!("Scraped {} restaurants", scraped.len());

        let report = self.pipeline.transform(scraped).await?;
        tracing::info!("Built report with {} menus", report.len());

        let outcome = self.pipeline.load(&report).await?;

        Ok(RunSummary {
            report: report.render(),
            menus: report.len(),
            artifact: outcome.artifact,
            delivery: outcome.delivery,
        })
    }
}
