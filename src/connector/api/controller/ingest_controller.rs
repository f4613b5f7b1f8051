use std::path::Path;

use anyhow::Result;

use crate::{load_products, IngestReport};

use super::super::Container;

pub struct IngestController<'a> {
    container: &'a Container,
}

impl<'a> IngestController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Create the collection, load the catalog and run the worker pool.
    pub async fn ingest(&self, catalog: &Path) -> Result<IngestReport> {
        self.container.require_credentials()?;

        let use_case = self.container.ingest_use_case();
        use_case.prepare_collection().await?;

        let products = load_products(catalog)?;
        let report = use_case.execute(products).await?;
        Ok(report)
    }

    pub async fn ingest_and_format(&self, catalog: &Path) -> Result<String> {
        let report = self.ingest(catalog).await?;
        Ok(self.format_report(&report))
    }

    fn format_report(&self, report: &IngestReport) -> String {
        let mut output = report.summary();
        for failure in &report.failures {
            output.push_str(&format!(
                "\n  {} [{}]: {}",
                failure.product_id, failure.stage, failure.message
            ));
        }
        output
    }
}
