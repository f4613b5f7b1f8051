use std::fmt;

use serde::{Deserialize, Serialize};

/// Pipeline stage at which a record failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStage {
    Embed,
    Upsert,
    /// The task ingesting the record panicked.
    Crashed,
}

impl IngestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestStage::Embed => "embed",
            IngestStage::Upsert => "upsert",
            IngestStage::Crashed => "crashed",
        }
    }
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestFailure {
    pub product_id: String,
    pub stage: IngestStage,
    pub message: String,
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty() && self.succeeded == self.total
    }

    pub fn failures_at(&self, stage: IngestStage) -> impl Iterator<Item = &IngestFailure> {
        self.failures.iter().filter(move |f| f.stage == stage)
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} products processed: {} inserted, {} failed ({} embed, {} upsert)",
            self.total,
            self.succeeded,
            self.failed(),
            self.failures_at(IngestStage::Embed).count(),
            self.failures_at(IngestStage::Upsert).count(),
        );
        let crashed = self.failures_at(IngestStage::Crashed).count();
        if crashed > 0 {
            summary.push_str(&format!(", {} crashed", crashed));
        }
        summary
    }
}
