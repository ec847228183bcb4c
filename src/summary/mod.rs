mod algorithmic;
mod remote;

pub use algorithmic::AlgorithmicGenerator;
pub use remote::RemoteGenerator;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{FactorContribution, VehicleRecord};

/// Summary and reasoning prose for one assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedText {
    pub summary: String,
    pub reasoning: String,
}

/// Capability-polymorphic text generation. The orchestrator tries the
/// remote implementation once (when configured) and falls back to the
/// algorithmic one, which is guaranteed to succeed.
#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    async fn generate(
        &self,
        record: &VehicleRecord,
        score: u8,
        factors: &[FactorContribution],
    ) -> Result<GeneratedText>;
}
