pub mod generator;
pub mod llm_generator;
pub mod manifest;
pub mod orchestrator;
pub mod prompts;
pub mod session;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use generator::{AuditOutcome, DesignGenerator, DraftOutcome, Stage, StrategyOutcome};
pub use llm_generator::LlmGenerator;
pub use manifest::{export_run, ProductionManifest, RunExport};
pub use orchestrator::{Forge, RunOutcome};
pub use session::{ForgeSession, ForgeStatus, SessionSnapshot};
