use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForgeError {
    /// The service answered, but the answer is undecodable or inconsistent.
    #[error("Contract violation in {stage} response: {detail}")]
    ContractViolation { stage: &'static str, detail: String },

    /// Network failure, non-success status, or a body that is not JSON.
    #[error("Transport error during {stage}: {source}")]
    Transport {
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A newer run reset the session while this one was waiting on the service.
    #[error("Run {run} was superseded by a newer run")]
    Superseded { run: u64 },

    #[error("Invalid brief: {0}")]
    InvalidBrief(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Nothing to export: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ForgeError {
    pub fn contract(stage: &'static str, detail: impl Into<String>) -> Self {
        ForgeError::ContractViolation {
            stage,
            detail: detail.into(),
        }
    }

    pub fn transport(stage: &'static str, source: anyhow::Error) -> Self {
        ForgeError::Transport { stage, source }
    }

    /// Fatal errors end a run in the Failed state; a superseded run just stops.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ForgeError::Superseded { .. })
    }
}
