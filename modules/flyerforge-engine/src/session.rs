use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use flyerforge_common::{ForgeError, WorkflowState};

/// Where a run stands. Published on every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForgeStatus {
    Idle,
    Validating,
    AwaitingClarification { questions: Vec<String> },
    Strategizing,
    Drafting { concept: String },
    Iterating { round: u32, max: u32 },
    Done,
    Failed { reason: String },
}

impl ForgeStatus {
    /// Progress text for a status indicator.
    pub fn label(&self) -> String {
        match self {
            ForgeStatus::Idle => "Ready".to_string(),
            ForgeStatus::Validating => "Preflight Audit...".to_string(),
            ForgeStatus::AwaitingClarification { questions } => {
                format!("Awaiting Clarification ({} questions)", questions.len())
            }
            ForgeStatus::Strategizing => "Creative Strategy...".to_string(),
            ForgeStatus::Drafting { concept } => format!("Mastering Design: {concept}..."),
            ForgeStatus::Iterating { round, max } => format!("QA Optimization {round}/{max}..."),
            ForgeStatus::Done => "Complete".to_string(),
            ForgeStatus::Failed { reason } => format!("Failed: {reason}"),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ForgeStatus::AwaitingClarification { .. } | ForgeStatus::Done | ForgeStatus::Failed { .. }
        )
    }
}

/// State and status of the current run, replaced as a unit.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Generation id of the run that produced this snapshot. 0 before any run.
    pub run: u64,
    pub status: ForgeStatus,
    pub state: Arc<WorkflowState>,
}

/// Shared application state for the forge.
///
/// Holds the latest snapshot in a watch channel so any number of observers
/// see each transition. Starting a run bumps the generation id; commits from
/// an older run are refused with `ForgeError::Superseded`.
pub struct ForgeSession {
    tx: watch::Sender<SessionSnapshot>,
}

impl Default for ForgeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ForgeSession {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot {
            run: 0,
            status: ForgeStatus::Idle,
            state: Arc::new(WorkflowState::default()),
        });
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    /// Reset to an empty state under a new generation id and enter Validating.
    pub fn begin_run(&self) -> u64 {
        let mut run = 0;
        self.tx.send_modify(|snap| {
            snap.run += 1;
            snap.status = ForgeStatus::Validating;
            snap.state = Arc::new(WorkflowState::default());
            run = snap.run;
        });
        debug!(run, "Session reset for new run");
        run
    }

    /// Replace state and status together.
    pub fn commit(
        &self,
        run: u64,
        status: ForgeStatus,
        state: impl Into<Arc<WorkflowState>>,
    ) -> Result<(), ForgeError> {
        let state = state.into();
        self.replace(run, move |snap| {
            snap.status = status;
            snap.state = state;
        })
    }

    /// Change the status, keeping the current state.
    pub fn set_status(&self, run: u64, status: ForgeStatus) -> Result<(), ForgeError> {
        self.replace(run, move |snap| snap.status = status)
    }

    fn replace(
        &self,
        run: u64,
        update: impl FnOnce(&mut SessionSnapshot),
    ) -> Result<(), ForgeError> {
        let mut accepted = false;
        self.tx.send_if_modified(|snap| {
            if snap.run != run {
                return false;
            }
            update(snap);
            accepted = true;
            true
        });

        if accepted {
            Ok(())
        } else {
            debug!(run, "Dropping commit from superseded run");
            Err(ForgeError::Superseded { run })
        }
    }
}
