// Sequences one forge run: validate, strategize, draft, then a bounded
// audit-and-revise loop.
//
// One generator call per state. Every stage result is committed to the
// session together with the next status, so observers never see a state
// that does not match its label. A run that loses the session to a newer
// run stops at its next commit.

use std::sync::Arc;

use tracing::{error, info, info_span, warn, Instrument};

use flyerforge_common::{Brief, ForgeError, ForgeLimits, WorkflowState};

use crate::generator::{DesignGenerator, Stage};
use crate::session::{ForgeSession, ForgeStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The service needs answers before it can design anything.
    NeedsClarification { run: u64, questions: Vec<String> },
    Completed { run: u64, state: Arc<WorkflowState> },
}

#[derive(Clone)]
pub struct Forge {
    generator: Arc<dyn DesignGenerator>,
    session: Arc<ForgeSession>,
    limits: ForgeLimits,
}

impl Forge {
    pub fn new(generator: Arc<dyn DesignGenerator>, limits: ForgeLimits) -> Self {
        Self {
            generator,
            session: Arc::new(ForgeSession::new()),
            limits,
        }
    }

    /// Share an existing session, e.g. one a UI already observes.
    pub fn with_session(mut self, session: Arc<ForgeSession>) -> Self {
        self.session = session;
        self
    }

    pub fn session(&self) -> &Arc<ForgeSession> {
        &self.session
    }

    pub fn limits(&self) -> ForgeLimits {
        self.limits
    }

    /// Run the whole workflow for `brief`, replacing any run in progress.
    ///
    /// Fatal errors leave the session in `Failed` with the history appended
    /// so far. A superseded run returns `ForgeError::Superseded` and leaves
    /// the session to the newer run, even when it also failed.
    pub async fn run(&self, brief: &Brief) -> Result<RunOutcome, ForgeError> {
        let run = self.session.begin_run();
        let span = info_span!("forge_run", run, brand = brief.brand.brand_name.as_str());

        async {
            info!("Forge run started");
            match self.drive(run, brief).await {
                Ok(outcome) => Ok(outcome),
                Err(err) if !err.is_fatal() => {
                    warn!("Run superseded, discarding its results");
                    Err(err)
                }
                Err(err) => {
                    let failed = ForgeStatus::Failed {
                        reason: err.to_string(),
                    };
                    match self.session.set_status(run, failed) {
                        Ok(()) => {
                            error!(error = %err, "Forge run failed");
                            Err(err)
                        }
                        Err(superseded) => {
                            warn!(error = %err, "Run superseded before its failure was recorded");
                            Err(superseded)
                        }
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn drive(&self, run: u64, brief: &Brief) -> Result<RunOutcome, ForgeError> {
        let mut state = WorkflowState::default();

        // Validating
        let questions = self
            .generator
            .validate(&brief.brand, &brief.campaign)
            .await?;
        if !questions.is_empty() {
            info!(count = questions.len(), "Brief needs clarification");
            self.session.commit(
                run,
                ForgeStatus::AwaitingClarification {
                    questions: questions.clone(),
                },
                state,
            )?;
            return Ok(RunOutcome::NeedsClarification { run, questions });
        }

        // Strategizing
        self.session.set_status(run, ForgeStatus::Strategizing)?;
        let strategy = self.generator.strategize(brief).await?;
        info!(
            winner = strategy.winner.id.as_str(),
            image_prompts = strategy.image_prompts.len(),
            "Strategy ready"
        );
        state = state.with_strategy(
            strategy.strategy,
            strategy.concepts,
            strategy.winner,
            strategy.image_prompts,
        );
        self.session
            .commit(run, ForgeStatus::Strategizing, state.clone())?;

        // Drafting
        let concept = match state.winning_concept() {
            Some(concept) => concept.clone(),
            None => {
                let id = state.winner.as_ref().map(|w| w.id.as_str()).unwrap_or("");
                return Err(ForgeError::contract(
                    Stage::Strategize.as_str(),
                    format!("winner id {id:?} matches none of the concepts"),
                ));
            }
        };
        self.session.set_status(
            run,
            ForgeStatus::Drafting {
                concept: concept.title.clone(),
            },
        )?;
        let draft = self.generator.draft(brief, &concept).await?;
        info!(concept = %concept.id, design = draft.artifact.summary().as_str(), "Draft ready");
        state = state.with_draft(draft.artifact, draft.production_notes);
        self.session.commit(
            run,
            ForgeStatus::Drafting {
                concept: concept.title.clone(),
            },
            state.clone(),
        )?;

        // Iterating
        let max = self.limits.max_revisions;
        for round in 1..=max {
            let status = ForgeStatus::Iterating { round, max };
            self.session.set_status(run, status.clone())?;

            let audit = {
                let latest = state.latest().ok_or_else(|| {
                    ForgeError::contract(Stage::Draft.as_str(), "no drafted artifact to audit")
                })?;
                self.generator
                    .audit_and_revise(brief, &latest.artifact, round)
                    .await?
            };

            let stop = audit.report.stops_revision(self.limits.score_threshold);
            info!(
                round,
                score = audit.report.score,
                is_perfect = audit.report.is_perfect,
                issues = audit.report.issues.len(),
                "QA round complete"
            );
            state = state.with_revision(audit.artifact, audit.report, audit.production_notes);
            self.session.commit(run, status, state.clone())?;

            if stop {
                break;
            }
        }

        let state = Arc::new(state);
        self.session
            .commit(run, ForgeStatus::Done, Arc::clone(&state))?;
        info!(
            revisions = state.revision_count(),
            final_score = state.latest().map(|h| h.report.score).unwrap_or(0),
            "Forge run complete"
        );
        Ok(RunOutcome::Completed { run, state })
    }
}
