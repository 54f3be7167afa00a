use serde::{Deserialize, Serialize};

/// A revision round stops the loop when its score reaches this value.
pub const DEFAULT_SCORE_THRESHOLD: u8 = 95;

/// Hard cap on audit-and-revise rounds per run.
pub const MAX_REVISION_ROUNDS: u32 = 3;

pub const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    /// 0-100
    pub score: u8,
    pub issues: Vec<String>,
    pub fixes_applied: Vec<String>,
    /// 0 for the draft placeholder, 1..N for revision rounds
    pub iteration: u32,
    pub is_perfect: bool,
}

impl QualityReport {
    /// Report attached to the draft; no QA has happened yet.
    pub fn placeholder() -> Self {
        Self {
            score: 0,
            issues: Vec::new(),
            fixes_applied: Vec::new(),
            iteration: 0,
            is_perfect: false,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.iteration == 0
    }

    /// Whether this report ends the revision loop. The perfect flag counts on
    /// its own, even below the numeric threshold.
    pub fn stops_revision(&self, threshold: u8) -> bool {
        self.is_perfect || self.score >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(score: u8, is_perfect: bool) -> QualityReport {
        QualityReport {
            score,
            issues: vec!["CTA too small".to_string()],
            fixes_applied: Vec::new(),
            iteration: 1,
            is_perfect,
        }
    }

    #[test]
    fn placeholder_is_iteration_zero() {
        let p = QualityReport::placeholder();
        assert!(p.is_placeholder());
        assert_eq!(p.score, 0);
        assert!(p.issues.is_empty());
        assert!(!p.stops_revision(DEFAULT_SCORE_THRESHOLD));
    }

    #[test]
    fn threshold_and_perfect_flag_both_stop() {
        assert!(!report(94, false).stops_revision(DEFAULT_SCORE_THRESHOLD));
        assert!(report(95, false).stops_revision(DEFAULT_SCORE_THRESHOLD));
        assert!(report(60, true).stops_revision(DEFAULT_SCORE_THRESHOLD));
    }
}
