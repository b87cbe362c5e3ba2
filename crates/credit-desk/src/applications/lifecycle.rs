//! Status state machine for credit applications.
//!
//! `NEW -> SCORING -> {APPROVED, REJECTED}`. Each transition is an explicit function that
//! reports what changed, including whether the decision timestamp was stamped by this call.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{ApplicationId, ApplicationStatus, CreditApplication};

/// Minimum score that resolves to an approval.
pub const APPROVAL_THRESHOLD: u8 = 60;

/// Upper bound of the score range; the lower bound is zero.
pub const MAX_SCORE: u8 = 100;

/// Record of a single status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    pub decided_at_set: bool,
}

/// Contract violations raised by the lifecycle. These indicate a caller bug upstream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("score {score} is outside the range 0..=100")]
    ScoreOutOfRange { score: i64 },
    #[error("application {id} was already decided ({status}); scoring cannot restart it")]
    AlreadyDecided {
        id: ApplicationId,
        status: ApplicationStatus,
    },
}

/// Terminal status implied by a score.
pub fn decision_for(score: u8) -> ApplicationStatus {
    if score >= APPROVAL_THRESHOLD {
        ApplicationStatus::Approved
    } else {
        ApplicationStatus::Rejected
    }
}

/// Move an application into `SCORING`. Re-entering from `SCORING` is tolerated.
pub fn begin_scoring(application: &mut CreditApplication) -> Result<Transition, LifecycleError> {
    let from = application.status;
    if from.is_terminal() {
        return Err(LifecycleError::AlreadyDecided {
            id: application.id.clone(),
            status: from,
        });
    }

    application.status = ApplicationStatus::Scoring;
    Ok(Transition {
        from,
        to: ApplicationStatus::Scoring,
        decided_at_set: false,
    })
}

/// Record a score and resolve the terminal status.
///
/// The decision timestamp is only stamped the first time a terminal state is reached; applying
/// a second score updates `score` and `status` but keeps the original decision time.
pub fn apply_score(
    application: &mut CreditApplication,
    score: i64,
    now: DateTime<Utc>,
) -> Result<Transition, LifecycleError> {
    let score = u8::try_from(score)
        .ok()
        .filter(|value| *value <= MAX_SCORE)
        .ok_or(LifecycleError::ScoreOutOfRange { score })?;

    let from = application.status;
    let to = decision_for(score);

    application.score = Some(score);
    application.status = to;
    let decided_at_set = stamp_decision(application, now);

    Ok(Transition {
        from,
        to,
        decided_at_set,
    })
}

/// Administrative override. Never touches `score`.
pub fn set_status(
    application: &mut CreditApplication,
    status: ApplicationStatus,
    now: DateTime<Utc>,
) -> Transition {
    let from = application.status;
    application.status = status;
    let decided_at_set = status.is_terminal() && stamp_decision(application, now);

    Transition {
        from,
        to: status,
        decided_at_set,
    }
}

fn stamp_decision(application: &mut CreditApplication, now: DateTime<Utc>) -> bool {
    if application.decided_at.is_some() {
        return false;
    }
    application.decided_at = Some(now);
    true
}
