//! Draft/ready status derivation.
//!
//! A record's status is a pure function of its messages: it is `ready` when
//! the transcript carries an applied patch and at least one lint, test, or
//! build run, and `draft` otherwise. Callers never get to declare a status
//! the transcript does not support.

use reel_core::message::{SessionStatus, TrainingRecord};

use crate::validate::{Violation, scan};

/// Derives the status a record has earned.
///
/// Runs the same scan as [`crate::validate::validate`], so an invalid record
/// has no status at all.
pub fn derive_status(record: &TrainingRecord) -> Result<SessionStatus, Violation> {
    let outcome = scan(record)?;
    if outcome.apply_patch && outcome.check_run {
        Ok(SessionStatus::Ready)
    } else {
        Ok(SessionStatus::Draft)
    }
}

/// Checks a declared status against the derived one.
///
/// The store runs this on every append; a mismatch is reported as a
/// [`Violation::StatusMismatch`] carrying both sides.
pub fn validate_declared(
    record: &TrainingRecord,
    declared: SessionStatus,
) -> Result<(), Violation> {
    let derived = derive_status(record)?;
    if derived == declared {
        Ok(())
    } else {
        Err(Violation::StatusMismatch { declared, derived })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
