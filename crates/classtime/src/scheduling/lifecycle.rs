use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::domain::{ScheduleStatus, SectionId, TimeSlotId};
use super::error::SchedulingError;
use super::store::Schedule;

/// Options accepted by `finalize`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FinalizeOptions {
    #[serde(default)]
    pub require_full_coverage: bool,
}

/// A `(slot, section)` cell missing a regular assignment, reported when
/// full-coverage finalization is refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageGap {
    pub slot_id: TimeSlotId,
    pub section_id: SectionId,
}

/// Cooperative cancellation handle for coverage enumeration over large
/// schedules. Cancellation is only observed while the check is still
/// read-only; a cancelled finalize leaves the status untouched.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// DRAFT -> FINALIZED. Coverage gaps are collected in grid order so the
/// caller can render them directly.
pub(crate) fn finalize(
    schedule: &mut Schedule,
    options: FinalizeOptions,
    cancel: &CancelFlag,
) -> Result<(), SchedulingError> {
    if schedule.status() != ScheduleStatus::Draft {
        return Err(SchedulingError::Validation(format!(
            "schedule '{}' is {} and can no longer be finalized",
            schedule.id(),
            schedule.status()
        )));
    }

    if options.require_full_coverage {
        let missing = coverage_gaps(schedule, cancel)?;
        if !missing.is_empty() {
            return Err(SchedulingError::IncompleteSchedule { missing });
        }
    }

    schedule.set_status(ScheduleStatus::Finalized);
    schedule.stamp_finalized(Utc::now());
    Ok(())
}

/// FINALIZED -> ARCHIVED. Archival additionally shuts the overlay path; the
/// store gates read the new status on their next write.
pub(crate) fn archive(schedule: &mut Schedule) -> Result<(), SchedulingError> {
    if schedule.status() != ScheduleStatus::Finalized {
        return Err(SchedulingError::Validation(format!(
            "schedule '{}' is {} and cannot be archived",
            schedule.id(),
            schedule.status()
        )));
    }

    schedule.set_status(ScheduleStatus::Archived);
    Ok(())
}

fn coverage_gaps(
    schedule: &Schedule,
    cancel: &CancelFlag,
) -> Result<Vec<CoverageGap>, SchedulingError> {
    let mut missing = Vec::new();
    for slot in schedule.grid().teaching_slots() {
        if cancel.is_cancelled() {
            return Err(SchedulingError::OperationCancelled);
        }
        for section_id in schedule.section_ids() {
            if schedule.ledger().regular(&slot.id, section_id).is_none() {
                missing.push(CoverageGap {
                    slot_id: slot.id.clone(),
                    section_id: section_id.clone(),
                });
            }
        }
    }
    Ok(missing)
}
