use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{Assignment, AssignmentKind, SectionId, SubjectId, Teacher, TeacherId};
use super::error::SchedulingError;
use super::policy::QualificationMode;
use super::store::Schedule;

/// Non-blocking advisories attached to an admitted write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssignmentWarning {
    UnqualifiedTeacher {
        teacher: TeacherId,
        subject: SubjectId,
    },
}

impl fmt::Display for AssignmentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentWarning::UnqualifiedTeacher { teacher, subject } => write!(
                f,
                "teacher '{teacher}' is not listed as qualified for subject '{subject}'"
            ),
        }
    }
}

/// Double-booking check over the merged view. For a regular candidate the
/// relevant universe is the other sections' regular layer at that slot; for
/// an overlay it is each other section's effective occupant on the overlay's
/// date (its own overlay if present, else its regular assignment).
///
/// The caller holds the schedule's write lock across this check and the
/// subsequent ledger mutation, so the decision cannot go stale.
pub(crate) fn check_double_booking(
    schedule: &Schedule,
    candidate: &Assignment,
) -> Result<(), SchedulingError> {
    let ledger = schedule.ledger();
    let conflict = |occupied_section: &SectionId| SchedulingError::Conflict {
        teacher: candidate.teacher_id.clone(),
        slot: candidate.slot_id.clone(),
        occupied_section: occupied_section.clone(),
    };

    match candidate.kind {
        AssignmentKind::Regular => {
            for entry in ledger.teacher_entries(&candidate.teacher_id, &candidate.slot_id) {
                if entry.kind == AssignmentKind::Regular
                    && entry.section_id != candidate.section_id
                {
                    return Err(conflict(&entry.section_id));
                }
            }
        }
        AssignmentKind::Substitute | AssignmentKind::Exam => {
            let date = match candidate.effective_date {
                Some(date) => date,
                None => {
                    return Err(SchedulingError::Validation(format!(
                        "{} assignments require an effective date",
                        candidate.kind
                    )))
                }
            };

            for entry in ledger.teacher_entries(&candidate.teacher_id, &candidate.slot_id) {
                if entry.section_id == candidate.section_id {
                    continue;
                }
                match entry.kind {
                    // Another overlay pinning the teacher elsewhere that day.
                    AssignmentKind::Substitute | AssignmentKind::Exam => {
                        if entry.effective_date == Some(date) {
                            return Err(conflict(&entry.section_id));
                        }
                    }
                    // A regular binding counts unless that section's cell is
                    // itself overridden for the date.
                    AssignmentKind::Regular => {
                        if ledger
                            .overlay(&candidate.slot_id, &entry.section_id, date)
                            .is_none()
                        {
                            return Err(conflict(&entry.section_id));
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

/// Qualification check per the configured mode: `Warn` reports without
/// blocking, `Enforce` rejects, `Off` admits silently.
pub(crate) fn check_qualification(
    teacher: &Teacher,
    candidate: &Assignment,
    mode: QualificationMode,
) -> Result<Vec<AssignmentWarning>, SchedulingError> {
    if mode == QualificationMode::Off || teacher.is_qualified_for(&candidate.subject_id) {
        return Ok(Vec::new());
    }

    match mode {
        QualificationMode::Enforce => Err(SchedulingError::Qualification {
            teacher: candidate.teacher_id.clone(),
            subject: candidate.subject_id.clone(),
        }),
        _ => Ok(vec![AssignmentWarning::UnqualifiedTeacher {
            teacher: candidate.teacher_id.clone(),
            subject: candidate.subject_id.clone(),
        }]),
    }
}
