use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{AssignmentKind, SectionId, SubjectId, TeacherId, TimeSlotId};
use super::store::Schedule;

/// One resolved cell of the effective day: the overlay for the date when one
/// exists, else the regular assignment, else a free period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveCell {
    pub slot_id: TimeSlotId,
    pub section_id: SectionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<SubjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<TeacherId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<AssignmentKind>,
}

/// Merge the regular and overlay layers for one concrete date. Pure and
/// deterministic: cells come back in slot start order, sections in id order,
/// and repeated calls without intervening writes return identical results.
pub fn effective_schedule(schedule: &Schedule, date: NaiveDate) -> Vec<EffectiveCell> {
    let mut cells = Vec::new();
    for slot in schedule.grid().teaching_slots() {
        for section_id in schedule.section_ids() {
            let assignment = schedule
                .ledger()
                .overlay(&slot.id, section_id, date)
                .or_else(|| schedule.ledger().regular(&slot.id, section_id));

            cells.push(match assignment {
                Some(assignment) => EffectiveCell {
                    slot_id: slot.id.clone(),
                    section_id: section_id.clone(),
                    subject_id: Some(assignment.subject_id.clone()),
                    teacher_id: Some(assignment.teacher_id.clone()),
                    source: Some(assignment.kind),
                },
                None => EffectiveCell {
                    slot_id: slot.id.clone(),
                    section_id: section_id.clone(),
                    subject_id: None,
                    teacher_id: None,
                    source: None,
                },
            });
        }
    }
    cells
}
