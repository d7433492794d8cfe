use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};

use super::domain::{
    Assignment, AssignmentDraft, AssignmentKey, AssignmentKind, ScheduleId, ScheduleStatus,
    Section, SectionId, TeacherId, TimeSlot, TimeSlotId,
};
use super::error::SchedulingError;
use super::grid::SlotGrid;
use super::policy::SchedulingPolicy;
use super::registry::RefKind;

/// Authoritative assignment collection for one schedule: the primary table
/// keyed by natural key plus the teacher/slot index used by double-booking
/// lookups. Both structures change in the same call, never independently.
#[derive(Debug, Clone, Default)]
pub struct AssignmentLedger {
    assignments: BTreeMap<AssignmentKey, Assignment>,
    by_teacher_slot: BTreeMap<(TeacherId, TimeSlotId), BTreeSet<AssignmentKey>>,
}

impl AssignmentLedger {
    /// Insert or replace by natural key, returning the displaced record.
    pub fn upsert(&mut self, assignment: Assignment) -> Option<Assignment> {
        let key = assignment.key();
        let replaced = self.assignments.remove(&key);
        if let Some(previous) = &replaced {
            self.unindex(previous, &key);
        }

        self.by_teacher_slot
            .entry((assignment.teacher_id.clone(), assignment.slot_id.clone()))
            .or_default()
            .insert(key.clone());
        self.assignments.insert(key, assignment);
        replaced
    }

    pub fn remove(&mut self, key: &AssignmentKey) -> Option<Assignment> {
        let removed = self.assignments.remove(key);
        if let Some(assignment) = &removed {
            self.unindex(assignment, key);
        }
        removed
    }

    fn unindex(&mut self, assignment: &Assignment, key: &AssignmentKey) {
        let index_key = (assignment.teacher_id.clone(), assignment.slot_id.clone());
        if let Some(keys) = self.by_teacher_slot.get_mut(&index_key) {
            keys.remove(key);
            if keys.is_empty() {
                self.by_teacher_slot.remove(&index_key);
            }
        }
    }

    pub fn get(&self, key: &AssignmentKey) -> Option<&Assignment> {
        self.assignments.get(key)
    }

    /// The regular assignment of a cell, if any.
    pub fn regular(&self, slot: &TimeSlotId, section: &SectionId) -> Option<&Assignment> {
        self.assignments.get(&AssignmentKey {
            slot_id: slot.clone(),
            section_id: section.clone(),
            kind: AssignmentKind::Regular,
            effective_date: None,
        })
    }

    /// The overlay effective for a cell on one date. Exam overlays take
    /// precedence over substitute overlays sharing the date.
    pub fn overlay(
        &self,
        slot: &TimeSlotId,
        section: &SectionId,
        date: NaiveDate,
    ) -> Option<&Assignment> {
        [AssignmentKind::Exam, AssignmentKind::Substitute]
            .iter()
            .find_map(|kind| {
                self.assignments.get(&AssignmentKey {
                    slot_id: slot.clone(),
                    section_id: section.clone(),
                    kind: *kind,
                    effective_date: Some(date),
                })
            })
    }

    /// Every assignment binding a teacher at a slot, any kind, any date.
    pub fn teacher_entries(
        &self,
        teacher: &TeacherId,
        slot: &TimeSlotId,
    ) -> impl Iterator<Item = &Assignment> {
        self.by_teacher_slot
            .get(&(teacher.clone(), slot.clone()))
            .into_iter()
            .flatten()
            .filter_map(|key| self.assignments.get(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.values()
    }

    pub fn slot_in_use(&self, slot: &TimeSlotId) -> bool {
        self.assignments
            .values()
            .any(|assignment| &assignment.slot_id == slot)
    }

    pub fn count_of_kind(&self, kind: AssignmentKind) -> usize {
        self.assignments
            .values()
            .filter(|assignment| assignment.kind == kind)
            .count()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// A schedule aggregate: the owned slot grid and assignment ledger, the
/// referenced sections, and the lifecycle status every write gate reads.
#[derive(Debug, Clone)]
pub struct Schedule {
    id: ScheduleId,
    name: String,
    academic_year: String,
    status: ScheduleStatus,
    finalized_at: Option<DateTime<Utc>>,
    grid: SlotGrid,
    sections: BTreeMap<SectionId, Section>,
    homerooms: BTreeMap<SectionId, TeacherId>,
    ledger: AssignmentLedger,
}

impl Schedule {
    pub fn new(
        id: ScheduleId,
        name: String,
        academic_year: String,
        grid: SlotGrid,
        sections: Vec<Section>,
    ) -> Self {
        let sections = sections
            .into_iter()
            .map(|section| (section.id.clone(), section))
            .collect();

        Self {
            id,
            name,
            academic_year,
            status: ScheduleStatus::Draft,
            finalized_at: None,
            grid,
            sections,
            homerooms: BTreeMap::new(),
            ledger: AssignmentLedger::default(),
        }
    }

    pub fn id(&self) -> &ScheduleId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn academic_year(&self) -> &str {
        &self.academic_year
    }

    pub fn status(&self) -> ScheduleStatus {
        self.status
    }

    pub fn finalized_at(&self) -> Option<DateTime<Utc>> {
        self.finalized_at
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn section_ids(&self) -> impl Iterator<Item = &SectionId> {
        self.sections.keys()
    }

    pub fn has_section(&self, id: &SectionId) -> bool {
        self.sections.contains_key(id)
    }

    pub fn homerooms(&self) -> &BTreeMap<SectionId, TeacherId> {
        &self.homerooms
    }

    pub fn ledger(&self) -> &AssignmentLedger {
        &self.ledger
    }

    pub(crate) fn ledger_mut(&mut self) -> &mut AssignmentLedger {
        &mut self.ledger
    }

    pub(crate) fn set_status(&mut self, status: ScheduleStatus) {
        self.status = status;
    }

    pub(crate) fn stamp_finalized(&mut self, at: DateTime<Utc>) {
        self.finalized_at = Some(at);
    }

    fn immutable(&self) -> SchedulingError {
        SchedulingError::ImmutableSchedule {
            schedule: self.id.clone(),
            status: self.status,
        }
    }

    fn ensure_draft(&self) -> Result<(), SchedulingError> {
        match self.status {
            ScheduleStatus::Draft => Ok(()),
            _ => Err(self.immutable()),
        }
    }

    /// Grid mutation, DRAFT-gated per the calendar contract.
    pub fn add_time_slot(&mut self, slot: TimeSlot) -> Result<(), SchedulingError> {
        self.ensure_draft()?;
        self.grid.insert(slot)
    }

    /// Removal is refused while any assignment, of any kind, still references
    /// the slot.
    pub fn remove_time_slot(&mut self, slot_id: &TimeSlotId) -> Result<TimeSlot, SchedulingError> {
        self.ensure_draft()?;
        if self.ledger.slot_in_use(slot_id) {
            return Err(SchedulingError::Validation(format!(
                "time slot '{slot_id}' is still referenced by assignments"
            )));
        }
        self.grid.remove(slot_id)
    }

    pub fn attach_section(&mut self, section: Section) -> Result<(), SchedulingError> {
        self.ensure_draft()?;
        self.sections.insert(section.id.clone(), section);
        Ok(())
    }

    /// Bind the homeroom teacher for a section: one per section per academic
    /// year, replace semantics.
    pub fn set_homeroom(
        &mut self,
        section_id: &SectionId,
        teacher_id: TeacherId,
    ) -> Result<Option<TeacherId>, SchedulingError> {
        self.ensure_draft()?;
        if !self.has_section(section_id) {
            return Err(SchedulingError::Validation(format!(
                "section '{section_id}' is not attached to schedule '{}'",
                self.id
            )));
        }
        Ok(self.homerooms.insert(section_id.clone(), teacher_id))
    }

    /// Structural admission of an upsert: slot resolvable and assignable,
    /// section attached, kind-appropriate status and date gates. Runs before
    /// the conflict detector; a rejection here leaves no trace.
    pub(crate) fn admit_upsert(
        &self,
        draft: &AssignmentDraft,
        today: NaiveDate,
        policy: &SchedulingPolicy,
    ) -> Result<(), SchedulingError> {
        let slot = self
            .grid
            .get(&draft.slot_id)
            .ok_or_else(|| SchedulingError::NotFound {
                kind: RefKind::TimeSlot,
                id: draft.slot_id.0.clone(),
            })?;
        if slot.is_break() {
            return Err(SchedulingError::Validation(format!(
                "slot '{}' is a break and cannot hold assignments",
                slot.id
            )));
        }
        if !self.has_section(&draft.section_id) {
            return Err(SchedulingError::Validation(format!(
                "section '{}' is not attached to schedule '{}'",
                draft.section_id, self.id
            )));
        }

        match draft.kind {
            AssignmentKind::Regular => {
                if draft.effective_date.is_some() {
                    return Err(SchedulingError::Validation(
                        "regular assignments recur and carry no effective date".to_string(),
                    ));
                }
                self.ensure_draft()
            }
            AssignmentKind::Substitute | AssignmentKind::Exam => {
                if self.status == ScheduleStatus::Archived {
                    return Err(self.immutable());
                }
                let date = draft.effective_date.ok_or_else(|| {
                    SchedulingError::Validation(format!(
                        "{} assignments require an effective date",
                        draft.kind
                    ))
                })?;
                if !policy.allow_past_overlays && date < today {
                    return Err(SchedulingError::Validation(format!(
                        "effective date {date} is in the past"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Gate for removals: same lifecycle rules as the matching upsert path.
    pub(crate) fn admit_removal(&self, key: &AssignmentKey) -> Result<(), SchedulingError> {
        match key.kind {
            AssignmentKind::Regular => self.ensure_draft(),
            AssignmentKind::Substitute | AssignmentKind::Exam => {
                if self.status == ScheduleStatus::Archived {
                    Err(self.immutable())
                } else {
                    Ok(())
                }
            }
        }
    }
}
