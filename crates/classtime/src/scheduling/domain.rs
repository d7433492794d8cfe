use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for a schedule owned by the engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScheduleId(pub String);

/// Identifier wrapper for a time slot within a schedule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSlotId(pub String);

/// Identifier wrapper for an externally-owned section (grade group).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SectionId(pub String);

/// Identifier wrapper for an externally-owned subject.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub String);

/// Identifier wrapper for an externally-owned teacher.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeacherId(pub String);

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for TimeSlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for TeacherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Break flavor carried by non-teaching slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    Recess,
    Lunch,
}

/// One fixed interval of the daily grid. Break slots occupy real time but can
/// never hold an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: TimeSlotId,
    pub label: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_kind: Option<BreakKind>,
}

impl TimeSlot {
    pub fn is_break(&self) -> bool {
        self.break_kind.is_some()
    }
}

/// Externally-owned section reference resolved through the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub grade: u8,
    pub name: String,
    pub academic_year: String,
    pub student_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homeroom_teacher: Option<TeacherId>,
}

/// Externally-owned subject reference. The engine validates placement, never
/// curriculum correctness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub code: String,
}

/// Externally-owned teacher reference with the qualification and capacity
/// facts the engine consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    pub qualified_subjects: BTreeSet<SubjectId>,
    pub weekly_capacity: u32,
}

impl Teacher {
    pub fn is_qualified_for(&self, subject: &SubjectId) -> bool {
        self.qualified_subjects.contains(subject)
    }
}

/// Tagged assignment variant. REGULAR recurs on every date the schedule
/// covers; SUBSTITUTE and EXAM are scoped to one effective date and override
/// the regular layer for that date only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
    Regular,
    Substitute,
    Exam,
}

impl AssignmentKind {
    pub const fn label(self) -> &'static str {
        match self {
            AssignmentKind::Regular => "regular",
            AssignmentKind::Substitute => "substitute",
            AssignmentKind::Exam => "exam",
        }
    }

    pub const fn is_overlay(self) -> bool {
        matches!(self, AssignmentKind::Substitute | AssignmentKind::Exam)
    }
}

impl fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The central fact stored by the engine: who teaches what, where, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub schedule_id: ScheduleId,
    pub slot_id: TimeSlotId,
    pub section_id: SectionId,
    pub subject_id: SubjectId,
    pub teacher_id: TeacherId,
    pub kind: AssignmentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<NaiveDate>,
}

impl Assignment {
    pub fn key(&self) -> AssignmentKey {
        AssignmentKey {
            slot_id: self.slot_id.clone(),
            section_id: self.section_id.clone(),
            kind: self.kind,
            effective_date: self.effective_date,
        }
    }
}

/// Natural key of an assignment within its schedule; upserts replace on key
/// equality and removals address by key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssignmentKey {
    pub slot_id: TimeSlotId,
    pub section_id: SectionId,
    pub kind: AssignmentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<NaiveDate>,
}

/// Caller-supplied payload for `upsert_assignment`, before the schedule id
/// and reference resolution are stamped on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDraft {
    pub slot_id: TimeSlotId,
    pub section_id: SectionId,
    pub subject_id: SubjectId,
    pub teacher_id: TeacherId,
    pub kind: AssignmentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<NaiveDate>,
}

impl AssignmentDraft {
    pub fn into_assignment(self, schedule_id: ScheduleId) -> Assignment {
        Assignment {
            schedule_id,
            slot_id: self.slot_id,
            section_id: self.section_id,
            subject_id: self.subject_id,
            teacher_id: self.teacher_id,
            kind: self.kind,
            effective_date: self.effective_date,
        }
    }
}

/// Lifecycle state of a schedule. The only transitions are
/// DRAFT -> FINALIZED -> ARCHIVED, each one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Draft,
    Finalized,
    Archived,
}

impl ScheduleStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ScheduleStatus::Draft => "draft",
            ScheduleStatus::Finalized => "finalized",
            ScheduleStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
