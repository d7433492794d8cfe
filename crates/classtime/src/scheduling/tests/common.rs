use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveTime};

use crate::scheduling::domain::{
    AssignmentDraft, AssignmentKind, BreakKind, ScheduleId, Section, SectionId, Subject, SubjectId,
    Teacher, TeacherId, TimeSlot, TimeSlotId,
};
use crate::scheduling::policy::SchedulingPolicy;
use crate::scheduling::registry::{RefKind, ReferenceRegistry, RegistryError};
use crate::scheduling::service::SchedulingService;

#[derive(Default)]
pub(super) struct StaticRegistry {
    sections: Mutex<HashMap<SectionId, Section>>,
    subjects: Mutex<HashMap<SubjectId, Subject>>,
    teachers: Mutex<HashMap<TeacherId, Teacher>>,
}

impl StaticRegistry {
    pub(super) fn add_section(&self, section: Section) {
        self.sections
            .lock()
            .expect("section mutex poisoned")
            .insert(section.id.clone(), section);
    }

    pub(super) fn add_subject(&self, subject: Subject) {
        self.subjects
            .lock()
            .expect("subject mutex poisoned")
            .insert(subject.id.clone(), subject);
    }

    pub(super) fn add_teacher(&self, teacher: Teacher) {
        self.teachers
            .lock()
            .expect("teacher mutex poisoned")
            .insert(teacher.id.clone(), teacher);
    }
}

impl ReferenceRegistry for StaticRegistry {
    fn section(&self, id: &SectionId) -> Result<Section, RegistryError> {
        self.sections
            .lock()
            .expect("section mutex poisoned")
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                kind: RefKind::Section,
                id: id.0.clone(),
            })
    }

    fn subject(&self, id: &SubjectId) -> Result<Subject, RegistryError> {
        self.subjects
            .lock()
            .expect("subject mutex poisoned")
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                kind: RefKind::Subject,
                id: id.0.clone(),
            })
    }

    fn teacher(&self, id: &TeacherId) -> Result<Teacher, RegistryError> {
        self.teachers
            .lock()
            .expect("teacher mutex poisoned")
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                kind: RefKind::Teacher,
                id: id.0.clone(),
            })
    }
}

/// Registry double simulating an unreachable master-data service.
pub(super) struct TimeoutRegistry;

impl ReferenceRegistry for TimeoutRegistry {
    fn section(&self, _id: &SectionId) -> Result<Section, RegistryError> {
        Err(RegistryError::Timeout("deadline exceeded".to_string()))
    }

    fn subject(&self, _id: &SubjectId) -> Result<Subject, RegistryError> {
        Err(RegistryError::Timeout("deadline exceeded".to_string()))
    }

    fn teacher(&self, _id: &TeacherId) -> Result<Teacher, RegistryError> {
        Err(RegistryError::Timeout("deadline exceeded".to_string()))
    }
}

pub(super) fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
}

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// A date safely in the future for overlay tests under the default
/// past-overlay rejection.
pub(super) fn future_date() -> NaiveDate {
    date(2099, 6, 1)
}

pub(super) fn slot(id: &str, label: &str, start: NaiveTime, end: NaiveTime) -> TimeSlot {
    TimeSlot {
        id: TimeSlotId(id.to_string()),
        label: label.to_string(),
        start,
        end,
        break_kind: None,
    }
}

pub(super) fn break_slot(
    id: &str,
    label: &str,
    start: NaiveTime,
    end: NaiveTime,
    kind: BreakKind,
) -> TimeSlot {
    TimeSlot {
        break_kind: Some(kind),
        ..slot(id, label, start, end)
    }
}

/// P1/P2, recess, P3 for two sections of grade 10.
pub(super) fn sample_slots() -> Vec<TimeSlot> {
    vec![
        slot("P1", "Period 1", time(9, 0), time(9, 45)),
        slot("P2", "Period 2", time(9, 45), time(10, 30)),
        break_slot("BR", "Recess", time(10, 30), time(10, 45), BreakKind::Recess),
        slot("P3", "Period 3", time(10, 45), time(11, 30)),
    ]
}

pub(super) fn section(id: &str, grade: u8, name: &str) -> Section {
    Section {
        id: SectionId(id.to_string()),
        grade,
        name: name.to_string(),
        academic_year: "2025-2026".to_string(),
        student_count: 32,
        homeroom_teacher: None,
    }
}

pub(super) fn subject(id: &str, name: &str, code: &str) -> Subject {
    Subject {
        id: SubjectId(id.to_string()),
        name: name.to_string(),
        code: code.to_string(),
    }
}

pub(super) fn teacher(id: &str, name: &str, subjects: &[&str], capacity: u32) -> Teacher {
    Teacher {
        id: TeacherId(id.to_string()),
        name: name.to_string(),
        qualified_subjects: subjects
            .iter()
            .map(|subject| SubjectId(subject.to_string()))
            .collect::<BTreeSet<_>>(),
        weekly_capacity: capacity,
    }
}

pub(super) fn seeded_registry() -> Arc<StaticRegistry> {
    let registry = Arc::new(StaticRegistry::default());
    registry.add_section(section("10-A", 10, "Section A"));
    registry.add_section(section("10-B", 10, "Section B"));
    registry.add_subject(subject("MATH", "Mathematics", "MAT-10"));
    registry.add_subject(subject("ENG", "English", "ENG-10"));
    registry.add_subject(subject("PHY", "Physics", "PHY-10"));
    registry.add_teacher(teacher("T1", "R. Iyer", &["MATH", "ENG"], 20));
    registry.add_teacher(teacher("T2", "M. Okafor", &["ENG"], 10));
    registry.add_teacher(teacher("T3", "S. Haddad", &["MATH"], 4));
    registry
}

pub(super) fn build_service() -> (Arc<SchedulingService<StaticRegistry>>, Arc<StaticRegistry>) {
    build_service_with_policy(SchedulingPolicy::default())
}

pub(super) fn build_service_with_policy(
    policy: SchedulingPolicy,
) -> (Arc<SchedulingService<StaticRegistry>>, Arc<StaticRegistry>) {
    let registry = seeded_registry();
    let service = Arc::new(SchedulingService::new(registry.clone(), policy));
    (service, registry)
}

pub(super) fn draft_schedule(service: &SchedulingService<StaticRegistry>) -> ScheduleId {
    service
        .create_schedule(
            "Grade 10 weekly timetable",
            "2025-2026",
            sample_slots(),
            vec![SectionId("10-A".to_string()), SectionId("10-B".to_string())],
        )
        .expect("schedule creation succeeds")
        .id
}

pub(super) fn regular(slot: &str, section: &str, subject: &str, teacher: &str) -> AssignmentDraft {
    AssignmentDraft {
        slot_id: TimeSlotId(slot.to_string()),
        section_id: SectionId(section.to_string()),
        subject_id: SubjectId(subject.to_string()),
        teacher_id: TeacherId(teacher.to_string()),
        kind: AssignmentKind::Regular,
        effective_date: None,
    }
}

pub(super) fn overlay(
    kind: AssignmentKind,
    slot: &str,
    section: &str,
    subject: &str,
    teacher: &str,
    effective: NaiveDate,
) -> AssignmentDraft {
    AssignmentDraft {
        effective_date: Some(effective),
        kind,
        ..regular(slot, section, subject, teacher)
    }
}
