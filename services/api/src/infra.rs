use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use classtime::scheduling::{
    RefKind, ReferenceRegistry, RegistryError, Section, SectionId, Subject, SubjectId, Teacher,
    TeacherId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory master-data double standing in for the external CRUD services.
#[derive(Default, Clone)]
pub(crate) struct InMemoryReferenceRegistry {
    sections: Arc<Mutex<HashMap<SectionId, Section>>>,
    subjects: Arc<Mutex<HashMap<SubjectId, Subject>>>,
    teachers: Arc<Mutex<HashMap<TeacherId, Teacher>>>,
}

impl InMemoryReferenceRegistry {
    pub(crate) fn add_section(&self, section: Section) {
        self.sections
            .lock()
            .expect("section mutex poisoned")
            .insert(section.id.clone(), section);
    }

    pub(crate) fn add_subject(&self, subject: Subject) {
        self.subjects
            .lock()
            .expect("subject mutex poisoned")
            .insert(subject.id.clone(), subject);
    }

    pub(crate) fn add_teacher(&self, teacher: Teacher) {
        self.teachers
            .lock()
            .expect("teacher mutex poisoned")
            .insert(teacher.id.clone(), teacher);
    }
}

impl ReferenceRegistry for InMemoryReferenceRegistry {
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

/// Demo roster used by `serve` and the CLI walkthrough until the real
/// master-data services are wired in.
pub(crate) fn sample_roster() -> InMemoryReferenceRegistry {
    let registry = InMemoryReferenceRegistry::default();

    for (id, grade, name) in [("10-A", 10u8, "Section A"), ("10-B", 10, "Section B")] {
        registry.add_section(Section {
            id: SectionId(id.to_string()),
            grade,
            name: name.to_string(),
            academic_year: "2025-2026".to_string(),
            student_count: 32,
            homeroom_teacher: None,
        });
    }

    for (id, name, code) in [
        ("MATH", "Mathematics", "MAT-10"),
        ("ENG", "English", "ENG-10"),
        ("SCI", "Science", "SCI-10"),
    ] {
        registry.add_subject(Subject {
            id: SubjectId(id.to_string()),
            name: name.to_string(),
            code: code.to_string(),
        });
    }

    for (id, name, subjects, capacity) in [
        ("T-100", "R. Iyer", vec!["MATH"], 24u32),
        ("T-101", "M. Okafor", vec!["ENG"], 24),
        ("T-102", "S. Haddad", vec!["SCI", "MATH"], 18),
        ("T-103", "L. Petrov", vec!["MATH", "SCI"], 12),
    ] {
        registry.add_teacher(Teacher {
            id: TeacherId(id.to_string()),
            name: name.to_string(),
            qualified_subjects: subjects
                .into_iter()
                .map(|subject| SubjectId(subject.to_string()))
                .collect::<BTreeSet<_>>(),
            weekly_capacity: capacity,
        });
    }

    registry
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
