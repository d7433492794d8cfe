use std::fmt;

use super::domain::{Section, SectionId, Subject, SubjectId, Teacher, TeacherId};

/// Entity kinds addressable through reference lookups, used to qualify
/// not-found reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    Schedule,
    TimeSlot,
    Section,
    Subject,
    Teacher,
    Assignment,
}

impl RefKind {
    pub const fn label(self) -> &'static str {
        match self {
            RefKind::Schedule => "schedule",
            RefKind::TimeSlot => "time slot",
            RefKind::Section => "section",
            RefKind::Subject => "subject",
            RefKind::Teacher => "teacher",
            RefKind::Assignment => "assignment",
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure raised by a reference lookup.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("{kind} '{id}' is not registered")]
    NotFound { kind: RefKind, id: String },
    #[error("reference registry timed out: {0}")]
    Timeout(String),
}

/// Read-only seam to the externally-owned master data (sections, subjects,
/// teachers). Implementations fronting a remote CRUD service translate their
/// deadline into `RegistryError::Timeout`; the engine never mutates state
/// after a lookup failure.
pub trait ReferenceRegistry: Send + Sync {
    fn section(&self, id: &SectionId) -> Result<Section, RegistryError>;
    fn subject(&self, id: &SubjectId) -> Result<Subject, RegistryError>;
    fn teacher(&self, id: &TeacherId) -> Result<Teacher, RegistryError>;
}
