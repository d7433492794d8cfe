use super::domain::{ScheduleId, ScheduleStatus, SectionId, SubjectId, TeacherId, TimeSlotId};
use super::lifecycle::CoverageGap;
use super::registry::{RefKind, RegistryError};

/// Error taxonomy for every engine operation. All variants are terminal from
/// the engine's point of view; retry policy belongs to the caller, and the
/// only transient kind is `DependencyTimeout`.
#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("{0}")]
    Validation(String),
    #[error("{kind} '{id}' not found")]
    NotFound { kind: RefKind, id: String },
    #[error("teacher '{teacher}' already covers section '{occupied_section}' at slot '{slot}'")]
    Conflict {
        teacher: TeacherId,
        slot: TimeSlotId,
        occupied_section: SectionId,
    },
    #[error("teacher '{teacher}' is not qualified for subject '{subject}'")]
    Qualification {
        teacher: TeacherId,
        subject: SubjectId,
    },
    #[error("finalization blocked by {} uncovered cell(s)", missing.len())]
    IncompleteSchedule { missing: Vec<CoverageGap> },
    #[error("schedule '{schedule}' is {status} and rejects this mutation")]
    ImmutableSchedule {
        schedule: ScheduleId,
        status: ScheduleStatus,
    },
    #[error("reference lookup timed out: {0}")]
    DependencyTimeout(String),
    #[error("operation cancelled before commit")]
    OperationCancelled,
}

impl SchedulingError {
    /// Stable machine-readable code so callers can branch without string
    /// matching.
    pub const fn code(&self) -> &'static str {
        match self {
            SchedulingError::Validation(_) => "VALIDATION",
            SchedulingError::NotFound { .. } => "NOT_FOUND",
            SchedulingError::Conflict { .. } => "CONFLICT",
            SchedulingError::Qualification { .. } => "QUALIFICATION",
            SchedulingError::IncompleteSchedule { .. } => "INCOMPLETE_SCHEDULE",
            SchedulingError::ImmutableSchedule { .. } => "IMMUTABLE_SCHEDULE",
            SchedulingError::DependencyTimeout(_) => "DEPENDENCY_TIMEOUT",
            SchedulingError::OperationCancelled => "CANCELLED",
        }
    }
}

impl From<RegistryError> for SchedulingError {
    fn from(value: RegistryError) -> Self {
        match value {
            RegistryError::NotFound { kind, id } => SchedulingError::NotFound { kind, id },
            RegistryError::Timeout(detail) => SchedulingError::DependencyTimeout(detail),
        }
    }
}
