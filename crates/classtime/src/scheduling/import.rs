use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::conflict::AssignmentWarning;
use super::domain::{
    AssignmentDraft, AssignmentKind, ScheduleId, SectionId, SubjectId, TeacherId, TimeSlotId,
};
use super::error::SchedulingError;
use super::registry::ReferenceRegistry;
use super::service::SchedulingService;

#[derive(Debug)]
pub enum TimetableImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Scheduling { row: usize, source: SchedulingError },
}

impl std::fmt::Display for TimetableImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimetableImportError::Io(err) => write!(f, "failed to read timetable export: {}", err),
            TimetableImportError::Csv(err) => write!(f, "invalid timetable CSV data: {}", err),
            TimetableImportError::Scheduling { row, source } => {
                write!(f, "row {} rejected by the scheduling engine: {}", row, source)
            }
        }
    }
}

impl std::error::Error for TimetableImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TimetableImportError::Io(err) => Some(err),
            TimetableImportError::Csv(err) => Some(err),
            TimetableImportError::Scheduling { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for TimetableImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for TimetableImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct TimetableRow {
    slot_id: String,
    section_id: String,
    subject_id: String,
    teacher_id: String,
}

/// Outcome of a bulk load: rows applied and the advisory warnings the
/// conflict detector raised along the way.
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub applied: usize,
    pub warnings: Vec<AssignmentWarning>,
}

/// Bulk-loads the regular layer of a DRAFT schedule from a timetable CSV
/// export (`slot_id,section_id,subject_id,teacher_id`). Every row goes
/// through the same conflict-checked upsert as interactive edits, so a
/// duplicate row simply replaces its predecessor and the first genuinely
/// conflicting row aborts the import with its row number.
pub struct TimetableCsvImporter;

impl TimetableCsvImporter {
    pub fn from_path<P, R>(
        path: P,
        service: &SchedulingService<R>,
        schedule_id: &ScheduleId,
    ) -> Result<ImportSummary, TimetableImportError>
    where
        P: AsRef<Path>,
        R: ReferenceRegistry + 'static,
    {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, service, schedule_id)
    }

    pub fn from_reader<I, R>(
        reader: I,
        service: &SchedulingService<R>,
        schedule_id: &ScheduleId,
    ) -> Result<ImportSummary, TimetableImportError>
    where
        I: Read,
        R: ReferenceRegistry + 'static,
    {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut summary = ImportSummary::default();

        for (index, record) in csv_reader.deserialize::<TimetableRow>().enumerate() {
            let row = record?;
            let draft = AssignmentDraft {
                slot_id: TimeSlotId(row.slot_id),
                section_id: SectionId(row.section_id),
                subject_id: SubjectId(row.subject_id),
                teacher_id: TeacherId(row.teacher_id),
                kind: AssignmentKind::Regular,
                effective_date: None,
            };

            let outcome = service
                .upsert_assignment(schedule_id, draft)
                .map_err(|source| TimetableImportError::Scheduling {
                    // header is line 1, first data row is line 2
                    row: index + 2,
                    source,
                })?;
            summary.applied += 1;
            summary.warnings.extend(outcome.warnings);
        }

        Ok(summary)
    }
}
