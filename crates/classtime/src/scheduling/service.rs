use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::conflict::{self, AssignmentWarning};
use super::domain::{
    Assignment, AssignmentDraft, AssignmentKey, AssignmentKind, ScheduleId, SectionId, TeacherId,
    TimeSlot, TimeSlotId,
};
use super::error::SchedulingError;
use super::grid::SlotGrid;
use super::lifecycle::{self, CancelFlag, FinalizeOptions};
use super::load::{self, TeacherLoad};
use super::policy::SchedulingPolicy;
use super::registry::{ReferenceRegistry, RefKind};
use super::resolver::{self, EffectiveCell};
use super::store::Schedule;

static SCHEDULE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_schedule_id() -> ScheduleId {
    let id = SCHEDULE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ScheduleId(format!("sch-{id:06}"))
}

/// Admitted upsert plus any advisory warnings raised alongside it.
#[derive(Debug, Clone, Serialize)]
pub struct UpsertOutcome {
    pub assignment: Assignment,
    pub warnings: Vec<AssignmentWarning>,
}

/// Serializable snapshot of a schedule for API responses and dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleSnapshot {
    pub id: ScheduleId,
    pub name: String,
    pub academic_year: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finalized_at: Option<DateTime<Utc>>,
    pub time_slots: Vec<TimeSlot>,
    pub section_ids: Vec<SectionId>,
    pub homerooms: Vec<HomeroomBinding>,
    pub regular_assignments: usize,
    pub overlay_assignments: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeroomBinding {
    pub section_id: SectionId,
    pub teacher_id: TeacherId,
}

impl ScheduleSnapshot {
    fn of(schedule: &Schedule) -> Self {
        Self {
            id: schedule.id().clone(),
            name: schedule.name().to_string(),
            academic_year: schedule.academic_year().to_string(),
            status: schedule.status().label(),
            finalized_at: schedule.finalized_at(),
            time_slots: schedule.grid().slots().to_vec(),
            section_ids: schedule.section_ids().cloned().collect(),
            homerooms: schedule
                .homerooms()
                .iter()
                .map(|(section_id, teacher_id)| HomeroomBinding {
                    section_id: section_id.clone(),
                    teacher_id: teacher_id.clone(),
                })
                .collect(),
            regular_assignments: schedule.ledger().count_of_kind(AssignmentKind::Regular),
            overlay_assignments: schedule.ledger().count_of_kind(AssignmentKind::Substitute)
                + schedule.ledger().count_of_kind(AssignmentKind::Exam),
        }
    }
}

/// Facade composing the grid, ledger, conflict detector, load calculator,
/// and lifecycle manager behind one write-serialized surface.
///
/// Writes to one schedule are serialized by a per-schedule mutex held across
/// the whole check-then-commit sequence; the conflict decision can therefore
/// never race another writer of the same schedule. Registry lookups happen
/// before the lock is taken, so external latency never extends the critical
/// section and a lookup failure aborts with no state touched.
pub struct SchedulingService<R> {
    registry: Arc<R>,
    policy: SchedulingPolicy,
    schedules: Mutex<HashMap<ScheduleId, Arc<Mutex<Schedule>>>>,
}

impl<R> SchedulingService<R>
where
    R: ReferenceRegistry + 'static,
{
    pub fn new(registry: Arc<R>, policy: SchedulingPolicy) -> Self {
        Self {
            registry,
            policy,
            schedules: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    /// Create an empty DRAFT schedule with its slot grid and section set.
    pub fn create_schedule(
        &self,
        name: impl Into<String>,
        academic_year: impl Into<String>,
        time_slots: Vec<TimeSlot>,
        section_ids: Vec<SectionId>,
    ) -> Result<ScheduleSnapshot, SchedulingError> {
        let mut sections = Vec::with_capacity(section_ids.len());
        for section_id in &section_ids {
            sections.push(self.registry.section(section_id)?);
        }
        let grid = SlotGrid::from_slots(time_slots)?;

        let id = next_schedule_id();
        let schedule = Schedule::new(id.clone(), name.into(), academic_year.into(), grid, sections);
        let snapshot = ScheduleSnapshot::of(&schedule);

        let mut schedules = self.schedules.lock().expect("schedule map mutex poisoned");
        schedules.insert(id.clone(), Arc::new(Mutex::new(schedule)));
        info!(schedule = %id, sections = snapshot.section_ids.len(), "schedule created");
        Ok(snapshot)
    }

    fn handle(&self, id: &ScheduleId) -> Result<Arc<Mutex<Schedule>>, SchedulingError> {
        let schedules = self.schedules.lock().expect("schedule map mutex poisoned");
        schedules
            .get(id)
            .cloned()
            .ok_or_else(|| SchedulingError::NotFound {
                kind: RefKind::Schedule,
                id: id.0.clone(),
            })
    }

    /// Conflict-checked idempotent upsert. Replaces any assignment sharing
    /// the natural key; every rejection leaves the ledger untouched.
    pub fn upsert_assignment(
        &self,
        schedule_id: &ScheduleId,
        draft: AssignmentDraft,
    ) -> Result<UpsertOutcome, SchedulingError> {
        // Resolve all referenced ids up front; failures abort before any
        // state is read or written.
        self.registry.section(&draft.section_id)?;
        self.registry.subject(&draft.subject_id)?;
        let teacher = self.registry.teacher(&draft.teacher_id)?;

        let handle = self.handle(schedule_id)?;
        let mut schedule = handle.lock().expect("schedule mutex poisoned");

        schedule.admit_upsert(&draft, today(), &self.policy)?;
        let assignment = draft.into_assignment(schedule.id().clone());
        if let Err(err) = conflict::check_double_booking(&schedule, &assignment) {
            debug!(schedule = %schedule_id, code = err.code(), "assignment rejected");
            return Err(err);
        }
        let warnings =
            conflict::check_qualification(&teacher, &assignment, self.policy.qualification)?;

        schedule.ledger_mut().upsert(assignment.clone());
        Ok(UpsertOutcome {
            assignment,
            warnings,
        })
    }

    /// Remove by natural key. Dropping an overlay reverts the cell to its
    /// regular assignment for that date.
    pub fn remove_assignment(
        &self,
        schedule_id: &ScheduleId,
        key: &AssignmentKey,
    ) -> Result<Assignment, SchedulingError> {
        let handle = self.handle(schedule_id)?;
        let mut schedule = handle.lock().expect("schedule mutex poisoned");

        if schedule.ledger().get(key).is_none() {
            return Err(SchedulingError::NotFound {
                kind: RefKind::Assignment,
                id: format!(
                    "{}/{}/{}",
                    key.slot_id,
                    key.section_id,
                    key.kind.label()
                ),
            });
        }
        schedule.admit_removal(key)?;
        schedule
            .ledger_mut()
            .remove(key)
            .ok_or_else(|| SchedulingError::NotFound {
                kind: RefKind::Assignment,
                id: key.slot_id.0.clone(),
            })
    }

    pub fn add_time_slot(
        &self,
        schedule_id: &ScheduleId,
        slot: TimeSlot,
    ) -> Result<(), SchedulingError> {
        let handle = self.handle(schedule_id)?;
        let mut schedule = handle.lock().expect("schedule mutex poisoned");
        schedule.add_time_slot(slot)
    }

    pub fn remove_time_slot(
        &self,
        schedule_id: &ScheduleId,
        slot_id: &TimeSlotId,
    ) -> Result<TimeSlot, SchedulingError> {
        let handle = self.handle(schedule_id)?;
        let mut schedule = handle.lock().expect("schedule mutex poisoned");
        schedule.remove_time_slot(slot_id)
    }

    pub fn attach_section(
        &self,
        schedule_id: &ScheduleId,
        section_id: &SectionId,
    ) -> Result<(), SchedulingError> {
        let section = self.registry.section(section_id)?;
        let handle = self.handle(schedule_id)?;
        let mut schedule = handle.lock().expect("schedule mutex poisoned");
        schedule.attach_section(section)
    }

    /// Bind the class teacher for a section, replacing any previous binding
    /// for the academic year.
    pub fn set_homeroom(
        &self,
        schedule_id: &ScheduleId,
        section_id: &SectionId,
        teacher_id: &TeacherId,
    ) -> Result<Option<TeacherId>, SchedulingError> {
        let teacher = self.registry.teacher(teacher_id)?;
        let handle = self.handle(schedule_id)?;
        let mut schedule = handle.lock().expect("schedule mutex poisoned");
        schedule.set_homeroom(section_id, teacher.id)
    }

    /// Merged regular/overlay view for one date. Read-only and lock-scoped
    /// to a consistent snapshot.
    pub fn effective_schedule(
        &self,
        schedule_id: &ScheduleId,
        date: NaiveDate,
    ) -> Result<Vec<EffectiveCell>, SchedulingError> {
        let handle = self.handle(schedule_id)?;
        let schedule = handle.lock().expect("schedule mutex poisoned");
        Ok(resolver::effective_schedule(&schedule, date))
    }

    pub fn teacher_load(
        &self,
        schedule_id: &ScheduleId,
        teacher_id: &TeacherId,
    ) -> Result<TeacherLoad, SchedulingError> {
        let teacher = self.registry.teacher(teacher_id)?;
        let handle = self.handle(schedule_id)?;
        let assigned = {
            let schedule = handle.lock().expect("schedule mutex poisoned");
            load::count_regular(&schedule, teacher_id)
        };

        Ok(TeacherLoad {
            teacher_id: teacher.id,
            assigned_periods: assigned,
            weekly_capacity: teacher.weekly_capacity,
            tier: load::classify(
                assigned,
                teacher.weekly_capacity,
                &self.policy.load_thresholds,
            ),
        })
    }

    /// Workload roster across every teacher with regular periods in the
    /// schedule, ordered by teacher id.
    pub fn teacher_loads(
        &self,
        schedule_id: &ScheduleId,
    ) -> Result<Vec<TeacherLoad>, SchedulingError> {
        let handle = self.handle(schedule_id)?;
        let counts = {
            let schedule = handle.lock().expect("schedule mutex poisoned");
            load::regular_counts(&schedule)
        };

        let mut loads = Vec::with_capacity(counts.len());
        for (teacher_id, assigned) in counts {
            let teacher = self.registry.teacher(&teacher_id)?;
            loads.push(TeacherLoad {
                teacher_id: teacher.id,
                assigned_periods: assigned,
                weekly_capacity: teacher.weekly_capacity,
                tier: load::classify(
                    assigned,
                    teacher.weekly_capacity,
                    &self.policy.load_thresholds,
                ),
            });
        }
        Ok(loads)
    }

    pub fn finalize(
        &self,
        schedule_id: &ScheduleId,
        options: FinalizeOptions,
        cancel: &CancelFlag,
    ) -> Result<ScheduleSnapshot, SchedulingError> {
        let handle = self.handle(schedule_id)?;
        let mut schedule = handle.lock().expect("schedule mutex poisoned");
        lifecycle::finalize(&mut schedule, options, cancel)?;
        info!(schedule = %schedule_id, "schedule finalized");
        Ok(ScheduleSnapshot::of(&schedule))
    }

    pub fn archive(&self, schedule_id: &ScheduleId) -> Result<ScheduleSnapshot, SchedulingError> {
        let handle = self.handle(schedule_id)?;
        let mut schedule = handle.lock().expect("schedule mutex poisoned");
        lifecycle::archive(&mut schedule)?;
        info!(schedule = %schedule_id, "schedule archived");
        Ok(ScheduleSnapshot::of(&schedule))
    }

    pub fn snapshot(&self, schedule_id: &ScheduleId) -> Result<ScheduleSnapshot, SchedulingError> {
        let handle = self.handle(schedule_id)?;
        let schedule = handle.lock().expect("schedule mutex poisoned");
        Ok(ScheduleSnapshot::of(&schedule))
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
