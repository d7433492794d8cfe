use crate::infra::{parse_date, sample_roster};
use chrono::{Duration, Local, NaiveDate, NaiveTime};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use classtime::error::AppError;
use classtime::scheduling::{
    AssignmentDraft, AssignmentKind, BreakKind, CancelFlag, EffectiveCell, FinalizeOptions,
    ScheduleId, ScheduleSnapshot, SchedulingPolicy, SchedulingService, SectionId, SubjectId,
    TeacherId, TimeSlot, TimeSlotId, TimetableCsvImporter,
};

use crate::infra::InMemoryReferenceRegistry;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Date for the substitute-coverage portion (defaults to tomorrow)
    #[arg(long, value_parser = parse_date)]
    pub(crate) substitute_date: Option<NaiveDate>,
    /// Print every effective cell instead of the covered ones only
    #[arg(long)]
    pub(crate) list_cells: bool,
}

#[derive(Args, Debug)]
pub(crate) struct EffectiveDayArgs {
    /// Timetable CSV export (slot_id,section_id,subject_id,teacher_id)
    #[arg(long)]
    pub(crate) timetable: PathBuf,
    /// Date to resolve (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid demo time")
}

fn standard_slots() -> Vec<TimeSlot> {
    vec![
        TimeSlot {
            id: TimeSlotId("P1".to_string()),
            label: "Period 1".to_string(),
            start: hm(9, 0),
            end: hm(9, 45),
            break_kind: None,
        },
        TimeSlot {
            id: TimeSlotId("P2".to_string()),
            label: "Period 2".to_string(),
            start: hm(9, 45),
            end: hm(10, 30),
            break_kind: None,
        },
        TimeSlot {
            id: TimeSlotId("LB".to_string()),
            label: "Lunch".to_string(),
            start: hm(12, 0),
            end: hm(12, 45),
            break_kind: Some(BreakKind::Lunch),
        },
        TimeSlot {
            id: TimeSlotId("P3".to_string()),
            label: "Period 3".to_string(),
            start: hm(13, 0),
            end: hm(13, 45),
            break_kind: None,
        },
    ]
}

fn build_engine() -> Arc<SchedulingService<InMemoryReferenceRegistry>> {
    Arc::new(SchedulingService::new(
        Arc::new(sample_roster()),
        SchedulingPolicy::default(),
    ))
}

fn create_standard_schedule(
    service: &SchedulingService<InMemoryReferenceRegistry>,
) -> Result<ScheduleSnapshot, AppError> {
    let snapshot = service.create_schedule(
        "Grade 10 weekly timetable",
        "2025-2026",
        standard_slots(),
        vec![SectionId("10-A".to_string()), SectionId("10-B".to_string())],
    )?;
    Ok(snapshot)
}

fn regular(slot: &str, section: &str, subject: &str, teacher: &str) -> AssignmentDraft {
    AssignmentDraft {
        slot_id: TimeSlotId(slot.to_string()),
        section_id: SectionId(section.to_string()),
        subject_id: SubjectId(subject.to_string()),
        teacher_id: TeacherId(teacher.to_string()),
        kind: AssignmentKind::Regular,
        effective_date: None,
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let substitute_date = args
        .substitute_date
        .unwrap_or_else(|| Local::now().date_naive() + Duration::days(1));

    let service = build_engine();
    let snapshot = create_standard_schedule(&service)?;
    let schedule_id = snapshot.id.clone();

    println!("Scheduling engine demo");
    println!(
        "Schedule {} ({}) created with {} slots and {} sections",
        schedule_id.0,
        snapshot.academic_year,
        snapshot.time_slots.len(),
        snapshot.section_ids.len()
    );

    for draft in [
        regular("P1", "10-A", "MATH", "T-100"),
        regular("P1", "10-B", "ENG", "T-101"),
        regular("P2", "10-A", "ENG", "T-101"),
        regular("P2", "10-B", "MATH", "T-100"),
        regular("P3", "10-A", "SCI", "T-102"),
        regular("P3", "10-B", "MATH", "T-103"),
    ] {
        let outcome = service.upsert_assignment(&schedule_id, draft)?;
        for warning in &outcome.warnings {
            println!("  warning: {warning}");
        }
    }

    println!("\nTeacher workload");
    for load in service.teacher_loads(&schedule_id)? {
        println!(
            "- {}: {}/{} periods ({})",
            load.teacher_id.0,
            load.assigned_periods,
            load.weekly_capacity,
            load.tier.label()
        );
    }

    let finalized = service.finalize(
        &schedule_id,
        FinalizeOptions {
            require_full_coverage: true,
        },
        &CancelFlag::new(),
    )?;
    println!(
        "\nSchedule finalized at {}",
        finalized
            .finalized_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_default()
    );

    // T-100 is out for one day; T-103 is free at P1 and math-qualified
    service.upsert_assignment(
        &schedule_id,
        AssignmentDraft {
            kind: AssignmentKind::Substitute,
            effective_date: Some(substitute_date),
            ..regular("P1", "10-A", "MATH", "T-103")
        },
    )?;
    println!("Substitute recorded: T-103 covers 10-A at P1 on {substitute_date}");

    let day = service.effective_schedule(&schedule_id, substitute_date)?;
    println!("\nEffective day {substitute_date}");
    render_cells(&day, args.list_cells);

    let next_day = substitute_date + Duration::days(1);
    let ordinary = service.effective_schedule(&schedule_id, next_day)?;
    println!("\nEffective day {next_day} (regular layer)");
    render_cells(&ordinary, args.list_cells);

    Ok(())
}

pub(crate) fn run_effective_day(args: EffectiveDayArgs) -> Result<(), AppError> {
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());

    let service = build_engine();
    let snapshot = create_standard_schedule(&service)?;
    let schedule_id: ScheduleId = snapshot.id;

    let summary = TimetableCsvImporter::from_path(&args.timetable, &service, &schedule_id)?;
    println!(
        "Imported {} assignments from {}",
        summary.applied,
        args.timetable.display()
    );
    for warning in &summary.warnings {
        println!("  warning: {warning}");
    }

    let cells = service.effective_schedule(&schedule_id, date)?;
    println!("\nEffective day {date}");
    render_cells(&cells, true);

    println!("\nTeacher workload");
    for load in service.teacher_loads(&schedule_id)? {
        println!(
            "- {}: {}/{} periods ({})",
            load.teacher_id.0,
            load.assigned_periods,
            load.weekly_capacity,
            load.tier.label()
        );
    }

    Ok(())
}

fn render_cells(cells: &[EffectiveCell], include_free: bool) {
    for cell in cells {
        match (&cell.subject_id, &cell.teacher_id, cell.source) {
            (Some(subject), Some(teacher), Some(source)) => {
                println!(
                    "- {} / {}: {} with {} [{}]",
                    cell.slot_id.0,
                    cell.section_id.0,
                    subject.0,
                    teacher.0,
                    source.label()
                );
            }
            _ if include_free => {
                println!("- {} / {}: free period", cell.slot_id.0, cell.section_id.0);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_scenario_runs_end_to_end() {
        let args = DemoArgs {
            substitute_date: Some(
                NaiveDate::from_ymd_opt(2099, 6, 1).expect("valid demo date"),
            ),
            list_cells: true,
        };
        run_demo(args).expect("demo succeeds");
    }
}
