use std::sync::Arc;

use super::common::*;
use crate::scheduling::domain::{AssignmentKind, ScheduleId, SectionId, TeacherId};
use crate::scheduling::error::SchedulingError;
use crate::scheduling::policy::SchedulingPolicy;
use crate::scheduling::registry::RefKind;
use crate::scheduling::service::SchedulingService;

#[test]
fn unknown_references_surface_as_not_found_without_mutation() {
    let (service, _) = build_service();
    let schedule = draft_schedule(&service);

    match service.upsert_assignment(&schedule, regular("P1", "10-A", "MATH", "T999")) {
        Err(SchedulingError::NotFound { kind, id }) => {
            assert_eq!(kind, RefKind::Teacher);
            assert_eq!(id, "T999");
        }
        other => panic!("expected teacher not-found, got {other:?}"),
    }

    let snapshot = service.snapshot(&schedule).expect("snapshot");
    assert_eq!(snapshot.regular_assignments, 0);
}

#[test]
fn registry_timeout_aborts_the_write_with_nothing_stored() {
    let registry = Arc::new(TimeoutRegistry);
    let service = SchedulingService::new(registry, SchedulingPolicy::default());

    match service.create_schedule(
        "Doomed",
        "2025-2026",
        sample_slots(),
        vec![SectionId("10-A".to_string())],
    ) {
        Err(SchedulingError::DependencyTimeout(_)) => {}
        other => panic!("expected dependency timeout, got {other:?}"),
    }
}

#[test]
fn unknown_schedule_is_not_found() {
    let (service, _) = build_service();
    let missing = ScheduleId("sch-does-not-exist".to_string());
    assert!(matches!(
        service.snapshot(&missing),
        Err(SchedulingError::NotFound {
            kind: RefKind::Schedule,
            ..
        })
    ));
}

#[test]
fn overlays_require_an_effective_date() {
    let (service, _) = build_service();
    let schedule = draft_schedule(&service);

    let mut dateless = regular("P1", "10-A", "MATH", "T1");
    dateless.kind = AssignmentKind::Substitute;
    assert!(matches!(
        service.upsert_assignment(&schedule, dateless),
        Err(SchedulingError::Validation(_))
    ));
}

#[test]
fn regular_assignments_reject_an_effective_date() {
    let (service, _) = build_service();
    let schedule = draft_schedule(&service);

    let mut dated = regular("P1", "10-A", "MATH", "T1");
    dated.effective_date = Some(future_date());
    assert!(matches!(
        service.upsert_assignment(&schedule, dated),
        Err(SchedulingError::Validation(_))
    ));
}

#[test]
fn past_dated_overlays_follow_policy() {
    let (service, _) = build_service();
    let schedule = draft_schedule(&service);
    let long_gone = date(2020, 1, 10);

    assert!(matches!(
        service.upsert_assignment(
            &schedule,
            overlay(
                AssignmentKind::Substitute,
                "P1",
                "10-A",
                "MATH",
                "T3",
                long_gone,
            ),
        ),
        Err(SchedulingError::Validation(_))
    ));

    let (permissive, _) = build_service_with_policy(SchedulingPolicy {
        allow_past_overlays: true,
        ..SchedulingPolicy::default()
    });
    let schedule = draft_schedule(&permissive);
    permissive
        .upsert_assignment(
            &schedule,
            overlay(
                AssignmentKind::Substitute,
                "P1",
                "10-A",
                "MATH",
                "T3",
                long_gone,
            ),
        )
        .expect("back-dated correction admitted under policy");
}

#[test]
fn removing_a_missing_assignment_is_not_found() {
    let (service, _) = build_service();
    let schedule = draft_schedule(&service);

    let key = regular("P1", "10-A", "MATH", "T1")
        .into_assignment(schedule.clone())
        .key();
    assert!(matches!(
        service.remove_assignment(&schedule, &key),
        Err(SchedulingError::NotFound {
            kind: RefKind::Assignment,
            ..
        })
    ));
}

#[test]
fn homeroom_binding_replaces_per_section() {
    let (service, _) = build_service();
    let schedule = draft_schedule(&service);
    let section = SectionId("10-A".to_string());

    let previous = service
        .set_homeroom(&schedule, &section, &TeacherId("T1".to_string()))
        .expect("first binding");
    assert!(previous.is_none());

    let previous = service
        .set_homeroom(&schedule, &section, &TeacherId("T2".to_string()))
        .expect("replacement binding");
    assert_eq!(previous.map(|id| id.0), Some("T1".to_string()));

    let snapshot = service.snapshot(&schedule).expect("snapshot");
    assert_eq!(snapshot.homerooms.len(), 1);
    assert_eq!(snapshot.homerooms[0].teacher_id.0, "T2");
}

#[test]
fn homeroom_requires_an_attached_section_and_a_known_teacher() {
    let (service, _) = build_service();
    let schedule = draft_schedule(&service);

    assert!(matches!(
        service.set_homeroom(
            &schedule,
            &SectionId("11-C".to_string()),
            &TeacherId("T1".to_string()),
        ),
        Err(SchedulingError::Validation(_))
    ));
    assert!(matches!(
        service.set_homeroom(
            &schedule,
            &SectionId("10-A".to_string()),
            &TeacherId("T999".to_string()),
        ),
        Err(SchedulingError::NotFound { .. })
    ));
}

#[test]
fn concurrent_conflicting_upserts_admit_exactly_one() {
    let (service, _) = build_service();
    let schedule = draft_schedule(&service);

    let mut handles = Vec::new();
    for section in ["10-A", "10-B"] {
        let service = service.clone();
        let schedule = schedule.clone();
        let draft = regular("P1", section, "MATH", "T1");
        handles.push(std::thread::spawn(move || {
            service.upsert_assignment(&schedule, draft)
        }));
    }

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("writer thread panicked"))
        .collect();

    let admitted = results.iter().filter(|result| result.is_ok()).count();
    let conflicted = results
        .iter()
        .filter(|result| matches!(result, Err(SchedulingError::Conflict { .. })))
        .count();
    assert_eq!(admitted, 1);
    assert_eq!(conflicted, 1);
}

#[test]
fn attach_section_extends_a_draft_schedule() {
    let (service, registry) = build_service();
    registry.add_section(section("10-C", 10, "Section C"));
    let schedule = draft_schedule(&service);

    service
        .attach_section(&schedule, &SectionId("10-C".to_string()))
        .expect("attach during draft");

    let snapshot = service.snapshot(&schedule).expect("snapshot");
    assert_eq!(snapshot.section_ids.len(), 3);
}
