use super::common::*;
use crate::scheduling::domain::{BreakKind, TimeSlotId};
use crate::scheduling::error::SchedulingError;
use crate::scheduling::grid::SlotGrid;

#[test]
fn slots_come_back_in_start_order() {
    let mut grid = SlotGrid::new();
    grid.insert(slot("P3", "Period 3", time(10, 45), time(11, 30)))
        .expect("insert P3");
    grid.insert(slot("P1", "Period 1", time(9, 0), time(9, 45)))
        .expect("insert P1");
    grid.insert(slot("P2", "Period 2", time(9, 45), time(10, 30)))
        .expect("insert P2");

    let order: Vec<&str> = grid.slots().iter().map(|slot| slot.id.0.as_str()).collect();
    assert_eq!(order, vec!["P1", "P2", "P3"]);
}

#[test]
fn rejects_overlapping_intervals() {
    let mut grid = SlotGrid::new();
    grid.insert(slot("P1", "Period 1", time(9, 0), time(9, 45)))
        .expect("insert P1");

    let overlapping = slot("P1b", "Half period", time(9, 30), time(10, 0));
    match grid.insert(overlapping) {
        Err(SchedulingError::Validation(message)) => {
            assert!(message.contains("overlaps"), "unexpected message: {message}");
        }
        other => panic!("expected overlap rejection, got {other:?}"),
    }
}

#[test]
fn adjacent_half_open_intervals_do_not_overlap() {
    let mut grid = SlotGrid::new();
    grid.insert(slot("P1", "Period 1", time(9, 0), time(9, 45)))
        .expect("insert P1");
    grid.insert(slot("P2", "Period 2", time(9, 45), time(10, 30)))
        .expect("back-to-back slot admitted");
}

#[test]
fn break_slots_occupy_real_time() {
    let mut grid = SlotGrid::new();
    grid.insert(break_slot(
        "BR",
        "Recess",
        time(10, 30),
        time(10, 45),
        BreakKind::Recess,
    ))
    .expect("insert break");

    let clash = slot("P3", "Period 3", time(10, 40), time(11, 25));
    assert!(matches!(
        grid.insert(clash),
        Err(SchedulingError::Validation(_))
    ));
}

#[test]
fn rejects_duplicate_ids_and_inverted_intervals() {
    let mut grid = SlotGrid::new();
    grid.insert(slot("P1", "Period 1", time(9, 0), time(9, 45)))
        .expect("insert P1");

    assert!(matches!(
        grid.insert(slot("P1", "Duplicate", time(12, 0), time(12, 45))),
        Err(SchedulingError::Validation(_))
    ));
    assert!(matches!(
        grid.insert(slot("PX", "Inverted", time(13, 0), time(12, 0))),
        Err(SchedulingError::Validation(_))
    ));
}

#[test]
fn teaching_slots_skip_breaks() {
    let grid = SlotGrid::from_slots(sample_slots()).expect("sample grid builds");
    let teaching: Vec<&str> = grid
        .teaching_slots()
        .map(|slot| slot.id.0.as_str())
        .collect();
    assert_eq!(teaching, vec!["P1", "P2", "P3"]);
}

#[test]
fn remove_unknown_slot_reports_not_found() {
    let mut grid = SlotGrid::new();
    assert!(matches!(
        grid.remove(&TimeSlotId("missing".to_string())),
        Err(SchedulingError::NotFound { .. })
    ));
}
