use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{AssignmentKind, TeacherId};
use super::policy::LoadThresholds;
use super::store::Schedule;

/// Four-tier workload badge mirroring the assignment dashboards this engine
/// consolidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadTier {
    Available,
    Medium,
    High,
    Overloaded,
}

impl LoadTier {
    pub const fn label(self) -> &'static str {
        match self {
            LoadTier::Available => "available",
            LoadTier::Medium => "medium",
            LoadTier::High => "high",
            LoadTier::Overloaded => "overloaded",
        }
    }
}

/// Read-side workload summary for one teacher in one schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherLoad {
    pub teacher_id: TeacherId,
    pub assigned_periods: u32,
    pub weekly_capacity: u32,
    pub tier: LoadTier,
}

/// Classify an assignment count against a weekly capacity. A capacity of
/// zero makes any assignment an overload.
pub fn classify(assigned: u32, capacity: u32, thresholds: &LoadThresholds) -> LoadTier {
    if capacity == 0 {
        return if assigned == 0 {
            LoadTier::Available
        } else {
            LoadTier::Overloaded
        };
    }

    let ratio = assigned as f32 / capacity as f32;
    if ratio > 1.0 {
        LoadTier::Overloaded
    } else if ratio >= thresholds.high() {
        LoadTier::High
    } else if ratio >= thresholds.medium() {
        LoadTier::Medium
    } else {
        LoadTier::Available
    }
}

/// Regular-layer period count for one teacher. Recomputed on demand, never
/// cached.
pub(crate) fn count_regular(schedule: &Schedule, teacher: &TeacherId) -> u32 {
    schedule
        .ledger()
        .iter()
        .filter(|assignment| {
            assignment.kind == AssignmentKind::Regular && &assignment.teacher_id == teacher
        })
        .count() as u32
}

/// Regular-layer period counts for every teacher appearing in the schedule.
pub(crate) fn regular_counts(schedule: &Schedule) -> BTreeMap<TeacherId, u32> {
    let mut counts = BTreeMap::new();
    for assignment in schedule.ledger().iter() {
        if assignment.kind == AssignmentKind::Regular {
            *counts.entry(assignment.teacher_id.clone()).or_insert(0u32) += 1;
        }
    }
    counts
}
