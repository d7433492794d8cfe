//! Scheduling and assignment engine for school operations: weekly
//! timetables, exam slots, class-teacher bindings, and substitute coverage,
//! unified behind one conflict-checked assignment model.

pub mod config;
pub mod error;
pub mod scheduling;
pub mod telemetry;
