use super::domain::{TimeSlot, TimeSlotId};
use super::error::SchedulingError;
use super::registry::RefKind;

/// Ordered, non-overlapping daily slot sequence for one schedule. The grid
/// enforces the interval invariant only; lifecycle gating happens on the
/// owning schedule.
#[derive(Debug, Clone, Default)]
pub struct SlotGrid {
    // kept sorted by start time
    slots: Vec<TimeSlot>,
}

impl SlotGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slots(slots: Vec<TimeSlot>) -> Result<Self, SchedulingError> {
        let mut grid = Self::new();
        for slot in slots {
            grid.insert(slot)?;
        }
        Ok(grid)
    }

    /// Add a slot, rejecting zero-length intervals, duplicate ids, and any
    /// `[start, end)` overlap with an existing slot. Breaks occupy real time
    /// and take part in the overlap check like any other slot.
    pub fn insert(&mut self, slot: TimeSlot) -> Result<(), SchedulingError> {
        if slot.start >= slot.end {
            return Err(SchedulingError::Validation(format!(
                "time slot '{}' must start before it ends",
                slot.id
            )));
        }
        if self.get(&slot.id).is_some() {
            return Err(SchedulingError::Validation(format!(
                "time slot '{}' already exists",
                slot.id
            )));
        }
        if let Some(existing) = self.slots.iter().find(|other| overlaps(other, &slot)) {
            return Err(SchedulingError::Validation(format!(
                "time slot '{}' ({} - {}) overlaps '{}' ({} - {})",
                slot.id, slot.start, slot.end, existing.id, existing.start, existing.end
            )));
        }

        let position = self
            .slots
            .partition_point(|other| other.start < slot.start);
        self.slots.insert(position, slot);
        Ok(())
    }

    pub fn remove(&mut self, id: &TimeSlotId) -> Result<TimeSlot, SchedulingError> {
        match self.slots.iter().position(|slot| &slot.id == id) {
            Some(index) => Ok(self.slots.remove(index)),
            None => Err(SchedulingError::NotFound {
                kind: RefKind::TimeSlot,
                id: id.0.clone(),
            }),
        }
    }

    pub fn get(&self, id: &TimeSlotId) -> Option<&TimeSlot> {
        self.slots.iter().find(|slot| &slot.id == id)
    }

    /// All slots in start-time order.
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Assignable (non-break) slots in start-time order.
    pub fn teaching_slots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.slots.iter().filter(|slot| !slot.is_break())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn overlaps(a: &TimeSlot, b: &TimeSlot) -> bool {
    a.start < b.end && b.start < a.end
}
