use rand::Rng;

use crate::data::{ScheduleEntry, Slot, Timetable};

/// Returns a copy of `timetable` in which each entry, with probability `rate`, has been
/// moved to a uniformly random slot. Rooms, subjects, teachers and batches stay put.
pub fn mutate<R: Rng + ?Sized>(timetable: &[ScheduleEntry], rate: f64, rng: &mut R) -> Timetable {
    timetable
        .iter()
        .map(|entry| {
            let mut child = entry.clone();
            if rng.random::<f64>() < rate {
                let slot = Slot::random(rng);
                child.day = slot.day;
                child.period = slot.period;
            }
            child
        })
        .collect()
}
