//! Builds random, preference-aware candidate timetables.

use log::{debug, trace};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use std::collections::{HashMap, HashSet};

use crate::data::{Batch, Classroom, Day, Period, ScheduleEntry, Slot, Subject, Timetable};
use crate::problem::Problem;

const UNASSIGNED: &str = "TBD";

/// Classrooms already handed out at each slot within one candidate.
#[derive(Debug, Default)]
pub struct RoomLedger<'a> {
    taken: HashSet<(Slot, &'a str)>,
}

impl<'a> RoomLedger<'a> {
    pub fn is_free(&self, slot: Slot, classroom: &'a str) -> bool {
        !self.taken.contains(&(slot, classroom))
    }

    pub fn reserve(&mut self, slot: Slot, classroom: &'a str) {
        self.taken.insert((slot, classroom));
    }
}

/// A day (and possibly a fixed period) chosen for one class before a room is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placement {
    day: Day,
    period: Option<Period>,
    preferred: bool,
}

/// Produces one complete timetable for every batch in `problem`.
///
/// Room clashes are avoided where a free room exists; when none does, the first
/// classroom is reused and the clash is left for the fitness evaluator to punish.
pub fn generate<R: Rng + ?Sized>(problem: &Problem<'_>, rng: &mut R) -> Timetable {
    let mut ledger = RoomLedger::default();
    let mut timetable = Vec::new();

    for batch in &problem.batches {
        let teachers: HashMap<&str, &str> = batch
            .subject_teacher_assignments
            .iter()
            .filter_map(|a| Some((a.subject.as_str(), a.teacher.as_deref()?)))
            .collect();

        for subject_id in &batch.subjects {
            let Some(subject) = problem.catalog.subject(subject_id) else {
                trace!("Batch {} lists unknown subject {}", batch.id, subject_id);
                continue;
            };
            let teacher_id = teachers.get(subject_id.as_str()).copied();
            let faculty = teacher_id
                .and_then(|id| problem.catalog.faculty(id))
                .map_or(UNASSIGNED, |f| f.name.as_str());

            for placement in plan_placements(problem, batch, subject, teacher_id, rng) {
                let period = placement.period.unwrap_or_else(|| Period::random(rng));
                let slot = Slot::new(placement.day, period);
                let classroom = pick_classroom(problem, batch, slot, &ledger, rng);
                if let Some(room) = classroom {
                    ledger.reserve(slot, &room.id);
                }

                timetable.push(ScheduleEntry {
                    batch_id: batch.id.clone(),
                    subject_id: subject.id.clone(),
                    classroom_id: classroom.map(|room| room.id.clone()),
                    batch: batch.name.clone(),
                    subject: subject.name.clone(),
                    faculty: faculty.to_string(),
                    classroom: classroom.map_or(UNASSIGNED, |room| room.name.as_str()).to_string(),
                    department: batch.department.clone(),
                    shift: batch.shift.clone(),
                    day: slot.day,
                    period: slot.period,
                    preferred: placement.preferred,
                });
            }
        }
    }

    timetable
}

/// Decides the days of a subject's weekly classes.
///
/// Pinned subject slots go first, then the teacher's preferred slots, both subject to
/// the daily cap and the weekly quota. The rest of the quota is dealt round-robin over
/// a freshly shuffled day order until it is used up.
fn plan_placements<R: Rng + ?Sized>(
    problem: &Problem<'_>,
    batch: &Batch,
    subject: &Subject,
    teacher_id: Option<&str>,
    rng: &mut R,
) -> Vec<Placement> {
    let max_per_day = subject.max_classes_per_day;
    let mut remaining = subject.required_classes_per_week;
    let mut per_day = [0u32; Day::ALL.len()];
    let mut placements = Vec::new();

    let mut seeded: Vec<Slot> = problem
        .constraints
        .subject_slots(&batch.id, &subject.id)
        .to_vec();
    if let Some(teacher) = teacher_id {
        seeded.extend(problem.constraints.teacher_slots(&batch.id, teacher));
    }

    for slot in seeded {
        if remaining > 0 && per_day[slot.day.index()] < max_per_day {
            placements.push(Placement {
                day: slot.day,
                period: Some(slot.period),
                preferred: true,
            });
            per_day[slot.day.index()] += 1;
            remaining -= 1;
        }
    }

    let mut day_order = Day::ALL;
    while remaining > 0 {
        day_order.shuffle(rng);
        let before = remaining;
        for day in day_order {
            if remaining > 0 && per_day[day.index()] < max_per_day {
                placements.push(Placement {
                    day,
                    period: None,
                    preferred: false,
                });
                per_day[day.index()] += 1;
                remaining -= 1;
            }
        }
        if remaining == before {
            debug!(
                "Cannot place {} more classes of {} for batch {} (max {} per day)",
                remaining, subject.name, batch.name, max_per_day
            );
            break;
        }
    }

    placements
}

/// Preferred room if free, then a free room of the batch, then any free room, then the
/// first room regardless of clashes.
fn pick_classroom<'a, R: Rng + ?Sized>(
    problem: &Problem<'a>,
    batch: &Batch,
    slot: Slot,
    ledger: &RoomLedger<'a>,
    rng: &mut R,
) -> Option<&'a Classroom> {
    let catalog = &problem.catalog;

    if let Some(room) = problem
        .constraints
        .classroom_preference(&batch.id, slot)
        .and_then(|id| catalog.classroom(id))
    {
        if ledger.is_free(slot, &room.id) {
            return Some(room);
        }
    }

    let free: Vec<&'a Classroom> = catalog
        .classrooms()
        .filter(|room| ledger.is_free(slot, &room.id))
        .collect();
    let own: Vec<&'a Classroom> = free
        .iter()
        .copied()
        .filter(|room| batch.classrooms.contains(&room.id))
        .collect();

    own.choose(rng)
        .or_else(|| free.choose(rng))
        .copied()
        .or_else(|| catalog.first_classroom())
}
