//! Scores candidate timetables. Higher is better; 0 means nothing is violated.

use itertools::Itertools;
use std::collections::{HashMap, HashSet};

use crate::data::{Day, Fitness, ScheduleEntry, Violation, ViolationKind};
use crate::problem::Problem;

pub const BATCH_CLASH_PENALTY: Fitness = 5;
pub const CLASSROOM_CLASH_PENALTY: Fitness = 10;
pub const SUBJECT_SLOT_PENALTY: Fitness = 100;
pub const CLASSROOM_PREFERENCE_PENALTY: Fitness = 50;
pub const DAILY_OVERFLOW_PENALTY: Fitness = 10;
pub const WEEKLY_SHORTFALL_PENALTY: Fitness = 20;
pub const WEEKLY_EXCESS_PENALTY: Fitness = 10;

/// Score plus every penalty that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitnessReport {
    pub score: Fitness,
    pub violations: Vec<Violation>,
}

/// Scalar fitness of a timetable.
pub fn score(problem: &Problem<'_>, timetable: &[ScheduleEntry]) -> Fitness {
    let mut total = 0;
    assess(problem, timetable, |_, penalty, _| total -= penalty);
    total
}

/// Fitness with an itemised list of violations. Per-entry violations come first in
/// timetable order, followed by the daily and weekly count violations.
pub fn report(problem: &Problem<'_>, timetable: &[ScheduleEntry]) -> FitnessReport {
    let mut score = 0;
    let mut violations = Vec::new();
    assess(problem, timetable, |kind, penalty, describe| {
        score -= penalty;
        violations.push(Violation {
            kind,
            penalty,
            description: describe(),
        });
    });
    FitnessReport { score, violations }
}

fn assess<F>(problem: &Problem<'_>, timetable: &[ScheduleEntry], mut record: F)
where
    F: FnMut(ViolationKind, Fitness, &dyn Fn() -> String),
{
    let mut batch_slots = HashSet::new();
    let mut room_slots = HashSet::new();
    let mut daily: HashMap<(&str, &str, Day), i64> = HashMap::new();
    let mut weekly: HashMap<(&str, &str), i64> = HashMap::new();

    // subjects that received no classes still owe their quota
    for batch in &problem.batches {
        for subject in &batch.subjects {
            if problem.catalog.subject(subject).is_some() {
                weekly.entry((batch.id.as_str(), subject.as_str())).or_insert(0);
            }
        }
    }

    for entry in timetable {
        let slot = entry.slot();

        if !batch_slots.insert((entry.batch_id.as_str(), slot)) {
            record(ViolationKind::BatchClash, BATCH_CLASH_PENALTY, &|| {
                format!("{} has more than one class at {}", entry.batch, slot)
            });
        }

        if let Some(room) = entry.classroom_id.as_deref() {
            if !room_slots.insert((slot, room)) {
                record(ViolationKind::ClassroomClash, CLASSROOM_CLASH_PENALTY, &|| {
                    format!("{} is double-booked at {} ({})", entry.classroom, slot, entry.batch)
                });
            }
        }

        let pinned = problem.constraints.subject_slots(&entry.batch_id, &entry.subject_id);
        if !pinned.is_empty() && !pinned.contains(&slot) {
            record(ViolationKind::SubjectSlot, SUBJECT_SLOT_PENALTY, &|| {
                format!(
                    "{} for {} is at {}, outside its preferred slots",
                    entry.subject, entry.batch, slot
                )
            });
        }

        if let Some(wanted) = problem
            .constraints
            .classroom_preference(&entry.batch_id, slot)
            .and_then(|id| problem.catalog.classroom(id))
        {
            if entry.classroom_id.as_deref() != Some(wanted.id.as_str()) {
                record(
                    ViolationKind::ClassroomPreference,
                    CLASSROOM_PREFERENCE_PENALTY,
                    &|| {
                        format!(
                            "{} wanted {} at {} but got {}",
                            entry.batch, wanted.name, slot, entry.classroom
                        )
                    },
                );
            }
        }

        *daily
            .entry((entry.batch_id.as_str(), entry.subject_id.as_str(), entry.day))
            .or_insert(0) += 1;
        *weekly
            .entry((entry.batch_id.as_str(), entry.subject_id.as_str()))
            .or_insert(0) += 1;
    }

    for ((batch, subject_id, day), count) in daily.into_iter().sorted() {
        let Some(subject) = problem.catalog.subject(subject_id) else {
            continue;
        };
        let excess = count - i64::from(subject.max_classes_per_day);
        if excess > 0 {
            record(
                ViolationKind::DailyOverflow,
                excess * DAILY_OVERFLOW_PENALTY,
                &|| {
                    format!(
                        "{} has {} classes of {} on {} (max {})",
                        batch, count, subject.name, day, subject.max_classes_per_day
                    )
                },
            );
        }
    }

    for ((batch, subject_id), count) in weekly.into_iter().sorted() {
        let Some(subject) = problem.catalog.subject(subject_id) else {
            continue;
        };
        let required = i64::from(subject.required_classes_per_week);
        if count < required {
            record(
                ViolationKind::WeeklyShortfall,
                (required - count) * WEEKLY_SHORTFALL_PENALTY,
                &|| format!("{} has {} of {} weekly classes of {}", batch, count, required, subject.name),
            );
        } else if count > required {
            record(
                ViolationKind::WeeklyExcess,
                (count - required) * WEEKLY_EXCESS_PENALTY,
                &|| format!("{} has {} of {} weekly classes of {}", batch, count, required, subject.name),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Batch, Classroom, Constraint, Period, SchedulingInput, Subject};

    fn input(constraints: Vec<Constraint>) -> SchedulingInput {
        let batch = |id: &str| Batch {
            id: id.into(),
            name: id.to_uppercase(),
            department: "CS".into(),
            shift: "Day".into(),
            subjects: vec!["s1".into()],
            classrooms: Vec::new(),
            teachers: Vec::new(),
            subject_teacher_assignments: Vec::new(),
        };
        SchedulingInput {
            batches: vec![batch("b1"), batch("b2")],
            subjects: vec![Subject {
                id: "s1".into(),
                name: "Maths".into(),
                required_classes_per_week: 2,
                max_classes_per_day: 1,
            }],
            faculty: Vec::new(),
            classrooms: ["r1", "r2"]
                .iter()
                .map(|id| Classroom {
                    id: id.to_string(),
                    name: id.to_uppercase(),
                    capacity: 30,
                    kind: String::new(),
                })
                .collect(),
            constraints,
        }
    }

    fn entry(batch: &str, room: &str, day: Day, period: Period) -> ScheduleEntry {
        ScheduleEntry {
            batch_id: batch.into(),
            subject_id: "s1".into(),
            classroom_id: Some(room.into()),
            batch: batch.to_uppercase(),
            subject: "Maths".into(),
            faculty: "TBD".into(),
            classroom: room.to_uppercase(),
            department: "CS".into(),
            shift: "Day".into(),
            day,
            period,
            preferred: false,
        }
    }

    /// Both batches meet their quota on separate days and rooms.
    fn clean() -> Vec<ScheduleEntry> {
        vec![
            entry("b1", "r1", Day::Monday, Period::First),
            entry("b1", "r1", Day::Tuesday, Period::First),
            entry("b2", "r2", Day::Monday, Period::First),
            entry("b2", "r2", Day::Tuesday, Period::First),
        ]
    }

    #[test]
    fn clean_timetable_scores_zero() {
        let input = input(Vec::new());
        let problem = Problem::all_batches(&input);
        let report = report(&problem, &clean());
        assert_eq!(report.score, 0);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn classroom_clash_costs_ten_per_extra_booking() {
        let input = input(Vec::new());
        let problem = Problem::all_batches(&input);
        let mut timetable = clean();
        timetable[2].classroom_id = Some("r1".into());
        assert_eq!(score(&problem, &timetable), -10);

        let mut timetable = clean();
        timetable[2].classroom_id = Some("r1".into());
        timetable.push(entry("b2", "r1", Day::Monday, Period::First));
        timetable[3].day = Day::Wednesday;
        // b2 twice at Monday P1 (-5), two extra r1 bookings at Monday P1 (-20),
        // two Maths classes for b2 on Monday (-10), one over the weekly quota (-10)
        assert_eq!(score(&problem, &timetable), -45);
    }

    #[test]
    fn same_batch_same_slot_costs_five() {
        let input = input(Vec::new());
        let problem = Problem::all_batches(&input);
        let mut timetable = clean();
        timetable[1].day = Day::Monday;
        timetable[1].classroom_id = Some("r3".into());
        // b1 twice at Monday P1 (-5) and Maths twice on Monday for b1 (-10)
        let report = report(&problem, &timetable);
        assert_eq!(report.score, -15);
        let kinds: Vec<ViolationKind> = report.violations.iter().map(|v| v.kind).collect();
        assert_eq!(kinds, vec![ViolationKind::BatchClash, ViolationKind::DailyOverflow]);
    }

    #[test]
    fn daily_overflow_costs_ten_per_excess() {
        let input = input(Vec::new());
        let problem = Problem::all_batches(&input);
        let timetable = vec![
            entry("b1", "r1", Day::Friday, Period::First),
            entry("b1", "r1", Day::Friday, Period::Second),
            entry("b1", "r1", Day::Friday, Period::Third),
            entry("b2", "r2", Day::Monday, Period::First),
            entry("b2", "r2", Day::Tuesday, Period::First),
        ];
        // b1: two over the daily cap (-20) and one over the weekly quota (-10)
        assert_eq!(score(&problem, &timetable), -30);
    }

    #[test]
    fn weekly_deviation_is_asymmetric() {
        let input = input(Vec::new());
        let problem = Problem::all_batches(&input);

        let mut short = clean();
        short.remove(3);
        short.remove(2);
        // b2 has no classes at all
        assert_eq!(score(&problem, &short), -40);

        let mut long = clean();
        long.push(entry("b1", "r1", Day::Wednesday, Period::First));
        long.push(entry("b1", "r1", Day::Thursday, Period::First));
        assert_eq!(score(&problem, &long), -20);
    }

    #[test]
    fn subject_slot_preference_costs_hundred_per_entry() {
        let input = input(vec![Constraint::SubjectSlotPreference {
            batch: "b1".into(),
            subject: "s1".into(),
            day: Day::Monday,
            slot: Period::First,
        }]);
        let problem = Problem::all_batches(&input);
        // b1's Tuesday class misses the pinned slot
        assert_eq!(score(&problem, &clean()), -100);
    }

    #[test]
    fn classroom_preference_costs_fifty() {
        let input = input(vec![
            Constraint::ClassroomPreference {
                batch: "b1".into(),
                classroom: "r2".into(),
                day: Day::Tuesday,
                slot: Period::First,
            },
            Constraint::ClassroomPreference {
                batch: "b2".into(),
                classroom: "gone".into(),
                day: Day::Monday,
                slot: Period::First,
            },
        ]);
        let problem = Problem::all_batches(&input);
        let report = report(&problem, &clean());
        assert_eq!(report.score, -50);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].kind, ViolationKind::ClassroomPreference);
        assert_eq!(
            report.violations[0].description,
            "B1 wanted R2 at Tuesday Period 1 but got R1"
        );
    }

    #[test]
    fn report_sums_to_score() {
        let input = input(Vec::new());
        let problem = Problem::all_batches(&input);
        let timetable: Vec<ScheduleEntry> = (0..4)
            .map(|_| entry("b1", "r1", Day::Saturday, Period::Sixth))
            .collect();
        let report = report(&problem, &timetable);
        let total: Fitness = report.violations.iter().map(|v| v.penalty).sum();
        assert_eq!(report.score, -total);
        assert_eq!(report.score, score(&problem, &timetable));
    }
}
