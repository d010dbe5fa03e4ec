//! Fast lookups over the administrator's slot preferences.

use std::collections::HashMap;

use crate::data::{BatchId, Constraint, Slot, SubjectId};

/// Preferred placements keyed by batch and subject, plus on-demand filters over the
/// remaining constraint kinds.
///
/// Built once per run; constraints are never mutated while a run is in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintIndex<'a> {
    subject_slots: HashMap<BatchId, HashMap<SubjectId, Vec<Slot>>>,
    constraints: &'a [Constraint],
}

impl<'a> ConstraintIndex<'a> {
    pub fn build(constraints: &'a [Constraint]) -> Self {
        let mut subject_slots: HashMap<BatchId, HashMap<SubjectId, Vec<Slot>>> = HashMap::new();
        for constraint in constraints {
            if let Constraint::SubjectSlotPreference { batch, subject, .. } = constraint {
                subject_slots
                    .entry(batch.clone())
                    .or_default()
                    .entry(subject.clone())
                    .or_default()
                    .push(constraint.slot());
            }
        }
        Self {
            subject_slots,
            constraints,
        }
    }

    /// Slots a subject is pinned to for a batch, in declaration order.
    pub fn subject_slots(&self, batch: &str, subject: &str) -> &[Slot] {
        self.subject_slots
            .get(batch)
            .and_then(|subjects| subjects.get(subject))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Slots a teacher asked for when teaching a batch.
    pub fn teacher_slots<'s>(
        &'s self,
        batch: &'s str,
        faculty: &'s str,
    ) -> impl Iterator<Item = Slot> + 's {
        self.constraints.iter().filter_map(move |constraint| match constraint {
            Constraint::TeacherSlotPreference {
                batch: b,
                faculty: f,
                ..
            } if b == batch && f == faculty => Some(constraint.slot()),
            _ => None,
        })
    }

    /// The classroom a batch asked for at a slot. When several match, the first wins.
    pub fn classroom_preference(&self, batch: &str, slot: Slot) -> Option<&'a str> {
        self.constraints.iter().find_map(|constraint| match constraint {
            Constraint::ClassroomPreference {
                batch: b,
                classroom,
                ..
            } if b == batch && constraint.slot() == slot => Some(classroom.as_str()),
            _ => None,
        })
    }
}
