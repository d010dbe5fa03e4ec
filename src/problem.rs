//! Read-only view of one scheduling run.

use std::collections::HashMap;

use crate::data::{Batch, Classroom, Faculty, SchedulingInput, Subject};
use crate::index::ConstraintIndex;

/// Entity lookups by id, built once per run.
#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    subjects: HashMap<&'a str, &'a Subject>,
    faculty: HashMap<&'a str, &'a Faculty>,
    classrooms: HashMap<&'a str, &'a Classroom>,
    classroom_order: &'a [Classroom],
}

impl<'a> Catalog<'a> {
    pub fn new(input: &'a SchedulingInput) -> Self {
        Self {
            subjects: input.subjects.iter().map(|s| (s.id.as_str(), s)).collect(),
            faculty: input.faculty.iter().map(|f| (f.id.as_str(), f)).collect(),
            classrooms: input.classrooms.iter().map(|c| (c.id.as_str(), c)).collect(),
            classroom_order: &input.classrooms,
        }
    }

    pub fn subject(&self, id: &str) -> Option<&'a Subject> {
        self.subjects.get(id).copied()
    }

    pub fn faculty(&self, id: &str) -> Option<&'a Faculty> {
        self.faculty.get(id).copied()
    }

    pub fn classroom(&self, id: &str) -> Option<&'a Classroom> {
        self.classrooms.get(id).copied()
    }

    /// Classrooms in input order.
    pub fn classrooms(&self) -> impl Iterator<Item = &'a Classroom> + 'a {
        self.classroom_order.iter()
    }

    /// Last-resort room used when every classroom is taken.
    pub fn first_classroom(&self) -> Option<&'a Classroom> {
        self.classroom_order.first()
    }
}

/// Batches under scheduling together with everything the generator and evaluator read.
#[derive(Debug, Clone)]
pub struct Problem<'a> {
    pub batches: Vec<&'a Batch>,
    pub catalog: Catalog<'a>,
    pub constraints: ConstraintIndex<'a>,
}

impl<'a> Problem<'a> {
    pub fn new(input: &'a SchedulingInput, batches: Vec<&'a Batch>) -> Self {
        Self {
            batches,
            catalog: Catalog::new(input),
            constraints: ConstraintIndex::build(&input.constraints),
        }
    }

    /// Schedules every batch in the input.
    pub fn all_batches(input: &'a SchedulingInput) -> Self {
        Self::new(input, input.batches.iter().collect())
    }

    /// Number of (batch, subject) pairs that resolve to a known subject.
    pub fn course_count(&self) -> usize {
        self.batches
            .iter()
            .flat_map(|batch| &batch.subjects)
            .filter(|id| self.catalog.subject(id).is_some())
            .count()
    }
}
