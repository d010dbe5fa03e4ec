use itertools::Itertools;
use log::{debug, info};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::data::{
    Batch, BatchId, Day, Mode, Period, Schedule, SchedulingOutput, SchedulingRequest, Timetable,
};
use crate::error::ScheduleError;
use crate::evolution::evolve;
use crate::fitness;
use crate::problem::Problem;

/// Generates a timetable for the batches the request selects using the evolutionary
/// search.
pub fn solve(request: &SchedulingRequest) -> Result<SchedulingOutput, ScheduleError> {
    let start_time = Instant::now();
    let input = &request.input;
    let mode = request.mode();

    let batches: Vec<&Batch> = match mode {
        Mode::AllBatches => input.batches.iter().collect(),
        Mode::Batch(id) => input.batches.iter().filter(|b| b.id == id).collect(),
    };
    if let Mode::Batch(id) = mode {
        if batches.is_empty() {
            debug!("No batch with id {}; the timetable will be empty", id);
        }
    }

    let problem = Problem::new(input, batches);
    let evolution = evolve(&problem, &request.params)?;
    let report = fitness::report(&problem, &evolution.best);
    info!(
        "Best timetable fitness {} with {} entries, found in {:.2?}",
        report.score,
        evolution.best.len(),
        start_time.elapsed()
    );

    let schedule = match mode {
        Mode::AllBatches => Schedule::AllBatches {
            batch_timetables: partition(&input.batches, evolution.best),
        },
        Mode::Batch(_) => Schedule::Batch {
            selected_batch: problem.batches.first().map(|b| b.id.clone()),
            timetable: evolution.best,
        },
    };

    Ok(SchedulingOutput {
        schedule,
        fitness: report.score,
        violations: report.violations,
        batches: input.batches.clone(),
        days: Day::ALL.to_vec(),
        periods: Period::ALL.to_vec(),
    })
}

/// Splits a timetable by batch id. Every batch gets a key, even when it has no entries.
pub fn partition(batches: &[Batch], timetable: Timetable) -> BTreeMap<BatchId, Timetable> {
    let mut grouped = timetable
        .into_iter()
        .into_group_map_by(|entry| entry.batch_id.clone());
    batches
        .iter()
        .map(|batch| {
            let entries = grouped.remove(&batch.id).unwrap_or_default();
            (batch.id.clone(), entries)
        })
        .collect()
}
