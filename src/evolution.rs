//! The generation loop: seed, rank, keep elites, refill with mutants, repeat.
//!
//! There is no crossover. Diversity comes only from the independently generated
//! initial population and from mutation, and the loop always spends its full
//! generation budget.

use log::{info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::{Fitness, Timetable};
use crate::error::ScheduleError;
use crate::problem::Problem;
use crate::{fitness, generator, mutation};

/// Search budget and shape. Every field can be overridden per request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvolutionParams {
    pub population_size: usize,
    pub generations: usize,
    /// Individuals carried over unchanged each generation.
    pub elite_count: usize,
    /// Parents for mutation are drawn from this many top-ranked individuals.
    pub parent_pool: usize,
    pub mutation_rate: f64,
    /// Fixes the random stream so a run can be reproduced.
    pub seed: Option<u64>,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            population_size: 30,
            generations: 50,
            elite_count: 5,
            parent_pool: 10,
            mutation_rate: 0.2,
            seed: None,
        }
    }
}

impl EvolutionParams {
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.population_size == 0 {
            return Err(ScheduleError::InvalidParams(
                "population size must be at least 1".to_string(),
            ));
        }
        if self.elite_count > self.population_size {
            return Err(ScheduleError::InvalidParams(format!(
                "elite count {} exceeds population size {}",
                self.elite_count, self.population_size
            )));
        }
        if self.parent_pool == 0 {
            return Err(ScheduleError::InvalidParams(
                "parent pool must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ScheduleError::InvalidParams(format!(
                "mutation rate {} is outside [0, 1]",
                self.mutation_rate
            )));
        }
        Ok(())
    }
}

/// Best timetable found and how the search got there.
#[derive(Debug, Clone)]
pub struct Evolution {
    pub best: Timetable,
    pub fitness: Fitness,
    /// Top fitness at the start of each generation.
    pub best_per_generation: Vec<Fitness>,
}

/// Runs the search with a generator seeded from `params.seed`, or from the OS.
pub fn evolve(problem: &Problem<'_>, params: &EvolutionParams) -> Result<Evolution, ScheduleError> {
    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    evolve_with(problem, params, &mut rng)
}

pub fn evolve_with<R: Rng + ?Sized>(
    problem: &Problem<'_>,
    params: &EvolutionParams,
    rng: &mut R,
) -> Result<Evolution, ScheduleError> {
    params.validate()?;

    info!(
        "Seeding {} timetables for {} batches ({} courses)...",
        params.population_size,
        problem.batches.len(),
        problem.course_count()
    );
    let mut population: Vec<Timetable> = (0..params.population_size)
        .map(|_| generator::generate(problem, rng))
        .collect();

    let mut best_per_generation = Vec::with_capacity(params.generations);
    for generation in 0..params.generations {
        let ranked = rank(problem, population);
        let top = ranked[0].0;
        trace!("Generation {}: best fitness {}", generation, top);
        best_per_generation.push(top);
        population = repopulate(&ranked, params, rng);
    }

    let (fitness, best) = rank(problem, population)
        .into_iter()
        .next()
        .ok_or_else(|| ScheduleError::InvalidParams("population is empty".to_string()))?;

    Ok(Evolution {
        best,
        fitness,
        best_per_generation,
    })
}

/// Scores every individual in parallel and sorts best first. Ties keep their order.
fn rank(problem: &Problem<'_>, population: Vec<Timetable>) -> Vec<(Fitness, Timetable)> {
    let mut ranked: Vec<(Fitness, Timetable)> = population
        .into_par_iter()
        .map(|timetable| (fitness::score(problem, &timetable), timetable))
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    ranked
}

fn repopulate<R: Rng + ?Sized>(
    ranked: &[(Fitness, Timetable)],
    params: &EvolutionParams,
    rng: &mut R,
) -> Vec<Timetable> {
    let elites = params.elite_count.min(ranked.len());
    let pool = params.parent_pool.min(ranked.len());

    let mut next: Vec<Timetable> = ranked[..elites]
        .iter()
        .map(|(_, timetable)| timetable.clone())
        .collect();
    while next.len() < params.population_size {
        let (_, parent) = &ranked[rng.random_range(0..pool)];
        next.push(mutation::mutate(parent, params.mutation_rate, rng));
    }
    next
}
