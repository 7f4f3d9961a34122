//! Genetic search over permutations.
//!
//! Each generation breeds as many children as the population holds:
//! parents are picked by binary tournament, recombined with order
//! crossover and mutated by swapping two positions. Children and parents
//! compete together and the best `population_size` survive, so the best
//! individual is never lost.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::error::{CompileError, CompileResult};
use crate::permutation::{FitnessFunction, PermutationOptimizer};

/// A permutation and its score.
type Individual = (Vec<usize>, usize);

/// Elitist genetic algorithm.
#[derive(Debug, Clone)]
pub struct GeneticOptimizer {
    population_size: usize,
    crossover_prob: f64,
    mutate_prob: f64,
    rng: StdRng,
    /// Sorted by score, best first.
    population: Vec<Individual>,
}

impl GeneticOptimizer {
    /// Default population size.
    pub const DEFAULT_POPULATION_SIZE: usize = 30;
    /// Default crossover probability.
    pub const DEFAULT_CROSSOVER_PROB: f64 = 0.8;
    /// Default mutation probability.
    pub const DEFAULT_MUTATE_PROB: f64 = 0.2;

    /// Create an optimizer seeded from system entropy.
    pub fn new(population_size: usize, crossover_prob: f64, mutate_prob: f64) -> CompileResult<Self> {
        if population_size == 0 {
            return Err(CompileError::Config(
                "population size must be at least 1".into(),
            ));
        }
        for (name, p) in [("crossover", crossover_prob), ("mutation", mutate_prob)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(CompileError::Config(format!(
                    "{name} probability {p} not in [0, 1]"
                )));
            }
        }
        Ok(Self {
            population_size,
            crossover_prob,
            mutate_prob,
            rng: StdRng::from_entropy(),
            population: Vec::new(),
        })
    }

    /// Use a deterministic random stream.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// The current population, best first.
    pub fn population(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.population.iter().map(|(p, _)| p.as_slice())
    }

    fn initialize(&mut self, fitness: &dyn FitnessFunction, dimension: usize) -> CompileResult<()> {
        let mut population = Vec::with_capacity(self.population_size);
        for _ in 0..self.population_size {
            let mut candidate: Vec<usize> = (0..dimension).collect();
            candidate.shuffle(&mut self.rng);
            let score = fitness.score(&candidate)?;
            population.push((candidate, score));
        }
        population.sort_by_key(|(_, score)| *score);
        self.population = population;
        Ok(())
    }

    /// Binary tournament: the better of two random individuals.
    fn select(&mut self) -> &[usize] {
        let a = self.rng.gen_range(0..self.population.len());
        let b = self.rng.gen_range(0..self.population.len());
        // Population is sorted, so the lower index wins.
        &self.population[a.min(b)].0
    }

    fn breed(&mut self) -> Vec<usize> {
        let first = self.select().to_vec();
        let second = self.select().to_vec();
        let mut child = if self.rng.gen_bool(self.crossover_prob) {
            order_crossover(&first, &second, &mut self.rng)
        } else {
            first
        };
        if child.len() > 1 && self.rng.gen_bool(self.mutate_prob) {
            let i = self.rng.gen_range(0..child.len());
            let j = self.rng.gen_range(0..child.len());
            child.swap(i, j);
        }
        child
    }
}

impl Default for GeneticOptimizer {
    fn default() -> Self {
        Self {
            population_size: Self::DEFAULT_POPULATION_SIZE,
            crossover_prob: Self::DEFAULT_CROSSOVER_PROB,
            mutate_prob: Self::DEFAULT_MUTATE_PROB,
            rng: StdRng::from_entropy(),
            population: Vec::new(),
        }
    }
}

impl PermutationOptimizer for GeneticOptimizer {
    fn name(&self) -> &str {
        "genetic"
    }

    fn find_best(
        &mut self,
        fitness: &dyn FitnessFunction,
        dimension: usize,
        iterations: usize,
        continued: bool,
    ) -> CompileResult<Vec<usize>> {
        let resumable = continued
            && self
                .population
                .first()
                .is_some_and(|(p, _)| p.len() == dimension);
        if !resumable {
            self.initialize(fitness, dimension)?;
        }

        for generation in 0..iterations {
            let mut children = Vec::with_capacity(self.population_size);
            for _ in 0..self.population_size {
                let child = self.breed();
                let score = fitness.score(&child)?;
                children.push((child, score));
            }
            self.population.append(&mut children);
            // Stable: on ties the older individual stays ahead.
            self.population.sort_by_key(|(_, score)| *score);
            self.population.truncate(self.population_size);
            debug!(
                generation,
                best = self.population[0].1,
                worst = self.population[self.population.len() - 1].1,
                "generation finished"
            );
        }

        let (best, score) = &self.population[0];
        info!(score, iterations, resumed = resumable, "genetic search finished");
        Ok(best.clone())
    }
}

/// Order crossover: keep a slice of `first`, fill the rest in `second`'s
/// order.
fn order_crossover<R: Rng + ?Sized>(first: &[usize], second: &[usize], rng: &mut R) -> Vec<usize> {
    let n = first.len();
    if n < 2 {
        return first.to_vec();
    }
    let a = rng.gen_range(0..n);
    let b = rng.gen_range(0..n);
    let (lo, hi) = (a.min(b), a.max(b) + 1);

    let mut taken = vec![false; n];
    for &v in &first[lo..hi] {
        taken[v] = true;
    }
    let mut fill = second.iter().copied().filter(|&v| !taken[v]);

    let mut child = Vec::with_capacity(n);
    for i in 0..n {
        if (lo..hi).contains(&i) {
            child.push(first[i]);
        } else if let Some(v) = fill.next() {
            child.push(v);
        }
    }
    child
}
