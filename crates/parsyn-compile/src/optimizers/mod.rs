//! Permutation optimizers.

mod exhaustive;
mod genetic;
mod reorder;

pub use exhaustive::ExhaustiveOptimizer;
pub use genetic::GeneticOptimizer;
pub use reorder::quick_reorder;
