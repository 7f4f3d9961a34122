//! Synthesis configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML, or JSON by `.json` extension)
//! 2. Environment variables (with PARSYN_ prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::eliminate::EliminationMode;
use crate::error::{CompileError, CompileResult};
use crate::optimizers::GeneticOptimizer;
use crate::permutation::PermutationOptions;
use crate::topology::Topology;

/// Complete synthesis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Catalog name of the device topology
    #[serde(default = "default_topology")]
    pub topology: String,

    /// Elimination routine: "steiner" or "gauss"
    #[serde(default)]
    pub mode: EliminationMode,

    /// Reduce to the identity instead of echelon form
    #[serde(default = "default_true")]
    pub full_reduce: bool,

    /// Let the permutation search relabel rows
    #[serde(default = "default_true")]
    pub permute_rows: bool,

    /// Let the permutation search relabel columns
    #[serde(default = "default_true")]
    pub permute_cols: bool,

    /// Genetic optimizer settings
    #[serde(default)]
    pub genetic: GeneticConfig,
}

/// Genetic optimizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Individuals kept per generation
    #[serde(default = "default_population_size")]
    pub population_size: usize,

    /// Probability that a child is bred by crossover
    #[serde(default = "default_crossover_prob")]
    pub crossover_prob: f64,

    /// Probability that a child is mutated
    #[serde(default = "default_mutate_prob")]
    pub mutate_prob: f64,

    /// Number of generations
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

// Default value functions
fn default_topology() -> String {
    "9q-square".to_string()
}

fn default_true() -> bool {
    true
}

fn default_population_size() -> usize {
    GeneticOptimizer::DEFAULT_POPULATION_SIZE
}

fn default_crossover_prob() -> f64 {
    GeneticOptimizer::DEFAULT_CROSSOVER_PROB
}

fn default_mutate_prob() -> f64 {
    GeneticOptimizer::DEFAULT_MUTATE_PROB
}

fn default_iterations() -> usize {
    50
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        SynthesisConfig {
            topology: default_topology(),
            mode: EliminationMode::default(),
            full_reduce: true,
            permute_rows: true,
            permute_cols: true,
            genetic: GeneticConfig::default(),
        }
    }
}

impl Default for GeneticConfig {
    fn default() -> Self {
        GeneticConfig {
            population_size: default_population_size(),
            crossover_prob: default_crossover_prob(),
            mutate_prob: default_mutate_prob(),
            iterations: default_iterations(),
            seed: None,
        }
    }
}

impl SynthesisConfig {
    /// Load configuration from a YAML or JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> CompileResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CompileError::Config(format!("{}: {e}", path.display())))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config: SynthesisConfig = if is_json {
            serde_json::from_str(&contents).map_err(|e| CompileError::Config(e.to_string()))?
        } else {
            serde_yaml_ng::from_str(&contents).map_err(|e| CompileError::Config(e.to_string()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with the following precedence:
    /// 1. Load from file if provided
    /// 2. Apply environment variable overrides
    pub fn load(config_file: Option<&Path>) -> CompileResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => SynthesisConfig::default(),
        };
        let config = config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Merge `PARSYN_*` environment variables into this configuration.
    pub fn merge_env(self) -> CompileResult<Self> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Merge overrides looked up by variable name.
    ///
    /// Absent variables leave the corresponding field unchanged; present
    /// but unparsable ones are an error.
    pub fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> CompileResult<Self> {
        fn parsed<T: std::str::FromStr>(key: &str, value: String) -> CompileResult<T> {
            value
                .trim()
                .parse()
                .map_err(|_| CompileError::Config(format!("{key}: cannot parse '{value}'")))
        }

        if let Some(v) = lookup("PARSYN_TOPOLOGY") {
            self.topology = v;
        }
        if let Some(v) = lookup("PARSYN_MODE") {
            self.mode = v.parse()?;
        }
        if let Some(v) = lookup("PARSYN_FULL_REDUCE") {
            self.full_reduce = parsed("PARSYN_FULL_REDUCE", v)?;
        }
        if let Some(v) = lookup("PARSYN_PERMUTE_ROWS") {
            self.permute_rows = parsed("PARSYN_PERMUTE_ROWS", v)?;
        }
        if let Some(v) = lookup("PARSYN_PERMUTE_COLS") {
            self.permute_cols = parsed("PARSYN_PERMUTE_COLS", v)?;
        }

        // Genetic optimizer
        if let Some(v) = lookup("PARSYN_POPULATION_SIZE") {
            self.genetic.population_size = parsed("PARSYN_POPULATION_SIZE", v)?;
        }
        if let Some(v) = lookup("PARSYN_CROSSOVER_PROB") {
            self.genetic.crossover_prob = parsed("PARSYN_CROSSOVER_PROB", v)?;
        }
        if let Some(v) = lookup("PARSYN_MUTATE_PROB") {
            self.genetic.mutate_prob = parsed("PARSYN_MUTATE_PROB", v)?;
        }
        if let Some(v) = lookup("PARSYN_ITERATIONS") {
            self.genetic.iterations = parsed("PARSYN_ITERATIONS", v)?;
        }
        if let Some(v) = lookup("PARSYN_SEED") {
            self.genetic.seed = Some(parsed("PARSYN_SEED", v)?);
        }

        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> CompileResult<()> {
        if self.topology.trim().is_empty() {
            return Err(CompileError::Config("topology name is empty".into()));
        }
        if !self.permute_rows && !self.permute_cols {
            return Err(CompileError::Config(
                "at least one of permute_rows and permute_cols must be set".into(),
            ));
        }
        if self.genetic.population_size == 0 {
            return Err(CompileError::Config(
                "genetic.population_size must be at least 1".into(),
            ));
        }
        for (name, p) in [
            ("genetic.crossover_prob", self.genetic.crossover_prob),
            ("genetic.mutate_prob", self.genetic.mutate_prob),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(CompileError::Config(format!("{name} must be in [0, 1], got {p}")));
            }
        }
        Ok(())
    }

    /// Resolve the configured topology from the catalog.
    pub fn topology(&self) -> CompileResult<Topology> {
        catalog::named(&self.topology)
    }

    /// Options for [`crate::permutation::optimize`].
    pub fn permutation_options(&self) -> PermutationOptions {
        PermutationOptions {
            mode: self.mode,
            permute_rows: self.permute_rows,
            permute_cols: self.permute_cols,
            full_reduce: self.full_reduce,
            iterations: self.genetic.iterations,
        }
    }

    /// A genetic optimizer with the configured parameters.
    pub fn genetic_optimizer(&self) -> CompileResult<GeneticOptimizer> {
        let optimizer = GeneticOptimizer::new(
            self.genetic.population_size,
            self.genetic.crossover_prob,
            self.genetic.mutate_prob,
        )?;
        Ok(match self.genetic.seed {
            Some(seed) => optimizer.with_seed(seed),
            None => optimizer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = SynthesisConfig::default();
        assert_eq!(config.topology, "9q-square");
        assert_eq!(config.mode, EliminationMode::Steiner);
        assert!(config.full_reduce);
        assert_eq!(config.genetic.population_size, 30);
        assert_eq!(config.genetic.iterations, 50);
        assert!(config.validate().is_ok());
        assert_eq!(config.topology().unwrap().num_nodes(), 9);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "topology: line-5\ngenetic:\n  seed: 3\n";
        let config: SynthesisConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.topology, "line-5");
        assert_eq!(config.genetic.seed, Some(3));
        assert_eq!(config.genetic.crossover_prob, 0.8);
        assert!(config.permute_cols);
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json = dir.path().join("synth.json");
        std::fs::write(&json, r#"{"topology": "full-4", "mode": "gauss"}"#).unwrap();
        let config = SynthesisConfig::from_file(&json).unwrap();
        assert_eq!(config.mode, EliminationMode::Gauss);

        let yaml = dir.path().join("synth.yaml");
        std::fs::write(&yaml, "genetic:\n  mutate_prob: 2.0\n").unwrap();
        assert!(matches!(
            SynthesisConfig::from_file(&yaml),
            Err(CompileError::Config(_))
        ));
    }

    #[test]
    fn test_variable_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PARSYN_TOPOLOGY", "ibm_qx5"),
            ("PARSYN_MODE", "gauss"),
            ("PARSYN_PERMUTE_COLS", "false"),
            ("PARSYN_ITERATIONS", " 7 "),
            ("PARSYN_SEED", "11"),
        ]
        .into_iter()
        .collect();
        let config = SynthesisConfig::default()
            .merge_vars(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.topology, "ibm_qx5");
        assert_eq!(config.mode, EliminationMode::Gauss);
        assert!(!config.permute_cols);
        assert_eq!(config.genetic.iterations, 7);
        assert_eq!(config.genetic.seed, Some(11));

        let options = config.permutation_options();
        assert!(options.permute_rows && !options.permute_cols);
        assert_eq!(options.iterations, 7);
    }

    #[test]
    fn test_unparsable_override_is_an_error() {
        let result =
            SynthesisConfig::default().merge_vars(|k| (k == "PARSYN_FULL_REDUCE").then(|| "maybe".into()));
        assert!(matches!(result, Err(CompileError::Config(_))));
    }

    #[test]
    fn test_validation() {
        let mut config = SynthesisConfig::default();
        config.permute_rows = false;
        config.permute_cols = false;
        assert!(config.validate().is_err());

        let mut config = SynthesisConfig::default();
        config.genetic.population_size = 0;
        assert!(config.validate().is_err());
        assert!(config.genetic_optimizer().is_err());
    }
}
