//! # Generation Module
//!
//! Procedural map generation: individual cell contents and whole maps.
//!
//! Every random decision goes through a [`RandomSource`] handed in by the
//! caller, so a seeded source reproduces the same map.

pub mod cells;
pub mod terrain;

pub use cells::*;
pub use terrain::*;

use crate::config::{
    DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH, DEFAULT_SLAG_HEAP_COUNT, DEFAULT_TREE_COUNT,
};
use crate::{FlatcraftError, FlatcraftResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Source of the random decisions made during generation and mob movement.
pub trait RandomSource {
    /// Returns a value drawn uniformly from `[0, bound)`.
    ///
    /// `bound` must be positive.
    fn next_in_range(&mut self, bound: u32) -> u32;
}

/// Random source backed by a seedable standard generator.
///
/// # Examples
///
/// ```
/// use flatcraft::{RandomSource, SeededRandom};
///
/// let mut first = SeededRandom::new(7);
/// let mut second = SeededRandom::new(7);
/// assert_eq!(first.next_in_range(100), second.next_in_range(100));
/// ```
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Creates a reproducible source from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a source seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when a seed is given, from entropy otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::new)
    }
}

impl RandomSource for SeededRandom {
    fn next_in_range(&mut self, bound: u32) -> u32 {
        self.rng.gen_range(0..bound)
    }
}

/// Parameters of map generation.
///
/// Serialized with camelCase keys:
///
/// ```
/// use flatcraft::GenerationConfig;
///
/// let config = GenerationConfig::from_json_str(
///     r#"{"height": 12, "width": 30, "treeCount": 4, "slagHeapCount": 1}"#,
/// ).unwrap();
/// assert_eq!(config.tree_count, 4);
/// assert_eq!(config.seed, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Number of rows of the map
    pub height: i32,
    /// Number of columns of the map
    pub width: i32,
    /// Trees planted on the surface
    #[serde(default)]
    pub tree_count: u32,
    /// Slag heaps piled on the surface
    #[serde(default)]
    pub slag_heap_count: u32,
    /// Seed of the random source, entropy when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl GenerationConfig {
    /// Creates a configuration with the default decorations.
    pub fn new(height: i32, width: i32) -> Self {
        Self {
            height,
            width,
            tree_count: DEFAULT_TREE_COUNT,
            slag_heap_count: DEFAULT_SLAG_HEAP_COUNT,
            seed: None,
        }
    }

    /// Creates a small seeded configuration for tests.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            height: 10,
            width: 10,
            tree_count: 2,
            slag_heap_count: 1,
            seed: Some(seed),
        }
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the decoration counts.
    pub fn with_decorations(mut self, tree_count: u32, slag_heap_count: u32) -> Self {
        self.tree_count = tree_count;
        self.slag_heap_count = slag_heap_count;
        self
    }

    /// Row of the ground surface for this configuration.
    pub fn soil_height(&self) -> i32 {
        2 * self.height / 3
    }

    /// Checks that a map can be generated from this configuration.
    pub fn validate(&self) -> FlatcraftResult<()> {
        if self.height <= 0 || self.width <= 0 || self.height.checked_mul(self.width).is_none() {
            return Err(FlatcraftError::InvalidDimension {
                height: self.height,
                width: self.width,
            });
        }
        if self.tree_count > 0 && self.width < 3 {
            return Err(FlatcraftError::InvalidConfig(format!(
                "trees need a map at least 3 columns wide, got {}",
                self.width
            )));
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> FlatcraftResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> FlatcraftResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serializes the configuration to JSON.
    pub fn to_json(&self) -> FlatcraftResult<String> {
        serde_json::to_string_pretty(self).map_err(FlatcraftError::from)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH)
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content from the configuration, drawing cells from `factory`.
    fn generate(
        &self,
        config: &GenerationConfig,
        factory: &mut CellFactory,
        rng: &mut dyn RandomSource,
    ) -> FlatcraftResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> FlatcraftResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::new(12, 20);
        assert_eq!(config.height, 12);
        assert_eq!(config.width, 20);
        assert_eq!(config.tree_count, DEFAULT_TREE_COUNT);
        assert_eq!(config.slag_heap_count, DEFAULT_SLAG_HEAP_COUNT);
        assert_eq!(config.soil_height(), 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            GenerationConfig::new(0, 10).validate(),
            Err(FlatcraftError::InvalidDimension { .. })
        ));
        assert!(matches!(
            GenerationConfig::new(10, 2).validate(),
            Err(FlatcraftError::InvalidConfig(_))
        ));
        assert!(GenerationConfig::new(10, 2)
            .with_decorations(0, 1)
            .validate()
            .is_ok());
        assert!(matches!(
            GenerationConfig::new(100_000, 100_000).validate(),
            Err(FlatcraftError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_config_json_defaults() {
        let config = GenerationConfig::from_json_str(r#"{"height": 9, "width": 9}"#).unwrap();
        assert_eq!(config.tree_count, 0);
        assert_eq!(config.slag_heap_count, 0);
        assert!(config.seed.is_none());

        assert!(GenerationConfig::from_json_str(r#"{"height": -1, "width": 9}"#).is_err());
        assert!(matches!(
            GenerationConfig::from_json_str("not json"),
            Err(FlatcraftError::Serde(_))
        ));
    }

    #[test]
    fn test_config_file_round_trip() {
        let config = GenerationConfig::for_testing(99);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_json().unwrap().as_bytes()).unwrap();

        let loaded = GenerationConfig::from_json_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_json_uses_camel_case() {
        let json = GenerationConfig::new(5, 5).with_seed(3).to_json().unwrap();
        assert!(json.contains("\"treeCount\""));
        assert!(json.contains("\"slagHeapCount\""));
        assert!(json.contains("\"seed\": 3"));
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let mut first = SeededRandom::new(12345);
        let mut second = SeededRandom::new(12345);
        for _ in 0..50 {
            let value = first.next_in_range(20);
            assert!(value < 20);
            assert_eq!(value, second.next_in_range(20));
        }
    }
}
