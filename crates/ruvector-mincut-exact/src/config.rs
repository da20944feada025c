//! Solver configuration
//!
//! A [`MinCutConfig`] value is passed explicitly into every solver and into the
//! dynamic layer. There is no process-wide configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MinCutError, Result};
use crate::frontier::QueueType;

/// Static minimum cut algorithm selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Parallel capforest rounds with a sequential fallback
    #[default]
    ExactParallel,
    /// Sequential capforest rounds only
    Sequential,
    /// Exact value followed by the cactus of all minimum cuts
    Cactus,
}

impl FromStr for Algorithm {
    type Err = MinCutError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exact" | "parallel" | "exact_parallel" => Ok(Algorithm::ExactParallel),
            "noi" | "sequential" => Ok(Algorithm::Sequential),
            "cactus" => Ok(Algorithm::Cactus),
            other => Err(MinCutError::InvalidParameter(format!(
                "unknown algorithm '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::ExactParallel => "exact_parallel",
            Algorithm::Sequential => "sequential",
            Algorithm::Cactus => "cactus",
        };
        f.write_str(name)
    }
}

/// Configuration for the minimum cut algorithms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinCutConfig {
    /// Which static algorithm to run
    pub algorithm: Algorithm,
    /// Priority frontier used inside the capforest
    pub queue_type: QueueType,
    /// Write the cut side of every vertex back into the input graph
    pub save_cut: bool,
    /// Label the most balanced minimum cut instead of an arbitrary one
    pub find_most_balanced_cut: bool,
    /// Seed for capforest start vertices
    pub seed: u64,
    /// BFS depth of the partial global relabelling in connectivity checks
    pub depth_of_partial_relabeling: usize,
    /// Worker threads (0 = rayon global pool)
    pub num_threads: usize,
    /// Disable the shared visited flags of the parallel capforest
    pub disable_blacklist: bool,
}

impl Default for MinCutConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::ExactParallel,
            queue_type: QueueType::BucketQueue,
            save_cut: false,
            find_most_balanced_cut: false,
            seed: 0,
            depth_of_partial_relabeling: 4,
            num_threads: 0,
            disable_blacklist: false,
        }
    }
}

impl MinCutConfig {
    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.depth_of_partial_relabeling == 0 {
            return Err(MinCutError::InvalidParameter(
                "depth_of_partial_relabeling must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from JSON; missing fields take their default value
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MinCutConfig::default();
        assert_eq!(config.algorithm, Algorithm::ExactParallel);
        assert_eq!(config.queue_type, QueueType::BucketQueue);
        assert!(!config.save_cut);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("noi".parse::<Algorithm>().unwrap(), Algorithm::Sequential);
        assert_eq!("cactus".parse::<Algorithm>().unwrap(), Algorithm::Cactus);
        assert!("vc".parse::<Algorithm>().is_err());
    }

    #[test]
    fn test_json_partial_fields() {
        let config = MinCutConfig::from_json(r#"{"save_cut": true, "seed": 7}"#).unwrap();
        assert!(config.save_cut);
        assert_eq!(config.seed, 7);
        assert_eq!(config.depth_of_partial_relabeling, 4);
    }

    #[test]
    fn test_json_rejects_zero_depth() {
        let result = MinCutConfig::from_json(r#"{"depth_of_partial_relabeling": 0}"#);
        assert!(matches!(result, Err(MinCutError::InvalidParameter(_))));
    }

    #[test]
    fn test_json_round_trip_keeps_algorithm() {
        let config = MinCutConfig {
            algorithm: Algorithm::Cactus,
            ..Default::default()
        };
        let parsed = MinCutConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
