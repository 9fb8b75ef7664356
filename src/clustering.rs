//! Clustering input: which household locations form each houses-microgrid.
//!
//! The clustering itself happens elsewhere; this module only loads, validates,
//! or synthesizes its result.

use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::grid::household::Location;
use crate::grid::microgrid::HOUSES_PER_MICROGRID;

/// Reasons a clustering input is rejected before the run starts.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("cannot read clusters from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid cluster JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("clustering produced no microgrids")]
    Empty,

    #[error("cluster {index} has {len} locations, expected 10")]
    WrongSize { index: usize, len: usize },

    #[error("cluster {index} contains a non-finite coordinate")]
    NonFinite { index: usize },
}

/// Validated mapping from microgrid index to its household locations.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterInput {
    clusters: Vec<Vec<Location>>,
}

impl ClusterInput {
    /// Wraps and validates precomputed clusters.
    ///
    /// # Errors
    ///
    /// Returns a `ClusterError` if there are no clusters, a cluster does not
    /// hold exactly ten locations, or a coordinate is not finite.
    pub fn new(clusters: Vec<Vec<Location>>) -> Result<Self, ClusterError> {
        if clusters.is_empty() {
            return Err(ClusterError::Empty);
        }
        for (index, cluster) in clusters.iter().enumerate() {
            if cluster.len() != HOUSES_PER_MICROGRID {
                return Err(ClusterError::WrongSize {
                    index,
                    len: cluster.len(),
                });
            }
            if !cluster.iter().all(Location::is_finite) {
                return Err(ClusterError::NonFinite { index });
            }
        }
        Ok(Self { clusters })
    }

    /// Parses clusters from a JSON array of arrays of `{"x": .., "y": ..}`.
    ///
    /// # Errors
    ///
    /// Returns a `ClusterError` on malformed JSON or invalid clusters.
    pub fn from_json_str(s: &str) -> Result<Self, ClusterError> {
        let clusters: Vec<Vec<Location>> = serde_json::from_str(s)?;
        Self::new(clusters)
    }

    /// Reads clusters from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns a `ClusterError` if the file cannot be read or is invalid.
    pub fn from_json_file(path: &Path) -> Result<Self, ClusterError> {
        let content = fs::read_to_string(path).map_err(|source| ClusterError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Synthesizes `microgrids` groups of ten uniformly placed locations.
    ///
    /// Stands in for the real clustering when no file is supplied.
    pub fn scatter<R: Rng>(microgrids: usize, rng: &mut R) -> Self {
        let clusters = (0..microgrids)
            .map(|_| {
                (0..HOUSES_PER_MICROGRID)
                    .map(|_| Location::new(rng.random::<f64>() * 100.0, rng.random::<f64>() * 100.0))
                    .collect()
            })
            .collect();
        Self { clusters }
    }

    pub fn clusters(&self) -> &[Vec<Location>] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}
