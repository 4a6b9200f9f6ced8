use super::DimensionReducer;
use crate::{BgcError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Relative tolerance for the bandwidth search in [`NeighborEmbedding`]
const SMOOTH_K_TOLERANCE: f64 = 1e-5;
const MIN_K_DIST_SCALE: f64 = 1e-3;
const BANDWIDTH_ITERATIONS: usize = 64;

/// A fitted dimensionality reduction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reducer {
    Linear(LinearProjection),
    Neighbors(NeighborEmbedding),
}

/// `components · (x − mean)`, e.g. an exported PCA
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearProjection {
    pub mean: Array1<f64>,
    /// One row per output dimension
    pub components: Array2<f64>,
}

/// Out-of-sample placement against a fitted neighbour graph embedding.
///
/// A new point lands at the membership-weighted mean of the trained
/// coordinates of its `n_neighbors` nearest training samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborEmbedding {
    /// Training samples in the input space, one per row
    pub data: Array2<f64>,
    /// Fitted coordinates of each training sample, row-aligned with `data`
    pub embedding: Array2<f64>,
    pub n_neighbors: usize,
}

impl Reducer {
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self {
            Reducer::Linear(p) => p.validate(),
            Reducer::Neighbors(n) => n.validate(),
        }
    }
}

impl LinearProjection {
    pub fn identity(dimension: usize) -> Self {
        Self {
            mean: Array1::zeros(dimension),
            components: Array2::eye(dimension),
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.mean.is_empty() || self.components.nrows() == 0 {
            return Err("linear projection has no components".to_string());
        }
        if self.components.ncols() != self.mean.len() {
            return Err(format!(
                "components have {} columns, expected {}",
                self.components.ncols(),
                self.mean.len()
            ));
        }
        Ok(())
    }

    fn transform(&self, sample: ArrayView1<f64>) -> Array1<f64> {
        self.components.dot(&(&sample - &self.mean))
    }
}

impl NeighborEmbedding {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.data.nrows() == 0 || self.data.ncols() == 0 {
            return Err("neighbour embedding has no training samples".to_string());
        }
        if self.data.nrows() != self.embedding.nrows() {
            return Err(format!(
                "{} training samples but {} embedded coordinates",
                self.data.nrows(),
                self.embedding.nrows()
            ));
        }
        if self.embedding.ncols() == 0 {
            return Err("embedded coordinates have no dimensions".to_string());
        }
        if self.n_neighbors == 0 {
            return Err("n_neighbors must be positive".to_string());
        }
        Ok(())
    }

    /// Indices and distances of the k nearest training samples, nearest first
    fn nearest(&self, sample: ArrayView1<f64>) -> Vec<(usize, f64)> {
        let mut distances: Vec<(usize, f64)> = self
            .data
            .rows()
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let diff = &row - &sample;
                (i, diff.dot(&diff).sqrt())
            })
            .collect();
        distances.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        distances.truncate(self.n_neighbors.min(self.data.nrows()));
        distances
    }

    /// Membership strengths for one neighbourhood, normalised to sum to one
    fn weights(distances: &[f64]) -> Vec<f64> {
        let k = distances.len();
        if k == 1 {
            return vec![1.0];
        }

        let rho = distances.iter().copied().find(|d| *d > 0.0).unwrap_or(0.0);
        let target = (k as f64).log2();
        let membership = |sigma: f64| -> Vec<f64> {
            distances
                .iter()
                .map(|d| {
                    let excess = d - rho;
                    if excess > 0.0 {
                        (-excess / sigma).exp()
                    } else {
                        1.0
                    }
                })
                .collect()
        };

        let (mut lo, mut hi, mut sigma) = (0.0_f64, f64::INFINITY, 1.0_f64);
        for _ in 0..BANDWIDTH_ITERATIONS {
            let total: f64 = membership(sigma).iter().sum();
            if (total - target).abs() < SMOOTH_K_TOLERANCE {
                break;
            }
            if total > target {
                hi = sigma;
                sigma = (lo + hi) / 2.0;
            } else {
                lo = sigma;
                sigma = if hi.is_infinite() { sigma * 2.0 } else { (lo + hi) / 2.0 };
            }
        }

        let mean_distance = distances.iter().sum::<f64>() / k as f64;
        let sigma = sigma.max(MIN_K_DIST_SCALE * mean_distance).max(f64::MIN_POSITIVE);

        let raw = membership(sigma);
        let total: f64 = raw.iter().sum();
        if total > 0.0 && total.is_finite() {
            raw.into_iter().map(|w| w / total).collect()
        } else {
            vec![1.0 / k as f64; k]
        }
    }

    fn transform(&self, sample: ArrayView1<f64>) -> Result<Array1<f64>> {
        let neighbours = self.nearest(sample);
        if neighbours.is_empty() {
            return Err(BgcError::Model("neighbour embedding has no training samples".to_string()));
        }
        let distances: Vec<f64> = neighbours.iter().map(|(_, d)| *d).collect();
        let weights = Self::weights(&distances);

        let mut out = Array1::<f64>::zeros(self.embedding.ncols());
        for ((index, _), weight) in neighbours.iter().zip(weights) {
            out.scaled_add(weight, &self.embedding.row(*index));
        }
        Ok(out)
    }
}

impl DimensionReducer for Reducer {
    fn input_dimension(&self) -> Option<usize> {
        match self {
            Reducer::Linear(p) => Some(p.mean.len()),
            Reducer::Neighbors(n) => Some(n.data.ncols()),
        }
    }

    fn output_dimension(&self) -> Option<usize> {
        match self {
            Reducer::Linear(p) => Some(p.components.nrows()),
            Reducer::Neighbors(n) => Some(n.embedding.ncols()),
        }
    }

    fn transform(&self, sample: &[f64]) -> Result<Vec<f64>> {
        if let Some(expected) = self.input_dimension() {
            if sample.len() != expected {
                return Err(BgcError::Model(format!(
                    "reducer expects {} values, got {}",
                    expected,
                    sample.len()
                )));
            }
        }

        let sample = ArrayView1::from(sample);
        let reduced = match self {
            Reducer::Linear(p) => p.transform(sample),
            Reducer::Neighbors(n) => n.transform(sample)?,
        };
        Ok(reduced.to_vec())
    }

    fn validate(&self) -> std::result::Result<(), String> {
        Reducer::validate(self)
    }

    fn describe(&self) -> String {
        let dims = format!(
            "{} -> {}",
            self.input_dimension().unwrap_or(0),
            self.output_dimension().unwrap_or(0)
        );
        match self {
            Reducer::Linear(_) => format!("linear projection ({})", dims),
            Reducer::Neighbors(n) => format!(
                "neighbour embedding ({}, {} samples, k={})",
                dims,
                n.data.nrows(),
                n.n_neighbors
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn grid() -> NeighborEmbedding {
        NeighborEmbedding {
            data: array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [5.0, 5.0]],
            embedding: array![[0.0], [1.0], [2.0], [10.0]],
            n_neighbors: 3,
        }
    }

    #[test]
    fn test_linear_projection() {
        let reducer = Reducer::Linear(LinearProjection {
            mean: array![1.0, 1.0],
            components: array![[1.0, 1.0]],
        });
        assert_eq!(reducer.transform(&[2.0, 3.0]).unwrap(), vec![3.0]);
        assert_eq!(reducer.output_dimension(), Some(1));
    }

    #[test]
    fn test_wrong_input_length() {
        let reducer = Reducer::Linear(LinearProjection::identity(2));
        assert!(reducer.transform(&[1.0]).is_err());
    }

    #[test]
    fn test_nearest_point_dominates() {
        let reducer = Reducer::Neighbors(grid());
        let out = reducer.transform(&[0.1, 0.0]).unwrap();
        // Nearest point keeps full membership, the other two are discounted
        assert!(out[0] < 1.0, "got {:?}", out);
        assert!(out[0] >= 0.0);
    }

    #[test]
    fn test_far_point_ignored() {
        let reducer = Reducer::Neighbors(grid());
        let out = reducer.transform(&[0.4, 0.4]).unwrap();
        // (5,5) is not among the three nearest neighbours
        assert!(out[0] <= 2.0, "got {:?}", out);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let w = NeighborEmbedding::weights(&[0.5, 1.0, 2.0, 4.0]);
        let total: f64 = w.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(w.windows(2).all(|p| p[0] >= p[1]));
    }

    #[test]
    fn test_deterministic() {
        let reducer = Reducer::Neighbors(grid());
        let a = reducer.transform(&[0.3, 0.7]).unwrap();
        let b = reducer.transform(&[0.3, 0.7]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_validate_shapes() {
        let mut bad = grid();
        bad.embedding = array![[0.0], [1.0], [2.0]];
        assert!(Reducer::Neighbors(bad).validate().is_err());
        assert!(Reducer::Neighbors(grid()).validate().is_ok());
    }

    #[test]
    fn test_empty_neighbour_embedding_is_an_error() {
        let empty = NeighborEmbedding {
            data: Array2::zeros((0, 1)),
            embedding: Array2::zeros((0, 1)),
            n_neighbors: 3,
        };
        assert!(empty.validate().is_err());
        let err = Reducer::Neighbors(empty).transform(&[0.5]).unwrap_err();
        assert!(matches!(err, BgcError::Model(_)));
    }
}
