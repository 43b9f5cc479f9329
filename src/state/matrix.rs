//! Proposal covariance Σ.

use u_numflow::matrix::Matrix;

/// A square `P × P` covariance matrix, backed by a row-major
/// [`u_numflow::matrix::Matrix`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "RawCovariance", try_from = "RawCovariance")
)]
pub struct Covariance {
    matrix: Matrix,
}

impl Covariance {
    /// All-zero `dim × dim` matrix.
    pub fn zeros(dim: usize) -> Self {
        Self {
            matrix: Matrix::zeros(dim, dim),
        }
    }

    /// Identity matrix.
    pub fn identity(dim: usize) -> Self {
        Self {
            matrix: Matrix::identity(dim),
        }
    }

    pub fn dim(&self) -> usize {
        self.matrix.rows()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.matrix.get(row, col)
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.matrix.set(row, col, value);
    }

    /// Row-major view of the entries.
    pub fn as_slice(&self) -> &[f64] {
        self.matrix.data()
    }

    pub fn diagonal(&self) -> Vec<f64> {
        self.matrix.diag()
    }

    /// Whether `|Σ[i][j] - Σ[j][i]| <= tol` for every pair.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        self.matrix.is_symmetric(tol)
    }

    /// Lower Cholesky factor `L` with `Σ = L Lᵗ`, the usual way to draw
    /// correlated proposal steps. `None` unless Σ is positive definite.
    pub fn cholesky(&self) -> Option<Matrix> {
        self.matrix.cholesky().ok()
    }

    pub fn is_positive_definite(&self) -> bool {
        self.cholesky().is_some()
    }

    /// Copies the lower triangle onto the upper one.
    pub(crate) fn mirror_lower(&mut self) {
        for i in 0..self.dim() {
            for j in 0..i {
                let v = self.get(i, j);
                self.set(j, i, v);
            }
        }
    }
}

/// Serialized form: dimension plus row-major entries.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RawCovariance {
    dim: usize,
    data: Vec<f64>,
}

#[cfg(feature = "serde")]
impl From<Covariance> for RawCovariance {
    fn from(cov: Covariance) -> Self {
        RawCovariance {
            dim: cov.dim(),
            data: cov.as_slice().to_vec(),
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<RawCovariance> for Covariance {
    type Error = crate::error::AnnealError;

    fn try_from(raw: RawCovariance) -> Result<Self, Self::Error> {
        let found = raw.data.len();
        Matrix::new(raw.dim, raw.dim, raw.data)
            .map(|matrix| Covariance { matrix })
            .map_err(|_| crate::error::AnnealError::DimensionMismatch {
                what: "covariance entries",
                expected: raw.dim * raw.dim,
                found,
            })
    }
}
