//! Dense row-major matrix used for Jacobians and the implicit engine's
//! iteration matrix.

mod linear;

use std::ops::{Index, IndexMut};

use crate::Float;

pub use linear::Lu;

/// Square, dense, row-major matrix. `m[(i, j)]` is row `i`, column `j`.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<Float>,
}

impl Matrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    /// Build from row slices; every row must have `rows.len()` entries.
    pub fn from_rows(rows: &[&[Float]]) -> Self {
        let n = rows.len();
        let mut m = Self::zeros(n);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), n, "row {} has {} entries, expected {}", i, row.len(), n);
            m.data[i * n..(i + 1) * n].copy_from_slice(row);
        }
        m
    }

    /// Number of rows (and columns).
    pub fn dim(&self) -> usize {
        self.n
    }

    pub fn fill(&mut self, value: Float) {
        self.data.fill(value);
    }

    /// Row-major view of the entries.
    pub fn as_slice(&self) -> &[Float] {
        &self.data
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = Float;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.data[i * self.n + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        &mut self.data[i * self.n + j]
    }
}
