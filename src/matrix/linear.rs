//! Linear solves: A x = b via LU with partial pivoting.

use crate::Float;

use super::Matrix;

/// LU factorization `P A = L U` of a square matrix, stored in place.
///
/// Factor once, then solve for as many right-hand sides as needed.
#[derive(Clone, Debug)]
pub struct Lu {
    n: usize,
    a: Vec<Float>,
    perm: Vec<usize>,
}

impl Lu {
    /// Factor `m`. Returns `None` if a zero (or non-finite) pivot is met.
    pub fn factor(m: &Matrix) -> Option<Self> {
        let n = m.dim();
        let mut a = m.as_slice().to_vec();
        let mut perm: Vec<usize> = (0..n).collect();

        for k in 0..n {
            // pivot
            let mut pivot_row = k;
            let mut pivot_val = a[k * n + k].abs();
            for i in (k + 1)..n {
                let val = a[i * n + k].abs();
                if val > pivot_val {
                    pivot_val = val;
                    pivot_row = i;
                }
            }
            if pivot_val == 0.0 || !pivot_val.is_finite() {
                return None;
            }
            if pivot_row != k {
                for j in 0..n {
                    a.swap(k * n + j, pivot_row * n + j);
                }
                perm.swap(k, pivot_row);
            }
            // Eliminate below the pivot
            let akk = a[k * n + k];
            for i in (k + 1)..n {
                let factor = a[i * n + k] / akk;
                a[i * n + k] = factor;
                for j in (k + 1)..n {
                    a[i * n + j] -= factor * a[k * n + j];
                }
            }
        }

        Some(Self { n, a, perm })
    }

    /// In-place solve: overwrites `b` with `x`.
    pub fn solve_mut(&self, b: &mut [Float]) {
        let n = self.n;
        assert_eq!(
            b.len(),
            n,
            "dimension mismatch in solve: A is {}x{}, b has length {}",
            n,
            n,
            b.len()
        );

        // Forward solve Ly = Pb
        let pb: Vec<Float> = self.perm.iter().map(|&p| b[p]).collect();
        b.copy_from_slice(&pb);
        for i in 0..n {
            let mut sum = b[i];
            for k in 0..i {
                sum -= self.a[i * n + k] * b[k];
            }
            b[i] = sum;
        }
        // Backward solve Ux = y
        for i in (0..n).rev() {
            let mut sum = b[i];
            for k in (i + 1)..n {
                sum -= self.a[i * n + k] * b[k];
            }
            b[i] = sum / self.a[i * n + i];
        }
    }

    /// Solve A x = b, returning x.
    pub fn solve(&self, b: &[Float]) -> Vec<Float> {
        let mut x = b.to_vec();
        self.solve_mut(&mut x);
        x
    }
}
