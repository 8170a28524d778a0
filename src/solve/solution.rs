//! Results returned by the integration entry points.

use crate::Float;

use super::diagnostics::Info;

/// The adaptive trajectory: every accepted point, initial state first.
#[derive(Debug, Clone)]
pub struct AdaptiveSolution {
    pub x: Vec<Float>,
    pub y: Vec<Vec<Float>>,
    pub info: Info,
}

impl AdaptiveSolution {
    /// Iterate over `(x_i, y_i)` pairs.
    pub fn iter(&self) -> SolutionIter<'_> {
        SolutionIter {
            x_iter: self.x.iter(),
            y_iter: self.y.iter(),
        }
    }

    /// Last point reached.
    pub fn last(&self) -> Option<(Float, &[Float])> {
        self.iter().last()
    }
}

/// Iterator over `(x, y)` pairs of an [`AdaptiveSolution`].
pub struct SolutionIter<'a> {
    x_iter: std::slice::Iter<'a, Float>,
    y_iter: std::slice::Iter<'a, Vec<Float>>,
}

impl<'a> Iterator for SolutionIter<'a> {
    type Item = (Float, &'a [Float]);

    fn next(&mut self) -> Option<Self::Item> {
        match (self.x_iter.next(), self.y_iter.next()) {
            (Some(&x), Some(y)) => Some((x, y.as_slice())),
            _ => None,
        }
    }
}

/// Values on the caller's grid, one row per abscissa.
///
/// Rows past `info.nreached` were never reached and hold NaN.
#[derive(Debug, Clone)]
pub struct PredefinedSolution {
    pub y: Vec<Vec<Float>>,
    pub info: Info,
}

impl PredefinedSolution {
    /// Leading rows holding valid values.
    pub fn nreached(&self) -> usize {
        self.info.nreached.unwrap_or(self.y.len())
    }

    /// The valid rows.
    pub fn reached(&self) -> &[Vec<Float>] {
        &self.y[..self.nreached()]
    }
}
