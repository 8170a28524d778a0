//! Observers the driver feeds with accepted steps: the adaptive trajectory
//! recorder and the grid sampler.

use crate::{
    Float,
    core::{interpolate::Interpolate, solout::SolOut},
};

/// Records every accepted point, starting with the initial state.
pub(crate) struct TrajectoryRecorder {
    x: Vec<Float>,
    y: Vec<Vec<Float>>,
}

impl TrajectoryRecorder {
    pub fn new(x0: Float, y0: &[Float]) -> Self {
        Self {
            x: vec![x0],
            y: vec![y0.to_vec()],
        }
    }

    pub fn into_data(self) -> (Vec<Float>, Vec<Vec<Float>>) {
        (self.x, self.y)
    }
}

impl SolOut for TrajectoryRecorder {
    fn solout(&mut self, _xold: Float, x: Float, y: &[Float], _dense: Option<&dyn Interpolate>) {
        self.x.push(x);
        self.y.push(y.to_vec());
    }
}

/// Fills one row per grid abscissa. Points strictly inside an accepted step
/// are interpolated; a point the step landed on takes the state as is.
///
/// Rows not yet reached hold NaN.
pub(crate) struct GridSampler<'g> {
    grid: &'g [Float],
    posneg: Float,
    next: usize,
    rows: Vec<Vec<Float>>,
}

impl<'g> GridSampler<'g> {
    /// `grid[0]` is the initial abscissa and takes `y0`.
    pub fn new(grid: &'g [Float], y0: &[Float]) -> Self {
        let posneg = if grid.len() > 1 {
            (grid[grid.len() - 1] - grid[0]).signum()
        } else {
            1.0
        };
        let mut rows = vec![vec![Float::NAN; y0.len()]; grid.len()];
        rows[0].copy_from_slice(y0);
        Self {
            grid,
            posneg,
            next: 1,
            rows,
        }
    }

    /// Number of leading rows filled so far.
    pub fn reached(&self) -> usize {
        self.next
    }

    /// Abscissa of the first unfilled row.
    pub fn target(&self) -> Option<Float> {
        self.grid.get(self.next).copied()
    }

    pub fn into_rows(self) -> Vec<Vec<Float>> {
        self.rows
    }
}

impl SolOut for GridSampler<'_> {
    fn solout(&mut self, _xold: Float, x: Float, y: &[Float], dense: Option<&dyn Interpolate>) {
        while self.next < self.grid.len() && (self.grid[self.next] - x) * self.posneg <= 0.0 {
            let xi = self.grid[self.next];
            let row = &mut self.rows[self.next];
            match dense {
                Some(dense) if xi != x => dense.interpolate(xi, row),
                _ => row.copy_from_slice(y),
            }
            self.next += 1;
        }
    }
}
