//! Tolerance abstraction to allow scalar or vector tolerances

use std::ops::Index;

use crate::{Float, error::Error};

/// Tolerance enum to allow scalar or vector tolerances
/// using [`Into`] trait for easy conversion from `Float`, `[Float; N]`, or `Vec<Float>`
/// users do not need to know or worry this simply allows both
/// `Float` and `[Float; N]` to be passed in as arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum Tolerance {
    Scalar(Float),
    Vector(Vec<Float>),
}

impl Tolerance {
    /// Check that every component is finite and non-negative and that a
    /// vector tolerance has one entry per state variable.
    pub(crate) fn validate(&self, which: &'static str, ny: usize) -> Result<(), Error> {
        let values: &[Float] = match self {
            Tolerance::Scalar(v) => std::slice::from_ref(v),
            Tolerance::Vector(vs) => {
                if vs.len() != ny {
                    return Err(Error::ToleranceLength {
                        which,
                        expected: ny,
                        found: vs.len(),
                    });
                }
                vs
            }
        };
        match values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            Some(&value) => Err(Error::InvalidTolerance { which, value }),
            None => Ok(()),
        }
    }
}

impl From<Float> for Tolerance {
    fn from(val: Float) -> Self {
        Tolerance::Scalar(val)
    }
}

impl From<&[Float]> for Tolerance {
    fn from(val: &[Float]) -> Self {
        Tolerance::Vector(val.to_vec())
    }
}

impl<const N: usize> From<[Float; N]> for Tolerance {
    fn from(val: [Float; N]) -> Self {
        Tolerance::Vector(val.to_vec())
    }
}

impl From<Vec<Float>> for Tolerance {
    fn from(val: Vec<Float>) -> Self {
        Tolerance::Vector(val)
    }
}

impl Index<usize> for Tolerance {
    type Output = Float;

    fn index(&self, index: usize) -> &Self::Output {
        match self {
            Tolerance::Scalar(v) => v,
            Tolerance::Vector(vs) => &vs[index],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_indexes_every_component() {
        let tol: Tolerance = 1e-6.into();
        assert_eq!(tol[0], 1e-6);
        assert_eq!(tol[41], 1e-6);
        assert!(tol.validate("atol", 3).is_ok());
    }

    #[test]
    fn vector_length_must_match_state() {
        let tol: Tolerance = [1e-6, 1e-8].into();
        assert_eq!(tol[1], 1e-8);
        assert_eq!(
            tol.validate("rtol", 3),
            Err(Error::ToleranceLength {
                which: "rtol",
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn negative_or_nan_rejected() {
        let tol: Tolerance = (-1.0).into();
        assert!(matches!(
            tol.validate("atol", 1),
            Err(Error::InvalidTolerance { which: "atol", .. })
        ));
        let tol: Tolerance = vec![1e-6, Float::NAN].into();
        assert!(tol.validate("atol", 2).is_err());
    }
}
