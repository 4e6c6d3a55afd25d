// src/curve.rs
//! Normalized-fiber-length dependence of the maintenance heat rate
//!
//! The energetics model only needs a pure `f(x) -> y` lookup, so the curve is
//! injected through the [`InterpolationCurve`] trait. [`PiecewiseLinearCurve`]
//! is the configurable implementation loaded from probe configuration; any
//! `Fn(f64) -> f64` closure can stand in for it in tests.

use serde::{Deserialize, Serialize};

use crate::config::constants::curve;
use crate::error::{ProbeError, ProbeResult};

/// Scalar lookup curve evaluated at the normalized fiber length
pub trait InterpolationCurve: Send + Sync {
    /// Evaluate the curve at `x`.
    fn evaluate(&self, x: f64) -> f64;
}

impl<F> InterpolationCurve for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn evaluate(&self, x: f64) -> f64 {
        self(x)
    }
}

/// Piecewise linear function through a set of knots.
///
/// Between knots the value is linearly interpolated. Outside the knot range
/// the first (or last) segment is extended, so a curve whose end segments are
/// flat stays flat. A single-knot curve is constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveKnots", into = "CurveKnots")]
pub struct PiecewiseLinearCurve {
    x: Vec<f64>,
    y: Vec<f64>,
}

/// Serialized form of a curve, validated on the way in
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CurveKnots {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl TryFrom<CurveKnots> for PiecewiseLinearCurve {
    type Error = ProbeError;

    fn try_from(knots: CurveKnots) -> Result<Self, Self::Error> {
        Self::new(knots.x, knots.y)
    }
}

impl From<PiecewiseLinearCurve> for CurveKnots {
    fn from(curve: PiecewiseLinearCurve) -> Self {
        Self {
            x: curve.x,
            y: curve.y,
        }
    }
}

impl PiecewiseLinearCurve {
    /// Build a curve from knot abscissae and ordinates.
    ///
    /// Fails when the vectors differ in length, are empty, contain a
    /// non-finite value, or when `x` is not strictly increasing.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> ProbeResult<Self> {
        if x.len() != y.len() {
            return Err(ProbeError::configuration(
                "piecewise_linear_curve",
                format!("x has {} knots but y has {}", x.len(), y.len()),
            ));
        }
        if x.is_empty() {
            return Err(ProbeError::configuration(
                "piecewise_linear_curve",
                "curve needs at least one knot",
            ));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(ProbeError::configuration(
                "piecewise_linear_curve",
                "knot values must be finite",
            ));
        }
        if let Some(i) = x.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ProbeError::configuration(
                "piecewise_linear_curve",
                format!(
                    "x must be strictly increasing (x[{}] = {}, x[{}] = {})",
                    i,
                    x[i],
                    i + 1,
                    x[i + 1]
                ),
            ));
        }

        Ok(Self { x, y })
    }

    /// The Bhargava (2004) maintenance-rate curve: 1.0 at optimal fiber
    /// length, 0.5 at and beyond half/one-and-a-half optimal length.
    pub fn default_maintenance_curve() -> Self {
        Self {
            x: curve::DEFAULT_MAINTENANCE_CURVE_X.to_vec(),
            y: curve::DEFAULT_MAINTENANCE_CURVE_Y.to_vec(),
        }
    }

    /// Knot abscissae
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Knot ordinates
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    fn segment_value(&self, i: usize, x: f64) -> f64 {
        let (x0, x1) = (self.x[i], self.x[i + 1]);
        let (y0, y1) = (self.y[i], self.y[i + 1]);
        let slope = (y1 - y0) / (x1 - x0);
        y0 + slope * (x - x0)
    }
}

impl Default for PiecewiseLinearCurve {
    fn default() -> Self {
        Self::default_maintenance_curve()
    }
}

impl InterpolationCurve for PiecewiseLinearCurve {
    fn evaluate(&self, x: f64) -> f64 {
        let n = self.x.len();
        if n == 1 {
            return self.y[0];
        }

        if x <= self.x[0] {
            return self.segment_value(0, x);
        }
        if x >= self.x[n - 1] {
            return self.segment_value(n - 2, x);
        }

        // First knot strictly greater than x; x is inside (x[0], x[n-1]).
        let upper = self.x.partition_point(|&k| k <= x);
        self.segment_value(upper - 1, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_curve_knots() {
        let curve = PiecewiseLinearCurve::default();
        assert_eq!(curve.len(), 5);
        assert_relative_eq!(curve.evaluate(1.0), 1.0);
        assert_relative_eq!(curve.evaluate(0.5), 0.5);
        assert_relative_eq!(curve.evaluate(1.5), 0.5);
    }

    #[test]
    fn test_default_curve_interpolates() {
        let curve = PiecewiseLinearCurve::default();
        assert_relative_eq!(curve.evaluate(0.75), 0.75, epsilon = 1e-12);
        assert_relative_eq!(curve.evaluate(1.25), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_default_curve_flat_outside_center() {
        let curve = PiecewiseLinearCurve::default();
        assert_relative_eq!(curve.evaluate(0.2), 0.5);
        assert_relative_eq!(curve.evaluate(-1.0), 0.5);
        assert_relative_eq!(curve.evaluate(4.0), 0.5);
        assert_relative_eq!(curve.evaluate(25.0), 0.5);
    }

    #[test]
    fn test_linear_extrapolation() {
        let curve = PiecewiseLinearCurve::new(vec![0.0, 1.0], vec![0.0, 2.0]).unwrap();
        assert_relative_eq!(curve.evaluate(-1.0), -2.0);
        assert_relative_eq!(curve.evaluate(3.0), 6.0);
    }

    #[test]
    fn test_single_knot_is_constant() {
        let curve = PiecewiseLinearCurve::new(vec![1.0], vec![0.8]).unwrap();
        assert_relative_eq!(curve.evaluate(-5.0), 0.8);
        assert_relative_eq!(curve.evaluate(5.0), 0.8);
    }

    #[test]
    fn test_malformed_curves_rejected() {
        assert!(PiecewiseLinearCurve::new(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(PiecewiseLinearCurve::new(vec![], vec![]).is_err());
        assert!(PiecewiseLinearCurve::new(vec![0.0, 0.0], vec![1.0, 1.0]).is_err());
        assert!(PiecewiseLinearCurve::new(vec![1.0, 0.0], vec![1.0, 1.0]).is_err());
        assert!(PiecewiseLinearCurve::new(vec![0.0, f64::NAN], vec![1.0, 1.0]).is_err());
    }

    #[test]
    fn test_closure_as_curve() {
        let constant = |_: f64| 0.25;
        assert_relative_eq!(InterpolationCurve::evaluate(&constant, 3.0), 0.25);
    }

    #[test]
    fn test_curve_toml_round_trip_rejects_bad_knots() {
        let toml_str = "x = [0.0, 1.0]\ny = [1.0, 1.0]\n";
        let curve: PiecewiseLinearCurve = toml::from_str(toml_str).unwrap();
        assert_eq!(curve.x(), &[0.0, 1.0]);

        let bad = "x = [1.0, 0.0]\ny = [1.0, 1.0]\n";
        assert!(toml::from_str::<PiecewiseLinearCurve>(bad).is_err());
    }
}
