// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Planar homography from four point correspondences.

use flatpage_core::error::{FlatpageError, Result};
use flatpage_core::{Point, Quadrilateral};
use tracing::{debug, warn};

/// Pivots smaller than this mean the system is singular (collinear or
/// repeated points).
pub const PIVOT_EPSILON: f64 = 1e-10;

/// A 3x3 projective matrix stored row-major with `h8` fixed to 1.
///
/// Maps `(x, y)` to
/// ```text
/// u = (h0*x + h1*y + h2) / (h6*x + h7*y + 1)
/// v = (h3*x + h4*y + h5) / (h6*x + h7*y + 1)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomographyMatrix {
    coefficients: [f64; 9],
}

impl HomographyMatrix {
    pub const fn identity() -> Self {
        Self {
            coefficients: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Build from the eight free coefficients; `h8` is set to 1.
    pub const fn from_free(h: [f64; 8]) -> Self {
        Self {
            coefficients: [h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0],
        }
    }

    pub fn coefficients(&self) -> &[f64; 9] {
        &self.coefficients
    }

    /// Map a point; `None` when it lands on the line at infinity.
    #[inline]
    pub fn apply(&self, point: Point) -> Option<Point> {
        let h = &self.coefficients;
        let w = h[6] * point.x + h[7] * point.y + h[8];
        if w.abs() < PIVOT_EPSILON {
            return None;
        }
        Some(Point::new(
            (h[0] * point.x + h[1] * point.y + h[2]) / w,
            (h[3] * point.x + h[4] * point.y + h[5]) / w,
        ))
    }
}

impl Default for HomographyMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// Solve for the homography taking each `src` corner onto the matching `dst`
/// corner.
///
/// Builds the standard 8x8 system (two rows per correspondence) and solves it
/// by Gaussian elimination with partial pivoting. A vanishing pivot yields
/// [`FlatpageError::DegenerateTransform`] instead of NaN coefficients.
pub fn solve(src: &Quadrilateral, dst: &Quadrilateral) -> Result<HomographyMatrix> {
    let mut a = [[0.0f64; 8]; 8];
    let mut b = [0.0f64; 8];

    for (i, (s, d)) in src.corners().iter().zip(dst.corners().iter()).enumerate() {
        let (x, y, u, v) = (s.x, s.y, d.x, d.y);
        a[2 * i] = [x, y, 1.0, 0.0, 0.0, 0.0, -x * u, -y * u];
        b[2 * i] = u;
        a[2 * i + 1] = [0.0, 0.0, 0.0, x, y, 1.0, -x * v, -y * v];
        b[2 * i + 1] = v;
    }

    let h = solve_linear_system(&mut a, &mut b)?;
    if h.iter().any(|c| !c.is_finite()) {
        warn!("Homography produced non-finite coefficients");
        return Err(FlatpageError::DegenerateTransform { pivot: f64::NAN });
    }

    debug!(?h, "Homography solved");
    Ok(HomographyMatrix::from_free(h))
}

/// Gaussian elimination with partial pivoting on an 8x8 system.
fn solve_linear_system(a: &mut [[f64; 8]; 8], b: &mut [f64; 8]) -> Result<[f64; 8]> {
    const N: usize = 8;

    for col in 0..N {
        // Largest magnitude in this column among the remaining rows.
        let mut max_row = col;
        let mut max_val = a[col][col].abs();
        for row in (col + 1)..N {
            if a[row][col].abs() > max_val {
                max_val = a[row][col].abs();
                max_row = row;
            }
        }

        if !(max_val >= PIVOT_EPSILON) {
            warn!(col, pivot = max_val, "Singular homography system");
            return Err(FlatpageError::DegenerateTransform { pivot: max_val });
        }

        if max_row != col {
            a.swap(col, max_row);
            b.swap(col, max_row);
        }

        let pivot = a[col][col];
        for row in (col + 1)..N {
            let factor = a[row][col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in col..N {
                a[row][j] -= factor * a[col][j];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0f64; N];
    for i in (0..N).rev() {
        let mut sum = b[i];
        for j in (i + 1)..N {
            sum -= a[i][j] * x[j];
        }
        x[i] = sum / a[i][i];
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(points: [(f64, f64); 4]) -> Quadrilateral {
        Quadrilateral::from_corners(points.map(Point::from))
    }

    #[test]
    fn rectangle_onto_itself_is_identity() {
        for (w, h) in [(1.0, 1.0), (640.0, 480.0), (1240.0, 1754.0)] {
            let rect = Quadrilateral::rectangle(w, h);
            let m = solve(&rect, &rect).expect("solvable");
            let identity = HomographyMatrix::identity();
            for (got, want) in m.coefficients().iter().zip(identity.coefficients()) {
                assert!((got - want).abs() < 1e-6, "{got} vs {want}");
            }
        }
    }

    #[test]
    fn offset_rectangle_onto_itself_is_identity() {
        let rect = quad([(100.0, 150.0), (700.0, 150.0), (700.0, 900.0), (100.0, 900.0)]);
        let m = solve(&rect, &rect).expect("solvable");
        for (got, want) in m
            .coefficients()
            .iter()
            .zip(HomographyMatrix::identity().coefficients())
        {
            assert!((got - want).abs() < 1e-6);
        }
    }

    #[test]
    fn maps_every_corner_onto_its_target() {
        let src = Quadrilateral::rectangle(600.0, 750.0);
        let dst = quad([(95.0, 140.0), (710.0, 160.0), (690.0, 905.0), (105.0, 880.0)]);
        let m = solve(&src, &dst).expect("solvable");
        for (s, d) in src.corners().iter().zip(dst.corners().iter()) {
            let mapped = m.apply(*s).expect("finite");
            assert!(mapped.distance(d) < 1e-6, "{mapped:?} vs {d:?}");
        }
    }

    #[test]
    fn pure_translation_and_scale() {
        let src = Quadrilateral::rectangle(10.0, 10.0);
        let dst = quad([(5.0, 5.0), (25.0, 5.0), (25.0, 25.0), (5.0, 25.0)]);
        let m = solve(&src, &dst).expect("solvable");
        let c = m.coefficients();
        assert!((c[0] - 2.0).abs() < 1e-9);
        assert!((c[4] - 2.0).abs() < 1e-9);
        assert!((c[2] - 5.0).abs() < 1e-9);
        assert!((c[5] - 5.0).abs() < 1e-9);
        assert!(c[6].abs() < 1e-12 && c[7].abs() < 1e-12);
    }

    #[test]
    fn collinear_source_is_degenerate() {
        let collinear = quad([(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        let rect = Quadrilateral::rectangle(100.0, 100.0);
        let result = solve(&collinear, &rect);
        assert!(matches!(
            result,
            Err(FlatpageError::DegenerateTransform { .. })
        ));
    }

    #[test]
    fn repeated_points_are_degenerate() {
        let p = Point::new(42.0, 17.0);
        let collapsed = Quadrilateral::from_corners([p; 4]);
        let rect = Quadrilateral::rectangle(100.0, 100.0);
        assert!(matches!(
            solve(&collapsed, &rect),
            Err(FlatpageError::DegenerateTransform { .. })
        ));
    }

    #[test]
    fn point_at_infinity_maps_to_none() {
        // h6 = 1 puts x = -1 on the line at infinity.
        let m = HomographyMatrix::from_free([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
        assert!(m.apply(Point::new(-1.0, 3.0)).is_none());
        assert!(m.apply(Point::new(1.0, 3.0)).is_some());
    }
}
