use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};

/// Why a 4-point homography could not be solved.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomographyError {
    #[error("three of the four source points are collinear")]
    CollinearSource,
    #[error("three of the four destination points are collinear")]
    CollinearDestination,
    #[error("correspondence system is singular")]
    Singular,
}

/// Planar projective transform, stored with `h33 = 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    pub fn from_array(rows: [[f64; 3]; 3]) -> Self {
        Self::new(Matrix3::from_fn(|r, c| rows[r][c]))
    }

    pub fn to_array(&self) -> [[f64; 3]; 3] {
        std::array::from_fn(|r| std::array::from_fn(|c| self.h[(r, c)]))
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }

    /// Map `(x, y)` in double precision; `None` on the line at infinity.
    #[inline]
    pub fn apply_f64(&self, x: f64, y: f64) -> Option<Point2<f64>> {
        let v = self.h * Vector3::new(x, y, 1.0);
        let w = v[2];
        if w.abs() < 1e-12 {
            return None;
        }
        Some(Point2::new(v[0] / w, v[1] / w))
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }
}

// Hartley normalization: translate to centroid, scale so mean distance = sqrt(2).
fn normalize_points4(pts: &[Point2<f64>; 4]) -> ([Point2<f64>; 4], Matrix3<f64>) {
    let cx = pts.iter().map(|p| p.x).sum::<f64>() / 4.0;
    let cy = pts.iter().map(|p| p.y).sum::<f64>() / 4.0;
    let mean_dist = pts
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / 4.0;

    let s = if mean_dist > 1e-12 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };
    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);

    let out = pts.map(|p| Point2::new(s * (p.x - cx), s * (p.y - cy)));
    (out, t)
}

fn has_collinear_triple(pts: &[Point2<f64>; 4]) -> bool {
    let mut scale = 0.0_f64;
    for i in 0..4 {
        for j in (i + 1)..4 {
            scale = scale.max((pts[i] - pts[j]).norm_squared());
        }
    }
    if scale < 1e-12 {
        return true;
    }

    [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)]
        .iter()
        .any(|&(a, b, c)| {
            let u = pts[b] - pts[a];
            let v = pts[c] - pts[a];
            (u.x * v.y - u.y * v.x).abs() <= 1e-9 * scale
        })
}

/// Compute H such that `dst ~ H * src` from exactly four correspondences.
///
/// Corner order must be consistent between `src` and `dst`. Any three
/// collinear points on either side make the configuration degenerate.
pub fn homography_from_4pt(
    src: &[Point2<f32>; 4],
    dst: &[Point2<f32>; 4],
) -> Result<Homography, HomographyError> {
    let src = src.map(|p| Point2::new(p.x as f64, p.y as f64));
    let dst = dst.map(|p| Point2::new(p.x as f64, p.y as f64));
    if has_collinear_triple(&src) {
        return Err(HomographyError::CollinearSource);
    }
    if has_collinear_triple(&dst) {
        return Err(HomographyError::CollinearDestination);
    }

    let (src_n, t_src) = normalize_points4(&src);
    let (dst_n, t_dst) = normalize_points4(&dst);

    // Unknowns [h11 h12 h13 h21 h22 h23 h31 h32], h33 = 1:
    // h11 x + h12 y + h13 - u h31 x - u h32 y = u
    // h21 x + h22 y + h23 - v h31 x - v h32 y = v
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for (k, (s, d)) in src_n.iter().zip(dst_n.iter()).enumerate() {
        let (x, y, u, v) = (s.x, s.y, d.x, d.y);

        let r0 = 2 * k;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        b[r0] = u;

        let r1 = r0 + 1;
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        b[r1] = v;
    }

    let x = a.lu().solve(&b).ok_or(HomographyError::Singular)?;
    let hn = Matrix3::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );

    // H = T_dst^{-1} * Hn * T_src
    let t_dst_inv = t_dst.try_inverse().ok_or(HomographyError::Singular)?;
    let h = t_dst_inv * hn * t_src;
    let s = h[(2, 2)];
    if s.abs() < 1e-12 || !h.iter().all(|v| v.is_finite()) {
        return Err(HomographyError::Singular);
    }

    Ok(Homography::new(h / s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_close(a: Point2<f32>, b: Point2<f32>, tol: f32) {
        assert!(
            (a.x - b.x).abs() < tol && (a.y - b.y).abs() < tol,
            "expected ({:.4},{:.4}) ~ ({:.4},{:.4}) within {}",
            a.x,
            a.y,
            b.x,
            b.y,
            tol
        );
    }

    fn rect(w: f32, h: f32) -> [Point2<f32>; 4] {
        [
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ]
    }

    #[test]
    fn recovers_projective_ground_truth() {
        let ground_truth = Homography::from_array([
            [0.8, 0.05, 120.0],
            [-0.02, 1.1, 80.0],
            [0.0009, -0.0004, 1.0],
        ]);
        let src = rect(180.0, 130.0);
        let dst = src.map(|p| ground_truth.apply(p));

        let recovered = homography_from_4pt(&src, &dst).expect("solvable");
        for p in [
            Point2::new(0.0_f32, 0.0),
            Point2::new(60.0, 40.0),
            Point2::new(150.0, 120.0),
        ] {
            assert_close(recovered.apply(p), ground_truth.apply(p), 1e-3);
        }
    }

    #[test]
    fn identity_correspondence_gives_identity() {
        let src = rect(64.0, 48.0);
        let h = homography_from_4pt(&src, &src).expect("solvable");
        let expected = Matrix3::<f64>::identity();
        for (a, b) in h.h.iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn rect_to_offset_rect_is_scale_and_shift() {
        let src = rect(50.0, 50.0);
        let dst = rect(400.0, 300.0).map(|p| Point2::new(p.x + 100.0, p.y + 100.0));
        let h = homography_from_4pt(&src, &dst).expect("solvable");
        let arr = h.to_array();
        assert_relative_eq!(arr[0][0], 8.0, epsilon = 1e-9);
        assert_relative_eq!(arr[1][1], 6.0, epsilon = 1e-9);
        assert_relative_eq!(arr[0][2], 100.0, epsilon = 1e-7);
        assert_relative_eq!(arr[1][2], 100.0, epsilon = 1e-7);
        assert_relative_eq!(arr[2][0], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn collinear_destination_is_rejected() {
        let src = rect(10.0, 10.0);
        let dst = [
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 5.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        assert_eq!(
            homography_from_4pt(&src, &dst),
            Err(HomographyError::CollinearDestination)
        );
    }

    #[test]
    fn empty_source_is_rejected() {
        let src = rect(0.0, 0.0);
        let dst = rect(10.0, 10.0);
        assert_eq!(
            homography_from_4pt(&src, &dst),
            Err(HomographyError::CollinearSource)
        );
    }

    #[test]
    fn inverse_round_trips_points() {
        let h = Homography::from_array([[1.2, 0.1, 5.0], [-0.05, 0.9, 3.0], [0.001, 0.0005, 1.0]]);
        let inv = h.inverse().expect("invertible");
        for p in [Point2::new(0.0_f32, 0.0), Point2::new(320.0, 200.0)] {
            assert_close(inv.apply(h.apply(p)), p, 1e-3);
        }
    }
}
