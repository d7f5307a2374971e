//! Infinite planes given as unit normal plus support point: least-squares
//! fitting, projection and plane-plane intersection.

use crate::float_types::{tolerance, Real};
use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};

/// A plane through `support` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<Real>,
    pub support: Point3<Real>,
}

impl Plane {
    pub const fn new(normal: Vector3<Real>, support: Point3<Real>) -> Self {
        Plane { normal, support }
    }

    /// Signed distance of `point` along the normal.
    #[inline]
    pub fn signed_distance(&self, point: &Point3<Real>) -> Real {
        self.normal.dot(&(point - self.support))
    }

    /// Orthogonal projection of `point` onto the plane.
    #[inline]
    pub fn project(&self, point: &Point3<Real>) -> Point3<Real> {
        point - self.normal * self.signed_distance(point)
    }

    /// Least-squares regression plane through `points`: centroid support,
    /// normal along the smallest principal axis of the covariance matrix.
    ///
    /// `None` when fewer than three points are given or the points are
    /// (numerically) collinear.
    pub fn least_squares_fit(points: &[Point3<Real>]) -> Option<Plane> {
        if points.len() < 3 {
            return None;
        }

        let inv = 1.0 / points.len() as Real;
        let centroid = Point3::from(
            points
                .iter()
                .fold(Vector3::zeros(), |acc, p| acc + p.coords)
                * inv,
        );

        let mut covariance = Matrix3::zeros();
        for point in points {
            let d = point - centroid;
            covariance += d * d.transpose();
        }

        let eigen = SymmetricEigen::new(covariance);
        let mut smallest = 0;
        for i in 1..3 {
            if eigen.eigenvalues[i] < eigen.eigenvalues[smallest] {
                smallest = i;
            }
        }
        let normal: Vector3<Real> = eigen.eigenvectors.column(smallest).clone_owned();
        let length = normal.norm();
        if length <= Real::EPSILON {
            return None;
        }
        // Collinear input: the two smallest eigenvalues are both ~zero and
        // the normal direction is meaningless.
        let mut sorted = [
            eigen.eigenvalues[0],
            eigen.eigenvalues[1],
            eigen.eigenvalues[2],
        ];
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        if sorted[1] <= tolerance() * sorted[2].max(1.0) {
            return None;
        }

        Some(Plane::new(normal / length, centroid))
    }

    /// The 3D line where two non-parallel infinite planes meet, as
    /// `(point, unit direction)`. `None` for (near-)parallel planes.
    pub fn intersection(&self, other: &Plane) -> Option<(Point3<Real>, Vector3<Real>)> {
        let direction = self.normal.cross(&other.normal);
        let det = direction.norm_squared();
        if det <= tolerance() {
            return None;
        }
        let d1 = self.normal.dot(&self.support.coords);
        let d2 = other.normal.dot(&other.support.coords);
        let point =
            (other.normal.cross(&direction) * d1 + direction.cross(&self.normal) * d2) / det;
        Some((Point3::from(point), direction / direction.norm()))
    }

    /// Orthogonal projection of `point` onto the line `(origin, direction)`.
    pub fn project_onto_line(
        origin: &Point3<Real>,
        direction: &Vector3<Real>,
        point: &Point3<Real>,
    ) -> Point3<Real> {
        origin + direction * direction.dot(&(point - origin))
    }
}
