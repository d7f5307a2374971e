//! Planar regions: groups of adjacent faces with similar normals.
//!
//! Regions borrow face handles from the mesh and never own them. Each
//! segmentation pass rebuilds all regions from scratch; deletion paths evict
//! faces so a region list never holds a dead handle.

use crate::float_types::Real;
use crate::handles::{FaceHandle, VertexHandle};
use crate::mesh::plane::Plane;
use crate::mesh::HalfEdgeMesh;
use hashbrown::HashSet;
use nalgebra::{Point3, Vector3};

/// Cosine bound below which a face normal counts as flickering against its
/// region normal (about 28 degrees of deviation).
pub(crate) const FLICKER_COS: Real = 0.88;

/// A maximal or thresholded group of adjacent faces, optionally fit to a
/// least-squares regression plane.
#[derive(Debug, Clone)]
pub struct Region {
    pub id: u32,
    /// Borrowed face handles; the mesh owns the faces.
    pub faces: Vec<FaceHandle>,
    /// Seed normal until a regression plane is fit, then the plane normal.
    pub normal: Vector3<Real>,
    /// A point on the fitted plane (the seed point before fitting).
    pub support: Point3<Real>,
    /// Set once a regression plane has been fit.
    pub in_plane: bool,
}

impl Region {
    pub fn new(id: u32, normal: Vector3<Real>, support: Point3<Real>) -> Self {
        Region {
            id,
            faces: Vec::new(),
            normal,
            support,
            in_plane: false,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.faces.len()
    }

    /// The fitted plane. Meaningful once `in_plane` is set.
    pub fn plane(&self) -> Plane {
        Plane::new(self.normal, self.support)
    }

    /// All vertex handles touched by this region's faces.
    pub fn vertex_set(&self, mesh: &HalfEdgeMesh) -> HashSet<VertexHandle> {
        let mut vertices = HashSet::with_capacity(self.faces.len() * 2);
        for &face in &self.faces {
            if mesh.contains_face(face) {
                vertices.extend(mesh.face_vertices(face));
            }
        }
        vertices
    }

    /// Flicker heuristic: true when any region face touching `vertex`,
    /// recomputed from the current (possibly tentative) positions, deviates
    /// from the region normal beyond the flicker bound.
    pub fn detect_flicker(&self, mesh: &HalfEdgeMesh, vertex: VertexHandle) -> bool {
        for &face in &self.faces {
            if !mesh.contains_face(face) {
                continue;
            }
            if !mesh.face_vertices(face).contains(&vertex) {
                continue;
            }
            let normal = mesh.compute_face_normal(face);
            if normal.dot(&self.normal) < FLICKER_COS {
                return true;
            }
        }
        false
    }

    /// Per-face instability against the region normal, used when flickering
    /// faces are scheduled for removal. Recomputed from the current vertex
    /// positions, since stored normals are plane-aligned once a regression
    /// plane has been fit.
    pub(crate) fn face_flickers(&self, mesh: &HalfEdgeMesh, face: FaceHandle) -> bool {
        mesh.contains_face(face)
            && mesh.compute_face_normal(face).dot(&self.normal) < FLICKER_COS
    }

    /// Replace the seed normal and support with a least-squares regression
    /// plane through all region vertices and flag the region in-plane.
    ///
    /// Keeps the seed data when the vertices are too degenerate to define a
    /// plane.
    pub fn fit_regression_plane(&mut self, mesh: &HalfEdgeMesh) {
        let points: Vec<Point3<Real>> = self
            .vertex_set(mesh)
            .into_iter()
            .map(|v| mesh[v].pos)
            .collect();
        let Some(plane) = Plane::least_squares_fit(&points) else {
            return;
        };
        // The eigenvector's sign is arbitrary; keep it aligned with the
        // faces it represents.
        let flip = if plane.normal.dot(&self.normal) < 0.0 {
            -1.0
        } else {
            1.0
        };
        self.normal = plane.normal * flip;
        self.support = plane.support;
        self.in_plane = true;
    }
}
