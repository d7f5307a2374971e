//! Caller-facing configuration for the optimization pipeline.

use crate::float_types::Real;

/// Knobs for [`HalfEdgeMesh::optimize`](crate::HalfEdgeMesh::optimize).
///
/// The defaults mirror a typical reconstruction cleanup pass: three
/// segmentation iterations, a fairly permissive planarity bound, and
/// moderate hole filling.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshOptimization {
    /// Number of plane-segmentation iterations.
    pub plane_iterations: usize,
    /// Cosine bound for normal similarity during region growing.
    /// A neighbor joins a region when `n · n_ref > normal_threshold`.
    pub normal_threshold: Real,
    /// Minimum region size eligible for regression-plane fitting
    /// (combined with the `10·ln(face_count)` gate).
    pub min_plane_size: usize,
    /// Regions smaller than this are deleted outright after segmentation.
    pub small_region_threshold: usize,
    /// Delete faces whose region reports flicker instability.
    pub remove_flickering: bool,
    /// Connected patches smaller than this are removed before segmentation.
    pub dangling_artifact_size: usize,
    /// Upper bound on the length of boundary loops the hole filler attempts.
    pub max_hole_size: usize,
    /// Give every region a deterministic pseudo-color on export.
    pub color_regions: bool,
}

impl Default for MeshOptimization {
    fn default() -> Self {
        MeshOptimization {
            plane_iterations: 3,
            normal_threshold: 0.85,
            min_plane_size: 7,
            small_region_threshold: 10,
            remove_flickering: true,
            dangling_artifact_size: 0,
            max_hole_size: 30,
            color_regions: false,
        }
    }
}
