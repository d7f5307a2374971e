//! Validation and guard errors

use crate::handles::{EdgeHandle, FaceHandle, VertexHandle};

/// All the structural inconsistencies [`check_integrity`] can report.
///
/// Any of these indicates a programming error inside a topology operation,
/// not a recoverable condition of the input mesh.
///
/// [`check_integrity`]: crate::HalfEdgeMesh::check_integrity
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    /// `edge.pair.pair` does not lead back to `edge`
    #[error("half-edge {0:?}: pair involution broken")]
    BrokenPairInvolution(EdgeHandle),

    /// `edge.pair.start != edge.end` or `edge.pair.end != edge.start`
    #[error("half-edge {0:?}: pair endpoints are not mirrored")]
    MirroredEndpoints(EdgeHandle),

    /// Walking `next` three times from `face.edge` does not return to it
    #[error("face {0:?}: edge cycle does not close after three steps")]
    OpenFaceCycle(FaceHandle),

    /// A cycle edge does not reference the face that owns it
    #[error("face {0:?}: cycle edge {1:?} references a different face")]
    ForeignCycleEdge(FaceHandle, EdgeHandle),

    /// A half-edge with a face has no `next`
    #[error("half-edge {0:?}: owns a face but has no next")]
    MissingNext(EdgeHandle),

    /// An adjacency list entry points at a dead or mismatched half-edge
    #[error("vertex {0:?}: adjacency list references edge {1:?} inconsistently")]
    AdjacencyMismatch(VertexHandle, EdgeHandle),

    /// An edge endpoint refers to a freed vertex
    #[error("half-edge {0:?}: endpoint vertex was freed")]
    DanglingEndpoint(EdgeHandle),
}

/// Reason a [`safe_collapse_edge`] refused to touch the mesh.
///
/// These are expected outcomes; callers skip the edge and move on.
///
/// [`safe_collapse_edge`]: crate::HalfEdgeMesh::safe_collapse_edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CollapseGuard {
    /// Collapsing would fold a three-valent cap flat
    #[error("collapse would create a degenerate cap")]
    DegenerateCap,

    /// A vertex is adjacent to both endpoints outside the collapsed triangles
    #[error("collapse would create a duplicate edge between one vertex pair")]
    DuplicateEdge,

    /// The edge is the sole bridge across a one-triangle hole
    #[error("collapse would remove the last bridge across a triangle hole")]
    TriangleHoleBridge,

    /// A region's flicker heuristic rejected the tentative midpoint
    #[error("collapse destabilizes a region (flicker)")]
    RegionFlicker,
}
