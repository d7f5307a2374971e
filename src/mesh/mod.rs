//! `HalfEdgeMesh` store: element arenas, accessors and invariant checks.
//!
//! The store exclusively owns all vertices, half-edges and faces. Regions
//! (see [`region`]) only borrow face handles and are rebuilt from scratch by
//! every segmentation pass.

use crate::config::MeshOptimization;
use crate::errors::MeshError;
use crate::float_types::Real;
use crate::handles::{Arena, EdgeHandle, FaceHandle, VertexHandle};
use crate::mesh::region::Region;
use nalgebra::{Point3, Vector3};
use std::ops::{Index, IndexMut};

pub mod build;
pub mod edit;
pub mod finalize;
pub mod holes;
pub mod plane;
pub mod region;
pub mod segmentation;

/// A mesh vertex: position, normal and both adjacency lists.
///
/// Identity is the arena slot; the insertion-order index kept by the mesh is
/// a plain counter for [`add_triangle`](HalfEdgeMesh::add_triangle), not a
/// stable identity.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub pos: Point3<Real>,
    pub normal: Vector3<Real>,
    /// Half-edges starting at this vertex.
    pub out: Vec<EdgeHandle>,
    /// Half-edges ending at this vertex.
    pub inc: Vec<EdgeHandle>,
}

/// One directed traversal of an undirected edge.
///
/// `pair` always points at the opposite-direction half-edge of the same
/// undirected edge; `next` is only meaningful while the half-edge owns a
/// face. A half-edge without a face is a boundary edge.
#[derive(Debug, Clone)]
pub struct HalfEdge {
    pub start: VertexHandle,
    pub end: VertexHandle,
    pub pair: EdgeHandle,
    pub next: Option<EdgeHandle>,
    pub face: Option<FaceHandle>,
    /// Transient marker for boundary-loop tracing.
    pub used: bool,
}

/// A triangle bounded by a 3-cycle of half-edges.
#[derive(Debug, Clone)]
pub struct Face {
    pub edge: EdgeHandle,
    pub normal: Vector3<Real>,
    /// Region id from the most recent segmentation pass, if any.
    pub region: Option<u32>,
    /// Transient marker for flood fills.
    pub visited: bool,
}

/// The half-edge mesh engine.
///
/// All topology operations mutate in place; exactly one logical owner edits
/// the mesh at a time. See the crate docs for the overall pipeline.
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    pub(crate) vertices: Arena<Vertex>,
    pub(crate) edges: Arena<HalfEdge>,
    pub(crate) faces: Arena<Face>,
    /// Insertion-order vertex list backing index-based triangle building.
    pub(crate) by_index: Vec<VertexHandle>,
    /// Regions from the most recent segmentation pass.
    pub regions: Vec<Region>,
}

impl HalfEdgeMesh {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of live half-edges (twice the number of undirected edges).
    #[inline]
    pub fn half_edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Checked vertex lookup; `None` for freed handles.
    #[inline]
    pub fn vertex(&self, handle: VertexHandle) -> Option<&Vertex> {
        self.vertices.get(handle.0)
    }

    /// Checked half-edge lookup; `None` for freed handles.
    #[inline]
    pub fn edge(&self, handle: EdgeHandle) -> Option<&HalfEdge> {
        self.edges.get(handle.0)
    }

    /// Checked face lookup; `None` for freed handles.
    #[inline]
    pub fn face(&self, handle: FaceHandle) -> Option<&Face> {
        self.faces.get(handle.0)
    }

    #[inline]
    pub fn contains_edge(&self, handle: EdgeHandle) -> bool {
        self.edges.contains(handle.0)
    }

    #[inline]
    pub fn contains_face(&self, handle: FaceHandle) -> bool {
        self.faces.contains(handle.0)
    }

    #[inline]
    pub fn contains_vertex(&self, handle: VertexHandle) -> bool {
        self.vertices.contains(handle.0)
    }

    /// Snapshot of live face handles, safe to walk while editing.
    pub fn face_handles(&self) -> Vec<FaceHandle> {
        self.faces.indices().into_iter().map(FaceHandle).collect()
    }

    /// Snapshot of live half-edge handles, safe to walk while editing.
    pub fn edge_handles(&self) -> Vec<EdgeHandle> {
        self.edges.indices().into_iter().map(EdgeHandle).collect()
    }

    /// Snapshot of live vertex handles.
    pub fn vertex_handles(&self) -> Vec<VertexHandle> {
        self.vertices.indices().into_iter().map(VertexHandle).collect()
    }

    /// The three edges of `face`'s cycle, starting at `face.edge`.
    pub fn face_edges(&self, face: FaceHandle) -> [EdgeHandle; 3] {
        let e0 = self[face].edge;
        let e1 = self[e0].next.expect("face edge without next");
        let e2 = self[e1].next.expect("face edge without next");
        [e0, e1, e2]
    }

    /// The three corner vertices of `face`, in cycle order.
    pub fn face_vertices(&self, face: FaceHandle) -> [VertexHandle; 3] {
        let [e0, e1, e2] = self.face_edges(face);
        [self[e0].start, self[e1].start, self[e2].start]
    }

    /// Face handles sharing an edge with `face` (via each edge's pair).
    pub fn adjacent_faces(&self, face: FaceHandle) -> Vec<FaceHandle> {
        self.face_edges(face)
            .iter()
            .filter_map(|&e| self[self[e].pair].face)
            .collect()
    }

    /// Normal of the triangle spanned by the face's current vertex
    /// positions. Not normalized when the triangle is degenerate.
    pub fn compute_face_normal(&self, face: FaceHandle) -> Vector3<Real> {
        let [a, b, c] = self.face_vertices(face);
        triangle_normal(self[a].pos, self[b].pos, self[c].pos)
    }

    /// Clear the transient `visited` marker on every face.
    pub(crate) fn reset_face_visited(&mut self) {
        for (_, face) in self.faces.iter_mut() {
            face.visited = false;
        }
    }

    /// Clear the transient `used` marker on every half-edge.
    pub(crate) fn reset_edge_used(&mut self) {
        for (_, edge) in self.edges.iter_mut() {
            edge.used = false;
        }
    }

    /// Drop all region state and the per-face region ids.
    pub fn clear_regions(&mut self) {
        self.regions.clear();
        for (_, face) in self.faces.iter_mut() {
            face.region = None;
        }
    }

    /// Run the full cleanup pipeline: dangling-artifact removal, iterative
    /// plane segmentation, hole filling, crease snapping and plane
    /// restoration.
    pub fn optimize(&mut self, config: &MeshOptimization) {
        if config.dangling_artifact_size > 0 {
            log::info!(
                "removing dangling artifacts below {} faces",
                config.dangling_artifact_size
            );
            self.remove_dangling_artifacts(config.dangling_artifact_size);
        }

        log::info!(
            "optimizing planes: {} iterations over {} faces",
            config.plane_iterations,
            self.face_count()
        );
        self.optimize_planes(
            config.plane_iterations,
            config.normal_threshold,
            config.min_plane_size,
            config.small_region_threshold,
            config.remove_flickering,
        );

        if config.max_hole_size > 0 {
            self.fill_holes(config.max_hole_size);
        }

        self.optimize_plane_intersections();
        self.restore_planes();
        log::info!(
            "optimization done: {} vertices, {} faces, {} regions",
            self.vertex_count(),
            self.face_count(),
            self.regions.len()
        );
    }

    /// Verify every structural invariant of the half-edge graph.
    ///
    /// Cheap enough for test assertions after each destructive operation;
    /// not called from the engine's own hot paths.
    pub fn check_integrity(&self) -> Result<(), MeshError> {
        for (idx, edge) in self.edges.iter() {
            let handle = EdgeHandle(idx);
            let pair = self
                .edge(edge.pair)
                .ok_or(MeshError::BrokenPairInvolution(handle))?;
            if pair.pair != handle {
                return Err(MeshError::BrokenPairInvolution(handle));
            }
            if pair.start != edge.end || pair.end != edge.start {
                return Err(MeshError::MirroredEndpoints(handle));
            }
            if edge.face.is_some() && edge.next.is_none() {
                return Err(MeshError::MissingNext(handle));
            }

            let start = self
                .vertex(edge.start)
                .ok_or(MeshError::DanglingEndpoint(handle))?;
            if !start.out.contains(&handle) {
                return Err(MeshError::AdjacencyMismatch(edge.start, handle));
            }
            let end = self
                .vertex(edge.end)
                .ok_or(MeshError::DanglingEndpoint(handle))?;
            if !end.inc.contains(&handle) {
                return Err(MeshError::AdjacencyMismatch(edge.end, handle));
            }
        }

        for (idx, face) in self.faces.iter() {
            let handle = FaceHandle(idx);
            let mut cursor = face.edge;
            for _ in 0..3 {
                let edge = self.edge(cursor).ok_or(MeshError::OpenFaceCycle(handle))?;
                if edge.face != Some(handle) {
                    return Err(MeshError::ForeignCycleEdge(handle, cursor));
                }
                cursor = edge.next.ok_or(MeshError::MissingNext(cursor))?;
            }
            if cursor != face.edge {
                return Err(MeshError::OpenFaceCycle(handle));
            }
        }

        for (idx, vertex) in self.vertices.iter() {
            let handle = VertexHandle(idx);
            for &out in &vertex.out {
                if self.edge(out).map(|e| e.start) != Some(handle) {
                    return Err(MeshError::AdjacencyMismatch(handle, out));
                }
            }
            for &inc in &vertex.inc {
                if self.edge(inc).map(|e| e.end) != Some(handle) {
                    return Err(MeshError::AdjacencyMismatch(handle, inc));
                }
            }
        }

        Ok(())
    }
}

/// Unnormalized-safe triangle normal: cross of two edge vectors, normalized
/// when non-degenerate.
pub(crate) fn triangle_normal(
    a: Point3<Real>,
    b: Point3<Real>,
    c: Point3<Real>,
) -> Vector3<Real> {
    let n = (b - a).cross(&(c - a));
    let len = n.norm();
    if len > Real::EPSILON {
        n / len
    } else {
        n
    }
}

impl Index<VertexHandle> for HalfEdgeMesh {
    type Output = Vertex;

    #[inline]
    fn index(&self, handle: VertexHandle) -> &Vertex {
        self.vertices
            .get(handle.0)
            .unwrap_or_else(|| panic!("stale vertex handle {handle:?}"))
    }
}

impl IndexMut<VertexHandle> for HalfEdgeMesh {
    #[inline]
    fn index_mut(&mut self, handle: VertexHandle) -> &mut Vertex {
        self.vertices
            .get_mut(handle.0)
            .unwrap_or_else(|| panic!("stale vertex handle {handle:?}"))
    }
}

impl Index<EdgeHandle> for HalfEdgeMesh {
    type Output = HalfEdge;

    #[inline]
    fn index(&self, handle: EdgeHandle) -> &HalfEdge {
        self.edges
            .get(handle.0)
            .unwrap_or_else(|| panic!("stale edge handle {handle:?}"))
    }
}

impl IndexMut<EdgeHandle> for HalfEdgeMesh {
    #[inline]
    fn index_mut(&mut self, handle: EdgeHandle) -> &mut HalfEdge {
        self.edges
            .get_mut(handle.0)
            .unwrap_or_else(|| panic!("stale edge handle {handle:?}"))
    }
}

impl Index<FaceHandle> for HalfEdgeMesh {
    type Output = Face;

    #[inline]
    fn index(&self, handle: FaceHandle) -> &Face {
        self.faces
            .get(handle.0)
            .unwrap_or_else(|| panic!("stale face handle {handle:?}"))
    }
}

impl IndexMut<FaceHandle> for HalfEdgeMesh {
    #[inline]
    fn index_mut(&mut self, handle: FaceHandle) -> &mut Face {
        self.faces
            .get_mut(handle.0)
            .unwrap_or_else(|| panic!("stale face handle {handle:?}"))
    }
}
