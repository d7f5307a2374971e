//! Incremental mesh construction from vertex/triangle streams.
//!
//! Each new triangle materializes or reuses three half-edge pairs. A
//! directed edge is reused when a faceless half-edge already runs the same
//! direction between the two endpoints; otherwise a fresh pair is allocated
//! and registered in both adjacency lists. Winding consistency across
//! adjacent triangles is the caller's responsibility.

use crate::float_types::Real;
use crate::handles::{EdgeHandle, FaceHandle, VertexHandle};
use crate::mesh::{triangle_normal, Face, HalfEdge, HalfEdgeMesh, Vertex};
use nalgebra::{Point3, Vector3};

impl HalfEdgeMesh {
    /// Insert a vertex and return its handle. The vertex also receives the
    /// next insertion-order index for [`add_triangle`](Self::add_triangle).
    pub fn add_vertex(&mut self, pos: Point3<Real>, normal: Vector3<Real>) -> VertexHandle {
        let handle = VertexHandle(self.vertices.insert(Vertex {
            pos,
            normal,
            out: Vec::new(),
            inc: Vec::new(),
        }));
        self.by_index.push(handle);
        handle
    }

    /// Build a triangle from insertion-order vertex indices.
    ///
    /// Panics when an index is out of range or its vertex has since been
    /// deleted; index-based building is meant for the initial soup, before
    /// destructive editing starts.
    pub fn add_triangle(&mut self, a: usize, b: usize, c: usize) -> FaceHandle {
        let va = self.by_index[a];
        let vb = self.by_index[b];
        let vc = self.by_index[c];
        assert!(
            self.contains_vertex(va) && self.contains_vertex(vb) && self.contains_vertex(vc),
            "add_triangle on deleted vertices ({a}, {b}, {c})"
        );
        self.add_face(va, vb, vc)
    }

    /// Build a triangle from vertex handles, reusing boundary half-edges
    /// where the topology allows.
    pub fn add_face(&mut self, v0: VertexHandle, v1: VertexHandle, v2: VertexHandle) -> FaceHandle {
        let e0 = self.edge_between(v0, v1);
        let e1 = self.edge_between(v1, v2);
        let e2 = self.edge_between(v2, v0);

        let face = FaceHandle(self.faces.insert(Face {
            edge: e0,
            normal: triangle_normal(self[v0].pos, self[v1].pos, self[v2].pos),
            region: None,
            visited: false,
        }));

        for (edge, next) in [(e0, e1), (e1, e2), (e2, e0)] {
            let entry = &mut self[edge];
            entry.face = Some(face);
            entry.next = Some(next);
        }

        face
    }

    /// Find a faceless half-edge running `from -> to`, or allocate a fresh
    /// pair and register both directions in the endpoint adjacency lists.
    fn edge_between(&mut self, from: VertexHandle, to: VertexHandle) -> EdgeHandle {
        for &candidate in &self[from].out {
            let edge = &self[candidate];
            if edge.end == to && edge.face.is_none() {
                return candidate;
            }
        }
        self.alloc_edge_pair(from, to)
    }

    /// Allocate the `from -> to` half-edge together with its pair.
    pub(crate) fn alloc_edge_pair(&mut self, from: VertexHandle, to: VertexHandle) -> EdgeHandle {
        let forward = EdgeHandle(self.edges.insert(HalfEdge {
            start: from,
            end: to,
            pair: EdgeHandle(u32::MAX), // patched below
            next: None,
            face: None,
            used: false,
        }));
        let backward = EdgeHandle(self.edges.insert(HalfEdge {
            start: to,
            end: from,
            pair: forward,
            next: None,
            face: None,
            used: false,
        }));
        self[forward].pair = backward;

        self[from].out.push(forward);
        self[from].inc.push(backward);
        self[to].out.push(backward);
        self[to].inc.push(forward);

        forward
    }
}
