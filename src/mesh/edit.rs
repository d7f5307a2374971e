//! Destructive topology operations: deletion, edge collapse, edge flip and
//! the guarded "safe collapse".
//!
//! Every operation here keeps the two graph invariants intact — pair
//! involution and face 3-cycles — or refuses to run. Deletion paths fully
//! unlink adjacency-list references before freeing a slot and recycle
//! vertices whose adjacency becomes empty.

use crate::errors::CollapseGuard;
use crate::handles::{EdgeHandle, FaceHandle, VertexHandle};
use crate::mesh::HalfEdgeMesh;
use hashbrown::HashSet;
use nalgebra::Point3;

impl HalfEdgeMesh {
    /// Free a vertex slot. O(1); the caller must guarantee no half-edge
    /// still references it.
    pub fn delete_vertex(&mut self, vertex: VertexHandle) {
        debug_assert!(
            self[vertex].out.is_empty() && self[vertex].inc.is_empty(),
            "delete_vertex with live adjacency on {vertex:?}"
        );
        self.vertices.remove(vertex.0);
    }

    /// Remove `edge` from its endpoints' adjacency lists and free it, along
    /// with its pair when `delete_pair` is set.
    ///
    /// Deleting one side only is the low-level tool for triangle removal
    /// during a collapse, where the pair survives re-paired to another edge.
    pub fn delete_edge(&mut self, edge: EdgeHandle, delete_pair: bool) {
        let (start, end, pair) = {
            let e = &self[edge];
            (e.start, e.end, e.pair)
        };
        unlink(&mut self[start].out, edge);
        unlink(&mut self[end].inc, edge);
        self.edges.remove(edge.0);

        if delete_pair {
            unlink(&mut self[end].out, pair);
            unlink(&mut self[start].inc, pair);
            self.edges.remove(pair.0);
        }
    }

    /// Delete a face: clear `face`/`next` on its three edges, then delete
    /// every edge whose pair is now also faceless (both directions at once),
    /// recycling any endpoint left without outgoing edges.
    pub fn delete_face(&mut self, face: FaceHandle) {
        let edges = self.face_edges(face);
        self.evict_from_region(face);
        self.faces.remove(face.0);

        for &edge in &edges {
            let e = &mut self[edge];
            e.face = None;
            e.next = None;
        }

        for &edge in &edges {
            // A previous iteration may already have freed this edge as the
            // pair of another cycle edge.
            if !self.contains_edge(edge) {
                continue;
            }
            let pair = self[edge].pair;
            if self[pair].face.is_some() {
                continue;
            }
            let (start, end) = (self[edge].start, self[edge].end);
            self.delete_edge(edge, true);
            for vertex in [start, end] {
                if self.contains_vertex(vertex) && self[vertex].out.is_empty() {
                    self[vertex].inc.clear();
                    self.delete_vertex(vertex);
                }
            }
        }
    }

    /// Collapse `edge`, merging its end vertex into its start vertex at the
    /// edge midpoint. Each side that carries a face loses that triangle;
    /// the remaining cycles stay valid through re-pairing across the gap.
    /// Returns the surviving vertex.
    ///
    /// No guards: callers wanting degeneracy protection use
    /// [`safe_collapse_edge`](Self::safe_collapse_edge).
    pub fn collapse_edge(&mut self, edge: EdgeHandle) -> VertexHandle {
        let pair = self[edge].pair;
        let keep = self[edge].start;
        let gone = self[edge].end;

        let mid = Point3::from((self[keep].pos.coords + self[gone].pos.coords) * 0.5);
        self[keep].pos = mid;

        self.remove_collapsed_triangle(edge);
        self.remove_collapsed_triangle(pair);
        self.delete_edge(edge, true);

        // Re-home every remaining edge of the dead vertex onto the survivor.
        let out = std::mem::take(&mut self[gone].out);
        for &e in &out {
            self[e].start = keep;
        }
        self[keep].out.extend(out);
        let inc = std::mem::take(&mut self[gone].inc);
        for &e in &inc {
            self[e].end = keep;
        }
        self[keep].inc.extend(inc);

        self.delete_vertex(gone);
        keep
    }

    /// Remove the triangle on one side of a collapsing edge, if present.
    ///
    /// The two other cycle edges are freed and their outer pairs re-paired
    /// with each other, closing the gap the triangle leaves behind.
    fn remove_collapsed_triangle(&mut self, side: EdgeHandle) {
        let Some(face) = self[side].face else {
            return;
        };
        let n1 = self[side].next.expect("face edge without next");
        let n2 = self[n1].next.expect("face edge without next");
        debug_assert_eq!(self[n2].next, Some(side), "collapse on a non-triangle cycle");

        let p1 = self[n1].pair;
        let p2 = self[n2].pair;

        self.evict_from_region(face);
        self.faces.remove(face.0);
        self[side].face = None;
        self[side].next = None;

        self[p1].pair = p2;
        self[p2].pair = p1;
        self.delete_edge(n1, false);
        self.delete_edge(n2, false);
    }

    /// Swap the diagonal of the quad enclosing `edge`. Legal only when both
    /// sides carry a face; returns `false` without touching the mesh
    /// otherwise.
    pub fn flip_edge(&mut self, edge: EdgeHandle) -> bool {
        let pair = self[edge].pair;
        let (Some(f1), Some(f2)) = (self[edge].face, self[pair].face) else {
            return false;
        };

        // Quad around the a->b diagonal: triangle (a, b, c) carries
        // edge/n1/n2, triangle (b, a, d) carries pair/q1/q2.
        let n1 = self[edge].next.expect("face edge without next");
        let n2 = self[n1].next.expect("face edge without next");
        let q1 = self[pair].next.expect("face edge without next");
        let q2 = self[q1].next.expect("face edge without next");
        let c = self[n1].end;
        let d = self[q1].end;

        let diagonal = self.alloc_edge_pair(d, c);
        let diagonal_pair = self[diagonal].pair;

        // New triangle (c, a, d): n2, q1, diagonal.
        self[f1].edge = n2;
        for (e, next) in [(n2, q1), (q1, diagonal), (diagonal, n2)] {
            self[e].next = Some(next);
            self[e].face = Some(f1);
        }
        // New triangle (d, b, c): q2, n1, diagonal_pair.
        self[f2].edge = q2;
        for (e, next) in [(q2, n1), (n1, diagonal_pair), (diagonal_pair, q2)] {
            self[e].next = Some(next);
            self[e].face = Some(f2);
        }

        self[f1].normal = self.compute_face_normal(f1);
        self[f2].normal = self.compute_face_normal(f2);

        self.delete_edge(edge, true);
        true
    }

    /// Guarded collapse: rejects anything that would degenerate the mesh or
    /// visibly destabilize a region, otherwise delegates to
    /// [`collapse_edge`](Self::collapse_edge).
    ///
    /// On rejection the mesh is untouched (tentatively moved endpoints are
    /// restored).
    pub fn safe_collapse_edge(&mut self, edge: EdgeHandle) -> Result<(), CollapseGuard> {
        let pair = self[edge].pair;
        let a = self[edge].start;
        let b = self[edge].end;

        if self.collapse_forms_cap(edge) || self.collapse_forms_cap(pair) {
            return Err(CollapseGuard::DegenerateCap);
        }

        // A boundary side forming a three-edge loop is a one-triangle hole;
        // collapsing its bridge would pinch the boundary shut. Checked before
        // the link condition, which such a loop always violates as well.
        if self[edge].face.is_none() && self.boundary_loop_length(edge, 4) == 3 {
            return Err(CollapseGuard::TriangleHoleBridge);
        }
        if self[pair].face.is_none() && self.boundary_loop_length(pair, 4) == 3 {
            return Err(CollapseGuard::TriangleHoleBridge);
        }

        // Link condition: a vertex adjacent to both endpoints outside the
        // two collapsing triangles would end up with duplicate edges.
        let opposite_1 = self[edge]
            .face
            .map(|_| self[self[edge].next.expect("face edge without next")].end);
        let opposite_2 = self[pair]
            .face
            .map(|_| self[self[pair].next.expect("face edge without next")].end);
        let mut around_a: HashSet<VertexHandle> = HashSet::new();
        for &e in &self[a].out {
            around_a.insert(self[e].end);
        }
        for &e in &self[a].inc {
            around_a.insert(self[e].start);
        }
        for &e in self[b].out.iter().chain(self[b].inc.iter()) {
            let w = if self[e].start == b {
                self[e].end
            } else {
                self[e].start
            };
            if w != a
                && around_a.contains(&w)
                && Some(w) != opposite_1
                && Some(w) != opposite_2
            {
                return Err(CollapseGuard::DuplicateEdge);
            }
        }

        // Flicker test: tentatively move both endpoints to the candidate
        // position and ask every affected region.
        let pos_a = self[a].pos;
        let pos_b = self[b].pos;
        let mid = Point3::from((pos_a.coords + pos_b.coords) * 0.5);
        self[a].pos = mid;
        self[b].pos = mid;
        let mut flickers = false;
        'regions: for region_id in self.incident_regions(a, b) {
            let region = &self.regions[region_id as usize];
            for vertex in [a, b] {
                if region.detect_flicker(self, vertex) {
                    flickers = true;
                    break 'regions;
                }
            }
        }
        self[a].pos = pos_a;
        self[b].pos = pos_b;
        if flickers {
            return Err(CollapseGuard::RegionFlicker);
        }

        self.collapse_edge(edge);
        Ok(())
    }

    /// Cap detection for one side of a collapsing edge.
    ///
    /// With triangle (a, b, o) on this side, the opposite vertex `o` sits on
    /// a closed three-face fan exactly when the neighbor triangles across
    /// the two other cycle edges share their remaining edge at `o`:
    /// `pair(next(next(pair(n1)))) == next(pair(n2))`. Collapsing would
    /// squeeze `o` down to valence two.
    fn collapse_forms_cap(&self, side: EdgeHandle) -> bool {
        if self[side].face.is_none() {
            return false;
        }
        let n1 = self[side].next.expect("face edge without next");
        let n2 = self[n1].next.expect("face edge without next");
        let p1 = self[n1].pair;
        let p2 = self[n2].pair;
        if self[p1].face.is_none() || self[p2].face.is_none() {
            return false;
        }
        let p1_next = self[p1].next.expect("face edge without next");
        let across = self[self[p1_next].next.expect("face edge without next")].pair;
        let other = self[p2].next.expect("face edge without next");
        across == other
    }

    /// Length of the boundary loop through `start`, following each end
    /// vertex's first outgoing boundary edge. `usize::MAX` when the loop
    /// does not close within `cap` steps.
    fn boundary_loop_length(&self, start: EdgeHandle, cap: usize) -> usize {
        let mut current = start;
        let mut length = 1usize;
        while length <= cap {
            let back = self[current].pair;
            let end = self[current].end;
            let next = self[end]
                .out
                .iter()
                .copied()
                .find(|&e| e != back && self[e].face.is_none());
            match next {
                Some(e) if e == start => return length,
                Some(e) => {
                    current = e;
                    length += 1;
                }
                None => return usize::MAX,
            }
        }
        usize::MAX
    }

    /// Distinct region ids of faces touching either endpoint.
    fn incident_regions(&self, a: VertexHandle, b: VertexHandle) -> Vec<u32> {
        let mut seen: HashSet<u32> = HashSet::new();
        for vertex in [a, b] {
            for &e in self[vertex].out.iter().chain(self[vertex].inc.iter()) {
                if let Some(face) = self[e].face {
                    if let Some(region) = self[face].region {
                        if (region as usize) < self.regions.len() {
                            seen.insert(region);
                        }
                    }
                }
            }
        }
        seen.into_iter().collect()
    }

    /// Take a face out of its region's borrowed face list before freeing
    /// it, so the region never holds a dead handle.
    pub(crate) fn evict_from_region(&mut self, face: FaceHandle) {
        if let Some(region) = self[face].region {
            if let Some(entry) = self.regions.get_mut(region as usize) {
                if let Some(at) = entry.faces.iter().position(|&f| f == face) {
                    entry.faces.swap_remove(at);
                }
            }
        }
    }
}

/// Drop one handle from an adjacency list. Order is not meaningful, so a
/// swap remove is fine.
fn unlink(list: &mut Vec<EdgeHandle>, edge: EdgeHandle) {
    if let Some(at) = list.iter().position(|&e| e == edge) {
        list.swap_remove(at);
    }
}
