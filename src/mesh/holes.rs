//! Best-effort hole filling: boundary-loop tracing, collapse-based
//! shrinking and ear-style retriangulation.
//!
//! Degenerate or non-triangulable holes are an expected outcome; the
//! algorithm makes bounded progress and terminates, leaving a residual
//! unfilled boundary rather than looping.

use crate::handles::{EdgeHandle, FaceHandle};
use crate::mesh::{triangle_normal, Face, HalfEdgeMesh};

impl HalfEdgeMesh {
    /// Scan all boundary half-edges, trace each unvisited boundary loop and
    /// try to close every loop whose length is strictly between 2 and
    /// `max_size`.
    pub fn fill_holes(&mut self, max_size: usize) {
        self.reset_edge_used();

        let mut loops: Vec<Vec<EdgeHandle>> = Vec::new();
        for edge in self.edge_handles() {
            if self[edge].face.is_some() || self[edge].used {
                continue;
            }
            let contour = self.trace_boundary_loop(edge);
            if contour.len() > 2 && contour.len() < max_size {
                loops.push(contour);
            }
        }

        log::info!("filling {} hole(s) up to size {}", loops.len(), max_size);
        for contour in loops {
            self.fill_loop(contour);
        }
    }

    /// Follow a boundary loop from `start`: repeatedly advance from the
    /// current end vertex to its first unused boundary outgoing edge,
    /// marking edges used as they are consumed.
    fn trace_boundary_loop(&mut self, start: EdgeHandle) -> Vec<EdgeHandle> {
        let mut contour = Vec::new();
        let mut current = start;
        loop {
            self[current].used = true;
            contour.push(current);
            let end = self[current].end;
            let next = self[end]
                .out
                .iter()
                .copied()
                .find(|&e| self[e].face.is_none() && !self[e].used);
            match next {
                Some(edge) => current = edge,
                None => break,
            }
        }
        contour
    }

    /// Close one traced loop: shrink it by safe collapses, then repeatedly
    /// pick 3-cycles off the remaining edges and synthesize faces for them.
    /// When a scan finds no 3-cycle, the trailing edge is dropped and the
    /// scan retried — the candidate list shrinks every pass, so this always
    /// terminates, possibly with a residual boundary.
    fn fill_loop(&mut self, mut edges: Vec<EdgeHandle>) {
        let traced = edges.len();

        // Shrink: collapse whatever the guards allow until nothing moves.
        let mut progress = true;
        while progress {
            progress = false;
            edges.retain(|&e| self.contains_edge(e) && self[e].face.is_none());
            for index in 0..edges.len() {
                let edge = edges[index];
                if !self.contains_edge(edge) {
                    continue;
                }
                if self.safe_collapse_edge(edge).is_ok() {
                    progress = true;
                }
            }
        }
        edges.retain(|&e| self.contains_edge(e) && self[e].face.is_none());

        // Retriangulate what is left.
        while edges.len() >= 3 {
            let back = *edges.last().expect("non-empty candidate list");
            let mut cycle = None;
            'scan: for i in 0..edges.len() - 1 {
                for j in 0..edges.len() - 1 {
                    if i == j {
                        continue;
                    }
                    let (ei, ej) = (edges[i], edges[j]);
                    if self[ei].end == self[ej].start
                        && self[ej].end == self[back].start
                        && self[back].end == self[ei].start
                    {
                        cycle = Some((ei, ej));
                        break 'scan;
                    }
                }
            }

            match cycle {
                Some((ei, ej)) => {
                    self.synthesize_face(ei, ej, back);
                    edges.retain(|&e| e != ei && e != ej && e != back);
                }
                None => {
                    edges.pop();
                }
            }
        }

        if !edges.is_empty() {
            log::warn!(
                "hole of {} edges left partially unfilled ({} boundary edges remain)",
                traced,
                edges.len()
            );
        }
    }

    /// Build a face over three existing boundary edges that already form a
    /// cycle, inheriting a region from a neighboring face reachable through
    /// one edge's pair.
    fn synthesize_face(&mut self, e0: EdgeHandle, e1: EdgeHandle, e2: EdgeHandle) {
        debug_assert!(
            self[e0].face.is_none() && self[e1].face.is_none() && self[e2].face.is_none(),
            "synthesize_face over owned edges"
        );
        debug_assert_eq!(self[e0].end, self[e1].start);
        debug_assert_eq!(self[e1].end, self[e2].start);
        debug_assert_eq!(self[e2].end, self[e0].start);

        let normal = triangle_normal(
            self[self[e0].start].pos,
            self[self[e1].start].pos,
            self[self[e2].start].pos,
        );
        let region = [e0, e1, e2]
            .iter()
            .find_map(|&e| self[self[e].pair].face.and_then(|f| self[f].region));

        let face = FaceHandle(self.faces.insert(Face {
            edge: e0,
            normal,
            region,
            visited: false,
        }));

        for (edge, next) in [(e0, e1), (e1, e2), (e2, e0)] {
            self[edge].face = Some(face);
            self[edge].next = Some(next);
        }

        if let Some(region) = region {
            if let Some(entry) = self.regions.get_mut(region as usize) {
                entry.faces.push(face);
            }
        }
    }
}
