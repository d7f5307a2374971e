//! Flood-fill segmentation, regression-plane optimization and the
//! cross-region plane operations.

use crate::float_types::Real;
use crate::handles::{FaceHandle, VertexHandle};
use crate::mesh::plane::Plane;
use crate::mesh::region::Region;
use crate::mesh::HalfEdgeMesh;
use nalgebra::Vector3;

/// Region-pair normals with `|n_i . n_j|` at or above this bound are close
/// enough to parallel that no crease is computed between them.
const INTERSECTION_COS: Real = 0.9;

impl HalfEdgeMesh {
    /// Flood fill over face adjacency starting at `seed`, adding every
    /// reachable unvisited face to `region`.
    ///
    /// With a `similarity` criterion `(reference_normal, cos_threshold)`, a
    /// neighbor is admitted only when its normal's cosine against the
    /// reference exceeds the threshold. Returns the number of faces added
    /// beyond the seed.
    pub fn region_growing(
        &mut self,
        seed: FaceHandle,
        region: &mut Region,
        similarity: Option<(Vector3<Real>, Real)>,
    ) -> usize {
        let mut added = 0usize;
        let mut stack = vec![seed];
        self[seed].visited = true;
        self[seed].region = Some(region.id);
        region.faces.push(seed);

        while let Some(face) = stack.pop() {
            for edge in self.face_edges(face) {
                let Some(neighbor) = self[self[edge].pair].face else {
                    continue;
                };
                if self[neighbor].visited {
                    continue;
                }
                if let Some((reference, threshold)) = similarity {
                    if self[neighbor].normal.dot(&reference) <= threshold {
                        continue;
                    }
                }
                self[neighbor].visited = true;
                self[neighbor].region = Some(region.id);
                region.faces.push(neighbor);
                added += 1;
                stack.push(neighbor);
            }
        }
        added
    }

    /// Iterative planar segmentation.
    ///
    /// Repeats `iterations` times: reset traversal state, segment the whole
    /// face set by normal similarity (`cos_angle` bound). Regions larger
    /// than `max(min_region_size, 10 * ln(face_count))` get a least-squares
    /// regression plane, are flagged in-plane, and have the fitted normal
    /// written onto their member faces, so the next iteration grows merged
    /// plane-aligned regions instead of re-cutting at the raw facet
    /// normals. Only the final iteration's regions are retained. After the
    /// loop, regions smaller than `small_region_size` are deleted outright,
    /// and — with `remove_flickering` — so is every face its region
    /// reports as unstable.
    pub fn optimize_planes(
        &mut self,
        iterations: usize,
        cos_angle: Real,
        min_region_size: usize,
        small_region_size: usize,
        remove_flickering: bool,
    ) {
        let fit_gate =
            min_region_size.max((10.0 * (self.face_count().max(1) as Real).ln()) as usize);

        for iteration in 0..iterations {
            let last = iteration + 1 == iterations;
            self.reset_face_visited();
            self.clear_regions();

            let mut regions: Vec<Region> = Vec::new();
            for face in self.face_handles() {
                if self[face].visited {
                    continue;
                }
                let id = regions.len() as u32;
                let seed_normal = self[face].normal;
                let seed_point = self[self[self[face].edge].start].pos;
                let mut region = Region::new(id, seed_normal, seed_point);
                let grown = self.region_growing(face, &mut region, Some((seed_normal, cos_angle)));

                if grown + 1 > fit_gate {
                    region.fit_regression_plane(self);
                    if region.in_plane {
                        // Later iterations segment on these aligned
                        // normals and can merge neighboring regions.
                        for &face in &region.faces {
                            self[face].normal = region.normal;
                        }
                    }
                }
                regions.push(region);
            }
            log::debug!(
                "plane iteration {}/{}: {} regions",
                iteration + 1,
                iterations,
                regions.len()
            );

            if last {
                self.regions = regions;
            }
        }

        // Deletions are scheduled after the loop so region ids stay dense
        // while segmenting.
        let mut doomed: Vec<FaceHandle> = Vec::new();
        for region in &self.regions {
            if region.size() < small_region_size {
                doomed.extend(region.faces.iter().copied());
            } else if remove_flickering {
                doomed.extend(
                    region
                        .faces
                        .iter()
                        .copied()
                        .filter(|&face| region.face_flickers(self, face)),
                );
            }
        }
        if !doomed.is_empty() {
            log::debug!("deleting {} small or flickering faces", doomed.len());
        }
        for face in doomed {
            if self.contains_face(face) {
                self.delete_face(face);
            }
        }
    }

    /// Unweighted flood fill that deletes every connected face patch smaller
    /// than `threshold`. All region state is discarded afterwards.
    pub fn remove_dangling_artifacts(&mut self, threshold: usize) {
        self.reset_face_visited();
        self.clear_regions();

        let mut doomed: Vec<FaceHandle> = Vec::new();
        for face in self.face_handles() {
            if self[face].visited {
                continue;
            }
            let seed_normal = self[face].normal;
            let seed_point = self[self[self[face].edge].start].pos;
            let mut patch = Region::new(0, seed_normal, seed_point);
            let grown = self.region_growing(face, &mut patch, None);
            if grown + 1 < threshold {
                doomed.extend(patch.faces);
            }
        }

        if !doomed.is_empty() {
            log::debug!("removing {} dangling faces", doomed.len());
        }
        for face in doomed {
            if self.contains_face(face) {
                self.delete_face(face);
            }
        }
        self.clear_regions();
    }

    /// Snap the borders between intersecting planar regions onto the 3D
    /// line where their infinite planes meet, producing one consistent
    /// crease instead of two independently fitted edges.
    pub fn optimize_plane_intersections(&mut self) {
        let count = self.regions.len();
        for i in 0..count {
            if !self.regions[i].in_plane {
                continue;
            }
            for j in (i + 1)..count {
                if !self.regions[j].in_plane {
                    continue;
                }
                let plane_i = self.regions[i].plane();
                let plane_j = self.regions[j].plane();
                if plane_i.normal.dot(&plane_j.normal).abs() >= INTERSECTION_COS {
                    continue;
                }
                let Some((origin, direction)) = plane_i.intersection(&plane_j) else {
                    continue;
                };

                let in_i = self.regions[i].vertex_set(self);
                let shared: Vec<VertexHandle> = self.regions[j]
                    .vertex_set(self)
                    .into_iter()
                    .filter(|v| in_i.contains(v))
                    .collect();
                for vertex in shared {
                    let snapped =
                        Plane::project_onto_line(&origin, &direction, &self[vertex].pos);
                    self[vertex].pos = snapped;
                }
            }
        }
    }

    /// Project every vertex of every in-plane region's faces orthogonally
    /// onto the fitted plane, restoring exact coplanarity after all prior
    /// edits.
    pub fn restore_planes(&mut self) {
        for index in 0..self.regions.len() {
            if !self.regions[index].in_plane {
                continue;
            }
            let plane = self.regions[index].plane();
            let vertices: Vec<VertexHandle> =
                self.regions[index].vertex_set(self).into_iter().collect();
            for vertex in vertices {
                let projected = plane.project(&self[vertex].pos);
                self[vertex].pos = projected;
            }
        }
    }
}
