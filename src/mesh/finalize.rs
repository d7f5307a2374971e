//! Buffer export: dense vertex indexing, flat attribute arrays and the
//! retesselating variant with its external collaborator seams.

use crate::float_types::Real;
use crate::handles::{EdgeHandle, FaceHandle, VertexHandle};
use crate::mesh::plane::Plane;
use crate::mesh::HalfEdgeMesh;
use geo::{Coord, LineString, Polygon as GeoPolygon, TriangulateEarcut};
use hashbrown::{HashMap, HashSet};
use nalgebra::{Point3, Vector3};

/// Sentinel in [`MeshBuffer::face_textures`] for triangles without a
/// texture.
pub const NO_TEXTURE: u32 = u32::MAX;

/// Uniform vertex tint used when region coloring is off.
const DEFAULT_TINT: [Real; 3] = [0.8, 0.8, 0.8];

/// Buffers crossing above this fill ratio get their capacity doubled ahead
/// of the next batch.
const GROW_FILL_RATIO: Real = 0.75;

/// Flat output buffers ready for rendering or export.
///
/// Positions, normals and colors are 3 floats per vertex, indices 3 per
/// triangle. Normals are sign-flipped relative to internal storage.
/// `texcoords` is 3 floats per vertex (third component unused),
/// `face_textures` one entry per triangle ([`NO_TEXTURE`] when untextured)
/// and `texture_ids` the flat list of generated texture ids; only
/// [`finalize_and_retesselate`](HalfEdgeMesh::finalize_and_retesselate)
/// writes anything but zeros and sentinels into the texture buffers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffer {
    pub positions: Vec<Real>,
    pub normals: Vec<Real>,
    pub colors: Vec<Real>,
    pub indices: Vec<u32>,
    pub texcoords: Vec<Real>,
    pub face_textures: Vec<u32>,
    pub texture_ids: Vec<u32>,
}

impl MeshBuffer {
    /// Emitted vertex count.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Emitted triangle count.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Grow the attribute buffers once the fill ratio crosses the growth
    /// threshold, so batched pushes never reallocate mid-triangle.
    fn reserve_ahead(&mut self, extra_vertices: usize, extra_triangles: usize) {
        grow(&mut self.positions, extra_vertices * 3);
        grow(&mut self.normals, extra_vertices * 3);
        grow(&mut self.colors, extra_vertices * 3);
        grow(&mut self.texcoords, extra_vertices * 3);
        grow(&mut self.indices, extra_triangles * 3);
        grow(&mut self.face_textures, extra_triangles);
    }

    /// Trim every buffer to exact size.
    fn finish(mut self) -> Self {
        self.positions.shrink_to_fit();
        self.normals.shrink_to_fit();
        self.colors.shrink_to_fit();
        self.indices.shrink_to_fit();
        self.texcoords.shrink_to_fit();
        self.face_textures.shrink_to_fit();
        self.texture_ids.shrink_to_fit();
        self
    }
}

fn grow<T>(buffer: &mut Vec<T>, extra: usize) {
    let needed = buffer.len() + extra;
    if needed as Real > buffer.capacity() as Real * GROW_FILL_RATIO {
        buffer.reserve(needed.max(buffer.capacity()));
    }
}

/// Deterministic pseudo-color for a region id: a fixed trigonometric hash,
/// reproducible across runs but not meant to be cryptographic.
pub fn region_pseudo_color(id: u32) -> [Real; 3] {
    let t = id as Real;
    [
        (t * 2.3 + 1.0).sin().abs(),
        (t * 1.3).cos().abs(),
        (t * 0.7 + 2.0).sin().abs(),
    ]
}

/// Polygon tesselation collaborator for planar region boundaries.
pub trait Tesselator {
    /// Triangulate a planar region's boundary contours. The first contour
    /// is the outer ring, any further contours are holes. Returns triangles
    /// in 3D, lying in `plane`.
    fn tesselate(
        &mut self,
        plane: &Plane,
        contours: &[Vec<Point3<Real>>],
    ) -> Vec<[Point3<Real>; 3]>;
}

/// Texture-generation collaborator for planar regions.
pub trait Texturizer {
    /// Generate a texture for a planar region, returning its id, or `None`
    /// to leave the region untextured.
    fn texturize(
        &mut self,
        region_id: u32,
        plane: &Plane,
        contours: &[Vec<Point3<Real>>],
    ) -> Option<u32>;

    /// Texture coordinate of a surface point on the given texture.
    fn texcoord(&self, texture_id: u32, point: &Point3<Real>) -> [Real; 2];
}

/// A texturizer that never textures anything.
pub struct NoTexturizer;

impl Texturizer for NoTexturizer {
    fn texturize(
        &mut self,
        _region_id: u32,
        _plane: &Plane,
        _contours: &[Vec<Point3<Real>>],
    ) -> Option<u32> {
        None
    }

    fn texcoord(&self, _texture_id: u32, _point: &Point3<Real>) -> [Real; 2] {
        [0.0, 0.0]
    }
}

/// Ear-cutting [`Tesselator`]: projects the contours into the plane's 2D
/// basis, triangulates outer ring plus holes, and lifts the result back to
/// 3D.
#[derive(Debug, Default)]
pub struct EarcutTesselator;

impl Tesselator for EarcutTesselator {
    fn tesselate(
        &mut self,
        plane: &Plane,
        contours: &[Vec<Point3<Real>>],
    ) -> Vec<[Point3<Real>; 3]> {
        let Some((outer, holes)) = contours.split_first() else {
            return Vec::new();
        };
        let (u, v) = plane_basis(&plane.normal);
        let flatten = |ring: &Vec<Point3<Real>>| -> LineString<Real> {
            ring.iter()
                .map(|p| {
                    let d = p - plane.support;
                    Coord {
                        x: d.dot(&u),
                        y: d.dot(&v),
                    }
                })
                .collect()
        };

        let polygon = GeoPolygon::new(flatten(outer), holes.iter().map(flatten).collect());
        let triangulation = polygon.earcut_triangles_raw();
        let vertices = triangulation.vertices;

        let lift = |index: usize| {
            let x = vertices[2 * index];
            let y = vertices[2 * index + 1];
            plane.support + u * x + v * y
        };
        triangulation
            .triangle_indices
            .chunks_exact(3)
            .map(|tri| [lift(tri[0]), lift(tri[1]), lift(tri[2])])
            .collect()
    }
}

/// An orthonormal basis spanning the plane orthogonal to `normal`.
fn plane_basis(normal: &Vector3<Real>) -> (Vector3<Real>, Vector3<Real>) {
    let axis = if normal.x.abs() <= normal.y.abs() && normal.x.abs() <= normal.z.abs() {
        Vector3::x()
    } else if normal.y.abs() <= normal.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let u = normal.cross(&axis).normalize();
    let v = normal.cross(&u).normalize();
    (u, v)
}

impl HalfEdgeMesh {
    /// Export the mesh as flat buffers.
    ///
    /// Every surviving vertex gets a dense output index; normals are
    /// emitted sign-flipped. Colors are a uniform tint, or — with
    /// `color_regions` — each face's region pseudo-color written over its
    /// corner vertices.
    pub fn finalize(&self, color_regions: bool) -> MeshBuffer {
        let mut buffer = MeshBuffer::default();
        buffer.reserve_ahead(self.vertex_count(), self.face_count());

        let mut dense: HashMap<VertexHandle, u32> =
            HashMap::with_capacity(self.vertex_count());
        for (index, vertex) in self.vertices.iter() {
            dense.insert(VertexHandle(index), buffer.vertex_count() as u32);
            push_vertex(
                &mut buffer,
                &vertex.pos,
                &vertex.normal,
                DEFAULT_TINT,
                [0.0, 0.0],
            );
        }

        for face in self.face_handles() {
            let corners = self.face_vertices(face);
            for corner in corners {
                buffer.indices.push(dense[&corner]);
            }
            buffer.face_textures.push(NO_TEXTURE);

            if color_regions {
                if let Some(region) = self[face].region {
                    let color = region_pseudo_color(region);
                    for corner in corners {
                        let at = dense[&corner] as usize * 3;
                        buffer.colors[at..at + 3].copy_from_slice(&color);
                    }
                }
            }
        }

        buffer.finish()
    }

    /// Export with planar regions retesselated.
    ///
    /// Faces outside in-plane regions are emitted as plain triangles as in
    /// [`finalize`](Self::finalize). Each in-plane region is replaced by a
    /// tesselation of its boundary contours, with a texture and per-vertex
    /// texture coordinates supplied by the collaborators.
    pub fn finalize_and_retesselate<T, X>(
        &self,
        tesselator: &mut T,
        texturizer: &mut X,
        color_regions: bool,
    ) -> MeshBuffer
    where
        T: Tesselator,
        X: Texturizer,
    {
        let mut buffer = MeshBuffer::default();
        buffer.reserve_ahead(self.vertex_count(), self.face_count());

        let planar: HashSet<u32> = self
            .regions
            .iter()
            .filter(|r| r.in_plane)
            .map(|r| r.id)
            .collect();

        // Plain faces first, sharing vertices among themselves.
        let mut dense: HashMap<VertexHandle, u32> = HashMap::new();
        for face in self.face_handles() {
            if self[face]
                .region
                .is_some_and(|region| planar.contains(&region))
            {
                continue;
            }
            let color = match (color_regions, self[face].region) {
                (true, Some(region)) => region_pseudo_color(region),
                _ => DEFAULT_TINT,
            };
            buffer.reserve_ahead(3, 1);
            for corner in self.face_vertices(face) {
                let index = *dense.entry(corner).or_insert_with(|| {
                    let vertex = &self[corner];
                    push_vertex(&mut buffer, &vertex.pos, &vertex.normal, color, [0.0, 0.0])
                });
                buffer.indices.push(index);
            }
            buffer.face_textures.push(NO_TEXTURE);
        }

        // Planar regions: boundary contours, delegated tesselation,
        // delegated texturing.
        for region in &self.regions {
            if !region.in_plane || region.faces.is_empty() {
                continue;
            }
            let contours = self.region_contours(region.id);
            if contours.is_empty() {
                continue;
            }
            let plane = region.plane();
            let triangles = tesselator.tesselate(&plane, &contours);
            if triangles.is_empty() {
                continue;
            }
            let texture = texturizer.texturize(region.id, &plane, &contours);
            if let Some(id) = texture {
                buffer.texture_ids.push(id);
            }
            let color = if color_regions {
                region_pseudo_color(region.id)
            } else {
                DEFAULT_TINT
            };

            buffer.reserve_ahead(triangles.len() * 3, triangles.len());
            for triangle in &triangles {
                for point in triangle {
                    let uv = match texture {
                        Some(id) => texturizer.texcoord(id, point),
                        None => [0.0, 0.0],
                    };
                    let index = push_vertex(&mut buffer, point, &plane.normal, color, uv);
                    buffer.indices.push(index);
                }
                buffer
                    .face_textures
                    .push(texture.unwrap_or(NO_TEXTURE));
            }
        }

        buffer.finish()
    }

    /// Ordered boundary contours of a region: every edge whose face lies in
    /// the region while its pair-face does not, chained into loops. Contours
    /// are sorted longest first, so the outer ring precedes any hole rings.
    pub(crate) fn region_contours(&self, region: u32) -> Vec<Vec<Point3<Real>>> {
        let in_region = |face: Option<FaceHandle>| {
            face.is_some_and(|f| self.contains_face(f) && self[f].region == Some(region))
        };

        let mut outgoing: HashMap<VertexHandle, Vec<EdgeHandle>> = HashMap::new();
        let mut boundary: HashSet<EdgeHandle> = HashSet::new();
        let Some(entry) = self.regions.get(region as usize) else {
            return Vec::new();
        };
        for &face in &entry.faces {
            if !self.contains_face(face) {
                continue;
            }
            for edge in self.face_edges(face) {
                if !in_region(self[self[edge].pair].face) {
                    boundary.insert(edge);
                    outgoing.entry(self[edge].start).or_default().push(edge);
                }
            }
        }

        let mut contours: Vec<Vec<Point3<Real>>> = Vec::new();
        let mut visited: HashSet<EdgeHandle> = HashSet::new();
        for &start in &boundary {
            if visited.contains(&start) {
                continue;
            }
            let mut ring = Vec::new();
            let mut current = start;
            loop {
                visited.insert(current);
                ring.push(self[self[current].start].pos);
                let next = outgoing
                    .get(&self[current].end)
                    .and_then(|candidates| {
                        candidates.iter().copied().find(|e| !visited.contains(e))
                    });
                match next {
                    Some(edge) => current = edge,
                    None => break,
                }
            }
            if ring.len() >= 3 {
                contours.push(ring);
            }
        }

        contours.sort_by_key(|ring| std::cmp::Reverse(ring.len()));
        contours
    }
}

/// Append one output vertex (position, sign-flipped normal, color, uv) and
/// return its dense index.
fn push_vertex(
    buffer: &mut MeshBuffer,
    pos: &Point3<Real>,
    normal: &Vector3<Real>,
    color: [Real; 3],
    uv: [Real; 2],
) -> u32 {
    let index = buffer.vertex_count() as u32;
    buffer.positions.extend_from_slice(&[pos.x, pos.y, pos.z]);
    buffer
        .normals
        .extend_from_slice(&[-normal.x, -normal.y, -normal.z]);
    buffer.colors.extend_from_slice(&color);
    buffer.texcoords.extend_from_slice(&[uv[0], uv[1], 0.0]);
    index
}
