//! Test support library
//! Shared mesh fixtures and float helpers.
#![allow(dead_code)]

use hemesh::float_types::Real;
use hemesh::{FaceHandle, HalfEdgeMesh};
use nalgebra::{Point3, Vector3};

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Route engine log output through the test harness. Safe to call from
/// every test; only the first call wins.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A lone triangle in the z = 0 plane, facing +z.
pub fn single_triangle() -> HalfEdgeMesh {
    let mut mesh = HalfEdgeMesh::new();
    mesh.add_vertex(Point3::new(0.0, 0.0, 0.0), Vector3::z());
    mesh.add_vertex(Point3::new(1.0, 0.0, 0.0), Vector3::z());
    mesh.add_vertex(Point3::new(0.0, 1.0, 0.0), Vector3::z());
    mesh.add_triangle(0, 1, 2);
    mesh
}

/// The unit square split along the 0-2 diagonal into two triangles.
pub fn unit_square() -> HalfEdgeMesh {
    let mut mesh = HalfEdgeMesh::new();
    mesh.add_vertex(Point3::new(0.0, 0.0, 0.0), Vector3::z());
    mesh.add_vertex(Point3::new(1.0, 0.0, 0.0), Vector3::z());
    mesh.add_vertex(Point3::new(1.0, 1.0, 0.0), Vector3::z());
    mesh.add_vertex(Point3::new(0.0, 1.0, 0.0), Vector3::z());
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    mesh
}

/// A closed tetrahedron with outward-consistent winding.
pub fn tetrahedron() -> HalfEdgeMesh {
    let mut mesh = HalfEdgeMesh::new();
    mesh.add_vertex(Point3::new(0.0, 0.0, 0.0), Vector3::z());
    mesh.add_vertex(Point3::new(1.0, 0.0, 0.0), Vector3::z());
    mesh.add_vertex(Point3::new(0.5, 1.0, 0.0), Vector3::z());
    mesh.add_vertex(Point3::new(0.5, 0.5, 1.0), Vector3::z());
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    mesh.add_triangle(0, 3, 1);
    mesh.add_triangle(1, 3, 2);
    mesh
}

/// An `nx` x `ny` cell grid of unit squares in the z = 0 plane, each cell
/// split into two triangles, all facing +z. Vertices sit at integer
/// coordinates; insertion index of (i, j) is `i * (ny + 1) + j`.
pub fn grid(nx: usize, ny: usize) -> HalfEdgeMesh {
    let mut mesh = HalfEdgeMesh::new();
    for i in 0..=nx {
        for j in 0..=ny {
            mesh.add_vertex(Point3::new(i as Real, j as Real, 0.0), Vector3::z());
        }
    }
    let at = |i: usize, j: usize| i * (ny + 1) + j;
    for i in 0..nx {
        for j in 0..ny {
            mesh.add_triangle(at(i, j), at(i + 1, j), at(i + 1, j + 1));
            mesh.add_triangle(at(i, j), at(i + 1, j + 1), at(i, j + 1));
        }
    }
    mesh
}

/// Insertion index of grid vertex (i, j) for a grid built with `ny` cell
/// rows.
pub fn grid_vertex(ny: usize, i: usize, j: usize) -> usize {
    i * (ny + 1) + j
}

/// An `n` x `n` floor grid in the z = 0 plane joined along its j = n row to
/// an `n` x `n` wall rising in +z at y = n, sharing the crease vertices.
pub fn l_shape(n: usize) -> HalfEdgeMesh {
    let mut mesh = grid(n, n);
    let base = (n + 1) * (n + 1);
    for i in 0..=n {
        for k in 1..=n {
            mesh.add_vertex(
                Point3::new(i as Real, n as Real, k as Real),
                Vector3::new(0.0, -1.0, 0.0),
            );
        }
    }
    let at = |i: usize, k: usize| {
        if k == 0 {
            // crease row, shared with the floor
            i * (n + 1) + n
        } else {
            base + i * n + (k - 1)
        }
    };
    for i in 0..n {
        for k in 0..n {
            mesh.add_triangle(at(i, k), at(i + 1, k), at(i + 1, k + 1));
            mesh.add_triangle(at(i, k), at(i + 1, k + 1), at(i, k + 1));
        }
    }
    mesh
}

/// Some face whose three neighbors across its edges all exist.
pub fn interior_face(mesh: &HalfEdgeMesh) -> FaceHandle {
    mesh.face_handles()
        .into_iter()
        .find(|&face| mesh.adjacent_faces(face).len() == 3)
        .expect("mesh has an interior face")
}

/// The half-edge running `from -> to`, if one exists.
pub fn directed_edge(
    mesh: &HalfEdgeMesh,
    from: hemesh::VertexHandle,
    to: hemesh::VertexHandle,
) -> Option<hemesh::EdgeHandle> {
    mesh.edge_handles()
        .into_iter()
        .find(|&e| mesh.edge(e).is_some_and(|edge| edge.start == from && edge.end == to))
}

/// Number of live half-edges without a face.
pub fn boundary_half_edge_count(mesh: &HalfEdgeMesh) -> usize {
    mesh.edge_handles()
        .into_iter()
        .filter(|&e| mesh.edge(e).map(|edge| edge.face.is_none()) == Some(true))
        .count()
}
