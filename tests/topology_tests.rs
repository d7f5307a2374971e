mod support;

use hemesh::{CollapseGuard, HalfEdgeMesh};
use nalgebra::{Point3, Vector3};
use support::{
    approx_eq, boundary_half_edge_count, directed_edge, grid, single_triangle, tetrahedron,
    unit_square,
};

#[test]
fn single_triangle_counts_and_invariants() {
    let mesh = single_triangle();
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.half_edge_count(), 6);
    assert_eq!(mesh.face_count(), 1);
    assert_eq!(boundary_half_edge_count(&mesh), 3);
    mesh.check_integrity().unwrap();
}

#[test]
fn shared_edge_is_reused_not_duplicated() {
    let mesh = unit_square();
    // 5 undirected edges: 4 rim + 1 diagonal, each as one half-edge pair.
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.half_edge_count(), 10);
    assert_eq!(mesh.face_count(), 2);
    mesh.check_integrity().unwrap();

    let h = mesh.vertex_handles();
    let diagonal = directed_edge(&mesh, h[2], h[0]).expect("diagonal half-edge");
    let pair = mesh.edge(diagonal).unwrap().pair;
    // Both directions of the diagonal carry a face.
    assert!(mesh.edge(diagonal).unwrap().face.is_some());
    assert!(mesh.edge(pair).unwrap().face.is_some());
}

#[test]
fn grid_is_manifold() {
    let mesh = grid(4, 4);
    assert_eq!(mesh.vertex_count(), 25);
    assert_eq!(mesh.face_count(), 32);
    assert_eq!(boundary_half_edge_count(&mesh), 16);
    mesh.check_integrity().unwrap();
}

#[test]
fn collapse_merges_at_midpoint_with_expected_deltas() {
    let mut mesh = grid(3, 3);
    let vertices = mesh.vertex_count();
    let half_edges = mesh.half_edge_count();
    let faces = mesh.face_count();

    // Any edge with a face on both sides.
    let edge = mesh
        .edge_handles()
        .into_iter()
        .find(|&e| {
            let edge = mesh.edge(e).unwrap();
            edge.face.is_some() && mesh.edge(edge.pair).unwrap().face.is_some()
        })
        .unwrap();
    let start = mesh.edge(edge).unwrap().start;
    let end = mesh.edge(edge).unwrap().end;
    let expected =
        Point3::from((mesh[start].pos.coords + mesh[end].pos.coords) * 0.5);

    let kept = mesh.collapse_edge(edge);
    assert_eq!(kept, start);
    assert_eq!(mesh.vertex_count(), vertices - 1);
    assert_eq!(mesh.half_edge_count(), half_edges - 6);
    assert_eq!(mesh.face_count(), faces - 2);
    assert!((mesh[kept].pos - expected).norm() < 1e-12);
    mesh.check_integrity().unwrap();
}

#[test]
fn collapse_of_a_boundary_edge_removes_one_face() {
    let mut mesh = unit_square();
    let h = mesh.vertex_handles();
    // The 0-1 rim edge carries a face on one side only.
    let edge = directed_edge(&mesh, h[0], h[1]).unwrap();
    assert!(mesh.edge(edge).unwrap().face.is_some());
    let pair = mesh.edge(edge).unwrap().pair;
    assert!(mesh.edge(pair).unwrap().face.is_none());

    mesh.collapse_edge(edge);
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.face_count(), 1);
    assert_eq!(mesh.half_edge_count(), 6);
    mesh.check_integrity().unwrap();
}

#[test]
fn flip_twice_restores_the_diagonal() {
    let mut mesh = unit_square();
    let h = mesh.vertex_handles();

    let diagonal = directed_edge(&mesh, h[0], h[2]).unwrap();
    assert!(mesh.flip_edge(diagonal));
    assert!(directed_edge(&mesh, h[0], h[2]).is_none());
    assert!(directed_edge(&mesh, h[2], h[0]).is_none());
    assert!(directed_edge(&mesh, h[1], h[3]).is_some());
    assert_eq!(mesh.half_edge_count(), 10);
    assert_eq!(mesh.face_count(), 2);
    mesh.check_integrity().unwrap();

    let flipped = directed_edge(&mesh, h[1], h[3]).unwrap();
    assert!(mesh.flip_edge(flipped));
    assert!(
        directed_edge(&mesh, h[0], h[2]).is_some()
            || directed_edge(&mesh, h[2], h[0]).is_some()
    );
    mesh.check_integrity().unwrap();
}

#[test]
fn flip_refuses_boundary_edges() {
    let mut mesh = single_triangle();
    for edge in mesh.edge_handles() {
        assert!(!mesh.flip_edge(edge));
    }
    assert_eq!(mesh.face_count(), 1);
    mesh.check_integrity().unwrap();
}

#[test]
fn deleting_the_only_face_frees_everything() {
    let mut mesh = single_triangle();
    let face = mesh.face_handles()[0];
    mesh.delete_face(face);
    assert_eq!(mesh.face_count(), 0);
    assert_eq!(mesh.half_edge_count(), 0);
    assert_eq!(mesh.vertex_count(), 0);
    mesh.check_integrity().unwrap();
}

#[test]
fn deleting_one_square_face_keeps_the_shared_diagonal() {
    let mut mesh = unit_square();
    let face = mesh.face_handles()[0];
    mesh.delete_face(face);
    // The orphaned corner vanishes along with its two rim edges; the
    // diagonal survives because its pair still carries the other face.
    assert_eq!(mesh.face_count(), 1);
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.half_edge_count(), 6);
    mesh.check_integrity().unwrap();
}

#[test]
fn safe_collapse_rejects_tetrahedron_caps() {
    let mut mesh = tetrahedron();
    let edge = mesh.edge_handles()[0];
    assert_eq!(mesh.safe_collapse_edge(edge), Err(CollapseGuard::DegenerateCap));
    assert_eq!(mesh.face_count(), 4);
    mesh.check_integrity().unwrap();
}

#[test]
fn safe_collapse_rejects_duplicate_edges() {
    // Quad around the a-b edge plus a fifth vertex e linked to both a and b
    // through triangles that stay clear of the quad. Collapsing a-b would
    // give the survivor two edges to e.
    let mut mesh = HalfEdgeMesh::new();
    mesh.add_vertex(Point3::new(0.0, 0.0, 0.0), Vector3::z()); // a
    mesh.add_vertex(Point3::new(1.0, 0.0, 0.0), Vector3::z()); // b
    mesh.add_vertex(Point3::new(0.5, 1.0, 0.0), Vector3::z()); // c
    mesh.add_vertex(Point3::new(0.5, -1.0, 0.0), Vector3::z()); // d
    mesh.add_vertex(Point3::new(0.5, 2.0, 0.0), Vector3::z()); // e
    mesh.add_vertex(Point3::new(-0.5, 2.0, 0.0), Vector3::z());
    mesh.add_vertex(Point3::new(1.5, 2.0, 0.0), Vector3::z());
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(1, 0, 3);
    mesh.add_triangle(0, 4, 5);
    mesh.add_triangle(4, 1, 6);
    mesh.check_integrity().unwrap();

    let h = mesh.vertex_handles();
    let edge = directed_edge(&mesh, h[0], h[1]).unwrap();
    assert_eq!(mesh.safe_collapse_edge(edge), Err(CollapseGuard::DuplicateEdge));
    mesh.check_integrity().unwrap();
}

#[test]
fn safe_collapse_rejects_one_triangle_hole_bridges() {
    let mut mesh = grid(3, 3);
    let face = support::interior_face(&mesh);
    let hole_edges = mesh.face_edges(face);
    mesh.delete_face(face);
    mesh.check_integrity().unwrap();

    for edge in hole_edges {
        assert_eq!(
            mesh.safe_collapse_edge(edge),
            Err(CollapseGuard::TriangleHoleBridge)
        );
    }
    // Rejections leave the mesh untouched.
    assert_eq!(mesh.face_count(), 17);
    mesh.check_integrity().unwrap();
}

#[test]
fn stale_handle_lookup_is_checked() {
    let mut mesh = single_triangle();
    let face = mesh.face_handles()[0];
    let edges = mesh.face_edges(face);
    mesh.delete_face(face);
    assert!(mesh.face(face).is_none());
    assert!(!mesh.contains_face(face));
    assert!(mesh.edge(edges[0]).is_none());
}

#[test]
fn collapse_positions_survive_rejection() {
    let mut mesh = grid(3, 3);
    let face = support::interior_face(&mesh);
    let edge = mesh.face_edges(face)[0];
    mesh.delete_face(face);

    let before: Vec<_> = mesh
        .vertex_handles()
        .into_iter()
        .map(|v| mesh[v].pos)
        .collect();
    let _ = mesh.safe_collapse_edge(edge);
    let after: Vec<_> = mesh
        .vertex_handles()
        .into_iter()
        .map(|v| mesh[v].pos)
        .collect();
    for (a, b) in before.iter().zip(after.iter()) {
        assert!(approx_eq((a - b).norm(), 0.0, 1e-12));
    }
}
