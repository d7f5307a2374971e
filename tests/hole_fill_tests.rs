mod support;

use support::{boundary_half_edge_count, grid, init_logging, interior_face};

#[test]
fn triangle_hole_is_refilled() {
    init_logging();
    let mut mesh = grid(4, 4);
    let face = interior_face(&mesh);
    mesh.delete_face(face);
    assert_eq!(mesh.face_count(), 31);
    assert_eq!(boundary_half_edge_count(&mesh), 19);

    // Below the grid's outer boundary loop (16 edges), above the hole.
    mesh.fill_holes(10);
    assert_eq!(mesh.face_count(), 32);
    assert_eq!(boundary_half_edge_count(&mesh), 16);
    mesh.check_integrity().unwrap();
}

#[test]
fn holes_at_or_above_the_limit_are_skipped() {
    init_logging();
    let mut mesh = grid(4, 4);
    let face = interior_face(&mesh);
    mesh.delete_face(face);

    mesh.fill_holes(3);
    assert_eq!(mesh.face_count(), 31);
    assert_eq!(boundary_half_edge_count(&mesh), 19);
    mesh.check_integrity().unwrap();
}

#[test]
fn quad_hole_is_closed() {
    init_logging();
    let mut mesh = grid(4, 4);
    let face = interior_face(&mesh);
    let neighbor = mesh
        .adjacent_faces(face)
        .into_iter()
        .find(|&f| mesh.adjacent_faces(f).len() == 3)
        .unwrap();
    mesh.delete_face(face);
    mesh.delete_face(neighbor);
    assert_eq!(mesh.face_count(), 30);
    mesh.check_integrity().unwrap();

    mesh.fill_holes(10);
    // Only the grid's own outer boundary remains.
    assert_eq!(boundary_half_edge_count(&mesh), 16);
    mesh.check_integrity().unwrap();
}

#[test]
fn hexagonal_hole_is_closed() {
    init_logging();
    let mut mesh = grid(5, 5);
    // Delete the full one-ring of faces around an interior vertex; the
    // orphaned vertex goes with them, leaving a six-edge boundary loop.
    let center = mesh
        .vertex_handles()
        .into_iter()
        .find(|&v| mesh[v].pos.x == 2.0 && mesh[v].pos.y == 2.0)
        .unwrap();
    loop {
        let touching = mesh.face_handles().into_iter().find(|&f| {
            mesh.face_vertices(f).contains(&center)
        });
        match touching {
            Some(face) => mesh.delete_face(face),
            None => break,
        }
    }
    assert!(!mesh.contains_vertex(center));
    assert_eq!(mesh.face_count(), 44);
    assert_eq!(boundary_half_edge_count(&mesh), 26);
    mesh.check_integrity().unwrap();

    mesh.fill_holes(10);
    assert_eq!(boundary_half_edge_count(&mesh), 20);
    mesh.check_integrity().unwrap();
}

#[test]
fn outer_boundary_is_never_treated_as_a_hole_below_the_limit() {
    init_logging();
    let mut mesh = grid(4, 4);
    mesh.fill_holes(10);
    assert_eq!(mesh.face_count(), 32);
    assert_eq!(boundary_half_edge_count(&mesh), 16);
}

#[test]
fn synthesized_faces_inherit_the_surrounding_region() {
    init_logging();
    let mut mesh = grid(6, 6);
    mesh.optimize_planes(1, 0.85, 7, 10, false);
    assert_eq!(mesh.regions.len(), 1);
    assert_eq!(mesh.regions[0].size(), 72);

    let face = interior_face(&mesh);
    mesh.delete_face(face);
    assert_eq!(mesh.regions[0].size(), 71);

    mesh.fill_holes(10);
    assert_eq!(mesh.face_count(), 72);
    assert_eq!(mesh.regions[0].size(), 72);
    for face in mesh.face_handles() {
        assert_eq!(mesh.face(face).unwrap().region, Some(0));
    }
    mesh.check_integrity().unwrap();
}
