//! A **half-edge mesh** engine for cleaning up the output of point-cloud
//! surface reconstruction: it turns an unstructured triangle soup into a
//! topologically consistent, simplified, hole-reduced mesh ready for
//! rendering or export.
//!
//! The engine maintains strict pairing and face-cycle invariants while
//! running destructive structural edits (deletion, edge collapse, edge
//! flip), flood-fill planar segmentation with least-squares plane fitting,
//! cross-plane crease snapping, best-effort hole filling, and final buffer
//! export.
//!
//! # Features
//! - **f64**: use f64 as Real (default)
//! - **f32**: use f32 as Real, conflicts with f64
//!
//! # Overview
//! ```
//! use hemesh::{HalfEdgeMesh, MeshOptimization};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut mesh = HalfEdgeMesh::new();
//! mesh.add_vertex(Point3::new(0.0, 0.0, 0.0), Vector3::z());
//! mesh.add_vertex(Point3::new(1.0, 0.0, 0.0), Vector3::z());
//! mesh.add_vertex(Point3::new(0.0, 1.0, 0.0), Vector3::z());
//! mesh.add_triangle(0, 1, 2);
//!
//! mesh.optimize(&MeshOptimization::default());
//! let buffer = mesh.finalize(false);
//! assert_eq!(buffer.indices.len() % 3, 0);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::approx_constant, clippy::all)]

pub mod config;
pub mod errors;
pub mod float_types;
pub mod handles;
pub mod mesh;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use config::MeshOptimization;
pub use errors::{CollapseGuard, MeshError};
pub use handles::{EdgeHandle, FaceHandle, VertexHandle};
pub use mesh::finalize::{
    EarcutTesselator, MeshBuffer, NoTexturizer, Tesselator, Texturizer, NO_TEXTURE,
};
pub use mesh::plane::Plane;
pub use mesh::region::Region;
pub use mesh::HalfEdgeMesh;
