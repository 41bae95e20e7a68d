/*!
A halfedge polygon mesh, built once from a list of faces or a Wavefront OBJ
file, with the attributes a renderer needs.

# Overview

+ The topology of the mesh, i.e. the connectivity of vertices, edges and
  faces, is stored in a halfedge datastructure. The two halfedges of an edge
  are stored next to each other, so the opposite of a halfedge is found
  without a lookup.

+ Meshes are created with a [`MeshBuilder`], from a triangle index list
  with [`Mesh::from_triangles`], or from OBJ text with [`Mesh::read_obj`] and
  [`Mesh::load_obj`]. Halfedges without a face form the boundary, and are
  linked into loops when the mesh is built. The connectivity does not change
  after that.

+ Positions use [`glam`](https://crates.io/crates/glam). Each [`Mesh`]
  carries face normals, vertex normals, a [`BoundingBox`] and the average
  edge length, refreshed by [`Mesh::update`]. [`Mesh::unify`] centers the mesh
  and scales it to a given size.

+ Polygons are fan triangulated on demand, for index buffers and flat or
  smooth shading normals.
*/

mod builder;
mod check;
mod element;
mod error;
mod iterator;
mod macros;
mod math;
mod mesh;
mod obj;
mod topol;
mod triangulate;

pub use builder::MeshBuilder;
pub use element::{EH, FH, HH, Handle, HasTopology, VH};
pub use error::Error;
pub use math::BoundingBox;
pub use mesh::Mesh;
pub use obj::ObjReadOptions;
pub use topol::Topology;
