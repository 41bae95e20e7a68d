use std::path::PathBuf;

use crate::element::{FH, HH, VH};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Construction.
    #[error("vertex {0} does not exist")]
    InvalidVertex(VH),
    #[error("face has fewer than 3 distinct vertices")]
    DegenerateFace,
    #[error("halfedge {0} already has a face; the edge is non-manifold or the winding is inconsistent")]
    ComplexHalfedge(HH),
    #[error("faces around vertex {0} would not form a single fan")]
    ComplexVertex(VH),
    #[error("the mesh has no faces")]
    EmptyMesh,
    // Topology checks.
    #[error("halfedge {0} starts and ends at the same vertex")]
    DegenerateHalfedge(HH),
    #[error("next/prev links around halfedge {0} are inconsistent")]
    InvalidHalfedgeLink(HH),
    #[error("halfedge {0} is not reachable by circulating its vertices")]
    InvalidHalfedgeVertexLink(HH),
    #[error("outgoing halfedges of vertex {0} are inconsistent")]
    InvalidOutgoingHalfedges(VH),
    #[error("vertex {0} is on the boundary but its outgoing halfedge is not")]
    OutgoingHalfedgeNotBoundary(VH),
    #[error("the loop through halfedge {0} does not close")]
    InvalidLoopTopology(HH),
    #[error("halfedge {0} disagrees with its loop about the incident face")]
    InconsistentFaceInLoop(HH),
    #[error("face {0} and halfedge {1} do not point at each other")]
    InvalidFaceHalfedgeLink(FH, HH),
    // Geometry.
    #[error("the bounding box has zero extent")]
    DegenerateBoundingBox,
    #[error("target size must be positive and finite, found {0}")]
    InvalidSize(f32),
    // Obj.
    #[error("unable to load obj file {}", .0.display())]
    InvalidObjFile(PathBuf),
    #[error("obj parsing failed: {0}")]
    ObjLoadFailed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    // Other.
    #[error("array lengths do not match: {0} and {1}")]
    MismatchedArrayLengths(usize, usize),
}
