use std::collections::HashMap;

use glam::{Vec2, Vec3};

use crate::{
    element::{Handle, FH, HH, VH},
    error::Error,
    iterator,
    mesh::Mesh,
    topol::Topology,
};

/// Builds a [`Mesh`] one face at a time.
///
/// Faces are wired into rings as they are added, and each new edge is paired
/// with its opposite halfedge through a map of directed edges. Halfedges that
/// never get a face are the boundary. They are linked into loops once, in
/// [`MeshBuilder::build`], after which the connectivity is fixed.
pub struct MeshBuilder {
    topol: Topology,
    points: Vec<Vec3>,
    edge_map: HashMap<(VH, VH), HH>,
    vertex_texcoords: Vec<Option<Vec2>>,
    halfedge_texcoords: Vec<(HH, Vec2)>,
    vertex_faces: Vec<usize>,
    corners: Vec<(VH, Option<Vec2>)>,
    ring: Vec<HH>,
    fan: Vec<HH>,
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshBuilder {
    pub fn new() -> Self {
        MeshBuilder {
            topol: Topology::new(),
            points: Vec::new(),
            edge_map: HashMap::new(),
            vertex_texcoords: Vec::new(),
            halfedge_texcoords: Vec::new(),
            vertex_faces: Vec::new(),
            corners: Vec::new(),
            ring: Vec::new(),
            fan: Vec::new(),
        }
    }

    pub fn with_capacity(nverts: usize, nfaces: usize) -> Self {
        let nedges = nfaces * 3 / 2; // Estimate.
        MeshBuilder {
            topol: Topology::with_capacity(nverts, nedges, nfaces),
            points: Vec::with_capacity(nverts),
            edge_map: HashMap::with_capacity(nedges * 2),
            vertex_texcoords: Vec::with_capacity(nverts),
            halfedge_texcoords: Vec::new(),
            vertex_faces: Vec::with_capacity(nverts),
            corners: Vec::new(),
            ring: Vec::new(),
            fan: Vec::new(),
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.topol.num_vertices()
    }

    pub fn num_faces(&self) -> usize {
        self.topol.num_faces()
    }

    pub fn add_vertex(&mut self, pos: Vec3) -> VH {
        let v = self.topol.add_vertex();
        self.points.push(pos);
        self.vertex_texcoords.push(None);
        self.vertex_faces.push(0);
        v
    }

    pub fn add_vertices(&mut self, positions: &[Vec3]) -> Vec<VH> {
        positions.iter().map(|p| self.add_vertex(*p)).collect()
    }

    /// Add a polygon through the given vertices.
    ///
    /// Repeated vertices are dropped, keeping the first occurrence. The face
    /// is rejected if fewer than three distinct vertices remain, if a vertex
    /// does not exist, or if one of its directed edges already belongs to
    /// another face. It is also rejected if it touches a vertex whose faces
    /// already close around it, or if it would close the faces around a
    /// vertex that has other faces not connected to them. A rejected face
    /// leaves the builder untouched.
    pub fn add_face(&mut self, verts: &[VH]) -> Result<FH, Error> {
        self.corners.clear();
        self.corners.extend(verts.iter().map(|v| (*v, None)));
        self.insert_face()
    }

    /// Same as [`MeshBuilder::add_face`], with one texture coordinate per
    /// corner.
    ///
    /// The halfedge pointing into corner `i` takes `texcoords[i]`. So does
    /// the vertex of that corner, with later faces overwriting earlier ones.
    pub fn add_face_with_texcoords(
        &mut self,
        verts: &[VH],
        texcoords: &[Vec2],
    ) -> Result<FH, Error> {
        if verts.len() != texcoords.len() {
            return Err(Error::MismatchedArrayLengths(verts.len(), texcoords.len()));
        }
        self.corners.clear();
        self.corners
            .extend(verts.iter().zip(texcoords.iter()).map(|(v, t)| (*v, Some(*t))));
        self.insert_face()
    }

    fn insert_face(&mut self) -> Result<FH, Error> {
        dedup_corners(&mut self.corners);
        // Check for errors before touching the topology.
        if let Some((v, _)) = self
            .corners
            .iter()
            .find(|(v, _)| !self.topol.is_valid_vertex(*v))
        {
            return Err(Error::InvalidVertex(*v));
        }
        let n = self.corners.len();
        if n < 3 {
            return Err(Error::DegenerateFace);
        }
        for i in 0..n {
            let key = (self.corners[i].0, self.corners[(i + 1) % n].0);
            if let Some(h) = self.edge_map.get(&key) {
                if !self.topol.is_boundary_halfedge(*h) {
                    return Err(Error::ComplexHalfedge(*h));
                }
            }
        }
        for i in 0..n {
            self.check_corner(i)?;
        }
        // Claim existing halfedges, create the missing edges.
        self.ring.clear();
        for i in 0..n {
            let from = self.corners[i].0;
            let to = self.corners[(i + 1) % n].0;
            let h = match self.edge_map.get(&(from, to)) {
                Some(h) => *h,
                None => {
                    let h = self.topol.new_edge(from, to);
                    self.edge_map.insert((from, to), h);
                    self.edge_map.insert((to, from), h.opposite());
                    h
                }
            };
            self.ring.push(h);
        }
        let f = self.topol.new_face(self.ring[0]);
        for i in 0..n {
            let h = self.ring[i];
            self.topol.set_halfedge_face(h, f);
            self.topol.set_next_halfedge(h, self.ring[(i + 1) % n]);
            self.topol.set_vertex_halfedge(self.corners[i].0, h);
            self.vertex_faces[self.corners[i].0.index() as usize] += 1;
        }
        for i in 0..n {
            if let (v, Some(t)) = self.corners[i] {
                let hin = self.ring[(i + n - 1) % n];
                self.halfedge_texcoords.push((hin, t));
                self.vertex_texcoords[v.index() as usize] = Some(t);
            }
        }
        Ok(f)
    }

    /// Every vertex must end up with a single closed fan of faces, or with
    /// only open fans.
    fn check_corner(&mut self, i: usize) -> Result<(), Error> {
        let n = self.corners.len();
        let v = self.corners[i].0;
        let nfaces = self.vertex_faces[v.index() as usize];
        let Some(h) = self.topol.vertex_halfedge(v) else {
            return Ok(());
        };
        // A closed fan is the only fan at its vertex.
        if walk_fan(&self.topol, h, nfaces, &mut self.fan) {
            return Err(Error::ComplexVertex(v));
        }
        let prev = self.corners[(i + n - 1) % n].0;
        let next = self.corners[(i + 1) % n].0;
        let (Some(hout), Some(hin)) = (
            self.edge_map.get(&(v, prev)).copied(),
            self.edge_map.get(&(next, v)).copied(),
        ) else {
            return Ok(());
        };
        // The face is glued to a fan on both sides. If it is the same fan,
        // the face closes it.
        walk_fan(&self.topol, hout, nfaces, &mut self.fan);
        if self.fan.contains(&hin) && self.fan.len() < nfaces {
            return Err(Error::ComplexVertex(v));
        }
        Ok(())
    }

    /// Link the boundary loops and produce the finished mesh.
    ///
    /// Normals, bounds and the average edge length are computed if the mesh
    /// has any faces.
    pub fn build(mut self) -> Result<Mesh, Error> {
        link_boundary_loops(&mut self.topol);
        adjust_outgoing_halfedges(&mut self.topol);
        let (vertex_texcoords, halfedge_texcoords) = if self.halfedge_texcoords.is_empty() {
            (None, None)
        } else {
            let vtex = self
                .vertex_texcoords
                .iter()
                .map(|t| t.unwrap_or(Vec2::ZERO))
                .collect::<Vec<_>>();
            let mut htex = vec![Vec2::ZERO; self.topol.num_halfedges()];
            for (h, t) in &self.halfedge_texcoords {
                htex[h.index() as usize] = *t;
            }
            (Some(vtex), Some(htex))
        };
        let mut mesh = Mesh::from_parts(
            self.topol,
            self.points,
            vertex_texcoords,
            halfedge_texcoords,
        );
        if mesh.is_valid() {
            mesh.update()?;
        }
        Ok(mesh)
    }
}

/// Collect the incoming halfedges of the faces in the fan around the tail of
/// the interior halfedge `h`. Returns true if the fan closes on itself.
///
/// Only faces are crossed, so this works before the boundary is linked.
fn walk_fan(topol: &Topology, h: HH, limit: usize, fan: &mut Vec<HH>) -> bool {
    fan.clear();
    let mut cur = h;
    for _ in 0..limit {
        let hin = topol.prev_halfedge(cur);
        fan.push(hin);
        cur = hin.opposite();
        if topol.is_boundary_halfedge(cur) {
            break;
        }
        if cur == h {
            return true;
        }
    }
    let mut cur = h;
    for _ in 0..limit {
        let oh = cur.opposite();
        if topol.is_boundary_halfedge(oh) {
            break;
        }
        cur = topol.next_halfedge(oh);
        fan.push(topol.prev_halfedge(cur));
    }
    false
}

fn dedup_corners(corners: &mut Vec<(VH, Option<Vec2>)>) {
    let mut i = 0;
    while i < corners.len() {
        let v = corners[i].0;
        if corners[..i].iter().any(|(u, _)| *u == v) {
            corners.remove(i);
        } else {
            i += 1;
        }
    }
}

/// For every boundary halfedge `h` ending at `v`, the outgoing boundary
/// halfedge of the same fan is found by rotating around `v` through the
/// faces, starting from the opposite of `h`. The fan is open, so the rotation
/// ends. A vertex where several fans meet links the incoming halfedge of each
/// fan to the outgoing halfedge of the next fan, so that circulating the
/// vertex visits all of them.
fn link_boundary_loops(topol: &mut Topology) {
    let mut fans: Vec<(VH, HH, HH)> = Vec::new();
    for h in topol.halfedges().filter(|h| topol.is_boundary_halfedge(*h)) {
        let mut out = h.opposite();
        loop {
            out = topol.prev_halfedge(out).opposite();
            if topol.is_boundary_halfedge(out) {
                break;
            }
        }
        fans.push((topol.to_vertex(h), h, out));
    }
    // Stable, so fans of a vertex keep the order they were discovered in.
    fans.sort_by_key(|(v, _, _)| *v);
    for group in fans.chunk_by(|a, b| a.0 == b.0) {
        for (i, (_, hin, _)) in group.iter().enumerate() {
            let (_, _, hout) = group[(i + 1) % group.len()];
            topol.set_next_halfedge(*hin, hout);
        }
    }
}

/// Boundary vertices must store a boundary halfedge as their outgoing
/// halfedge.
fn adjust_outgoing_halfedges(topol: &mut Topology) {
    let updates: Vec<(VH, HH)> = topol
        .vertices()
        .filter_map(|v| {
            iterator::voh_ccw_iter(topol, v)
                .find(|h| topol.is_boundary_halfedge(*h))
                .map(|h| (v, h))
        })
        .collect();
    for (v, h) in updates {
        topol.set_vertex_halfedge(v, h);
    }
}

impl Mesh {
    /// Build a mesh from a flat list of triangle vertex indices.
    ///
    /// Triangles referring to missing vertices are skipped, as are triangles
    /// that are degenerate or would make an edge non-manifold. A trailing
    /// partial triangle is ignored.
    pub fn from_triangles(positions: &[Vec3], indices: &[u32]) -> Result<Mesh, Error> {
        let mut builder = MeshBuilder::with_capacity(positions.len(), indices.len() / 3);
        builder.add_vertices(positions);
        for (ti, tri) in indices.chunks_exact(3).enumerate() {
            if tri.iter().any(|i| *i as usize >= positions.len()) {
                continue;
            }
            let verts: [VH; 3] = [tri[0].into(), tri[1].into(), tri[2].into()];
            match builder.add_face(&verts) {
                Ok(_) => {}
                Err(e @ (Error::DegenerateFace
                | Error::ComplexHalfedge(_)
                | Error::ComplexVertex(_))) => {
                    log::warn!("Skipping triangle {}: {}", ti, e);
                }
                Err(e) => return Err(e),
            }
        }
        builder.build()
    }
}
