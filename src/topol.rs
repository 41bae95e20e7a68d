use crate::{
    element::{Edge, Face, Halfedge, Handle, Vertex, EH, FH, HH, VH},
    iterator,
};

/// Connectivity of a halfedge mesh.
///
/// Halfedges are stored in pairs, one pair per edge. The opposite of a
/// halfedge is found by flipping the lowest bit of its index.
pub struct Topology {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
}

impl Topology {
    pub fn new() -> Self {
        Topology {
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn with_capacity(nverts: usize, nedges: usize, nfaces: usize) -> Self {
        Topology {
            vertices: Vec::with_capacity(nverts),
            edges: Vec::with_capacity(nedges),
            faces: Vec::with_capacity(nfaces),
        }
    }

    pub(crate) fn halfedge(&self, h: HH) -> &Halfedge {
        let idx = h.index();
        &self.edges[(idx >> 1) as usize].halfedges[(idx & 1) as usize]
    }

    pub(crate) fn halfedge_mut(&mut self, h: HH) -> &mut Halfedge {
        let idx = h.index();
        &mut self.edges[(idx >> 1) as usize].halfedges[(idx & 1) as usize]
    }

    pub fn is_valid_vertex(&self, v: VH) -> bool {
        (v.index() as usize) < self.vertices.len()
    }

    pub fn is_valid_halfedge(&self, h: HH) -> bool {
        (h.index() as usize) < self.num_halfedges()
    }

    pub fn is_valid_edge(&self, e: EH) -> bool {
        (e.index() as usize) < self.edges.len()
    }

    pub fn is_valid_face(&self, f: FH) -> bool {
        (f.index() as usize) < self.faces.len()
    }

    pub fn vertex_halfedge(&self, v: VH) -> Option<HH> {
        self.vertices[v.index() as usize].halfedge
    }

    pub fn to_vertex(&self, h: HH) -> VH {
        self.halfedge(h).vertex
    }

    pub fn from_vertex(&self, h: HH) -> VH {
        self.halfedge(h.opposite()).vertex
    }

    pub fn prev_halfedge(&self, h: HH) -> HH {
        self.halfedge(h).prev
    }

    pub fn next_halfedge(&self, h: HH) -> HH {
        self.halfedge(h).next
    }

    pub fn opposite_halfedge(&self, h: HH) -> HH {
        h.opposite()
    }

    pub fn halfedge_face(&self, h: HH) -> Option<FH> {
        self.halfedge(h).face
    }

    pub fn halfedge_edge(&self, h: HH) -> EH {
        h.edge()
    }

    pub fn edge_halfedge(&self, e: EH, flag: bool) -> HH {
        e.halfedge(flag)
    }

    pub fn face_halfedge(&self, f: FH) -> HH {
        self.faces[f.index() as usize].halfedge
    }

    /// Rotate `h` clockwise about its tail vertex.
    pub fn cw_rotated_halfedge(&self, h: HH) -> HH {
        self.next_halfedge(h.opposite())
    }

    /// Rotate `h` counter-clockwise about its tail vertex.
    pub fn ccw_rotated_halfedge(&self, h: HH) -> HH {
        self.prev_halfedge(h).opposite()
    }

    pub fn is_boundary_halfedge(&self, h: HH) -> bool {
        self.halfedge(h).face.is_none()
    }

    pub fn is_boundary_edge(&self, e: EH) -> bool {
        let (h, oh) = e.halfedges();
        self.is_boundary_halfedge(h) || self.is_boundary_halfedge(oh)
    }

    /// Isolated vertices count as boundary vertices.
    pub fn is_boundary_vertex(&self, v: VH) -> bool {
        match self.vertex_halfedge(v) {
            Some(h) => self.is_boundary_halfedge(h),
            None => true,
        }
    }

    /// A face touching a boundary edge is a boundary face.
    pub fn is_boundary_face(&self, f: FH) -> bool {
        iterator::fh_ccw_iter(self, f).any(|h| self.is_boundary_halfedge(h.opposite()))
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_halfedges(&self) -> usize {
        self.edges.len() * 2
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> + use<> {
        (0..(self.num_vertices() as u32)).map(|i| i.into())
    }

    pub fn halfedges(&self) -> impl Iterator<Item = HH> + use<> {
        (0..(self.num_halfedges() as u32)).map(|i| i.into())
    }

    pub fn edges(&self) -> impl Iterator<Item = EH> + use<> {
        (0..(self.num_edges() as u32)).map(|i| i.into())
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> + use<> {
        (0..(self.num_faces() as u32)).map(|i| i.into())
    }

    pub fn find_halfedge(&self, from: VH, to: VH) -> Option<HH> {
        iterator::voh_ccw_iter(self, from).find(|h| self.to_vertex(*h) == to)
    }

    pub fn is_manifold_vertex(&self, v: VH) -> bool {
        // The stored outgoing halfedge is the boundary one if there is any.
        // Another boundary halfedge further along the fan means a second gap.
        iterator::voh_ccw_iter(self, v)
            .skip(1)
            .all(|h| !self.is_boundary_halfedge(h))
    }

    pub fn vertex_valence(&self, v: VH) -> usize {
        iterator::voh_ccw_iter(self, v).count()
    }

    pub fn face_valence(&self, f: FH) -> usize {
        iterator::fh_ccw_iter(self, f).count()
    }

    pub(crate) fn add_vertex(&mut self) -> VH {
        let vi = self.vertices.len() as u32;
        self.vertices.push(Vertex { halfedge: None });
        vi.into()
    }

    /// Push a new edge from `from` to `to`. Both halfedges start out without
    /// a face, and with `next` / `prev` pointing at themselves.
    pub(crate) fn new_edge(&mut self, from: VH, to: VH) -> HH {
        let ei = self.edges.len() as u32;
        let h: HH = (ei << 1).into();
        let oh = h.opposite();
        self.edges.push(Edge {
            halfedges: [
                Halfedge {
                    face: None,
                    vertex: to,
                    next: h,
                    prev: h,
                },
                Halfedge {
                    face: None,
                    vertex: from,
                    next: oh,
                    prev: oh,
                },
            ],
        });
        h
    }

    pub(crate) fn new_face(&mut self, halfedge: HH) -> FH {
        let fi = self.faces.len() as u32;
        self.faces.push(Face { halfedge });
        fi.into()
    }

    pub(crate) fn set_vertex_halfedge(&mut self, v: VH, h: HH) {
        self.vertices[v.index() as usize].halfedge = Some(h);
    }

    pub(crate) fn set_halfedge_face(&mut self, h: HH, f: FH) {
        self.halfedge_mut(h).face = Some(f);
    }

    pub(crate) fn set_next_halfedge(&mut self, hprev: HH, hnext: HH) {
        self.halfedge_mut(hprev).next = hnext;
        self.halfedge_mut(hnext).prev = hprev;
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}
