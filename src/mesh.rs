use glam::{Vec2, Vec3};

use crate::{
    element::{Handle, EH, FH, HH, VH},
    iterator,
    math::BoundingBox,
    topol::Topology,
};

/// A halfedge mesh with vertex positions and the attributes derived from
/// them.
///
/// Meshes are produced by [`MeshBuilder`](crate::MeshBuilder),
/// [`Mesh::from_triangles`] or the obj loader. The connectivity is fixed
/// once built. Positions can be changed, after which [`Mesh::update`]
/// refreshes the derived attributes.
pub struct Mesh {
    pub(crate) topol: Topology,
    pub(crate) points: Vec<Vec3>,
    pub(crate) vertex_texcoords: Option<Vec<Vec2>>,
    pub(crate) halfedge_texcoords: Option<Vec<Vec2>>,
    pub(crate) face_normals: Vec<Vec3>,
    pub(crate) vertex_normals: Vec<Vec3>,
    pub(crate) bbox: BoundingBox,
    pub(crate) average_edge_length: f32,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    /// An empty mesh.
    pub fn new() -> Self {
        Self::from_parts(Topology::new(), Vec::new(), None, None)
    }

    pub(crate) fn from_parts(
        topol: Topology,
        points: Vec<Vec3>,
        vertex_texcoords: Option<Vec<Vec2>>,
        halfedge_texcoords: Option<Vec<Vec2>>,
    ) -> Self {
        let nverts = topol.num_vertices();
        let nfaces = topol.num_faces();
        Mesh {
            topol,
            points,
            vertex_texcoords,
            halfedge_texcoords,
            face_normals: vec![Vec3::ZERO; nfaces],
            vertex_normals: vec![Vec3::ZERO; nverts],
            bbox: BoundingBox::default(),
            average_edge_length: 0.0,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.topol.num_vertices()
    }

    pub fn num_edges(&self) -> usize {
        self.topol.num_edges()
    }

    pub fn num_halfedges(&self) -> usize {
        self.topol.num_halfedges()
    }

    pub fn num_faces(&self) -> usize {
        self.topol.num_faces()
    }

    /// A mesh is usable once it has at least one vertex and one face.
    pub fn is_valid(&self) -> bool {
        self.num_vertices() > 0 && self.num_faces() > 0
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> + use<> {
        self.topol.vertices()
    }

    pub fn halfedges(&self) -> impl Iterator<Item = HH> + use<> {
        self.topol.halfedges()
    }

    pub fn edges(&self) -> impl Iterator<Item = EH> + use<> {
        self.topol.edges()
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> + use<> {
        self.topol.faces()
    }

    pub fn point(&self, v: VH) -> Vec3 {
        self.points[v.index() as usize]
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Move a vertex. Derived attributes go stale until [`Mesh::update`].
    pub fn set_point(&mut self, v: VH, pos: Vec3) {
        self.points[v.index() as usize] = pos;
    }

    pub fn face_normal(&self, f: FH) -> Vec3 {
        self.face_normals[f.index() as usize]
    }

    pub fn face_normals(&self) -> &[Vec3] {
        &self.face_normals
    }

    pub fn vertex_normal(&self, v: VH) -> Vec3 {
        self.vertex_normals[v.index() as usize]
    }

    pub fn vertex_normals(&self) -> &[Vec3] {
        &self.vertex_normals
    }

    pub fn has_texcoords(&self) -> bool {
        self.halfedge_texcoords.is_some()
    }

    pub fn vertex_texcoord(&self, v: VH) -> Option<Vec2> {
        self.vertex_texcoords
            .as_ref()
            .map(|tex| tex[v.index() as usize])
    }

    pub fn halfedge_texcoord(&self, h: HH) -> Option<Vec2> {
        self.halfedge_texcoords
            .as_ref()
            .map(|tex| tex[h.index() as usize])
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    /// Zero until the mesh has faces.
    pub fn average_edge_length(&self) -> f32 {
        self.average_edge_length
    }

    pub fn vertex_halfedge(&self, v: VH) -> Option<HH> {
        self.topol.vertex_halfedge(v)
    }

    pub fn face_halfedge(&self, f: FH) -> HH {
        self.topol.face_halfedge(f)
    }

    pub fn find_halfedge(&self, from: VH, to: VH) -> Option<HH> {
        self.topol.find_halfedge(from, to)
    }

    pub fn is_boundary_vertex(&self, v: VH) -> bool {
        self.topol.is_boundary_vertex(v)
    }

    pub fn is_boundary_edge(&self, e: EH) -> bool {
        self.topol.is_boundary_edge(e)
    }

    pub fn is_boundary_face(&self, f: FH) -> bool {
        self.topol.is_boundary_face(f)
    }

    pub fn is_manifold_vertex(&self, v: VH) -> bool {
        self.topol.is_manifold_vertex(v)
    }

    pub fn vertex_valence(&self, v: VH) -> usize {
        self.topol.vertex_valence(v)
    }

    pub fn face_valence(&self, f: FH) -> usize {
        self.topol.face_valence(f)
    }

    pub fn voh_ccw_iter(&self, v: VH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::voh_ccw_iter(&self.topol, v)
    }

    pub fn voh_cw_iter(&self, v: VH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::voh_cw_iter(&self.topol, v)
    }

    pub fn vih_ccw_iter(&self, v: VH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::vih_ccw_iter(&self.topol, v)
    }

    pub fn vih_cw_iter(&self, v: VH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::vih_cw_iter(&self.topol, v)
    }

    pub fn vv_ccw_iter(&self, v: VH) -> impl Iterator<Item = VH> + use<'_> {
        iterator::vv_ccw_iter(&self.topol, v)
    }

    pub fn vv_cw_iter(&self, v: VH) -> impl Iterator<Item = VH> + use<'_> {
        iterator::vv_cw_iter(&self.topol, v)
    }

    pub fn ve_ccw_iter(&self, v: VH) -> impl Iterator<Item = EH> + use<'_> {
        iterator::ve_ccw_iter(&self.topol, v)
    }

    pub fn vf_ccw_iter(&self, v: VH) -> impl Iterator<Item = FH> + use<'_> {
        iterator::vf_ccw_iter(&self.topol, v)
    }

    pub fn vf_cw_iter(&self, v: VH) -> impl Iterator<Item = FH> + use<'_> {
        iterator::vf_cw_iter(&self.topol, v)
    }

    pub fn fh_ccw_iter(&self, f: FH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::fh_ccw_iter(&self.topol, f)
    }

    pub fn fh_cw_iter(&self, f: FH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::fh_cw_iter(&self.topol, f)
    }

    pub fn fv_ccw_iter(&self, f: FH) -> impl Iterator<Item = VH> + use<'_> {
        iterator::fv_ccw_iter(&self.topol, f)
    }

    pub fn fv_cw_iter(&self, f: FH) -> impl Iterator<Item = VH> + use<'_> {
        iterator::fv_cw_iter(&self.topol, f)
    }

    pub fn fe_ccw_iter(&self, f: FH) -> impl Iterator<Item = EH> + use<'_> {
        iterator::fe_ccw_iter(&self.topol, f)
    }

    pub fn ff_ccw_iter(&self, f: FH) -> impl Iterator<Item = FH> + use<'_> {
        iterator::ff_ccw_iter(&self.topol, f)
    }

    pub fn ff_cw_iter(&self, f: FH) -> impl Iterator<Item = FH> + use<'_> {
        iterator::ff_cw_iter(&self.topol, f)
    }

    /// Follow `next` from `h` until the loop closes.
    pub fn loop_ccw_iter(&self, h: HH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::loop_ccw_iter(&self.topol, h)
    }

    pub fn face_contains_vertex(&self, f: FH, v: VH) -> bool {
        self.fv_ccw_iter(f).any(|fv| fv == v)
    }

    /// Check if an edge connects `v0` and `v1`.
    pub fn are_neighbors(&self, v0: VH, v1: VH) -> bool {
        if !self.topol.is_valid_vertex(v0) || !self.topol.is_valid_vertex(v1) {
            return false;
        }
        self.find_halfedge(v0, v1).is_some()
    }

    /// Find the face incident on all of `verts`.
    ///
    /// At least three vertices are required.
    pub fn find_face(&self, verts: &[VH]) -> Option<FH> {
        if verts.len() < 3 || verts.iter().any(|v| !self.topol.is_valid_vertex(*v)) {
            return None;
        }
        self.vf_ccw_iter(verts[0])
            .find(|f| verts[1..].iter().all(|v| self.face_contains_vertex(*f, *v)))
    }

    pub fn num_boundary_vertices(&self) -> usize {
        self.vertices()
            .filter(|v| self.is_boundary_vertex(*v))
            .count()
    }

    /// Every boundary loop, as the halfedges visited by following `next`.
    pub fn boundary_loops(&self) -> Vec<Vec<HH>> {
        let mut visited = vec![false; self.num_halfedges()];
        let mut loops = Vec::new();
        for h in self.halfedges() {
            if visited[h.index() as usize] || !self.topol.is_boundary_halfedge(h) {
                continue;
            }
            let hloop: Vec<HH> = self.loop_ccw_iter(h).collect();
            for lh in &hloop {
                visited[lh.index() as usize] = true;
            }
            loops.push(hloop);
        }
        loops
    }

    /// Number of patches of faces connected through shared edges.
    pub fn num_components(&self) -> usize {
        let mut visited = vec![false; self.num_faces()];
        let mut stack = Vec::new();
        let mut count = 0usize;
        for f in self.faces() {
            if std::mem::replace(&mut visited[f.index() as usize], true) {
                continue;
            }
            count += 1;
            stack.push(f);
            while let Some(cur) = stack.pop() {
                for nf in self.ff_ccw_iter(cur) {
                    if !std::mem::replace(&mut visited[nf.index() as usize], true) {
                        stack.push(nf);
                    }
                }
            }
        }
        count
    }
}

#[cfg(test)]
mod test {
    use glam::vec3;

    use crate::{
        builder::MeshBuilder,
        element::{Handle, VH},
        mesh::Mesh,
        topol::test::{loop_mesh, quad_box, triangle},
    };

    #[test]
    fn t_empty_mesh() {
        let mesh = Mesh::new();
        assert!(!mesh.is_valid());
        assert_eq!(mesh.num_components(), 0);
        assert!(mesh.boundary_loops().is_empty());
        assert!(!mesh.has_texcoords());
        assert_eq!(mesh.average_edge_length(), 0.0);
        // Vertices alone do not make a valid mesh.
        let mut builder = MeshBuilder::new();
        builder.add_vertices(&[vec3(0.0, 0.0, 0.0), vec3(3.0, 0.0, 0.0)]);
        let points = builder.build().unwrap();
        assert!(!points.is_valid());
        assert_eq!(points.num_vertices(), 2);
        assert_eq!(points.average_edge_length(), 0.0);
    }

    #[test]
    fn t_box_find_face() {
        let qbox = quad_box();
        let v = |i: u32| -> VH { i.into() };
        assert_eq!(
            qbox.find_face(&[v(4), v(5), v(6)]).map(|f| f.index()),
            Some(5)
        );
        assert_eq!(
            qbox.find_face(&[v(0), v(1), v(5), v(4)]).map(|f| f.index()),
            Some(1)
        );
        assert_eq!(qbox.find_face(&[v(0), v(6), v(1)]), None);
        assert_eq!(qbox.find_face(&[v(0), v(1)]), None);
        assert_eq!(qbox.find_face(&[v(0), v(1), v(42)]), None);
    }

    #[test]
    fn t_find_face_on_boundary() {
        let mesh = loop_mesh();
        let v = |i: u32| -> VH { i.into() };
        // All three vertices lie on the boundary.
        assert_eq!(
            mesh.find_face(&[v(0), v(1), v(4)]).map(|f| f.index()),
            Some(0)
        );
        assert_eq!(
            mesh.find_face(&[v(10), v(11), v(15)]).map(|f| f.index()),
            Some(7)
        );
        // The hole is not a face.
        assert_eq!(mesh.find_face(&[v(5), v(6), v(10), v(9)]), None);
    }

    #[test]
    fn t_neighbors() {
        let qbox = quad_box();
        assert!(qbox.are_neighbors(0u32.into(), 1u32.into()));
        assert!(qbox.are_neighbors(1u32.into(), 0u32.into()));
        assert!(!qbox.are_neighbors(0u32.into(), 6u32.into()));
        assert!(!qbox.are_neighbors(0u32.into(), 99u32.into()));
        assert!(qbox.face_contains_vertex(0u32.into(), 3u32.into()));
        assert!(!qbox.face_contains_vertex(0u32.into(), 4u32.into()));
    }

    #[test]
    fn t_boundary_counts() {
        assert_eq!(triangle().num_boundary_vertices(), 3);
        assert_eq!(quad_box().num_boundary_vertices(), 0);
        assert_eq!(loop_mesh().num_boundary_vertices(), 16);
    }

    #[test]
    fn t_components() {
        assert_eq!(quad_box().num_components(), 1);
        assert_eq!(loop_mesh().num_components(), 1);
        let mut builder = MeshBuilder::new();
        let a = builder.add_vertices(&[
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
        ]);
        let b = builder.add_vertices(&[
            vec3(5.0, 0.0, 0.0),
            vec3(6.0, 0.0, 0.0),
            vec3(5.0, 1.0, 0.0),
        ]);
        builder.add_vertex(vec3(9.0, 9.0, 9.0));
        builder.add_face(&a).unwrap();
        builder.add_face(&b).unwrap();
        let mesh = builder.build().unwrap();
        assert_eq!(mesh.num_components(), 2);
        // The isolated vertex is a boundary vertex without a halfedge.
        let iso: VH = 6u32.into();
        assert!(mesh.is_boundary_vertex(iso));
        assert_eq!(mesh.vertex_halfedge(iso), None);
        assert_eq!(mesh.vertex_valence(iso), 0);
    }
}
