use glam::Vec3;

use crate::{
    element::{Handle, FH, VH},
    iterator,
    mesh::Mesh,
    topol::Topology,
};

impl Topology {
    /// Fan triangulation of a face about its first vertex. A face with `n`
    /// vertices yields `n - 2` triangles.
    pub fn triangulated_face_vertices(&self, f: FH) -> impl Iterator<Item = [VH; 3]> + use<'_> {
        let hstart = self.face_halfedge(f);
        let vstart = self.from_vertex(hstart);
        iterator::loop_ccw_iter(self, self.next_halfedge(hstart))
            .take_while(move |h| self.to_vertex(*h) != vstart)
            .map(move |h| [vstart, self.from_vertex(h), self.to_vertex(h)])
    }

    pub fn triangulated_vertices(&self) -> impl Iterator<Item = [VH; 3]> + use<'_> {
        self.faces()
            .flat_map(move |f| self.triangulated_face_vertices(f))
    }
}

impl Mesh {
    pub fn triangulated_face_vertices(&self, f: FH) -> impl Iterator<Item = [VH; 3]> + use<'_> {
        self.topol.triangulated_face_vertices(f)
    }

    pub fn triangulated_vertices(&self) -> impl Iterator<Item = [VH; 3]> + use<'_> {
        self.topol.triangulated_vertices()
    }

    /// Flat index buffer of the fan triangulation of every face.
    pub fn triangle_indices(&self) -> Vec<u32> {
        self.triangulated_vertices()
            .flatten()
            .map(|v| v.index())
            .collect()
    }

    /// One face normal per triangle of [`Mesh::triangulated_vertices`], for
    /// flat shading.
    pub fn flat_shaded_normals(&self) -> Vec<Vec3> {
        self.faces()
            .flat_map(|f| {
                let n = self.face_normal(f);
                self.triangulated_face_vertices(f).map(move |_| n)
            })
            .collect()
    }

    /// Three vertex normals per triangle of [`Mesh::triangulated_vertices`],
    /// for smooth shading.
    pub fn smooth_shaded_normals(&self) -> Vec<[Vec3; 3]> {
        self.triangulated_vertices()
            .map(|tri| tri.map(|v| self.vertex_normal(v)))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use glam::{vec3, Vec3};

    use crate::{
        builder::MeshBuilder,
        element::Handle,
        topol::test::{loop_mesh, quad_box, triangle},
    };

    #[test]
    fn t_box_triangulated_indices() {
        let qbox = quad_box();
        assert_eq!(
            qbox.triangle_indices(),
            &[
                0, 3, 2, 0, 2, 1, 0, 1, 5, 0, 5, 4, 1, 2, 6, 1, 6, 5, 2, 3, 7, 2, 7, 6, 3, 0, 4, 3,
                4, 7, 4, 5, 6, 4, 6, 7
            ]
        );
    }

    #[test]
    fn t_triangle_is_untouched() {
        let tri = triangle();
        assert_eq!(tri.triangle_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn t_hexagon_fan() {
        let mut builder = MeshBuilder::new();
        let verts = builder.add_vertices(
            &(0..6)
                .map(|i| {
                    let t = i as f32 * std::f32::consts::PI / 3.0;
                    vec3(t.cos(), t.sin(), 0.0)
                })
                .collect::<Vec<_>>(),
        );
        let f = builder.add_face(&verts).unwrap();
        let mesh = builder.build().unwrap();
        let tris: Vec<[u32; 3]> = mesh
            .triangulated_face_vertices(f)
            .map(|t| t.map(|v| v.index()))
            .collect();
        assert_eq!(tris, vec![[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 5]]);
    }

    #[test]
    fn t_shading_normals_align_with_triangles() {
        let mesh = loop_mesh();
        let ntris = mesh.triangulated_vertices().count();
        assert_eq!(ntris, 16);
        let flat = mesh.flat_shaded_normals();
        let smooth = mesh.smooth_shaded_normals();
        assert_eq!(flat.len(), ntris);
        assert_eq!(smooth.len(), ntris);
        assert!(flat.iter().all(|n| (*n - Vec3::Z).length() < 1e-6));
        assert!(smooth.iter().flatten().all(|n| (*n - Vec3::Z).length() < 1e-6));
    }
}
