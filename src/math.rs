use glam::Vec3;

use crate::{
    element::{EH, FH, Handle, VH},
    error::Error,
    iterator,
    mesh::Mesh,
};

/// Axis aligned bounding box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BoundingBox {
    /// The box spanning `[-1, 1]` along every axis.
    fn default() -> Self {
        BoundingBox {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        }
    }
}

impl BoundingBox {
    /// `None` if there are no points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(
            BoundingBox {
                min: first,
                max: first,
            },
            |bb, p| BoundingBox {
                min: bb.min.min(*p),
                max: bb.max.max(*p),
            },
        ))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn max_extent(&self) -> f32 {
        self.extents().max_element()
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

impl Mesh {
    /// Compute the normal of a face using Newell's method. Degenerate faces
    /// get a zero vector.
    pub fn calc_face_normal(&self, f: FH) -> Vec3 {
        let n = iterator::fh_ccw_iter(&self.topol, f).fold(Vec3::ZERO, |n, h| {
            let pc = self.point(self.topol.from_vertex(h));
            let pn = self.point(self.topol.to_vertex(h));
            let (a, b) = (pc - pn, pc + pn);
            n + Vec3::new(a.y * b.z, a.z * b.x, a.x * b.y)
        });
        n.normalize_or_zero()
    }

    /// Unit normal of a vertex, the average of the normals of the incident
    /// faces. `face_normals` must be up to date.
    pub fn calc_vertex_normal(&self, v: VH, face_normals: &[Vec3]) -> Vec3 {
        iterator::vf_ccw_iter(&self.topol, v)
            .fold(Vec3::ZERO, |n, f| n + face_normals[f.index() as usize])
            .normalize_or_zero()
    }

    pub fn calc_edge_length(&self, e: EH) -> f32 {
        self.calc_edge_vector(e).length()
    }

    /// Vector from the tail to the head of the first halfedge of `e`.
    pub fn calc_edge_vector(&self, e: EH) -> Vec3 {
        let h = e.halfedge(false);
        self.point(self.topol.to_vertex(h)) - self.point(self.topol.from_vertex(h))
    }

    pub fn calc_face_centroid(&self, f: FH) -> Vec3 {
        let (sum, count) = iterator::fv_ccw_iter(&self.topol, f)
            .fold((Vec3::ZERO, 0usize), |(sum, count), v| {
                (sum + self.point(v), count + 1)
            });
        sum / count as f32
    }

    pub fn update_face_normals(&mut self) {
        let normals: Vec<Vec3> = self.faces().map(|f| self.calc_face_normal(f)).collect();
        self.face_normals = normals;
    }

    pub fn update_vertex_normals(&mut self) {
        let normals: Vec<Vec3> = self
            .vertices()
            .map(|v| self.calc_vertex_normal(v, &self.face_normals))
            .collect();
        self.vertex_normals = normals;
    }

    /// Meshes with fewer than three vertices keep the default box.
    pub fn update_bounding_box(&mut self) {
        if self.num_vertices() < 3 {
            return;
        }
        if let Some(bb) = BoundingBox::from_points(&self.points) {
            self.bbox = bb;
        }
    }

    /// Mean edge length. Zero for a mesh without faces.
    pub fn update_average_edge_length(&mut self) {
        if !self.is_valid() || self.num_edges() == 0 {
            self.average_edge_length = 0.0;
            return;
        }
        let total: f32 = self.edges().map(|e| self.calc_edge_length(e)).sum();
        self.average_edge_length = total / self.num_edges() as f32;
    }

    /// Recompute normals, bounds and the average edge length from the
    /// current positions.
    pub fn update(&mut self) -> Result<(), Error> {
        if !self.is_valid() {
            return Err(Error::EmptyMesh);
        }
        self.update_face_normals();
        self.update_vertex_normals();
        self.update_bounding_box();
        self.update_average_edge_length();
        Ok(())
    }

    /// Center the mesh on the origin and scale it uniformly so that the
    /// largest side of its bounding box is `size` long.
    pub fn unify(&mut self, size: f32) -> Result<(), Error> {
        if !(size.is_finite() && size > 0.0) {
            return Err(Error::InvalidSize(size));
        }
        let bb = BoundingBox::from_points(&self.points).ok_or(Error::EmptyMesh)?;
        let extent = bb.max_extent();
        if !(extent.is_finite() && extent > 0.0) {
            return Err(Error::DegenerateBoundingBox);
        }
        let scale = size / extent;
        let center = bb.center();
        for p in self.points.iter_mut() {
            *p = (*p - center) * scale;
        }
        // Uniform positive scaling leaves the normals as they are.
        self.update_bounding_box();
        self.update_average_edge_length();
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use glam::{vec3, Vec3};

    use super::BoundingBox;
    use crate::{
        builder::MeshBuilder,
        element::VH,
        error::Error,
        macros::assert_f32_eq,
        mesh::Mesh,
        topol::test::{loop_mesh, quad_box, triangle},
    };

    #[test]
    fn t_box_face_normals() {
        let qbox = quad_box();
        let expected = [
            vec3(0.0, 0.0, -1.0),
            vec3(0.0, -1.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
            vec3(-1.0, 0.0, 0.0),
            vec3(0.0, 0.0, 1.0),
        ];
        for (f, e) in qbox.faces().zip(expected) {
            let n = qbox.face_normal(f);
            assert_f32_eq!((n - e).length(), 0.0, 1e-6);
        }
    }

    #[test]
    fn t_triangle_normal_matches_cross_product() {
        let mut builder = MeshBuilder::new();
        let (a, b, c) = (
            vec3(0.3, -1.0, 2.0),
            vec3(1.5, 0.2, -0.7),
            vec3(-0.4, 2.2, 0.9),
        );
        let verts = builder.add_vertices(&[a, b, c]);
        let f = builder.add_face(&verts).unwrap();
        let mesh = builder.build().unwrap();
        let expected = (b - a).cross(c - a).normalize();
        assert_f32_eq!((mesh.face_normal(f) - expected).length(), 0.0, 1e-5);
        // Every vertex only sees this face.
        for v in mesh.vertices() {
            assert_f32_eq!((mesh.vertex_normal(v) - expected).length(), 0.0, 1e-5);
        }
    }

    #[test]
    fn t_box_vertex_normals() {
        let qbox = quad_box();
        let center = vec3(0.5, 0.5, 0.5);
        for v in qbox.vertices() {
            let expected = (qbox.point(v) - center).normalize();
            let n = qbox.vertex_normal(v);
            assert_f32_eq!(n.length(), 1.0, 1e-6);
            assert_f32_eq!((n - expected).length(), 0.0, 1e-5);
        }
    }

    #[test]
    fn t_flat_strip_normals() {
        let mesh = loop_mesh();
        for f in mesh.faces() {
            assert_f32_eq!((mesh.face_normal(f) - Vec3::Z).length(), 0.0, 1e-6);
        }
        for v in mesh.vertices() {
            assert_f32_eq!((mesh.vertex_normal(v) - Vec3::Z).length(), 0.0, 1e-6);
        }
    }

    #[test]
    fn t_degenerate_face_normal() {
        let mut builder = MeshBuilder::new();
        let verts = builder.add_vertices(&[
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(2.0, 0.0, 0.0),
        ]);
        let f = builder.add_face(&verts).unwrap();
        let mesh = builder.build().unwrap();
        assert_eq!(mesh.face_normal(f), Vec3::ZERO);
        assert!(mesh.vertex_normals().iter().all(|n| *n == Vec3::ZERO));
    }

    #[test]
    fn t_bounding_box() {
        let qbox = quad_box();
        let bb = qbox.bounding_box();
        assert_eq!(bb.min, Vec3::ZERO);
        assert_eq!(bb.max, Vec3::ONE);
        assert_eq!(bb.center(), Vec3::splat(0.5));
        assert!(bb.contains(vec3(0.25, 1.0, 0.0)));
        assert!(!bb.contains(vec3(0.25, 1.5, 0.0)));
        assert_eq!(BoundingBox::from_points(&[]), None);
        let empty = Mesh::new();
        assert_eq!(empty.bounding_box(), BoundingBox::default());
    }

    #[test]
    fn t_average_edge_length() {
        assert_f32_eq!(quad_box().average_edge_length(), 1.0, 1e-6);
        let tri = triangle();
        let expected = (2.0 + 2f32.sqrt()) / 3.0;
        assert_f32_eq!(tri.average_edge_length(), expected, 1e-6);
        let mut empty = Mesh::new();
        empty.update_average_edge_length();
        assert_eq!(empty.average_edge_length(), 0.0);
    }

    #[test]
    fn t_unify() {
        let mut mesh = loop_mesh();
        // The strip spans 3 x 3 x 0.
        mesh.unify(2.0).unwrap();
        let bb = mesh.bounding_box();
        assert_f32_eq!(bb.max_extent(), 2.0, 1e-6);
        assert_f32_eq!(bb.center().length(), 0.0, 1e-6);
        assert_f32_eq!(bb.min.x, -1.0, 1e-6);
        assert_f32_eq!(bb.max.y, 1.0, 1e-6);
        assert_f32_eq!(mesh.average_edge_length(), 2.0 / 3.0, 1e-6);
        let v: VH = 5u32.into();
        assert_f32_eq!(mesh.point(v).x, -1.0 / 3.0, 1e-6);
        assert_f32_eq!((mesh.vertex_normal(v) - Vec3::Z).length(), 0.0, 1e-6);
    }

    #[test]
    fn t_unify_errors() {
        let mut qbox = quad_box();
        assert!(matches!(qbox.unify(0.0), Err(Error::InvalidSize(_))));
        assert!(matches!(qbox.unify(f32::NAN), Err(Error::InvalidSize(_))));
        let mut builder = MeshBuilder::new();
        let verts = builder.add_vertices(&[Vec3::ONE; 3]);
        builder.add_face(&verts).unwrap();
        let mut point = builder.build().unwrap();
        assert!(matches!(point.unify(2.0), Err(Error::DegenerateBoundingBox)));
        assert!(matches!(Mesh::new().unify(2.0), Err(Error::EmptyMesh)));
    }

    #[test]
    fn t_update_after_moving_points() {
        let mut qbox = quad_box();
        for v in qbox.vertices().collect::<Vec<_>>() {
            let p = qbox.point(v);
            qbox.set_point(v, p * 3.0);
        }
        qbox.update().unwrap();
        assert_f32_eq!(qbox.average_edge_length(), 3.0, 1e-6);
        assert_eq!(qbox.bounding_box().max, Vec3::splat(3.0));
        assert_f32_eq!((qbox.face_normal(5u32.into()) - Vec3::Z).length(), 0.0, 1e-6);
        assert_eq!(qbox.calc_face_centroid(5u32.into()), vec3(1.5, 1.5, 3.0));
        assert!(matches!(Mesh::new().update(), Err(Error::EmptyMesh)));
    }
}
