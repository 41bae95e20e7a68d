use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use glam::{Vec2, Vec3};

use crate::{builder::MeshBuilder, element::Handle, element::VH, error::Error, mesh::Mesh};

/// Options for reading obj files.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjReadOptions {
    /// If set, the mesh is centered and scaled so that the longest side of
    /// its bounding box has this length. See [`Mesh::unify`].
    pub unify: Option<f32>,
}

impl Default for ObjReadOptions {
    fn default() -> Self {
        ObjReadOptions { unify: Some(2.0) }
    }
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: false,
        triangulate: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

impl Mesh {
    /// Load a mesh from an obj file on disk.
    pub fn load_obj(path: impl AsRef<Path>, options: &ObjReadOptions) -> Result<Mesh, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            log::error!("Cannot open {}: {}", path.display(), e);
            Error::InvalidObjFile(path.to_path_buf())
        })?;
        Self::read_obj(&mut BufReader::new(file), options)
    }

    /// Read a mesh from obj text.
    ///
    /// Only vertex positions, texture coordinates and faces are used. Faces
    /// are kept as polygons. All groups and objects end up in one mesh, and
    /// a vertex of a later group is welded to an earlier vertex at exactly
    /// the same position. Faces the builder rejects are skipped with a
    /// warning. Fails with [`Error::EmptyMesh`] if no face survives.
    pub fn read_obj(reader: &mut impl BufRead, options: &ObjReadOptions) -> Result<Mesh, Error> {
        // Materials are never needed.
        let (models, _) = tobj::load_obj_buf(reader, &load_options(), |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })
        .map_err(|e| Error::ObjLoadFailed(format!("{}", e)))?;
        let (nverts, nfaces) = models
            .iter()
            .fold((0usize, 0usize), |(nverts, nfaces), model| {
                let msh = &model.mesh;
                (
                    nverts + msh.positions.len() / 3,
                    nfaces + face_arities(msh).len(),
                )
            });
        let mut builder = MeshBuilder::with_capacity(nverts, nfaces);
        let mut welded: HashMap<[u32; 3], VH> = HashMap::new();
        let mut local: Vec<VH> = Vec::new();
        let mut fvs: Vec<VH> = Vec::new();
        let mut fts: Vec<Vec2> = Vec::new();
        let mut nskipped = 0usize;
        for model in &models {
            let msh = &model.mesh;
            // Only weld against vertices of earlier models.
            local.clear();
            local.extend(msh.positions.chunks_exact(3).map(|c| {
                let key = [c[0].to_bits(), c[1].to_bits(), c[2].to_bits()];
                match welded.get(&key) {
                    Some(v) => *v,
                    None => builder.add_vertex(Vec3::new(c[0], c[1], c[2])),
                }
            }));
            for (c, v) in msh.positions.chunks_exact(3).zip(local.iter()) {
                welded
                    .entry([c[0].to_bits(), c[1].to_bits(), c[2].to_bits()])
                    .or_insert(*v);
            }
            let has_texcoords =
                !msh.texcoords.is_empty() && msh.texcoord_indices.len() == msh.indices.len();
            let mut start = 0usize;
            for (fi, size) in face_arities(msh).into_iter().enumerate() {
                let range = start..(start + size);
                start += size;
                let indices = msh.indices.get(range.clone()).ok_or_else(|| {
                    Error::ObjLoadFailed(format!("face {} of '{}' is truncated", fi, model.name))
                })?;
                fvs.clear();
                for i in indices {
                    let v = local.get(*i as usize).ok_or_else(|| {
                        Error::ObjLoadFailed(format!("vertex index {} is out of bounds", i))
                    })?;
                    fvs.push(*v);
                }
                let result = if has_texcoords {
                    fts.clear();
                    for ti in &msh.texcoord_indices[range] {
                        fts.push(texcoord(msh, *ti)?);
                    }
                    builder.add_face_with_texcoords(&fvs, &fts)
                } else {
                    builder.add_face(&fvs)
                };
                match result {
                    Ok(_) => {}
                    Err(
                        e @ (Error::DegenerateFace
                        | Error::ComplexHalfedge(_)
                        | Error::ComplexVertex(_)),
                    ) => {
                        log::warn!("Skipping face {} of '{}': {}", fi, model.name, e);
                        nskipped += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        log::debug!(
            "Read {} models: {} vertices, {} faces, {} faces skipped",
            models.len(),
            builder.num_vertices(),
            builder.num_faces(),
            nskipped
        );
        let mut mesh = builder.build()?;
        if !mesh.is_valid() {
            return Err(Error::EmptyMesh);
        }
        if let Some(size) = options.unify {
            mesh.unify(size)?;
        }
        Ok(mesh)
    }

    /// Write the mesh as obj text. Face corners get `vt` entries if the mesh
    /// has texture coordinates.
    pub fn write_obj(&self, w: &mut impl Write) -> Result<(), Error> {
        writeln!(w, "g object")?;
        for p in self.points() {
            writeln!(w, "v {:e} {:e} {:e}", p.x, p.y, p.z)?;
        }
        if self.has_texcoords() {
            // The texcoord of a corner lives on the halfedge pointing into it.
            for f in self.faces() {
                for h in self.fh_ccw_iter(f) {
                    let uv = self
                        .halfedge_texcoord(self.topol.prev_halfedge(h))
                        .unwrap_or(Vec2::ZERO);
                    writeln!(w, "vt {:e} {:e}", uv.x, uv.y)?;
                }
            }
        }
        let mut corner = 0usize;
        for f in self.faces() {
            write!(w, "f")?;
            for v in self.fv_ccw_iter(f) {
                if self.has_texcoords() {
                    corner += 1;
                    write!(w, " {}/{}", v.index() + 1, corner)?;
                } else {
                    write!(w, " {}", v.index() + 1)?;
                }
            }
            writeln!(w)?;
        }
        Ok(())
    }

    /// Write the mesh to an obj file on disk.
    pub fn save_obj(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let mut w = BufWriter::new(File::create(path)?);
        self.write_obj(&mut w)?;
        w.flush()?;
        Ok(())
    }
}

fn texcoord(msh: &tobj::Mesh, ti: u32) -> Result<Vec2, Error> {
    let start = ti as usize * 2;
    let uv = msh
        .texcoords
        .get(start..(start + 2))
        .ok_or_else(|| Error::ObjLoadFailed(format!("texcoord index {} is out of bounds", ti)))?;
    Ok(Vec2::new(uv[0], uv[1]))
}

/// Empty arities mean every face is a triangle.
fn face_arities(msh: &tobj::Mesh) -> Vec<usize> {
    if msh.face_arities.is_empty() {
        vec![3; msh.indices.len() / 3]
    } else {
        msh.face_arities.iter().map(|n| *n as usize).collect()
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use arrayvec::ArrayVec;
    use glam::{vec2, vec3, Vec3};

    use super::ObjReadOptions;
    use crate::{
        element::{Handle, VH},
        error::Error,
        macros::assert_f32_eq,
        mesh::Mesh,
    };

    const RAW: ObjReadOptions = ObjReadOptions { unify: None };

    const BOX: &str = "
# unit cube with quad faces
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
f 1 4 3 2
f 1 2 6 5
f 2 3 7 6
f 3 4 8 7
f 4 1 5 8
f 5 6 7 8
";

    fn read(text: &str, options: &ObjReadOptions) -> Result<Mesh, Error> {
        Mesh::read_obj(&mut Cursor::new(text.as_bytes()), options)
    }

    #[test]
    fn t_box_polygons() {
        let mesh = read(BOX, &RAW).unwrap();
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_edges(), 12);
        assert_eq!(mesh.num_faces(), 6);
        assert!(mesh.faces().all(|f| mesh.face_valence(f) == 4));
        assert!(mesh.check_topology().is_ok());
        assert!(!mesh.has_texcoords());
        // Corners keep the order of the face line.
        let first: ArrayVec<Vec3, 4> = mesh
            .fv_ccw_iter(0u32.into())
            .map(|v| mesh.point(v))
            .collect();
        assert_eq!(
            first.as_slice(),
            &[
                vec3(0.0, 0.0, 0.0),
                vec3(0.0, 1.0, 0.0),
                vec3(1.0, 1.0, 0.0),
                vec3(1.0, 0.0, 0.0)
            ]
        );
        assert_eq!(mesh.bounding_box().max, Vec3::ONE);
    }

    #[test]
    fn t_default_options_unify() {
        assert_eq!(ObjReadOptions::default().unify, Some(2.0));
        let mesh = read(BOX, &ObjReadOptions::default()).unwrap();
        let bb = mesh.bounding_box();
        assert_f32_eq!(bb.max_extent(), 2.0, 1e-6);
        assert_f32_eq!(bb.center().length(), 0.0, 1e-6);
        assert_f32_eq!(mesh.average_edge_length(), 2.0, 1e-6);
    }

    #[test]
    fn t_texcoords() {
        let text = "
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
f 1/1 2/2 3/3 4/4
";
        let mesh = read(text, &RAW).unwrap();
        assert!(mesh.has_texcoords());
        let uvs = [
            vec2(0.0, 0.0),
            vec2(1.0, 0.0),
            vec2(1.0, 1.0),
            vec2(0.0, 1.0),
        ];
        for h in mesh.fh_ccw_iter(0u32.into()) {
            let head = h.head(&mesh);
            assert_eq!(mesh.halfedge_texcoord(h), Some(uvs[head.index() as usize]));
            assert_eq!(mesh.vertex_texcoord(head), Some(uvs[head.index() as usize]));
        }
    }

    #[test]
    fn t_repeated_vertex_in_face() {
        let text = "
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 2 3
";
        let mesh = read(text, &RAW).unwrap();
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.face_valence(0u32.into()), 3);
    }

    #[test]
    fn t_bad_faces_are_skipped() {
        let text = "
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
f 1 2 3
f 1 1 2
f 1 2 4
f 2 4 3
";
        let mesh = read(text, &RAW).unwrap();
        // The degenerate face and the one reusing 1 -> 2 are gone.
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_edges(), 5);
        assert!(mesh.check_topology().is_ok());
    }

    #[test]
    fn t_groups_are_welded() {
        let text = "
o first
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
f 1 2 3
o second
f 2 4 3
";
        let mesh = read(text, &RAW).unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_edges(), 5);
        assert_eq!(mesh.num_components(), 1);
        assert!(mesh.check_topology().is_ok());
        let v = |x: f32, y: f32| -> VH {
            mesh.vertices()
                .find(|v| mesh.point(*v) == vec3(x, y, 0.0))
                .unwrap()
        };
        assert!(mesh.are_neighbors(v(1.0, 0.0), v(0.0, 1.0)));
    }

    #[test]
    fn t_empty_and_broken_files() {
        assert!(matches!(read("", &RAW), Err(Error::EmptyMesh)));
        assert!(matches!(
            read("v 0 0 0\nv 1 0 0\nl 1 2\n", &RAW),
            Err(Error::EmptyMesh)
        ));
        assert!(matches!(
            read("v 0 0 zero\n", &RAW),
            Err(Error::ObjLoadFailed(_))
        ));
        assert!(matches!(
            Mesh::load_obj("/nonexistent/mesh.obj", &RAW),
            Err(Error::InvalidObjFile(_))
        ));
    }

    #[test]
    fn t_write_then_read() {
        let mesh = read(BOX, &ObjReadOptions::default()).unwrap();
        let mut buf = Vec::new();
        mesh.write_obj(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("g object\n"));
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 6);
        let copy = read(&text, &RAW).unwrap();
        assert_eq!(copy.num_vertices(), mesh.num_vertices());
        assert_eq!(copy.num_faces(), mesh.num_faces());
        // Positions survive the text round trip exactly.
        for f in mesh.faces() {
            assert!(
                mesh.fv_ccw_iter(f)
                    .map(|v| mesh.point(v))
                    .eq(copy.fv_ccw_iter(f).map(|v| copy.point(v)))
            );
        }
    }

    #[test]
    fn t_write_texcoords() {
        let text = "
v 0 0 0
v 1 0 0
v 0 1 0
vt 0.25 0.5
vt 0.75 0.5
vt 0.5 1
f 1/1 2/2 3/3
";
        let mesh = read(text, &RAW).unwrap();
        let mut buf = Vec::new();
        mesh.write_obj(&mut buf).unwrap();
        let written = String::from_utf8(buf).unwrap();
        assert!(written.lines().any(|l| l == "f 1/1 2/2 3/3"));
        assert_eq!(written.lines().filter(|l| l.starts_with("vt ")).count(), 3);
        let copy = read(&written, &RAW).unwrap();
        for h in mesh.halfedges() {
            assert_eq!(copy.halfedge_texcoord(h), mesh.halfedge_texcoord(h));
        }
    }

    #[test]
    fn t_surfaces_touching_at_a_vertex() {
        // Two tetrahedra sharing vertex 1. The second one can only keep the
        // face that does not touch the shared vertex.
        let text = "
v 0 0 0
v 1 0 1
v 0 1 1
v 1 1 2
v -1 0 -1
v 0 -1 -1
v -1 -1 -2
f 1 3 2
f 1 4 3
f 1 2 4
f 2 3 4
f 1 6 5
f 1 7 6
f 1 5 7
f 5 6 7
";
        let mesh = read(text, &RAW).unwrap();
        assert_eq!(mesh.num_vertices(), 7);
        assert_eq!(mesh.num_faces(), 5);
        assert_eq!(mesh.num_components(), 2);
        assert_eq!(mesh.boundary_loops().len(), 1);
        assert!(mesh.check_topology().is_ok());
        let apex = mesh
            .vertices()
            .find(|v| mesh.point(*v) == Vec3::ZERO)
            .unwrap();
        assert_eq!(mesh.vertex_valence(apex), 3);
        assert!(mesh.is_manifold_vertex(apex));
        assert_f32_eq!(mesh.vertex_normal(apex).length(), 1.0, 1e-5);
    }

    #[test]
    fn t_texcoord_lookup() {
        let msh = tobj::Mesh {
            texcoords: vec![0.0, 0.5, 1.0, 0.25],
            ..Default::default()
        };
        assert_eq!(super::texcoord(&msh, 1).unwrap(), vec2(1.0, 0.25));
        match super::texcoord(&msh, 2) {
            Err(Error::ObjLoadFailed(msg)) => {
                assert_eq!(msg, "texcoord index 2 is out of bounds")
            }
            _ => panic!("Expected an out of bounds error"),
        }
    }
}
