use crate::{
    element::Handle,
    error::Error,
    iterator,
    mesh::Mesh,
    topol::Topology,
};

fn check_halfedge_links(topol: &Topology) -> Result<(), Error> {
    for h in topol.halfedges() {
        let head = topol.to_vertex(h);
        let tail = topol.from_vertex(h);
        if head == tail {
            return Err(Error::DegenerateHalfedge(h));
        }
        let next = topol.next_halfedge(h);
        let prev = topol.prev_halfedge(h);
        if topol.prev_halfedge(next) != h
            || topol.next_halfedge(prev) != h
            || topol.from_vertex(next) != head
            || topol.to_vertex(prev) != tail
        {
            return Err(Error::InvalidHalfedgeLink(h));
        }
    }
    Ok(())
}

fn check_vertices(topol: &Topology, hvisited: &mut [bool]) -> Result<(), Error> {
    hvisited.fill(false);
    for v in topol.vertices() {
        if let Some(h) = topol.vertex_halfedge(v) {
            if !topol.is_valid_halfedge(h) || topol.from_vertex(h) != v {
                return Err(Error::InvalidOutgoingHalfedges(v));
            }
            // The outgoing halfedge must be a boundary halfedge, or none of
            // the halfedges are boundary.
            if !topol.is_boundary_halfedge(h)
                && iterator::voh_ccw_iter(topol, v).any(|h| topol.is_boundary_halfedge(h))
            {
                return Err(Error::OutgoingHalfedgeNotBoundary(v));
            }
        }
        // Both directions must visit the same halfedges exactly once.
        for h in iterator::voh_ccw_iter(topol, v) {
            if topol.from_vertex(h) != v || std::mem::replace(&mut hvisited[h.index() as usize], true)
            {
                return Err(Error::InvalidOutgoingHalfedges(v));
            }
        }
        for h in iterator::voh_cw_iter(topol, v) {
            if !std::mem::replace(&mut hvisited[h.index() as usize], false) {
                return Err(Error::InvalidOutgoingHalfedges(v));
            }
        }
    }
    // Every halfedge that has a face must be reachable from its tail.
    for h in topol.halfedges() {
        if topol.halfedge_face(h).is_some() {
            let tail = topol.from_vertex(h);
            if !iterator::voh_ccw_iter(topol, tail).any(|oh| oh == h) {
                return Err(Error::InvalidHalfedgeVertexLink(h));
            }
        }
    }
    Ok(())
}

fn check_loops(topol: &Topology, hvisited: &mut [bool]) -> Result<(), Error> {
    hvisited.fill(false);
    for h in topol.halfedges() {
        if hvisited[h.index() as usize] {
            continue;
        }
        let f = topol.halfedge_face(h);
        for lh in iterator::loop_ccw_iter(topol, h) {
            if std::mem::replace(&mut hvisited[lh.index() as usize], true) {
                return Err(Error::InvalidLoopTopology(lh));
            }
            if topol.halfedge_face(lh) != f {
                return Err(Error::InconsistentFaceInLoop(lh));
            }
        }
    }
    Ok(())
}

fn check_faces(topol: &Topology) -> Result<(), Error> {
    for f in topol.faces() {
        let h = topol.face_halfedge(f);
        if !topol.is_valid_halfedge(h) || topol.halfedge_face(h) != Some(f) {
            return Err(Error::InvalidFaceHalfedgeLink(f, h));
        }
    }
    Ok(())
}

impl Topology {
    pub fn check(&self) -> Result<(), Error> {
        // To keep track of visited halfedges.
        let mut hvisited = vec![false; self.num_halfedges()].into_boxed_slice();
        check_halfedge_links(self)?;
        check_vertices(self, &mut hvisited)?;
        check_loops(self, &mut hvisited)?;
        check_faces(self)?;
        Ok(())
    }
}

impl Mesh {
    /// Check the topology of the mesh.
    ///
    /// This function will return an error if any errors are found in the topolgy.
    pub fn check_topology(&self) -> Result<(), Error> {
        self.topol.check()
    }
}
