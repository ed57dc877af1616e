use quarry_geom::{Aabb, Vec2, Vec3};

/// One textured quad. Vertices wind counter-clockwise seen from the side
/// the normal points to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Quad {
    pub verts: [u32; 4],
    pub uvs: [Vec2; 4],
    pub normal: Vec3,
    /// Catalog face slot the texture came from.
    pub slot: u8,
}

/// Prototype geometry in block space: a unit block centered on the origin,
/// Z up.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrototypeMesh {
    pub positions: Vec<Vec3>,
    pub quads: Vec<Quad>,
}

impl PrototypeMesh {
    pub fn with_capacity(quads: usize) -> Self {
        Self {
            positions: Vec::with_capacity(quads * 4),
            quads: Vec::with_capacity(quads),
        }
    }

    /// Appends a quad with its own four vertices.
    pub fn push_quad(&mut self, corners: [Vec3; 4], uvs: [Vec2; 4], slot: u8) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&corners);
        let normal = quad_normal(&corners);
        self.quads.push(Quad {
            verts: [base, base + 1, base + 2, base + 3],
            uvs,
            normal,
            slot,
        });
    }

    /// Appends a quad over already pushed vertices.
    pub fn push_indexed(&mut self, verts: [u32; 4], uvs: [Vec2; 4], slot: u8) {
        let corners = verts.map(|i| self.positions[i as usize]);
        self.quads.push(Quad {
            verts,
            uvs,
            normal: quad_normal(&corners),
            slot,
        });
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }

    pub fn corners(&self, q: &Quad) -> [Vec3; 4] {
        q.verts.map(|i| self.positions[i as usize])
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied())
    }

    /// Mirrors the mesh through the XY plane, keeping faces outward.
    pub fn flip_z(&mut self) {
        for p in &mut self.positions {
            *p = p.flipped_z();
        }
        for q in &mut self.quads {
            q.verts.reverse();
            q.uvs.reverse();
            q.normal = q.normal.flipped_z();
        }
    }
}

/// Unit normal of a quad from its winding (Newell's method).
pub fn quad_normal(c: &[Vec3; 4]) -> Vec3 {
    let mut n = Vec3::ZERO;
    for i in 0..4 {
        let a = c[i];
        let b = c[(i + 1) % 4];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n.normalized()
}
