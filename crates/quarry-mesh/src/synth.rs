//! Prototype geometry for each `ShapeKind`.

use quarry_blocks::types::{FaceTextures, Insets, ShapeKind};
use quarry_geom::{Vec2, Vec3};

use crate::atlas::AtlasLayout;
use crate::face::{Corner, CubeFace};
use crate::mesh::PrototypeMesh;

/// Which member of a shape family to build.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Form {
    #[default]
    Standard,
    /// Upside-down stair.
    Inverted,
    /// Fence rail running from the post toward +Y.
    Rail,
}

impl Form {
    /// Name suffix distinguishing this form's prototype.
    pub fn suffix(self) -> &'static str {
        match self {
            Form::Standard => "",
            Form::Inverted => "Inv",
            Form::Rail => "Rail",
        }
    }
}

pub fn synthesize(
    shape: ShapeKind,
    form: Form,
    faces: &FaceTextures,
    atlas: &AtlasLayout,
) -> PrototypeMesh {
    match shape {
        ShapeKind::Box => inset_box(faces, Insets::NONE, atlas),
        ShapeKind::InsetBox(insets) => inset_box(faces, insets, atlas),
        ShapeKind::Cross => cross(faces, atlas),
        ShapeKind::Stair => stair(faces, form == Form::Inverted, atlas),
        ShapeKind::Fence => match form {
            Form::Rail => fence_rail(faces, atlas),
            _ => inset_box(faces, ShapeKind::FENCE_POST, atlas),
        },
    }
}

#[inline]
fn pick(v: f32, lo: f32, hi: f32) -> f32 {
    if v > 0.0 { hi } else { lo }
}

/// Corner `c` of `face` on the box `[min, max]`.
fn box_corner(face: CubeFace, c: Corner, min: Vec3, max: Vec3) -> Vec3 {
    let (s, t) = c.signs();
    let p = face.normal() * 0.5 + face.right() * (0.5 * s) + face.up() * (0.5 * t);
    Vec3::new(pick(p.x, min.x, max.x), pick(p.y, min.y, max.y), pick(p.z, min.z, max.z))
}

/// Unit cube whose face planes are pushed inward by `insets` texels, with
/// each face's texture trimmed by the same number of source pixels.
pub fn inset_box(faces: &FaceTextures, insets: Insets, atlas: &AtlasLayout) -> PrototypeMesh {
    let t = atlas.texel();
    let side = f32::from(insets.side) * t;
    let min = Vec3::new(-0.5 + side, -0.5 + side, -0.5 + f32::from(insets.bottom) * t);
    let max = Vec3::new(0.5 - side, 0.5 - side, 0.5 - f32::from(insets.top) * t);
    let mut mesh = PrototypeMesh::with_capacity(6);
    for face in CubeFace::ALL {
        let corners = face.corners().map(|c| box_corner(face, c, min, max));
        let uvs = match faces.slot(face.index()) {
            Some(tile) => atlas.face_uvs(tile, face, insets),
            None => [Vec2::default(); 4],
        };
        mesh.push_quad(corners, uvs, face.index() as u8);
    }
    mesh
}

pub fn box_mesh(faces: &FaceTextures, atlas: &AtlasLayout) -> PrototypeMesh {
    inset_box(faces, Insets::NONE, atlas)
}

const CROSS_QUADS: [[[f32; 3]; 4]; 2] = [
    [
        [-0.45, 0.45, 0.5],
        [0.45, -0.45, 0.5],
        [0.45, -0.45, -0.5],
        [-0.45, 0.45, -0.5],
    ],
    [
        [0.45, 0.45, 0.5],
        [-0.45, -0.45, 0.5],
        [-0.45, -0.45, -0.5],
        [0.45, 0.45, -0.5],
    ],
];

/// Two vertical quads crossing on the block diagonals.
pub fn cross(faces: &FaceTextures, atlas: &AtlasLayout) -> PrototypeMesh {
    let mut mesh = PrototypeMesh::with_capacity(2);
    for (slot, quad) in CROSS_QUADS.iter().enumerate() {
        let corners = quad.map(|[x, y, z]| Vec3::new(x, y, z));
        let uvs = match faces.slot(slot) {
            Some(tile) => atlas.cross_uvs(tile),
            None => [Vec2::default(); 4],
        };
        mesh.push_quad(corners, uvs, slot as u8);
    }
    mesh
}

// Step profile extruded along X: full height toward +Y, half height toward -Y.
const STAIR_VERTS: [[f32; 3]; 12] = [
    [0.5, 0.5, 0.5],
    [0.5, 0.5, -0.5],
    [0.5, -0.5, -0.5],
    [0.5, -0.5, 0.0],
    [0.5, 0.0, 0.0],
    [0.5, 0.0, 0.5],
    [-0.5, 0.5, 0.5],
    [-0.5, 0.5, -0.5],
    [-0.5, -0.5, -0.5],
    [-0.5, -0.5, 0.0],
    [-0.5, 0.0, 0.0],
    [-0.5, 0.0, 0.5],
];

const STAIR_QUADS: [[u32; 4]; 10] = [
    [0, 5, 4, 1],    // right, upper
    [4, 3, 2, 1],    // right, lower
    [5, 11, 10, 4],  // upper riser
    [3, 9, 8, 2],    // lower riser
    [9, 10, 7, 8],   // left, lower
    [11, 6, 7, 10],  // left, upper
    [6, 0, 1, 7],    // back
    [0, 6, 11, 5],   // top step
    [4, 10, 9, 3],   // middle step
    [7, 1, 2, 8],    // bottom
];

/// Quarter-block step. `inverted` mirrors it upside down.
pub fn stair(faces: &FaceTextures, inverted: bool, atlas: &AtlasLayout) -> PrototypeMesh {
    let mut mesh = PrototypeMesh::with_capacity(STAIR_QUADS.len());
    mesh.positions = STAIR_VERTS.iter().map(|&[x, y, z]| Vec3::new(x, y, z)).collect();
    for q in STAIR_QUADS {
        mesh.push_indexed(q, [Vec2::default(); 4], 0);
    }
    if inverted {
        mesh.flip_z();
    }
    project_uvs(&mut mesh, faces, atlas);
    mesh
}

/// Rail bars of a fence, as two thin cuboids from the post's edge to the
/// block boundary on +Y. Placement rotates them toward each neighbour.
pub fn fence_rail(faces: &FaceTextures, atlas: &AtlasLayout) -> PrototypeMesh {
    let t = atlas.texel();
    let post_edge = 0.5 - f32::from(ShapeKind::FENCE_POST.side) * t;
    let bars = [(-2.0 * t, 1.0 * t), (4.0 * t, 7.0 * t)];
    let mut mesh = PrototypeMesh::with_capacity(10);
    for (z0, z1) in bars {
        let min = Vec3::new(-t, post_edge, z0);
        let max = Vec3::new(t, 0.5, z1);
        // The face against the post is never visible.
        for face in CubeFace::ALL.into_iter().filter(|f| *f != CubeFace::Front) {
            let corners = face.corners().map(|c| box_corner(face, c, min, max));
            mesh.push_quad(corners, [Vec2::default(); 4], face.index() as u8);
        }
    }
    project_uvs(&mut mesh, faces, atlas);
    mesh
}

/// Assigns every quad the tile of its dominant axis and box-projects its
/// vertices onto it.
fn project_uvs(mesh: &mut PrototypeMesh, faces: &FaceTextures, atlas: &AtlasLayout) {
    let positions = &mesh.positions;
    for q in mesh.quads.iter_mut() {
        let face = CubeFace::dominant(q.normal);
        q.slot = face.index() as u8;
        q.uvs = match faces.slot(face.index()) {
            Some(tile) => q.verts.map(|v| atlas.project(tile, face, positions[v as usize])),
            None => [Vec2::default(); 4],
        };
    }
}
