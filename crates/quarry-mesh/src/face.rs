use quarry_geom::Vec3;

/// Cube faces in catalog order. Scene space is Z up; a face's `right` and
/// `up` axes describe the texture frame as seen from outside the block,
/// except the bottom face, which is textured as seen from above.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CubeFace {
    Bottom = 0,
    Top = 1,
    Right = 2,
    Front = 3,
    Left = 4,
    Back = 5,
}

/// Named corners of a texture tile.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// Face-frame signs `(s, t)` of this corner.
    #[inline]
    pub fn signs(self) -> (f32, f32) {
        match self {
            Corner::TopLeft => (-1.0, 1.0),
            Corner::TopRight => (1.0, 1.0),
            Corner::BottomRight => (1.0, -1.0),
            Corner::BottomLeft => (-1.0, -1.0),
        }
    }
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::Bottom,
        CubeFace::Top,
        CubeFace::Right,
        CubeFace::Front,
        CubeFace::Left,
        CubeFace::Back,
    ];

    /// Returns the `[0..6)` catalog slot of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Converts a slot back into a face. Out-of-range slots map to `Bottom`.
    #[inline]
    pub fn from_index(i: usize) -> CubeFace {
        match i {
            1 => CubeFace::Top,
            2 => CubeFace::Right,
            3 => CubeFace::Front,
            4 => CubeFace::Left,
            5 => CubeFace::Back,
            _ => CubeFace::Bottom,
        }
    }

    #[inline]
    pub fn normal(self) -> Vec3 {
        match self {
            CubeFace::Bottom => Vec3::new(0.0, 0.0, -1.0),
            CubeFace::Top => Vec3::new(0.0, 0.0, 1.0),
            CubeFace::Right => Vec3::new(1.0, 0.0, 0.0),
            CubeFace::Front => Vec3::new(0.0, -1.0, 0.0),
            CubeFace::Left => Vec3::new(-1.0, 0.0, 0.0),
            CubeFace::Back => Vec3::new(0.0, 1.0, 0.0),
        }
    }

    /// Texture-frame horizontal axis.
    #[inline]
    pub fn right(self) -> Vec3 {
        match self {
            CubeFace::Bottom | CubeFace::Top => Vec3::new(1.0, 0.0, 0.0),
            // Z cross normal
            CubeFace::Right => Vec3::new(0.0, 1.0, 0.0),
            CubeFace::Front => Vec3::new(1.0, 0.0, 0.0),
            CubeFace::Left => Vec3::new(0.0, -1.0, 0.0),
            CubeFace::Back => Vec3::new(-1.0, 0.0, 0.0),
        }
    }

    /// Texture-frame vertical axis.
    #[inline]
    pub fn up(self) -> Vec3 {
        match self {
            CubeFace::Bottom | CubeFace::Top => Vec3::new(0.0, 1.0, 0.0),
            _ => Vec3::UP,
        }
    }

    /// Corner traversal of each face's quad. The same order is used for
    /// vertex positions and texture coordinates, so changing it rotates or
    /// mirrors the texture.
    #[inline]
    pub fn corners(self) -> [Corner; 4] {
        use Corner::*;
        match self {
            CubeFace::Right | CubeFace::Front | CubeFace::Left => {
                [BottomRight, TopRight, TopLeft, BottomLeft]
            }
            CubeFace::Top => [TopRight, TopLeft, BottomLeft, BottomRight],
            CubeFace::Back => [TopLeft, BottomLeft, BottomRight, TopRight],
            CubeFace::Bottom => [BottomLeft, TopLeft, TopRight, BottomRight],
        }
    }

    /// Face whose normal is closest to `n`.
    pub fn dominant(n: Vec3) -> CubeFace {
        let (ax, ay, az) = (n.x.abs(), n.y.abs(), n.z.abs());
        if az >= ax && az >= ay {
            if n.z >= 0.0 { CubeFace::Top } else { CubeFace::Bottom }
        } else if ax >= ay {
            if n.x >= 0.0 { CubeFace::Right } else { CubeFace::Left }
        } else if n.y >= 0.0 {
            CubeFace::Back
        } else {
            CubeFace::Front
        }
    }
}
