//! Minimal geometry types shared by the importer crates (scene space, Z up).
#![forbid(unsafe_code)]

use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const UP: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(self, rhs: Vec3) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn cross(self, rhs: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    #[inline]
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len > 0.0 { self / len } else { self }
    }

    /// Rotates about +Z by `turns` counter-clockwise quarter turns.
    #[inline]
    pub fn rotated_z(self, turns: u8) -> Vec3 {
        match turns & 3 {
            0 => self,
            1 => Vec3::new(-self.y, self.x, self.z),
            2 => Vec3::new(-self.x, -self.y, self.z),
            _ => Vec3::new(self.y, -self.x, self.z),
        }
    }

    /// Mirrors the point through the XY plane.
    #[inline]
    pub fn flipped_z(self) -> Vec3 {
        Vec3::new(self.x, self.y, -self.z)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vec3) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn div(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

/// Texture-space coordinate, V increasing upward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point; `None` for an empty input.
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Aabb> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let mut bb = Aabb::new(first, first);
        for p in it {
            bb.min = Vec3::new(bb.min.x.min(p.x), bb.min.y.min(p.y), bb.min.z.min(p.z));
            bb.max = Vec3::new(bb.max.x.max(p.x), bb.max.y.max(p.y), bb.max.z.max(p.z));
        }
        Some(bb)
    }

    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

/// World transform of one prototype instance: a quarter-turn rotation about
/// +Z applied in prototype space, then a translation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Placement {
    pub translation: Vec3,
    pub quarter_turns: u8,
}

impl Placement {
    #[inline]
    pub const fn at(translation: Vec3) -> Self {
        Self {
            translation,
            quarter_turns: 0,
        }
    }

    #[inline]
    pub const fn rotated(translation: Vec3, quarter_turns: u8) -> Self {
        Self {
            translation,
            quarter_turns: quarter_turns & 3,
        }
    }

    #[inline]
    pub fn apply(&self, p: Vec3) -> Vec3 {
        p.rotated_z(self.quarter_turns) + self.translation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn four_quarter_turns_is_identity(x in -100i16..100, y in -100i16..100, z in -100i16..100) {
            let v = Vec3::new(x as f32, y as f32, z as f32);
            let mut r = v;
            for _ in 0..4 {
                r = r.rotated_z(1);
            }
            prop_assert_eq!(r, v);
        }

        #[test]
        fn rotation_keeps_length(v in any::<Vec3>(), t in 0u8..4) {
            prop_assume!(v.x.is_finite() && v.y.is_finite() && v.z.is_finite());
            prop_assume!(v.x.abs() < 1e6 && v.y.abs() < 1e6 && v.z.abs() < 1e6);
            let a = v.length();
            let b = v.rotated_z(t).length();
            prop_assert!((a - b).abs() <= 1e-3 * a.max(1.0));
        }
    }

    #[test]
    fn quarter_turn_maps_y_to_negative_x() {
        assert_eq!(Vec3::new(0.0, 1.0, 0.0).rotated_z(1), Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(Vec3::new(1.0, 0.0, 0.0).rotated_z(3), Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn placement_rotates_before_translating() {
        let p = Placement::rotated(Vec3::new(10.0, 0.0, 5.0), 2);
        assert_eq!(p.apply(Vec3::new(0.5, 0.25, 0.0)), Vec3::new(9.5, -0.25, 5.0));
        assert_eq!(Placement::rotated(Vec3::ZERO, 6).quarter_turns, 2);
    }

    #[test]
    fn aabb_from_points_bounds_everything() {
        let pts = [
            Vec3::new(-0.5, 0.25, 1.0),
            Vec3::new(0.5, -0.25, -1.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let bb = Aabb::from_points(pts).unwrap();
        assert_eq!(bb.min, Vec3::new(-0.5, -0.25, -1.0));
        assert_eq!(bb.max, Vec3::new(0.5, 0.25, 1.0));
        assert!(pts.iter().all(|p| bb.contains(*p)));
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }
}
