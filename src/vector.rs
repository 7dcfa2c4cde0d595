// vector.rs — 3-D point/vector value type shared by every structure in the crate.
//
// Axes: X = left→right, Y = bottom→top (up is positive), Z = toward the viewer.
// Linking and overlap tests only ever look at X/Y.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self { Self { x, y, z } }

    pub fn dot(self, o: Vec3) -> f32 { self.x * o.x + self.y * o.y + self.z * o.z }

    pub fn cross(self, o: Vec3) -> Vec3 {
        Vec3::new(
            self.y * o.z - self.z * o.y,
            self.z * o.x - self.x * o.z,
            self.x * o.y - self.y * o.x,
        )
    }

    pub fn length(self) -> f32 { self.dot(self).sqrt() }

    pub fn distance(self, o: Vec3) -> f32 { (self - o).length() }

    /// Unit vector in the same direction, or `None` for the zero vector.
    pub fn normalize(self) -> Option<Vec3> {
        let len = self.length();
        (len > 0.0).then(|| self * (1.0 / len))
    }

    /// Same direction rescaled to `length`; `None` when there is no direction to keep.
    pub fn with_length(self, length: f32) -> Option<Vec3> {
        self.normalize().map(|u| u * length)
    }

    /// `self * (1 - t) + o * t`
    pub fn lerp(self, o: Vec3, t: f32) -> Vec3 { self + (o - self) * t }
}

/// Arithmetic mean of `points`; the origin for an empty slice.
pub fn centroid(points: &[Vec3]) -> Vec3 {
    if points.is_empty() { return Vec3::ZERO; }
    let sum = points.iter().fold(Vec3::ZERO, |acc, &p| acc + p);
    sum * (1.0 / points.len() as f32)
}

/// Point at exactly `length` from `anchor` in the direction of `target`.
///
/// Returns `None` when `target` coincides with `anchor`: there is no direction to
/// preserve, and callers leave that link alone until a later move gives it one.
pub fn constrain(anchor: Vec3, target: Vec3, length: f32) -> Option<Vec3> {
    (target - anchor).with_length(length).map(|d| anchor + d)
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self { Self { x, y, z } }
}

impl From<Vec3> for [f32; 3] {
    fn from(v: Vec3) -> Self { [v.x, v.y, v.z] }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, o: Vec3) -> Vec3 { Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z) }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, o: Vec3) -> Vec3 { Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z) }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 { Vec3::new(self.x * s, self.y * s, self.z * s) }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, o: Vec3) { *self = *self + o; }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, o: Vec3) { *self = *self - o; }
}
