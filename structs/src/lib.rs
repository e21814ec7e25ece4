use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config;
pub mod error;
pub mod mission;
pub mod surface;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Point {
        Point { x, y, z }
    }

    pub fn dist_xy(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn dist(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn eq_xyz(&self, other: &Point) -> bool {
        self.dist(other) < 1e-3
    }

    pub fn eq_xy(&self, other: &Point) -> bool {
        self.dist_xy(other) < 1e-3
    }

    /// Position after following `vel` for `dt` seconds.
    pub fn stepped(&self, vel: &Vec3, dt: f64) -> Point {
        Point {
            x: self.x + vel.x * dt,
            y: self.y + vel.y * dt,
            z: self.z + vel.z * dt,
        }
    }
}

/// Velocity command in world (NED) coordinates.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Vec3 {
        Vec3 { x, y, z }
    }

    /// Vector pointing from `from` to `to`.
    pub fn between(from: &Point, to: &Point) -> Vec3 {
        Vec3 {
            x: to.x - from.x,
            y: to.y - from.y,
            z: to.z - from.z,
        }
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn scaled(&self, k: f64) -> Vec3 {
        Vec3 {
            x: self.x * k,
            y: self.y * k,
            z: self.z * k,
        }
    }

    /// Same direction, magnitude limited to `max`.
    pub fn clamp_norm(&self, max: f64) -> Vec3 {
        let n = self.norm();
        if n > max && n > 0.0 {
            self.scaled(max / n)
        } else {
            *self
        }
    }
}

impl std::ops::Add for Vec3 {
    type Output = Vec3;
    fn add(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_distances() {
        let a = Point::new(0.0, 0.0, 0.0);
        let b = Point::new(3.0, 4.0, 12.0);
        assert!((a.dist_xy(&b) - 5.0).abs() < 1e-12);
        assert!((a.dist(&b) - 13.0).abs() < 1e-12);
        assert!(a.eq_xyz(&Point::new(0.0, 0.0, 1e-4)));
    }

    #[test]
    fn clamp_norm_limits_magnitude() {
        let v = Vec3::new(3.0, 0.0, 4.0);
        let c = v.clamp_norm(1.0);
        assert!((c.norm() - 1.0).abs() < 1e-12);
        // Direction preserved.
        assert!((c.x / c.z - v.x / v.z).abs() < 1e-12);
        assert_eq!(v.clamp_norm(10.0), v);
        assert_eq!(Vec3::ZERO.clamp_norm(1.0), Vec3::ZERO);
    }
}
