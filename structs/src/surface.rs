use crate::error::SurfaceError;
use crate::Point;

/// Opaque signed-distance field supplied by an external shape oracle.
/// Negative inside, approximately zero on the boundary, positive outside.
///
/// Evaluation is batched because the sampler calls it many times per
/// optimization step. An `Err` marks the whole batch as unusable; the
/// sampler rejects those candidates rather than aborting.
pub trait ImplicitSurface {
    fn eval(&self, points: &[Point]) -> Result<Vec<f64>, SurfaceError>;

    fn eval_one(&self, point: &Point) -> Result<f64, SurfaceError> {
        Ok(self.eval(std::slice::from_ref(point))?[0])
    }
}

/// Adapter for oracle-produced closures.
pub struct FnSurface<F: Fn(&Point) -> f64>(pub F);

impl<F: Fn(&Point) -> f64> ImplicitSurface for FnSurface<F> {
    fn eval(&self, points: &[Point]) -> Result<Vec<f64>, SurfaceError> {
        Ok(points.iter().map(&self.0).collect())
    }
}

/// Sphere centered at the origin.
pub struct Sphere {
    pub radius: f64,
}

impl ImplicitSurface for Sphere {
    fn eval(&self, points: &[Point]) -> Result<Vec<f64>, SurfaceError> {
        Ok(points
            .iter()
            .map(|p| (p.x * p.x + p.y * p.y + p.z * p.z).sqrt() - self.radius)
            .collect())
    }
}

/// Axis-aligned box centered at the origin.
pub struct AxisBox {
    pub half_extents: Point,
}

impl ImplicitSurface for AxisBox {
    fn eval(&self, points: &[Point]) -> Result<Vec<f64>, SurfaceError> {
        Ok(points
            .iter()
            .map(|p| {
                let qx = p.x.abs() - self.half_extents.x;
                let qy = p.y.abs() - self.half_extents.y;
                let qz = p.z.abs() - self.half_extents.z;
                let ox = qx.max(0.0);
                let oy = qy.max(0.0);
                let oz = qz.max(0.0);
                let outside = (ox * ox + oy * oy + oz * oz).sqrt();
                let inside = qx.max(qy).max(qz).min(0.0);
                outside + inside
            })
            .collect())
    }
}

/// Thin horizontal disk: radius in the XY plane, small half-thickness in z.
pub struct Slab {
    pub radius: f64,
    pub half_thickness: f64,
}

impl ImplicitSurface for Slab {
    fn eval(&self, points: &[Point]) -> Result<Vec<f64>, SurfaceError> {
        Ok(points
            .iter()
            .map(|p| {
                let r = (p.x * p.x + p.y * p.y).sqrt() - self.radius;
                let h = p.z.abs() - self.half_thickness;
                r.max(h)
            })
            .collect())
    }
}

/// Circular ring of the given radius in the XY plane with a thin tube.
pub struct Ring {
    pub radius: f64,
    pub tube: f64,
}

impl ImplicitSurface for Ring {
    fn eval(&self, points: &[Point]) -> Result<Vec<f64>, SurfaceError> {
        Ok(points
            .iter()
            .map(|p| {
                let r = (p.x * p.x + p.y * p.y).sqrt() - self.radius;
                (r * r + p.z * p.z).sqrt() - self.tube
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_signs() {
        let s = Sphere { radius: 2.0 };
        assert!(s.eval_one(&Point::new(0.0, 0.0, 0.0)).unwrap() < 0.0);
        assert!(s.eval_one(&Point::new(2.0, 0.0, 0.0)).unwrap().abs() < 1e-12);
        assert!(s.eval_one(&Point::new(3.0, 0.0, 0.0)).unwrap() > 0.0);
    }

    #[test]
    fn box_distance_outside() {
        let b = AxisBox { half_extents: Point::new(1.0, 1.0, 1.0) };
        // 1 unit past a face.
        assert!((b.eval_one(&Point::new(2.0, 0.0, 0.0)).unwrap() - 1.0).abs() < 1e-12);
        // Center is one unit inside.
        assert!((b.eval_one(&Point::new(0.0, 0.0, 0.0)).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn slab_is_thin_in_z() {
        let s = Slab { radius: 3.0, half_thickness: 0.1 };
        assert!(s.eval_one(&Point::new(3.0, 0.0, 0.0)).unwrap().abs() < 1e-12);
        assert!(s.eval_one(&Point::new(0.0, 0.0, 1.0)).unwrap() > 0.5);
    }
}
