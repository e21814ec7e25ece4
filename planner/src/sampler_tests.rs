use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use swarmform_structs::config::SamplerConfig;
use swarmform_structs::error::SamplingError;
use swarmform_structs::surface::{FnSurface, ImplicitSurface, Ring, Sphere};
use swarmform_structs::Point;

use crate::min_pairwise_dist;
use crate::sample::SurfaceSampler;

#[test]
fn sphere_waypoints_lie_on_the_surface() {
    let _ = env_logger::try_init();
    let surface = Sphere { radius: 2.0 };
    let sampler = SurfaceSampler::new(&surface, SamplerConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let waypoints = sampler.sample_with(10, &mut rng).unwrap();
    assert_eq!(waypoints.len(), 10);
    for p in waypoints.iter() {
        let f = surface.eval_one(p).unwrap();
        assert!(f.abs() <= 0.1, "waypoint {:?} has |f| = {}", p, f.abs());
    }
    // Well spread: no two coincide.
    assert!(min_pairwise_dist(&waypoints.points) > 0.2);
}

#[test]
fn single_waypoint_still_respects_the_surface() {
    let _ = env_logger::try_init();
    let surface = Sphere { radius: 2.0 };
    let sampler = SurfaceSampler::new(&surface, SamplerConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let waypoints = sampler.sample_with(1, &mut rng).unwrap();
    assert_eq!(waypoints.len(), 1);
    let f = surface.eval_one(&waypoints.points[0]).unwrap();
    assert!(f.abs() <= 0.1, "|f| = {}", f.abs());
}

#[test]
fn zero_count_is_rejected() {
    let surface = Sphere { radius: 2.0 };
    let sampler = SurfaceSampler::new(&surface, SamplerConfig::default());
    assert!(matches!(sampler.sample(0), Err(SamplingError::InvalidCount)));
}

#[test]
fn empty_surface_falls_back_to_an_even_circle() {
    let _ = env_logger::try_init();
    // Never near zero anywhere: triggers the default box and the
    // inscribed-circle synthesis.
    let surface = FnSurface(|_: &Point| 10.0);
    let sampler = SurfaceSampler::new(&surface, SamplerConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let count = 8;
    let waypoints = sampler.sample_with(count, &mut rng).unwrap();
    assert_eq!(waypoints.len(), count);

    // Default box is [-5, 5] per axis: inscribed circle of radius 5 at z 0.
    let mut angles: Vec<f64> = waypoints
        .iter()
        .map(|p| {
            assert!((p.dist_xy(&Point::default()) - 5.0).abs() < 1e-9);
            assert!(p.z.abs() < 1e-9);
            p.y.atan2(p.x)
        })
        .collect();
    angles.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let expected = 2.0 * std::f64::consts::PI / count as f64;
    for w in angles.windows(2) {
        assert!((w[1] - w[0] - expected).abs() < 1e-9);
    }
}

#[test]
fn thin_ring_keeps_points_on_the_rim() {
    let _ = env_logger::try_init();
    // A flat circle of radius 3: its probe bounding box is degenerate in
    // z, so the planar rim-bias path runs before clustering.
    let surface = Ring { radius: 3.0, tube: 0.05 };
    let sampler = SurfaceSampler::new(&surface, SamplerConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let count = 6;
    let waypoints = sampler.sample_with(count, &mut rng).unwrap();
    assert_eq!(waypoints.len(), count);
    for p in waypoints.iter() {
        let r = p.dist_xy(&Point::default());
        assert!((2.7..=3.3).contains(&r), "radius {} off the rim", r);
        assert!(p.z.abs() <= 0.3, "z {} off the plane", p.z);
    }
    assert!(min_pairwise_dist(&waypoints.points) > 0.4);
}

#[test]
fn erroring_oracle_batches_only_lose_their_candidates() {
    let _ = env_logger::try_init();
    // Rejects any batch containing a point in the x > 0 half-space; the
    // sampler should still produce waypoints from what remains, or fall
    // back, but never panic or return the wrong count.
    struct HalfBroken;
    impl ImplicitSurface for HalfBroken {
        fn eval(
            &self,
            points: &[Point],
        ) -> Result<Vec<f64>, swarmform_structs::error::SurfaceError> {
            if points.iter().any(|p| p.x > 0.0) {
                return Err(swarmform_structs::error::SurfaceError::Eval(
                    "half-space rejected".into(),
                ));
            }
            Ok(points
                .iter()
                .map(|p| (p.x * p.x + p.y * p.y + p.z * p.z).sqrt() - 2.0)
                .collect())
        }
    }

    let surface = HalfBroken;
    let sampler = SurfaceSampler::new(&surface, SamplerConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let waypoints = sampler.sample_with(4, &mut rng).unwrap();
    assert_eq!(waypoints.len(), 4);
}

#[test]
fn thin_slab_waypoints_stay_near_the_boundary() {
    let _ = env_logger::try_init();
    let slab = swarmform_structs::surface::Slab { radius: 3.0, half_thickness: 0.1 };
    let sampler = SurfaceSampler::new(&slab, SamplerConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let waypoints = sampler.sample_with(5, &mut rng).unwrap();
    assert_eq!(waypoints.len(), 5);
    for p in waypoints.iter() {
        let f = slab.eval_one(p).unwrap();
        assert!(f.abs() <= 0.1, "waypoint {:?} has |f| = {}", p, f.abs());
    }
}
