//! Joint spacing refinement of provisional waypoints.
//!
//! Minimizes `100 * sum(|f|) - 0.5 * sum(min pairwise dist) - 0.5 * hull
//! volume` over all waypoints jointly. The heavy surface weight keeps
//! "stay on the zero level-set" dominant; the distance and volume terms
//! push for even coverage. The SDF is opaque, so the minimizer is a
//! box-constrained coordinate pattern search: try each coordinate up and
//! down by the current step, keep improvements, halve the step when a
//! full sweep stalls. Monotone descent, so the result never costs more
//! than the input centroids.

use log::{debug, trace};
use swarmform_structs::config::SamplerConfig;
use swarmform_structs::surface::ImplicitSurface;
use swarmform_structs::Point;

use crate::hull::convex_hull_volume;

const SDF_WEIGHT: f64 = 100.0;
const SPREAD_WEIGHT: f64 = 0.5;
/// Cost assigned when the oracle rejects a batch; keeps the search away.
const EVAL_PENALTY: f64 = 1e6;

/// Axis-aligned refinement domain; coordinates are clamped per axis.
#[derive(Clone, Copy, Debug)]
pub struct RefineBox {
    pub min: Point,
    pub max: Point,
}

impl RefineBox {
    fn clamp(&self, axis: usize, v: f64) -> f64 {
        let (lo, hi) = match axis {
            0 => (self.min.x, self.max.x),
            1 => (self.min.y, self.max.y),
            _ => (self.min.z, self.max.z),
        };
        v.clamp(lo, hi)
    }
}

pub fn distribution_cost(surface: &dyn ImplicitSurface, points: &[Point]) -> f64 {
    let sdf_cost = match surface.eval(points) {
        Ok(values) => values.iter().map(|v| v.abs()).sum::<f64>(),
        Err(_) => EVAL_PENALTY,
    };

    let mut dist_cost = 0.0;
    if points.len() > 1 {
        for (i, a) in points.iter().enumerate() {
            let nearest = points
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, b)| a.dist(b))
                .fold(f64::INFINITY, f64::min);
            dist_cost += nearest;
        }
    }

    let volume = convex_hull_volume(points);

    SDF_WEIGHT * sdf_cost - SPREAD_WEIGHT * dist_cost - SPREAD_WEIGHT * volume
}

/// Refine `centroids` in place-order and return the improved set, or the
/// originals when the search cannot improve on them.
pub fn refine_spacing(
    surface: &dyn ImplicitSurface,
    centroids: &[Point],
    domain: RefineBox,
    config: &SamplerConfig,
) -> Vec<Point> {
    let mut points = centroids.to_vec();
    let initial_cost = distribution_cost(surface, &points);
    let mut cost = initial_cost;
    let mut step = config.refine_initial_step;

    let mut sweeps = 0;
    while step >= config.refine_min_step && sweeps < config.refine_max_sweeps {
        sweeps += 1;
        let mut improved = false;

        for i in 0..points.len() {
            for axis in 0..3 {
                for dir in [step, -step] {
                    let original = points[i];
                    let moved = match axis {
                        0 => Point::new(domain.clamp(0, original.x + dir), original.y, original.z),
                        1 => Point::new(original.x, domain.clamp(1, original.y + dir), original.z),
                        _ => Point::new(original.x, original.y, domain.clamp(2, original.z + dir)),
                    };
                    if moved == original {
                        continue;
                    }
                    points[i] = moved;
                    let trial = distribution_cost(surface, &points);
                    if trial < cost {
                        cost = trial;
                        improved = true;
                    } else {
                        points[i] = original;
                    }
                }
            }
        }

        if !improved {
            step *= 0.5;
            trace!("refine: step shrunk to {:.4} at sweep {}", step, sweeps);
        }
    }

    debug!(
        "refine: cost {:.3} -> {:.3} after {} sweeps",
        initial_cost, cost, sweeps
    );

    // Descent is monotone, but guard against a pathological cost anyway.
    if cost <= initial_cost {
        points
    } else {
        centroids.to_vec()
    }
}
