use swarmform_structs::Point;

pub mod assign;
pub mod hull;
pub mod kmeans;
pub mod refine;
pub mod sample;

#[cfg(test)]
mod sampler_tests;

/// Smallest pairwise distance in a point set; infinity for fewer than two.
pub fn min_pairwise_dist(points: &[Point]) -> f64 {
    let mut best = f64::INFINITY;
    for (i, a) in points.iter().enumerate() {
        for b in points.iter().skip(i + 1) {
            best = best.min(a.dist(b));
        }
    }
    best
}
