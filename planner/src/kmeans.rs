//! Lloyd's k-means over 3D candidate points. Good enough for reducing a
//! few thousand near-surface candidates to the requested waypoint count.

use rand::seq::IndexedRandom;
use rand::Rng;
use swarmform_structs::Point;

const MAX_ITERS: usize = 100;
const CONVERGED_SHIFT: f64 = 1e-6;

/// Cluster `points` into `k` groups and return the centroids.
///
/// Callers guarantee `1 <= k <= points.len()`.
pub fn cluster<R: Rng + ?Sized>(points: &[Point], k: usize, rng: &mut R) -> Vec<Point> {
    assert!(k >= 1 && k <= points.len());

    let mut centroids: Vec<Point> = points.choose_multiple(rng, k).copied().collect();
    let mut membership = vec![0usize; points.len()];

    for _ in 0..MAX_ITERS {
        for (i, p) in points.iter().enumerate() {
            let mut best = 0;
            let mut best_d = f64::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let d = p.dist(centroid);
                if d < best_d {
                    best_d = d;
                    best = c;
                }
            }
            membership[i] = best;
        }

        let mut sums = vec![(0.0f64, 0.0f64, 0.0f64, 0usize); k];
        for (i, p) in points.iter().enumerate() {
            let s = &mut sums[membership[i]];
            s.0 += p.x;
            s.1 += p.y;
            s.2 += p.z;
            s.3 += 1;
        }

        let mut shift: f64 = 0.0;
        for (c, (sx, sy, sz, n)) in sums.into_iter().enumerate() {
            let next = if n == 0 {
                // Empty cluster: reseed from a random candidate.
                *points.choose(rng).unwrap_or(&centroids[c])
            } else {
                Point::new(sx / n as f64, sy / n as f64, sz / n as f64)
            };
            shift = shift.max(centroids[c].dist(&next));
            centroids[c] = next;
        }

        if shift < CONVERGED_SHIFT {
            break;
        }
    }

    centroids
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn separates_two_blobs() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut points = Vec::new();
        for i in 0..50 {
            let j = (i % 10) as f64 * 0.01;
            points.push(Point::new(j, j, 0.0));
            points.push(Point::new(10.0 + j, 10.0 + j, 0.0));
        }
        let mut centroids = cluster(&points, 2, &mut rng);
        centroids.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap());
        assert!(centroids[0].x < 1.0);
        assert!(centroids[1].x > 9.0);
    }

    #[test]
    fn k_equals_n_returns_the_points() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        let centroids = cluster(&points, 3, &mut rng);
        assert_eq!(centroids.len(), 3);
        for p in &points {
            assert!(centroids.iter().any(|c| c.eq_xyz(p)));
        }
    }
}
