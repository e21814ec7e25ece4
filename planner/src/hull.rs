//! Convex hull volume for small point sets.
//!
//! The spacing refinement rewards hull volume to spread waypoints out.
//! Waypoint counts are fleet-sized, so a brute-force face enumeration is
//! fine: every triple that has all remaining points on one side of its
//! plane spans a hull face, and face pyramids against the centroid sum to
//! the hull volume. A face carrying more than three coplanar points is
//! counted once, with the in-plane polygon area of all its points.
//! Degenerate (collinear/coplanar) sets report zero.

use swarmform_structs::Point;

const PLANE_EPS: f64 = 1e-9;

pub fn convex_hull_volume(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 4 {
        return 0.0;
    }

    let centroid = Point::new(
        points.iter().map(|p| p.x).sum::<f64>() / n as f64,
        points.iter().map(|p| p.y).sum::<f64>() / n as f64,
        points.iter().map(|p| p.z).sum::<f64>() / n as f64,
    );

    let mut volume = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let (nx, ny, nz) = triangle_normal(&points[i], &points[j], &points[k]);
                let norm = (nx * nx + ny * ny + nz * nz).sqrt();
                if norm < PLANE_EPS {
                    continue;
                }

                let mut above = false;
                let mut below = false;
                let mut face: Vec<usize> = Vec::new();
                for (m, p) in points.iter().enumerate() {
                    let d = nx * (p.x - points[i].x)
                        + ny * (p.y - points[i].y)
                        + nz * (p.z - points[i].z);
                    if d > PLANE_EPS * norm {
                        above = true;
                    } else if d < -PLANE_EPS * norm {
                        below = true;
                    } else {
                        face.push(m);
                    }
                    if above && below {
                        break;
                    }
                }

                if above && below {
                    continue;
                }

                // Count the face plane only at its lowest-index spanning
                // triple, so extra coplanar points do not add pyramids twice.
                if (i, j, k) != canonical_triple(points, &face) {
                    continue;
                }

                let h = (nx * (centroid.x - points[i].x)
                    + ny * (centroid.y - points[i].y)
                    + nz * (centroid.z - points[i].z))
                    .abs()
                    / norm;
                let area = face_area(points, &face, (nx / norm, ny / norm, nz / norm));
                volume += area * h / 3.0;
            }
        }
    }

    volume
}

/// The lexicographically first non-collinear triple among the coplanar
/// indices. `face` holds at least one spanning triple by construction.
fn canonical_triple(points: &[Point], face: &[usize]) -> (usize, usize, usize) {
    let a = face[0];
    let b = face[1];
    for &c in &face[2..] {
        let (nx, ny, nz) = triangle_normal(&points[a], &points[b], &points[c]);
        if (nx * nx + ny * ny + nz * nz).sqrt() >= PLANE_EPS {
            return (a, b, c);
        }
    }
    (a, b, face[2])
}

/// Area of the convex polygon spanned by `face` within its plane.
fn face_area(points: &[Point], face: &[usize], unit_normal: (f64, f64, f64)) -> f64 {
    let (nx, ny, nz) = unit_normal;
    // In-plane basis: cross the normal with its smallest axis.
    let axis = if nx.abs() <= ny.abs() && nx.abs() <= nz.abs() {
        (1.0, 0.0, 0.0)
    } else if ny.abs() <= nz.abs() {
        (0.0, 1.0, 0.0)
    } else {
        (0.0, 0.0, 1.0)
    };
    let (ux, uy, uz) = (
        ny * axis.2 - nz * axis.1,
        nz * axis.0 - nx * axis.2,
        nx * axis.1 - ny * axis.0,
    );
    let ulen = (ux * ux + uy * uy + uz * uz).sqrt();
    let (ux, uy, uz) = (ux / ulen, uy / ulen, uz / ulen);
    let (vx, vy, vz) = (ny * uz - nz * uy, nz * ux - nx * uz, nx * uy - ny * ux);

    let origin = points[face[0]];
    let flat: Vec<(f64, f64)> = face
        .iter()
        .map(|&m| {
            let (dx, dy, dz) = (
                points[m].x - origin.x,
                points[m].y - origin.y,
                points[m].z - origin.z,
            );
            (dx * ux + dy * uy + dz * uz, dx * vx + dy * vy + dz * vz)
        })
        .collect();
    convex_polygon_area(flat)
}

/// Shoelace area over the 2d convex hull (monotone chain) of `pts`.
fn convex_polygon_area(mut pts: Vec<(f64, f64)>) -> f64 {
    pts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if pts.len() < 3 {
        return 0.0;
    }
    let turn = |o: (f64, f64), a: (f64, f64), b: (f64, f64)| {
        (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
    };
    let mut lower: Vec<(f64, f64)> = Vec::new();
    for &p in &pts {
        while lower.len() >= 2 && turn(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<(f64, f64)> = Vec::new();
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && turn(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }
    // Each chain ends where the other starts.
    lower.pop();
    upper.pop();
    let mut hull = lower;
    hull.extend(upper);
    if hull.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for w in 0..hull.len() {
        let a = hull[w];
        let b = hull[(w + 1) % hull.len()];
        twice += a.0 * b.1 - a.1 * b.0;
    }
    twice.abs() / 2.0
}

fn triangle_normal(a: &Point, b: &Point, c: &Point) -> (f64, f64, f64) {
    let ux = b.x - a.x;
    let uy = b.y - a.y;
    let uz = b.z - a.z;
    let vx = c.x - a.x;
    let vy = c.y - a.y;
    let vz = c.z - a.z;
    (uy * vz - uz * vy, uz * vx - ux * vz, ux * vy - uy * vx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tetrahedron_volume() {
        // Unit right tetrahedron: volume 1/6.
        let pts = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
        ];
        assert!((convex_hull_volume(&pts) - 1.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn box_faces_are_not_double_counted() {
        // Eight corners of a 2x2x2 box. Each quad face holds four
        // coplanar triples and must still contribute a single pyramid.
        let mut pts = Vec::new();
        for &x in &[-1.0, 1.0] {
            for &y in &[-1.0, 1.0] {
                for &z in &[-1.0, 1.0] {
                    pts.push(Point::new(x, y, z));
                }
            }
        }
        assert!((convex_hull_volume(&pts) - 8.0).abs() < 1e-9);

        // A point sitting inside a face plane changes nothing.
        pts.push(Point::new(0.0, 0.0, 1.0));
        assert!((convex_hull_volume(&pts) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn interior_points_do_not_change_volume() {
        let mut pts = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(2.0, 0.0, 0.0),
            Point::new(0.0, 2.0, 0.0),
            Point::new(0.0, 0.0, 2.0),
        ];
        let v = convex_hull_volume(&pts);
        pts.push(Point::new(0.2, 0.2, 0.2));
        assert!((convex_hull_volume(&pts) - v).abs() < 1e-9);
    }

    #[test]
    fn degenerate_sets_are_zero() {
        let plane = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
        ];
        assert!(convex_hull_volume(&plane).abs() < 1e-9);
        assert_eq!(convex_hull_volume(&plane[..3]), 0.0);
    }
}
