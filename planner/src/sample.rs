//! Waypoint sampling on the zero level-set of an opaque SDF.
//!
//! The surface has unknown extent, so the sampler first probes a coarse
//! grid to estimate a bounding box, then draws uniform candidates inside
//! it, keeps near-boundary ones, clusters them down to the requested
//! count and refines the spacing. Pathological surfaces fall back to an
//! inscribed circle, so the sampler always returns exactly `count`
//! points for a well-formed oracle.

use log::{debug, info, warn};
use rand::Rng;
use swarmform_structs::config::SamplerConfig;
use swarmform_structs::error::SamplingError;
use swarmform_structs::mission::WaypointSet;
use swarmform_structs::surface::ImplicitSurface;
use swarmform_structs::Point;

use crate::kmeans;
use crate::refine::{self, RefineBox};

/// Batched oracle calls are chunked so one rejected batch only discards
/// its own candidates.
const EVAL_CHUNK: usize = 512;

#[derive(Clone, Copy, Debug)]
struct Bounds {
    min: Point,
    max: Point,
}

impl Bounds {
    fn span(&self, axis: usize) -> f64 {
        match axis {
            0 => self.max.x - self.min.x,
            1 => self.max.y - self.min.y,
            _ => self.max.z - self.min.z,
        }
    }

    fn center(&self) -> Point {
        Point::new(
            0.5 * (self.min.x + self.max.x),
            0.5 * (self.min.y + self.max.y),
            0.5 * (self.min.z + self.max.z),
        )
    }

    fn expanded(&self, margin: f64) -> Bounds {
        Bounds {
            min: Point::new(self.min.x - margin, self.min.y - margin, self.min.z - margin),
            max: Point::new(self.max.x + margin, self.max.y + margin, self.max.z + margin),
        }
    }
}

pub struct SurfaceSampler<'a> {
    surface: &'a dyn ImplicitSurface,
    config: SamplerConfig,
}

impl<'a> SurfaceSampler<'a> {
    pub fn new(surface: &'a dyn ImplicitSurface, config: SamplerConfig) -> Self {
        Self { surface, config }
    }

    /// Sample `count` well-spread points near the surface boundary.
    pub fn sample(&self, count: usize) -> Result<WaypointSet, SamplingError> {
        self.sample_with(count, &mut rand::rng())
    }

    pub fn sample_with<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<WaypointSet, SamplingError> {
        if count == 0 {
            return Err(SamplingError::InvalidCount);
        }

        let (bounds, probed) = self.estimate_bounds();
        if !probed {
            warn!("no boundary hits in probe range; using default sampling box");
        }
        debug!("sampling domain {:?}", bounds);

        let domain = bounds.expanded(self.config.bounds_margin);
        let mut candidates = self.draw_candidates(&domain, rng);
        debug!("{} near-boundary candidates", candidates.len());

        if let Some(thin_axis) = self.thin_axis(&bounds) {
            info!("shape is effectively planar on axis {}; biasing to rim", thin_axis);
            candidates = rim_bias(candidates, &bounds, thin_axis, self.config.rim_fraction);
        }

        if candidates.len() < 2 * count {
            warn!(
                "only {} candidates for {} waypoints; falling back to inscribed circle",
                candidates.len(),
                count
            );
            return Ok(WaypointSet::new(circle_fallback(&bounds, count)));
        }

        let centroids = kmeans::cluster(&candidates, count, rng);

        let refine_domain = RefineBox {
            min: Point::new(domain.min.x - 1.0, domain.min.y - 1.0, domain.min.z - 1.0),
            max: Point::new(domain.max.x + 1.0, domain.max.y + 1.0, domain.max.z + 1.0),
        };
        let refined = refine::refine_spacing(self.surface, &centroids, refine_domain, &self.config);

        Ok(WaypointSet::new(refined))
    }

    /// Probe a coarse grid and box the near-boundary hits. Falls back to
    /// a fixed default box when the surface never comes near zero.
    fn estimate_bounds(&self) -> (Bounds, bool) {
        let steps = self.config.probe_steps.max(2);
        let span = self.config.probe_span;
        let mut grid = Vec::with_capacity(steps * steps * steps);
        for ix in 0..steps {
            for iy in 0..steps {
                for iz in 0..steps {
                    let t = |i: usize| -span + 2.0 * span * i as f64 / (steps - 1) as f64;
                    grid.push(Point::new(t(ix), t(iy), t(iz)));
                }
            }
        }

        let mut hits: Vec<Point> = Vec::new();
        for chunk in grid.chunks(EVAL_CHUNK) {
            match self.surface.eval(chunk) {
                Ok(values) => {
                    for (p, v) in chunk.iter().zip(values) {
                        if v.abs() <= self.config.boundary_tol {
                            hits.push(*p);
                        }
                    }
                }
                Err(e) => debug!("probe batch rejected: {}", e),
            }
        }

        if hits.is_empty() {
            let d = 5.0;
            return (
                Bounds {
                    min: Point::new(-d, -d, -d),
                    max: Point::new(d, d, d),
                },
                false,
            );
        }

        let mut min = hits[0];
        let mut max = hits[0];
        for p in &hits {
            min = Point::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Point::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        (Bounds { min, max }, true)
    }

    fn draw_candidates<R: Rng + ?Sized>(&self, domain: &Bounds, rng: &mut R) -> Vec<Point> {
        let raw: Vec<Point> = (0..self.config.num_candidates)
            .map(|_| {
                Point::new(
                    rng.random_range(domain.min.x..domain.max.x),
                    rng.random_range(domain.min.y..domain.max.y),
                    rng.random_range(domain.min.z..domain.max.z),
                )
            })
            .collect();

        let mut kept = Vec::new();
        for chunk in raw.chunks(EVAL_CHUNK) {
            match self.surface.eval(chunk) {
                Ok(values) => {
                    for (p, v) in chunk.iter().zip(values) {
                        if v.abs() <= self.config.surface_tol {
                            kept.push(*p);
                        }
                    }
                }
                Err(e) => debug!("candidate batch rejected: {}", e),
            }
        }
        kept
    }

    fn thin_axis(&self, bounds: &Bounds) -> Option<usize> {
        (0..3).find(|&axis| bounds.span(axis) <= self.config.thin_axis_span)
    }
}

/// Uniform-volume sampling under-represents thin boundary shells, so for
/// effectively planar shapes keep only candidates near the outer rim of
/// the dominant plane.
fn rim_bias(candidates: Vec<Point>, bounds: &Bounds, thin_axis: usize, fraction: f64) -> Vec<Point> {
    let center = bounds.center();
    let radial = |p: &Point| -> f64 {
        let (a, b) = match thin_axis {
            0 => (p.y - center.y, p.z - center.z),
            1 => (p.x - center.x, p.z - center.z),
            _ => (p.x - center.x, p.y - center.y),
        };
        (a * a + b * b).sqrt()
    };

    let max_r = candidates.iter().map(|p| radial(p)).fold(0.0f64, f64::max);
    if max_r <= 0.0 {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|p| radial(p) >= fraction * max_r)
        .collect()
}

/// Last-resort synthesis: `count` points evenly spaced on the circle
/// inscribed in the bounding box, at mid-height. Sacrifices shape
/// fidelity so the sampler never fails outright.
fn circle_fallback(bounds: &Bounds, count: usize) -> Vec<Point> {
    let center = bounds.center();
    let radius = 0.5 * bounds.span(0).min(bounds.span(1));
    (0..count)
        .map(|k| {
            let angle = 2.0 * std::f64::consts::PI * k as f64 / count as f64;
            Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
                center.z,
            )
        })
        .collect()
}
