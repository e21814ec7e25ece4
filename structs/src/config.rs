use serde::Deserialize;
use std::path::PathBuf;

/// Gains for the potential-field controller. Not mutated mid-tick.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ControllerParams {
    /// Attraction gain toward the assigned goal.
    pub p_cohesion: f64,
    /// Repulsion gain away from neighbors.
    pub p_separation: f64,
    /// Magnitude clamp applied to cohesion and to the combined command.
    pub max_vel: f64,
    /// Neighbors closer than this exert repulsion.
    pub min_dist: f64,
}

impl Default for ControllerParams {
    fn default() -> Self {
        Self {
            p_cohesion: 1.0,
            p_separation: 1.0,
            max_vel: 1.0,
            min_dist: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplerConfig {
    /// Half-span of the coarse probe grid, per axis.
    pub probe_span: f64,
    /// Probe grid resolution per axis.
    pub probe_steps: usize,
    /// Probe points with |f| within this are treated as boundary hits.
    pub boundary_tol: f64,
    /// Random candidates with |f| above this are discarded.
    pub surface_tol: f64,
    /// Number of uniform random candidates drawn inside the domain.
    pub num_candidates: usize,
    /// Fixed expansion of the estimated bounding box.
    pub bounds_margin: f64,
    /// An axis span at or below this marks the shape as effectively planar.
    pub thin_axis_span: f64,
    /// Planar shapes keep only candidates at this fraction of the max radius.
    pub rim_fraction: f64,
    /// Spacing refinement budget: coordinate sweeps of the pattern search.
    pub refine_max_sweeps: usize,
    pub refine_initial_step: f64,
    pub refine_min_step: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            probe_span: 10.0,
            probe_steps: 21,
            boundary_tol: 0.05,
            surface_tol: 0.1,
            num_candidates: 10_000,
            bounds_margin: 1.0,
            thin_axis_span: 0.5,
            rim_fraction: 0.75,
            refine_max_sweeps: 200,
            refine_initial_step: 0.5,
            refine_min_step: 1e-3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MissionConfig {
    /// Control period of the navigation loop, seconds.
    pub control_period: f64,
    /// Period of the hover-maintenance loop, seconds.
    pub hover_period: f64,
    /// Distance to the assigned goal counted as arrived, meters.
    pub arrival_threshold: f64,
    /// Hover re-snaps to the goal when drift exceeds this, meters.
    pub drift_threshold: f64,
    /// Mission-time budget for the navigation phase, seconds.
    pub nav_timeout: f64,
    /// Takeoff target altitude above ground, meters.
    pub takeoff_altitude: f64,
    /// Meters per shape unit applied to sampled waypoints.
    pub shape_scale: f64,
    /// Shape center altitude, meters (NED: applied as a negative z offset).
    pub flight_altitude: f64,
    /// Where mission records are written; None disables persistence.
    pub output_dir: Option<PathBuf>,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            control_period: 0.5,
            hover_period: 0.1,
            arrival_threshold: 0.5,
            drift_threshold: 0.5,
            nav_timeout: 120.0,
            takeoff_altitude: 5.0,
            shape_scale: 5.0,
            flight_altitude: 5.0,
            output_dir: None,
        }
    }
}
