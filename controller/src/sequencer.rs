use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use swarmform_planner::assign;
use swarmform_planner::sample::SurfaceSampler;
use swarmform_structs::backend::{ActuationHandle, VehicleBackend};
use swarmform_structs::config::{MissionConfig, SamplerConfig};
use swarmform_structs::error::MissionError;
use swarmform_structs::mission::{Assignment, MissionPhase, WaypointSet};
use swarmform_structs::surface::ImplicitSurface;
use swarmform_structs::{Point, Vec3};

use crate::apf::PotentialFieldController;
use crate::artifact;
use crate::mission::PreparedMission;

/// Cooperative cancellation flag, checked once per loop iteration. Clone it
/// out of the sequencer and trip it from a signal handler or another thread.
#[derive(Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> StopHandle {
        StopHandle(Arc::new(AtomicBool::new(false)))
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How the navigation loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavOutcome {
    Arrived,
    TimedOut,
    Stopped,
}

/// Drives one mission through its phases against a vehicle transport.
///
/// Single agent failures deactivate that agent and the mission continues;
/// losing the whole fleet aborts with a best-effort land and disarm.
pub struct MissionSequencer<'a> {
    backend: &'a mut dyn VehicleBackend,
    config: MissionConfig,
    phase: MissionPhase,
    stop: StopHandle,
    apf: PotentialFieldController,
    active: Vec<bool>,
    last_known: Vec<Point>,
    prepared: Option<PreparedMission>,
    assignment: Option<Assignment>,
    goals: Vec<Point>,
}

impl<'a> MissionSequencer<'a> {
    pub fn new(
        backend: &'a mut dyn VehicleBackend,
        config: MissionConfig,
        params: swarmform_structs::config::ControllerParams,
    ) -> Self {
        let n = backend.agent_count();
        Self {
            backend,
            config,
            phase: MissionPhase::Idle,
            stop: StopHandle::new(),
            apf: PotentialFieldController::new(params, n),
            active: vec![true; n],
            last_known: vec![Point::default(); n],
            prepared: None,
            assignment: None,
            goals: Vec::new(),
        }
    }

    pub fn phase(&self) -> MissionPhase {
        self.phase
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn active_agents(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    /// The goal mapping computed during `execute`, once available.
    pub fn assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }

    /// Samples `count` waypoints from the shape and stores them for
    /// `execute`. One waypoint per agent is the intended use.
    pub fn prepare(
        &mut self,
        surface: &dyn ImplicitSurface,
        description: &str,
        count: usize,
    ) -> Result<(), MissionError> {
        if self.phase != MissionPhase::Idle {
            return Err(MissionError::BadPhase(self.phase));
        }
        self.phase = MissionPhase::Preparing;
        let sampler = SurfaceSampler::new(surface, SamplerConfig::default());
        let raw = sampler.sample(count)?;
        self.store_prepared(description, raw);
        Ok(())
    }

    /// Accepts precomputed unit-frame waypoints instead of sampling.
    pub fn prepare_points(
        &mut self,
        description: &str,
        raw: WaypointSet,
    ) -> Result<(), MissionError> {
        if self.phase != MissionPhase::Idle {
            return Err(MissionError::BadPhase(self.phase));
        }
        self.phase = MissionPhase::Preparing;
        self.store_prepared(description, raw);
        Ok(())
    }

    fn store_prepared(&mut self, description: &str, raw: WaypointSet) {
        info!("mission \"{}\" prepared with {} waypoints", description, raw.len());
        self.prepared = Some(PreparedMission::new(
            description,
            raw,
            self.config.shape_scale,
            self.config.flight_altitude,
        ));
    }

    /// Arms and launches the fleet, assigns goals, and runs the navigation
    /// loop until arrival, timeout, or a stop request. Ends in `Hovering`,
    /// except that a stop request leaves the fleet where it is so `shutdown`
    /// can land it immediately.
    pub fn execute(&mut self) -> Result<NavOutcome, MissionError> {
        if self.prepared.is_none() {
            return Err(MissionError::NotPrepared);
        }
        if self.phase != MissionPhase::Preparing {
            return Err(MissionError::BadPhase(self.phase));
        }

        self.arm_fleet()?;
        self.takeoff_fleet()?;
        self.assign_goals()?;

        self.phase = MissionPhase::Navigating;
        let outcome = self.navigate()?;
        if outcome == NavOutcome::Stopped {
            // Do not fly out to the goals on a cancelled mission.
            info!("navigation stopped, {} agents awaiting shutdown", self.active_agents());
            return Ok(outcome);
        }
        self.settle_on_goals()?;
        self.phase = MissionPhase::Hovering;
        info!("navigation ended: {:?}, {} agents active", outcome, self.active_agents());
        Ok(outcome)
    }

    fn arm_fleet(&mut self) -> Result<(), MissionError> {
        for agent in 0..self.active.len() {
            if !self.active[agent] {
                continue;
            }
            if let Err(e) = self.backend.arm(agent) {
                warn!("agent {} failed to arm: {}", agent, e);
                self.active[agent] = false;
            }
        }
        self.require_fleet()?;
        self.phase = MissionPhase::Armed;
        Ok(())
    }

    fn takeoff_fleet(&mut self) -> Result<(), MissionError> {
        self.phase = MissionPhase::TakingOff;
        // Issue every takeoff before joining any, so the fleet lifts together.
        let mut pending: Vec<(usize, ActuationHandle)> = Vec::new();
        for agent in 0..self.active.len() {
            if !self.active[agent] {
                continue;
            }
            match self.backend.takeoff(agent, self.config.takeoff_altitude) {
                Ok(handle) => pending.push((agent, handle)),
                Err(e) => {
                    warn!("agent {} failed takeoff: {}", agent, e);
                    self.active[agent] = false;
                }
            }
        }
        for (agent, handle) in pending {
            if let Err(e) = self.backend.join(handle) {
                warn!("agent {} takeoff did not complete: {}", agent, e);
                self.active[agent] = false;
            }
        }
        self.require_fleet()
    }

    fn assign_goals(&mut self) -> Result<(), MissionError> {
        let positions = self.poll_positions()?;
        let prepared = match self.prepared.clone() {
            Some(p) => p,
            None => return Err(MissionError::NotPrepared),
        };
        let assignment = assign::assign(&positions, &prepared.goals)?;
        self.goals = assignment
            .goal_for_agent
            .iter()
            .map(|g| prepared.goals[*g])
            .collect();

        if let Some(dir) = self.config.output_dir.clone() {
            if let Err(e) = artifact::save_mission_record(&dir, &prepared.record(&assignment)) {
                warn!("could not persist mission record: {}", e);
            }
        }
        self.assignment = Some(assignment);
        Ok(())
    }

    fn navigate(&mut self) -> Result<NavOutcome, MissionError> {
        let period = self.config.control_period;
        let collision_dist = self.apf.params().min_dist.max(0.5);
        let max_vel = self.apf.params().max_vel;
        let mut elapsed = 0.0;
        loop {
            if self.stop.is_stop_requested() {
                info!("stop requested during navigation");
                return Ok(NavOutcome::Stopped);
            }

            let positions = self.poll_positions()?;
            if self.all_arrived(&positions) {
                return Ok(NavOutcome::Arrived);
            }

            let mut cmds = self.apf.tick(&positions, &self.goals, &self.active);
            damp_close_approaches(&positions, &mut cmds, &self.active, period, collision_dist);

            for agent in 0..cmds.len() {
                if !self.active[agent] {
                    continue;
                }
                let cmd = cmds[agent].clamp_norm(max_vel);
                if let Err(e) = self.backend.set_velocity(agent, cmd, period) {
                    warn!("agent {} rejected velocity command: {}", agent, e);
                    self.active[agent] = false;
                }
            }
            self.require_fleet()?;

            elapsed += period;
            if elapsed >= self.config.nav_timeout {
                warn!("navigation timed out after {:.1} s, holding position", elapsed);
                return Ok(NavOutcome::TimedOut);
            }

            self.wait(period)?;
        }
    }

    /// Cancels residual velocities and snaps every active agent onto its
    /// exact goal with one position move.
    fn settle_on_goals(&mut self) -> Result<(), MissionError> {
        let max_vel = self.apf.params().max_vel;
        let mut pending: Vec<(usize, ActuationHandle)> = Vec::new();
        for agent in 0..self.active.len() {
            if !self.active[agent] {
                continue;
            }
            if let Err(e) = self.backend.set_velocity(agent, Vec3::ZERO, 0.1) {
                warn!("agent {} could not stop: {}", agent, e);
                self.active[agent] = false;
                continue;
            }
            match self.backend.set_position(agent, self.goals[agent], max_vel) {
                Ok(handle) => pending.push((agent, handle)),
                Err(e) => {
                    warn!("agent {} could not settle: {}", agent, e);
                    self.active[agent] = false;
                }
            }
        }
        for (agent, handle) in pending {
            if let Err(e) = self.backend.join(handle) {
                warn!("agent {} did not settle: {}", agent, e);
                self.active[agent] = false;
            }
        }
        self.require_fleet()
    }

    /// Maintains the formation until a stop is requested, re-snapping any
    /// agent that drifts off its goal.
    pub fn hold(&mut self) -> Result<(), MissionError> {
        if self.phase != MissionPhase::Hovering {
            return Err(MissionError::BadPhase(self.phase));
        }
        while !self.stop.is_stop_requested() {
            let positions = self.poll_positions()?;
            for agent in 0..self.active.len() {
                if !self.active[agent] {
                    continue;
                }
                if positions[agent].dist(&self.goals[agent]) > self.config.drift_threshold {
                    debug!("agent {} drifted, re-snapping", agent);
                    let snapped = self
                        .backend
                        .set_position(agent, self.goals[agent], self.apf.params().max_vel)
                        .and_then(|h| self.backend.join(h));
                    if let Err(e) = snapped {
                        warn!("agent {} failed hover correction: {}", agent, e);
                        self.active[agent] = false;
                    }
                }
            }
            self.require_fleet()?;
            self.wait(self.config.hover_period)?;
        }
        Ok(())
    }

    /// Lands and disarms whatever is still flying.
    pub fn shutdown(&mut self) -> Result<(), MissionError> {
        self.phase = MissionPhase::Landing;
        let mut pending: Vec<(usize, ActuationHandle)> = Vec::new();
        for agent in 0..self.active.len() {
            if !self.active[agent] {
                continue;
            }
            match self.backend.land(agent) {
                Ok(handle) => pending.push((agent, handle)),
                Err(e) => {
                    warn!("agent {} failed to start landing: {}", agent, e);
                    self.active[agent] = false;
                }
            }
        }
        for (agent, handle) in pending {
            if let Err(e) = self.backend.join(handle) {
                warn!("agent {} landing did not complete: {}", agent, e);
                self.active[agent] = false;
            }
        }
        for agent in 0..self.active.len() {
            if !self.active[agent] {
                continue;
            }
            if let Err(e) = self.backend.disarm(agent) {
                warn!("agent {} failed to disarm: {}", agent, e);
            }
        }
        self.phase = MissionPhase::Disarmed;
        info!("mission complete, fleet disarmed");
        Ok(())
    }

    /// Runs a full mission: execute, hold until stopped, then shut down.
    /// A stop request during navigation skips the hold.
    pub fn run(&mut self) -> Result<(), MissionError> {
        let outcome = self.execute()?;
        if outcome != NavOutcome::Stopped {
            self.hold()?;
        }
        self.shutdown()
    }

    /// Best-effort abort. Lands and disarms active agents, ignoring errors.
    pub fn fail(&mut self) {
        warn!("aborting mission");
        let mut pending: Vec<ActuationHandle> = Vec::new();
        for agent in 0..self.active.len() {
            if !self.active[agent] {
                continue;
            }
            if let Ok(handle) = self.backend.land(agent) {
                pending.push(handle);
            }
        }
        for handle in pending {
            let _ = self.backend.join(handle);
        }
        for agent in 0..self.active.len() {
            if self.active[agent] {
                let _ = self.backend.disarm(agent);
            }
        }
        self.phase = MissionPhase::Failed;
    }

    fn poll_positions(&mut self) -> Result<Vec<Point>, MissionError> {
        for agent in 0..self.active.len() {
            if !self.active[agent] {
                continue;
            }
            match self.backend.get_position(agent) {
                Ok(p) => self.last_known[agent] = p,
                Err(e) => {
                    warn!("lost position of agent {}: {}", agent, e);
                    self.active[agent] = false;
                }
            }
        }
        self.require_fleet()?;
        Ok(self.last_known.clone())
    }

    fn all_arrived(&self, positions: &[Point]) -> bool {
        self.active
            .iter()
            .zip(positions)
            .zip(&self.goals)
            .filter(|((active, _), _)| **active)
            .all(|((_, pos), goal)| pos.dist(goal) <= self.config.arrival_threshold)
    }

    fn wait(&mut self, dt: f64) -> Result<(), MissionError> {
        if let Err(e) = self.backend.wait(dt) {
            self.fail();
            return Err(MissionError::Vehicle(e));
        }
        Ok(())
    }

    fn require_fleet(&mut self) -> Result<(), MissionError> {
        if self.active.iter().any(|a| *a) {
            Ok(())
        } else {
            self.fail();
            Err(MissionError::FleetLost)
        }
    }
}

/// Halves both commands when a pair would end the control period within
/// `threshold` of each other in the horizontal plane. The vertical axis is
/// excluded here, as it is attenuated in the repulsion term: stacked agents
/// are separated by altitude, not speed.
pub(crate) fn damp_close_approaches(
    positions: &[Point],
    cmds: &mut [Vec3],
    active: &[bool],
    period: f64,
    threshold: f64,
) {
    for i in 0..cmds.len() {
        for j in (i + 1)..cmds.len() {
            if !active[i] || !active[j] {
                continue;
            }
            let pi = positions[i].stepped(&cmds[i], period);
            let pj = positions[j].stepped(&cmds[j], period);
            if pi.dist_xy(&pj) < threshold {
                debug!("agents {} and {} on close approach, slowing", i, j);
                cmds[i] = cmds[i].scaled(0.5);
                cmds[j] = cmds[j].scaled(0.5);
            }
        }
    }
}

impl Drop for MissionSequencer<'_> {
    fn drop(&mut self) {
        if !self.phase.is_terminal()
            && !matches!(self.phase, MissionPhase::Idle | MissionPhase::Preparing)
        {
            self.fail();
        }
    }
}
