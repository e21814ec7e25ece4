use std::collections::HashMap;

use log::{debug, trace};
use swarmform_structs::backend::{ActuationHandle, VehicleBackend};
use swarmform_structs::error::VehicleError;
use swarmform_structs::{Point, Vec3};

const TAKEOFF_SPEED: f64 = 2.0;
const LAND_SPEED: f64 = 1.0;
const JOIN_STEP: f64 = 0.05;
const MAX_JOIN_STEPS: usize = 200_000;

/// One simulated multirotor. Position is NED, so altitude is negative z.
pub struct DroneState {
    pub home: Point,
    pub curr_loc: Point,
    pub armed: bool,
    pub airborne: bool,
    /// When set, arm and every actuation call fail.
    pub fail_actuation: bool,
    vel_cmd: Vec3,
    vel_remaining: f64,
    move_target: Option<(Point, f64)>,
    landing: bool,
}

impl DroneState {
    fn at(home: Point) -> DroneState {
        DroneState {
            home,
            curr_loc: home,
            armed: false,
            airborne: false,
            fail_actuation: false,
            vel_cmd: Vec3::ZERO,
            vel_remaining: 0.0,
            move_target: None,
            landing: false,
        }
    }
}

/// Kinematic fleet model. Drones fly straight toward position targets at a
/// commanded speed and otherwise integrate velocity commands.
pub struct World {
    pub curr_time: f64,
    pub drones: Vec<DroneState>,
}

impl World {
    /// `n` drones on the ground in a square-ish grid with the given spacing,
    /// centered on the origin.
    pub fn grid(n: usize, spacing: f64) -> World {
        let cols = (n as f64).sqrt().ceil() as usize;
        let drones = (0..n)
            .map(|i| {
                let row = i / cols;
                let col = i % cols;
                DroneState::at(Point::new(
                    (col as f64 - (cols as f64 - 1.0) / 2.0) * spacing,
                    (row as f64 - (cols as f64 - 1.0) / 2.0) * spacing,
                    0.0,
                ))
            })
            .collect();
        World { curr_time: 0.0, drones }
    }

    pub fn tiny() -> World {
        World::grid(1, 1.0)
    }

    pub fn simulate(&mut self, dt: f64) {
        fn go_towards(max_dist: &mut f64, source: &mut Point, target: Point) -> bool {
            let dx = target.x - source.x;
            let dy = target.y - source.y;
            let dz = target.z - source.z;
            let dist = (dx * dx + dy * dy + dz * dz).sqrt();
            if dist <= *max_dist {
                *max_dist -= dist;
                *source = target;
                true
            } else {
                let scaling = *max_dist / dist;
                source.x += dx * scaling;
                source.y += dy * scaling;
                source.z += dz * scaling;
                *max_dist = 0.0;
                false
            }
        }

        for d in self.drones.iter_mut() {
            if let Some((target, speed)) = d.move_target {
                let mut remaining_dist = dt * speed;
                if go_towards(&mut remaining_dist, &mut d.curr_loc, target) {
                    d.move_target = None;
                    if d.landing {
                        d.landing = false;
                        d.airborne = false;
                    }
                }
            } else if d.vel_remaining > 0.0 {
                let step = dt.min(d.vel_remaining);
                d.curr_loc = d.curr_loc.stepped(&d.vel_cmd, step);
                d.vel_remaining -= step;
            }
        }

        self.curr_time += dt;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::grid(4, 2.0)
    }
}

/// In-process vehicle transport over a `World`. `wait` advances simulated
/// time instead of sleeping, so missions run at full speed and positions
/// observed after `wait` reflect the commands issued before it.
pub struct SimBackend {
    pub world: World,
    connected: bool,
    next_handle: usize,
    pending: HashMap<ActuationHandle, usize>,
}

impl SimBackend {
    pub fn new(world: World) -> SimBackend {
        SimBackend {
            world,
            connected: false,
            next_handle: 0,
            pending: HashMap::new(),
        }
    }

    fn drone(&mut self, agent: usize) -> Result<&mut DroneState, VehicleError> {
        if !self.connected {
            return Err(VehicleError::NotConnected);
        }
        let d = self
            .world
            .drones
            .get_mut(agent)
            .ok_or(VehicleError::UnknownAgent(agent))?;
        if d.fail_actuation {
            return Err(VehicleError::Actuation {
                agent,
                reason: "actuation disabled".to_string(),
            });
        }
        Ok(d)
    }

    fn start_move(&mut self, agent: usize, target: Point, speed: f64) -> ActuationHandle {
        let handle = ActuationHandle(self.next_handle);
        self.next_handle += 1;
        self.world.drones[agent].move_target = Some((target, speed));
        self.world.drones[agent].vel_remaining = 0.0;
        self.pending.insert(handle, agent);
        handle
    }
}

impl VehicleBackend for SimBackend {
    fn connect(&mut self, endpoint: &str) -> Result<(), VehicleError> {
        debug!("sim transport up ({})", endpoint);
        self.connected = true;
        Ok(())
    }

    fn agent_count(&self) -> usize {
        self.world.drones.len()
    }

    fn arm(&mut self, agent: usize) -> Result<(), VehicleError> {
        let d = self.drone(agent)?;
        d.armed = true;
        Ok(())
    }

    fn disarm(&mut self, agent: usize) -> Result<(), VehicleError> {
        let d = self.drone(agent)?;
        d.armed = false;
        Ok(())
    }

    fn takeoff(&mut self, agent: usize, altitude: f64) -> Result<ActuationHandle, VehicleError> {
        let d = self.drone(agent)?;
        if !d.armed {
            return Err(VehicleError::Actuation {
                agent,
                reason: "takeoff while disarmed".to_string(),
            });
        }
        d.airborne = true;
        let target = Point::new(d.home.x, d.home.y, d.home.z - altitude);
        Ok(self.start_move(agent, target, TAKEOFF_SPEED))
    }

    fn land(&mut self, agent: usize) -> Result<ActuationHandle, VehicleError> {
        let d = self.drone(agent)?;
        d.landing = true;
        let target = Point::new(d.curr_loc.x, d.curr_loc.y, 0.0);
        Ok(self.start_move(agent, target, LAND_SPEED))
    }

    fn get_position(&mut self, agent: usize) -> Result<Point, VehicleError> {
        Ok(self.drone(agent)?.curr_loc)
    }

    fn set_velocity(&mut self, agent: usize, vel: Vec3, duration: f64) -> Result<(), VehicleError> {
        let d = self.drone(agent)?;
        if !d.airborne {
            return Err(VehicleError::Actuation {
                agent,
                reason: "velocity command while grounded".to_string(),
            });
        }
        d.vel_cmd = vel;
        d.vel_remaining = duration;
        d.move_target = None;
        trace!("agent {} vel ({:.2}, {:.2}, {:.2})", agent, vel.x, vel.y, vel.z);
        Ok(())
    }

    fn set_position(
        &mut self,
        agent: usize,
        target: Point,
        max_speed: f64,
    ) -> Result<ActuationHandle, VehicleError> {
        let d = self.drone(agent)?;
        if !d.airborne {
            return Err(VehicleError::Actuation {
                agent,
                reason: "position command while grounded".to_string(),
            });
        }
        Ok(self.start_move(agent, target, max_speed))
    }

    fn join(&mut self, handle: ActuationHandle) -> Result<(), VehicleError> {
        let agent = *self
            .pending
            .get(&handle)
            .ok_or(VehicleError::UnknownHandle)?;
        for _ in 0..MAX_JOIN_STEPS {
            if self.world.drones[agent].move_target.is_none() {
                self.pending.remove(&handle);
                return Ok(());
            }
            self.world.simulate(JOIN_STEP);
        }
        Err(VehicleError::Actuation {
            agent,
            reason: "move did not converge".to_string(),
        })
    }

    fn wait(&mut self, dt: f64) -> Result<(), VehicleError> {
        if !self.connected {
            return Err(VehicleError::NotConnected);
        }
        self.world.simulate(dt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(n: usize) -> SimBackend {
        let mut b = SimBackend::new(World::grid(n, 2.0));
        b.connect("sim://local").unwrap();
        b
    }

    #[test]
    fn takeoff_reaches_altitude() {
        let mut b = backend(1);
        b.arm(0).unwrap();
        let h = b.takeoff(0, 5.0).unwrap();
        b.join(h).unwrap();
        let p = b.get_position(0).unwrap();
        assert!((p.z - (-5.0)).abs() < 1e-6);
        assert!(b.world.drones[0].airborne);
    }

    #[test]
    fn takeoff_requires_arming() {
        let mut b = backend(1);
        assert!(b.takeoff(0, 5.0).is_err());
    }

    #[test]
    fn velocity_commands_integrate_for_their_duration() {
        let mut b = backend(1);
        b.arm(0).unwrap();
        let h = b.takeoff(0, 5.0).unwrap();
        b.join(h).unwrap();
        let start = b.get_position(0).unwrap();
        b.set_velocity(0, Vec3::new(1.0, 0.0, 0.0), 2.0).unwrap();
        // Longer than the command duration; motion must stop at 2 s.
        b.wait(5.0).unwrap();
        let p = b.get_position(0).unwrap();
        assert!((p.x - (start.x + 2.0)).abs() < 1e-6);
        assert!((p.z - start.z).abs() < 1e-6);
    }

    #[test]
    fn landing_returns_to_the_ground() {
        let mut b = backend(1);
        b.arm(0).unwrap();
        let h = b.takeoff(0, 5.0).unwrap();
        b.join(h).unwrap();
        let h = b.land(0).unwrap();
        b.join(h).unwrap();
        let p = b.get_position(0).unwrap();
        assert!(p.z.abs() < 1e-6);
        assert!(!b.world.drones[0].airborne);
    }

    #[test]
    fn joining_one_handle_advances_everyone() {
        let mut b = backend(2);
        b.arm(0).unwrap();
        b.arm(1).unwrap();
        let h0 = b.takeoff(0, 5.0).unwrap();
        let h1 = b.takeoff(1, 5.0).unwrap();
        b.join(h0).unwrap();
        // Identical moves issued together finish together.
        assert!(b.world.drones[1].move_target.is_none());
        b.join(h1).unwrap();
    }

    #[test]
    fn failing_agent_rejects_actuation() {
        let mut b = backend(2);
        b.world.drones[1].fail_actuation = true;
        assert!(b.arm(0).is_ok());
        assert!(matches!(
            b.arm(1),
            Err(VehicleError::Actuation { agent: 1, .. })
        ));
    }
}
