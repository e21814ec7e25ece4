use crate::error::VehicleError;
use crate::{Point, Vec3};

/// Token for an in-flight actuation command (takeoff, landing, position
/// move). Handles are collected across the fleet and joined as a set so
/// that multi-agent maneuvers rendezvous simultaneously.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct ActuationHandle(pub usize);

/// Transport to the vehicle fleet. One implementation talks to a real
/// flight stack; `swarmform_sim` provides an in-process kinematic one.
///
/// All per-agent calls are invocable in a loop and their handles are
/// collectible for a simultaneous `join`. `wait` owns mission timing:
/// a live transport sleeps for `dt`, a simulated one advances its world
/// by `dt` instead, so positions observed after `wait` always reflect
/// the commands issued before it.
pub trait VehicleBackend {
    fn connect(&mut self, endpoint: &str) -> Result<(), VehicleError>;
    fn agent_count(&self) -> usize;
    fn arm(&mut self, agent: usize) -> Result<(), VehicleError>;
    fn disarm(&mut self, agent: usize) -> Result<(), VehicleError>;
    fn takeoff(&mut self, agent: usize, altitude: f64) -> Result<ActuationHandle, VehicleError>;
    fn land(&mut self, agent: usize) -> Result<ActuationHandle, VehicleError>;
    fn get_position(&mut self, agent: usize) -> Result<Point, VehicleError>;
    fn set_velocity(&mut self, agent: usize, vel: Vec3, duration: f64) -> Result<(), VehicleError>;
    fn set_position(
        &mut self,
        agent: usize,
        target: Point,
        max_speed: f64,
    ) -> Result<ActuationHandle, VehicleError>;
    fn join(&mut self, handle: ActuationHandle) -> Result<(), VehicleError>;
    fn wait(&mut self, dt: f64) -> Result<(), VehicleError>;

    /// Block once on a whole set of pending handles.
    fn join_all(&mut self, handles: Vec<ActuationHandle>) -> Result<(), VehicleError> {
        for handle in handles {
            self.join(handle)?;
        }
        Ok(())
    }
}
