use serde::{Deserialize, Serialize};

use crate::Point;

/// Ordered target points produced by the surface sampler. Immutable once
/// produced; read concurrently by the assigner and the controller.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct WaypointSet {
    pub points: Vec<Point>,
}

impl WaypointSet {
    pub fn new(points: Vec<Point>) -> WaypointSet {
        WaypointSet { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }
}

/// Mapping agent index -> goal index. Bijective when there are at least as
/// many goals as agents; otherwise degraded, with duplicates permitted.
/// Fixed for the duration of a mission once computed.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub goal_for_agent: Vec<usize>,
    pub degraded: bool,
}

impl Assignment {
    pub fn goal_of(&self, agent: usize) -> usize {
        self.goal_for_agent[agent]
    }

    pub fn distinct_goals(&self) -> usize {
        let mut goals = self.goal_for_agent.clone();
        goals.sort_unstable();
        goals.dedup();
        goals.len()
    }

    pub fn is_bijection(&self) -> bool {
        !self.degraded && self.distinct_goals() == self.goal_for_agent.len()
    }
}

/// Exactly one active phase per mission. Transitions are one-directional
/// except `Failed`, which is reachable from any non-terminal phase.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum MissionPhase {
    Idle,
    Preparing,
    Armed,
    TakingOff,
    Navigating,
    Hovering,
    Landing,
    Disarmed,
    Failed,
}

impl MissionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MissionPhase::Disarmed | MissionPhase::Failed)
    }
}

/// Per-mission audit record persisted to disk. The raw waypoints are kept
/// untransformed; scale and altitude describe the world transform applied.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct MissionRecord {
    pub description: String,
    pub num_points: usize,
    pub shape_scale: f64,
    pub flight_altitude: f64,
    pub waypoints_raw: Vec<Point>,
    pub assignment: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_bijection_detection() {
        let a = Assignment { goal_for_agent: vec![2, 0, 1], degraded: false };
        assert!(a.is_bijection());
        assert_eq!(a.distinct_goals(), 3);

        let b = Assignment { goal_for_agent: vec![0, 0, 1], degraded: true };
        assert!(!b.is_bijection());
        assert_eq!(b.distinct_goals(), 2);
    }

    #[test]
    fn terminal_phases() {
        assert!(MissionPhase::Disarmed.is_terminal());
        assert!(MissionPhase::Failed.is_terminal());
        assert!(!MissionPhase::Navigating.is_terminal());
    }
}
