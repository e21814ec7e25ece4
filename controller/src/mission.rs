use swarmform_structs::mission::{Assignment, MissionRecord, WaypointSet};
use swarmform_structs::Point;

/// A sampled shape carried through a mission: the raw unit-scale waypoints
/// plus their flight-frame (NED) counterparts.
#[derive(Clone, Debug)]
pub struct PreparedMission {
    pub description: String,
    pub raw: WaypointSet,
    pub goals: Vec<Point>,
    pub shape_scale: f64,
    pub flight_altitude: f64,
}

impl PreparedMission {
    pub fn new(
        description: &str,
        raw: WaypointSet,
        shape_scale: f64,
        flight_altitude: f64,
    ) -> PreparedMission {
        let goals = to_flight_frame(&raw, shape_scale, flight_altitude);
        PreparedMission {
            description: description.to_string(),
            raw,
            goals,
            shape_scale,
            flight_altitude,
        }
    }

    pub fn record(&self, assignment: &Assignment) -> MissionRecord {
        MissionRecord {
            description: self.description.clone(),
            num_points: self.raw.len(),
            shape_scale: self.shape_scale,
            flight_altitude: self.flight_altitude,
            waypoints_raw: self.raw.points.clone(),
            assignment: assignment.goal_for_agent.clone(),
        }
    }
}

/// Scales unit-frame waypoints into meters and lowers them to the cruise
/// altitude. NED: up is negative z, so the altitude enters as `-altitude`.
pub fn to_flight_frame(raw: &WaypointSet, shape_scale: f64, flight_altitude: f64) -> Vec<Point> {
    raw.iter()
        .map(|p| {
            Point::new(
                p.x * shape_scale,
                p.y * shape_scale,
                p.z * shape_scale - flight_altitude,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flight_frame_scales_and_lowers() {
        let raw = WaypointSet::new(vec![
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, -1.0, 0.5),
        ]);
        let goals = to_flight_frame(&raw, 2.0, 5.0);
        assert!(goals[0].eq_xyz(&Point::new(2.0, 0.0, -5.0)));
        assert!(goals[1].eq_xyz(&Point::new(0.0, -2.0, -4.0)));
    }

    #[test]
    fn record_keeps_raw_waypoints() {
        let raw = WaypointSet::new(vec![Point::new(1.0, 0.0, 0.0)]);
        let mission = PreparedMission::new("test", raw, 3.0, 5.0);
        let record = mission.record(&Assignment { goal_for_agent: vec![0], degraded: false });
        assert_eq!(record.num_points, 1);
        assert!((record.waypoints_raw[0].x - 1.0).abs() < 1e-12);
        assert_eq!(record.assignment, vec![0]);
    }
}
