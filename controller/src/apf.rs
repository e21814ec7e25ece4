use log::trace;
use rand::Rng;
use swarmform_structs::config::ControllerParams;
use swarmform_structs::{Point, Vec3};

/// Two agents closer than this are treated as coincident and pushed
/// apart along the previous velocity (or a random heading).
const COINCIDENT_DIST: f64 = 1e-6;

/// Repulsion acts mostly in the horizontal plane.
const VERTICAL_REPULSION: f64 = 0.3;

/// Velocity controller combining goal attraction with pairwise repulsion.
///
/// Stateless apart from the previous commanded velocities, which are only
/// used to break the tie when two agents sit on top of each other.
pub struct PotentialFieldController {
    params: ControllerParams,
    prev_vels: Vec<Vec3>,
}

impl PotentialFieldController {
    pub fn new(params: ControllerParams, num_agents: usize) -> Self {
        Self {
            params,
            prev_vels: vec![Vec3::ZERO; num_agents],
        }
    }

    pub fn params(&self) -> &ControllerParams {
        &self.params
    }

    /// Computes one velocity command per agent. Inactive agents get a zero
    /// command and exert no repulsion on the others.
    pub fn tick(&mut self, positions: &[Point], goals: &[Point], active: &[bool]) -> Vec<Vec3> {
        debug_assert_eq!(positions.len(), goals.len());
        debug_assert_eq!(positions.len(), active.len());

        let mut cmds = Vec::with_capacity(positions.len());
        for i in 0..positions.len() {
            if !active[i] {
                cmds.push(Vec3::ZERO);
                continue;
            }

            let dist_to_goal = positions[i].dist(&goals[i]);
            let attraction = Vec3::between(&positions[i], &goals[i])
                .scaled(self.params.p_cohesion)
                .clamp_norm(self.params.max_vel);

            let mut separation = Vec3::ZERO;
            for j in 0..positions.len() {
                if j == i || !active[j] {
                    continue;
                }
                let d = positions[i].dist(&positions[j]);
                if d >= self.params.min_dist {
                    continue;
                }
                let push = if d < COINCIDENT_DIST {
                    self.escape_direction(i)
                } else {
                    let w = (self.params.min_dist - d) / (d * d);
                    Vec3::between(&positions[j], &positions[i]).scaled(w)
                };
                separation = separation + Vec3::new(push.x, push.y, push.z * VERTICAL_REPULSION);
            }

            // Damp repulsion close to the goal so settled agents stop jostling.
            let sep_scale = dist_to_goal.clamp(0.2, 1.0);
            let sep = separation.scaled(self.params.p_separation * sep_scale);

            let cmd = (attraction + sep).clamp_norm(self.params.max_vel);
            trace!(
                "agent {}: goal dist {:.3}, cmd ({:.3}, {:.3}, {:.3})",
                i,
                dist_to_goal,
                cmd.x,
                cmd.y,
                cmd.z
            );
            cmds.push(cmd);
        }

        self.prev_vels.clone_from(&cmds);
        cmds
    }

    fn escape_direction(&self, i: usize) -> Vec3 {
        let prev = self.prev_vels[i];
        if prev.norm() > COINCIDENT_DIST {
            return prev.scaled(1.0 / prev.norm());
        }
        let mut rng = rand::rng();
        let angle = rng.random_range(0.0..std::f64::consts::TAU);
        Vec3::new(angle.cos(), angle.sin(), 0.0)
    }
}
