//! Greedy farthest-first goal assignment.
//!
//! Distance policy: horizontal (XY) distances throughout. The vertical
//! axis is ignored because all goals sit near a common flight altitude
//! and assignment quality is about ground-track crossings.

use log::{debug, warn};
use ordered_float::OrderedFloat;
use swarmform_structs::error::AssignError;
use swarmform_structs::mission::Assignment;
use swarmform_structs::Point;

/// Map each agent to a goal index, unique when there are enough goals.
///
/// Agents are processed in descending order of their nearest-goal
/// distance: an agent that is far from every goal picks first, so it is
/// not left with only distant leftovers after closer agents claim the
/// nearby goals. This ordering is load-bearing; nearest-first produces
/// materially worse assignments for clustered starting positions.
///
/// With fewer goals than agents the assignment degrades to duplicates,
/// warned once per call. Deterministic for identical inputs.
pub fn assign(agents: &[Point], goals: &[Point]) -> Result<Assignment, AssignError> {
    if goals.is_empty() {
        return Err(AssignError::NoGoals);
    }
    if agents.is_empty() {
        return Err(AssignError::NoAgents);
    }

    let dists: Vec<Vec<f64>> = agents
        .iter()
        .map(|a| goals.iter().map(|g| a.dist_xy(g)).collect())
        .collect();

    let mut order: Vec<usize> = (0..agents.len()).collect();
    order.sort_by_key(|&i| {
        let nearest = dists[i].iter().copied().fold(f64::INFINITY, f64::min);
        // Descending: farthest-from-any-goal agents choose first.
        (std::cmp::Reverse(OrderedFloat(nearest)), i)
    });

    let degraded = goals.len() < agents.len();
    if degraded {
        warn!(
            "fewer goals ({}) than agents ({}); duplicate assignments will be made",
            goals.len(),
            agents.len()
        );
    }

    let mut claimed = vec![false; goals.len()];
    let mut goal_for_agent = vec![0usize; agents.len()];

    for &agent in order.iter() {
        let mut ranked: Vec<usize> = (0..goals.len()).collect();
        ranked.sort_by_key(|&g| (OrderedFloat(dists[agent][g]), g));

        let pick = ranked
            .iter()
            .copied()
            .find(|&g| !claimed[g])
            // All goals claimed: take the nearest regardless.
            .unwrap_or(ranked[0]);

        claimed[pick] = true;
        goal_for_agent[agent] = pick;
        debug!("agent {} -> goal {} (d_xy={:.2})", agent, pick, dists[agent][pick]);
    }

    Ok(Assignment { goal_for_agent, degraded })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y, 0.0)
    }

    #[test]
    fn equal_counts_give_bijection() {
        let _ = env_logger::try_init();
        let agents = [p(0.0, 0.0), p(5.0, 0.0), p(0.0, 5.0), p(5.0, 5.0)];
        let goals = [p(1.0, 1.0), p(6.0, 0.0), p(0.0, 6.0), p(6.0, 6.0)];
        let a = assign(&agents, &goals).unwrap();
        assert!(a.is_bijection());
        assert_eq!(a.distinct_goals(), 4);
    }

    #[test]
    fn farthest_agent_picks_first() {
        let _ = env_logger::try_init();
        // Both agents are nearest to goal 0. Agent 0 has the larger
        // nearest-goal distance (1.0 vs 0.5), so it claims goal 0 and
        // agent 1 falls through to goal 1. Nearest-first would swap them.
        let agents = [p(0.0, 0.0), p(0.5, 0.0)];
        let goals = [p(1.0, 0.0), p(5.0, 0.0)];
        let a = assign(&agents, &goals).unwrap();
        assert_eq!(a.goal_for_agent, vec![0, 1]);
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let agents = [p(0.3, 0.7), p(2.0, 2.0), p(-1.0, 4.0)];
        let goals = [p(1.0, 1.0), p(3.0, 1.0), p(0.0, 5.0)];
        let a = assign(&agents, &goals).unwrap();
        let b = assign(&agents, &goals).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fewer_goals_degrades_with_duplicates() {
        let _ = env_logger::try_init();
        let agents = [p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)];
        let goals = [p(0.5, 0.0), p(2.5, 0.0)];
        let a = assign(&agents, &goals).unwrap();
        assert!(a.degraded);
        // All goals stay covered even though duplicates appear.
        assert_eq!(a.distinct_goals(), 2);
        assert_eq!(a.goal_for_agent.len(), 4);
    }

    #[test]
    fn zero_goals_is_an_error() {
        let agents = [p(0.0, 0.0)];
        assert!(matches!(assign(&agents, &[]), Err(AssignError::NoGoals)));
    }
}
