//! Scored sampling: iterate the generator, score each trajectory with each
//! cost function, and keep the cheapest legal one.

use log::{debug, warn};

use crate::planner::costs::{CycleContext, TrajectoryCostFunction};
use crate::planner::{Trajectory, TrajectoryGenerator};

/// Run one scoring round. The best trajectory is the one with the lowest
/// weighted-sum cost among legal samples; ties go to the earlier sample.
/// When every sample is vetoed the sentinel trajectory (cost -1) is returned.
///
/// `all_explored` collects every evaluated trajectory, rejected ones
/// included with their veto cost; it exists only for visualization.
pub fn find_best_trajectory(
    generator: &mut TrajectoryGenerator,
    critics: &mut [&mut dyn TrajectoryCostFunction],
    ctx: &CycleContext<'_>,
    mut all_explored: Option<&mut Vec<Trajectory>>,
) -> Trajectory {
    for critic in critics.iter_mut() {
        if let Err(err) = critic.prepare(ctx) {
            warn!("cost function failed to prepare: {err}");
            return Trajectory::sentinel();
        }
    }

    let mut best = Trajectory::sentinel();
    let mut evaluated = 0usize;
    while let Some(mut traj) = generator.next_trajectory() {
        traj.cost = score_trajectory(&traj, critics, ctx);
        evaluated += 1;

        if traj.is_legal() && (!best.is_legal() || traj.cost < best.cost) {
            best = traj.clone();
        }
        if let Some(explored) = all_explored.as_mut() {
            explored.push(traj);
        }
    }

    debug!(
        "scored {} trajectories, best cost {:.3}",
        evaluated, best.cost
    );
    best
}

fn score_trajectory(
    traj: &Trajectory,
    critics: &mut [&mut dyn TrajectoryCostFunction],
    ctx: &CycleContext<'_>,
) -> f32 {
    let mut total = 0.0;
    for critic in critics.iter() {
        let cost = critic.score(traj, ctx);
        if cost < 0.0 {
            // vetoed regardless of the critic's scale
            return cost;
        }
        total += cost * critic.scale();
    }
    total
}
