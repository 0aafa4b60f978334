use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use glam::Vec2;

use dwa_planner::planner::costs::{
    AlignmentCostFunction, CycleContext, ObstacleCostFunction, TrajectoryCostFunction,
};
use dwa_planner::planner::{scored_sampling, SamplingParams, TrajectoryGenerator};
use dwa_planner::types::MapInfo;
use dwa_planner::{Costmap, Footprint, Grid2d, LocalPlannerLimits, Pose2, Velocity2};

fn bench_scoring_round(c: &mut Criterion) {
    let info = MapInfo {
        width: 128,
        height: 128,
        resolution: 0.05,
        origin: Vec2::ZERO,
    };
    let costmap: Costmap = Grid2d::filled(info, 0);
    let footprint = Footprint::rectangle(0.4, 0.3);
    let limits = LocalPlannerLimits {
        min_trans_vel: 0.0,
        min_rot_vel: 0.0,
        ..Default::default()
    };
    let params = SamplingParams {
        vx_samples: 5,
        vy_samples: 1,
        vth_samples: 10,
        ..Default::default()
    };

    c.bench_function("scoring_round_50_samples", |b| {
        b.iter(|| {
            let ctx = CycleContext {
                costmap: &costmap,
                footprint: &footprint,
                limits: &limits,
            };
            let mut generator = TrajectoryGenerator::new(params);
            generator.initialise(
                Pose2::new(Vec2::new(3.2, 3.2), 0.3),
                Velocity2::new(0.2, 0.0, 0.1),
                &limits,
            );
            let mut obstacle = ObstacleCostFunction::new(false);
            let mut alignment = AlignmentCostFunction::new();
            let mut critics: [&mut dyn TrajectoryCostFunction; 2] =
                [&mut obstacle, &mut alignment];
            let best =
                scored_sampling::find_best_trajectory(&mut generator, &mut critics, &ctx, None);
            black_box(best);
        });
    });
}

criterion_group!(benches, bench_scoring_round);
criterion_main!(benches);
