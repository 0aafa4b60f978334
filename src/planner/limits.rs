use serde::Deserialize;

/// Velocity and acceleration envelope of the platform, plus the goal
/// tolerances the caller uses to decide arrival.
///
/// `min_trans_vel` and `min_rot_vel` are magnitude floors used to discard
/// samples too slow to be useful; the signed range of each axis is spanned by
/// the `min_vel_*`/`max_vel_*` and `max_rot_vel` fields.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LocalPlannerLimits {
    pub max_trans_vel: f32,
    pub min_trans_vel: f32,
    pub max_vel_x: f32,
    pub min_vel_x: f32,
    pub max_vel_y: f32,
    pub min_vel_y: f32,
    pub max_rot_vel: f32,
    pub min_rot_vel: f32,
    pub acc_lim_x: f32,
    pub acc_lim_y: f32,
    pub acc_lim_theta: f32,
    pub acc_limit_trans: f32,
    pub xy_goal_tolerance: f32,
    pub yaw_goal_tolerance: f32,
    pub trans_stopped_vel: f32,
    pub rot_stopped_vel: f32,
    pub prune_plan: bool,
    /// Distance along the reference path where the local goal is placed.
    /// Zero or negative means "derive from max_trans_vel * sim_time".
    pub lookahead_distance: f32,
}

impl Default for LocalPlannerLimits {
    fn default() -> Self {
        Self {
            max_trans_vel: 0.55,
            min_trans_vel: 0.1,
            max_vel_x: 0.55,
            min_vel_x: -0.1,
            max_vel_y: 0.1,
            min_vel_y: -0.1,
            max_rot_vel: 1.0,
            min_rot_vel: 0.4,
            acc_lim_x: 2.5,
            acc_lim_y: 2.5,
            acc_lim_theta: 3.2,
            acc_limit_trans: 2.5,
            xy_goal_tolerance: 0.1,
            yaw_goal_tolerance: 0.1,
            trans_stopped_vel: 0.1,
            rot_stopped_vel: 0.1,
            prune_plan: true,
            lookahead_distance: 0.0,
        }
    }
}
