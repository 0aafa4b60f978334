//! Controller state selection from the geometric error to the path.

use log::info;
use serde::Deserialize;

use crate::planner::costs::CmdVelCoefficients;

/// State of the controller; each state retunes the cost function weights.
///
/// `Default`: normal path following. `Arrive`: the goal is within the switch
/// distance. `Align`: the orientation error to the path is large.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Default,
    Align,
    Arrive,
}

impl ControllerState {
    pub fn name(&self) -> &'static str {
        match self {
            ControllerState::Default => "Default",
            ControllerState::Align => "Align",
            ControllerState::Arrive => "Arrive",
        }
    }
}

/// Cost function scales selected by one controller state.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct StateWeights {
    pub alignment: f32,
    pub plan: f32,
    pub goal: f32,
    pub cmd_vel: f32,
    pub obstacle: f32,
    pub cmd_vel_coefficients: CmdVelCoefficients,
}

impl Default for StateWeights {
    fn default() -> Self {
        Self {
            alignment: 0.3,
            plan: 0.0,
            goal: 1.0,
            cmd_vel: 0.0,
            obstacle: 0.01,
            cmd_vel_coefficients: CmdVelCoefficients::default(),
        }
    }
}

impl StateWeights {
    /// Weight row used while aligning: follow the path field, ignore the goal.
    pub fn align_defaults() -> Self {
        Self {
            alignment: 1.0,
            plan: 1.0,
            goal: 0.0,
            ..Default::default()
        }
    }

    /// Weight row used on final approach.
    pub fn arrive_defaults() -> Self {
        Self {
            alignment: 1.0,
            ..Default::default()
        }
    }
}

/// Geometric thresholds that switch the controller state.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SwitchThresholds {
    pub switch_yaw_error: f32,
    pub switch_plan_distance: f32,
    pub switch_goal_distance: f32,
}

impl Default for SwitchThresholds {
    fn default() -> Self {
        Self {
            switch_yaw_error: std::f32::consts::FRAC_PI_4,
            switch_plan_distance: 0.5,
            switch_goal_distance: 0.5,
        }
    }
}

/// Selects the controller state each cycle. Transitions are memoryless
/// except for the `Align` hysteresis: once aligning, the state holds until
/// the yaw error drops below half the switch threshold.
pub struct StateMachine {
    thresholds: SwitchThresholds,
    prev: Option<ControllerState>,
}

impl StateMachine {
    pub fn new(thresholds: SwitchThresholds) -> Self {
        Self {
            thresholds,
            prev: None,
        }
    }

    pub fn set_thresholds(&mut self, thresholds: SwitchThresholds) {
        self.thresholds = thresholds;
    }

    pub fn reset(&mut self) {
        self.prev = None;
    }

    pub fn state(&self) -> Option<ControllerState> {
        self.prev
    }

    // TODO: add a recovery state keyed on plan_distance once the drive
    // controller can rejoin a distant path; the threshold is already
    // configured as switch_plan_distance.
    pub fn determine_state(
        &mut self,
        yaw_error: f32,
        _plan_distance: f32,
        goal_distance: f32,
    ) -> ControllerState {
        let t = &self.thresholds;
        let state = if goal_distance < t.switch_goal_distance {
            ControllerState::Arrive
        } else if yaw_error.abs() > t.switch_yaw_error
            || (self.prev == Some(ControllerState::Align)
                && yaw_error.abs() > t.switch_yaw_error / 2.0)
        {
            ControllerState::Align
        } else {
            ControllerState::Default
        };

        if self.prev != Some(state) {
            info!("controller state = {}", state.name());
            self.prev = Some(state);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_4;

    use super::*;

    fn machine() -> StateMachine {
        StateMachine::new(SwitchThresholds {
            switch_yaw_error: FRAC_PI_4,
            switch_plan_distance: 0.5,
            switch_goal_distance: 0.5,
        })
    }

    #[test]
    fn goal_distance_switches_arrive() {
        let mut m = machine();
        assert_eq!(m.determine_state(0.0, 1.0, 0.499), ControllerState::Arrive);
        assert_eq!(m.determine_state(0.0, 1.0, 0.501), ControllerState::Default);
    }

    #[test]
    fn arrive_wins_over_align() {
        let mut m = machine();
        assert_eq!(m.determine_state(1.0, 1.0, 0.1), ControllerState::Arrive);
    }

    #[test]
    fn align_hysteresis_holds_until_half_threshold() {
        let mut m = machine();
        let e = 1e-3;

        assert_eq!(
            m.determine_state(FRAC_PI_4 - e, 1.0, 2.0),
            ControllerState::Default
        );
        assert_eq!(
            m.determine_state(FRAC_PI_4 + e, 1.0, 2.0),
            ControllerState::Align
        );
        assert_eq!(
            m.determine_state(FRAC_PI_4 * 0.6, 1.0, 2.0),
            ControllerState::Align
        );
        assert_eq!(
            m.determine_state(FRAC_PI_4 * 0.4, 1.0, 2.0),
            ControllerState::Default
        );
    }

    #[test]
    fn hysteresis_applies_to_negative_errors() {
        let mut m = machine();
        assert_eq!(
            m.determine_state(-FRAC_PI_4 - 0.01, 1.0, 2.0),
            ControllerState::Align
        );
        assert_eq!(
            m.determine_state(-FRAC_PI_4 * 0.6, 1.0, 2.0),
            ControllerState::Align
        );
    }
}
