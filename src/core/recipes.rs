//! Waypoint table and per-component pick-and-place recipes.
//!
//! Pose values and grip width/force pairs are hand-tuned against the
//! physical cell; the controller behavior depends on the exact literals.
//! Every recipe starts and ends at `home`, so sequential invocations
//! compose without a transition move.

use super::config::MotionParams;
use super::types::{ComponentType, MotionStep, Waypoint};

/// Named poses used by the recipes, in program-header declaration order.
pub const WAYPOINTS: [Waypoint; 9] = [
    Waypoint { name: "home", pose: [0.130, -0.345, 0.548, 2.01, -0.001, -0.007] },
    Waypoint { name: "pick_a_hover", pose: [0.482, -0.118, 0.044, 3.182, -0.003, -0.009] },
    Waypoint { name: "pick_a", pose: [0.482, -0.118, -0.125, 3.182, -0.003, -0.009] },
    Waypoint { name: "pick_b_hover", pose: [0.425, -0.225, 0.044, 3.146, -0.478, -0.001] },
    Waypoint { name: "pick_b", pose: [0.425, -0.225, -0.125, 3.146, -0.478, -0.001] },
    Waypoint { name: "pick_c_hover", pose: [0.292, -0.385, 0.044, 2.972, -1.166, -0.041] },
    Waypoint { name: "pick_c", pose: [0.292, -0.385, -0.125, 2.972, -1.166, -0.041] },
    Waypoint { name: "drop_hover", pose: [0.027, -0.482, 0.044, 2.508, -1.984, -0.015] },
    Waypoint { name: "drop", pose: [0.027, -0.482, -0.05, 2.508, -1.984, -0.015] },
];

/// Gripper width that clears every component.
pub const GRIP_OPEN_WIDTH: f64 = 50.0;

/// Force limit applied on every grip.
pub const GRIP_FORCE: f64 = 20.0;

/// Look up a waypoint by name.
pub fn waypoint(name: &str) -> Option<&'static Waypoint> {
    WAYPOINTS.iter().find(|wp| wp.name == name)
}

/// Closing width for one component. Tuned per part geometry.
pub fn grip_width(component: ComponentType) -> f64 {
    match component {
        ComponentType::A => 32.0,
        ComponentType::B => 11.0,
        ComponentType::C => 32.0,
    }
}

/// Hover and pick waypoints for one component's bin.
fn pick_waypoints(component: ComponentType) -> (&'static str, &'static str) {
    match component {
        ComponentType::A => ("pick_a_hover", "pick_a"),
        ComponentType::B => ("pick_b_hover", "pick_b"),
        ComponentType::C => ("pick_c_hover", "pick_c"),
    }
}

/// The fixed pick-and-place cycle for one component.
///
/// Total and side-effect-free. The drop half of the cycle is identical
/// across components; only the pick waypoints and the closing width vary.
pub fn recipe_for(component: ComponentType, motion: &MotionParams) -> Vec<MotionStep> {
    let (hover, pick) = pick_waypoints(component);
    let joint = |target| MotionStep::JointMove { target, accel: motion.accel, vel: motion.vel };
    let linear = |target| MotionStep::LinearMove { target, accel: motion.accel, vel: motion.vel };

    vec![
        joint("home"),
        joint(hover),
        linear(pick),
        MotionStep::Grip { width: GRIP_OPEN_WIDTH, force: GRIP_FORCE },
        MotionStep::Grip { width: grip_width(component), force: GRIP_FORCE },
        linear(hover),
        joint("drop_hover"),
        linear("drop"),
        MotionStep::Grip { width: GRIP_OPEN_WIDTH, force: GRIP_FORCE },
        linear("drop_hover"),
        joint("home"),
    ]
}

// ============================================================================
// Tests
// ============================================================================
