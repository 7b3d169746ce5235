//! Program compiler — one order in, one URScript program out.
//!
//! Pure and synchronous; no I/O, no failure mode beyond invalid input
//! (which the dispatch boundary rejects before compilation). Identical
//! orders compile to byte-identical text for a fixed cell config.

use super::config::{CellConfig, MotionParams};
use super::gripper;
use super::recipes;
use super::script::{self, MoveKind, Stmt, Value};
use super::types::{CompiledProgram, ComponentType, MotionStep, Order};

/// Compiles orders against one cell's configuration.
#[derive(Debug, Clone)]
pub struct Compiler {
    rpc_url: String,
    tool_index: u32,
    motion: MotionParams,
}

impl Compiler {
    pub fn new(config: &CellConfig) -> Self {
        Self {
            rpc_url: config.robot.gripper_rpc_url(),
            tool_index: config.robot.tool_index,
            motion: config.motion,
        }
    }

    /// Compile an order into a self-contained program.
    ///
    /// Layout: waypoint and parameter header, gripper sub-protocol, one
    /// subroutine per component type (always all three, even at quantity
    /// zero), then the invocation section — all of A, then all of B, then
    /// all of C, never interleaved — and a single top-level call.
    pub fn compile(&self, order: &Order) -> CompiledProgram {
        let mut body = Vec::new();

        for wp in &recipes::WAYPOINTS {
            body.push(Stmt::Pose { name: wp.name.to_string(), pose: wp.pose });
        }
        body.push(Stmt::Assign { name: "a".to_string(), value: Value::Num(self.motion.accel) });
        body.push(Stmt::Assign { name: "v".to_string(), value: Value::Num(self.motion.vel) });
        body.push(Stmt::Blank);

        body.extend(gripper::gripper_protocol(&self.rpc_url, self.tool_index));
        body.push(Stmt::Blank);

        for component in ComponentType::ALL {
            let steps = recipes::recipe_for(component, &self.motion);
            body.push(Stmt::Def {
                name: component.subroutine().to_string(),
                params: String::new(),
                body: steps.iter().map(|s| self.step_stmt(s)).collect(),
            });
            body.push(Stmt::Blank);
        }

        for component in ComponentType::ALL {
            for _ in 0..order.quantity(component) {
                body.push(Stmt::Call { name: component.subroutine().to_string(), args: vec![] });
            }
        }

        let program = vec![
            Stmt::Def { name: "prog".to_string(), params: String::new(), body },
            Stmt::Call { name: "prog".to_string(), args: vec![] },
        ];

        CompiledProgram::new(script::render(&program))
    }

    /// A one-move connectivity check: joint-move to the first pick hover
    /// pose, with literal motion parameters. Used by `celda probe`.
    pub fn probe_program(&self) -> CompiledProgram {
        let target = recipes::waypoint("pick_a_hover")
            .map(|wp| script::pose_literal(&wp.pose))
            .unwrap_or_default();
        let program = vec![
            Stmt::Def {
                name: "prog".to_string(),
                params: String::new(),
                body: vec![Stmt::Move {
                    kind: MoveKind::Joint,
                    target,
                    accel: Value::Num(self.motion.accel),
                    vel: Value::Num(self.motion.vel),
                }],
            },
            Stmt::Call { name: "prog".to_string(), args: vec![] },
        ];
        CompiledProgram::new(script::render(&program))
    }

    /// Lower one recipe step to a statement. Moves whose parameters match
    /// the shared header values reference `a`/`v` instead of repeating the
    /// literals.
    fn step_stmt(&self, step: &MotionStep) -> Stmt {
        match *step {
            MotionStep::JointMove { target, accel, vel } => Stmt::Move {
                kind: MoveKind::Joint,
                target: target.to_string(),
                accel: self.speed(accel, "a"),
                vel: self.speed(vel, "v"),
            },
            MotionStep::LinearMove { target, accel, vel } => Stmt::Move {
                kind: MoveKind::Linear,
                target: target.to_string(),
                accel: self.speed(accel, "a"),
                vel: self.speed(vel, "v"),
            },
            MotionStep::Grip { width, force } => Stmt::Call {
                name: "rg_grip".to_string(),
                args: vec![Value::Num(width), Value::Num(force)],
            },
        }
    }

    fn speed(&self, value: f64, shared: &'static str) -> Value {
        let shared_value = match shared {
            "a" => self.motion.accel,
            _ => self.motion.vel,
        };
        if value == shared_value {
            Value::Var(shared)
        } else {
            Value::Num(value)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
