//! Gripper sub-protocol — grip command plus busy-poll loop.
//!
//! Emitted once per compiled program. The block defines `rg_is_busy` and
//! `rg_grip` against the controller-side XML-RPC gripper service; `rg_grip`
//! issues the grip and polls the busy flag at a fixed interval until the
//! actuator settles before returning to the caller sequence. The loop is
//! interpreted by the controller, never by this process.

use super::recipes::GRIP_FORCE;
use super::script::Stmt;

/// Poll interval of the busy loop, in controller seconds.
pub const POLL_INTERVAL_S: f64 = 0.01;

/// Statements of the gripper sub-protocol block.
///
/// `rpc_url` is the gripper service endpoint as resolved by the controller;
/// `tool_index` addresses the sole gripper on the tool flange.
pub fn gripper_protocol(rpc_url: &str, tool_index: u32) -> Vec<Stmt> {
    vec![
        Stmt::Global {
            name: "RPC".to_string(),
            expr: format!("rpc_factory(\"xmlrpc\", \"{}\")", rpc_url),
        },
        Stmt::Global { name: "TOOL_INDEX".to_string(), expr: tool_index.to_string() },
        Stmt::Def {
            name: "rg_is_busy".to_string(),
            params: String::new(),
            body: vec![Stmt::Return("RPC.rg_get_busy(TOOL_INDEX)".to_string())],
        },
        Stmt::Def {
            name: "rg_grip".to_string(),
            params: format!("width, force={}", GRIP_FORCE),
            body: vec![
                // `+ 0.0` coerces to float; the controller is strict about
                // argument types on this RPC.
                Stmt::Expr("RPC.rg_grip(TOOL_INDEX, width + 0.0, force + 0.0)".to_string()),
                Stmt::Sleep(POLL_INTERVAL_S),
                Stmt::While {
                    cond: "rg_is_busy()".to_string(),
                    body: vec![Stmt::Sleep(POLL_INTERVAL_S)],
                },
            ],
        },
    ]
}

// ============================================================================
// Tests
// ============================================================================
