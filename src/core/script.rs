//! URScript statement tree and renderer.
//!
//! Programs are assembled as a small statement tree and rendered by one
//! serializer. Block statements own their bodies, so every emitted
//! `def`/`while` is closed with a matching `end` by construction — the
//! renderer cannot produce an unbalanced program.

use std::fmt;

/// A value position in a statement: a numeric literal or a reference to a
/// variable declared earlier in the program.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Num(f64),
    Var(&'static str),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{}", n),
            Self::Var(name) => write!(f, "{}", name),
        }
    }
}

/// Interpolation mode of a move statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Joint,
    Linear,
}

impl MoveKind {
    pub fn function(&self) -> &'static str {
        match self {
            Self::Joint => "movej",
            Self::Linear => "movel",
        }
    }
}

/// One URScript statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `name = p[x,y,z,rx,ry,rz]` — pose constant binding.
    Pose { name: String, pose: [f64; 6] },
    /// `name = value` — scalar binding.
    Assign { name: String, value: Value },
    /// `global NAME = expr` — controller-side global.
    Global { name: String, expr: String },
    /// `def name(params):` ... `end`
    Def { name: String, params: String, body: Vec<Stmt> },
    /// `while (cond):` ... `end`
    While { cond: String, body: Vec<Stmt> },
    /// `movej(target, a=.., v=..)` / `movel(..)`
    Move { kind: MoveKind, target: String, accel: Value, vel: Value },
    /// `name(arg, arg, ...)`
    Call { name: String, args: Vec<Value> },
    /// `return expr`
    Return(String),
    /// `sleep(seconds)`
    Sleep(f64),
    /// A raw expression statement (e.g. an RPC invocation).
    Expr(String),
    /// An empty line, for readability of the generated text.
    Blank,
}

/// Format a pose as a URScript pose literal.
pub fn pose_literal(pose: &[f64; 6]) -> String {
    format!(
        "p[{},{},{},{},{},{}]",
        pose[0], pose[1], pose[2], pose[3], pose[4], pose[5]
    )
}

/// Render a statement sequence to program text.
pub fn render(stmts: &[Stmt]) -> String {
    let mut out = String::new();
    for stmt in stmts {
        write_stmt(&mut out, stmt, 0);
    }
    out
}

fn write_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    let indent = "  ".repeat(depth);
    match stmt {
        Stmt::Pose { name, pose } => {
            out.push_str(&format!("{}{} = {}\n", indent, name, pose_literal(pose)));
        }
        Stmt::Assign { name, value } => {
            out.push_str(&format!("{}{} = {}\n", indent, name, value));
        }
        Stmt::Global { name, expr } => {
            out.push_str(&format!("{}global {} = {}\n", indent, name, expr));
        }
        Stmt::Def { name, params, body } => {
            out.push_str(&format!("{}def {}({}):\n", indent, name, params));
            for child in body {
                write_stmt(out, child, depth + 1);
            }
            out.push_str(&format!("{}end\n", indent));
        }
        Stmt::While { cond, body } => {
            out.push_str(&format!("{}while ({}):\n", indent, cond));
            for child in body {
                write_stmt(out, child, depth + 1);
            }
            out.push_str(&format!("{}end\n", indent));
        }
        Stmt::Move { kind, target, accel, vel } => {
            out.push_str(&format!(
                "{}{}({}, a={}, v={})\n",
                indent,
                kind.function(),
                target,
                accel,
                vel
            ));
        }
        Stmt::Call { name, args } => {
            let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
            out.push_str(&format!("{}{}({})\n", indent, name, rendered.join(", ")));
        }
        Stmt::Return(expr) => {
            out.push_str(&format!("{}return {}\n", indent, expr));
        }
        Stmt::Sleep(seconds) => {
            out.push_str(&format!("{}sleep({})\n", indent, seconds));
        }
        Stmt::Expr(expr) => {
            out.push_str(&format!("{}{}\n", indent, expr));
        }
        Stmt::Blank => {
            out.push('\n');
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn count_occurrences(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_pose_literal_format() {
        let pose = [0.13, -0.345, 0.548, 2.01, -0.001, -0.007];
        assert_eq!(pose_literal(&pose), "p[0.13,-0.345,0.548,2.01,-0.001,-0.007]");
    }

    #[test]
    fn test_render_def_is_balanced() {
        let stmts = vec![Stmt::Def {
            name: "prog".to_string(),
            params: String::new(),
            body: vec![Stmt::Call { name: "do_a".to_string(), args: vec![] }],
        }];
        let text = render(&stmts);
        assert_eq!(text, "def prog():\n  do_a()\nend\n");
    }

    #[test]
    fn test_render_nested_blocks() {
        let stmts = vec![Stmt::Def {
            name: "outer".to_string(),
            params: String::new(),
            body: vec![
                Stmt::Def {
                    name: "inner".to_string(),
                    params: "width, force=20".to_string(),
                    body: vec![Stmt::While {
                        cond: "busy()".to_string(),
                        body: vec![Stmt::Sleep(0.01)],
                    }],
                },
                Stmt::Call { name: "inner".to_string(), args: vec![Value::Num(50.0)] },
            ],
        }];
        let text = render(&stmts);
        let defs = count_occurrences(&text, "def ");
        let whiles = count_occurrences(&text, "while ");
        let ends = text.lines().filter(|l| l.trim() == "end").count();
        assert_eq!(defs + whiles, ends, "every block must close:\n{}", text);
        assert!(text.contains("  def inner(width, force=20):\n"));
        assert!(text.contains("      sleep(0.01)\n"));
        assert!(text.contains("  inner(50)\n"));
    }

    #[test]
    fn test_render_move_with_shared_params() {
        let stmts = vec![Stmt::Move {
            kind: MoveKind::Joint,
            target: "home".to_string(),
            accel: Value::Var("a"),
            vel: Value::Var("v"),
        }];
        assert_eq!(render(&stmts), "movej(home, a=a, v=v)\n");
    }

    #[test]
    fn test_render_move_with_literal_params() {
        let stmts = vec![Stmt::Move {
            kind: MoveKind::Linear,
            target: pose_literal(&[0.1, 0.2, 0.3, 0.0, 0.0, 0.0]),
            accel: Value::Num(1.2),
            vel: Value::Num(0.25),
        }];
        assert_eq!(render(&stmts), "movel(p[0.1,0.2,0.3,0,0,0], a=1.2, v=0.25)\n");
    }

    #[test]
    fn test_render_globals_and_return() {
        let stmts = vec![
            Stmt::Global {
                name: "RPC".to_string(),
                expr: "rpc_factory(\"xmlrpc\", \"http://10.0.0.1:41414\")".to_string(),
            },
            Stmt::Return("RPC.rg_get_busy(TOOL_INDEX)".to_string()),
        ];
        let text = render(&stmts);
        assert!(text.starts_with("global RPC = rpc_factory"));
        assert!(text.ends_with("return RPC.rg_get_busy(TOOL_INDEX)\n"));
    }

    #[test]
    fn test_render_call_args_joined() {
        let stmts = vec![Stmt::Call {
            name: "rg_grip".to_string(),
            args: vec![Value::Num(32.0), Value::Num(20.0)],
        }];
        assert_eq!(render(&stmts), "rg_grip(32, 20)\n");
    }

    #[test]
    fn test_render_blank_line_has_no_indent() {
        let stmts = vec![Stmt::Def {
            name: "prog".to_string(),
            params: String::new(),
            body: vec![Stmt::Blank],
        }];
        assert_eq!(render(&stmts), "def prog():\n\nend\n");
    }

    #[test]
    fn test_render_is_deterministic() {
        let stmts = vec![
            Stmt::Pose { name: "home".to_string(), pose: [0.13, -0.345, 0.548, 2.01, -0.001, -0.007] },
            Stmt::Assign { name: "a".to_string(), value: Value::Num(1.2) },
        ];
        assert_eq!(render(&stmts), render(&stmts));
    }
}
