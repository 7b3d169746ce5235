//! Domain types — component orders, motion steps, compiled programs.
//!
//! An `Order` is the only input the rest of the application hands this
//! subsystem: three non-negative quantities, one per component type. The
//! compiler turns an order into a `CompiledProgram`; the transport client
//! consumes the program exactly once.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Components and orders
// ============================================================================

/// The closed set of component types the cell can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    A,
    B,
    C,
}

impl ComponentType {
    /// All component types, in invocation order.
    pub const ALL: [ComponentType; 3] = [Self::A, Self::B, Self::C];

    /// Name of the generated subroutine for this component.
    pub fn subroutine(&self) -> &'static str {
        match self {
            Self::A => "do_a",
            Self::B => "do_b",
            Self::C => "do_c",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
            Self::C => write!(f, "C"),
        }
    }
}

impl FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(Self::A),
            "b" => Ok(Self::B),
            "c" => Ok(Self::C),
            other => Err(format!("unknown component type '{}'", other)),
        }
    }
}

/// Order validation error, detected at the dispatch boundary before any
/// compilation or transport work happens.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("quantity for component {component} is negative: {value}")]
    NegativeQuantity { component: ComponentType, value: i64 },

    #[error("quantity for component {component} exceeds the supported range: {value}")]
    QuantityOverflow { component: ComponentType, value: i64 },
}

/// A manufacturing order: how many of each component to produce.
///
/// Quantities are `u32` so a constructed order is non-negative by type.
/// The surrounding application supplies raw signed counts; `Order::new`
/// is the validation boundary for those.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub qty_a: u32,
    pub qty_b: u32,
    pub qty_c: u32,
}

impl Order {
    /// Validate raw counts into an order. An all-zero order is valid and
    /// compiles to a no-op program.
    pub fn new(qty_a: i64, qty_b: i64, qty_c: i64) -> Result<Self, OrderError> {
        Ok(Self {
            qty_a: checked_quantity(ComponentType::A, qty_a)?,
            qty_b: checked_quantity(ComponentType::B, qty_b)?,
            qty_c: checked_quantity(ComponentType::C, qty_c)?,
        })
    }

    /// An order for exactly one unit of one component.
    pub fn single(component: ComponentType) -> Self {
        let mut order = Self { qty_a: 0, qty_b: 0, qty_c: 0 };
        match component {
            ComponentType::A => order.qty_a = 1,
            ComponentType::B => order.qty_b = 1,
            ComponentType::C => order.qty_c = 1,
        }
        order
    }

    /// Quantity requested for a component.
    pub fn quantity(&self, component: ComponentType) -> u32 {
        match component {
            ComponentType::A => self.qty_a,
            ComponentType::B => self.qty_b,
            ComponentType::C => self.qty_c,
        }
    }

    /// Total units across all components.
    pub fn total(&self) -> u64 {
        u64::from(self.qty_a) + u64::from(self.qty_b) + u64::from(self.qty_c)
    }

    /// True when every quantity is zero.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A={} B={} C={}", self.qty_a, self.qty_b, self.qty_c)
    }
}

fn checked_quantity(component: ComponentType, value: i64) -> Result<u32, OrderError> {
    if value < 0 {
        return Err(OrderError::NegativeQuantity { component, value });
    }
    u32::try_from(value).map_err(|_| OrderError::QuantityOverflow { component, value })
}

// ============================================================================
// Waypoints and motion steps
// ============================================================================

/// A named six-component Cartesian pose (x, y, z, rx, ry, rz).
///
/// Waypoints are process-wide constants; the values are hand-tuned against
/// the physical cell and must not be derived or rounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub name: &'static str,
    pub pose: [f64; 6],
}

/// One step of a pick-and-place recipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionStep {
    /// Joint-interpolated move to a named waypoint.
    JointMove { target: &'static str, accel: f64, vel: f64 },
    /// Linear (tool-space) move to a named waypoint.
    LinearMove { target: &'static str, accel: f64, vel: f64 },
    /// Gripper actuation to a width, with a force limit.
    Grip { width: f64, force: f64 },
}

// ============================================================================
// Compiled programs and control commands
// ============================================================================

/// The rendered URScript text for one order.
///
/// Opaque and immutable; consumed exactly once by the transport client.
/// Always ends in exactly one newline — the controller reads line by line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProgram(String);

impl CompiledProgram {
    pub(crate) fn new(mut text: String) -> Self {
        while text.ends_with('\n') {
            text.pop();
        }
        text.push('\n');
        Self(text)
    }

    /// The program text.
    pub fn text(&self) -> &str {
        &self.0
    }

    /// Consume the program, yielding its text.
    pub fn into_text(self) -> String {
        self.0
    }
}

/// Single-word operational commands for the controller's dashboard port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    BrakeRelease,
    Stop,
}

impl ControlCommand {
    /// The fixed wire line for this command, newline included.
    pub fn as_line(&self) -> &'static str {
        match self {
            Self::BrakeRelease => "brake release\n",
            Self::Stop => "stop\n",
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrakeRelease => write!(f, "brake release"),
            Self::Stop => write!(f, "stop"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
