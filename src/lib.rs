//! Celda — robot cell order dispatch.
//!
//! Deterministic URScript codegen. One order, one program, one connection.
//! Open-loop: bytes are delivered, execution is never confirmed.

pub mod cli;
pub mod core;
pub mod transport;
