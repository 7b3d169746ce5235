//! Core order logic — types, config, recipes, compilation, dispatch.

pub mod codegen;
pub mod config;
pub mod dispatcher;
pub mod gripper;
pub mod recipes;
pub mod script;
pub mod types;
