// src/commands/mod.rs
//! Command handlers for the sous CLI

mod cook;
mod requirements;
mod validate;

pub use cook::{CookArgs, cmd_cook};
pub use requirements::cmd_requirements;
pub use validate::cmd_validate;
