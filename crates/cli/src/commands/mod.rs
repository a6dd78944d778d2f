//! `gridctl` subcommand implementations.

pub mod agent;
pub mod case;
pub mod status;
pub mod submit;
