//! Helpers for writing probes.
//!
//! [`CommandCheck`] runs a shell command and checks its exit code and output;
//! [`CommandCollection`] turns a list of such checks into a test collection.

mod command;
mod command_collection;

pub use command::{output_pattern, CheckReport, CommandCheck, DEFAULT_TIMEOUT, SUCCESS_MESSAGE};
pub use command_collection::{CommandCollection, DEFAULT_KIND};
