//! The assistants surface: assistants, threads, messages, runs and the run
//! lifecycle driver.

pub mod assistants;
pub mod lifecycle;
pub mod messages;
pub mod runs;
pub mod threads;

pub use assistants::*;
pub use lifecycle::{PollPolicy, RunDriver, ToolRegistry};
