//! Retaliation Core - the command protocol engine.
//!
//! This crate turns symbolic launcher instructions into timed USB traffic
//! and decides who gets shot:
//!
//! - **interpreter**: encode a `Command` into transfers and waits for the active dialect
//! - **runner**: execute an instruction sequence, in order, on its bound launcher
//! - **resolver**: case-insensitive lookup of a user in the targeting table
//! - **targets**: the built-in targeting table and the JSON targets file
//! - **cancel**: cancellation token and interruptible blocking sleeps
//! - **config**: state directory, `.env.local` loading and environment settings
//!
//! Everything is synchronous. Every wait goes through a [`Sleeper`], which
//! is also the only place a run can be interrupted.

pub mod cancel;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod resolver;
pub mod runner;
pub mod targets;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cancel::{BlockingSleeper, CancelToken, Cancelled, Sleeper};
pub use config::{
    load_env, state_dir, state_dir_from, targets_file, targets_file_from, Credentials, ServerConfig,
};
pub use error::{ConfigError, InterpretError, TargetError};
pub use interpreter::{encode, CommandInterpreter, Step, FIRE_LEAD_IN, RELOAD_DELAY};
pub use resolver::TargetResolver;
pub use runner::{RunReport, SequenceRunner};
pub use targets::{default_targets, load_resolver, load_targets, parse_targets, TargetFile};
