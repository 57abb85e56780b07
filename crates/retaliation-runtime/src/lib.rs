//! Dispatch loop for Retaliation.
//!
//! This crate connects the CI server to the launchers:
//! - `StatusSource` - anything that can report the current failed build
//! - `TeamCitySource` - the TeamCity REST implementation
//! - `EventPoller` - polls the source, resolves the culprit and runs their sequence
//!
//! # Example
//!
//! ```ignore
//! use retaliation_core::{BlockingSleeper, CancelToken, ServerConfig};
//! use retaliation_runtime::{EventPoller, PollerConfig, TeamCitySource};
//!
//! let token = CancelToken::new();
//! let server = ServerConfig::from_env()?;
//! let source = TeamCitySource::new(&server)?;
//! let config = PollerConfig::new().with_interval(server.poll_interval);
//!
//! let mut poller = EventPoller::new(
//!     source,
//!     resolver,
//!     runner,
//!     config,
//!     token.clone(),
//!     BlockingSleeper::new(token),
//! );
//! let stats = poller.run();
//! ```
//!
//! # Key Concepts
//!
//! ## EventPoller
//!
//! Each cycle the poller:
//! - Asks the source for the current failed build
//! - Looks the responsible user up in the targeting table
//! - Runs the matching sequence on its launcher
//! - Cools down for the configured interval
//!
//! The source is not diffed against earlier cycles, so a build that stays
//! red is punished again on every cycle.

pub mod config;
pub mod error;
pub mod poller;
pub mod source;
pub mod teamcity;

pub use config::PollerConfig;
pub use error::{Result, StatusError};
pub use poller::{CycleOutcome, EventPoller, PollerState, PollerStats};
pub use source::StatusSource;
pub use teamcity::{scrape_build_event, TeamCitySource};
