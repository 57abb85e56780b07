//! Build-failure poller.
//!
//! ```text
//! Idle -> Polling -> Dispatching -> Cooldown -> Polling -> ...
//!                \-----------------/
//! ```
//!
//! `Stopped` is reached only when the cancel token fires. A cycle that finds
//! no failure, no responsible user, or no matching target goes straight to
//! cooldown.

use std::fmt;

use tracing::{debug, info, trace, warn};

use retaliation_core::{CancelToken, RunReport, SequenceRunner, Sleeper, TargetResolver};
use retaliation_models::DeviceSlot;

use crate::config::PollerConfig;
use crate::source::StatusSource;

/// Where the poller is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// Not started yet.
    Idle,
    /// Querying the status source.
    Polling,
    /// Running a target's sequence.
    Dispatching,
    /// Waiting for the next poll.
    Cooldown,
    /// Cancelled; will not poll again.
    Stopped,
}

impl fmt::Display for PollerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PollerState::Idle => "idle",
            PollerState::Polling => "polling",
            PollerState::Dispatching => "dispatching",
            PollerState::Cooldown => "cooldown",
            PollerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Result of a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A target's sequence was run.
    Dispatched {
        user: String,
        project: String,
        slot: DeviceSlot,
        report: RunReport,
    },
    /// The failing build's user has no entry in the targeting table.
    NoTarget { user: String },
    /// No failed build, or it does not name anyone.
    NoResponsibleParty,
    /// The status source could not be queried.
    SourceUnavailable(String),
    /// Cancelled while dispatching.
    Cancelled,
}

/// Totals for a finished [`EventPoller::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollerStats {
    /// Polls performed.
    pub cycles: usize,
    /// Polls that ran a sequence.
    pub dispatches: usize,
}

/// Polls a status source and punishes whoever broke the build.
pub struct EventPoller<S> {
    source: S,
    resolver: TargetResolver,
    runner: SequenceRunner,
    config: PollerConfig,
    token: CancelToken,
    sleeper: Box<dyn Sleeper>,
    state: PollerState,
}

impl<S: StatusSource> EventPoller<S> {
    /// Creates a poller. `sleeper` is used for the cooldown only.
    pub fn new(
        source: S,
        resolver: TargetResolver,
        runner: SequenceRunner,
        config: PollerConfig,
        token: CancelToken,
        sleeper: impl Sleeper + 'static,
    ) -> Self {
        Self {
            source,
            resolver,
            runner,
            config,
            token,
            sleeper: Box::new(sleeper),
            state: PollerState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> PollerState {
        self.state
    }

    fn transition(&mut self, next: PollerState) {
        trace!(from = %self.state, to = %next, "poller state change");
        self.state = next;
    }

    /// Run the polling loop until the cancel token fires.
    pub fn run(&mut self) -> PollerStats {
        let mut stats = PollerStats::default();
        info!(
            interval_secs = self.config.interval.as_secs(),
            "listening and waiting for TeamCity failed build events"
        );

        while !self.token.is_cancelled() {
            let outcome = self.cycle();
            stats.cycles += 1;

            match outcome {
                CycleOutcome::Dispatched { .. } => stats.dispatches += 1,
                CycleOutcome::Cancelled => break,
                _ => {}
            }

            self.transition(PollerState::Cooldown);
            if self.sleeper.sleep(self.config.interval).is_err() {
                debug!("cooldown interrupted");
                break;
            }
        }

        self.transition(PollerState::Stopped);
        info!(
            cycles = stats.cycles,
            dispatches = stats.dispatches,
            "poller stopped"
        );
        stats
    }

    /// Performs one poll and, if warranted, one dispatch.
    ///
    /// The same failing build is dispatched again on every call; nothing is
    /// remembered between cycles.
    pub fn cycle(&mut self) -> CycleOutcome {
        self.transition(PollerState::Polling);

        let event = match self.source.failed_build() {
            Ok(Some(event)) => event,
            Ok(None) => {
                warn!("could not identify the user who broke the build");
                return CycleOutcome::NoResponsibleParty;
            }
            Err(e) => {
                warn!(error = %e, "status source unavailable");
                return CycleOutcome::SourceUnavailable(e.to_string());
            }
        };

        info!(project = %event.project_name, "build failed");
        info!(user = %event.responsible_user, "target identified");

        self.transition(PollerState::Dispatching);
        let Some(entry) = self.resolver.resolve(&event.responsible_user) else {
            warn!(user = %event.responsible_user, "no target command set defined for user");
            return CycleOutcome::NoTarget {
                user: event.responsible_user,
            };
        };

        match self.runner.run(&entry.sequence) {
            Ok(report) => {
                info!(user = %event.responsible_user, slot = %entry.slot(), "target neutralised");
                CycleOutcome::Dispatched {
                    slot: entry.slot(),
                    user: event.responsible_user,
                    project: event.project_name,
                    report,
                }
            }
            Err(_) => {
                self.transition(PollerState::Stopped);
                CycleOutcome::Cancelled
            }
        }
    }
}
