//! Command interpreter.
//!
//! Each [`Command`] is first encoded into a flat list of [`Step`]s for the
//! active [`Dialect`], then the steps are played against one launcher. The
//! encoding is pure, so the exact transfer/wait pattern of every command can
//! be inspected without hardware.

use std::time::Duration;

use tracing::{debug, trace, warn};

use retaliation_models::{effective_shots, Command, DeviceSlot};
use retaliation_usb::{CommandByte, ControlTransfer, Dialect, RegistryHandle};

use crate::cancel::Sleeper;
use crate::error::InterpretError;

/// Settle time before the first shot of a volley.
pub const FIRE_LEAD_IN: Duration = Duration::from_millis(500);

/// Reload time after every shot, the last one included.
pub const RELOAD_DELAY: Duration = Duration::from_millis(4500);

/// One primitive action against a launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Send a control transfer.
    Transfer(ControlTransfer),
    /// Block for a while.
    Wait(Duration),
}

/// Encodes a command into steps for `dialect`.
///
/// - `Move` is always `start, wait, stop`; the stop is what ends the motion.
/// - `Fire` waits [`FIRE_LEAD_IN`], then sends one fire transfer followed by
///   [`RELOAD_DELAY`] per shot.
/// - `Led` is empty on dialects without an LED.
/// - `Park` is the concatenation of its expansion.
pub fn encode(command: &Command, dialect: Dialect) -> Vec<Step> {
    match command {
        Command::Move {
            direction,
            duration_ms,
        } => vec![
            Step::Transfer(dialect.command_transfer(CommandByte::from(*direction))),
            Step::Wait(Duration::from_millis(*duration_ms)),
            Step::Transfer(dialect.command_transfer(CommandByte::Stop)),
        ],
        Command::Fire { count } => {
            let shots = effective_shots(*count) as usize;
            let mut steps = Vec::with_capacity(1 + shots * 2);
            steps.push(Step::Wait(FIRE_LEAD_IN));
            for _ in 0..shots {
                steps.push(Step::Transfer(dialect.command_transfer(CommandByte::Fire)));
                steps.push(Step::Wait(RELOAD_DELAY));
            }
            steps
        }
        Command::Led { on } => dialect
            .led_transfer(*on)
            .map(Step::Transfer)
            .into_iter()
            .collect(),
        Command::Park => command
            .expand()
            .iter()
            .flat_map(|primitive| encode(primitive, dialect))
            .collect(),
        Command::Pause { duration_ms } => vec![Step::Wait(Duration::from_millis(*duration_ms))],
    }
}

/// Executes commands against the launchers in a [`RegistryHandle`].
pub struct CommandInterpreter {
    registry: RegistryHandle,
    sleeper: Box<dyn Sleeper>,
}

impl CommandInterpreter {
    /// Creates an interpreter that owns the launchers.
    pub fn new(registry: RegistryHandle, sleeper: impl Sleeper + 'static) -> Self {
        Self {
            registry,
            sleeper: Box::new(sleeper),
        }
    }

    /// The dialect fixed at discovery.
    pub fn dialect(&self) -> Dialect {
        self.registry.dialect()
    }

    /// The launchers being driven.
    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    /// Executes `command` on the launcher in `slot`, blocking for its waits.
    ///
    /// If a motion is interrupted by cancellation, a stop is still sent so
    /// the turret does not keep turning.
    ///
    /// # Errors
    ///
    /// Returns `InterpretError::Transfer` if the launcher rejects a transfer
    /// and `InterpretError::Cancelled` if a wait was interrupted.
    pub fn apply(&mut self, command: &Command, slot: DeviceSlot) -> Result<(), InterpretError> {
        let dialect = self.dialect();
        debug!(slot = %slot, command = %command, "applying command");

        if let Command::Led { .. } = command {
            if !dialect.has_led() {
                warn!(slot = %slot, dialect = %dialect, "there is no LED on this device");
                return Ok(());
            }
        }

        for step in encode(command, dialect) {
            match self.play(&step, slot) {
                Ok(()) => {}
                Err(InterpretError::Cancelled(c)) => {
                    if matches!(command, Command::Move { .. } | Command::Park) {
                        self.emergency_stop(slot);
                    }
                    return Err(c.into());
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    fn play(&mut self, step: &Step, slot: DeviceSlot) -> Result<(), InterpretError> {
        match step {
            Step::Transfer(transfer) => {
                trace!(slot = %slot, %transfer, "sending transfer");
                self.registry.device_mut(slot).send(transfer)?;
            }
            Step::Wait(duration) => {
                trace!(slot = %slot, duration_ms = duration.as_millis(), "waiting");
                self.sleeper.sleep(*duration)?;
            }
        }
        Ok(())
    }

    fn emergency_stop(&mut self, slot: DeviceSlot) {
        let stop = self.dialect().command_transfer(CommandByte::Stop);
        if let Err(e) = self.registry.device_mut(slot).send(&stop) {
            warn!(slot = %slot, error = %e, "failed to stop launcher after cancellation");
        }
    }
}
