//! Sequence runner.

use tracing::{debug, info, warn};

use retaliation_models::InstructionSequence;

use crate::cancel::{CancelToken, Cancelled};
use crate::error::InterpretError;
use crate::interpreter::CommandInterpreter;

/// What happened during one sequence run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Commands that completed.
    pub applied: usize,
    /// Commands that failed and were skipped.
    pub failed: usize,
}

/// Plays instruction sequences one command at a time.
///
/// Commands run strictly in order; the aim depends on it. A failing command
/// is logged and skipped, and there is no rollback beyond whatever `Park`
/// the sequence itself contains.
pub struct SequenceRunner {
    interpreter: CommandInterpreter,
    token: CancelToken,
}

impl SequenceRunner {
    /// Creates a runner. `token` is checked between commands.
    pub fn new(interpreter: CommandInterpreter, token: CancelToken) -> Self {
        Self { interpreter, token }
    }

    /// The interpreter driving the launchers.
    pub fn interpreter_mut(&mut self) -> &mut CommandInterpreter {
        &mut self.interpreter
    }

    /// Runs `sequence` on its bound launcher.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the run was interrupted; the remaining
    /// commands are not executed.
    pub fn run(&mut self, sequence: &InstructionSequence) -> Result<RunReport, Cancelled> {
        let slot = sequence.slot;
        let mut report = RunReport::default();
        info!(slot = %slot, commands = sequence.len(), "running sequence");

        for (position, command) in sequence.iter().enumerate() {
            self.token.check()?;

            match self.interpreter.apply(command, slot) {
                Ok(()) => report.applied += 1,
                Err(InterpretError::Cancelled(c)) => {
                    debug!(slot = %slot, position, "sequence interrupted");
                    return Err(c);
                }
                Err(e) => {
                    warn!(
                        slot = %slot,
                        position,
                        command = %command,
                        error = %e,
                        "command failed, continuing with the next one"
                    );
                    report.failed += 1;
                }
            }
        }

        info!(
            slot = %slot,
            applied = report.applied,
            failed = report.failed,
            "sequence finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{recording_registry, RecordingSleeper, Timeline};
    use retaliation_models::{Command, DeviceSlot, Direction};
    use retaliation_usb::Dialect;
    use std::time::Duration;

    fn runner(timeline: &Timeline, token: &CancelToken) -> SequenceRunner {
        let interpreter = CommandInterpreter::new(
            recording_registry(Dialect::Thunder, timeline),
            RecordingSleeper::new(timeline.clone()).with_token(token.clone()),
        );
        SequenceRunner::new(interpreter, token.clone())
    }

    #[test]
    fn test_runs_commands_in_order() {
        let timeline = Timeline::new();
        let token = CancelToken::new();
        let mut runner = runner(&timeline, &token);

        let sequence = InstructionSequence::new(
            DeviceSlot::Two,
            vec![
                Command::movement(Direction::Right, 100),
                Command::Pause { duration_ms: 50 },
                Command::movement(Direction::Up, 20),
            ],
        );
        let report = runner.run(&sequence).unwrap();

        assert_eq!(report, RunReport { applied: 3, failed: 0 });
        assert_eq!(
            timeline.waits(),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(50),
                Duration::from_millis(20),
            ]
        );
        let bytes: Vec<u8> = timeline
            .transfers_for(DeviceSlot::Two)
            .iter()
            .map(|t| t.data[1])
            .collect();
        assert_eq!(bytes, vec![0x08, 0x20, 0x02, 0x20]);
        assert!(timeline.transfers_for(DeviceSlot::One).is_empty());
    }

    #[test]
    fn test_failed_commands_do_not_stop_the_run() {
        let timeline = Timeline::new();
        timeline.fail_transfers(true);
        let token = CancelToken::new();
        let mut runner = runner(&timeline, &token);

        let sequence = InstructionSequence::new(
            DeviceSlot::One,
            vec![
                Command::Fire { count: 1 },
                Command::Pause { duration_ms: 10 },
                Command::movement(Direction::Left, 10),
            ],
        );
        let report = runner.run(&sequence).unwrap();

        assert_eq!(report, RunReport { applied: 1, failed: 2 });
        assert!(timeline.waits().contains(&Duration::from_millis(10)));
    }

    #[test]
    fn test_cancelled_before_start_runs_nothing() {
        let timeline = Timeline::new();
        let token = CancelToken::new();
        let mut runner = runner(&timeline, &token);
        token.cancel();

        let sequence = InstructionSequence::new(DeviceSlot::One, vec![Command::Park]);
        assert_eq!(runner.run(&sequence), Err(Cancelled));
        assert!(timeline.events().is_empty());
    }

    #[test]
    fn test_replaying_a_sequence_repeats_it_exactly() {
        let timeline = Timeline::new();
        let token = CancelToken::new();
        let mut runner = runner(&timeline, &token);
        let sequence = InstructionSequence::new(
            DeviceSlot::One,
            vec![Command::Park, Command::Fire { count: 2 }, Command::Park],
        );

        runner.run(&sequence).unwrap();
        let first = timeline.events();
        timeline.clear();
        runner.run(&sequence).unwrap();

        assert_eq!(timeline.events(), first);
    }
}
