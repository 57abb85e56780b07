//! Command-line interface definition using clap.

use clap::Parser;

use retaliation_models::DeviceSlot;

/// Action that starts the build-failure poller.
pub const STALK: &str = "stalk";

const COMMANDS_HELP: &str = "\
Commands:
  stalk             Poll TeamCity and shoot whoever broke the build
  <target>          Run a target's command set once (e.g. tom)
  up|down|left|right <ms> [device]
                    Move for <ms> milliseconds
  zero|park|reset   Park at the bottom-left reference point
  pause|sleep <ms>  Wait without moving
  led 0|1 [device]  Turn the LED off or on (Thunder launchers only)
  fire|shoot <n>    Fire <n> missiles (1-4)

Examples:
  retaliation stalk
  retaliation up 500 2
  retaliation fire 4";

/// Retaliation - shoot foam missiles at whoever broke the build
#[derive(Parser, Debug)]
#[command(name = "retaliation")]
#[command(author, version, about, long_about = None, after_help = COMMANDS_HELP)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// `stalk`, a target name, or a launcher command
    pub action: String,

    /// Duration in milliseconds, shot count, or LED state
    #[arg(allow_negative_numbers = true)]
    pub value: Option<i64>,

    /// Launcher to drive: 1 or 2
    pub device: Option<DeviceSlot>,
}

impl Cli {
    /// Returns the log level based on verbosity.
    ///
    /// `stalk` starts at INFO so the poller's milestones are visible.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 if self.action.trim().eq_ignore_ascii_case(STALK) => tracing::Level::INFO,
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    /// The launcher a raw command goes to.
    pub fn slot(&self) -> DeviceSlot {
        self.device.unwrap_or(DeviceSlot::One)
    }

    /// The raw command value, zero when omitted.
    pub fn value(&self) -> i64 {
        self.value.unwrap_or(0)
    }
}
