//! Command handlers for the `retaliation` binary.

use tracing::warn;

use retaliation_core::{
    load_resolver, targets_file, BlockingSleeper, CancelToken, CommandInterpreter,
    InterpretError, SequenceRunner, ServerConfig, TargetResolver,
};
use retaliation_models::{Command, CommandParseError, DeviceSlot, TargetEntry};
use retaliation_runtime::{EventPoller, PollerConfig, TeamCitySource};

use crate::cli::{Cli, STALK};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// What a command line asks for, decided before any hardware is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Poll the CI server until interrupted.
    Stalk,
    /// Run a target's sequence once.
    Target(TargetEntry),
    /// Apply a single command to one launcher.
    Raw { command: Command, slot: DeviceSlot },
    /// The action is not a target and does not parse as a command.
    Unknown(CommandParseError),
}

/// Works out what `cli` asks for.
///
/// `stalk` wins over a target of the same name, and a target wins over a
/// command of the same name.
pub fn plan(cli: &Cli, resolver: &TargetResolver) -> Plan {
    let action = cli.action.trim();

    if action.eq_ignore_ascii_case(STALK) {
        return Plan::Stalk;
    }

    if let Some(entry) = resolver.resolve(action) {
        return Plan::Target(entry.clone());
    }

    match Command::parse(action, cli.value()) {
        Ok(command) => Plan::Raw {
            command,
            slot: cli.slot(),
        },
        Err(e) => Plan::Unknown(e),
    }
}

/// Execute the command line.
pub fn execute(cli: &Cli, token: &CancelToken) -> Result<()> {
    let targets = targets_file();
    let resolver = load_resolver(targets.as_deref())?;

    match plan(cli, &resolver) {
        Plan::Stalk => cmd_stalk(resolver, token),
        Plan::Target(entry) => cmd_target(&entry, token),
        Plan::Raw { command, slot } => cmd_raw(&command, slot, token),
        Plan::Unknown(e) => {
            warn!(error = %e, "nothing to do");
            println!("{}. Run `retaliation --help` for the list of commands.", e);
            Ok(())
        }
    }
}

fn interpreter(token: &CancelToken) -> Result<CommandInterpreter> {
    let registry = retaliation_usb::discover()?;
    Ok(CommandInterpreter::new(
        registry,
        BlockingSleeper::new(token.clone()),
    ))
}

fn cmd_stalk(resolver: TargetResolver, token: &CancelToken) -> Result<()> {
    let server = ServerConfig::from_env()?;
    let source = TeamCitySource::new(&server)?;
    let runner = SequenceRunner::new(interpreter(token)?, token.clone());
    let config = PollerConfig::new().with_interval(server.poll_interval);

    println!(
        "Stalking failed builds on {} every {}s, {} targets loaded. Press Ctrl-C to stop.",
        server.base_url,
        config.interval.as_secs(),
        resolver.len()
    );

    let mut poller = EventPoller::new(
        source,
        resolver,
        runner,
        config,
        token.clone(),
        BlockingSleeper::new(token.clone()),
    );
    let stats = poller.run();

    println!(
        "Stopped after {} polls and {} dispatches.",
        stats.cycles, stats.dispatches
    );
    Ok(())
}

fn cmd_target(entry: &TargetEntry, token: &CancelToken) -> Result<()> {
    let mut runner = SequenceRunner::new(interpreter(token)?, token.clone());

    println!("Targeting '{}' with {}", entry.key, entry.slot());
    match runner.run(&entry.sequence) {
        Ok(report) if report.failed > 0 => {
            println!(
                "Done: {} commands applied, {} failed.",
                report.applied, report.failed
            );
        }
        Ok(report) => println!("Done: {} commands applied.", report.applied),
        Err(_) => println!("Interrupted."),
    }
    Ok(())
}

fn cmd_raw(command: &Command, slot: DeviceSlot, token: &CancelToken) -> Result<()> {
    let mut interpreter = interpreter(token)?;

    match interpreter.apply(command, slot) {
        Ok(()) => Ok(()),
        Err(InterpretError::Cancelled(_)) => {
            println!("Interrupted.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
