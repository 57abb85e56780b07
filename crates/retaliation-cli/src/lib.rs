//! Retaliation CLI library.
//!
//! Argument parsing and command handlers for the `retaliation` binary. The
//! binary either drives a launcher directly (`retaliation up 500 2`), runs a
//! target's command set once (`retaliation tom`), or stalks the CI server
//! (`retaliation stalk`).

pub mod cli;
pub mod commands;

use std::io;

use signal_hook::consts::{SIGINT, SIGTERM};

use retaliation_core::CancelToken;

/// Cancels `token` on SIGINT or SIGTERM.
///
/// Waits observe the token, so an interrupted motion is stopped before the
/// process exits.
pub fn install_signal_handlers(token: &CancelToken) -> io::Result<()> {
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, token.flag())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_signal_handlers() {
        let token = CancelToken::new();
        install_signal_handlers(&token).unwrap();
        assert!(!token.is_cancelled());
    }
}
