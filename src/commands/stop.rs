//! Implementation of the stop command.
//!
//! This command cleanly terminates a running sunset-clock instance by sending
//! SIGTERM and waiting for the process to exit.

use anyhow::Result;
use std::time::Duration;

use crate::common::constants::STOP_WAIT_TIMEOUT_MS;
use crate::io::instance;

/// Handle the stop command to terminate a running sunset-clock instance.
pub fn handle_stop_command(debug_enabled: bool) -> Result<()> {
    log_version!();

    let Some(info) = instance::get_running_instance()? else {
        log_error_exit!("sunset-clock isn't running");
        return Ok(());
    };

    log_block_start!("Stopping sunset-clock instance (PID: {})...", info.pid);
    if let Err(e) = instance::terminate_instance(info.pid) {
        log_error_exit!("Failed to terminate instance: {}", e);
        return Ok(());
    }
    if debug_enabled {
        log_pipe!();
        log_debug!("SIGTERM sent to process {}", info.pid);
    }

    if instance::wait_for_exit(info.pid, Duration::from_millis(STOP_WAIT_TIMEOUT_MS)) {
        log_pipe!();
        log_info!("Process terminated successfully");
    } else {
        log_pipe!();
        log_warning!("Process did not terminate within the expected time");
        log_indented!(
            "The termination signal was sent, but the process may still be shutting down"
        );
    }
    log_end!();
    Ok(())
}

/// Display detailed help for the stop command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("stop - Cleanly terminate the running clock");
    log_block_start!("Usage: sunset-clock stop");
    log_block_start!("Description:");
    log_indented!("Sends SIGTERM to the running instance and waits up to");
    log_indented!("{} seconds for it to exit.", STOP_WAIT_TIMEOUT_MS / 1000);
    log_block_start!("Examples:");
    log_indented!("sunset-clock stop");
    log_end!();
}
