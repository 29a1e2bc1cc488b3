//! Help command implementation for sunset-clock.
//!
//! Dispatches to command-specific help or shows the command list.

use anyhow::Result;

/// Run the help command (dispatcher)
///
/// # Arguments
/// * `command` - Optional command name to get help for (None = general help)
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => display_general_help(),
        Some("run") => display_run_help(),
        Some("refresh" | "r") => super::refresh::display_help(),
        Some("stop") => super::stop::display_help(),
        Some("status" | "S") => super::status::display_help(),
        Some("cache") => super::cache::display_help(),
        Some("help") => display_help_help(),
        Some(unknown) => {
            log_warning_standalone!("Unknown command: {}", unknown);
            display_general_help();
        }
    }
    Ok(())
}

/// Display general help focused on commands (for the help command)
fn display_general_help() {
    log_version!();
    log_block_start!("Available Commands:");
    log_indented!("run                     Show the countdown to sunset (default)");
    log_indented!("refresh, r              Re-resolve today's sunset in the running clock");
    log_indented!("stop                    Stop the running clock");
    log_indented!("status, S               Diagnose location, sunset and cache");
    log_indented!("cache <show|clear>      Inspect or reset the sunset cache");
    log_indented!("help [COMMAND]          Show detailed help for a command");
    log_pipe!();
    log_info!("Use 'sunset-clock help <command>' to see detailed help for a specific command.");
    log_indented!("Use 'sunset-clock --help' to see all options and general usage.");
    log_end!();
}

fn display_run_help() {
    log_version!();
    log_block_start!("run - Show the countdown to sunset");
    log_block_start!("Usage: sunset-clock [run]");
    log_block_start!("Description:");
    log_indented!("Redraws '<label> HH:MM' once per second until today's sunset.");
    log_indented!("Once it has passed, the countdown shows 00:00 until the rollover");
    log_indented!("hour (20:00 by default), then counts down to tomorrow's sunset.");
    log_indented!("Only one clock can run at a time.");
    log_block_start!("Signals:");
    log_indented!("SIGUSR1                 Refresh (same as 'sunset-clock refresh')");
    log_indented!("SIGINT, SIGTERM, SIGHUP Shut down");
    log_end!();
}

/// Display help for the help command itself
fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: sunset-clock help [COMMAND]");
    log_block_start!("Arguments:");
    log_indented!("COMMAND  Optional command to get help for");
    log_indented!("         If omitted, shows general help");
    log_end!();
}
