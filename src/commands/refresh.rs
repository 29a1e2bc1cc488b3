//! Implementation of the refresh command.
//!
//! Signals the running clock to drop its current sunset and resolve today's
//! again from the network, bypassing the cache.

use anyhow::Result;

use crate::io::instance;

/// Handle the refresh command by sending SIGUSR1 to the running instance.
pub fn handle_refresh_command(debug_enabled: bool) -> Result<()> {
    log_version!();

    let Some(info) = instance::get_running_instance()? else {
        log_error_exit!("sunset-clock isn't running");
        return Ok(());
    };

    log_block_start!("Signaling sunset-clock to refresh (PID: {})...", info.pid);
    if let Err(e) = instance::send_refresh_signal(info.pid) {
        log_error_exit!("{}", e);
        return Ok(());
    }
    if debug_enabled {
        log_pipe!();
        log_debug!("SIGUSR1 sent to process {}", info.pid);
    }
    log_decorated!("Refresh requested, today's sunset will be resolved again");

    log_end!();
    Ok(())
}

/// Display detailed help for the refresh command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("refresh - Re-resolve today's sunset");
    log_block_start!("Usage: sunset-clock refresh");
    log_block_start!("Description:");
    log_indented!("Tells the running clock to forget the sunset it is showing and");
    log_indented!("look today's up again, ignoring the cache and any retry wait.");
    log_indented!("If the lookup fails, the clock falls back to the cached value.");
    log_block_start!("Examples:");
    log_indented!("sunset-clock refresh");
    log_indented!("sunset-clock --debug refresh");
    log_end!();
}
