//! Binary entry point: parse arguments and dispatch.

use anyhow::Result;

use sunset_clock::args::{self, CliAction, ParsedArgs};
use sunset_clock::commands;
use sunset_clock::common::constants::EXIT_FAILURE;
use sunset_clock::config;
use sunset_clock::logger::Log;
use sunset_clock::{SunsetClock, log_error_exit};

fn main() -> Result<()> {
    let parsed_args = ParsedArgs::from_env();

    match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Help { command } => commands::help::run_help_command(command.as_deref()),
        CliAction::Run {
            debug_enabled,
            config_dir,
        } => {
            prepare(debug_enabled, config_dir);
            SunsetClock::new(debug_enabled).run()
        }
        CliAction::Refresh {
            debug_enabled,
            config_dir,
        } => {
            prepare(debug_enabled, config_dir);
            commands::refresh::handle_refresh_command(debug_enabled)
        }
        CliAction::Stop {
            debug_enabled,
            config_dir,
        } => {
            prepare(debug_enabled, config_dir);
            commands::stop::handle_stop_command(debug_enabled)
        }
        CliAction::Status {
            debug_enabled,
            config_dir,
        } => {
            prepare(debug_enabled, config_dir);
            commands::status::handle_status_command(debug_enabled)
        }
        CliAction::CacheShow {
            debug_enabled,
            config_dir,
        } => {
            prepare(debug_enabled, config_dir);
            commands::cache::handle_cache_show_command()
        }
        CliAction::CacheClear {
            debug_enabled,
            config_dir,
            assume_yes,
        } => {
            prepare(debug_enabled, config_dir);
            commands::cache::handle_cache_clear_command(assume_yes)
        }
    }
}

/// Apply the global flags before any command runs.
///
/// Without `--config` the directory stays unset so that commands talking to
/// a running clock can adopt the one recorded in its lock file.
fn prepare(debug_enabled: bool, config_dir: Option<String>) {
    Log::set_debug(debug_enabled);
    if config_dir.is_some()
        && let Err(e) = config::set_config_dir(config_dir)
    {
        log_error_exit!("{e}");
        std::process::exit(EXIT_FAILURE);
    }
}
