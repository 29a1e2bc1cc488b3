//! Command-line argument parsing and processing.
//!
//! Global flags (`--debug`, `--config <dir>`, `--help`, `--version`) may appear
//! anywhere; the first non-flag argument selects the command. Without a
//! command the clock runs in the foreground.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the countdown clock
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Ask the running clock to re-resolve today's sunset
    Refresh {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Terminate the running clock
    Stop {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// One-shot diagnostic of location, sunset and cache
    Status {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// List cached sunset entries
    CacheShow {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Back up and empty the sunset cache
    CacheClear {
        debug_enabled: bool,
        config_dir: Option<String>,
        assume_yes: bool,
    },
    /// Detailed help for one command (or the command list)
    Help { command: Option<String> },

    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first item is the program name and is skipped.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut assume_yes = false;
        let mut unknown_arg_found = false;
        let mut config_dir: Option<String> = None;
        let mut positionals: Vec<String> = Vec::new();

        let mut i = 0;
        while i < args_vec.len() {
            let arg = &args_vec[i];
            match arg.as_str() {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => debug_enabled = true,
                "--yes" | "-y" => assume_yes = true,
                "--config" | "-c" => {
                    if i + 1 < args_vec.len() && !args_vec[i + 1].starts_with('-') {
                        config_dir = Some(args_vec[i + 1].clone());
                        i += 1;
                    } else {
                        log_warning!("Missing directory for --config. Usage: --config <directory>");
                        unknown_arg_found = true;
                    }
                }
                flag if flag.starts_with('-') => {
                    log_warning!("Unknown option: {}", flag);
                    unknown_arg_found = true;
                }
                _ => positionals.push(arg.clone()),
            }
            i += 1;
        }

        // version and help win over everything else
        let action = if display_version {
            CliAction::ShowVersion
        } else if display_help {
            CliAction::ShowHelp
        } else if unknown_arg_found {
            CliAction::ShowHelpDueToError
        } else {
            Self::command_action(&positionals, debug_enabled, config_dir, assume_yes)
        };

        ParsedArgs { action }
    }

    fn command_action(
        positionals: &[String],
        debug_enabled: bool,
        config_dir: Option<String>,
        assume_yes: bool,
    ) -> CliAction {
        let command = positionals.first().map(String::as_str);
        let rest = positionals.get(1..).unwrap_or_default();

        let no_arguments = |name: &str| {
            if rest.is_empty() {
                true
            } else {
                log_warning!("'{}' takes no arguments, got: {}", name, rest.join(" "));
                false
            }
        };

        match command {
            None => CliAction::Run {
                debug_enabled,
                config_dir,
            },
            Some("run") if no_arguments("run") => CliAction::Run {
                debug_enabled,
                config_dir,
            },
            Some("refresh" | "r") if no_arguments("refresh") => CliAction::Refresh {
                debug_enabled,
                config_dir,
            },
            Some("stop") if no_arguments("stop") => CliAction::Stop {
                debug_enabled,
                config_dir,
            },
            Some("status" | "S") if no_arguments("status") => CliAction::Status {
                debug_enabled,
                config_dir,
            },
            Some("cache") => match rest {
                [sub] if sub == "show" => CliAction::CacheShow {
                    debug_enabled,
                    config_dir,
                },
                [sub] if sub == "clear" => CliAction::CacheClear {
                    debug_enabled,
                    config_dir,
                    assume_yes,
                },
                _ => {
                    log_warning!("Usage: sunset-clock cache <show|clear>");
                    CliAction::ShowHelpDueToError
                }
            },
            Some("help") => match rest {
                [] => CliAction::Help { command: None },
                [topic] => CliAction::Help {
                    command: Some(topic.clone()),
                },
                _ => CliAction::ShowHelpDueToError,
            },
            Some("run" | "refresh" | "r" | "stop" | "status" | "S") => {
                CliAction::ShowHelpDueToError
            }
            Some(unknown) => {
                log_warning!("Unknown command: {}", unknown);
                CliAction::ShowHelpDueToError
            }
        }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("sunset-clock [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_indented!("-y, --yes              Skip confirmation prompts");
    log_block_start!("Commands:");
    log_indented!("run                    Show the countdown (default)");
    log_indented!("refresh, r             Re-resolve today's sunset in the running clock");
    log_indented!("stop                   Stop the running clock");
    log_indented!("status, S              Diagnose location, sunset and cache");
    log_indented!("cache <show|clear>     Inspect or reset the sunset cache");
    log_indented!("help [COMMAND]         Show detailed help for a command");
    log_end!();
}
