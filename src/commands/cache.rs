//! Implementation of the cache command.
//!
//! `cache show` lists what is on disk, including entries the clock would
//! discard. `cache clear` backs the file up to `<file>.bak.<timestamp>` and
//! writes an empty cache so the next run fetches fresh sunsets.

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::commands::load_settings;
use crate::common::utils::private_path;
use crate::state::SunsetCache;
use crate::time_source::{self, TimeSource};

/// Handle `cache show`.
pub fn handle_cache_show_command() -> Result<()> {
    log_version!();
    let settings = load_settings()?;
    show_entries(&settings.cache_file)?;
    log_end!();
    Ok(())
}

/// Handle `cache clear`, asking first unless `assume_yes`.
pub fn handle_cache_clear_command(assume_yes: bool) -> Result<()> {
    log_version!();
    let settings = load_settings()?;
    let path = settings.cache_file.as_path();

    if !show_entries(path)? {
        log_end!();
        return Ok(());
    }

    if !assume_yes && !confirm("Do you want to clear the cache? (y/N): ")? {
        log_pipe!();
        log_info!("Operation cancelled");
        log_end!();
        return Ok(());
    }

    let mut cache = SunsetCache::empty(path);
    let backup = cache.clear(time_source::system().now())?;

    log_block_start!("Cache cleared successfully");
    if let Some(backup) = backup {
        log_indented!("Backup saved to: {}", private_path(&backup));
    }
    log_indented!("The next run will fetch fresh sunset data");
    log_end!();
    Ok(())
}

/// Print the entries at `path`. Returns whether a file exists.
fn show_entries(path: &Path) -> Result<bool> {
    match SunsetCache::inspect(path) {
        Ok(None) => {
            log_block_start!("No cache file found at {}", private_path(path));
            Ok(false)
        }
        Ok(Some(entries)) => {
            log_block_start!(
                "Cache file {} contains {} entries",
                private_path(path),
                entries.len()
            );
            for entry in &entries {
                match entry.record {
                    Some(record) => log_indented!(
                        "Day {:>3}: {} ({})",
                        entry.key,
                        entry.value,
                        record.instant().format("%Y-%m-%d %H:%M:%S %:z")
                    ),
                    None => log_indented!("Day {:>3}: {} (invalid)", entry.key, entry.value),
                }
            }
            Ok(true)
        }
        Err(e) => {
            log_block_start!("Cache file {} is unreadable", private_path(path));
            log_indented!("{e:#}");
            Ok(true)
        }
    }
}

fn confirm(question: &str) -> Result<bool> {
    log_pipe!();
    print!("┣ {question}");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Display detailed help for the cache command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("cache - Inspect or reset the sunset cache");
    log_block_start!("Usage: sunset-clock cache <show|clear> [--yes]");
    log_block_start!("Subcommands:");
    log_indented!("show   List cached sunsets, marking entries that are invalid");
    log_indented!("clear  Back up the cache file and replace it with an empty one");
    log_block_start!("Options:");
    log_indented!("-y, --yes  Clear without asking for confirmation");
    log_block_start!("Examples:");
    log_indented!("sunset-clock cache show");
    log_indented!("sunset-clock cache clear --yes");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("nope"));
    }
}
