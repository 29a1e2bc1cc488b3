//! Shared utilities: terminal handling and path display helpers.

use anyhow::Result;
use crossterm::{
    cursor,
    terminal::{self, ClearType},
    ExecutableCommand, QueueableCommand,
};
use std::io::{IsTerminal, Write};
use std::path::Path;

/// RAII guard that hides the cursor while the countdown is drawn in place.
///
/// Without an interactive terminal (systemd unit, piped output) the guard is
/// inert and drawing falls back to plain lines.
pub struct TerminalGuard {
    interactive: bool,
}

impl TerminalGuard {
    pub fn new() -> Result<Self> {
        let interactive = std::io::stdout().is_terminal();
        if interactive {
            std::io::stdout().execute(cursor::Hide)?;
        }
        Ok(Self { interactive })
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Redraw the current line with `text`.
    pub fn draw_line(&self, text: &str) -> Result<()> {
        let mut stdout = std::io::stdout();
        if self.interactive {
            stdout
                .queue(cursor::MoveToColumn(0))?
                .queue(terminal::Clear(ClearType::CurrentLine))?;
            write!(stdout, "{text}")?;
        } else {
            writeln!(stdout, "{text}")?;
        }
        stdout.flush()?;
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.interactive {
            let mut stdout = std::io::stdout();
            let _ = stdout.execute(cursor::Show);
            let _ = writeln!(stdout);
        }
    }
}

/// Replace the home directory prefix with `~` for log output.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }
    path.display().to_string()
}

/// Check whether a process with the given PID exists.
pub fn is_process_running(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}
