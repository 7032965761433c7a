//! Logger setup: `log` records rendered by `env_logger`, optionally teed to a file.
//!
//! Info records print the bare message so command output reads as plain
//! text. Warnings and errors carry a coloured level prefix. `--verbose` adds
//! timestamps and debug records from the cricstat crates.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use log::Level;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

/// Writes every record to stdout and, when a log file is open, an
/// ANSI-stripped copy to the file.
struct TeeWriter {
    file: Option<File>,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        if let Some(file) = &mut self.file {
            file.write_all(&strip_ansi_escapes::strip(buf))?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        if let Some(file) = &mut self.file {
            file.flush()?;
        }
        Ok(())
    }
}

/// The default filter for the given verbosity flags. `RUST_LOG` wins over it.
pub(crate) fn default_filter(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "warn"
    } else if verbose {
        "info,cricstat=debug"
    } else {
        "info"
    }
}

/// Install the global logger. Fails only if the log file cannot be created.
pub(crate) fn init(quiet: bool, verbose: bool, logfile: Option<&Path>) -> io::Result<()> {
    let file = logfile.map(File::create).transpose()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter(quiet, verbose)),
    )
    .format(move |buf, record| {
        if verbose {
            write!(
                buf,
                "{} ",
                chrono::Local::now()
                    .format("%H:%M:%S%.3f")
                    .if_supports_color(Stdout, |t| t.dimmed()),
            )?;
        }
        match record.level() {
            Level::Info => writeln!(buf, "{}", record.args()),
            Level::Warn => writeln!(
                buf,
                "{} {}",
                "warning:".if_supports_color(Stdout, |t| t.yellow()),
                record.args(),
            ),
            Level::Error => writeln!(
                buf,
                "{} {}",
                "error:".if_supports_color(Stdout, |t| t.red()),
                record.args(),
            ),
            level => writeln!(
                buf,
                "{} {}",
                format!("[{} {}]", level, record.target()).if_supports_color(Stdout, |t| t.dimmed()),
                record.args(),
            ),
        }
    })
    .target(env_logger::Target::Pipe(Box::new(TeeWriter { file })))
    .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_overrides_verbose() {
        assert_eq!(default_filter(true, true), "warn");
        assert_eq!(default_filter(false, true), "info,cricstat=debug");
        assert_eq!(default_filter(false, false), "info");
    }

    #[test]
    fn tee_strips_ansi_from_file_copy() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut tee = TeeWriter {
            file: Some(tmp.reopen().unwrap()),
        };
        tee.write_all(b"\x1b[31merror:\x1b[0m boom\n").unwrap();
        tee.flush().unwrap();
        assert_eq!(std::fs::read_to_string(tmp.path()).unwrap(), "error: boom\n");
    }
}
