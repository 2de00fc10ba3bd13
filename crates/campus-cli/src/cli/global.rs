use clap::ValueEnum;

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Raw,
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
}

impl GlobalFlags {
    /// Default log level when `CAMPUS_LOG` is unset.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{GlobalFlags, OutputFormat};

    fn flags(quiet: bool, verbose: bool) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            quiet,
            verbose,
        }
    }

    #[test]
    fn log_level_follows_quiet_and_verbose() {
        assert_eq!(flags(false, false).log_level(), "warn");
        assert_eq!(flags(false, true).log_level(), "debug");
        assert_eq!(flags(true, false).log_level(), "error");
        assert_eq!(flags(true, true).log_level(), "error");
    }
}
