//! Access to the database side of a backup.
//!
//! A [`Glue`] opens the session a runner works through.  The orchestration
//! layer never looks inside a session; it only hands the glue to the runner.

use std::{
    io,
    process::{Child, Command, Stdio},
};

use crate::config::EngineSection;

/// Engine executable used when neither `--engine` nor `[engine].program` is set.
pub const DEFAULT_ENGINE: &str = "br-engine";

pub trait Glue {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Start a session running `args`, with stdout and stderr piped.
    fn open_session(&self, args: &[String]) -> io::Result<Child>;
}

/// Glue backed by an external engine executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineGlue {
    program: String,
    leading_args: Vec<String>,
}

impl EngineGlue {
    pub fn new(program: impl Into<String>, leading_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            leading_args,
        }
    }

    /// Resolve the engine from the `--engine` flag and the `[engine]` section.
    pub fn from_settings(flag: Option<&str>, section: &EngineSection) -> Self {
        let program = flag
            .or(section.program.as_deref())
            .unwrap_or(DEFAULT_ENGINE);
        Self::new(program, section.args.clone())
    }

    /// The full command line a session for `args` would run.
    pub fn command_line(&self, args: &[String]) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.leading_args.iter().cloned())
            .chain(args.iter().cloned())
            .collect()
    }
}

impl Glue for EngineGlue {
    fn name(&self) -> &str {
        &self.program
    }

    fn open_session(&self, args: &[String]) -> io::Result<Child> {
        let argv = self.command_line(args);
        let (program, rest) = argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty engine command"))?;

        let mut cmd = Command::new(program);
        cmd.args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Own process group, so cancellation can stop whatever the engine
        // starts along with it.
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut cmd, 0);
        cmd.spawn()
    }
}
