use std::io::{self, BufRead, BufReader, PipeReader, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::console::{ConsoleParser, NoteStyle};
use crate::env::Environment;
use crate::error::Error;
use crate::model::{BuildStatus, ConsoleCounts};

const CONSOLE: &str = "<console>";

/// A named Doxygen executable known to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub name: String,
    pub home: PathBuf,
}

impl Installation {
    pub fn new(name: impl Into<String>, home: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            home: home.into(),
        }
    }
}

/// Installations the generate step may choose from, passed in by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Installations {
    items: Vec<Installation>,
}

impl Installations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, installation: Installation) -> Self {
        self.items.push(installation);
        self
    }

    pub fn find(&self, name: &str) -> Option<&Installation> {
        self.items.iter().find(|item| item.name == name)
    }
}

impl FromIterator<Installation> for Installations {
    fn from_iter<I: IntoIterator<Item = Installation>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// Result of one Doxygen run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub exit_code: i32,
    pub counts: ConsoleCounts,
    pub status: BuildStatus,
}

/// The "generate documentation using Doxygen" build step.
#[derive(Debug, Clone)]
pub struct GenerateStep {
    installation_name: String,
    doxyfile: String,
    continue_on_failure: bool,
    unstable_if_warnings: bool,
    notes: NoteStyle,
    environment: Environment,
}

impl GenerateStep {
    pub fn new(installation_name: impl Into<String>, doxyfile: impl Into<String>) -> Self {
        Self {
            installation_name: installation_name.into(),
            doxyfile: doxyfile.into(),
            continue_on_failure: false,
            unstable_if_warnings: false,
            notes: NoteStyle::default(),
            environment: Environment::process(),
        }
    }

    /// Keep going when Doxygen exits non-zero.
    pub fn continue_on_failure(mut self, continue_on_failure: bool) -> Self {
        self.continue_on_failure = continue_on_failure;
        self
    }

    /// Mark the build unstable when Doxygen printed any warning.
    pub fn unstable_if_warnings(mut self, unstable_if_warnings: bool) -> Self {
        self.unstable_if_warnings = unstable_if_warnings;
        self
    }

    pub fn notes(mut self, notes: NoteStyle) -> Self {
        self.notes = notes;
        self
    }

    /// Variables for the Doxygen process. The process environment is
    /// inherited unless an in-memory environment is given.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Run Doxygen from `workspace_dir`, streaming its output through a
    /// [`ConsoleParser`] into `out`.
    pub fn run<O: Write>(
        &self,
        installations: &Installations,
        workspace_dir: &Path,
        out: &mut O,
    ) -> Result<StepReport, Error> {
        console(out, "Starting Doxygen documentation generation")?;

        let installation = installations.find(&self.installation_name).ok_or_else(|| {
            Error::config(
                "There is no Doxygen installation selected. Please review the build step configuration.",
            )
        })?;
        let executable = &installation.home;
        if !executable.exists() {
            return Err(Error::config(format!(
                "The path to Doxygen executable doesn't exist : \"{}\"",
                executable.display()
            )));
        }

        let doxyfile = self.doxyfile.trim();
        if doxyfile.is_empty() {
            return Err(Error::config(
                "The Doxyfile path is empty. Please review the build step configuration.",
            ));
        }
        let doxyfile_path = workspace_dir.join(doxyfile);
        if !doxyfile_path.exists() {
            return Err(Error::config(format!(
                "The path to Doxyfile doesn't exist : \"{}\"",
                doxyfile_path.display()
            )));
        }

        let (reader, writer) = io::pipe().map_err(|source| Error::io(executable, source))?;
        let stderr = writer
            .try_clone()
            .map_err(|source| Error::io(executable, source))?;

        let mut command = Command::new(executable);
        command
            .arg(doxyfile)
            .current_dir(workspace_dir)
            .stdout(writer)
            .stderr(stderr);
        if let Some(vars) = self.environment.child_vars() {
            command.env_clear().envs(vars);
        }

        console(
            out,
            &format!(
                "Executing the command \"{}\" \"{doxyfile}\" from {}",
                executable.display(),
                workspace_dir.display()
            ),
        )?;
        tracing::debug!(?command, "spawning doxygen");

        let mut child = command
            .spawn()
            .map_err(|source| Error::io(executable, source))?;
        // The command holds the parent's copies of the write end.
        drop(command);

        let counts = match self.stream(reader, executable, out) {
            Ok(counts) => counts,
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(err);
            }
        };

        let status = child
            .wait()
            .map_err(|source| Error::io(executable, source))?;
        let Some(exit_code) = status.code() else {
            return Err(Error::Interrupted {
                reason: format!("Doxygen was terminated by a signal ({status})"),
            });
        };

        console(
            out,
            &format!(
                "Doxygen documentation generation ended with {} errors and {} warnings",
                counts.errors, counts.warnings
            ),
        )?;

        let mut build_status = BuildStatus::Success;
        if self.unstable_if_warnings && counts.warnings > 0 {
            console(out, "> Set build UNSTABLE because there are warnings.")?;
            build_status = build_status.worst(BuildStatus::Unstable);
        }

        if exit_code != 0 && !self.continue_on_failure {
            return Err(Error::ProcessFailed { code: exit_code });
        }

        Ok(StepReport {
            exit_code,
            counts,
            status: build_status,
        })
    }

    /// Feed Doxygen's merged stdout and stderr through a [`ConsoleParser`]
    /// until every write end is closed.
    fn stream<O: Write>(
        &self,
        reader: PipeReader,
        executable: &Path,
        out: &mut O,
    ) -> Result<ConsoleCounts, Error> {
        let mut parser = ConsoleParser::new(out).notes(self.notes);
        let mut reader = BufReader::new(reader);
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = reader
                .read_until(b'\n', &mut line)
                .map_err(|source| Error::io(executable, source))?;
            if read == 0 {
                break;
            }
            parser
                .on_line(&line)
                .map_err(|source| Error::io(CONSOLE, source))?;
        }
        let (_, counts) = parser
            .finish()
            .map_err(|source| Error::io(CONSOLE, source))?;
        Ok(counts)
    }
}

fn console<O: Write>(out: &mut O, message: &str) -> Result<(), Error> {
    writeln!(out, "{message}").map_err(|source| Error::io(CONSOLE, source))
}
