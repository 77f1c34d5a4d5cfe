//! Docker CLI plumbing for container toolchains.

use crate::error::ToolchainError;
use crate::process::{run_checked, succeeds};
use camino::Utf8Path;
use std::process::{Command, Stdio};
use tracing::warn;

/// Attempts per toolchain image build.
pub const BUILD_RETRIES: usize = 3;

/// Thin wrapper over the `docker` CLI.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: String,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self {
            program: "docker".to_string(),
        }
    }
}

impl DockerCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self) -> Command {
        Command::new(&self.program)
    }

    /// `docker build -t <tag> <context>`; build output goes to stderr.
    pub fn build(&self, tag: &str, context: &Utf8Path) -> Result<(), ToolchainError> {
        let mut cmd = self.command();
        cmd.args(["build", "--rm=false", "-t", tag, "."])
            .current_dir(context)
            .stdout(Stdio::from(std::io::stderr()));
        run_checked(&mut cmd)
    }

    pub fn image_exists(&self, tag: &str) -> Result<bool, ToolchainError> {
        let mut cmd = self.command();
        cmd.args(["image", "inspect", tag]);
        succeeds(&mut cmd)
    }

    /// Command for `docker run`; `-i` is added when stdin will be piped.
    pub fn run_command(&self, image: &str, args: &[String], interactive: bool) -> Command {
        let mut cmd = self.command();
        cmd.arg("run");
        if interactive {
            cmd.arg("-i");
        }
        cmd.args(args).arg(image);
        cmd
    }
}

/// Calls `f` until it succeeds or `attempts` calls have failed.
pub(crate) fn retry<T>(
    attempts: usize,
    what: &str,
    mut f: impl FnMut() -> Result<T, ToolchainError>,
) -> Result<T, ToolchainError> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) if attempt < attempts => {
                warn!(error = %e, remaining = attempts - attempt, "{what} failed, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn retry_gives_up_after_attempts() {
        let mut calls = 0;
        let res: Result<(), _> = retry(3, "op", || {
            calls += 1;
            Err(ToolchainError::EmptySearchPath)
        });
        assert!(res.is_err());
        assert_eq!(calls, 3);

        let mut calls = 0;
        let res = retry(3, "op", || {
            calls += 1;
            if calls < 2 {
                Err(ToolchainError::EmptySearchPath)
            } else {
                Ok(calls)
            }
        });
        assert_eq!(res.unwrap(), 2);
    }

    #[test]
    fn retry_runs_once_when_attempts_is_zero() {
        let mut calls = 0;
        let res: Result<(), _> = retry(0, "op", || {
            calls += 1;
            Err(ToolchainError::EmptySearchPath)
        });
        assert!(res.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn run_command_adds_interactive_flag_before_image() {
        let docker = DockerCli::new("docker");
        let args = vec!["--rm".to_string()];
        let cmd = docker.run_command("acme-tc", &args, true);
        let argv: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(argv, vec!["run", "-i", "--rm", "acme-tc"]);
        assert_eq!(cmd.get_program(), "docker");
    }
}
