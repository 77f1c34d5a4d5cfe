//! Subprocess helpers shared by toolchains, tools and the container runner.

use crate::error::ToolchainError;
use std::io::Write;
use std::process::{Command, Output, Stdio};

/// Human-readable command line for logs and errors.
pub(crate) fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

fn spawn_error(command: &str, source: std::io::Error) -> ToolchainError {
    ToolchainError::Spawn {
        command: command.to_string(),
        source,
    }
}

/// Runs `cmd`, feeding `input` on stdin and capturing stdout.
///
/// Stdin is written from a separate thread so a tool that streams output
/// before consuming all of its input cannot deadlock.
pub(crate) fn output_with_input(
    cmd: &mut Command,
    input: Option<&[u8]>,
) -> Result<Output, ToolchainError> {
    let desc = describe(cmd);
    let stdin = if input.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    };
    cmd.stdin(stdin).stdout(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| spawn_error(&desc, e))?;
    let pipe = child.stdin.take();

    std::thread::scope(|s| {
        if let (Some(mut pipe), Some(bytes)) = (pipe, input) {
            s.spawn(move || {
                // A tool may exit without reading its input.
                let _ = pipe.write_all(bytes);
            });
        }
        child.wait_with_output().map_err(|e| spawn_error(&desc, e))
    })
}

/// Runs `cmd` to completion, failing on a non-zero exit.
pub(crate) fn run_checked(cmd: &mut Command) -> Result<(), ToolchainError> {
    let desc = describe(cmd);
    let status = cmd.status().map_err(|e| spawn_error(&desc, e))?;
    if !status.success() {
        return Err(ToolchainError::CommandFailed {
            command: desc,
            status: status.to_string(),
        });
    }
    Ok(())
}

/// Runs `cmd` and reports whether it exited successfully.
pub(crate) fn succeeds(cmd: &mut Command) -> Result<bool, ToolchainError> {
    let desc = describe(cmd);
    let status = cmd
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| spawn_error(&desc, e))?;
    Ok(status.success())
}
