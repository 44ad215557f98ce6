//! Running external programs with captured output.
//!
//! Both collaborators of the pipeline (the metadata extractor and the
//! decoder) are child processes. [`run_captured`] starts one with stdin
//! closed and stdout/stderr piped, waits for it, and kills it if it outlives
//! the optional time limit.

use std::{
    process::{Output, Stdio},
    time::Duration,
};

use tokio::process::Command;

use crate::error::FramegrabError;

/// Run `command` to completion and collect its output.
///
/// The exit status is returned as-is; callers decide what a failure means.
///
/// # Errors
///
/// Returns [`FramegrabError::Spawn`] if the program cannot be started,
/// [`FramegrabError::Timeout`] if it runs longer than `timeout` (the child is
/// killed), or [`FramegrabError::IoError`] if reading its output fails.
pub async fn run_captured(
    mut command: Command,
    timeout: Option<Duration>,
) -> Result<Output, FramegrabError> {
    let program = command
        .as_std()
        .get_program()
        .to_string_lossy()
        .into_owned();

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    log::debug!("Invoking {:?}", command.as_std());

    let child = command.spawn().map_err(|source| FramegrabError::Spawn {
        program: program.clone(),
        source,
    })?;

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| FramegrabError::Timeout { program, limit })??,
        None => child.wait_with_output().await?,
    };

    log::debug!(
        "Process exited with {} ({} bytes stdout, {} bytes stderr)",
        output.status,
        output.stdout.len(),
        output.stderr.len()
    );

    Ok(output)
}
