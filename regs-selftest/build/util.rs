//! Methods for running shell commands

use std::{io, path, process};

/// Execute shell command and wait for it to finish
pub(crate) fn run_cmd(cmd: &str, params: &[impl AsRef<str>]) -> io::Result<process::ExitStatus> {
    let mut cmd = &mut process::Command::new(cmd);
    for param in params {
        cmd = cmd.arg(param.as_ref());
    }
    cmd.status()
}

/// Format file in place
pub(crate) fn rustfmt_file(path: &path::Path) -> io::Result<()> {
    let status = run_cmd("rustfmt", &[path.display().to_string()])?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::Other,
            format!("rustfmt exited with {status}"),
        ))
    }
}
