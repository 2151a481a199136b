//! Subprocess runner for the OS tools the adapters drive

use crate::domain::transport::{TransportError, TransportResult};
#[cfg(test)]
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// stderr when present, stdout otherwise
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandRunner {
    use_sudo: bool,
    timeout: Duration,
    /// Programs are run as `sh <dir>/<program>` instead
    #[cfg(test)]
    script_dir: Option<PathBuf>,
}

impl CommandRunner {
    pub fn new(use_sudo: bool, timeout: Duration) -> Self {
        Self {
            use_sudo,
            timeout,
            #[cfg(test)]
            script_dir: None,
        }
    }

    #[cfg(test)]
    pub fn with_script_dir(mut self, dir: PathBuf) -> Self {
        self.script_dir = Some(dir);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run to completion and require a zero exit status; returns stdout
    pub async fn run(&self, program: &str, args: &[&str]) -> TransportResult<String> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    pub async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> TransportResult<String> {
        let output = self.output_with_timeout(program, args, timeout).await?;
        if output.success {
            Ok(output.stdout)
        } else {
            Err(TransportError::Failed(format!(
                "{} exited with {}: {}",
                program,
                output
                    .code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                output.diagnostic()
            )))
        }
    }

    /// Run to completion whatever the exit status
    pub async fn output(&self, program: &str, args: &[&str]) -> TransportResult<CommandOutput> {
        self.output_with_timeout(program, args, self.timeout).await
    }

    /// The child is killed if it outlives `timeout` or the caller stops
    /// waiting for it
    pub async fn output_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> TransportResult<CommandOutput> {
        let mut command = self.command(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Running: {} {}", program, args.join(" "));

        let output = match tokio::time::timeout(timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(TransportError::Failed(format!(
                    "failed to start {}: {}",
                    program, e
                )))
            }
            Err(_) => {
                warn!("{} did not finish within {:?}", program, timeout);
                return Err(TransportError::TimedOut(timeout));
            }
        };

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    #[cfg(not(test))]
    fn command(&self, program: &str) -> Command {
        self.system_command(program)
    }

    #[cfg(test)]
    fn command(&self, program: &str) -> Command {
        match &self.script_dir {
            Some(dir) => {
                let mut command = Command::new("sh");
                command.arg(dir.join(program));
                command
            }
            None => self.system_command(program),
        }
    }

    fn system_command(&self, program: &str) -> Command {
        if self.use_sudo {
            let mut command = Command::new("sudo");
            command.arg("-n").arg(program);
            command
        } else {
            Command::new(program)
        }
    }
}
