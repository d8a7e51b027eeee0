//! `helm` process runner shared by the engine and the source resolver

use super::EngineError;
use crate::config::schema::HelmConfig;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// A configured `helm` invocation
#[derive(Debug, Clone)]
pub struct HelmCommand {
    binary: PathBuf,
    kube_context: Option<String>,
    kubeconfig: Option<PathBuf>,
    timeout: Duration,
}

impl HelmCommand {
    pub fn new(config: &HelmConfig) -> Self {
        Self {
            binary: PathBuf::from(&config.binary),
            kube_context: config.kube_context.clone(),
            kubeconfig: config.kubeconfig.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    /// Flags prepended to every invocation
    fn global_args(&self) -> Vec<OsString> {
        let mut args = Vec::new();
        if let Some(context) = &self.kube_context {
            args.push("--kube-context".into());
            args.push(context.into());
        }
        if let Some(kubeconfig) = &self.kubeconfig {
            args.push("--kubeconfig".into());
            args.push(kubeconfig.into());
        }
        args
    }

    /// Run helm and return its stdout
    ///
    /// The child is killed if the returned future is dropped or the
    /// configured timeout elapses.
    pub async fn run(&self, args: &[OsString]) -> Result<Vec<u8>, EngineError> {
        let mut all_args = self.global_args();
        all_args.extend(args.iter().cloned());
        let command_line = display_command(self.binary.as_os_str(), &all_args);

        tracing::debug!("Running {}", command_line);

        let child = Command::new(&self.binary)
            .args(&all_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| EngineError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?,
            Err(_) => return Err(EngineError::Timeout(self.timeout)),
        };

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(EngineError::Command {
                command: command_line,
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

fn display_command(binary: &OsStr, args: &[OsString]) -> String {
    std::iter::once(binary)
        .chain(args.iter().map(OsString::as_os_str))
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
