//! Child build processes.

use std::path::PathBuf;
use std::process::Stdio;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::allow_list::ExternalAllowList;
use crate::app::{derive_server_app, AppDefinition, BuildMode};
use crate::error::{BuildError, BuildResult};
use crate::message::WorkerMessage;

/// Env var carrying the worker's app definition as JSON.
pub const APP_DEFINITION_ENV: &str = "SSR_APP_DEFINITION";
/// Env var carrying the worker role.
pub const WORKER_ENV: &str = "SSR_WORKER";
/// Env var carrying the build mode.
pub const BUILD_MODE_ENV: &str = "SSR_BUILD_MODE";
/// Env var carrying the externals allow list.
pub const ALLOW_LIST_ENV: &str = "SSR_EXTERNAL_ALLOW_LIST";

/// Program and arguments of a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl BuildCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Split a shell-style command line on whitespace.
    pub fn parse(command_line: &str) -> BuildResult<Self> {
        let mut parts = command_line.split_whitespace().map(String::from);
        let program = parts
            .next()
            .ok_or_else(|| BuildError::Configuration("build command is empty".into()))?;
        Ok(Self {
            program,
            args: parts.collect(),
            cwd: None,
        })
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        command
    }
}

/// A running build.
#[derive(Debug)]
pub struct BuildHandle {
    name: String,
    task: JoinHandle<BuildResult<()>>,
}

impl BuildHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the build to exit. A non-zero exit is an error.
    pub async fn wait(self) -> BuildResult<()> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(BuildError::Spawn {
                name: self.name,
                message: e.to_string(),
            }),
        }
    }

    /// Stop the build; the child is killed with its reader task.
    pub fn abort(&self) {
        self.task.abort();
    }
}

/// Spawns the client and server builds.
#[derive(Debug, Clone)]
pub struct BuildCoordinator {
    mode: BuildMode,
    allow_list: ExternalAllowList,
}

impl BuildCoordinator {
    pub fn new(mode: BuildMode, allow_list: ExternalAllowList) -> Self {
        Self { mode, allow_list }
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Spawn the server build for `app`, forwarding every bundle it
    /// reports to `on_bundle`.
    ///
    /// The worker gets the derived server app definition, its role, the
    /// build mode and the allow list through its environment. Failing to
    /// start it is fatal to the caller.
    pub fn spawn_server_build<F>(
        &self,
        command: &BuildCommand,
        app: &AppDefinition,
        on_bundle: F,
    ) -> BuildResult<BuildHandle>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        let server_app = derive_server_app(app);
        let name = server_app.app_name.clone();
        let definition = serde_json::to_string(&server_app)
            .map_err(|e| BuildError::Configuration(format!("app definition: {}", e)))?;

        let mut cmd = command.command();
        cmd.env(APP_DEFINITION_ENV, definition)
            .env(WORKER_ENV, "server")
            .env(BUILD_MODE_ENV, self.mode.to_string())
            .env(ALLOW_LIST_ENV, self.allow_list.as_str());

        let child = spawn_piped(cmd, &name)?;
        info!(build = %name, mode = %self.mode, "Server build started");

        let task = tokio::spawn(forward_output(child, name.clone(), on_bundle));
        Ok(BuildHandle { name, task })
    }

    /// Spawn the client build, logging its output.
    pub fn spawn_client_build(&self, command: &BuildCommand) -> BuildResult<BuildHandle> {
        let name = "client build".to_string();
        let mut cmd = command.command();
        cmd.env(BUILD_MODE_ENV, self.mode.to_string());

        let child = spawn_piped(cmd, &name)?;
        info!(build = %name, mode = %self.mode, "Client build started");

        let task = tokio::spawn(forward_output(child, name.clone(), |_| {}));
        Ok(BuildHandle { name, task })
    }
}

fn spawn_piped(mut cmd: Command, name: &str) -> BuildResult<Child> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| BuildError::Spawn {
            name: name.to_string(),
            message: e.to_string(),
        })
}

async fn forward_output<F>(mut child: Child, name: String, on_bundle: F) -> BuildResult<()>
where
    F: Fn(Value) + Send + Sync + 'static,
{
    if let Some(stdout) = child.stdout.take() {
        let mut lines = BufReader::new(stdout).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!(build = %name, error = %e, "Could not read build output");
                    break;
                }
            };

            match WorkerMessage::parse(&line) {
                WorkerMessage::Bundle(bundle) => {
                    info!(build = %name, "Server bundle received");
                    on_bundle(bundle);
                }
                WorkerMessage::EmptyBundle => {
                    warn!(build = %name, "Build finished without a server bundle");
                }
                WorkerMessage::Other(message) => debug!(build = %name, %message, "Ignoring message"),
                WorkerMessage::Output(text) => info!(build = %name, "{}", text),
            }
        }
    }

    let status = child.wait().await.map_err(|e| BuildError::Spawn {
        name: name.clone(),
        message: e.to_string(),
    })?;

    if status.success() {
        info!(build = %name, "Build finished");
        Ok(())
    } else {
        error!(build = %name, %status, "Build failed");
        Err(BuildError::Exited {
            name,
            code: status.code(),
        })
    }
}
