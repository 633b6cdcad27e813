//! Engine bridge subprocess.
//!
//! [`ProcessEngine`] starts the configured bridge command the first time it is
//! needed and keeps it running for the rest of the process lifetime. Requests
//! are written to the bridge's stdin and answered on its stdout, one JSON
//! object per line (see [`protocol`](super::protocol)). The bridge's stderr is
//! inherited so its own diagnostics reach the terminal.

use std::{
    io::{BufRead, BufReader, Write},
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
};

use log::{debug, info, trace, warn};

use strata_core::{diagram::Compilation, files::VirtualFileSet, options::CompileOptions};

use super::{
    DiagramEngine, EngineError,
    protocol::{Request, Response},
};
use crate::config::EngineConfig;

/// A running bridge process.
struct Bridge {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl Bridge {
    fn spawn(command: &str, args: &[String]) -> Result<Self, EngineError> {
        info!(command, args:?; "Starting diagram engine");

        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Protocol("engine stdin is not available".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Protocol("engine stdout is not available".to_string()))?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    fn exchange(&mut self, request: &Request<'_>) -> Result<Response, EngineError> {
        let line =
            serde_json::to_string(request).map_err(|err| EngineError::Protocol(err.to_string()))?;
        trace!(bytes = line.len(); "Sending engine request");

        writeln!(self.stdin, "{line}")?;
        self.stdin.flush()?;

        let mut reply = String::new();
        if self.stdout.read_line(&mut reply)? == 0 {
            return Err(EngineError::Closed);
        }
        trace!(bytes = reply.len(); "Received engine response");

        Response::parse(&reply)
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if let Err(err) = self.child.kill() {
            debug!(err:err; "Diagram engine already stopped");
        }
        if let Err(err) = self.child.wait() {
            warn!(err:err; "Failed to reap diagram engine");
        }
    }
}

/// A [`DiagramEngine`] backed by a long-running bridge process.
///
/// # Examples
///
/// ```rust,no_run
/// use strata::{config::EngineConfig, engine::ProcessEngine};
///
/// let engine = ProcessEngine::new(&EngineConfig::new("node", vec!["bridge.mjs".into()]));
/// ```
pub struct ProcessEngine {
    command: String,
    args: Vec<String>,
    bridge: Option<Bridge>,
}

impl ProcessEngine {
    /// Creates an engine for the configured command. Nothing is started yet.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            command: config.command().to_string(),
            args: config.args().to_vec(),
            bridge: None,
        }
    }

    /// Returns `true` once the bridge process has been started.
    pub fn is_started(&self) -> bool {
        self.bridge.is_some()
    }

    fn request(&mut self, request: &Request<'_>) -> Result<Response, EngineError> {
        if self.bridge.is_none() {
            self.bridge = Some(Bridge::spawn(&self.command, &self.args)?);
        }
        let Some(bridge) = self.bridge.as_mut() else {
            return Err(EngineError::Closed);
        };

        let result = bridge.exchange(request);
        if matches!(result, Err(EngineError::Closed | EngineError::Io(_))) {
            // A broken pipe leaves the bridge unusable; start over on the next call.
            self.bridge = None;
        }
        result
    }
}

impl DiagramEngine for ProcessEngine {
    fn compile(
        &mut self,
        files: &VirtualFileSet,
        options: &CompileOptions,
    ) -> Result<Compilation, EngineError> {
        debug!(entry = files.entry(), files_count = files.len(); "Compiling through engine");
        self.request(&Request::Compile {
            fs: files.files(),
            input_path: files.entry(),
            options,
        })?
        .into_compilation()
    }

    fn render(&mut self, compilation: &Compilation, target: &str) -> Result<String, EngineError> {
        debug!(target_path = target; "Rendering through engine");
        self.request(&Request::Render {
            diagram: compilation.diagram(),
            options: compilation.render_options().for_target(target),
        })?
        .into_svg()
    }
}
