//! Floor names: lookup for the HUD and an optional background namer.
//!
//! The namer runs an external text-generation command on a tokio runtime and
//! reports back over a channel. Results only touch [`FloorNames`], never the
//! game state, and the UI loop never waits on them.

use crate::game::Floor;
use std::collections::HashMap;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub const GROUND_FLOOR_NAME: &str = "The Ground Floor";
pub const DISCOVERING: &str = "Discovering...";
/// Context passed for the first generated floor when nothing precedes it.
const NO_PREVIOUS: &str = "the beginning";
/// Generated names longer than this are cut.
const MAX_NAME_CHARS: usize = 40;

pub const DEFAULT_NAMER_TIMEOUT: Duration = Duration::from_secs(10);

/// Deterministic label used whenever no generated name is available.
pub fn fallback_label(floor: Floor) -> String {
    format!("Floor {}", floor)
}

/// Hue in degrees for a floor's colour theme; cycles every 9 floors.
pub fn floor_hue(floor: Floor) -> u16 {
    ((floor.saturating_sub(1) % 9) * 40) as u16
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FloorLabel {
    Named(String),
    Discovering,
}

/// Floor → label. Survives across sessions so revisited floors keep their names.
#[derive(Debug, Clone)]
pub struct FloorNames {
    labels: HashMap<Floor, FloorLabel>,
}

impl Default for FloorNames {
    fn default() -> Self {
        Self::new()
    }
}

impl FloorNames {
    pub fn new() -> Self {
        let mut labels = HashMap::new();
        labels.insert(1, FloorLabel::Named(GROUND_FLOOR_NAME.to_string()));
        Self { labels }
    }

    /// HUD text for a floor.
    pub fn display(&self, floor: Floor) -> String {
        match self.labels.get(&floor) {
            Some(FloorLabel::Named(name)) => name.clone(),
            Some(FloorLabel::Discovering) => DISCOVERING.to_string(),
            None => fallback_label(floor),
        }
    }

    /// Name of the floor below, used as prompt context.
    pub fn context_for(&self, floor: Floor) -> String {
        match self.labels.get(&floor.saturating_sub(1)) {
            Some(FloorLabel::Named(name)) => name.clone(),
            _ => NO_PREVIOUS.to_string(),
        }
    }

    /// First visit to an upper floor: ask the namer, if there is one.
    /// Returns true when a request went out.
    pub fn visit(&mut self, floor: Floor, namer: Option<&FloorNamer>) -> bool {
        if floor <= 1 || self.labels.contains_key(&floor) {
            return false;
        }
        let Some(namer) = namer else {
            return false;
        };
        let previous = self.context_for(floor);
        self.labels.insert(floor, FloorLabel::Discovering);
        namer.request(floor, previous);
        true
    }

    /// Merge a finished request. Failures fall back to "Floor N".
    pub fn apply(&mut self, result: NameResult) {
        let label = match result.outcome {
            Ok(name) => {
                log::info!("floor {} named {:?}", result.floor, name);
                name
            }
            Err(e) => {
                log::warn!("naming floor {} failed: {}", result.floor, e);
                fallback_label(result.floor)
            }
        };
        self.labels.insert(result.floor, FloorLabel::Named(label));
    }
}

#[derive(Debug, Error)]
pub enum NamingError {
    #[error("could not run namer: {0}")]
    Io(#[from] std::io::Error),
    #[error("namer timed out after {0:?}")]
    Timeout(Duration),
    #[error("namer exited with {0}")]
    Exit(ExitStatus),
    #[error("namer returned no name")]
    Empty,
}

#[derive(Debug)]
pub struct NameResult {
    pub floor: Floor,
    pub outcome: Result<String, NamingError>,
}

fn floor_prompt(floor: Floor, previous: &str) -> String {
    format!(
        "You name the floors of an endless tower in a snake game called Ladder Snake. \
         Give floor {} a short, evocative name of 2 to 4 words. The floor below it is \
         called \"{}\". Reply with the name only: no number, no quotes.",
        floor, previous
    )
}

/// First non-empty line, quotes stripped, length capped.
fn clean_name(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    let name: String = line
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .chars()
        .take(MAX_NAME_CHARS)
        .collect();
    (!name.is_empty()).then_some(name)
}

/// External command that reads a prompt on stdin and prints a name on stdout.
#[derive(Debug, Clone)]
pub struct CommandNameSource {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandNameSource {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Split a `--namer-cmd` string on whitespace. None when blank.
    pub fn from_command_line(cmd: &str, timeout: Duration) -> Option<Self> {
        let mut parts = cmd.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect(), timeout))
    }

    pub async fn generate(&self, floor: Floor, previous: &str) -> Result<String, NamingError> {
        let prompt = floor_prompt(floor, previous);
        tokio::time::timeout(self.timeout, self.run(prompt))
            .await
            .map_err(|_| NamingError::Timeout(self.timeout))?
    }

    async fn run(&self, prompt: String) -> Result<String, NamingError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            // Commands that ignore stdin may close it early; a broken pipe is fine.
            if let Err(e) = stdin.write_all(prompt.as_bytes()).await {
                log::debug!("namer stdin: {}", e);
            }
        }
        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(NamingError::Exit(output.status));
        }
        clean_name(&String::from_utf8_lossy(&output.stdout)).ok_or(NamingError::Empty)
    }
}

/// Fire-and-forget naming requests on a small background runtime.
pub struct FloorNamer {
    runtime: tokio::runtime::Runtime,
    source: Arc<CommandNameSource>,
    tx: UnboundedSender<NameResult>,
    rx: UnboundedReceiver<NameResult>,
}

impl FloorNamer {
    pub fn new(source: CommandNameSource) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("floor-namer")
            .enable_all()
            .build()?;
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self {
            runtime,
            source: Arc::new(source),
            tx,
            rx,
        })
    }

    pub fn request(&self, floor: Floor, previous: String) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        log::debug!("requesting name for floor {}", floor);
        self.runtime.spawn(async move {
            let outcome = source.generate(floor, &previous).await;
            // Receiver gone means the app is shutting down.
            let _ = tx.send(NameResult { floor, outcome });
        });
    }

    /// Drain finished requests without blocking.
    pub fn poll(&mut self) -> Vec<NameResult> {
        let mut done = Vec::new();
        while let Ok(result) = self.rx.try_recv() {
            done.push(result);
        }
        done
    }
}
