use std::{
    collections::HashMap,
    io::Read,
    process::{Command, Stdio},
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 2_000;
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs a diagnostic utility and hands back its stdout.
///
/// `None` covers every way a command can be unusable: not installed, exited
/// non-zero, timed out, or printed nothing.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> Option<String>;
}

/// Spawns real processes with stdin closed and stderr discarded.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS))
    }
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Option<String> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .ok()?;
        let deadline = Instant::now() + self.timeout;

        // Drain stdout while waiting so a chatty child never blocks on a full pipe.
        let Some(mut stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return None;
        };
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut out = Vec::new();
            let _ = stdout.read_to_end(&mut out);
            let _ = tx.send(out);
        });

        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    if !status.success() {
                        return None;
                    }
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    let out = rx.recv_timeout(remaining).ok()?;
                    let text = String::from_utf8_lossy(&out).into_owned();
                    return if text.trim().is_empty() {
                        None
                    } else {
                        Some(text)
                    };
                }
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return None;
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(_) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
            }
        }
    }
}

/// Canned command outputs keyed by the full command line (`"df /"`).
/// Anything not scripted behaves like a missing utility.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    outputs: HashMap<String, String>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, command_line: &str, output: &str) -> Self {
        self.outputs
            .insert(command_line.to_string(), output.to_string());
        self
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str]) -> Option<String> {
        let mut key = program.to_string();
        for arg in args {
            key.push(' ');
            key.push_str(arg);
        }
        self.outputs.get(&key).cloned()
    }
}
