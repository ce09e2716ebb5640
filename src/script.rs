//! The script runner (C5): executes a configured external verification
//! program and compares its stdout against an expected value (spec §4.5).
//!
//! Uses `libc` for platform-specific process control, the same way
//! `src/outbound/direct.rs`'s raw `setsockopt` calls for TCP Fast Open do --
//! applied here to process group creation and `SIGKILL` delivery on
//! timeout so a hung script's children die with it.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::condition::ExecSpec;
use crate::config::EngineConfig;

/// Executes `exec` sub-records and reports pass/fail (spec §4.5). Every
/// failure mode -- launch failure, timeout, non-zero exit, I/O error --
/// collapses to `false`; the engine never propagates the underlying cause
/// past a `tracing` event (spec §7).
pub struct ScriptRunner {
    timeout: Duration,
    buffer_cap: usize,
}

impl ScriptRunner {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            timeout: config.script_timeout,
            buffer_cap: config.script_buffer,
        }
    }

    /// Run `spec.script` with no arguments, inheriting the server's
    /// environment, and compare its captured stdout (trimmed of one
    /// trailing newline) against `spec.output` for exact equality.
    pub fn verify(&self, spec: &ExecSpec) -> bool {
        let mut child = match spawn(&spec.script) {
            Ok(child) => child,
            Err(e) => {
                warn!(script = %spec.script.display(), error = %e, "exec script failed to launch");
                return false;
            }
        };

        let stdout = match child.stdout.take() {
            Some(s) => s,
            None => {
                warn!(script = %spec.script.display(), "exec script had no stdout pipe");
                return false;
            }
        };

        let buffer_cap = self.buffer_cap;
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut reader = stdout;
            let mut buf = Vec::with_capacity(buffer_cap.min(4096));
            let mut chunk = [0u8; 4096];
            loop {
                match reader.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => {
                        if buf.len() < buffer_cap {
                            let take = (buffer_cap - buf.len()).min(n);
                            buf.extend_from_slice(&chunk[..take]);
                        }
                        // Bytes past buffer_cap are drained, not an error.
                    }
                    Err(_) => break,
                }
            }
            let _ = tx.send(buf);
        });

        let captured = match rx.recv_timeout(self.timeout) {
            Ok(buf) => buf,
            Err(_) => {
                warn!(script = %spec.script.display(), timeout_secs = self.timeout.as_secs(), "exec script timed out, killing");
                kill_tree(&mut child);
                return false;
            }
        };

        let status = match child.wait() {
            Ok(status) => status,
            Err(e) => {
                warn!(script = %spec.script.display(), error = %e, "exec script wait() failed");
                return false;
            }
        };

        if !status.success() {
            debug!(script = %spec.script.display(), ?status, "exec script exited non-zero");
            return false;
        }

        let actual = trim_one_trailing_newline(&captured);
        let matched = actual == spec.output.as_bytes();
        if !matched {
            debug!(script = %spec.script.display(), "exec script output did not match expected");
        }
        matched
    }
}

fn spawn(script: &std::path::Path) -> std::io::Result<Child> {
    let mut cmd = Command::new(script);
    cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::null());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }
    cmd.spawn()
}

#[cfg(unix)]
fn kill_tree(child: &mut Child) {
    let pid = child.id() as i32;
    // Negative pid targets the whole process group created via
    // `process_group(0)` above.
    unsafe {
        libc::kill(-pid, libc::SIGKILL);
    }
    let _ = child.wait();
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Trim exactly one trailing `\n` (and a preceding `\r`, for CRLF output),
/// not all trailing whitespace (spec §4.5).
fn trim_one_trailing_newline(bytes: &[u8]) -> &[u8] {
    match bytes.strip_suffix(b"\n") {
        Some(rest) => rest.strip_suffix(b"\r").unwrap_or(rest),
        None => bytes,
    }
}
