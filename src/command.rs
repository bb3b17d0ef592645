//! Streamed execution of blocking child commands.
//!
//! Long-running setup commands (pip in particular) produce output the
//! operator wants to see as it happens, not after the fact. This module
//! spawns the child in its own process group, registers it with the
//! global process registry, and relays stdout/stderr line by line while
//! waiting for completion.

use crate::process_guard::{ProcessGroupExt, ProcessRegistry};
use anyhow::{Context, Result};
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::thread;

/// Result of a streamed command execution.
#[derive(Debug, Clone)]
pub struct StreamedOutput {
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Whether the command exited with code 0.
    pub success: bool,
}

/// Run a command to completion, relaying its output as it arrives.
///
/// The child runs in its own process group and is tracked by the global
/// registry, so an interrupted launcher takes it down too. `label` names
/// the command in log and error messages.
pub fn run_streamed(mut cmd: Command, label: &str) -> Result<StreamedOutput> {
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(Stdio::null())
        .in_own_process_group();

    log::info!("running {}: {:?}", label, cmd);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("failed to spawn {}", label))?;
    let pid = child.id();

    {
        let registry = ProcessRegistry::global();
        let mut guard = registry.lock().expect("process registry mutex poisoned");
        guard.track(pid, label);
    }

    let stdout_handle = child.stdout.take().map(|stdout| {
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines().map_while(|l| l.ok()) {
                println!("{}", line);
            }
        })
    });
    let stderr_handle = child.stderr.take().map(|stderr| {
        thread::spawn(move || {
            for line in BufReader::new(stderr).lines().map_while(|l| l.ok()) {
                eprintln!("{}", line);
            }
        })
    });

    let status = child
        .wait()
        .with_context(|| format!("failed waiting for {}", label))?;

    if let Some(handle) = stdout_handle {
        let _ = handle.join();
    }
    if let Some(handle) = stderr_handle {
        let _ = handle.join();
    }

    {
        let registry = ProcessRegistry::global();
        let mut guard = registry.lock().expect("process registry mutex poisoned");
        guard.release(pid);
    }

    let exit_code = status.code();
    if status.success() {
        log::info!("{} completed successfully", label);
    } else {
        log::warn!("{} exited with code {:?}", label, exit_code);
    }

    Ok(StreamedOutput {
        exit_code,
        success: status.success(),
    })
}
