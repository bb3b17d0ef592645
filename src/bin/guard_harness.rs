//! Internal harness binary for the shutdown integration tests.
//!
//! Plays the launcher's role in scenarios the test process cannot stage
//! itself: the tests spawn this harness, let it start a worker the way the
//! launcher starts pip or Streamlit, then crash or signal the harness and
//! verify the worker does not survive.
//!
//! Usage: guard_harness <mode> <pid-file>
//!
//! Modes:
//!   hold-child  Spawn a worker in its own process group, write its PID,
//!               print READY, and block until killed.
//!   guarded     Same, but with signal handlers installed and the worker
//!               tracked in the registry, like the real launcher.

use std::env;
use std::fs;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use masi_launcher::process_guard::{self, ProcessGroupExt, ProcessRegistry};

fn main() {
    let mut args = env::args().skip(1);
    let mode = args.next().unwrap_or_default();
    let pid_file = args.next().unwrap_or_default();
    if pid_file.is_empty() {
        eprintln!("usage: guard_harness <mode> <pid-file>");
        std::process::exit(2);
    }

    match mode.as_str() {
        "hold-child" => hold_child(&pid_file),
        "guarded" => guarded(&pid_file),
        other => {
            eprintln!("unknown mode: {}", other);
            std::process::exit(2);
        }
    }
}

/// Spawn a long-running worker the way the launcher spawns its stages.
fn spawn_worker() -> u32 {
    let child = Command::new("bash")
        .args(["-c", "exec sleep 600"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .in_own_process_group()
        .spawn()
        .expect("failed to spawn worker");
    child.id()
}

fn announce(pid_file: &str, pid: u32) {
    fs::write(pid_file, format!("{}\n", pid)).expect("failed to write pid file");
    // Line-buffered stdout: the test blocks on this line
    println!("READY");
}

fn hold_child(pid_file: &str) {
    let pid = spawn_worker();
    announce(pid_file, pid);
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}

fn guarded(pid_file: &str) {
    process_guard::install_signal_handlers().expect("failed to install signal handlers");

    let pid = spawn_worker();
    ProcessRegistry::global()
        .lock()
        .expect("registry mutex poisoned")
        .track(pid, "dashboard server");

    announce(pid_file, pid);
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}
