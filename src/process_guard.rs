//! Process lifecycle management for launcher children
//!
//! The launcher runs exactly one foreground child at a time: `python -m venv`,
//! then `pip install`, then the Streamlit server. If the launcher is
//! interrupted mid-install or while the server is running, that child (and
//! anything it forked, like pip build workers or server threads) must not
//! be left running.
//!
//! Each child is spawned as its own process group leader with a
//! parent-death signal set, and the active child is recorded in a global
//! registry. On any exit path (Drop, SIGINT, SIGTERM, SIGHUP) the active
//! group gets SIGTERM, then SIGKILL if it outlives the grace period.

use nix::libc;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

static REGISTRY: OnceLock<Arc<Mutex<ProcessRegistry>>> = OnceLock::new();

/// The child currently owning the foreground.
#[derive(Debug)]
struct ActiveChild {
    /// PID of the group leader (equals the PGID, set via `setpgid`).
    pgid: u32,
    /// What this child is doing, for log messages ("pip install", "dashboard server").
    stage: String,
}

/// Registry holding the single active child of the launcher.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    active: Option<ActiveChild>,
    /// Set once shutdown begins; children spawned after that are killed
    /// on arrival instead of adopted.
    stopping: bool,
}

impl ProcessRegistry {
    /// Get or create the global registry
    pub fn global() -> Arc<Mutex<ProcessRegistry>> {
        REGISTRY
            .get_or_init(|| Arc::new(Mutex::new(ProcessRegistry::default())))
            .clone()
    }

    /// Record `pid` as the active foreground child.
    ///
    /// If shutdown has already begun (a signal landed while the child was
    /// being spawned), the newcomer's group is killed immediately so the
    /// race cannot leave an orphan.
    pub fn track(&mut self, pid: u32, stage: &str) {
        if self.stopping {
            log::warn!("{} (pid {}) spawned during shutdown, killing it", stage, pid);
            let _ = signal::kill(Pid::from_raw(-(pid as i32)), Signal::SIGKILL);
            return;
        }

        let child = ActiveChild {
            pgid: pid,
            stage: stage.to_string(),
        };
        if let Some(prev) = self.active.replace(child) {
            // Should not happen: stages run strictly one after another.
            log::warn!(
                "{} (pid {}) was never released before the next stage",
                prev.stage,
                prev.pgid
            );
        }
        log::debug!("{} running as pid {}", stage, pid);
    }

    /// Clear the active slot after the child exited on its own.
    pub fn release(&mut self, pid: u32) {
        if self.active.as_ref().is_some_and(|c| c.pgid == pid) {
            self.active = None;
            log::debug!("pid {} exited, slot free", pid);
        }
    }

    /// PID of the active child, if any.
    pub fn current(&self) -> Option<u32> {
        self.active.as_ref().map(|c| c.pgid)
    }

    /// Stop the active child: SIGTERM to its process group, wait up to
    /// `grace`, then SIGKILL the group if it is still around. Idempotent.
    pub fn shutdown(&mut self, grace: Duration) {
        self.stopping = true;

        let Some(child) = self.active.take() else {
            return;
        };
        let group = Pid::from_raw(-(child.pgid as i32));

        log::info!("stopping {} (pid {})", child.stage, child.pgid);
        if signal::kill(group, Signal::SIGTERM).is_err() {
            // ESRCH: the whole group is already gone
            return;
        }

        let deadline = Instant::now() + grace;
        while still_running(child.pgid) {
            if Instant::now() >= deadline {
                log::warn!("{} did not stop within {:?}, forcing", child.stage, grace);
                let _ = signal::kill(group, Signal::SIGKILL);
                return;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        log::info!("{} stopped cleanly", child.stage);
    }
}

/// Whether `pid` still refers to a live (non-zombie) process.
///
/// Reads `/proc/<pid>/stat` and inspects the state character after the
/// parenthesized command name. A missing entry, a zombie (`Z`) or a dead
/// (`X`) process all count as not running.
fn still_running(pid: u32) -> bool {
    let Ok(stat) = std::fs::read_to_string(format!("/proc/{}/stat", pid)) else {
        return false;
    };
    match stat
        .rsplit(')')
        .next()
        .and_then(|rest| rest.split_whitespace().next())
    {
        Some(state) => !matches!(state, "Z" | "X"),
        None => false,
    }
}

/// RAII guard that stops the active child on drop.
/// Held by `main` so every exit path runs cleanup.
pub struct ProcessGuard {
    registry: Arc<Mutex<ProcessRegistry>>,
}

impl ProcessGuard {
    pub fn new() -> Self {
        Self {
            registry: ProcessRegistry::global(),
        }
    }
}

impl Default for ProcessGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        log::debug!("launcher exiting, cleaning up children");
        if let Ok(mut registry) = self.registry.lock() {
            registry.shutdown(Duration::from_secs(5));
        }
    }
}

/// Install handlers for SIGINT (Ctrl+C), SIGTERM, and SIGHUP.
///
/// Call once at program start. The first signal received stops the active
/// child and exits the launcher with `128 + signal`, the conventional code
/// for signal-driven exits.
pub fn install_signal_handlers() -> std::io::Result<()> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;

    std::thread::Builder::new()
        .name("signal-watcher".into())
        .spawn(move || {
            if let Some(sig) = signals.forever().next() {
                let name = signal_hook::low_level::signal_name(sig).unwrap_or("signal");
                log::info!("{} received, stopping the dashboard", name);

                if let Ok(mut registry) = ProcessRegistry::global().lock() {
                    registry.shutdown(Duration::from_secs(3));
                }

                std::process::exit(128 + sig);
            }
        })?;

    Ok(())
}

/// Extension trait for `std::process::Command` to set up process groups
pub trait ProcessGroupExt {
    /// Make the child the leader of a fresh process group so one group
    /// signal reaches everything it forks, and have the kernel SIGTERM it
    /// if the launcher dies without running its own cleanup.
    fn in_own_process_group(&mut self) -> &mut Self;
}

impl ProcessGroupExt for std::process::Command {
    fn in_own_process_group(&mut self) -> &mut Self {
        use std::os::unix::process::CommandExt;
        unsafe {
            self.pre_exec(|| {
                if libc::setpgid(0, 0) != 0 {
                    return Err(std::io::Error::last_os_error());
                }
                if libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM) != 0 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::{Command, Stdio};

    /// Stand-in for a long-running launcher stage (pip resolving
    /// dependencies, the Streamlit server serving). `script` is run under
    /// bash in its own process group, like real stages are.
    fn spawn_stage(script: &str) -> std::process::Child {
        Command::new("bash")
            .args(["-c", script])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .in_own_process_group()
            .spawn()
            .expect("failed to spawn stage stand-in")
    }

    /// Poll until `pid` is gone or `timeout` elapses.
    fn gone_within(pid: u32, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if !still_running(pid) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(25));
        }
        false
    }

    #[test]
    fn test_track_then_release_frees_the_slot() {
        let mut registry = ProcessRegistry::default();

        registry.track(40001, "pip install");
        assert_eq!(registry.current(), Some(40001));

        registry.release(40001);
        assert_eq!(registry.current(), None);
    }

    #[test]
    fn test_release_of_stale_pid_keeps_current_child() {
        let mut registry = ProcessRegistry::default();

        registry.track(40002, "dashboard server");
        // A release for some earlier, already-cleared stage must not
        // evict the server.
        registry.release(40001);
        assert_eq!(registry.current(), Some(40002));
    }

    #[test]
    fn test_shutdown_stops_dashboard_stand_in() {
        let mut server = spawn_stage("exec sleep 300");
        let pid = server.id();

        // Fresh registry, not the global one, to avoid cross-test interference
        let mut registry = ProcessRegistry::default();
        registry.track(pid, "dashboard server");

        assert!(still_running(pid), "stand-in should be running after spawn");

        registry.shutdown(Duration::from_millis(500));
        assert!(
            gone_within(pid, Duration::from_secs(2)),
            "stand-in should be gone after shutdown"
        );
        let _ = server.wait();
    }

    #[test]
    fn test_shutdown_waits_for_graceful_exit() {
        // pip responds to SIGTERM by aborting the install; model that with
        // a trap that exits cleanly.
        let mut install = spawn_stage("trap 'exit 0' TERM INT; while :; do sleep 1; done");
        let pid = install.id();

        let mut registry = ProcessRegistry::default();
        registry.track(pid, "pip install");

        // Let the trap install before signaling
        std::thread::sleep(Duration::from_millis(100));

        registry.shutdown(Duration::from_secs(3));
        assert!(
            gone_within(pid, Duration::from_secs(2)),
            "stand-in should exit from its own SIGTERM handler"
        );
        let status = install.wait().expect("failed to reap stand-in");
        assert_eq!(status.code(), Some(0), "trap should have exited cleanly");
    }

    #[test]
    fn test_group_signal_reaches_forked_workers() {
        // The Streamlit server forks worker processes; a group signal has
        // to take those down too. Model with bash forking a sleeper and
        // reporting its PID.
        let worker_pid_file = tempfile::NamedTempFile::new().unwrap();
        let path = worker_pid_file.path().to_string_lossy().to_string();

        let mut server = spawn_stage(&format!("sleep 300 & echo $! > {}; wait", path));
        let pid = server.id();

        // Wait for the worker PID to land on disk
        let mut worker_pid = 0u32;
        for _ in 0..50 {
            if let Ok(content) = std::fs::read_to_string(worker_pid_file.path()) {
                if let Ok(p) = content.trim().parse() {
                    worker_pid = p;
                    break;
                }
            }
            std::thread::sleep(Duration::from_millis(25));
        }
        assert!(worker_pid != 0, "stand-in never reported its worker PID");
        assert!(still_running(worker_pid), "worker should be running");

        let mut registry = ProcessRegistry::default();
        registry.track(pid, "dashboard server");
        registry.shutdown(Duration::from_secs(2));

        let _ = server.wait();
        assert!(
            gone_within(worker_pid, Duration::from_secs(3)),
            "forked worker should die with its group"
        );
    }

    #[test]
    fn test_shutdown_tolerates_already_exited_child() {
        let mut child = spawn_stage("exit 0");
        let pid = child.id();
        let _ = child.wait();

        let mut registry = ProcessRegistry::default();
        registry.track(pid, "venv creation");

        // Must not panic on a reaped PID
        registry.shutdown(Duration::from_millis(100));
        assert_eq!(registry.current(), None);
    }

    #[test]
    fn test_track_during_shutdown_kills_the_newcomer() {
        let mut registry = ProcessRegistry::default();
        registry.shutdown(Duration::from_millis(10));

        let mut late = spawn_stage("exec sleep 300");
        let pid = late.id();
        registry.track(pid, "pip install");

        assert_eq!(registry.current(), None, "late child must not be adopted");
        assert!(
            gone_within(pid, Duration::from_secs(2)),
            "late child should be killed on arrival"
        );
        let _ = late.wait();
    }

    #[test]
    fn test_still_running_spots_reaped_child() {
        let mut child = spawn_stage("exit 0");
        let pid = child.id();
        let _ = child.wait();

        assert!(!still_running(pid));
    }

    #[test]
    fn test_still_running_for_live_child() {
        let mut child = spawn_stage("exec sleep 300");
        let pid = child.id();

        assert!(still_running(pid));

        let _ = signal::kill(Pid::from_raw(-(pid as i32)), Signal::SIGKILL);
        let _ = child.wait();
    }
}
