//! Out-of-process daemon control.
//!
//! `ltgd stop` and `ltgd status` run in a fresh process and only have the
//! PID file to go on. Everything here is synchronous: these paths never
//! start a runtime.

use crate::pidfile::read_pid;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// How long `stop` waits for the daemon to exit after SIGTERM.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);
const STOP_WAIT_ATTEMPTS: u32 = 50;

/// What the PID file says about a daemon instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonStatus {
    /// A live process holds the recorded pid.
    Running { pid: u32 },
    /// No PID file, or the recorded process is gone.
    NotRunning,
}

/// Result of a stop request.
#[derive(Debug)]
pub enum StopOutcome {
    /// No daemon was running; nothing to stop.
    NotRunning,
    /// SIGTERM was delivered and the process exited.
    Stopped { pid: u32 },
    /// SIGTERM was delivered but the process outlived the grace period.
    StillRunning { pid: u32 },
    /// SIGTERM could not be delivered.
    SignalFailed { pid: u32, error: io::Error },
}

/// Whether a process with this pid currently exists.
pub fn is_process_running(pid: u32) -> bool {
    // kill(0, ...) targets the whole process group and a pid above
    // i32::MAX would wrap negative; both mean the recorded pid is junk.
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    if pid == 0 {
        return false;
    }

    // Signal 0 performs permission and existence checks without
    // delivering anything. EPERM still means the process exists.
    if unsafe { libc::kill(pid, 0) } == 0 {
        return true;
    }
    io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

/// Reads the PID file and checks whether the recorded process is alive.
///
/// A file naming a dead process is stale and gets removed so the next
/// start does not trip over it.
pub fn daemon_status(pid_file: &Path) -> DaemonStatus {
    let Some(pid) = read_pid(pid_file) else {
        return DaemonStatus::NotRunning;
    };

    if is_process_running(pid) {
        DaemonStatus::Running { pid }
    } else {
        remove_stale(pid_file, pid);
        DaemonStatus::NotRunning
    }
}

/// Sends SIGTERM to the recorded daemon and waits for it to exit.
pub fn stop_daemon(pid_file: &Path) -> StopOutcome {
    let pid = match daemon_status(pid_file) {
        DaemonStatus::Running { pid } => pid,
        DaemonStatus::NotRunning => return StopOutcome::NotRunning,
    };

    if unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) } != 0 {
        let error = io::Error::last_os_error();
        if error.raw_os_error() == Some(libc::ESRCH) {
            // Died between the status check and the signal.
            remove_stale(pid_file, pid);
            return StopOutcome::NotRunning;
        }
        return StopOutcome::SignalFailed { pid, error };
    }

    for _ in 0..STOP_WAIT_ATTEMPTS {
        std::thread::sleep(STOP_POLL_INTERVAL);
        if !is_process_running(pid) {
            // After dropping privileges the daemon may not have been able
            // to unlink its own root-owned PID file.
            if pid_file.exists() {
                remove_stale(pid_file, pid);
            }
            return StopOutcome::Stopped { pid };
        }
    }

    StopOutcome::StillRunning { pid }
}

fn remove_stale(pid_file: &Path, pid: u32) {
    match fs::remove_file(pid_file) {
        Ok(()) => info!(path = %pid_file.display(), pid, "Removed stale PID file"),
        Err(e) => warn!(path = %pid_file.display(), error = %e, "Failed to remove stale PID file"),
    }
}
