//! Daemon module for briefly
//!
//! A background process that owns the single in-flight summarization and
//! serves requests over a Unix socket.

pub mod client;
pub mod ipc;
pub mod server;
pub mod service;

use anyhow::Result;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::config::Settings;

/// Start the daemon as a background process
pub fn start_daemon(settings: &Settings) -> Result<()> {
    let pid_path = settings.pid_path();
    let socket_path = settings.socket_path();

    if let Some(pid) = running_pid(&pid_path) {
        anyhow::bail!("Daemon is already running (PID: {})", pid);
    }
    // Leftovers from a daemon that did not exit cleanly.
    for stale in [&pid_path, &socket_path] {
        if stale.exists() {
            let _ = std::fs::remove_file(stale);
        }
    }

    let exe = std::env::current_exe()?;
    let mut child = Command::new(exe)
        .args(["daemon", "start", "--foreground"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    // Wait for readiness so callers don't get a false positive start.
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if let Some(status) = child.try_wait()? {
            anyhow::bail!(
                "Daemon failed to start (exit: {}). Run `briefly daemon start --foreground` for details.",
                status
            );
        }

        if pid_path.exists() && socket_path.exists() {
            return Ok(());
        }

        std::thread::sleep(Duration::from_millis(50));
    }

    anyhow::bail!("Daemon start timed out. Run `briefly daemon start --foreground` for details.")
}

/// PID recorded in `pid_path`, if that process is still alive.
fn running_pid(pid_path: &Path) -> Option<u32> {
    let pid = std::fs::read_to_string(pid_path)
        .ok()?
        .trim()
        .parse::<u32>()
        .ok()?;
    Path::new(&format!("/proc/{}", pid)).exists().then_some(pid)
}

/// Run the daemon in the foreground
pub async fn run_foreground(settings: &Settings) -> Result<()> {
    service::run(settings).await
}
