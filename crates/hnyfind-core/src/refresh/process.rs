use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use sysinfo::{Pid, ProcessesToUpdate, System};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to start background job '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write PID file {}: {source}", path.display())]
    PidFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Starts named background jobs and tells whether one is still alive.
pub trait ProcessCoordinator {
    fn is_running(&self, name: &str) -> bool;

    /// Start `args` as a detached job called `name` without waiting for it.
    fn run_detached(&self, name: &str, args: &[&str]) -> Result<(), ProcessError>;
}

/// Runs jobs as detached copies of `program`, tracked by `<name>.pid` files.
pub struct PidFileCoordinator {
    dir: PathBuf,
    program: PathBuf,
}

impl PidFileCoordinator {
    pub fn new(dir: PathBuf, program: PathBuf) -> Self {
        Self { dir, program }
    }

    /// Coordinator that re-invokes the running executable
    pub fn for_current_exe(dir: PathBuf) -> std::io::Result<Self> {
        Ok(Self::new(dir, std::env::current_exe()?))
    }

    fn pid_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.pid"))
    }

    /// The process name the OS reports may be truncated (15 bytes on Linux),
    /// so a prefix of our executable name is accepted.
    fn is_our_process(&self, process_name: &str) -> bool {
        let Some(program_name) = self.program.file_name() else {
            return false;
        };
        let program_name = program_name.to_string_lossy();
        !process_name.is_empty() && program_name.starts_with(process_name)
    }
}

/// Read the PID from a PID file. Returns `None` if the file doesn't exist
/// or contains invalid content.
fn read_pid_file(path: &Path) -> Option<u32> {
    let content = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read PID file");
            return None;
        }
    };
    match content.trim().parse::<u32>() {
        Ok(pid) => Some(pid),
        Err(_) => {
            warn!(path = %path.display(), content = %content.trim(), "Invalid PID file");
            None
        }
    }
}

impl ProcessCoordinator for PidFileCoordinator {
    fn is_running(&self, name: &str) -> bool {
        let path = self.pid_path(name);
        let Some(pid) = read_pid_file(&path) else {
            return false;
        };

        let pid = Pid::from_u32(pid);
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        let running = system
            .process(pid)
            .is_some_and(|p| self.is_our_process(&p.name().to_string_lossy()));
        if !running {
            debug!(job = name, %pid, "Removing stale PID file");
            let _ = fs::remove_file(&path);
        }
        running
    }

    fn run_detached(&self, name: &str, args: &[&str]) -> Result<(), ProcessError> {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Own process group, so the launcher tearing down ours leaves the job alone
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let child = command.spawn().map_err(|source| ProcessError::Spawn {
            name: name.to_string(),
            source,
        })?;

        let path = self.pid_path(name);
        fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(&path, format!("{}\n", child.id())))
            .map_err(|source| ProcessError::PidFile { path, source })?;

        debug!(job = name, pid = child.id(), "Background job started");
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_no_pid_file_means_not_running() {
        let dir = tempfile::TempDir::new().unwrap();
        let coordinator =
            PidFileCoordinator::new(dir.path().to_path_buf(), PathBuf::from("/bin/sleep"));
        assert!(!coordinator.is_running("download"));
    }

    #[test]
    fn test_garbage_pid_file_means_not_running() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("download.pid"), "not a pid").unwrap();
        let coordinator =
            PidFileCoordinator::new(dir.path().to_path_buf(), PathBuf::from("/bin/sleep"));
        assert!(!coordinator.is_running("download"));
    }

    #[test]
    fn test_dead_pid_file_is_removed() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("download.pid");
        // Use a very high PID that's unlikely to exist
        fs::write(&path, "999999\n").unwrap();

        let coordinator =
            PidFileCoordinator::new(dir.path().to_path_buf(), PathBuf::from("/bin/sleep"));
        assert!(!coordinator.is_running("download"));
        assert!(!path.exists());
    }

    #[test]
    fn test_detached_job_lifecycle() {
        let dir = tempfile::TempDir::new().unwrap();
        let coordinator =
            PidFileCoordinator::new(dir.path().to_path_buf(), PathBuf::from("sleep"));

        coordinator.run_detached("download", &["10"]).unwrap();
        let pid = read_pid_file(&dir.path().join("download.pid")).unwrap();
        assert!(coordinator.is_running("download"));

        let _ = Command::new("kill").arg(pid.to_string()).status();
    }

    #[test]
    fn test_spawn_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let coordinator = PidFileCoordinator::new(
            dir.path().to_path_buf(),
            dir.path().join("does-not-exist"),
        );

        let err = coordinator.run_detached("download", &[]).unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
        assert!(!dir.path().join("download.pid").exists());
    }
}
