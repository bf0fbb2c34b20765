//! Spawning installer processes.
//!
//! The drain loop only sees the [`Launcher`] and [`InstallerProcess`] traits,
//! which keeps process ownership explicit: whoever holds the
//! `InstallerProcess` decides whether it is waited for, killed or detached.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

/// Unattended-install flags appended in silent mode
pub const SILENT_FLAGS: [&str; 2] = ["/quiet", "/norestart"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallMode {
    #[default]
    Silent,
    Interactive,
}

impl fmt::Display for InstallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallMode::Silent => f.write_str("silent"),
            InstallMode::Interactive => f.write_str("interactive"),
        }
    }
}

/// What a stop request does to the installer that is currently running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopPolicy {
    /// Leave the process running on its own
    #[default]
    Detach,
    /// Kill the process
    Kill,
}

/// Program and arguments for one installer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Invocation {
    /// `[path, "/quiet", "/norestart"]` in silent mode, `[path]` in interactive mode.
    ///
    /// Windows cannot execute `.msi` packages directly, so those go through
    /// `msiexec /i <path>` with the same mode flags.
    pub fn for_installer(path: &Path, mode: InstallMode) -> Self {
        let mut invocation = if cfg!(windows) && is_msi(path) {
            Invocation {
                program: PathBuf::from("msiexec"),
                args: vec![OsString::from("/i"), path.as_os_str().to_os_string()],
            }
        } else {
            Invocation {
                program: path.to_path_buf(),
                args: Vec::new(),
            }
        };

        if mode == InstallMode::Silent {
            invocation
                .args
                .extend(SILENT_FLAGS.iter().map(OsString::from));
        }

        invocation
    }

    /// Full argument vector, program first
    pub fn argv(&self) -> Vec<OsString> {
        let mut argv = vec![self.program.as_os_str().to_os_string()];
        argv.extend(self.args.iter().cloned());
        argv
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

fn is_msi(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("msi"))
}

/// How a finished installer ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Normal exit with a code
    Code(i32),
    /// Terminated without an exit code (killed by a signal)
    Terminated,
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ExitOutcome::Code(0))
    }
}

/// A running installer
pub trait InstallerProcess: Send {
    fn id(&self) -> u32;

    /// `Ok(None)` while the process is still running
    fn try_wait(&mut self) -> io::Result<Option<ExitOutcome>>;

    fn kill(&mut self) -> io::Result<()>;
}

/// Starts installer processes
pub trait Launcher: Send {
    fn launch(&self, invocation: &Invocation) -> io::Result<Box<dyn InstallerProcess>>;
}

/// Launches real child processes with `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, invocation: &Invocation) -> io::Result<Box<dyn InstallerProcess>> {
        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(Box::new(ChildProcess { child }))
    }
}

struct ChildProcess {
    child: Child,
}

impl InstallerProcess for ChildProcess {
    fn id(&self) -> u32 {
        self.child.id()
    }

    fn try_wait(&mut self) -> io::Result<Option<ExitOutcome>> {
        Ok(self.child.try_wait()?.map(|status| match status.code() {
            Some(code) => ExitOutcome::Code(code),
            None => ExitOutcome::Terminated,
        }))
    }

    fn kill(&mut self) -> io::Result<()> {
        self.child.kill()?;
        // Reap so the killed child does not linger as a zombie
        let _ = self.child.wait();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_invocation_appends_flags() {
        let invocation = Invocation::for_installer(Path::new("/opt/setup.exe"), InstallMode::Silent);
        assert_eq!(invocation.program, PathBuf::from("/opt/setup.exe"));
        assert_eq!(
            invocation.args,
            vec![OsString::from("/quiet"), OsString::from("/norestart")]
        );
        assert_eq!(invocation.to_string(), "/opt/setup.exe /quiet /norestart");
    }

    #[test]
    fn test_interactive_invocation_has_no_flags() {
        let invocation =
            Invocation::for_installer(Path::new("/opt/setup.exe"), InstallMode::Interactive);
        assert_eq!(invocation.argv(), vec![OsString::from("/opt/setup.exe")]);
    }

    #[cfg(windows)]
    #[test]
    fn test_msi_goes_through_msiexec() {
        let invocation = Invocation::for_installer(Path::new(r"C:\pkg\tool.MSI"), InstallMode::Silent);
        assert_eq!(invocation.program, PathBuf::from("msiexec"));
        assert_eq!(invocation.args[0], OsString::from("/i"));
        assert_eq!(invocation.args.len(), 4);
    }

    #[test]
    fn test_exit_outcome_success() {
        assert!(ExitOutcome::Code(0).success());
        assert!(!ExitOutcome::Code(1603).success());
        assert!(!ExitOutcome::Terminated.success());
    }

    #[test]
    fn test_modes_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&InstallMode::Silent).unwrap(), "\"silent\"");
        assert_eq!(serde_json::to_string(&StopPolicy::Kill).unwrap(), "\"kill\"");
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_program_fails_to_launch() {
        let invocation = Invocation::for_installer(
            Path::new("/definitely/not/here/setup.exe"),
            InstallMode::Silent,
        );
        assert!(SystemLauncher.launch(&invocation).is_err());
    }
}
