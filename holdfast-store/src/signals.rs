//! Best-effort signaling to the host supervisor.
//!
//! Credential operations tell background daemons about events ("password
//! changed") through a control socket and a status-file drop directory.
//! Both surfaces are fire-and-forget: a failure is logged and swallowed,
//! never propagated into the credential operation that raised it.

use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

use crate::files::FileStore;

/// Fire-and-forget trigger messages over a Unix control socket.
#[derive(Clone, Debug)]
pub struct ControlSocket {
    path: PathBuf,
}

impl ControlSocket {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sends `trigger <event>` to the supervisor socket.
    pub fn notify(&self, event: &str) {
        if let Err(e) = self.try_notify(event) {
            warn!(event, error = %e, "control socket notify failed");
        }
    }

    #[cfg(unix)]
    fn try_notify(&self, event: &str) -> std::io::Result<()> {
        let mut stream = std::os::unix::net::UnixStream::connect(&self.path)?;
        stream.write_all(format!("trigger {event}").as_bytes())?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn try_notify(&self, _event: &str) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "control socket requires unix",
        ))
    }
}

/// Status files read by the host supervisor (e.g. the system password
/// hand-off after a rotation).
#[derive(Clone, Debug)]
pub struct StatusDir {
    files: FileStore,
}

impl StatusDir {
    pub fn new(files: FileStore) -> Self {
        Self { files }
    }

    /// Writes a status file, logging instead of failing.
    pub fn write(&self, name: &str, contents: &str) {
        if let Err(e) = self.files.write_text(name, contents) {
            warn!(name, error = %e, "status file write failed");
        }
    }
}
