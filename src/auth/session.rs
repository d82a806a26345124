use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::Session;

/// The current session, stored as a plain JSON object on disk:
/// ```json
/// {
///   "user": { "id": "1", "email": "admin@example.com", "name": "Administrador" },
///   "token": "mock-jwt-token"
/// }
/// ```
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join("auth.json"),
        }
    }

    /// Writes `session`, replacing any previous one.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, content)
            .with_context(|| format!("writing session to {}", self.path.display()))?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    /// Reads the stored session. A missing or unreadable file means logged out.
    pub fn load(&self) -> Option<Session> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt session file");
                None
            }
        }
    }

    /// Removes the stored session. Clearing when logged out is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthError, login, require_session};
    use tempfile::TempDir;

    #[test]
    fn test_save_load_clear() {
        let dir = TempDir::new().unwrap();
        let sessions = SessionFile::new(dir.path());
        assert_eq!(sessions.load(), None);

        let session = login("admin@example.com", "senha123").unwrap();
        sessions.save(&session).unwrap();
        assert_eq!(sessions.load(), Some(session.clone()));
        assert_eq!(require_session(&sessions), Ok(session));

        sessions.clear().unwrap();
        sessions.clear().unwrap();
        assert_eq!(require_session(&sessions), Err(AuthError::NotLoggedIn));
    }

    #[test]
    fn test_corrupt_file_is_logged_out() {
        let dir = TempDir::new().unwrap();
        let sessions = SessionFile::new(dir.path());
        fs::write(dir.path().join("auth.json"), "{not json").unwrap();

        assert_eq!(sessions.load(), None);
    }
}
