//! Mock login gate.
//!
//! [`login`] checks credentials against a fixed set of demo users.
//! [`SessionFile`] persists the resulting [`Session`] between invocations.
//! [`require_session`] guards commands that change the reading history.

mod session;

pub use session::SessionFile;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Token handed out to every mock session.
pub const MOCK_TOKEN: &str = "mock-jwt-token";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Email ou senha inválidos")]
    InvalidCredentials,
    #[error("Você precisa fazer login para acessar esta página")]
    NotLoggedIn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

struct MockUser {
    id: &'static str,
    email: &'static str,
    password: &'static str,
    name: &'static str,
}

static MOCK_USERS: &[MockUser] = &[
    MockUser {
        id: "1",
        email: "admin@example.com",
        password: "senha123",
        name: "Administrador",
    },
    MockUser {
        id: "2",
        email: "tecnico@example.com",
        password: "senha123",
        name: "Técnico",
    },
];

/// Checks `email`/`password` against the demo users.
pub fn login(email: &str, password: &str) -> Result<Session, AuthError> {
    let Some(user) = MOCK_USERS
        .iter()
        .find(|u| u.email == email && u.password == password)
    else {
        warn!(email, "Login rejected");
        return Err(AuthError::InvalidCredentials);
    };

    info!(user_id = user.id, name = user.name, "Login accepted");
    Ok(Session {
        user: User {
            id: user.id.to_string(),
            email: user.email.to_string(),
            name: user.name.to_string(),
        },
        token: MOCK_TOKEN.to_string(),
    })
}

/// Returns the stored session, or [`AuthError::NotLoggedIn`].
pub fn require_session(sessions: &SessionFile) -> Result<Session, AuthError> {
    sessions.load().ok_or(AuthError::NotLoggedIn)
}
