//! Parsing of the disguised login convention.
//!
//! Directory credentials travel inside the phone-number field as
//! `ldap <username> <password>`. A phone number never contains a space,
//! so the prefix cannot collide with a real one.

use std::fmt;

use thiserror::Error;

const LOGIN_PREFIX: &str = "ldap ";

/// Directory bind credentials carried by a single request.
///
/// Transient: constructed from one request, consumed by the lookup,
/// never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Directory `uid` of the account.
    pub username: String,
    /// Bind password.
    pub password: String,
}

impl Credentials {
    /// Create credentials from raw parts.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// The password must never reach a log line.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The login string does not follow the `ldap <username> <password>` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("login string does not follow the `ldap <username> <password>` form")]
pub struct MalformedLogin;

/// Parse a login string in the form `ldap <username> <password>`.
///
/// The literal `ldap ` prefix must be present and the remainder must split
/// on single ASCII spaces into exactly two tokens. Shape is the only rule:
/// the directory decides whether the credentials themselves are usable.
pub fn parse_login(login: &str) -> Result<Credentials, MalformedLogin> {
    let credentials = login.strip_prefix(LOGIN_PREFIX).ok_or(MalformedLogin)?;

    let mut tokens = credentials.split(' ');
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(username), Some(password), None) => {
            Ok(Credentials::new(username, password))
        },
        _ => Err(MalformedLogin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_string() {
        assert_eq!(parse_login(""), Err(MalformedLogin));
    }

    #[test]
    fn rejects_wrong_prefix() {
        assert_eq!(parse_login("foo bar"), Err(MalformedLogin));
        assert_eq!(parse_login("not-ldap format"), Err(MalformedLogin));
        // `ldap` without the trailing space is not the convention.
        assert_eq!(parse_login("ldap"), Err(MalformedLogin));
    }

    #[test]
    fn rejects_ordinary_phone_number() {
        assert_eq!(parse_login("+15550001234"), Err(MalformedLogin));
    }

    #[test]
    fn rejects_missing_password() {
        assert_eq!(parse_login("ldap foo"), Err(MalformedLogin));
    }

    #[test]
    fn rejects_extra_tokens() {
        assert_eq!(parse_login("ldap foo bar baz"), Err(MalformedLogin));
    }

    #[test]
    fn parses_valid_login() {
        let credentials = parse_login("ldap foo bar").unwrap();
        assert_eq!(credentials.username, "foo");
        assert_eq!(credentials.password, "bar");
    }

    #[test]
    fn password_keeps_symbols() {
        let credentials = parse_login("ldap alice p@ss,w0rd!").unwrap();
        assert_eq!(credentials.username, "alice");
        assert_eq!(credentials.password, "p@ss,w0rd!");
    }

    #[test]
    fn debug_redacts_password() {
        let credentials = Credentials::new("alice", "s3cret");
        let output = format!("{credentials:?}");
        assert!(output.contains("alice"));
        assert!(!output.contains("s3cret"));
    }
}
