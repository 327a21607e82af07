//! Error handler for the bridge.
//!
//! Two layers: [`DirectoryError`] carries the operator-level detail of a
//! failed lookup, [`BridgeError`] is what a client may see. The orchestrator
//! collapses the former into the latter before anything reaches the wire.

use ldap3::LdapError;
use thiserror::Error;

/// Shorthand for results carrying a [`BridgeError`].
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Failure of a single directory lookup.
///
/// Logged with full detail for operators, never surfaced verbatim to a
/// client: the distinctions below would confirm username existence or leak
/// directory topology.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The directory service could not be reached.
    #[error("cannot connect to directory server")]
    Unavailable(#[source] LdapError),

    /// The directory rejected the bind or the search.
    #[error("directory rejected the credentials")]
    AuthFailed(#[source] LdapError),

    /// Zero or several entries matched the username.
    #[error("no usable directory identity")]
    NotFound,

    /// An attribute is present but fails host-protocol validation.
    #[error("directory attribute `{0}` rejected by host validation")]
    InvalidAttribute(&'static str),
}

/// Client-visible errors, aligned with the host protocol's own codes.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The phone-number field holds neither a valid phone number nor a
    /// well-formed `ldap` login string.
    #[error("PHONE_NUMBER_INVALID")]
    PhoneNumberInvalid,

    /// Single code covering every directory failure.
    #[error("SIGN_IN_FAILED")]
    SignInFailed,

    /// Produced by the host protocol's own handlers, passed through
    /// unchanged.
    #[error(transparent)]
    Host(Box<dyn std::error::Error + Send + Sync>),
}

impl BridgeError {
    /// Wrap an error returned by a host-protocol handler.
    pub fn host<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Host(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_codes_match_host_protocol() {
        assert_eq!(
            BridgeError::PhoneNumberInvalid.to_string(),
            "PHONE_NUMBER_INVALID"
        );
        assert_eq!(BridgeError::SignInFailed.to_string(), "SIGN_IN_FAILED");
    }

    #[test]
    fn host_errors_pass_through() {
        let err = BridgeError::host(std::io::Error::other("session revoked"));
        assert_eq!(err.to_string(), "session revoked");
    }
}
