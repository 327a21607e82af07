//! LDAP authentication injected into the host sign-in flow.
//!
//! No protocol change: credentials travel disguised as a phone number.
//! Once the directory confirms them, the request re-enters the host's
//! regular sign-in/sign-up handlers carrying the directory-sourced
//! identity. Every failure is terminal for the request; there are no
//! retries and no compensation.

use async_trait::async_trait;

use crate::error::{BridgeError, Result};
use crate::ldap::{DirectoryIdentity, DirectoryLookup, Ldap, PhoneValidator};
use crate::login;

/// Application identity presented on the synthesized send-code call.
const BRIDGE_API_ID: i32 = 4;
const BRIDGE_API_HASH: &str = "014b35b6184100b085b0d0572f9b5103";

/// Sentinel accepted by the sign-in flow in place of an SMS-delivered code.
const BRIDGE_PHONE_CODE: &str = "12345";

/// Host sign-in request, at minimum the fields the bridge rewrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRequest {
    /// Phone number, overloaded to carry the disguised credential.
    pub phone_number: String,
    /// Confirmation code.
    pub phone_code: String,
    /// Code-hash issued by the host's send-code step.
    pub phone_code_hash: String,
}

/// Host sign-up request, at minimum the fields the bridge rewrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    /// Phone number, overloaded to carry the disguised credential.
    pub phone_number: String,
    /// Given name, overwritten from the directory.
    pub first_name: String,
    /// Surname, overwritten from the directory.
    pub last_name: String,
}

/// Host send-code request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendCodeRequest {
    /// Application id presented to the host.
    pub api_id: i32,
    /// Application secret presented to the host.
    pub api_hash: String,
    /// Phone number the code is issued for.
    pub phone_number: String,
}

/// Reply of the host's send-code step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCode {
    /// Opaque token required to complete sign-in.
    pub phone_code_hash: String,
}

/// Port over the host protocol's own authorization handlers.
///
/// Implementations wrap their native errors with [`BridgeError::host`];
/// those pass through the bridge unchanged.
#[async_trait]
pub trait Authorizer: PhoneValidator {
    /// Authorization proof issued by the host on success.
    type Grant: Send;

    /// The host's send-code operation, returning a code-hash.
    async fn send_code(&self, request: SendCodeRequest) -> Result<SentCode>;

    /// The host's own sign-in handler.
    async fn sign_in(&self, request: SignInRequest) -> Result<Self::Grant>;

    /// The host's own sign-up handler.
    async fn sign_up(&self, request: SignUpRequest) -> Result<Self::Grant>;
}

/// Sequences parser, directory lookup and host re-entry for one request.
#[derive(Debug, Clone)]
pub struct AuthBridge<A, D = Ldap> {
    authorizer: A,
    directory: D,
}

impl<A, D> AuthBridge<A, D>
where
    A: Authorizer,
    D: DirectoryLookup,
{
    /// Create a bridge over a directory client and the host's handlers.
    pub fn new(directory: D, authorizer: A) -> Self {
        Self {
            authorizer,
            directory,
        }
    }

    /// Sign in through the directory.
    ///
    /// After a successful lookup, a send-code call is synthesized under a
    /// fixed application identity so the host issues a real code-hash, then
    /// the request re-enters the host's sign-in handler with the sentinel
    /// code. The host's internal invariant — a code-hash must exist and
    /// match — stays satisfied without any SMS being sent.
    pub async fn sign_in(&self, request: SignInRequest) -> Result<A::Grant> {
        let identity = self.directory_identity(&request.phone_number).await?;
        tracing::debug!(
            phone_number = %identity.phone_number,
            "directory identity resolved"
        );

        let sent = self
            .authorizer
            .send_code(SendCodeRequest {
                api_id: BRIDGE_API_ID,
                api_hash: BRIDGE_API_HASH.to_owned(),
                phone_number: identity.phone_number.clone(),
            })
            .await?;
        tracing::debug!("send-code reply obtained for directory sign-in");

        self.authorizer
            .sign_in(SignInRequest {
                phone_number: identity.phone_number,
                phone_code: BRIDGE_PHONE_CODE.to_owned(),
                phone_code_hash: sent.phone_code_hash,
            })
            .await
    }

    /// Sign up through the directory.
    ///
    /// Rewrites the phone number and both names from the directory
    /// identity, then re-enters the host's sign-up handler unchanged.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<A::Grant> {
        let identity = self.directory_identity(&request.phone_number).await?;

        self.authorizer
            .sign_up(SignUpRequest {
                phone_number: identity.phone_number,
                first_name: identity.first_name,
                last_name: identity.last_name,
            })
            .await
    }

    /// Parse the disguised credential and resolve it in the directory.
    ///
    /// Collapses every internal failure into one of the host protocol's
    /// error codes; the operator-level distinction only reaches the log.
    async fn directory_identity(
        &self,
        login: &str,
    ) -> Result<DirectoryIdentity> {
        let credentials = login::parse_login(login).map_err(|err| {
            // The raw string may embed a password, keep it out of the log.
            tracing::warn!(error = %err, "unusable login string");
            BridgeError::PhoneNumberInvalid
        })?;

        self.directory
            .lookup(&credentials, &self.authorizer)
            .await
            .map_err(|err| {
                tracing::error!(
                    username = %credentials.username,
                    error = %err,
                    "directory authentication failed"
                );
                BridgeError::SignInFailed
            })
    }
}
