//! Bridge LDAP authentication into a phone-number based sign-in flow.
//!
//! The host messaging protocol only understands "phone number + SMS code"
//! identities. This crate lets a directory credential stand in for that
//! flow: the client puts `ldap <username> <password>` in the phone-number
//! field, the bridge authenticates against the directory, fetches the
//! canonical phone number and names, then re-enters the host protocol's
//! regular sign-in/sign-up handlers with the directory-sourced identity.
//! The wire format of the host protocol is left untouched.
//!
//! # Getting started
//!
//! Implement [`Authorizer`] over the host protocol's own handlers, then
//! hand requests to an [`AuthBridge`]:
//!
//! ```no_run
//! use ldap_bridge::{
//!     AuthBridge, Authorizer, Ldap, LdapConfig, PhoneValidator, Result,
//!     SendCodeRequest, SentCode, SignInRequest, SignUpRequest,
//! };
//!
//! struct Host;
//!
//! impl PhoneValidator for Host {
//!     fn check_phone_number(&self, raw: &str) -> Option<String> {
//!         raw.starts_with('+').then(|| raw.to_owned())
//!     }
//! }
//!
//! #[async_trait::async_trait]
//! impl Authorizer for Host {
//!     type Grant = String;
//!
//!     async fn send_code(&self, _request: SendCodeRequest) -> Result<SentCode> {
//!         Ok(SentCode { phone_code_hash: "hash-from-host".to_owned() })
//!     }
//!
//!     async fn sign_in(&self, request: SignInRequest) -> Result<String> {
//!         Ok(request.phone_number)
//!     }
//!
//!     async fn sign_up(&self, request: SignUpRequest) -> Result<String> {
//!         Ok(request.phone_number)
//!     }
//! }
//!
//! # async fn run() -> Result<()> {
//! let config = LdapConfig {
//!     url: "ldap://localhost:389".parse().unwrap(),
//!     base_dn: "ou=people,dc=example,dc=com".to_owned(),
//!     time_limit: 5,
//!     connect_timeout: None,
//! };
//!
//! let bridge = AuthBridge::new(Ldap::new(config), Host);
//! let grant = bridge
//!     .sign_in(SignInRequest {
//!         phone_number: "ldap alice s3cret".to_owned(),
//!         phone_code: String::new(),
//!         phone_code_hash: String::new(),
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs, unused_mut)]

pub mod bridge;
pub mod config;
pub mod error;
pub mod ldap;
pub mod login;

pub use bridge::{
    AuthBridge, Authorizer, SendCodeRequest, SentCode, SignInRequest,
    SignUpRequest,
};
pub use config::LdapConfig;
pub use error::{BridgeError, DirectoryError, Result};
pub use ldap::{DirectoryIdentity, DirectoryLookup, Ldap, PhoneValidator};
pub use login::{Credentials, MalformedLogin, parse_login};
