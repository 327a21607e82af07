//! Directory lookup client.
//!
//! Authenticates a user against LDAP and extracts the identity attributes
//! the host protocol needs. Every lookup is a fresh
//! connect-bind-search-close cycle: no pooling, no cached state, the user
//! re-authenticates on every login attempt.

use std::time::Duration;

use async_trait::async_trait;
use ldap3::{Ldap as Ldap3, LdapConnAsync, LdapConnSettings, Scope, SearchEntry};

use crate::config::LdapConfig;
use crate::error::DirectoryError;
use crate::login::Credentials;

const PHONE_NUMBER_ATTRIBUTE: &str = "telephoneNumber";
const GIVEN_NAME_ATTRIBUTE: &str = "givenName";
const SURNAME_ATTRIBUTE: &str = "sn";

const LOOKUP_ATTRIBUTES: [&str; 3] =
    [PHONE_NUMBER_ATTRIBUTE, GIVEN_NAME_ATTRIBUTE, SURNAME_ATTRIBUTE];

/// Identity attributes fetched from the directory.
///
/// Every field defaults to empty and is filled independently from whichever
/// attributes the entry carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryIdentity {
    /// Value of `telephoneNumber`, normalized by the host predicate.
    pub phone_number: String,
    /// Value of `givenName`, trimmed.
    pub first_name: String,
    /// Value of `sn`, trimmed.
    pub last_name: String,
}

/// The host protocol's phone-number predicate, injected into the lookup.
pub trait PhoneValidator: Send + Sync {
    /// Validate a raw phone number against host rules.
    ///
    /// Returns the normalized form, or `None` when the host rejects the
    /// value.
    fn check_phone_number(&self, raw: &str) -> Option<String>;
}

/// Port for resolving identity attributes from bind credentials.
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    /// Authenticate `credentials` and fetch the matching identity.
    async fn lookup(
        &self,
        credentials: &Credentials,
        validator: &dyn PhoneValidator,
    ) -> Result<DirectoryIdentity, DirectoryError>;
}

/// LDAP lookup client.
#[derive(Debug, Clone)]
pub struct Ldap {
    config: LdapConfig,
}

impl Ldap {
    /// Create a new [`Ldap`] client over an immutable configuration.
    pub fn new(config: LdapConfig) -> Self {
        Self { config }
    }

    /// Authenticate `credentials` against the directory and return the
    /// identity attributes of the matching entry.
    ///
    /// Opens a fresh connection, binds as `uid=<username>,<base_dn>` with
    /// the supplied password, searches the subtree for the entry, and
    /// closes the connection on every exit path.
    pub async fn lookup(
        &self,
        credentials: &Credentials,
        validator: &dyn PhoneValidator,
    ) -> Result<DirectoryIdentity, DirectoryError> {
        let mut settings = LdapConnSettings::new();
        if let Some(secs) = self.config.connect_timeout {
            settings = settings.set_conn_timeout(Duration::from_secs(secs));
        }

        let (conn, mut ldap) =
            LdapConnAsync::with_settings(settings, self.config.url.as_str())
                .await
                .map_err(|err| {
                    tracing::error!(
                        url = %self.config.url,
                        error = %err,
                        "cannot connect to directory server"
                    );
                    DirectoryError::Unavailable(err)
                })?;
        tokio::spawn(async move {
            if let Err(err) = conn.drive().await {
                tracing::warn!(error = %err, "directory connection error");
            }
        });

        let outcome = self.bind_and_search(&mut ldap, credentials).await;
        let _ = ldap.unbind().await;
        let entries = outcome?;

        if entries.len() != 1 {
            tracing::info!(
                username = %credentials.username,
                entries = entries.len(),
                "expected exactly one directory entry"
            );
            return Err(DirectoryError::NotFound);
        }

        let Some(first) = entries.into_iter().next() else {
            return Err(DirectoryError::NotFound);
        };
        identity_from_entry(&SearchEntry::construct(first), validator)
    }

    async fn bind_and_search(
        &self,
        ldap: &mut Ldap3,
        credentials: &Credentials,
    ) -> Result<Vec<ldap3::ResultEntry>, DirectoryError> {
        let bind_dn = format!(
            "uid={},{}",
            escape_ldap(&credentials.username),
            self.config.base_dn
        );
        ldap.simple_bind(&bind_dn, &credentials.password)
            .await
            .and_then(|res| res.success())
            .map_err(|err| {
                tracing::info!(
                    bind_dn = %bind_dn,
                    "cannot bind to directory server"
                );
                DirectoryError::AuthFailed(err)
            })?;

        let filter = format!("(uid={})", escape_ldap(&credentials.username));
        let (entries, _) = ldap
            .with_timeout(Duration::from_secs(self.config.time_limit))
            .search(
                &self.config.base_dn,
                Scope::Subtree,
                &filter,
                LOOKUP_ATTRIBUTES.to_vec(),
            )
            .await
            .and_then(|res| res.success())
            .map_err(|err| {
                tracing::info!(
                    bind_dn = %bind_dn,
                    error = %err,
                    "directory search failed"
                );
                DirectoryError::AuthFailed(err)
            })?;

        Ok(entries)
    }
}

#[async_trait]
impl DirectoryLookup for Ldap {
    async fn lookup(
        &self,
        credentials: &Credentials,
        validator: &dyn PhoneValidator,
    ) -> Result<DirectoryIdentity, DirectoryError> {
        Ldap::lookup(self, credentials, validator).await
    }
}

/// Map a directory entry onto a [`DirectoryIdentity`].
///
/// Only the first value of each attribute is considered. A missing
/// attribute leaves its field empty; only a present-but-rejected
/// `telephoneNumber` aborts the lookup.
fn identity_from_entry(
    entry: &SearchEntry,
    validator: &dyn PhoneValidator,
) -> Result<DirectoryIdentity, DirectoryError> {
    let mut identity = DirectoryIdentity::default();

    if let Some(raw) = first_value(entry, PHONE_NUMBER_ATTRIBUTE) {
        identity.phone_number = validator.check_phone_number(raw).ok_or(
            DirectoryError::InvalidAttribute(PHONE_NUMBER_ATTRIBUTE),
        )?;
    }
    if let Some(name) = first_value(entry, GIVEN_NAME_ATTRIBUTE) {
        identity.first_name = name.trim().to_owned();
    }
    if let Some(name) = first_value(entry, SURNAME_ATTRIBUTE) {
        identity.last_name = name.trim().to_owned();
    }

    Ok(identity)
}

fn first_value<'a>(entry: &'a SearchEntry, attribute: &str) -> Option<&'a str> {
    entry
        .attrs
        .get(attribute)
        .and_then(|values| values.first())
        .map(String::as_str)
}

fn escape_ldap(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.as_bytes() {
        match *b {
            b'*' => out.push_str(r"\2a"),
            b'(' => out.push_str(r"\28"),
            b')' => out.push_str(r"\29"),
            b'\\' => out.push_str(r"\5c"),
            0 => out.push_str(r"\00"),
            c => out.push(c as char),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    struct InternationalFormat;

    impl PhoneValidator for InternationalFormat {
        fn check_phone_number(&self, raw: &str) -> Option<String> {
            raw.starts_with('+').then(|| raw.to_owned())
        }
    }

    fn entry(attrs: &[(&str, &[&str])]) -> SearchEntry {
        SearchEntry {
            dn: "uid=alice,ou=people,dc=example,dc=com".to_owned(),
            attrs: attrs
                .iter()
                .map(|(name, values)| {
                    (
                        (*name).to_owned(),
                        values.iter().map(|v| (*v).to_owned()).collect(),
                    )
                })
                .collect(),
            bin_attrs: Default::default(),
        }
    }

    #[test]
    fn maps_and_trims_all_attributes() {
        let entry = entry(&[
            (PHONE_NUMBER_ATTRIBUTE, &["+15550001234"]),
            (GIVEN_NAME_ATTRIBUTE, &[" Alice "]),
            (SURNAME_ATTRIBUTE, &[" Smith "]),
        ]);

        let identity =
            identity_from_entry(&entry, &InternationalFormat).unwrap();
        assert_eq!(
            identity,
            DirectoryIdentity {
                phone_number: "+15550001234".to_owned(),
                first_name: "Alice".to_owned(),
                last_name: "Smith".to_owned(),
            }
        );
    }

    #[test]
    fn missing_phone_number_leaves_field_empty() {
        let entry = entry(&[
            (GIVEN_NAME_ATTRIBUTE, &["Alice"]),
            (SURNAME_ATTRIBUTE, &["Smith"]),
        ]);

        let identity =
            identity_from_entry(&entry, &InternationalFormat).unwrap();
        assert_eq!(identity.phone_number, "");
        assert_eq!(identity.first_name, "Alice");
        assert_eq!(identity.last_name, "Smith");
    }

    #[test]
    fn missing_names_leave_fields_empty() {
        let entry = entry(&[(PHONE_NUMBER_ATTRIBUTE, &["+15550001234"])]);

        let identity =
            identity_from_entry(&entry, &InternationalFormat).unwrap();
        assert_eq!(identity.phone_number, "+15550001234");
        assert_eq!(identity.first_name, "");
        assert_eq!(identity.last_name, "");
    }

    #[test]
    fn rejected_phone_number_aborts_the_lookup() {
        // Names are present and well-formed, the lookup still fails.
        let entry = entry(&[
            (PHONE_NUMBER_ATTRIBUTE, &["nonsense"]),
            (GIVEN_NAME_ATTRIBUTE, &["Alice"]),
            (SURNAME_ATTRIBUTE, &["Smith"]),
        ]);

        let err =
            identity_from_entry(&entry, &InternationalFormat).unwrap_err();
        assert!(matches!(
            err,
            DirectoryError::InvalidAttribute(PHONE_NUMBER_ATTRIBUTE)
        ));
    }

    #[test]
    fn first_value_wins_for_multivalued_attributes() {
        let entry = entry(&[(
            PHONE_NUMBER_ATTRIBUTE,
            &["+15550001234", "+15550009999"],
        )]);

        let identity =
            identity_from_entry(&entry, &InternationalFormat).unwrap();
        assert_eq!(identity.phone_number, "+15550001234");
    }

    #[test]
    fn escapes_filter_metacharacters() {
        assert_eq!(escape_ldap("al*ce"), r"al\2ace");
        assert_eq!(escape_ldap("a(li)ce"), r"a\28li\29ce");
        assert_eq!(escape_ldap(r"ali\ce"), r"ali\5cce");
        assert_eq!(escape_ldap("alice"), "alice");
    }

    #[tokio::test]
    async fn unreachable_server_is_unavailable() {
        let client = Ldap::new(LdapConfig {
            // Nothing listens on the discard port.
            url: Url::parse("ldap://127.0.0.1:9").unwrap(),
            base_dn: "ou=people,dc=example,dc=com".to_owned(),
            time_limit: 1,
            connect_timeout: Some(2),
        });

        let err = client
            .lookup(&Credentials::new("alice", "s3cret"), &InternationalFormat)
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Unavailable(_)));
    }
}
