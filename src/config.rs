//! Directory connection configuration.

use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_TIME_LIMIT: u64 = 10;

/// LDAP configuration.
///
/// Owned by the embedding service's configuration subsystem and passed in
/// as an immutable value; the bridge only reads it, once per lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LdapConfig {
    /// URL of the LDAP instance, `ldap://` or `ldaps://`.
    pub url: Url,
    /// DN of the subtree holding user entries.
    pub base_dn: String,
    /// Server-side time limit for the search, in seconds.
    #[serde(default = "default_time_limit")]
    pub time_limit: u64,
    /// Client-side timeout for establishing the connection, in seconds.
    /// Unset means the operating system's connect timeout applies.
    #[serde(default)]
    pub connect_timeout: Option<u64>,
}

fn default_time_limit() -> u64 {
    DEFAULT_TIME_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let config: LdapConfig = serde_yaml::from_str(
            "url: ldap://localhost:389\nbase_dn: ou=people,dc=example,dc=com\n",
        )
        .unwrap();

        assert_eq!(config.url, Url::parse("ldap://localhost:389").unwrap());
        assert_eq!(config.base_dn, "ou=people,dc=example,dc=com");
        assert_eq!(config.time_limit, DEFAULT_TIME_LIMIT);
        assert_eq!(config.connect_timeout, None);
    }

    #[test]
    fn deserializes_explicit_limits() {
        let config: LdapConfig = serde_yaml::from_str(
            "url: ldaps://directory.example.com:636\n\
             base_dn: dc=example,dc=com\n\
             time_limit: 3\n\
             connect_timeout: 2\n",
        )
        .unwrap();

        assert_eq!(config.time_limit, 3);
        assert_eq!(config.connect_timeout, Some(2));
    }
}
