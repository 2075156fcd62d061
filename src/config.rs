//! Config for the directory connection and schema loading.
use std::{path::PathBuf, sync::Arc, time::Duration};

use ldap3::LdapConnSettings;
use rustls::{ClientConfig, RootCertStore};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

/// Directory configuration.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
	/// The URL to connect to the server with. Supports ldap, ldaps, and ldapi
	/// schemes
	pub url: Url,
	/// Connection settings.
	#[serde(default)]
	pub connection: ConnectionConfig,
	/// The DN to bind as. Binds anonymously unless both this and the password
	/// are set.
	#[serde(default)]
	pub bind_dn: Option<String>,
	/// The password to bind with
	#[serde(default)]
	pub bind_password: Option<String>,
	/// Defaults for searches
	#[serde(default)]
	pub searches: SearchConfig,
	/// How the schema published by the server is loaded
	#[serde(default)]
	pub schema: SchemaConfig,
}

impl Config {
	/// Configuration for an anonymous connection to the given URL, with
	/// default settings otherwise.
	#[must_use]
	pub fn new(url: Url) -> Self {
		Self {
			url,
			connection: ConnectionConfig::default(),
			bind_dn: None,
			bind_password: None,
			searches: SearchConfig::default(),
			schema: SchemaConfig::default(),
		}
	}

	/// The credentials to bind with, if any.
	pub(crate) fn credentials(&self) -> Option<(&str, &str)> {
		Some((self.bind_dn.as_deref()?, self.bind_password.as_deref()?))
	}
}

/// Configuration for how to connect to the LDAP server
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectionConfig {
	/// Timeout to establish a connection in seconds.
	pub timeout: u64,

	/// LDAP operation timeout. For search per reply.
	pub operation_timeout: Duration,

	/// TLS config
	#[serde(default)]
	pub tls: TLSConfig,
}

impl Default for ConnectionConfig {
	fn default() -> Self {
		Self { timeout: 5, operation_timeout: Duration::from_secs(30), tls: TLSConfig::default() }
	}
}

/// TLS Configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TLSConfig {
	/// Use StartTLS extended operation for establishing a secure connection,
	/// rather than TLS on a dedicated port.
	pub starttls: bool,

	/// Disable verification of TLS certificates
	pub no_tls_verify: bool,

	/// Path of a PEM file with the root certificates to trust
	pub root_certificates_path: Option<PathBuf>,
}

/// Defaults applied to searches
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchConfig {
	/// If set, enables the [simple paged search control] and sets the page size
	/// to the given value
	///
	/// [simple paged search control]: https://www.rfc-editor.org/rfc/rfc2696.html
	#[serde(default)]
	pub page_size: Option<i32>,
	/// Maximum number of entries returned, 0 for no limit
	#[serde(default)]
	pub size_limit: i32,
	/// Maximum time the server may spend on a search in seconds, 0 for no
	/// limit
	#[serde(default)]
	pub time_limit: i32,
}

/// Configuration for loading the schema
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
	/// Log and skip definitions that cannot be parsed instead of failing
	#[serde(default)]
	pub skip_invalid_definitions: bool,
}

impl ConnectionConfig {
	/// Create a [`LdapConnSettings`] based on this [`ConnectionConfig`]
	pub(crate) async fn to_settings(&self) -> Result<LdapConnSettings, Error> {
		let mut settings = LdapConnSettings::new();

		settings = settings.set_conn_timeout(Duration::from_secs(self.timeout));
		settings = settings.set_starttls(self.tls.starttls);
		settings = settings.set_no_tls_verify(self.tls.no_tls_verify);

		if let Some(path) = &self.tls.root_certificates_path {
			let pem = tokio::fs::read(path).await?;
			let certificates = rustls_pemfile::certs(&mut pem.as_slice())
				.map_err(|_| Error::Invalid("Could not read root certificates".to_owned()))?;

			let mut roots = RootCertStore::empty();
			let (added, ignored) = roots.add_parsable_certificates(&certificates);
			if added == 0 {
				return Err(Error::Invalid(format!(
					"No usable root certificates in {}",
					path.display()
				)));
			}
			if ignored > 0 {
				tracing::warn!("Ignored {ignored} invalid root certificates in {}", path.display());
			}

			let config = ClientConfig::builder()
				.with_safe_defaults()
				.with_root_certificates(roots)
				.with_no_client_auth();
			settings = settings.set_config(Arc::new(config));
		}
		Ok(settings)
	}
}

#[cfg(test)]
mod tests {
	#![allow(clippy::unwrap_used, clippy::expect_used)]

	use std::{io::ErrorKind, path::PathBuf};

	use url::Url;

	use super::{Config, ConnectionConfig, TLSConfig};
	use crate::error;

	#[test]
	fn credentials() -> Result<(), Box<dyn std::error::Error>> {
		let mut config = Config::new(Url::parse("ldap://localhost:1389")?);
		assert_eq!(config.credentials(), None);

		config.bind_dn = Some("cn=admin,dc=example,dc=org".to_owned());
		assert_eq!(config.credentials(), None, "A DN without password binds anonymously");

		config.bind_password = Some("adminpassword".to_owned());
		assert_eq!(config.credentials(), Some(("cn=admin,dc=example,dc=org", "adminpassword")));
		Ok(())
	}

	#[tokio::test]
	async fn test_tls_config() -> Result<(), Box<dyn std::error::Error>> {
		// no custom roots
		ConnectionConfig::default().to_settings().await?;

		// invalid crt test
		assert!(matches!(
			ConnectionConfig {
				tls: TLSConfig {
					root_certificates_path: Some(PathBuf::from("src/config.rs")),
					starttls: false,
					no_tls_verify: false,
				},
				..ConnectionConfig::default()
			}
			.to_settings()
			.await
			.err()
			.unwrap(),
			error::Error::Invalid(_)
		));

		// invalid path test
		assert!(matches!(
			ConnectionConfig {
				tls: TLSConfig {
					root_certificates_path: Some(PathBuf::from("invalid_path")),
					starttls: true,
					no_tls_verify: false,
				},
				..ConnectionConfig::default()
			}
			.to_settings()
			.await
			.err()
			.unwrap(),
			error::Error::Io(io_err) if io_err.kind() == ErrorKind::NotFound
		));

		Ok(())
	}
}
