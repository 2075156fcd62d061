//! Read the schema of an LDAP directory server and interpret entries with it.
//!
//! Directory servers publish their schema as RFC 4512 descriptions in the
//! `attributeTypes` and `objectClasses` attributes of a subschema subentry.
//! This library parses those descriptions, resolves the inheritance between
//! them (attribute supertypes and object class superclasses) lazily on first
//! access, and converts attribute values between their wire form and native
//! values according to the standard RFC 4517 syntaxes.
//!
//! For a general primer on LDAP, the [introduction] in the `ldap3` crate which
//! is used here for interfacing with LDAP is an excellent resource.
//!
//! [introduction]: https://github.com/inejge/ldap3/blob/master/LDAP-primer.md
//!
//! # Getting started
//! Fetching the schema of a server and interpreting a search result might
//! look like so:
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use url::Url;
//! use ldap_schema::{
//!     config::Config,
//!     ldap::{Connection, Directory},
//!     ldap3::Scope,
//!     object::DirectoryObject,
//!     schema::Schema,
//! };
//!
//! // Configuration can also be deserialized with serde. It's hand-constructed
//! // here for demonstration purposes.
//! let mut config = Config::new(Url::parse("ldap://localhost:1389")?);
//! config.bind_dn = Some("cn=admin,dc=example,dc=org".to_owned());
//! config.bind_password = Some("adminpassword".to_owned());
//!
//! let mut connection = Connection::new(config.clone());
//! let schema = Schema::fetch(&mut connection, &config.schema).await?;
//!
//! let person = schema.object_class("inetOrgPerson")?;
//! println!("{} requires {:?}", person.canonical_name(), person.must.oids().collect::<Vec<_>>());
//!
//! let entries = connection
//!     .search("ou=users,dc=example,dc=org", Scope::OneLevel, "(objectClass=*)", &["*"])
//!     .await?;
//! for entry in &entries {
//!     let object = DirectoryObject::from_entry(&schema, entry)?;
//!     println!("{} lacks {:?}", object.dn, object.missing_required());
//! }
//! connection.unbind().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Limitations
//! * Matching rules are kept by name only; values are never compared
//!   according to them.
//! * DIT content rules, structure rules and name forms are not read.
//! * Values of syntaxes without a native representation are validated as
//!   far as their character set goes and kept as strings.

pub mod config;
pub mod entry;
pub mod error;
pub mod filter;
pub mod ldap;
pub mod object;
pub mod oid;
pub mod parser;
pub mod schema;
pub mod syntax;
pub mod tokenizer;

pub use ldap3::{self, SearchEntry};

pub use crate::{
	config::{Config, ConnectionConfig, SchemaConfig, SearchConfig},
	entry::SearchEntryExt,
	error::Error,
	filter::Filter,
	ldap::{Connection, Directory},
	object::DirectoryObject,
	oid::OidDictionary,
	schema::{AttributeDefinition, Definition, ObjectDefinition, Schema},
	syntax::{Syntax, SyntaxKind, Value},
};
