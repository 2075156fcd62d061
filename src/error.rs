//! Error codes

/// Errors that can occur when using this library
#[derive(thiserror::Error, Debug)]
pub enum Error {
	/// An OID did not match the ITU X.660 dotted decimal form.
	#[error("Invalid OID: {0}")]
	InvalidOid(String),
	/// A key is already mapped to a different value in an
	/// [`OidDictionary`](crate::oid::OidDictionary).
	#[error("Key already in use: {0}")]
	DuplicateKey(String),
	/// No value is stored under the given OID or name.
	#[error("Key not found: {0}")]
	NotFound(String),
	/// A schema description could not be split into tokens.
	#[error("Error at character {position}: {message} (near \"{snippet}\")")]
	Lexing {
		/// Byte offset into the unwrapped description.
		position: usize,
		/// What went wrong.
		message: &'static str,
		/// The start of the offending description, truncated.
		snippet: String,
	},
	/// A schema description is well-formed but violates RFC 4512.
	#[error("{0}")]
	Parsing(String),
	/// A value does not conform to the rules of its syntax.
	#[error("{}", syntax_message(.value, .expected))]
	Syntax {
		/// The offending value.
		value: String,
		/// Literal values the syntax accepts, if there are only a few.
		expected: Vec<String>,
	},
	/// The OID does not name one of the standard syntaxes.
	#[error("Unsupported syntax: {0}")]
	UnsupportedSyntax(String),
	/// The SUP references of a definition loop back on themselves.
	#[error("cyclic definition: {}", .0.join(" -> "))]
	CyclicDefinition(Vec<String>),
	/// A definition refers to a name the schema does not contain.
	#[error("Definition {definition} refers to unknown element {reference}")]
	UnresolvedReference {
		/// The definition being resolved.
		definition: String,
		/// The name or OID that could not be found.
		reference: String,
	},
	/// A key resolved to a schema element of an unexpected kind.
	#[error("{key} is not {expected}")]
	KindMismatch {
		/// The requested key.
		key: String,
		/// Description of the expected kind.
		expected: &'static str,
	},
	/// A required attribute in a search result was missing.
	#[error("Missing data: {0}")]
	Missing(String),
	/// Configuration or data supplied to the library was malformed.
	#[error("Malformed data: {0}")]
	Invalid(String),
	/// Reading a file failed.
	#[error(transparent)]
	Io(#[from] std::io::Error),
	/// Encoding as JSON failed.
	#[error(transparent)]
	Json(#[from] serde_json::Error),
	/// An underlying protocol error or similar occurred, or the LDAP library
	/// was used incorrectly.
	#[error(transparent)]
	Ldap(#[from] ldap3::LdapError),
}

impl Error {
	/// Build a [`Error::Syntax`] without a list of accepted values.
	pub(crate) fn syntax(value: impl Into<String>) -> Self {
		Error::Syntax { value: value.into(), expected: Vec::new() }
	}
}

/// Render the message for [`Error::Syntax`].
fn syntax_message(value: &str, expected: &[String]) -> String {
	if expected.is_empty() {
		format!("Value '{value}' invalid per syntax")
	} else {
		format!("Value '{value}' invalid. Expected one of: {}", expected.join(", "))
	}
}
