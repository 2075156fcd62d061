//! Parsing of attribute type and object class descriptions (RFC 4512
//! section 4.1).
//!
//! The result is a [`RawDefinition`], which still refers to other schema
//! elements by name. Turning names into definitions is the job of
//! [`Schema`](crate::schema::Schema).
use std::{collections::HashMap, fmt};

use tracing::debug;

use crate::{
	error::Error,
	oid::Named,
	tokenizer::{tokenize, Token},
};

/// How the value of a keyword is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordType {
	/// A flag, true when present.
	Bool,
	/// The single token after the keyword.
	Scalar,
	/// The token after the keyword, which may be a list.
	List,
}

/// Keywords of attribute type descriptions.
const ATTRIBUTE_KEYWORDS: &[(&str, KeywordType)] = &[
	("NAME", KeywordType::List),
	("DESC", KeywordType::Scalar),
	("OBSOLETE", KeywordType::Bool),
	("SUP", KeywordType::Scalar),
	("EQUALITY", KeywordType::Scalar),
	("ORDERING", KeywordType::Scalar),
	("SUBSTR", KeywordType::Scalar),
	("SYNTAX", KeywordType::Scalar),
	("SINGLE-VALUE", KeywordType::Bool),
	("COLLECTIVE", KeywordType::Bool),
	("NO-USER-MODIFICATION", KeywordType::Bool),
	("USAGE", KeywordType::Scalar),
];

/// Keywords of object class descriptions.
const OBJECT_CLASS_KEYWORDS: &[(&str, KeywordType)] = &[
	("NAME", KeywordType::List),
	("DESC", KeywordType::Scalar),
	("OBSOLETE", KeywordType::Bool),
	("SUP", KeywordType::List),
	("ABSTRACT", KeywordType::Bool),
	("STRUCTURAL", KeywordType::Bool),
	("AUXILIARY", KeywordType::Bool),
	("MUST", KeywordType::List),
	("MAY", KeywordType::List),
];

/// Whether a description defines an attribute type or an object class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
	/// `attributeTypes` value
	Attribute,
	/// `objectClasses` value
	ObjectClass,
}

/// What an attribute is used for (the `USAGE` keyword).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Usage {
	/// Ordinary user data.
	#[default]
	UserApplications,
	/// Operational attribute of a single server.
	DirectoryOperation,
	/// Operational attribute shared between servers.
	DistributedOperation,
	/// Operational attribute specific to one DSA.
	DsaOperation,
}

impl Usage {
	/// The keyword used in descriptions.
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Usage::UserApplications => "userApplications",
			Usage::DirectoryOperation => "directoryOperation",
			Usage::DistributedOperation => "distributedOperation",
			Usage::DsaOperation => "dSAOperation",
		}
	}

	/// Whether the attribute is operational.
	#[must_use]
	pub fn is_operational(self) -> bool {
		self != Usage::UserApplications
	}
}

impl fmt::Display for Usage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The kind of an object class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ObjectKind {
	/// May be the base class of an entry.
	#[default]
	Structural,
	/// May be added to entries of any structural class.
	Auxiliary,
	/// Only a superclass of other classes.
	Abstract,
}

/// A `SYNTAX` reference, e.g. `1.3.6.1.4.1.1466.115.121.1.15{128}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxRef {
	/// The syntax OID.
	pub oid: String,
	/// Suggested maximum length, 0 if none was given.
	pub length: u32,
}

impl SyntaxRef {
	/// Split an optional `{length}` suffix off a syntax OID.
	pub fn parse(reference: &str) -> Result<Self, Error> {
		let unknown = || Error::Parsing(format!("unknown syntax format: {reference}"));
		let (oid, length) = match reference.split_once('{') {
			Some((oid, rest)) => {
				let digits = rest.strip_suffix('}').ok_or_else(unknown)?;
				if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
					return Err(unknown());
				}
				(oid, digits.parse().map_err(|_| unknown())?)
			}
			None => (reference, 0),
		};
		if oid.is_empty() || !oid.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-')
		{
			return Err(unknown());
		}
		Ok(Self { oid: oid.to_owned(), length })
	}
}

/// A vendor extension such as `X-ORIGIN 'RFC 4519'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
	/// The keyword, including the `X-` prefix.
	pub name: String,
	/// The quoted strings following it.
	pub values: Vec<String>,
}

/// A parsed attribute type description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
	/// Numeric OID.
	pub oid: String,
	/// Names, possibly none.
	pub name: Vec<String>,
	/// Description, empty if none.
	pub desc: String,
	/// Whether the attribute type is obsolete.
	pub obsolete: bool,
	/// The supertype.
	pub sup: Option<String>,
	/// Equality matching rule.
	pub equality: Option<String>,
	/// Ordering matching rule.
	pub ordering: Option<String>,
	/// Substring matching rule.
	pub substr: Option<String>,
	/// The syntax, if declared rather than inherited.
	pub syntax: Option<SyntaxRef>,
	/// Whether at most one value is allowed.
	pub single_value: bool,
	/// Whether the attribute is collective.
	pub collective: bool,
	/// Whether only the server may modify the attribute.
	pub no_user_modification: bool,
	/// What the attribute is used for.
	pub usage: Usage,
	/// Vendor extensions.
	pub extensions: Vec<Extension>,
}

/// A parsed object class description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObjectClass {
	/// Numeric OID.
	pub oid: String,
	/// Names, possibly none.
	pub name: Vec<String>,
	/// Description, empty if none.
	pub desc: String,
	/// Whether the object class is obsolete.
	pub obsolete: bool,
	/// Superclasses.
	pub sup: Vec<String>,
	/// Structural, auxiliary or abstract.
	pub kind: ObjectKind,
	/// Required attributes.
	pub must: Vec<String>,
	/// Optional attributes.
	pub may: Vec<String>,
	/// Vendor extensions.
	pub extensions: Vec<Extension>,
}

/// A parsed description of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDefinition {
	/// An attribute type
	Attribute(RawAttribute),
	/// An object class
	ObjectClass(RawObjectClass),
}

impl RawDefinition {
	/// Which kind of definition this is.
	#[must_use]
	pub fn kind(&self) -> DefinitionKind {
		match self {
			RawDefinition::Attribute(_) => DefinitionKind::Attribute,
			RawDefinition::ObjectClass(_) => DefinitionKind::ObjectClass,
		}
	}
}

impl Named for RawDefinition {
	fn oid(&self) -> &str {
		match self {
			RawDefinition::Attribute(attribute) => &attribute.oid,
			RawDefinition::ObjectClass(class) => &class.oid,
		}
	}

	fn names(&self) -> &[String] {
		match self {
			RawDefinition::Attribute(attribute) => &attribute.name,
			RawDefinition::ObjectClass(class) => &class.name,
		}
	}
}

/// Parse a description of the given kind.
pub fn parse(description: &str, kind: DefinitionKind) -> Result<RawDefinition, Error> {
	match kind {
		DefinitionKind::Attribute => parse_attribute(description).map(RawDefinition::Attribute),
		DefinitionKind::ObjectClass => parse_object_class(description).map(RawDefinition::ObjectClass),
	}
}

/// Parse an attribute type description.
pub fn parse_attribute(description: &str) -> Result<RawAttribute, Error> {
	let mut properties = Properties::extract(tokenize(description)?, ATTRIBUTE_KEYWORDS)?;

	let usage = match properties.scalar("usage").as_deref() {
		None | Some("userApplications") => Usage::UserApplications,
		Some("directoryOperation") => Usage::DirectoryOperation,
		Some("distributedOperation") => Usage::DistributedOperation,
		Some("dSAOperation") => Usage::DsaOperation,
		Some(other) => return Err(Error::Parsing(format!("Unknown USAGE {other}"))),
	};
	let attribute = RawAttribute {
		name: properties.list("name"),
		desc: properties.scalar("desc").unwrap_or_default(),
		obsolete: properties.flag("obsolete"),
		sup: properties.scalar("sup"),
		equality: properties.scalar("equality"),
		ordering: properties.scalar("ordering"),
		substr: properties.scalar("substr"),
		syntax: properties.scalar("syntax").as_deref().map(SyntaxRef::parse).transpose()?,
		single_value: properties.flag("single_value"),
		collective: properties.flag("collective"),
		no_user_modification: properties.flag("no_user_modification"),
		usage,
		oid: properties.oid,
		extensions: properties.extensions,
	};

	if attribute.sup.is_none() && attribute.syntax.is_none() {
		return Err(Error::Parsing("Either SUP or SYNTAX must be set".to_owned()));
	}
	if attribute.collective && attribute.usage != Usage::UserApplications {
		return Err(Error::Parsing("COLLECTIVE requires USAGE userApplications".to_owned()));
	}
	if attribute.no_user_modification && !attribute.usage.is_operational() {
		return Err(Error::Parsing("NO-USER-MODIFICATION requires operational attribute".to_owned()));
	}
	Ok(attribute)
}

/// Parse an object class description.
pub fn parse_object_class(description: &str) -> Result<RawObjectClass, Error> {
	let mut properties = Properties::extract(tokenize(description)?, OBJECT_CLASS_KEYWORDS)?;

	let flags = [
		(properties.flag("structural"), ObjectKind::Structural),
		(properties.flag("abstract"), ObjectKind::Abstract),
		(properties.flag("auxiliary"), ObjectKind::Auxiliary),
	];
	let mut declared = flags.iter().filter(|(set, _)| *set).map(|(_, kind)| *kind);
	let kind = declared.next().unwrap_or_default();
	if declared.next().is_some() {
		return Err(Error::Parsing(
			"Object class must be STRUCTURAL, ABSTRACT, or AUXILIARY".to_owned(),
		));
	}

	Ok(RawObjectClass {
		name: properties.list("name"),
		desc: properties.scalar("desc").unwrap_or_default(),
		obsolete: properties.flag("obsolete"),
		sup: properties.list("sup"),
		kind,
		must: properties.list("must"),
		may: properties.list("may"),
		oid: properties.oid,
		extensions: properties.extensions,
	})
}

/// The value of a keyword found in a description.
#[derive(Debug)]
enum Property {
	/// A flag keyword was present.
	Flag,
	/// The value of a scalar keyword.
	Scalar(String),
	/// The values of a list keyword.
	List(Vec<String>),
}

/// Keyword values of one description, keyed by lowercased keyword with `-`
/// replaced by `_`.
#[derive(Debug)]
struct Properties {
	/// The OID, always the first element.
	oid: String,
	/// Values of known keywords.
	values: HashMap<String, Property>,
	/// `X-` extensions in order of appearance.
	extensions: Vec<Extension>,
}

impl Properties {
	/// Walk the tokens of a description, collecting the keywords in the given
	/// table.
	fn extract(tokens: Vec<Token>, keywords: &[(&str, KeywordType)]) -> Result<Self, Error> {
		let mut tokens = tokens.into_iter().peekable();
		let oid = match tokens.next() {
			Some(Token::Word(oid)) => oid,
			_ => return Err(Error::Parsing("Description does not start with an OID".to_owned())),
		};
		let mut properties = Properties { oid, values: HashMap::new(), extensions: Vec::new() };

		while let Some(token) = tokens.next() {
			let Token::Word(word) = token else {
				return Err(Error::Parsing(format!(
					"Unexpected list in description of {}",
					properties.oid
				)));
			};

			if let Some((keyword, keyword_type)) = keywords.iter().find(|(k, _)| *k == word) {
				let property = match keyword_type {
					KeywordType::Bool => Property::Flag,
					KeywordType::Scalar => match tokens.next() {
						Some(Token::Word(value)) => Property::Scalar(value),
						_ => return Err(Error::Parsing(format!("{keyword} requires a single value"))),
					},
					KeywordType::List => match tokens.next() {
						Some(token) => Property::List(words(keyword, token)?),
						None => return Err(Error::Parsing(format!("{keyword} requires a value"))),
					},
				};
				let key = keyword.to_lowercase().replace('-', "_");
				if properties.values.insert(key, property).is_some() {
					return Err(Error::Parsing(format!("{keyword} given more than once")));
				}
			} else if word.starts_with("X-") {
				let values = match tokens.next() {
					Some(token) => words(&word, token)?,
					None => return Err(Error::Parsing(format!("{word} requires a value"))),
				};
				properties.extensions.push(Extension { name: word, values });
			} else {
				debug!("Skipping unknown keyword {word} in description of {}", properties.oid);
				if matches!(tokens.peek(), Some(Token::List(_))) {
					tokens.next();
				}
			}
		}
		Ok(properties)
	}

	/// Whether a flag keyword was present.
	fn flag(&mut self, key: &str) -> bool {
		matches!(self.values.remove(key), Some(Property::Flag))
	}

	/// Take the value of a scalar keyword.
	fn scalar(&mut self, key: &str) -> Option<String> {
		match self.values.remove(key) {
			Some(Property::Scalar(value)) => Some(value),
			_ => None,
		}
	}

	/// Take the values of a list keyword, empty if it was not present.
	fn list(&mut self, key: &str) -> Vec<String> {
		match self.values.remove(key) {
			Some(Property::List(values)) => values,
			_ => Vec::new(),
		}
	}
}

/// The words of a keyword value, wrapping a single word in a list.
fn words(keyword: &str, token: Token) -> Result<Vec<String>, Error> {
	match token {
		Token::Word(word) => Ok(vec![word]),
		Token::List(tokens) => tokens
			.into_iter()
			.map(|token| match token {
				Token::Word(word) => Ok(word),
				Token::List(_) => Err(Error::Parsing(format!("{keyword} contains a nested list"))),
			})
			.collect(),
	}
}
