//! The directory schema: attribute types and object classes with their
//! inheritance resolved.
//!
//! Descriptions are parsed when loaded, but only resolved into
//! [`AttributeDefinition`]s and [`ObjectDefinition`]s when first requested.
//! The resolved definition then replaces the parsed one, so each element is
//! resolved at most once.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ldap3::Scope;
use tracing::{debug, warn};

pub use crate::parser::{DefinitionKind, Extension, ObjectKind, Usage};
use crate::{
	config::SchemaConfig,
	entry::SearchEntryExt,
	error::Error,
	ldap::Directory,
	oid::{canonical_name, Named, OidDictionary},
	parser::{parse, RawAttribute, RawDefinition, RawObjectClass},
	syntax::Syntax,
};

/// Attribute of the root DSE naming the subschema subentry.
const SUBSCHEMA_SUBENTRY: &str = "subschemaSubentry";
/// Attribute of the subschema subentry holding attribute type descriptions.
const ATTRIBUTE_TYPES: &str = "attributeTypes";
/// Attribute of the subschema subentry holding object class descriptions.
const OBJECT_CLASSES: &str = "objectClasses";

/// A resolved attribute type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefinition {
	/// Numeric OID.
	pub oid: String,
	/// Names, possibly none.
	pub name: Vec<String>,
	/// Description, empty if none.
	pub desc: String,
	/// Whether the attribute type is obsolete.
	pub obsolete: bool,
	/// The supertype, if any.
	pub sup: Option<Arc<AttributeDefinition>>,
	/// The syntax, declared or inherited from the nearest supertype.
	pub syntax: Syntax,
	/// Suggested maximum length of values, 0 if unlimited.
	pub length: u32,
	/// Equality matching rule.
	pub equality: Option<String>,
	/// Ordering matching rule.
	pub ordering: Option<String>,
	/// Substring matching rule.
	pub substr: Option<String>,
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

impl AttributeDefinition {
	/// The longest name, or the OID.
	#[must_use]
	pub fn canonical_name(&self) -> &str {
		canonical_name(&self.oid, &self.name)
	}
}

impl Named for AttributeDefinition {
	fn oid(&self) -> &str {
		&self.oid
	}

	fn names(&self) -> &[String] {
		&self.name
	}
}

/// A resolved object class.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDefinition {
	/// Numeric OID.
	pub oid: String,
	/// Names, possibly none.
	pub name: Vec<String>,
	/// Description, empty if none.
	pub desc: String,
	/// Whether the object class is obsolete.
	pub obsolete: bool,
	/// Structural, auxiliary or abstract.
	pub kind: ObjectKind,
	/// Direct superclasses.
	pub sup: Vec<Arc<ObjectDefinition>>,
	/// Required attributes, including inherited ones.
	pub must: OidDictionary<Arc<AttributeDefinition>>,
	/// Optional attributes, including inherited ones, without any that are
	/// required.
	pub may: OidDictionary<Arc<AttributeDefinition>>,
	/// Vendor extensions.
	pub extensions: Vec<Extension>,
}

impl ObjectDefinition {
	/// The longest name, or the OID.
	#[must_use]
	pub fn canonical_name(&self) -> &str {
		canonical_name(&self.oid, &self.name)
	}

	/// Whether entries of this class may hold the given attribute.
	#[must_use]
	pub fn allows(&self, attribute: &str) -> bool {
		self.must.contains_key(attribute) || self.may.contains_key(attribute)
	}

	/// The definition of an attribute this class allows.
	#[must_use]
	pub fn attribute(&self, attribute: &str) -> Option<&Arc<AttributeDefinition>> {
		self.must.get(attribute).or_else(|| self.may.get(attribute))
	}
}

impl Named for ObjectDefinition {
	fn oid(&self) -> &str {
		&self.oid
	}

	fn names(&self) -> &[String] {
		&self.name
	}
}

/// A schema element returned by [`Schema::get`].
#[derive(Debug, Clone)]
pub enum Definition {
	/// A standard syntax
	Syntax(Syntax),
	/// An attribute type
	Attribute(Arc<AttributeDefinition>),
	/// An object class
	ObjectClass(Arc<ObjectDefinition>),
}

/// State of one schema element.
#[derive(Debug, Clone)]
enum Entry {
	/// A standard syntax.
	Syntax(Syntax),
	/// Parsed, not yet resolved.
	Raw(RawDefinition),
	/// Resolved attribute type.
	Attribute(Arc<AttributeDefinition>),
	/// Resolved object class.
	ObjectClass(Arc<ObjectDefinition>),
}

impl PartialEq for Entry {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Entry::Syntax(a), Entry::Syntax(b)) => a == b,
			(Entry::Raw(a), Entry::Raw(b)) => a == b,
			(Entry::Attribute(a), Entry::Attribute(b)) => Arc::ptr_eq(a, b),
			(Entry::ObjectClass(a), Entry::ObjectClass(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl Named for Entry {
	fn oid(&self) -> &str {
		match self {
			Entry::Syntax(syntax) => syntax.oid(),
			Entry::Raw(raw) => raw.oid(),
			Entry::Attribute(attribute) => &attribute.oid,
			Entry::ObjectClass(class) => &class.oid,
		}
	}

	fn names(&self) -> &[String] {
		match self {
			Entry::Syntax(syntax) => syntax.names(),
			Entry::Raw(raw) => raw.names(),
			Entry::Attribute(attribute) => &attribute.name,
			Entry::ObjectClass(class) => &class.name,
		}
	}
}

/// Schema elements by OID and name.
///
/// Loading requires exclusive access. Lookups only need a shared reference
/// and may be made from several threads; resolution of a definition happens
/// under a lock, so it happens once.
#[derive(Debug)]
pub struct Schema {
	/// All elements, parsed or resolved.
	entries: Mutex<OidDictionary<Entry>>,
}

impl Default for Schema {
	fn default() -> Self {
		Self::new()
	}
}

impl Schema {
	/// Create a schema containing only the standard syntaxes.
	#[must_use]
	pub fn new() -> Self {
		let mut entries = OidDictionary::new();
		for syntax in Syntax::all() {
			if let Err(err) = entries.append(Entry::Syntax(syntax)) {
				warn!("Failed to register syntax {}: {err}", syntax.oid());
			}
		}
		Self { entries: Mutex::new(entries) }
	}

	/// Fetch the schema published by a directory server.
	///
	/// Looks up the subschema subentry in the root DSE, then reads its
	/// attribute types and object classes.
	pub async fn fetch<D: Directory>(directory: &mut D, config: &SchemaConfig) -> Result<Self, Error> {
		let root_dse =
			directory.search("", Scope::Base, "(objectClass=*)", &[SUBSCHEMA_SUBENTRY]).await?;
		let subentry = root_dse
			.first()
			.and_then(|entry| entry.attr_first(SUBSCHEMA_SUBENTRY))
			.ok_or_else(|| Error::Missing(SUBSCHEMA_SUBENTRY.to_owned()))?
			.to_owned();
		debug!("Reading schema from {subentry}");

		let entries = directory
			.search(&subentry, Scope::Base, "(objectClass=subschema)", &[ATTRIBUTE_TYPES, OBJECT_CLASSES])
			.await?;
		let entry = entries.first().ok_or_else(|| Error::Missing(subentry.clone()))?;

		let mut schema = Schema::new();
		for (attribute, kind) in
			[(ATTRIBUTE_TYPES, DefinitionKind::Attribute), (OBJECT_CLASSES, DefinitionKind::ObjectClass)]
		{
			let definitions = entry.attr_values(attribute);
			if config.skip_invalid_definitions {
				let skipped = schema.load_skipping_invalid(definitions, kind);
				if skipped > 0 {
					warn!("Skipped {skipped} invalid {attribute} of {subentry}");
				}
			} else {
				schema.load(definitions, kind)?;
			}
		}
		Ok(schema)
	}

	/// Parse descriptions and add them to the schema. They are resolved when
	/// first requested.
	pub fn load<I>(&mut self, definitions: I, kind: DefinitionKind) -> Result<(), Error>
	where
		I: IntoIterator,
		I::Item: AsRef<str>,
	{
		let entries = self.entries.get_mut().unwrap_or_else(PoisonError::into_inner);
		for description in definitions {
			entries.append(Entry::Raw(parse(description.as_ref(), kind)?))?;
		}
		Ok(())
	}

	/// Like [`Schema::load`], but descriptions that fail to parse or clash
	/// with existing elements are logged and skipped. Returns the number of
	/// skipped descriptions.
	pub fn load_skipping_invalid<I>(&mut self, definitions: I, kind: DefinitionKind) -> usize
	where
		I: IntoIterator,
		I::Item: AsRef<str>,
	{
		let entries = self.entries.get_mut().unwrap_or_else(PoisonError::into_inner);
		let mut skipped = 0;
		for description in definitions {
			let description = description.as_ref();
			let result = parse(description, kind).and_then(|raw| entries.append(Entry::Raw(raw)));
			if let Err(err) = result {
				warn!("Skipping schema definition {description}: {err}");
				skipped += 1;
			}
		}
		skipped
	}

	/// Whether the schema has an element with the given OID or name.
	#[must_use]
	pub fn contains(&self, key: &str) -> bool {
		self.lock().contains_key(key)
	}

	/// Look up an element by OID or case-insensitive name, resolving it if
	/// necessary.
	pub fn get(&self, key: &str) -> Result<Definition, Error> {
		let mut entries = self.lock();
		Resolver { entries: &mut entries, in_progress: Vec::new() }.get(key)
	}

	/// Look up an attribute type.
	pub fn attribute(&self, key: &str) -> Result<Arc<AttributeDefinition>, Error> {
		match self.get(key)? {
			Definition::Attribute(attribute) => Ok(attribute),
			_ => Err(Error::KindMismatch { key: key.to_owned(), expected: "an attribute type" }),
		}
	}

	/// Look up an object class.
	pub fn object_class(&self, key: &str) -> Result<Arc<ObjectDefinition>, Error> {
		match self.get(key)? {
			Definition::ObjectClass(class) => Ok(class),
			_ => Err(Error::KindMismatch { key: key.to_owned(), expected: "an object class" }),
		}
	}

	/// Resolve every element now, so that later lookups only read.
	pub fn resolve_all(&self) -> Result<(), Error> {
		let mut entries = self.lock();
		let oids: Vec<String> = entries.oids().map(str::to_owned).collect();
		let mut resolver = Resolver { entries: &mut entries, in_progress: Vec::new() };
		for oid in oids {
			resolver.get(&oid)?;
		}
		Ok(())
	}

	/// Acquire the element dictionary. Resolution only ever swaps complete
	/// entries, so the dictionary is consistent even after a panic.
	fn lock(&self) -> MutexGuard<'_, OidDictionary<Entry>> {
		self.entries.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

/// Resolves parsed definitions, detecting cycles.
struct Resolver<'a> {
	/// The schema elements.
	entries: &'a mut OidDictionary<Entry>,
	/// OIDs of the definitions being resolved, outermost first.
	in_progress: Vec<String>,
}

impl Resolver<'_> {
	/// Look up an element, resolving and memoizing it if necessary.
	fn get(&mut self, key: &str) -> Result<Definition, Error> {
		let raw = match self.entries.get(key) {
			None => return Err(Error::NotFound(key.to_owned())),
			Some(Entry::Syntax(syntax)) => return Ok(Definition::Syntax(*syntax)),
			Some(Entry::Attribute(attribute)) => return Ok(Definition::Attribute(Arc::clone(attribute))),
			Some(Entry::ObjectClass(class)) => return Ok(Definition::ObjectClass(Arc::clone(class))),
			Some(Entry::Raw(raw)) => raw.clone(),
		};
		let oid = raw.oid().to_owned();

		if self.in_progress.contains(&oid) {
			let mut cycle: Vec<String> = self
				.in_progress
				.iter()
				.skip_while(|resolving| **resolving != oid)
				.map(|resolving| self.display_name(resolving))
				.collect();
			cycle.push(self.display_name(&oid));
			return Err(Error::CyclicDefinition(cycle));
		}

		debug!("Resolving schema definition {}", self.display_name(&oid));
		self.in_progress.push(oid.clone());
		let resolved = match raw {
			RawDefinition::Attribute(raw) => self.attribute(raw).map(Arc::new).map(Entry::Attribute),
			RawDefinition::ObjectClass(raw) => self.object_class(raw).map(Arc::new).map(Entry::ObjectClass),
		};
		self.in_progress.pop();

		let resolved = resolved?;
		self.entries.replace(&oid, resolved.clone())?;
		Ok(match resolved {
			Entry::Attribute(attribute) => Definition::Attribute(attribute),
			Entry::ObjectClass(class) => Definition::ObjectClass(class),
			Entry::Syntax(syntax) => Definition::Syntax(syntax),
			Entry::Raw(_) => return Err(Error::NotFound(oid)),
		})
	}

	/// Canonical name of an element, for messages.
	fn display_name(&self, oid: &str) -> String {
		self.entries.canonical_name(oid).unwrap_or(oid).to_owned()
	}

	/// Resolve a reference made by `definition` to an attribute type.
	fn reference_attribute(
		&mut self,
		definition: &str,
		key: &str,
	) -> Result<Arc<AttributeDefinition>, Error> {
		match self.get(key) {
			Ok(Definition::Attribute(attribute)) => Ok(attribute),
			Ok(_) => Err(Error::KindMismatch { key: key.to_owned(), expected: "an attribute type" }),
			Err(err) => Err(unresolved(definition, err)),
		}
	}

	/// Resolve a reference made by `definition` to an object class.
	fn reference_class(&mut self, definition: &str, key: &str) -> Result<Arc<ObjectDefinition>, Error> {
		match self.get(key) {
			Ok(Definition::ObjectClass(class)) => Ok(class),
			Ok(_) => Err(Error::KindMismatch { key: key.to_owned(), expected: "an object class" }),
			Err(err) => Err(unresolved(definition, err)),
		}
	}

	/// Look up a syntax by OID, falling back to Octet String for syntaxes
	/// that are not standard (any longer).
	fn syntax(&self, definition: &str, oid: &str) -> Syntax {
		match self.entries.get(oid) {
			Some(Entry::Syntax(syntax)) => *syntax,
			_ => {
				warn!("Unknown syntax {oid} of {definition}, treating it as Octet String");
				Syntax::FALLBACK
			}
		}
	}

	/// Resolve an attribute type's supertype and syntax.
	fn attribute(&mut self, raw: RawAttribute) -> Result<AttributeDefinition, Error> {
		let context = canonical_name(&raw.oid, &raw.name).to_owned();
		let sup = match &raw.sup {
			Some(sup) => Some(self.reference_attribute(&context, sup)?),
			None => None,
		};
		let (syntax, length) = match (&raw.syntax, &sup) {
			(Some(reference), _) => (self.syntax(&context, &reference.oid), reference.length),
			(None, Some(sup)) => (sup.syntax, sup.length),
			(None, None) => {
				return Err(Error::Parsing(format!("{context}: Either SUP or SYNTAX must be set")))
			}
		};

		Ok(AttributeDefinition {
			oid: raw.oid,
			name: raw.name,
			desc: raw.desc,
			obsolete: raw.obsolete,
			sup,
			syntax,
			length,
			equality: raw.equality,
			ordering: raw.ordering,
			substr: raw.substr,
			single_value: raw.single_value,
			collective: raw.collective,
			no_user_modification: raw.no_user_modification,
			usage: raw.usage,
			extensions: raw.extensions,
		})
	}

	/// Resolve an object class's attributes and superclasses, inheriting the
	/// attributes of the latter.
	fn object_class(&mut self, raw: RawObjectClass) -> Result<ObjectDefinition, Error> {
		let context = canonical_name(&raw.oid, &raw.name).to_owned();

		let mut must = OidDictionary::new();
		for name in &raw.must {
			must.append(self.reference_attribute(&context, name)?)?;
		}
		let mut may = OidDictionary::new();
		for name in &raw.may {
			may.append(self.reference_attribute(&context, name)?)?;
		}

		let sup = raw
			.sup
			.iter()
			.map(|name| self.reference_class(&context, name))
			.collect::<Result<Vec<_>, _>>()?;
		for superclass in &sup {
			inherit(&mut must, &superclass.must)?;
			inherit(&mut may, &superclass.may)?;
		}

		let required: Vec<String> = must.oids().map(str::to_owned).collect();
		for oid in required {
			may.remove(&oid);
		}

		Ok(ObjectDefinition {
			oid: raw.oid,
			name: raw.name,
			desc: raw.desc,
			obsolete: raw.obsolete,
			kind: raw.kind,
			sup,
			must,
			may,
			extensions: raw.extensions,
		})
	}
}

/// Add the attributes of a superclass that are not yet present.
fn inherit(
	attributes: &mut OidDictionary<Arc<AttributeDefinition>>,
	inherited: &OidDictionary<Arc<AttributeDefinition>>,
) -> Result<(), Error> {
	for (_, attribute) in inherited.iter() {
		if !attributes.contains_key(&attribute.oid) {
			attributes.append(Arc::clone(attribute))?;
		}
	}
	Ok(())
}

/// Attach the referring definition to a failed lookup.
fn unresolved(definition: &str, err: Error) -> Error {
	match err {
		Error::NotFound(reference) => {
			Error::UnresolvedReference { definition: definition.to_owned(), reference }
		}
		other => other,
	}
}
