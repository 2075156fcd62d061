//! Search results interpreted through the schema.
//!
//! A [`DirectoryObject`] groups the attributes of an entry by the object
//! classes that allow them, with every value converted according to its
//! attribute's syntax.
use std::sync::Arc;

use ldap3::SearchEntry;
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::{
	entry::SearchEntryExt,
	error::Error,
	oid::{Named, OidDictionary},
	schema::{AttributeDefinition, ObjectDefinition, Schema},
	syntax::Value,
};

/// Attribute holding the object classes of an entry.
const OBJECT_CLASS: &str = "objectClass";

/// The values of one attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
	/// The attribute type.
	pub definition: Arc<AttributeDefinition>,
	/// The values, at most one for single-valued attributes.
	pub values: Vec<Value>,
}

impl Attribute {
	/// Convert raw values as returned by the server.
	pub fn from_raw(definition: Arc<AttributeDefinition>, raw: &[&[u8]]) -> Result<Self, Error> {
		let raw = if definition.single_value && raw.len() > 1 {
			warn!(
				"Single-valued attribute {} has {} values, keeping the first",
				definition.canonical_name(),
				raw.len()
			);
			&raw[..1]
		} else {
			raw
		};
		let values = raw
			.iter()
			.map(|value| definition.syntax.deserialize_bytes(value))
			.collect::<Result<_, _>>()?;
		Ok(Self { definition, values })
	}

	/// The first value.
	#[must_use]
	pub fn value(&self) -> Option<&Value> {
		self.values.first()
	}

	/// The values in wire form.
	pub fn serialize(&self) -> Result<Vec<String>, Error> {
		self.values.iter().map(|value| self.definition.syntax.serialize(value)).collect()
	}
}

impl Named for Attribute {
	fn oid(&self) -> &str {
		&self.definition.oid
	}

	fn names(&self) -> &[String] {
		&self.definition.name
	}
}

/// The attributes of an entry allowed by one of its object classes.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassAttributes {
	/// The object class.
	pub definition: Arc<ObjectDefinition>,
	/// Attributes present in the entry which the class requires or allows.
	pub attributes: OidDictionary<Attribute>,
}

impl ClassAttributes {
	/// Collect the attributes of `entry` the class allows.
	fn from_entry(
		schema: &Schema,
		definition: Arc<ObjectDefinition>,
		entry: &SearchEntry,
	) -> Result<Self, Error> {
		let mut names: Vec<&str> =
			entry.attrs.keys().chain(entry.bin_attrs.keys()).map(String::as_str).collect();
		names.sort_unstable_by_key(|name| name.to_ascii_lowercase());
		names.dedup_by(|a, b| a.eq_ignore_ascii_case(b));

		// Descriptions with options such as `cn;lang-de` hold values of the
		// base type and are merged into it.
		let mut collected: Vec<(Arc<AttributeDefinition>, Vec<&[u8]>)> = Vec::new();
		for name in names {
			let base = name.split_once(';').map_or(name, |(base, _)| base);
			if !definition.allows(base) {
				continue;
			}
			let attribute = schema.attribute(base)?;
			let values = entry.bin_attr_values(name);
			match collected.iter_mut().find(|(known, _)| known.oid == attribute.oid) {
				Some((_, known)) => known.extend(values),
				None => collected.push((attribute, values)),
			}
		}

		let mut attributes = OidDictionary::new();
		for (attribute, values) in collected {
			attributes.append(Attribute::from_raw(attribute, &values)?)?;
		}
		Ok(Self { definition, attributes })
	}

	/// Names of the required attributes the entry lacks.
	pub fn missing_required(&self) -> impl Iterator<Item = &str> + '_ {
		self.definition
			.must
			.iter()
			.filter(|(_, attribute)| !self.attributes.contains_key(&attribute.oid))
			.map(|(name, _)| name)
	}
}

impl Named for ClassAttributes {
	fn oid(&self) -> &str {
		&self.definition.oid
	}

	fn names(&self) -> &[String] {
		&self.definition.name
	}
}

/// An entry with its attributes grouped by object class.
#[derive(Debug, Clone)]
pub struct DirectoryObject {
	/// Distinguished name of the entry.
	pub dn: String,
	/// Attributes by object class.
	pub classes: OidDictionary<ClassAttributes>,
}

impl DirectoryObject {
	/// Interpret a search result. The entry must include its `objectClass`
	/// attribute, and every class and attribute must be known to the schema.
	pub fn from_entry(schema: &Schema, entry: &SearchEntry) -> Result<Self, Error> {
		let class_names = entry.attr_values(OBJECT_CLASS);
		if class_names.is_empty() {
			return Err(Error::Missing(format!("{OBJECT_CLASS} of {}", entry.dn)));
		}

		let mut classes = OidDictionary::new();
		for name in class_names {
			let definition = schema.object_class(name)?;
			classes.append(ClassAttributes::from_entry(schema, definition, entry)?)?;
		}
		Ok(Self { dn: entry.dn.clone(), classes })
	}

	/// The attributes of an object class, by OID or name.
	#[must_use]
	pub fn class(&self, key: &str) -> Option<&ClassAttributes> {
		self.classes.get(key)
	}

	/// An attribute of the entry, by OID or name.
	#[must_use]
	pub fn attribute(&self, key: &str) -> Option<&Attribute> {
		self.classes.iter().find_map(|(_, class)| class.attributes.get(key))
	}

	/// Names of the attributes required by any of the entry's classes that
	/// the entry lacks, without repetitions.
	#[must_use]
	pub fn missing_required(&self) -> Vec<&str> {
		let mut missing: Vec<&str> = Vec::new();
		for (_, class) in self.classes.iter() {
			for name in class.missing_required() {
				if !missing.contains(&name) {
					missing.push(name);
				}
			}
		}
		missing
	}

	/// The classes of the entry with the canonical names of their attributes
	/// present, as pretty-printed JSON.
	pub fn to_json(&self) -> Result<String, Error> {
		Ok(serde_json::to_string_pretty(self)?)
	}
}

impl Serialize for DirectoryObject {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_map(self.classes.iter().map(|(class_name, class)| {
			(class_name, class.attributes.iter().map(|(name, _)| name).collect::<Vec<_>>())
		}))
	}
}
