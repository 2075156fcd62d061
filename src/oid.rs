//! Dictionary of values keyed by OID and by case-insensitive names.
//!
//! Every schema element in LDAP has a mandatory numeric OID and any number of
//! symbolic names, e.g. `2.5.4.4`, `sn` and `surname` all denote the same
//! attribute type. [`OidDictionary`] stores one value per OID and makes it
//! reachable through all of them.
use std::{collections::HashMap, sync::Arc};

use crate::error::Error;

/// Something that knows its own OID and names, so it can be added to an
/// [`OidDictionary`] with [`OidDictionary::append`].
pub trait Named {
	/// The numeric OID.
	fn oid(&self) -> &str;
	/// Symbolic names, in declaration order.
	fn names(&self) -> &[String];
}

impl<T: Named> Named for Arc<T> {
	fn oid(&self) -> &str {
		T::oid(self)
	}

	fn names(&self) -> &[String] {
		T::names(self)
	}
}

/// Check an OID against ITU X.660: a leading arc of 0, 1 or 2 followed by any
/// number of dot-separated decimal arcs.
#[must_use]
pub fn is_valid_oid(oid: &str) -> bool {
	let mut arcs = oid.split('.');
	let first_ok = matches!(arcs.next(), Some("0" | "1" | "2"));
	first_ok && arcs.all(|arc| !arc.is_empty() && arc.bytes().all(|b| b.is_ascii_digit()))
}

/// The name an element is displayed by: its longest name, the first one if
/// several are equally long, or the OID if it has no names.
#[must_use]
pub fn canonical_name<'a>(oid: &'a str, names: &'a [String]) -> &'a str {
	let mut canonical: Option<&str> = None;
	for name in names {
		if canonical.map_or(true, |current| name.len() > current.len()) {
			canonical = Some(name);
		}
	}
	canonical.unwrap_or(oid)
}

/// Values stored by OID, reachable by OID or any alias.
///
/// Aliases are indirections to the OID, so there is exactly one place a value
/// lives and replacing it is visible through every key.
#[derive(Debug, Clone, PartialEq)]
pub struct OidDictionary<V> {
	/// Values by OID.
	values: HashMap<String, V>,
	/// OIDs by lowercase alias.
	aliases: HashMap<String, String>,
	/// Display name and lowercase aliases of each OID.
	keys: HashMap<String, Keys>,
	/// OIDs in insertion order.
	order: Vec<String>,
}

/// The names registered for one OID.
#[derive(Debug, Clone, PartialEq)]
struct Keys {
	/// The longest alias as given, or the OID.
	canonical: String,
	/// Lowercased aliases.
	aliases: Vec<String>,
}

impl<V> Default for OidDictionary<V> {
	fn default() -> Self {
		Self {
			values: HashMap::new(),
			aliases: HashMap::new(),
			keys: HashMap::new(),
			order: Vec::new(),
		}
	}
}

impl<V> OidDictionary<V> {
	/// Create an empty dictionary.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Resolve a key to the OID it denotes. Aliases are checked before OIDs.
	#[must_use]
	pub fn resolve_key(&self, key: &str) -> Option<&str> {
		if let Some(oid) = self.aliases.get(&key.to_ascii_lowercase()) {
			return Some(oid.as_str());
		}
		self.values.get_key_value(key).map(|(oid, _)| oid.as_str())
	}

	/// Look up a value by OID or case-insensitive alias.
	#[must_use]
	pub fn get(&self, key: &str) -> Option<&V> {
		self.values.get(self.resolve_key(key)?)
	}

	/// Look up a value mutably by OID or case-insensitive alias.
	pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
		let oid = self.resolve_key(key)?.to_owned();
		self.values.get_mut(&oid)
	}

	/// Whether the key is an OID or alias of a stored value.
	#[must_use]
	pub fn contains_key(&self, key: &str) -> bool {
		self.resolve_key(key).is_some()
	}

	/// The canonical name of the value stored under the given key.
	#[must_use]
	pub fn canonical_name(&self, key: &str) -> Option<&str> {
		let oid = self.resolve_key(key)?;
		self.keys.get(oid).map(|keys| keys.canonical.as_str())
	}

	/// Swap the value stored under the given key, keeping all its keys.
	/// Returns the previous value.
	pub fn replace(&mut self, key: &str, value: V) -> Result<V, Error> {
		let slot = self.get_mut(key).ok_or_else(|| Error::NotFound(key.to_owned()))?;
		Ok(std::mem::replace(slot, value))
	}

	/// Remove a value and every key pointing to it. Removing a key that is
	/// not present does nothing.
	pub fn remove(&mut self, key: &str) -> Option<V> {
		let oid = self.resolve_key(key)?.to_owned();
		if let Some(keys) = self.keys.remove(&oid) {
			for alias in keys.aliases {
				self.aliases.remove(&alias);
			}
		}
		self.order.retain(|o| *o != oid);
		self.values.remove(&oid)
	}

	/// Number of stored values.
	#[must_use]
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Whether nothing is stored.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Iterate over `(canonical name, value)` pairs in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> + '_ {
		self.order.iter().filter_map(|oid| {
			let value = self.values.get(oid)?;
			let name = self.keys.get(oid).map_or(oid.as_str(), |keys| keys.canonical.as_str());
			Some((name, value))
		})
	}

	/// Iterate over the stored OIDs in insertion order.
	pub fn oids(&self) -> impl Iterator<Item = &str> + '_ {
		self.order.iter().map(String::as_str)
	}
}

impl<V: PartialEq> OidDictionary<V> {
	/// Store a value under an OID and any number of aliases.
	///
	/// The longest alias becomes the canonical name (the first one wins a
	/// tie); without aliases the OID is the canonical name. Fails if the OID
	/// is malformed, or if the OID or an alias already refers to a different
	/// value. Inserting an equal value again only adds the new aliases.
	pub fn insert<S: AsRef<str>>(&mut self, oid: &str, aliases: &[S], value: V) -> Result<(), Error> {
		if !is_valid_oid(oid) {
			return Err(Error::InvalidOid(oid.to_owned()));
		}
		if let Some(existing) = self.values.get(oid) {
			if *existing != value {
				return Err(Error::DuplicateKey(oid.to_owned()));
			}
		}
		for alias in aliases {
			let alias = alias.as_ref();
			match self.aliases.get(&alias.to_ascii_lowercase()) {
				Some(owner) if owner != oid => return Err(Error::DuplicateKey(alias.to_owned())),
				_ => {}
			}
		}

		if !self.values.contains_key(oid) {
			self.order.push(oid.to_owned());
			self.values.insert(oid.to_owned(), value);
		}
		let keys = self
			.keys
			.entry(oid.to_owned())
			.or_insert_with(|| Keys { canonical: oid.to_owned(), aliases: Vec::new() });
		for alias in aliases {
			let alias = alias.as_ref();
			let lower = alias.to_ascii_lowercase();
			if keys.aliases.contains(&lower) {
				continue;
			}
			let canonical_is_oid = keys.canonical == oid;
			if canonical_is_oid || alias.len() > keys.canonical.len() {
				keys.canonical = alias.to_owned();
			}
			self.aliases.insert(lower.clone(), oid.to_owned());
			keys.aliases.push(lower);
		}
		Ok(())
	}
}

impl<V: PartialEq + Named> OidDictionary<V> {
	/// Store a value under its own OID and names.
	pub fn append(&mut self, value: V) -> Result<(), Error> {
		let oid = value.oid().to_owned();
		let names = value.names().to_vec();
		self.insert(&oid, &names, value)
	}
}
