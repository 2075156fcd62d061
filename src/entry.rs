//! Helper methods for extracting data from search results.
//!
//! Attribute descriptions are case-insensitive, so lookups ignore ASCII case
//! even though [`SearchEntry`] stores attributes under the names the server
//! returned.
use ldap3::SearchEntry;

/// An extension trait for [`SearchEntry`] that provides convenience methods for
/// extracting data.
pub trait SearchEntryExt {
	/// Get all string values of an attribute. Empty if the attribute is
	/// absent or only has binary values.
	fn attr_values(&self, attr: &str) -> &[String];

	/// Get all values of an attribute in binary form, whether the server
	/// returned them as strings or not.
	fn bin_attr_values(&self, attr: &str) -> Vec<&[u8]>;

	/// Get the first value of an attribute. Will return `None` if attribute
	/// value is not valid UTF-8.
	fn attr_first(&self, attr: &str) -> Option<&str> {
		self.attr_values(attr).first().map(String::as_str)
	}

	/// Get the first value of an attribute, in binary form
	fn bin_attr_first(&self, attr: &str) -> Option<&[u8]> {
		self.bin_attr_values(attr).into_iter().next()
	}

	/// Whether the entry holds any value of an attribute.
	fn has_attr(&self, attr: &str) -> bool {
		!self.bin_attr_values(attr).is_empty()
	}
}

impl SearchEntryExt for SearchEntry {
	fn attr_values(&self, attr: &str) -> &[String] {
		self.attrs
			.iter()
			.find(|(name, _)| name.eq_ignore_ascii_case(attr))
			.map(|(_, values)| values.as_slice())
			.unwrap_or_default()
	}

	fn bin_attr_values(&self, attr: &str) -> Vec<&[u8]> {
		let strings = self.attr_values(attr).iter().map(String::as_bytes);
		let binary = self
			.bin_attrs
			.iter()
			.filter(|(name, _)| name.eq_ignore_ascii_case(attr))
			.flat_map(|(_, values)| values.iter().map(Vec::as_slice));
		strings.chain(binary).collect()
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use ldap3::SearchEntry;

	use super::SearchEntryExt;

	fn entry() -> SearchEntry {
		SearchEntry {
			dn: String::from("cn=Foo Bar,dc=example,dc=org"),
			attrs: [(
				String::from("cn"),
				vec![String::from("Foo Bar"), String::from("Bar McBaz")],
			)]
			.into_iter()
			.collect(),
			bin_attrs: [(String::from("jpegPhoto"), vec![vec![0xff, 0xd8, 0xff]])]
				.into_iter()
				.collect(),
		}
	}

	#[test]
	fn attr_first() {
		let entry = entry();
		assert_eq!(
			entry.attr_first("attribute_does_not_exist"),
			None,
			"Undefined attributes should return None"
		);
		assert_eq!(entry.attr_first("cn"), Some("Foo Bar"), "Should return the first value");
		assert_ne!(entry.attr_first("cn"), Some("Bar McBaz"), "Should return the correct value");
		assert_eq!(entry.attr_first("CN"), Some("Foo Bar"), "Names should ignore case");
		assert_eq!(entry.attr_first("jpegPhoto"), None, "Binary values are not strings");
	}

	#[test]
	fn bin_attr_values() {
		let entry = entry();
		assert_eq!(entry.bin_attr_first("JPEGPHOTO"), Some(&[0xff, 0xd8, 0xff][..]));
		assert_eq!(entry.bin_attr_values("cn"), [&b"Foo Bar"[..], &b"Bar McBaz"[..]]);
		assert!(entry.has_attr("jpegphoto"));
		assert!(!entry.has_attr("sn"));

		let empty = SearchEntry {
			dn: String::new(),
			attrs: HashMap::default(),
			bin_attrs: HashMap::default(),
		};
		assert!(empty.attr_values("cn").is_empty());
	}
}
