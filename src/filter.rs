//! Construction of RFC 4515 search filters.
//!
//! Values are escaped when a [`Filter`] is rendered, so user input can be
//! placed into filters without changing their structure.
use std::fmt;

pub use ldap3::ldap_escape;

/// Placeholder for the escaped user name in [`user_filter`] templates.
pub const USER_PLACEHOLDER: &str = "?";

/// A search filter.
///
/// `And` and `Or` without operands render as `(&)` and `(|)`, the absolute
/// true and false filters of RFC 4526.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
	/// All operands match.
	And(Vec<Filter>),
	/// Any operand matches.
	Or(Vec<Filter>),
	/// The operand does not match.
	Not(Box<Filter>),
	/// `(attribute=value)`
	Equal(String, String),
	/// `(attribute>=value)`
	GreaterOrEqual(String, String),
	/// `(attribute<=value)`
	LessOrEqual(String, String),
	/// `(attribute=*value*)`
	Contains(String, String),
}

impl Filter {
	/// Match entries where `attribute` equals `value`.
	pub fn equal(attribute: impl Into<String>, value: impl Into<String>) -> Self {
		Filter::Equal(attribute.into(), value.into())
	}

	/// Match entries where `attribute` orders at or after `value`.
	pub fn greater_or_equal(attribute: impl Into<String>, value: impl Into<String>) -> Self {
		Filter::GreaterOrEqual(attribute.into(), value.into())
	}

	/// Match entries where `attribute` orders at or before `value`.
	pub fn less_or_equal(attribute: impl Into<String>, value: impl Into<String>) -> Self {
		Filter::LessOrEqual(attribute.into(), value.into())
	}

	/// Match entries where `attribute` contains `value` as a substring.
	pub fn contains(attribute: impl Into<String>, value: impl Into<String>) -> Self {
		Filter::Contains(attribute.into(), value.into())
	}

	/// Match entries matching every filter.
	pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
		Filter::And(filters.into_iter().collect())
	}

	/// Match entries matching any filter.
	pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
		Filter::Or(filters.into_iter().collect())
	}

	/// Match entries not matching `filter`.
	pub fn not(filter: Filter) -> Self {
		Filter::Not(Box::new(filter))
	}

	/// Match entries where every one of `attributes` equals `value`.
	pub fn each<S: AsRef<str>>(attributes: &[S], value: &str) -> Self {
		Filter::and(attributes.iter().map(|attribute| Filter::equal(attribute.as_ref(), value)))
	}

	/// Match entries where any of `attributes` equals `value`.
	pub fn either<S: AsRef<str>>(attributes: &[S], value: &str) -> Self {
		Filter::or(attributes.iter().map(|attribute| Filter::equal(attribute.as_ref(), value)))
	}

	/// Match entries where any of `attributes` contains any of the
	/// whitespace separated words of `text`.
	pub fn any<S: AsRef<str>>(attributes: &[S], text: &str) -> Self {
		Filter::or(attributes.iter().flat_map(|attribute| {
			text.split_whitespace().map(move |word| Filter::contains(attribute.as_ref(), word))
		}))
	}
}

/// Write a parenthesized list of filters behind an operator.
fn write_list(f: &mut fmt::Formatter<'_>, operator: char, filters: &[Filter]) -> fmt::Result {
	write!(f, "({operator}")?;
	for filter in filters {
		write!(f, "{filter}")?;
	}
	f.write_str(")")
}

impl fmt::Display for Filter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Filter::And(filters) => write_list(f, '&', filters),
			Filter::Or(filters) => write_list(f, '|', filters),
			Filter::Not(filter) => write!(f, "(!{filter})"),
			Filter::Equal(attribute, value) => {
				write!(f, "({attribute}={})", ldap_escape(value.as_str()))
			}
			Filter::GreaterOrEqual(attribute, value) => {
				write!(f, "({attribute}>={})", ldap_escape(value.as_str()))
			}
			Filter::LessOrEqual(attribute, value) => {
				write!(f, "({attribute}<={})", ldap_escape(value.as_str()))
			}
			Filter::Contains(attribute, value) => {
				write!(f, "({attribute}=*{}*)", ldap_escape(value.as_str()))
			}
		}
	}
}

/// Fill the escaped `user` into every [`USER_PLACEHOLDER`] of a filter
/// template such as `(&(objectClass=inetOrgPerson)(uid=?))`.
#[must_use]
pub fn user_filter(template: &str, user: &str) -> String {
	template.replace(USER_PLACEHOLDER, &ldap_escape(user))
}

#[cfg(test)]
mod tests {
	use super::{user_filter, Filter};

	#[test]
	fn rendering() {
		let filter = Filter::and([
			Filter::equal("objectClass", "inetOrgPerson"),
			Filter::not(Filter::equal("pwdAccountLocked", "TRUE")),
			Filter::or([
				Filter::greater_or_equal("createTimestamp", "20240101000000Z"),
				Filter::less_or_equal("uidNumber", "1000"),
			]),
		]);
		assert_eq!(
			filter.to_string(),
			"(&(objectClass=inetOrgPerson)(!(pwdAccountLocked=TRUE))\
			 (|(createTimestamp>=20240101000000Z)(uidNumber<=1000)))"
		);
		assert_eq!(Filter::Or(Vec::new()).to_string(), "(|)");
	}

	#[test]
	fn attribute_groups() {
		assert_eq!(Filter::each(&["cn", "sn"], "Doe").to_string(), "(&(cn=Doe)(sn=Doe))");
		assert_eq!(Filter::either(&["uid", "mail"], "jdoe").to_string(), "(|(uid=jdoe)(mail=jdoe))");
		assert_eq!(
			Filter::any(&["cn", "mail"], "  jane  doe ").to_string(),
			"(|(cn=*jane*)(cn=*doe*)(mail=*jane*)(mail=*doe*))"
		);
	}

	#[test]
	fn values_are_escaped() {
		let rendered = Filter::equal("cn", "a*(b)\\").to_string();
		assert!(rendered.eq_ignore_ascii_case("(cn=a\\2a\\28b\\29\\5c)"), "{rendered}");

		let rendered = Filter::contains("cn", "*").to_string();
		assert!(rendered.eq_ignore_ascii_case("(cn=*\\2a*)"), "{rendered}");
	}

	#[test]
	fn user_filters() {
		let template = "(&(objectClass=inetOrgPerson)(uid=?))";
		assert_eq!(user_filter(template, "jdoe"), "(&(objectClass=inetOrgPerson)(uid=jdoe))");

		let injected = user_filter(template, "*)(uid=*");
		assert!(
			injected.eq_ignore_ascii_case("(&(objectClass=inetOrgPerson)(uid=\\2a\\29\\28uid=\\2a))"),
			"{injected}"
		);
	}
}
