//! Attribute syntaxes from RFC 4517 and conversion of their values.
//!
//! Values travel over LDAP as strings. A [`Syntax`] converts between that
//! wire form and a native [`Value`], validating it on the way.
use std::fmt;

use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::{error::Error, oid::Named};

/// Format used to serialize Generalized Time values, as described in RFC 4517
/// section 3.3.13. Values are converted to UTC first.
pub const TIME_FORMAT: &[time::format_description::FormatItem] =
	time::macros::format_description!("[year][month][day][hour][minute][second]Z");

/// Format used to serialize the legacy ASN.1 UTC Time.
pub const UTC_TIME_FORMAT: &[time::format_description::FormatItem] = time::macros::format_description!(
	"[year repr:last_two][month][day][hour][minute][second]Z"
);

/// Accepted literal values of the Boolean syntax.
const BOOLEAN_VALUES: [&str; 2] = ["TRUE", "FALSE"];

/// Declares [`SyntaxKind`] together with the last arc of each OID under
/// `1.3.6.1.4.1.1466.115.121.1` and a human readable description.
macro_rules! syntaxes {
	($($kind:ident = $arc:literal, $desc:literal;)+) => {
		/// The standard LDAP syntaxes.
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub enum SyntaxKind {
			$(
				#[doc = $desc]
				$kind,
			)+
		}

		impl SyntaxKind {
			/// Every standard syntax.
			pub const ALL: &'static [SyntaxKind] = &[$(SyntaxKind::$kind),+];

			/// The OID of this syntax.
			#[must_use]
			pub const fn oid(self) -> &'static str {
				match self {
					$(SyntaxKind::$kind => concat!("1.3.6.1.4.1.1466.115.121.1.", $arc),)+
				}
			}

			/// The description given to this syntax by the RFC.
			#[must_use]
			pub const fn description(self) -> &'static str {
				match self {
					$(SyntaxKind::$kind => $desc,)+
				}
			}
		}
	};
}

syntaxes! {
	AttributeTypeDescription = 3, "Attribute Type Description";
	BitString = 6, "Bit String";
	Boolean = 7, "Boolean";
	CountryString = 11, "Country String";
	Dn = 12, "DN";
	DeliveryMethod = 14, "Delivery Method";
	DirectoryString = 15, "Directory String";
	DitContentRuleDescription = 16, "DIT Content Rule Description";
	DitStructureRuleDescription = 17, "DIT Structure Rule Description";
	EnhancedGuide = 21, "Enhanced Guide";
	FacsimileTelephoneNumber = 22, "Facsimile Telephone Number";
	Fax = 23, "Fax";
	GeneralizedTime = 24, "Generalized Time";
	Guide = 25, "Guide";
	Ia5String = 26, "IA5 String";
	Integer = 27, "INTEGER";
	Jpeg = 28, "JPEG";
	MatchingRuleDescription = 30, "Matching Rule Description";
	MatchingRuleUseDescription = 31, "Matching Rule Use Description";
	NameAndOptionalUid = 34, "Name And Optional UID";
	NameFormDescription = 35, "Name Form Description";
	NumericString = 36, "Numeric String";
	ObjectClassDescription = 37, "Object Class Description";
	Oid = 38, "OID";
	OtherMailbox = 39, "Other Mailbox";
	OctetString = 40, "Octet String";
	PostalAddress = 41, "Postal Address";
	PrintableString = 44, "Printable String";
	TelephoneNumber = 50, "Telephone Number";
	TeletexTerminalIdentifier = 51, "Teletex Terminal Identifier";
	TelexNumber = 52, "Telex Number";
	UtcTime = 53, "UTC Time";
	LdapSyntaxDescription = 54, "LDAP Syntax Description";
	SubstringAssertion = 58, "Substring Assertion";
}

impl SyntaxKind {
	/// Find the syntax with the given OID.
	pub fn from_oid(oid: &str) -> Result<Self, Error> {
		SyntaxKind::ALL
			.iter()
			.copied()
			.find(|kind| kind.oid() == oid)
			.ok_or_else(|| Error::UnsupportedSyntax(oid.to_owned()))
	}
}

/// A native attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
	/// Boolean syntax
	Bool(bool),
	/// INTEGER syntax
	Integer(i64),
	/// Generalized Time and UTC Time syntaxes
	Time(OffsetDateTime),
	/// Bit String syntax, most significant bit first
	Bits(Vec<bool>),
	/// Binary syntaxes such as Octet String and JPEG
	Bytes(Vec<u8>),
	/// Everything else
	String(String),
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Bool(value) => write!(f, "{value}"),
			Value::Integer(value) => write!(f, "{value}"),
			Value::Time(value) => write!(f, "{value}"),
			Value::Bits(bits) => write!(f, "'{}'B", render_bits(bits)),
			Value::Bytes(_) => f.write_str("<non-string data>"),
			Value::String(value) => f.write_str(value),
		}
	}
}

/// One of the standard attribute syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Syntax {
	/// Which syntax this is.
	kind: SyntaxKind,
}

impl Named for Syntax {
	fn oid(&self) -> &str {
		self.kind.oid()
	}

	fn names(&self) -> &[String] {
		&[]
	}
}

impl From<SyntaxKind> for Syntax {
	fn from(kind: SyntaxKind) -> Self {
		Self { kind }
	}
}

impl Syntax {
	/// The syntax values of unknown syntaxes are treated as.
	pub const FALLBACK: Syntax = Syntax { kind: SyntaxKind::OctetString };

	/// All standard syntaxes.
	pub fn all() -> impl Iterator<Item = Syntax> {
		SyntaxKind::ALL.iter().copied().map(Syntax::from)
	}

	/// Which syntax this is.
	#[must_use]
	pub fn kind(self) -> SyntaxKind {
		self.kind
	}

	/// Whether values of this syntax are arbitrary octets rather than text.
	#[must_use]
	pub fn is_binary(self) -> bool {
		matches!(self.kind, SyntaxKind::OctetString | SyntaxKind::Jpeg | SyntaxKind::Fax)
	}

	/// Convert a native value to its wire form.
	pub fn serialize(self, value: &Value) -> Result<String, Error> {
		match (self.kind, value) {
			(SyntaxKind::Boolean, Value::Bool(true)) => Ok(BOOLEAN_VALUES[0].to_owned()),
			(SyntaxKind::Boolean, Value::Bool(false)) => Ok(BOOLEAN_VALUES[1].to_owned()),
			(SyntaxKind::Boolean, other) => Err(Error::Syntax {
				value: other.to_string(),
				expected: BOOLEAN_VALUES.map(str::to_owned).to_vec(),
			}),
			(SyntaxKind::Integer, Value::Integer(value)) => Ok(value.to_string()),
			(SyntaxKind::GeneralizedTime, Value::Time(time)) => format_time(*time, TIME_FORMAT),
			(SyntaxKind::UtcTime, Value::Time(time)) => {
				let year = to_utc(*time)?.year();
				if !(1950..2050).contains(&year) {
					return Err(Error::syntax(value.to_string()));
				}
				format_time(*time, UTC_TIME_FORMAT)
			}
			(SyntaxKind::BitString, Value::Bits(bits)) => Ok(format!("'{}'B", render_bits(bits))),
			(_, Value::Bytes(bytes)) if self.is_binary() => {
				String::from_utf8(bytes.clone()).map_err(|_| Error::syntax(value.to_string()))
			}
			(_, Value::String(text)) if self.accepts_text() => {
				self.validate(text)?;
				Ok(text.clone())
			}
			(_, other) => Err(Error::syntax(other.to_string())),
		}
	}

	/// Convert a value in wire form to a native value.
	pub fn deserialize(self, raw: &str) -> Result<Value, Error> {
		match self.kind {
			SyntaxKind::Boolean => match raw {
				"TRUE" => Ok(Value::Bool(true)),
				"FALSE" => Ok(Value::Bool(false)),
				_ => Err(Error::Syntax {
					value: raw.to_owned(),
					expected: BOOLEAN_VALUES.map(str::to_owned).to_vec(),
				}),
			},
			SyntaxKind::Integer => parse_integer(raw).map(Value::Integer),
			SyntaxKind::GeneralizedTime => parse_generalized_time(raw).map(Value::Time),
			SyntaxKind::UtcTime => parse_utc_time(raw).map(Value::Time),
			SyntaxKind::BitString => parse_bits(raw).map(Value::Bits),
			_ if self.is_binary() => Ok(Value::Bytes(raw.as_bytes().to_vec())),
			_ => {
				self.validate(raw)?;
				Ok(Value::String(raw.to_owned()))
			}
		}
	}

	/// Convert a value as returned by the server, which is only guaranteed to
	/// be text for non-binary syntaxes.
	pub fn deserialize_bytes(self, raw: &[u8]) -> Result<Value, Error> {
		if self.is_binary() {
			return Ok(Value::Bytes(raw.to_vec()));
		}
		let text = std::str::from_utf8(raw).map_err(|_| Error::syntax(String::from_utf8_lossy(raw)))?;
		self.deserialize(text)
	}

	/// Whether [`Value::String`] is a valid native form of this syntax.
	fn accepts_text(self) -> bool {
		!matches!(
			self.kind,
			SyntaxKind::Boolean | SyntaxKind::Integer | SyntaxKind::GeneralizedTime | SyntaxKind::UtcTime
		)
	}

	/// Check the character set of string syntaxes. Syntaxes with a structured
	/// grammar of their own are passed through unchecked.
	fn validate(self, text: &str) -> Result<(), Error> {
		let valid = match self.kind {
			SyntaxKind::BitString => parse_bits(text).is_ok(),
			SyntaxKind::DirectoryString => !text.is_empty(),
			SyntaxKind::Ia5String => text.is_ascii(),
			SyntaxKind::PrintableString | SyntaxKind::TelephoneNumber => {
				!text.is_empty() && text.chars().all(is_printable)
			}
			SyntaxKind::NumericString => {
				!text.is_empty() && text.chars().all(|c| c.is_ascii_digit() || c == ' ')
			}
			SyntaxKind::CountryString => text.chars().count() == 2 && text.chars().all(is_printable),
			SyntaxKind::Oid => crate::oid::is_valid_oid(text) || is_descr(text),
			_ => true,
		};
		if valid {
			Ok(())
		} else {
			Err(Error::syntax(text))
		}
	}
}

/// Characters of the PrintableString character set.
fn is_printable(c: char) -> bool {
	c.is_ascii_alphanumeric() || " '()+,-./:?=".contains(c)
}

/// A short name: a letter followed by letters, digits and hyphens.
fn is_descr(text: &str) -> bool {
	let mut chars = text.chars();
	chars.next().is_some_and(|c| c.is_ascii_alphabetic())
		&& chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Render bits as a string of `0` and `1`.
fn render_bits(bits: &[bool]) -> String {
	bits.iter().map(|bit| if *bit { '1' } else { '0' }).collect()
}

/// Parse a Bit String such as `'0101'B`.
fn parse_bits(raw: &str) -> Result<Vec<bool>, Error> {
	let bits = raw
		.strip_prefix('\'')
		.and_then(|rest| rest.strip_suffix("'B"))
		.ok_or_else(|| Error::syntax(raw))?;
	bits.chars()
		.map(|c| match c {
			'0' => Ok(false),
			'1' => Ok(true),
			_ => Err(Error::syntax(raw)),
		})
		.collect()
}

/// Parse an INTEGER: an optional minus sign and decimal digits, without a
/// plus sign.
fn parse_integer(raw: &str) -> Result<i64, Error> {
	if raw.starts_with('+') {
		return Err(Error::syntax(raw));
	}
	raw.parse().map_err(|_| Error::syntax(raw))
}

/// The same point in time in UTC, if it is representable.
fn to_utc(time: OffsetDateTime) -> Result<OffsetDateTime, Error> {
	time.checked_to_offset(UtcOffset::UTC).ok_or_else(|| Error::syntax(time.to_string()))
}

/// Format a point in time in UTC.
fn format_time(
	time: OffsetDateTime,
	format: &[time::format_description::FormatItem],
) -> Result<String, Error> {
	to_utc(time)?.format(format).map_err(|_| Error::syntax(time.to_string()))
}

/// Parse a Generalized Time value (RFC 4517 section 3.3.13).
///
/// The fraction applies to the smallest unit present: hours, minutes or
/// seconds. Sub-second precision is rounded away.
pub fn parse_generalized_time(raw: &str) -> Result<OffsetDateTime, Error> {
	let mut scanner = Scanner::new(raw);
	let year = scanner.digits(4)?;
	let (month, day, hour) = (scanner.digits(2)?, scanner.digits(2)?, scanner.digits(2)?);
	let minute = scanner.optional_digits(2);
	let second = minute.and_then(|_| scanner.optional_digits(2));
	let fraction = scanner.fraction()?;
	let offset = scanner.time_zone()?;
	scanner.finish()?;

	let unit = match (minute, second) {
		(_, Some(_)) => 1,
		(Some(_), None) => 60,
		(None, None) => 3600,
	};
	let extra = fraction.map_or(0, |(numerator, denominator)| {
		(numerator * unit * 2 + denominator) / (denominator * 2)
	});

	let year = i32::try_from(year).map_err(|_| Error::syntax(raw))?;
	assemble(raw, year, [month, day, hour, minute.unwrap_or(0), second.unwrap_or(0)], offset, extra)
}

/// Parse a UTC Time value, `YYMMDDHHMM[SS](Z|±HHMM)`.
///
/// Two digit years from 50 onward are in the twentieth century, earlier ones
/// in the twenty-first, as in RFC 5280.
pub fn parse_utc_time(raw: &str) -> Result<OffsetDateTime, Error> {
	let mut scanner = Scanner::new(raw);
	let year = scanner.digits(2)?;
	let (month, day, hour) = (scanner.digits(2)?, scanner.digits(2)?, scanner.digits(2)?);
	let minute = scanner.digits(2)?;
	let second = scanner.optional_digits(2);
	let offset = scanner.time_zone()?;
	scanner.finish()?;

	let year = if year >= 50 { 1900 + year } else { 2000 + year };
	let year = i32::try_from(year).map_err(|_| Error::syntax(raw))?;
	assemble(raw, year, [month, day, hour, minute, second.unwrap_or(0)], offset, 0)
}

/// Build a point in time from calendar fields, an offset, and a number of
/// seconds to add.
fn assemble(
	raw: &str,
	year: i32,
	[month, day, hour, minute, second]: [u64; 5],
	offset: UtcOffset,
	extra_seconds: u64,
) -> Result<OffsetDateTime, Error> {
	let invalid = |_| Error::syntax(raw);
	let field = |value: u64| u8::try_from(value).map_err(|_| Error::syntax(raw));

	let month = Month::try_from(field(month)?).map_err(invalid)?;
	let date = Date::from_calendar_date(year, month, field(day)?).map_err(invalid)?;
	// A leap second is folded into the following second.
	let (second, leap) = if second == 60 { (59, 1) } else { (second, 0) };
	let time = Time::from_hms(field(hour)?, field(minute)?, field(second)?).map_err(invalid)?;
	let extra = i64::try_from(extra_seconds + leap).map_err(|_| Error::syntax(raw))?;

	PrimitiveDateTime::new(date, time)
		.assume_offset(offset)
		.checked_add(Duration::seconds(extra))
		.ok_or_else(|| Error::syntax(raw))
}

/// Cursor over the characters of a time value.
struct Scanner<'a> {
	/// The complete value, for error messages.
	raw: &'a str,
	/// Remaining input.
	rest: &'a [u8],
}

impl<'a> Scanner<'a> {
	/// Start scanning at the beginning of the value.
	fn new(raw: &'a str) -> Self {
		Self { raw, rest: raw.as_bytes() }
	}

	/// Error for the value being scanned.
	fn error(&self) -> Error {
		Error::syntax(self.raw)
	}

	/// Consume exactly `count` digits.
	fn digits(&mut self, count: usize) -> Result<u64, Error> {
		self.optional_digits(count).ok_or_else(|| self.error())
	}

	/// Consume `count` digits if they are next.
	fn optional_digits(&mut self, count: usize) -> Option<u64> {
		let input = self.rest;
		let digits = input.get(..count)?;
		if !digits.iter().all(u8::is_ascii_digit) {
			return None;
		}
		self.rest = &input[count..];
		Some(digits.iter().fold(0, |acc, digit| acc * 10 + u64::from(digit - b'0')))
	}

	/// Consume a fraction introduced by `.` or `,`, returning it as
	/// numerator and denominator. Digits beyond the ninth are ignored.
	fn fraction(&mut self) -> Result<Option<(u64, u64)>, Error> {
		let input = self.rest;
		let Some((&(b'.' | b','), rest)) = input.split_first() else {
			return Ok(None);
		};
		let length = rest.iter().take_while(|b| b.is_ascii_digit()).count();
		if length == 0 {
			return Err(self.error());
		}
		let (numerator, denominator) = rest[..length]
			.iter()
			.take(9)
			.fold((0, 1), |(num, den), digit| (num * 10 + u64::from(digit - b'0'), den * 10));
		self.rest = &rest[length..];
		Ok(Some((numerator, denominator)))
	}

	/// Consume `Z` or a `±HH[MM]` offset.
	fn time_zone(&mut self) -> Result<UtcOffset, Error> {
		let input = self.rest;
		let (sign, rest) = input.split_first().ok_or_else(|| self.error())?;
		self.rest = rest;
		let sign: i8 = match *sign {
			b'Z' => return Ok(UtcOffset::UTC),
			b'+' => 1,
			b'-' => -1,
			_ => return Err(self.error()),
		};
		let hours = self.digits(2)?;
		let minutes = self.optional_digits(2).unwrap_or(0);
		let to_i8 = |value: u64| i8::try_from(value).map_err(|_| self.error());
		UtcOffset::from_hms(sign * to_i8(hours)?, sign * to_i8(minutes)?, 0).map_err(|_| self.error())
	}

	/// Fail if anything is left over.
	fn finish(&self) -> Result<(), Error> {
		if self.rest.is_empty() {
			Ok(())
		} else {
			Err(self.error())
		}
	}
}

#[cfg(test)]
mod tests {
	#![allow(clippy::unwrap_used)]

	use time::{macros::datetime, OffsetDateTime};

	use super::{parse_generalized_time, parse_utc_time, Syntax, SyntaxKind, Value};
	use crate::error::Error;

	fn syntax(kind: SyntaxKind) -> Syntax {
		Syntax::from(kind)
	}

	#[test]
	fn registry() -> Result<(), Box<dyn std::error::Error>> {
		assert_eq!(Syntax::all().count(), 34);
		assert_eq!(SyntaxKind::Boolean.oid(), "1.3.6.1.4.1.1466.115.121.1.7");
		assert_eq!(SyntaxKind::from_oid("1.3.6.1.4.1.1466.115.121.1.40")?, SyntaxKind::OctetString);
		assert_eq!(Syntax::FALLBACK.kind(), SyntaxKind::OctetString);
		assert!(matches!(
			SyntaxKind::from_oid("1.3.6.1.4.1.1466.115.121.1.5"),
			Err(Error::UnsupportedSyntax(_))
		));
		Ok(())
	}

	#[test]
	fn boolean_round_trip() -> Result<(), Box<dyn std::error::Error>> {
		let boolean = syntax(SyntaxKind::Boolean);
		for b in [true, false] {
			let wire = boolean.serialize(&Value::Bool(b))?;
			assert_eq!(boolean.deserialize(&wire)?, Value::Bool(b));
		}

		match boolean.deserialize("MAYBE") {
			Err(Error::Syntax { value, expected }) => {
				assert_eq!(value, "MAYBE");
				assert_eq!(expected, ["TRUE", "FALSE"]);
			}
			other => panic!("Unexpected result {other:?}"),
		}
		assert!(matches!(boolean.serialize(&Value::Integer(1)), Err(Error::Syntax { .. })));
		Ok(())
	}

	#[test]
	fn integers() -> Result<(), Box<dyn std::error::Error>> {
		let integer = syntax(SyntaxKind::Integer);
		assert_eq!(integer.serialize(&Value::Integer(-42))?, "-42");
		assert_eq!(integer.deserialize("1024")?, Value::Integer(1024));
		assert!(integer.deserialize("+5").is_err());
		assert!(integer.deserialize("twelve").is_err());
		assert!(integer.serialize(&Value::String("12".to_owned())).is_err());
		Ok(())
	}

	#[test]
	fn generalized_time_fixtures() -> Result<(), Box<dyn std::error::Error>> {
		let fixtures = [
			("199412161032Z", 787_573_920),
			("1994121610Z", 787_572_000),
			("199412160532-0500", 787_573_920),
			("20170401113245,9Z", 1_491_046_366),
			("201704011132.5Z", 1_491_046_350),
			("2017040111.5Z", 1_491_046_200),
		];
		for (raw, timestamp) in fixtures {
			assert_eq!(parse_generalized_time(raw)?.unix_timestamp(), timestamp, "{raw}");
		}
		Ok(())
	}

	#[test]
	fn generalized_time_rejects_garbage() {
		for raw in ["", "1994", "199412161032", "19941316Z", "199412161032.Z", "199412161032Zjunk"] {
			assert!(matches!(parse_generalized_time(raw), Err(Error::Syntax { .. })), "{raw}");
		}
	}

	#[test]
	fn generalized_time_round_trip() -> Result<(), Box<dyn std::error::Error>> {
		let time = syntax(SyntaxKind::GeneralizedTime);
		let value = Value::Time(datetime!(2013-05-16 22:05:20 +02:00));
		let wire = time.serialize(&value)?;
		assert_eq!(wire, "20130516200520Z");
		assert_eq!(time.deserialize(&wire)?, value);
		Ok(())
	}

	#[test]
	fn times_beyond_year_9999() {
		for raw in ["99991231235960Z", "99991231235959.9Z"] {
			assert!(matches!(parse_generalized_time(raw), Err(Error::Syntax { .. })), "{raw}");
		}
		// Still within the year when read in its own offset
		assert!(parse_generalized_time("99991231230000-0200").is_ok());

		let late = Value::Time(datetime!(9999-12-31 23:00 -02:00));
		assert!(matches!(
			syntax(SyntaxKind::GeneralizedTime).serialize(&late),
			Err(Error::Syntax { .. })
		));
		assert!(matches!(syntax(SyntaxKind::UtcTime).serialize(&late), Err(Error::Syntax { .. })));
	}

	#[test]
	fn utc_time() -> Result<(), Box<dyn std::error::Error>> {
		assert_eq!(parse_utc_time("9412161032Z")?.unix_timestamp(), 787_573_920);
		assert_eq!(parse_utc_time("491231235959Z")?.year(), 2049);
		assert_eq!(parse_utc_time("500101000000+0100")?, datetime!(1949-12-31 23:00 UTC));
		assert!(parse_utc_time("9412161032").is_err());

		let utc = syntax(SyntaxKind::UtcTime);
		assert_eq!(utc.serialize(&Value::Time(datetime!(1994-12-16 10:32 UTC)))?, "941216103200Z");
		let too_late = Value::Time(OffsetDateTime::from_unix_timestamp(2_600_000_000)?);
		assert!(utc.serialize(&too_late).is_err());
		Ok(())
	}

	#[test]
	fn bit_strings() -> Result<(), Box<dyn std::error::Error>> {
		let bits = syntax(SyntaxKind::BitString);
		assert_eq!(bits.deserialize("'0101'B")?, Value::Bits(vec![false, true, false, true]));
		assert_eq!(bits.serialize(&Value::Bits(vec![true, true]))?, "'11'B");
		assert!(bits.deserialize("0101").is_err());
		assert!(bits.deserialize("'0121'B").is_err());
		Ok(())
	}

	#[test]
	fn string_validation() -> Result<(), Box<dyn std::error::Error>> {
		let text = |s: &str| Value::String(s.to_owned());

		assert!(syntax(SyntaxKind::NumericString).deserialize("15 079 672 281").is_ok());
		assert!(syntax(SyntaxKind::NumericString).deserialize("15-079").is_err());
		assert!(syntax(SyntaxKind::PrintableString).deserialize("Hello, world.").is_ok());
		assert!(syntax(SyntaxKind::PrintableString).deserialize("naïve").is_err());
		assert!(syntax(SyntaxKind::CountryString).deserialize("DE").is_ok());
		assert!(syntax(SyntaxKind::CountryString).deserialize("DEU").is_err());
		assert!(syntax(SyntaxKind::Ia5String).serialize(&text("user@example.org")).is_ok());
		assert!(syntax(SyntaxKind::Ia5String).serialize(&text("ü@example.org")).is_err());
		assert!(syntax(SyntaxKind::Oid).deserialize("2.5.4.3").is_ok());
		assert!(syntax(SyntaxKind::Oid).deserialize("commonName").is_ok());
		assert!(syntax(SyntaxKind::Oid).deserialize("2cn").is_err());
		assert!(syntax(SyntaxKind::DirectoryString).deserialize("").is_err());

		// Structured syntaxes pass through
		let dn = syntax(SyntaxKind::Dn);
		assert_eq!(dn.deserialize("cn=admin,dc=example,dc=org")?, text("cn=admin,dc=example,dc=org"));
		assert!(dn.serialize(&Value::Bool(true)).is_err());
		Ok(())
	}

	#[test]
	fn binary_syntaxes() -> Result<(), Box<dyn std::error::Error>> {
		let octets = syntax(SyntaxKind::OctetString);
		assert_eq!(octets.deserialize("abc")?, Value::Bytes(b"abc".to_vec()));
		assert_eq!(octets.serialize(&Value::Bytes(b"abc".to_vec()))?, "abc");
		assert_eq!(octets.serialize(&Value::String("abc".to_owned()))?, "abc");
		match syntax(SyntaxKind::Jpeg).serialize(&Value::Bytes(vec![0xff, 0xd8])) {
			Err(Error::Syntax { value, .. }) => assert_eq!(value, "<non-string data>"),
			other => panic!("Unexpected result {other:?}"),
		}

		let photo = syntax(SyntaxKind::Jpeg).deserialize_bytes(&[0xff, 0xd8, 0xff])?;
		assert_eq!(photo, Value::Bytes(vec![0xff, 0xd8, 0xff]));
		assert!(syntax(SyntaxKind::DirectoryString).deserialize_bytes(&[0xff, 0xd8]).is_err());
		assert_eq!(syntax(SyntaxKind::Integer).deserialize_bytes(b"42")?, Value::Integer(42));
		Ok(())
	}
}
