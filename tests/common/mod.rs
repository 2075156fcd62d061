use std::{collections::HashMap, error::Error};

use ldap3::{Scope, SearchEntry};
use ldap_schema::{
	config::Config,
	ldap::{Connection, Directory},
};
use url::Url;

pub const SUBSCHEMA_DN: &str = "cn=Subschema";

pub const ATTRIBUTE_TYPES: &[&str] = &[
	"( 2.5.4.0 NAME 'objectClass' DESC 'RFC4512: object classes of the entity' EQUALITY objectIdentifierMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.38 )",
	"( 2.5.4.41 NAME 'name' DESC 'RFC4519: common supertype of name attributes' EQUALITY caseIgnoreMatch SUBSTR caseIgnoreSubstringsMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{32768} )",
	"( 2.5.4.3 NAME ( 'cn' 'commonName' ) DESC 'RFC4519: common name(s) for which the entity is known by' SUP name )",
	"( 2.5.4.4 NAME ( 'sn' 'surname' ) DESC 'RFC2256: last (family) name(s) for which the entity is known by' SUP name )",
	"( 2.5.4.11 NAME ( 'ou' 'organizationalUnitName' ) DESC 'RFC2256: organizational unit this object belongs to' SUP name )",
	"( 2.5.4.12 NAME 'title' DESC 'RFC2256: title associated with the entity' SUP name )",
	"( 2.5.4.7 NAME ( 'l' 'localityName' ) DESC 'RFC2256: locality which this object resides in' SUP name )",
	"( 2.5.4.13 NAME 'description' DESC 'RFC2256: descriptive information' EQUALITY caseIgnoreMatch SUBSTR caseIgnoreSubstringsMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{1024} )",
	"( 2.5.4.49 NAME 'distinguishedName' DESC 'RFC4519: common supertype of DN attributes' EQUALITY distinguishedNameMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.12 )",
	"( 2.5.4.34 NAME 'seeAlso' DESC 'RFC4519: DN of related object' SUP distinguishedName )",
	"( 2.5.4.35 NAME 'userPassword' DESC 'RFC4519/2307: password of user' EQUALITY octetStringMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.40{128} )",
	"( 2.5.4.20 NAME 'telephoneNumber' DESC 'RFC2256: Telephone Number' EQUALITY telephoneNumberMatch SUBSTR telephoneNumberSubstringsMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.50{32} )",
	"( 0.9.2342.19200300.100.1.1 NAME ( 'uid' 'userid' ) DESC 'RFC4519: user identifier' EQUALITY caseIgnoreMatch SUBSTR caseIgnoreSubstringsMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{256} )",
	"( 0.9.2342.19200300.100.1.3 NAME ( 'mail' 'rfc822Mailbox' ) DESC 'RFC1274: RFC822 Mailbox' EQUALITY caseIgnoreIA5Match SUBSTR caseIgnoreIA5SubstringsMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.26{256} )",
	"( 2.16.840.1.113730.3.1.241 NAME 'displayName' DESC 'RFC2798: preferred name to be used when displaying entries' EQUALITY caseIgnoreMatch SUBSTR caseIgnoreSubstringsMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 SINGLE-VALUE )",
	"( 0.9.2342.19200300.100.1.60 NAME 'jpegPhoto' DESC 'RFC2798: a JPEG image' SYNTAX 1.3.6.1.4.1.1466.115.121.1.28 )",
	"( 2.16.840.1.113730.3.1.2 NAME 'departmentNumber' DESC 'RFC2798: identifies a department within an organization' EQUALITY caseIgnoreMatch SUBSTR caseIgnoreSubstringsMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 X-ORIGIN 'RFC 2798' )",
	"( 2.5.18.1 NAME 'createTimestamp' DESC 'RFC4512: time which object was created' EQUALITY generalizedTimeMatch ORDERING generalizedTimeOrderingMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.24 SINGLE-VALUE NO-USER-MODIFICATION USAGE directoryOperation )",
	"( 2.5.18.10 NAME 'subschemaSubentry' DESC 'RFC4512: name of controlling subschema entry' EQUALITY distinguishedNameMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.12 SINGLE-VALUE NO-USER-MODIFICATION USAGE directoryOperation )",
	"( 1.3.6.1.1.16.4 NAME 'entryUUID' DESC 'UUID of the entry' EQUALITY UUIDMatch ORDERING UUIDOrderingMatch SYNTAX 1.3.6.1.1.16.1 SINGLE-VALUE NO-USER-MODIFICATION USAGE directoryOperation )",
	"( 1.3.6.1.4.1.4203.666.1.1 NAME 'pwdAccountLocked' DESC 'Whether the account is locked' SYNTAX 1.3.6.1.4.1.1466.115.121.1.7\n  SINGLE-VALUE X-ORIGIN ( 'draft-behera-ldap-password-policy' 'OpenLDAP' ) )",
];

pub const OBJECT_CLASSES: &[&str] = &[
	"( 2.5.6.0 NAME 'top' DESC 'top of the superclass chain' ABSTRACT MUST objectClass )",
	"( 2.5.6.6 NAME 'person' DESC 'RFC2256: a person' SUP top STRUCTURAL MUST ( sn $ cn ) MAY ( userPassword $ telephoneNumber $ seeAlso $ description ) )",
	"( 2.5.6.7 NAME 'organizationalPerson' DESC 'RFC2256: an organizational person' SUP person STRUCTURAL MAY ( title $ ou $ l ) )",
	"( 2.16.840.1.113730.3.2.2 NAME 'inetOrgPerson' DESC 'RFC2798: Internet Organizational Person' SUP organizationalPerson STRUCTURAL MAY ( departmentNumber $ displayName $ jpegPhoto $ mail $ uid ) )",
	"( 2.5.6.5 NAME 'organizationalUnit' DESC 'RFC2256: an organizational unit' SUP top STRUCTURAL MUST ou MAY ( userPassword $ telephoneNumber $ seeAlso $ l $ description ) )",
	"( 1.3.6.1.4.1.4203.666.2.1 NAME 'lockableAccount' SUP top AUXILIARY MAY pwdAccountLocked )",
];

pub fn search_entry(dn: &str, attrs: &[(&str, &[&str])]) -> SearchEntry {
	SearchEntry {
		dn: dn.to_owned(),
		attrs: attrs
			.iter()
			.map(|(name, values)| {
				((*name).to_owned(), values.iter().map(|value| (*value).to_owned()).collect())
			})
			.collect(),
		bin_attrs: HashMap::new(),
	}
}

/// A search as received by [`MockDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSearch {
	pub base: String,
	pub filter: String,
	pub attributes: Vec<String>,
}

/// A directory serving fixed entries to base searches.
#[derive(Debug, Default)]
pub struct MockDirectory {
	pub entries: HashMap<String, SearchEntry>,
	pub searches: Vec<RecordedSearch>,
}

impl MockDirectory {
	/// A directory with a root DSE and a subschema subentry holding the
	/// given definitions.
	pub fn with_schema(attribute_types: &[&str], object_classes: &[&str]) -> Self {
		let mut directory = Self::default();
		directory.insert(search_entry("", &[("subschemaSubentry", &[SUBSCHEMA_DN])]));
		// Servers differ in the case of returned attribute names
		directory.insert(search_entry(
			SUBSCHEMA_DN,
			&[("attributetypes", attribute_types), ("objectClasses", object_classes)],
		));
		directory
	}

	pub fn insert(&mut self, entry: SearchEntry) {
		self.entries.insert(entry.dn.clone(), entry);
	}
}

impl Directory for MockDirectory {
	async fn search(
		&mut self,
		base: &str,
		scope: Scope,
		filter: &str,
		attributes: &[&str],
	) -> Result<Vec<SearchEntry>, ldap_schema::Error> {
		assert!(matches!(scope, Scope::Base), "Only base searches are served");
		self.searches.push(RecordedSearch {
			base: base.to_owned(),
			filter: filter.to_owned(),
			attributes: attributes.iter().map(|attribute| (*attribute).to_owned()).collect(),
		});
		Ok(self.entries.get(base).cloned().into_iter().collect())
	}
}

pub fn docker_config() -> Result<Config, Box<dyn Error>> {
	let mut config = Config::new(Url::parse("ldap://localhost:1389")?);
	config.bind_dn = Some("cn=admin,dc=example,dc=org".to_owned());
	config.bind_password = Some("adminpassword".to_owned());
	Ok(config)
}

pub async fn ldap_add_organizational_unit(
	ldap: &mut Connection,
	ou: &str,
) -> Result<(), Box<dyn Error>> {
	ldap.add(
		&format!("ou={},dc=example,dc=org", ou),
		vec![
			("objectClass".to_owned(), vec!["organizationalUnit".to_owned()]),
			("ou".to_owned(), vec![ou.to_owned()]),
		],
	)
	.await?;
	Ok(())
}

pub async fn ldap_delete_organizational_unit(
	ldap: &mut Connection,
	ou: &str,
) -> Result<(), Box<dyn Error>> {
	ldap.delete(&format!("ou={},dc=example,dc=org", ou)).await?;
	Ok(())
}

pub async fn ldap_add_user(ldap: &mut Connection, cn: &str, sn: &str) -> Result<(), Box<dyn Error>> {
	ldap.add(
		&format!("cn={},ou=users,dc=example,dc=org", cn),
		vec![
			("objectClass".to_owned(), vec!["inetOrgPerson".to_owned()]),
			("cn".to_owned(), vec![cn.to_owned()]),
			("sn".to_owned(), vec![sn.to_owned()]),
		],
	)
	.await?;
	Ok(())
}

pub async fn ldap_delete_user(ldap: &mut Connection, cn: &str) -> Result<(), Box<dyn Error>> {
	ldap.delete(&format!("cn={},ou=users,dc=example,dc=org", cn)).await?;
	Ok(())
}
