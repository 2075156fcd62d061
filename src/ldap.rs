//! Client for connecting to LDAP and performing directory operations

use std::{collections::HashSet, future::Future};

use ldap3::{
	adapters::{Adapter, EntriesOnly, PagedResults},
	DerefAliases, LdapConnAsync, Mod, Scope, SearchEntry, SearchOptions,
};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{config::Config, error::Error, filter::user_filter};

/// A directory that can be searched.
///
/// Schema loading only needs searches, so it is written against this trait
/// rather than against [`Connection`].
pub trait Directory {
	/// Search below `base`, returning the requested attributes of the
	/// matching entries.
	fn search(
		&mut self,
		base: &str,
		scope: Scope,
		filter: &str,
		attributes: &[&str],
	) -> impl Future<Output = Result<Vec<SearchEntry>, Error>> + Send;

	/// Search for exactly one entry, failing with [`Error::Missing`] if
	/// nothing matches. Further matches are ignored.
	fn search_one(
		&mut self,
		base: &str,
		scope: Scope,
		filter: &str,
		attributes: &[&str],
	) -> impl Future<Output = Result<SearchEntry, Error>> + Send
	where
		Self: Send,
	{
		async move {
			self.search(base, scope, filter, attributes)
				.await?
				.into_iter()
				.next()
				.ok_or_else(|| Error::Missing(format!("Object matching {filter} below {base:?}")))
		}
	}

	/// The DN of the one entry matching `filter`. No attributes are
	/// requested.
	fn search_one_dn(
		&mut self,
		base: &str,
		scope: Scope,
		filter: &str,
	) -> impl Future<Output = Result<String, Error>> + Send
	where
		Self: Send,
	{
		async move { Ok(self.search_one(base, scope, filter, &[NO_ATTRIBUTES]).await?.dn) }
	}
}

/// Attribute list requesting no attributes at all (RFC 4511 section 4.5.1.8).
const NO_ATTRIBUTES: &str = "1.1";

/// Parameters of a search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
	/// The DN to search below.
	pub base: String,
	/// How far below the base to search.
	pub scope: Scope,
	/// The search filter, in RFC 4515 string form.
	pub filter: String,
	/// Attributes to return. Empty for all user attributes.
	pub attributes: Vec<String>,
	/// Maximum number of entries, 0 for no limit.
	pub size_limit: i32,
	/// Maximum time in seconds, 0 for no limit.
	pub time_limit: i32,
	/// How aliases are dereferenced.
	pub deref: DerefAliases,
	/// Page size for the simple paged results control, if paging.
	pub page_size: Option<i32>,
}

impl SearchRequest {
	/// A search without limits or paging.
	pub fn new<S: AsRef<str>>(base: &str, scope: Scope, filter: &str, attributes: &[S]) -> Self {
		Self {
			base: base.to_owned(),
			scope,
			filter: filter.to_owned(),
			attributes: attributes.iter().map(|attribute| attribute.as_ref().to_owned()).collect(),
			size_limit: 0,
			time_limit: 0,
			deref: DerefAliases::Never,
			page_size: None,
		}
	}
}

/// What a [`Modification`] does to an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyOperation {
	/// Add the values.
	Add,
	/// Delete the values, or the whole attribute if no values are given.
	Delete,
	/// Replace all values.
	Replace,
}

/// A change to one attribute of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modification {
	/// The kind of change.
	pub operation: ModifyOperation,
	/// The attribute to change.
	pub attribute: String,
	/// The values to add, delete or set.
	pub values: Vec<String>,
}

impl Modification {
	/// Create a modification of the given attribute.
	pub fn new<S: Into<String>>(
		operation: ModifyOperation,
		attribute: impl Into<String>,
		values: impl IntoIterator<Item = S>,
	) -> Self {
		Self {
			operation,
			attribute: attribute.into(),
			values: values.into_iter().map(Into::into).collect(),
		}
	}

	/// The equivalent ldap3 modification.
	fn into_mod(self) -> Mod<String> {
		let values: HashSet<String> = self.values.into_iter().collect();
		match self.operation {
			ModifyOperation::Add => Mod::Add(self.attribute, values),
			ModifyOperation::Delete => Mod::Delete(self.attribute, values),
			ModifyOperation::Replace => Mod::Replace(self.attribute, values),
		}
	}
}

/// A connection to an LDAP server, established and bound on first use.
#[derive(Debug)]
pub struct Connection {
	/// The configuration of the connection.
	config: Config,
	/// The bound handle, once connected.
	ldap: Option<ldap3::Ldap>,
	/// The task driving the connection.
	driver: Option<JoinHandle<()>>,
}

impl Connection {
	/// Create a connection with the given configuration. Nothing is sent to
	/// the server until the first operation.
	#[must_use]
	pub fn new(config: Config) -> Self {
		Self { config, ldap: None, driver: None }
	}

	/// The configuration of this connection.
	#[must_use]
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// The bound handle, connecting first if necessary.
	async fn ldap(&mut self) -> Result<&mut ldap3::Ldap, Error> {
		if self.ldap.is_none() {
			let settings = self.config.connection.to_settings().await?;
			let (conn, mut ldap) =
				LdapConnAsync::from_url_with_settings(settings, &self.config.url).await?;
			self.driver = Some(tokio::spawn(async move {
				if let Err(err) = conn.drive().await {
					warn!("Ldap connection error {err}");
				}
			}));

			match self.config.credentials() {
				Some((dn, password)) => {
					debug!("Binding to {} as {dn}", self.config.url);
					ldap.simple_bind(dn, password).await?.success()?;
				}
				None => debug!("Connected to {} anonymously", self.config.url),
			}
			self.ldap = Some(ldap);
		}
		self.ldap.as_mut().ok_or_else(|| Error::Missing("connection".to_owned()))
	}

	/// Bind again with different credentials, connecting first if necessary.
	/// The new credentials are kept for reconnects once the bind succeeded.
	pub async fn rebind(&mut self, dn: &str, password: &str) -> Result<(), Error> {
		let url = self.config.url.clone();
		let ldap = self.ldap().await?;
		debug!("Rebinding to {url} as {dn}");
		ldap.simple_bind(dn, password).await?.success()?;
		self.config.bind_dn = Some(dn.to_owned());
		self.config.bind_password = Some(password.to_owned());
		Ok(())
	}

	/// Authenticate a user: find the DN of the single entry below `base`
	/// matching `filter_template` with the escaped `user` in place of
	/// [`USER_PLACEHOLDER`](crate::filter::USER_PLACEHOLDER), then bind as
	/// that DN with `password`.
	///
	/// The search runs with the current credentials. On success the
	/// connection stays bound as the user and the DN is returned.
	pub async fn authenticate(
		&mut self,
		base: &str,
		filter_template: &str,
		user: &str,
		password: &str,
	) -> Result<String, Error> {
		// An empty password would make this an unauthenticated bind, which
		// servers accept for any DN (RFC 4513 section 5.1.2).
		if password.is_empty() {
			return Err(Error::Invalid(format!("Empty password for {user}")));
		}
		let filter = user_filter(filter_template, user);
		let dn = self.search_one_dn(base, Scope::Subtree, &filter).await?;
		self.rebind(&dn, password).await?;
		Ok(dn)
	}

	/// Perform a search with full control over its parameters.
	pub async fn search_with(&mut self, request: &SearchRequest) -> Result<Vec<SearchEntry>, Error> {
		let timeout = self.config.connection.operation_timeout;
		let ldap = self.ldap().await?;

		let mut adapters: Vec<Box<dyn Adapter<_, _>>> = vec![Box::new(EntriesOnly::new())];
		if let Some(page_size) = request.page_size {
			adapters.push(Box::new(PagedResults::new(page_size)));
		}
		let options = SearchOptions::new()
			.sizelimit(request.size_limit)
			.timelimit(request.time_limit)
			.deref(request.deref);

		let mut search = ldap
			.with_search_options(options)
			.with_timeout(timeout)
			.streaming_search_with(
				adapters,
				&request.base,
				request.scope,
				&request.filter,
				request.attributes.clone(),
			)
			.await?;

		let mut entries = Vec::new();
		while let Some(entry) = search.next().await? {
			entries.push(SearchEntry::construct(entry));
		}
		search.finish().await.success()?;
		debug!("Search below {:?} returned {} entries", request.base, entries.len());
		Ok(entries)
	}

	/// Add an entry with the given attributes.
	pub async fn add(&mut self, dn: &str, attributes: Vec<(String, Vec<String>)>) -> Result<(), Error> {
		let attributes = attributes
			.into_iter()
			.map(|(attribute, values)| (attribute, values.into_iter().collect::<HashSet<_>>()))
			.collect();
		self.ldap().await?.add(dn, attributes).await?.success()?;
		debug!("Added {dn}");
		Ok(())
	}

	/// Delete an entry.
	pub async fn delete(&mut self, dn: &str) -> Result<(), Error> {
		self.ldap().await?.delete(dn).await?.success()?;
		debug!("Deleted {dn}");
		Ok(())
	}

	/// Apply modifications to an entry, in order.
	pub async fn modify(&mut self, dn: &str, modifications: Vec<Modification>) -> Result<(), Error> {
		let mods = modifications.into_iter().map(Modification::into_mod).collect();
		self.ldap().await?.modify(dn, mods).await?.success()?;
		debug!("Modified {dn}");
		Ok(())
	}

	/// Rename an entry, optionally moving it below a new parent.
	pub async fn rename(
		&mut self,
		dn: &str,
		new_rdn: &str,
		new_parent: Option<&str>,
		delete_old_rdn: bool,
	) -> Result<(), Error> {
		self.ldap().await?.modifydn(dn, new_rdn, delete_old_rdn, new_parent).await?.success()?;
		debug!("Renamed {dn} to {new_rdn}");
		Ok(())
	}

	/// Unbind and close the connection. Later operations connect again.
	pub async fn unbind(&mut self) -> Result<(), Error> {
		if let Some(mut ldap) = self.ldap.take() {
			ldap.unbind().await?;
		}
		if let Some(driver) = self.driver.take() {
			if let Err(err) = driver.await {
				warn!("Failed to join background task: {err}");
			}
		}
		Ok(())
	}
}

impl Directory for Connection {
	async fn search(
		&mut self,
		base: &str,
		scope: Scope,
		filter: &str,
		attributes: &[&str],
	) -> Result<Vec<SearchEntry>, Error> {
		let searches = &self.config.searches;
		let request = SearchRequest {
			size_limit: searches.size_limit,
			time_limit: searches.time_limit,
			page_size: searches.page_size,
			..SearchRequest::new(base, scope, filter, attributes)
		};
		self.search_with(&request).await
	}
}
