//! Account-scoped name qualification.
//!
//! Resource paths on the wire are `{version}{account}/{name}` where the
//! account segment is `/Storage-{identity_domain}`. These helpers convert
//! between bare names and fully-qualified paths; they do no I/O.

/// REST API version segment used in qualified names.
pub const API_VERSION: &str = "v1";

const ACCOUNT_PREFIX: &str = "/Storage-";

/// Identity fields of a storage account, used to qualify resource names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountNamespace {
    identity_domain: String,
    username: String,
}

impl AccountNamespace {
    /// Create a namespace for the given identity domain and user.
    pub fn new(identity_domain: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            identity_domain: identity_domain.into(),
            username: username.into(),
        }
    }

    /// The qualified user name, e.g. `/Storage-acme:jane`.
    pub fn user_name(&self) -> String {
        format!("{}{}:{}", ACCOUNT_PREFIX, self.identity_domain, self.username)
    }

    /// The account segment, e.g. `/Storage-acme`.
    pub fn account(&self) -> String {
        format!("{}{}", ACCOUNT_PREFIX, self.identity_domain)
    }

    /// Return the fully-qualified path of a resource name, e.g.
    /// `v1/Storage-acme/backups` for `backups`.
    ///
    /// Names that are already qualified (starting with `/Storage-` or
    /// `v1/`) pass through unchanged, so qualification is idempotent.
    pub fn qualified_name(&self, name: &str) -> String {
        if name.is_empty() {
            return String::new();
        }
        if name.starts_with(ACCOUNT_PREFIX) || name.starts_with(&format!("{}/", API_VERSION)) {
            return name.to_string();
        }
        format!("{}{}/{}", API_VERSION, self.account(), name)
    }

    /// Return the bare name of a resource, i.e. the final segment of a
    /// qualified path. Names without a `/` separator pass through.
    pub fn unqualified_name(&self, name: &str) -> String {
        if name.is_empty() || !name.contains('/') {
            return name.to_string();
        }
        match name.rsplit('/').next() {
            Some(last) => last.to_string(),
            None => name.to_string(),
        }
    }

    /// Replace each name in a batch with its unqualified form.
    ///
    /// Listing calls can return fully-qualified paths; this normalizes
    /// them in place.
    pub fn unqualify_all<'a, I>(&self, names: I)
    where
        I: IntoIterator<Item = &'a mut String>,
    {
        for name in names {
            *name = self.unqualified_name(name);
        }
    }
}
