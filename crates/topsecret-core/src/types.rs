// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The account record stored in the vault.

use std::fmt;

use uuid::Uuid;

/// A single set of credentials for one account.
///
/// The `id` is assigned at construction and cannot be changed afterwards;
/// every other field is optional and freely mutable. Records whose
/// `account_name` is absent or blank may live in memory but are never
/// persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountRecord {
    id: Uuid,
    pub account_name: Option<String>,
    pub user_name: Option<String>,
    pub password: Option<String>,
    pub url: Option<String>,
}

impl AccountRecord {
    /// Create a populated record with a freshly generated id.
    pub fn new(
        account_name: Option<String>,
        user_name: Option<String>,
        password: Option<String>,
        url: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_name,
            user_name,
            password,
            url,
        }
    }

    /// Create an empty record with a freshly generated id.
    pub fn empty() -> Self {
        Self::new(None, None, None, None)
    }

    /// Replace the generated id. Only meant for construction (parsing a
    /// stored record, or building an edit of an existing record).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// `true` when the account name is present and not whitespace-only.
    pub fn has_account_name(&self) -> bool {
        self.account_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }
}

impl Default for AccountRecord {
    fn default() -> Self {
        Self::empty()
    }
}

/// Tab-joined form: `id\taccount_name\tuser_name\tpassword\turl`, absent
/// fields rendered empty.
impl fmt::Display for AccountRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.id,
            self.account_name.as_deref().unwrap_or_default(),
            self.user_name.as_deref().unwrap_or_default(),
            self.password.as_deref().unwrap_or_default(),
            self.url.as_deref().unwrap_or_default(),
        )
    }
}

impl fmt::Debug for AccountRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountRecord")
            .field("id", &self.id)
            .field("account_name", &self.account_name)
            .field("user_name", &self.user_name)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("url", &self.url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn github() -> AccountRecord {
        AccountRecord::new(
            Some("GitHub".into()),
            Some("alice".into()),
            Some("s3cr3t".into()),
            Some("https://github.com".into()),
        )
    }

    #[test]
    fn new_records_get_distinct_ids() {
        let a = AccountRecord::empty();
        let b = AccountRecord::empty();
        assert_ne!(a.id(), b.id());
        assert!(!a.id().is_nil());
    }

    #[test]
    fn with_id_overrides_generated_id() {
        let id = Uuid::new_v4();
        let record = github().with_id(id);
        assert_eq!(record.id(), id);
        assert_eq!(record.account_name.as_deref(), Some("GitHub"));
    }

    #[test]
    fn blank_account_name_is_detected() {
        let mut record = github();
        assert!(record.has_account_name());

        record.account_name = Some("   \t".into());
        assert!(!record.has_account_name());

        record.account_name = None;
        assert!(!record.has_account_name());
    }

    #[test]
    fn display_is_tab_joined() {
        let record = github();
        let expected = format!(
            "{}\tGitHub\talice\ts3cr3t\thttps://github.com",
            record.id()
        );
        assert_eq!(record.to_string(), expected);
    }

    #[test]
    fn display_renders_absent_fields_empty() {
        let record = AccountRecord::new(Some("Bank".into()), None, None, None);
        assert_eq!(record.to_string(), format!("{}\tBank\t\t\t", record.id()));
    }

    #[test]
    fn debug_redacts_password() {
        let debug = format!("{:?}", github());
        assert!(!debug.contains("s3cr3t"), "{debug}");
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("GitHub"));
    }
}
