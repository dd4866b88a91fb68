// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text format of the persisted record blob.
//!
//! One line per record terminated by `\r`, five TAB-separated fields:
//! `id`, `account_name`, `user_name`, `password`, `url`. Absent fields are
//! written empty and read back as empty strings. Records without an account
//! name are never written.

use topsecret_core::{AccountRecord, TopSecretError};
use tracing::warn;
use uuid::Uuid;

const RECORD_SEPARATOR: char = '\r';
const FIELD_SEPARATOR: char = '\t';
const FIELD_COUNT: usize = 5;

/// Serialize every record that has an account name, in input order.
pub fn serialize(records: &[AccountRecord]) -> String {
    let mut out = String::new();
    for record in records.iter().filter(|r| r.has_account_name()) {
        out.push_str(&record.to_string());
        out.push(RECORD_SEPARATOR);
    }
    out
}

/// Parse a blob written by [`serialize`].
///
/// Parsing is lenient: a line with fewer than five fields becomes an empty
/// record with a fresh id, and an unparsable id is replaced by a fresh one.
/// Segments of at most one UTF-16 code unit (stray line endings) are
/// skipped.
pub fn deserialize(blob: Option<&str>) -> Vec<AccountRecord> {
    let Some(blob) = blob else {
        return Vec::new();
    };

    blob.split(RECORD_SEPARATOR)
        .filter(|segment| segment.encode_utf16().count() > 1)
        .map(parse_record)
        .collect()
}

fn parse_record(line: &str) -> AccountRecord {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() < FIELD_COUNT {
        warn!(
            fields = fields.len(),
            "malformed record line, keeping an empty record"
        );
        return AccountRecord::empty();
    }

    let record = AccountRecord::new(
        Some(fields[1].to_string()),
        Some(fields[2].to_string()),
        Some(fields[3].to_string()),
        Some(fields[4].to_string()),
    );

    match Uuid::parse_str(fields[0].trim()) {
        Ok(id) => record.with_id(id),
        Err(_) => {
            warn!("record id is not a UUID, assigning a new one");
            record
        }
    }
}

/// Reject a field value that would corrupt the blob format.
pub fn validate_field(name: &str, value: Option<&str>) -> Result<(), TopSecretError> {
    match value {
        Some(v) if v.contains([FIELD_SEPARATOR, RECORD_SEPARATOR]) => {
            Err(TopSecretError::InvalidArgument(format!(
                "{name} must not contain TAB or carriage return characters"
            )))
        }
        _ => Ok(()),
    }
}

/// Validate every text field of `record`.
pub fn validate_record(record: &AccountRecord) -> Result<(), TopSecretError> {
    validate_field("account_name", record.account_name.as_deref())?;
    validate_field("user_name", record.user_name.as_deref())?;
    validate_field("password", record.password.as_deref())?;
    validate_field("url", record.url.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tracing_test::traced_test;

    fn record(name: &str, user: &str, password: &str, url: &str) -> AccountRecord {
        AccountRecord::new(
            Some(name.into()),
            Some(user.into()),
            Some(password.into()),
            Some(url.into()),
        )
    }

    #[test]
    fn serialize_writes_one_line_per_named_record() {
        let a = record("GitHub", "alice", "pw1", "https://github.com");
        let b = record("Bank", "bob", "pw2", "");
        let blob = serialize(&[a.clone(), b.clone()]);

        assert_eq!(
            blob,
            format!(
                "{}\tGitHub\talice\tpw1\thttps://github.com\r{}\tBank\tbob\tpw2\t\r",
                a.id(),
                b.id()
            )
        );
    }

    #[test]
    fn serialize_skips_blank_account_names() {
        let mut blank = record("  ", "u", "p", "");
        let named = record("Mail", "u", "p", "");
        let blob = serialize(&[blank.clone(), named.clone()]);
        assert!(!blob.contains(&blank.id().to_string()));
        assert!(blob.contains(&named.id().to_string()));

        blank.account_name = None;
        assert_eq!(serialize(&[blank]), "");
    }

    #[test]
    fn serialize_empty_list_is_empty_string() {
        assert_eq!(serialize(&[]), "");
    }

    #[test]
    fn absent_fields_are_written_empty() {
        let r = AccountRecord::new(Some("Wifi".into()), None, Some("pw".into()), None);
        assert_eq!(serialize(&[r.clone()]), format!("{}\tWifi\t\tpw\t\r", r.id()));
    }

    #[test]
    fn deserialize_none_and_empty_are_empty() {
        assert!(deserialize(None).is_empty());
        assert!(deserialize(Some("")).is_empty());
    }

    #[test]
    fn deserialize_restores_ids_and_fields() {
        let a = record("GitHub", "alice", "pw1", "https://github.com");
        let b = record("Bank", "bob", "pw2", "");
        let parsed = deserialize(Some(serialize(&[a.clone(), b.clone()]).as_str()));
        assert_eq!(parsed, vec![a, b]);
    }

    #[test]
    fn deserialize_skips_short_segments() {
        let a = record("GitHub", "alice", "pw1", "");
        let blob = format!("{}\r\n\r", serialize(&[a.clone()]));
        assert_eq!(deserialize(Some(blob.as_str())), vec![a]);
    }

    #[test]
    fn single_astral_character_is_kept_as_malformed_record() {
        let parsed = deserialize(Some("\u{1F511}\r\n\r"));
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].account_name.is_none());
    }

    #[test]
    #[traced_test]
    fn short_line_becomes_empty_record() {
        let parsed = deserialize(Some("garbage-without-tabs\r"));
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].account_name.is_none());
        assert!(parsed[0].password.is_none());
        assert!(!parsed[0].id().is_nil());
        assert!(logs_contain("malformed record line"));
    }

    #[test]
    fn bad_uuid_gets_fresh_id() {
        let parsed = deserialize(Some("not-a-uuid\tName\tuser\tpw\turl\r"));
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].account_name.as_deref(), Some("Name"));
        assert!(!parsed[0].id().is_nil());
    }

    #[test]
    fn validate_field_rejects_separators() {
        assert!(validate_field("url", Some("a\tb")).is_err());
        assert!(validate_field("url", Some("a\rb")).is_err());
        assert!(validate_field("url", Some("a\nb")).is_ok());
        assert!(validate_field("url", None).is_ok());
    }

    #[test]
    fn validate_record_names_offending_field() {
        let bad = record("ok", "ok", "p\tw", "ok");
        let err = validate_record(&bad).unwrap_err();
        assert!(err.to_string().contains("password"), "{err}");
    }

    fn field() -> impl Strategy<Value = String> {
        "[^\t\r]{0,12}"
    }

    proptest! {
        #[test]
        fn named_records_survive_a_round_trip(
            rows in proptest::collection::vec(
                ("[^\t\r]*[^\t\r\\s][^\t\r]*", field(), field(), field()),
                0..6,
            )
        ) {
            let records: Vec<AccountRecord> = rows
                .into_iter()
                .map(|(n, u, p, url)| record(&n, &u, &p, &url))
                .collect();
            let parsed = deserialize(Some(serialize(&records).as_str()));
            prop_assert_eq!(parsed, records);
        }
    }
}
