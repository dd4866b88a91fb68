// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end vault scenarios across simulated process restarts.

use topsecret_core::{AccountRecord, TopSecretError};
use topsecret_test_utils::TestHarness;
use topsecret_vault::LoginOutcome;

fn github() -> AccountRecord {
    AccountRecord::new(
        Some("GitHub".into()),
        Some("alice".into()),
        Some("s3cr3t".into()),
        Some("https://github.com".into()),
    )
}

#[tokio::test]
async fn record_survives_restart() {
    let harness = TestHarness::new().await.unwrap();
    let record = github();

    let mut vault = harness.unlocked_vault("master").await.unwrap();
    assert!(vault.update_record(record.clone()).await.unwrap());
    drop(vault);

    let vault = harness.unlocked_vault("master").await.unwrap();
    assert_eq!(vault.records(), std::slice::from_ref(&record));
    let loaded = &vault.records()[0];
    assert_eq!(loaded.id(), record.id());
    assert_eq!(loaded.account_name.as_deref(), Some("GitHub"));
    assert_eq!(loaded.user_name.as_deref(), Some("alice"));
    assert_eq!(loaded.password.as_deref(), Some("s3cr3t"));
    assert_eq!(loaded.url.as_deref(), Some("https://github.com"));
}

#[tokio::test]
async fn bootstrap_relaunch_and_wrong_password() {
    let harness = TestHarness::new().await.unwrap();
    let gate = harness.gate();

    let mut first_run = harness.open_vault().unwrap();
    assert!(gate.verify(&mut first_run, "first-password").await.unwrap());
    assert!(first_run.get_master_password().await.unwrap().is_some());

    let mut second_run = harness.open_vault().unwrap();
    assert!(gate.verify(&mut second_run, "first-password").await.unwrap());

    let mut third_run = harness.open_vault().unwrap();
    assert!(!gate.verify(&mut third_run, "wrong").await.unwrap());
    assert!(!third_run.is_unlocked());
}

#[tokio::test]
async fn rotation_failure_keeps_previous_entry() {
    let harness = TestHarness::new().await.unwrap();
    let mut vault = harness.unlocked_vault("old-pw").await.unwrap();
    vault.update_record(github()).await.unwrap();
    let before = vault.get_master_password().await.unwrap();

    harness.memory().fail_on_set("AccountData");
    let err = vault.change_master_password("new-pw").await.unwrap_err();
    assert!(matches!(err, TopSecretError::MasterPasswordRotationFailed { .. }), "{err}");
    assert_eq!(vault.get_master_password().await.unwrap(), before);

    harness.memory().heal();
    let relaunched = harness.unlocked_vault("old-pw").await.unwrap();
    assert_eq!(relaunched.records().len(), 1);
    assert!(harness.unlocked_vault("new-pw").await.is_err());
}

#[tokio::test]
async fn rotation_success_switches_passwords() {
    let harness = TestHarness::new().await.unwrap();
    let mut vault = harness.unlocked_vault("old-pw").await.unwrap();
    vault.update_record(github()).await.unwrap();
    vault.change_master_password("new-pw").await.unwrap();

    let relaunched = harness.unlocked_vault("new-pw").await.unwrap();
    assert_eq!(relaunched.records().len(), 1);
    assert!(harness.unlocked_vault("old-pw").await.is_err());
}

#[tokio::test]
async fn rotation_right_after_login_keeps_records_readable() {
    let harness = TestHarness::new().await.unwrap();
    let mut vault = harness.unlocked_vault("old-pw").await.unwrap();
    vault.update_record(github()).await.unwrap();
    drop(vault);

    let mut vault = harness.open_vault().unwrap();
    assert!(harness.gate().verify(&mut vault, "old-pw").await.unwrap());
    vault.change_master_password("new-pw").await.unwrap();
    vault.populate_records().await.unwrap();
    assert_eq!(vault.records().len(), 1);

    let relaunched = harness.unlocked_vault("new-pw").await.unwrap();
    assert_eq!(relaunched.records().len(), 1);
}

#[tokio::test]
async fn rotation_after_emptying_the_vault() {
    let harness = TestHarness::new().await.unwrap();
    let record = github();
    let mut vault = harness.unlocked_vault("old-pw").await.unwrap();
    vault.update_record(record.clone()).await.unwrap();
    vault.delete_record(record.id()).await.unwrap();
    vault.change_master_password("new-pw").await.unwrap();
    drop(vault);

    let relaunched = harness.unlocked_vault("new-pw").await.unwrap();
    assert!(relaunched.records().is_empty());
}

#[tokio::test]
async fn other_device_cannot_log_in() {
    let phone = TestHarness::builder()
        .with_device_id("phone")
        .build()
        .await
        .unwrap();
    phone.unlocked_vault("pw").await.unwrap();

    // Same stored entry, different device binding.
    let mut config = phone.config().clone();
    config.device.identifier = Some("tablet".into());
    let mut tablet = topsecret_vault::Vault::from_config(phone.store(), &config).unwrap();
    assert!(!phone.gate().verify(&mut tablet, "pw").await.unwrap());
}

#[tokio::test]
async fn lockout_wipes_after_limit() {
    let harness = TestHarness::builder()
        .with_max_failed_attempts(1)
        .build()
        .await
        .unwrap();
    let mut vault = harness.unlocked_vault("pw").await.unwrap();
    vault.update_record(github()).await.unwrap();

    let gate = harness.gate();
    let mut vault = harness.open_vault().unwrap();
    assert_eq!(
        gate.attempt(&mut vault, "x").await.unwrap(),
        LoginOutcome::Denied { failed_attempts: 1 }
    );
    assert_eq!(
        gate.attempt(&mut vault, "x").await.unwrap(),
        LoginOutcome::Denied { failed_attempts: 2 }
    );
    assert_eq!(gate.attempt(&mut vault, "x").await.unwrap(), LoginOutcome::Wiped);
    assert!(harness.memory().is_empty());

    // After a wipe the next password bootstraps a fresh vault.
    assert_eq!(
        gate.attempt(&mut vault, "fresh").await.unwrap(),
        LoginOutcome::Bootstrapped
    );
    vault.populate_records().await.unwrap();
    assert!(vault.records().is_empty());
}

#[tokio::test]
async fn sqlite_backed_vault_round_trip() {
    let harness = TestHarness::builder().with_sqlite().build().await.unwrap();
    let record = github();

    let mut vault = harness.unlocked_vault("master").await.unwrap();
    vault.update_record(record.clone()).await.unwrap();
    let other = AccountRecord::new(Some("Bank".into()), Some("bob".into()), None, None);
    vault.update_record(other.clone()).await.unwrap();
    assert!(vault.delete_record(other.id()).await.unwrap());
    drop(vault);

    let vault = harness.unlocked_vault("master").await.unwrap();
    assert_eq!(vault.records(), &[record]);
}
