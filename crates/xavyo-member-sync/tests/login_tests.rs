//! Integration tests for the post-login refresh and password propagation.

mod common;

use std::collections::BTreeSet;

use common::{jdoe_entry, Failure, TestContext};
use xavyo_member_sync::prelude::*;

fn strict() -> SyncPolicy {
    SyncPolicy::default()
}

fn lenient() -> SyncPolicy {
    SyncPolicy::default().with_allow_update_failure_during_login(true)
}

#[tokio::test]
async fn test_login_refreshes_fields_and_groups() {
    let ctx = TestContext::new(strict());
    ctx.directory.insert_entry("abc-123", jdoe_entry());
    ctx.directory.set_groups("abc-123", &["Staff"]);
    let staff = ctx.groups.link("Staff");

    let mut member = MemberRecord::new().with_guid("abc-123");
    let status = ctx.login().after_login(&mut member).await.unwrap();

    assert_eq!(status, SyncStatus::Synced);
    assert_eq!(member.field("email"), Some("jdoe@example.com"));
    assert!(member.last_synced.is_some());
    assert_eq!(
        ctx.groups.groups_of(member.id, AssociationSource::Directory),
        BTreeSet::from([staff])
    );
}

#[tokio::test]
async fn test_login_failure_blocks_when_strict() {
    let ctx = TestContext::new(strict());
    ctx.directory.insert_entry("abc-123", jdoe_entry());
    ctx.directory.fail("search", Failure::Unavailable);

    let mut member = MemberRecord::new().with_guid("abc-123");
    let before = member.clone();

    let err = ctx.login().after_login(&mut member).await.unwrap_err();

    assert!(err.is_directory_unavailable());
    assert_eq!(member, before);
}

#[tokio::test]
async fn test_login_failure_tolerated_when_lenient() {
    let ctx = TestContext::new(lenient());
    ctx.directory.insert_entry("abc-123", jdoe_entry());
    ctx.directory.fail("search", Failure::Unavailable);

    let mut member = MemberRecord::new()
        .with_guid("abc-123")
        .with_field("email", "stale@example.com");
    let before = member.clone();

    let status = ctx.login().after_login(&mut member).await.unwrap();

    assert_eq!(status, SyncStatus::Skipped(SkipReason::FailureTolerated));
    assert_eq!(member, before);
}

#[tokio::test]
async fn test_group_failure_after_pull_leaves_record_unmodified() {
    let ctx = TestContext::new(lenient());
    ctx.directory.insert_entry("abc-123", jdoe_entry());
    ctx.directory.fail("groups_for", Failure::Unavailable);

    let mut member = MemberRecord::new().with_guid("abc-123");
    let before = member.clone();

    let status = ctx.login().after_login(&mut member).await.unwrap();

    assert_eq!(status, SyncStatus::Skipped(SkipReason::FailureTolerated));
    assert_eq!(ctx.directory.calls("search"), 1);
    assert_eq!(member, before);
    assert!(member.last_synced.is_none());
}

#[tokio::test]
async fn test_login_of_local_only_member_is_skipped() {
    let ctx = TestContext::new(strict());

    let mut member = MemberRecord::new().with_username("jdoe");
    let status = ctx.login().after_login(&mut member).await.unwrap();

    assert_eq!(status, SyncStatus::Skipped(SkipReason::NoGuid));
    assert_eq!(ctx.directory.total_calls(), 0);
}

#[tokio::test]
async fn test_rejected_refresh_blocks_even_when_lenient_is_off() {
    let ctx = TestContext::new(strict());
    ctx.directory.insert_entry("abc-123", jdoe_entry());
    ctx.directory.fail("search", Failure::Unauthorized);

    let mut member = MemberRecord::new().with_guid("abc-123");
    let err = ctx.login().after_login(&mut member).await.unwrap_err();

    assert!(matches!(err, SyncError::WriteRejected { .. }));
}

// =============================================================================
// Password propagation
// =============================================================================

#[tokio::test]
async fn test_password_change_reaches_directory() {
    let ctx = TestContext::new(strict());
    ctx.directory.insert_entry("abc-123", jdoe_entry());

    let member = MemberRecord::new().with_guid("abc-123");
    let status = ctx
        .engine
        .on_password_change(&member, "N3w-Passw0rd")
        .await
        .unwrap();

    assert_eq!(status, SyncStatus::Synced);
    assert_eq!(
        ctx.directory.credential("abc-123").as_deref(),
        Some("N3w-Passw0rd")
    );
}

#[tokio::test]
async fn test_password_change_failure_is_returned() {
    let ctx = TestContext::new(lenient());
    ctx.directory.insert_entry("abc-123", jdoe_entry());
    ctx.directory.fail("set_credential", Failure::Unavailable);

    let member = MemberRecord::new().with_guid("abc-123");
    let err = ctx
        .engine
        .on_password_change(&member, "N3w-Passw0rd")
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert!(ctx.directory.credential("abc-123").is_none());
}

#[tokio::test]
async fn test_password_change_for_local_member_is_skipped() {
    let ctx = TestContext::new(strict());

    let member = MemberRecord::new().with_username("jdoe");
    let status = ctx
        .engine
        .on_password_change(&member, "N3w-Passw0rd")
        .await
        .unwrap();

    assert_eq!(status, SyncStatus::Skipped(SkipReason::NoGuid));
    assert_eq!(ctx.directory.calls("set_credential"), 0);
}

#[tokio::test]
async fn test_empty_password_is_rejected() {
    let ctx = TestContext::new(strict());
    ctx.directory.insert_entry("abc-123", jdoe_entry());

    let member = MemberRecord::new().with_guid("abc-123");
    let err = ctx.engine.on_password_change(&member, "").await.unwrap_err();

    assert!(matches!(err, SyncError::ValidationFailed { .. }));
    assert_eq!(ctx.directory.calls("set_credential"), 0);
}
