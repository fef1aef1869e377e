mod common;

use auth_identity::notification::SentMessage;
use auth_identity::repository::{IdentityStore, StoreError};
use auth_identity::{AdapterError, IdentityConfig, IdentityError, RequestContext, UserRole};
use common::{admin_input, test_config, Harness};
use error_common::{Classify, ErrorKind};
use uuid::Uuid;

const ADMIN_PHONE: &str = "+254722000002";

/// Welcome SMS carries only the PIN so tests can sign in with it
fn pin_only_sms() -> IdentityConfig {
    IdentityConfig {
        admin_welcome_sms_template: "{pin}".to_string(),
        ..test_config()
    }
}

#[tokio::test]
async fn test_register_administrator() {
    let harness = Harness::with_config(pin_only_sms());
    let manager = harness.seed_manager();
    let ctx = RequestContext::background();

    let profile = harness
        .service
        .admin()
        .register_administrator(
            &ctx,
            &manager.uid,
            admin_input("0722000002", Some("brian@example.com")),
        )
        .await
        .unwrap();

    assert_eq!(profile.primary_phone, ADMIN_PHONE);
    assert_eq!(profile.role, UserRole::Staff);
    assert_eq!(profile.created_by_id, Some(manager.id));
    assert!(!profile.suspended);
    assert!(!profile.uid.is_empty());

    assert!(harness.store.customer_for(profile.id).is_some());
    let supplier = harness.store.supplier_for(profile.id).unwrap();
    assert!(supplier.is_organisation_verified && supplier.has_been_approved);
    assert_eq!(supplier.supplier_name, "Brian Kamau");
    assert!(harness.store.communication_settings(profile.id).is_some());

    let history = harness.store.pin_history(profile.id);
    assert_eq!(history.len(), 1);
    assert!(history[0].is_temporary);

    let sms = harness.notifier.sms_to(ADMIN_PHONE);
    assert_eq!(sms.len(), 1);
    let check = harness.service.pins().verify_pin(&ctx, ADMIN_PHONE, &sms[0]).await.unwrap();
    assert!(check.is_temporary);

    let emails: Vec<SentMessage> = harness
        .notifier
        .sent()
        .into_iter()
        .filter(|m| matches!(m, SentMessage::Email { .. }))
        .collect();
    assert_eq!(emails.len(), 1);
    match &emails[0] {
        SentMessage::Email { address, subject, body } => {
            assert_eq!(address, "brian@example.com");
            assert_eq!(subject, "Welcome to RustCare Admin");
            assert!(body.contains("Brian"));
            assert!(body.contains(sms[0].as_str()));
        }
        SentMessage::Sms { .. } => unreachable!(),
    }
}

#[tokio::test]
async fn test_register_without_email_sends_sms_only() {
    let harness = Harness::new();
    let manager = harness.seed_manager();

    harness
        .service
        .admin()
        .register_administrator(
            &RequestContext::background(),
            &manager.uid,
            admin_input(ADMIN_PHONE, None),
        )
        .await
        .unwrap();

    let sent = harness.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(matches!(&sent[0], SentMessage::Sms { body, .. } if body.contains("Brian")));
}

#[tokio::test]
async fn test_register_requires_known_actor() {
    let harness = Harness::new();

    let err = harness
        .service
        .admin()
        .register_administrator(
            &RequestContext::background(),
            "ghost",
            admin_input(ADMIN_PHONE, None),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::UserNotFound));
    assert_eq!(harness.store.profile_count(), 0);
    assert_eq!(harness.store.writes(), 0);
}

#[tokio::test]
async fn test_sms_failure_leaves_profile_persisted() {
    let harness = Harness::new();
    let manager = harness.seed_manager();
    harness.notifier.set_fail_sms(true);
    let ctx = RequestContext::background();

    let err = harness
        .service
        .admin()
        .register_administrator(
            &ctx,
            &manager.uid,
            admin_input(ADMIN_PHONE, Some("brian@example.com")),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::NotificationDeliveryFailed(AdapterError::Unavailable(_))));
    assert_eq!(err.kind(), ErrorKind::UpstreamFailure);

    let persisted = harness.store.get_profile_by_phone(&ctx, ADMIN_PHONE).await.unwrap();
    assert_eq!(persisted.role, UserRole::Staff);
    assert_eq!(harness.store.pin_history(persisted.id).len(), 1);
    assert!(harness.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_email_failure_aborts() {
    let harness = Harness::new();
    let manager = harness.seed_manager();
    harness.notifier.set_fail_email(true);

    let err = harness
        .service
        .admin()
        .register_administrator(
            &RequestContext::background(),
            &manager.uid,
            admin_input(ADMIN_PHONE, Some("brian@example.com")),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::NotificationDeliveryFailed(_)));
    assert_eq!(harness.notifier.sms_to(ADMIN_PHONE).len(), 1);
}

#[tokio::test]
async fn test_activate_without_permission_changes_nothing() {
    let harness = Harness::new();
    let caller = harness.seed_plain_admin("+254733000003");
    let mut target = common::profile(ADMIN_PHONE, UserRole::Staff, Default::default());
    target.suspended = true;
    harness.store.insert_profile(target.clone());
    let ctx = RequestContext::background();

    let err = harness
        .service
        .admin()
        .activate_administrator(&ctx, &caller.uid, target.id)
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::PermissionDenied(_)));
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(harness.store.get_profile_by_id(&ctx, target.id).await.unwrap().suspended);
    assert_eq!(harness.store.writes(), 0);
}

#[tokio::test]
async fn test_unknown_actor_is_denied() {
    let harness = Harness::new();
    let target = harness.seed_plain_admin(ADMIN_PHONE);

    let err = harness
        .service
        .admin()
        .deactivate_administrator(&RequestContext::background(), "ghost", target.id)
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::PermissionDenied(_)));
}

#[tokio::test]
async fn test_deactivate_then_activate() {
    let harness = Harness::new();
    let manager = harness.seed_manager();
    let target = harness.seed_plain_admin(ADMIN_PHONE);
    let ctx = RequestContext::background();
    let admin = harness.service.admin();

    assert!(admin.deactivate_administrator(&ctx, &manager.uid, target.id).await.unwrap());
    assert!(harness.store.get_profile_by_id(&ctx, target.id).await.unwrap().suspended);

    assert!(admin.activate_administrator(&ctx, &manager.uid, target.id).await.unwrap());
    assert!(!harness.store.get_profile_by_id(&ctx, target.id).await.unwrap().suspended);
}

#[tokio::test]
async fn test_unknown_target() {
    let harness = Harness::new();
    let manager = harness.seed_manager();

    let err = harness
        .service
        .admin()
        .activate_administrator(&RequestContext::background(), &manager.uid, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::ProfileNotFound));
}

#[tokio::test]
async fn test_fetch_admins_empty() {
    let harness = Harness::new();
    harness.seed_consumer("+254700000000");

    let admins = harness.service.admin().fetch_admins(&RequestContext::background()).await.unwrap();
    assert!(admins.is_empty());
}

#[tokio::test]
async fn test_fetch_admins_resend_flag() {
    let harness = Harness::with_config(pin_only_sms());
    let manager = harness.seed_manager();
    let ctx = RequestContext::background();
    let admin = harness.service.admin();

    let pending = admin
        .register_administrator(&ctx, &manager.uid, admin_input(ADMIN_PHONE, None))
        .await
        .unwrap();
    let settled = admin
        .register_administrator(&ctx, &manager.uid, admin_input("+254744000004", None))
        .await
        .unwrap();
    harness.service.pins().change_pin(&ctx, "+254744000004", "7531").await.unwrap();

    let admins = admin.fetch_admins(&ctx).await.unwrap();
    assert_eq!(admins.len(), 3);

    let flag = |id: Uuid| admins.iter().find(|a| a.profile.id == id).map(|a| a.resend_pin);
    assert_eq!(flag(pending.id), Some(true));
    assert_eq!(flag(settled.id), Some(false));
    assert_eq!(flag(manager.id), Some(false));
}

#[tokio::test]
async fn test_fetch_admins_fails_fast() {
    let harness = Harness::new();
    harness.seed_manager();
    harness.seed_plain_admin(ADMIN_PHONE);
    let ctx = RequestContext::background();

    harness
        .store
        .fail("get_pin_by_profile_id", StoreError::Backend("replica lag".to_string()));
    let err = harness.service.admin().fetch_admins(&ctx).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PersistenceFailure);

    harness.store.clear_fault("get_pin_by_profile_id");
    harness
        .store
        .fail("list_profiles_by_role", StoreError::Backend("replica lag".to_string()));
    assert!(harness.service.admin().fetch_admins(&ctx).await.is_err());
}

#[tokio::test]
async fn test_resend_temporary_pin() {
    let harness = Harness::with_config(pin_only_sms());
    let manager = harness.seed_manager();
    let ctx = RequestContext::background();
    let admin = harness.service.admin();

    let profile = admin
        .register_administrator(&ctx, &manager.uid, admin_input(ADMIN_PHONE, None))
        .await
        .unwrap();

    assert!(admin.resend_temporary_pin(&ctx, &manager.uid, profile.id).await.unwrap());

    let sms = harness.notifier.sms_to(ADMIN_PHONE);
    assert_eq!(sms.len(), 2);
    let history = harness.store.pin_history(profile.id);
    assert_eq!(history.len(), 2);
    assert!(!history[0].valid);
    assert!(history[1].valid && history[1].is_temporary);
    assert!(harness.service.pins().verify_pin(&ctx, ADMIN_PHONE, &sms[1]).await.is_ok());

    let outsider = harness.seed_plain_admin("+254755000005");
    assert!(matches!(
        admin.resend_temporary_pin(&ctx, &outsider.uid, profile.id).await,
        Err(IdentityError::PermissionDenied(_))
    ));
}
