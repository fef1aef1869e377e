mod common;

use auth_identity::permissions::VIEW_CONSUMER;
use auth_identity::repository::StoreError;
use auth_identity::{CreateAccountInput, IdentityError, RequestContext, Role, UserRole};
use common::{bio, test_config, Harness, PHONE};
use error_common::{Classify, ErrorKind};
use std::collections::BTreeSet;
use uuid::Uuid;

const OTP: &str = "246810";

fn input(phone: &str, otp: &str, pin: &str) -> CreateAccountInput {
    CreateAccountInput {
        phone: phone.to_string(),
        otp: otp.to_string(),
        pin: pin.to_string(),
        bio_data: bio("Wanjiru", "Mwangi"),
        email: Some("wanjiru@example.com".to_string()),
        role_ids: None,
    }
}

#[tokio::test]
async fn test_unverified_otp_creates_nothing() {
    let harness = Harness::new();
    harness.otp.issue_code(PHONE, OTP);

    let err = harness
        .service
        .signup()
        .create_account(&RequestContext::background(), input(PHONE, "000000", "1234"))
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::OtpVerificationFailed));
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(harness.store.profile_count(), 0);
    assert_eq!(harness.store.writes(), 0);
    assert_eq!(harness.provider.identity_count(), 0);
    assert_eq!(harness.provider.credentials_issued(), 0);
}

#[tokio::test]
async fn test_never_issued_otp_creates_nothing() {
    let harness = Harness::new();

    let err = harness
        .service
        .signup()
        .create_account(&RequestContext::background(), input(PHONE, OTP, "1234"))
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::OtpVerificationFailed));
    assert_eq!(harness.store.writes(), 0);
}

#[tokio::test]
async fn test_create_account() {
    let harness = Harness::new();
    harness.otp.issue_code(PHONE, OTP);
    let ctx = RequestContext::background();

    let account = harness
        .service
        .signup()
        .create_account(&ctx, input("0700000000", OTP, "1234"))
        .await
        .unwrap();

    let profile = &account.profile;
    assert_eq!(profile.primary_phone, PHONE);
    assert_eq!(profile.role, UserRole::Consumer);
    assert_eq!(profile.primary_email.as_deref(), Some("wanjiru@example.com"));
    assert!(profile.created_by_id.is_none());
    assert_eq!(account.credentials.uid, profile.uid);

    let settings = harness.store.communication_settings(profile.id).unwrap();
    assert_eq!(settings, account.communication_settings);
    assert!(
        settings.allow_whatsapp
            && settings.allow_text_sms
            && settings.allow_push
            && settings.allow_email
    );

    let history = harness.store.pin_history(profile.id);
    assert_eq!(history.len(), 1);
    assert!(!history[0].is_temporary);
    assert!(harness.service.pins().verify_pin(&ctx, PHONE, "1234").await.is_ok());

    assert!(account.roles.is_empty());
    let routes: Vec<&str> = account.navigation.iter().map(|n| n.route.as_str()).collect();
    assert!(routes.contains(&"/records"));
    assert!(!routes.contains(&"/admin/employees"));
}

#[tokio::test]
async fn test_roles_extend_navigation() {
    let harness = Harness::new();
    harness.store.insert_role(Role {
        id: "care-team".to_string(),
        name: "Care Team".to_string(),
        permissions: BTreeSet::from([VIEW_CONSUMER.to_string()]),
    });
    harness.otp.issue_code(PHONE, OTP);

    let mut request = input(PHONE, OTP, "1234");
    request.role_ids = Some(vec!["care-team".to_string(), "unknown".to_string()]);

    let account = harness
        .service
        .signup()
        .create_account(&RequestContext::background(), request)
        .await
        .unwrap();

    assert_eq!(account.roles.len(), 1);
    assert_eq!(account.profile.role_ids, vec!["care-team".to_string(), "unknown".to_string()]);
    assert!(account.navigation.iter().any(|n| n.route == "/admin/consumers"));
}

#[tokio::test]
async fn test_validation_runs_before_otp() {
    let harness = Harness::new();
    harness.otp.issue_code(PHONE, OTP);
    let signup = harness.service.signup();
    let ctx = RequestContext::background();

    let err = signup.create_account(&ctx, input(PHONE, OTP, "12a4")).await.unwrap_err();
    assert!(matches!(err, IdentityError::InvalidPinFormat { .. }));

    let err = signup.create_account(&ctx, input("12345", OTP, "1234")).await.unwrap_err();
    assert!(matches!(err, IdentityError::PhoneNormalization(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let mut nameless = input(PHONE, OTP, "1234");
    nameless.bio_data.first_name = String::new();
    let err = signup.create_account(&ctx, nameless).await.unwrap_err();
    assert!(matches!(err, IdentityError::InvalidInput(_)));

    assert_eq!(harness.otp.verification_count(), 0);
    assert_eq!(harness.otp.pending_code(PHONE).as_deref(), Some(OTP));
}

#[tokio::test]
async fn test_profile_failure_keeps_identity() {
    let harness = Harness::new();
    let ctx = RequestContext::background();
    harness.store.fail("create_profile", StoreError::Backend("disk full".to_string()));
    harness.otp.issue_code(PHONE, OTP);

    let err = harness
        .service
        .signup()
        .create_account(&ctx, input(PHONE, OTP, "1234"))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::ProfileCreationFailed(StoreError::Backend(_))));
    assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
    assert_eq!(harness.provider.identity_count(), 1);
    assert_eq!(harness.store.profile_count(), 0);

    // Retrying reuses the identity created by the failed attempt
    harness.store.clear_fault("create_profile");
    harness.otp.issue_code(PHONE, OTP);
    let account = harness
        .service
        .signup()
        .create_account(&ctx, input(PHONE, OTP, "1234"))
        .await
        .unwrap();
    assert_eq!(harness.provider.identity_count(), 1);
    assert_eq!(harness.store.profile_count(), 1);
    assert_eq!(account.credentials.uid, account.profile.uid);
}

#[tokio::test]
async fn test_duplicate_phone_is_rejected() {
    let harness = Harness::new();
    harness.seed_consumer(PHONE);
    harness.otp.issue_code(PHONE, OTP);

    let err = harness
        .service
        .signup()
        .create_account(&RequestContext::background(), input(PHONE, OTP, "1234"))
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::ProfileCreationFailed(StoreError::Conflict(_))));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_trunk_prefix_after_country_code_is_same_subscriber() {
    let harness = Harness::new();
    let ctx = RequestContext::background();
    let signup = harness.service.signup();

    harness.otp.issue_code(PHONE, OTP);
    let first = signup.create_account(&ctx, input("0700000000", OTP, "1234")).await.unwrap();
    assert_eq!(first.profile.primary_phone, PHONE);

    harness.otp.issue_code(PHONE, OTP);
    let err = signup
        .create_account(&ctx, input("+254 0700000000", OTP, "1234"))
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::ProfileCreationFailed(StoreError::Conflict(_))));
    assert_eq!(harness.store.profile_count(), 1);
}

#[tokio::test]
async fn test_wrong_subscriber_length_is_rejected_before_otp() {
    let harness = Harness::new();
    harness.otp.issue_code("+2547000000000", OTP);

    let err = harness
        .service
        .signup()
        .create_account(&RequestContext::background(), input("+2547000000000", OTP, "1234"))
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::PhoneNormalization(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(harness.otp.verification_count(), 0);
    assert_eq!(harness.store.writes(), 0);
}

#[tokio::test]
async fn test_later_failure_leaves_earlier_steps() {
    let harness = Harness::new();
    harness
        .store
        .fail("set_communication_settings", StoreError::Backend("timeout".to_string()));
    harness.otp.issue_code(PHONE, OTP);
    let ctx = RequestContext::background();

    let err = harness
        .service
        .signup()
        .create_account(&ctx, input(PHONE, OTP, "1234"))
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::Persistence(StoreError::Backend(_))));
    assert_eq!(harness.store.profile_count(), 1);
    assert!(harness.service.pins().verify_pin(&ctx, PHONE, "1234").await.is_ok());
}

#[tokio::test]
async fn test_update_bio_data() {
    let harness = Harness::new();
    let profile = harness.seed_consumer(PHONE);
    let ctx = RequestContext::background();
    let signup = harness.service.signup();

    let updated = signup
        .update_bio_data(&ctx, profile.id, bio("Amina", "Achieng"))
        .await
        .unwrap();
    assert_eq!(updated.bio_data.last_name, "Achieng");

    let err = signup.update_bio_data(&ctx, profile.id, bio("", "Achieng")).await.unwrap_err();
    assert!(matches!(err, IdentityError::InvalidInput(_)));

    let err = signup
        .update_bio_data(&ctx, Uuid::new_v4(), bio("Amina", "Achieng"))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::ProfileNotFound));
}

#[tokio::test]
async fn test_purge_disabled_by_default() {
    let harness = Harness::new();
    harness.seed_consumer_with_pin(PHONE, "1234").await;

    let err = harness
        .service
        .signup()
        .purge_test_account(&RequestContext::background(), PHONE)
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::PermissionDenied(_)));
    assert_eq!(harness.store.profile_count(), 1);
}

#[tokio::test]
async fn test_purge_removes_account() {
    let harness = Harness::with_config(auth_identity::IdentityConfig {
        allow_test_purge: true,
        ..test_config()
    });
    let profile = harness.seed_consumer_with_pin(PHONE, "1234").await;
    let ctx = RequestContext::background();

    harness.service.signup().purge_test_account(&ctx, PHONE).await.unwrap();

    assert_eq!(harness.store.profile_count(), 0);
    assert!(harness.store.pin_history(profile.id).is_empty());
    assert!(matches!(
        harness.service.signup().purge_test_account(&ctx, PHONE).await,
        Err(IdentityError::ProfileNotFound)
    ));
}
