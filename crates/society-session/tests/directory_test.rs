use std::sync::Arc;

use serde_json::json;
use society_core::{
    IdentityGateway, ProfileDocument, ProfileUpdate, Role, SocietyError, UserStatus, UserUpdate,
};
use society_gateway::MemoryGateway;
use society_session::{DirectoryFilter, DirectoryStats, UserDirectory};

fn doc(value: serde_json::Value) -> ProfileDocument {
    value.as_object().cloned().unwrap()
}

async fn setup() -> (Arc<MemoryGateway>, UserDirectory<MemoryGateway>) {
    let gateway = Arc::new(MemoryGateway::new());
    let people = [
        ("admin@example.com", Role::Admin, UserStatus::Active, "Meera", "9000000001"),
        ("ravi@example.com", Role::Resident, UserStatus::Active, "Ravi", "9000000002"),
        ("neha@example.com", Role::Resident, UserStatus::Pending, "Neha", "9000000003"),
        ("guard@example.com", Role::Security, UserStatus::Active, "Kiran", "9000000004"),
    ];
    for (email, role, status, first, phone) in people {
        gateway
            .seed_account(
                email,
                "password1",
                role,
                status,
                doc(json!({ "firstName": first, "lastName": "Shah", "phoneNumber": phone })),
            )
            .await
            .unwrap();
    }
    let directory = UserDirectory::new(gateway.clone());
    (gateway, directory)
}

#[tokio::test]
async fn fetch_all_fills_the_cache_in_backend_order() {
    let (_gw, directory) = setup().await;
    assert!(directory.users().is_empty());

    let users = directory.fetch_all().await.unwrap();

    let emails: Vec<_> = users.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(
        emails,
        vec![
            "admin@example.com",
            "ravi@example.com",
            "neha@example.com",
            "guard@example.com"
        ]
    );
    let state = directory.state();
    assert_eq!(state.users, users);
    assert!(!state.loading);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn fetch_failure_keeps_previous_entries() {
    let (gw, directory) = setup().await;
    directory.fetch_all().await.unwrap();

    gw.set_offline(true).await;
    let err = directory.fetch_all().await.unwrap_err();

    assert_eq!(err.to_string(), "network request failed");
    let state = directory.state();
    assert_eq!(state.users.len(), 4);
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("network request failed"));
}

#[tokio::test]
async fn filter_and_stats() {
    let (_gw, directory) = setup().await;
    directory.fetch_all().await.unwrap();

    let residents = directory.filter(&DirectoryFilter {
        role: Some(Role::Resident),
        ..Default::default()
    });
    assert_eq!(residents.len(), 2);

    let pending = directory.filter(&DirectoryFilter {
        status: Some(UserStatus::Pending),
        ..Default::default()
    });
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].email, "neha@example.com");

    let search = directory.filter(&DirectoryFilter {
        search: Some("  KIRAN ".into()),
        ..Default::default()
    });
    assert_eq!(search.len(), 1);
    assert_eq!(search[0].role, Some(Role::Security));

    let by_phone = directory.filter(&DirectoryFilter {
        search: Some("0000002".into()),
        ..Default::default()
    });
    assert_eq!(by_phone.len(), 1);

    assert_eq!(
        directory.stats(),
        DirectoryStats {
            total: 4,
            active: 3,
            admins: 1,
            residents: 2,
            security: 1,
        }
    );
}

#[tokio::test]
async fn fetch_one_selects_and_reports_missing_users() {
    let (_gw, directory) = setup().await;
    let all = directory.fetch_all().await.unwrap();
    let ravi = &all[1];

    let fetched = directory.fetch_one(&ravi.uid).await.unwrap();
    assert_eq!(&fetched, ravi);
    assert_eq!(directory.state().selected.as_ref(), Some(ravi));

    let err = directory.fetch_one("missing-uid").await.unwrap_err();
    assert!(matches!(err, SocietyError::NotFound { .. }));
    assert!(directory.state().error.is_some());
    assert_eq!(directory.users().len(), 4);

    directory.clear_selection();
    assert_eq!(directory.state().selected, None);
}

#[tokio::test]
async fn approving_and_rejecting_registrations() {
    let (gw, directory) = setup().await;
    let all = directory.fetch_all().await.unwrap();
    let neha = all[2].uid.clone();
    let ravi = all[1].uid.clone();

    let approved = directory
        .set_status(&neha, UserStatus::Active, None)
        .await
        .unwrap();
    assert_eq!(approved.status, Some(UserStatus::Active));
    assert_eq!(directory.get(&neha).unwrap().status, Some(UserStatus::Active));

    let rejected = directory
        .set_status(&ravi, UserStatus::Rejected, Some("Unit not found".into()))
        .await
        .unwrap();
    assert_eq!(rejected.status, Some(UserStatus::Rejected));
    assert_eq!(rejected.field("rejectionReason"), Some("Unit not found"));

    let stored = gw.get_profile_document(&ravi).await.unwrap().unwrap();
    assert_eq!(stored["status"], json!("rejected"));
}

#[tokio::test]
async fn admin_edit_changes_role_and_refreshes_selection() {
    let (_gw, directory) = setup().await;
    let all = directory.fetch_all().await.unwrap();
    let guard = all[3].uid.clone();
    directory.select(&guard);

    let updated = directory
        .update_user(UserUpdate {
            uid: guard.clone(),
            profile: ProfileUpdate {
                city: Some("Mysuru".into()),
                ..Default::default()
            },
            role: Some(Role::Resident),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.role, Some(Role::Resident));
    assert_eq!(updated.field("city"), Some("Mysuru"));
    assert_eq!(updated.first_name(), Some("Kiran"));
    assert_eq!(directory.state().selected, Some(updated));
    assert_eq!(directory.stats().security, 0);
}

#[tokio::test]
async fn invalid_admin_edit_is_rejected_before_the_backend() {
    let (_gw, directory) = setup().await;
    let err = directory
        .update_user(UserUpdate {
            uid: String::new(),
            profile: ProfileUpdate {
                phone_number: Some("12".into()),
                ..Default::default()
            },
            ..Default::default()
        })
        .await
        .unwrap_err();

    match err {
        SocietyError::Validation(errors) => {
            assert!(errors.contains("uid"));
            assert!(errors.contains("phoneNumber"));
        }
        other => panic!("expected Validation, got {other:?}"),
    }
    assert!(!directory.state().loading);
}
