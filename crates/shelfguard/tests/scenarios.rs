//! end-to-end access decisions against an in-memory policy database.

use std::net::IpAddr;

use shelfguard::{AccessService, Caller};
use shelfguard_db::{Database, ShelfguardDb};
use shelfguard_grants::index::{fields, record_query};
use shelfguard_grants::test_utils::StaticIndex;
use shelfguard_grants::{
    AccessEngine, CachedPolicyStore, Decision, EngineOptions, GrantReason, IndexDocument,
};
use shelfguard_state::MemorySessionStore;
use shelfguard_types::test_utils::{TestLicenseBuilder, TestLicenseTypeBuilder};
use shelfguard_types::{LicenseType, NetworkRange, Privilege, User, UserId};

type Service = AccessService<CachedPolicyStore<ShelfguardDb>, StaticIndex, MemorySessionStore>;

fn campus_caller() -> IpAddr {
    "203.0.113.5".parse().unwrap()
}

fn record(conditions: &[&str]) -> Vec<IndexDocument> {
    vec![IndexDocument::new().with_field(fields::ACCESSCONDITION, conditions.iter().copied())]
}

fn index() -> StaticIndex {
    StaticIndex::new()
        .with_documents(&record_query("R1"), record(&["restricted"]))
        .with_documents(&record_query("R2"), record(&["restricted", "embargoed"]))
        .with_documents(&record_query("R3"), record(&["embargoed"]))
}

async fn database() -> (ShelfguardDb, LicenseType, LicenseType) {
    let db = ShelfguardDb::new_in_memory().await.unwrap();
    let restricted = db
        .create_license_type(&TestLicenseTypeBuilder::new("restricted").build())
        .await
        .unwrap();
    let embargoed = db
        .create_license_type(&TestLicenseTypeBuilder::new("embargoed").build())
        .await
        .unwrap();
    (db, restricted, embargoed)
}

fn service(db: ShelfguardDb) -> Service {
    AccessService::new(
        AccessEngine::new(
            CachedPolicyStore::new(db),
            index(),
            EngineOptions::default(),
        ),
        MemorySessionStore::new(),
    )
}

async fn add_campus(db: &ShelfguardDb, license_type: LicenseType) {
    db.create_network_range(&NetworkRange::new(
        "campus",
        "203.0.113.0/24".parse().unwrap(),
    ))
    .await
    .unwrap();
    db.create_license(
        &TestLicenseBuilder::new(license_type)
            .for_network_range("campus")
            .with_privileges(&[Privilege::VIEW_IMAGES])
            .build(),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn anonymous_caller_without_matching_range_is_denied() {
    let (db, _, _) = database().await;
    let service = service(db);

    let decision = service
        .record_decision(
            &Caller::from_address(campus_caller()),
            "R1",
            &Privilege::VIEW_IMAGES,
        )
        .await
        .unwrap();
    assert_eq!(decision, Decision::Denied);
}

#[tokio::test]
async fn campus_range_license_grants() {
    let (db, restricted, _) = database().await;
    add_campus(&db, restricted).await;
    let service = service(db);

    let decision = service
        .record_decision(
            &Caller::from_address(campus_caller()),
            "R1",
            &Privilege::VIEW_IMAGES,
        )
        .await
        .unwrap();
    assert_eq!(
        decision,
        Decision::Granted(GrantReason::NetworkRange("campus".to_string()))
    );

    // outside the range the same request is denied
    let outside = Caller::from_address("198.51.100.1".parse().unwrap());
    assert!(
        !service
            .record_access(&outside, "R1", &Privilege::VIEW_IMAGES)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn every_condition_must_be_satisfied_by_one_source() {
    let db = ShelfguardDb::new_in_memory().await.unwrap();
    // restricted grants view-images by default, embargoed does not
    let restricted = db
        .create_license_type(
            &TestLicenseTypeBuilder::new("restricted")
                .with_privileges(&[Privilege::VIEW_IMAGES])
                .build(),
        )
        .await
        .unwrap();
    let embargoed = db
        .create_license_type(&TestLicenseTypeBuilder::new("embargoed").build())
        .await
        .unwrap();
    add_campus(&db, restricted).await;

    let user = db
        .create_user(&User::new(UserId(0), "reader".to_string()))
        .await
        .unwrap();
    db.create_license(
        &TestLicenseBuilder::new(embargoed)
            .for_user(user.id)
            .with_privileges(&[Privilege::VIEW_IMAGES])
            .build(),
    )
    .await
    .unwrap();
    let reader = db.get_user_by_name("reader").await.unwrap();

    let service = service(db);
    let caller = Caller {
        user: reader,
        address: Some(campus_caller()),
    };

    // the range covers only "restricted", the user only "embargoed"
    let decision = service
        .record_decision(&caller, "R2", &Privilege::VIEW_IMAGES)
        .await
        .unwrap();
    assert_eq!(decision, Decision::Denied);

    // each condition alone is satisfiable
    let decision = service
        .record_decision(&caller, "R1", &Privilege::VIEW_IMAGES)
        .await
        .unwrap();
    assert_eq!(decision, Decision::Granted(GrantReason::DefaultGrant));
    let decision = service
        .record_decision(&caller, "R3", &Privilege::VIEW_IMAGES)
        .await
        .unwrap();
    assert_eq!(
        decision,
        Decision::Granted(GrantReason::Licensee("reader".to_string()))
    );
}

#[tokio::test]
async fn user_holding_both_licenses_is_granted() {
    let (db, restricted, embargoed) = database().await;
    let user = db
        .create_user(&User::new(UserId(0), "reader".to_string()))
        .await
        .unwrap();
    for license_type in [restricted, embargoed] {
        db.create_license(
            &TestLicenseBuilder::new(license_type)
                .for_user(user.id)
                .with_privileges(&[Privilege::VIEW_IMAGES])
                .build(),
        )
        .await
        .unwrap();
    }
    let caller = Caller {
        user: db.get_user_by_name("reader").await.unwrap(),
        address: None,
    };

    let service = service(db);
    let decision = service
        .record_decision(&caller, "R2", &Privilege::VIEW_IMAGES)
        .await
        .unwrap();
    assert_eq!(
        decision,
        Decision::Granted(GrantReason::Licensee("reader".to_string()))
    );
}

#[tokio::test]
async fn core_license_types_do_not_affect_unrelated_records() {
    let db = ShelfguardDb::new_in_memory().await.unwrap();
    db.seed_core_license_types().await.unwrap();
    let service = service(db);

    // "restricted" is not in the catalog, so nothing constrains the record
    let decision = service
        .record_decision(&Caller::anonymous(), "R1", &Privilege::VIEW_IMAGES)
        .await
        .unwrap();
    assert_eq!(decision, Decision::Granted(GrantReason::NoRelevantLicenseTypes));
}
