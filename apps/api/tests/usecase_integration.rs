//! Integration tests for the usecase layer
//!
//! These tests wire the usecases to the in-memory storage engine and verify
//! behaviour across users, companies and memberships end to end.

use std::sync::Arc;

use roster_api::auth::PasswordHasher;
use roster_api::domain::repositories::{MembershipRepository, UserRepository};
use roster_api::domain::ErrorKind;
use roster_api::infrastructure::repositories::InMemoryDatabase;
use roster_api::usecases::{CompanyInput, CompanyUsecase, UserUsecase};

const TEST_COST: u32 = 4;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

struct Harness {
    db: InMemoryDatabase,
    users: UserUsecase,
    companies: CompanyUsecase,
}

fn setup() -> Harness {
    init_tracing();

    let db = InMemoryDatabase::new();
    let users = UserUsecase::new(
        Arc::new(db.user_repository()),
        PasswordHasher::new(TEST_COST),
    );
    let companies = CompanyUsecase::new(
        Arc::new(db.company_repository()),
        Arc::new(db.membership_repository()),
    );

    Harness {
        db,
        users,
        companies,
    }
}

fn company(name: &str, email: &str) -> CompanyInput {
    CompanyInput {
        name: name.to_string(),
        email: email.to_string(),
        ..CompanyInput::default()
    }
}

#[tokio::test]
async fn test_create_user_hides_credential_but_stores_hash() {
    let h = setup();

    let user = h
        .users
        .create("Alice", "alice@example.com", "s3cretpass")
        .await
        .expect("create user");

    assert!(user.id > 0);
    assert!(user.password_hash.is_empty());

    let stored = h
        .db
        .user_repository()
        .get_by_id(user.id)
        .await
        .expect("stored user");
    assert!(!stored.password_hash.is_empty());
    assert_ne!(stored.password_hash, "s3cretpass");
}

#[tokio::test]
async fn test_duplicate_email_creates_no_row() {
    let h = setup();

    h.users
        .create("Alice", "alice@example.com", "s3cretpass")
        .await
        .expect("first create");
    let err = h
        .users
        .create("Alice Again", "alice@example.com", "s3cretpass")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(h.db.user_repository().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_user_pagination() {
    let h = setup();

    for i in 0..25 {
        h.users
            .create(&format!("User {}", i), &format!("user{}@example.com", i), "password123")
            .await
            .expect("create user");
    }

    let (first, info) = h.users.get_users_paginated(1, 10).await.unwrap();
    assert_eq!(first.len(), 10);
    assert_eq!(info.total, 25);
    assert_eq!(info.total_pages, 3);
    // Newest first
    assert_eq!(first[0].email, "user24@example.com");

    let (last, _) = h.users.get_users_paginated(3, 10).await.unwrap();
    assert_eq!(last.len(), 5);

    let (clamped, clamped_info) = h.users.get_users_paginated(0, 500).await.unwrap();
    let (explicit, explicit_info) = h.users.get_users_paginated(1, 100).await.unwrap();
    assert_eq!(clamped_info, explicit_info);
    assert_eq!(
        clamped.iter().map(|u| u.id).collect::<Vec<_>>(),
        explicit.iter().map(|u| u.id).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_authenticate_round_trip() {
    let h = setup();

    let created = h
        .users
        .create("Bob", "bob@example.com", "correct horse")
        .await
        .unwrap();

    let user = h
        .users
        .authenticate_user("bob@example.com", "correct horse")
        .await
        .expect("authenticate");
    assert_eq!(user.id, created.id);
    assert!(user.password_hash.is_empty());

    let wrong = h
        .users
        .authenticate_user("bob@example.com", "wrong horse")
        .await
        .unwrap_err();
    let unknown = h
        .users
        .authenticate_user("nobody@example.com", "correct horse")
        .await
        .unwrap_err();

    assert_eq!(wrong.kind(), ErrorKind::AuthenticationFailed);
    assert_eq!(unknown.kind(), ErrorKind::AuthenticationFailed);
    assert_eq!(wrong.to_string(), unknown.to_string());
}

#[tokio::test]
async fn test_password_beyond_bcrypt_limit_is_refused() {
    let h = setup();
    let prefix = "a".repeat(72);

    let err = h
        .users
        .create("Kim", "kim@example.com", &format!("{}REAL-SECRET", prefix))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(h.db.user_repository().count().await.unwrap(), 0);

    h.users
        .create("Kim", "kim@example.com", &prefix)
        .await
        .expect("password at the limit");
    let err = h
        .users
        .authenticate_user("kim@example.com", &format!("{}totally-different", prefix))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
}

#[tokio::test]
async fn test_update_user_with_own_email() {
    let h = setup();

    let user = h
        .users
        .create("Carol", "carol@example.com", "password123")
        .await
        .unwrap();

    let updated = h
        .users
        .update_user(user.id, "Caroline", "carol@example.com")
        .await
        .expect("update with same email");

    assert_eq!(updated.name, "Caroline");
    assert!(updated.password_hash.is_empty());
    assert!(h
        .users
        .authenticate_user("carol@example.com", "password123")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_update_user_to_taken_email() {
    let h = setup();

    h.users
        .create("Dave", "dave@example.com", "password123")
        .await
        .unwrap();
    let erin = h
        .users
        .create("Erin", "erin@example.com", "password123")
        .await
        .unwrap();

    let err = h
        .users
        .update_user(erin.id, "Erin", "dave@example.com")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn test_add_member_twice_keeps_original_role() {
    let h = setup();

    let user = h
        .users
        .create("Frank", "frank@example.com", "password123")
        .await
        .unwrap();
    let acme = h
        .companies
        .create_company(company("Acme", "info@acme.io"))
        .await
        .unwrap();

    let membership = h
        .companies
        .add_user_to_company(user.id, acme.id, "admin")
        .await
        .expect("add member");
    assert!(membership.is_admin());

    let err = h
        .companies
        .add_user_to_company(user.id, acme.id, "member")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    let relation = h
        .db
        .membership_repository()
        .get_relation(user.id, acme.id)
        .await
        .unwrap();
    assert_eq!(relation.role, "admin");
}

#[tokio::test]
async fn test_add_then_remove_member() {
    let h = setup();

    let user = h
        .users
        .create("Grace", "grace@example.com", "password123")
        .await
        .unwrap();
    let acme = h
        .companies
        .create_company(company("Acme", "info@acme.io"))
        .await
        .unwrap();

    let err = h
        .companies
        .remove_user_from_company(user.id, acme.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let membership = h
        .companies
        .add_user_to_company(user.id, acme.id, "")
        .await
        .unwrap();
    assert_eq!(membership.role, "member");

    let updated = h
        .companies
        .update_user_role(user.id, acme.id, "billing")
        .await
        .unwrap();
    assert_eq!(updated.role, "billing");

    let err = h
        .companies
        .update_user_role(user.id, acme.id, &"x".repeat(51))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(!updated.is_member());

    h.companies
        .remove_user_from_company(user.id, acme.id)
        .await
        .expect("remove member");

    assert!(!h
        .db
        .membership_repository()
        .exists(user.id, acme.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_membership_listings() {
    let h = setup();

    let user = h
        .users
        .create("Heidi", "heidi@example.com", "password123")
        .await
        .unwrap();
    let acme = h
        .companies
        .create_company(company("Acme", "info@acme.io"))
        .await
        .unwrap();
    let globex = h
        .companies
        .create_company(company("Globex", "info@globex.io"))
        .await
        .unwrap();

    h.companies
        .add_user_to_company(user.id, acme.id, "admin")
        .await
        .unwrap();
    h.companies
        .add_user_to_company(user.id, globex.id, "member")
        .await
        .unwrap();

    let companies = h.companies.get_companies_by_user(user.id).await.unwrap();
    assert_eq!(companies.len(), 2);

    let members = h.companies.get_users_by_company(acme.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, user.id);

    let err = h.companies.get_users_by_company(9999).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_company_cascades_memberships() {
    let h = setup();

    let user = h
        .users
        .create("Ivan", "ivan@example.com", "password123")
        .await
        .unwrap();
    let acme = h
        .companies
        .create_company(company("Acme", "info@acme.io"))
        .await
        .unwrap();
    h.companies
        .add_user_to_company(user.id, acme.id, "admin")
        .await
        .unwrap();

    h.companies.delete_company(acme.id).await.expect("delete company");

    assert!(h
        .companies
        .get_companies_by_user(user.id)
        .await
        .unwrap()
        .is_empty());
    let err = h.companies.get_company_by_id(acme.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_user_cascades_memberships() {
    let h = setup();

    let user = h
        .users
        .create("Judy", "judy@example.com", "password123")
        .await
        .unwrap();
    let acme = h
        .companies
        .create_company(company("Acme", "info@acme.io"))
        .await
        .unwrap();
    h.companies
        .add_user_to_company(user.id, acme.id, "member")
        .await
        .unwrap();

    h.users.delete_user(user.id).await.expect("delete user");

    assert!(h
        .companies
        .get_users_by_company(acme.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_company_search_and_update() {
    let h = setup();

    let acme = h
        .companies
        .create_company(company("Acme Widgets", "info@acme.io"))
        .await
        .unwrap();
    h.companies
        .create_company(company("Globex", "info@globex.io"))
        .await
        .unwrap();

    let found = h.companies.search_companies("WIDGET").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, acme.id);

    let updated = h
        .companies
        .update_company(
            acme.id,
            CompanyInput {
                website: Some("https://acme.io".to_string()),
                ..company("Acme Gadgets", "info@acme.io")
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Acme Gadgets");
    assert!(updated.has_website());

    let err = h
        .companies
        .update_company(acme.id, company("Acme Gadgets", "info@globex.io"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    let (page, info) = h.companies.get_companies_paginated(1, 10).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(info.total_pages, 1);
}
