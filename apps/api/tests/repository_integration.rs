//! Integration tests for repository layer
//!
//! These tests verify that the PostgreSQL repositories correctly interact
//! with the database, including uniqueness, referential integrity and
//! cascading deletes. They need a reachable database in `DATABASE_URL`.

use std::sync::atomic::{AtomicU32, Ordering};

use roster_api::domain::company::{NewCompany, NewMembership};
use roster_api::domain::repositories::{CompanyRepository, MembershipRepository, UserRepository};
use roster_api::domain::user::NewUser;
use roster_api::domain::ErrorKind;
use roster_api::infrastructure::database::{self, DatabaseConfig};
use roster_api::infrastructure::repositories::{
    PostgresCompanyRepository, PostgresMembershipRepository, PostgresUserRepository,
};
use sqlx::PgPool;

static SEQ: AtomicU32 = AtomicU32::new(0);

/// Set up test database connection pool with the schema applied
async fn setup_test_db() -> PgPool {
    std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

    let pool = database::connect(&DatabaseConfig::from_env())
        .await
        .expect("Failed to connect to test database");
    database::ping(&pool).await.expect("Database not reachable");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Email that no other test run will have used
fn unique_email(prefix: &str) -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!(
        "{}-{}-{}@example.com",
        prefix,
        nanos,
        SEQ.fetch_add(1, Ordering::SeqCst)
    )
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: "$2b$04$notarealhashbutnonempty".to_string(),
    }
}

fn new_company(email: &str) -> NewCompany {
    NewCompany {
        name: "Test Company".to_string(),
        email: email.to_string(),
        ..NewCompany::default()
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_user_repository_create_and_find_by_email() {
    let pool = setup_test_db().await;
    let user_repo = PostgresUserRepository::new(pool.clone());

    let email = unique_email("find");
    let created = user_repo.create(new_user(&email)).await.expect("create user");

    let found = user_repo.get_by_email(&email).await.expect("find user");
    assert_eq!(found.id, created.id);
    assert_eq!(found.password_hash, created.password_hash);
    assert!(user_repo.exists(created.id).await.unwrap());
    assert!(user_repo.exists_by_email(&email).await.unwrap());

    user_repo.delete(created.id).await.expect("cleanup user");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_user_repository_duplicate_email() {
    let pool = setup_test_db().await;
    let user_repo = PostgresUserRepository::new(pool.clone());

    let email = unique_email("dup");
    let created = user_repo.create(new_user(&email)).await.expect("create user");

    let err = user_repo.create(new_user(&email)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    user_repo.delete(created.id).await.expect("cleanup user");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_user_repository_update_and_delete() {
    let pool = setup_test_db().await;
    let user_repo = PostgresUserRepository::new(pool.clone());

    let mut user = user_repo
        .create(new_user(&unique_email("upd")))
        .await
        .expect("create user");
    let other = user_repo
        .create(new_user(&unique_email("other")))
        .await
        .expect("create other user");

    user.name = "Renamed".to_string();
    let updated = user_repo.update(&user).await.expect("update own email");
    assert_eq!(updated.name, "Renamed");
    assert!(updated.updated_at >= updated.created_at);

    user.email = other.email.clone();
    let err = user_repo.update(&user).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    user_repo.delete(user.id).await.expect("delete user");
    let err = user_repo.delete(user.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = user_repo.get_by_id(user.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    user_repo.delete(other.id).await.expect("cleanup user");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_company_repository_search_escapes_wildcards() {
    let pool = setup_test_db().await;
    let company_repo = PostgresCompanyRepository::new(pool.clone());

    let plain = company_repo
        .create(NewCompany {
            name: "Plain Company".to_string(),
            ..new_company(&unique_email("plain"))
        })
        .await
        .expect("create company");
    let percent = company_repo
        .create(NewCompany {
            name: "100% Company".to_string(),
            ..new_company(&unique_email("percent"))
        })
        .await
        .expect("create company");

    let found = company_repo.search_by_name("0% comp").await.expect("search");
    assert!(found.iter().any(|c| c.id == percent.id));
    assert!(!found.iter().any(|c| c.id == plain.id));

    company_repo.delete(plain.id).await.expect("cleanup company");
    company_repo.delete(percent.id).await.expect("cleanup company");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_membership_unique_pair_and_cascade() {
    let pool = setup_test_db().await;
    let user_repo = PostgresUserRepository::new(pool.clone());
    let company_repo = PostgresCompanyRepository::new(pool.clone());
    let membership_repo = PostgresMembershipRepository::new(pool.clone());

    let user = user_repo
        .create(new_user(&unique_email("member")))
        .await
        .expect("create user");
    let company = company_repo
        .create(new_company(&unique_email("company")))
        .await
        .expect("create company");

    let membership = membership_repo
        .create(NewMembership {
            user_id: user.id,
            company_id: company.id,
            role: "admin".to_string(),
        })
        .await
        .expect("create membership");
    assert!(membership.is_admin());

    let err = membership_repo
        .create(NewMembership {
            user_id: user.id,
            company_id: company.id,
            role: "member".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    let members = membership_repo
        .get_users_by_company_id(company.id)
        .await
        .expect("list members");
    assert_eq!(members.len(), 1);

    // CASCADE DELETE removes the membership with the company
    company_repo.delete(company.id).await.expect("delete company");
    assert!(!membership_repo.exists(user.id, company.id).await.unwrap());

    user_repo.delete(user.id).await.expect("cleanup user");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_membership_for_missing_user() {
    let pool = setup_test_db().await;
    let company_repo = PostgresCompanyRepository::new(pool.clone());
    let membership_repo = PostgresMembershipRepository::new(pool.clone());

    let company = company_repo
        .create(new_company(&unique_email("orphan")))
        .await
        .expect("create company");

    let err = membership_repo
        .create(NewMembership {
            user_id: i64::MAX,
            company_id: company.id,
            role: "member".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    company_repo.delete(company.id).await.expect("cleanup company");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_user_creates_with_same_email() {
    let pool = setup_test_db().await;
    let user_repo = PostgresUserRepository::new(pool.clone());

    let email = unique_email("race");
    let (first, second) = tokio::join!(
        user_repo.create(new_user(&email)),
        user_repo.create(new_user(&email))
    );

    // Whichever loses, the pre-check or the unique index, reports the same kind
    let (created, err) = match (first, second) {
        (Ok(user), Err(err)) | (Err(err), Ok(user)) => (user, err),
        (first, second) => panic!("expected exactly one success: {first:?} / {second:?}"),
    };
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(created.email, email);

    user_repo.delete(created.id).await.expect("cleanup user");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_membership_creates_for_same_pair() {
    let pool = setup_test_db().await;
    let user_repo = PostgresUserRepository::new(pool.clone());
    let company_repo = PostgresCompanyRepository::new(pool.clone());
    let membership_repo = PostgresMembershipRepository::new(pool.clone());

    let user = user_repo
        .create(new_user(&unique_email("race-member")))
        .await
        .expect("create user");
    let company = company_repo
        .create(new_company(&unique_email("race-company")))
        .await
        .expect("create company");

    let membership = || NewMembership {
        user_id: user.id,
        company_id: company.id,
        role: "member".to_string(),
    };
    let (first, second) = tokio::join!(
        membership_repo.create(membership()),
        membership_repo.create(membership())
    );

    let err = match (first, second) {
        (Ok(_), Err(err)) | (Err(err), Ok(_)) => err,
        (first, second) => panic!("expected exactly one success: {first:?} / {second:?}"),
    };
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    company_repo.delete(company.id).await.expect("cleanup company");
    user_repo.delete(user.id).await.expect("cleanup user");
}
