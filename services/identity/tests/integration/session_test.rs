use iels_auth_types::token::{SESSION_TOKEN_EXP, validate_session_token};
use iels_identity::error::IdentityServiceError;
use iels_identity::usecase::token::{SignInInput, SignInUseCase};

use crate::helpers::{MockCredentialRepo, TEST_JWT_SECRET, manager, test_user};

fn sign_in_usecase(repo: MockCredentialRepo) -> SignInUseCase<MockCredentialRepo> {
    SignInUseCase {
        credentials: manager(repo),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    }
}

#[tokio::test]
async fn should_issue_valid_session_token() {
    let user = test_user("learner@example.com", Some("learner-pass"));
    let uc = sign_in_usecase(MockCredentialRepo::new(vec![user.clone()]));

    let out = uc
        .execute(SignInInput {
            email: " LEARNER@example.com".to_owned(),
            password: "learner-pass".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(out.user.id, user.id);
    let info = validate_session_token(&out.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.user_id, user.id.0);
    assert_eq!(info.email, "learner@example.com");
    assert_eq!(info.expires_at, out.expires_at);

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    assert!(out.expires_at > now);
    assert!(out.expires_at <= now + SESSION_TOKEN_EXP);
}

#[tokio::test]
async fn should_reject_token_signed_with_other_secret() {
    let user = test_user("learner@example.com", Some("learner-pass"));
    let uc = sign_in_usecase(MockCredentialRepo::new(vec![user]));

    let out = uc
        .execute(SignInInput {
            email: "learner@example.com".to_owned(),
            password: "learner-pass".to_owned(),
        })
        .await
        .unwrap();

    assert!(validate_session_token(&out.token, "another-secret").is_err());
}

#[tokio::test]
async fn should_return_invalid_credentials_for_wrong_password() {
    let uc = sign_in_usecase(MockCredentialRepo::new(vec![test_user(
        "learner@example.com",
        Some("learner-pass"),
    )]));

    let result = uc
        .execute(SignInInput {
            email: "learner@example.com".to_owned(),
            password: "wrong-pass".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(IdentityServiceError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}

#[tokio::test]
async fn should_return_invalid_credentials_for_unknown_email() {
    let uc = sign_in_usecase(MockCredentialRepo::empty());

    let result = uc
        .execute(SignInInput {
            email: "nobody@example.com".to_owned(),
            password: "whatever-pass".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(IdentityServiceError::InvalidCredentials)));
}

#[tokio::test]
async fn should_require_password() {
    let uc = sign_in_usecase(MockCredentialRepo::empty());

    let result = uc
        .execute(SignInInput {
            email: "learner@example.com".to_owned(),
            password: String::new(),
        })
        .await;

    assert!(matches!(result, Err(IdentityServiceError::MissingData)));
}
