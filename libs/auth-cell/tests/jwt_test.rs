use shared_utils::jwt::{issue_token, validate_token};
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

#[test]
fn test_issue_and_validate_round_trip() {
    let config = TestConfig::default();
    let user = TestUser::doctor("doc@example.com");

    let token = issue_token(
        &user.id.to_string(),
        &user.email,
        &user.role,
        &user.name,
        &config.jwt_secret,
        24,
    )
    .unwrap();

    let validated = validate_token(&token, &config.jwt_secret).unwrap();
    assert_eq!(validated.id, user.id.to_string());
    assert_eq!(validated.email, Some(user.email));
    assert_eq!(validated.role, Some("doctor".to_string()));
    assert_eq!(validated.name, Some(user.name));
}

#[test]
fn test_expired_token_is_rejected() {
    let config = TestConfig::default();
    let user = TestUser::default();
    let token = JwtTestUtils::create_expired_token(&user, &config.jwt_secret);

    let result = validate_token(&token, &config.jwt_secret);
    assert_eq!(result.unwrap_err(), "Token expired");
}

#[test]
fn test_invalid_signature_is_rejected() {
    let config = TestConfig::default();
    let user = TestUser::default();
    let token = JwtTestUtils::create_invalid_signature_token(&user);

    let result = validate_token(&token, &config.jwt_secret);
    assert_eq!(result.unwrap_err(), "Invalid token signature");
}

#[test]
fn test_malformed_token_is_rejected() {
    let config = TestConfig::default();
    let token = JwtTestUtils::create_malformed_token();

    let result = validate_token(&token, &config.jwt_secret);
    assert!(result.is_err());
}

#[test]
fn test_empty_secret_refuses_to_issue() {
    let user = TestUser::default();
    let result = issue_token(
        &user.id.to_string(),
        &user.email,
        &user.role,
        &user.name,
        "",
        24,
    );
    assert!(result.is_err());
}
