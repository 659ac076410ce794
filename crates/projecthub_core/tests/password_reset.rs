use projecthub_core::clock::{HOUR_MS, MINUTE_MS};
use projecthub_core::db::open_db_in_memory;
use projecthub_core::{
    Account, AccountRepository, AccountService, CoreConfig, PasswordReset, PasswordResetError,
    PasswordResetService, SqliteAccountRepository, RESET_TOKEN_TTL_MS,
};
use rusqlite::Connection;

const NOW_MS: i64 = 1_700_000_000_000;

fn create_account(conn: &mut Connection) -> Account {
    let repo = SqliteAccountRepository::try_new(conn).unwrap();
    AccountService::new(repo)
        .create_account("someone", "someone@example.com")
        .unwrap()
}

#[test]
fn refresh_issues_a_token_expiring_in_four_hours() {
    let mut conn = open_db_in_memory().unwrap();
    let account = create_account(&mut conn);

    let repo = SqliteAccountRepository::try_new(&mut conn).unwrap();
    let mut service = PasswordResetService::new(repo);
    let email = service
        .refresh_token_and_email_link(&PasswordReset::new("someone@example.com"), NOW_MS)
        .unwrap();

    assert_eq!(email.account_id, account.id);
    assert_eq!(email.recipient, "someone@example.com");
    assert!(!email.token.is_empty());
    assert!(email.expires_at > NOW_MS + 3 * HOUR_MS + 58 * MINUTE_MS);
    assert!(email.expires_at <= NOW_MS + 4 * HOUR_MS);
    assert_eq!(email.expires_at, NOW_MS + RESET_TOKEN_TTL_MS);
    assert!(email.link.ends_with(&format!("/{}", email.token)));
}

#[test]
fn refresh_persists_exactly_one_token() {
    let mut conn = open_db_in_memory().unwrap();
    let account = create_account(&mut conn);

    let (first, second) = {
        let mut service =
            PasswordResetService::new(SqliteAccountRepository::try_new(&mut conn).unwrap());
        let request = PasswordReset::new("someone@example.com");
        let first = service
            .refresh_token_and_email_link(&request, NOW_MS)
            .unwrap();
        let second = service
            .refresh_token_and_email_link(&request, NOW_MS + MINUTE_MS)
            .unwrap();
        (first, second)
    };
    assert_ne!(first.token, second.token);

    let repo = SqliteAccountRepository::try_new(&mut conn).unwrap();
    let tokens = repo.list_reset_tokens(account.id).unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].token, second.token);
    assert_eq!(tokens[0].expires_at, second.expires_at);
}

#[test]
fn email_lookup_ignores_case() {
    let mut conn = open_db_in_memory().unwrap();
    let account = create_account(&mut conn);

    let repo = SqliteAccountRepository::try_new(&mut conn).unwrap();
    let mut service = PasswordResetService::new(repo);
    let email = service
        .refresh_token_and_email_link(&PasswordReset::new("SomeOne@Example.com"), NOW_MS)
        .unwrap();
    assert_eq!(email.account_id, account.id);
}

#[test]
fn refresh_rejects_unknown_and_malformed_addresses() {
    let mut conn = open_db_in_memory().unwrap();
    create_account(&mut conn);

    let repo = SqliteAccountRepository::try_new(&mut conn).unwrap();
    let mut service = PasswordResetService::new(repo);
    let err = service
        .refresh_token_and_email_link(&PasswordReset::new("nobody@example.com"), NOW_MS)
        .unwrap_err();
    assert!(matches!(err, PasswordResetError::AccountNotFound));

    let err = service
        .refresh_token_and_email_link(&PasswordReset::new("not-an-email"), NOW_MS)
        .unwrap_err();
    assert!(matches!(err, PasswordResetError::InvalidEmail));
}

#[test]
fn verify_accepts_live_token_and_rejects_expired_or_unknown() {
    let mut conn = open_db_in_memory().unwrap();
    let account = create_account(&mut conn);

    let repo = SqliteAccountRepository::try_new(&mut conn).unwrap();
    let mut service = PasswordResetService::new(repo);
    let email = service
        .refresh_token_and_email_link(&PasswordReset::new("someone@example.com"), NOW_MS)
        .unwrap();

    let verified = service
        .verify_token("someone@example.com", &email.token, NOW_MS + HOUR_MS)
        .unwrap();
    assert_eq!(verified, account.id);

    let err = service
        .verify_token("someone@example.com", &email.token, email.expires_at)
        .unwrap_err();
    assert!(matches!(err, PasswordResetError::ExpiredToken));

    let err = service
        .verify_token("someone@example.com", "deadbeef", NOW_MS)
        .unwrap_err();
    assert!(matches!(err, PasswordResetError::InvalidToken));

    let err = service
        .verify_token("nobody@example.com", &email.token, NOW_MS)
        .unwrap_err();
    assert!(matches!(err, PasswordResetError::InvalidToken));
}

#[test]
fn custom_settings_shape_link_and_expiry() {
    let mut conn = open_db_in_memory().unwrap();
    create_account(&mut conn);

    let repo = SqliteAccountRepository::try_new(&mut conn).unwrap();
    let mut service = PasswordResetService::with_settings(repo, HOUR_MS, "https://hub.test/reset/");
    let email = service
        .refresh_token_and_email_link(&PasswordReset::new("someone@example.com"), NOW_MS)
        .unwrap();

    assert_eq!(email.expires_at, NOW_MS + HOUR_MS);
    assert_eq!(email.link, format!("https://hub.test/reset/{}", email.token));
}

#[test]
fn environment_settings_reach_issued_tokens() {
    let mut conn = open_db_in_memory().unwrap();
    create_account(&mut conn);
    let config = CoreConfig::from_lookup(|key: &str| match key {
        "PROJECTHUB_RESET_TOKEN_TTL_MS" => Some("90000".to_string()),
        "PROJECTHUB_RESET_LINK_BASE" => Some("https://hub.test/password".to_string()),
        _ => None,
    })
    .unwrap();

    let repo = SqliteAccountRepository::try_new(&mut conn).unwrap();
    let mut service = PasswordResetService::from_config(repo, &config);
    let email = service
        .refresh_token_and_email_link(&PasswordReset::new("someone@example.com"), NOW_MS)
        .unwrap();

    assert_eq!(email.expires_at, NOW_MS + 90_000);
    assert_eq!(email.link, format!("https://hub.test/password/{}", email.token));
}
