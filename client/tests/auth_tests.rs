//! `GET api/key` tests

use petfriends_client::{Error, PetFriends};
use petfriends_testing::{MockPetFriends, fixtures::*};

/// Valid credentials yield 200 with a `key` field
#[test]
fn api_key_for_valid_user() {
    let mut server = MockPetFriends::new();
    let mock = server.api_key(VALID_EMAIL, VALID_PASSWORD, VALID_KEY);
    let client = PetFriends::new(&server.url()).unwrap();

    let (status, body) = client
        .get_api_key(VALID_EMAIL, VALID_PASSWORD)
        .unwrap()
        .into_parts();

    mock.assert();
    assert_eq!(status.as_u16(), 200);
    assert!(body.contains_key("key"));
    assert_eq!(body.get("key").and_then(|k| k.as_str()), Some(VALID_KEY));
}

/// Invalid credentials yield 403 and the raw page comes back as text
#[test]
fn api_key_for_invalid_user() {
    let mut server = MockPetFriends::new();
    let mock = server.api_key_forbidden(INVALID_EMAIL, INVALID_PASSWORD);
    let client = PetFriends::new(&server.url()).unwrap();

    let resp = client
        .get_api_key(INVALID_EMAIL, INVALID_PASSWORD)
        .unwrap();

    mock.assert();
    assert_eq!(resp.status().as_u16(), 403);
    assert!(!resp.is_success());
    assert!(
        resp.body()
            .as_text()
            .is_some_and(|page| page.contains("Forbidden"))
    );
}

/// `obtain_key` decodes the key for valid credentials
#[test]
fn obtain_key_decodes_the_key() {
    let mut server = MockPetFriends::new();
    let _mock = server.api_key(VALID_EMAIL, VALID_PASSWORD, VALID_KEY);
    let client = PetFriends::new(&server.url()).unwrap();

    let key = client
        .obtain_key(&valid_credentials())
        .unwrap();

    assert_eq!(key.expose(), VALID_KEY);
}

/// `obtain_key` turns a rejection into an error carrying the status
#[test]
fn obtain_key_fails_on_rejection() {
    let mut server = MockPetFriends::new();
    let _mock = server.api_key_forbidden(INVALID_EMAIL, INVALID_PASSWORD);
    let client = PetFriends::new(&server.url()).unwrap();

    match client
        .obtain_key(&invalid_credentials())
        .unwrap_err()
    {
        Error::UnexpectedBody { status, .. } => assert_eq!(status.as_u16(), 403),
        other => panic!("unexpected error {other:?}"),
    }
}

/// An unreachable service is a transport error, not a status
#[test]
fn unreachable_service_is_a_transport_error() {
    petfriends_testing::logging();
    let client = PetFriends::new("http://127.0.0.1:1/").unwrap();

    assert!(matches!(
        client.get_api_key(VALID_EMAIL, VALID_PASSWORD),
        Err(Error::Reqwest(_))
    ));
}
