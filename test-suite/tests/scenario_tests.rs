//! Catalog scenarios against a staged mock service
//!
//! Every test stages the endpoints a scenario touches, runs the scenario and
//! checks both that it passed and that the expected requests were made.

use mockito::Matcher;
use petfriends_client::PetFriends;
use petfriends_core::{PetFilter, Settings};
use petfriends_test_suite::{
    ScenarioCtx, ScenarioError, catalog,
    fixtures::{INVALID_EMAIL, INVALID_KEY, INVALID_PASSWORD, VALID_PHOTO},
    run_scenario, scenarios,
};
use petfriends_testing::{
    MockPetFriends,
    fixtures::{VALID_EMAIL, VALID_KEY, VALID_PASSWORD, pet, valid_credentials, with_photo},
    mock::{has_multipart_field, multipart_field},
};
use secrecy::SecretString;

fn ctx(server: &MockPetFriends) -> ScenarioCtx {
    ScenarioCtx::with_bundled_photos(
        PetFriends::new(&server.url()).unwrap(),
        valid_credentials(),
    )
    .unwrap()
}

/// A server that already hands out a key for the fixture account.
fn keyed_server() -> (MockPetFriends, mockito::Mock) {
    let mut server = MockPetFriends::new();
    let key = server.api_key(VALID_EMAIL, VALID_PASSWORD, VALID_KEY);
    (server, key)
}

#[test]
fn catalog_ids_are_unique() {
    let catalog = catalog();
    let mut ids: Vec<_> = catalog.iter().map(|s| s.id()).collect();
    ids.sort();
    ids.dedup();

    assert_eq!(ids.len(), catalog.len());
    assert_eq!(catalog.len(), 16);
}

#[test]
fn settings_without_images_dir_use_bundled_photos() {
    let settings = Settings {
        base_url: "http://127.0.0.1:1/".into(),
        email: VALID_EMAIL.into(),
        password: SecretString::from(VALID_PASSWORD.to_string()),
        images_dir: None,
    };

    let ctx = ScenarioCtx::from_settings(&settings).unwrap();

    assert!(ctx.photo(VALID_PHOTO).is_file());
    assert!(!ctx.images_dir.starts_with(env!("CARGO_MANIFEST_DIR")));
}

#[test]
fn api_key_for_valid_user() {
    let (server, key) = keyed_server();

    scenarios::api_key_for_valid_user(&ctx(&server)).unwrap();
    key.assert();
}

#[test]
fn api_key_for_invalid_user() {
    let mut server = MockPetFriends::new();
    let rejected = server.api_key_forbidden(INVALID_EMAIL, INVALID_PASSWORD);

    scenarios::api_key_for_invalid_user(&ctx(&server)).unwrap();
    rejected.assert();
}

#[test]
fn all_pets_with_valid_key() {
    let (mut server, _key) = keyed_server();
    let list = server.pets(
        VALID_KEY,
        PetFilter::All,
        &[pet("p1", "Marsik", "scotchfold", "4")],
    );

    scenarios::all_pets_with_valid_key(&ctx(&server)).unwrap();
    list.assert();
}

#[test]
fn all_pets_fails_on_empty_list() {
    let (mut server, _key) = keyed_server();
    let _list = server.pets(VALID_KEY, PetFilter::All, &[]);

    let err = scenarios::all_pets_with_valid_key(&ctx(&server)).unwrap_err();
    assert!(matches!(err, ScenarioError::Assertion(_)), "{err:?}");
}

#[test]
fn add_new_pet_with_valid_data() {
    let (mut server, _key) = keyed_server();
    let add = server.add_pet(
        VALID_KEY,
        &with_photo(pet("p1", "Marsik", "scotchfold", "4")),
    );

    scenarios::add_new_pet_with_valid_data(&ctx(&server)).unwrap();
    add.assert();
}

/// With no own pets the scenario adds one, deletes it and re-checks
#[test]
fn delete_own_pet_adds_one_when_empty() {
    let (mut server, _key) = keyed_server();
    let superkot = with_photo(pet("p9", "Суперкот", "кот", "3"));
    let _list = server.pets_sequence(
        VALID_KEY,
        PetFilter::MyPets,
        vec![vec![], vec![superkot.clone()], vec![]],
    );
    let add = server.add_pet(VALID_KEY, &superkot);
    let delete = server.delete_pet(VALID_KEY, &superkot.id);

    scenarios::delete_own_pet(&ctx(&server)).unwrap();
    add.assert();
    delete.assert();
}

#[test]
fn delete_own_pet_detects_a_surviving_pet() {
    let (mut server, _key) = keyed_server();
    let stubborn = pet("p1", "Barsik", "cat", "2");
    let _list = server.pets(VALID_KEY, PetFilter::MyPets, &[stubborn.clone()]);
    let _delete = server.delete_pet(VALID_KEY, &stubborn.id);

    let err = scenarios::delete_own_pet(&ctx(&server)).unwrap_err();
    assert!(
        matches!(&err, ScenarioError::Assertion(msg) if msg.contains("p1")),
        "{err:?}"
    );
}

#[test]
fn update_own_pet_info() {
    let (mut server, _key) = keyed_server();
    let _list = server.pets(
        VALID_KEY,
        PetFilter::MyPets,
        &[pet("p1", "Marsik", "scotchfold", "4")],
    );
    let update = server.update_pet(VALID_KEY, &pet("p1", "Мурзик", "Котэ", "5"));

    scenarios::update_own_pet_info(&ctx(&server)).unwrap();
    update.assert();
}

#[test]
fn update_own_pet_info_needs_an_own_pet() {
    let (mut server, _key) = keyed_server();
    let _list = server.pets(VALID_KEY, PetFilter::MyPets, &[]);

    let err = scenarios::update_own_pet_info(&ctx(&server)).unwrap_err();
    assert!(
        matches!(&err, ScenarioError::Precondition(msg) if msg == "there are no own pets"),
        "{err:?}"
    );
}

#[test]
fn create_pet_simple_with_valid_data() {
    let (mut server, _key) = keyed_server();
    let create = server.create_pet_simple(VALID_KEY, &pet("p1", "Marsik", "scotchfold", "4"));

    scenarios::create_pet_simple_with_valid_data(&ctx(&server)).unwrap();
    create.assert();
}

#[test]
fn set_photo_creates_a_pet_when_empty() {
    let (mut server, _key) = keyed_server();
    let bare = pet("p7", "Суперкот2", "кот", "3");
    let _list = server.pets_sequence(
        VALID_KEY,
        PetFilter::MyPets,
        vec![vec![], vec![bare.clone()]],
    );
    let create = server.create_pet_simple(VALID_KEY, &bare);
    let photo = server.set_photo(VALID_KEY, &with_photo(bare));

    scenarios::set_photo_with_valid_image(&ctx(&server)).unwrap();
    create.assert();
    photo.assert();
}

#[test]
fn set_photo_reports_an_empty_photo() {
    let (mut server, _key) = keyed_server();
    let bare = pet("p1", "Marsik", "scotchfold", "4");
    let _list = server.pets(VALID_KEY, PetFilter::MyPets, &[bare.clone()]);
    let _photo = server.set_photo(VALID_KEY, &bare);

    let err = scenarios::set_photo_with_valid_image(&ctx(&server)).unwrap_err();
    assert!(matches!(err, ScenarioError::Assertion(_)), "{err:?}");
}

#[test]
fn create_pet_simple_without_animal_type() {
    let (mut server, _key) = keyed_server();
    let (rejected, recorded) = server.bad_request_recorded(
        "POST",
        "/api/create_pet_simple",
        VALID_KEY,
        Matcher::UrlEncoded("name".into(), "Мурзик".into()),
    );

    scenarios::create_pet_simple_without_animal_type(&ctx(&server)).unwrap();
    rejected.assert();

    let body = recorded.last().unwrap();
    assert!(!body.contains("animal_type"), "{body}");
}

#[test]
fn create_pet_simple_with_invalid_key() {
    let mut server = MockPetFriends::new();
    let rejected = server.forbidden("POST", "/api/create_pet_simple", INVALID_KEY);

    scenarios::create_pet_simple_with_invalid_key(&ctx(&server)).unwrap();
    rejected.assert();
}

#[test]
fn all_pets_with_invalid_key() {
    let mut server = MockPetFriends::new();
    let rejected = server.forbidden("GET", "/api/pets", INVALID_KEY);

    scenarios::all_pets_with_invalid_key(&ctx(&server)).unwrap();
    rejected.assert();
}

#[test]
fn add_new_pet_without_animal_type() {
    let (mut server, _key) = keyed_server();
    let (rejected, recorded) = server.bad_request_recorded(
        "POST",
        "/api/pets",
        VALID_KEY,
        multipart_field("name", "NoneCat"),
    );

    scenarios::add_new_pet_without_animal_type(&ctx(&server)).unwrap();
    rejected.assert();

    let body = recorded.last().unwrap();
    assert!(!has_multipart_field(&body, "animal_type"), "{body}");
}

#[test]
fn add_new_pet_with_invalid_key() {
    let mut server = MockPetFriends::new();
    let rejected = server.forbidden("POST", "/api/pets", INVALID_KEY);

    scenarios::add_new_pet_with_invalid_key(&ctx(&server)).unwrap();
    rejected.assert();
}

#[test]
fn set_photo_with_non_image() {
    let (mut server, _key) = keyed_server();
    let _list = server.pets(
        VALID_KEY,
        PetFilter::MyPets,
        &[pet("p1", "Marsik", "scotchfold", "4")],
    );
    let rejected = server.bad_request(
        "POST",
        "/api/pets/set_photo/p1",
        VALID_KEY,
        Matcher::Any,
    );

    scenarios::set_photo_with_non_image(&ctx(&server)).unwrap();
    rejected.assert();
}

#[test]
fn set_photo_with_invalid_key() {
    let (mut server, _key) = keyed_server();
    let _list = server.pets(
        VALID_KEY,
        PetFilter::MyPets,
        &[pet("p1", "Marsik", "scotchfold", "4")],
    );
    let rejected = server.forbidden("POST", "/api/pets/set_photo/p1", INVALID_KEY);

    scenarios::set_photo_with_invalid_key(&ctx(&server)).unwrap();
    rejected.assert();
}

#[test]
fn my_pets_filter_returns_own_pets() {
    let (mut server, _key) = keyed_server();
    let barsik = pet("p3", "Барсик", "кот", "2");
    let _create = server.create_pet_simple(VALID_KEY, &barsik);
    let _list = server.pets(
        VALID_KEY,
        PetFilter::MyPets,
        &[pet("p1", "Marsik", "scotchfold", "4"), barsik],
    );

    scenarios::my_pets_filter_returns_own_pets(&ctx(&server)).unwrap();
}

#[test]
fn my_pets_filter_rejects_duplicates() {
    let (mut server, _key) = keyed_server();
    let barsik = pet("p3", "Барсик", "кот", "2");
    let _create = server.create_pet_simple(VALID_KEY, &barsik);
    let _list = server.pets(
        VALID_KEY,
        PetFilter::MyPets,
        &[barsik.clone(), barsik],
    );

    let err = scenarios::my_pets_filter_returns_own_pets(&ctx(&server)).unwrap_err();
    assert!(matches!(err, ScenarioError::Assertion(_)), "{err:?}");
}

#[test]
fn my_pets_filter_rejects_foreign_pets() {
    let (mut server, _key) = keyed_server();
    let barsik = pet("p3", "Барсик", "кот", "2");
    let mut foreign = pet("p8", "Шарик", "пёс", "6");
    foreign.user_id = Some("someone-else".into());

    let _create = server.create_pet_simple(VALID_KEY, &barsik);
    let _list = server.pets(VALID_KEY, PetFilter::MyPets, &[foreign, barsik]);

    let err = scenarios::my_pets_filter_returns_own_pets(&ctx(&server)).unwrap_err();
    assert!(
        matches!(&err, ScenarioError::Assertion(msg) if msg.contains("p8")),
        "{err:?}"
    );
}

/// The runner records failures instead of propagating them
#[test]
fn runner_records_unexpected_status() {
    let (server, _key) = keyed_server();
    // nothing staged for /api/pets, mockito answers 501
    let scenario = catalog()
        .into_iter()
        .find(|s| s.id() == "all_pets_with_invalid_key")
        .unwrap();

    let result = run_scenario(&ctx(&server), &scenario);

    assert!(!result.passed);
    assert_eq!(result.metadata.id, "all_pets_with_invalid_key");
    let message = result.error_message.unwrap();
    assert!(message.contains("expected status 403, got 501"), "{message}");
}
