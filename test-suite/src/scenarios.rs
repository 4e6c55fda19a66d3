//! The acceptance checks run against the PetFriends service.
//!
//! Every scenario obtains its own key and reads server state fresh; none of
//! them depends on another having run first.

use std::collections::HashSet;

use petfriends_core::{AuthKey, Pet, PetFilter, PetList};
use secrecy::ExposeSecret;

use crate::{
    Result, Scenario, ScenarioCtx, ScenarioError, ScenarioMetadata, Tag, ensure, expect_status,
    fixtures::{INVALID_EMAIL, INVALID_KEY, INVALID_PASSWORD, NOT_A_PHOTO, VALID_PHOTO},
};

pub fn catalog() -> Vec<Scenario> {
    vec![
        scenario(
            "api_key_for_valid_user",
            "API key for a valid user",
            "Valid credentials yield 200 and a 'key' field",
            vec![Tag::Smoke, Tag::Auth],
            api_key_for_valid_user,
        ),
        scenario(
            "all_pets_with_valid_key",
            "All pets with a valid key",
            "Listing all pets returns 200 and a non-empty list",
            vec![Tag::Smoke, Tag::Listing],
            all_pets_with_valid_key,
        ),
        scenario(
            "add_new_pet_with_valid_data",
            "Add a pet with valid data",
            "Adding a pet with a photo returns 200 and echoes the name",
            vec![Tag::Create, Tag::Photo],
            add_new_pet_with_valid_data,
        ),
        scenario(
            "delete_own_pet",
            "Delete an own pet",
            "Deleting a pet returns 200 and removes it from the own listing",
            vec![Tag::Delete, Tag::Listing],
            delete_own_pet,
        ),
        scenario(
            "update_own_pet_info",
            "Update an own pet",
            "Updating the first own pet returns 200 and echoes the new name",
            vec![Tag::Update],
            update_own_pet_info,
        ),
        scenario(
            "create_pet_simple_with_valid_data",
            "Create a pet without a photo",
            "create_pet_simple returns 200 and echoes the name",
            vec![Tag::Create],
            create_pet_simple_with_valid_data,
        ),
        scenario(
            "set_photo_with_valid_image",
            "Set a photo on an own pet",
            "Uploading a JPEG returns 200 and a non-empty pet_photo",
            vec![Tag::Photo],
            set_photo_with_valid_image,
        ),
        scenario(
            "api_key_for_invalid_user",
            "API key for an unknown user",
            "Unknown credentials yield 403",
            vec![Tag::Auth, Tag::Negative],
            api_key_for_invalid_user,
        ),
        scenario(
            "create_pet_simple_without_animal_type",
            "Create a pet without an animal type",
            "create_pet_simple without animal_type yields 400",
            vec![Tag::Create, Tag::Negative],
            create_pet_simple_without_animal_type,
        ),
        scenario(
            "create_pet_simple_with_invalid_key",
            "Create a pet with a malformed key",
            "create_pet_simple with key '12345' yields 403",
            vec![Tag::Create, Tag::Auth, Tag::Negative],
            create_pet_simple_with_invalid_key,
        ),
        scenario(
            "all_pets_with_invalid_key",
            "All pets with a malformed key",
            "Listing with key '12345' yields 403",
            vec![Tag::Listing, Tag::Auth, Tag::Negative],
            all_pets_with_invalid_key,
        ),
        scenario(
            "add_new_pet_without_animal_type",
            "Add a pet without an animal type",
            "add_new_pet without animal_type yields 400",
            vec![Tag::Create, Tag::Negative],
            add_new_pet_without_animal_type,
        ),
        scenario(
            "add_new_pet_with_invalid_key",
            "Add a pet with a malformed key",
            "add_new_pet with key '12345' yields 403",
            vec![Tag::Create, Tag::Auth, Tag::Negative],
            add_new_pet_with_invalid_key,
        ),
        scenario(
            "set_photo_with_non_image",
            "Set a non-image photo",
            "Uploading a text file as the photo yields 400",
            vec![Tag::Photo, Tag::Negative],
            set_photo_with_non_image,
        ),
        scenario(
            "set_photo_with_invalid_key",
            "Set a photo with a malformed key",
            "set_photo with key '12345' yields 403",
            vec![Tag::Photo, Tag::Auth, Tag::Negative],
            set_photo_with_invalid_key,
        ),
        scenario(
            "my_pets_filter_returns_own_pets",
            "my_pets lists own pets",
            "A freshly created pet shows up in my_pets, which lists only the caller's pets, each once",
            vec![Tag::Listing, Tag::Create],
            my_pets_filter_returns_own_pets,
        ),
    ]
}

fn scenario(
    id: &str,
    name: &str,
    purpose: &str,
    tags: Vec<Tag>,
    run: crate::ScenarioFn,
) -> Scenario {
    Scenario::new(
        ScenarioMetadata::builder()
            .id(id)
            .name(name)
            .purpose(purpose)
            .tags(tags)
            .build(),
        run,
    )
}

fn echoed_name(
    pet: &Pet,
    expected: &str,
) -> Result<()> {
    ensure(
        pet.name == expected,
        format!("expected name '{expected}', got '{}'", pet.name),
    )
}

fn first_id(pets: &PetList) -> Result<String> {
    pets.first()
        .map(|pet| pet.id.clone())
        .ok_or_else(|| ScenarioError::Precondition("there are no own pets".into()))
}

/// Own pets, creating one without a photo first when there are none.
fn own_pets_or_create(
    ctx: &ScenarioCtx,
    key: &AuthKey,
) -> Result<PetList> {
    let pets = ctx.my_pets(key)?;
    if !pets.is_empty() {
        return Ok(pets);
    }

    tracing::debug!("no own pets, creating one");
    ctx.client
        .create_pet_simple(key, "Суперкот2", Some("кот"), "3")?;
    ctx.my_pets(key)
}

pub fn api_key_for_valid_user(ctx: &ScenarioCtx) -> Result<()> {
    let resp = expect_status(
        ctx.client.get_api_key(
            &ctx.credentials.email,
            ctx.credentials.password.expose_secret(),
        )?,
        200,
    )?;

    ensure(resp.body().contains_key("key"), "response has no 'key' field")
}

pub fn all_pets_with_valid_key(ctx: &ScenarioCtx) -> Result<()> {
    let key = ctx.key()?;
    let resp = expect_status(ctx.client.get_list_of_pets(&key, PetFilter::All)?, 200)?;
    let pets: PetList = resp.json()?;

    ensure(!pets.is_empty(), "pet list is empty")
}

pub fn add_new_pet_with_valid_data(ctx: &ScenarioCtx) -> Result<()> {
    let key = ctx.key()?;
    let resp = expect_status(
        ctx.client.add_new_pet(
            &key,
            "Marsik",
            Some("scotchfold"),
            "4",
            ctx.photo(VALID_PHOTO),
        )?,
        200,
    )?;

    echoed_name(&resp.json()?, "Marsik")
}

pub fn delete_own_pet(ctx: &ScenarioCtx) -> Result<()> {
    let key = ctx.key()?;
    let mut pets = ctx.my_pets(&key)?;

    if pets.is_empty() {
        tracing::debug!("no own pets, adding one");
        ctx.client.add_new_pet(
            &key,
            "Суперкот",
            Some("кот"),
            "3",
            ctx.photo(VALID_PHOTO),
        )?;
        pets = ctx.my_pets(&key)?;
    }

    let pet_id = first_id(&pets)?;
    expect_status(ctx.client.delete_pet(&key, &pet_id)?, 200)?;

    let after = ctx.my_pets(&key)?;
    ensure(
        !after.contains_id(&pet_id),
        format!("deleted pet {pet_id} is still listed"),
    )
}

pub fn update_own_pet_info(ctx: &ScenarioCtx) -> Result<()> {
    let key = ctx.key()?;
    let pet_id = first_id(&ctx.my_pets(&key)?)?;

    let resp = expect_status(
        ctx.client
            .update_pet_info(&key, &pet_id, "Мурзик", "Котэ", "5")?,
        200,
    )?;

    echoed_name(&resp.json()?, "Мурзик")
}

pub fn create_pet_simple_with_valid_data(ctx: &ScenarioCtx) -> Result<()> {
    let key = ctx.key()?;
    let resp = expect_status(
        ctx.client
            .create_pet_simple(&key, "Marsik", Some("scotchfold"), "4")?,
        200,
    )?;

    echoed_name(&resp.json()?, "Marsik")
}

pub fn set_photo_with_valid_image(ctx: &ScenarioCtx) -> Result<()> {
    let key = ctx.key()?;
    let pet_id = first_id(&own_pets_or_create(ctx, &key)?)?;

    let resp = expect_status(
        ctx.client
            .set_photo(&key, &pet_id, ctx.photo(VALID_PHOTO))?,
        200,
    )?;

    let pet: Pet = resp.json()?;
    ensure(pet.has_photo(), "pet_photo is empty after upload")
}

pub fn api_key_for_invalid_user(ctx: &ScenarioCtx) -> Result<()> {
    expect_status(
        ctx.client
            .get_api_key(INVALID_EMAIL, INVALID_PASSWORD)?,
        403,
    )?;
    Ok(())
}

pub fn create_pet_simple_without_animal_type(ctx: &ScenarioCtx) -> Result<()> {
    let key = ctx.key()?;
    expect_status(
        ctx.client
            .create_pet_simple(&key, "Мурзик", None, "4")?,
        400,
    )?;
    Ok(())
}

pub fn create_pet_simple_with_invalid_key(ctx: &ScenarioCtx) -> Result<()> {
    let key = AuthKey::new(INVALID_KEY);
    expect_status(
        ctx.client
            .create_pet_simple(&key, "Мурзик", Some("Кот"), "4")?,
        403,
    )?;
    Ok(())
}

pub fn all_pets_with_invalid_key(ctx: &ScenarioCtx) -> Result<()> {
    let key = AuthKey::new(INVALID_KEY);
    expect_status(ctx.client.get_list_of_pets(&key, PetFilter::All)?, 403)?;
    Ok(())
}

pub fn add_new_pet_without_animal_type(ctx: &ScenarioCtx) -> Result<()> {
    let key = ctx.key()?;
    expect_status(
        ctx.client
            .add_new_pet(&key, "NoneCat", None, "4", ctx.photo(VALID_PHOTO))?,
        400,
    )?;
    Ok(())
}

pub fn add_new_pet_with_invalid_key(ctx: &ScenarioCtx) -> Result<()> {
    let key = AuthKey::new(INVALID_KEY);
    expect_status(
        ctx.client.add_new_pet(
            &key,
            "SuperBig",
            Some("scotchfold"),
            "4",
            ctx.photo(VALID_PHOTO),
        )?,
        403,
    )?;
    Ok(())
}

pub fn set_photo_with_non_image(ctx: &ScenarioCtx) -> Result<()> {
    let key = ctx.key()?;
    let pet_id = first_id(&own_pets_or_create(ctx, &key)?)?;

    expect_status(
        ctx.client
            .set_photo(&key, &pet_id, ctx.photo(NOT_A_PHOTO))?,
        400,
    )?;
    Ok(())
}

pub fn set_photo_with_invalid_key(ctx: &ScenarioCtx) -> Result<()> {
    let key = ctx.key()?;
    let pet_id = first_id(&own_pets_or_create(ctx, &key)?)?;

    let bad_key = AuthKey::new(INVALID_KEY);
    expect_status(
        ctx.client
            .set_photo(&bad_key, &pet_id, ctx.photo(VALID_PHOTO))?,
        403,
    )?;
    Ok(())
}

pub fn my_pets_filter_returns_own_pets(ctx: &ScenarioCtx) -> Result<()> {
    let key = ctx.key()?;
    let resp = expect_status(
        ctx.client
            .create_pet_simple(&key, "Барсик", Some("кот"), "2")?,
        200,
    )?;
    let created: Pet = resp.json()?;

    let pets = ctx.my_pets(&key)?;
    ensure(
        pets.contains_id(&created.id),
        format!("created pet {} missing from my_pets", created.id),
    )?;

    if let Some(foreign) = pets
        .pets
        .iter()
        .find(|pet| pet.user_id != created.user_id)
    {
        return Err(ScenarioError::Assertion(format!(
            "my_pets lists pet {} owned by {:?}, expected owner {:?}",
            foreign.id, foreign.user_id, created.user_id
        )));
    }

    let unique: HashSet<&str> = pets.ids().collect();
    ensure(
        unique.len() == pets.len(),
        "my_pets lists the same pet more than once",
    )
}
