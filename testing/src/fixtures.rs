use petfriends_core::{AuthKey, Credentials, Pet};

pub const VALID_EMAIL: &str = "qa@petfriends.test";
pub const VALID_PASSWORD: &str = "correct-horse";
pub const VALID_KEY: &str = "ea738148a1f19838e1c5d1413877f3691a3731380e733e877b0ae729";

pub const INVALID_EMAIL: &str = "vasja@pupkin.com";
pub const INVALID_PASSWORD: &str = "00000000";
pub const INVALID_KEY: &str = "12345";

pub const VALID_PHOTO: &str = "cat1.jpg";
pub const NOT_A_PHOTO: &str = "not_photo.jpg";

pub const PHOTO_DATA_URI: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRgABAQEASABIAAD/2w==";

pub fn valid_credentials() -> Credentials {
    Credentials::new(VALID_EMAIL, VALID_PASSWORD)
}

pub fn invalid_credentials() -> Credentials {
    Credentials::new(INVALID_EMAIL, INVALID_PASSWORD)
}

pub fn valid_key() -> AuthKey {
    AuthKey::new(VALID_KEY)
}

pub fn invalid_key() -> AuthKey {
    AuthKey::new(INVALID_KEY)
}

pub fn pet(
    id: &str,
    name: &str,
    animal_type: &str,
    age: &str,
) -> Pet {
    Pet {
        id: id.into(),
        name: name.into(),
        animal_type: animal_type.into(),
        age: age.into(),
        pet_photo: String::new(),
        user_id: Some("owner-1".into()),
        created_at: Some("1700000000.0".into()),
    }
}

pub fn with_photo(mut pet: Pet) -> Pet {
    pet.pet_photo = PHOTO_DATA_URI.into();
    pet
}
