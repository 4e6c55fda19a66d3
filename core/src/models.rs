use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};

/// Key issued by `GET api/key`. Sent back as the `auth_key` header on every
/// other call; the server alone decides whether it is valid.
#[derive(Deserialize, Clone, Debug)]
pub struct AuthKey {
    key: SecretString,
}

impl AuthKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: SecretString::from(key.into()),
        }
    }

    pub fn expose(&self) -> &str {
        self.key.expose_secret()
    }
}

/// Account email and password used to obtain an [`AuthKey`].
#[derive(Deserialize, Clone, Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// A pet record as the service returns it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    #[serde(deserialize_with = "string_or_number")]
    pub age: String,
    /// `data:image/...;base64,` URI, empty when no photo was uploaded.
    #[serde(default)]
    pub pet_photo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Pet {
    pub fn has_photo(&self) -> bool {
        !self.pet_photo.is_empty()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PetList {
    pub pets: Vec<Pet>,
}

impl PetList {
    pub fn is_empty(&self) -> bool {
        self.pets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pets.len()
    }

    pub fn first(&self) -> Option<&Pet> {
        self.pets.first()
    }

    pub fn find(
        &self,
        id: &str,
    ) -> Option<&Pet> {
        self.pets.iter().find(|pet| pet.id == id)
    }

    pub fn contains_id(
        &self,
        id: &str,
    ) -> bool {
        self.find(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.pets.iter().map(|pet| pet.id.as_str())
    }
}

/// Value of the `filter` query parameter on `GET api/pets`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PetFilter {
    #[default]
    #[serde(rename = "")]
    All,
    #[serde(rename = "my_pets")]
    MyPets,
}

impl PetFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            PetFilter::All => "",
            PetFilter::MyPets => "my_pets",
        }
    }
}

impl std::fmt::Display for PetFilter {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PetFilter {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "all" => Ok(PetFilter::All),
            "my_pets" => Ok(PetFilter::MyPets),
            other => Err(crate::Error::UnknownFilter(other.to_string())),
        }
    }
}

// the service has returned age both as "4" and as 4
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>, {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}
