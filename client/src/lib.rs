#![allow(clippy::result_large_err)]

use std::path::{Path, PathBuf};

use petfriends_core::{AuthKey, Credentials, PetFilter, PetList, Settings};
use reqwest::blocking::{Request, multipart::Form};
use secrecy::ExposeSecret;

mod photo;
mod response;

pub use photo::mime_for;
pub use response::{ApiResponse, Body};

pub const AUTH_KEY_HEADER: &str = "auth_key";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("cannot read photo {}: {source}", path.display())]
    Photo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unexpected {} response: {body}", status.as_u16())]
    UnexpectedBody {
        status: reqwest::StatusCode,
        body: Body,
    },
    #[error("{0}")]
    Core(#[from] petfriends_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Blocking client for the PetFriends REST API.
///
/// Every operation maps to exactly one HTTP request and returns the status and
/// decoded body as-is. Nothing is validated or retried locally.
#[derive(Clone, Debug)]
pub struct PetFriends {
    client: reqwest::blocking::Client,
    base_url: url::Url,
}

impl PetFriends {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = url::Url::parse(base_url)?;

        // `Url::join` replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: reqwest::blocking::Client::new(),
            base_url,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.base_url)
    }

    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    pub fn url(
        &self,
        path: &str,
    ) -> Result<url::Url> {
        Ok(self.base_url.join(path)?)
    }

    pub fn perform(
        &self,
        operation: &'static str,
        request: Request,
    ) -> Result<ApiResponse> {
        tracing::debug!(
            operation,
            method = %request.method(),
            url = %request.url(),
            "sending request"
        );

        let resp = self.client.execute(request)?;

        let status = resp.status();
        let body = resp.bytes()?;

        tracing::debug!(operation, status = status.as_u16(), "received response");

        Ok(ApiResponse::new(status, Body::from_bytes(&body)))
    }

    /// `GET api/key`. The body holds `"key"` on 200, the service answers 403
    /// for unknown credentials.
    pub fn get_api_key(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ApiResponse> {
        let request = self
            .client
            .get(self.url("api/key")?)
            .header("email", email)
            .header("password", password)
            .build()?;

        self.perform("get_api_key", request)
    }

    /// `GET api/pets?filter=`. The body holds a `"pets"` array on 200.
    pub fn get_list_of_pets(
        &self,
        auth_key: &AuthKey,
        filter: PetFilter,
    ) -> Result<ApiResponse> {
        let request = self
            .client
            .get(self.url("api/pets")?)
            .header(AUTH_KEY_HEADER, auth_key.expose())
            .query(&[("filter", filter.as_str())])
            .build()?;

        self.perform("get_list_of_pets", request)
    }

    /// `POST api/pets` as multipart with the photo attached. A `None`
    /// `animal_type` is left out of the form entirely.
    pub fn add_new_pet(
        &self,
        auth_key: &AuthKey,
        name: &str,
        animal_type: Option<&str>,
        age: &str,
        pet_photo: impl AsRef<Path>,
    ) -> Result<ApiResponse> {
        let mut form = Form::new().text("name", name.to_owned());
        if let Some(animal_type) = animal_type {
            form = form.text("animal_type", animal_type.to_owned());
        }
        let form = form
            .text("age", age.to_owned())
            .part("pet_photo", photo::photo_part(pet_photo.as_ref())?);

        let request = self
            .client
            .post(self.url("api/pets")?)
            .header(AUTH_KEY_HEADER, auth_key.expose())
            .multipart(form)
            .build()?;

        self.perform("add_new_pet", request)
    }

    /// `POST api/create_pet_simple` as a urlencoded form, no photo.
    pub fn create_pet_simple(
        &self,
        auth_key: &AuthKey,
        name: &str,
        animal_type: Option<&str>,
        age: &str,
    ) -> Result<ApiResponse> {
        let request = self
            .client
            .post(self.url("api/create_pet_simple")?)
            .header(AUTH_KEY_HEADER, auth_key.expose())
            .form(&pet_fields(name, animal_type, age))
            .build()?;

        self.perform("create_pet_simple", request)
    }

    /// `POST api/pets/set_photo/{pet_id}`, replacing any existing photo.
    pub fn set_photo(
        &self,
        auth_key: &AuthKey,
        pet_id: &str,
        pet_photo: impl AsRef<Path>,
    ) -> Result<ApiResponse> {
        let form = Form::new().part("pet_photo", photo::photo_part(pet_photo.as_ref())?);

        let request = self
            .client
            .post(self.url(&format!("api/pets/set_photo/{pet_id}"))?)
            .header(AUTH_KEY_HEADER, auth_key.expose())
            .multipart(form)
            .build()?;

        self.perform("set_photo", request)
    }

    /// `PUT api/pets/{pet_id}`.
    pub fn update_pet_info(
        &self,
        auth_key: &AuthKey,
        pet_id: &str,
        name: &str,
        animal_type: &str,
        age: &str,
    ) -> Result<ApiResponse> {
        let request = self
            .client
            .put(self.url(&format!("api/pets/{pet_id}"))?)
            .header(AUTH_KEY_HEADER, auth_key.expose())
            .form(&pet_fields(name, Some(animal_type), age))
            .build()?;

        self.perform("update_pet_info", request)
    }

    /// `DELETE api/pets/{pet_id}`.
    pub fn delete_pet(
        &self,
        auth_key: &AuthKey,
        pet_id: &str,
    ) -> Result<ApiResponse> {
        let request = self
            .client
            .delete(self.url(&format!("api/pets/{pet_id}"))?)
            .header(AUTH_KEY_HEADER, auth_key.expose())
            .build()?;

        self.perform("delete_pet", request)
    }

    /// Fetches a key and decodes it, failing on anything but a 2xx with a
    /// `"key"` field.
    pub fn obtain_key(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthKey> {
        let resp = self.get_api_key(&credentials.email, credentials.password.expose_secret())?;
        if !resp.is_success() {
            return Err(resp.unexpected());
        }
        resp.json()
    }

    /// Lists pets and decodes the `"pets"` array, failing on non-2xx.
    pub fn list_pets(
        &self,
        auth_key: &AuthKey,
        filter: PetFilter,
    ) -> Result<PetList> {
        let resp = self.get_list_of_pets(auth_key, filter)?;
        if !resp.is_success() {
            return Err(resp.unexpected());
        }
        resp.json()
    }
}

fn pet_fields<'a>(
    name: &'a str,
    animal_type: Option<&'a str>,
    age: &'a str,
) -> Vec<(&'static str, &'a str)> {
    let mut fields = vec![("name", name)];
    if let Some(animal_type) = animal_type {
        fields.push(("animal_type", animal_type));
    }
    fields.push(("age", age));
    fields
}
