//! mockito-backed stand-in for the PetFriends service.
//!
//! Each helper stages one endpoint and returns the [`Mock`] so tests can
//! `assert()` it was hit or `remove()` it before staging the next state.
//! Helpers only ever match on the exact key/credentials they are given, so
//! a test staging both a success and a rejection never sees them overlap.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use mockito::{Matcher, Mock, Server, ServerGuard};
use petfriends_core::{Pet, PetFilter};
use serde_json::json;

const FORBIDDEN_PAGE: &str = "<!doctype html>\n<title>403 Forbidden</title>\n<h1>Forbidden</h1>\n<p>Please provide 'auth_key' Header</p>\n";
const BAD_REQUEST_PAGE: &str = "<!doctype html>\n<title>400 Bad Request</title>\n<h1>Bad Request</h1>\n<p>The browser (or proxy) sent a request that this server could not understand.</p>\n";

pub struct MockPetFriends {
    server: ServerGuard,
}

impl MockPetFriends {
    pub fn new() -> Self {
        crate::logging();

        Self {
            server: Server::new(),
        }
    }

    pub fn url(&self) -> String {
        self.server.url()
    }

    /// `GET /api/key` answering 200 with `key` for exactly these credentials.
    pub fn api_key(
        &mut self,
        email: &str,
        password: &str,
        key: &str,
    ) -> Mock {
        self.server
            .mock("GET", "/api/key")
            .match_header("email", email)
            .match_header("password", password)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "key": key }).to_string())
            .create()
    }

    /// `GET /api/key` answering 403 for exactly these credentials.
    pub fn api_key_forbidden(
        &mut self,
        email: &str,
        password: &str,
    ) -> Mock {
        self.server
            .mock("GET", "/api/key")
            .match_header("email", email)
            .match_header("password", password)
            .with_status(403)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(FORBIDDEN_PAGE)
            .create()
    }

    pub fn pets(
        &mut self,
        key: &str,
        filter: PetFilter,
        pets: &[Pet],
    ) -> Mock {
        self.server
            .mock("GET", "/api/pets")
            .match_header("auth_key", key)
            .match_query(Matcher::UrlEncoded(
                "filter".into(),
                filter.as_str().into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "pets": pets }).to_string())
            .create()
    }

    /// Like [`Self::pets`] but answers the n-th listing with `pages[n]`,
    /// repeating the last page once they run out. Lets a single scenario see
    /// the list change between calls (add-then-list, delete-then-list).
    pub fn pets_sequence(
        &mut self,
        key: &str,
        filter: PetFilter,
        pages: Vec<Vec<Pet>>,
    ) -> Mock {
        let served = Arc::new(AtomicUsize::new(0));

        self.server
            .mock("GET", "/api/pets")
            .match_header("auth_key", key)
            .match_query(Matcher::UrlEncoded(
                "filter".into(),
                filter.as_str().into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body_from_request(move |_| {
                let n = served.fetch_add(1, Ordering::SeqCst);
                let page = pages
                    .get(n)
                    .or(pages.last())
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                json!({ "pets": page }).to_string().into_bytes()
            })
            .create()
    }

    /// Multipart `POST /api/pets` carrying the pet's fields and a JPEG part.
    pub fn add_pet(
        &mut self,
        key: &str,
        pet: &Pet,
    ) -> Mock {
        self.server
            .mock("POST", "/api/pets")
            .match_header("auth_key", key)
            .match_body(Matcher::AllOf(vec![
                multipart_field("name", &pet.name),
                multipart_field("animal_type", &pet.animal_type),
                multipart_field("age", &pet.age),
                jpeg_part(),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!(pet).to_string())
            .create()
    }

    /// Urlencoded `POST /api/create_pet_simple`.
    pub fn create_pet_simple(
        &mut self,
        key: &str,
        pet: &Pet,
    ) -> Mock {
        self.server
            .mock("POST", "/api/create_pet_simple")
            .match_header("auth_key", key)
            .match_body(pet_form(pet))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!(pet).to_string())
            .create()
    }

    /// Multipart `POST /api/pets/set_photo/{id}`; answers with `pet`, which
    /// should already carry a photo.
    pub fn set_photo(
        &mut self,
        key: &str,
        pet: &Pet,
    ) -> Mock {
        self.server
            .mock("POST", format!("/api/pets/set_photo/{}", pet.id).as_str())
            .match_header("auth_key", key)
            .match_body(jpeg_part())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!(pet).to_string())
            .create()
    }

    pub fn update_pet(
        &mut self,
        key: &str,
        pet: &Pet,
    ) -> Mock {
        self.server
            .mock("PUT", format!("/api/pets/{}", pet.id).as_str())
            .match_header("auth_key", key)
            .match_body(pet_form(pet))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!(pet).to_string())
            .create()
    }

    /// The service answers a delete with 200 and an empty body.
    pub fn delete_pet(
        &mut self,
        key: &str,
        pet_id: &str,
    ) -> Mock {
        self.server
            .mock("DELETE", format!("/api/pets/{pet_id}").as_str())
            .match_header("auth_key", key)
            .with_status(200)
            .create()
    }

    pub fn forbidden(
        &mut self,
        method: &str,
        path: &str,
        key: &str,
    ) -> Mock {
        self.server
            .mock(method, path)
            .match_query(Matcher::Any)
            .match_header("auth_key", key)
            .with_status(403)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(FORBIDDEN_PAGE)
            .create()
    }

    /// Like [`Self::bad_request`], but keeps every body it answered so a
    /// test can check what was left out of it.
    pub fn bad_request_recorded(
        &mut self,
        method: &str,
        path: &str,
        key: &str,
        body: Matcher,
    ) -> (Mock, Recorded) {
        let recorded = Recorded::default();
        let sink = recorded.clone();

        let mock = self
            .server
            .mock(method, path)
            .match_header("auth_key", key)
            .match_body(body)
            .with_status(400)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body_from_request(move |request| {
                sink.push(request.body().map(Vec::clone).unwrap_or_default());
                BAD_REQUEST_PAGE.as_bytes().to_vec()
            })
            .create();

        (mock, recorded)
    }

    /// 400 for any request with this key whose body matches `body`.
    pub fn bad_request(
        &mut self,
        method: &str,
        path: &str,
        key: &str,
        body: Matcher,
    ) -> Mock {
        self.server
            .mock(method, path)
            .match_header("auth_key", key)
            .match_body(body)
            .with_status(400)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(BAD_REQUEST_PAGE)
            .create()
    }
}

/// Request bodies seen by a staged mock, oldest first.
#[derive(Clone, Default)]
pub struct Recorded(Arc<Mutex<Vec<Vec<u8>>>>);

impl Recorded {
    fn push(
        &self,
        body: Vec<u8>,
    ) {
        if let Ok(mut bodies) = self.0.lock() {
            bodies.push(body);
        }
    }

    pub fn bodies(&self) -> Vec<String> {
        self.0
            .lock()
            .map(|bodies| {
                bodies
                    .iter()
                    .map(|body| String::from_utf8_lossy(body).into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.bodies().pop()
    }
}

impl Default for MockPetFriends {
    fn default() -> Self {
        Self::new()
    }
}

/// Text part `name` holding exactly `value`.
pub fn multipart_field(
    name: &str,
    value: &str,
) -> Matcher {
    Matcher::Regex(format!(
        r#"name="{}"\r\n\r\n{}\r\n"#,
        regex::escape(name),
        regex::escape(value)
    ))
}

/// Whether a multipart `body` carries a part named `name`, whatever its value.
pub fn has_multipart_field(
    body: &str,
    name: &str,
) -> bool {
    regex::Regex::new(&format!(r#"name="{}"(;|\r\n)"#, regex::escape(name)))
        .is_ok_and(|re| re.is_match(body))
}

/// File part `pet_photo` sent as `image/jpeg`.
pub fn jpeg_part() -> Matcher {
    Matcher::Regex(r#"(?s)name="pet_photo"; filename="[^"]+"\r\n(?i:content-type): image/jpeg"#.into())
}

fn pet_form(pet: &Pet) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("name".into(), pet.name.clone()),
        Matcher::UrlEncoded("animal_type".into(), pet.animal_type.clone()),
        Matcher::UrlEncoded("age".into(), pet.age.clone()),
    ])
}
