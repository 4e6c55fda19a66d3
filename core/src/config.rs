use std::path::{Path, PathBuf};

use ::config::{Environment, File};
use secrecy::SecretString;
use serde::{Deserialize, de::DeserializeOwned};
use validator::Validate;

use crate::{Error, models::Credentials};

pub const DEFAULT_BASE_URL: &str = "https://petfriends.skillfactory.ru/";

/// Loads `Self` from `<dir>/<NAME>.{toml,..}` (optional) overlaid with
/// `<ENV>_*` environment variables, then validates it.
pub trait LoadConfig
where
    Self: Sized + DeserializeOwned + Validate, {
    const NAME: &'static str;
    const ENV: &'static str;

    fn path<S: AsRef<Path>>(dir: Option<S>) -> PathBuf {
        dir.map(|s| s.as_ref().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./"))
            .join(Self::NAME)
    }

    fn load<S: AsRef<Path>>(dir: Option<S>) -> crate::Result<Self> {
        let file_name = format!("{}", Self::path(dir).display());

        tracing::debug!(file = %file_name, env = Self::ENV, "loading configuration");

        let this: Self = ::config::Config::builder()
            .add_source(File::with_name(&file_name).required(false))
            .add_source(Environment::with_prefix(Self::ENV).prefix_separator("_"))
            .build()
            .map_err(Error::from_with_source_init(file_name.clone()))?
            .try_deserialize()
            .map_err(Error::from_with_source_init(file_name.clone()))?;

        this.validate()
            .map_err(Error::from_with_source_init(file_name.clone()))?;

        Ok(this)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

#[derive(Deserialize, Debug, Clone, Validate)]
pub struct Settings {
    #[validate(url)]
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[validate(email)]
    pub email: String,

    pub password: SecretString,

    /// Directory holding the photo fixtures used by the scenario catalog.
    #[serde(default)]
    pub images_dir: Option<PathBuf>,
}

impl Settings {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

impl LoadConfig for Settings {
    const NAME: &'static str = "petfriends";
    const ENV: &'static str = "PF";
}
