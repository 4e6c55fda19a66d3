use std::{path::PathBuf, process::ExitCode};

use petfriends_client::{ApiResponse, PetFriends};
use petfriends_core::{
    AuthKey, Credentials, LoadConfig, PetFilter, Settings, config::DEFAULT_BASE_URL,
};
use petfriends_test_suite::{ScenarioCtx, ScenarioError, ScenarioResult, Summary, catalog};
use secrecy::{ExposeSecret, SecretString};

#[derive(thiserror::Error, Debug, miette::Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(
        code(petfriends::config),
        help("set PF_EMAIL and PF_PASSWORD, or write them to petfriends.toml")
    )]
    Config(#[from] petfriends_core::Error),

    #[error(transparent)]
    #[diagnostic(code(petfriends::client))]
    Client(#[from] petfriends_client::Error),

    #[error(transparent)]
    #[diagnostic(code(petfriends::suite))]
    Suite(#[from] ScenarioError),

    #[error("unknown scenario '{id}'")]
    #[diagnostic(code(petfriends::unknown_scenario), help("known scenarios: {known}"))]
    UnknownScenario { id: String, known: String },

    #[error("cannot write report {}", path.display())]
    #[diagnostic(code(petfriends::report))]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CliError>;

fn known_ids() -> String {
    catalog()
        .iter()
        .map(|scenario| scenario.id().to_owned())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Default, clap::ValueEnum, Clone, Debug)]
pub enum LogLevel {
    Debug,
    Trace,
    #[default]
    Info,
    Error,
    Warn,
}

impl From<LogLevel> for tracing::Level {
    fn from(val: LogLevel) -> Self {
        match val {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
        }
    }
}

#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "petfriends", version, about = "PetFriends API client and acceptance suite")]
pub struct Cli {
    #[clap(
        long,
        global = true,
        default_value = "error",
        env = "LOG_LEVEL",
        help = "the verbosity level to print logs at."
    )]
    pub log_level: LogLevel,

    #[clap(flatten)]
    config: WithConfig,

    #[clap(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> Result<ExitCode> {
        match &self.command {
            Command::Key(args) => {
                let (client, credentials) = match (&args.email, &args.password) {
                    (Some(email), Some(password)) => {
                        let base_url = self
                            .config
                            .base_url
                            .as_deref()
                            .unwrap_or(DEFAULT_BASE_URL);
                        (
                            PetFriends::new(base_url)?,
                            Credentials::new(email.as_str(), password.as_str()),
                        )
                    },
                    (email, password) => {
                        let settings = self.config.settings()?;
                        let mut credentials = settings.credentials();
                        if let Some(email) = email {
                            credentials.email = email.clone();
                        }
                        if let Some(password) = password {
                            credentials.password = SecretString::from(password.clone());
                        }
                        (PetFriends::from_settings(&settings)?, credentials)
                    },
                };

                print_response(client.get_api_key(
                    &credentials.email,
                    credentials.password.expose_secret(),
                )?);
                Ok(ExitCode::SUCCESS)
            },
            Command::List(args) => {
                let (client, key) = self.config.authorized()?;
                print_response(client.get_list_of_pets(&key, args.filter.into())?);
                Ok(ExitCode::SUCCESS)
            },
            Command::Add(args) => {
                let (client, key) = self.config.authorized()?;
                print_response(client.add_new_pet(
                    &key,
                    &args.name,
                    args.animal_type.as_deref(),
                    &args.age,
                    &args.photo,
                )?);
                Ok(ExitCode::SUCCESS)
            },
            Command::Create(args) => {
                let (client, key) = self.config.authorized()?;
                print_response(client.create_pet_simple(
                    &key,
                    &args.name,
                    args.animal_type.as_deref(),
                    &args.age,
                )?);
                Ok(ExitCode::SUCCESS)
            },
            Command::SetPhoto(args) => {
                let (client, key) = self.config.authorized()?;
                print_response(client.set_photo(&key, &args.pet_id, &args.photo)?);
                Ok(ExitCode::SUCCESS)
            },
            Command::Update(args) => {
                let (client, key) = self.config.authorized()?;
                print_response(client.update_pet_info(
                    &key,
                    &args.pet_id,
                    &args.name,
                    &args.animal_type,
                    &args.age,
                )?);
                Ok(ExitCode::SUCCESS)
            },
            Command::Delete(args) => {
                let (client, key) = self.config.authorized()?;
                print_response(client.delete_pet(&key, &args.pet_id)?);
                Ok(ExitCode::SUCCESS)
            },
            Command::Suite(args) => self.config.suite(args),
        }
    }
}

#[derive(clap::Subcommand, Debug, Clone)]
enum Command {
    #[clap(alias = "k")]
    /// fetches an auth key for the configured (or given) credentials
    Key(KeyArgs),

    #[clap(alias = "ls")]
    /// lists pets
    List(ListArgs),

    /// adds a pet with a photo
    Add(AddArgs),

    /// creates a pet without a photo
    Create(CreateArgs),

    /// sets the photo of an existing pet
    SetPhoto(SetPhotoArgs),

    /// updates the name, animal type and age of a pet
    Update(UpdateArgs),

    #[clap(alias = "rm")]
    /// deletes a pet
    Delete(DeleteArgs),

    /// runs the acceptance scenarios against the configured service
    Suite(SuiteArgs),
}

#[derive(clap::Args, Debug, Clone)]
struct WithConfig {
    #[clap(
        short = 'd',
        long = "config-dir",
        global = true,
        help = "the directory holding petfriends.toml."
    )]
    config_dir: Option<PathBuf>,

    #[clap(
        long,
        global = true,
        env = "PF_BASE_URL",
        help = "the base url of the PetFriends service."
    )]
    base_url: Option<String>,
}

impl WithConfig {
    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config_dir.as_deref())?;
        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }
        Ok(settings)
    }

    /// A client for the configured service and a key for the configured account.
    fn authorized(&self) -> Result<(PetFriends, AuthKey)> {
        let settings = self.settings()?;
        let client = PetFriends::from_settings(&settings)?;
        let key = client.obtain_key(&settings.credentials())?;
        Ok((client, key))
    }

    fn suite(
        &self,
        args: &SuiteArgs,
    ) -> Result<ExitCode> {
        let ids = catalog();
        if let Some(unknown) = args
            .only
            .iter()
            .find(|id| !ids.iter().any(|scenario| scenario.id() == id.as_str()))
        {
            return Err(CliError::UnknownScenario {
                id: unknown.clone(),
                known: known_ids(),
            });
        }

        let ctx = ScenarioCtx::from_settings(&self.settings()?)?;
        let results = petfriends_test_suite::run_all(&ctx, &args.only);

        for result in &results {
            print_result(result);
        }

        let summary = Summary::of(&results);
        println!(
            "{} scenarios, {} passed, {} failed",
            summary.total, summary.passed, summary.failed
        );

        if let Some(path) = &args.report {
            petfriends_test_suite::write_report(path, &results).map_err(|source| {
                CliError::Report {
                    path: path.clone(),
                    source,
                }
            })?;
        }

        Ok(if summary.failed == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}

fn print_response(resp: ApiResponse) {
    println!("{}", resp.status());
    println!("{}", resp.body());
}

fn print_result(result: &ScenarioResult) {
    match &result.error_message {
        None => println!("PASS {} ({} ms)", result.metadata.id, result.elapsed_ms),
        Some(message) => {
            println!(
                "FAIL {} ({} ms): {message}",
                result.metadata.id, result.elapsed_ms
            )
        },
    }
}

#[derive(clap::ValueEnum, Default, Debug, Clone, Copy)]
enum FilterArg {
    #[default]
    All,
    MyPets,
}

impl From<FilterArg> for PetFilter {
    fn from(val: FilterArg) -> Self {
        match val {
            FilterArg::All => PetFilter::All,
            FilterArg::MyPets => PetFilter::MyPets,
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
struct KeyArgs {
    #[clap(long, help = "overrides the configured email.")]
    email: Option<String>,

    #[clap(long, help = "overrides the configured password.")]
    password: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
struct ListArgs {
    #[clap(short, long, value_enum, default_value_t = FilterArg::All)]
    filter: FilterArg,
}

#[derive(clap::Args, Debug, Clone)]
struct AddArgs {
    #[clap(short, long)]
    name: String,

    #[clap(short = 't', long, help = "left out of the request when absent.")]
    animal_type: Option<String>,

    #[clap(short, long)]
    age: String,

    #[clap(short, long, help = "path to the photo to upload.")]
    photo: PathBuf,
}

#[derive(clap::Args, Debug, Clone)]
struct CreateArgs {
    #[clap(short, long)]
    name: String,

    #[clap(short = 't', long, help = "left out of the request when absent.")]
    animal_type: Option<String>,

    #[clap(short, long)]
    age: String,
}

#[derive(clap::Args, Debug, Clone)]
struct SetPhotoArgs {
    #[clap(short = 'i', long)]
    pet_id: String,

    #[clap(short, long, help = "path to the photo to upload.")]
    photo: PathBuf,
}

#[derive(clap::Args, Debug, Clone)]
struct UpdateArgs {
    #[clap(short = 'i', long)]
    pet_id: String,

    #[clap(short, long)]
    name: String,

    #[clap(short = 't', long)]
    animal_type: String,

    #[clap(short, long)]
    age: String,
}

#[derive(clap::Args, Debug, Clone)]
struct DeleteArgs {
    #[clap(short = 'i', long)]
    pet_id: String,
}

#[derive(clap::Args, Debug, Clone)]
struct SuiteArgs {
    #[clap(short, long, help = "appends a JSON line per scenario and a summary to this file.")]
    report: Option<PathBuf>,

    #[clap(long, help = "runs only these scenario ids, in catalog order.")]
    only: Vec<String>,
}
