use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use petfriends_client::{ApiResponse, Body, PetFriends};
use petfriends_core::{AuthKey, Credentials, PetFilter, PetList, Settings};

pub mod fixtures;
pub mod scenarios;

pub use scenarios::catalog;

#[derive(thiserror::Error, Debug)]
pub enum ScenarioError {
    #[error("{0}")]
    Client(#[from] petfriends_client::Error),
    #[error("expected status {expected}, got {actual}: {body}")]
    UnexpectedStatus { expected: u16, actual: u16, body: Body },
    #[error("assertion failed: {0}")]
    Assertion(String),
    #[error("precondition not met: {0}")]
    Precondition(String),
    #[error("cannot unpack the bundled photos: {0}")]
    Assets(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScenarioError>;

/// Fails with [`ScenarioError::UnexpectedStatus`] unless `resp` has `expected`.
pub fn expect_status(
    resp: ApiResponse,
    expected: u16,
) -> Result<ApiResponse> {
    let actual = resp.status().as_u16();
    if actual == expected {
        Ok(resp)
    } else {
        let (_, body) = resp.into_parts();
        Err(ScenarioError::UnexpectedStatus {
            expected,
            actual,
            body,
        })
    }
}

pub fn ensure(
    condition: bool,
    message: impl Into<String>,
) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(ScenarioError::Assertion(message.into()))
    }
}

/// What every scenario runs against: a client, the account it may use, and
/// where the photo fixtures live.
pub struct ScenarioCtx {
    pub client: PetFriends,
    pub credentials: Credentials,
    pub images_dir: PathBuf,
    // keeps unpacked photos alive for as long as the context
    _photos: Option<tempfile::TempDir>,
}

impl ScenarioCtx {
    pub fn new(
        client: PetFriends,
        credentials: Credentials,
        images_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            credentials,
            images_dir: images_dir.into(),
            _photos: None,
        }
    }

    /// Runs against the photos compiled into this crate.
    pub fn with_bundled_photos(
        client: PetFriends,
        credentials: Credentials,
    ) -> Result<Self> {
        let photos = fixtures::unpack_photos()?;
        Ok(Self {
            client,
            credentials,
            images_dir: photos.path().to_path_buf(),
            _photos: Some(photos),
        })
    }

    /// Uses `settings.images_dir` when set, the bundled photos otherwise.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = PetFriends::from_settings(settings)?;
        match &settings.images_dir {
            Some(dir) => Ok(Self::new(client, settings.credentials(), dir)),
            None => Self::with_bundled_photos(client, settings.credentials()),
        }
    }

    pub fn photo(
        &self,
        name: &str,
    ) -> PathBuf {
        self.images_dir.join(name)
    }

    pub fn key(&self) -> Result<AuthKey> {
        Ok(self.client.obtain_key(&self.credentials)?)
    }

    pub fn my_pets(
        &self,
        key: &AuthKey,
    ) -> Result<PetList> {
        Ok(self.client.list_pets(key, PetFilter::MyPets)?)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    /// Basic reachability of the service.
    Smoke,
    /// Key issuing and key checks.
    Auth,
    Listing,
    Create,
    Update,
    Delete,
    Photo,
    /// The service is expected to reject the call.
    Negative,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, bon::Builder)]
#[serde(rename_all = "snake_case")]
pub struct ScenarioMetadata {
    #[builder(into)]
    pub id: String,

    #[builder(into)]
    pub name: String,

    #[builder(into)]
    pub purpose: String,

    pub tags: Vec<Tag>,
}

pub type ScenarioFn = fn(&ScenarioCtx) -> Result<()>;

#[derive(Clone)]
pub struct Scenario {
    pub metadata: ScenarioMetadata,
    pub run: ScenarioFn,
}

impl Scenario {
    pub fn new(
        metadata: ScenarioMetadata,
        run: ScenarioFn,
    ) -> Self {
        Self { metadata, run }
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, bon::Builder)]
#[serde(rename_all = "snake_case")]
pub struct ScenarioResult {
    pub metadata: ScenarioMetadata,
    pub passed: bool,
    pub error_message: Option<String>,
    pub elapsed_ms: u64,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Scenario,
    Summary,
}

/// One line of the JSONL report.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
#[serde(rename_all = "snake_case")]
pub struct ScenarioReport<T> {
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub content: T,
}

impl<T> ScenarioReport<T> {
    pub fn scenario(content: T) -> Self {
        Self {
            report_type: ReportType::Scenario,
            content,
        }
    }

    pub fn summary(content: T) -> Self {
        Self {
            report_type: ReportType::Summary,
            content,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl Summary {
    pub fn of(results: &[ScenarioResult]) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
        }
    }
}

#[tracing::instrument(skip_all, fields(
    scenario_id = %scenario.metadata.id,
    scenario_name = %scenario.metadata.name
))]
pub fn run_scenario(
    ctx: &ScenarioCtx,
    scenario: &Scenario,
) -> ScenarioResult {
    let started = Instant::now();
    let outcome = (scenario.run)(ctx);
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match &outcome {
        Ok(()) => tracing::info!(elapsed_ms, "scenario passed"),
        Err(err) => tracing::error!(elapsed_ms, error = %err, "scenario failed"),
    }

    ScenarioResult::builder()
        .metadata(scenario.metadata.clone())
        .passed(outcome.is_ok())
        .maybe_error_message(outcome.err().map(|err| err.to_string()))
        .elapsed_ms(elapsed_ms)
        .build()
}

/// Runs the catalog in order. With a non-empty `only`, runs just the
/// scenarios whose id is listed.
pub fn run_all(
    ctx: &ScenarioCtx,
    only: &[String],
) -> Vec<ScenarioResult> {
    catalog()
        .iter()
        .filter(|scenario| only.is_empty() || only.iter().any(|id| id == scenario.id()))
        .map(|scenario| run_scenario(ctx, scenario))
        .collect()
}

/// Appends one `scenario` line per result and a closing `summary` line.
pub fn write_report(
    path: impl AsRef<Path>,
    results: &[ScenarioResult],
) -> std::io::Result<()> {
    let path = path.as_ref();

    serde_jsonlines::append_json_lines(path, results.iter().map(ScenarioReport::scenario))?;
    serde_jsonlines::append_json_lines(path, [ScenarioReport::summary(Summary::of(results))])?;

    tracing::debug!(report = %path.display(), scenarios = results.len(), "wrote report");

    Ok(())
}
