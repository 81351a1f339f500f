use std::fs;
use std::path::{Path, PathBuf};

use crate::mapping::*;

#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// "table" or "http".
    pub provider: String,
    #[serde(rename = "tablePath")]
    pub table_path: Option<String>,
    pub endpoint: Option<String>,
    /// Name of the environment variable holding the API key.
    #[serde(rename = "apiKeyEnv")]
    pub api_key_env: Option<String>,
}

#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub capacity: u32,
    #[serde(rename = "windowSeconds")]
    pub window_seconds: u64,
}

#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(rename = "maxRetries")]
    pub max_retries: Option<u32>,
    #[serde(rename = "backoffMillis")]
    pub backoff_millis: Option<u64>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub radius: f64,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(rename = "individualsFile")]
    pub individuals_file: Option<String>,
    #[serde(rename = "activitiesFile")]
    pub activities_file: Option<String>,
    #[serde(rename = "individualsWorksheet")]
    pub individuals_worksheet: Option<String>,
    #[serde(rename = "activitiesWorksheet")]
    pub activities_worksheet: Option<String>,
    pub geocoder: Option<GeocoderConfig>,
    #[serde(rename = "minMatches")]
    pub min_matches: Option<usize>,
    #[serde(rename = "rateLimit")]
    pub rate_limit: Option<RateLimitConfig>,
    pub retry: Option<RetryConfig>,
    pub layout: Option<LayoutConfig>,
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
}

impl RunConfig {
    /// Makes every path of the configuration relative to the given directory.
    pub fn relative_to(mut self, root: &Path) -> RunConfig {
        let join = |p: Option<String>| p.map(|s| join_path(root, &s));
        self.individuals_file = join(self.individuals_file);
        self.activities_file = join(self.activities_file);
        self.output_file = self.output_file.map(|s| {
            if s.is_empty() || s == "stdout" {
                s
            } else {
                join_path(root, &s)
            }
        });
        if let Some(g) = self.geocoder.as_mut() {
            g.table_path = g.table_path.take().map(|s| join_path(root, &s));
        }
        self
    }

    /// The policy settings, starting from the defaults.
    pub fn settings(&self) -> MapResult<MapSettings> {
        let mut settings = MapSettings::DEFAULT_SETTINGS;
        if let Some(m) = self.min_matches {
            settings.min_matches = m;
        }
        if let Some(rl) = &self.rate_limit {
            settings.rate_limit = RateLimitSettings {
                capacity: rl.capacity,
                window: Duration::from_secs(rl.window_seconds),
            };
        }
        if let Some(r) = &self.retry {
            if let Some(x) = r.max_retries {
                settings.geocode.max_retries = x;
            }
            if let Some(x) = r.backoff_millis {
                settings.geocode.backoff = Duration::from_millis(x);
            }
        }
        if let Some(l) = &self.layout {
            settings.layout = LayoutSettings { radius: l.radius };
        }
        settings.validate().context(LibrarySnafu {})?;
        Ok(settings)
    }
}

fn join_path(root: &Path, p: &str) -> String {
    let full: PathBuf = root.join(p);
    full.display().to_string()
}

pub fn read_config(path: &str) -> MapResult<RunConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: RunConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    let root = Path::new(path)
        .parent()
        .context(MissingParentDirSnafu { path })?;
    Ok(config.relative_to(root))
}

pub fn read_summary(path: &str) -> MapResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
