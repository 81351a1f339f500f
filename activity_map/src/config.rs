// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::time::Duration;

/// One row of cells as decoded from a spreadsheet, before the column names are known.
pub type RawRow = Vec<String>;

/// A data row, keyed by the column names found in the header row.
///
/// The keys are kept in the order in which they appeared in the file: field lookups
/// scan them in that order, so the first physical column wins when several columns
/// could answer the same field.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Record {
        Record { fields: Vec::new() }
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Record
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Record {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    /// The (column name, value) pairs, in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when every value is blank (or there are no values at all).
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.trim().is_empty())
    }
}

/// A geographic coordinate, in degrees.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> LatLng {
        LatLng { lat, lng }
    }

    /// A coordinate that can be placed on a map: finite and within the usual bounds.
    pub fn is_usable(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// The kinds of activities that can be placed on the map.
///
/// The declaration order is the display order of the type counts.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum ActivityType {
    ChildrensClass,
    JuniorYouthGroup,
    StudyCircle,
    Devotional,
}

impl ActivityType {
    pub const ALL: [ActivityType; 4] = [
        ActivityType::ChildrensClass,
        ActivityType::JuniorYouthGroup,
        ActivityType::StudyCircle,
        ActivityType::Devotional,
    ];

    /// The short code used in markers and counts.
    pub fn code(&self) -> &'static str {
        match self {
            ActivityType::ChildrensClass => "CC",
            ActivityType::JuniorYouthGroup => "JY",
            ActivityType::StudyCircle => "SC",
            ActivityType::Devotional => "DM",
        }
    }

    /// Maps the free-text type found in an activities file onto the fixed vocabulary.
    /// Case, surrounding whitespace and repeated inner whitespace are ignored.
    pub fn from_label(label: &str) -> Option<ActivityType> {
        let cleaned = label
            .split_whitespace()
            .collect::<Vec<&str>>()
            .join(" ")
            .to_lowercase()
            .replace('\u{2019}', "'");
        match cleaned.as_str() {
            "children's class" => Some(ActivityType::ChildrensClass),
            "junior youth group" => Some(ActivityType::JuniorYouthGroup),
            "study circle" => Some(ActivityType::StudyCircle),
            "devotional" => Some(ActivityType::Devotional),
            _ => None,
        }
    }

    pub fn from_code(code: &str) -> Option<ActivityType> {
        ActivityType::ALL
            .iter()
            .find(|t| t.code().eq_ignore_ascii_case(code.trim()))
            .copied()
    }
}

impl Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// An activities row, with the fields needed for facilitator resolution pulled out.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ActivityRecord {
    /// The type as written in the file.
    pub activity_type_raw: String,
    /// None when the type is not part of the known vocabulary.
    pub activity_type: Option<ActivityType>,
    pub activity_name: String,
    /// The facilitator list as written in the file (semicolon separated).
    pub facilitators_raw: String,
    pub record: Record,
}

// ******** Output data structures *********

/// An individual whose home address was resolved to a coordinate.
#[derive(PartialEq, Debug, Clone)]
pub struct Individual {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub lat: f64,
    pub lng: f64,
    /// The human-readable address that was geocoded.
    pub address: String,
    /// The neighbourhood, or the "Other" sentinel when blank.
    pub neighbourhood: String,
    /// The original row.
    pub record: Record,
}

impl Individual {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// One marker per (facilitator, activity) pair.
#[derive(PartialEq, Debug, Clone)]
pub struct ActivityMarker {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub activity_type: ActivityType,
    pub facilitator_name: String,
    /// The home address of the facilitator.
    pub address: String,
    pub activity_name: String,
    pub facilitators_raw: String,
}

impl ActivityMarker {
    pub fn activity_type_code(&self) -> &'static str {
        self.activity_type.code()
    }
}

/// Errors for misuse of the library. Problems with the data itself are never reported
/// through this type: they are folded into counts and classification lists.
#[derive(PartialEq, Debug, Clone)]
pub enum MapError {
    /// The header index does not point inside the rows.
    HeaderOutOfRange { index: usize, rows: usize },
    /// A policy setting cannot be used.
    InvalidSettings(String),
}

impl Error for MapError {}

impl Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::HeaderOutOfRange { index, rows } => write!(
                f,
                "header row {} is out of range ({} rows available)",
                index, rows
            ),
            MapError::InvalidSettings(msg) => write!(f, "invalid settings: {}", msg),
        }
    }
}

// ********* Configuration **********

/// The sentinel neighbourhood for individuals without one.
pub const OTHER_NEIGHBOURHOOD: &str = "Other";

/// Minimum number of recognized column names for a row to be taken as the header.
pub const DEFAULT_MIN_MATCHES: usize = 2;

/// Number of extra attempts when the rate limiter has no capacity left.
pub const GEOCODE_MAX_RETRIES: u32 = 3;

pub const GEOCODE_BACKOFF: Duration = Duration::from_secs(1);

pub const RATE_LIMIT_CAPACITY: u32 = 1000;

pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Radius of the marker ring around a home, in degrees.
pub const MARKER_RING_RADIUS: f64 = 0.0005;

#[derive(PartialEq, Debug, Clone)]
pub struct GeocodeSettings {
    pub max_retries: u32,
    /// Wait between two attempts when the rate limiter refuses a token.
    pub backoff: Duration,
}

#[derive(PartialEq, Debug, Clone)]
pub struct RateLimitSettings {
    pub capacity: u32,
    /// The time it takes to refill an empty bucket.
    pub window: Duration,
}

#[derive(PartialEq, Debug, Clone)]
pub struct LayoutSettings {
    pub radius: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct MapSettings {
    pub min_matches: usize,
    pub geocode: GeocodeSettings,
    pub rate_limit: RateLimitSettings,
    pub layout: LayoutSettings,
}

impl MapSettings {
    pub const DEFAULT_SETTINGS: MapSettings = MapSettings {
        min_matches: DEFAULT_MIN_MATCHES,
        geocode: GeocodeSettings {
            max_retries: GEOCODE_MAX_RETRIES,
            backoff: GEOCODE_BACKOFF,
        },
        rate_limit: RateLimitSettings {
            capacity: RATE_LIMIT_CAPACITY,
            window: RATE_LIMIT_WINDOW,
        },
        layout: LayoutSettings {
            radius: MARKER_RING_RADIUS,
        },
    };

    pub fn validate(&self) -> Result<(), MapError> {
        if self.rate_limit.capacity == 0 {
            return Err(MapError::InvalidSettings(
                "rate limit capacity must be at least 1".to_string(),
            ));
        }
        if self.rate_limit.window.is_zero() {
            return Err(MapError::InvalidSettings(
                "rate limit window must not be empty".to_string(),
            ));
        }
        if !self.layout.radius.is_finite() || self.layout.radius < 0.0 {
            return Err(MapError::InvalidSettings(format!(
                "marker ring radius must be a non-negative number, got {}",
                self.layout.radius
            )));
        }
        Ok(())
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        MapSettings::DEFAULT_SETTINGS
    }
}
