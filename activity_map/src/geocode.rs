use log::{debug, info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;
use std::time::{Duration, Instant};

use crate::config::{GeocodeSettings, Individual, LatLng, MapError, RateLimitSettings, Record};
use crate::normalize::{AddressKey, IndividualRow};

/// Why an address could not be turned into a coordinate.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum GeocodeFailure {
    /// The provider answered but had no match.
    NotFound,
    /// The provider answered with an unsuccessful status.
    Status(u16),
    /// The request did not complete.
    Transport(String),
    /// The answer could not be read as a coordinate.
    Malformed(String),
}

impl Error for GeocodeFailure {}

impl Display for GeocodeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeocodeFailure::NotFound => write!(f, "no match"),
            GeocodeFailure::Status(code) => write!(f, "unsuccessful status {}", code),
            GeocodeFailure::Transport(msg) => write!(f, "transport error: {}", msg),
            GeocodeFailure::Malformed(msg) => write!(f, "malformed response: {}", msg),
        }
    }
}

/// The external service that resolves a free-text address.
pub trait Geocoder {
    fn geocode(&mut self, query: &str) -> Result<LatLng, GeocodeFailure>;
}

/// Grants capacity for outbound geocoding requests.
pub trait RateLimiter {
    /// Takes one unit of capacity. False means none is available right now.
    fn try_acquire(&mut self) -> bool;
}

/// A token bucket that refills continuously: a full bucket takes one window to refill.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    capacity: f64,
    window: Duration,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(capacity: u32, window: Duration) -> Result<TokenBucket, MapError> {
        if capacity == 0 || window.is_zero() {
            return Err(MapError::InvalidSettings(format!(
                "token bucket needs a positive capacity and window, got {} per {:?}",
                capacity, window
            )));
        }
        Ok(TokenBucket {
            capacity: capacity as f64,
            window,
            tokens: capacity as f64,
            last_refill: Instant::now(),
        })
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Result<TokenBucket, MapError> {
        TokenBucket::new(settings.capacity, settings.window)
    }

    /// Whole tokens currently available.
    pub fn available(&self) -> u32 {
        self.tokens.floor() as u32
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        let gained = elapsed.as_secs_f64() / self.window.as_secs_f64() * self.capacity;
        self.tokens = (self.tokens + gained).min(self.capacity);
        self.last_refill = now;
    }

    fn try_acquire_at(&mut self, now: Instant) -> bool {
        self.refill(now);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

impl RateLimiter for TokenBucket {
    fn try_acquire(&mut self) -> bool {
        self.try_acquire_at(Instant::now())
    }
}

/// Geocodes one address under the rate limit.
///
/// A refused token is retried after the backoff, up to `max_retries` times. Every
/// failure, including an exhausted retry budget, comes back as None.
pub fn geocode_address<G, L>(
    query: &str,
    geocoder: &mut G,
    limiter: &mut L,
    settings: &GeocodeSettings,
) -> Option<LatLng>
where
    G: Geocoder + ?Sized,
    L: RateLimiter + ?Sized,
{
    for attempt in 0..=settings.max_retries {
        if limiter.try_acquire() {
            return match geocoder.geocode(query) {
                Ok(loc) if loc.is_usable() => Some(loc),
                Ok(loc) => {
                    warn!("geocode_address: unusable coordinate {:?} for {:?}", loc, query);
                    None
                }
                Err(e) => {
                    warn!("geocode_address: failed for {:?}: {}", query, e);
                    None
                }
            };
        }
        if attempt < settings.max_retries {
            debug!(
                "geocode_address: rate limited on attempt {} for {:?}, waiting {:?}",
                attempt + 1,
                query,
                settings.backoff
            );
            if !settings.backoff.is_zero() {
                std::thread::sleep(settings.backoff);
            }
        }
    }
    warn!(
        "geocode_address: giving up on {:?} after {} attempts",
        query,
        settings.max_retries.saturating_add(1)
    );
    None
}

/// The individuals whose address could be resolved, and the count of unique addresses
/// that could not.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct AddressResolution {
    pub individuals: Vec<Individual>,
    pub failed_count: usize,
    pub unique_addresses: usize,
    /// The queries of the addresses that failed, in file order.
    pub failed_addresses: Vec<String>,
}

impl AddressResolution {
    /// The message to show to users when some addresses failed.
    pub fn failure_message(&self) -> Option<String> {
        failure_message(self.failed_count)
    }
}

pub(crate) fn failure_message(failed_count: usize) -> Option<String> {
    match failed_count {
        0 => None,
        1 => Some("1 address could not be geocoded".to_string()),
        n => Some(format!("{} addresses could not be geocoded", n)),
    }
}

/// Stable identifier of an individual, derived from its coordinate, name and row.
pub fn individual_id(loc: LatLng, full_name: &str, row_index: usize) -> String {
    crate::content_id(&[
        format!("{:.6}", loc.lat),
        format!("{:.6}", loc.lng),
        full_name.to_string(),
        row_index.to_string(),
    ])
}

/// Resolves the address of every row.
///
/// Identical addresses are looked up once. All lookups complete before any row gets its
/// coordinate; rows whose address failed are left out of the result.
pub fn resolve_addresses<G, L>(
    rows: &[Record],
    geocoder: &mut G,
    limiter: &mut L,
    settings: &GeocodeSettings,
) -> AddressResolution
where
    G: Geocoder + ?Sized,
    L: RateLimiter + ?Sized,
{
    let parsed: Vec<(IndividualRow, AddressKey)> = rows
        .iter()
        .map(|r| {
            let row = IndividualRow::from_record(r);
            let key = row.address_key();
            (row, key)
        })
        .collect();

    // Unique addresses, in order of first appearance.
    let mut unique: Vec<(AddressKey, String)> = Vec::new();
    let mut seen: HashMap<AddressKey, usize> = HashMap::new();
    for (row, key) in parsed.iter() {
        if !seen.contains_key(key) {
            seen.insert(key.clone(), unique.len());
            unique.push((key.clone(), row.query()));
        }
    }
    info!(
        "resolve_addresses: {} rows, {} unique addresses",
        rows.len(),
        unique.len()
    );

    let mut resolved: HashMap<AddressKey, LatLng> = HashMap::new();
    let mut failed_addresses: Vec<String> = Vec::new();
    for (key, query) in unique.iter() {
        let res = if query.is_empty() {
            debug!("resolve_addresses: blank address, not looked up");
            None
        } else {
            geocode_address(query, geocoder, limiter, settings)
        };
        match res {
            Some(loc) => {
                debug!("resolve_addresses: {:?} -> {:?}", query, loc);
                resolved.insert(key.clone(), loc);
            }
            None => failed_addresses.push(query.clone()),
        }
    }

    let mut individuals: Vec<Individual> = Vec::new();
    for (idx, ((row, key), record)) in parsed.into_iter().zip(rows.iter()).enumerate() {
        let loc = match resolved.get(&key) {
            Some(loc) => *loc,
            None => continue,
        };
        let full_name = row.full_name();
        individuals.push(Individual {
            id: individual_id(loc, &full_name, idx),
            lat: loc.lat,
            lng: loc.lng,
            address: row.query(),
            neighbourhood: row.neighbourhood_or_other().to_string(),
            first_name: row.first_name,
            last_name: row.last_name,
            record: record.clone(),
        });
    }

    let failed_count = failed_addresses.len();
    if failed_count > 0 {
        warn!(
            "resolve_addresses: {} of {} unique addresses could not be geocoded",
            failed_count,
            unique.len()
        );
    }
    AddressResolution {
        individuals,
        failed_count,
        unique_addresses: unique.len(),
        failed_addresses,
    }
}
