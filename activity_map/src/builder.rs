pub use crate::config::*;

use std::time::Duration;

use crate::geocode::{RateLimiter, TokenBucket};
use crate::session::Session;

/// A builder for a mapping [Session].
///
/// ```
/// use activity_map::builder::Builder;
/// use activity_map::MapSettings;
/// # use activity_map::MapError;
///
/// let session = Builder::new(&MapSettings::DEFAULT_SETTINGS)?
///     .min_matches(3)
///     .layout_radius(0.001)?
///     .build()?;
///
/// assert!(!session.has_individuals());
/// # Ok::<(), MapError>(())
/// ```
pub struct Builder {
    pub(crate) _settings: MapSettings,
    pub(crate) _limiter: Option<Box<dyn RateLimiter>>,
}

impl Builder {
    pub fn new(settings: &MapSettings) -> Result<Builder, MapError> {
        settings.validate()?;
        Ok(Builder {
            _settings: settings.clone(),
            _limiter: None,
        })
    }

    /// Minimum number of known column names for a row to be taken as the header.
    pub fn min_matches(mut self, min_matches: usize) -> Builder {
        self._settings.min_matches = min_matches;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Builder {
        self._settings.geocode.max_retries = max_retries;
        self
    }

    /// Wait between two attempts when the rate limiter refuses a token.
    pub fn backoff(mut self, backoff: Duration) -> Builder {
        self._settings.geocode.backoff = backoff;
        self
    }

    /// Limits geocoding to `capacity` requests per `window`.
    pub fn rate_limit(mut self, capacity: u32, window: Duration) -> Result<Builder, MapError> {
        self._settings.rate_limit = RateLimitSettings { capacity, window };
        self._settings.validate()?;
        Ok(self)
    }

    pub fn layout_radius(mut self, radius: f64) -> Result<Builder, MapError> {
        self._settings.layout = LayoutSettings { radius };
        self._settings.validate()?;
        Ok(self)
    }

    /// Uses another rate limiter than the token bucket built from the settings.
    pub fn rate_limiter(mut self, limiter: Box<dyn RateLimiter>) -> Builder {
        self._limiter = Some(limiter);
        self
    }

    pub fn build(self) -> Result<Session, MapError> {
        let limiter: Box<dyn RateLimiter> = match self._limiter {
            Some(l) => l,
            None => Box::new(TokenBucket::from_settings(&self._settings.rate_limit)?),
        };
        Ok(Session::new(self._settings, limiter))
    }
}
