/*!
Turns spreadsheet exports of individuals and activities into map markers.

The individuals file lists people with their home address. The activities file lists
activities with their type, name and facilitators. This crate:

* finds the header row of each file, whatever comes before it,
* reads the columns under any of their accepted spellings (see [fields::Field]),
* geocodes each distinct home address once, under a rate limit,
* matches the facilitator names of each activity against the resolved individuals,
* lays out one marker per (facilitator, activity) on a small ring around the home.

The geocoding service and the rate limiter are supplied by the caller through the
[Geocoder] and [RateLimiter] traits. Everything else is plain data.

```
use activity_map::*;

struct FixedGeocoder;

impl Geocoder for FixedGeocoder {
    fn geocode(&mut self, _query: &str) -> Result<LatLng, GeocodeFailure> {
        Ok(LatLng::new(45.42, -75.69))
    }
}

let rows = |data: &[&[&str]]| -> Vec<RawRow> {
    data.iter().map(|r| r.iter().map(|s| s.to_string()).collect()).collect()
};

let mut session = builder::Builder::new(&MapSettings::DEFAULT_SETTINGS)?.build()?;
session.load_individuals(
    &rows(&[
        &["First Name", "Last Name", "Address"],
        &["Jane", "Doe", "1 Main St"],
    ]),
    &mut FixedGeocoder,
)?;
session.load_activities(&rows(&[
    &["Activity Type", "Activity Name", "Facilitators"],
    &["Study Circle", "Book 1", "Jane Doe"],
]))?;

assert_eq!(session.activities().markers.len(), 1);
# Ok::<(), MapError>(())
```
*/

pub mod aggregate;
pub mod builder;
mod config;
pub mod facilitators;
pub mod fields;
pub mod geocode;
pub mod header;
pub mod layout;
pub mod manual;
pub mod normalize;
pub mod session;

pub use crate::config::*;
pub use crate::facilitators::{resolve_activities, ActivityResolution};
pub use crate::fields::{get_field, CanonicalSet, Field};
pub use crate::geocode::{
    geocode_address, resolve_addresses, AddressResolution, GeocodeFailure, Geocoder, RateLimiter,
    TokenBucket,
};
pub use crate::header::{find_header_row, records_from_rows};
pub use crate::layout::layout_markers;
pub use crate::session::{Generation, IndividualsSnapshot, Session};

/// Number of hex digits kept from the digest.
const ID_LEN: usize = 16;

/// A short, stable identifier derived from the given parts.
fn content_id(parts: &[String]) -> String {
    let digest = sha256::digest(parts.join("\u{1f}").as_str());
    digest[..ID_LEN].to_string()
}
