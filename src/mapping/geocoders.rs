use std::collections::HashMap;

use crate::mapping::*;

#[cfg(feature = "http")]
const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[cfg(feature = "http")]
const DEFAULT_API_KEY_ENV: &str = "GEOCODING_API_KEY";

fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_lowercase()
}

/// An offline geocoder backed by a lookup table.
#[derive(Debug, Clone, Default)]
pub struct TableGeocoder {
    entries: HashMap<String, LatLng>,
}

impl TableGeocoder {
    /// Reads a CSV file with the header query,lat,lng.
    pub fn from_path(path: &str) -> MapResult<TableGeocoder> {
        let rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .context(CsvOpenSnafu { path })?;
        let mut entries: HashMap<String, LatLng> = HashMap::new();
        for (idx, line_r) in rdr.into_records().enumerate() {
            // The header is line 1.
            let lineno = idx + 2;
            let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
            let parsed = match (line.get(0), line.get(1), line.get(2)) {
                (Some(q), Some(lat), Some(lng)) => {
                    match (lat.trim().parse::<f64>(), lng.trim().parse::<f64>()) {
                        (Ok(lat), Ok(lng)) => Some((q, LatLng::new(lat, lng))),
                        _ => None,
                    }
                }
                _ => None,
            };
            let (query, loc) = parsed.context(GeocodeTableLineSnafu { path, lineno })?;
            entries.insert(normalize_query(query), loc);
        }
        info!("TableGeocoder: {} entries read from {:?}", entries.len(), path);
        Ok(TableGeocoder { entries })
    }
}

impl Geocoder for TableGeocoder {
    fn geocode(&mut self, query: &str) -> Result<LatLng, GeocodeFailure> {
        self.entries
            .get(&normalize_query(query))
            .copied()
            .ok_or(GeocodeFailure::NotFound)
    }
}

/// A geocoder calling a Google-style geocoding endpoint.
#[cfg(feature = "http")]
pub struct HttpGeocoder {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

#[cfg(feature = "http")]
impl HttpGeocoder {
    pub fn new(endpoint: &str, api_key: String) -> MapResult<HttpGeocoder> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .whatever_context("Error building the HTTP client")?;
        Ok(HttpGeocoder {
            client,
            endpoint: endpoint.to_string(),
            api_key,
        })
    }
}

#[cfg(feature = "http")]
impl Geocoder for HttpGeocoder {
    fn geocode(&mut self, query: &str) -> Result<LatLng, GeocodeFailure> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("address", query), ("key", self.api_key.as_str())])
            .send()
            .map_err(|e| GeocodeFailure::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GeocodeFailure::Status(status.as_u16()));
        }
        let body: JSValue = resp
            .json()
            .map_err(|e| GeocodeFailure::Malformed(e.to_string()))?;
        location_from_response(&body)
    }
}

/// Reads `results[0].geometry.location` from a geocoding response.
#[cfg(feature = "http")]
fn location_from_response(body: &JSValue) -> Result<LatLng, GeocodeFailure> {
    let loc = &body["results"][0]["geometry"]["location"];
    match (loc["lat"].as_f64(), loc["lng"].as_f64()) {
        (Some(lat), Some(lng)) => Ok(LatLng::new(lat, lng)),
        _ if body["results"].as_array().map_or(false, |r| r.is_empty()) => {
            Err(GeocodeFailure::NotFound)
        }
        _ => Err(GeocodeFailure::Malformed(format!(
            "no location in response with status {}",
            body["status"]
        ))),
    }
}

pub fn make_geocoder(config: &GeocoderConfig) -> MapResult<Box<dyn Geocoder>> {
    match config.provider.as_str() {
        "table" => {
            let path = match &config.table_path {
                Some(p) => p,
                None => whatever!("The table geocoder needs a tablePath"),
            };
            Ok(Box::new(TableGeocoder::from_path(path)?))
        }
        #[cfg(feature = "http")]
        "http" => {
            let name = config
                .api_key_env
                .clone()
                .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string());
            let api_key = std::env::var(&name)
                .with_whatever_context(|_| format!("Environment variable {} is not set", name))?;
            let endpoint = config.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
            info!("make_geocoder: using endpoint {:?}", endpoint);
            Ok(Box::new(HttpGeocoder::new(endpoint, api_key)?))
        }
        x => whatever!("Geocoder provider not available: {:?}", x),
    }
}
