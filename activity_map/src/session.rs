use log::{debug, info, warn};
use std::sync::Arc;

use crate::aggregate::{individual_neighbourhoods, neighbourhood_counts};
use crate::config::{Individual, MapError, MapSettings, RawRow, Record};
use crate::facilitators::{resolve_activities, ActivityResolution};
use crate::fields::CanonicalSet;
use crate::geocode::{failure_message, resolve_addresses, AddressResolution, Geocoder, RateLimiter};
use crate::header::{detect_header, records_from_rows, HeaderDetection};

/// Identifies one upload. Later uploads get larger generations.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct Generation(u64);

/// The individuals table at one point in time.
///
/// The version increases every time the table changes.
#[derive(PartialEq, Debug, Clone)]
pub struct IndividualsSnapshot {
    pub version: u64,
    pub individuals: Arc<Vec<Individual>>,
}

/// What an upload did.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct UploadSummary {
    pub generation: Generation,
    pub header: HeaderDetection,
    pub rows: usize,
    /// False when a later upload had already been applied.
    pub applied: bool,
}

/// The in-memory state of one mapping session.
///
/// Uploads replace the relevant state wholesale. An upload is applied only if no later
/// upload of the same kind has been applied before it. The markers are recomputed from the
/// latest individuals whenever either table changes.
pub struct Session {
    settings: MapSettings,
    limiter: Box<dyn RateLimiter>,
    individuals: IndividualsSnapshot,
    failed_count: usize,
    failed_addresses: Vec<String>,
    individuals_issued: u64,
    individuals_applied: u64,
    activity_rows: Vec<Record>,
    activities_issued: u64,
    activities_applied: u64,
    activities: ActivityResolution,
}

impl Session {
    pub(crate) fn new(settings: MapSettings, limiter: Box<dyn RateLimiter>) -> Session {
        Session {
            settings,
            limiter,
            individuals: IndividualsSnapshot {
                version: 0,
                individuals: Arc::new(Vec::new()),
            },
            failed_count: 0,
            failed_addresses: Vec::new(),
            individuals_issued: 0,
            individuals_applied: 0,
            activity_rows: Vec::new(),
            activities_issued: 0,
            activities_applied: 0,
            activities: ActivityResolution::default(),
        }
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    // ******** Individuals *********

    /// Starts an individuals upload.
    pub fn begin_individuals(&mut self) -> Generation {
        self.individuals_issued += 1;
        Generation(self.individuals_issued)
    }

    /// Resolves the addresses of individuals rows with the session's rate limiter.
    pub fn resolve_individuals(&mut self, rows: &[Record], geocoder: &mut dyn Geocoder) -> AddressResolution {
        resolve_addresses(rows, geocoder, self.limiter.as_mut(), &self.settings.geocode)
    }

    /// Replaces the individuals table with the outcome of an upload.
    ///
    /// Returns false, and changes nothing, when an upload started later was already applied.
    pub fn commit_individuals(&mut self, generation: Generation, resolution: AddressResolution) -> bool {
        if generation.0 <= self.individuals_applied {
            warn!(
                "Dropping individuals upload {:?}: upload {} was already applied",
                generation, self.individuals_applied
            );
            return false;
        }
        self.individuals_applied = generation.0;
        self.failed_count = resolution.failed_count;
        self.failed_addresses = resolution.failed_addresses;
        self.replace_individuals(resolution.individuals);
        true
    }

    /// Detects the header, resolves every address and replaces the individuals table.
    pub fn load_individuals(&mut self, raw_rows: &[RawRow], geocoder: &mut dyn Geocoder) -> Result<UploadSummary, MapError> {
        let generation = self.begin_individuals();
        let header = detect_header(raw_rows, &CanonicalSet::individuals(), self.settings.min_matches);
        let records = records_from_rows(raw_rows, header.index)?;
        info!(
            "load_individuals: header at row {}, {} records",
            header.index,
            records.len()
        );
        let resolution = self.resolve_individuals(&records, geocoder);
        let applied = self.commit_individuals(generation, resolution);
        Ok(UploadSummary {
            generation,
            header,
            rows: records.len(),
            applied,
        })
    }

    /// Removes one individual. Returns false if no individual has this id.
    pub fn remove_individual(&mut self, id: &str) -> bool {
        let current = self.individuals.individuals.clone();
        if !current.iter().any(|i| i.id == id) {
            return false;
        }
        let remaining: Vec<Individual> = current.iter().filter(|i| i.id != id).cloned().collect();
        debug!("remove_individual: removed {}", id);
        self.replace_individuals(remaining);
        true
    }

    fn replace_individuals(&mut self, individuals: Vec<Individual>) {
        self.individuals = IndividualsSnapshot {
            version: self.individuals.version + 1,
            individuals: Arc::new(individuals),
        };
        info!(
            "Individuals table at version {}: {} individuals",
            self.individuals.version,
            self.individuals.individuals.len()
        );
        self.recompute_activities();
    }

    /// The current individuals table.
    pub fn individuals(&self) -> IndividualsSnapshot {
        self.individuals.clone()
    }

    pub fn has_individuals(&self) -> bool {
        !self.individuals.individuals.is_empty()
    }

    /// Unique addresses that failed in the last applied individuals upload.
    pub fn failed_count(&self) -> usize {
        self.failed_count
    }

    pub fn failed_addresses(&self) -> &[String] {
        &self.failed_addresses
    }

    pub fn failure_message(&self) -> Option<String> {
        failure_message(self.failed_count)
    }

    pub fn neighbourhoods(&self) -> Vec<String> {
        individual_neighbourhoods(&self.individuals.individuals)
    }

    pub fn neighbourhood_counts(&self) -> Vec<(String, usize)> {
        neighbourhood_counts(&self.individuals.individuals)
    }

    // ******** Activities *********

    pub fn begin_activities(&mut self) -> Generation {
        self.activities_issued += 1;
        Generation(self.activities_issued)
    }

    /// Replaces the activity rows and resolves them against the current individuals.
    pub fn commit_activities(&mut self, generation: Generation, rows: Vec<Record>) -> bool {
        if generation.0 <= self.activities_applied {
            warn!(
                "Dropping activities upload {:?}: upload {} was already applied",
                generation, self.activities_applied
            );
            return false;
        }
        self.activities_applied = generation.0;
        self.activity_rows = rows;
        self.recompute_activities();
        true
    }

    /// Detects the header and resolves the activities against the current individuals.
    pub fn load_activities(&mut self, raw_rows: &[RawRow]) -> Result<UploadSummary, MapError> {
        let generation = self.begin_activities();
        let header = detect_header(raw_rows, &CanonicalSet::activities(), self.settings.min_matches);
        let records = records_from_rows(raw_rows, header.index)?;
        info!(
            "load_activities: header at row {}, {} records",
            header.index,
            records.len()
        );
        let rows = records.len();
        let applied = self.commit_activities(generation, records);
        Ok(UploadSummary {
            generation,
            header,
            rows,
            applied,
        })
    }

    fn recompute_activities(&mut self) {
        let snapshot = self.individuals();
        debug!(
            "recompute_activities: {} rows against individuals version {}",
            self.activity_rows.len(),
            snapshot.version
        );
        self.activities = resolve_activities(
            &self.activity_rows,
            &snapshot.individuals,
            &self.settings.layout,
        );
    }

    pub fn activities(&self) -> &ActivityResolution {
        &self.activities
    }
}
