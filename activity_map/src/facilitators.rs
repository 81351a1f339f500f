use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};

use crate::aggregate::{TypeCounter, TypeCounts};
use crate::config::{ActivityMarker, ActivityRecord, ActivityType, Individual, LayoutSettings, Record};
use crate::layout::layout_markers;
use crate::normalize::{normalize_name, split_facilitators};

/// Resolved individuals, by normalized "first last" name.
///
/// When two individuals share a name, the later one in the list wins.
#[derive(Debug, Clone, Default)]
pub struct NameIndex<'a> {
    by_name: HashMap<String, &'a Individual>,
}

impl<'a> NameIndex<'a> {
    pub fn new(individuals: &'a [Individual]) -> NameIndex<'a> {
        let mut by_name: HashMap<String, &'a Individual> = HashMap::new();
        for ind in individuals.iter() {
            let key = normalize_name(&ind.full_name());
            if key.is_empty() {
                continue;
            }
            if by_name.insert(key.clone(), ind).is_some() {
                debug!("NameIndex: duplicate name {:?}, keeping the last one", key);
            }
        }
        NameIndex { by_name }
    }

    /// Looks up an already-normalized name.
    pub fn get(&self, normalized_name: &str) -> Option<&'a Individual> {
        self.by_name.get(normalized_name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// One activity run by one facilitator.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Assignment {
    pub activity_type: ActivityType,
    pub activity_name: String,
    pub facilitators_raw: String,
    /// The facilitator's name as it appears in the individuals file.
    pub facilitator_name: String,
}

/// The activities of each facilitator, keyed by normalized name.
/// Facilitators keep the order in which they were first seen.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct FacilitatorAssignments {
    order: Vec<String>,
    by_name: HashMap<String, Vec<Assignment>>,
}

impl FacilitatorAssignments {
    pub fn new() -> FacilitatorAssignments {
        FacilitatorAssignments::default()
    }

    pub fn push(&mut self, normalized_name: &str, assignment: Assignment) {
        if !self.by_name.contains_key(normalized_name) {
            self.order.push(normalized_name.to_string());
        }
        self.by_name
            .entry(normalized_name.to_string())
            .or_default()
            .push(assignment);
    }

    pub fn get(&self, normalized_name: &str) -> Option<&[Assignment]> {
        self.by_name.get(normalized_name).map(|v| v.as_slice())
    }

    /// (normalized name, assignments) in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Assignment])> {
        self.order.iter().filter_map(move |name| {
            self.by_name
                .get(name)
                .map(|v| (name.as_str(), v.as_slice()))
        })
    }

    /// Number of facilitators.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// The markers for all the activities that could be placed, and the rows that could not.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ActivityResolution {
    pub markers: Vec<ActivityMarker>,
    /// Rows without any facilitator listed.
    pub no_facilitators: Vec<ActivityRecord>,
    /// Rows listing facilitators, none of whom is a known individual.
    pub facilitator_not_found: Vec<ActivityRecord>,
    /// Unique placed activities per type.
    pub type_counts: TypeCounts,
}

/// Buckets the activities by facilitator, matching the facilitator names against the
/// given individuals.
///
/// Rows with an activity type outside the vocabulary are skipped without being reported.
/// A row is "not found" only when none of its facilitators matched.
pub fn assign_facilitators(
    activity_rows: &[Record],
    index: &NameIndex<'_>,
) -> (FacilitatorAssignments, Vec<ActivityRecord>, Vec<ActivityRecord>, TypeCounts) {
    let mut assignments = FacilitatorAssignments::new();
    let mut no_facilitators: Vec<ActivityRecord> = Vec::new();
    let mut not_found: Vec<ActivityRecord> = Vec::new();
    let mut counter = TypeCounter::new();

    for (idx, record) in activity_rows.iter().enumerate() {
        let activity = ActivityRecord::from_record(record);
        let activity_type = match activity.activity_type {
            Some(t) => t,
            None => {
                debug!(
                    "assign_facilitators: row {}: skipping unknown activity type {:?}",
                    idx, activity.activity_type_raw
                );
                continue;
            }
        };
        if activity.facilitators_raw.is_empty() {
            debug!(
                "assign_facilitators: row {}: no facilitators for {:?}",
                idx, activity.activity_name
            );
            no_facilitators.push(activity);
            continue;
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut matched = 0;
        for name in split_facilitators(&activity.facilitators_raw) {
            let key = normalize_name(name);
            if !seen.insert(key.clone()) {
                continue;
            }
            match index.get(&key) {
                Some(ind) => {
                    matched += 1;
                    assignments.push(
                        &key,
                        Assignment {
                            activity_type,
                            activity_name: activity.activity_name.clone(),
                            facilitators_raw: activity.facilitators_raw.clone(),
                            facilitator_name: ind.full_name(),
                        },
                    );
                }
                None => {
                    debug!(
                        "assign_facilitators: row {}: facilitator {:?} not found",
                        idx, name
                    );
                }
            }
        }

        if matched == 0 {
            not_found.push(activity);
        } else {
            counter.record(
                activity_type,
                &activity.activity_name,
                &activity.facilitators_raw,
            );
        }
    }
    (assignments, no_facilitators, not_found, counter.finish())
}

/// Resolves the activities against the individuals and lays out their markers.
///
/// The individuals must be the latest resolved set: callers should read it right before
/// calling, rather than hold on to an older copy.
pub fn resolve_activities(
    activity_rows: &[Record],
    individuals: &[Individual],
    layout: &LayoutSettings,
) -> ActivityResolution {
    let index = NameIndex::new(individuals);
    if index.is_empty() && !activity_rows.is_empty() {
        warn!("resolve_activities: no individuals available, no facilitator can be found");
    }
    let (assignments, no_facilitators, facilitator_not_found, type_counts) =
        assign_facilitators(activity_rows, &index);
    let markers = layout_markers(&assignments, &index, layout);
    info!(
        "resolve_activities: {} rows, {} facilitators, {} markers, {} without facilitators, {} with unknown facilitators",
        activity_rows.len(),
        assignments.len(),
        markers.len(),
        no_facilitators.len(),
        facilitator_not_found.len()
    );
    ActivityResolution {
        markers,
        no_facilitators,
        facilitator_not_found,
        type_counts,
    }
}
