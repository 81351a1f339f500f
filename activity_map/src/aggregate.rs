use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::config::{ActivityMarker, ActivityType, Individual, OTHER_NEIGHBOURHOOD};

/// Number of unique placed activities per type. Every type is present, possibly at zero.
pub type TypeCounts = BTreeMap<ActivityType, usize>;

pub fn empty_type_counts() -> TypeCounts {
    ActivityType::ALL.iter().map(|t| (*t, 0)).collect()
}

/// Counts activities once each, however many facilitators they were placed for.
/// An activity is identified by its name, type and facilitator list.
#[derive(Debug, Clone, Default)]
pub struct TypeCounter {
    seen: HashSet<(String, ActivityType, String)>,
}

impl TypeCounter {
    pub fn new() -> TypeCounter {
        TypeCounter::default()
    }

    /// Returns false when this activity was already counted.
    pub fn record(&mut self, activity_type: ActivityType, activity_name: &str, facilitators_raw: &str) -> bool {
        self.seen.insert((
            activity_name.to_string(),
            activity_type,
            facilitators_raw.to_string(),
        ))
    }

    pub fn finish(&self) -> TypeCounts {
        let mut counts = empty_type_counts();
        for (_, t, _) in self.seen.iter() {
            *counts.entry(*t).or_insert(0) += 1;
        }
        counts
    }
}

fn neighbourhood_label(value: &str) -> &str {
    let value = value.trim();
    if value.is_empty() {
        OTHER_NEIGHBOURHOOD
    } else {
        value
    }
}

fn display_order(a: &str, b: &str) -> std::cmp::Ordering {
    match (a == OTHER_NEIGHBOURHOOD, b == OTHER_NEIGHBOURHOOD) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        (false, false) => a.cmp(b),
    }
}

/// The distinct neighbourhoods, sorted, blanks mapped to "Other" and "Other" last.
pub fn neighbourhoods<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let distinct: BTreeSet<&str> = values.into_iter().map(neighbourhood_label).collect();
    let mut res: Vec<String> = distinct.into_iter().map(|s| s.to_string()).collect();
    res.sort_by(|a, b| display_order(a, b));
    res
}

pub fn individual_neighbourhoods(individuals: &[Individual]) -> Vec<String> {
    neighbourhoods(individuals.iter().map(|i| i.neighbourhood.as_str()))
}

/// Individuals per neighbourhood, in the same order as [neighbourhoods].
pub fn neighbourhood_counts(individuals: &[Individual]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for ind in individuals.iter() {
        *counts.entry(neighbourhood_label(&ind.neighbourhood)).or_insert(0) += 1;
    }
    let mut res: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(n, c)| (n.to_string(), c))
        .collect();
    res.sort_by(|a, b| display_order(&a.0, &b.0));
    res
}

/// The individuals living in one of the selected neighbourhoods.
pub fn filter_individuals<'a>(individuals: &'a [Individual], selected: &HashSet<String>) -> Vec<&'a Individual> {
    individuals
        .iter()
        .filter(|i| selected.contains(neighbourhood_label(&i.neighbourhood)))
        .collect()
}

/// The markers of the selected activity types.
pub fn filter_markers<'a>(markers: &'a [ActivityMarker], selected: &[ActivityType]) -> Vec<&'a ActivityMarker> {
    markers
        .iter()
        .filter(|m| selected.contains(&m.activity_type))
        .collect()
}
