use std::fmt::Display;

use crate::config::{ActivityRecord, ActivityType, Record, OTHER_NEIGHBOURHOOD};
use crate::fields::Field;

/// Normalizes a person's name for matching: trimmed, inner whitespace collapsed, lowercased.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_lowercase()
}

/// Splits a facilitator list on semicolons, dropping the blank entries.
pub fn split_facilitators(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(';').map(str::trim).filter(|s| !s.is_empty())
}

/// The composite key used to deduplicate address lookups.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct AddressKey(String);

impl AddressKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AddressKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The canonical view of an individuals row. All values are trimmed.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct IndividualRow {
    pub first_name: String,
    pub last_name: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address: String,
    pub neighbourhood: String,
    pub postal_code: String,
    pub locality: String,
    pub region: String,
    pub national_community: String,
}

impl IndividualRow {
    pub fn from_record(record: &Record) -> IndividualRow {
        let get = |field: Field| record.field_or_blank(field).to_string();
        IndividualRow {
            first_name: get(Field::FirstName),
            last_name: get(Field::LastName),
            address_line1: get(Field::AddressLine1),
            address_line2: get(Field::AddressLine2),
            address: get(Field::Address),
            neighbourhood: get(Field::Neighbourhood),
            postal_code: get(Field::PostalCode),
            locality: get(Field::Locality),
            region: get(Field::Region),
            national_community: get(Field::NationalCommunity),
        }
    }

    /// The street part of the address: the address lines when present, otherwise the
    /// combined address column.
    pub fn street(&self) -> String {
        let lines: Vec<&str> = [self.address_line1.as_str(), self.address_line2.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        if lines.is_empty() {
            self.address.clone()
        } else {
            lines.join(", ")
        }
    }

    /// Street, neighbourhood, postal code, locality, region, national community.
    fn address_parts(&self) -> [String; 6] {
        [
            self.street(),
            self.neighbourhood.clone(),
            self.postal_code.clone(),
            self.locality.clone(),
            self.region.clone(),
            self.national_community.clone(),
        ]
    }

    pub fn address_key(&self) -> AddressKey {
        AddressKey(self.address_parts().join("|"))
    }

    /// The human-readable query sent to the geocoder: the non-blank parts, comma separated.
    pub fn query(&self) -> String {
        self.address_parts()
            .iter()
            .filter(|s| !s.is_empty())
            .cloned()
            .collect::<Vec<String>>()
            .join(", ")
    }

    pub fn neighbourhood_or_other(&self) -> &str {
        if self.neighbourhood.is_empty() {
            OTHER_NEIGHBOURHOOD
        } else {
            self.neighbourhood.as_str()
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl ActivityRecord {
    pub fn from_record(record: &Record) -> ActivityRecord {
        let activity_type_raw = record.field_or_blank(Field::ActivityType).to_string();
        ActivityRecord {
            activity_type: ActivityType::from_label(&activity_type_raw),
            activity_type_raw,
            activity_name: record.field_or_blank(Field::ActivityName).to_string(),
            facilitators_raw: record.field_or_blank(Field::Facilitators).to_string(),
            record: record.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn individual_projection() {
        let record = Record::from_pairs([
            ("Firstname", " Jane "),
            ("Lastname", "Doe"),
            ("Address", "1 Main St"),
            ("Focus Neighbourhood", "Downtown"),
            ("City", "Springfield"),
        ]);
        let row = IndividualRow::from_record(&record);
        assert_eq!(row.first_name, "Jane");
        assert_eq!(row.full_name(), "Jane Doe");
        assert_eq!(row.street(), "1 Main St");
        assert_eq!(row.address_key().as_str(), "1 Main St|Downtown||Springfield||");
        assert_eq!(row.query(), "1 Main St, Downtown, Springfield");
    }

    #[test]
    fn address_lines_take_precedence() {
        let record = Record::from_pairs([
            ("Address Line 1", "10 Elm Rd"),
            ("Address Line 2", "Apt 4"),
            ("Address", "ignored"),
        ]);
        let row = IndividualRow::from_record(&record);
        assert_eq!(row.street(), "10 Elm Rd, Apt 4");
        assert_eq!(row.neighbourhood_or_other(), "Other");
    }

    #[test]
    fn names_are_normalized() {
        assert_eq!(normalize_name("  Jane   DOE "), "jane doe");
        let names: Vec<&str> = split_facilitators("Jane Doe; ;John Smith;").collect();
        assert_eq!(names, vec!["Jane Doe", "John Smith"]);
    }

    #[test]
    fn activity_projection() {
        let record = Record::from_pairs([
            ("Type", "Study Circle"),
            ("Name", "Circle A, Unit 1"),
            ("Facilitators", "Jane Doe; John Smith"),
        ]);
        let activity = ActivityRecord::from_record(&record);
        assert_eq!(activity.activity_type, Some(ActivityType::StudyCircle));
        assert_eq!(activity.activity_name, "Circle A, Unit 1");
        assert_eq!(activity.facilitators_raw, "Jane Doe; John Smith");

        let record = Record::from_pairs([("Activity Type", "Reading group")]);
        let activity = ActivityRecord::from_record(&record);
        assert_eq!(activity.activity_type, None);
        assert_eq!(activity.activity_type_raw, "Reading group");
    }

    #[test]
    fn activity_labels() {
        assert_eq!(
            ActivityType::from_label("  Children\u{2019}s  Class"),
            Some(ActivityType::ChildrensClass)
        );
        assert_eq!(
            ActivityType::from_label("JUNIOR YOUTH GROUP"),
            Some(ActivityType::JuniorYouthGroup)
        );
        assert_eq!(ActivityType::from_label("devotional").map(|t| t.code()), Some("DM"));
        assert_eq!(ActivityType::from_label("SC"), None);
        assert_eq!(ActivityType::from_code("sc"), Some(ActivityType::StudyCircle));
    }
}
