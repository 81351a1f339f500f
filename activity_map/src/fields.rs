use std::collections::HashSet;

use crate::config::Record;

/// The canonical attributes that can be read from a spreadsheet row.
///
/// Each field carries an ordered list of the column names it accepts. Every read of a
/// column value goes through these tables, never through a literal column name.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Field {
    FirstName,
    LastName,
    AddressLine1,
    AddressLine2,
    /// A single column holding the whole street address.
    Address,
    Neighbourhood,
    PostalCode,
    Locality,
    Region,
    NationalCommunity,
    ActivityType,
    ActivityName,
    Facilitators,
}

impl Field {
    /// The fields found in an individuals file.
    pub const INDIVIDUAL_FIELDS: [Field; 10] = [
        Field::FirstName,
        Field::LastName,
        Field::AddressLine1,
        Field::AddressLine2,
        Field::Address,
        Field::Neighbourhood,
        Field::PostalCode,
        Field::Locality,
        Field::Region,
        Field::NationalCommunity,
    ];

    /// The fields found in an activities file.
    pub const ACTIVITY_FIELDS: [Field; 3] =
        [Field::ActivityType, Field::ActivityName, Field::Facilitators];

    /// The accepted column names, by priority.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Field::FirstName => &["First Name", "FirstName", "first_name", "Given Name", "First"],
            Field::LastName => &[
                "Last Name",
                "LastName",
                "last_name",
                "Surname",
                "Family Name",
                "Last",
            ],
            Field::AddressLine1 => &[
                "Address Line 1",
                "Address1",
                "address_line_1",
                "Street Address",
                "Street",
            ],
            Field::AddressLine2 => &["Address Line 2", "Address2", "address_line_2", "Unit"],
            Field::Address => &["Address", "Home Address", "Full Address"],
            Field::Neighbourhood => &[
                "Focus Neighbourhood",
                "Focus Neighborhood",
                "Neighbourhood",
                "Neighborhood",
            ],
            Field::PostalCode => &["Postal Code", "PostalCode", "Postcode", "Zip Code", "Zip"],
            Field::Locality => &["Locality", "City", "Town"],
            Field::Region => &["Region", "Province", "State"],
            Field::NationalCommunity => &["National Community", "Country"],
            Field::ActivityType => &["Activity Type", "ActivityType", "Type"],
            Field::ActivityName => &["Activity Name", "ActivityName", "Name", "Activity"],
            Field::Facilitators => &["Facilitators", "Facilitator", "Facilitator Names", "Tutors"],
        }
    }
}

/// Normalizes a column name for comparison: whitespace and underscores are dropped and
/// the rest is lowercased.
pub fn normalize_header(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Finds the value of the first candidate key present in the record.
///
/// Candidates are tried in order; for each one the record's own keys are scanned in file
/// order. Returns None when no candidate matches any key.
pub fn lookup_field<'a, S: AsRef<str>>(record: &'a Record, candidate_keys: &[S]) -> Option<&'a str> {
    let keys: Vec<(String, &str)> = record
        .iter()
        .map(|(k, v)| (normalize_header(k), v))
        .collect();
    for candidate in candidate_keys {
        let wanted = normalize_header(candidate.as_ref());
        if let Some((_, v)) = keys.iter().find(|(k, _)| *k == wanted) {
            return Some(*v);
        }
    }
    None
}

/// Same as [lookup_field], with the empty string standing for a missing column.
pub fn get_field<'a, S: AsRef<str>>(record: &'a Record, candidate_keys: &[S]) -> &'a str {
    lookup_field(record, candidate_keys).unwrap_or("")
}

impl Record {
    /// The value of a canonical field, if one of its columns is present.
    pub fn field(&self, field: Field) -> Option<&str> {
        lookup_field(self, field.synonyms())
    }

    /// The trimmed value of a canonical field, empty when absent.
    pub fn field_or_blank(&self, field: Field) -> &str {
        get_field(self, field.synonyms()).trim()
    }
}

/// The normalized column names that identify the header of one kind of file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CanonicalSet {
    names: HashSet<String>,
}

impl CanonicalSet {
    pub fn for_fields(fields: &[Field]) -> CanonicalSet {
        CanonicalSet {
            names: fields
                .iter()
                .flat_map(|f| f.synonyms().iter())
                .map(|s| normalize_header(s))
                .collect(),
        }
    }

    pub fn individuals() -> CanonicalSet {
        CanonicalSet::for_fields(&Field::INDIVIDUAL_FIELDS)
    }

    pub fn activities() -> CanonicalSet {
        CanonicalSet::for_fields(&Field::ACTIVITY_FIELDS)
    }

    /// Checks an already-normalized name.
    pub fn contains(&self, normalized: &str) -> bool {
        self.names.contains(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spelling_variants_resolve_to_same_value() {
        for key in ["First Name", "first name", "FIRST_NAME", " firstname ", "First  Name"] {
            let record = Record::from_pairs([(key, "Jane"), ("Other", "x")]);
            assert_eq!(get_field(&record, &["First Name"]), "Jane", "key {:?}", key);
        }
    }

    #[test]
    fn candidate_order_sets_priority() {
        let record = Record::from_pairs([("City", "Springfield"), ("Locality", "Shelbyville")]);
        assert_eq!(get_field(&record, &["Locality", "City"]), "Shelbyville");
        assert_eq!(get_field(&record, &["City", "Locality"]), "Springfield");
    }

    #[test]
    fn first_physical_column_wins_for_same_candidate() {
        let record = Record::from_pairs([("zip", "111"), ("ZIP", "222")]);
        assert_eq!(get_field(&record, &["Zip"]), "111");
    }

    #[test]
    fn missing_field_is_blank() {
        let record = Record::from_pairs([("Colour", "blue")]);
        assert_eq!(get_field(&record, Field::Region.synonyms()), "");
        assert_eq!(record.field(Field::Region), None);
        assert_eq!(record.field_or_blank(Field::Region), "");
    }

    #[test]
    fn canonical_sets_hold_normalized_names() {
        let set = CanonicalSet::individuals();
        assert!(set.contains("firstname"));
        assert!(set.contains("focusneighbourhood"));
        assert!(!set.contains("facilitators"));
        let set = CanonicalSet::activities();
        assert!(set.contains("facilitators"));
        assert!(set.contains("type"));
    }
}
