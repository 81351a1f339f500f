use log::{debug, warn};

use crate::config::{MapError, RawRow, Record};
use crate::fields::{normalize_header, CanonicalSet};

/// Outcome of scanning the rows for a header.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct HeaderDetection {
    pub index: usize,
    /// Number of recognized column names in the chosen row.
    pub matches: usize,
    /// False when no row reached the threshold and the first row was assumed.
    pub found: bool,
}

fn count_matches(row: &RawRow, canonical: &CanonicalSet) -> usize {
    row.iter()
        .filter(|cell| canonical.contains(&normalize_header(cell)))
        .count()
}

/// Scans the rows in order and picks the first one with at least `min_matches`
/// recognized column names.
pub fn detect_header(raw_rows: &[RawRow], canonical: &CanonicalSet, min_matches: usize) -> HeaderDetection {
    for (index, row) in raw_rows.iter().enumerate() {
        let matches = count_matches(row, canonical);
        debug!("detect_header: row {} has {} matches", index, matches);
        if matches >= min_matches {
            return HeaderDetection {
                index,
                matches,
                found: true,
            };
        }
    }
    warn!(
        "No header row with at least {} known columns among {} rows, using the first row",
        min_matches,
        raw_rows.len()
    );
    HeaderDetection {
        index: 0,
        matches: raw_rows.first().map(|r| count_matches(r, canonical)).unwrap_or(0),
        found: false,
    }
}

/// The index of the header row. Falls back to 0 when nothing matches.
pub fn find_header_row(raw_rows: &[RawRow], canonical: &CanonicalSet, min_matches: usize) -> usize {
    detect_header(raw_rows, canonical, min_matches).index
}

/// Builds the records that follow the header row.
///
/// Header cells are trimmed and become the column names; blank header cells are ignored.
/// Rows with only blank cells are dropped, and missing trailing cells read as blank.
pub fn records_from_rows(raw_rows: &[RawRow], header_index: usize) -> Result<Vec<Record>, MapError> {
    if raw_rows.is_empty() {
        return Ok(Vec::new());
    }
    let header = raw_rows.get(header_index).ok_or(MapError::HeaderOutOfRange {
        index: header_index,
        rows: raw_rows.len(),
    })?;
    let columns: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .map(|(idx, name)| (idx, name.trim().to_string()))
        .filter(|(_, name)| !name.is_empty())
        .collect();
    debug!("records_from_rows: columns: {:?}", columns);

    let mut res: Vec<Record> = Vec::new();
    for row in raw_rows.iter().skip(header_index + 1) {
        let mut record = Record::new();
        for (idx, name) in columns.iter() {
            let value = row.get(*idx).map(|s| s.as_str()).unwrap_or("");
            record.push(name.clone(), value);
        }
        if record.is_blank() {
            continue;
        }
        res.push(record);
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<RawRow> {
        data.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn header_after_title_and_blank_rows() {
        let data = rows(&[
            &["Community roster", "", ""],
            &["", "", ""],
            &["Exported 2024-01-01"],
            &["First Name", "Last_Name", "ADDRESS"],
            &["Jane", "Doe", "1 Main St"],
        ]);
        let set = CanonicalSet::individuals();
        assert_eq!(find_header_row(&data, &set, 2), 3);
        let detection = detect_header(&data, &set, 2);
        assert!(detection.found);
        assert_eq!(detection.matches, 3);
    }

    #[test]
    fn first_qualifying_row_wins() {
        let data = rows(&[
            &["Notes", "First Name"],
            &["First Name", "Last Name"],
            &["Firstname", "Lastname", "City"],
        ]);
        assert_eq!(find_header_row(&data, &CanonicalSet::individuals(), 2), 1);
    }

    #[test]
    fn no_header_falls_back_to_first_row() {
        let data = rows(&[&["a", "b"], &["c", "d"]]);
        let detection = detect_header(&data, &CanonicalSet::activities(), 2);
        assert_eq!(detection.index, 0);
        assert!(!detection.found);
        assert_eq!(find_header_row(&[], &CanonicalSet::activities(), 2), 0);
    }

    #[test]
    fn threshold_is_respected() {
        let data = rows(&[&["Type", "Comment"], &["Type", "Facilitators"]]);
        let set = CanonicalSet::activities();
        assert_eq!(find_header_row(&data, &set, 1), 0);
        assert_eq!(find_header_row(&data, &set, 2), 1);
    }

    #[test]
    fn records_follow_the_header() {
        let data = rows(&[
            &["Title"],
            &["Type", "", "Facilitators"],
            &["Study Circle", "ignored", "Jane Doe"],
            &["", "", ""],
            &["Devotional"],
        ]);
        let records = records_from_rows(&data, 1).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            Record::from_pairs([("Type", "Study Circle"), ("Facilitators", "Jane Doe")])
        );
        assert_eq!(
            records[1],
            Record::from_pairs([("Type", "Devotional"), ("Facilitators", "")])
        );
    }

    #[test]
    fn header_index_out_of_range() {
        let data = rows(&[&["Type"]]);
        assert_eq!(
            records_from_rows(&data, 4),
            Err(MapError::HeaderOutOfRange { index: 4, rows: 1 })
        );
        assert_eq!(records_from_rows(&[], 4), Ok(vec![]));
    }
}
