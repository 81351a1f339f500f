// Primitives for reading CSV files.

use crate::mapping::*;

pub fn read_csv_rows(path: &str) -> MapResult<Vec<RawRow>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut res: Vec<RawRow> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let row: RawRow = line.iter().map(|s| s.to_string()).collect();
        debug!("read_csv_rows: lineno: {:?} row: {:?}", lineno, &row);
        res.push(row);
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn ragged_rows_are_kept() {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(f, "Roster").unwrap();
        writeln!(f, "First Name,Last Name,Address").unwrap();
        writeln!(f, "Jane,Doe,\"1 Main St, Unit 2\"").unwrap();
        let path = f.path().display().to_string();

        let rows = read_csv_rows(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["Roster".to_string()]);
        assert_eq!(rows[2][2], "1 Main St, Unit 2");
    }
}
