use std::path::Path;

use calamine::DataType;

use crate::mapping::io_csv::read_csv_rows;
use crate::mapping::io_xlsx::read_excel_rows;
use crate::mapping::*;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum FileKind {
    Csv,
    Xlsx,
}

pub fn file_kind(path: &str) -> MapResult<FileKind> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext.as_deref() {
        Some("csv") | Some("txt") => Ok(FileKind::Csv),
        Some("xlsx") | Some("xlsm") => Ok(FileKind::Xlsx),
        _ => whatever!("Cannot read {}: expected a .csv or .xlsx file", path),
    }
}

/// Reads all the rows of a spreadsheet, every cell as a string.
pub fn read_rows(path: &str, worksheet: Option<&str>) -> MapResult<Vec<RawRow>> {
    info!("Attempting to read file {:?}", path);
    let rows = match file_kind(path)? {
        FileKind::Csv => read_csv_rows(path)?,
        FileKind::Xlsx => read_excel_rows(path, worksheet)?,
    };
    debug!("read_rows: {:?}: {} rows", path, rows.len());
    Ok(rows)
}

/// The text of a cell. Whole numbers lose their fractional part, so that postal codes
/// such as 12345 read the same as in the sheet.
pub fn render_cell(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", *f as i64)
        }
        DataType::Float(f) => f.to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::DateTime(f) => f.to_string(),
        DataType::Error(e) => {
            debug!("render_cell: error cell {:?} read as blank", e);
            String::new()
        }
        DataType::Empty => String::new(),
    }
}
