use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::mapping::io_common::render_cell;
use crate::mapping::*;

pub fn read_excel_rows(path: &str, worksheet: Option<&str>) -> MapResult<Vec<RawRow>> {
    let wrange = get_range(path, worksheet)?;
    let mut res: Vec<RawRow> = Vec::new();
    for (idx, row) in wrange.rows().enumerate() {
        let cells: RawRow = row.iter().map(render_cell).collect();
        debug!("read_excel_rows: idx: {:?} row: {:?}", idx, &cells);
        res.push(cells);
    }
    Ok(res)
}

fn get_range(path: &str, worksheet_name_o: Option<&str>) -> MapResult<Range<DataType>> {
    debug!(
        "read_excel_file: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let wrange = workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::{CompressionMethod, ZipWriter};

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/></Types>"#;

    const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Notes" sheetId="1" r:id="rId1"/><sheet name="People" sheetId="2" r:id="rId2"/></sheets></workbook>"#;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/></Relationships>"#;

    const SHARED_STRINGS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="4" uniqueCount="4"><si><t>Exported roster</t></si><si><t>First Name</t></si><si><t>Postal Code</t></si><si><t>Jane</t></si></sst>"#;

    const NOTES_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" t="s"><v>0</v></c></row></sheetData></worksheet>"#;

    const PEOPLE_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" t="s"><v>1</v></c><c r="B1" t="s"><v>2</v></c></row><row r="2"><c r="A2" t="s"><v>3</v></c><c r="B2"><v>12345</v></c></row></sheetData></worksheet>"#;

    /// A workbook with a "Notes" sheet first and a "People" sheet second.
    fn two_sheet_workbook() -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let mut zip = ZipWriter::new(file.reopen().unwrap());
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, contents) in [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/sharedStrings.xml", SHARED_STRINGS),
            ("xl/worksheets/sheet1.xml", NOTES_SHEET),
            ("xl/worksheets/sheet2.xml", PEOPLE_SHEET),
        ] {
            zip.start_file(name, options).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        file
    }

    fn row(cells: &[&str]) -> RawRow {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn first_worksheet_by_default() {
        let file = two_sheet_workbook();
        let path = file.path().display().to_string();
        let rows = read_excel_rows(&path, None).unwrap();
        assert_eq!(rows, vec![row(&["Exported roster"])]);
    }

    #[test]
    fn named_worksheet() {
        let file = two_sheet_workbook();
        let path = file.path().display().to_string();
        let rows = read_excel_rows(&path, Some("People")).unwrap();
        assert_eq!(
            rows,
            vec![row(&["First Name", "Postal Code"]), row(&["Jane", "12345"])]
        );
    }

    #[test]
    fn unknown_worksheet_is_an_error() {
        let file = two_sheet_workbook();
        let path = file.path().display().to_string();
        let res = read_excel_rows(&path, Some("Roster"));
        assert!(
            matches!(res, Err(MapCliError::MissingWorksheet { ref name, .. }) if name == "Roster")
        );
    }

    #[test]
    fn unreadable_workbooks_are_errors() {
        let res = read_excel_rows("/nonexistent/people.xlsx", None);
        assert!(matches!(res, Err(MapCliError::OpeningExcel { .. })));

        let mut f = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        f.write_all(b"First Name,Last Name\n").unwrap();
        let path = f.path().display().to_string();
        assert!(matches!(
            read_excel_rows(&path, None),
            Err(MapCliError::OpeningExcel { .. })
        ));
    }
}
