use std::collections::HashSet;
use std::io::{Cursor, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Range, Reader};

use super::model::{CellValue, Column, ColumnKind, Dataset};

/// Strings read as missing values in delimited text.
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a file on disk.  Dispatch by file name.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    load_reader(name, file)
}

/// Load a dataset from an in-memory upload (e.g. a dropped file without a path).
pub fn load_bytes(name: &str, bytes: &[u8]) -> Result<Dataset> {
    load_reader(name, bytes)
}

/// Parse `reader` as CSV when `name` ends in `.csv`, otherwise as a
/// spreadsheet workbook.
pub fn load_reader<R: Read>(name: &str, mut reader: R) -> Result<Dataset> {
    if is_csv_name(name) {
        return load_csv(reader).with_context(|| format!("parsing CSV file '{name}'"));
    }
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .with_context(|| format!("reading '{name}'"))?;
    load_workbook(bytes).with_context(|| format!("parsing workbook '{name}'"))
}

fn is_csv_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".csv")
}

/// File extensions offered by the open dialog and accepted on drop.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["csv", "xlsx"];

/// Whether `name` carries one of [`SUPPORTED_EXTENSIONS`] (any case).
pub fn is_supported(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

// ---------------------------------------------------------------------------
// Header normalisation
// ---------------------------------------------------------------------------

/// Blank headers become `Unnamed: {i}`; repeated headers get `.1`, `.2`, ...
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, h)| {
            let base = if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h
            };
            let mut name = base.clone();
            let mut suffix = 1;
            while seen.contains(&name) {
                name = format!("{base}.{suffix}");
                suffix += 1;
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per row.  Short records are
/// padded with missing values; records with extra fields are rejected.
fn load_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = unique_headers(
        reader
            .headers()
            .context("reading CSV headers")?
            .iter()
            .map(|h| h.to_string())
            .collect(),
    );

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > headers.len() {
            bail!(
                "CSV row {row_no}: expected {} fields, saw {}",
                headers.len(),
                record.len()
            );
        }
        for (col_idx, cells) in raw.iter_mut().enumerate() {
            let cell = record
                .get(col_idx)
                .filter(|s| !NA_MARKERS.contains(s))
                .map(str::to_string);
            cells.push(cell);
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| infer_text_column(name, cells))
        .collect();
    Ok(Dataset::from_columns(columns))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

fn to_integer(s: &str) -> CellValue {
    s.trim().parse().map_or(CellValue::Null, CellValue::Integer)
}

fn to_float(s: &str) -> CellValue {
    s.trim().parse().map_or(CellValue::Null, CellValue::Float)
}

fn to_bool(s: &str) -> CellValue {
    parse_bool(s.trim()).map_or(CellValue::Null, CellValue::Bool)
}

fn to_text(s: &str) -> CellValue {
    CellValue::String(s.to_string())
}

/// Pick a single dtype for a column of raw text cells.
fn infer_text_column(name: String, cells: Vec<Option<String>>) -> Column {
    let present = || cells.iter().flatten().map(|s| s.trim());
    let has_nulls = cells.iter().any(Option::is_none);

    let any_present = present().next().is_some();
    let all_int = present().all(|s| s.parse::<i64>().is_ok());
    let all_float = present().all(|s| s.parse::<f64>().is_ok());
    let all_bool = present().all(|s| parse_bool(s).is_some());

    let (kind, convert): (ColumnKind, fn(&str) -> CellValue) = if cells.is_empty() {
        // Header-only file: nothing to infer from.
        (ColumnKind::Text, to_text)
    } else if any_present && all_int && !has_nulls {
        (ColumnKind::Integer, to_integer)
    } else if all_float {
        // Also covers all-missing columns and integers with gaps.
        (ColumnKind::Float, to_float)
    } else if all_bool {
        (ColumnKind::Boolean, to_bool)
    } else {
        (ColumnKind::Text, to_text)
    };

    let values = cells
        .iter()
        .map(|c| c.as_deref().map_or(CellValue::Null, convert))
        .collect();
    Column { name, kind, values }
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

/// Read the first worksheet of an xlsx / xlsm / xls / ods workbook.
fn load_workbook(bytes: Vec<u8>) -> Result<Dataset> {
    let mut workbook =
        calamine::open_workbook_auto_from_rs(Cursor::new(bytes)).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;
    Ok(dataset_from_range(&range))
}

/// First row is the header; everything below it is data.
fn dataset_from_range(range: &Range<Data>) -> Dataset {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Dataset::from_columns(Vec::new());
    };
    let headers = unique_headers(header_row.iter().map(|c| c.to_string()).collect());

    let mut raw: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (col_idx, cells) in raw.iter_mut().enumerate() {
            cells.push(row.get(col_idx).map_or(CellValue::Null, cell_value));
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, values)| infer_workbook_column(name, values))
        .collect();
    Dataset::from_columns(columns)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| CellValue::Date(d.to_string()))
            .unwrap_or(CellValue::Float(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Date(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

/// Choose a dtype for typed workbook cells; mixed columns keep their values as-is.
fn infer_workbook_column(name: String, values: Vec<CellValue>) -> Column {
    let present = || values.iter().filter(|v| !v.is_missing());
    let has_nulls = values.iter().any(CellValue::is_missing);

    let all_numeric = present().all(|v| v.as_f64().is_some());
    let all_integral = present().all(|v| match v {
        CellValue::Integer(_) => true,
        CellValue::Float(f) => f.fract() == 0.0 && f.abs() < i64::MAX as f64,
        _ => false,
    });
    let any_present = present().next().is_some();

    if all_numeric && all_integral && any_present && !has_nulls {
        let values = values
            .into_iter()
            .map(|v| match v {
                CellValue::Float(f) => CellValue::Integer(f as i64),
                other => other,
            })
            .collect();
        return Column { name, kind: ColumnKind::Integer, values };
    }
    if all_numeric {
        let values = values
            .iter()
            .map(|v| v.as_f64().map_or(CellValue::Null, CellValue::Float))
            .collect();
        return Column { name, kind: ColumnKind::Float, values };
    }

    let kind = if present().all(|v| matches!(v, CellValue::Bool(_))) {
        ColumnKind::Boolean
    } else if present().all(|v| matches!(v, CellValue::Date(_))) {
        ColumnKind::DateTime
    } else {
        ColumnKind::Text
    };
    Column { name, kind, values }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn csv(text: &str) -> Dataset {
        load_bytes("upload.csv", text.as_bytes()).unwrap()
    }

    #[test]
    fn three_row_csv_scenario() {
        let ds = csv("a,b\n1,x\n2,y\n3,z\n");
        assert_eq!(ds.shape(), (3, 2));
        assert_eq!(ds.column_names(), vec!["a", "b"]);
        assert_eq!(ds.columns()[0].kind, ColumnKind::Integer);
        assert_eq!(ds.columns()[1].kind, ColumnKind::Text);
        assert_eq!(ds.columns()[1].values[2], CellValue::String("z".into()));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let ds = load_bytes("DATA.CSV", b"a\n1\n").unwrap();
        assert_eq!(ds.shape(), (1, 1));
    }

    #[test]
    fn non_csv_names_are_parsed_as_workbooks() {
        let err = load_bytes("data.txt", b"a,b\n1,2\n").unwrap_err();
        assert!(format!("{err:#}").contains("workbook"));
    }

    #[test]
    fn integers_with_gaps_become_floats() {
        let ds = csv("a,b\n1,x\nNA,y\n3,z\n");
        let a = &ds.columns()[0];
        assert_eq!(a.kind, ColumnKind::Float);
        assert_eq!(a.values[0], CellValue::Float(1.0));
        assert_eq!(a.null_count(), 1);
    }

    #[test]
    fn mixed_numbers_and_text_stay_text() {
        let ds = csv("a\n1\nx\n2.5\n");
        let a = &ds.columns()[0];
        assert_eq!(a.kind, ColumnKind::Text);
        assert_eq!(a.values[0], CellValue::String("1".into()));
    }

    #[test]
    fn boolean_columns_are_detected() {
        let ds = csv("flag\nTrue\nfalse\n\n");
        let flag = &ds.columns()[0];
        assert_eq!(flag.kind, ColumnKind::Boolean);
        assert_eq!(flag.values, vec![CellValue::Bool(true), CellValue::Bool(false)]);
    }

    #[test]
    fn header_only_csv_has_text_columns() {
        let ds = csv("a,b\n");
        assert_eq!(ds.shape(), (0, 2));
        assert!(ds.columns().iter().all(|c| c.kind == ColumnKind::Text));
    }

    #[test]
    fn supported_extensions_match_the_dialog() {
        assert!(is_supported("data.csv"));
        assert!(is_supported("Report.XLSX"));
        assert!(!is_supported("sheet.ods"));
        assert!(!is_supported("legacy.xls"));
        assert!(!is_supported("notes.txt"));
        assert!(!is_supported("csv"));
    }

    #[test]
    fn all_missing_column_is_float() {
        let ds = csv("a,b\n1,\n2,\n");
        assert_eq!(ds.columns()[1].kind, ColumnKind::Float);
        assert_eq!(ds.columns()[1].null_count(), 2);
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_rejected() {
        let ds = csv("a,b,c\n1,2\n");
        assert_eq!(ds.columns()[2].values, vec![CellValue::Null]);

        let err = load_bytes("x.csv", b"a,b\n1,2,3\n").unwrap_err();
        assert!(format!("{err:#}").contains("expected 2 fields"));
    }

    #[test]
    fn duplicate_and_blank_headers_are_renamed() {
        let ds = csv("a,a,,a.1\n1,2,3,4\n");
        assert_eq!(ds.column_names(), vec!["a", "a.1", "Unnamed: 2", "a.1.1"]);
    }

    #[test]
    fn load_file_reads_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "x,y\n1,2.5\n2,3.5\n").unwrap();
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.shape(), (2, 2));
        assert_eq!(ds.columns()[1].kind, ColumnKind::Float);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("here.csv"));
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        assert!(load_bytes("bad.csv", b"a\n\xff\xfe\n").is_err());
    }

    #[test]
    fn xlsx_bytes_load_first_sheet_only() {
        let mut book = rust_xlsxwriter::Workbook::new();
        let first = book.add_worksheet();
        for (col, header) in ["id", "score", "label", "flag"].iter().enumerate() {
            first.write_string(0, col as u16, *header).unwrap();
        }
        for (i, (score, label, flag)) in
            [(1.5, "a", true), (2.5, "b", false), (4.0, "a", true)].iter().enumerate()
        {
            let row = i as u32 + 1;
            first.write_number(row, 0, row as f64).unwrap();
            first.write_number(row, 1, *score).unwrap();
            first.write_string(row, 2, *label).unwrap();
            first.write_boolean(row, 3, *flag).unwrap();
        }
        let second = book.add_worksheet();
        second.write_string(0, 0, "other").unwrap();
        for row in 1..=10 {
            second.write_number(row, 0, row as f64).unwrap();
        }
        let bytes = book.save_to_buffer().unwrap();

        let ds = load_bytes("t.xlsx", &bytes).unwrap();
        assert_eq!(ds.shape(), (3, 4));
        assert_eq!(ds.column_names(), vec!["id", "score", "label", "flag"]);
        let kinds: Vec<ColumnKind> = ds.columns().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![ColumnKind::Integer, ColumnKind::Float, ColumnKind::Text, ColumnKind::Boolean]
        );
        assert_eq!(ds.columns()[0].values[2], CellValue::Integer(3));
        assert!(ds.column("other").is_none());
    }

    #[test]
    fn worksheet_range_becomes_typed_columns() {
        let mut range: Range<Data> = Range::new((0, 0), (3, 2));
        range.set_value((0, 0), Data::String("id".into()));
        range.set_value((0, 1), Data::String("score".into()));
        range.set_value((0, 2), Data::String("label".into()));
        for (row, (score, label)) in [(1.5, "a"), (2.0, "b"), (3.5, "a")].iter().enumerate() {
            let r = row as u32 + 1;
            range.set_value((r, 0), Data::Float(r as f64));
            range.set_value((r, 1), Data::Float(*score));
            range.set_value((r, 2), Data::String(label.to_string()));
        }

        let ds = dataset_from_range(&range);
        assert_eq!(ds.shape(), (3, 3));
        assert_eq!(ds.columns()[0].kind, ColumnKind::Integer);
        assert_eq!(ds.columns()[0].values[0], CellValue::Integer(1));
        assert_eq!(ds.columns()[1].kind, ColumnKind::Float);
        assert_eq!(ds.columns()[2].kind, ColumnKind::Text);
    }

    #[test]
    fn empty_and_error_cells_are_missing() {
        let mut range: Range<Data> = Range::new((0, 0), (2, 0));
        range.set_value((0, 0), Data::String("v".into()));
        range.set_value((1, 0), Data::Int(4));
        range.set_value((2, 0), Data::Error(calamine::CellErrorType::Div0));

        let ds = dataset_from_range(&range);
        let v = &ds.columns()[0];
        assert_eq!(v.kind, ColumnKind::Float);
        assert_eq!(v.null_count(), 1);
    }

    #[test]
    fn empty_worksheet_gives_empty_dataset() {
        let range: Range<Data> = Range::empty();
        assert_eq!(dataset_from_range(&range).shape(), (0, 0));
    }
}
