//! The input table: one flanged tube per row.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::TableError;

/// One shape to build.
///
/// Columns are positional: `identifier,H1,H2,H3,D1,D2,D3,D4,x_position`
/// followed by an optional unused column.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Row {
    /// Name of the shape; used for its intermediate file and final label.
    pub identifier: String,
    /// Base flange height.
    pub h1: f64,
    /// Shaft height.
    pub h2: f64,
    /// Top flange height.
    pub h3: f64,
    /// Top flange diameter.
    pub d1: f64,
    /// Base flange diameter.
    pub d2: f64,
    /// Shaft diameter.
    pub d3: f64,
    /// Bore diameter.
    pub d4: f64,
    /// Offset along X in the merged model.
    pub x_position: f64,
    /// Trailing column, carried but unused.
    #[serde(default)]
    pub extra: Option<f64>,
}

/// Read the table at `path`, skipping its header line.
pub fn read_table(path: &Path) -> Result<Vec<Row>, TableError> {
    let file = std::fs::File::open(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_rows(file)
}

/// Read table rows from any reader, skipping the header line.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<Row>, TableError> {
    let mut table = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    let mut seen = HashSet::new();
    for (i, record) in table.records().enumerate() {
        // Header is line 1.
        let fallback_line = i as u64 + 2;
        let record = record.map_err(|source| TableError::Record {
            line: source
                .position()
                .map_or(fallback_line, |p| p.line()),
            source,
        })?;
        let line = record.position().map_or(fallback_line, |p| p.line());
        let row: Row = record
            .deserialize(None)
            .map_err(|source| TableError::Record { line, source })?;

        if row.identifier.is_empty() {
            return Err(TableError::EmptyIdentifier(line));
        }
        if !seen.insert(row.identifier.clone()) {
            return Err(TableError::DuplicateIdentifier {
                line,
                identifier: row.identifier,
            });
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
name,H1,H2,H3,D1,D2,D3,D4,X,note
A,10,50,10,100,100,60,40,0,0
B, 8 ,40,6,90,80,50,30,120
";

    #[test]
    fn test_read_rows() {
        let rows = read_rows(TABLE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].identifier, "A");
        assert_eq!(rows[0].d3, 60.0);
        assert_eq!(rows[0].extra, Some(0.0));
        assert_eq!(rows[1].h1, 8.0);
        assert_eq!(rows[1].x_position, 120.0);
        assert_eq!(rows[1].extra, None);
    }

    #[test]
    fn test_header_only() {
        assert!(read_rows("id,H1\n".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_bad_number_names_line() {
        let table = "h\nA,10,50,10,100,100,60,40,0\nB,10,x,10,100,100,60,40,0\n";
        match read_rows(table.as_bytes()) {
            Err(TableError::Record { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected record error, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_commas_rejected() {
        assert!(matches!(
            read_rows("h\n,,,,,,,,\n".as_bytes()),
            Err(TableError::Record { line: 2, .. })
        ));
    }

    #[test]
    fn test_missing_column() {
        let table = "h\nA,10,50,10,100,100,60\n";
        assert!(matches!(
            read_rows(table.as_bytes()),
            Err(TableError::Record { line: 2, .. })
        ));
    }

    #[test]
    fn test_duplicate_identifier() {
        let table = "h\nA,10,50,10,100,100,60,40,0\nA,10,50,10,100,100,60,40,200\n";
        assert!(matches!(
            read_rows(table.as_bytes()),
            Err(TableError::DuplicateIdentifier { line: 3, .. })
        ));
    }

    #[test]
    fn test_empty_identifier() {
        let table = "h\n,10,50,10,100,100,60,40,0\n";
        assert!(matches!(
            read_rows(table.as_bytes()),
            Err(TableError::EmptyIdentifier(2))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_table(&dir.path().join("absent.csv")),
            Err(TableError::Io { .. })
        ));
    }
}
