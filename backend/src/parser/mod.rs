//! CSV loader with encoding auto-detection.
//!
//! Reads an FBref export into a [`LoadedTable`]. With
//! [`HeaderRows::Two`] the first two lines become [`HeaderPair`]s; the
//! normalizer flattens them later. No column-name cleanup happens here.

use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::models::{Header, HeaderPair, HeaderRows, LoadedTable, Value};

/// Options for [`load`] and [`load_bytes`].
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub header_rows: HeaderRows,
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            header_rows: HeaderRows::One,
            delimiter: b',',
        }
    }
}

impl LoadOptions {
    pub fn two_level() -> Self {
        Self {
            header_rows: HeaderRows::Two,
            ..Self::default()
        }
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    // Short UTF-8 inputs (a lone "3–0") can fool the detector
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string. Unknown encodings fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> LoadResult<String> {
    let text = match encoding {
        "utf-8" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            // chardet sometimes calls Latin-1 player names UTF-8
            Err(_) => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        },
        "iso-8859-1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    if text.contains('\u{FFFD}') && encoding != "utf-8" {
        return Err(LoadError::Encoding(encoding.to_string()));
    }

    Ok(text.strip_prefix('\u{FEFF}').map(str::to_string).unwrap_or(text))
}

/// Read a CSV file from disk.
///
/// # Example
/// ```ignore
/// use fbref_lessons::parser::{load, LoadOptions};
///
/// let players = load("fbref_player_data.csv", LoadOptions::two_level())?;
/// println!("{} columns, {} rows", players.header.len(), players.rows.len());
/// ```
pub fn load<P: AsRef<Path>>(path: P, options: LoadOptions) -> LoadResult<LoadedTable> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    load_bytes(&bytes, options)
}

/// Parse CSV bytes with encoding auto-detection.
pub fn load_bytes(bytes: &[u8], options: LoadOptions) -> LoadResult<LoadedTable> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    parse_str(&content, options)
}

/// Parse already-decoded CSV text.
pub fn parse_str(content: &str, options: LoadOptions) -> LoadResult<LoadedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(content.as_bytes());

    let wanted = options.header_rows.count();
    let mut header_lines: Vec<Vec<String>> = Vec::with_capacity(wanted);
    let mut rows = Vec::new();
    let mut width = 0;

    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if header_lines.len() < wanted {
            let cells: Vec<String> = record.iter().map(|c| c.trim().to_string()).collect();
            if header_lines.is_empty() {
                width = cells.len();
            } else if cells.len() != width {
                return Err(LoadError::Malformed {
                    line,
                    expected: width,
                    found: cells.len(),
                });
            }
            header_lines.push(cells);
            continue;
        }

        if record.len() != width {
            return Err(LoadError::Malformed {
                line,
                expected: width,
                found: record.len(),
            });
        }
        rows.push(record.iter().map(Value::infer).collect());
    }

    if header_lines.len() < wanted {
        return Err(LoadError::EmptyFile(wanted));
    }

    let header = match options.header_rows {
        HeaderRows::One => Header::Flat(header_lines.remove(0)),
        HeaderRows::Two => {
            let lower = header_lines.remove(1);
            let upper = header_lines.remove(0);
            Header::TwoLevel(
                upper
                    .into_iter()
                    .zip(lower)
                    .map(|(u, l)| HeaderPair {
                        upper: primary_header(u),
                        lower: l,
                    })
                    .collect(),
            )
        }
    };

    Ok(LoadedTable { header, rows })
}

/// Top header cell, or `None` when it carries no primary header.
fn primary_header(cell: String) -> Option<String> {
    if cell.is_empty() || cell.contains("Unnamed") {
        None
    } else {
        Some(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flat_header_keeps_duplicates() {
        let csv = "Wk,Home,xG,Score,xG,Away\n1,Arsenal,2.1,3–0,0.4,Leeds\n";
        let table = parse_str(csv, LoadOptions::default()).unwrap();

        assert_eq!(
            table.header,
            Header::Flat(vec![
                "Wk".into(),
                "Home".into(),
                "xG".into(),
                "Score".into(),
                "xG".into(),
                "Away".into()
            ])
        );
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][0], Value::Int(1));
        assert_eq!(table.rows[0][2], Value::Float(2.1));
        assert_eq!(table.rows[0][3], Value::from("3–0"));
    }

    #[test]
    fn test_two_level_header_sentinel() {
        let csv = ",,Playing Time,Unnamed: 3_level_0\nRk,Player,Min,Born\n1,Bukayo Saka,\"2,845\",2001\n";
        let table = parse_str(csv, LoadOptions::two_level()).unwrap();

        match table.header {
            Header::TwoLevel(pairs) => {
                assert_eq!(pairs[0], HeaderPair::new(None, "Rk"));
                assert_eq!(pairs[2], HeaderPair::new(Some("Playing Time"), "Min"));
                assert_eq!(pairs[3], HeaderPair::new(None, "Born"));
            }
            other => panic!("expected two-level header, got {:?}", other),
        }
        assert_eq!(table.rows[0][2], Value::from("2,845"));
    }

    #[test]
    fn test_ragged_row_is_malformed() {
        let csv = "a,b,c\n1,2,3\n4,5\n";
        let err = parse_str(csv, LoadOptions::default()).unwrap_err();
        match err {
            LoadError::Malformed { line, expected, found } => {
                assert_eq!(line, 3);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_second_header_line() {
        let err = parse_str("a,b\n", LoadOptions::two_level()).unwrap_err();
        assert!(matches!(err, LoadError::EmptyFile(2)));
    }

    #[test]
    fn test_empty_score_is_null() {
        let csv = "Home,Score,Away\nChelsea,,Everton\n";
        let table = parse_str(csv, LoadOptions::default()).unwrap();
        assert_eq!(table.rows[0][1], Value::Null);
    }

    #[test]
    fn test_file_not_found() {
        let err = load("/definitely/not/here.csv", LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }

    #[test]
    fn test_load_from_disk_strips_bom() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all("\u{FEFF}Wk,Home\n1,Arsenal\n".as_bytes()).unwrap();

        let table = load(file.path(), LoadOptions::default()).unwrap();
        assert_eq!(table.header, Header::Flat(vec!["Wk".into(), "Home".into()]));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Ødegaard" in ISO-8859-1
        let bytes: &[u8] = &[0xD8, 0x64, 0x65, 0x67, 0x61, 0x61, 0x72, 0x64];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Ødegaard");
    }
}
