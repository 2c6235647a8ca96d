//! Generic delimited-file reader with encoding and delimiter auto-detection.
//!
//! Turns a CSV export into rows keyed by column header. Nothing here knows
//! about DROID or list controls.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// One parsed row: column header → raw cell value.
pub type Row = HashMap<String, String>;

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct Table {
    /// Column headers, in file order
    pub headers: Vec<String>,
    /// Parsed rows, in file order
    pub rows: Vec<Row>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

impl Table {
    /// Whether the header row contains `column`.
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    // Valid UTF-8 wins outright; chardet is only consulted for legacy exports.
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;

    // Normalize charset names. Latin-1 exports from Windows tools are
    // really windows-1252, as browsers treat them.
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            "windows-1252".to_string()
        }
        "macroman" | "mac-roman" => "macintosh".to_string(),
        other => other.to_string(),
    }
}

/// Resolve an encoding name to an `encoding_rs` encoding.
fn lookup_encoding(encoding: &str) -> Option<&'static encoding_rs::Encoding> {
    match encoding.to_lowercase().as_str() {
        "latin-1" | "cp1252" => Some(encoding_rs::WINDOWS_1252),
        "macroman" | "mac-roman" => Some(encoding_rs::MACINTOSH),
        other => encoding_rs::Encoding::for_label(other.as_bytes()),
    }
}

/// Decode bytes to string using the specified encoding
///
/// Unknown encoding names fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match lookup_encoding(encoding) {
        Some(enc) => enc.decode(bytes).0.into_owned(),
        None => String::from_utf8_lossy(bytes).into_owned(),
    };

    match decoded.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Comma wins ties and is the default when no candidate appears.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse delimited text with an explicit delimiter.
///
/// Quoted cells may contain delimiters and line breaks. Short rows are padded
/// with empty cells; extra cells beyond the header are ignored; blank lines
/// are skipped.
///
/// # Example
/// ```
/// use rosetta_csv::parser::parse_str;
///
/// let table = parse_str("name,title\nR1,\"A, B\"", ',').unwrap();
/// assert_eq!(table.rows.len(), 1);
/// assert_eq!(table.rows[0]["title"], "A, B");
/// ```
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<Table> {
    parse_with_metadata(content, delimiter, "utf-8".to_string())
}

fn parse_with_metadata(content: &str, delimiter: char, encoding: String) -> CsvResult<Table> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let delimiter_byte = u8::try_from(delimiter).map_err(|_| CsvError::Parse {
        line: 1,
        message: format!("delimiter '{}' is not a single byte", delimiter),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| to_parse_error(&e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| to_parse_error(&e))?;

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();

        rows.push(row);
    }

    Ok(Table {
        headers,
        rows,
        encoding,
        delimiter,
    })
}

fn to_parse_error(err: &csv::Error) -> CsvError {
    CsvError::Parse {
        line: err.position().map(|p| p.line()).unwrap_or(0),
        message: err.to_string(),
    }
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<Table> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    parse_with_metadata(&content, delimiter, encoding)
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let table = parse_file_auto("droid.csv")?;
/// println!("Encoding: {}, Delimiter: '{}'", table.encoding, table.delimiter);
/// println!("Rows: {}", table.rows.len());
/// ```
pub fn parse_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<Table> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| CsvError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_bytes_auto(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let table = parse_str("name,age\nAlice,30\nBob,25", ',').unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["name"], "Alice");
        assert_eq!(table.rows[0]["age"], "30");
        assert_eq!(table.rows[1]["name"], "Bob");
        assert_eq!(table.rows[1]["age"], "25");
    }

    #[test]
    fn test_quoted_values_keep_delimiters() {
        let csv = "Item Code,Description\nR1,\"Last Save Date: 2006, Last Accessed: 2017\"";
        let table = parse_str(csv, ',').unwrap();

        assert_eq!(
            table.rows[0]["Description"],
            "Last Save Date: 2006, Last Accessed: 2017"
        );
    }

    #[test]
    fn test_backslashes_preserved() {
        let csv = "FILE_PATH,NAME\nR:\\mock_transfer\\a.doc ,a.doc";
        let table = parse_str(csv, ',').unwrap();

        assert_eq!(table.rows[0]["FILE_PATH"], "R:\\mock_transfer\\a.doc ");
    }

    #[test]
    fn test_empty_lines_skipped() {
        let table = parse_str("a,b\n1,2\n\n3,4\n", ',').unwrap();
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_missing_values() {
        let table = parse_str("a,b,c\n1,,3\n4", ',').unwrap();

        assert_eq!(table.rows[0]["b"], "");
        assert_eq!(table.rows[1]["a"], "4");
        assert_eq!(table.rows[1]["c"], "");
    }

    #[test]
    fn test_extra_columns_ignored() {
        let table = parse_str("a,b\n1,2,3,4", ',').unwrap();

        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.rows[0]["b"], "2");
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_str("", ','), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_str("  \n", ','), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_has_column() {
        let table = parse_str("RECORDNUMBER,NOTEDATE\nR1,2017", ',').unwrap();
        assert!(table.has_column("NOTEDATE"));
        assert!(!table.has_column("NOTETEXT"));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_auto_parse_strips_bom() {
        let bytes = "\u{feff}ID,NAME\n1,a.doc".as_bytes();
        let table = parse_bytes_auto(bytes).unwrap();

        assert_eq!(table.encoding, "utf-8");
        assert_eq!(table.headers, vec!["ID", "NAME"]);
    }

    #[test]
    fn test_utf8_not_redetected() {
        let bytes = "Title\n2006-07 Rule Programme ‚Äì MoU".as_bytes();
        let table = parse_bytes_auto(bytes).unwrap();
        assert_eq!(table.rows[0]["Title"], "2006-07 Rule Programme ‚Äì MoU");
    }

    #[test]
    fn test_windows_1252_decoding() {
        // "Société" in windows-1252
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "windows-1252");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_latin1_label_decodes_as_windows_1252() {
        // en dash and curly quotes live in the 0x80-0x9F range
        let bytes = b"Rule Programme \x96 \x93MoU\x94";
        assert_eq!(
            decode_content(bytes, "iso-8859-1"),
            "Rule Programme \u{2013} \u{201c}MoU\u{201d}"
        );
        assert_eq!(
            decode_content(bytes, "latin-1"),
            decode_content(bytes, "windows-1252")
        );
    }

    #[test]
    fn test_other_legacy_encodings() {
        // "Привет" in windows-1251
        let cyrillic: &[u8] = &[0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2];
        assert_eq!(decode_content(cyrillic, "windows-1251"), "Привет");

        // "café" in Mac Roman
        let mac: &[u8] = &[0x63, 0x61, 0x66, 0x8E];
        assert_eq!(decode_content(mac, "MacRoman"), "café");
    }

    #[test]
    fn test_unknown_encoding_falls_back_to_utf8() {
        assert_eq!(decode_content(b"plain", "no-such-charset"), "plain");
    }

    #[test]
    fn test_auto_parse_windows_1252_export() {
        let bytes =
            b"Item Code,Title\nR1,2006-07 Rule Programme \x96 MoU invitation to submit\n";
        let table = parse_bytes_auto(bytes).unwrap();

        assert_eq!(table.encoding, "windows-1252");
        assert_eq!(
            table.rows[0]["Title"],
            "2006-07 Rule Programme \u{2013} MoU invitation to submit"
        );
    }

    #[test]
    fn test_file_not_found() {
        let err = parse_file_auto("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, CsvError::Io { .. }));
    }
}
