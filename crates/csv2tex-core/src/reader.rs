//! CSV reader producing rows for the LaTeX emitter

use crate::error::{Error, Result};
use crate::options::RaggedRows;
use crate::table::{Row, Table};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use std::collections::VecDeque;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Lazy, single-pass sequence of rows read from comma-separated text
///
/// The first row fixes the expected field count. Under [`RaggedRows::Reject`]
/// any later row with a different count yields [`Error::MalformedRow`].
pub struct RowReader<R: Read> {
    records: csv::StringRecordsIntoIter<LineTracker<R>>,
    ragged: RaggedRows,
    expected: Option<usize>,
    position: usize,
}

impl<R: Read> RowReader<R> {
    /// Create a reader over comma-separated text
    pub fn new(reader: R, ragged: RaggedRows) -> Self {
        let records = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // field counts are checked per row below
            .from_reader(LineTracker::new(reader))
            .into_records();

        Self {
            records,
            ragged,
            expected: None,
            position: 0,
        }
    }

    /// Field count of the first row, once it has been read
    pub fn expected_columns(&self) -> Option<usize> {
        self.expected
    }

    /// 1-based source line a record starts on
    fn start_line(&mut self, record: &csv::StringRecord) -> u64 {
        match record.position() {
            Some(position) => self
                .records
                .reader_mut()
                .get_mut()
                .skip_terminators(position.byte(), position.line()),
            None => 0,
        }
    }
}

/// Input adapter remembering where line terminators occur
///
/// A record's csv position is taken before any blank lines (or the `\n` of a
/// CRLF pair) preceding it are skipped, so the terminators seen here are used
/// to move that position onto the record's first line.
struct LineTracker<R> {
    inner: R,
    offset: u64,
    terminators: VecDeque<(u64, u8)>,
}

impl<R> LineTracker<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            terminators: VecDeque::new(),
        }
    }

    /// Advance `line` past the run of terminators starting at `byte`
    fn skip_terminators(&mut self, byte: u64, line: u64) -> u64 {
        while self.terminators.front().is_some_and(|&(at, _)| at < byte) {
            self.terminators.pop_front();
        }

        let mut line = line;
        let mut next = byte;
        for &(at, b) in &self.terminators {
            if at != next {
                break;
            }
            if b == b'\n' {
                line += 1;
            }
            next += 1;
        }
        line
    }
}

impl<R: Read> Read for LineTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        for (i, &b) in buf[..n].iter().enumerate() {
            if b == b'\n' || b == b'\r' {
                self.terminators.push_back((self.offset + i as u64, b));
            }
        }
        self.offset += n as u64;
        Ok(n)
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(Error::Csv(e))),
        };

        self.position += 1;
        let line = self.start_line(&record);
        let found = record.len();

        match self.expected {
            None => self.expected = Some(found),
            Some(expected) if expected != found => match self.ragged {
                RaggedRows::Reject => {
                    return Some(Err(Error::MalformedRow {
                        row: self.position,
                        line,
                        expected,
                        found,
                    }));
                }
                RaggedRows::Pad => {
                    warn!(
                        row = self.position,
                        line,
                        expected,
                        found,
                        "ragged row will be padded"
                    );
                }
            },
            Some(_) => {}
        }

        let fields = record.iter().map(str::to_string).collect();
        Some(Ok(Row::new(self.position, fields)))
    }
}

/// Read every row from `reader` into a table
pub fn read_table<R: Read>(reader: R, source_path: PathBuf, ragged: RaggedRows) -> Result<Table> {
    let mut rows = RowReader::new(reader, ragged).collect::<Result<Vec<Row>>>()?;

    let columns = match ragged {
        RaggedRows::Reject => rows.first().map(Row::len).unwrap_or(0),
        RaggedRows::Pad => rows.iter().map(Row::len).max().unwrap_or(0),
    };

    for row in &mut rows {
        row.pad_to(columns);
    }

    debug!(
        rows = rows.len(),
        columns,
        source = %source_path.display(),
        "read CSV table"
    );

    Ok(Table {
        columns,
        rows,
        source_path,
        encoding: UTF_8.name().to_string(),
    })
}

/// Read a table from a string (useful for testing)
pub fn read_table_str(content: &str, source_name: &str, ragged: RaggedRows) -> Result<Table> {
    read_table(content.as_bytes(), PathBuf::from(source_name), ragged)
}

/// Read a table from a file, detecting its text encoding
pub fn read_table_file<P: AsRef<Path>>(path: P, ragged: RaggedRows) -> Result<Table> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::SourceNotFound {
        path: path.to_path_buf(),
        source: e,
    })?;

    let (content, encoding) = decode_bytes(&bytes);
    debug!(encoding = encoding.name(), path = %path.display(), "decoded input");

    let mut table = read_table(content.as_bytes(), path.to_path_buf(), ragged)?;
    table.encoding = encoding.name().to_string();
    Ok(table)
}

/// Decode raw input bytes
///
/// A byte-order mark wins; otherwise valid UTF-8 is taken as is and anything
/// else is decoded as Windows-1252, which accepts every byte sequence.
pub fn decode_bytes(bytes: &[u8]) -> (String, &'static Encoding) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return (text.into_owned(), encoding);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), UTF_8),
        Err(_) => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            (text.into_owned(), WINDOWS_1252)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_simple_csv() {
        let csv = "name,score\nAlice,90\nBob,85\n";
        let table = read_table_str(csv, "test.csv", RaggedRows::Reject).unwrap();

        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.rows[0].fields, vec!["name", "score"]);
        assert_eq!(table.rows[2].fields, vec!["Bob", "85"]);
        assert_eq!(table.rows[2].index, 3);
    }

    #[test]
    fn test_quoted_fields_are_dequoted() {
        let csv = "a,b\n\"x, y\",\"say \"\"hi\"\"\"\n";
        let table = read_table_str(csv, "test.csv", RaggedRows::Reject).unwrap();

        assert_eq!(table.rows[1].fields, vec!["x, y", "say \"hi\""]);
    }

    #[test]
    fn test_ragged_row_rejected() {
        let csv = "a,b\n1,2,3\n";
        match read_table_str(csv, "test.csv", RaggedRows::Reject) {
            Err(Error::MalformedRow {
                row,
                line,
                expected,
                found,
            }) => {
                assert_eq!(row, 2);
                assert_eq!(line, 2);
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("expected malformed row, got {:?}", other),
        }
    }

    #[test]
    fn test_short_row_rejected() {
        let csv = "a,b,c\n1,2,3\n4,5\n";
        let err = read_table_str(csv, "test.csv", RaggedRows::Reject).unwrap_err();
        assert!(matches!(err, Error::MalformedRow { row: 3, expected: 3, found: 2, .. }));
    }

    #[test]
    fn test_malformed_row_reports_source_line() {
        let csv = "a,b\n\n1,2,3\n";
        let err = read_table_str(csv, "test.csv", RaggedRows::Reject).unwrap_err();

        assert!(matches!(err, Error::MalformedRow { row: 2, line: 3, .. }));
        assert_eq!(
            err.to_string(),
            "malformed row 2 (line 3): expected 2 fields, found 3"
        );
    }

    #[test]
    fn test_malformed_row_line_with_crlf_and_quoted_newline() {
        let csv = "a,b\r\n\"multi\nline\",x\r\n\r\n1,2,3\r\n";
        let err = read_table_str(csv, "test.csv", RaggedRows::Reject).unwrap_err();

        assert!(matches!(err, Error::MalformedRow { row: 3, line: 5, .. }));
    }

    #[test]
    fn test_ragged_rows_padded() {
        let csv = "a,b\n1,2,3\n4\n";
        let table = read_table_str(csv, "test.csv", RaggedRows::Pad).unwrap();

        assert_eq!(table.column_count(), 3);
        assert_eq!(table.rows[0].fields, vec!["a", "b", ""]);
        assert_eq!(table.rows[2].fields, vec!["4", "", ""]);
    }

    #[test]
    fn test_row_reader_is_lazy() {
        let csv = "a,b\n1,2\n1,2,3\n";
        let mut reader = RowReader::new(csv.as_bytes(), RaggedRows::Reject);

        assert!(reader.next().unwrap().is_ok());
        assert_eq!(reader.expected_columns(), Some(2));
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_empty_input() {
        let table = read_table_str("", "empty.csv", RaggedRows::Reject).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_decode_utf8() {
        let (text, encoding) = decode_bytes("café".as_bytes());
        assert_eq!(text, "café");
        assert_eq!(encoding, UTF_8);
    }

    #[test]
    fn test_decode_utf8_bom_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"a,b");
        let (text, encoding) = decode_bytes(&bytes);
        assert_eq!(text, "a,b");
        assert_eq!(encoding, UTF_8);
    }

    #[test]
    fn test_decode_windows_1252_fallback() {
        // "café" with é as the single byte 0xE9
        let (text, encoding) = decode_bytes(b"caf\xE9");
        assert_eq!(text, "café");
        assert_eq!(encoding, WINDOWS_1252);
    }

    #[test]
    fn test_decode_utf16le_bom() {
        let bytes = [0xFF, 0xFE, b'a', 0x00, b',', 0x00, b'b', 0x00];
        let (text, encoding) = decode_bytes(&bytes);
        assert_eq!(text, "a,b");
        assert_eq!(encoding.name(), "UTF-16LE");
    }

    #[test]
    fn test_missing_file() {
        let err = read_table_file("/nonexistent/input.csv", RaggedRows::Reject).unwrap_err();
        assert!(matches!(err, Error::SourceNotFound { .. }));
    }
}
