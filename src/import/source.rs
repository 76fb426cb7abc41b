//! Tabular import sources: CSV files and spreadsheets.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::error::{ImportError, RowError};

/// File formats the importer accepts, decided from the extension alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(SourceFormat::Spreadsheet),
            _ => Err(ImportError::UnsupportedExtension(ext)),
        }
    }
}

/// One data row and the 1-based file line or sheet row it starts on.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceRow {
    pub line: usize,
    pub cells: Result<Vec<String>, RowError>,
}

impl SourceRow {
    fn blank(line: usize) -> Self {
        Self { line, cells: Ok(Vec::new()) }
    }
}

/// A header row followed by a stream of data rows. Blank rows are yielded
/// as empty rows rather than dropped, so callers can count them.
pub trait RowSource: Iterator<Item = SourceRow> {
    fn header(&self) -> &[String];

    /// Number of data rows, when it can be known or cheaply estimated.
    fn total_rows_estimate(&self) -> Option<usize>;
}

/// Open `path` as a row source. Fails before any row is read if the file is
/// missing, unreadable, of an unsupported type or has no header row.
pub fn open_source(path: &Path) -> Result<Box<dyn RowSource>, ImportError> {
    let format = SourceFormat::from_path(path)?;
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.to_path_buf()));
    }
    match format {
        SourceFormat::Csv => Ok(Box::new(CsvSource::open(path)?)),
        SourceFormat::Spreadsheet => Ok(Box::new(SpreadsheetSource::open(path)?)),
    }
}

/// Streams records from a CSV file; only the current record is held in memory.
///
/// The csv reader skips empty lines, so they are recovered from the gap
/// between the line a record ends on and the line the previous one ended on.
pub struct CsvSource {
    reader: csv::Reader<File>,
    header: Vec<String>,
    estimate: usize,
    file_len: u64,
    newline_terminated: bool,
    /// First line after the last record read.
    next_line: u64,
    blank_lines: std::ops::Range<u64>,
    queued: Option<SourceRow>,
    exhausted: bool,
}

impl CsvSource {
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        let (line_count, newline_terminated) = scan_lines(path)?;
        let file_len = std::fs::metadata(path)?.len();

        // `\n` only: a stray `\r\n` line then reads as a blank record instead
        // of being skipped, and line positions stay exact.
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_path(path)
            .map_err(|e| ImportError::Csv(e.to_string()))?;

        let mut source = Self {
            reader,
            header: Vec::new(),
            estimate: line_count.saturating_sub(1),
            file_len,
            newline_terminated,
            next_line: 1,
            blank_lines: 0..0,
            queued: None,
            exhausted: false,
        };

        let header = match source.read_row() {
            Ok(Some(row)) => row.cells.map_err(|e| ImportError::Csv(e.to_string()))?,
            Ok(None) => return Err(ImportError::EmptySource),
            Err(e) => return Err(ImportError::Csv(e.to_string())),
        };
        source.blank_lines = 0..0;
        source.header = header;
        Ok(source)
    }

    /// Read the next record and work out the line it started on. Lines
    /// skipped on the way are left in `blank_lines`.
    fn read_row(&mut self) -> Result<Option<SourceRow>, csv::Error> {
        let mut record = csv::ByteRecord::new();
        if !self.reader.read_byte_record(&mut record)? {
            return Ok(None);
        }
        let end = self.reader.position();
        let embedded: u64 = record
            .iter()
            .map(|field| field.iter().filter(|b| **b == b'\n').count() as u64)
            .sum();
        let terminated = self.newline_terminated || end.byte() < self.file_len;
        let line = end
            .line()
            .saturating_sub(embedded + u64::from(terminated))
            .max(self.next_line);

        self.blank_lines = self.next_line..line;
        self.next_line = line + embedded + 1;
        Ok(Some(SourceRow { line: line as usize, cells: record_cells(&record) }))
    }
}

impl Iterator for CsvSource {
    type Item = SourceRow;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(line) = self.blank_lines.next() {
            return Some(SourceRow::blank(line as usize));
        }
        if let Some(row) = self.queued.take() {
            return Some(row);
        }
        if self.exhausted {
            return None;
        }
        match self.read_row() {
            Ok(Some(row)) => match self.blank_lines.next() {
                Some(line) => {
                    self.queued = Some(row);
                    Some(SourceRow::blank(line as usize))
                }
                None => Some(row),
            },
            Ok(None) => {
                self.exhausted = true;
                None
            }
            Err(e) => {
                // A malformed record only costs that row; an I/O failure ends the stream.
                if e.is_io_error() {
                    self.exhausted = true;
                }
                let line = self.next_line;
                self.next_line = self.reader.position().line().max(line + 1);
                Some(SourceRow { line: line as usize, cells: Err(RowError::Read(e.to_string())) })
            }
        }
    }
}

impl RowSource for CsvSource {
    fn header(&self) -> &[String] {
        &self.header
    }

    fn total_rows_estimate(&self) -> Option<usize> {
        Some(self.estimate)
    }
}

/// Count lines and note whether the last one ends with a newline.
fn scan_lines(path: &Path) -> std::io::Result<(usize, bool)> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut buf = Vec::new();
    let mut lines = 0;
    let mut newline_terminated = true;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        lines += 1;
        newline_terminated = buf.ends_with(b"\n");
    }
    Ok((lines, newline_terminated))
}

fn record_cells(record: &csv::ByteRecord) -> Result<Vec<String>, RowError> {
    let record = csv::StringRecord::from_byte_record(record.clone()).map_err(|e| RowError::Read(e.to_string()))?;
    let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
    if let Some(last) = cells.last_mut() {
        if last.ends_with('\r') {
            last.pop();
        }
    }
    Ok(cells)
}

/// Reads the first worksheet of a workbook.
pub struct SpreadsheetSource {
    range: Range<Data>,
    header: Vec<String>,
    next_row: usize,
    /// Sheet row (1-based) of the range's first row.
    first_sheet_row: usize,
}

impl SpreadsheetSource {
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        let mut workbook = open_workbook_auto(path).map_err(|e| ImportError::Spreadsheet(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ImportError::Spreadsheet("workbook has no worksheets".into()))?
            .map_err(|e| ImportError::Spreadsheet(e.to_string()))?;

        if range.is_empty() {
            return Err(ImportError::EmptySource);
        }
        let header = Self::row_at(&range, 0)
            .map_err(|e| ImportError::Spreadsheet(e.to_string()))?;

        let first_sheet_row = range.start().map_or(1, |(row, _)| row as usize + 1);
        Ok(Self { range, header, next_row: 1, first_sheet_row })
    }

    fn row_at(range: &Range<Data>, row: usize) -> Result<Vec<String>, RowError> {
        let (_, width) = range.get_size();
        (0..width).map(|col| cell_to_string(range.get((row, col)))).collect()
    }
}

impl Iterator for SpreadsheetSource {
    type Item = SourceRow;

    fn next(&mut self) -> Option<Self::Item> {
        let (height, _) = self.range.get_size();
        if self.next_row >= height {
            return None;
        }
        let row = SourceRow {
            line: self.first_sheet_row + self.next_row,
            cells: Self::row_at(&self.range, self.next_row),
        };
        self.next_row += 1;
        Some(row)
    }
}

impl RowSource for SpreadsheetSource {
    fn header(&self) -> &[String] {
        &self.header
    }

    fn total_rows_estimate(&self) -> Option<usize> {
        Some(self.range.get_size().0.saturating_sub(1))
    }
}

fn cell_to_string(cell: Option<&Data>) -> Result<String, RowError> {
    Ok(match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.clone(),
        Some(Data::Int(i)) => i.to_string(),
        Some(Data::Float(f)) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Some(Data::Float(f)) => f.to_string(),
        Some(Data::Bool(b)) => b.to_string(),
        Some(Data::Error(e)) => return Err(RowError::Read(format!("cell error {:?}", e))),
        Some(other) => other.to_string(),
    })
}
