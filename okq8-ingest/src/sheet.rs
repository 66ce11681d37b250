//! Tabular source access: typed cells, the fixed OKQ8 column layout, and
//! header validation in front of a lazy row iterator.
//!
//! The export is a single-sheet workbook:
//!   Datum | Typ | Beskrivning | In på konto | Ut från konto | Originalt belopp | Valuta | Kurs

use std::collections::VecDeque;
use std::fmt;
use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};

use crate::error::{IngestError, Result};

pub const EXPECTED_HEADER: [&str; 8] = [
    "Datum",
    "Typ",
    "Beskrivning",
    "In på konto",
    "Ut från konto",
    "Originalt belopp",
    "Valuta",
    "Kurs",
];

/// A single cell value as read from the sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// Absent cells and whitespace-only text carry no value.
    pub fn is_absent(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        }
    }
}

/// Positional columns of the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    Type,
    Description,
    AmountIn,
    AmountOut,
    OriginalAmount,
    Currency,
    Rate,
}

impl Column {
    pub fn index(self) -> usize {
        self as usize
    }

    /// Header text as it appears in the export.
    pub fn header(self) -> &'static str {
        EXPECTED_HEADER[self.index()]
    }
}

/// One data row. `position` is the 1-based sheet row (the header is row 1).
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub position: usize,
    pub cells: Vec<Cell>,
}

impl RawRow {
    pub fn new(position: usize, cells: Vec<Cell>) -> Self {
        Self { position, cells }
    }

    pub fn get(&self, column: Column) -> &Cell {
        self.cells.get(column.index()).unwrap_or(&Cell::Empty)
    }

    fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_absent)
    }
}

/// Anything that can hand out rows of typed cells in sheet order.
pub trait TabularSource {
    fn rows(&self) -> Box<dyn Iterator<Item = Vec<Cell>> + '_>;

    /// Zero-based (row, column) of the sheet cell that `rows()` starts at.
    fn origin(&self) -> (u32, u32) {
        (0, 0)
    }
}

impl TabularSource for Range<Data> {
    fn rows(&self) -> Box<dyn Iterator<Item = Vec<Cell>> + '_> {
        Box::new(Range::rows(self).map(|row| row.iter().map(Cell::from).collect()))
    }

    // calamine trims leading empty rows and columns off the used range
    fn origin(&self) -> (u32, u32) {
        self.start().unwrap_or((0, 0))
    }
}

impl TabularSource for Vec<Vec<Cell>> {
    fn rows(&self) -> Box<dyn Iterator<Item = Vec<Cell>> + '_> {
        Box::new(self.iter().cloned())
    }
}

/// Open a workbook (xlsx, xls, ods) and return its first worksheet.
pub fn open_workbook(path: impl AsRef<Path>) -> Result<Range<Data>> {
    let path = path.as_ref();
    log::debug!("opening workbook {}", path.display());

    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::NoWorksheet)??;
    Ok(range)
}

/// Check the header row and return the data rows after it.
///
/// The header must sit on the first sheet row. Blank rows at the end of the
/// sheet are dropped; blank rows between transactions are passed on and fail
/// classification like any other malformed row.
pub fn read_rows<S>(source: &S) -> Result<DataRows<'_>>
where
    S: TabularSource + ?Sized,
{
    let (origin_row, origin_col) = source.origin();
    let mut rows = source.rows();
    let header = rows.next().unwrap_or_default();

    if (origin_row, origin_col) != (0, 0) {
        log::warn!("sheet starts at row {}, column {}", origin_row + 1, origin_col + 1);
        return Err(IngestError::SchemaMismatch {
            found: header.iter().map(Cell::to_string).collect(),
        });
    }
    check_header(&header)?;
    log::debug!("header {:?}", EXPECTED_HEADER);

    Ok(DataRows {
        rows: rows.enumerate(),
        first_position: origin_row as usize + 2,
        held: VecDeque::new(),
    })
}

/// Lazy data rows. Blank rows are held back until a non-blank row follows.
pub struct DataRows<'a> {
    rows: std::iter::Enumerate<Box<dyn Iterator<Item = Vec<Cell>> + 'a>>,
    first_position: usize,
    held: VecDeque<RawRow>,
}

impl Iterator for DataRows<'_> {
    type Item = RawRow;

    fn next(&mut self) -> Option<RawRow> {
        if let Some(row) = self.held.pop_front() {
            return Some(row);
        }
        for (i, cells) in self.rows.by_ref() {
            let row = RawRow::new(self.first_position + i, cells);
            if row.is_blank() {
                self.held.push_back(row);
                continue;
            }
            if self.held.is_empty() {
                return Some(row);
            }
            self.held.push_back(row);
            return self.held.pop_front();
        }
        // only trailing blank rows are left
        self.held.clear();
        None
    }
}

fn check_header(header: &[Cell]) -> Result<()> {
    let matches = header.len() == EXPECTED_HEADER.len()
        && header
            .iter()
            .zip(EXPECTED_HEADER)
            .all(|(cell, expected)| matches!(cell, Cell::Text(s) if s == expected));

    if matches {
        Ok(())
    } else {
        let found: Vec<String> = header.iter().map(Cell::to_string).collect();
        log::warn!("header mismatch: {:?}", found);
        Err(IngestError::SchemaMismatch { found })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<Cell> {
        EXPECTED_HEADER.iter().map(|h| Cell::text(*h)).collect()
    }

    fn row(date: &str) -> Vec<Cell> {
        vec![
            Cell::text(date),
            Cell::text("Köp"),
            Cell::text("Finska pinnar"),
            Cell::Empty,
            Cell::Number(-12.0),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
        ]
    }

    #[test]
    fn test_reads_rows_after_header() {
        let src = vec![header(), row("04 Jul 2024"), row("03 Jul 2024")];
        let rows: Vec<_> = read_rows(&src).unwrap().collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].position, 2);
        assert_eq!(rows[1].position, 3);
        assert_eq!(rows[0].get(Column::Date), &Cell::text("04 Jul 2024"));
        assert_eq!(rows[0].get(Column::AmountOut), &Cell::Number(-12.0));
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let src = vec![header()];
        assert_eq!(read_rows(&src).unwrap().count(), 0);
    }

    #[test]
    fn test_empty_source_is_schema_mismatch() {
        let src: Vec<Vec<Cell>> = Vec::new();
        let err = read_rows(&src).err().unwrap();
        assert!(matches!(err, IngestError::SchemaMismatch { ref found } if found.is_empty()));
    }

    #[test]
    fn test_any_single_header_change_is_rejected() {
        for i in 0..EXPECTED_HEADER.len() {
            let mut h = header();
            h[i] = Cell::text(EXPECTED_HEADER[i].to_uppercase());
            let src = vec![h, row("04 Jul 2024")];
            assert!(
                matches!(read_rows(&src), Err(IngestError::SchemaMismatch { .. })),
                "column {i} should be rejected"
            );
        }
    }

    #[test]
    fn test_reordered_missing_and_extra_columns_are_rejected() {
        let mut swapped = header();
        swapped.swap(3, 4);
        let mut missing = header();
        missing.pop();
        let mut extra = header();
        extra.push(Cell::text("Saldo"));
        let mut padded = header();
        padded.push(Cell::Empty);

        for h in [swapped, missing, extra, padded] {
            let src = vec![h];
            assert!(matches!(read_rows(&src), Err(IngestError::SchemaMismatch { .. })));
        }
    }

    #[test]
    fn test_trailing_blank_rows_are_dropped() {
        let blank = vec![Cell::Empty; 8];
        let src = vec![header(), row("04 Jul 2024"), row("02 Jul 2024"), blank.clone(), blank];
        let rows: Vec<_> = read_rows(&src).unwrap().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].position, 3);
    }

    #[test]
    fn test_interior_blank_rows_are_kept_in_order() {
        let blank = vec![Cell::Empty; 8];
        let src = vec![
            header(),
            row("04 Jul 2024"),
            blank.clone(),
            blank.clone(),
            row("02 Jul 2024"),
            blank,
        ];
        let rows: Vec<_> = read_rows(&src).unwrap().collect();
        let positions: Vec<_> = rows.iter().map(|r| r.position).collect();
        assert_eq!(positions, [2, 3, 4, 5]);
        assert!(rows[1].is_blank() && rows[2].is_blank());
        assert_eq!(rows[3].get(Column::Date), &Cell::text("02 Jul 2024"));
    }

    #[test]
    fn test_header_below_first_sheet_row_is_rejected() {
        let mut range: Range<Data> = Range::new((1, 0), (2, 7));
        for (col, h) in EXPECTED_HEADER.iter().enumerate() {
            range.set_value((1, col as u32), Data::String(h.to_string()));
        }
        range.set_value((2, 0), Data::String("28 Jun 2024".to_string()));
        range.set_value((2, 3), Data::Float(1.0));

        assert_eq!(range.origin(), (1, 0));
        match read_rows(&range).err().unwrap() {
            IngestError::SchemaMismatch { found } => assert_eq!(found[0], "Datum"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_positions_follow_sheet_rows() {
        let mut range: Range<Data> = Range::new((0, 0), (3, 7));
        for (col, h) in EXPECTED_HEADER.iter().enumerate() {
            range.set_value((0, col as u32), Data::String(h.to_string()));
        }
        range.set_value((1, 0), Data::String("28 Jun 2024".to_string()));
        range.set_value((3, 0), Data::String("27 Jun 2024".to_string()));

        let positions: Vec<_> = read_rows(&range).unwrap().map(|r| r.position).collect();
        assert_eq!(positions, [2, 3, 4]);
    }

    #[test]
    fn test_short_row_reads_as_empty() {
        let r = RawRow::new(2, vec![Cell::text("04 Jul 2024")]);
        assert_eq!(r.get(Column::Rate), &Cell::Empty);
    }

    #[test]
    fn test_calamine_range_source() {
        let mut range: Range<Data> = Range::new((0, 0), (1, 7));
        for (col, h) in EXPECTED_HEADER.iter().enumerate() {
            range.set_value((0, col as u32), Data::String(h.to_string()));
        }
        range.set_value((1, 0), Data::String("28 Jun 2024".to_string()));
        range.set_value((1, 2), Data::String("Bg Inbetalning".to_string()));
        range.set_value((1, 3), Data::Float(5579.64));
        range.set_value((1, 5), Data::Int(7));

        let rows: Vec<_> = read_rows(&range).unwrap().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(Column::AmountIn), &Cell::Number(5579.64));
        assert_eq!(rows[0].get(Column::AmountOut), &Cell::Empty);
        assert_eq!(rows[0].get(Column::OriginalAmount), &Cell::Number(7.0));
    }
}
