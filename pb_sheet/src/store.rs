use crate::{SheetRange, StoreError};

/// The row/column API of the remote table service.
///
/// Values are plain strings. Reads come back the way spreadsheet services
/// return them: trailing empty cells and trailing empty rows are dropped.
pub trait TableStore {
    fn read_all(&mut self, range: &SheetRange) -> Result<Vec<Vec<String>>, StoreError>;

    /// Overwrites cells starting at the range's top-left cell.
    fn write_row(&mut self, range: &SheetRange, row: &[String]) -> Result<(), StoreError>;

    /// Adds a row after the last non-empty row. The service picks the
    /// position.
    fn append_row(&mut self, range: &SheetRange, row: &[String]) -> Result<(), StoreError>;
}

impl<T: TableStore + ?Sized> TableStore for &mut T {
    fn read_all(&mut self, range: &SheetRange) -> Result<Vec<Vec<String>>, StoreError> {
        (**self).read_all(range)
    }

    fn write_row(&mut self, range: &SheetRange, row: &[String]) -> Result<(), StoreError> {
        (**self).write_row(range, row)
    }

    fn append_row(&mut self, range: &SheetRange, row: &[String]) -> Result<(), StoreError> {
        (**self).append_row(range, row)
    }
}

/// A single-sheet grid held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    sheet: Option<String>,
    rows: Vec<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { sheet: None, rows }
    }

    /// Rejects ranges that name any other sheet.
    pub fn for_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    pub fn cell(&self, col: usize, row: u32) -> Option<&str> {
        let r = row.checked_sub(1)? as usize;
        self.rows.get(r)?.get(col).map(String::as_str)
    }

    fn check_sheet(&self, range: &SheetRange) -> Result<(), StoreError> {
        match &self.sheet {
            Some(sheet) if *sheet != range.sheet => Err(StoreError::Range {
                range: range.to_string(),
                reason: format!("unknown sheet (store holds {sheet})"),
            }),
            _ => Ok(()),
        }
    }

    fn check_width(range: &SheetRange, start_col: usize, len: usize) -> Result<(), StoreError> {
        if let Some(last) = range.last_col() {
            if len > 0 && start_col + len - 1 > last {
                return Err(StoreError::Range {
                    range: range.to_string(),
                    reason: format!("{len} values do not fit"),
                });
            }
        }
        Ok(())
    }

    fn last_used_row(&self) -> usize {
        self.rows
            .iter()
            .rposition(|r| r.iter().any(|c| !c.is_empty()))
            .map_or(0, |i| i + 1)
    }

    fn put(&mut self, row_idx: usize, start_col: usize, values: &[String]) {
        if self.rows.len() <= row_idx {
            self.rows.resize_with(row_idx + 1, Vec::new);
        }
        let row = &mut self.rows[row_idx];
        if row.len() < start_col + values.len() {
            row.resize(start_col + values.len(), String::new());
        }
        row[start_col..start_col + values.len()].clone_from_slice(values);
    }
}

impl TableStore for MemoryStore {
    fn read_all(&mut self, range: &SheetRange) -> Result<Vec<Vec<String>>, StoreError> {
        self.check_sheet(range)?;
        let first_row = range.start.row.map_or(0, |r| (r as usize).saturating_sub(1));
        let last_row = range
            .end
            .and_then(|e| e.row)
            .map_or(usize::MAX, |r| (r as usize).saturating_sub(1));
        let first_col = range.start.col;
        let last_col = range.last_col().unwrap_or(usize::MAX);

        let mut out: Vec<Vec<String>> = self
            .rows
            .iter()
            .enumerate()
            .skip(first_row)
            .take_while(|(i, _)| *i <= last_row)
            .map(|(_, row)| {
                let mut cells: Vec<String> = row
                    .iter()
                    .enumerate()
                    .skip(first_col)
                    .take_while(|(c, _)| *c <= last_col)
                    .map(|(_, v)| v.clone())
                    .collect();
                while cells.last().is_some_and(String::is_empty) {
                    cells.pop();
                }
                cells
            })
            .collect();
        while out.last().is_some_and(Vec::is_empty) {
            out.pop();
        }
        Ok(out)
    }

    fn write_row(&mut self, range: &SheetRange, row: &[String]) -> Result<(), StoreError> {
        self.check_sheet(range)?;
        let Some(start_row) = range.start.row.filter(|r| *r >= 1) else {
            return Err(StoreError::Range {
                range: range.to_string(),
                reason: "write needs a start row".to_string(),
            });
        };
        Self::check_width(range, range.start.col, row.len())?;
        self.put(start_row as usize - 1, range.start.col, row);
        Ok(())
    }

    fn append_row(&mut self, range: &SheetRange, row: &[String]) -> Result<(), StoreError> {
        self.check_sheet(range)?;
        Self::check_width(range, range.start.col, row.len())?;
        let at = self.last_used_row();
        self.put(at, range.start.col, row);
        Ok(())
    }
}
