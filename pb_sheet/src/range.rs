use std::{fmt, str::FromStr};

use crate::RangeParseError;

/// Spreadsheet column name for a zero-based index: 0 is `A`, 25 is `Z`,
/// 26 is `AA`, 701 is `ZZ`.
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Inverse of [`column_letter`]. Accepts lower case.
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n - 1)
}

/// A cell, or a whole column when `row` is `None`. Rows are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub col: usize,
    pub row: Option<u32>,
}

impl CellRef {
    pub fn new(col: usize, row: u32) -> Self {
        Self {
            col,
            row: Some(row),
        }
    }

    pub fn column(col: usize) -> Self {
        Self { col, row: None }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&column_letter(self.col))?;
        if let Some(row) = self.row {
            write!(f, "{row}")?;
        }
        Ok(())
    }
}

/// An A1-notation range such as `BestTimes!A1:ZZ`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    pub sheet: String,
    pub start: CellRef,
    pub end: Option<CellRef>,
}

impl SheetRange {
    /// `A1:<last_col>`, every row.
    pub fn window(sheet: &str, last_col: usize) -> Self {
        Self {
            sheet: sheet.to_string(),
            start: CellRef::new(0, 1),
            end: Some(CellRef::column(last_col)),
        }
    }

    /// `A:<last_col>`, the target of an append.
    pub fn columns(sheet: &str, last_col: usize) -> Self {
        Self {
            sheet: sheet.to_string(),
            start: CellRef::column(0),
            end: Some(CellRef::column(last_col)),
        }
    }

    /// `A<row>:<last_col><row>`.
    pub fn row_span(sheet: &str, row: u32, last_col: usize) -> Self {
        Self {
            sheet: sheet.to_string(),
            start: CellRef::new(0, row),
            end: Some(CellRef::new(last_col, row)),
        }
    }

    pub fn cell(sheet: &str, col: usize, row: u32) -> Self {
        Self {
            sheet: sheet.to_string(),
            start: CellRef::new(col, row),
            end: None,
        }
    }

    pub fn last_col(&self) -> Option<usize> {
        match self.end {
            Some(end) => Some(end.col),
            None if self.start.row.is_some() => Some(self.start.col),
            None => None,
        }
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plain = !self.sheet.is_empty()
            && self
                .sheet
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if plain {
            write!(f, "{}!{}", self.sheet, self.start)?;
        } else {
            write!(f, "'{}'!{}", self.sheet.replace('\'', "''"), self.start)?;
        }
        if let Some(end) = self.end {
            write!(f, ":{end}")?;
        }
        Ok(())
    }
}

impl FromStr for SheetRange {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| RangeParseError {
            input: s.to_string(),
            reason,
        };

        let (sheet, cells) = s.rsplit_once('!').ok_or_else(|| err("missing sheet name"))?;
        let sheet = match sheet.strip_prefix('\'') {
            Some(rest) => rest
                .strip_suffix('\'')
                .ok_or_else(|| err("unterminated sheet quote"))?
                .replace("''", "'"),
            None => sheet.to_string(),
        };
        if sheet.is_empty() {
            return Err(err("missing sheet name"));
        }

        let (start, end) = match cells.split_once(':') {
            Some((a, b)) => (a, Some(b)),
            None => (cells, None),
        };
        let start = parse_cell(start).ok_or_else(|| err("invalid start cell"))?;
        let end = match end {
            Some(e) => Some(parse_cell(e).ok_or_else(|| err("invalid end cell"))?),
            None => None,
        };
        if end.is_none() && start.row.is_none() {
            return Err(err("a single reference needs a row"));
        }

        Ok(Self { sheet, start, end })
    }
}

fn parse_cell(s: &str) -> Option<CellRef> {
    let split = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
    let (letters, digits) = s.split_at(split);
    let col = column_index(letters)?;
    if digits.is_empty() {
        return Some(CellRef::column(col));
    }
    let row: u32 = digits.parse().ok()?;
    (row >= 1).then_some(CellRef::new(col, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(1), "B");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn column_index_inverts_letters() {
        for i in [0, 25, 26, 51, 701, 702, 18277] {
            assert_eq!(column_index(&column_letter(i)), Some(i));
        }
        assert_eq!(column_index("zz"), Some(701));
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("A1"), None);
    }

    #[test]
    fn formats_a1_ranges() {
        assert_eq!(SheetRange::window("BestTimes", 701).to_string(), "BestTimes!A1:ZZ");
        assert_eq!(SheetRange::columns("BestTimes", 701).to_string(), "BestTimes!A:ZZ");
        assert_eq!(SheetRange::row_span("BestTimes", 1, 3).to_string(), "BestTimes!A1:D1");
        assert_eq!(SheetRange::cell("BestTimes", 27, 5).to_string(), "BestTimes!AB5");
        assert_eq!(SheetRange::cell("Best Times", 0, 1).to_string(), "'Best Times'!A1");
    }

    #[test]
    fn parses_a1_ranges() {
        let r: SheetRange = "BestTimes!A1:ZZ".parse().unwrap();
        assert_eq!(r, SheetRange::window("BestTimes", 701));

        let r: SheetRange = "'Bob''s PBs'!C7".parse().unwrap();
        assert_eq!(r.sheet, "Bob's PBs");
        assert_eq!(r.start, CellRef::new(2, 7));
        assert_eq!(r.end, None);
    }

    #[test]
    fn rejects_bad_ranges() {
        assert!("A1:B2".parse::<SheetRange>().is_err());
        assert!("S!A0".parse::<SheetRange>().is_err());
        assert!("S!A".parse::<SheetRange>().is_err());
        assert!("S!1A".parse::<SheetRange>().is_err());
    }
}
