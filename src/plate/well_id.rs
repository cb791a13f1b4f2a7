use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub const PLATE_ROWS: u8 = 8;
pub const PLATE_COLS: u8 = 12;
pub const PLATE_WELLS: usize = (PLATE_ROWS as usize) * (PLATE_COLS as usize);

// React ID n (1-indexed) sits at row (n-1) mod 8, column (n-1) div 8 + 1,
// so row letters cycle fastest (1 -> A01, 8 -> H01, 9 -> A02, 96 -> H12)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WellId {
    row: u8,
    col: u8,
}

impl WellId {
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if row < PLATE_ROWS && (1..=PLATE_COLS).contains(&col) {
            Some(Self { row, col })
        } else {
            None
        }
    }

    pub fn from_react_id(n: u8) -> Option<Self> {
        if !(1..=PLATE_WELLS as u8).contains(&n) {
            return None;
        }
        let idx = n - 1;
        Self::new(idx % PLATE_ROWS, idx / PLATE_ROWS + 1)
    }

    pub fn react_id(self) -> u8 {
        (self.col - 1) * PLATE_ROWS + self.row + 1
    }

    pub fn patient_number(self) -> u8 {
        self.react_id()
    }

    pub fn row_letter(self) -> char {
        (b'A' + self.row) as char
    }

    pub fn all() -> impl Iterator<Item = WellId> {
        (1..=PLATE_WELLS as u8).filter_map(WellId::from_react_id)
    }
}

impl fmt::Display for WellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}", self.row_letter(), self.col)
    }
}

impl FromStr for WellId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::Validation(format!("invalid well id '{}'", s));
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let letter = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
        if !('A'..='H').contains(&letter) {
            return Err(invalid());
        }
        let col: u8 = chars.as_str().parse().map_err(|_| invalid())?;
        WellId::new(letter as u8 - b'A', col).ok_or_else(invalid)
    }
}
