//! Denomination classifier
//!
//! Serial numbers are allocated in contiguous blocks, one block per face
//! value. The block boundaries below are fixed by the issuer and must not move.

use serde::Serialize;

use super::result::{Error, Result};

const ONES_START: i64 = 1;
const FIVES_START: i64 = 2_097_153;
const TWENTYFIVES_START: i64 = 4_194_305;
const HUNDREDS_START: i64 = 6_291_457;
const TWOHUNDREDFIFTIES_START: i64 = 14_680_065;
/// First serial number past the last issued block
pub const SERIAL_LIMIT: i64 = 16_777_217;

/// Face value of a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Denomination {
    /// Serial numbers below 1 are not issued
    Invalid,
    One,
    Five,
    TwentyFive,
    Hundred,
    TwoHundredFifty,
}

impl Denomination {
    /// Face value in coins (`Invalid` is worth 0)
    pub fn value(self) -> u64 {
        match self {
            Denomination::Invalid => 0,
            Denomination::One => 1,
            Denomination::Five => 5,
            Denomination::TwentyFive => 25,
            Denomination::Hundred => 100,
            Denomination::TwoHundredFifty => 250,
        }
    }
}

/// Classify a serial number into its denomination.
///
/// Returns `Error::SerialOutOfRange` for serials at or past [`SERIAL_LIMIT`].
pub fn classify(serial: i64) -> Result<Denomination> {
    let denomination = if serial < ONES_START {
        Denomination::Invalid
    } else if serial < FIVES_START {
        Denomination::One
    } else if serial < TWENTYFIVES_START {
        Denomination::Five
    } else if serial < HUNDREDS_START {
        Denomination::TwentyFive
    } else if serial < TWOHUNDREDFIFTIES_START {
        Denomination::Hundred
    } else if serial < SERIAL_LIMIT {
        Denomination::TwoHundredFifty
    } else {
        return Err(Error::SerialOutOfRange(serial));
    };

    Ok(denomination)
}
