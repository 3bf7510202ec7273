//! Time keeping helpers for the watchface

use chrono::{NaiveDate, NaiveDateTime, Timelike};

/// Length of a Current Time Service characteristic value
pub const CTS_LEN: usize = 10;

/// Minutes covered by one dot
pub const MINUTES_PER_DOT: u32 = 10;

/// Completed ten-minute intervals since midnight, 0 to 143.
pub fn elapsed_units<T: Timelike>(time: &T) -> u8 {
    (minute_of_day(time) / MINUTES_PER_DOT) as u8
}

/// Whether the face changes at this minute.
pub fn is_redraw_minute<T: Timelike>(time: &T) -> bool {
    minute_of_day(time) % MINUTES_PER_DOT == 0
}

fn minute_of_day<T: Timelike>(time: &T) -> u32 {
    time.hour() * 60 + time.minute()
}

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeError {
    /// Value shorter than the Current Time characteristic
    InvalidLength(usize),
    /// Fields do not form a valid date and time
    InvalidDateTime,
}

/// Decode a Current Time Service (0x2A2B) characteristic value.
///
/// Layout: year (u16 LE), month, day, hours, minutes, seconds, day of week,
/// fractions of 1/256 s, adjust reason.
pub fn from_cts_bytes(bytes: &[u8]) -> Result<NaiveDateTime, TimeError> {
    if bytes.len() < CTS_LEN {
        return Err(TimeError::InvalidLength(bytes.len()));
    }

    let year = u16::from_le_bytes([bytes[0], bytes[1]]) as i32;
    let month = bytes[2] as u32;
    let day = bytes[3] as u32;
    let hour = bytes[4] as u32;
    let min = bytes[5] as u32;
    let sec = bytes[6] as u32;
    // bytes[7] is the weekday, implied by the date
    let milli = bytes[8] as u32 * 1000 / 256; // Convert fractions_256 to milliseconds

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_milli_opt(hour, min, sec, milli))
        .ok_or(TimeError::InvalidDateTime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn elapsed_units_over_the_day() {
        assert_eq!(elapsed_units(&at(0, 0)), 0);
        assert_eq!(elapsed_units(&at(0, 9)), 0);
        assert_eq!(elapsed_units(&at(0, 10)), 1);
        assert_eq!(elapsed_units(&at(14, 30)), 87);
        assert_eq!(elapsed_units(&at(14, 31)), 87);
        assert_eq!(elapsed_units(&at(23, 59)), 143);
    }

    #[test]
    fn redraw_only_on_ten_minute_boundaries() {
        assert!(is_redraw_minute(&at(14, 30)));
        assert!(!is_redraw_minute(&at(14, 31)));
        assert!(is_redraw_minute(&at(0, 0)));
        assert!(!is_redraw_minute(&at(23, 59)));

        let redraws = (0..24)
            .flat_map(|hour| (0..60).map(move |minute| at(hour, minute)))
            .filter(|time| is_redraw_minute(time))
            .count();
        assert_eq!(redraws, 144);
    }

    #[test]
    fn decodes_current_time() {
        let bytes = [0xe8, 0x07, 3, 3, 14, 30, 15, 7, 128, 0];
        let time = from_cts_bytes(&bytes).unwrap();
        assert_eq!(
            time,
            NaiveDate::from_ymd_opt(2024, 3, 3)
                .unwrap()
                .and_hms_milli_opt(14, 30, 15, 500)
                .unwrap()
        );
    }

    #[test]
    fn rejects_bad_current_time() {
        assert_eq!(from_cts_bytes(&[0xe8, 0x07, 3]), Err(TimeError::InvalidLength(3)));

        let bytes = [0xe8, 0x07, 13, 3, 14, 30, 15, 7, 0, 0];
        assert_eq!(from_cts_bytes(&bytes), Err(TimeError::InvalidDateTime));
    }
}
