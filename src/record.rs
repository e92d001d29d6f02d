//! Wire-format records.
//!
//! The firmware streams one pixel per line as ASCII CSV:
//! `frame_id,row,col,temperature` (e.g. `23,5,10,24.37`). Anything else on
//! the wire (boot banners, partial lines after a reconnect, corrupted
//! bytes) is dropped without stopping the capture loop.

/// A single parsed pixel observation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Record {
    /// Frame counter as reported by the firmware, when numeric. Carried
    /// for diagnostics only; assembly never keys on it.
    pub frame_id: Option<u32>,
    pub row: usize,
    pub col: usize,
    pub temperature: f64,
}

impl Record {
    /// Parse one wire line. Returns `None` for anything malformed: wrong
    /// field count, non-numeric row/col/temperature, or a blank line.
    /// The frame-id field must be present but is parsed leniently; a
    /// garbage first field never discards a good pixel reading.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let mut fields = line.split(',');
        let frame_id = fields.next()?.trim().parse().ok();
        let row = fields.next()?.trim().parse().ok()?;
        let col = fields.next()?.trim().parse().ok()?;
        let temperature: f64 = fields.next()?.trim().parse().ok()?;
        if fields.next().is_some() {
            return None;
        }
        // "nan"/"inf" parse as floats but would poison every statistic
        // downstream; treat them as line corruption.
        if !temperature.is_finite() {
            return None;
        }

        Some(Self {
            frame_id,
            row,
            col,
            temperature,
        })
    }

    /// True when this record addresses a cell inside a `height` x `width`
    /// grid. Out-of-range records are discarded by the assembler.
    pub fn in_bounds(&self, height: usize, width: usize) -> bool {
        self.row < height && self.col < width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_line() {
        let record = Record::parse("23,5,10,24.37").unwrap();
        assert_eq!(record.frame_id, Some(23));
        assert_eq!(record.row, 5);
        assert_eq!(record.col, 10);
        assert_eq!(record.temperature, 24.37);
    }

    #[test]
    fn bad_frame_id_keeps_a_good_reading() {
        let record = Record::parse("x,2,3,4.0").unwrap();
        assert_eq!(record.frame_id, None);
        assert_eq!(record.row, 2);
        assert_eq!(record.col, 3);
        assert_eq!(record.temperature, 4.0);
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let record = Record::parse(" 0, 1, 2, 21.0 \r\n").unwrap();
        assert_eq!(record.row, 1);
        assert_eq!(record.col, 2);
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert_eq!(Record::parse("1,2,3"), None);
        assert_eq!(Record::parse("1,2,3,4.0,5"), None);
    }

    #[test]
    fn rejects_non_numeric_fields() {
        assert_eq!(Record::parse("MLX90640 ready"), None);
        assert_eq!(Record::parse("a,b,c,d"), None);
        assert_eq!(Record::parse("1,2,x,4.0"), None);
        // Negative indices do not parse as usize.
        assert_eq!(Record::parse("1,-1,0,20.0"), None);
    }

    #[test]
    fn rejects_non_finite_temperatures() {
        assert_eq!(Record::parse("1,2,3,nan"), None);
        assert_eq!(Record::parse("1,2,3,inf"), None);
        assert!(Record::parse("1,2,3,-12.5").is_some());
    }

    #[test]
    fn rejects_blank_lines() {
        assert_eq!(Record::parse(""), None);
        assert_eq!(Record::parse("   "), None);
    }

    #[test]
    fn bounds_check_is_exclusive() {
        let record = Record::parse("0,23,31,20.0").unwrap();
        assert!(record.in_bounds(24, 32));
        assert!(!record.in_bounds(23, 32));
        assert!(!record.in_bounds(24, 31));
    }
}
