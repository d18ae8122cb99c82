//! Service centre timestamps (TP-SCTS), also used for absolute validity periods.
//!
//! A timestamp is seven swapped-BCD octets: year, month, day, hour, minute, second, and a
//! timezone offset. The timezone octet, once its nibbles are swapped back, has the sign in bit 7
//! and a BCD count of quarter-hours in the rest.
use std::fmt;
use std::str::FromStr;
use std::convert::TryFrom;
use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::take_while_m_n;
use nom::character::complete::{char, one_of, space0};
use nom::combinator::{all_consuming, map_res, opt};
use nom::sequence::{delimited, preceded, tuple};
use crate::errors::*;
use crate::semi_octet::{semi_octet_to_decimal, decimal_to_semi_octet, swap_nibbles};

/// Largest timezone offset (in quarter-hours) the octet can carry.
pub const MAX_TIMEZONE_QUARTERS: i8 = 79;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SmscTimestamp {
    /// Two-digit year; `11` means 2011.
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Offset from UTC, in units of 15 minutes.
    pub timezone: i8
}
impl<'a> TryFrom<&'a [u8]> for SmscTimestamp {
    type Error = PduError;
    fn try_from(b: &[u8]) -> PduResult<Self> {
        if b.len() < 7 {
            Err(PduError::TruncatedField {
                field: "Timestamp",
                offset: 0,
                needed: 7,
                remaining: b.len()
            })?
        }
        let tz = swap_nibbles(b[6]);
        let quarters = ((tz >> 4) & 0b0111) * 10 + (tz & 0b0000_1111);
        let timezone = if tz & 0b1000_0000 != 0 {
            -(quarters as i8)
        }
        else {
            quarters as i8
        };
        Ok(SmscTimestamp {
            year: semi_octet_to_decimal(b[0]),
            month: semi_octet_to_decimal(b[1]),
            day: semi_octet_to_decimal(b[2]),
            hour: semi_octet_to_decimal(b[3]),
            minute: semi_octet_to_decimal(b[4]),
            second: semi_octet_to_decimal(b[5]),
            timezone
        })
    }
}
impl SmscTimestamp {
    /// Serialize to the 7-octet wire format.
    pub fn as_bytes(&self) -> [u8; 7] {
        let quarters = self.timezone.unsigned_abs().min(MAX_TIMEZONE_QUARTERS as u8);
        let mut tz = ((quarters / 10) << 4) | (quarters % 10);
        if self.timezone < 0 {
            tz |= 0b1000_0000;
        }
        [
            decimal_to_semi_octet(self.year),
            decimal_to_semi_octet(self.month),
            decimal_to_semi_octet(self.day),
            decimal_to_semi_octet(self.hour),
            decimal_to_semi_octet(self.minute),
            decimal_to_semi_octet(self.second),
            swap_nibbles(tz)
        ]
    }
    /// The timezone offset as `(sign, hours, minutes)`.
    pub fn timezone_offset(&self) -> (char, u8, u8) {
        let sign = if self.timezone < 0 { '-' } else { '+' };
        let quarters = self.timezone.unsigned_abs();
        (sign, quarters / 4, (quarters % 4) * 15)
    }
}
impl fmt::Display for SmscTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (sign, hours, minutes) = self.timezone_offset();
        write!(f, "20{:02}-{:02}-{:02} {:02}:{:02}:{:02} ({}{:02}:{:02})",
               self.year, self.month, self.day,
               self.hour, self.minute, self.second,
               sign, hours, minutes)
    }
}

fn digits<'a>(n: usize) -> impl FnMut(&'a str) -> IResult<&'a str, u16> {
    map_res(take_while_m_n(n, n, |c: char| c.is_ascii_digit()), |s: &str| s.parse::<u16>())
}
fn utc_offset(i: &str) -> IResult<&str, (char, u16, u16)> {
    let (i, (sign, hours, _, minutes)) = tuple((one_of("+-"), digits(2), char(':'), digits(2)))(i)?;
    Ok((i, (sign, hours, minutes)))
}
type TimestampParts = (u16, char, u16, char, u16, char, u16, char, u16, char, u16, Option<(char, u16, u16)>);
fn timestamp(i: &str) -> IResult<&str, TimestampParts> {
    tuple((
        digits(4), char('-'), digits(2), char('-'), digits(2),
        one_of(" T"),
        digits(2), char(':'), digits(2), char(':'), digits(2),
        opt(preceded(space0, alt((delimited(char('('), utc_offset, char(')')), utc_offset))))
    ))(i)
}
impl FromStr for SmscTimestamp {
    type Err = PduError;
    /// Parse `YYYY-MM-DD hh:mm:ss`, optionally followed by a UTC offset as `+hh:mm` or
    /// `(+hh:mm)`. This accepts the format `Display` produces.
    fn from_str(s: &str) -> PduResult<Self> {
        let invalid = |why: &str| PduError::InvalidTimestamp(format!("{:?}: {}", s, why));
        let (_, parts) = all_consuming(timestamp)(s.trim())
            .map_err(|_| invalid("expected YYYY-MM-DD hh:mm:ss[ +hh:mm]"))?;
        let (year, _, month, _, day, _, hour, _, minute, _, second, offset) = parts;
        if !(2000..=2099).contains(&year) {
            return Err(invalid("year must be between 2000 and 2099"));
        }
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(invalid("date out of range"));
        }
        if hour > 23 || minute > 59 || second > 59 {
            return Err(invalid("time out of range"));
        }
        let timezone = match offset {
            Some((sign, hours, minutes)) => {
                if minutes % 15 != 0 || minutes > 45 {
                    return Err(invalid("offset minutes must be a multiple of 15"));
                }
                let quarters = hours * 4 + minutes / 15;
                if quarters > MAX_TIMEZONE_QUARTERS as u16 {
                    return Err(invalid("offset too large"));
                }
                if sign == '-' { -(quarters as i8) } else { quarters as i8 }
            },
            None => 0
        };
        Ok(SmscTimestamp {
            year: (year - 2000) as u8,
            month: month as u8,
            day: day as u8,
            hour: hour as u8,
            minute: minute as u8,
            second: second as u8,
            timezone
        })
    }
}
#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decode_scts() {
        let ts = SmscTimestamp::try_from(&[0x11, 0x10, 0x11, 0x31, 0x52, 0x14, 0x00][..]).unwrap();
        assert_eq!(ts.to_string(), "2011-01-11 13:25:41 (+00:00)");
    }
    #[test]
    fn timezone_sign_and_quarters() {
        // +08:00 is 32 quarters; 0x32 swapped is 0x23.
        let ts = SmscTimestamp::try_from(&[0x99, 0x30, 0x92, 0x51, 0x61, 0x95, 0x23][..]).unwrap();
        assert_eq!(ts.timezone, 32);
        assert_eq!(ts.to_string(), "2099-03-29 15:16:59 (+08:00)");
        // -05:00 is 20 quarters with the sign bit: 0xA0, swapped 0x0A.
        let ts = SmscTimestamp::try_from(&[0x21, 0x70, 0x40, 0x80, 0x00, 0x00, 0x0A][..]).unwrap();
        assert_eq!(ts.timezone, -20);
        assert_eq!(ts.timezone_offset(), ('-', 5, 0));
        assert_eq!(ts.as_bytes()[6], 0x0A);
    }
    #[test]
    fn too_short() {
        match SmscTimestamp::try_from(&[0x11, 0x10][..]) {
            Err(PduError::TruncatedField { field: "Timestamp", needed: 7, remaining: 2, .. }) => {},
            x => panic!("expected truncation, got {:?}", x)
        }
    }
    #[test]
    fn parse_text() {
        let ts: SmscTimestamp = "2024-02-29 23:59:01 +05:30".parse().unwrap();
        assert_eq!(ts.timezone, 22);
        assert_eq!(ts.year, 24);
        let ts: SmscTimestamp = "2011-01-11T13:25:41".parse().unwrap();
        assert_eq!(ts.as_bytes(), [0x11, 0x10, 0x11, 0x31, 0x52, 0x14, 0x00]);
        assert!("2011-01-11 13:25:41 +05:10".parse::<SmscTimestamp>().is_err());
        assert!("1999-01-11 13:25:41".parse::<SmscTimestamp>().is_err());
        assert!("2011-13-11 13:25:41".parse::<SmscTimestamp>().is_err());
        assert!("yesterday".parse::<SmscTimestamp>().is_err());
    }
    proptest! {
        #[test]
        fn timestamp_survives_wire_and_text(year in 0u8..100, month in 1u8..=12, day in 1u8..=31,
                                            hour in 0u8..24, minute in 0u8..60, second in 0u8..60,
                                            timezone in -MAX_TIMEZONE_QUARTERS..=MAX_TIMEZONE_QUARTERS) {
            let ts = SmscTimestamp { year, month, day, hour, minute, second, timezone };
            prop_assert_eq!(SmscTimestamp::try_from(&ts.as_bytes()[..]).unwrap(), ts);
            prop_assert_eq!(ts.to_string().parse::<SmscTimestamp>().unwrap(), ts);
        }
    }
}
