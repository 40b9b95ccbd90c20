//! Parser for the `N<lat>E<lng>` frames sent by the GPS microcontroller.
//!
//! A frame looks like `N031.22296E120.57951\r\n`. Latitude carries two integer
//! digits, longitude three, both with at least five fractional digits. Anything
//! else is "no fix" rather than an error: the line is noisy while the receiver
//! is still searching for satellites.

use std::fmt;

/// Integer digits kept for latitude.
const LAT_INT_DIGITS: usize = 2;
/// Integer digits kept for longitude.
const LNG_INT_DIGITS: usize = 3;
/// Fractional digits kept for both axes.
const FRAC_DIGITS: usize = 5;

/// A position fix read from the serial line, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.latitude, self.longitude)
    }
}

/// Parse one serial frame.
///
/// Returns `None` for anything that is not a complete, fixed-width frame.
/// Extra digits are truncated, never rounded.
pub fn parse_frame(raw: &[u8]) -> Option<Fix> {
    let text = decode(raw);
    let text = text.trim();

    let body = text.strip_prefix('N')?;
    let (lat_field, lng_field) = body.split_once('E')?;

    let latitude = parse_axis(lat_field, LAT_INT_DIGITS)?;
    let longitude = parse_axis(lng_field, LNG_INT_DIGITS)?;

    Some(Fix {
        latitude,
        longitude,
    })
}

/// Decode as UTF-8, dropping bytes that don't decode.
fn decode(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .collect()
}

/// Parse `DDD.FFFFF...` with a fixed integer width.
///
/// The integer part may carry zero padding (`031` for 31°); padding beyond
/// `int_digits` is dropped before the width is applied. Anything after the
/// fifth fractional digit is discarded unread, so only the kept digits have
/// to be numeric.
fn parse_axis(field: &str, int_digits: usize) -> Option<f64> {
    let (int_part, frac_part) = field.split_once('.')?;

    if int_part.len() < int_digits || frac_part.len() < FRAC_DIGITS {
        return None;
    }

    let significant = strip_padding(int_part, int_digits);
    let int_kept = significant.get(..int_digits)?;
    let frac_kept = frac_part.get(..FRAC_DIGITS)?;
    if !is_digits(int_kept) || !is_digits(frac_kept) {
        return None;
    }

    format!("{int_kept}.{frac_kept}").parse().ok()
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// Drop leading zeros while more than `width` digits remain.
fn strip_padding(digits: &str, width: usize) -> &str {
    let mut s = digits;
    while s.len() > width && s.starts_with('0') {
        s = &s[1..];
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_frame() {
        let fix = parse_frame(b"N031.22296E120.57951").unwrap();
        assert_eq!(fix.latitude, 31.22296);
        assert_eq!(fix.longitude, 120.57951);
    }

    #[test]
    fn line_terminators_are_trimmed() {
        let fix = parse_frame(b"  N31.22296E120.57951\r\n").unwrap();
        assert_eq!(
            fix,
            Fix {
                latitude: 31.22296,
                longitude: 120.57951
            }
        );
    }

    #[test]
    fn extra_fraction_digits_truncate_not_round() {
        let fix = parse_frame(b"N031.123459E120.999999").unwrap();
        assert_eq!(fix.latitude, 31.12345);
        assert_eq!(fix.longitude, 120.99999);
    }

    #[test]
    fn wide_integer_part_keeps_leading_digits() {
        let fix = parse_frame(b"N123.00000E1234.00000").unwrap();
        assert_eq!(fix.latitude, 12.0);
        assert_eq!(fix.longitude, 123.0);
    }

    #[test]
    fn undecodable_bytes_are_ignored() {
        let mut raw = vec![0xff, 0xfe];
        raw.extend_from_slice(b"N31.22296E120.57951\n");
        let fix = parse_frame(&raw).unwrap();
        assert_eq!(fix.latitude, 31.22296);
    }

    #[test]
    fn rejects_missing_prefix() {
        assert_eq!(parse_frame(b"31.22296E120.57951"), None);
        assert_eq!(parse_frame(b"S31.22296E120.57951"), None);
    }

    #[test]
    fn rejects_missing_separator() {
        assert_eq!(parse_frame(b"N31.22296W120.57951"), None);
        assert_eq!(parse_frame(b"N31.22296"), None);
    }

    #[test]
    fn rejects_missing_decimal_point() {
        assert_eq!(parse_frame(b"N3122296E120.57951"), None);
        assert_eq!(parse_frame(b"N31.22296E12057951"), None);
    }

    #[test]
    fn rejects_short_fields() {
        // one latitude integer digit
        assert_eq!(parse_frame(b"N3.22296E120.57951"), None);
        // two longitude integer digits
        assert_eq!(parse_frame(b"N31.22296E20.57951"), None);
        // four fractional digits
        assert_eq!(parse_frame(b"N31.2229E120.57951"), None);
        assert_eq!(parse_frame(b"N31.22296E120.5795"), None);
    }

    #[test]
    fn rejects_non_numeric_digits() {
        assert_eq!(parse_frame(b"N3x.22296E120.57951"), None);
        assert_eq!(parse_frame(b"N31.22296E120.57a51"), None);
        assert_eq!(parse_frame(b"N31.2229xE120.57951"), None);
        assert_eq!(parse_frame(b"N+1.22296E120.57951"), None);
    }

    #[test]
    fn bytes_after_fifth_fraction_digit_are_dropped() {
        let expected = Some(Fix {
            latitude: 31.22296,
            longitude: 120.57951,
        });
        assert_eq!(parse_frame(b"N31.22296E120.57951*3A"), expected);
        assert_eq!(parse_frame(b"N31.22296E120.57951,A"), expected);
        assert_eq!(parse_frame(b"N31.22296E120.57951.0"), expected);
        assert_eq!(parse_frame(b"N31.22296X1E120.57951"), expected);
        assert_eq!(parse_frame(b"N31.22296E120.57951E1"), expected);
    }

    #[test]
    fn multibyte_noise_in_kept_digits_is_no_fix() {
        assert_eq!(parse_frame("N3é.22296E120.57951".as_bytes()), None);
        assert_eq!(parse_frame("N31.2229éE120.57951".as_bytes()), None);
    }

    #[test]
    fn rejects_empty_and_noise() {
        assert_eq!(parse_frame(b""), None);
        assert_eq!(parse_frame(b"\r\n"), None);
        assert_eq!(parse_frame(b"NE"), None);
        assert_eq!(parse_frame(b"$GPRMC,123519,A,4807.038,N"), None);
    }

    #[test]
    fn display_uses_five_decimals() {
        let fix = Fix {
            latitude: 31.22296,
            longitude: 120.57951,
        };
        assert_eq!(fix.to_string(), "31.22296,120.57951");
    }
}
