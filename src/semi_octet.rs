//! Semi-octet (swapped-nibble BCD) helpers, used for phone numbers and timestamps.
//!
//! A semi-octet is a 4-bit digit. Two of them are packed into each octet, with the *first* digit
//! in the *low* nibble - so the number `1234` is stored as `0x21 0x43`. Odd-length numbers are
//! padded with a `0xF` filler nibble.

/// The "no digit" filler nibble.
pub const FILLER: u8 = 0x0F;

/// Exchange the high and low nibbles of an octet.
pub fn swap_nibbles(b: u8) -> u8 {
    (b << 4) | (b >> 4)
}
/// Map a semi-octet value to its digit character (`0`-`9`, `*`, `#`, `a`, `b`, `c`).
///
/// Returns `None` for the filler nibble (or anything larger than a nibble).
pub fn nibble_to_digit(n: u8) -> Option<char> {
    match n {
        0..=9 => Some((b'0' + n) as char),
        0x0A => Some('*'),
        0x0B => Some('#'),
        0x0C => Some('a'),
        0x0D => Some('b'),
        0x0E => Some('c'),
        _ => None
    }
}
/// Inverse of `nibble_to_digit`. Anything that isn't a valid digit character yields `None`.
pub fn digit_to_nibble(c: char) -> Option<u8> {
    match c {
        '0'..='9' => Some(c as u8 - b'0'),
        '*' => Some(0x0A),
        '#' => Some(0x0B),
        'a' => Some(0x0C),
        'b' => Some(0x0D),
        'c' => Some(0x0E),
        _ => None
    }
}
/// Pack a digit string into semi-octets, padding odd lengths with the filler nibble.
///
/// Characters that aren't digits are skipped, so `+44 7700-900` packs the same as `447700900`.
pub fn number_to_semi_octets(number: &str) -> Vec<u8> {
    let nibbles = number.chars()
        .filter_map(digit_to_nibble)
        .collect::<Vec<_>>();
    nibbles.chunks(2)
        .map(|pair| {
            let high = pair.get(1).cloned().unwrap_or(FILLER);
            (high << 4) | pair[0]
        })
        .collect()
}
/// Unpack at most `digits` semi-octet digits from `bytes`, dropping filler nibbles.
pub fn semi_octets_to_number(bytes: &[u8], digits: usize) -> String {
    bytes.iter()
        .flat_map(|b| vec![b & 0x0F, b >> 4])
        .take(digits)
        .filter_map(nibble_to_digit)
        .collect()
}
/// Decode one swapped-BCD octet (as used in timestamps) into its decimal value.
///
/// The stored octet `0x02` represents `20`, not `2`.
pub fn semi_octet_to_decimal(b: u8) -> u8 {
    let swapped = swap_nibbles(b);
    (swapped >> 4) * 10 + (swapped & 0x0F)
}
/// Encode a decimal value in `0..=99` as one swapped-BCD octet.
pub fn decimal_to_semi_octet(v: u8) -> u8 {
    let tens = (v / 10) % 10;
    let units = v % 10;
    (units << 4) | tens
}
#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn nibble_swap() {
        assert_eq!(swap_nibbles(0x21), 0x12);
        assert_eq!(swap_nibbles(0xF0), 0x0F);
    }
    #[test]
    fn odd_number_gets_filler() {
        assert_eq!(number_to_semi_octets("46708251358"),
                   vec![0x64, 0x07, 0x28, 0x15, 0x53, 0xF8]);
        assert_eq!(number_to_semi_octets("+1 234"), vec![0x21, 0x43]);
        assert_eq!(number_to_semi_octets("123"), vec![0x21, 0xF3]);
    }
    #[test]
    fn unpack_respects_digit_count() {
        let bytes = [0x64, 0x07, 0x28, 0x15, 0x53, 0xF8];
        assert_eq!(semi_octets_to_number(&bytes, 11), "46708251358");
        assert_eq!(semi_octets_to_number(&bytes, 4), "4670");
        assert_eq!(semi_octets_to_number(&[0xBA], 2), "*#");
    }
    #[test]
    fn timestamp_digits() {
        assert_eq!(semi_octet_to_decimal(0x02), 20);
        assert_eq!(semi_octet_to_decimal(0x41), 14);
        assert_eq!(decimal_to_semi_octet(20), 0x02);
        assert_eq!(decimal_to_semi_octet(59), 0x95);
    }
}
