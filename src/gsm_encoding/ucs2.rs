//! UCS-2 text: two big-endian octets per character.
use encoding::{Encoding, EncoderTrap};
use encoding::all::UTF_16BE;

/// Decode UCS-2 octets, one character per 2-octet unit. A dangling odd octet at the end is
/// ignored.
///
/// UCS-2 has no surrogate pairs: a unit in the surrogate range decodes as U+FFFD on its own,
/// rather than being combined with its neighbour.
pub fn decode_ucs2(bytes: &[u8]) -> String {
    bytes.chunks_exact(2)
        .map(|pair| {
            let unit = ((pair[0] as u32) << 8) | pair[1] as u32;
            ::std::char::from_u32(unit).unwrap_or(::std::char::REPLACEMENT_CHARACTER)
        })
        .collect()
}
/// Encode text as UCS-2. Characters outside the Basic Multilingual Plane can't be represented,
/// and are replaced with `?`.
pub fn encode_ucs2(text: &str) -> Vec<u8> {
    let bmp = text.chars()
        .map(|c| if (c as u32) > 0xFFFF { '?' } else { c })
        .collect::<String>();
    UTF_16BE.encode(&bmp, EncoderTrap::Replace)
        .unwrap_or_else(|_| bmp.chars().flat_map(|_| vec![0x00, b'?']).collect())
}
