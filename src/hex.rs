//! Conversion between hex strings and octets.
use std::fmt;
use nom::IResult;
use nom::bytes::complete::take_while_m_n;
use nom::combinator::map_res;
use nom::multi::many0;
use crate::errors::*;

/// Wrapper that displays a byte slice as upper-case hex, two digits per octet.
pub struct HexData<'a>(pub &'a [u8]);
impl<'a> fmt::Display for HexData<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
       for b in self.0.iter() {
           write!(f, "{:02X}", b)?;
       }
       Ok(())
    }
}
impl<'a> HexData<'a> {
    /// Decode a hex string into octets. Whitespace anywhere in the input is ignored.
    pub fn decode(data: &str) -> PduResult<Vec<u8>> {
        hex_to_bytes(data)
    }
}
fn hex_octet(input: &str) -> IResult<&str, u8> {
    map_res(
        take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()),
        |s| u8::from_str_radix(s, 16)
    )(input)
}
/// Decode a hex string into octets, ignoring whitespace.
///
/// Fails with `MalformedInput` if there's an odd number of digits, or something that isn't a
/// hex digit; the reported position counts characters after whitespace removal.
pub fn hex_to_bytes(input: &str) -> PduResult<Vec<u8>> {
    let compact = input.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>();
    let (rest, bytes) = many0(hex_octet)(compact.as_str())
        .map_err(|_| PduError::MalformedInput { position: 0, reason: "unparseable hex string" })?;
    if rest.is_empty() {
        return Ok(bytes);
    }
    let mut position = compact[..compact.len() - rest.len()].chars().count();
    let mut chars = rest.chars();
    let first_is_hex = chars.next().map(|c| c.is_ascii_hexdigit()).unwrap_or(false);
    let reason = if first_is_hex && chars.next().is_none() {
        "odd number of hex digits"
    }
    else {
        if first_is_hex {
            position += 1;
        }
        "not a hex digit"
    };
    Err(PduError::MalformedInput { position, reason })
}
/// Encode octets as an upper-case hex string.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    HexData(bytes).to_string()
}
#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn decodes_with_whitespace() {
        assert_eq!(hex_to_bytes("07 91 44\n87").unwrap(), vec![0x07, 0x91, 0x44, 0x87]);
        assert_eq!(hex_to_bytes("abCD").unwrap(), vec![0xAB, 0xCD]);
        assert_eq!(hex_to_bytes("").unwrap(), Vec::<u8>::new());
    }
    #[test]
    fn rejects_odd_length() {
        assert_eq!(hex_to_bytes("079"), Err(PduError::MalformedInput {
            position: 2,
            reason: "odd number of hex digits"
        }));
    }
    #[test]
    fn rejects_non_hex() {
        assert_eq!(hex_to_bytes("07G1"), Err(PduError::MalformedInput {
            position: 2,
            reason: "not a hex digit"
        }));
        assert_eq!(hex_to_bytes("070Z"), Err(PduError::MalformedInput {
            position: 3,
            reason: "not a hex digit"
        }));
    }
    #[test]
    fn encodes_upper_case() {
        assert_eq!(bytes_to_hex(&[0x00, 0x91, 0xAB]), "0091AB");
        assert_eq!(HexData(&[0x0F]).to_string(), "0F");
    }
}
