//! Utilities for dealing with the (annoying) GSM 7-bit encoding (GSM 03.38), and decoding/encoding message
//! data.
//!
//! "The annoying GSM 7-bit encoding" is otherwise known as [GSM
//! 03.38](https://en.wikipedia.org/wiki/GSM_03.38), and that Wikipedia article is pretty
//! informative.
//!
//! Text goes through two steps: characters are mapped to *septets* (7-bit values) using the
//! default alphabet, or the extension table behind an escape septet; then the septets are
//! *packed*, 8 septets to 7 octets. Both steps are separate functions here, because the
//! User Data Header makes the packed septets start at a bit offset (the "fill bits").
//!
//! **NB:** SMS messages that are longer than the per-message character limit are sent & received
//! as [concatenated SMS](https://en.wikipedia.org/wiki/Concatenated_SMS) messages;
//! `GsmMessageData::encode_concatenated` will split them up for you.

use std::collections::HashMap;
use crate::pdu::Alphabet;
use crate::errors::*;
use crate::hex::bytes_to_hex;

mod lookup_tables;
pub mod udh;
pub mod ucs2;

use self::udh::{UserDataHeader, UdhParse};
pub use self::lookup_tables::{GSM_DEFAULT_ALPHABET, GSM_EXTENDED_ENCODING_TABLE, GSM_ESCAPE};

/// Septets in a single unconcatenated GSM 7-bit message.
pub const MAX_SEPTETS: usize = 160;
/// Octets of user data in a single message.
pub const MAX_USER_DATA_OCTETS: usize = 140;
/// Septets of text in each part of a concatenated message (an 8-bit reference UDH costs 7).
pub const CONCAT_SEPTETS: usize = 153;
/// Octets of text in each part of a concatenated 8-bit or UCS-2 message.
pub const CONCAT_OCTETS: usize = 134;

lazy_static! {
    static ref GSM_ENCODE_MAP: HashMap<char, u8> = GSM_DEFAULT_ALPHABET.iter()
        .enumerate()
        .filter(|&(i, _)| i as u8 != GSM_ESCAPE)
        .map(|(i, &ch)| (ch, i as u8))
        .collect();
    static ref GSM_EXTENDED_ENCODE_MAP: HashMap<char, u8> = GSM_EXTENDED_ENCODING_TABLE.iter()
        .cloned()
        .collect();
    static ref GSM_EXTENDED_DECODE_MAP: HashMap<u8, char> = GSM_EXTENDED_ENCODING_TABLE.iter()
        .map(|&(ch, val)| (val, ch))
        .collect();
}

/// Decode a buffer of **unpacked** septets into a string.
///
/// An escape septet isn't a character itself; the septet after it is looked up in the extension
/// table instead. Anything the extension table doesn't know about decodes as `?`, and a dangling
/// escape at the very end is dropped.
pub fn gsm_decode_string(input: &[u8]) -> String {
    let mut ret = String::with_capacity(input.len());
    let mut escape = false;
    for &b in input.iter() {
        let b = b & 0x7F;
        if escape {
            ret.push(GSM_EXTENDED_DECODE_MAP.get(&b).cloned().unwrap_or('?'));
            escape = false;
        }
        else if b == GSM_ESCAPE {
            escape = true;
        }
        else {
            ret.push(GSM_DEFAULT_ALPHABET[b as usize]);
        }
    }
    ret
}
/// Tries to encode a character into the given destination buffer, returning `true` if the
/// character was successfully encoded, and `false` if the character cannot be represented in the
/// GSM 7-bit encoding.
///
/// Extension-table characters cost two septets: the escape, then the extension code.
pub fn try_gsm_encode_char(b: char, dest: &mut Vec<u8>) -> bool {
    if let Some(&val) = GSM_ENCODE_MAP.get(&b) {
        dest.push(val);
        return true;
    }
    if let Some(&val) = GSM_EXTENDED_ENCODE_MAP.get(&b) {
        dest.push(GSM_ESCAPE);
        dest.push(val);
        return true;
    }
    false
}
/// Tries to encode a string as GSM 7-bit, returning a buffer of **unpacked** septets iff all of
/// the data in `input` was representable in the 7-bit encoding.
pub fn try_gsm_encode_string(input: &str) -> Option<Vec<u8>> {
    let mut ret = vec![];
    for c in input.chars() {
        if !try_gsm_encode_char(c, &mut ret) {
            return None;
        }
    }
    Some(ret)
}
/// Encode a string as **unpacked** septets, replacing unrepresentable characters with `?`.
pub fn gsm_encode_string(input: &str) -> Vec<u8> {
    let mut ret = Vec::with_capacity(input.len());
    for c in input.chars() {
        if !try_gsm_encode_char(c, &mut ret) {
            debug!("character {:?} not in the GSM alphabet, substituting '?'", c);
            ret.push(b'?');
        }
    }
    ret
}
/// Number of septets a User Data Header of `udh_octets` octets (including the UDHL octet)
/// occupies in a GSM 7-bit message.
pub fn header_septets(udh_octets: usize) -> usize {
    (udh_octets * 8 + 6) / 7
}
/// Number of fill bits between a User Data Header and the first septet of text.
pub fn fill_bits(udh_octets: usize) -> usize {
    header_septets(udh_octets) * 7 - udh_octets * 8
}
/// Number of octets needed to hold `septets` packed septets.
pub fn packed_len(septets: usize) -> usize {
    (septets * 7 + 7) / 8
}
/// Unpack `count` septets from `orig`, skipping `fill` (0-6) bits at the start.
///
/// Septets straddle octet boundaries: each octet contributes its bits to a rolling carry, and a
/// septet comes off the bottom of the carry whenever 7 bits are available. Trailing padding
/// bits after the `count`th septet are ignored.
pub fn unpack_septets(orig: &[u8], fill: usize, count: usize) -> Vec<u8> {
    let mut ret = Vec::with_capacity(count);
    let mut carry: u16 = 0;
    let mut shift = 0;
    let mut skip = fill;
    for &data in orig.iter() {
        if ret.len() >= count {
            break;
        }
        carry |= (data as u16) << shift;
        shift += 8;
        if skip > 0 {
            carry >>= skip;
            shift -= skip;
            skip = 0;
        }
        while shift >= 7 && ret.len() < count {
            ret.push((carry & 0x7F) as u8);
            carry >>= 7;
            shift -= 7;
        }
    }
    ret
}
/// Pack septets into octets, leaving `fill` (0-6) zero bits at the start.
pub fn pack_septets(orig: &[u8], fill: usize) -> Vec<u8> {
    let mut ret = Vec::with_capacity(packed_len(orig.len()) + 1);
    let mut carry: u16 = 0;
    let mut shift = fill;
    for &septet in orig.iter() {
        carry |= ((septet & 0x7F) as u16) << shift;
        shift += 7;
        while shift >= 8 {
            ret.push((carry & 0xFF) as u8);
            carry >>= 8;
            shift -= 8;
        }
    }
    if shift > 0 {
        ret.push((carry & 0xFF) as u8);
    }
    ret
}
/// Encode a string as 8-bit data (ISO-8859-1), replacing anything outside Latin-1 with `?`.
pub fn encode_8bit(input: &str) -> Vec<u8> {
    use encoding::{Encoding, EncoderTrap};
    use encoding::all::ISO_8859_1;

    ISO_8859_1.encode(input, EncoderTrap::Replace)
        .unwrap_or_else(|_| input.chars().map(|_| b'?').collect())
}
fn split_septets(buf: Vec<u8>, max_len: usize) -> Vec<Vec<u8>> {
    let mut ret = vec![];
    let mut cbuf = buf;
    while max_len < cbuf.len() {
        let mut at = max_len;
        // Don't separate an escape from the septet it modifies.
        let escapes = cbuf[..at].iter().rev().take_while(|&&s| s == GSM_ESCAPE).count();
        if escapes % 2 == 1 {
            at -= 1;
        }
        let split = cbuf.split_off(at);
        let old = ::std::mem::replace(&mut cbuf, split);
        ret.push(old);
    }
    ret.push(cbuf);
    ret
}
fn split_octets(buf: Vec<u8>, max_len: usize) -> Vec<Vec<u8>> {
    buf.chunks(max_len)
        .map(|c| c.to_vec())
        .collect()
}
/// The 'data' portion of an SMS message - the packed text, plus any User Data Header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsmMessageData {
    pub(crate) alphabet: Alphabet,
    pub(crate) udh: bool,
    pub(crate) bytes: Vec<u8>,
    pub(crate) user_data_len: u8
}
/// A decoded text message, with optional user data header.
#[derive(Debug, Clone, Default)]
pub struct DecodedMessage {
    /// Decoded text (or, for 8-bit data, its hex representation).
    pub text: String,
    /// User data header, if TP-UDHI was set and there was any data at all.
    pub udh: Option<UdhParse>,
    /// Septets (GSM 7-bit) or octets (otherwise) of text that were decoded.
    pub text_units: usize
}
impl GsmMessageData {
    /// Wrap user data that has come off the wire.
    ///
    /// `bytes` should be exactly the user data the UDL accounts for.
    pub fn new(alphabet: Alphabet, udh: bool, bytes: Vec<u8>, user_data_len: u8) -> Self {
        GsmMessageData { alphabet, udh, bytes, user_data_len }
    }
    /// Get the alphabet.
    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }
    /// Whether a User Data Header is present (i.e. TP-UDHI should be set).
    pub fn has_udh(&self) -> bool {
        self.udh
    }
    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
    /// Get the user data length. This is in septets for GSM 7-bit, and octets otherwise.
    pub fn user_data_len(&self) -> u8 {
        self.user_data_len
    }
    /// Number of octets the user data occupies for a given alphabet and UDL.
    pub fn octets_for(alphabet: Alphabet, user_data_len: u8) -> usize {
        match alphabet {
            Alphabet::Gsm7 => packed_len(user_data_len as usize),
            Alphabet::Binary8 | Alphabet::Ucs2 => user_data_len as usize
        }
    }
    /// Decode this message.
    ///
    /// A malformed header doesn't fail the decode; whatever could be parsed is returned, and the
    /// text starts where the header *says* it ends.
    pub fn decode_message(&self) -> DecodedMessage {
        let mut start = 0;
        let mut udh = None;
        if self.udh && !self.bytes.is_empty() {
            let parse = UserDataHeader::parse(&self.bytes);
            start = parse.declared_len;
            udh = Some(parse);
        }
        let rest = self.bytes.get(start..).unwrap_or(&[]);
        match self.alphabet {
            Alphabet::Gsm7 => {
                let (fill, skip) = if start > 0 {
                    (fill_bits(start), header_septets(start))
                }
                else {
                    (0, 0)
                };
                let count = (self.user_data_len as usize).saturating_sub(skip);
                let septets = unpack_septets(rest, fill, count);
                DecodedMessage {
                    text: gsm_decode_string(&septets),
                    udh,
                    text_units: septets.len()
                }
            },
            Alphabet::Ucs2 => DecodedMessage {
                text: ucs2::decode_ucs2(rest),
                udh,
                text_units: rest.len()
            },
            Alphabet::Binary8 => DecodedMessage {
                text: bytes_to_hex(rest),
                udh,
                text_units: rest.len()
            }
        }
    }
    /// Encode `msg` as a single message, with an optional User Data Header.
    ///
    /// Fails with `MessageTooLong` if the result wouldn't fit into 140 octets of user data.
    pub fn encode_message(msg: &str, alphabet: Alphabet, udh: Option<&UserDataHeader>) -> PduResult<Self> {
        let header = udh.map(|u| u.as_bytes()).unwrap_or_default();
        let mut bytes = header.clone();
        let user_data_len = match alphabet {
            Alphabet::Gsm7 => {
                let septets = gsm_encode_string(msg);
                let (fill, skip) = if header.is_empty() {
                    (0, 0)
                }
                else {
                    (fill_bits(header.len()), header_septets(header.len()))
                };
                bytes.extend(pack_septets(&septets, fill));
                let len = skip + septets.len();
                if len > MAX_SEPTETS {
                    return Err(PduError::MessageTooLong { units: len, limit: MAX_SEPTETS });
                }
                len
            },
            Alphabet::Ucs2 => {
                bytes.extend(ucs2::encode_ucs2(msg));
                bytes.len()
            },
            Alphabet::Binary8 => {
                bytes.extend(encode_8bit(msg));
                bytes.len()
            }
        };
        if bytes.len() > MAX_USER_DATA_OCTETS {
            return Err(PduError::MessageTooLong { units: bytes.len(), limit: MAX_USER_DATA_OCTETS });
        }
        Ok(GsmMessageData {
            alphabet,
            udh: udh.is_some(),
            bytes,
            user_data_len: user_data_len as u8
        })
    }
    /// Encode an arbitrary string of text into one, or multiple, GSM message data segments.
    ///
    /// If this function returns more than one bit of data, it means it's been split into multiple
    /// concatenated parts for you, and you'll need to send each part individually in order, as
    /// part of a new `Pdu` to your desired recipient. If `reference` is `None`, a random
    /// concatenation reference is chosen.
    pub fn encode_concatenated(msg: &str, alphabet: Alphabet, reference: Option<u8>) -> PduResult<Vec<Self>> {
        let single = Self::encode_message(msg, alphabet, None);
        match single {
            Ok(data) => return Ok(vec![data]),
            Err(PduError::MessageTooLong { .. }) => {},
            Err(e) => return Err(e)
        }
        let csms_ref = reference.unwrap_or_else(rand::random::<u8>);
        let bufs = match alphabet {
            Alphabet::Gsm7 => split_septets(gsm_encode_string(msg), CONCAT_SEPTETS),
            Alphabet::Ucs2 => split_octets(ucs2::encode_ucs2(msg), CONCAT_OCTETS),
            Alphabet::Binary8 => split_octets(encode_8bit(msg), CONCAT_OCTETS)
        };
        if bufs.len() > 255 {
            return Err(PduError::MessageTooLong { units: bufs.len(), limit: 255 });
        }
        let num_parts = bufs.len() as u8;
        debug!("splitting message into {} parts, reference {}", num_parts, csms_ref);
        Ok(bufs.into_iter()
            .enumerate()
            .map(|(i, buf)| {
                let udh = UserDataHeader::concatenation(csms_ref, num_parts, i as u8 + 1);
                let mut bytes = udh.as_bytes();
                let user_data_len = match alphabet {
                    Alphabet::Gsm7 => {
                        let h = bytes.len();
                        bytes.extend(pack_septets(&buf, fill_bits(h)));
                        header_septets(h) + buf.len()
                    },
                    Alphabet::Ucs2 | Alphabet::Binary8 => {
                        bytes.extend(buf);
                        bytes.len()
                    }
                };
                GsmMessageData {
                    alphabet,
                    udh: true,
                    bytes,
                    user_data_len: user_data_len as u8
                }
            })
            .collect())
    }
}
#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pack_hellohello() {
        let septets = gsm_encode_string("hellohello");
        let packed = pack_septets(&septets, 0);
        assert_eq!(packed, vec![0xE8, 0x32, 0x9B, 0xFD, 0x46, 0x97, 0xD9, 0xEC, 0x37]);
        assert_eq!(gsm_decode_string(&unpack_septets(&packed, 0, 10)), "hellohello");
    }
    #[test]
    fn eight_septets_fill_seven_octets() {
        let septets = gsm_encode_string("12345678");
        assert_eq!(pack_septets(&septets, 0).len(), 7);
        assert_eq!(packed_len(8), 7);
        assert_eq!(packed_len(160), 140);
    }
    #[test]
    fn euro_is_escaped() {
        assert_eq!(gsm_encode_string("€"), vec![0x1B, 0x65]);
        assert_eq!(gsm_encode_string("a[b]"), vec![0x61, 0x1B, 0x3C, 0x62, 0x1B, 0x3E]);
        assert_eq!(gsm_decode_string(&[0x1B, 0x65, 0x1B, 0x0A]), "€\u{000C}");
    }
    #[test]
    fn unmappable_becomes_question_mark() {
        assert_eq!(gsm_encode_string("a\u{4E2D}"), vec![0x61, 0x3F]);
        assert!(try_gsm_encode_string("a\u{4E2D}").is_none());
        assert_eq!(gsm_decode_string(&[0x1B, 0x41]), "?");
    }
    #[test]
    fn header_arithmetic() {
        assert_eq!(header_septets(6), 7);
        assert_eq!(fill_bits(6), 1);
        assert_eq!(header_septets(7), 8);
        assert_eq!(fill_bits(7), 0);
    }
    #[test]
    fn concatenated_gsm_text() {
        let msg = "x".repeat(200);
        let parts = GsmMessageData::encode_concatenated(&msg, Alphabet::Gsm7, Some(42)).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].user_data_len(), 160);
        assert_eq!(parts[0].as_bytes().len(), 140);
        assert_eq!(parts[1].user_data_len(), 7 + 47);
        let decoded = parts.iter()
            .map(|p| p.decode_message())
            .collect::<Vec<_>>();
        let text = decoded.iter().map(|d| d.text.as_str()).collect::<String>();
        assert_eq!(text, msg);
        let info = decoded[1].udh.as_ref().unwrap().header.multipart_info().unwrap();
        assert_eq!((info.reference, info.total_parts, info.part_number), (42, 2, 2));
    }
    #[test]
    fn concatenation_keeps_escapes_whole() {
        let msg = format!("{}€tail-tail-", "x".repeat(152));
        let parts = GsmMessageData::encode_concatenated(&msg, Alphabet::Gsm7, Some(1)).unwrap();
        assert_eq!(parts.len(), 2);
        let text = parts.iter()
            .map(|p| p.decode_message().text)
            .collect::<String>();
        assert_eq!(text, msg);
    }
    #[test]
    fn short_message_is_single_part() {
        let parts = GsmMessageData::encode_concatenated("hi", Alphabet::Ucs2, None).unwrap();
        assert_eq!(parts.len(), 1);
        assert!(!parts[0].has_udh());
        assert_eq!(parts[0].as_bytes(), &[0x00, 0x68, 0x00, 0x69]);
    }
    #[test]
    fn too_long_single_message() {
        let err = GsmMessageData::encode_message(&"x".repeat(161), Alphabet::Gsm7, None).unwrap_err();
        assert_eq!(err, PduError::MessageTooLong { units: 161, limit: 160 });
    }
    proptest! {
        #[test]
        fn septets_survive_packing(septets in proptest::collection::vec(0u8..0x80, 0..200), fill in 0usize..7) {
            let packed = pack_septets(&septets, fill);
            prop_assert_eq!(packed.len(), (fill + septets.len() * 7 + 7) / 8);
            prop_assert_eq!(unpack_septets(&packed, fill, septets.len()), septets);
        }
    }
}
