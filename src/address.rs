//! Phone numbers and alphanumeric addresses, as they appear in PDUs.
//!
//! An address on the wire is a Type-of-Address octet followed by the number in semi-octets (see
//! the `semi_octet` module), or - for alphanumeric senders - GSM 7-bit packed text. For the
//! originating and destination addresses, the length field in front counts *semi-octets* (digits),
//! so the data occupies `ceil(length / 2)` octets; for the SMSC address it counts octets.
use std::fmt;
use std::str::FromStr;
use std::convert::{Infallible, TryFrom};
use num_traits::FromPrimitive;
use crate::errors::*;
use crate::semi_octet::{self, nibble_to_digit, digit_to_nibble};
use crate::gsm_encoding::{gsm_decode_string, gsm_encode_string, pack_septets, unpack_septets};

/// Longest address length (in digits) the standard allows.
pub const MAX_ADDRESS_DIGITS: usize = 20;

/// Type of number value - used as part of phone numbers to indicate whether the number is
/// international, alphanumeric, etc.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, FromPrimitive, is_enum_variant)]
pub enum TypeOfNumber {
    /// Unknown number type ('let the network handle it please').
    Unknown = 0b0_000_0000,
    /// International (i.e. starting with +).
    International = 0b0_001_0000,
    /// National number - no prefix or suffix added.
    National = 0b0_010_0000,
    /// Network-specific number.
    NetworkSpecific = 0b0_011_0000,
    /// Subscriber number.
    Subscriber = 0b0_100_0000,
    /// Alphanumeric - this isn't a phone number, it's some GSM 7-bit text that indicates who
    /// the sender is (e.g. when banks send you SMSes).
    Alphanumeric = 0b0_101_0000,
    /// Abbreviated number.
    Abbreviated = 0b0_110_0000,
    /// Reserved for extension.
    Reserved = 0b0_111_0000
}
impl TypeOfNumber {
    pub fn description(&self) -> &'static str {
        use self::TypeOfNumber::*;
        match *self {
            Unknown => "Unknown",
            International => "International",
            National => "National",
            NetworkSpecific => "Network specific",
            Subscriber => "Subscriber number",
            Alphanumeric => "Alphanumeric",
            Abbreviated => "Abbreviated",
            Reserved => "Reserved"
        }
    }
}
/// Numbering plan identification value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NumberingPlan {
    Unknown,
    IsdnTelephone,
    Data,
    Telex,
    ServiceCentreSpecific(u8),
    National,
    Private,
    Ermes,
    Other(u8)
}
impl From<u8> for NumberingPlan {
    fn from(b: u8) -> Self {
        use self::NumberingPlan::*;
        match b & 0b0000_1111 {
            0b0000 => Unknown,
            0b0001 => IsdnTelephone,
            0b0011 => Data,
            0b0100 => Telex,
            x @ 0b0101 ..= 0b0110 => ServiceCentreSpecific(x),
            0b1000 => National,
            0b1001 => Private,
            0b1010 => Ermes,
            x => Other(x)
        }
    }
}
impl Into<u8> for NumberingPlan {
    fn into(self) -> u8 {
        use self::NumberingPlan::*;
        match self {
            Unknown => 0b0000,
            IsdnTelephone => 0b0001,
            Data => 0b0011,
            Telex => 0b0100,
            National => 0b1000,
            Private => 0b1001,
            Ermes => 0b1010,
            ServiceCentreSpecific(x) | Other(x) => x & 0b0000_1111
        }
    }
}
/// Address type, comprised of a `TypeOfNumber` and `NumberingPlan` value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AddressType {
    pub type_of_number: TypeOfNumber,
    pub numbering_plan: NumberingPlan
}
impl Default for AddressType {
    fn default() -> Self {
        AddressType {
            type_of_number: TypeOfNumber::International,
            numbering_plan: NumberingPlan::IsdnTelephone
        }
    }
}
impl From<u8> for AddressType {
    fn from(b: u8) -> Self {
        // Three bits can't be out of range.
        let type_of_number = TypeOfNumber::from_u8(b & 0b0_111_0000)
            .unwrap_or(TypeOfNumber::Reserved);
        AddressType {
            type_of_number,
            numbering_plan: NumberingPlan::from(b)
        }
    }
}
impl Into<u8> for AddressType {
    fn into(self) -> u8 {
        let mut ret: u8 = 0b1_000_0000;
        ret |= self.type_of_number as u8;
        let npi: u8 = self.numbering_plan.into();
        ret |= npi;
        ret
    }
}
/// A GSM phone number, as individual semi-octet values - or, for alphanumeric addresses,
/// unpacked GSM 7-bit septets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(pub Vec<u8>);
impl PhoneNumber {
    /// Take `digits` semi-octets from some bytes. With an odd count, the filler in the last
    /// high nibble is left out; any other nibble is kept as-is.
    pub fn from_semi_octets(b: &[u8], digits: usize) -> Self {
        let ret = b.iter()
            .flat_map(|b| vec![b & 0b0000_1111, b >> 4])
            .take(digits)
            .collect();
        PhoneNumber(ret)
    }
    /// Make a `PhoneNumber` for an alphanumeric GSM sender address, `len` septets long.
    pub fn from_gsm(b: &[u8], len: usize) -> Self {
        PhoneNumber(unpack_septets(b, 0, len))
    }
    /// Pack the semi-octets, padding with a filler nibble if there's an odd number of them.
    pub fn as_bytes(&self) -> Vec<u8> {
        self.0.chunks(2)
            .map(|pair| {
                let high = pair.get(1).cloned().unwrap_or(semi_octet::FILLER);
                (high << 4) | (pair[0] & 0b0000_1111)
            })
            .collect()
    }
}
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PduAddress {
    pub type_addr: AddressType,
    pub number: PhoneNumber
}
impl fmt::Display for PduAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.type_addr.type_of_number {
            TypeOfNumber::Alphanumeric => {
                write!(f, "{}", gsm_decode_string(&self.number.0))
            },
            ton => {
                if ton == TypeOfNumber::International {
                    write!(f, "+")?;
                }
                for &b in self.number.0.iter() {
                    if let Some(c) = nibble_to_digit(b) {
                        write!(f, "{}", c)?;
                    }
                }
                Ok(())
            }
        }
    }
}
impl FromStr for PduAddress {
    type Err = Infallible;
    /// Anything with letters in becomes an alphanumeric address. Otherwise, non-digits are
    /// stripped, and a leading `+` selects the international type (`0x91`, rather than `0x81`).
    fn from_str(st: &str) -> Result<Self, Infallible> {
        let st = st.trim();
        if st.chars().any(|c| c.is_alphabetic() && digit_to_nibble(c).is_none()) {
            return Ok(PduAddress::alphanumeric(st));
        }
        let int = st.starts_with('+');
        let buf = st.chars()
            .filter_map(digit_to_nibble)
            .collect::<Vec<_>>();
        let ton = if int {
            TypeOfNumber::International
        }
        else {
            TypeOfNumber::Unknown
        };
        Ok(PduAddress {
            type_addr: AddressType {
                type_of_number: ton,
                numbering_plan: NumberingPlan::IsdnTelephone
            },
            number: PhoneNumber(buf)
        })
    }
}
impl<'a> TryFrom<&'a [u8]> for PduAddress {
    type Error = PduError;
    /// Parse a length-prefixed originating/destination address (length in semi-octets).
    fn try_from(b: &[u8]) -> PduResult<Self> {
        if b.len() < 2 {
            Err(PduError::TruncatedField {
                field: "Address",
                offset: 0,
                needed: 2,
                remaining: b.len()
            })?
        }
        let len = b[0] as usize;
        let octets = (len + 1) / 2;
        if b.len() < octets + 2 {
            Err(PduError::TruncatedField {
                field: "Address",
                offset: 2,
                needed: octets,
                remaining: b.len() - 2
            })?
        }
        Ok(PduAddress::decode(len, b[1], &b[2..2 + octets]))
    }
}
impl PduAddress {
    /// Decode an address from its Type-of-Address octet and data octets.
    ///
    /// `digits` is the declared length in semi-octets. For alphanumeric addresses this covers
    /// `digits * 4 / 7` septets of packed text.
    pub fn decode(digits: usize, type_of_address: u8, data: &[u8]) -> Self {
        let type_addr = AddressType::from(type_of_address);
        let number = if type_addr.type_of_number == TypeOfNumber::Alphanumeric {
            PhoneNumber::from_gsm(data, (digits * 4) / 7)
        }
        else {
            PhoneNumber::from_semi_octets(data, digits)
        };
        PduAddress { type_addr, number }
    }
    /// Make an alphanumeric address.
    pub fn alphanumeric(text: &str) -> Self {
        PduAddress {
            type_addr: AddressType {
                type_of_number: TypeOfNumber::Alphanumeric,
                numbering_plan: NumberingPlan::Unknown
            },
            number: PhoneNumber(gsm_encode_string(text))
        }
    }
    /// The address data, without length or Type-of-Address.
    pub fn data_bytes(&self) -> Vec<u8> {
        if self.type_addr.type_of_number == TypeOfNumber::Alphanumeric {
            pack_septets(&self.number.0, 0)
        }
        else {
            self.number.as_bytes()
        }
    }
    /// The value of the length field for an originating/destination address: a count of
    /// semi-octets.
    pub fn semi_octet_len(&self) -> usize {
        if self.type_addr.type_of_number == TypeOfNumber::Alphanumeric {
            (self.number.0.len() * 7 + 3) / 4
        }
        else {
            self.number.0.len()
        }
    }
    /// Parse an address for encoding into the `field` address field, refusing anything longer
    /// than `MAX_ADDRESS_DIGITS` semi-octets.
    pub fn parse_checked(st: &str, field: &'static str) -> PduResult<Self> {
        let addr = st.parse::<PduAddress>().unwrap_or_else(|e| match e {});
        let length = addr.semi_octet_len();
        if length > MAX_ADDRESS_DIGITS {
            Err(PduError::AddressTooLong { field, length, limit: MAX_ADDRESS_DIGITS })?
        }
        Ok(addr)
    }
    /// Serialize this address, including its length prefix.
    ///
    /// If `semi_octet_len` is set, the length counts semi-octets (as for TP addresses);
    /// otherwise it counts the octets following it (as for the SMSC address).
    pub fn as_bytes(&self, semi_octet_len: bool) -> Vec<u8> {
        let mut ret = vec![];
        ret.push(self.type_addr.into());
        ret.extend(self.data_bytes());
        let len = if semi_octet_len {
            self.semi_octet_len()
        } else {
            ret.len()
        };
        ret.insert(0, len as u8);
        ret
    }
    /// Flag addresses that decoded into something mostly unprintable.
    ///
    /// Anything longer than 10 characters with fewer than half of them printable ASCII is
    /// rejected with `MalformedAddress`.
    pub fn check_printable(&self) -> PduResult<()> {
        let s = self.to_string();
        let total = s.chars().count();
        let printable = s.chars().filter(|c| (' '..='~').contains(c)).count();
        if total > 10 && printable * 2 < total {
            Err(PduError::MalformedAddress(s))?
        }
        Ok(())
    }
}
#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn international_number() {
        let addr = PduAddress::decode(11, 0x91, &[0x64, 0x07, 0x28, 0x15, 0x53, 0xF8]);
        assert_eq!(addr.type_addr.type_of_number, TypeOfNumber::International);
        assert_eq!(addr.type_addr.numbering_plan, NumberingPlan::IsdnTelephone);
        assert_eq!(addr.number.0.len(), 11);
        assert_eq!(addr.to_string(), "+46708251358");
        assert_eq!(addr.as_bytes(true), vec![0x0B, 0x91, 0x64, 0x07, 0x28, 0x15, 0x53, 0xF8]);
    }
    #[test]
    fn alphanumeric_sender() {
        let addr = PduAddress::decode(13, 0xD0, &[0xE4, 0x74, 0xD8, 0x1C, 0x0E, 0xBB, 0x01]);
        assert!(addr.type_addr.type_of_number.is_alphanumeric());
        assert_eq!(addr.to_string(), "diafaan");
        assert_eq!(addr.as_bytes(true), vec![0x0D, 0xD0, 0xE4, 0x74, 0xD8, 0x1C, 0x0E, 0xBB, 0x01]);
        let parsed: PduAddress = "diafaan".parse().unwrap();
        assert_eq!(parsed.as_bytes(true), addr.as_bytes(true));
    }
    #[test]
    fn from_str_chooses_type() {
        let int: PduAddress = "+44 7700 900123".parse().unwrap();
        let int_bytes = int.as_bytes(true);
        assert_eq!(int_bytes[0], 12);
        assert_eq!(int_bytes[1], 0x91);
        let nat: PduAddress = "07700900123".parse().unwrap();
        let nat_bytes = nat.as_bytes(true);
        assert_eq!(nat_bytes[0], 11);
        assert_eq!(nat_bytes[1], 0x81);
        assert_eq!(*nat_bytes.last().unwrap(), 0xF3);
        assert_eq!(nat.to_string(), "07700900123");
    }
    #[test]
    fn smsc_length_counts_octets() {
        let smsc: PduAddress = "+447802000332".parse().unwrap();
        assert_eq!(smsc.as_bytes(false),
                   vec![0x07, 0x91, 0x44, 0x87, 0x20, 0x00, 0x30, 0x23]);
    }
    #[test]
    fn prefixed_slice() {
        let addr = PduAddress::try_from(&[0x03u8, 0x81, 0x21, 0xF3][..]).unwrap();
        assert_eq!(addr.to_string(), "123");
        let err = PduAddress::try_from(&[0x0Bu8, 0x91, 0x64][..]).unwrap_err();
        assert_eq!(err, PduError::TruncatedField {
            field: "Address",
            offset: 2,
            needed: 6,
            remaining: 1
        });
    }
    #[test]
    fn unprintable_alphanumeric_flagged() {
        let addr = PduAddress {
            type_addr: AddressType::from(0xD0),
            number: PhoneNumber(vec![0x10, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x41])
        };
        match addr.check_printable() {
            Err(PduError::MalformedAddress(_)) => {},
            x => panic!("expected MalformedAddress, got {:?}", x)
        }
        let ok: PduAddress = "+46708251358".parse().unwrap();
        assert!(ok.check_printable().is_ok());
    }
    #[test]
    fn filler_is_not_a_digit() {
        let addr = PduAddress::decode(3, 0x81, &[0x21, 0xF3]);
        assert_eq!(addr.number.0, vec![1, 2, 3]);
    }
    #[test]
    fn inner_filler_nibble_is_kept() {
        let addr = PduAddress::decode(5, 0x81, &[0x21, 0x3F, 0xF4]);
        assert_eq!(addr.number.0, vec![1, 2, 0xF, 3, 4]);
        assert_eq!(addr.as_bytes(true), vec![0x05, 0x81, 0x21, 0x3F, 0xF4]);
    }
    #[test]
    fn checked_parse_limits_length() {
        let ok = PduAddress::parse_checked("+12345678901234567890", "Destination").unwrap();
        assert_eq!(ok.semi_octet_len(), 20);
        let long = "1".repeat(256);
        assert_eq!(PduAddress::parse_checked(&long, "Destination"), Err(PduError::AddressTooLong {
            field: "Destination",
            length: 256,
            limit: MAX_ADDRESS_DIGITS
        }));
        let err = PduAddress::parse_checked("ABCDEFGHIJKLM", "Originating").unwrap_err();
        assert_eq!(err, PduError::AddressTooLong { field: "Originating", length: 23, limit: 20 });
    }
}
