//! Utilities for dealing with User Data Headers (used for concatenated SMS, among other things)
//! inside messages.
//!
//! [This Wikipedia article](https://en.wikipedia.org/wiki/User_Data_Header) explains what this is
//! for pretty well. Most uses of the UDH are vestigial; nowadays it's mostly useful for sending
//! concatenated SMS.
//!
//! On the wire, a UDH is a length octet (UDHL, counting the octets after itself) followed by a
//! sequence of information elements, each of which is an identifier octet, a length octet, and
//! that many octets of data.
use serde::Serialize;
use crate::hex::bytes_to_hex;

/// Information element identifiers this module knows something about.
pub mod iei {
    pub const CONCAT_8BIT: u8 = 0x00;
    pub const SPECIAL_SMS_INDICATION: u8 = 0x01;
    pub const PORT_8BIT: u8 = 0x04;
    pub const PORT_16BIT: u8 = 0x05;
    pub const SMSC_CONTROL: u8 = 0x06;
    pub const UDH_SOURCE: u8 = 0x07;
    pub const CONCAT_16BIT: u8 = 0x08;
    pub const WCMP: u8 = 0x09;
    pub const RFC822_HEADER: u8 = 0x20;
    pub const HYPERLINK: u8 = 0x21;
    pub const REPLY_ADDRESS: u8 = 0x22;
    pub const NATIONAL_SINGLE_SHIFT: u8 = 0x24;
    pub const NATIONAL_LOCKING_SHIFT: u8 = 0x25;
}

/// Component of a User Data Header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformationElement {
    /// Component identifier.
    pub id: u8,
    /// Component data.
    pub data: Vec<u8>
}
impl InformationElement {
    /// Human-readable name of this element's identifier.
    pub fn name(&self) -> String {
        let name = match self.id {
            iei::CONCAT_8BIT => "Concatenated SMS (8-bit reference)",
            iei::CONCAT_16BIT => "Concatenated SMS (16-bit reference)",
            iei::SPECIAL_SMS_INDICATION => "Special SMS Message Indication",
            iei::PORT_8BIT => "Application Port Addressing (8-bit)",
            iei::PORT_16BIT => "Application Port Addressing (16-bit)",
            iei::SMSC_CONTROL => "SMSC Control Parameters",
            iei::UDH_SOURCE => "UDH Source Indicator",
            iei::WCMP => "Wireless Control Message Protocol",
            iei::RFC822_HEADER => "RFC 822 E-Mail Header",
            iei::HYPERLINK => "Hyperlink Format Element",
            iei::REPLY_ADDRESS => "Reply Address Element",
            iei::NATIONAL_SINGLE_SHIFT => "National Language Single Shift",
            iei::NATIONAL_LOCKING_SHIFT => "National Language Locking Shift",
            x => return format!("Unknown IE ({:02X})", x)
        };
        name.into()
    }
    /// Human-readable description of this element's data.
    pub fn description(&self) -> String {
        let d = &self.data;
        match (self.id, d.len()) {
            (iei::CONCAT_8BIT, 3) | (iei::CONCAT_16BIT, 4) => {
                match self.multipart_info() {
                    Some(m) => format!("Reference: {}, Parts: {}, This Part: {}",
                                       m.reference, m.total_parts, m.part_number),
                    None => format!("Data: {}", bytes_to_hex(d))
                }
            },
            (iei::PORT_8BIT, 2) => {
                format!("Destination Port: {}, Source Port: {}", d[0], d[1])
            },
            (iei::PORT_16BIT, 4) => {
                let dest = u16::from_be_bytes([d[0], d[1]]);
                let src = u16::from_be_bytes([d[2], d[3]]);
                format!("Destination Port: {}, Source Port: {}", dest, src)
            },
            (iei::SPECIAL_SMS_INDICATION, 2) => {
                let kind = match d[0] & 0x0F {
                    0 => "Voicemail",
                    1 => "Fax",
                    2 => "Email",
                    3 => "Other",
                    _ => "Unknown"
                };
                let store = if d[0] & 0x80 != 0 { "Store" } else { "Discard" };
                format!("Type: {}, {}, Count: {}", kind, store, d[1])
            },
            (iei::NATIONAL_SINGLE_SHIFT, 1) | (iei::NATIONAL_LOCKING_SHIFT, 1) => {
                format!("Language Identifier: {}", d[0])
            },
            (iei::WCMP, _) => "WAP Push or other wireless protocol data".into(),
            _ => format!("Data: {}", bytes_to_hex(d))
        }
    }
    /// If this is a concatenation element, the concatenation data it carries.
    ///
    /// The reference is the leading `len - 2` octets, big-endian.
    pub fn multipart_info(&self) -> Option<MultipartInfo> {
        let valid = (self.id == iei::CONCAT_8BIT && self.data.len() == 3)
            || (self.id == iei::CONCAT_16BIT && self.data.len() == 4);
        if !valid {
            return None;
        }
        let n = self.data.len();
        let reference = self.data[..n - 2].iter()
            .fold(0u16, |acc, &b| (acc << 8) | b as u16);
        Some(MultipartInfo {
            reference,
            total_parts: self.data[n - 2],
            part_number: self.data[n - 1]
        })
    }
}
/// A User Data Header itself.
///
/// You'll likely just want to call `multipart_info` on this to check whether the
/// message is concatenated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDataHeader {
    pub components: Vec<InformationElement>
}
/// Data about a concatenated SMS.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipartInfo {
    /// Reference that identifies which message this is a part of - this is like an ID for the
    /// whole message.
    pub reference: u16,
    /// How many parts to the message exist (e.g. 2).
    pub total_parts: u8,
    /// Which part this is (e.g. 1 of 2).
    pub part_number: u8
}
/// Result of parsing a UDH from the front of some user data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UdhParse {
    /// The elements that could be parsed.
    pub header: UserDataHeader,
    /// Octets the header claims to occupy, including the UDHL octet itself.
    pub declared_len: usize,
    /// Octets actually covered by the UDHL octet and the parsed elements.
    pub parsed_len: usize
}
impl UdhParse {
    /// Whether the header ran out of data before all the declared octets were parsed.
    pub fn is_truncated(&self) -> bool {
        self.parsed_len < self.declared_len
    }
}
impl UserDataHeader {
    /// Make a header with a single 8-bit-reference concatenation element.
    pub fn concatenation(reference: u8, parts: u8, sequence: u8) -> Self {
        UserDataHeader {
            components: vec![InformationElement {
                id: iei::CONCAT_8BIT,
                data: vec![reference, parts, sequence]
            }]
        }
    }
    /// If there is concatenated SMS data in this header, return it.
    pub fn multipart_info(&self) -> Option<MultipartInfo> {
        self.components.iter()
            .filter_map(|c| c.multipart_info())
            .next()
    }
    /// Serialize this UDH to wire format (including the UDHL octet).
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut ret = vec![];
        for comp in self.components.iter() {
            ret.push(comp.id);
            ret.push(comp.data.len() as u8);
            ret.extend(comp.data.iter());
        }
        let len = ret.len() as u8;
        ret.insert(0, len);
        ret
    }
    /// Parse a UDH from the start of `b` (which starts with the UDHL octet).
    ///
    /// This never fails: if an element's header or data would run past the declared header
    /// length or the end of `b`, parsing just stops there.
    pub fn parse(b: &[u8]) -> UdhParse {
        let declared_len = b.first().map(|&l| l as usize + 1).unwrap_or(0);
        let end = declared_len.min(b.len());
        let mut offset = 1;
        let mut components = vec![];
        while offset < end {
            if offset + 1 >= end {
                warn!("UDH: element header at offset {} runs past header end {}", offset, end);
                break;
            }
            let id = b[offset];
            let len = b[offset + 1] as usize;
            let data_start = offset + 2;
            if data_start + len > end {
                warn!("UDH: element {:02X} wants {} octet(s), only {} remain", id, len, end - data_start);
                break;
            }
            components.push(InformationElement {
                id,
                data: b[data_start..data_start + len].to_owned()
            });
            offset = data_start + len;
        }
        UdhParse {
            header: UserDataHeader { components },
            declared_len,
            parsed_len: offset.min(end)
        }
    }
}
#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn concatenation_8bit() {
        let parse = UserDataHeader::parse(&[0x05, 0x00, 0x03, 0x01, 0x02, 0x01, 0xAA]);
        assert_eq!(parse.declared_len, 6);
        assert_eq!(parse.parsed_len, 6);
        assert!(!parse.is_truncated());
        let info = parse.header.multipart_info().unwrap();
        assert_eq!(info, MultipartInfo { reference: 1, total_parts: 2, part_number: 1 });
    }
    #[test]
    fn concatenation_16bit() {
        let parse = UserDataHeader::parse(&[0x06, 0x08, 0x04, 0x12, 0x34, 0x03, 0x02]);
        let info = parse.header.multipart_info().unwrap();
        assert_eq!(info, MultipartInfo { reference: 0x1234, total_parts: 3, part_number: 2 });
        assert_eq!(parse.header.components[0].name(), "Concatenated SMS (16-bit reference)");
    }
    #[test]
    fn port_addressing_and_unknown() {
        let parse = UserDataHeader::parse(&[0x0A, 0x05, 0x04, 0x0B, 0x84, 0x23, 0xF0, 0x70, 0x02, 0xBE, 0xEF]);
        let comps = &parse.header.components;
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0].description(), "Destination Port: 2948, Source Port: 9200");
        assert_eq!(comps[1].name(), "Unknown IE (70)");
        assert_eq!(comps[1].description(), "Data: BEEF");
        assert!(parse.header.multipart_info().is_none());
    }
    #[test]
    fn truncated_header_degrades() {
        // Declares 5 octets, but the element wants 3 data octets and only 2 exist.
        let parse = UserDataHeader::parse(&[0x05, 0x00, 0x03, 0x01, 0x02]);
        assert!(parse.header.components.is_empty());
        assert_eq!(parse.declared_len, 6);
        assert_eq!(parse.parsed_len, 1);
        assert!(parse.is_truncated());
    }
    #[test]
    fn serializes_with_length() {
        let udh = UserDataHeader::concatenation(7, 3, 1);
        assert_eq!(udh.as_bytes(), vec![0x05, 0x00, 0x03, 0x07, 0x03, 0x01]);
        assert_eq!(UserDataHeader::parse(&udh.as_bytes()).header, udh);
    }
    #[test]
    fn special_indication() {
        let ie = InformationElement { id: 0x01, data: vec![0x80, 0x03] };
        assert_eq!(ie.description(), "Type: Voicemail, Store, Count: 3");
    }
}
