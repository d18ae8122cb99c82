//! Decoding PDUs into a `DecodeReport`.
//!
//! The decoder walks the fixed field sequence of an SMS-DELIVER or SMS-SUBMIT:
//!
//! ```text
//! SMSC info, first octet,
//!   DELIVER: originating address       SUBMIT: message reference, destination address
//! protocol identifier, data coding scheme,
//!   DELIVER: service centre timestamp  SUBMIT: validity period (if TP-VPF says so)
//! user data length, [user data header], user data
//! ```
//!
//! Running out of data part-way through a field is fatal (`TruncatedField`). Oddities that
//! don't stop the rest of the PDU from making sense (a TP-MTI that doesn't match the requested
//! PDU type, an unsupported data coding scheme, an implausible address) are logged and recorded
//! as extra fields instead.
use std::convert::TryFrom;
use crate::errors::*;
use crate::hex::{hex_to_bytes, bytes_to_hex};
use crate::address::{PduAddress, TypeOfNumber, MAX_ADDRESS_DIGITS};
use crate::semi_octet;
use crate::annotate::{Color, Field, FieldCursor};
use crate::gsm_encoding::GsmMessageData;
use crate::gsm_encoding::udh::UdhParse;
use crate::pdu::*;
use crate::report::{DecodeReport, PduHeader};
use crate::timestamp::SmscTimestamp;

/// Shown in place of an address that decoded into garbage.
pub const MALFORMED_ADDRESS: &str = "[Parsing Error: Malformed Address]";

/// Decoder settings.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Fail with `MtiMismatch` if TP-MTI disagrees with the requested PDU type, rather than
    /// decoding it as the requested type anyway.
    pub strict_mti: bool
}
/// Names used for one of the two TP address fields.
struct AddressLabels {
    length: &'static str,
    toa: &'static str,
    number: &'static str,
    tooltip: &'static str,
    noun: &'static str,
    description: &'static str
}
const ORIGINATING: AddressLabels = AddressLabels {
    length: "Originating Address Length",
    toa: "Originating Address Type",
    number: "Originating Address",
    tooltip: "Sender",
    noun: "originating",
    description: "Sender phone number"
};
const DESTINATION: AddressLabels = AddressLabels {
    length: "Destination Address Length",
    toa: "Destination Address Type",
    number: "Destination Address",
    tooltip: "Destination",
    noun: "destination",
    description: "Recipient phone number"
};
const TIMESTAMP_PARTS: [&str; 7] = ["Year", "Month", "Day", "Hour", "Minute", "Second", "Timezone"];

fn flag(name: &str, set: bool, yes: &str, no: &str) -> Field {
    Field::new(name, if set { "1" } else { "0" }, if set { yes } else { no })
}
fn toa_description(toa: u8) -> String {
    let ton = crate::address::AddressType::from(toa).type_of_number;
    if ton == TypeOfNumber::Alphanumeric {
        "Type-of-Address: Alphanumeric sender".into()
    }
    else {
        format!("Type-of-Address: {} number", ton.description())
    }
}

/// Decodes SMS-DELIVER and SMS-SUBMIT PDUs.
#[derive(Debug, Copy, Clone, Default)]
pub struct PduDecoder {
    options: DecodeOptions
}
impl PduDecoder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_options(options: DecodeOptions) -> Self {
        PduDecoder { options }
    }
    /// Decode a PDU given as hex. Whitespace in `hex` is ignored.
    pub fn decode(&self, pdu_type: PduType, hex: &str) -> PduResult<DecodeReport> {
        let bytes = hex_to_bytes(hex)?;
        self.decode_bytes(pdu_type, &bytes)
    }
    /// Decode a PDU given as raw octets.
    pub fn decode_bytes(&self, pdu_type: PduType, bytes: &[u8]) -> PduResult<DecodeReport> {
        debug!("decoding {} octet(s) as {}", bytes.len(), pdu_type);
        let mut c = FieldCursor::new(bytes);
        let sca = self.read_smsc(&mut c)?;
        let fo_offset = c.offset();
        let first_octet = c.take_u8("First Octet")?;
        let type_upper = pdu_type.name().to_uppercase();
        c.annotate(1, Color::Secondary, "First Octet",
                   &format!("First Octet of {} ({:02X})", type_upper, first_octet));
        c.push_field(Field::new("First Octet", format!("{:02X}", first_octet),
                                format!("First octet of {}", type_upper))
                     .at(fo_offset, &[first_octet]));
        self.check_mti(&mut c, pdu_type, first_octet)?;

        let (kind_head, peer, peer_display) = match pdu_type {
            PduType::Deliver => {
                let fo = DeliverFirstOctet::from(first_octet);
                c.push_field(flag("TP-MMS", fo.mms, "No more messages to send", "More messages to send"));
                c.push_field(flag("TP-LP", fo.lp, "Loop prevention active", "No loop prevention"));
                c.push_field(flag("TP-SRI", fo.sri, "Status report requested", "Status report not requested"));
                c.push_field(flag("TP-UDHI", fo.udhi, "User Data Header included", "No User Data Header"));
                c.push_field(flag("TP-RP", fo.rp, "Reply path exists", "No reply path"));
                let (addr, display) = read_address(&mut c, &ORIGINATING)?;
                (KindHead::Deliver(fo), addr, display)
            },
            PduType::Submit => {
                let fo = SubmitFirstOctet::from(first_octet);
                c.push_field(flag("TP-RD", fo.rd, "Reject duplicates", "Allow duplicates"));
                c.push_field(Field::new("TP-VPF", ((fo.vpf as u8) >> 3).to_string(), fo.vpf.description()));
                c.push_field(flag("TP-SRR", fo.srr, "Status report requested", "Status report not requested"));
                c.push_field(flag("TP-UDHI", fo.udhi, "User Data Header included", "No User Data Header"));
                c.push_field(flag("TP-RP", fo.rp, "Reply path exists", "No reply path"));
                let offset = c.offset();
                let mr = c.take_u8("TP-Message-Reference")?;
                c.annotate(1, Color::Secondary, "Message Reference", &format!("Message Reference ({})", mr));
                c.push_field(Field::new("TP-Message-Reference", mr.to_string(), "Message reference number")
                             .at(offset, &[mr]));
                let (addr, display) = read_address(&mut c, &DESTINATION)?;
                (KindHead::Submit(fo, mr), addr, display)
            }
        };

        let offset = c.offset();
        let pid = c.take_u8("Protocol Identifier")?;
        let pid_desc = if pid == 0 { "Standard SMS" } else { "Protocol-specific message" };
        c.annotate(1, Color::Neutral, "Protocol Identifier",
                   &format!("Protocol Identifier ({:02X} = {})", pid, pid_desc));
        c.push_field(Field::new("Protocol Identifier", format!("{:02X}", pid), pid_desc).at(offset, &[pid]));

        let offset = c.offset();
        let dcs = DataCodingScheme(c.take_u8("Data Coding Scheme")?);
        c.annotate(1, Color::Neutral, "Data Coding Scheme",
                   &format!("Data Coding Scheme ({:02X} = {})", dcs.0, dcs.description()));
        c.push_field(Field::new("Data Coding Scheme", format!("{:02X}", dcs.0), dcs.description())
                     .at(offset, &[dcs.0]));
        let alphabet = match dcs.alphabet() {
            Ok(a) => a,
            Err(e) => {
                warn!("{}; treating user data as 8-bit", e);
                c.push_field(Field::new("Note", format!("{:02X}", dcs.0),
                                        "Unsupported data coding scheme: user data is shown as hex and its length counted in octets"));
                Alphabet::Binary8
            }
        };

        let kind = match kind_head {
            KindHead::Deliver(first_octet) => {
                let offset = c.offset();
                let raw = c.take(7, "Service Centre Timestamp")?;
                let scts = SmscTimestamp::try_from(raw)?;
                let tooltip = format!("Timestamp ({})", scts);
                for part in TIMESTAMP_PARTS.iter() {
                    c.annotate(1, Color::Accent, &format!("Timestamp: {}", part), &tooltip);
                }
                c.push_field(Field::new("Service Centre Timestamp", scts.to_string(),
                                        "Timestamp when the SMS was received by the SMSC")
                             .at(offset, raw));
                PduKind::Deliver { first_octet, originating_address: peer, scts }
            },
            KindHead::Submit(first_octet, message_reference) => {
                let validity_period = read_validity_period(&mut c, first_octet.vpf)?;
                PduKind::Submit { first_octet, message_reference, destination: peer, validity_period }
            }
        };
        let udhi = match kind {
            PduKind::Deliver { first_octet, .. } => first_octet.udhi,
            PduKind::Submit { first_octet, .. } => first_octet.udhi
        };

        let offset = c.offset();
        let udl = c.take_u8("User Data Length")?;
        let udl_text = format!("{} {}", udl, alphabet.length_unit());
        c.annotate(1, Color::Danger, "User Data Length", &format!("User Data Length ({})", udl_text));
        c.push_field(Field::new("User Data Length", udl.to_string(), format!("Length of the user data: {}", udl_text))
                     .at(offset, &[udl]));

        let ud_offset = c.offset();
        let user_data = c.take(GsmMessageData::octets_for(alphabet, udl), "User Data")?;
        let decoded = GsmMessageData::new(alphabet, udhi, user_data.to_vec(), udl).decode_message();
        let header_len = match decoded.udh {
            Some(ref parse) => annotate_udh(&mut c, parse, ud_offset, user_data),
            None => 0
        };
        let text_bytes = &user_data[header_len..];
        c.annotate(text_bytes.len(), Color::Danger, "User Data", &format!("User Data: {:?}", decoded.text));
        c.push_field(Field::new("User Data", decoded.text.clone(), "Message content")
                     .at(ud_offset + header_len, text_bytes));
        debug!("decoded {} text unit(s) from {} octet(s) of user data", decoded.text_units, user_data.len());

        if c.remaining() > 0 {
            warn!("{} octet(s) after the user data", c.remaining());
            c.push_field(Field::new("Trailing Data", bytes_to_hex(c.rest()),
                                    format!("{} octet(s) after the user data were not decoded", c.remaining()))
                         .at(c.offset(), c.rest()));
        }

        let pdu = Pdu {
            sca,
            kind,
            pid,
            dcs,
            user_data_len: udl,
            user_data: user_data.to_vec(),
            udh: decoded.udh.map(|p| p.header),
            text: decoded.text
        };
        let encoding = match dcs.alphabet() {
            Ok(a) => a.name(),
            Err(_) => "Unknown encoding"
        };
        let header = PduHeader::new(&pdu, peer_display, encoding);
        let (properties, structure_breakdown) = c.finish();
        Ok(DecodeReport {
            header,
            message: pdu.text.clone(),
            properties,
            structure_breakdown,
            pdu
        })
    }
    fn read_smsc(&self, c: &mut FieldCursor) -> PduResult<Option<PduAddress>> {
        let offset = c.offset();
        let len = c.take_u8("SMSC Length")?;
        c.annotate(1, Color::Primary, "SMSC Length", &format!("SMSC Information Length ({} octets)", len));
        if len == 0 {
            c.push_field(Field::new("SMSC Length", "0", "Use default SMSC").at(offset, &[len]));
            return Ok(None);
        }
        c.push_field(Field::new("SMSC Length", len.to_string(), "Length of the SMSC information in octets")
                     .at(offset, &[len]));
        let offset = c.offset();
        let toa = c.take_u8("SMSC Type-of-Address")?;
        c.annotate(1, Color::Primary, "SMSC Type-of-Address",
                   &format!("Type-of-Address ({:02X} = {})", toa, toa_description(toa)));
        c.push_field(Field::new("SMSC Type-of-Address", format!("{:02X}", toa), toa_description(toa))
                     .at(offset, &[toa]));
        let offset = c.offset();
        let data = c.take(len as usize - 1, "SMSC Number")?;
        let filler = data.last().map(|b| b >> 4 == semi_octet::FILLER).unwrap_or(false);
        let sca = PduAddress::decode(data.len() * 2 - filler as usize, toa, data);
        let number = sca.to_string();
        c.annotate(data.len(), Color::Primary, "SMSC Number", &format!("SMSC Number ({})", number));
        c.push_field(Field::new("SMSC Number", number, "SMSC phone number in semi-octet format")
                     .at(offset, data));
        Ok(Some(sca))
    }
    fn check_mti(&self, c: &mut FieldCursor, pdu_type: PduType, first_octet: u8) -> PduResult<()> {
        let mti = MessageType::from_first_octet(first_octet);
        let mut description = mti.description().to_string();
        if mti != pdu_type.message_type() {
            if self.options.strict_mti {
                Err(PduError::MtiMismatch { declared: pdu_type.name(), mti: mti as u8 })?
            }
            warn!("TP-MTI {} doesn't match {}; decoding as {} anyway", mti as u8, pdu_type, pdu_type);
            c.push_field(Field::new("Note", format!("TP-MTI {}", mti as u8),
                                    format!("TP-MTI indicates {}, but the PDU is decoded as {} as requested",
                                            mti.description(), pdu_type.name().to_uppercase())));
        }
        description.push_str(&format!(" (Using {} format for parsing)", pdu_type.name().to_uppercase()));
        c.push_field(Field::new("TP-MTI", (mti as u8).to_string(), description));
        Ok(())
    }
}
/// What the first octet (and message reference) said, before the rest of the PDU is read.
enum KindHead {
    Deliver(DeliverFirstOctet),
    Submit(SubmitFirstOctet, u8)
}
/// Read a TP address (length in semi-octets, Type-of-Address, digits). Returns the address, and
/// how it should be displayed.
fn read_address(c: &mut FieldCursor, labels: &AddressLabels) -> PduResult<(PduAddress, String)> {
    let offset = c.offset();
    let len = c.take_u8(labels.length)? as usize;
    c.annotate(1, Color::Secondary, labels.length,
               &format!("{} Address Length ({} digits)", labels.tooltip, len));
    c.push_field(Field::new(labels.length, len.to_string(),
                            format!("Length of the {} address: {} digits", labels.noun, len))
                 .at(offset, &[len as u8]));
    if len > MAX_ADDRESS_DIGITS {
        warn!("{} address claims {} digits", labels.noun, len);
        c.push_field(Field::new("Note", len.to_string(),
                                format!("Address length of {} semi-octets exceeds the usual maximum of {}; reading {} octets",
                                        len, MAX_ADDRESS_DIGITS, (len + 1) / 2)));
    }
    let offset = c.offset();
    let toa = c.take_u8(labels.toa)?;
    c.annotate(1, Color::Secondary, labels.toa,
               &format!("{} Type-of-Address ({:02X} = {})", labels.tooltip, toa, toa_description(toa)));
    c.push_field(Field::new(labels.toa, format!("{:02X}", toa), toa_description(toa)).at(offset, &[toa]));
    let offset = c.offset();
    let data = c.take((len + 1) / 2, labels.number)?;
    let addr = PduAddress::decode(len, toa, data);
    let display = match addr.check_printable() {
        Ok(()) => addr.to_string(),
        Err(e) => {
            warn!("{}", e);
            c.push_field(Field::new("Warning", MALFORMED_ADDRESS,
                                    format!("The {} address appears to be malformed or corrupted", labels.noun)));
            MALFORMED_ADDRESS.to_string()
        }
    };
    c.annotate(data.len(), Color::Secondary, labels.number,
               &format!("{} Number ({})", labels.tooltip, display));
    c.push_field(Field::new(labels.number, display.clone(), labels.description).at(offset, data));
    Ok((addr, display))
}
fn read_validity_period(c: &mut FieldCursor, vpf: VpFieldValidity) -> PduResult<Option<ValidityPeriod>> {
    let offset = c.offset();
    let vp = match vpf {
        VpFieldValidity::NotPresent => return Ok(None),
        VpFieldValidity::Relative => {
            let v = c.take_u8("Validity Period")?;
            ValidityPeriod::Relative(v)
        },
        VpFieldValidity::Absolute => {
            let raw = c.take(7, "Validity Period")?;
            ValidityPeriod::Absolute(SmscTimestamp::try_from(raw)?)
        },
        VpFieldValidity::Enhanced => {
            let raw = c.take(7, "Validity Period")?;
            let mut b = [0u8; 7];
            b.copy_from_slice(raw);
            ValidityPeriod::Enhanced(b)
        }
    };
    let raw = vp.as_bytes();
    let description = match vp {
        ValidityPeriod::Relative(_) => "Period during which the message is valid",
        ValidityPeriod::Absolute(_) => "Date and time when the message validity period expires",
        ValidityPeriod::Enhanced(_) => "Enhanced format validity period (not interpreted)"
    };
    c.annotate(raw.len(), Color::Accent, "Validity Period", &format!("Validity Period ({})", vp));
    c.push_field(Field::new("Validity Period", vp.to_string(), description).at(offset, &raw));
    Ok(Some(vp))
}
/// Annotate the user data header at the start of `user_data` (which starts at `ud_offset`),
/// returning how many octets of user data it covers.
fn annotate_udh(c: &mut FieldCursor, parse: &UdhParse, ud_offset: usize, user_data: &[u8]) -> usize {
    let udhl = user_data[0];
    c.annotate(1, Color::Info, "User Data Header Length",
               &format!("User Data Header Length ({} bytes)", udhl));
    c.push_field(Field::new("User Data Header Length", udhl.to_string(),
                            format!("Length of the user data header: {} bytes", udhl))
                 .at(ud_offset, &user_data[..1]));
    let mut pos = 1;
    for ie in parse.header.components.iter() {
        let len = ie.data.len();
        let name = ie.name();
        let description = ie.description();
        c.annotate(1, Color::Info, "IE Identifier",
                   &format!("Information Element ID: {:02X} ({})", ie.id, name));
        c.annotate(1, Color::Info, "IE Length", &format!("Information Element Length: {} bytes", len));
        c.annotate(len, Color::InfoLight, "IE Data", &format!("IE Data: {}", description));
        c.push_field(Field::new(name, description,
                                format!("Information Element ID: {:02X}, Length: {}", ie.id, len))
                     .at(ud_offset + pos, &user_data[pos..pos + 2 + len]));
        pos += 2 + len;
    }
    let covered = parse.declared_len.min(user_data.len());
    if covered > pos {
        let leftover = &user_data[pos..covered];
        c.annotate(leftover.len(), Color::Info, "UDH (unparsed)", "Malformed or truncated header data");
        c.push_field(Field::new("Warning", bytes_to_hex(leftover),
                                "User data header is malformed or truncated; these octets were not parsed")
                     .at(ud_offset + pos, leftover));
    }
    if let Some(m) = parse.header.multipart_info() {
        c.push_field(Field::new("Multipart Message", format!("Part {} of {}", m.part_number, m.total_parts),
                                format!("This message is part of a concatenated SMS with reference number {}",
                                        m.reference)));
    }
    covered
}
