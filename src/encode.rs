//! Encoding messages into PDUs.
//!
//! An `EncodeRequest` says what to send; `PduEncoder::encode` turns it into a single PDU, and
//! `PduEncoder::encode_concatenated` into as many concatenated PDUs as it takes.
use bytes::{BufMut, BytesMut};
use crate::errors::*;
use crate::hex::bytes_to_hex;
use crate::address::PduAddress;
use crate::annotate::Field;
use crate::gsm_encoding::GsmMessageData;
use crate::gsm_encoding::udh::UserDataHeader;
use crate::pdu::*;
use crate::report::{EncodeReport, PduHeader};
use crate::timestamp::SmscTimestamp;

/// Map a validity period token (`12h`, `1d`, `3d`, `1w` or `max`) to its relative-format octet.
///
/// Unknown tokens give `0x00` (five minutes), with a warning.
pub fn validity_token(token: &str) -> u8 {
    match token.trim() {
        "12h" => 0x8F,
        "1d" => 0xA7,
        "3d" => 0xA9,
        "1w" => 0xAD,
        "max" => 0xFF,
        x => {
            warn!("unknown validity period {:?}, using 0x00", x);
            0x00
        }
    }
}

/// What to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeRequest {
    pub pdu_type: PduType,
    pub message: String,
    /// Destination address, for SMS-SUBMIT.
    pub recipient: String,
    /// Service centre address; `None` uses the phone's default.
    pub smsc: Option<String>,
    pub encoding: Alphabet,
    /// Sets TP-SRR (SMS-SUBMIT) or TP-SRI (SMS-DELIVER).
    pub status_report: bool,
    pub reply_path: bool,
    /// Relative validity period token (see `validity_token`); SMS-SUBMIT only.
    pub validity_period: Option<String>,
    /// Originating address; required for SMS-DELIVER.
    pub sender: Option<String>,
    /// Service centre timestamp; required for SMS-DELIVER.
    pub timestamp: Option<SmscTimestamp>,
    pub message_reference: u8,
    pub protocol_identifier: u8,
    /// User data header to put in front of the text.
    pub udh: Option<UserDataHeader>
}
impl EncodeRequest {
    /// An SMS-SUBMIT of `message` to `recipient`, GSM 7-bit, with nothing else set.
    pub fn submit(recipient: &str, message: &str) -> Self {
        EncodeRequest {
            pdu_type: PduType::Submit,
            message: message.into(),
            recipient: recipient.into(),
            smsc: None,
            encoding: Alphabet::Gsm7,
            status_report: false,
            reply_path: false,
            validity_period: None,
            sender: None,
            timestamp: None,
            message_reference: 0,
            protocol_identifier: 0,
            udh: None
        }
    }
    /// An SMS-DELIVER of `message` from `sender`, timestamped `timestamp`.
    pub fn deliver(sender: &str, timestamp: SmscTimestamp, message: &str) -> Self {
        EncodeRequest {
            pdu_type: PduType::Deliver,
            sender: Some(sender.into()),
            timestamp: Some(timestamp),
            ..Self::submit("", message)
        }
    }
}
/// Writes PDU octets, keeping a field list alongside.
struct FieldWriter {
    buf: BytesMut,
    fields: Vec<Field>
}
impl FieldWriter {
    fn new() -> Self {
        FieldWriter {
            buf: BytesMut::with_capacity(176),
            fields: vec![]
        }
    }
    fn put(&mut self, raw: &[u8], field: Field) {
        let offset = self.buf.len();
        self.buf.put_slice(raw);
        self.fields.push(field.at(offset, raw));
    }
    fn put_address(&mut self, addr: &PduAddress, names: [&str; 3], noun: &str, description: &str) {
        let bytes = addr.as_bytes(true);
        let len = bytes[0];
        let toa = bytes[1];
        self.put(&[len], Field::new(names[0], len.to_string(),
                                    format!("Length of the {} address: {} digits", noun, len)));
        self.put(&[toa], Field::new(names[1], format!("{:02X}", toa),
                                    format!("Type-of-Address: {}", addr.type_addr.type_of_number.description())));
        self.put(&bytes[2..], Field::new(names[2], addr.to_string(), description));
    }
}

/// Encodes SMS-DELIVER and SMS-SUBMIT PDUs.
#[derive(Debug, Copy, Clone, Default)]
pub struct PduEncoder;
impl PduEncoder {
    pub fn new() -> Self {
        PduEncoder
    }
    /// Encode `req` as a single PDU.
    ///
    /// Fails with `MessageTooLong` if it won't fit; use `encode_concatenated` for that.
    pub fn encode(&self, req: &EncodeRequest) -> PduResult<EncodeReport> {
        let data = GsmMessageData::encode_message(&req.message, req.encoding, req.udh.as_ref())?;
        self.encode_data(req, data, req.udh.clone(), req.message.clone())
    }
    /// Encode `req`, splitting it into concatenated parts if it's too long for one PDU. The
    /// 8-bit concatenation reference is `reference`, or random if that's `None`.
    ///
    /// Any `udh` in the request is ignored; concatenated parts carry their own.
    pub fn encode_concatenated(&self, req: &EncodeRequest, reference: Option<u8>) -> PduResult<Vec<EncodeReport>> {
        if req.udh.is_some() {
            warn!("ignoring user data header in a concatenated encode");
        }
        GsmMessageData::encode_concatenated(&req.message, req.encoding, reference)?
            .into_iter()
            .map(|data| {
                let decoded = data.decode_message();
                let udh = decoded.udh.map(|p| p.header);
                self.encode_data(req, data, udh, decoded.text)
            })
            .collect()
    }
    fn build_pdu(&self, req: &EncodeRequest, data: GsmMessageData, udh: Option<UserDataHeader>) -> PduResult<Pdu> {
        let sca = match req.smsc {
            Some(ref s) => Some(PduAddress::parse_checked(s, "SMSC")?),
            None => None
        };
        let kind = match req.pdu_type {
            PduType::Deliver => {
                let sender = req.sender.as_ref().ok_or(PduError::MissingParameter("sender"))?;
                let scts = req.timestamp.ok_or(PduError::MissingParameter("timestamp"))?;
                PduKind::Deliver {
                    first_octet: DeliverFirstOctet {
                        sri: req.status_report,
                        udhi: data.has_udh(),
                        rp: req.reply_path,
                        ..Default::default()
                    },
                    originating_address: PduAddress::parse_checked(sender, "Originating")?,
                    scts
                }
            },
            PduType::Submit => {
                let validity_period = req.validity_period.as_ref()
                    .map(|t| ValidityPeriod::Relative(validity_token(t)));
                PduKind::Submit {
                    first_octet: SubmitFirstOctet {
                        vpf: validity_period.map(|v| v.format()).unwrap_or(VpFieldValidity::NotPresent),
                        srr: req.status_report,
                        udhi: data.has_udh(),
                        rp: req.reply_path,
                        ..Default::default()
                    },
                    message_reference: req.message_reference,
                    destination: PduAddress::parse_checked(&req.recipient, "Destination")?,
                    validity_period
                }
            }
        };
        let text = data.decode_message().text;
        Ok(Pdu {
            sca,
            kind,
            pid: req.protocol_identifier,
            dcs: data.alphabet().dcs(),
            user_data_len: data.user_data_len(),
            user_data: data.as_bytes().to_vec(),
            udh,
            text
        })
    }
    fn encode_data(&self, req: &EncodeRequest, data: GsmMessageData, udh: Option<UserDataHeader>, message: String) -> PduResult<EncodeReport> {
        let alphabet = data.alphabet();
        let pdu = self.build_pdu(req, data, udh)?;
        let mut w = FieldWriter::new();
        match pdu.sca {
            Some(ref sca) => {
                let bytes = sca.as_bytes(false);
                w.put(&bytes[..1], Field::new("SMSC Length", bytes[0].to_string(),
                                              "Length of the SMSC information in octets"));
                w.put(&bytes[1..2], Field::new("SMSC Type-of-Address", format!("{:02X}", bytes[1]),
                                               format!("Type-of-Address: {}", sca.type_addr.type_of_number.description())));
                w.put(&bytes[2..], Field::new("SMSC Number", sca.to_string(), "SMSC phone number in semi-octet format"));
            },
            None => w.put(&[0], Field::new("SMSC Length", "0", "Use default SMSC"))
        }
        let first_octet = pdu.first_octet();
        let type_upper = pdu.pdu_type().name().to_uppercase();
        w.put(&[first_octet], Field::new("First Octet", format!("{:02X}", first_octet),
                                         format!("First octet of {}", type_upper)));
        match pdu.kind {
            PduKind::Deliver { ref originating_address, .. } => {
                w.put_address(originating_address,
                              ["Originating Address Length", "Originating Address Type", "Originating Address"],
                              "originating", "Sender phone number");
            },
            PduKind::Submit { message_reference, ref destination, .. } => {
                w.put(&[message_reference], Field::new("TP-Message-Reference", message_reference.to_string(),
                                                       format!("Message reference number ({})", message_reference)));
                w.put_address(destination,
                              ["Destination Address Length", "Destination Address Type", "Destination Address"],
                              "destination", "Recipient phone number");
            }
        }
        let pid_desc = if pdu.pid == 0 { "Standard SMS" } else { "Protocol-specific message" };
        w.put(&[pdu.pid], Field::new("Protocol Identifier", format!("{:02X}", pdu.pid), pid_desc));
        w.put(&[pdu.dcs.0], Field::new("Data Coding Scheme", format!("{:02X}", pdu.dcs.0), pdu.dcs.description()));
        match pdu.kind {
            PduKind::Deliver { ref scts, .. } => {
                w.put(&scts.as_bytes(), Field::new("Service Centre Timestamp", scts.to_string(),
                                                   "Timestamp when the SMS was received by the SMSC"));
            },
            PduKind::Submit { validity_period: Some(ref vp), .. } => {
                let token = req.validity_period.as_ref().map(|s| s.trim()).unwrap_or("");
                w.put(&vp.as_bytes(), Field::new("Validity Period", format!("{:02X}", vp.as_bytes()[0]),
                                                 format!("Validity period: {} ({})", token, vp)));
            },
            PduKind::Submit { validity_period: None, .. } => {}
        }
        w.put(&[pdu.user_data_len], Field::new("User Data Length", pdu.user_data_len.to_string(),
                                               format!("Length of the user data: {} {}",
                                                       pdu.user_data_len, alphabet.length_unit())));
        let mut text_start = 0;
        if let Some(ref udh) = pdu.udh {
            let header = udh.as_bytes();
            let summary = udh.components.iter()
                .map(|ie| format!("{}: {}", ie.name(), ie.description()))
                .collect::<Vec<_>>()
                .join("; ");
            w.put(&header, Field::new("User Data Header", bytes_to_hex(&header), summary));
            text_start = header.len();
        }
        w.put(&pdu.user_data[text_start..], Field::new("User Data", message.clone(), "Message content"));

        let (bytes, tpdu_length) = pdu.as_bytes();
        debug_assert_eq!(&bytes[..], &w.buf[..], "field writer and Pdu::as_bytes disagree");
        let pdu_string = bytes_to_hex(&w.buf);
        debug!("encoded {} ({} octets, TPDU {})", pdu.pdu_type(), w.buf.len(), tpdu_length);
        let peer = pdu.peer_address().to_string();
        let mut header = PduHeader::new(&pdu, peer, alphabet.name());
        if let Some(ref smsc) = req.smsc {
            header.smsc = smsc.clone();
        }
        Ok(EncodeReport {
            pdu_string,
            tpdu_length,
            header,
            message,
            breakdown: w.fields,
            pdu
        })
    }
}
#[cfg(test)]
mod test {
    use super::*;
    use crate::decode::PduDecoder;
    use crate::gsm_encoding::gsm_encode_string;
    use proptest::prelude::*;

    fn ts() -> SmscTimestamp {
        "2011-01-11 13:25:41".parse().unwrap()
    }

    #[test]
    fn submit_with_validity() {
        let mut req = EncodeRequest::submit("+46708251358", "hellohello");
        req.validity_period = Some("1d".into());
        let report = PduEncoder::new().encode(&req).unwrap();
        assert_eq!(report.pdu_string, "0011000B916407281553F80000A70AE8329BFD4697D9EC37");
        assert_eq!(report.tpdu_length, 23);
        assert_eq!(report.header.smsc, "Default SMSC");
        assert_eq!(report.header.recipient.as_ref().unwrap(), "+46708251358");
        assert_eq!(report.header.encoding, "GSM 7-bit");
        let vp = report.breakdown.iter().find(|f| f.name == "Validity Period").unwrap();
        assert_eq!(vp.value, "A7");
        assert_eq!(vp.description, "Validity period: 1d (1 day)");
    }
    #[test]
    fn validity_tokens() {
        assert_eq!(validity_token("12h"), 0x8F);
        assert_eq!(validity_token("1d"), 0xA7);
        assert_eq!(validity_token("3d"), 0xA9);
        assert_eq!(validity_token("1w"), 0xAD);
        assert_eq!(validity_token("max"), 0xFF);
        assert_eq!(validity_token("fortnight"), 0x00);
    }
    #[test]
    fn flags_and_smsc() {
        let mut req = EncodeRequest::submit("07700900123", "hi");
        req.smsc = Some("+447802000332".into());
        req.status_report = true;
        req.reply_path = true;
        let report = PduEncoder::new().encode(&req).unwrap();
        assert!(report.pdu_string.starts_with("0791448720003023A100"));
        assert_eq!(report.pdu.first_octet(), 0xA1);
        assert_eq!(report.header.smsc, "+447802000332");
        assert_eq!(report.tpdu_length, report.pdu_string.len() / 2 - 8);
    }
    #[test]
    fn euro_costs_two_septets() {
        assert_eq!(gsm_encode_string("€"), vec![0x1B, 0x65]);
        let report = PduEncoder::new().encode(&EncodeRequest::submit("+1234", "€5")).unwrap();
        assert_eq!(report.pdu.user_data_len, 3);
        let decoded = PduDecoder::new().decode(PduType::Submit, &report.pdu_string).unwrap();
        assert_eq!(decoded.message, "€5");
    }
    #[test]
    fn deliver_needs_sender_and_timestamp() {
        let mut req = EncodeRequest::deliver("diafaan", ts(), "diafaan.com");
        req.timestamp = None;
        assert_eq!(PduEncoder::new().encode(&req).unwrap_err(), PduError::MissingParameter("timestamp"));
        req.sender = None;
        assert_eq!(PduEncoder::new().encode(&req).unwrap_err(), PduError::MissingParameter("sender"));
    }
    #[test]
    fn overlong_addresses_are_refused() {
        let long = "1".repeat(256);
        let err = PduEncoder::new().encode(&EncodeRequest::submit(&long, "hi")).unwrap_err();
        assert_eq!(err, PduError::AddressTooLong { field: "Destination", length: 256, limit: 20 });
        let mut req = EncodeRequest::submit("+46708251358", "hi");
        req.smsc = Some("+".to_string() + &"4".repeat(21));
        assert_eq!(PduEncoder::new().encode(&req).unwrap_err(),
                   PduError::AddressTooLong { field: "SMSC", length: 21, limit: 20 });
        let req = EncodeRequest::deliver("a rather long sender name", ts(), "hi");
        match PduEncoder::new().encode(&req) {
            Err(PduError::AddressTooLong { field: "Originating", .. }) => {},
            x => panic!("expected AddressTooLong, got {:?}", x)
        }
        let report = PduEncoder::new().encode(&EncodeRequest::submit("+12345678901234567890", "hi")).unwrap();
        assert_eq!(&report.pdu_string[6..8], "14");
    }
    #[test]
    fn deliver_matches_known_pdu() {
        let mut req = EncodeRequest::deliver("diafaan", ts(), "diafaan.com");
        req.smsc = Some("+447802000332".into());
        let report = PduEncoder::new().encode(&req).unwrap();
        // The same as the well-known example, bar the first octet (no MMS/SRI bits set here).
        assert_eq!(report.pdu_string,
                   "0791448720003023000DD0E474D81C0EBB010000111011315214000BE474D81C0EBB5DE3771B");
        assert_eq!(report.header.sender.as_ref().unwrap(), "diafaan");
        assert_eq!(report.header.timestamp.as_ref().unwrap(), "2011-01-11 13:25:41 (+00:00)");
    }
    #[test]
    fn ucs2_and_8bit_lengths_are_octets() {
        let mut req = EncodeRequest::submit("+1234", "Привет");
        req.encoding = Alphabet::Ucs2;
        let report = PduEncoder::new().encode(&req).unwrap();
        assert_eq!(report.pdu.user_data_len, 12);
        req.encoding = Alphabet::Binary8;
        req.message = "café".into();
        let report = PduEncoder::new().encode(&req).unwrap();
        assert_eq!(report.pdu.user_data_len, 4);
        assert_eq!(report.pdu.user_data, vec![0x63, 0x61, 0x66, 0xE9]);
    }
    #[test]
    fn explicit_udh() {
        let mut req = EncodeRequest::submit("+46708251358", "Hello");
        req.udh = Some(UserDataHeader::concatenation(1, 2, 1));
        req.validity_period = Some("1d".into());
        let report = PduEncoder::new().encode(&req).unwrap();
        assert_eq!(report.pdu_string, "0051000B916407281553F80000A70C050003010201906536FB0D");
        assert!(report.header.multipart);
        let decoded = PduDecoder::new().decode(PduType::Submit, &report.pdu_string).unwrap();
        assert_eq!(decoded.message, "Hello");
        assert_eq!(decoded.pdu, report.pdu);
    }
    #[test]
    fn concatenated_parts() {
        let req = EncodeRequest::submit("+46708251358", &"abc".repeat(100));
        let parts = PduEncoder::new().encode_concatenated(&req, Some(7)).unwrap();
        assert_eq!(parts.len(), 2);
        let mut text = String::new();
        for (i, part) in parts.iter().enumerate() {
            let info = part.header.multipart_info.unwrap();
            assert_eq!((info.reference, info.total_parts, info.part_number), (7, 2, i as u8 + 1));
            let decoded = PduDecoder::new().decode(PduType::Submit, &part.pdu_string).unwrap();
            text.push_str(&decoded.message);
        }
        assert_eq!(text, "abc".repeat(100));
        assert!(PduEncoder::new().encode(&req).is_err());
    }
    #[test]
    fn breakdown_covers_every_octet() {
        let mut req = EncodeRequest::submit("+46708251358", "hellohello");
        req.smsc = Some("+447802000332".into());
        let report = PduEncoder::new().encode(&req).unwrap();
        let total: usize = report.breakdown.iter().filter_map(|f| f.length).sum();
        assert_eq!(total * 2, report.pdu_string.len());
    }
    proptest! {
        #[test]
        fn decode_inverts_encode(message in "[a-zA-Z0-9 .,!?@€\\[\\]]{0,70}",
                                 number in "\\+?[0-9]{1,15}",
                                 alphabet in prop_oneof![Just(Alphabet::Gsm7), Just(Alphabet::Ucs2)],
                                 deliver in any::<bool>(), status_report in any::<bool>(), reply_path in any::<bool>()) {
            let mut req = if deliver {
                EncodeRequest::deliver(&number, ts(), &message)
            }
            else {
                EncodeRequest::submit(&number, &message)
            };
            req.encoding = alphabet;
            req.status_report = status_report;
            req.reply_path = reply_path;
            let encoded = PduEncoder::new().encode(&req).unwrap();
            let decoded = PduDecoder::new().decode(encoded.pdu.pdu_type(), &encoded.pdu_string).unwrap();
            prop_assert_eq!(&decoded.pdu, &encoded.pdu);
            prop_assert_eq!(&decoded.message, &message);
            prop_assert_eq!(decoded.structure_breakdown.len(), encoded.pdu_string.len() / 2);
        }
    }
}
