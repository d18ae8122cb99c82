//! Types for dealing with SMS PDUs (SMS-DELIVER and SMS-SUBMIT).
//!
//! Addresses live in the `address` module and timestamps in `timestamp`; this module has the
//! first octets, the data coding scheme, validity periods, and the `Pdu` type that ties them
//! together. A `Pdu` can be turned back into its octets with `Pdu::as_bytes`.
use std::fmt;
use std::str::FromStr;
use num_traits::FromPrimitive;
use crate::errors::*;
use crate::address::PduAddress;
use crate::timestamp::SmscTimestamp;
use crate::gsm_encoding::GsmMessageData;
use crate::gsm_encoding::udh::UserDataHeader;

/// Which of the two supported PDU layouts to use.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, is_enum_variant)]
pub enum PduType {
    /// SMS-DELIVER: service centre to mobile.
    Deliver,
    /// SMS-SUBMIT: mobile to service centre.
    Submit
}
impl PduType {
    /// The name used on the command line and in reports (`sms-deliver` or `sms-submit`).
    pub fn name(&self) -> &'static str {
        match *self {
            PduType::Deliver => "sms-deliver",
            PduType::Submit => "sms-submit"
        }
    }
    /// The TP-MTI value this PDU type is supposed to carry.
    pub fn message_type(&self) -> MessageType {
        match *self {
            PduType::Deliver => MessageType::SmsDeliver,
            PduType::Submit => MessageType::SmsSubmit
        }
    }
}
impl FromStr for PduType {
    type Err = PduError;
    fn from_str(s: &str) -> PduResult<Self> {
        match &s.trim().to_ascii_lowercase() as &str {
            "sms-deliver" | "deliver" => Ok(PduType::Deliver),
            "sms-submit" | "submit" => Ok(PduType::Submit),
            _ => Err(PduError::UnknownPduType(s.into()))
        }
    }
}
impl fmt::Display for PduType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
/// TP-MTI: the message type indicator in the low two bits of the first octet.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum MessageType {
    SmsDeliver = 0b000000_00,
    SmsSubmit = 0b000000_01,
    StatusReport = 0b000000_10,
    Reserved = 0b000000_11
}
impl MessageType {
    pub fn from_first_octet(b: u8) -> Self {
        // Two bits; all four values are variants.
        MessageType::from_u8(b & 0b000000_11)
            .unwrap_or(MessageType::Reserved)
    }
    pub fn description(&self) -> &'static str {
        match *self {
            MessageType::SmsDeliver => "SMS-DELIVER message",
            MessageType::SmsSubmit => "SMS-SUBMIT message",
            MessageType::StatusReport => "SMS-STATUS-REPORT message",
            MessageType::Reserved => "SMS-RESERVED message"
        }
    }
}
/// TP-VPF (bits 3 and 4): whether, and in what format, a validity period follows in an SMS-SUBMIT.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum VpFieldValidity {
    NotPresent = 0b000_00_000,
    Enhanced = 0b000_01_000,
    Relative = 0b000_10_000,
    Absolute = 0b000_11_000,
}
impl VpFieldValidity {
    /// Octets of validity period this format implies.
    pub fn octets(&self) -> usize {
        match *self {
            VpFieldValidity::NotPresent => 0,
            VpFieldValidity::Relative => 1,
            VpFieldValidity::Enhanced | VpFieldValidity::Absolute => 7
        }
    }
    pub fn description(&self) -> &'static str {
        match *self {
            VpFieldValidity::NotPresent => "No validity period specified",
            VpFieldValidity::Enhanced => "Validity period format: enhanced",
            VpFieldValidity::Relative => "Validity period format: relative",
            VpFieldValidity::Absolute => "Validity period format: absolute"
        }
    }
}
/// The first octet of an SMS-SUBMIT.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SubmitFirstOctet {
    pub mti: MessageType,
    /// Reject duplicates.
    pub rd: bool,
    pub vpf: VpFieldValidity,
    /// Status report requested.
    pub srr: bool,
    /// User data header present.
    pub udhi: bool,
    /// Reply path.
    pub rp: bool
}
impl Default for SubmitFirstOctet {
    fn default() -> Self {
        SubmitFirstOctet {
            mti: MessageType::SmsSubmit,
            rd: false,
            vpf: VpFieldValidity::NotPresent,
            srr: false,
            udhi: false,
            rp: false
        }
    }
}
impl From<u8> for SubmitFirstOctet {
    fn from(b: u8) -> Self {
        let rd = (b & 0b00000100) > 0;
        let srr = (b & 0b00100000) > 0;
        let udhi = (b & 0b01000000) > 0;
        let rp = (b & 0b10000000) > 0;
        let mti = MessageType::from_first_octet(b);
        let vpf = VpFieldValidity::from_u8(b & 0b000_11_000)
            .unwrap_or(VpFieldValidity::NotPresent);
        SubmitFirstOctet { rd, srr, udhi, rp, mti, vpf }
    }
}
impl Into<u8> for SubmitFirstOctet {
    fn into(self) -> u8 {
        let mut ret = 0b0000_0000;
        ret |= self.mti as u8;
        ret |= self.vpf as u8;
        if self.rd {
            ret |= 0b00000100;
        }
        if self.srr {
            ret |= 0b00100000;
        }
        if self.udhi {
            ret |= 0b01000000;
        }
        if self.rp {
            ret |= 0b10000000;
        }
        ret
    }
}
/// The first octet of an SMS-DELIVER.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DeliverFirstOctet {
    pub mti: MessageType,
    /// TP-MMS bit. Set means no more messages are waiting.
    pub mms: bool,
    /// Loop prevention.
    pub lp: bool,
    /// Status report indication.
    pub sri: bool,
    pub udhi: bool,
    pub rp: bool,
    /// Bit 4, which has no meaning in an SMS-DELIVER. Kept so the octet survives a round trip.
    pub spare: u8
}
impl Default for DeliverFirstOctet {
    fn default() -> Self {
        DeliverFirstOctet {
            mti: MessageType::SmsDeliver,
            mms: false,
            lp: false,
            sri: false,
            udhi: false,
            rp: false,
            spare: 0
        }
    }
}
impl From<u8> for DeliverFirstOctet {
    fn from(b: u8) -> Self {
        let mti = MessageType::from_first_octet(b);
        let mms = (b & 0b00000100) > 0;
        let lp = (b & 0b00001000) > 0;
        let sri = (b & 0b00100000) > 0;
        let udhi = (b & 0b01000000) > 0;
        let rp = (b & 0b10000000) > 0;
        let spare = b & 0b00010000;
        DeliverFirstOctet { mti, mms, lp, sri, udhi, rp, spare }
    }
}
impl Into<u8> for DeliverFirstOctet {
    fn into(self) -> u8 {
        let mut ret = self.mti as u8 | (self.spare & 0b00010000);
        if self.mms {
            ret |= 0b00000100;
        }
        if self.lp {
            ret |= 0b00001000;
        }
        if self.sri {
            ret |= 0b00100000;
        }
        if self.udhi {
            ret |= 0b01000000;
        }
        if self.rp {
            ret |= 0b10000000;
        }
        ret
    }
}
/// The text alphabet a message uses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, is_enum_variant)]
pub enum Alphabet {
    /// GSM 7-bit default alphabet (plus the extension table).
    Gsm7,
    /// 8-bit data.
    Binary8,
    /// UCS-2: two octets per character.
    Ucs2
}
impl Alphabet {
    /// The data coding scheme octet for this alphabet (no message class, uncompressed).
    pub fn dcs(&self) -> DataCodingScheme {
        DataCodingScheme(match *self {
            Alphabet::Gsm7 => 0x00,
            Alphabet::Binary8 => 0x04,
            Alphabet::Ucs2 => 0x08
        })
    }
    /// Name used in report headers.
    pub fn name(&self) -> &'static str {
        match *self {
            Alphabet::Gsm7 => "GSM 7-bit",
            Alphabet::Binary8 => "8-bit data",
            Alphabet::Ucs2 => "UCS2 (16-bit)"
        }
    }
    /// Short token, as accepted by `FromStr`.
    pub fn token(&self) -> &'static str {
        match *self {
            Alphabet::Gsm7 => "7bit",
            Alphabet::Binary8 => "8bit",
            Alphabet::Ucs2 => "ucs2"
        }
    }
    /// What the user data length counts, for this alphabet.
    pub fn length_unit(&self) -> &'static str {
        match *self {
            Alphabet::Gsm7 => "septets (7-bit)",
            Alphabet::Binary8 => "bytes (8-bit)",
            Alphabet::Ucs2 => "bytes (UCS2)"
        }
    }
}
impl FromStr for Alphabet {
    type Err = PduError;
    fn from_str(s: &str) -> PduResult<Self> {
        match &s.trim().to_ascii_lowercase() as &str {
            "7bit" | "gsm7" => Ok(Alphabet::Gsm7),
            "8bit" | "binary" => Ok(Alphabet::Binary8),
            "ucs2" | "16bit" => Ok(Alphabet::Ucs2),
            _ => Err(PduError::UnknownEncoding(s.into()))
        }
    }
}
/// TP-DCS, the data coding scheme octet.
///
/// Only the three plain alphabet values (`0x00`, `0x04`, `0x08`) are understood; anything else
/// yields `UnsupportedEncoding` from `alphabet()`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DataCodingScheme(pub u8);
impl DataCodingScheme {
    pub fn alphabet(&self) -> PduResult<Alphabet> {
        match self.0 {
            0x00 => Ok(Alphabet::Gsm7),
            0x04 => Ok(Alphabet::Binary8),
            0x08 => Ok(Alphabet::Ucs2),
            x => Err(PduError::UnsupportedEncoding(x))
        }
    }
    pub fn description(&self) -> &'static str {
        match self.alphabet() {
            Ok(Alphabet::Gsm7) => "7-bit default alphabet",
            Ok(Alphabet::Binary8) => "8-bit data",
            Ok(Alphabet::Ucs2) => "UCS2 (16-bit)",
            Err(_) => "Unknown encoding"
        }
    }
}
/// Describe a relative validity period octet in human terms.
///
/// 0-143 count 5-minute steps, 144-167 half-hours past 12 hours, 168-196 days, and 197-255
/// weeks.
pub fn describe_relative_validity(v: u8) -> String {
    let v = v as u32;
    let minutes = match v {
        0..=143 => (v + 1) * 5,
        144..=167 => 12 * 60 + (v - 143) * 30,
        168..=196 => (v - 166) * 24 * 60,
        _ => (v - 192) * 7 * 24 * 60
    };
    let week = 7 * 24 * 60;
    let day = 24 * 60;
    let plural = |n: u32, unit: &str| {
        if n == 1 { format!("1 {}", unit) } else { format!("{} {}s", n, unit) }
    };
    if minutes % week == 0 {
        plural(minutes / week, "week")
    }
    else if minutes % day == 0 {
        plural(minutes / day, "day")
    }
    else if minutes % 60 == 0 {
        plural(minutes / 60, "hour")
    }
    else if minutes > 60 {
        format!("{} {}", plural(minutes / 60, "hour"), plural(minutes % 60, "minute"))
    }
    else {
        plural(minutes, "minute")
    }
}
/// TP-VP, in whichever format TP-VPF selects.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValidityPeriod {
    Relative(u8),
    Absolute(SmscTimestamp),
    /// Enhanced format; kept as raw octets.
    Enhanced([u8; 7])
}
impl ValidityPeriod {
    pub fn format(&self) -> VpFieldValidity {
        match *self {
            ValidityPeriod::Relative(_) => VpFieldValidity::Relative,
            ValidityPeriod::Absolute(_) => VpFieldValidity::Absolute,
            ValidityPeriod::Enhanced(_) => VpFieldValidity::Enhanced
        }
    }
    pub fn as_bytes(&self) -> Vec<u8> {
        match *self {
            ValidityPeriod::Relative(v) => vec![v],
            ValidityPeriod::Absolute(ref ts) => ts.as_bytes().to_vec(),
            ValidityPeriod::Enhanced(ref b) => b.to_vec()
        }
    }
}
impl fmt::Display for ValidityPeriod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ValidityPeriod::Relative(v) => write!(f, "{}", describe_relative_validity(v)),
            ValidityPeriod::Absolute(ref ts) => write!(f, "{}", ts),
            ValidityPeriod::Enhanced(ref b) => write!(f, "{}", crate::hex::HexData(&b[..]))
        }
    }
}
/// The fields that differ between SMS-DELIVER and SMS-SUBMIT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PduKind {
    Deliver {
        first_octet: DeliverFirstOctet,
        originating_address: PduAddress,
        scts: SmscTimestamp
    },
    Submit {
        first_octet: SubmitFirstOctet,
        message_reference: u8,
        destination: PduAddress,
        validity_period: Option<ValidityPeriod>
    }
}
/// An SMS PDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdu {
    /// Service centre address; `None` means "use the default SMSC" (a zero length octet).
    pub sca: Option<PduAddress>,
    pub kind: PduKind,
    /// TP-PID.
    pub pid: u8,
    pub dcs: DataCodingScheme,
    /// TP-UDL, in septets for GSM 7-bit and octets otherwise.
    pub user_data_len: u8,
    /// TP-UD, including any user data header.
    pub user_data: Vec<u8>,
    /// The user data header, if TP-UDHI is set.
    pub udh: Option<UserDataHeader>,
    /// Decoded text (hex for 8-bit data).
    pub text: String
}
impl Pdu {
    pub fn pdu_type(&self) -> PduType {
        match self.kind {
            PduKind::Deliver { .. } => PduType::Deliver,
            PduKind::Submit { .. } => PduType::Submit
        }
    }
    /// The sender (SMS-DELIVER) or recipient (SMS-SUBMIT).
    pub fn peer_address(&self) -> &PduAddress {
        match self.kind {
            PduKind::Deliver { ref originating_address, .. } => originating_address,
            PduKind::Submit { ref destination, .. } => destination
        }
    }
    pub fn udhi(&self) -> bool {
        match self.kind {
            PduKind::Deliver { ref first_octet, .. } => first_octet.udhi,
            PduKind::Submit { ref first_octet, .. } => first_octet.udhi
        }
    }
    pub fn first_octet(&self) -> u8 {
        match self.kind {
            PduKind::Deliver { first_octet, .. } => first_octet.into(),
            PduKind::Submit { first_octet, .. } => first_octet.into()
        }
    }
    /// The user data, with its alphabet. An unsupported DCS is treated as 8-bit data.
    pub fn message_data(&self) -> GsmMessageData {
        let alphabet = self.dcs.alphabet().unwrap_or(Alphabet::Binary8);
        GsmMessageData::new(alphabet, self.udhi(), self.user_data.clone(), self.user_data_len)
    }
    /// Serialize this PDU. Also returns the TPDU length (everything after the SMSC information),
    /// which is what `AT+CMGS` and friends want.
    pub fn as_bytes(&self) -> (Vec<u8>, usize) {
        let mut ret = vec![];
        let mut scalen = 1;
        if let Some(ref sca) = self.sca {
            let sca = sca.as_bytes(false);
            scalen = sca.len();
            ret.extend(sca);
        }
        else {
            ret.push(0);
        }
        match self.kind {
            PduKind::Deliver { first_octet, ref originating_address, ref scts } => {
                ret.push(first_octet.into());
                ret.extend(originating_address.as_bytes(true));
                ret.push(self.pid);
                ret.push(self.dcs.0);
                ret.extend(scts.as_bytes().iter());
            },
            PduKind::Submit { first_octet, message_reference, ref destination, ref validity_period } => {
                ret.push(first_octet.into());
                ret.push(message_reference);
                ret.extend(destination.as_bytes(true));
                ret.push(self.pid);
                ret.push(self.dcs.0);
                if let Some(ref vp) = *validity_period {
                    ret.extend(vp.as_bytes());
                }
            }
        }
        ret.push(self.user_data_len);
        ret.extend(self.user_data.iter());
        let tpdu_len = ret.len() - scalen;
        (ret, tpdu_len)
    }
}
#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn submit_first_octet() {
        let fo = SubmitFirstOctet::from(0x51);
        assert_eq!(fo.mti, MessageType::SmsSubmit);
        assert_eq!(fo.vpf, VpFieldValidity::Relative);
        assert!(fo.udhi);
        assert!(!fo.rd && !fo.srr && !fo.rp);
        let b: u8 = fo.into();
        assert_eq!(b, 0x51);
        let b: u8 = SubmitFirstOctet::from(0xB1).into();
        assert_eq!(b, 0xB1);
    }
    #[test]
    fn validity_format_sits_in_bits_3_and_4() {
        assert_eq!(SubmitFirstOctet::from(0x01).vpf, VpFieldValidity::NotPresent);
        assert_eq!(SubmitFirstOctet::from(0x09).vpf, VpFieldValidity::Enhanced);
        assert_eq!(SubmitFirstOctet::from(0x11).vpf, VpFieldValidity::Relative);
        assert_eq!(SubmitFirstOctet::from(0x19).vpf, VpFieldValidity::Absolute);
        // TP-RD is bit 2, and doesn't disturb TP-VPF.
        let fo = SubmitFirstOctet::from(0x15);
        assert!(fo.rd);
        assert_eq!(fo.vpf, VpFieldValidity::Relative);
        let fo = SubmitFirstOctet::from(0x05);
        assert!(fo.rd);
        assert_eq!(fo.vpf, VpFieldValidity::NotPresent);
        let b: u8 = SubmitFirstOctet {
            vpf: VpFieldValidity::Relative,
            ..Default::default()
        }.into();
        assert_eq!(b, 0x11);
        let b: u8 = SubmitFirstOctet {
            rd: true,
            vpf: VpFieldValidity::Absolute,
            ..Default::default()
        }.into();
        assert_eq!(b, 0x1D);
    }
    #[test]
    fn deliver_first_octet() {
        let fo = DeliverFirstOctet::from(0xE4);
        assert_eq!(fo.mti, MessageType::SmsDeliver);
        assert!(fo.mms && fo.sri && fo.udhi && fo.rp);
        assert!(!fo.lp);
        let fo = DeliverFirstOctet::from(0x14);
        assert_eq!(fo.spare, 0x10);
        let b: u8 = fo.into();
        assert_eq!(b, 0x14);
        assert_eq!(DeliverFirstOctet::default().spare, 0);
    }
    #[test]
    fn mti_is_total() {
        assert_eq!(MessageType::from_first_octet(0xFF), MessageType::Reserved);
        assert_eq!(MessageType::from_first_octet(0x02), MessageType::StatusReport);
    }
    #[test]
    fn dcs_alphabets() {
        assert_eq!(DataCodingScheme(0x08).alphabet().unwrap(), Alphabet::Ucs2);
        assert_eq!(DataCodingScheme(0xF5).alphabet().unwrap_err(), PduError::UnsupportedEncoding(0xF5));
        assert_eq!(DataCodingScheme(0xF5).description(), "Unknown encoding");
        assert_eq!("UCS2".parse::<Alphabet>().unwrap(), Alphabet::Ucs2);
        assert!("utf8".parse::<Alphabet>().is_err());
        assert_eq!("sms-submit".parse::<PduType>().unwrap(), PduType::Submit);
        assert!(PduType::Submit.is_submit() && !PduType::Submit.is_deliver());
        assert!("sms-command".parse::<PduType>().is_err());
    }
    #[test]
    fn relative_validity() {
        assert_eq!(describe_relative_validity(0), "5 minutes");
        assert_eq!(describe_relative_validity(11), "1 hour");
        assert_eq!(describe_relative_validity(0x8F), "12 hours");
        assert_eq!(describe_relative_validity(144), "12 hours 30 minutes");
        assert_eq!(describe_relative_validity(0xA7), "1 day");
        assert_eq!(describe_relative_validity(0xA9), "3 days");
        assert_eq!(describe_relative_validity(0xAD), "1 week");
        assert_eq!(describe_relative_validity(0xFF), "63 weeks");
    }
    #[test]
    fn submit_serialization() {
        let pdu = Pdu {
            sca: None,
            kind: PduKind::Submit {
                first_octet: SubmitFirstOctet {
                    vpf: VpFieldValidity::Relative,
                    ..Default::default()
                },
                message_reference: 0,
                destination: "+46708251358".parse().unwrap(),
                validity_period: Some(ValidityPeriod::Relative(0xAA))
            },
            pid: 0,
            dcs: Alphabet::Gsm7.dcs(),
            user_data_len: 10,
            user_data: vec![0xE8, 0x32, 0x9B, 0xFD, 0x46, 0x97, 0xD9, 0xEC, 0x37],
            udh: None,
            text: "hellohello".into()
        };
        let (bytes, tpdu_len) = pdu.as_bytes();
        assert_eq!(crate::hex::bytes_to_hex(&bytes),
                   "0011000B916407281553F80000AA0AE8329BFD4697D9EC37");
        assert_eq!(tpdu_len, bytes.len() - 1);
        assert_eq!(pdu.first_octet(), 0x11);
        assert_eq!(pdu.message_data().decode_message().text, "hellohello");
    }
}
