//! The results of decoding and encoding, in a shape that serializes straight to JSON.
use serde::Serialize;
use crate::annotate::{AnnotatedByteStream, Field};
use crate::gsm_encoding::udh::MultipartInfo;
use crate::pdu::{Pdu, PduKind};

/// What goes in `PduHeader::smsc` when the PDU has no SMSC information.
pub const DEFAULT_SMSC: &str = "Default SMSC";

/// Summary of a PDU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PduHeader {
    /// `sms-deliver` or `sms-submit`.
    pub message_type: String,
    pub smsc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub encoding: String,
    pub multipart: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multipart_info: Option<MultipartInfo>
}
impl PduHeader {
    /// Summarize `pdu`. `peer` is how the sender or recipient should be shown, and `encoding`
    /// names the alphabet.
    pub fn new(pdu: &Pdu, peer: String, encoding: &str) -> Self {
        let (sender, recipient, timestamp) = match pdu.kind {
            PduKind::Deliver { ref scts, .. } => (Some(peer), None, Some(scts.to_string())),
            PduKind::Submit { .. } => (None, Some(peer), None)
        };
        let multipart_info = pdu.udh.as_ref().and_then(|u| u.multipart_info());
        PduHeader {
            message_type: pdu.pdu_type().name().into(),
            smsc: pdu.sca.as_ref()
                .map(|s| s.to_string())
                .unwrap_or_else(|| DEFAULT_SMSC.into()),
            sender,
            recipient,
            timestamp,
            encoding: encoding.into(),
            multipart: multipart_info.is_some(),
            multipart_info
        }
    }
}
/// Everything the decoder found out about a PDU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeReport {
    pub header: PduHeader,
    /// The message text (hex, for 8-bit data).
    pub message: String,
    pub properties: Vec<Field>,
    pub structure_breakdown: AnnotatedByteStream,
    #[serde(skip)]
    pub pdu: Pdu
}
/// An encoded PDU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeReport {
    /// The PDU, as upper-case hex.
    pub pdu_string: String,
    /// Length of the TPDU (everything after the SMSC information), as `AT+CMGS` wants it.
    pub tpdu_length: usize,
    pub header: PduHeader,
    pub message: String,
    pub breakdown: Vec<Field>,
    #[serde(skip)]
    pub pdu: Pdu
}
