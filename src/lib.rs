//! The `sms-pdu-codec` library decodes and encodes SMS PDUs, as defined by 3GPP TS 23.040
//! (formerly GSM 03.40): the hex strings you get out of (and feed into) a modem's `AT+CMGL` and
//! `AT+CMGS` commands when it's in PDU mode.
//!
//! Decoding gives you more than the message: along with the addresses, timestamp and text, a
//! `DecodeReport` lists every field it found, and describes every octet of the PDU (what field it
//! belongs to, plus a display colour), so you can show people what a PDU is made of.
//!
//! ```rust,no_run
//! use sms_pdu_codec::{PduDecoder, PduType};
//!
//! let report = PduDecoder::new()
//!     .decode(PduType::Submit, "0011000B916407281553F80000AA0AE8329BFD4697D9EC37")
//!     .unwrap();
//! assert_eq!(report.message, "hellohello");
//! ```
//!
//! Encoding goes the other way, from an `EncodeRequest` to an `EncodeReport` containing the
//! PDU hex. Long messages can be split into concatenated parts with
//! `PduEncoder::encode_concatenated`.
//!
//! Only the GSM 7-bit default alphabet (with its extension table), 8-bit data, and UCS-2 are
//! supported, and only SMS-DELIVER and SMS-SUBMIT PDUs.

#[macro_use] extern crate log;
#[macro_use] extern crate failure_derive;
#[macro_use] extern crate derive_is_enum_variant;
#[macro_use] extern crate num_derive;
#[macro_use] extern crate lazy_static;

pub mod errors;
pub mod hex;
pub mod semi_octet;
pub mod address;
pub mod gsm_encoding;
pub mod timestamp;
pub mod pdu;
pub mod annotate;
pub mod report;
pub mod decode;
pub mod encode;

pub use crate::errors::{PduError, PduResult};
pub use crate::pdu::{Alphabet, Pdu, PduType};
pub use crate::address::PduAddress;
pub use crate::timestamp::SmscTimestamp;
pub use crate::decode::{DecodeOptions, PduDecoder};
pub use crate::encode::{EncodeRequest, PduEncoder};
pub use crate::report::{DecodeReport, EncodeReport, PduHeader};

/// Decode a PDU with the default options.
pub fn decode(pdu_type: PduType, hex: &str) -> PduResult<DecodeReport> {
    PduDecoder::new().decode(pdu_type, hex)
}
/// Encode a single PDU.
pub fn encode(req: &EncodeRequest) -> PduResult<EncodeReport> {
    PduEncoder::new().encode(req)
}
