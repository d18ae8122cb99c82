//! Field lists and per-octet annotations.
//!
//! The decoder reads a PDU through a `FieldCursor`, which hands out octets and records what each
//! one means. Every octet the cursor gives out must be annotated exactly once, in order, so the
//! four arrays of the resulting `AnnotatedByteStream` always line up with the consumed input.
use serde::Serialize;
use crate::errors::*;
use crate::hex::bytes_to_hex;

/// Display colour for a group of fields.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Color {
    /// SMSC information.
    Primary,
    /// First octet, message reference, addresses.
    Secondary,
    /// Protocol identifier and data coding scheme.
    Neutral,
    /// Timestamps and validity periods.
    Accent,
    /// User data length and content.
    Danger,
    /// User data header.
    Info,
    /// Information element data.
    InfoLight
}
/// One decoded (or encoded) field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub value: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_bytes: Option<String>
}
impl Field {
    pub fn new<N, V, D>(name: N, value: V, description: D) -> Self
        where N: Into<String>, V: Into<String>, D: Into<String> {
        Field {
            name: name.into(),
            value: value.into(),
            description: description.into(),
            offset: None,
            length: None,
            raw_bytes: None
        }
    }
    /// Attach the octets this field came from, and where they were.
    pub fn at(mut self, offset: usize, raw: &[u8]) -> Self {
        self.offset = Some(offset);
        self.length = Some(raw.len());
        self.raw_bytes = Some(bytes_to_hex(raw));
        self
    }
}
/// Parallel per-octet arrays: the octet itself (as hex), its colour, a short description, and a
/// longer tooltip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotatedByteStream {
    pub bytes: Vec<String>,
    pub colors: Vec<Color>,
    pub descriptions: Vec<String>,
    pub tooltips: Vec<String>
}
impl AnnotatedByteStream {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
    fn push(&mut self, byte: u8, color: Color, description: &str, tooltip: &str) {
        self.bytes.push(format!("{:02X}", byte));
        self.colors.push(color);
        self.descriptions.push(description.into());
        self.tooltips.push(tooltip.into());
    }
}
/// Reads octets off the front of a PDU, and collects fields and octet annotations as it goes.
pub struct FieldCursor<'a> {
    data: &'a [u8],
    offset: usize,
    annotated: usize,
    fields: Vec<Field>,
    stream: AnnotatedByteStream
}
impl<'a> FieldCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        FieldCursor {
            data,
            offset: 0,
            annotated: 0,
            fields: vec![],
            stream: AnnotatedByteStream::default()
        }
    }
    /// Offset of the next octet to be read.
    pub fn offset(&self) -> usize {
        self.offset
    }
    /// Octets left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }
    /// Everything that hasn't been read yet.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.offset..]
    }
    /// Read `len` octets, or fail with `TruncatedField` naming `field` if there aren't enough.
    ///
    /// The octets still need annotating with `annotate`.
    pub fn take(&mut self, len: usize, field: &'static str) -> PduResult<&'a [u8]> {
        if len > self.remaining() {
            Err(PduError::TruncatedField {
                field,
                offset: self.offset,
                needed: len,
                remaining: self.remaining()
            })?
        }
        let ret = &self.data[self.offset..self.offset + len];
        self.offset += len;
        trace!("read {} ({} octet(s)) at {}", field, len, self.offset - len);
        Ok(ret)
    }
    /// Read one octet.
    pub fn take_u8(&mut self, field: &'static str) -> PduResult<u8> {
        Ok(self.take(1, field)?[0])
    }
    /// Annotate the next `count` read-but-unannotated octets, all with the same text.
    pub fn annotate(&mut self, count: usize, color: Color, description: &str, tooltip: &str) {
        let end = (self.annotated + count).min(self.offset);
        debug_assert_eq!(end, self.annotated + count, "annotating octets that haven't been read");
        for &b in self.data[self.annotated..end].iter() {
            self.stream.push(b, color, description, tooltip);
        }
        self.annotated = end;
    }
    /// Read `len` octets and annotate them in one go.
    pub fn take_annotated(&mut self, len: usize, field: &'static str, color: Color, tooltip: &str) -> PduResult<&'a [u8]> {
        let ret = self.take(len, field)?;
        self.annotate(len, color, field, tooltip);
        Ok(ret)
    }
    pub fn push_field(&mut self, field: Field) {
        self.fields.push(field);
    }
    /// Finish up, returning the fields and the octet annotations.
    pub fn finish(mut self) -> (Vec<Field>, AnnotatedByteStream) {
        debug_assert_eq!(self.annotated, self.offset, "some octets were read but never annotated");
        if self.annotated < self.offset {
            let count = self.offset - self.annotated;
            self.annotate(count, Color::Neutral, "Unannotated", "");
        }
        (self.fields, self.stream)
    }
}
#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn take_and_annotate() {
        let data = [0x00, 0x11, 0x22, 0x33];
        let mut c = FieldCursor::new(&data);
        assert_eq!(c.take_u8("SMSC Length").unwrap(), 0x00);
        c.annotate(1, Color::Primary, "SMSC Length", "SMSC Information Length (0 octets)");
        let two = c.take_annotated(2, "Pair", Color::Neutral, "two octets").unwrap();
        assert_eq!(two, &[0x11, 0x22]);
        assert_eq!(c.remaining(), 1);
        assert_eq!(c.rest(), &[0x33]);
        let (fields, stream) = c.finish();
        assert!(fields.is_empty());
        assert_eq!(stream.len(), 3);
        assert_eq!(stream.bytes, vec!["00", "11", "22"]);
        assert_eq!(stream.colors[2], Color::Neutral);
        assert_eq!(stream.descriptions[1], "Pair");
    }
    #[test]
    fn short_read_is_truncation() {
        let data = [0x07, 0x91];
        let mut c = FieldCursor::new(&data);
        c.take(1, "SMSC Length").unwrap();
        let err = c.take(7, "SMSC Number").unwrap_err();
        assert_eq!(err, PduError::TruncatedField {
            field: "SMSC Number",
            offset: 1,
            needed: 7,
            remaining: 1
        });
        assert_eq!(c.offset(), 1);
    }
    #[test]
    fn field_serialization() {
        let f = Field::new("Protocol Identifier", "00", "Standard SMS").at(12, &[0x00]);
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["rawBytes"], "00");
        assert_eq!(json["offset"], 12);
        let bare = serde_json::to_value(&Field::new("TP-RP", "0", "No reply path")).unwrap();
        assert!(bare.get("offset").is_none());
        assert_eq!(serde_json::to_value(&Color::InfoLight).unwrap(), "info-light");
    }
}
