//! Command and response APDUs exchanged with the card

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

/// Errors raised while building or parsing APDUs
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApduError {
    /// Fewer than the four header bytes were given
    #[error("Command APDU too short: {0} bytes")]
    TooShort(usize),

    /// The body does not match any ISO/IEC 7816-4 case
    #[error("Command APDU body is malformed")]
    MalformedBody,

    /// Command data exceeds the extended length limit
    #[error("Command data too long: {0} bytes")]
    DataTooLong(usize),
}

/// Status Word (SW1-SW2) trailing a response APDU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusWord {
    /// First status byte (SW1)
    pub sw1: u8,
    /// Second status byte (SW2)
    pub sw2: u8,
}

impl StatusWord {
    /// Create a new status word
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self { sw1, sw2 }
    }

    /// Create from a u16 value (SW1 | SW2)
    pub const fn from_u16(status: u16) -> Self {
        Self {
            sw1: (status >> 8) as u8,
            sw2: status as u8,
        }
    }

    /// Convert to a u16 value (SW1 | SW2)
    pub const fn to_u16(self) -> u16 {
        ((self.sw1 as u16) << 8) | (self.sw2 as u16)
    }

    /// Whether this is 90 00
    pub const fn is_success(self) -> bool {
        self.sw1 == 0x90 && self.sw2 == 0x00
    }

    /// Remaining retries announced by a 63 Cx warning
    pub const fn retry_counter(self) -> Option<u8> {
        if self.sw1 == 0x63 && (self.sw2 & 0xF0) == 0xC0 {
            Some(self.sw2 & 0x0F)
        } else {
            None
        }
    }

    /// Short description of the status word
    pub const fn description(self) -> &'static str {
        match (self.sw1, self.sw2) {
            (0x90, 0x00) => "Success",
            (0x61, _) => "More data available",
            (0x62, 0x82) => "End of file reached before reading Le bytes",
            (0x63, n) if (n & 0xF0) == 0xC0 => "Verification failed, counter value",
            (0x64, 0x00) => "Input timeout on the PIN pad",
            (0x64, 0x01) => "Input cancelled on the PIN pad",
            (0x64, 0x02) => "New PIN entries differ",
            (0x64, 0x03) => "New PIN has an invalid length",
            (0x67, 0x00) => "Wrong length",
            (0x69, 0x82) => "Security status not satisfied",
            (0x69, 0x83) => "Authentication method blocked",
            (0x69, 0x84) => "Referenced data invalidated",
            (0x69, 0x85) => "Conditions of use not satisfied",
            (0x6A, 0x80) => "Incorrect parameters in the data field",
            (0x6A, 0x82) => "File not found",
            (0x6A, 0x86) => "Incorrect parameters P1-P2",
            (0x6A, 0x88) => "Referenced data not found",
            (0x6D, 0x00) => "Instruction code not supported or invalid",
            (0x6E, 0x00) => "Class not supported",
            _ => "Unknown status word",
        }
    }
}

impl From<u16> for StatusWord {
    fn from(status: u16) -> Self {
        Self::from_u16(status)
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}", self.sw1, self.sw2)
    }
}

/// Command APDU as sent to the card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandApdu {
    cla: u8,
    ins: u8,
    p1: u8,
    p2: u8,
    data: Bytes,
    le: Option<usize>,
}

impl CommandApdu {
    /// Short length limit for Lc and Le
    pub const SHORT_MAX_LENGTH: usize = 0xFF;
    /// Extended length limit for Lc
    pub const EXTENDED_MAX_LENGTH: usize = 0xFFFF;

    /// Create a header-only command (case 1)
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Bytes::new(),
            le: None,
        }
    }

    /// Attach command data
    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }

    /// Set the expected response length; `0` means "as much as available"
    pub const fn with_le(mut self, le: usize) -> Self {
        self.le = Some(le);
        self
    }

    /// Class byte
    pub const fn cla(&self) -> u8 {
        self.cla
    }

    /// Instruction byte
    pub const fn ins(&self) -> u8 {
        self.ins
    }

    /// First parameter byte
    pub const fn p1(&self) -> u8 {
        self.p1
    }

    /// Second parameter byte
    pub const fn p2(&self) -> u8 {
        self.p2
    }

    /// Command data
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// Expected response length
    pub const fn le(&self) -> Option<usize> {
        self.le
    }

    fn is_extended(&self) -> bool {
        self.data.len() > Self::SHORT_MAX_LENGTH
            || self.le.is_some_and(|le| le > Self::SHORT_MAX_LENGTH + 1)
    }

    /// Encode the command
    pub fn to_bytes(&self) -> Result<Bytes, ApduError> {
        if self.data.len() > Self::EXTENDED_MAX_LENGTH {
            return Err(ApduError::DataTooLong(self.data.len()));
        }

        let extended = self.is_extended();
        let mut buf = BytesMut::with_capacity(4 + 3 + self.data.len() + 3);
        buf.put_slice(&[self.cla, self.ins, self.p1, self.p2]);

        if !self.data.is_empty() {
            if extended {
                buf.put_u8(0x00);
                buf.put_u16(self.data.len() as u16);
            } else {
                buf.put_u8(self.data.len() as u8);
            }
            buf.put_slice(&self.data);
        }

        if let Some(le) = self.le {
            if extended {
                if self.data.is_empty() {
                    buf.put_u8(0x00);
                }
                // 0x0000 stands for 65536
                buf.put_u16((le & 0xFFFF) as u16);
            } else {
                // 0x00 stands for 256
                buf.put_u8((le & 0xFF) as u8);
            }
        }

        Ok(buf.freeze())
    }

    /// Parse an encoded command
    pub fn from_bytes(raw: &[u8]) -> Result<Self, ApduError> {
        let [cla, ins, p1, p2, body @ ..] = raw else {
            return Err(ApduError::TooShort(raw.len()));
        };
        let command = Self::new(*cla, *ins, *p1, *p2);

        let le_value = |value: usize, max: usize| if value == 0 { max + 1 } else { value };

        match body {
            [] => Ok(command),
            [le] => Ok(command.with_le(le_value(*le as usize, Self::SHORT_MAX_LENGTH))),
            [0x00, hi, lo] => Ok(command.with_le(le_value(
                u16::from_be_bytes([*hi, *lo]) as usize,
                Self::EXTENDED_MAX_LENGTH,
            ))),
            [0x00, hi, lo, rest @ ..] if !rest.is_empty() => {
                let lc = u16::from_be_bytes([*hi, *lo]) as usize;
                match rest.len().checked_sub(lc) {
                    Some(0) => Ok(command.with_data(Bytes::copy_from_slice(rest))),
                    Some(2) => Ok(command
                        .with_data(Bytes::copy_from_slice(&rest[..lc]))
                        .with_le(le_value(
                            u16::from_be_bytes([rest[lc], rest[lc + 1]]) as usize,
                            Self::EXTENDED_MAX_LENGTH,
                        ))),
                    _ => Err(ApduError::MalformedBody),
                }
            }
            [lc, rest @ ..] => {
                let lc = *lc as usize;
                match rest.len().checked_sub(lc) {
                    Some(0) => Ok(command.with_data(Bytes::copy_from_slice(rest))),
                    Some(1) => Ok(command
                        .with_data(Bytes::copy_from_slice(&rest[..lc]))
                        .with_le(le_value(rest[lc] as usize, Self::SHORT_MAX_LENGTH))),
                    _ => Err(ApduError::MalformedBody),
                }
            }
        }
    }
}

impl fmt::Display for CommandApdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_bytes() {
            Ok(bytes) => f.write_str(&hex::encode_upper(bytes)),
            Err(err) => write!(f, "<{err}>"),
        }
    }
}

/// Response APDU as returned by the card
///
/// An empty response is valid and stands for "no response".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseApdu {
    raw: Bytes,
}

impl ResponseApdu {
    /// Wrap raw response bytes
    pub fn new(raw: impl Into<Bytes>) -> Self {
        Self { raw: raw.into() }
    }

    /// Whether no response was received
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Raw bytes including the status word
    pub const fn as_bytes(&self) -> &Bytes {
        &self.raw
    }

    /// Response data without the status word
    pub fn data(&self) -> &[u8] {
        match self.raw.len() {
            len if len >= 2 => &self.raw[..len - 2],
            _ => &[],
        }
    }

    /// Trailing status word, if the response is long enough to carry one
    pub fn status_word(&self) -> Option<StatusWord> {
        match self.raw.len() {
            len if len >= 2 => Some(StatusWord::new(self.raw[len - 2], self.raw[len - 1])),
            _ => None,
        }
    }
}

impl From<Bytes> for ResponseApdu {
    fn from(raw: Bytes) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for ResponseApdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(&self.raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_encodings() {
        let select = CommandApdu::new(0x00, 0xA4, 0x02, 0x0C).with_data(vec![0x01, 0x1C]);
        assert_eq!(select.to_bytes().unwrap().to_vec(), hex::decode("00A4020C02011C").unwrap());

        let read = CommandApdu::new(0x00, 0xB0, 0x00, 0x00).with_le(256);
        assert_eq!(read.to_bytes().unwrap().to_vec(), hex::decode("00B0000000").unwrap());

        let long = CommandApdu::new(0x00, 0x2A, 0x00, 0xBE).with_data(vec![0xAB; 300]).with_le(0);
        let bytes = long.to_bytes().unwrap();
        assert_eq!(&bytes[..7], &hex::decode("002A00BE00012C").unwrap()[..]);
        assert_eq!(bytes.len(), 4 + 3 + 300 + 2);
    }

    #[test]
    fn test_parse() {
        let parsed = CommandApdu::from_bytes(&hex::decode("00A4020C02011C").unwrap()).unwrap();
        assert_eq!(parsed.ins(), 0xA4);
        assert_eq!(&parsed.data()[..], &[0x01, 0x1C]);
        assert_eq!(parsed.le(), None);

        let parsed = CommandApdu::from_bytes(&hex::decode("0022C1A40F800A04007F00070202040202830103").unwrap()).unwrap();
        assert_eq!(parsed.data().len(), 0x0F);

        let parsed = CommandApdu::from_bytes(&hex::decode("00B0000000").unwrap()).unwrap();
        assert_eq!(parsed.le(), Some(256));

        assert_eq!(CommandApdu::from_bytes(&[0x00, 0xA4]), Err(ApduError::TooShort(2)));
        assert_eq!(
            CommandApdu::from_bytes(&hex::decode("00A4020C05011C").unwrap()),
            Err(ApduError::MalformedBody)
        );
    }

    #[test]
    fn test_response() {
        let response = ResponseApdu::new(hex::decode("0102039000").unwrap());
        assert_eq!(response.data(), &[0x01, 0x02, 0x03]);
        assert!(response.status_word().unwrap().is_success());
        assert_eq!(response.to_string(), "0102039000");

        let empty = ResponseApdu::default();
        assert!(empty.is_empty());
        assert_eq!(empty.status_word(), None);
        assert!(empty.data().is_empty());
    }

    #[test]
    fn test_status_word() {
        let sw = StatusWord::from_u16(0x63C2);
        assert_eq!(sw.retry_counter(), Some(2));
        assert_eq!(sw.to_string(), "63C2");
        assert_eq!(StatusWord::new(0x90, 0x00).retry_counter(), None);
        assert_eq!(StatusWord::from(0x6983).description(), "Authentication method blocked");
    }
}
