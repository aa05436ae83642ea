//! PACE structures exchanged with a PIN pad (PC/SC part 10, amendment 1)

use bytes::{Buf, BufMut, Bytes, BytesMut};
use derive_more::Display;

use crate::apdu::StatusWord;
use crate::return_code::CardReturnCode;

/// Function index of EstablishPACEChannel
const FUNCTION_ESTABLISH_PACE_CHANNEL: u8 = 0x02;

/// Errors raised while encoding or decoding PACE structures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaceError {
    /// The output ended before the named field
    #[error("PACE output truncated at {0}")]
    Truncated(&'static str),

    /// A field exceeds the length its prefix can express
    #[error("PACE field {field} too long: {len} bytes")]
    FieldTooLong {
        /// Name of the field
        field: &'static str,
        /// Actual length
        len: usize,
    },
}

/// Password used to establish the PACE channel
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacePasswordId {
    /// Machine readable zone
    #[display("MRZ")]
    Mrz = 0x01,
    /// Card access number
    #[display("CAN")]
    Can = 0x02,
    /// eID PIN
    #[display("PIN")]
    Pin = 0x03,
    /// PIN unblocking key
    #[display("PUK")]
    Puk = 0x04,
}

/// Input of EstablishPACEChannel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstablishPaceChannel {
    password_id: PacePasswordId,
    chat: Bytes,
    certificate_description: Bytes,
}

impl EstablishPaceChannel {
    /// Create the input for `password_id`
    ///
    /// CHAT and certificate description may be empty when no terminal
    /// authentication follows.
    pub fn new(
        password_id: PacePasswordId,
        chat: impl Into<Bytes>,
        certificate_description: impl Into<Bytes>,
    ) -> Self {
        Self {
            password_id,
            chat: chat.into(),
            certificate_description: certificate_description.into(),
        }
    }

    /// Password used for PACE
    pub const fn password_id(&self) -> PacePasswordId {
        self.password_id
    }

    /// Encode the input data without the function header
    pub fn input_data(&self) -> Result<Bytes, PaceError> {
        let chat_len = u8::try_from(self.chat.len()).map_err(|_| PaceError::FieldTooLong {
            field: "CHAT",
            len: self.chat.len(),
        })?;
        let cert_len = u16::try_from(self.certificate_description.len()).map_err(|_| {
            PaceError::FieldTooLong {
                field: "CertificateDescription",
                len: self.certificate_description.len(),
            }
        })?;

        let mut buf = BytesMut::with_capacity(5 + self.chat.len() + self.certificate_description.len());
        buf.put_u8(self.password_id as u8);
        buf.put_u8(chat_len);
        buf.put_slice(&self.chat);
        // The PIN is always entered on the PIN pad
        buf.put_u8(0x00);
        buf.put_u16_le(cert_len);
        buf.put_slice(&self.certificate_description);
        Ok(buf.freeze())
    }

    /// Encode the complete CCID command including function index and length
    pub fn to_ccid(&self) -> Result<Bytes, PaceError> {
        let input = self.input_data()?;
        let len = u16::try_from(input.len()).map_err(|_| PaceError::FieldTooLong {
            field: "InputData",
            len: input.len(),
        })?;

        let mut buf = BytesMut::with_capacity(3 + input.len());
        buf.put_u8(FUNCTION_ESTABLISH_PACE_CHANNEL);
        buf.put_u16_le(len);
        buf.put_slice(&input);
        Ok(buf.freeze())
    }
}

/// Output of EstablishPACEChannel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EstablishPaceChannelOutput {
    /// Outcome derived from the PIN pad result
    pub return_code: CardReturnCode,
    /// Raw PIN pad result code
    pub pace_return_code: u32,
    /// Status word of MSE:Set AT
    pub status_mse_set_at: Option<StatusWord>,
    /// Content of EF.CardAccess
    pub ef_card_access: Bytes,
    /// Most recent certification authority reference
    pub car_curr: Bytes,
    /// Previous certification authority reference
    pub car_prev: Bytes,
    /// Ephemeral public key of the chip
    pub id_icc: Bytes,
}

impl EstablishPaceChannelOutput {
    /// Output carrying only a return code
    pub fn new(return_code: CardReturnCode) -> Self {
        Self {
            return_code,
            ..Self::default()
        }
    }

    /// Parse the CCID output structure
    pub fn from_ccid(data: &[u8], password_id: PacePasswordId) -> Result<Self, PaceError> {
        let mut buf = data;
        let pace_return_code = take_u32_le(&mut buf, "Result")?;
        let _output_len = take_u16_le(&mut buf, "OutputLength")?;

        let mut output = Self {
            return_code: map_result(pace_return_code, password_id),
            pace_return_code,
            ..Self::default()
        };
        if buf.is_empty() {
            // Failed establishments may leave out the output data
            return Ok(output);
        }

        let status = take(&mut buf, 2, "StatusMSESetAT")?;
        output.status_mse_set_at = Some(StatusWord::new(status[0], status[1]));
        let len = usize::from(take_u16_le(&mut buf, "EF.CardAccess")?);
        output.ef_card_access = take(&mut buf, len, "EF.CardAccess")?;
        let len = usize::from(take_u8(&mut buf, "CARcurr")?);
        output.car_curr = take(&mut buf, len, "CARcurr")?;
        let len = usize::from(take_u8(&mut buf, "CARprev")?);
        output.car_prev = take(&mut buf, len, "CARprev")?;
        let len = usize::from(take_u16_le(&mut buf, "IDicc")?);
        output.id_icc = take(&mut buf, len, "IDicc")?;
        Ok(output)
    }

    /// Encode the CCID output structure
    pub fn to_ccid(&self) -> Bytes {
        let mut body = BytesMut::new();
        let status = self.status_mse_set_at.unwrap_or(StatusWord::new(0x90, 0x00));
        body.put_slice(&[status.sw1, status.sw2]);
        body.put_u16_le(self.ef_card_access.len() as u16);
        body.put_slice(&self.ef_card_access);
        body.put_u8(self.car_curr.len() as u8);
        body.put_slice(&self.car_curr);
        body.put_u8(self.car_prev.len() as u8);
        body.put_slice(&self.car_prev);
        body.put_u16_le(self.id_icc.len() as u16);
        body.put_slice(&self.id_icc);

        let mut buf = BytesMut::with_capacity(6 + body.len());
        buf.put_u32_le(self.pace_return_code);
        buf.put_u16_le(body.len() as u16);
        buf.put_slice(&body);
        buf.freeze()
    }
}

fn take_u8(buf: &mut &[u8], field: &'static str) -> Result<u8, PaceError> {
    if buf.remaining() < 1 {
        return Err(PaceError::Truncated(field));
    }
    Ok(buf.get_u8())
}

fn take_u16_le(buf: &mut &[u8], field: &'static str) -> Result<u16, PaceError> {
    if buf.remaining() < 2 {
        return Err(PaceError::Truncated(field));
    }
    Ok(buf.get_u16_le())
}

fn take_u32_le(buf: &mut &[u8], field: &'static str) -> Result<u32, PaceError> {
    if buf.remaining() < 4 {
        return Err(PaceError::Truncated(field));
    }
    Ok(buf.get_u32_le())
}

fn take(buf: &mut &[u8], len: usize, field: &'static str) -> Result<Bytes, PaceError> {
    if buf.remaining() < len {
        return Err(PaceError::Truncated(field));
    }
    Ok(buf.copy_to_bytes(len))
}

/// Map the PIN pad result of EstablishPACEChannel to a card return code
fn map_result(code: u32, password_id: PacePasswordId) -> CardReturnCode {
    match code {
        0x0000_0000 => CardReturnCode::Ok,
        0xF010_0001 | 0xF010_0002 => CardReturnCode::CardNotFound,
        0xF020_0001 => CardReturnCode::CancellationByUser,
        0xF020_0002 => CardReturnCode::InputTimeOut,
        0xD000_0001..=0xD000_000F => CardReturnCode::CommandFailed,
        0xE000_0001..=0xE000_000F => CardReturnCode::ProtocolError,
        _ if (0xF000..=0xF003).contains(&(code >> 16)) => {
            map_status_word(StatusWord::from_u16(code as u16), password_id)
        }
        _ => CardReturnCode::CommandFailed,
    }
}

/// Map a status word returned during PACE to a card return code
fn map_status_word(status: StatusWord, password_id: PacePasswordId) -> CardReturnCode {
    match (status.retry_counter(), status.to_u16(), password_id) {
        (Some(2), _, PacePasswordId::Pin) => CardReturnCode::InvalidPin,
        (Some(1), _, PacePasswordId::Pin) => CardReturnCode::InvalidPin2,
        (Some(_), _, PacePasswordId::Pin) => CardReturnCode::InvalidPin3,
        (Some(_), _, PacePasswordId::Can) => CardReturnCode::InvalidCan,
        (Some(_), _, PacePasswordId::Puk) => CardReturnCode::InvalidPuk,
        (None, 0x6983, PacePasswordId::Pin) => CardReturnCode::PinBlocked,
        (None, 0x6983, PacePasswordId::Puk) => CardReturnCode::PukInoperative,
        _ => CardReturnCode::CommandFailed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_encoding() {
        let input = EstablishPaceChannel::new(PacePasswordId::Pin, Vec::new(), Vec::new());
        assert_eq!(input.input_data().unwrap().to_vec(), hex::decode("0300000000").unwrap());
        assert_eq!(input.to_ccid().unwrap().to_vec(), hex::decode("0205000300000000").unwrap());

        let input = EstablishPaceChannel::new(
            PacePasswordId::Can,
            hex::decode("7F4C0E").unwrap(),
            hex::decode("3082").unwrap(),
        );
        assert_eq!(
            input.input_data().unwrap().to_vec(),
            hex::decode("02037F4C0E0002003082").unwrap()
        );
    }

    #[test]
    fn test_oversized_chat() {
        let input = EstablishPaceChannel::new(PacePasswordId::Pin, vec![0u8; 256], Vec::new());
        assert_eq!(
            input.input_data(),
            Err(PaceError::FieldTooLong {
                field: "CHAT",
                len: 256
            })
        );
    }

    #[test]
    fn test_output_roundtrip_with_fields() {
        let output = EstablishPaceChannelOutput {
            return_code: CardReturnCode::Ok,
            pace_return_code: 0,
            status_mse_set_at: Some(StatusWord::new(0x90, 0x00)),
            ef_card_access: Bytes::from_static(&[0x31, 0x14]),
            car_curr: Bytes::from_static(b"DECVCAeID00102"),
            car_prev: Bytes::new(),
            id_icc: Bytes::from_static(&[0x04, 0x01, 0x02]),
        };
        let parsed = EstablishPaceChannelOutput::from_ccid(&output.to_ccid(), PacePasswordId::Pin).unwrap();
        assert_eq!(parsed, output);
    }

    #[test]
    fn test_failed_output_without_body() {
        let data = hex::decode("02000000").unwrap();
        assert_eq!(
            EstablishPaceChannelOutput::from_ccid(&data, PacePasswordId::Pin),
            Err(PaceError::Truncated("OutputLength"))
        );

        let data = hex::decode("010020F00000").unwrap();
        let output = EstablishPaceChannelOutput::from_ccid(&data, PacePasswordId::Pin).unwrap();
        assert_eq!(output.pace_return_code, 0xF020_0001);
        assert_eq!(output.return_code, CardReturnCode::CancellationByUser);
        assert_eq!(output.status_mse_set_at, None);
    }

    #[test]
    fn test_truncated_field() {
        // EF.CardAccess announces 4 bytes but carries 2
        let data = hex::decode("000000000500900004003100").unwrap();
        assert_eq!(
            EstablishPaceChannelOutput::from_ccid(&data, PacePasswordId::Pin),
            Err(PaceError::Truncated("EF.CardAccess"))
        );
    }

    #[test]
    fn test_result_mapping() {
        let cases = [
            (0xF002_63C2, PacePasswordId::Pin, CardReturnCode::InvalidPin),
            (0xF002_63C1, PacePasswordId::Pin, CardReturnCode::InvalidPin2),
            (0xF002_63C0, PacePasswordId::Pin, CardReturnCode::InvalidPin3),
            (0xF002_63C2, PacePasswordId::Can, CardReturnCode::InvalidCan),
            (0xF002_63C9, PacePasswordId::Puk, CardReturnCode::InvalidPuk),
            (0xF002_6983, PacePasswordId::Pin, CardReturnCode::PinBlocked),
            (0xF002_6983, PacePasswordId::Puk, CardReturnCode::PukInoperative),
            (0xF002_6983, PacePasswordId::Can, CardReturnCode::CommandFailed),
            (0xF010_0001, PacePasswordId::Pin, CardReturnCode::CardNotFound),
            (0xF020_0002, PacePasswordId::Pin, CardReturnCode::InputTimeOut),
            (0xE000_0002, PacePasswordId::Pin, CardReturnCode::ProtocolError),
            (0xD000_0001, PacePasswordId::Pin, CardReturnCode::CommandFailed),
            (0x1234_5678, PacePasswordId::Pin, CardReturnCode::CommandFailed),
        ];
        for (code, password_id, expected) in cases {
            assert_eq!(map_result(code, password_id), expected, "{code:08X} {password_id}");
        }
    }
}
