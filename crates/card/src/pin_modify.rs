//! PIN modification through a PIN pad (PC/SC part 10, PIN_MODIFY)

use bytes::{BufMut, Bytes, BytesMut};

use crate::apdu::{CommandApdu, ResponseApdu};
use crate::return_code::CardReturnCode;

/// Length of the eID PIN
const PIN_LENGTH: u8 = 6;

/// PIN_MODIFY structure setting a new eID PIN
///
/// The PIN pad asks for the new PIN twice and sends RESET RETRY COUNTER
/// with the entered PIN to the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinModify {
    timeout_seconds: u8,
}

impl PinModify {
    /// Create the structure for a PIN pad entry bounded by `timeout_seconds`
    pub const fn new(timeout_seconds: u8) -> Self {
        Self { timeout_seconds }
    }

    /// Timeout of the PIN pad entry
    pub const fn timeout_seconds(&self) -> u8 {
        self.timeout_seconds
    }

    /// Command the PIN pad completes and sends to the card
    pub const fn command() -> CommandApdu {
        // RESET RETRY COUNTER, new PIN, eID PIN reference
        CommandApdu::new(0x00, 0x2C, 0x02, 0x03)
    }

    /// Encode the structure in CCID layout
    pub fn create_ccid(&self) -> Bytes {
        let command = [0x00, 0x2C, 0x02, 0x03];

        let mut buf = BytesMut::with_capacity(24 + command.len());
        // bTimeOut, bTimeOut2
        buf.put_u8(self.timeout_seconds);
        buf.put_u8(self.timeout_seconds);
        // bmFormatString: system unit bytes, left justified, ASCII
        buf.put_u8(0x82);
        // bmPINBlockString, bmPINLengthFormat
        buf.put_u8(0x00);
        buf.put_u8(0x00);
        // bInsertionOffsetOld, bInsertionOffsetNew
        buf.put_u8(0x00);
        buf.put_u8(0x00);
        // wPINMaxExtraDigit: minimum and maximum PIN length
        buf.put_u8(PIN_LENGTH);
        buf.put_u8(PIN_LENGTH);
        // bConfirmPIN: confirm the new PIN, no current PIN
        buf.put_u8(0x01);
        // bEntryValidationCondition: validation key pressed
        buf.put_u8(0x02);
        // bNumberMessage
        buf.put_u8(0x02);
        // wLangId: German
        buf.put_u16_le(0x0407);
        // bMsgIndex1, bMsgIndex2, bMsgIndex3
        buf.put_u8(0x01);
        buf.put_u8(0x02);
        buf.put_u8(0x00);
        // bTeoPrologue
        buf.put_slice(&[0x00, 0x00, 0x00]);
        // ulDataLength
        buf.put_u32_le(command.len() as u32);
        buf.put_slice(&command);
        buf.freeze()
    }
}

/// Response of the PIN pad to PIN_MODIFY
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinModifyOutput {
    response_apdu: ResponseApdu,
}

impl PinModifyOutput {
    /// Wrap the response of the PIN pad
    pub const fn new(response_apdu: ResponseApdu) -> Self {
        Self { response_apdu }
    }

    /// Response of the PIN pad
    pub const fn response_apdu(&self) -> &ResponseApdu {
        &self.response_apdu
    }

    /// Outcome reported by the status word of the PIN pad
    pub fn return_code(&self) -> CardReturnCode {
        let Some(status) = self.response_apdu.status_word() else {
            return CardReturnCode::CommandFailed;
        };
        match status.to_u16() {
            0x9000 => CardReturnCode::Ok,
            0x6400 => CardReturnCode::InputTimeOut,
            0x6401 => CardReturnCode::CancellationByUser,
            0x6402 => CardReturnCode::NewPinMismatch,
            0x6403 => CardReturnCode::NewPinInvalidLength,
            0x6983 => CardReturnCode::PinBlocked,
            _ => CardReturnCode::UnexpectedTransmitStatus,
        }
    }
}

impl From<ResponseApdu> for PinModifyOutput {
    fn from(response_apdu: ResponseApdu) -> Self {
        Self::new(response_apdu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ccid_layout() {
        let ccid = PinModify::new(77).create_ccid();
        assert_eq!(
            hex::encode_upper(&ccid),
            "4D4D82000000000606010202070401020000000004000000002C0203"
        );
        assert_eq!(
            &ccid[ccid.len() - 4..],
            &PinModify::command().to_bytes().unwrap()[..]
        );
    }

    #[test]
    fn test_output_return_codes() {
        let cases = [
            ("9000", CardReturnCode::Ok),
            ("6400", CardReturnCode::InputTimeOut),
            ("6401", CardReturnCode::CancellationByUser),
            ("6402", CardReturnCode::NewPinMismatch),
            ("6403", CardReturnCode::NewPinInvalidLength),
            ("6983", CardReturnCode::PinBlocked),
            ("6A80", CardReturnCode::UnexpectedTransmitStatus),
            ("", CardReturnCode::CommandFailed),
        ];
        for (raw, expected) in cases {
            let output = PinModifyOutput::from(ResponseApdu::new(hex::decode(raw).unwrap()));
            assert_eq!(output.return_code(), expected, "{raw}");
        }
    }
}
