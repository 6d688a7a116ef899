//! Message framing - fixed 8-byte frames with little-endian fields.
//!
//! Wire layout:
//!
//! ```text
//! byte 0-1: request code (u16, LE)
//! byte 2:   result code (u8)
//! byte 3:   packet id (u8)
//! byte 4-7: data (4 raw bytes, semantics depend on the request)
//! ```
//!
//! The codec never validates code ranges: unknown request or result
//! values survive a decode/encode round-trip bit-for-bit.

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

use super::codes::{RequestCode, ResultCode};
use super::constants::{DATA_SIZE, FRAME_SIZE};

/// One raw frame as it travels over the transport.
pub type RawFrame = [u8; FRAME_SIZE];

/// The 4-byte payload of a frame.
pub type MsgData = [u8; DATA_SIZE];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("Frame too short: expected {expected} bytes, got {actual}")]
    FrameTooShort { expected: usize, actual: usize },
}

/// Structured form of one bootloader protocol message.
///
/// `request` and `result` are stored as raw wire integers so that
/// unrecognized codes pass through untouched; use [`Message::request_code`]
/// and [`Message::result_code`] for the decoded enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Message {
    pub request: u16,
    pub result: u8,
    pub packet_id: u8,
    pub data: MsgData,
}

impl Message {
    /// New request message with zeroed data, as a host would send it.
    pub fn new_request(request: RequestCode, packet_id: u8) -> Self {
        Self {
            request: request.to_wire(),
            result: ResultCode::None.to_wire(),
            packet_id,
            data: [0; DATA_SIZE],
        }
    }

    /// Decoded request code, `None` for unknown values.
    pub fn request_code(&self) -> Option<RequestCode> {
        RequestCode::from_wire(self.request)
    }

    /// Decoded result code, `None` for unknown values.
    pub fn result_code(&self) -> Option<ResultCode> {
        ResultCode::from_wire(self.result)
    }

    /// Interpret the data field as a little-endian u32.
    pub fn data_word(&self) -> u32 {
        data_to_u32(&self.data)
    }

    /// Store a u32 into the data field, little-endian.
    pub fn set_data_word(&mut self, value: u32) {
        self.data = u32_to_data(value);
    }

    /// Decode a message from an 8-byte frame.
    pub fn decode(frame: &RawFrame) -> Self {
        Self {
            request: LittleEndian::read_u16(&frame[0..2]),
            result: frame[2],
            packet_id: frame[3],
            data: [frame[4], frame[5], frame[6], frame[7]],
        }
    }

    /// Decode from an arbitrary byte slice, rejecting short input.
    pub fn decode_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < FRAME_SIZE {
            return Err(CodecError::FrameTooShort {
                expected: FRAME_SIZE,
                actual: bytes.len(),
            });
        }
        let mut frame = [0u8; FRAME_SIZE];
        frame.copy_from_slice(&bytes[..FRAME_SIZE]);
        Ok(Self::decode(&frame))
    }

    /// Encode into an 8-byte frame. Exact inverse of [`Message::decode`].
    pub fn encode(&self) -> RawFrame {
        let mut frame = [0u8; FRAME_SIZE];
        LittleEndian::write_u16(&mut frame[0..2], self.request);
        frame[2] = self.result;
        frame[3] = self.packet_id;
        frame[4..].copy_from_slice(&self.data);
        frame
    }
}

/// Pack a u32 into a 4-byte data field, little-endian.
pub fn u32_to_data(value: u32) -> MsgData {
    let mut data = [0u8; DATA_SIZE];
    LittleEndian::write_u32(&mut data, value);
    data
}

/// Unpack a little-endian u32 from a 4-byte data field.
pub fn data_to_u32(data: &MsgData) -> u32 {
    LittleEndian::read_u32(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u32_packing() {
        assert_eq!(u32_to_data(0xDEADBEEF), [0xEF, 0xBE, 0xAD, 0xDE]);
        assert_eq!(data_to_u32(&[0xEF, 0xBE, 0xAD, 0xDE]), 0xDEADBEEF);
    }

    #[test]
    fn encode_layout() {
        let mut msg = Message::new_request(RequestCode::AppInfoCrcCalc, 26);
        msg.result = ResultCode::ErrInvalidArg.to_wire();
        msg.data = [0x01, 0x02, 0x03, 0x04];

        let frame = msg.encode();
        assert_eq!(frame[0], 0x02);
        assert_eq!(frame[1], 0x03);
        assert_eq!(frame[2], 0xF9);
        assert_eq!(frame[3], 26);
        assert_eq!(&frame[4..], &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn roundtrip_message() {
        let mut msg = Message::new_request(RequestCode::FlashReadWord, 0x7F);
        msg.set_data_word(0x0800_0423);
        assert_eq!(Message::decode(&msg.encode()), msg);
    }

    #[test]
    fn roundtrip_unknown_codes() {
        // Values outside the defined tables must survive untouched.
        let msg = Message {
            request: 0xBEEF,
            result: 0x42,
            packet_id: 0xAA,
            data: [9, 8, 7, 6],
        };
        let frame = msg.encode();
        let back = Message::decode(&frame);
        assert_eq!(back, msg);
        assert_eq!(back.request_code(), None);
        assert_eq!(back.result_code(), None);
        assert_eq!(back.encode(), frame);
    }

    #[test]
    fn decode_slice_rejects_short_frames() {
        assert_eq!(
            Message::decode_slice(&[1, 2, 3]),
            Err(CodecError::FrameTooShort {
                expected: 8,
                actual: 3
            })
        );
    }
}
