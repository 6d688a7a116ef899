//! Protocol module - bootloader wire protocol definitions.

pub mod codes;
pub mod constants;
pub mod msg;

pub use codes::{RequestCode, ResultCode};
pub use constants::*;
pub use msg::{CodecError, Message, MsgData, RawFrame, data_to_u32, u32_to_data};
