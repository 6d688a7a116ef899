//! Request and result code tables.
//!
//! Codes are fixed numeric enumerations shared with host tooling.
//! Unknown values are never rejected by the codec; they pass through as
//! raw integers and are answered with `ResultCode::ErrUnknownReq` by
//! the handler.

use std::fmt;

/// Requests sent from host to device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum RequestCode {
    /* General requests */
    /// Ping device. Response carries the bootloader version.
    Ping = 0x0001,
    /// Hardware-reset the device (deferred).
    ResetDevice = 0x0011,
    /// Start the application and exit the bootloader (deferred).
    StartApp = 0x0012,

    /* Device information */
    /// Bootloader version.
    DevInfoBootloaderVersion = 0x0101,
    /// CRC over the bootloader flash region.
    DevInfoBootloaderCrc = 0x0102,
    /// Vendor id.
    DevInfoVid = 0x0103,
    /// Product id.
    DevInfoPid = 0x0104,
    /// Production date.
    DevInfoPrd = 0x0105,
    /// Unique id bits [0:31].
    DevInfoUid1 = 0x0106,
    /// Unique id bits [32:63].
    DevInfoUid2 = 0x0107,
    /// Unique id bits [64:95].
    DevInfoUid3 = 0x0108,
    /// Unique id bits [96:127].
    DevInfoUid4 = 0x0109,

    /* Flash information */
    /// Start address of the flash area.
    FlashInfoStartAddr = 0x0201,
    /// Size of one flash page in bytes.
    FlashInfoPageSize = 0x0202,
    /// Number of pages, bootloader area included.
    FlashInfoNumPages = 0x0203,

    /* App information */
    /// First page index of the app area.
    AppInfoPageIdx = 0x0301,
    /// CRC computed over the app flash region.
    AppInfoCrcCalc = 0x0302,
    /// CRC stored in the flash CRC slot.
    AppInfoCrcStrd = 0x0303,

    /* Flash read */
    /// Read one word from flash.
    FlashReadWord = 0x0401,

    /* Page buffer */
    /// Reset the staging buffer to erased state.
    PageBufferClear = 0x1001,
    /// Read one word from the staging buffer.
    PageBufferReadWord = 0x1002,
    /// Append one word to the staging buffer (packet-id sequenced).
    PageBufferWriteWord = 0x1003,
    /// CRC over the whole staging buffer.
    PageBufferCalcCrc = 0x1004,
    /// Erase a flash page and program the staging buffer into it.
    PageBufferWriteToFlash = 0x1005,

    /* Flash write */
    /// Erase one app-region flash page.
    FlashWriteErasePage = 0x1101,
    /// Store the app CRC in the flash CRC slot.
    FlashWriteAppCrc = 0x1102,
}

impl RequestCode {
    /// Decode a raw wire value. Unknown codes yield `None`.
    pub fn from_wire(value: u16) -> Option<Self> {
        Some(match value {
            0x0001 => Self::Ping,
            0x0011 => Self::ResetDevice,
            0x0012 => Self::StartApp,
            0x0101 => Self::DevInfoBootloaderVersion,
            0x0102 => Self::DevInfoBootloaderCrc,
            0x0103 => Self::DevInfoVid,
            0x0104 => Self::DevInfoPid,
            0x0105 => Self::DevInfoPrd,
            0x0106 => Self::DevInfoUid1,
            0x0107 => Self::DevInfoUid2,
            0x0108 => Self::DevInfoUid3,
            0x0109 => Self::DevInfoUid4,
            0x0201 => Self::FlashInfoStartAddr,
            0x0202 => Self::FlashInfoPageSize,
            0x0203 => Self::FlashInfoNumPages,
            0x0301 => Self::AppInfoPageIdx,
            0x0302 => Self::AppInfoCrcCalc,
            0x0303 => Self::AppInfoCrcStrd,
            0x0401 => Self::FlashReadWord,
            0x1001 => Self::PageBufferClear,
            0x1002 => Self::PageBufferReadWord,
            0x1003 => Self::PageBufferWriteWord,
            0x1004 => Self::PageBufferCalcCrc,
            0x1005 => Self::PageBufferWriteToFlash,
            0x1101 => Self::FlashWriteErasePage,
            0x1102 => Self::FlashWriteAppCrc,
            _ => return None,
        })
    }

    /// Raw wire value.
    pub fn to_wire(self) -> u16 {
        self as u16
    }
}

/// Result of a request, sent back in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResultCode {
    /// No result / not specified. Requests are sent with this value.
    None = 0x00,
    /// Request processed successfully.
    Ok = 0x01,
    /// Word accepted and the staging buffer is now exactly full.
    OkPageFull = 0x02,

    /// General error.
    Err = 0xFE,
    /// Unknown request code.
    ErrUnknownReq = 0xFD,
    /// Request known but not supported on this device.
    ErrNotSupported = 0xFC,
    /// CRC check failed.
    ErrCrcInvalid = 0xFB,
    /// Word rejected, the staging buffer is full.
    ErrPageFull = 0xFA,
    /// Invalid argument (address or index out of range).
    ErrInvalidArg = 0xF9,
}

impl ResultCode {
    /// Decode a raw wire value. Unknown codes yield `None`.
    pub fn from_wire(value: u8) -> Option<Self> {
        Some(match value {
            0x00 => Self::None,
            0x01 => Self::Ok,
            0x02 => Self::OkPageFull,
            0xFE => Self::Err,
            0xFD => Self::ErrUnknownReq,
            0xFC => Self::ErrNotSupported,
            0xFB => Self::ErrCrcInvalid,
            0xFA => Self::ErrPageFull,
            0xF9 => Self::ErrInvalidArg,
            _ => return None,
        })
    }

    /// Raw wire value.
    pub fn to_wire(self) -> u8 {
        self as u8
    }

    /// All success variants, including the exact-fill acknowledgment.
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok | Self::OkPageFull)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "NONE",
            Self::Ok => "OK",
            Self::OkPageFull => "OK_PAGE_FULL",
            Self::Err => "ERR",
            Self::ErrUnknownReq => "ERR_UNKNOWN_REQ",
            Self::ErrNotSupported => "ERR_NOT_SUPPORTED",
            Self::ErrCrcInvalid => "ERR_CRC_INVLD",
            Self::ErrPageFull => "ERR_PAGE_FULL",
            Self::ErrInvalidArg => "ERR_INVLD_ARG",
        };
        write!(f, "{name}")
    }
}
