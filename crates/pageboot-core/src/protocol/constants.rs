//! Protocol constants shared between device firmware and host tooling.
//!
//! These values are a versioned wire contract: changing any of them
//! breaks compatibility with deployed flashing clients.

// ============================================================================
// Framing
// ============================================================================

/// Size of one wire frame in bytes.
pub const FRAME_SIZE: usize = 8;

/// Size of the payload carried by every frame.
pub const DATA_SIZE: usize = 4;

/// Size of one flash word, the granularity of all buffered writes.
pub const WORD_SIZE: usize = 4;

// ============================================================================
// Bootloader Version
// ============================================================================

/// Bootloader version as `[major, minor, patch]`.
///
/// Returned by `Ping` and `DevInfoBootloaderVersion`, padded with one
/// zero byte to fill the 4-byte data field.
pub const BOOTLOADER_VERSION: [u8; 3] = [0, 1, 0];

// ============================================================================
// Sentinels
// ============================================================================

/// Start-app override word.
///
/// A `StartApp` request carrying this value in its data field skips the
/// CRC gate entirely. Operator recovery path: boots whatever is in the
/// app region.
pub const UNSAFE_START_WORD: u32 = 0xFFFF_FFFF;

/// Erased-flash byte value, also the initial fill of the staging buffer.
pub const ERASED_BYTE: u8 = 0xFF;
