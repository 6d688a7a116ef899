//! Page staging buffer - RAM mirror of one flash page.
//!
//! The buffer is filled one 4-byte word at a time by the host. Each
//! write carries a packet id that must match the low 8 bits of the
//! current word index, which catches duplicated or reordered frames on
//! transports without their own sequencing.

use crate::protocol::constants::{ERASED_BYTE, WORD_SIZE};
use crate::protocol::msg::MsgData;

/// Outcome of appending one word to the staging buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Word stored, more space remains.
    Accepted,
    /// Word stored and the buffer is now exactly full.
    Filled,
    /// Rejected: the buffer is already full.
    Overflow,
    /// Rejected: packet id does not match the write cursor.
    SequenceMismatch { expected: u8 },
}

/// In-memory mirror of one flash page plus a write cursor.
#[derive(Debug, Clone)]
pub struct PageBuffer {
    data: Vec<u8>,
    cursor: usize,
}

impl PageBuffer {
    /// New buffer in erased state (all 0xFF, cursor at 0).
    pub fn new(page_size: u32) -> Self {
        Self {
            data: vec![ERASED_BYTE; page_size as usize],
            cursor: 0,
        }
    }

    /// Reset to erased state. Idempotent.
    pub fn clear(&mut self) {
        self.data.fill(ERASED_BYTE);
        self.cursor = 0;
    }

    /// Byte offset of the next write.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Packet id the next write must carry: low 8 bits of the word index.
    pub fn expected_packet_id(&self) -> u8 {
        ((self.cursor / WORD_SIZE) & 0xFF) as u8
    }

    pub fn is_full(&self) -> bool {
        self.cursor == self.data.len()
    }

    /// Append one word at the cursor, guarded by the packet id check.
    /// The cursor only advances when the word is stored.
    pub fn write_word(&mut self, packet_id: u8, word: &MsgData) -> WriteOutcome {
        if self.cursor + WORD_SIZE > self.data.len() {
            return WriteOutcome::Overflow;
        }
        let expected = self.expected_packet_id();
        if packet_id != expected {
            return WriteOutcome::SequenceMismatch { expected };
        }
        self.data[self.cursor..self.cursor + WORD_SIZE].copy_from_slice(word);
        self.cursor += WORD_SIZE;
        if self.is_full() {
            WriteOutcome::Filled
        } else {
            WriteOutcome::Accepted
        }
    }

    /// Read one word at an arbitrary byte offset. `None` when the word
    /// does not fit inside the page.
    pub fn read_word(&self, byte_offset: u32) -> Option<MsgData> {
        let offset = byte_offset as usize;
        let end = offset.checked_add(WORD_SIZE)?;
        if end > self.data.len() {
            return None;
        }
        let mut word = [0u8; WORD_SIZE];
        word.copy_from_slice(&self.data[offset..end]);
        Some(word)
    }

    pub fn byte(&self, idx: usize) -> u8 {
        self.data[idx]
    }

    /// Whole page contents, for committing to flash or checksumming.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Replace the whole page contents without touching the cursor.
    /// Used when a flash page is loaded for read-modify-write.
    pub fn load(&mut self, bytes: &[u8]) {
        debug_assert_eq!(bytes.len(), self.data.len());
        self.data.copy_from_slice(bytes);
    }

    /// Overwrite the final word of the page.
    pub fn patch_trailing_word(&mut self, word: &MsgData) {
        let start = self.data.len() - WORD_SIZE;
        self.data[start..].copy_from_slice(word);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_SIZE: u32 = 1024;

    #[test]
    fn starts_erased() {
        let buf = PageBuffer::new(PAGE_SIZE);
        assert!(buf.as_bytes().iter().all(|&b| b == 0xFF));
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn sequenced_fill_is_byte_exact() {
        let mut buf = PageBuffer::new(PAGE_SIZE);
        let src: Vec<u8> = (0..PAGE_SIZE).map(|i| (i % 251) as u8).collect();

        for word_idx in 0..(PAGE_SIZE as usize / 4) {
            let mut word = [0u8; 4];
            word.copy_from_slice(&src[word_idx * 4..word_idx * 4 + 4]);
            let outcome = buf.write_word((word_idx & 0xFF) as u8, &word);
            if word_idx == PAGE_SIZE as usize / 4 - 1 {
                assert_eq!(outcome, WriteOutcome::Filled);
            } else {
                assert_eq!(outcome, WriteOutcome::Accepted);
            }
        }
        assert_eq!(buf.as_bytes(), &src[..]);
    }

    #[test]
    fn wrong_packet_id_does_not_advance() {
        let mut buf = PageBuffer::new(PAGE_SIZE);
        assert_eq!(
            buf.write_word(1, &[1, 2, 3, 4]),
            WriteOutcome::SequenceMismatch { expected: 0 }
        );
        assert_eq!(buf.cursor(), 0);
        assert_eq!(buf.write_word(0, &[1, 2, 3, 4]), WriteOutcome::Accepted);
        assert_eq!(buf.cursor(), 4);
        // Duplicate of packet 0 is also rejected.
        assert_eq!(
            buf.write_word(0, &[1, 2, 3, 4]),
            WriteOutcome::SequenceMismatch { expected: 1 }
        );
        assert_eq!(buf.cursor(), 4);
    }

    #[test]
    fn packet_id_wraps_every_256_words() {
        // 2048-byte page has 512 words, so ids wrap once.
        let mut buf = PageBuffer::new(2048);
        for word_idx in 0..512usize {
            let outcome = buf.write_word((word_idx & 0xFF) as u8, &[0; 4]);
            assert_ne!(
                outcome,
                WriteOutcome::SequenceMismatch {
                    expected: (word_idx & 0xFF) as u8
                }
            );
        }
        assert!(buf.is_full());
    }

    #[test]
    fn overflow_leaves_buffer_unchanged() {
        let mut buf = PageBuffer::new(8);
        assert_eq!(buf.write_word(0, &[1; 4]), WriteOutcome::Accepted);
        assert_eq!(buf.write_word(1, &[2; 4]), WriteOutcome::Filled);
        assert_eq!(buf.write_word(2, &[3; 4]), WriteOutcome::Overflow);
        assert_eq!(buf.as_bytes(), &[1, 1, 1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut buf = PageBuffer::new(PAGE_SIZE);
        buf.write_word(0, &[0xBE; 4]);
        buf.clear();
        buf.clear();
        assert!(buf.as_bytes().iter().all(|&b| b == 0xFF));
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn read_word_bounds() {
        let buf = PageBuffer::new(PAGE_SIZE);
        assert!(buf.read_word(0).is_some());
        assert!(buf.read_word(PAGE_SIZE - 4).is_some());
        assert!(buf.read_word(PAGE_SIZE - 3).is_none());
        assert!(buf.read_word(u32::MAX).is_none());
    }

    #[test]
    fn patch_trailing_word() {
        let mut buf = PageBuffer::new(16);
        buf.load(&[0xAA; 16]);
        buf.patch_trailing_word(&[1, 2, 3, 4]);
        assert_eq!(&buf.as_bytes()[..12], &[0xAA; 12]);
        assert_eq!(&buf.as_bytes()[12..], &[1, 2, 3, 4]);
    }
}
