//! Page buffer requests: staging, checksumming and committing a page.

use tracing::{info, warn};

use super::Handler;
use crate::hal::HardwareInterface;
use crate::page_buffer::WriteOutcome;
use crate::protocol::codes::ResultCode;
use crate::protocol::msg::Message;

impl<H: HardwareInterface> Handler<H> {
    pub(super) fn handle_page_buffer_clear(&mut self) {
        self.page_buffer.clear();
        self.respond(ResultCode::Ok);
    }

    /// Read one word back from the staging buffer at a byte offset.
    pub(super) fn handle_page_buffer_read_word(&mut self, msg: &Message) {
        match self.page_buffer.read_word(msg.data_word()) {
            Some(word) => self.respond_with_data(ResultCode::Ok, word),
            None => self.respond(ResultCode::ErrInvalidArg),
        }
    }

    /// Append one word. The packet id guards against lost or duplicated
    /// frames; the accepted word is echoed back.
    pub(super) fn handle_page_buffer_write_word(&mut self, msg: &Message) {
        match self.page_buffer.write_word(msg.packet_id, &msg.data) {
            WriteOutcome::Accepted => self.respond_with_data(ResultCode::Ok, msg.data),
            WriteOutcome::Filled => self.respond_with_data(ResultCode::OkPageFull, msg.data),
            WriteOutcome::Overflow => {
                warn!("Page buffer overflow");
                self.respond(ResultCode::ErrPageFull);
            }
            WriteOutcome::SequenceMismatch { expected } => {
                warn!(got = msg.packet_id, expected, "Page buffer packet id mismatch");
                self.respond(ResultCode::Err);
            }
        }
    }

    pub(super) fn handle_page_buffer_calc_crc(&mut self) {
        let crc = self.hal.calculate_buffer_crc(self.page_buffer.as_bytes());
        self.respond_word(crc);
    }

    /// Commit the staged page: erase the target page, then program it
    /// with the buffer contents. The requested page index is echoed in
    /// every outcome.
    pub(super) fn handle_page_buffer_write_to_flash(&mut self, msg: &Message) {
        self.response.data = msg.data;
        let page_id = msg.data_word();
        if page_id >= self.geometry.num_pages() {
            warn!(page_id, "Page buffer commit beyond end of flash");
            self.respond(ResultCode::ErrInvalidArg);
            return;
        }
        info!(page_id, "Writing page buffer to flash");
        if !self.hal.erase_flash_page(page_id) {
            return;
        }
        let address = self.geometry.page_address(page_id);
        if !self
            .hal
            .write_buffer_to_flash(address, page_id, self.page_buffer.as_bytes())
        {
            return;
        }
        self.respond(ResultCode::Ok);
    }
}
