//! Direct flash requests: word read, page erase, CRC slot update.

use tracing::{info, warn};

use super::Handler;
use crate::hal::HardwareInterface;
use crate::protocol::codes::ResultCode;
use crate::protocol::constants::WORD_SIZE;
use crate::protocol::msg::Message;

impl<H: HardwareInterface> Handler<H> {
    /// Read one 4-byte word from an absolute flash address.
    pub(super) fn handle_flash_read_word(&mut self, msg: &Message) {
        let address = msg.data_word();
        if !self.geometry.contains_range(address, WORD_SIZE as u32) {
            warn!(address = format_args!("{address:#010X}"), "Read outside flash");
            self.respond(ResultCode::ErrInvalidArg);
            return;
        }
        let word = self.read_flash_word(address);
        self.respond_word(word);
    }

    /// Erase one page of the app region. Bootloader pages and pages
    /// beyond the end of flash are rejected before any hardware call.
    pub(super) fn handle_flash_erase_page(&mut self, msg: &Message) {
        let page_id = msg.data_word();
        if page_id < self.geometry.app_first_page() || page_id >= self.geometry.num_pages() {
            warn!(page_id, "Erase of page outside app region");
            self.respond(ResultCode::ErrInvalidArg);
            return;
        }
        info!(page_id, "Erasing flash page");
        if !self.hal.erase_flash_page(page_id) {
            self.respond(ResultCode::Err);
            return;
        }
        self.respond(ResultCode::Ok);
    }

    /// Store the application CRC into the slot at the end of flash.
    ///
    /// The last page is loaded into the staging buffer, the trailing
    /// word patched and the page erased and reprogrammed, so the rest
    /// of the page survives. Clobbers any host-staged buffer content.
    pub(super) fn handle_flash_write_app_crc(&mut self, msg: &Message) {
        let page_id = self.geometry.num_pages() - 1;
        self.load_page_into_buffer(page_id);
        self.page_buffer.patch_trailing_word(&msg.data);

        info!(
            crc = format_args!("{:#010X}", msg.data_word()),
            "Storing app CRC"
        );
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
        self.respond_with_data(ResultCode::Ok, msg.data);
    }
}
