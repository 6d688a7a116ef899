//! Read-only info requests: device identity, flash layout, app region.

use super::Handler;
use crate::hal::HardwareInterface;
use crate::protocol::codes::ResultCode;
use crate::protocol::constants::BOOTLOADER_VERSION;

impl<H: HardwareInterface> Handler<H> {
    pub(super) fn handle_bootloader_version(&mut self) {
        self.respond_with_data(
            ResultCode::Ok,
            [
                BOOTLOADER_VERSION[0],
                BOOTLOADER_VERSION[1],
                BOOTLOADER_VERSION[2],
                0,
            ],
        );
    }

    /// CRC over the bootloader's own flash region.
    pub(super) fn handle_bootloader_crc(&mut self) {
        let crc = self
            .hal
            .calculate_flash_crc(self.geometry.flash_start(), self.geometry.bootloader_len());
        self.respond_word(crc);
    }

    pub(super) fn handle_vendor_id(&mut self) {
        let value = self.hal.vendor_id();
        self.respond_word(value);
    }

    pub(super) fn handle_product_id(&mut self) {
        let value = self.hal.product_id();
        self.respond_word(value);
    }

    pub(super) fn handle_production_date(&mut self) {
        let value = self.hal.production_date();
        self.respond_word(value);
    }

    pub(super) fn handle_unique_id(&mut self, word_idx: u32) {
        let value = self.hal.unique_id_word(word_idx);
        self.respond_word(value);
    }

    pub(super) fn handle_flash_start_addr(&mut self) {
        let value = self.geometry.flash_start();
        self.respond_word(value);
    }

    pub(super) fn handle_flash_page_size(&mut self) {
        let value = self.geometry.page_size();
        self.respond_word(value);
    }

    pub(super) fn handle_flash_num_pages(&mut self) {
        let value = self.geometry.num_pages();
        self.respond_word(value);
    }

    pub(super) fn handle_app_page_idx(&mut self) {
        let value = self.geometry.app_first_page();
        self.respond_word(value);
    }

    /// Fresh CRC over the app region, excluding the CRC slot.
    pub(super) fn handle_app_crc_calc(&mut self) {
        let crc = self.hal.calculate_flash_crc(
            self.geometry.app_start_address(),
            self.geometry.app_crc_region_len(),
        );
        self.respond_word(crc);
    }

    /// CRC value currently stored in the slot at the end of flash.
    pub(super) fn handle_app_crc_stored(&mut self) {
        let stored = self.read_flash_word(self.geometry.crc_slot_address());
        self.respond_word(stored);
    }
}
