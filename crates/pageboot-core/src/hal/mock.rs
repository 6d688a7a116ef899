//! Simulated hardware for unit tests and the multi-device simulator.

use std::collections::BTreeMap;

use crc::{CRC_32_ISO_HDLC, Crc};

use super::traits::HardwareInterface;
use crate::flash::FlashGeometry;
use crate::protocol::constants::ERASED_BYTE;

/// CRC algorithm of the simulated CRC unit. Host tooling that prepares
/// images for simulated devices must use the same one.
pub const MOCK_CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Sparse flash image plus call recording.
///
/// Unwritten flash reads as 0xFF (erased). Erase and program results
/// are configurable so hardware faults can be injected; the CRC unit
/// computes a real CRC-32 unless pinned to a fixed value.
pub struct MockHardware {
    geometry: FlashGeometry,
    flash: BTreeMap<u32, u8>,

    vendor_id: u32,
    product_id: u32,
    production_date: u32,
    unique_id: [u32; 4],

    crc_override: Option<u32>,
    erase_result: bool,
    write_result: bool,

    reset_called: bool,
    start_app_address: Option<u32>,
    erase_called: bool,
    write_called: bool,
    last_crc_range: Option<(u32, u32)>,
}

impl MockHardware {
    pub fn new(geometry: FlashGeometry) -> Self {
        Self {
            geometry,
            flash: BTreeMap::new(),
            vendor_id: 0,
            product_id: 0,
            production_date: 0,
            unique_id: [0x11, 0x22, 0x33, 0x44],
            crc_override: None,
            erase_result: true,
            write_result: true,
            reset_called: false,
            start_app_address: None,
            erase_called: false,
            write_called: false,
            last_crc_range: None,
        }
    }

    /* Configuration */

    pub fn set_vendor_id(&mut self, value: u32) {
        self.vendor_id = value;
    }

    pub fn set_product_id(&mut self, value: u32) {
        self.product_id = value;
    }

    pub fn set_production_date(&mut self, value: u32) {
        self.production_date = value;
    }

    pub fn set_unique_id(&mut self, words: [u32; 4]) {
        self.unique_id = words;
    }

    /// Pin the CRC unit to a fixed result.
    pub fn set_crc_result(&mut self, value: u32) {
        self.crc_override = Some(value);
    }

    pub fn set_erase_result(&mut self, result: bool) {
        self.erase_result = result;
    }

    pub fn set_write_result(&mut self, result: bool) {
        self.write_result = result;
    }

    /// Place one byte directly into the simulated flash.
    pub fn set_flash_byte(&mut self, address: u32, value: u8) {
        self.flash.insert(address, value);
    }

    /// Place a little-endian word directly into the simulated flash.
    pub fn set_flash_word(&mut self, address: u32, value: u32) {
        for (idx, byte) in value.to_le_bytes().iter().enumerate() {
            self.flash.insert(address + idx as u32, *byte);
        }
    }

    /* Call recording */

    pub fn reset_called(&self) -> bool {
        self.reset_called
    }

    /// Address passed to `start_app`, if it was invoked.
    pub fn start_app_address(&self) -> Option<u32> {
        self.start_app_address
    }

    pub fn erase_called(&self) -> bool {
        self.erase_called
    }

    pub fn write_called(&self) -> bool {
        self.write_called
    }

    /// `(src_address, num_bytes)` of the last flash CRC request.
    pub fn last_crc_range(&self) -> Option<(u32, u32)> {
        self.last_crc_range
    }
}

impl HardwareInterface for MockHardware {
    fn reset_device(&mut self) {
        self.reset_called = true;
    }

    fn vendor_id(&self) -> u32 {
        self.vendor_id
    }

    fn product_id(&self) -> u32 {
        self.product_id
    }

    fn production_date(&self) -> u32 {
        self.production_date
    }

    fn unique_id_word(&self, idx: u32) -> u32 {
        self.unique_id[idx as usize & 0x3]
    }

    fn calculate_flash_crc(&mut self, src_address: u32, num_bytes: u32) -> u32 {
        self.last_crc_range = Some((src_address, num_bytes));
        if let Some(value) = self.crc_override {
            return value;
        }
        let bytes: Vec<u8> = (0..num_bytes)
            .map(|off| self.read_byte_from_flash(src_address + off))
            .collect();
        MOCK_CRC.checksum(&bytes)
    }

    fn calculate_buffer_crc(&mut self, data: &[u8]) -> u32 {
        if let Some(value) = self.crc_override {
            return value;
        }
        MOCK_CRC.checksum(data)
    }

    fn erase_flash_page(&mut self, page_id: u32) -> bool {
        self.erase_called = true;
        if !self.erase_result {
            return false;
        }
        let start = self.geometry.page_address(page_id);
        for address in start..start + self.geometry.page_size() {
            self.flash.insert(address, ERASED_BYTE);
        }
        true
    }

    fn write_buffer_to_flash(&mut self, dst_address: u32, _dst_page_id: u32, src: &[u8]) -> bool {
        self.write_called = true;
        if !self.write_result {
            return false;
        }
        for (idx, byte) in src.iter().enumerate() {
            self.flash.insert(dst_address + idx as u32, *byte);
        }
        true
    }

    fn read_byte_from_flash(&self, address: u32) -> u8 {
        self.flash.get(&address).copied().unwrap_or(ERASED_BYTE)
    }

    fn start_app(&mut self, app_flash_address: u32) {
        self.start_app_address = Some(app_flash_address);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> FlashGeometry {
        FlashGeometry::new(0x0800_0000, 2, 16 * 1024, 1024).unwrap()
    }

    #[test]
    fn unwritten_flash_reads_erased() {
        let hw = MockHardware::new(geometry());
        assert_eq!(hw.read_byte_from_flash(0x0800_0000), 0xFF);
    }

    #[test]
    fn erase_fills_page_with_ff() {
        let mut hw = MockHardware::new(geometry());
        hw.set_flash_byte(0x0800_0C00, 0xAB);
        assert!(hw.erase_flash_page(3));
        assert_eq!(hw.read_byte_from_flash(0x0800_0C00), 0xFF);
    }

    #[test]
    fn injected_erase_fault() {
        let mut hw = MockHardware::new(geometry());
        hw.set_flash_byte(0x0800_0C00, 0xAB);
        hw.set_erase_result(false);
        assert!(!hw.erase_flash_page(3));
        // Failed erase leaves flash untouched.
        assert_eq!(hw.read_byte_from_flash(0x0800_0C00), 0xAB);
    }

    #[test]
    fn crc_override_wins() {
        let mut hw = MockHardware::new(geometry());
        hw.set_crc_result(0xDEADBEEF);
        assert_eq!(hw.calculate_flash_crc(0x0800_0000, 64), 0xDEADBEEF);
        assert_eq!(hw.last_crc_range(), Some((0x0800_0000, 64)));
    }

    #[test]
    fn flash_and_buffer_crc_agree() {
        let mut hw = MockHardware::new(geometry());
        let data = [0x42u8; 32];
        for (idx, byte) in data.iter().enumerate() {
            hw.set_flash_byte(0x0800_0000 + idx as u32, *byte);
        }
        let flash_crc = hw.calculate_flash_crc(0x0800_0000, 32);
        assert_eq!(flash_crc, hw.calculate_buffer_crc(&data));
    }
}
