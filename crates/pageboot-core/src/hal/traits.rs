//! Hardware abstraction trait.
//!
//! Everything the request handler needs from the platform: flash
//! primitives, the CRC unit, identity readback and the two terminal
//! operations (reset, jump to application). Platform ports implement
//! this trait; tests and the simulator use [`super::MockHardware`].
//!
//! The handler takes the implementation as a constructor parameter, so
//! no global state is involved.

/// Platform primitives required by the bootloader request handler.
///
/// Erase and program report success as `bool`; the handler maps a
/// failure to a generic error response without retrying.
pub trait HardwareInterface {
    /// Unconditional hardware reset. Does not return on real hardware.
    fn reset_device(&mut self);

    /// 32-bit vendor id.
    fn vendor_id(&self) -> u32;

    /// 32-bit product id.
    fn product_id(&self) -> u32;

    /// 32-bit production date.
    fn production_date(&self) -> u32;

    /// One word of the 128-bit unique id, `idx` in `0..4`.
    fn unique_id_word(&self, idx: u32) -> u32;

    /// CRC over a flash-addressed range. Polynomial is platform-defined.
    fn calculate_flash_crc(&mut self, src_address: u32, num_bytes: u32) -> u32;

    /// CRC over a RAM buffer, same algorithm as the flash variant.
    fn calculate_buffer_crc(&mut self, data: &[u8]) -> u32;

    /// Erase one flash page.
    fn erase_flash_page(&mut self, page_id: u32) -> bool;

    /// Program a full page. `src` holds exactly one page of data.
    fn write_buffer_to_flash(&mut self, dst_address: u32, dst_page_id: u32, src: &[u8]) -> bool;

    /// Read one byte from flash.
    fn read_byte_from_flash(&self, address: u32) -> u8;

    /// Transfer control to the application. Does not return on real
    /// hardware.
    fn start_app(&mut self, app_flash_address: u32);
}
