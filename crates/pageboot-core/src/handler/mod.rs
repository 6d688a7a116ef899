//! Request handler - the bootloader protocol engine.
//!
//! One [`Handler`] per device. Every call to [`Handler::process_request`]
//! produces exactly one response; hardware-disruptive actions (reset,
//! jump to application) are queued and executed by a separate
//! [`Handler::process_buffered_cmds`] call so the response can reach the
//! host before the device goes away.

mod buffer;
mod flash;
mod general;
mod info;

use tracing::{debug, info, warn};

use crate::flash::FlashGeometry;
use crate::hal::HardwareInterface;
use crate::page_buffer::PageBuffer;
use crate::protocol::codes::{RequestCode, ResultCode};
use crate::protocol::msg::{Message, MsgData};

/// Disruptive command queued during request processing.
///
/// At most one command is pending; queuing another silently replaces it
/// (last request wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredCommand {
    /// Hardware-reset the device.
    ResetDevice,
    /// Leave the bootloader and start the application.
    StartApp,
}

/// Bootloader request handler.
///
/// Owns the flash geometry, the page staging buffer, the deferred
/// command slot and the last response. Flash itself is only addressed
/// through the injected [`HardwareInterface`].
pub struct Handler<H: HardwareInterface> {
    geometry: FlashGeometry,
    hal: H,
    page_buffer: PageBuffer,
    deferred: Option<DeferredCommand>,
    response: Message,
}

impl<H: HardwareInterface> Handler<H> {
    pub fn new(geometry: FlashGeometry, hal: H) -> Self {
        Self {
            geometry,
            hal,
            page_buffer: PageBuffer::new(geometry.page_size()),
            deferred: None,
            response: Message::default(),
        }
    }

    /// Process one request and compute the response.
    ///
    /// Never fails: every outcome, including hardware faults, is encoded
    /// in the response result byte.
    pub fn process_request(&mut self, msg: &Message) {
        // Safe default: echo request and packet id, generic error.
        self.response = Message {
            request: msg.request,
            result: ResultCode::Err.to_wire(),
            packet_id: msg.packet_id,
            data: [0; 4],
        };

        let Some(code) = msg.request_code() else {
            warn!(request = format_args!("{:#06X}", msg.request), "Unknown request");
            self.respond(ResultCode::ErrUnknownReq);
            return;
        };
        debug!(request = ?code, packet_id = msg.packet_id, "Processing request");

        match code {
            RequestCode::Ping => self.handle_ping(),
            RequestCode::ResetDevice => self.handle_reset_device(),
            RequestCode::StartApp => self.handle_start_app(msg),

            RequestCode::DevInfoBootloaderVersion => self.handle_bootloader_version(),
            RequestCode::DevInfoBootloaderCrc => self.handle_bootloader_crc(),
            RequestCode::DevInfoVid => self.handle_vendor_id(),
            RequestCode::DevInfoPid => self.handle_product_id(),
            RequestCode::DevInfoPrd => self.handle_production_date(),
            RequestCode::DevInfoUid1 => self.handle_unique_id(0),
            RequestCode::DevInfoUid2 => self.handle_unique_id(1),
            RequestCode::DevInfoUid3 => self.handle_unique_id(2),
            RequestCode::DevInfoUid4 => self.handle_unique_id(3),

            RequestCode::FlashInfoStartAddr => self.handle_flash_start_addr(),
            RequestCode::FlashInfoPageSize => self.handle_flash_page_size(),
            RequestCode::FlashInfoNumPages => self.handle_flash_num_pages(),

            RequestCode::AppInfoPageIdx => self.handle_app_page_idx(),
            RequestCode::AppInfoCrcCalc => self.handle_app_crc_calc(),
            RequestCode::AppInfoCrcStrd => self.handle_app_crc_stored(),

            RequestCode::FlashReadWord => self.handle_flash_read_word(msg),

            RequestCode::PageBufferClear => self.handle_page_buffer_clear(),
            RequestCode::PageBufferReadWord => self.handle_page_buffer_read_word(msg),
            RequestCode::PageBufferWriteWord => self.handle_page_buffer_write_word(msg),
            RequestCode::PageBufferCalcCrc => self.handle_page_buffer_calc_crc(),
            RequestCode::PageBufferWriteToFlash => self.handle_page_buffer_write_to_flash(msg),

            RequestCode::FlashWriteErasePage => self.handle_flash_erase_page(msg),
            RequestCode::FlashWriteAppCrc => self.handle_flash_write_app_crc(msg),
        }
    }

    /// Execute the queued disruptive command, if any, then clear the
    /// slot. Distinct from request processing so the caller can flush
    /// the response first; on real hardware this call may not return.
    pub fn process_buffered_cmds(&mut self) {
        let Some(cmd) = self.deferred.take() else {
            return;
        };
        match cmd {
            DeferredCommand::ResetDevice => {
                info!("Executing deferred device reset");
                self.hal.reset_device();
            }
            DeferredCommand::StartApp => {
                let address = self.geometry.app_start_address();
                info!(address = format_args!("{address:#010X}"), "Jumping to application");
                self.hal.start_app(address);
            }
        }
    }

    /// Response produced by the last `process_request` call.
    pub fn response(&self) -> &Message {
        &self.response
    }

    pub fn geometry(&self) -> &FlashGeometry {
        &self.geometry
    }

    pub fn page_buffer(&self) -> &PageBuffer {
        &self.page_buffer
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    /// Currently queued deferred command.
    pub fn pending_command(&self) -> Option<DeferredCommand> {
        self.deferred
    }

    /* Shared helpers for the request handler impls */

    fn respond(&mut self, result: ResultCode) {
        self.response.result = result.to_wire();
    }

    fn respond_with_data(&mut self, result: ResultCode, data: MsgData) {
        self.response.result = result.to_wire();
        self.response.data = data;
    }

    fn respond_word(&mut self, value: u32) {
        self.response.set_data_word(value);
        self.respond(ResultCode::Ok);
    }

    fn queue_command(&mut self, cmd: DeferredCommand) {
        if let Some(prev) = self.deferred
            && prev != cmd
        {
            // Last request wins, by protocol definition.
            warn!(dropped = ?prev, queued = ?cmd, "Replacing pending deferred command");
        }
        self.deferred = Some(cmd);
    }

    fn read_flash_word(&self, address: u32) -> u32 {
        let mut value = 0u32;
        for idx in 0..4 {
            value |= (self.hal.read_byte_from_flash(address + idx) as u32) << (idx * 8);
        }
        value
    }

    /// Load one flash page into the staging buffer for
    /// read-modify-write. Clobbers any host-staged content.
    fn load_page_into_buffer(&mut self, page_id: u32) {
        let start = self.geometry.page_address(page_id);
        let bytes: Vec<u8> = (0..self.geometry.page_size())
            .map(|off| self.hal.read_byte_from_flash(start + off))
            .collect();
        self.page_buffer.load(&bytes);
    }
}
