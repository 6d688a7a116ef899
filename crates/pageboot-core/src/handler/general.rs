//! General requests: ping, reset, start app.

use tracing::{debug, warn};

use super::{DeferredCommand, Handler};
use crate::hal::HardwareInterface;
use crate::protocol::codes::ResultCode;
use crate::protocol::constants::{BOOTLOADER_VERSION, UNSAFE_START_WORD};
use crate::protocol::msg::Message;

impl<H: HardwareInterface> Handler<H> {
    pub(super) fn handle_ping(&mut self) {
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

    pub(super) fn handle_reset_device(&mut self) {
        self.queue_command(DeferredCommand::ResetDevice);
        self.respond(ResultCode::Ok);
    }

    /// Queue the jump to the application, gated on the stored CRC.
    ///
    /// The unsafe sentinel in the data field skips the check; the
    /// sentinel bytes are echoed so the host sees which mode took
    /// effect.
    pub(super) fn handle_start_app(&mut self, msg: &Message) {
        if msg.data_word() == UNSAFE_START_WORD {
            warn!("Starting app without CRC check");
            self.queue_command(DeferredCommand::StartApp);
            self.respond_with_data(ResultCode::Ok, msg.data);
            return;
        }
        if !self.is_app_valid() {
            warn!("App CRC mismatch, refusing to start");
            self.respond(ResultCode::ErrCrcInvalid);
            return;
        }
        self.queue_command(DeferredCommand::StartApp);
        self.respond(ResultCode::Ok);
    }

    /// Compare the stored application CRC against a fresh computation
    /// over the app region (minus the CRC slot itself).
    fn is_app_valid(&mut self) -> bool {
        let stored = self.read_flash_word(self.geometry.crc_slot_address());
        let computed = self.hal.calculate_flash_crc(
            self.geometry.app_start_address(),
            self.geometry.app_crc_region_len(),
        );
        debug!(
            stored = format_args!("{stored:#010X}"),
            computed = format_args!("{computed:#010X}"),
            "App CRC check"
        );
        stored == computed
    }
}
