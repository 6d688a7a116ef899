//! Pageboot-Core: page-oriented bootloader protocol engine.
//!
//! Device-side implementation of a minimal flashing protocol built on
//! fixed 8-byte frames. A host erases and reprograms the application
//! region of a device page by page, stores a checksum of the final
//! image, and starts the application only when that checksum matches.
//!
//! # Architecture
//!
//! The crate is organized into layers:
//!
//! - **Protocol**: Constants, request/result code tables, frame codec
//! - **Flash**: Validated flash geometry and derived layout values
//! - **Page buffer**: RAM staging area for one flash page
//! - **HAL**: Hardware abstraction trait plus a simulated implementation
//! - **Handler**: Request dispatch and deferred command execution
//! - **Sim**: Multi-device bus simulator
//! - **Config**: TOML simulator configuration
//!
//! # Example
//!
//! ```
//! use pageboot_core::flash::FlashGeometry;
//! use pageboot_core::hal::MockHardware;
//! use pageboot_core::handler::Handler;
//! use pageboot_core::protocol::{Message, RequestCode, ResultCode};
//!
//! let geometry = FlashGeometry::new(0x0800_0000, 2, 16 * 1024, 1024).unwrap();
//! let mut handler = Handler::new(geometry, MockHardware::new(geometry));
//!
//! handler.process_request(&Message::new_request(RequestCode::Ping, 0));
//! assert_eq!(handler.response().result_code(), Some(ResultCode::Ok));
//! handler.process_buffered_cmds();
//! ```

pub mod config;
pub mod flash;
pub mod hal;
pub mod handler;
pub mod page_buffer;
pub mod protocol;
pub mod sim;

// Re-exports for convenience
pub use config::{DeviceConfig, SimConfig};
pub use flash::{FlashGeometry, GeometryError};
pub use hal::{HardwareInterface, MockHardware};
pub use handler::{DeferredCommand, Handler};
pub use page_buffer::{PageBuffer, WriteOutcome};
pub use protocol::{Message, RequestCode, ResultCode};
pub use sim::{SimDevice, SimError, Simulator};
