//! Hardware abstraction boundary.

pub mod mock;
pub mod traits;

pub use mock::MockHardware;
pub use traits::HardwareInterface;
