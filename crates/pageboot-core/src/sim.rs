//! Multi-device simulator.
//!
//! Hosts any number of simulated bootloader devices on a shared virtual
//! bus. Each device has a node id, its own [`Handler`] over
//! [`MockHardware`], and single-slot inboxes for broadcast and
//! node-addressed requests. [`Simulator::update_devices`] drives one
//! processing step for every device, including the deferred command
//! phase.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::flash::FlashGeometry;
use crate::hal::MockHardware;
use crate::handler::Handler;
use crate::protocol::msg::Message;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SimError {
    #[error("Node id {node_id} is already in use")]
    DuplicateNode { node_id: u8 },
    #[error("No device with node id {node_id}")]
    UnknownNode { node_id: u8 },
}

/// One simulated device on the bus.
pub struct SimDevice {
    node_id: u8,
    handler: Handler<MockHardware>,
    broadcast_request: Option<Message>,
    node_request: Option<Message>,
    broadcast_response: Option<Message>,
    node_response: Option<Message>,
}

impl SimDevice {
    fn new(node_id: u8, geometry: FlashGeometry) -> Self {
        let hal = MockHardware::new(geometry);
        Self {
            node_id,
            handler: Handler::new(geometry, hal),
            broadcast_request: None,
            node_request: None,
            broadcast_response: None,
            node_response: None,
        }
    }

    pub fn node_id(&self) -> u8 {
        self.node_id
    }

    pub fn handler(&self) -> &Handler<MockHardware> {
        &self.handler
    }

    /// Mutable handler access, mainly to seed the simulated flash and
    /// identity through [`Handler::hal_mut`].
    pub fn handler_mut(&mut self) -> &mut Handler<MockHardware> {
        &mut self.handler
    }

    /// Process at most one pending request from each inbox.
    fn update(&mut self) {
        if let Some(msg) = self.node_request.take() {
            self.handler.process_request(&msg);
            self.node_response = Some(*self.handler.response());
            self.handler.process_buffered_cmds();
        }
        if let Some(msg) = self.broadcast_request.take() {
            self.handler.process_request(&msg);
            self.broadcast_response = Some(*self.handler.response());
            self.handler.process_buffered_cmds();
        }
    }
}

/// Virtual bus holding all simulated devices, keyed by node id.
#[derive(Default)]
pub struct Simulator {
    devices: BTreeMap<u8, SimDevice>,
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every device from the bus.
    pub fn reset(&mut self) {
        self.devices.clear();
    }

    /// Add a device. Node ids must be unique on the bus.
    pub fn add_device(&mut self, node_id: u8, geometry: FlashGeometry) -> Result<(), SimError> {
        if self.devices.contains_key(&node_id) {
            return Err(SimError::DuplicateNode { node_id });
        }
        debug!(node_id, "Adding simulated device");
        self.devices.insert(node_id, SimDevice::new(node_id, geometry));
        Ok(())
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn device(&self, node_id: u8) -> Option<&SimDevice> {
        self.devices.get(&node_id)
    }

    pub fn device_mut(&mut self, node_id: u8) -> Option<&mut SimDevice> {
        self.devices.get_mut(&node_id)
    }

    /// Node ids currently on the bus, in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.devices.keys().copied()
    }

    /// Deliver a request to every device's broadcast inbox. A request
    /// still pending from an earlier broadcast is overwritten.
    pub fn send_broadcast(&mut self, msg: &Message) {
        for device in self.devices.values_mut() {
            device.broadcast_request = Some(*msg);
        }
    }

    /// Deliver a request to one device's node inbox.
    pub fn send_to_node(&mut self, node_id: u8, msg: &Message) -> Result<(), SimError> {
        let device = self
            .devices
            .get_mut(&node_id)
            .ok_or(SimError::UnknownNode { node_id })?;
        device.node_request = Some(*msg);
        Ok(())
    }

    /// Run one processing step on every device: pending requests are
    /// answered and deferred commands executed.
    pub fn update_devices(&mut self) {
        for device in self.devices.values_mut() {
            device.update();
        }
    }

    /// Take the next pending broadcast response, lowest node id first.
    pub fn next_broadcast_response(&mut self) -> Option<(u8, Message)> {
        self.devices
            .values_mut()
            .find_map(|device| device.broadcast_response.take().map(|msg| (device.node_id, msg)))
    }

    /// Take the pending response of one device's node inbox.
    pub fn take_node_response(&mut self, node_id: u8) -> Result<Option<Message>, SimError> {
        let device = self
            .devices
            .get_mut(&node_id)
            .ok_or(SimError::UnknownNode { node_id })?;
        Ok(device.node_response.take())
    }
}
