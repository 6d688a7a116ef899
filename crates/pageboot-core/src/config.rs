//! Simulator configuration, loaded from TOML.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::flash::FlashGeometry;
use crate::sim::Simulator;

/// One simulated device: flash layout plus identity words.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Bus node id, unique per simulator.
    pub node_id: u8,
    /// First flash address.
    pub flash_start: u32,
    /// Total flash size in bytes.
    pub flash_size: u32,
    /// Page size in bytes.
    pub page_size: u32,
    /// First page of the application region.
    pub app_first_page: u32,
    /// Vendor id reported by the device.
    pub vendor_id: u32,
    /// Product id reported by the device.
    pub product_id: u32,
    /// Production date reported by the device.
    pub production_date: u32,
    /// 128-bit unique id as four words.
    pub unique_id: [u32; 4],
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            node_id: 1,
            flash_start: 0x0800_0000,
            flash_size: 16 * 1024,
            page_size: 1024,
            app_first_page: 2,
            vendor_id: 0,
            product_id: 0,
            production_date: 0,
            unique_id: [0x11, 0x22, 0x33, 0x44],
        }
    }
}

impl DeviceConfig {
    /// Validate the layout fields into a [`FlashGeometry`].
    pub fn geometry(&self) -> Result<FlashGeometry> {
        Ok(FlashGeometry::new(
            self.flash_start,
            self.app_first_page,
            self.flash_size,
            self.page_size,
        )?)
    }
}

/// Configuration for a whole simulated bus.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Devices to place on the bus.
    #[serde(default, rename = "device")]
    pub devices: Vec<DeviceConfig>,
}

impl SimConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SimConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Build a simulator with all configured devices, identity seeded.
    pub fn build_simulator(&self) -> Result<Simulator> {
        let mut sim = Simulator::new();
        for device in &self.devices {
            let geometry = device.geometry()?;
            sim.add_device(device.node_id, geometry)?;
            info!(
                node_id = device.node_id,
                pages = geometry.num_pages(),
                page_size = geometry.page_size(),
                "Configured simulated device"
            );
            let hal = sim
                .device_mut(device.node_id)
                .ok_or_else(|| anyhow::anyhow!("Device {} vanished", device.node_id))?
                .handler_mut()
                .hal_mut();
            hal.set_vendor_id(device.vendor_id);
            hal.set_product_id(device.product_id);
            hal.set_production_date(device.production_date);
            hal.set_unique_id(device.unique_id);
        }
        Ok(sim)
    }
}
