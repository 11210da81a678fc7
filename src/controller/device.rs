//! Device picker and local device adoption

use std::time::Duration;

use crate::model::DeviceInfo;

use super::AppController;

const DEVICE_POLL_ATTEMPTS: u32 = 10;
const DEVICE_POLL_DELAY: Duration = Duration::from_millis(500);

impl AppController {
    pub async fn open_device_picker(&self) {
        match self.player.devices().await {
            Ok(devices) => {
                let devices: Vec<DeviceInfo> = devices.iter().filter_map(DeviceInfo::from_device).collect();
                let model = self.model.lock().await;
                if devices.is_empty() {
                    model.set_status("No devices available").await;
                } else {
                    model.show_device_picker(devices).await;
                }
            }
            Err(e) => self.report("devices", &e).await,
        }
    }

    pub async fn select_device(&self, device: &DeviceInfo) {
        tracing::info!(device_name = %device.name, device_id = %device.id, "Selecting playback device");
        let model = self.model.lock().await;
        model
            .update_playback(|p| p.set_device(device.id.clone(), device.name.clone()))
            .await;
        model.set_status(format!("Playing on {}", device.name)).await;
    }

    /// Wait for the device named `name` to show up in the device list and make
    /// it the target, unless a device was chosen in the meantime.
    pub async fn adopt_device_named(&self, name: &str) -> bool {
        for attempt in 1..=DEVICE_POLL_ATTEMPTS {
            match self.player.devices().await {
                Ok(devices) => {
                    let found = devices
                        .iter()
                        .filter(|d| d.name == name)
                        .find_map(DeviceInfo::from_device);
                    if let Some(device) = found {
                        let model = self.model.lock().await;
                        let adopted = model
                            .update_playback(|p| {
                                if p.device_id().is_empty() {
                                    p.set_device(device.id.clone(), device.name.clone());
                                    true
                                } else {
                                    false
                                }
                            })
                            .await;
                        tracing::info!(device = %device.name, adopted, attempt, "Local device visible");
                        return adopted;
                    }
                }
                Err(e) => tracing::debug!(error = %e, attempt, "Device list unavailable"),
            }
            tokio::time::sleep(DEVICE_POLL_DELAY).await;
        }

        tracing::warn!(device = name, "Local device never appeared in the device list");
        false
    }
}
