//! OS light/dark preference from the freedesktop settings portal.
//!
//! The portal reports `org.freedesktop.appearance color-scheme` as a u32:
//! 1 prefers dark, anything else is treated as light. When no session bus or
//! portal is reachable the preference is dark.

use anyhow::{Context, Result};
use futures::StreamExt;
use tokio::sync::mpsc::UnboundedSender;
use zbus::Connection;
use zbus::zvariant::{OwnedValue, Value};

use crate::theme::Appearance;

const APPEARANCE_NAMESPACE: &str = "org.freedesktop.appearance";
const COLOR_SCHEME_KEY: &str = "color-scheme";

#[zbus::proxy(
    interface = "org.freedesktop.portal.Settings",
    default_service = "org.freedesktop.portal.Desktop",
    default_path = "/org/freedesktop/portal/desktop"
)]
trait PortalSettings {
    fn read_one(&self, namespace: &str, key: &str) -> zbus::Result<OwnedValue>;

    #[zbus(signal)]
    fn setting_changed(&self, namespace: &str, key: &str, value: Value<'_>) -> zbus::Result<()>;
}

fn scheme_from(value: &Value<'_>) -> Option<Appearance> {
    match value {
        Value::U32(1) => Some(Appearance::Dark),
        Value::U32(_) => Some(Appearance::Light),
        Value::Value(inner) => scheme_from(inner),
        _ => None,
    }
}

async fn proxy() -> Result<PortalSettingsProxy<'static>> {
    let connection = Connection::session().await.context("No D-Bus session bus")?;
    PortalSettingsProxy::new(&connection)
        .await
        .context("Settings portal unavailable")
}

/// Current OS preference, dark when it cannot be read
pub async fn system_preference() -> Appearance {
    let read = async {
        let proxy = proxy().await?;
        let value = proxy
            .read_one(APPEARANCE_NAMESPACE, COLOR_SCHEME_KEY)
            .await
            .context("Failed to read color-scheme")?;
        scheme_from(&value).context("Unexpected color-scheme value")
    };

    match read.await {
        Ok(appearance) => {
            tracing::debug!(?appearance, "OS appearance");
            appearance
        }
        Err(e) => {
            tracing::info!(error = %e, "OS appearance unavailable, assuming dark");
            Appearance::Dark
        }
    }
}

/// Forward every color-scheme change to `sender` for the life of the process.
pub fn spawn_preference_watcher(sender: UnboundedSender<Appearance>) {
    tokio::spawn(async move {
        if let Err(e) = watch(sender).await {
            tracing::info!(error = %e, "Not watching OS appearance");
        }
    });
}

async fn watch(sender: UnboundedSender<Appearance>) -> Result<()> {
    let proxy = proxy().await?;
    let mut changes = proxy
        .receive_setting_changed()
        .await
        .context("Failed to subscribe to SettingChanged")?;

    tracing::debug!("Watching OS appearance");
    while let Some(signal) = changes.next().await {
        let args = match signal.args() {
            Ok(args) => args,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed SettingChanged signal");
                continue;
            }
        };
        if args.namespace() != &APPEARANCE_NAMESPACE || args.key() != &COLOR_SCHEME_KEY {
            continue;
        }
        if let Some(appearance) = scheme_from(args.value()) {
            if sender.send(appearance).is_err() {
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_color_scheme_values() {
        assert_eq!(scheme_from(&Value::U32(1)), Some(Appearance::Dark));
        assert_eq!(scheme_from(&Value::U32(2)), Some(Appearance::Light));
        assert_eq!(scheme_from(&Value::U32(0)), Some(Appearance::Light));
        assert_eq!(scheme_from(&Value::Str("dark".into())), None);
    }

    #[test]
    fn unwraps_nested_variants() {
        let nested = Value::Value(Box::new(Value::Value(Box::new(Value::U32(1)))));
        assert_eq!(scheme_from(&nested), Some(Appearance::Dark));
    }
}
