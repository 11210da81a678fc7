//! Periodic reconciliation with the remote player

use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::model::RemotePlayback;

use super::AppController;

impl AppController {
    /// Pull the remote playback state into the store
    pub async fn refresh_playback(&self) {
        match self.player.current_playback().await {
            Ok(Some(context)) => {
                let remote = RemotePlayback::from_context(&context);
                tracing::trace!(?remote, "Remote playback");
                self.model.lock().await.update_playback(|p| p.apply_remote(&remote)).await;
            }
            Ok(None) => {
                self.model.lock().await.update_playback(|p| p.set_playing(false)).await;
            }
            Err(e) => tracing::debug!(error = %e, "Playback refresh failed"),
        }
    }

    /// Poll the remote player until the app quits
    pub fn spawn_sync_task(&self, interval: Duration) {
        let controller = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if controller.model.lock().await.should_quit().await {
                    break;
                }
                controller.refresh_playback().await;
            }
            tracing::debug!("Playback sync stopped");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::harness;

    #[tokio::test]
    async fn nothing_playing_clears_flag() {
        let h = harness();
        h.controller.model.lock().await.update_playback(|p| p.set_playing(true)).await;

        h.controller.refresh_playback().await;

        assert!(!h.controller.model.lock().await.playback().await.is_playing());
    }
}
