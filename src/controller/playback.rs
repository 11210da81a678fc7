//! Remote player commands outside the shortcut set

use super::AppController;

const SEEK_STEP_MS: i64 = 10_000;

impl AppController {
    pub async fn next_track(&self) {
        tracing::debug!("Skipping to next track");
        match self.player.next().await {
            Ok(()) => {
                tracing::info!("Skipped to next track");
                self.refresh_playback().await;
            }
            Err(e) => self.report("next", &e).await,
        }
    }

    pub async fn previous_track(&self) {
        match self.player.previous().await {
            Ok(()) => self.refresh_playback().await,
            Err(e) => self.report("previous", &e).await,
        }
    }

    pub async fn seek_relative(&self, forward: bool) {
        let state = self.model.lock().await.playback().await;
        if state.device_id().is_empty() {
            self.model
                .lock()
                .await
                .set_status("No device selected. Press 'd' to pick one.")
                .await;
            return;
        }

        let delta = if forward { SEEK_STEP_MS } else { -SEEK_STEP_MS };
        let mut target = (i64::from(state.progress_ms()) + delta).max(0);
        if state.duration_ms() > 0 {
            target = target.min(i64::from(state.duration_ms()));
        }
        let target = u32::try_from(target).unwrap_or(u32::MAX);

        match self.player.seek(target, state.device_id()).await {
            Ok(()) => {
                tracing::debug!(position_ms = target, "Seeked");
                self.model.lock().await.update_playback(|p| p.set_progress(target)).await;
            }
            Err(e) => self.report("seek", &e).await,
        }
    }
}
