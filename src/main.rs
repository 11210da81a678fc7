use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::{mpsc, Mutex};

use tunebox::api::{BaseUrls, HttpClient, LyricsApi, SystemApi};
use tunebox::audio::LocalDevice;
use tunebox::config::Config;
use tunebox::controller::{is_force_quit, AppController, ControllerSettings};
use tunebox::model::AppModel;
use tunebox::storage::SessionStore;
use tunebox::theme::ThemeController;
use tunebox::view::AppView;
use tunebox::{appearance, auth, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = match logging::init_logging(&logging::log_dir()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== tunebox starting ===");

    let config = match Config::load_or_create() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {}; using defaults", e);
            tracing::warn!(error = %e, "Config unusable, falling back to defaults");
            Config::default()
        }
    };

    let session = SessionStore::open(SessionStore::default_path());

    // Step 1: Log in (the browser opens only when no refresh token works)
    let access_token = auth::login(&config.spotify, &session).await?;
    auth::spawn_refresh_task(config.spotify.clone(), session.clone());

    // Step 2: Clients
    let http = HttpClient::new(BaseUrls::from_config(&config), session.clone())?;
    let player = Arc::new(SystemApi::new(http.clone()));
    let lyrics = LyricsApi::new(http.clone(), config.backends.lyrics_api_key.clone());

    // Step 3: Theme, following the OS preference while in auto mode
    let os_preference = appearance::system_preference().await;
    let theme = Arc::new(Mutex::new(ThemeController::init(Some(session.clone()), os_preference)));

    let model = Arc::new(Mutex::new(AppModel::new()));
    let controller = AppController::new(
        model.clone(),
        player,
        http,
        lyrics,
        theme.clone(),
        ControllerSettings::from_config(&config),
    );

    let (appearance_tx, appearance_rx) = mpsc::unbounded_channel();
    appearance::spawn_preference_watcher(appearance_tx);
    controller.follow_os_appearance(appearance_rx);

    controller.load_liked_library().await;

    // Step 4: Optional local Connect device; adopt it once the Web API lists it
    let local_device: Arc<Mutex<Option<LocalDevice>>> = Arc::new(Mutex::new(None));
    if config.player.local_device {
        let slot = local_device.clone();
        let controller = controller.clone();
        let model = model.clone();
        let device_name = config.player.device_name.clone();
        tokio::spawn(async move {
            match LocalDevice::start(&access_token, &device_name).await {
                Ok(device) => {
                    tracing::info!(user = %device.username(), "Connect session established");
                    *slot.lock().await = Some(device);
                    controller.adopt_device_named(&device_name).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Local device failed to start");
                    model.lock().await.set_status(format!("Local device failed: {}", e)).await;
                }
            }
        });
    }

    controller.spawn_sync_task(Duration::from_millis(config.player.sync_interval_ms));

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model, theme, controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(device) = local_device.lock().await.take() {
        device.shutdown();
    }

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("tunebox shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    theme: Arc<Mutex<ThemeController>>,
    controller: AppController,
) -> io::Result<()> {
    let keys = controller.spawn_key_worker();

    loop {
        let (state, should_quit) = {
            let model_guard = model.lock().await;

            // Auto-clear old status messages (after 5 seconds)
            model_guard.auto_clear_old_status().await;

            (model_guard.render_state().await, model_guard.should_quit().await)
        };

        if should_quit {
            break;
        }

        let (mode, applied) = {
            let theme = theme.lock().await;
            (theme.selected(), theme.applied())
        };

        terminal.draw(|f| {
            AppView::render(f, &state, mode, applied);
        })?;

        // Handlers run on the key worker so a slow request never stalls drawing
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if is_force_quit(&key) {
                    model.lock().await.set_should_quit(true).await;
                } else if keys.send(key).is_err() {
                    tracing::error!("Key worker gone, quitting");
                    break;
                }
            }
        }
    }

    Ok(())
}
