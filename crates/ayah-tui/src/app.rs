use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tracing::info;
use ayah_core::{
    AudioTransport, FetchError, FetchTicket, FilePreferences, MemoryPreferences, PreferenceStore,
    RenderPresenter, Theme, ThemeStore, Variant, VerseFetcher, VerseResult, VerseSession,
    VerseView,
};
use crate::player::RodioMedia;
use crate::tui::AppEvent;

/// Which control a held mouse button is dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Progress,
    Volume,
}

/// Preference storage for the running app: the file on disk, or memory if no config dir exists.
pub enum Preferences {
    File(FilePreferences),
    Memory(MemoryPreferences),
}

impl PreferenceStore for Preferences {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            Preferences::File(p) => p.get(key),
            Preferences::Memory(p) => p.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match self {
            Preferences::File(p) => p.set(key, value),
            Preferences::Memory(p) => p.set(key, value),
        }
    }
}

pub struct App {
    pub should_quit: bool,

    pub session: VerseSession<RodioMedia>,
    pub fetcher: VerseFetcher,
    pub themes: ThemeStore<Preferences>,

    // Mouse state
    pub drag: Option<DragTarget>,

    // Panel areas for mouse hit-testing (updated during render)
    pub progress_area: Option<Rect>,
    pub volume_area: Option<Rect>,
    pub theme_area: Option<Rect>,
    pub rewind_area: Option<Rect>,
    pub play_area: Option<Rect>,
    pub forward_area: Option<Rect>,
    pub mute_area: Option<Rect>,

    events: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        fetcher: VerseFetcher,
        preferences: Preferences,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let variant = fetcher.variant();
        let transport = variant
            .has_audio()
            .then(|| AudioTransport::new(RodioMedia::new(events.clone())));
        let session = VerseSession::new(RenderPresenter::new(variant), transport);
        let themes = ThemeStore::load(preferences, ambient_theme());

        info!(variant = variant.as_str(), api = fetcher.base_url(), "App initialized");

        Self {
            should_quit: false,
            session,
            fetcher,
            themes,
            drag: None,
            progress_area: None,
            volume_area: None,
            theme_area: None,
            rewind_area: None,
            play_area: None,
            forward_area: None,
            mute_area: None,
            events,
        }
    }

    pub fn variant(&self) -> Variant {
        self.fetcher.variant()
    }

    pub fn view(&self) -> &VerseView {
        self.session.view()
    }

    pub fn theme(&self) -> Theme {
        self.themes.current()
    }

    /// Starts a fetch in the background. A newer request supersedes any in flight.
    pub fn request_verse(&mut self) {
        let ticket = self.session.begin_fetch();
        let fetcher = self.fetcher.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = fetcher.fetch_random_verse().await;
            let _ = events.send(AppEvent::FetchDone { ticket, outcome });
        });
    }

    pub fn finish_fetch(&mut self, ticket: FetchTicket, outcome: Result<VerseResult, FetchError>) {
        self.session.complete(ticket, outcome);
    }

    pub fn toggle_theme(&mut self) {
        let theme = self.themes.toggle();
        info!(theme = theme.as_str(), "Theme toggled");
    }

    pub fn transport(&self) -> Option<&AudioTransport<RodioMedia>> {
        self.session.transport()
    }

    pub fn transport_mut(&mut self) -> Option<&mut AudioTransport<RodioMedia>> {
        self.session.transport_mut()
    }

    pub fn tick(&mut self) {
        if let Some(transport) = self.transport_mut() {
            transport.media_mut().tick();
        }
    }
}

/// Light when `COLORFGBG` reports a light background, dark otherwise.
pub fn ambient_theme() -> Theme {
    theme_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

fn theme_from_colorfgbg(value: Option<&str>) -> Theme {
    let background = value
        .and_then(|v| v.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok());
    match background {
        Some(7) | Some(15) => Theme::Light,
        _ => Theme::Dark,
    }
}
