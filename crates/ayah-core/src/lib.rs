pub mod audio;
pub mod config;
pub mod edition;
pub mod error;
pub mod fetcher;
pub mod presenter;
pub mod session;
pub mod theme;
pub mod verse;

// Re-export main types for convenience
pub use audio::{
    format_time, AudioTransport, MediaElement, MediaSignal, NullMedia, PlayIcon, PlaybackState,
    TransportState, TransportView, VolumeTier, SEEK_STEP_SECS,
};
pub use config::Config;
pub use edition::{Role, Variant};
pub use error::{FetchError, MediaError};
pub use fetcher::{VerseFetcher, DEFAULT_API_BASE};
pub use presenter::{Region, RenderPresenter, VerseView};
pub use session::{FetchTicket, VerseSession};
pub use theme::{FilePreferences, MemoryPreferences, PreferenceStore, Theme, ThemeStore};
pub use verse::{parse_response, EditionResult, Reference, VerseRequest, VerseResult, TOTAL_VERSES};
