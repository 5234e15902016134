//! Display-region state for one verse: Arabic text, translations, reference label.

use tracing::{debug, warn};

use crate::audio::{AudioTransport, MediaElement};
use crate::edition::{Role, Variant};
use crate::verse::VerseResult;

pub const CONTENT_PLACEHOLDER: &str = "...";
pub const REFERENCE_PLACEHOLDER: &str = "Loading...";

/// One text area on screen plus its loading marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    pub text: String,
    pub loading: bool,
}

impl Region {
    fn set(&mut self, text: &str) {
        self.text = text.to_string();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRegion {
    pub role: Role,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseView {
    pub arabic: Region,
    pub translations: Vec<TranslationRegion>,
    pub reference: Region,
}

impl VerseView {
    fn for_variant(variant: Variant) -> Self {
        Self {
            arabic: Region::default(),
            translations: variant
                .translation_roles()
                .into_iter()
                .map(|role| TranslationRegion {
                    role,
                    region: Region::default(),
                })
                .collect(),
            reference: Region::default(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.arabic.loading
    }

    fn set_loading(&mut self, loading: bool) {
        self.arabic.loading = loading;
        self.reference.loading = loading;
        for t in &mut self.translations {
            t.region.loading = loading;
        }
    }
}

pub struct RenderPresenter {
    variant: Variant,
    view: VerseView,
}

impl RenderPresenter {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            view: VerseView::for_variant(variant),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn view(&self) -> &VerseView {
        &self.view
    }

    /// Placeholder text and loading marker on every region. Safe to call repeatedly.
    pub fn show_loading(&mut self) {
        self.view.arabic.set(CONTENT_PLACEHOLDER);
        for t in &mut self.view.translations {
            t.region.set(CONTENT_PLACEHOLDER);
        }
        self.view.reference.set(REFERENCE_PLACEHOLDER);
        self.view.set_loading(true);
    }

    /// Fixed per-role failure messages and an empty reference.
    pub fn render_failure(&mut self) {
        self.view.arabic.set(Role::Arabic.failure_message().unwrap_or_default());
        for t in &mut self.view.translations {
            t.region.set(t.role.failure_message().unwrap_or_default());
        }
        self.view.reference.set("");
        self.view.set_loading(false);
    }

    /// Writes a fetched verse into every region.
    ///
    /// For the recitation variant the transport is reset and handed the new audio URL.
    pub fn render<M: MediaElement>(
        &mut self,
        result: &VerseResult,
        transport: Option<&mut AudioTransport<M>>,
    ) {
        self.view.arabic.set(&result.arabic().text);

        for t in &mut self.view.translations {
            let text = result
                .text(t.role)
                .or_else(|| t.role.unavailable_placeholder())
                .unwrap_or_default();
            t.region.set(text);
        }

        self.view.reference.set(&result.reference().label());

        if self.variant.has_audio() {
            match transport {
                Some(transport) => {
                    transport.reset();
                    match result.audio_url() {
                        Some(url) => transport.set_source(url),
                        None => warn!("Audio URL not found in API response"),
                    }
                }
                None => debug!("No audio transport attached; skipping recitation"),
            }
        }

        self.view.set_loading(false);
    }
}
