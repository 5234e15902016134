//! Ties fetch results to the presenter and discards answers that arrive out of order.

use tracing::{debug, info, warn};

use crate::audio::{AudioTransport, MediaElement};
use crate::error::FetchError;
use crate::fetcher::VerseFetcher;
use crate::presenter::{RenderPresenter, VerseView};
use crate::verse::VerseResult;

/// Identifies one outstanding fetch. Only the newest ticket may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

pub struct VerseSession<M: MediaElement> {
    presenter: RenderPresenter,
    transport: Option<AudioTransport<M>>,
    latest: u64,
    current: Option<VerseResult>,
}

impl<M: MediaElement> VerseSession<M> {
    /// `transport` is only kept when the presenter's variant plays audio.
    pub fn new(presenter: RenderPresenter, transport: Option<AudioTransport<M>>) -> Self {
        let transport = if presenter.variant().has_audio() {
            transport
        } else {
            None
        };
        Self {
            presenter,
            transport,
            latest: 0,
            current: None,
        }
    }

    pub fn view(&self) -> &VerseView {
        self.presenter.view()
    }

    pub fn presenter(&self) -> &RenderPresenter {
        &self.presenter
    }

    pub fn transport(&self) -> Option<&AudioTransport<M>> {
        self.transport.as_ref()
    }

    pub fn transport_mut(&mut self) -> Option<&mut AudioTransport<M>> {
        self.transport.as_mut()
    }

    /// The verse currently on screen, if the last completed fetch succeeded.
    pub fn current(&self) -> Option<&VerseResult> {
        self.current.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.presenter.view().is_loading()
    }

    /// Shows the loading state and issues a ticket for the fetch about to start.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest += 1;
        self.presenter.show_loading();
        FetchTicket(self.latest)
    }

    /// Renders `outcome` if `ticket` is still the newest. Returns whether it rendered.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<VerseResult, FetchError>,
    ) -> bool {
        if ticket.0 != self.latest {
            debug!(ticket = ticket.0, latest = self.latest, "Discarding stale verse response");
            return false;
        }

        match outcome {
            Ok(result) => {
                info!(reference = %result.reference().label(), "Verse loaded");
                self.presenter.render(&result, self.transport.as_mut());
                self.current = Some(result);
            }
            Err(e) => {
                warn!(kind = e.kind(), "Verse fetch failed: {}", e);
                self.current = None;
                self.presenter.render_failure();
            }
        }
        true
    }

    /// One full cycle: loading, fetch, render.
    pub async fn refresh(&mut self, fetcher: &VerseFetcher) -> bool {
        let ticket = self.begin_fetch();
        let outcome = fetcher.fetch_random_verse().await;
        self.complete(ticket, outcome)
    }
}
