use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use ayah_core::SEEK_STEP_SECS;
use tracing::debug;
use crate::app::{App, DragTarget};
use crate::tui::AppEvent;

/// Volume change per `+`/`-` press.
const VOLUME_STEP: f64 = 0.1;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
        AppEvent::FetchDone { ticket, outcome } => app.finish_fetch(ticket, outcome),
        AppEvent::MediaLoaded {
            generation,
            bytes,
            duration,
        } => {
            if let Some(transport) = app.transport_mut() {
                transport.media_mut().finish_load(generation, bytes, duration);
            }
        }
        AppEvent::MediaFailed { generation, error } => {
            if let Some(transport) = app.transport_mut() {
                transport.media_mut().fail_load(generation, &error);
            }
        }
        AppEvent::Media { generation, signal } => {
            if let Some(transport) = app.transport_mut() {
                let current = transport.media().generation();
                if generation == current {
                    transport.handle_signal(signal);
                } else {
                    debug!(generation, current, ?signal, "Dropping signal from a replaced source");
                }
            }
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,

        KeyCode::Char('n') | KeyCode::Enter => app.request_verse(),
        KeyCode::Char('t') => app.toggle_theme(),

        // Audio transport
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            if let Some(transport) = app.transport_mut() {
                transport.toggle_play_pause();
            }
        }
        KeyCode::Left | KeyCode::Char('h') => {
            if let Some(transport) = app.transport_mut() {
                transport.seek_relative(-SEEK_STEP_SECS);
            }
        }
        KeyCode::Right | KeyCode::Char('l') => {
            if let Some(transport) = app.transport_mut() {
                transport.seek_relative(SEEK_STEP_SECS);
            }
        }
        KeyCode::Char('m') => {
            if let Some(transport) = app.transport_mut() {
                transport.toggle_mute();
            }
        }
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => {
            if let Some(transport) = app.transport_mut() {
                let volume = transport.playback().volume;
                transport.set_volume(volume + VOLUME_STEP);
            }
        }
        KeyCode::Char('-') | KeyCode::Down => {
            if let Some(transport) = app.transport_mut() {
                let volume = transport.playback().volume;
                transport.set_volume(volume - VOLUME_STEP);
            }
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(button) = button_at(app, x, y) {
                press_button(app, button);
                return;
            }

            let target = if app.progress_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false) {
                Some((DragTarget::Progress, app.progress_area))
            } else if app.volume_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false) {
                Some((DragTarget::Volume, app.volume_area))
            } else {
                None
            };

            if let Some((target, Some(area))) = target {
                app.drag = Some(target);
                let fraction = fraction_in(x, area);
                if let Some(transport) = app.transport_mut() {
                    match target {
                        DragTarget::Progress => {
                            transport.begin_seek_drag();
                            transport.drag_seek(fraction);
                        }
                        DragTarget::Volume => {
                            transport.begin_volume_drag();
                            transport.drag_volume(fraction);
                        }
                    }
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            let Some(target) = app.drag else { return };
            let area = match target {
                DragTarget::Progress => app.progress_area,
                DragTarget::Volume => app.volume_area,
            };
            let Some(area) = area else { return };
            let fraction = fraction_in(x, area);
            if let Some(transport) = app.transport_mut() {
                match target {
                    DragTarget::Progress => transport.drag_seek(fraction),
                    DragTarget::Volume => transport.drag_volume(fraction),
                }
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if let Some(target) = app.drag.take() {
                if let Some(transport) = app.transport_mut() {
                    match target {
                        DragTarget::Progress => transport.end_seek_drag(),
                        DragTarget::Volume => transport.end_volume_drag(),
                    }
                }
            }
        }
        _ => {}
    }
}

/// Single-click controls drawn in the header and the recitation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Button {
    Theme,
    Rewind,
    PlayPause,
    Forward,
    Mute,
}

fn button_at(app: &App, x: u16, y: u16) -> Option<Button> {
    [
        (app.theme_area, Button::Theme),
        (app.rewind_area, Button::Rewind),
        (app.play_area, Button::PlayPause),
        (app.forward_area, Button::Forward),
        (app.mute_area, Button::Mute),
    ]
    .into_iter()
    .find(|(area, _)| area.map(|r| point_in_rect(x, y, r)).unwrap_or(false))
    .map(|(_, button)| button)
}

fn press_button(app: &mut App, button: Button) {
    if button == Button::Theme {
        app.toggle_theme();
        return;
    }
    let Some(transport) = app.transport_mut() else { return };
    match button {
        Button::Rewind => transport.seek_relative(-SEEK_STEP_SECS),
        Button::PlayPause => transport.toggle_play_pause(),
        Button::Forward => transport.seek_relative(SEEK_STEP_SECS),
        Button::Mute => transport.toggle_mute(),
        Button::Theme => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

/// Horizontal position of `x` across `area`, from 0.0 at the left edge to 1.0 at the right.
fn fraction_in(x: u16, area: Rect) -> f64 {
    let span = area.width.saturating_sub(1).max(1) as f64;
    let offset = x.saturating_sub(area.x) as f64;
    (offset / span).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Preferences;
    use ayah_core::{MediaSignal, MemoryPreferences, Variant, VerseFetcher};
    use tokio::sync::mpsc;

    fn recitation_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let fetcher = VerseFetcher::new("http://127.0.0.1:9", Variant::Recitation);
        let app = App::new(fetcher, Preferences::Memory(MemoryPreferences::default()), tx);
        (app, rx)
    }

    fn click(x: u16, y: u16) -> AppEvent {
        AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[tokio::test]
    async fn test_signal_from_replaced_source_is_dropped() {
        let (mut app, _rx) = recitation_app();
        let Some(current) = app.transport().map(|t| t.media().generation()) else {
            panic!("recitation app should have a transport");
        };
        let change = MediaSignal::VolumeChange {
            volume: 0.2,
            muted: true,
        };

        handle_event(&mut app, AppEvent::Media { generation: current + 3, signal: change }).unwrap();
        let playback = *app.transport().unwrap().playback();
        assert_eq!(playback.volume, 1.0);
        assert!(!playback.muted);

        handle_event(&mut app, AppEvent::Media { generation: current, signal: change }).unwrap();
        let playback = *app.transport().unwrap().playback();
        assert_eq!(playback.volume, 0.2);
        assert!(playback.muted);
    }

    #[tokio::test]
    async fn test_clicking_theme_icon_toggles_theme() {
        let (mut app, _rx) = recitation_app();
        app.theme_area = Some(Rect::new(76, 0, 4, 1));
        let before = app.theme();

        handle_event(&mut app, click(77, 0)).unwrap();
        assert_eq!(app.theme(), before.toggled());

        handle_event(&mut app, click(10, 0)).unwrap();
        assert_eq!(app.theme(), before.toggled());
    }

    #[tokio::test]
    async fn test_clicking_mute_icon_toggles_mute() {
        let (mut app, _rx) = recitation_app();
        app.mute_area = Some(Rect::new(1, 20, 4, 1));

        handle_event(&mut app, click(2, 20)).unwrap();
        assert!(app.transport().unwrap().playback().muted);
        assert_eq!(app.drag, None);

        handle_event(&mut app, click(2, 20)).unwrap();
        assert!(!app.transport().unwrap().playback().muted);
    }

    #[test]
    fn test_button_lookup_ignores_missing_areas() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let fetcher = VerseFetcher::new("http://127.0.0.1:9", Variant::Basic);
        let mut app = App::new(fetcher, Preferences::Memory(MemoryPreferences::default()), tx);
        assert_eq!(button_at(&app, 0, 0), None);

        app.rewind_area = Some(Rect::new(1, 19, 3, 1));
        app.play_area = Some(Rect::new(4, 19, 3, 1));
        app.forward_area = Some(Rect::new(7, 19, 3, 1));
        assert_eq!(button_at(&app, 1, 19), Some(Button::Rewind));
        assert_eq!(button_at(&app, 5, 19), Some(Button::PlayPause));
        assert_eq!(button_at(&app, 9, 19), Some(Button::Forward));
        assert_eq!(button_at(&app, 10, 19), None);
    }

    #[test]
    fn test_point_in_rect() {
        let rect = Rect::new(10, 5, 20, 1);
        assert!(point_in_rect(10, 5, rect));
        assert!(point_in_rect(29, 5, rect));
        assert!(!point_in_rect(30, 5, rect));
        assert!(!point_in_rect(15, 6, rect));
    }

    #[test]
    fn test_fraction_in() {
        let rect = Rect::new(10, 0, 11, 1);
        assert_eq!(fraction_in(10, rect), 0.0);
        assert_eq!(fraction_in(15, rect), 0.5);
        assert_eq!(fraction_in(20, rect), 1.0);
        assert_eq!(fraction_in(40, rect), 1.0);
        assert_eq!(fraction_in(2, rect), 0.0);
    }
}
