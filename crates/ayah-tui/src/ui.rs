use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};
use ayah_core::{PlayIcon, Region, Theme, TransportView, VolumeTier};
use crate::app::App;

/// Colours for the active theme.
#[derive(Debug, Clone, Copy)]
struct Palette {
    bg: Color,
    fg: Color,
    dim: Color,
    accent: Color,
    bar: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                bg: Color::Black,
                fg: Color::White,
                dim: Color::DarkGray,
                accent: Color::Cyan,
                bar: Color::DarkGray,
            },
            Theme::Light => Self {
                bg: Color::White,
                fg: Color::Black,
                dim: Color::Gray,
                accent: Color::Blue,
                bar: Color::Gray,
            },
        }
    }

    fn base(&self) -> Style {
        Style::default().bg(self.bg).fg(self.fg)
    }

    /// Dimmed italic text while a region waits on the network.
    fn region(&self, region: &Region) -> Style {
        if region.loading {
            self.base().fg(self.dim).add_modifier(Modifier::ITALIC)
        } else {
            self.base()
        }
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let palette = Palette::for_theme(app.theme());

    frame.render_widget(Block::default().style(palette.base()), area);

    let has_audio = app.transport().is_some();
    let translation_count = app.view().translations.len() as u16;

    let [header_area, body_area, controls_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(if has_audio { 4 } else { 0 }),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area, palette);

    let mut constraints = vec![Constraint::Min(3)];
    constraints.extend((0..translation_count).map(|_| Constraint::Min(3)));
    constraints.push(Constraint::Length(1));
    let body = Layout::vertical(constraints).split(body_area);

    render_verse(app, frame, &body, palette);

    if has_audio {
        render_controls(app, frame, controls_area, palette);
    } else {
        app.progress_area = None;
        app.volume_area = None;
        app.rewind_area = None;
        app.play_area = None;
        app.forward_area = None;
        app.mute_area = None;
    }

    render_footer(app, frame, footer_area, palette);
}

fn render_header(app: &mut App, frame: &mut Frame, area: Rect, palette: Palette) {
    let title = Line::from(vec![
        Span::styled(" Ayah ", Style::default().fg(palette.accent).bold()),
        Span::styled(
            format!("({}) ", app.variant().as_str()),
            Style::default().fg(palette.dim),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(palette.dim),
        ),
    ]);

    let [left, right] = Layout::horizontal([Constraint::Min(0), Constraint::Length(4)]).areas(area);
    frame.render_widget(Paragraph::new(title).style(palette.base()), left);
    frame.render_widget(
        Paragraph::new(format!(" {} ", app.theme().icon()))
            .style(palette.base().fg(palette.accent))
            .alignment(Alignment::Right),
        right,
    );
    app.theme_area = Some(right);
}

fn render_verse(app: &App, frame: &mut Frame, areas: &[Rect], palette: Palette) {
    let view = app.view();

    let arabic = Paragraph::new(view.arabic.text.as_str())
        .style(palette.region(&view.arabic).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Right)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.dim))
                .title(" Arabic "),
        );
    frame.render_widget(arabic, areas[0]);

    for (i, translation) in view.translations.iter().enumerate() {
        let Some(area) = areas.get(i + 1) else { break };
        let paragraph = Paragraph::new(translation.region.text.as_str())
            .style(palette.region(&translation.region))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.dim))
                    .title(format!(" {} ", translation.role.label())),
            );
        frame.render_widget(paragraph, *area);
    }

    if let Some(area) = areas.last() {
        let reference = Paragraph::new(view.reference.text.as_str())
            .style(palette.region(&view.reference).fg(palette.accent))
            .alignment(Alignment::Center);
        frame.render_widget(reference, *area);
    }
}

fn play_icon(icon: PlayIcon) -> &'static str {
    match icon {
        PlayIcon::Play => "▶",
        PlayIcon::Pause => "⏸",
    }
}

fn volume_icon(tier: VolumeTier) -> &'static str {
    match tier {
        VolumeTier::Muted => "🔇",
        VolumeTier::Low => "🔉",
        VolumeTier::High => "🔊",
    }
}

fn render_controls(app: &mut App, frame: &mut Frame, area: Rect, palette: Palette) {
    let Some(view) = app.transport().map(|t| t.view().clone()) else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.dim))
        .title(" Recitation ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [top, bottom] = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(inner);

    let [buttons, progress, time] = Layout::horizontal([
        Constraint::Length(12),
        Constraint::Min(10),
        Constraint::Length(12),
    ])
    .areas(top);

    let [rewind, play, forward, _] = Layout::horizontal([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(buttons);

    let button_style = palette.base().fg(palette.accent);
    frame.render_widget(Paragraph::new("⏪").style(button_style), rewind);
    frame.render_widget(Paragraph::new(play_icon(view.icon)).style(button_style), play);
    frame.render_widget(Paragraph::new("⏩").style(button_style), forward);
    frame.render_widget(gauge(view.progress, palette), progress);
    frame.render_widget(
        Paragraph::new(time_label(&view))
            .style(palette.base())
            .alignment(Alignment::Right),
        time,
    );

    let [mute, volume, _] = Layout::horizontal([
        Constraint::Length(4),
        Constraint::Length(20),
        Constraint::Min(0),
    ])
    .areas(bottom);

    frame.render_widget(
        Paragraph::new(volume_icon(view.volume_tier)).style(palette.base()),
        mute,
    );
    frame.render_widget(gauge(view.volume_slider, palette), volume);

    app.progress_area = Some(progress);
    app.volume_area = Some(volume);
    app.rewind_area = Some(rewind);
    app.play_area = Some(play);
    app.forward_area = Some(forward);
    app.mute_area = Some(mute);
}

fn gauge(ratio: f64, palette: Palette) -> Gauge<'static> {
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
    Gauge::default()
        .gauge_style(Style::default().fg(palette.accent).bg(palette.bar))
        .label("")
        .ratio(ratio)
}

fn time_label(view: &TransportView) -> String {
    format!("{} / {}", view.elapsed, view.total)
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect, palette: Palette) {
    let key_style = Style::default().bg(palette.dim).fg(palette.fg);
    let label_style = palette.base();

    let mut hints = vec![
        Span::styled(" n ", key_style),
        Span::styled(" new verse ", label_style),
    ];

    if app.transport().is_some() {
        hints.extend(vec![
            Span::styled(" Space ", key_style),
            Span::styled(" play ", label_style),
            Span::styled(" ←/→ ", key_style),
            Span::styled(" 5s ", label_style),
            Span::styled(" m ", key_style),
            Span::styled(" mute ", label_style),
            Span::styled(" +/- ", key_style),
            Span::styled(" volume ", label_style),
        ]);
    }

    hints.extend(vec![
        Span::styled(" t ", key_style),
        Span::styled(" theme ", label_style),
        Span::styled(" q ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    frame.render_widget(Paragraph::new(Line::from(hints)).style(palette.base()), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_label() {
        let view = TransportView {
            elapsed: "0:07".to_string(),
            total: "1:15".to_string(),
            ..TransportView::default()
        };
        assert_eq!(time_label(&view), "0:07 / 1:15");
    }

    #[test]
    fn test_loading_regions_are_italic() {
        let palette = Palette::for_theme(Theme::Dark);
        let loading = Region {
            text: "...".to_string(),
            loading: true,
        };
        assert!(palette.region(&loading).add_modifier.contains(Modifier::ITALIC));
        assert!(!palette.region(&Region::default()).add_modifier.contains(Modifier::ITALIC));
    }
}
