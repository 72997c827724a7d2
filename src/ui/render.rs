use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap};

use crate::app::App;
use crate::domain::catalog::ThumbnailState;
use crate::domain::indicators::BadgeTone;
use crate::domain::marquee::MarqueeFrame;
use crate::storage::config::LayoutConfig;

const HEADER_ROWS: u16 = 3;
const FOOTER_ROWS: u16 = 2;
/// Badge, volume and button share the header line with the title.
const HEADER_RESERVED: u16 = 38;
/// Thumbnail glyph plus spacing in front of each card title.
const CARD_PREFIX: u16 = 3;
const CATALOG_SHARE: u16 = 58;

/// Widths and heights the marquees and catalog viewport are sized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneMetrics {
    pub title_width: usize,
    pub catalog_rows: usize,
    pub card_title_width: usize,
}

impl PaneMetrics {
    pub fn compute(cols: u16, rows: u16, layout: LayoutConfig) -> Self {
        let title_width = cols.saturating_sub(2 + HEADER_RESERVED);
        let body_rows = rows.saturating_sub(HEADER_ROWS + FOOTER_ROWS);
        let catalog_cols = if layout.preview {
            (u32::from(cols) * u32::from(CATALOG_SHARE) / 100) as u16
        } else {
            cols
        };

        let (catalog_rows, card_title_width) = if layout.catalog {
            (
                body_rows.saturating_sub(2),
                catalog_cols.saturating_sub(2 + CARD_PREFIX),
            )
        } else {
            (0, 0)
        };

        Self {
            title_width: usize::from(title_width),
            catalog_rows: usize::from(catalog_rows),
            card_title_width: usize::from(card_title_width),
        }
    }
}

pub fn render(frame: &mut ratatui::Frame<'_>, app: &App, help: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_ROWS),
            Constraint::Min(4),
            Constraint::Length(FOOTER_ROWS),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    let layout = app.layout();
    match (layout.catalog, layout.preview) {
        (true, true) => {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(CATALOG_SHARE),
                    Constraint::Percentage(100 - CATALOG_SHARE),
                ])
                .split(chunks[1]);
            render_catalog(frame, app, body[0]);
            render_preview(frame, app, body[1]);
        }
        (true, false) => render_catalog(frame, app, chunks[1]),
        (false, true) => render_preview(frame, app, chunks[1]),
        (false, false) => {}
    }

    let footer = Paragraph::new(Text::from(vec![
        Line::from(Span::styled(
            help.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            app.status_message.clone(),
            Style::default().fg(Color::Yellow),
        )),
    ]));
    frame.render_widget(footer, chunks[2]);

    if let Some(message) = app.alert() {
        render_alert(frame, message);
    }
}

fn tone_color(tone: BadgeTone) -> Color {
    match tone {
        BadgeTone::Neutral => Color::Gray,
        BadgeTone::Active => Color::Green,
        BadgeTone::Waiting => Color::Cyan,
        BadgeTone::Warning => Color::Yellow,
        BadgeTone::Error => Color::Red,
    }
}

fn render_header(frame: &mut ratatui::Frame<'_>, app: &App, area: Rect) {
    let view = app.status_view();
    let badge = view.badge();

    let mut spans = vec![
        Span::styled(
            format!("{} {:<9}", badge.icon, badge.label),
            Style::default()
                .fg(tone_color(badge.tone))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
    ];
    spans.extend(marquee_spans(
        view.title().frame(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::raw(" │ "));
    match view.volume() {
        Some(volume) => spans.push(Span::raw(format!("{} {}", volume.tier.icon(), volume.text))),
        None => spans.push(Span::styled("vol —", Style::default().fg(Color::DarkGray))),
    }
    spans.push(Span::raw(" │ "));
    spans.push(Span::styled(
        format!("[ {} ]", view.button().label()),
        Style::default().fg(Color::Cyan),
    ));

    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("avp-remote"));
    frame.render_widget(header, area);
}

/// Dims the first and last visible column while a title is scrolling.
fn marquee_spans(frame: MarqueeFrame, style: Style) -> Vec<Span<'static>> {
    let faded = style.fg(Color::DarkGray);
    let mut chars: Vec<char> = frame.text.chars().collect();
    let mut spans = Vec::with_capacity(3);

    let head = if frame.fade_left && !chars.is_empty() {
        Some(chars.remove(0))
    } else {
        None
    };
    let tail = if frame.fade_right && !chars.is_empty() {
        chars.pop()
    } else {
        None
    };

    if let Some(ch) = head {
        spans.push(Span::styled(ch.to_string(), faded));
    }
    spans.push(Span::styled(chars.into_iter().collect::<String>(), style));
    if let Some(ch) = tail {
        spans.push(Span::styled(ch.to_string(), faded));
    }
    spans
}

fn thumbnail_glyph(state: &ThumbnailState) -> Span<'static> {
    match state {
        ThumbnailState::Pending => Span::styled("·", Style::default().fg(Color::DarkGray)),
        ThumbnailState::Loading => Span::styled("◌", Style::default().fg(Color::DarkGray)),
        ThumbnailState::Loaded(_) => Span::styled("▣", Style::default().fg(Color::Green)),
        ThumbnailState::Fallback => Span::styled("▢", Style::default().fg(Color::DarkGray)),
    }
}

fn render_catalog(frame: &mut ratatui::Frame<'_>, app: &App, area: Rect) {
    let catalog = app.catalog();
    let viewport = catalog.viewport();
    let selected = catalog.selected_index();

    let items: Vec<ListItem<'_>> = catalog
        .visible_cards()
        .enumerate()
        .skip(viewport.start)
        .take(viewport.len())
        .map(|(position, card)| {
            let mut style = Style::default();
            if position == selected {
                style = style.bg(Color::Blue).fg(Color::White);
            }
            let mut spans = vec![thumbnail_glyph(card.thumbnail.state()), Span::raw("  ")];
            spans.extend(marquee_spans(card.title.frame(), Style::default()));
            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();

    let title = if app.filter_active() || !catalog.filter().is_empty() {
        format!(
            "Videos ({}/{}) filter: {}{}",
            catalog.visible_len(),
            catalog.len(),
            catalog.filter(),
            if app.filter_active() { "▏" } else { "" }
        )
    } else {
        format!("Videos ({})", catalog.len())
    };

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

fn render_preview(frame: &mut ratatui::Frame<'_>, app: &App, area: Rect) {
    let preview = app.preview();
    let block = Block::default().borders(Borders::ALL).title("Preview");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let checkbox = if preview.checked() { "[x]" } else { "[ ]" };
    let controls = Paragraph::new(Line::from(vec![
        Span::styled(checkbox, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" live preview  "),
        Span::styled(preview.phase().label(), Style::default().fg(Color::DarkGray)),
    ]));
    frame.render_widget(controls, rows[0]);

    if preview.container_visible() {
        let source = match preview.source() {
            Some(url) if app.stream_attached() => format!("▶ {url}"),
            Some(url) => format!("■ {url}"),
            None => "no stream available".to_string(),
        };
        let body = Paragraph::new(source)
            .style(Style::default().fg(Color::Cyan))
            .wrap(Wrap { trim: true });
        frame.render_widget(body, rows[1]);

        let volume = app.preview_volume();
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Green))
            .percent(u16::from(volume))
            .label(format!("local vol {volume}%"));
        frame.render_widget(gauge, rows[2]);
    }
}

fn render_alert(frame: &mut ratatui::Frame<'_>, message: &str) {
    let area = centered(frame.area(), 50, 5);
    frame.render_widget(Clear, area);
    let alert = Paragraph::new(Text::from(vec![
        Line::from(message.to_string()),
        Line::from(Span::styled(
            "Esc or Enter to dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ]))
    .style(Style::default().fg(Color::Red))
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).title("Error"));
    frame.render_widget(alert, area);
}

fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = area.width * percent_x / 100;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_shrink_catalog_when_preview_shown() {
        let both = PaneMetrics::compute(100, 30, LayoutConfig::default());
        let catalog_only = PaneMetrics::compute(
            100,
            30,
            LayoutConfig {
                catalog: true,
                preview: false,
            },
        );
        assert_eq!(both.catalog_rows, 23);
        assert_eq!(both.card_title_width, 53);
        assert_eq!(catalog_only.card_title_width, 95);
        assert_eq!(both.title_width, 60);
    }

    #[test]
    fn tiny_terminal_never_underflows() {
        let metrics = PaneMetrics::compute(5, 3, LayoutConfig::default());
        assert_eq!(metrics.title_width, 0);
        assert_eq!(metrics.catalog_rows, 0);
    }

    #[test]
    fn scrolling_title_fades_both_edges() {
        let spans = marquee_spans(
            MarqueeFrame {
                text: "abcde".to_string(),
                fade_left: true,
                fade_right: true,
            },
            Style::default(),
        );
        let texts: Vec<&str> = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(texts, vec!["a", "bcd", "e"]);
    }
}
