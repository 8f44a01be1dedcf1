/*
[INPUT]:  MapView viewport, pins and attribution text
[OUTPUT]: World map canvas rendered into Ratatui frame, inner area for mouse picks
[POS]:    TUI UI map rendering shared by list and form
[UPDATE]: When changing map symbols or canvas resolution
*/

use geotask::map::MapView;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Map, MapResolution};
use ratatui::widgets::{Block, Borders};

use crate::tui::runtime::border_style;

/// Draw `view` and return the canvas area inside the border
pub(in crate::tui) fn draw_map(
    frame: &mut ratatui::Frame,
    area: Rect,
    view: &MapView,
    title: &str,
    attribution: &str,
    focused: bool,
) -> Rect {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        border_style()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
        .title_bottom(
            Line::from(Span::styled(attribution, Style::default().fg(Color::DarkGray)))
                .right_aligned(),
        );
    let inner = block.inner(area);

    let marker = view.marker();
    let device = view.device();
    let cursor = view.cursor();
    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(view.x_bounds())
        .y_bounds(view.y_bounds())
        .paint(move |ctx| {
            ctx.draw(&Map {
                color: Color::Green,
                resolution: MapResolution::High,
            });
            ctx.layer();
            if let Some(device) = device {
                ctx.print(
                    device.longitude,
                    device.latitude,
                    Span::styled("@", Style::default().fg(Color::Cyan)),
                );
            }
            if let Some(marker) = marker {
                ctx.print(
                    marker.longitude,
                    marker.latitude,
                    Span::styled(
                        "X",
                        Style::default()
                            .fg(Color::LightRed)
                            .add_modifier(Modifier::BOLD),
                    ),
                );
            }
            if let Some(cursor) = cursor {
                ctx.print(
                    cursor.longitude,
                    cursor.latitude,
                    Span::styled(
                        "+",
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });
    frame.render_widget(canvas, area);
    inner
}
