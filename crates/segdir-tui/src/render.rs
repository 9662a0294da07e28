//! Pure render functions: read `AppState`, draw to a frame, mutate nothing.
//!
//! Active styling of marks and panels derives from the directory's active
//! index, never from the segments' own flags.

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use segdir_core::directory::{DirectoryState, MARK_PADDING};
use unicode_width::UnicodeWidthChar;

use crate::common::Scrollbar;
use crate::common::text::{truncate_with_ellipsis, wrap_lines};
use crate::layout::{DirectoryLayout, PANEL_BORDER};
use crate::state::AppState;

const ACTIVE_COLOR: Color = Color::Cyan;
const MUTED_COLOR: Color = Color::DarkGray;

fn active_mark_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(ACTIVE_COLOR)
        .add_modifier(Modifier::BOLD)
}

pub fn render(app: &AppState, frame: &mut Frame) {
    let layout = DirectoryLayout::new(frame.area());
    let directory = &app.directory;

    let title = Line::from(vec![
        Span::styled(app.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {} segments", directory.len()),
            Style::default().fg(MUTED_COLOR),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), layout.title);

    if directory.is_empty() {
        frame.render_widget(
            Paragraph::new("No segments to show")
                .alignment(Alignment::Center)
                .style(Style::default().fg(MUTED_COLOR)),
            layout.segments,
        );
        return;
    }

    frame.render_widget(
        Paragraph::new(strip_line(directory, usize::from(layout.marks.width))),
        layout.marks,
    );
    frame.render_widget(
        Paragraph::new("─".repeat(usize::from(layout.rule.width)))
            .style(Style::default().fg(MUTED_COLOR)),
        layout.rule,
    );

    render_panels(app, layout.segments, frame.buffer_mut());

    let (offset_x, _) = directory.segments_offset();
    frame.render_widget(
        Scrollbar::new(
            directory.panels().len(),
            usize::from(layout.segments.width),
            offset_x,
        )
        .thumb_style(Style::default().fg(ACTIVE_COLOR))
        .track_style(Style::default().fg(MUTED_COLOR)),
        layout.scrollbar,
    );

    let status = truncate_with_ellipsis(&app.status_text(), usize::from(layout.status.width));
    frame.render_widget(
        Paragraph::new(status).style(Style::default().fg(MUTED_COLOR)),
        layout.status,
    );
}

/// Visible slice of the marks strip, `width` columns starting at the
/// strip's scroll offset.
pub fn strip_line(directory: &DirectoryState, width: usize) -> Line<'static> {
    let offset = directory.marks_offset();
    let view_end = offset + width;
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut cursor = offset;

    for (index, span) in directory.strip().spans().iter().enumerate() {
        if span.end() <= offset {
            continue;
        }
        if span.start >= view_end {
            break;
        }
        if span.start > cursor {
            spans.push(Span::raw(" ".repeat(span.start - cursor)));
            cursor = span.start;
        }

        let pad = " ".repeat(MARK_PADDING);
        let label = format!("{pad}{}{pad}", directory.marks()[index]);
        let visible = clip_columns(&label, cursor - span.start, view_end.min(span.end()) - cursor);
        cursor += visible.1;

        let style = if directory.is_active(index) {
            active_mark_style()
        } else {
            Style::default()
        };
        spans.push(Span::styled(visible.0, style));
    }

    Line::from(spans)
}

/// Cuts `[skip, skip + take)` columns out of `text`. Wide characters split
/// by either edge become spaces. Returns the text and its width.
fn clip_columns(text: &str, skip: usize, take: usize) -> (String, usize) {
    let mut out = String::new();
    let mut col = 0;
    let end = skip + take;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        let (start, stop) = (col, col + w);
        col = stop;
        if stop <= skip || w == 0 {
            continue;
        }
        if start >= end {
            break;
        }
        if start < skip || stop > end {
            let cells = stop.min(end) - start.max(skip);
            out.push_str(&" ".repeat(cells));
        } else {
            out.push(ch);
        }
    }
    (out, take)
}

/// Draws every panel that intersects the segment viewport. Each panel is
/// rendered into its own buffer, then the visible columns are copied over,
/// so panels cut by either edge still draw correctly.
fn render_panels(app: &AppState, area: Rect, buf: &mut Buffer) {
    let directory = &app.directory;
    let (offset_x, offset_y) = directory.segments_offset();
    let width = directory.options().panel_width(usize::from(area.width));
    if width == 0 || area.height == 0 {
        return;
    }
    let view_end = offset_x + usize::from(area.width);
    let text_width = width.saturating_sub(usize::from(PANEL_BORDER * 2));

    for (index, span) in directory.panels().spans().iter().enumerate() {
        if span.end() <= offset_x || span.start >= view_end {
            continue;
        }

        let panel_area = Rect::new(0, 0, width as u16, area.height);
        let mut scratch = Buffer::empty(panel_area);
        let active = directory.is_active(index);
        let border = if active {
            Style::default().fg(ACTIVE_COLOR)
        } else {
            Style::default().fg(MUTED_COLOR)
        };
        let block = Block::bordered()
            .border_style(border)
            .title(Line::from(format!(" {} ", directory.marks()[index])));

        let lines: Vec<Line<'static>> = wrap_lines(&app.bodies[index], text_width)
            .into_iter()
            .map(Line::from)
            .collect();
        Paragraph::new(lines)
            .block(block)
            .scroll((offset_y as u16, 0))
            .render(panel_area, &mut scratch);

        let first = span.start.max(offset_x);
        let last = span.end().min(view_end);
        for col in first..last {
            let src_x = (col - span.start) as u16;
            let dst_x = area.x + (col - offset_x) as u16;
            for row in 0..area.height {
                buf[(dst_x, area.y + row)] = scratch[(src_x, row)].clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use segdir_core::SegmentHandle;
    use segdir_core::directory::{DirectoryEvent, DirectoryOptions, update};

    use super::*;
    use crate::layout::measure;

    fn app(marks: &[&str]) -> AppState {
        let segments: Vec<_> = marks
            .iter()
            .map(|m| Arc::new(SegmentHandle::new(*m).with_body(format!("body of {m}"))))
            .collect();
        AppState::mount(DirectoryOptions::default(), "test", &segments).0
    }

    fn lay_out(app: &mut AppState, width: u16, height: u16) {
        let layout = DirectoryLayout::new(Rect::new(0, 0, width, height));
        let metrics = measure(&layout, app);
        update(&mut app.directory, DirectoryEvent::Layout(metrics));
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_strip_line_styles_active_mark() {
        let mut app = app(&["A", "B"]);
        lay_out(&mut app, 40, 12);
        let line = strip_line(&app.directory, 20);
        assert_eq!(line_text(&line), " A   B ");
        assert_eq!(line.spans[0].style, active_mark_style());
        assert_eq!(line.spans[2].style, Style::default());
    }

    #[test]
    fn test_strip_line_clips_to_width() {
        let mut app = app(&["alpha", "beta", "gamma"]);
        lay_out(&mut app, 40, 12);
        // " alpha " is 7 wide, then a gap, then " beta " from 8.
        let line = strip_line(&app.directory, 10);
        assert_eq!(line_text(&line), " alpha   b");
    }

    #[test]
    fn test_clip_columns_replaces_split_wide_chars() {
        assert_eq!(clip_columns("a中b", 2, 2), (" b".to_string(), 2));
        assert_eq!(clip_columns("a中b", 0, 2), ("a ".to_string(), 2));
    }

    #[test]
    fn test_render_draws_marks_and_active_panel() {
        let mut app = app(&["A", "B", "C"]);
        lay_out(&mut app, 30, 10);

        let backend = TestBackend::new(30, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(&app, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let row = |y: u16| -> String { (0..30).map(|x| buffer[(x, y)].symbol().to_string()).collect() };
        assert!(row(0).contains("test"));
        assert!(row(1).starts_with("  A   B   C "));
        assert!(row(3).contains(" A "));
        assert!(row(4).contains("body of A"));
    }

    #[test]
    fn test_render_empty_directory() {
        let app = app(&[]);
        let backend = TestBackend::new(30, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(&app, frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let text: String = (0..10)
            .flat_map(|y| (0..30).map(move |x| (x, y)))
            .map(|pos| buffer[pos].symbol().to_string())
            .collect();
        assert!(text.contains("No segments to show"));
    }
}
