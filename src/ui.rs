use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use verbum_core::commentary::TabPurpose;
use verbum_core::words::word_separator;
use verbum_core::TABS;
use crate::app::{App, Picker};

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };
        if start > 0 {
            spans.push(Span::raw(rest[..start].to_string()));
        }
        if end > 0 {
            spans.push(Span::styled(
                after[..end].to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        rest = &after[end + 2..];
    }

    // No closing ** is left as literal text
    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [content_area, info_area] = Layout::horizontal([
        Constraint::Percentage(60),
        Constraint::Percentage(40),
    ])
    .areas(body_area);

    render_content(app, frame, content_area);
    render_info_box(app, frame, info_area);
    render_footer(app, frame, footer_area);

    if let Some(picker) = app.picker {
        render_picker(app, picker, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let current = app.nav.cursor().edition.as_deref();

    let mut spans = vec![Span::styled(" Verbum ", Style::default().fg(Color::Cyan).bold())];
    for edition in app.nav.catalog().all() {
        let style = if Some(edition.id.as_str()) == current {
            Style::default().fg(Color::Black).bg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", edition.short_label()), style));
    }

    spans.push(Span::raw("  ◀ "));
    spans.push(Span::styled(app.nav.title(), Style::default().fg(Color::White).bold()));
    spans.push(Span::raw(" ▶"));

    if app.nav.selection().is_continuous() {
        spans.push(Span::styled("  [continuous]", Style::default().fg(Color::Yellow)));
    }
    spans.push(Span::styled(
        format!("  v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::DarkGray),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_content(app: &mut App, frame: &mut Frame, area: Rect) {
    let title = app
        .nav
        .edition()
        .map(|e| format!(" {} · {} ", e.title, app.nav.title()))
        .unwrap_or_else(|| format!(" {} ", app.nav.title()));
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);

    let inner_area = block.inner(area);
    app.content_height = inner_area.height;

    if app.verses().is_empty() {
        let placeholder = Paragraph::new("Chapter not available in this edition")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let selection = app.nav.selection();
    let separator = word_separator(selection.is_continuous());
    let selected_verse = selection.current().selected_verse();

    let mut lines: Vec<Line> = Vec::new();
    let mut rows: Vec<(u16, u16)> = Vec::new();
    let mut row = 0u16;
    for (idx, verse) in app.verses().iter().enumerate() {
        let is_cursor = idx == app.verse_idx;
        let is_selected = selected_verse == Some(verse.verse);

        let verse_num_style = if is_cursor {
            Style::default().fg(Color::Black).bg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::Yellow).bold()
        };
        let base_style = if is_selected {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };

        // Verses carrying a note get a marker after the number
        let marker = if verse.notes.is_some() { "†" } else { "" };
        let mut spans = vec![
            Span::styled(format!("{}{}", verse.verse, marker), verse_num_style),
            Span::raw("  "),
        ];

        let words = app.words_of(verse);
        let last = words.len().saturating_sub(1);
        for (w, word) in words.iter().enumerate() {
            let mut style = base_style;
            if selection.highlights(word) {
                style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
            }
            if is_cursor && w == app.word_idx {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            spans.push(Span::styled(word.clone(), style));
            if w < last {
                spans.push(Span::styled(separator, base_style));
            }
        }

        let line = Line::from(spans);
        let height = Paragraph::new(line.clone())
            .wrap(Wrap { trim: true })
            .line_count(inner_area.width) as u16;
        rows.push((row, height));
        row += height + 1;

        lines.push(line);
        lines.push(Line::default()); // Empty line between verses
    }

    let total_lines = row;
    app.set_verse_rows(rows);
    app.scroll_to_focused_verse();

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.content_scroll, 0));

    frame.render_widget(paragraph, area);

    if total_lines > app.content_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state = ScrollbarState::new(total_lines as usize).position(app.content_scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(ratatui::layout::Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn render_info_box(app: &App, frame: &mut Frame, area: Rect) {
    let selection = app.nav.selection().current();
    let title = match TabPurpose::of(selection) {
        Some(TabPurpose::Word) => format!(" {} ", selection.word().unwrap_or_default()),
        Some(TabPurpose::Verse) => format!(" Verse {} ", selection.verse().unwrap_or_default()),
        None => " Commentary ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title);

    let tabs = app.available_tabs();
    if tabs.is_empty() {
        let placeholder = Paragraph::new("Enter selects a word, v selects a verse")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (n, &tab_id) in tabs.iter().enumerate() {
        let tab = &TABS[tab_id];
        let style = if tab_id == app.commentary.selected_tab() {
            Style::default().fg(Color::Black).bg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(format!(" {} {} {} ", n + 1, tab.icon, tab.title), style)));
    }
    lines.push(Line::default());

    if app.commentary.is_loading() {
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Loading{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    } else if let Some(error) = app.commentary.error() {
        lines.push(Line::from(Span::styled(
            format!("Commentary unavailable: {}", error),
            Style::default().fg(Color::Red),
        )));
    } else {
        for line in app.commentary.response().lines() {
            lines.push(parse_markdown_line(line));
        }
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.info_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let pairs: &[(&str, &str)] = if app.picker.is_some() {
        &[("j/k", "move"), ("Enter", "open"), ("Esc", "cancel")]
    } else {
        &[
            ("n/p", "chapter"),
            ("e", "edition"),
            ("b/c", "book/chapter"),
            ("h/j/k/l", "cursor"),
            ("Enter", "word"),
            ("v", "verse"),
            ("1-9", "tab"),
            ("s", "script"),
            ("q", "quit"),
        ]
    };

    let mut hints = vec![Span::styled(" READ ", Style::default().bg(Color::Blue).fg(Color::White))];
    for (key, label) in pairs {
        hints.push(Span::styled(format!(" {} ", key), key_style));
        hints.push(Span::styled(format!(" {} ", label), label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

fn render_picker(app: &mut App, picker: Picker, frame: &mut Frame, area: Rect) {
    let (title, items): (&str, Vec<ListItem>) = match picker {
        Picker::Book => (
            " Book (Enter to open, Esc to cancel) ",
            app.nav
                .books()
                .iter()
                .map(|b| {
                    let testament = b.testament.map(|t| t.label()).unwrap_or_default();
                    ListItem::new(Line::from(vec![
                        Span::raw(format!(" {} ", b.name)),
                        Span::styled(testament, Style::default().fg(Color::DarkGray)),
                    ]))
                })
                .collect(),
        ),
        Picker::Chapter => (
            " Chapter (Enter to open, Esc to cancel) ",
            app.nav
                .chapters()
                .iter()
                .map(|c| ListItem::new(format!(" {} ", c)))
                .collect(),
        ),
    };

    // Calculate popup size and position (centered)
    let popup_width = 44.min(area.width.saturating_sub(4));
    let popup_height = (items.len() as u16 + 2).min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.picker_state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_bold_spans() {
        let line = parse_markdown_line("The **Word** was with God");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "Word");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_unclosed_bold_is_literal() {
        let line = parse_markdown_line("a **b");
        assert_eq!(line.spans.len(), 1);
        assert_eq!(line.spans[0].content, "a **b");
    }
}
