use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders};

use crate::model::{Action, Author, Entry};
use crate::plan::{DisplayRow, EntryFlags};

pub(super) fn render_view_chrome(
    frame: &mut ratatui::Frame,
    title: &str,
    subtitle: &str,
    area: Rect,
) -> Rect {
    let header = Line::from(vec![
        Span::styled(title.to_string(), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(subtitle.to_string(), Style::default().fg(Color::Gray)),
    ]);
    let outer = Block::default().borders(Borders::ALL).title(header);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);
    inner
}

fn action_color(action: Action) -> Color {
    match action {
        Action::Pick => Color::Green,
        Action::Reword => Color::Cyan,
        Action::Edit => Color::Magenta,
        Action::Squash | Action::Fixup => Color::Yellow,
        Action::Drop => Color::Red,
        _ => Color::Blue,
    }
}

fn body_text(entry: &Entry) -> String {
    if entry.is_commit() {
        return entry.message.clone();
    }
    entry.command_text.clone().unwrap_or_default()
}

/// One list line: selection mark, chain gutter, action, sha, text, author.
pub(super) fn row_line(
    row: &DisplayRow,
    flags: EntryFlags,
    author: Option<&Author>,
) -> Line<'static> {
    let entry = &row.entry;
    let mark = if flags.is_selected { "● " } else { "  " };

    if flags.is_base {
        return Line::from(vec![
            Span::raw(mark),
            Span::styled(
                format!("  onto   {} {}", entry.short_sha(), entry.message),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
    }

    let gutter = if flags.is_current {
        "▶ "
    } else if flags.is_squashing {
        "│ "
    } else if flags.is_squash_target {
        "┬ "
    } else {
        "  "
    };

    let mut action_style = Style::default().fg(action_color(entry.action));
    let mut text_style = Style::default();
    if flags.is_done {
        action_style = action_style.add_modifier(Modifier::DIM);
        text_style = text_style.add_modifier(Modifier::DIM);
    }
    if entry.action == Action::Drop {
        text_style = text_style.add_modifier(Modifier::CROSSED_OUT);
    }
    if flags.is_squash_target {
        text_style = text_style.add_modifier(Modifier::BOLD);
    }

    let mut spans = vec![
        Span::raw(mark),
        Span::styled(gutter, Style::default().fg(Color::Yellow)),
        Span::styled(format!("{:<7}", entry.action.as_str()), action_style),
    ];
    if entry.is_commit() {
        spans.push(Span::styled(
            format!("{} ", entry.short_sha()),
            Style::default().fg(Color::Gray),
        ));
    }
    spans.push(Span::styled(body_text(entry), text_style));
    if let Some(author) = author {
        spans.push(Span::styled(
            format!("  {}", author.name),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}
