use super::*;

const HELP: &str = "↑↓ move  ⇧↑↓ extend  space toggle  K/J shift  g to base  p r e s f d action  o order  / search  ⏎ start  c continue  S skip  w switch  q abort";

pub(super) fn draw(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(if app.mode == UiMode::Search { 3 } else { 0 }),
            Constraint::Length(2),
        ])
        .split(area);

    draw_plan(frame, app, chunks[0]);

    if app.mode == UiMode::Search {
        let input = Paragraph::new(app.input.buf.as_str())
            .block(Block::default().borders(Borders::ALL).title("Search"));
        frame.render_widget(input, chunks[1]);
        let x = chunks[1].x + 1 + app.input.cursor as u16;
        frame.set_cursor_position((x.min(chunks[1].right().saturating_sub(2)), chunks[1].y + 1));
    }

    draw_footer(frame, app, chunks[2]);

    if app.mode == UiMode::ConfirmAbort {
        draw_confirm(frame);
    }
}

fn draw_plan(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let provider = &app.provider;
    let state = provider.state();
    let order = if state.ascending {
        "oldest first"
    } else {
        "newest first"
    };
    let mut subtitle = format!(
        "{} entries  {}  {} selected",
        state.entries.len(),
        order,
        provider.selection().len()
    );
    if state.is_read_only() {
        subtitle.push_str("  [read-only]");
    }
    let inner = render_view_chrome(frame, &app.title, &subtitle, area);

    let items: Vec<ListItem> = provider
        .rows()
        .map(|(row, flags)| {
            let author = row
                .entry
                .sha
                .as_deref()
                .and_then(|sha| state.authors.get(sha));
            ListItem::new(row_line(row, flags, author))
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(provider.flags().iter().position(|f| f.is_focused));

    let list = List::new(items).highlight_style(Style::default().bg(Color::DarkGray));
    frame.render_stateful_widget(list, inner, &mut list_state);
}

fn draw_footer(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    match &app.notice {
        Some(n) => {
            let style = if n.is_error {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(Span::styled(n.text.as_str(), style)));
        }
        None => lines.push(Line::from("")),
    }
    lines.push(Line::from(Span::styled(HELP, Style::default().fg(Color::Gray))));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn draw_confirm(frame: &mut ratatui::Frame) {
    let area = frame.area();
    let w = area.width.saturating_sub(6).clamp(20, 48);
    let h = 5;
    let box_area = Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    };
    frame.render_widget(Clear, box_area);
    let block = Block::default().borders(Borders::ALL).title("Abort rebase?");
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from("The todo list will be emptied and git will abort."),
            Line::from(Span::styled("y: abort   n: keep editing", Style::default().fg(Color::Gray))),
        ])
        .wrap(Wrap { trim: true }),
        inner,
    );
}
