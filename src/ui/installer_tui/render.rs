use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use super::app::InstallerApp;
use super::widgets::{
    colored_gauge, log_color, progress_gauge, status_color, ACCENT, BASE_BG, TEXT, WINDOW_BG,
};
use crate::core::install::RunState;
use crate::ui::formatters::format_size_mb;

/// Extensions listed under the add prompt
const ACCEPTED_FILES: &str = "Installers (*.exe *.msi)  Archives (*.zip *.7z)  All files (*.*)";

/// Main render function
pub fn render_ui(frame: &mut Frame, app: &InstallerApp) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(WINDOW_BG).fg(TEXT)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Header
            Constraint::Percentage(40), // Queue
            Constraint::Length(3),      // Overall progress
            Constraint::Length(3),      // CPU / Memory / Disk
            Constraint::Min(6),         // Log
            Constraint::Length(1),      // Footer
        ])
        .split(area);

    render_header(frame, chunks[0], app);
    render_queue(frame, chunks[1], app);
    render_progress(frame, chunks[2], app);
    render_metrics(frame, chunks[3], app);
    render_log(frame, chunks[4], app);
    render_footer(frame, chunks[5], app);

    if app.input.is_some() {
        render_add_prompt(frame, area, app);
    }

    if let Some(notice) = &app.notice {
        render_notice(frame, area, notice);
    }

    if app.show_help {
        render_help_overlay(frame, area);
    }
}

fn panel(title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .style(Style::default().bg(BASE_BG).fg(TEXT))
}

fn render_header(frame: &mut Frame, area: Rect, app: &InstallerApp) {
    let (state, state_color) = match app.run_state {
        RunState::Running => ("Installing", Color::LightYellow),
        RunState::Idle => ("Idle", Color::LightGreen),
    };

    let line = Line::from(vec![
        Span::styled(
            " NullBatch Installer ",
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ Mode: "),
        Span::styled(app.mode.to_string(), Style::default().fg(ACCENT)),
        Span::raw(" │ State: "),
        Span::styled(state, Style::default().fg(state_color)),
        Span::raw(format!(" │ Log: {}", app.log_path.display())),
    ]);

    frame.render_widget(Paragraph::new(line).block(panel(String::new())), area);
}

fn render_queue(frame: &mut Frame, area: Rect, app: &InstallerApp) {
    let block = panel(format!(" Installation Queue ({}) ", app.records.len()));

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let header = Row::new(vec![
        Cell::from("Name").style(bold),
        Cell::from("Status").style(bold),
        Cell::from("Progress").style(bold),
        Cell::from("Size").style(bold),
    ])
    .height(1);

    let rows: Vec<Row> = app
        .records
        .iter()
        .map(|record| {
            Row::new(vec![
                Cell::from(record.name()),
                Cell::from(record.status.label())
                    .style(Style::default().fg(status_color(record.status))),
                Cell::from(record.progress.clone()),
                Cell::from(format_size_mb(record.size_bytes)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(50),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().bg(ACCENT).add_modifier(Modifier::BOLD));

    let mut state = TableState::default();
    if !app.records.is_empty() {
        state.select(Some(app.selected.min(app.records.len() - 1)));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_progress(frame: &mut Frame, area: Rect, app: &InstallerApp) {
    let block = panel(" Overall Progress ".to_string());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label = format!("{}%", app.progress);
    frame.render_widget(progress_gauge(app.progress, &label), inner);
}

fn render_metrics(frame: &mut Frame, area: Rect, app: &InstallerApp) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let meters = [
        (" CPU ", app.metrics.cpu),
        (" Memory ", app.metrics.memory),
        (" Disk ", app.metrics.disk),
    ];

    for ((title, value), column) in meters.iter().zip(columns.iter()) {
        let block = panel(title.to_string());
        let inner = block.inner(*column);
        frame.render_widget(block, *column);

        let label = format!("{:.1}%", value);
        frame.render_widget(colored_gauge(f64::from(*value), &label), inner);
    }
}

fn render_log(frame: &mut Frame, area: Rect, app: &InstallerApp) {
    let block = panel(" Installation Log ".to_string());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Newest lines at the bottom
    let visible = inner.height as usize;
    let skip = app.log.len().saturating_sub(visible);

    let lines: Vec<Line> = app
        .log
        .iter()
        .skip(skip)
        .map(|line| {
            Line::from(Span::styled(
                line.text.as_str(),
                Style::default().fg(log_color(line.level)),
            ))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &InstallerApp) {
    let enabled = Style::default().fg(TEXT);
    let disabled = Style::default().fg(Color::DarkGray);

    let start_style = if app.can_start() { enabled } else { disabled };
    let stop_style = if app.can_stop() { enabled } else { disabled };

    let footer = Line::from(vec![
        Span::styled(" a: Add ", enabled),
        Span::raw("│"),
        Span::styled(" s: Start ", start_style),
        Span::raw("│"),
        Span::styled(" x: Stop ", stop_style),
        Span::raw("│"),
        Span::styled(" c: Clear ", enabled),
        Span::raw("│"),
        Span::styled(" ?: Help ", enabled),
        Span::raw("│"),
        Span::styled(" q: Quit ", enabled),
    ]);

    frame.render_widget(
        Paragraph::new(footer).style(Style::default().bg(WINDOW_BG)),
        area,
    );
}

fn render_add_prompt(frame: &mut Frame, area: Rect, app: &InstallerApp) {
    let input = app.input.as_deref().unwrap_or_default();

    let text = vec![
        Line::from("Path to an installer, archive or folder (or drop files here):"),
        Line::from(""),
        Line::from(Span::styled(
            format!("> {}_", input),
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(ACCEPTED_FILES, Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            "Enter: add   Esc: cancel",
            Style::default().fg(Color::Gray),
        )),
    ];

    let popup = centered_rect(70, 40, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text)
            .block(panel(" Add Files ".to_string()))
            .wrap(Wrap { trim: false }),
        popup,
    );
}

fn render_notice(frame: &mut Frame, area: Rect, notice: &str) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            notice,
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to continue",
            Style::default().fg(Color::Gray),
        )),
    ];

    let block = Block::default()
        .title(" Warning ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::LightYellow))
        .style(Style::default().bg(BASE_BG));

    let popup = centered_rect(50, 25, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        popup,
    );
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_text = r#"
    NullBatch Installer - Help

    Keyboard Shortcuts:
    ─────────────────────────────────────
    a           Add an installer, archive or folder
    s           Start installing pending files
    x           Stop after the current installer
    c           Clear the list (not while installing)
    ↑/↓ k/j     Move the queue selection
    ? / h       Toggle this help screen
    q / Esc     Quit the application

    Files dropped onto the terminal are added too.

    Press any key to close this help
    "#;

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .style(Style::default().bg(BASE_BG).fg(TEXT));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left);

    // Center the help popup
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
