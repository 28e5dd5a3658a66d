use anyhow::Result;
use chrono::Local;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use jobtrack::analytics::{self, DashboardSummary};
use jobtrack::{Job, JobQuery, JobStatus, KeyValueStore, Snapshot, StatusFilter, Tracker};

struct AppState {
    snapshot: Snapshot,
    query: JobQuery,
    view: Vec<Job>,
    summary: DashboardSummary,
    selected: usize,
    scroll_offset: u16,
    searching: bool,
    message: Option<String>,
}

impl AppState {
    fn new(query: JobQuery) -> Self {
        Self {
            snapshot: Snapshot::default(),
            query,
            view: Vec::new(),
            summary: DashboardSummary::default(),
            selected: 0,
            scroll_offset: 0,
            searching: false,
            message: None,
        }
    }

    /// Re-read everything from the store and recompute.
    fn reload<K: KeyValueStore>(&mut self, tracker: &Tracker<K>) {
        self.snapshot = tracker.snapshot();
        self.summary = analytics::dashboard_summary(&self.snapshot.jobs, &self.snapshot.interviews);
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        let keep = self.current_job().map(|j| j.id.clone());
        self.view = self.query.apply(&self.snapshot.jobs);
        self.selected = keep
            .and_then(|id| self.view.iter().position(|j| j.id == id))
            .unwrap_or(self.selected)
            .min(self.view.len().saturating_sub(1));
    }

    fn current_job(&self) -> Option<&Job> {
        self.view.get(self.selected)
    }

    fn next(&mut self) {
        if !self.view.is_empty() && self.selected < self.view.len() - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }

    fn set_status<K: KeyValueStore>(&mut self, tracker: &Tracker<K>, status: JobStatus) {
        let Some(job) = self.current_job() else { return };
        let mut job = job.clone();
        job.status = status;
        self.message = Some(match tracker.save_job(job) {
            Ok(saved) => format!("{} at {} -> {}", saved.position, saved.company, status.label()),
            Err(e) => format!("save failed: {}", e),
        });
        self.reload(tracker);
    }

    fn delete_current<K: KeyValueStore>(&mut self, tracker: &Tracker<K>) {
        let Some(job) = self.current_job() else { return };
        let id = job.id.clone();
        self.message = Some(match tracker.delete_job(&id) {
            Ok(outcome) => format!(
                "deleted job and {} interview(s)",
                outcome.interviews_removed
            ),
            Err(e) => format!("delete failed: {}", e),
        });
        self.reload(tracker);
    }
}

fn next_filter(filter: StatusFilter) -> StatusFilter {
    match filter {
        StatusFilter::All => StatusFilter::Only(JobStatus::ALL[0]),
        StatusFilter::Only(status) => {
            let idx = JobStatus::ALL.iter().position(|s| *s == status).unwrap_or(0);
            JobStatus::ALL
                .get(idx + 1)
                .copied()
                .map_or(StatusFilter::All, StatusFilter::Only)
        }
    }
}

fn filter_label(filter: StatusFilter) -> &'static str {
    match filter {
        StatusFilter::All => "All",
        StatusFilter::Only(status) => status.label(),
    }
}

fn status_style(status: JobStatus) -> Style {
    match status {
        JobStatus::Applied => Style::default().fg(Color::Blue),
        JobStatus::Screening => Style::default().fg(Color::Yellow),
        JobStatus::Interview => Style::default().fg(Color::Magenta),
        JobStatus::Technical => Style::default().fg(Color::LightRed),
        JobStatus::Final => Style::default().fg(Color::LightBlue),
        JobStatus::Offer => Style::default().fg(Color::Green),
        JobStatus::Rejected => Style::default().fg(Color::Red),
        JobStatus::Withdrawn => Style::default().fg(Color::DarkGray),
    }
}

pub fn run_browse<K: KeyValueStore>(tracker: &Tracker<K>, query: JobQuery) -> Result<()> {
    let mut state = AppState::new(query);
    state.reload(tracker);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, tracker);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop<K: KeyValueStore>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    tracker: &Tracker<K>,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        list_state.select(if state.view.is_empty() {
            None
        } else {
            Some(state.selected)
        });
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if state.searching {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => state.searching = false,
                KeyCode::Backspace => {
                    state.query.search.pop();
                    state.refresh_view();
                }
                KeyCode::Char(c) => {
                    state.query.search.push(c);
                    state.refresh_view();
                }
                _ => {}
            }
            continue;
        }

        state.message = None;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Down | KeyCode::Char('j') => state.next(),
            KeyCode::Up | KeyCode::Char('k') => state.prev(),
            KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
            KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
            KeyCode::Char('/') => state.searching = true,
            KeyCode::Char('s') => {
                state.query.sort = state.query.sort.next();
                state.refresh_view();
            }
            KeyCode::Char('r') => {
                state.query.direction = state.query.direction.toggle();
                state.refresh_view();
            }
            KeyCode::Char('f') => {
                state.query.status = next_filter(state.query.status);
                state.refresh_view();
            }
            KeyCode::Char('g') => state.reload(tracker),
            KeyCode::Char('D') => state.delete_current(tracker),
            KeyCode::Char(c @ '1'..='8') => {
                let idx = (c as u8 - b'1') as usize;
                state.set_status(tracker, JobStatus::ALL[idx]);
            }
            _ => {}
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    // Summary bar
    let s = &state.summary;
    let summary = Paragraph::new(format!(
        " Total {}   Active {}   Scheduled interviews {}   Offers {}   Rejected {}   Response {}%",
        s.total, s.active, s.interviews, s.offers, s.rejections, s.response_rate
    ))
    .block(Block::default().borders(Borders::ALL).title(" Dashboard "));
    frame.render_widget(summary, rows[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);

    // Left panel: job list
    let items: Vec<ListItem> = state
        .view
        .iter()
        .map(|job| {
            let position = if job.position.chars().count() > 28 {
                format!("{}...", job.position.chars().take(25).collect::<String>())
            } else {
                job.position.clone()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<12}", job.status.label()), status_style(job.status)),
                Span::raw(format!("{} | {}", position, job.company)),
            ]))
        })
        .collect();

    let search = if state.searching {
        format!(" /{}_", state.query.search)
    } else if state.query.search.is_empty() {
        String::new()
    } else {
        format!(" /{}", state.query.search)
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Jobs ({}/{}) [{}] {} {}{} ",
            state.view.len(),
            state.snapshot.jobs.len(),
            filter_label(state.query.status),
            state.query.sort.label(),
            state.query.direction.arrow(),
            search
        )))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    // Right panel: job detail
    let detail = build_detail(state);
    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));

    frame.render_widget(detail_widget, chunks[1]);

    // Footer help
    let footer = match &state.message {
        Some(message) => format!(" {}", message),
        None => concat!(
            " j/k:move J/K:scroll /:search f:filter s:sort r:reverse",
            " 1-8:status D:delete g:reload q:quit"
        )
        .to_string(),
    };
    let help = Paragraph::new(footer).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, rows[2]);
}

fn build_detail(state: &AppState) -> Text<'_> {
    let Some(job) = state.current_job() else {
        return Text::raw(if state.snapshot.jobs.is_empty() {
            "No applications yet. Add one with `jobtrack job add`."
        } else {
            "No jobs match the current filter."
        });
    };

    let mut lines: Vec<Line> = Vec::new();

    // Header
    lines.push(Line::from(Span::styled(
        job.position.as_str(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("at {}", job.company)));
    lines.push(Line::from(Span::styled(
        format!("Status: {}", job.status.label()),
        status_style(job.status),
    )));
    lines.push(Line::from(format!("Applied: {}", job.applied_date.format("%b %-d, %Y"))));

    if let Some(location) = &job.location {
        lines.push(Line::from(format!("Location: {}", location)));
    }
    if let Some(salary) = &job.salary {
        lines.push(Line::from(format!("Salary: {}", salary)));
    }
    if let Some(url) = &job.url {
        lines.push(Line::from(format!("URL: {}", url)));
    }
    match (&job.contact_person, &job.contact_email) {
        (Some(name), Some(email)) => {
            lines.push(Line::from(format!("Contact: {} <{}>", name, email)))
        }
        (Some(name), None) => lines.push(Line::from(format!("Contact: {}", name))),
        (None, Some(email)) => lines.push(Line::from(format!("Contact: {}", email))),
        (None, None) => {}
    }

    lines.push(Line::from(""));

    // Interviews
    let mut interviews: Vec<_> = state
        .snapshot
        .interviews
        .iter()
        .filter(|i| i.job_id == job.id)
        .collect();
    interviews.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));

    if interviews.is_empty() {
        lines.push(Line::from(Span::styled(
            "(No interviews)",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!("Interviews ({})", interviews.len()),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        let today = Local::now().date_naive();
        for interview in interviews {
            let marker = if interview.date >= today { "*" } else { " " };
            let mut line = format!(
                "  {} {} {} {:<9} {}",
                marker,
                interview.date.format("%b %-d, %Y"),
                interview.time.format("%H:%M"),
                interview.kind,
                interview.status
            );
            if let Some(who) = &interview.interviewer {
                line.push_str(&format!(" with {}", who));
            }
            lines.push(Line::from(line));
            if let Some(feedback) = &interview.feedback {
                for wrapped in textwrap::fill(feedback, 60).lines() {
                    lines.push(Line::from(format!("      {}", wrapped)));
                }
            }
        }
    }

    lines.push(Line::from(""));

    if let Some(notes) = &job.notes {
        lines.push(Line::from(Span::styled(
            "Notes",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for line in textwrap::fill(notes, 70).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
        lines.push(Line::from(""));
    }

    if let Some(description) = &job.description {
        lines.push(Line::from(Span::styled(
            "Description",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for line in description.lines() {
            lines.push(Line::from(line.to_string()));
        }
    }

    Text::from(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_filter_cycles_through_all_statuses() {
        let mut filter = StatusFilter::All;
        let mut seen = Vec::new();
        for _ in 0..JobStatus::ALL.len() {
            filter = next_filter(filter);
            seen.push(filter);
        }
        assert_eq!(seen.first(), Some(&StatusFilter::Only(JobStatus::Applied)));
        assert_eq!(seen.last(), Some(&StatusFilter::Only(JobStatus::Withdrawn)));
        assert_eq!(next_filter(filter), StatusFilter::All);
    }

    #[test]
    fn test_status_change_reloads_view() {
        let tracker = Tracker::new(jobtrack::MemoryKv::new());
        let job = jobtrack::draft::JobDraft {
            company: Some("Acme".to_string()),
            position: Some("Engineer".to_string()),
            ..Default::default()
        }
        .into_job(None, Local::now().date_naive(), chrono::Utc::now())
        .unwrap();
        tracker.save_job(job).unwrap();

        let mut state = AppState::new(JobQuery::new());
        state.reload(&tracker);
        assert_eq!(state.summary.total, 1);
        assert_eq!(state.summary.offers, 0);

        state.set_status(&tracker, JobStatus::Offer);
        assert_eq!(state.summary.offers, 1);
        assert_eq!(tracker.jobs()[0].status, JobStatus::Offer);

        state.delete_current(&tracker);
        assert!(state.view.is_empty());
        assert_eq!(state.summary.total, 0);
    }
}
