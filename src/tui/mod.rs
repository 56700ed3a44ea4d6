//! Ratatui-based terminal UI.
//!
//! Shows the period table (with lock/edit markers) above a chart of every
//! metric, split into historical and forecast lines at today's period. The
//! consensus value of the editable period can be changed in place.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
};

use crate::app::pipeline::{self, ForecastView, RunOutput};
use crate::domain::{Boundary, EditClass, Granularity, Metric, RunConfig};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::{ChartLine, ForecastPlottersChart};

const EXPORT_PATH: &str = "dp-view.json";

/// Start the TUI.
pub fn run(config: RunConfig) -> Result<(), AppError> {
    let mut app = App::new(config)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: RunConfig,
    run: RunOutput,
    /// Column under the cursor.
    selected: usize,
    editing: bool,
    edit_input: String,
    /// Consensus edits by (granularity, label), re-applied after re-bucketing.
    edits: HashMap<(Granularity, String), Option<f64>>,
    status: String,
}

impl App {
    fn new(config: RunConfig) -> Result<Self, AppError> {
        // Fail before touching the terminal if the first load is impossible.
        let run = pipeline::run_view(&config)?;
        let selected = run.view.editable_index().unwrap_or(0);
        Ok(Self {
            config,
            run,
            selected,
            editing: false,
            edit_input: String::new(),
            edits: HashMap::new(),
            status: "Ready.".to_string(),
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing {
            self.handle_edit_key(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('g') => {
                self.config.granularity = self.config.granularity.toggle();
                self.reload();
            }
            KeyCode::Left => self.shift_window(false),
            KeyCode::Right => self.shift_window(true),
            KeyCode::Char('h') | KeyCode::BackTab => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('l') | KeyCode::Tab => {
                let last = self.run.view.labels.len().saturating_sub(1);
                self.selected = (self.selected + 1).min(last);
            }
            KeyCode::Char('e') => self.begin_edit(),
            KeyCode::Char('x') => self.export(),
            _ => {}
        }
        false
    }

    fn handle_edit_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = false;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = false;
                self.commit_edit();
            }
            KeyCode::Backspace => {
                self.edit_input.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => {
                self.edit_input.push(c);
            }
            _ => {}
        }
    }

    fn begin_edit(&mut self) {
        if let Err(err) = crate::periods::ensure_editable(&self.run.view.classes, self.selected) {
            self.status = format!("Edit rejected: {err}");
            return;
        }
        let current = self
            .run
            .view
            .row(&Metric::Consensus)
            .and_then(|r| r.values.get(self.selected).copied().flatten());
        self.edit_input = current.map(|v| v.to_string()).unwrap_or_default();
        self.editing = true;
        self.status = "Editing consensus. Enter to apply (empty = no data), Esc to cancel.".to_string();
    }

    fn commit_edit(&mut self) {
        let trimmed = self.edit_input.trim();
        let value = if trimmed.is_empty() || trimmed == "-" {
            None
        } else {
            match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => Some(v),
                _ => {
                    self.status = format!("Invalid value '{trimmed}'.");
                    return;
                }
            }
        };

        match self.run.view.apply_consensus_edit(self.selected, value) {
            Ok(()) => {
                let label = self.run.view.labels[self.selected].clone();
                self.status = format!("Consensus for {label} set to {}.", fmt_value(value));
                self.edits.insert((self.config.granularity, label), value);
            }
            Err(err) => self.status = format!("Edit rejected: {err}"),
        }
    }

    fn shift_window(&mut self, forward: bool) {
        let g = self.config.granularity;
        let step = |d: NaiveDate| {
            let anchor = g.period_start(d);
            if forward { g.advance(anchor) } else { g.retreat(anchor) }
        };
        match (step(self.config.start), step(self.config.end)) {
            (Some(start), Some(end)) => {
                self.config.start = start;
                self.config.end = end;
                self.reload();
            }
            _ => self.status = "Window cannot move further.".to_string(),
        }
    }

    fn reload(&mut self) {
        match pipeline::run_view(&self.config) {
            Ok(run) => {
                self.run = run;
                self.reapply_edits();
                self.selected = self
                    .run
                    .view
                    .editable_index()
                    .unwrap_or(0)
                    .min(self.run.view.labels.len().saturating_sub(1));
                let view = &self.run.view;
                self.status = match (view.labels.first(), view.labels.last()) {
                    (Some(first), Some(last)) => format!("{}: {first} .. {last}", view.granularity),
                    _ => format!("{}: no periods", view.granularity),
                };
            }
            Err(err) => self.status = format!("Reload failed: {err}"),
        }
    }

    fn reapply_edits(&mut self) {
        let granularity = self.config.granularity;
        for ((g, label), value) in &self.edits {
            if *g != granularity {
                continue;
            }
            let Some(idx) = self.run.view.labels.iter().position(|l| l == label) else {
                continue;
            };
            // The period may have become locked since the edit; drop it then.
            if self.run.view.apply_consensus_edit(idx, *value).is_err() {
                tracing::debug!(%label, "discarding edit on a locked period");
            }
        }
    }

    fn export(&mut self) {
        let path = self
            .config
            .export_json
            .clone()
            .unwrap_or_else(|| PathBuf::from(EXPORT_PATH));
        self.status = match crate::io::export::write_view_json(&path, &self.run.view) {
            Ok(()) => format!("Wrote {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let table_height = (self.run.view.rows.len() as u16).saturating_add(4);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(table_height),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_table(frame, chunks[1]);
        self.draw_chart(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let view = &self.run.view;
        let boundary = match view.boundary {
            Boundary::At(idx) => format!("{idx} ({})", view.labels[idx]),
            Boundary::BeforeStart => "-1 (all future)".to_string(),
        };
        let editable = view
            .editable_index()
            .map(|i| view.labels[i].clone())
            .unwrap_or_else(|| "none".to_string());

        let lines = vec![
            Line::from(vec![
                Span::styled("dp", Style::default().fg(Color::Cyan)),
                Span::raw(" - demand planning periods"),
            ]),
            Line::from(Span::styled(
                format!(
                    "granularity: {} | today: {} | boundary: {boundary} | editable: {editable}",
                    view.granularity, view.today
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let view = &self.run.view;

        let header = Row::new(
            std::iter::once(Cell::from("Metric")).chain(view.labels.iter().zip(&view.classes).enumerate().map(
                |(i, (label, class))| {
                    let mut style = class_style(*class);
                    if i == self.selected {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    Cell::from(format!("{}{label}", class_glyph(*class))).style(style)
                },
            )),
        );

        let rows = view.rows.iter().map(|row| {
            let cells = row.values.iter().enumerate().map(|(i, v)| {
                let text = if self.editing && row.metric.is_consensus() && i == self.selected {
                    format!("{}_", self.edit_input)
                } else {
                    fmt_value(*v)
                };
                let mut style = Style::default();
                if view.boundary.is_historical(i) {
                    style = style.fg(Color::Gray);
                }
                if i == self.selected {
                    style = style.add_modifier(Modifier::BOLD);
                }
                Cell::from(text).style(style)
            });
            Row::new(std::iter::once(Cell::from(row.metric.display_name().to_string())).chain(cells))
        });

        let widths = std::iter::once(Constraint::Length(18))
            .chain(view.labels.iter().map(|_| Constraint::Length(9)))
            .collect::<Vec<_>>();

        let table = Table::new(rows, widths)
            .header(header.style(Style::default().add_modifier(Modifier::BOLD)))
            .block(Block::default().title("Periods").borders(Borders::ALL));
        frame.render_widget(table, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Demand").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let data = chart_data(&self.run.view);
        if data.lines.is_empty() {
            let msg = Paragraph::new("No values in this window.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        let widget = ForecastPlottersChart {
            lines: &data.lines,
            boundary_x: data.boundary_x,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            labels: &self.run.view.labels,
            y_label: "demand",
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "g granularity  ←/→ window  h/l select  e edit  x export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn class_style(class: EditClass) -> Style {
    match class {
        EditClass::Past => Style::default().fg(Color::DarkGray),
        EditClass::Current => Style::default().fg(Color::Yellow),
        EditClass::Editable => Style::default().fg(Color::Green),
        EditClass::Future => Style::default(),
    }
}

fn class_glyph(class: EditClass) -> &'static str {
    if class.is_locked() {
        "🔒"
    } else if class == EditClass::Editable {
        "✎"
    } else {
        ""
    }
}

fn fmt_value(v: Option<f64>) -> String {
    match v {
        Some(v) if v.fract() == 0.0 => format!("{v:.0}"),
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

/// Chart input derived from a view.
#[derive(Debug, Clone, PartialEq)]
struct ChartData {
    lines: Vec<ChartLine>,
    boundary_x: Option<f64>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_data(view: &ForecastView) -> ChartData {
    let mut lines = Vec::new();
    for row in &view.rows {
        let (solid, faded) = metric_colors(&row.metric);
        for points in runs(&row.series.historical) {
            lines.push(ChartLine { points, color: solid });
        }
        for points in runs(&row.series.forecast) {
            lines.push(ChartLine { points, color: faded });
        }
    }

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in lines.iter().flat_map(|l| l.points.iter()) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    } else if y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    let x_max = (view.labels.len() as f64 - 1.0).max(1.0);
    let boundary_x = match view.boundary {
        Boundary::At(idx) => Some(idx as f64),
        Boundary::BeforeStart => None,
    };

    ChartData {
        lines,
        boundary_x,
        x_bounds: [0.0, x_max],
        y_bounds: [y_min - pad, y_max + pad],
    }
}

/// Split a series into gap-free runs of `(index, value)`.
fn runs(series: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (i, v) in series.iter().enumerate() {
        match v {
            Some(v) => current.push((i as f64, *v)),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Historical color and the dimmer forecast color of a metric.
fn metric_colors(metric: &Metric) -> (RGBColor, RGBColor) {
    match metric {
        Metric::Actual => (RGBColor(255, 255, 255), RGBColor(128, 128, 128)),
        Metric::BaselineForecast => (RGBColor(0, 255, 255), RGBColor(0, 128, 128)),
        Metric::MlForecast => (RGBColor(255, 0, 255), RGBColor(128, 0, 128)),
        Metric::Consensus => (RGBColor(0, 255, 0), RGBColor(0, 128, 0)),
        Metric::Other(_) => (RGBColor(255, 165, 0), RGBColor(128, 83, 0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StitchedSeries;

    #[test]
    fn runs_split_on_gaps() {
        let series = [Some(1.0), Some(2.0), None, Some(4.0), None, None];
        assert_eq!(runs(&series), vec![vec![(0.0, 1.0), (1.0, 2.0)], vec![(3.0, 4.0)]]);
        assert!(runs(&[None, None]).is_empty());
    }

    #[test]
    fn chart_data_uses_faded_color_for_forecast() {
        let values = vec![Some(10.0), Some(20.0), Some(30.0)];
        let boundary = Boundary::At(0);
        let series: StitchedSeries = crate::periods::split_historical_future(&values, boundary);
        let view = ForecastView {
            granularity: Granularity::Weekly,
            today: chrono::NaiveDate::from_ymd_opt(2024, 12, 30).unwrap(),
            labels: vec!["2025-W01".into(), "2025-W02".into(), "2025-W03".into()],
            anchors: Vec::new(),
            boundary_index: 0,
            boundary,
            classes: crate::periods::classify(&["a", "b", "c"], boundary),
            rows: vec![crate::app::pipeline::MetricRow {
                metric: Metric::Actual,
                values,
                series,
            }],
        };

        let data = chart_data(&view);
        assert_eq!(data.boundary_x, Some(0.0));
        assert_eq!(data.x_bounds, [0.0, 2.0]);
        assert_eq!(data.lines.len(), 2);
        assert_eq!(data.lines[0].points, vec![(0.0, 10.0)]);
        assert_eq!(data.lines[1].points, vec![(0.0, 10.0), (1.0, 20.0), (2.0, 30.0)]);
        assert_eq!(data.lines[1].color, RGBColor(128, 128, 128));
        assert!((data.y_bounds[0] - 9.0).abs() < 1e-9);
        assert!((data.y_bounds[1] - 31.0).abs() < 1e-9);
    }
}
