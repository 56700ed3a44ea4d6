//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - historical segments: `-`
//! - forecast segments: `.`
//! - data points: the metric glyph (`A`, `B`, `M`, `C`, `o`)
//! - today's period: a `|` column

use crate::app::pipeline::{ForecastView, MetricRow};
use crate::domain::{Boundary, Metric};

/// Render every metric with at least one value.
pub fn render_ascii_chart(view: &ForecastView, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let n = view.labels.len();

    let rows: Vec<&MetricRow> = view
        .rows
        .iter()
        .filter(|r| r.values.iter().any(Option::is_some))
        .collect();

    let (y_min, y_max) = y_range(&rows).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    if let Boundary::At(idx) = view.boundary {
        let x = map_x(idx, n, width);
        for row in grid.iter_mut() {
            row[x] = '|';
        }
    }

    // Segments first so points can overlay.
    for row in &rows {
        draw_series(&mut grid, &row.series.historical, '-', n, y_min, y_max);
        draw_series(&mut grid, &row.series.forecast, '.', n, y_min, y_max);
    }
    for row in &rows {
        let glyph = glyph(&row.metric);
        for series in [&row.series.historical, &row.series.forecast] {
            for (i, v) in series.iter().enumerate() {
                if let Some(v) = v {
                    grid[map_y(*v, y_min, y_max, height)][map_x(i, n, width)] = glyph;
                }
            }
        }
    }

    let mut out = String::new();
    match (view.labels.first(), view.labels.last()) {
        (Some(first), Some(last)) => out.push_str(&format!(
            "Chart: {first} .. {last} | y=[{y_min:.2}, {y_max:.2}]\n"
        )),
        _ => out.push_str("Chart: (no periods)\n"),
    }

    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    let legend: Vec<String> = rows
        .iter()
        .map(|r| format!("{}={}", glyph(&r.metric), r.metric))
        .collect();
    if !legend.is_empty() {
        out.push_str(&legend.join(" "));
        out.push('\n');
    }

    out
}

fn glyph(metric: &Metric) -> char {
    match metric {
        Metric::Actual => 'A',
        Metric::BaselineForecast => 'B',
        Metric::MlForecast => 'M',
        Metric::Consensus => 'C',
        Metric::Other(_) => 'o',
    }
}

fn draw_series(grid: &mut [Vec<char>], series: &[Option<f64>], ch: char, n: usize, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();
    for (i, pair) in series.windows(2).enumerate() {
        if let [Some(a), Some(b)] = pair {
            let (x0, y0) = (map_x(i, n, width), map_y(*a, y_min, y_max, height));
            let (x1, y1) = (map_x(i + 1, n, width), map_y(*b, y_min, y_max, height));
            draw_line(grid, x0, y0, x1, y1, ch);
        }
    }
}

fn y_range(rows: &[&MetricRow]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for v in rows.iter().flat_map(|r| r.values.iter().flatten()) {
        min_y = min_y.min(*v);
        max_y = max_y.max(*v);
    }

    if !(min_y.is_finite() && max_y.is_finite()) {
        None
    } else if max_y > min_y {
        Some((min_y, max_y))
    } else {
        Some((min_y - 1.0, max_y + 1.0))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(i: usize, n: usize, width: usize) -> usize {
    if n < 2 {
        return 0;
    }
    let u = (i as f64 / (n as f64 - 1.0)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
