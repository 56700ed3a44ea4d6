//! Plotters-powered forecast chart widget for Ratatui.
//!
//! Plotters output is rendered into the Ratatui buffer through
//! `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// One contiguous run of points of one metric, historical or forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLine {
    /// `(period index, value)` pairs without gaps.
    pub points: Vec<(f64, f64)>,
    pub color: RGBColor,
}

/// A render-only chart description.
///
/// All series and bounds are computed outside the render call, so `render()`
/// only draws.
pub struct ForecastPlottersChart<'a> {
    pub lines: &'a [ChartLine],
    /// X position of today's period, if it is in the sequence.
    pub boundary_x: Option<f64>,
    /// X bounds (period index).
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// Period labels used for x tick text.
    pub labels: &'a [String],
    pub y_label: &'a str,
}

impl<'a> Widget for ForecastPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out very small areas.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let labels = self.labels;
        let fmt_x = move |v: &f64| {
            let idx = v.round();
            if (v - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        };

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.y_label)
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&fmt_x)
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            if let Some(x) = self.boundary_x {
                chart.draw_series(LineSeries::new([(x, y0), (x, y1)], &YELLOW))?;
            }

            for line in self.lines {
                if line.points.len() == 1 {
                    // A lone value has no segment; show it as a dot.
                    chart.draw_series(line.points.iter().map(|&p| Pixel::new(p, line.color)))?;
                } else {
                    chart.draw_series(LineSeries::new(line.points.iter().copied(), &line.color))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
