use plotters::prelude::*;

use crate::error::Error;

const CHART_WIDTH: u32 = 640;
const CHART_HEIGHT: u32 = 400;

/// Renders one vertical bar chart to an SVG string.
///
/// The x axis carries one segment per label; bars are drawn only for the first
/// `values.len()` segments, so a trailing label without a data point renders
/// as an empty segment.
pub fn bar_chart(
    title: &str,
    labels: &[String],
    values: &[f64],
    color: RGBColor,
) -> Result<String, Error> {
    let mut svg = String::new();

    {
        let root = SVGBackend::with_string(&mut svg, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE).map_err(to_chart_error)?;

        let segments = labels.len().max(1) as i32;
        let y_max = values.iter().cloned().fold(0.0f64, f64::max).max(1.0) * 1.1;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 20).into_font())
            .margin(5)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(0..segments, 0f64..y_max)
            .map_err(to_chart_error)?;

        chart
            .configure_mesh()
            .x_labels(segments as usize)
            .x_label_formatter(&|segment: &i32| {
                labels.get(*segment as usize).cloned().unwrap_or_default()
            })
            .draw()
            .map_err(to_chart_error)?;

        chart
            .draw_series(values.iter().enumerate().map(|(segment, value)| {
                Rectangle::new(
                    [(segment as i32, 0.0), (segment as i32 + 1, *value)],
                    color.mix(0.7).filled(),
                )
            }))
            .map_err(to_chart_error)?;

        root.present().map_err(to_chart_error)?;
    }

    Ok(svg)
}

fn to_chart_error(error: impl std::fmt::Display) -> Error {
    Error::Chart(error.to_string())
}
