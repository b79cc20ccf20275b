//! Comparison plots of the point pairs used for thickness measurement.

use plotters::prelude::*;

use std::fmt::Display;
use std::ops::Range;
use std::path::Path;

use crate::curve::Curve;
use crate::error::{CcThicknessError, Result};
use crate::pipeline::SubjectRecord;

const FONT_SIZE: u32 = 14;


fn plot_err<E: Display>(err: E) -> CcThicknessError {
    CcThicknessError::Plot(err.to_string())
}


/// Padded x and y ranges covering both curves.
fn bounds(a: &Curve, b: &Curve) -> (Range<f64>, Range<f64>) {
    let axis_range = |d: usize| {
        let values = a.coords.row(d).iter().chain(b.coords.row(d).iter()).cloned().collect::<Vec<f64>>();
        let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if !lo.is_finite() || !hi.is_finite() {
            return 0.0..1.0;
        }
        let pad = ((hi - lo) * 0.05).max(0.5);
        (lo - pad)..(hi + pad)
    };
    (axis_range(0), axis_range(1))
}


fn xy(curve: &Curve, i: usize) -> (f64, f64) {
    (curve.coords[[0, i]], curve.coords[[1, i]])
}


fn draw_pair<DB: DrawingBackend>(area: &DrawingArea<DB, plotters::coord::Shift>, top: &Curve, bottom: &Curve, label: &str) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (x_range, y_range) = bounds(top, bottom);
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(x_range, y_range)
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .x_desc(label)
        .label_style(("sans-serif", FONT_SIZE))
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new((0..top.siz()).map(|i| xy(top, i)), &BLUE))
        .map_err(plot_err)?;
    chart
        .draw_series(LineSeries::new((0..bottom.siz()).map(|i| xy(bottom, i)), &RED))
        .map_err(plot_err)?;
    chart
        .draw_series(
            (0..top.siz().min(bottom.siz()))
                .map(|i| PathElement::new(vec![xy(top, i), xy(bottom, i)], GREEN.mix(0.6).stroke_width(1))),
        )
        .map_err(plot_err)?;
    Ok(())
}


/// Plot the top curve against the adjusted bottom curve, optionally above the index-matched pairs,
/// and save the figure as SVG.
pub fn plot_thicknesses<P: AsRef<Path>>(path: P, record: &SubjectRecord, include_naive: bool) -> Result<()> {
    let root = SVGBackend::new(path.as_ref(), (800, if include_naive { 1000 } else { 560 })).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let thickness = &record.thickness;
    let title = match (include_naive, thickness.percent_difference()) {
        (true, Some(p)) => format!("{}  % Difference: {:.3}", record.id(), p),
        (true, None) => format!("{}  % Difference: undefined", record.id()),
        (false, _) => record.id().to_string(),
    };
    let root = root.titled(&title, ("sans-serif", FONT_SIZE + 4)).map_err(plot_err)?;

    let elastic_label = format!("Elastic Matching, Avg Thickness = {:.4}", thickness.mean_adjusted());
    if include_naive {
        let panels = root.split_evenly((2, 1));
        let naive_label = format!("Point to Point Matching, Avg Thickness = {:.4}", thickness.mean_naive());
        draw_pair(&panels[0], &record.plane.top, &record.plane.bottom, &naive_label)?;
        draw_pair(&panels[1], &record.plane.top, &record.bottom_adjusted, &elastic_label)?;
    } else {
        draw_pair(&root, &record.plane.top, &record.bottom_adjusted, &elastic_label)?;
    }
    root.present().map_err(plot_err)?;
    Ok(())
}
