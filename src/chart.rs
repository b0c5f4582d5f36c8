// src/chart.rs
use std::f64::consts::{FRAC_PI_2, TAU};
use std::io::Cursor;

use image::{ImageFormat, RgbImage};
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::error::RenderError;
use crate::models::PollOption;

pub const CHART_SIZE: u32 = 400;
const RADIUS: f64 = 160.0;
// segments per full turn
const ARC_STEPS: f64 = 360.0;

/// Fill colour of the wedge drawn for the option at `index`.
pub fn slice_color(index: usize) -> RGBColor {
    let (r, g, b) = Palette99::pick(index).to_backend_color().rgb;
    RGBColor(r, g, b)
}

/// [`slice_color`] as a CSS hex colour, for keys rendered next to the chart.
pub fn slice_css(index: usize) -> String {
    let RGBColor(r, g, b) = slice_color(index);
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Draws the vote distribution as a pie and returns the PNG bytes.
///
/// Wedges are drawn in the order given, coloured by position.
pub fn render_pie_png(options: &[PollOption]) -> Result<Vec<u8>, RenderError> {
    let mut pixels = vec![0u8; (CHART_SIZE * CHART_SIZE * 3) as usize];
    draw_pie(&mut pixels, options)?;

    let image = RgbImage::from_raw(CHART_SIZE, CHART_SIZE, pixels)
        .ok_or_else(|| RenderError::Chart("pixel buffer does not match chart size".into()))?;

    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageFormat::Png)?;
    Ok(png.into_inner())
}

fn draw_pie(pixels: &mut [u8], options: &[PollOption]) -> Result<(), RenderError> {
    let chart_err = |e: DrawingAreaErrorKind<_>| RenderError::Chart(e.to_string());

    let root = BitMapBackend::with_buffer(pixels, (CHART_SIZE, CHART_SIZE)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let center = (CHART_SIZE as i32 / 2, CHART_SIZE as i32 / 2);
    let total: i64 = options.iter().map(|o| o.votes_count.max(0)).sum();

    if total == 0 {
        root.draw(&Circle::new(center, RADIUS as i32, BLACK.stroke_width(1)))
            .map_err(chart_err)?;
        return root.present().map_err(chart_err);
    }

    let mut start = -FRAC_PI_2;
    for (index, option) in options.iter().enumerate() {
        if option.votes_count <= 0 {
            continue;
        }

        let sweep = TAU * option.votes_count as f64 / total as f64;
        let color = slice_color(index);
        root.draw(&Polygon::new(wedge(center, start, sweep), color.filled()))
            .map_err(chart_err)?;
        start += sweep;
    }

    root.present().map_err(chart_err)
}

/// Outline of one slice: the centre followed by points along its arc.
fn wedge(center: (i32, i32), start: f64, sweep: f64) -> Vec<(i32, i32)> {
    let steps = ((sweep / TAU) * ARC_STEPS).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);

    for step in 0..=steps {
        let angle = start + sweep * step as f64 / steps as f64;
        points.push((
            center.0 + (RADIUS * angle.cos()).round() as i32,
            center.1 + (RADIUS * angle.sin()).round() as i32,
        ));
    }

    points
}
