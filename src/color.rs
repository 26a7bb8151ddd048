use std::collections::BTreeMap;

use alviridi_dashboard::chart::PaletteName;
use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize, saturation: f32, lightness: f32) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// `n` colours sampled evenly along a piecewise-linear gradient through
/// `anchors`, interpolated in linear RGB.
fn gradient(anchors: &[(u8, u8, u8)], n: usize) -> Vec<Color32> {
    let stops: Vec<LinSrgb> = anchors
        .iter()
        .map(|&(r, g, b)| Srgb::new(r, g, b).into_format::<f32>().into_linear())
        .collect();
    if stops.len() < 2 {
        return vec![Color32::GRAY; n];
    }

    (0..n)
        .map(|i| {
            let t = if n == 1 { 0.5 } else { i as f32 / (n - 1) as f32 };
            let scaled = t * (stops.len() - 1) as f32;
            let segment = (scaled.floor() as usize).min(stops.len() - 2);
            let mixed = stops[segment].mix(stops[segment + 1], scaled - segment as f32);
            to_color32(Srgb::from_linear(mixed))
        })
        .collect()
}

/// Fixed qualitative colours, cycling into generated hues past the end.
fn qualitative(base: &[(u8, u8, u8)], n: usize, saturation: f32, lightness: f32) -> Vec<Color32> {
    let mut colors: Vec<Color32> = base
        .iter()
        .take(n)
        .map(|&(r, g, b)| Color32::from_rgb(r, g, b))
        .collect();
    if n > colors.len() {
        colors.extend(generate_palette(n - colors.len(), saturation, lightness));
    }
    colors
}

/// `n` colours for a named palette.
pub fn palette_colors(name: PaletteName, n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    match name {
        PaletteName::Viridis => gradient(&[(0x44, 0x01, 0x54), (0x21, 0x91, 0x8c), (0xfd, 0xe7, 0x25)], n),
        PaletteName::Rocket => gradient(&[(0x35, 0x19, 0x3e), (0xe1, 0x33, 0x42), (0xf6, 0xb4, 0x8f)], n),
        PaletteName::Magma => gradient(&[(0x1c, 0x10, 0x44), (0xb7, 0x37, 0x79), (0xfc, 0xa5, 0x6b)], n),
        PaletteName::Cubehelix => gradient(&[(0x1a, 0x15, 0x30), (0x3b, 0x7a, 0x57), (0xc8, 0x8d, 0xb5)], n),
        PaletteName::Crest => gradient(&[(0xa5, 0xcd, 0x90), (0x2c, 0x7a, 0x8c), (0x2c, 0x31, 0x72)], n),
        PaletteName::Blues => gradient(&[(0xc6, 0xdb, 0xef), (0x08, 0x30, 0x6b)], n),
        PaletteName::Reds => gradient(&[(0xfc, 0xbb, 0xa1), (0x67, 0x00, 0x0d)], n),
        PaletteName::Greens => gradient(&[(0xc7, 0xe9, 0xc0), (0x00, 0x44, 0x1b)], n),
        PaletteName::Coolwarm => gradient(&[(0x3b, 0x4c, 0xc0), (0xdd, 0xdd, 0xdd), (0xb4, 0x04, 0x26)], n),
        PaletteName::Deep => qualitative(
            &[
                (0x4c, 0x72, 0xb0),
                (0xdd, 0x84, 0x52),
                (0x55, 0xa8, 0x68),
                (0xc4, 0x4e, 0x52),
                (0x81, 0x72, 0xb3),
                (0x93, 0x78, 0x60),
                (0xda, 0x8b, 0xc3),
                (0x8c, 0x8c, 0x8c),
            ],
            n,
            0.45,
            0.5,
        ),
        PaletteName::Paired => qualitative(
            &[
                (0xa6, 0xce, 0xe3),
                (0x1f, 0x78, 0xb4),
                (0xb2, 0xdf, 0x8a),
                (0x33, 0xa0, 0x2c),
                (0xfb, 0x9a, 0x99),
                (0xe3, 0x1a, 0x1c),
                (0xfd, 0xbf, 0x6f),
                (0xff, 0x7f, 0x00),
            ],
            n,
            0.6,
            0.55,
        ),
        PaletteName::Pastel => generate_palette(n, 0.7, 0.8),
        PaletteName::Set1 => qualitative(
            &[
                (0xe4, 0x1a, 0x1c),
                (0x37, 0x7e, 0xb8),
                (0x4d, 0xaf, 0x4a),
                (0x98, 0x4e, 0xa3),
                (0xff, 0x7f, 0x00),
                (0xa6, 0x56, 0x28),
                (0xf7, 0x81, 0xbf),
            ],
            n,
            0.75,
            0.55,
        ),
        PaletteName::Set2 => qualitative(
            &[
                (0x66, 0xc2, 0xa5),
                (0xfc, 0x8d, 0x62),
                (0x8d, 0xa0, 0xcb),
                (0xe7, 0x8a, 0xc3),
                (0xa6, 0xd8, 0x54),
                (0xff, 0xd9, 0x2f),
                (0xe5, 0xc4, 0x94),
            ],
            n,
            0.5,
            0.65,
        ),
    }
}

// ---------------------------------------------------------------------------
// Color mapping: series label → Color32
// ---------------------------------------------------------------------------

/// Maps the labels of one chart's series (or categories) to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Assign colours from `palette` to `labels` in the given order.
    pub fn new<'a>(palette: PaletteName, labels: impl IntoIterator<Item = &'a str>) -> Self {
        let labels: Vec<&str> = labels.into_iter().collect();
        let colors = palette_colors(palette, labels.len());
        let mapping = labels
            .into_iter()
            .zip(colors)
            .map(|(label, color)| (label.to_string(), color))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}
