use eframe::egui::Color32;
use palette::{Darken, Hsl, IntoColor, Srgb};

use crate::analysis::stability::StabilityLabel;

/// Line colour of batch trend charts.
pub const TREND_COLOR: Color32 = Color32::from_rgb(0x00, 0x7b, 0xff);

// ---------------------------------------------------------------------------
// Stability colours
// ---------------------------------------------------------------------------

/// Fill colour for a CV bar of the given stability class.
pub fn stability_color(label: StabilityLabel) -> Color32 {
    match label {
        StabilityLabel::Stable => Color32::from_rgb(0x28, 0xa7, 0x45),
        StabilityLabel::Moderate => Color32::from_rgb(0xff, 0xc1, 0x07),
        StabilityLabel::Risk => Color32::from_rgb(0xdc, 0x35, 0x45),
        StabilityLabel::InsufficientData => Color32::from_rgb(0x6c, 0x75, 0x7d),
    }
}

/// A darker shade of `fill` for bar outlines.
pub fn outline_color(fill: Color32) -> Color32 {
    let rgb = Srgb::new(
        fill.r() as f32 / 255.0,
        fill.g() as f32 / 255.0,
        fill.b() as f32 / 255.0,
    );
    let hsl: Hsl = rgb.into_color();
    let darker: Srgb = hsl.darken(0.2).into_color();
    Color32::from_rgb(
        (darker.red.clamp(0.0, 1.0) * 255.0) as u8,
        (darker.green.clamp(0.0, 1.0) * 255.0) as u8,
        (darker.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Legend entries (label → colour) for the CV chart.
pub fn legend_entries() -> Vec<(String, Color32)> {
    [
        StabilityLabel::Stable,
        StabilityLabel::Moderate,
        StabilityLabel::Risk,
        StabilityLabel::InsufficientData,
    ]
    .into_iter()
    .map(|l| (l.to_string(), stability_color(l)))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_is_darker() {
        for (_, fill) in legend_entries() {
            let outline = outline_color(fill);
            let sum = |c: Color32| c.r() as u32 + c.g() as u32 + c.b() as u32;
            assert!(sum(outline) < sum(fill));
        }
    }

    #[test]
    fn each_label_has_its_own_color() {
        let entries = legend_entries();
        for (i, a) in entries.iter().enumerate() {
            for b in &entries[i + 1..] {
                assert_ne!(a.1, b.1);
            }
        }
    }
}
