//! Hypotrochoid curves
//!
//! A spirograph traces a point at distance `d` from the center of a gear
//! of radius `r` rolling inside a fixed ring of radius `R`.

use spiro_canvas::Color;

use crate::figure::{Figure, LineArtist, TitleConfig};

/// Gear setup of a spirograph
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hypotrochoid {
    /// Fixed ring radius
    pub big: u32,
    /// Rolling gear radius
    pub small: u32,
    /// Pen distance from the rolling gear's center
    pub distance: f32,
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Hypotrochoid {
    pub fn new(big: u32, small: u32, distance: f32) -> Self {
        Self {
            big,
            small,
            distance,
        }
    }

    /// Turns of the rolling gear before the curve closes
    pub fn revolutions(&self) -> u32 {
        if self.small == 0 {
            return 0;
        }
        self.small / gcd(self.big, self.small)
    }

    /// Sample `steps` points over the closed curve, both ends included
    pub fn points(&self, steps: usize) -> Vec<[f32; 2]> {
        let rev = self.revolutions();
        if rev == 0 || steps < 2 {
            return vec![[self.big as f32 + self.distance, 0.0]];
        }

        let (big, small, d) = (self.big as f32, self.small as f32, self.distance);
        let ratio = (big - small) / small;
        let end = std::f32::consts::TAU * rev as f32;

        (0..steps)
            .map(|i| {
                let theta = end * i as f32 / (steps - 1) as f32;
                [
                    (big - small) * theta.cos() + d * (ratio * theta).cos(),
                    (big - small) * theta.sin() - d * (ratio * theta).sin(),
                ]
            })
            .collect()
    }

    /// A figure holding the curve as a single line
    pub fn figure(&self, steps: usize, style: &SpiroStyle) -> Figure {
        Figure {
            size: [style.width, style.height],
            face_color: style.background.into(),
            title: style.title.clone().map(|text| TitleConfig {
                text,
                ..Default::default()
            }),
            lines: vec![LineArtist {
                points: self.points(steps),
                color: style.color.into(),
                line_width: style.line_width,
                ..Default::default()
            }],
            ..Default::default()
        }
    }
}

/// Presentation of a rendered spirograph
#[derive(Clone, Debug)]
pub struct SpiroStyle {
    pub width: u32,
    pub height: u32,
    pub color: Color,
    pub background: Color,
    pub line_width: f32,
    pub title: Option<String>,
}

impl Default for SpiroStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            color: Color::CYAN,
            background: Color::from_u32(0x121212),
            line_width: 1.5,
            title: None,
        }
    }
}
