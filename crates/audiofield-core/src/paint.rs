//! 2D panel painters. Each produces a fresh command list per frame for a
//! host canvas (Canvas2D on the web) to execute.

use smallvec::SmallVec;

use crate::constants::{RED, SPECTRUM_BAR_GAP, SPECTRUM_BAR_SCALE, TEAL, WAVE_LINE_WIDTH, WHITE};
use crate::snapshot::SampleSnapshot;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub rgb: [f32; 3],
}

/// Linear gradient between two canvas-space points.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    pub from: [f32; 2],
    pub to: [f32; 2],
    pub stops: SmallVec<[ColorStop; 3]>,
}

impl LinearGradient {
    pub fn vertical(y0: f32, y1: f32, stops: &[ColorStop]) -> Self {
        Self {
            from: [0.0, y0],
            to: [0.0, y1],
            stops: stops.iter().copied().collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear {
        width: f32,
        height: f32,
    },
    StrokePolyline {
        points: Vec<[f32; 2]>,
        line_width: f32,
        gradient: LinearGradient,
    },
    FillRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        gradient: LinearGradient,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelSize {
    pub width: f32,
    pub height: f32,
}

impl PanelSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }
}

/// Time-domain polyline across the full panel width.
#[derive(Clone, Debug, Default)]
pub struct WaveformPainter;

impl WaveformPainter {
    pub fn paint(&self, snapshot: &SampleSnapshot, size: PanelSize, out: &mut Vec<DrawCommand>) {
        out.clear();
        out.push(DrawCommand::Clear {
            width: size.width,
            height: size.height,
        });
        let samples = snapshot.time_domain();
        let step = size.width / samples.len() as f32;
        let points = samples
            .iter()
            .enumerate()
            .map(|(i, a)| [i as f32 * step, (1.0 + a) * size.height / 2.0])
            .collect::<Vec<_>>();
        let gradient = LinearGradient::vertical(
            0.0,
            size.height,
            &[
                ColorStop {
                    offset: 0.0,
                    rgb: RED,
                },
                ColorStop {
                    offset: 0.5,
                    rgb: WHITE,
                },
                ColorStop {
                    offset: 1.0,
                    rgb: TEAL,
                },
            ],
        );
        out.push(DrawCommand::StrokePolyline {
            points,
            line_width: WAVE_LINE_WIDTH,
            gradient,
        });
    }
}

/// Bottom-anchored bars, one per frequency reading, left to right.
#[derive(Clone, Debug, Default)]
pub struct SpectrumPainter;

impl SpectrumPainter {
    pub fn paint(&self, snapshot: &SampleSnapshot, size: PanelSize, out: &mut Vec<DrawCommand>) {
        out.clear();
        out.push(DrawCommand::Clear {
            width: size.width,
            height: size.height,
        });
        let bins = snapshot.frequency_domain();
        let bar_width = size.width / bins.len() as f32 * SPECTRUM_BAR_SCALE;
        let mut x = 0.0;
        for m in bins {
            if x >= size.width {
                break;
            }
            let h = m * size.height;
            if h > 0.0 {
                let y = size.height - h;
                out.push(DrawCommand::FillRect {
                    x,
                    y,
                    w: bar_width,
                    h,
                    gradient: LinearGradient::vertical(
                        size.height,
                        y,
                        &[
                            ColorStop {
                                offset: 0.0,
                                rgb: TEAL,
                            },
                            ColorStop {
                                offset: 1.0,
                                rgb: RED,
                            },
                        ],
                    ),
                });
            }
            x += bar_width + SPECTRUM_BAR_GAP;
        }
    }
}
