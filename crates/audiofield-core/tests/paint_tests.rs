// Panel painters: geometry and gradients of emitted draw commands.

use audiofield_core::constants::{RED, TEAL, WHITE};
use audiofield_core::paint::{SpectrumPainter, WaveformPainter};
use audiofield_core::{DrawCommand, PanelSize, SampleSnapshot};

fn snap(time: Vec<f32>, freq: Vec<f32>) -> SampleSnapshot {
    SampleSnapshot::new(time, freq).unwrap()
}

#[test]
fn waveform_maps_samples_across_the_panel() {
    let mut out = Vec::new();
    let size = PanelSize::new(400.0, 100.0);
    WaveformPainter.paint(&snap(vec![-1.0, 0.0, 1.0, 0.5], vec![0.0]), size, &mut out);

    assert_eq!(out.len(), 2);
    assert_eq!(
        out[0],
        DrawCommand::Clear {
            width: 400.0,
            height: 100.0
        }
    );
    match &out[1] {
        DrawCommand::StrokePolyline {
            points,
            line_width,
            gradient,
        } => {
            assert_eq!(points, &vec![[0.0, 0.0], [100.0, 50.0], [200.0, 100.0], [300.0, 75.0]]);
            assert_eq!(*line_width, 2.0);
            let colors = gradient.stops.iter().map(|s| s.rgb).collect::<Vec<_>>();
            assert_eq!(colors, vec![RED, WHITE, TEAL]);
            assert_eq!(gradient.stops[1].offset, 0.5);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn spectrum_bars_grow_from_the_bottom() {
    let mut out = Vec::new();
    let size = PanelSize::new(100.0, 50.0);
    SpectrumPainter.paint(&snap(vec![0.0], vec![0.5, 1.0, 0.0, 0.2]), size, &mut out);

    let bars = out
        .iter()
        .filter_map(|c| match c {
            DrawCommand::FillRect { x, y, w, h, .. } => Some((*x, *y, *w, *h)),
            _ => None,
        })
        .collect::<Vec<_>>();
    // width / 4 * 2.5 = 62.5 wide; only the first two bars start on-canvas.
    assert_eq!(
        bars,
        vec![(0.0, 25.0, 62.5, 25.0), (63.5, 0.0, 62.5, 50.0)]
    );
    assert!(matches!(out[0], DrawCommand::Clear { .. }));
}

#[test]
fn spectrum_skips_zero_bars_but_keeps_spacing() {
    let mut out = Vec::new();
    let size = PanelSize::new(1000.0, 10.0);
    let mut bins = vec![0.0; 10];
    bins.push(1.0);
    SpectrumPainter.paint(&snap(vec![0.0], bins), size, &mut out);
    let rects = out
        .iter()
        .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
        .count();
    // bar width 1000 / 11 * 2.5 ~ 227, so bar 10 starts far off the right edge.
    assert_eq!(rects, 0);

    SpectrumPainter.paint(
        &snap(vec![0.0], vec![0.0, 0.8, 0.0, 0.0]),
        PanelSize::new(1000.0, 10.0),
        &mut out,
    );
    assert_eq!(out.len(), 2);
    match &out[1] {
        DrawCommand::FillRect { x, h, gradient, .. } => {
            assert_eq!(*x, 626.0);
            assert!((*h - 8.0).abs() < 1e-5);
            assert_eq!(gradient.stops[0].rgb, TEAL);
            assert_eq!(gradient.stops[1].rgb, RED);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn painters_start_with_a_clear_on_empty_panels() {
    let mut out = Vec::new();
    let size = PanelSize::new(0.0, 0.0);
    SpectrumPainter.paint(&snap(vec![0.0], vec![1.0]), size, &mut out);
    assert_eq!(out.len(), 1);
    WaveformPainter.paint(&snap(vec![0.0], vec![1.0]), size, &mut out);
    assert!(matches!(out[0], DrawCommand::Clear { .. }));
}
