// Host-side tests for the pure DOM helpers.
// The web crate is wasm-only, so the module is included directly.

#![allow(dead_code)]
mod format {
    include!("../src/format.rs");
}

use format::*;

#[test]
fn css_colors_round_and_clamp() {
    assert_eq!(rgb_css([1.0, 0.0, 0.5]), "rgb(255, 0, 128)");
    assert_eq!(rgb_css([2.0, -1.0, 0.0]), "rgb(255, 0, 0)");
    // accent teal from the palette
    assert_eq!(
        rgb_css([120.0 / 255.0, 190.0 / 255.0, 186.0 / 255.0]),
        "rgb(120, 190, 186)"
    );
}

#[test]
fn volume_input_is_parsed_and_clamped() {
    assert_eq!(parse_volume("0.25"), Some(0.25));
    assert_eq!(parse_volume(" 1 "), Some(1.0));
    assert_eq!(parse_volume("3"), Some(1.0));
    assert_eq!(parse_volume("-0.5"), Some(0.0));
    assert_eq!(parse_volume(""), None);
    assert_eq!(parse_volume("loud"), None);
    assert_eq!(parse_volume("NaN"), None);
}

#[test]
fn play_button_label_follows_state() {
    assert_eq!(play_label(true), "Pause");
    assert_eq!(play_label(false), "Play");
}

#[test]
fn backing_size_scales_by_dpr_and_never_hits_zero() {
    assert_eq!(backing_size(400.0, 300.0, 2.0), (800, 600));
    assert_eq!(backing_size(0.0, 0.0, 2.0), (1, 1));
    assert_eq!(backing_size(100.0, 50.0, f64::NAN), (100, 50));
    assert_eq!(backing_size(100.5, 50.0, 1.0), (100, 50));
}

#[test]
fn most_visible_intersecting_section_wins() {
    let entries = [
        ("about", true, 0.55),
        ("skills", true, 0.8),
        ("experience", false, 0.9),
        ("", true, 1.0),
    ];
    assert_eq!(dominant_section(entries), Some("skills"));
    assert_eq!(dominant_section([("contact", false, 0.7)]), None);
    // ties keep the first entry
    assert_eq!(
        dominant_section([("about", true, 0.5), ("projects", true, 0.5)]),
        Some("about")
    );
}
