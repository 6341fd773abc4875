// Pure helpers shared by the DOM glue. No web-sys types here so the host
// test suite can include this file directly.

/// CSS `rgb()` string for a linear [0, 1] triple.
pub fn rgb_css(rgb: [f32; 3]) -> String {
    let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("rgb({}, {}, {})", c(rgb[0]), c(rgb[1]), c(rgb[2]))
}

/// Range input value as a volume in [0, 1]. Garbage yields `None`.
pub fn parse_volume(raw: &str) -> Option<f32> {
    let v: f32 = raw.trim().parse().ok()?;
    if !v.is_finite() {
        return None;
    }
    Some(v.clamp(0.0, 1.0))
}

#[inline]
pub fn play_label(playing: bool) -> &'static str {
    if playing {
        "Pause"
    } else {
        "Play"
    }
}

/// Backing-store size for a CSS box at the given device pixel ratio.
pub fn backing_size(css_width: f64, css_height: f64, dpr: f64) -> (u32, u32) {
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    let px = |v: f64| {
        if v.is_finite() && v > 0.0 {
            ((v * dpr) as u32).max(1)
        } else {
            1
        }
    };
    (px(css_width), px(css_height))
}

/// Picks the section that should drive the layers from a batch of
/// intersection records `(id, is_intersecting, ratio)`.
///
/// The most visible intersecting entry wins; entries without an id are
/// ignored.
pub fn dominant_section<'a, I>(entries: I) -> Option<&'a str>
where
    I: IntoIterator<Item = (&'a str, bool, f64)>,
{
    entries
        .into_iter()
        .filter(|(id, hit, _)| *hit && !id.is_empty())
        .fold(None::<(&str, f64)>, |best, (id, _, ratio)| match best {
            Some((_, r)) if r >= ratio => best,
            _ => Some((id, ratio)),
        })
        .map(|(id, _)| id)
}
