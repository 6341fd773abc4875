use audiofield_core::{DrawCommand, LinearGradient};
use web_sys as web;

use crate::format;

fn gradient(ctx: &web::CanvasRenderingContext2d, g: &LinearGradient) -> web::CanvasGradient {
    let out = ctx.create_linear_gradient(
        g.from[0] as f64,
        g.from[1] as f64,
        g.to[0] as f64,
        g.to[1] as f64,
    );
    for stop in &g.stops {
        let _ = out.add_color_stop(stop.offset, &format::rgb_css(stop.rgb));
    }
    out
}

/// Replays a painter's command list onto a 2D context.
#[allow(deprecated)]
pub fn execute(ctx: &web::CanvasRenderingContext2d, commands: &[DrawCommand]) {
    for cmd in commands {
        match cmd {
            DrawCommand::Clear { width, height } => {
                ctx.clear_rect(0.0, 0.0, *width as f64, *height as f64);
            }
            DrawCommand::StrokePolyline {
                points,
                line_width,
                gradient: g,
            } => {
                let Some((first, rest)) = points.split_first() else {
                    continue;
                };
                ctx.set_line_width(*line_width as f64);
                ctx.set_stroke_style(gradient(ctx, g).as_ref());
                ctx.begin_path();
                ctx.move_to(first[0] as f64, first[1] as f64);
                for p in rest {
                    ctx.line_to(p[0] as f64, p[1] as f64);
                }
                ctx.stroke();
            }
            DrawCommand::FillRect {
                x,
                y,
                w,
                h,
                gradient: g,
            } => {
                ctx.set_fill_style(gradient(ctx, g).as_ref());
                ctx.fill_rect(*x as f64, *y as f64, *w as f64, *h as f64);
            }
        }
    }
}
