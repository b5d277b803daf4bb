use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::curve::Segment;
use super::scene::{Layer, Scene};

/// Draw `scene` onto a canvas of the given pixel size.
pub fn render(scene: &Scene, ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
	ctx.set_fill_style_str(&scene.background);
	ctx.fill_rect(0.0, 0.0, width, height);
	ctx.save();
	let t = scene.transform;
	let _ = ctx.translate(t.translate_x, t.translate_y);
	let _ = ctx.scale(t.scale, t.scale);
	for layer in Scene::LAYERS {
		match layer {
			Layer::Countries => draw_countries(scene, ctx),
			Layer::Flows => draw_curves(scene, ctx),
			Layer::Particles => draw_particles(scene, ctx),
		}
	}
	ctx.restore();
}

fn draw_countries(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	let k = scene.transform.scale;
	ctx.set_stroke_style_str(&scene.country_stroke);
	ctx.set_line_width(scene.country_stroke_width / k);

	for country in &scene.countries {
		if country.rings.is_empty() {
			continue;
		}
		ctx.begin_path();
		for ring in &country.rings {
			let Some((first, rest)) = ring.split_first() else {
				continue;
			};
			ctx.move_to(first.x, first.y);
			for p in rest {
				ctx.line_to(p.x, p.y);
			}
			ctx.close_path();
		}
		ctx.set_global_alpha(country.opacity);
		ctx.set_fill_style_str(&country.fill);
		ctx.fill();
		ctx.set_global_alpha(1.0);
		ctx.stroke();
	}
}

fn draw_curves(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	let k = scene.transform.scale;
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	for curve in &scene.curves {
		ctx.begin_path();
		ctx.move_to(curve.start.x, curve.start.y);
		for segment in &curve.segments {
			match *segment {
				Segment::Line { to } => ctx.line_to(to.x, to.y),
				Segment::Cubic { c1, c2, to } => ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, to.x, to.y),
			}
		}
		ctx.set_global_alpha(curve.opacity);
		ctx.set_stroke_style_str(&curve.color);
		ctx.set_line_width(curve.width / k);
		ctx.stroke();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_particles(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	for particle in &scene.particles {
		ctx.set_global_alpha(particle.opacity);
		ctx.begin_path();
		let _ = ctx.arc(
			particle.position.x,
			particle.position.y,
			particle.radius,
			0.0,
			2.0 * PI,
		);
		ctx.set_fill_style_str(&particle.color);
		ctx.fill();
	}
	ctx.set_global_alpha(1.0);
}
