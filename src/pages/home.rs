use std::collections::HashMap;

use leptos::prelude::*;

use crate::components::migration_map::topology::{ArcRefs, GeometryProperties, TopoGeometry, TopoObject};
use crate::components::migration_map::{MigrationMap, MigrationRecord, Topology};

const COUNTRIES: [&str; 12] = [
	"Aurelia", "Borealis", "Caldera", "Dunmore", "Estoria", "Faraway", "Galdor", "Hesper", "Iskar",
	"Jorvik", "Kestrel", "Lumen",
];

/// A 4x3 grid of rectangular countries spread over the globe.
fn sample_topology() -> Topology {
	let mut arcs = Vec::with_capacity(COUNTRIES.len());
	let mut geometries = Vec::with_capacity(COUNTRIES.len());
	for (i, name) in COUNTRIES.iter().enumerate() {
		let (col, row) = ((i % 4) as f64, (i / 4) as f64);
		let (x0, y0) = (-150.0 + col * 75.0, -45.0 + row * 35.0);
		let (x1, y1) = (x0 + 60.0, y0 + 28.0);
		arcs.push(vec![vec![x0, y0], vec![x1, y0], vec![x1, y1], vec![x0, y1], vec![x0, y0]]);
		geometries.push(TopoGeometry {
			kind: Some("Polygon".into()),
			id: Some((i + 1).to_string()),
			arcs: Some(ArcRefs::Polygon(vec![vec![i as i64]])),
			properties: Some(GeometryProperties {
				name: Some(name.to_string()),
			}),
		});
	}
	Topology {
		transform: None,
		arcs,
		objects: HashMap::from([(
			"countries".to_string(),
			TopoObject {
				kind: Some("GeometryCollection".into()),
				geometries,
			},
		)]),
	}
}

/// Immigration counts into every country; roughly a third of the pairs are empty.
fn sample_records() -> Vec<MigrationRecord> {
	COUNTRIES
		.iter()
		.enumerate()
		.map(|(i, name)| {
			let sources = COUNTRIES
				.iter()
				.enumerate()
				.filter(|&(j, _)| j != i)
				.map(|(j, source)| {
					let r = rand_simple(i * COUNTRIES.len() + j);
					let count = if r < 0.33 { 0.0 } else { (r * r * 50_000.0).round() };
					(*source, count)
				})
				// a source the map does not know is dropped from the flows
				.chain(std::iter::once(("Atlantis", 1_000.0)))
				.collect();
			MigrationRecord {
				id: (i + 1).to_string(),
				name: name.to_string(),
				sources,
			}
		})
		.collect()
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let topology = Signal::derive(sample_topology);
	let data = Signal::derive(sample_records);
	let (focus, set_focus) = signal(Some("1".to_string()));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-map">
				<MigrationMap dataset=data topology=topology focus=focus fullscreen=true />
				<div class="map-overlay">
					<h1>"Migration Flows"</h1>
					<p class="subtitle">"Pick a destination. Scroll to zoom. Drag to pan."</p>
					<select on:change=move |ev| {
						let id = event_target_value(&ev);
						set_focus.set((!id.is_empty()).then_some(id));
					}>
						<option value="">"No focus"</option>
						{COUNTRIES
							.iter()
							.enumerate()
							.map(|(i, name)| {
								view! {
									<option value={(i + 1).to_string()} selected={i == 0}>
										{*name}
									</option>
								}
							})
							.collect_view()}
					</select>
				</div>
			</div>
		</ErrorBoundary>
	}
}
