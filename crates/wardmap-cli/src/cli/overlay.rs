//! `wardmap overlay` - render district boundaries and unit markers.
//!
//! Builds an SVG of the district table: boundary outlines, a name label at
//! each vertex centroid, and one marker per unit arranged on a radial
//! circle around the centroid. `.png` output rasterizes the same SVG.

use std::fs;

use wardmap_core::{centroid, radial_positions, DistrictMap, GameState};

use super::common::{districts_or_exit, game_state_or_none, parse_coord};

/// Marker circle radius in board pixels.
const MARKER_RADIUS: f64 = 9.0;

/// Distinct, print-friendly faction colors. Factions are hashed onto the
/// palette so a faction keeps its color across districts and runs.
const FACTION_COLORS: &[&str] = &[
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#46b8a0", "#9a6324", "#808000",
];

pub(crate) fn faction_color(faction: &str) -> &'static str {
    let hash: usize = faction.bytes().map(|b| b as usize).sum();
    FACTION_COLORS[hash % FACTION_COLORS.len()]
}

pub fn cmd_overlay(args: &[String]) {
    let mut districts_path: Option<&str> = None;
    let mut game_path: Option<&str> = None;
    let mut output_path: Option<&str> = None;
    let mut spread = 30.0;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--districts" => {
                i += 1;
                if i < args.len() {
                    districts_path = Some(&args[i]);
                }
            }
            "-g" | "--game" => {
                i += 1;
                if i < args.len() {
                    game_path = Some(&args[i]);
                }
            }
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(&args[i]);
                }
            }
            "--spread" => {
                i += 1;
                if i < args.len() {
                    spread = parse_coord(&args[i], "spread");
                }
            }
            other => {
                eprintln!("Unknown option: {}", other);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let districts = districts_or_exit(districts_path);
    let game = game_state_or_none(game_path);

    if districts.is_empty() {
        eprintln!("Error: district table is empty, nothing to draw");
        std::process::exit(1);
    }

    let svg = build_overlay_svg(&districts, game.as_ref(), spread);

    match output_path {
        Some(path) if path.ends_with(".png") => {
            if let Err(e) = render_png(&svg, path) {
                eprintln!("Error rendering {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Wrote: {}", path);
        }
        Some("-") | None => {
            println!("{}", svg);
        }
        Some(path) => {
            if let Err(e) = fs::write(path, &svg) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Wrote: {}", path);
        }
    }
}

/// Build the overlay SVG document.
pub fn build_overlay_svg(districts: &DistrictMap, game: Option<&GameState>, spread: f64) -> String {
    // Overall bounding box across all districts, padded for labels
    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;

    for district in districts.iter() {
        if let Some((x1, y1, x2, y2)) = district.boundary.bounding_box() {
            min_x = min_x.min(x1);
            min_y = min_y.min(y1);
            max_x = max_x.max(x2);
            max_y = max_y.max(y2);
        }
    }

    if min_x > max_x {
        // All boundaries empty - emit an empty document rather than NaN soup
        min_x = 0.0;
        min_y = 0.0;
        max_x = 100.0;
        max_y = 100.0;
    }

    let padding = 20.0;
    let view_x = min_x - padding;
    let view_y = min_y - padding;
    let view_w = (max_x - min_x) + padding * 2.0;
    let view_h = (max_y - min_y) + padding * 2.0;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="{:.0} {:.0} {:.0} {:.0}">
<rect x="{:.0}" y="{:.0}" width="100%" height="100%" fill="white"/>
"#,
        view_x, view_y, view_w, view_h, view_x, view_y
    ));

    // District outlines
    svg.push_str("<g stroke=\"#555555\" stroke-width=\"3\" fill=\"none\">\n");
    for district in districts.iter() {
        let points = &district.boundary.points;
        if points.len() < 2 {
            continue;
        }
        svg.push_str("  <path d=\"M");
        for (i, pt) in points.iter().enumerate() {
            if i == 0 {
                svg.push_str(&format!("{:.0},{:.0}", pt.x, pt.y));
            } else {
                svg.push_str(&format!(" L{:.0},{:.0}", pt.x, pt.y));
            }
        }
        svg.push_str(" Z\"/>\n");
    }
    svg.push_str("</g>\n");

    // Labels and unit markers per district
    for district in districts.iter() {
        let Ok(center) = centroid(&district.boundary.points) else {
            // Empty boundary: nothing to anchor a label or markers to
            eprintln!("Skipping '{}': no boundary points", district.name);
            continue;
        };

        let record = game.and_then(|g| g.for_district(&district.name));
        let label_color = record
            .and_then(|r| r.dominant.as_deref())
            .map(faction_color)
            .unwrap_or("#222222");

        svg.push_str(&format!(
            "<text x=\"{:.0}\" y=\"{:.0}\" font-size=\"30\" font-family=\"sans-serif\" text-anchor=\"middle\" fill=\"{}\">{}</text>\n",
            center.x,
            center.y - spread - MARKER_RADIUS - 6.0,
            label_color,
            district.name
        ));

        let Some(record) = record else {
            continue;
        };

        // One marker per unit, radially arranged around the centroid.
        // Flatten factions in sorted order so marker slots are stable.
        let mut slots: Vec<(&str, &str)> = Vec::new();
        for faction in record.factions_sorted() {
            for unit in &record.units[faction] {
                slots.push((faction, unit));
            }
        }

        let positions = radial_positions(center, slots.len(), spread);
        for ((faction, _unit), pos) in slots.iter().zip(&positions) {
            let dominant = record.dominant.as_deref() == Some(*faction);
            svg.push_str(&format!(
                "<circle cx=\"{:.0}\" cy=\"{:.0}\" r=\"{:.0}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>\n",
                pos.x,
                pos.y,
                MARKER_RADIUS,
                faction_color(faction),
                if dominant { "#000000" } else { "#ffffff" },
                if dominant { 3 } else { 1 },
            ));
        }
    }

    svg.push_str("</svg>\n");
    svg
}

/// Rasterize the overlay SVG to a PNG file.
fn render_png(svg: &str, path: &str) -> Result<(), String> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| e.to_string())?;

    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| "failed to allocate pixmap".to_string())?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    pixmap.save_png(path).map_err(|e| e.to_string())
}
