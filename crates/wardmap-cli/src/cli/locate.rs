//! `wardmap locate` - point-in-district lookup from the command line.

use wardmap_core::{centroid, detect_district, DisplayScale, Point};

use super::common::{districts_or_exit, game_state_or_none, parse_coord};

pub fn cmd_locate(args: &[String]) {
    let mut positional: Vec<&str> = Vec::new();
    let mut districts_path: Option<&str> = None;
    let mut game_path: Option<&str> = None;
    let mut scale_factor: Option<f64> = None;

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
            "--scale" => {
                i += 1;
                if i < args.len() {
                    scale_factor = Some(parse_coord(&args[i], "scale"));
                }
            }
            other => positional.push(other),
        }
        i += 1;
    }

    if positional.len() != 2 {
        eprintln!("Usage: wardmap locate <x> <y> [-d districts.json] [-g gamestate.json] [--scale f]");
        std::process::exit(1);
    }

    let x = parse_coord(positional[0], "x");
    let y = parse_coord(positional[1], "y");

    // Clicks from a resized display must be converted to original space
    // before any containment test.
    let point = match scale_factor {
        Some(factor) => {
            if factor <= 0.0 {
                eprintln!("Error: scale must be positive, got {}", factor);
                std::process::exit(1);
            }
            let orig = DisplayScale { factor }.to_original(Point::new(x, y));
            eprintln!(
                "Display ({}, {}) -> original ({}, {})",
                x, y, orig.x as i64, orig.y as i64
            );
            orig
        }
        None => Point::new(x, y),
    };

    let districts = districts_or_exit(districts_path);
    let game = game_state_or_none(game_path);

    match detect_district(&districts, point) {
        Some(name) => {
            println!("District: {}", name);

            // Districts were just detected, so the boundary is non-empty
            // and the centroid call can't hit the empty-polygon error.
            if let Some(district) = districts.get(name) {
                if let Ok(c) = centroid(&district.boundary.points) {
                    println!("Centroid: ({}, {})", c.x.round() as i64, c.y.round() as i64);
                }
            }

            match game.as_ref().and_then(|g| g.for_district(name)) {
                Some(record) => {
                    if let Some(dominant) = &record.dominant {
                        println!("Dominant: {}", dominant);
                    }
                    for faction in record.factions_sorted() {
                        let units = &record.units[faction];
                        println!("  {} ({}): {}", faction, units.len(), units.join(", "));
                    }
                    if record.unit_count() == 0 {
                        println!("  (no units present)");
                    }
                }
                None => {
                    if game.is_some() {
                        println!("  (no game-state record for this district)");
                    }
                }
            }
        }
        None => {
            // A miss is a normal answer, not an error.
            println!(
                "No district contains ({}, {})",
                point.x.round() as i64,
                point.y.round() as i64
            );
        }
    }
}
