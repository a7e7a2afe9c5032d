//! `wardmap districts` - summarize the district table.

use wardmap_core::centroid;

use super::common::districts_or_exit;

pub fn cmd_districts(args: &[String]) {
    let mut districts_path: Option<&str> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--districts" => {
                i += 1;
                if i < args.len() {
                    districts_path = Some(&args[i]);
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

    println!("══════════════════════════════════════════════════════════════");
    println!("  {:16} {:>8}  {:>14}  {}", "District", "Vertices", "Centroid", "Bounding box");
    println!("  {:16} {:>8}  {:>14}  {}", "--------", "--------", "--------", "------------");

    for district in districts.iter() {
        let points = &district.boundary.points;
        let centroid_str = match centroid(points) {
            Ok(c) => format!("({}, {})", c.x.round() as i64, c.y.round() as i64),
            Err(_) => "-".to_string(),
        };
        let bbox_str = match district.boundary.bounding_box() {
            Some((min_x, min_y, max_x, max_y)) => format!(
                "{}x{} at ({}, {})",
                (max_x - min_x) as i64,
                (max_y - min_y) as i64,
                min_x as i64,
                min_y as i64
            ),
            None => "-".to_string(),
        };
        println!(
            "  {:16} {:>8}  {:>14}  {}",
            district.name,
            points.len(),
            centroid_str,
            bbox_str
        );
    }

    println!("══════════════════════════════════════════════════════════════");
    println!("  {} districts", districts.len());
}
