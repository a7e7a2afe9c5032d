//! `wardmap collect` - stream boundary points into a collector session.
//!
//! Reads one point per stdin line (`x y` or `x,y`), plus the directives
//! `undo` and `clear`. On EOF it prints the human and JSON exports, which
//! is the offline equivalent of the click-collect workflow.

use std::fs;
use std::io::{self, BufRead};

use chrono::Local;

use wardmap_core::{CollectorSession, Point};

use super::common::districts_or_exit;

pub fn cmd_collect(args: &[String]) {
    let mut district: Option<&str> = None;
    let mut seed_path: Option<&str> = None;
    let mut output_path: Option<&str> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--districts" => {
                i += 1;
                if i < args.len() {
                    seed_path = Some(&args[i]);
                }
            }
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(&args[i]);
                }
            }
            other => {
                if district.is_none() {
                    district = Some(other);
                }
            }
        }
        i += 1;
    }

    let Some(district) = district else {
        eprintln!("Usage: wardmap collect <district> [-d seed.json] [-o out.json]");
        eprintln!("Reads 'x y' lines from stdin; 'undo' and 'clear' are directives.");
        std::process::exit(1);
    };

    // Seed with existing boundaries when resuming a mapping session;
    // a fresh session otherwise.
    let mut session = match seed_path {
        Some(_) => CollectorSession::with_boundaries(districts_or_exit(seed_path)),
        None => CollectorSession::new(),
    };

    eprintln!("Collecting points for '{}' (EOF to finish)", district);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading stdin: {}", e);
                std::process::exit(1);
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match trimmed {
            "undo" => match session.undo_last(district) {
                Some(p) => eprintln!("Removed ({}, {})", p.x as i64, p.y as i64),
                None => eprintln!("Nothing to undo"),
            },
            "clear" => {
                session.clear_district(district);
                eprintln!("Cleared '{}'", district);
            }
            _ => match parse_point(trimmed) {
                Some(point) => {
                    if session.record_click(district, point) {
                        eprintln!(
                            "[{}] Point {}: ({}, {})",
                            district,
                            session.point_count(district),
                            point.x as i64,
                            point.y as i64
                        );
                    } else {
                        eprintln!("Duplicate of previous point, ignored");
                    }
                }
                None => eprintln!("Skipping unparseable line: '{}'", trimmed),
            },
        }
    }

    let count = session.point_count(district);
    eprintln!("\nCollected {} points for '{}'", count, district);

    if let Some(human) = session.export_human(district) {
        println!("{}", human);
    }

    let json = session.export_json(&Local::now().to_rfc3339());
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Wrote: {}", path);
        }
        None => println!("{}", json),
    }
}

/// Parse `x y`, `x,y` or `x, y` into a point.
fn parse_point(line: &str) -> Option<Point> {
    let mut parts = line.split(|c: char| c == ',' || c.is_whitespace()).filter(|s| !s.is_empty());
    let x: f64 = parts.next()?.parse().ok()?;
    let y: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Point::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_point_accepts_common_formats() {
        assert_eq!(parse_point("10 20"), Some(Point::new(10.0, 20.0)));
        assert_eq!(parse_point("10,20"), Some(Point::new(10.0, 20.0)));
        assert_eq!(parse_point("10, 20"), Some(Point::new(10.0, 20.0)));
        assert_eq!(parse_point("ten twenty"), None);
        assert_eq!(parse_point("10 20 30"), None);
        assert_eq!(parse_point("10"), None);
    }
}
