//! Integration tests for wardmap CLI commands.
//!
//! These tests run the actual binary and verify end-to-end behavior.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Get the path to the wardmap binary from the workspace root.
fn binary_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop(); // Go up from wardmap-cli to crates
    path.pop(); // Go up from crates to repo root

    // Try release first, then debug
    let release = path.join("target/release/wardmap");
    if release.exists() {
        return release;
    }
    path.join("target/debug/wardmap")
}

/// Get the path to a test asset file.
fn asset_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop(); // Go up from wardmap-cli to crates
    path.pop(); // Go up from crates to repo root
    path.push("test_assets");
    path.push(name);
    path
}

#[test]
fn help_command_shows_usage() {
    let output = Command::new(binary_path())
        .arg("help")
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(stderr.contains("locate"), "Should mention locate command");
    assert!(stderr.contains("districts"), "Should mention districts command");
    assert!(stderr.contains("overlay"), "Should mention overlay command");
    assert!(stderr.contains("collect"), "Should mention collect command");
}

#[test]
fn districts_command_lists_builtin_board() {
    let output = Command::new(binary_path())
        .arg("districts")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    for name in ["Watson", "Westbrook", "City Center", "Heywood", "Pacifica", "Santo Domingo"] {
        assert!(stdout.contains(name), "Should list district '{}'", name);
    }
    assert!(stdout.contains("6 districts"), "Should report the district count");
}

#[test]
fn districts_command_reads_file() {
    let output = Command::new(binary_path())
        .args(["districts", "-d", asset_path("districts.json").to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Watson"), "Should list Watson from the file");
    assert!(stdout.contains("6 districts"), "Should report six districts");
}

#[test]
fn locate_finds_watson() {
    let output = Command::new(binary_path())
        .args(["locate", "400", "200"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("District: Watson"),
        "(400, 200) should be in Watson, got: {}",
        stdout
    );
    assert!(stdout.contains("Centroid:"), "Should print the centroid");
}

#[test]
fn locate_reports_no_match_without_failing() {
    let output = Command::new(binary_path())
        .args(["locate", "5000", "5000"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "A miss is a normal outcome, not an error");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("No district contains"),
        "Should report the miss, got: {}",
        stdout
    );
}

#[test]
fn locate_converts_display_coordinates() {
    // Display (200, 100) at scale 0.5 is original (400, 200) - Watson
    let output = Command::new(binary_path())
        .args(["locate", "200", "100", "--scale", "0.5"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("District: Watson"),
        "Scaled point should land in Watson, got: {}",
        stdout
    );
}

#[test]
fn locate_joins_game_state() {
    let output = Command::new(binary_path())
        .args([
            "locate",
            "300",
            "650",
            "-g",
            asset_path("gamestate.json").to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("District: City Center"),
        "(300, 650) should be in City Center, got: {}",
        stdout
    );
    assert!(stdout.contains("Dominant: Arasaka"), "Should show the dominant faction");
    assert!(stdout.contains("Arasaka"), "Should list Arasaka units");
    assert!(stdout.contains("Militech"), "Should list Militech units");
}

#[test]
fn locate_degrades_without_game_state_file() {
    let output = Command::new(binary_path())
        .args(["locate", "400", "200", "-g", "no/such/gamestate.json"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Missing game state must not abort locate");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("District: Watson"), "Detection still works");
    assert!(
        stderr.contains("unit display disabled"),
        "Should report the disabled feature, got: {}",
        stderr
    );
}

#[test]
fn locate_overlap_tie_break_first_declared_wins() {
    let dir = std::env::temp_dir();
    let path = dir.join("wardmap_overlap_test.json");
    std::fs::write(
        &path,
        r#"{"First": [[0,0],[100,0],[100,100],[0,100]], "Second": [[50,50],[150,50],[150,150],[50,150]]}"#,
    )
    .expect("Failed to write temp districts");

    // (75, 75) is inside both polygons
    let output = Command::new(binary_path())
        .args(["locate", "75", "75", "-d", path.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("District: First"),
        "First-declared district wins the overlap, got: {}",
        stdout
    );
}

#[test]
fn overlay_produces_svg_on_stdout() {
    let output = Command::new(binary_path())
        .arg("overlay")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<svg"), "Should emit an SVG document");
    assert!(stdout.contains("<path"), "Should contain boundary paths");
    assert!(stdout.contains("Watson"), "Should label districts");
    assert!(stdout.contains("</svg>"), "Should close the SVG document");
}

#[test]
fn overlay_with_game_state_draws_markers() {
    let output = Command::new(binary_path())
        .args(["overlay", "-g", asset_path("gamestate.json").to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<circle"), "Should draw unit markers");

    // Three Watson units -> at least three markers somewhere in the doc
    let markers = stdout.matches("<circle").count();
    assert!(markers >= 3, "Expected several markers, got {}", markers);
}

#[test]
fn collect_accumulates_undo_and_dedupes() {
    let mut child = Command::new(binary_path())
        .args(["collect", "Watson"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn command");

    {
        let stdin = child.stdin.as_mut().expect("Failed to open stdin");
        // Second line is a widget re-delivery; undo drops (200, 200)
        stdin
            .write_all(b"100 100\n100 100\n200 200\nundo\n300 300\n")
            .expect("Failed to write stdin");
    }

    let output = child.wait_with_output().expect("Failed to wait for command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        stdout.contains("(100, 100), (300, 300)"),
        "Human export should reflect dedupe and undo, got: {}",
        stdout
    );
    assert!(stdout.contains("\"Watson\""), "JSON export should name the district");
    assert!(stdout.contains("exported_at"), "JSON export carries a timestamp");
    assert!(stderr.contains("Duplicate"), "Should report the ignored duplicate");
}

#[test]
fn collect_seeded_from_file_appends() {
    let mut child = Command::new(binary_path())
        .args([
            "collect",
            "Watson",
            "-d",
            asset_path("districts.json").to_str().unwrap(),
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn command");

    {
        let stdin = child.stdin.as_mut().expect("Failed to open stdin");
        stdin.write_all(b"999 999\n").expect("Failed to write stdin");
    }

    let output = child.wait_with_output().expect("Failed to wait for command");
    let stderr = String::from_utf8_lossy(&output.stderr);

    // Watson ships with 12 boundary points; the new one is #13
    assert!(
        stderr.contains("Point 13"),
        "Seeded session should append after existing points, got: {}",
        stderr
    );
}
