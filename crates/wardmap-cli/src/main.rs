//! wardmap - TUI and CLI for board-map district annotation
//!
//! Usage:
//!   wardmap [board.yaml]                Launch TUI (default: board.yaml)
//!   wardmap locate <x> <y>              Which district contains a point
//!   wardmap districts                   Summarize the district table
//!   wardmap overlay -o out.svg          Render boundaries + unit markers
//!   wardmap collect <district>          Collect boundary points from stdin

use std::env;
use std::fs;
use std::io::{self, stdout};
use std::time::Duration;

use chrono::Local;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use image::{imageops::FilterType, DynamicImage, GenericImageView, RgbaImage};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use ratatui_image::{
    picker::{Picker, ProtocolType},
    protocol::StatefulProtocol,
    StatefulImage,
};

use wardmap_core::{
    centroid, detect_district, radial_positions, CollectorSession, DisplayScale, DistrictMap,
    GameState, Point,
};

mod cli;

use cli::overlay::faction_color;
use cli::{cmd_collect, cmd_districts, cmd_locate, cmd_overlay, BoardConfig};

/// Marker radius on the display image, in display pixels.
const MARKER_RADIUS: f64 = 6.0;

/// What a click means right now.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    /// Click -> which district is this, and who is in it
    Locate,
    /// Click -> append a boundary point for the selected district
    Collect,
}

impl Mode {
    fn name(&self) -> &'static str {
        match self {
            Mode::Locate => "locate",
            Mode::Collect => "collect",
        }
    }
}

/// A marker to paint on the display image: display-space center + color.
struct Marker {
    at: Point,
    radius: f64,
    color: [u8; 4],
}

/// Application state for TUI
struct App {
    /// Board recipe (paths, display box, marker spread)
    config: BoardConfig,
    /// District table used for detection
    districts: DistrictMap,
    /// Game state, when its file was loadable
    game: Option<GameState>,
    /// Collected boundary points for this sitting
    session: CollectorSession,
    /// Click interpretation
    mode: Mode,
    /// District selection for collect mode
    district_state: ListState,
    /// Display scale computed at image load
    scale: DisplayScale,
    /// Resized board image without markers
    base_image: Option<RgbaImage>,
    /// Display image dimensions
    display_dims: Option<(u32, u32)>,
    /// Markers painted over the board after the last click
    markers: Vec<Marker>,
    /// Image picker for terminal protocol detection
    picker: Picker,
    /// Current rendered image protocol state
    image_state: Option<Box<dyn StatefulProtocol>>,
    /// Flag to indicate image needs re-rendering
    needs_image_update: bool,
    /// Image viewport rect from the last draw, for mouse hit testing
    image_area: Option<Rect>,
    /// One-line status message
    status: String,
    /// Why the map is disabled, when it is
    map_note: Option<String>,
    /// Should exit
    should_quit: bool,
}

impl App {
    fn new(config: BoardConfig) -> Self {
        // Districts: configured file, falling back to the built-in table.
        let (districts, districts_note) = match &config.districts {
            Some(path) => match DistrictMap::load(path) {
                Ok(map) => (map, format!("districts: {}", path)),
                Err(e) => (
                    DistrictMap::default_board(),
                    format!("districts file unavailable ({}), using built-in table", e),
                ),
            },
            None => (DistrictMap::default_board(), "districts: built-in table".to_string()),
        };

        // Game state is optional: without it, locate mode reports the
        // district name only.
        let game = config
            .game_state
            .as_deref()
            .and_then(|path| match GameState::load(path) {
                Ok(state) => Some(state),
                Err(e) => {
                    eprintln!("Game state unavailable ({}); unit display disabled", e);
                    None
                }
            });

        // Board image: resized once to fit the display box. A missing
        // image disables the map viewport but nothing else.
        let mut scale = DisplayScale::identity();
        let mut base_image = None;
        let mut display_dims = None;
        let mut map_note = None;

        match image::open(&config.image) {
            Ok(img) => {
                let (orig_w, orig_h) = img.dimensions();
                scale = DisplayScale::fit(orig_w, orig_h, config.max_width, config.max_height);
                let (disp_w, disp_h) = scale.display_size(orig_w, orig_h);
                let resized = img.resize_exact(disp_w, disp_h, FilterType::Lanczos3);
                base_image = Some(resized.to_rgba8());
                display_dims = Some((disp_w, disp_h));
            }
            Err(e) => {
                map_note = Some(format!(
                    "board image '{}' unavailable ({}) - map clicks disabled",
                    config.image, e
                ));
            }
        }

        let mut district_state = ListState::default();
        if !districts.is_empty() {
            district_state.select(Some(0));
        }

        // Force Sixel like the rest of our terminal tooling expects
        let mut picker = Picker::from_termios().unwrap_or_else(|_| Picker::new((8, 16)));
        picker.protocol_type = ProtocolType::Sixel;

        let session = CollectorSession::with_boundaries(districts.clone());

        App {
            config,
            districts,
            game,
            session,
            mode: Mode::Locate,
            district_state,
            scale,
            base_image,
            display_dims,
            markers: Vec::new(),
            picker,
            image_state: None,
            needs_image_update: true,
            image_area: None,
            status: districts_note,
            map_note,
            should_quit: false,
        }
    }

    fn selected_district(&self) -> Option<&str> {
        let i = self.district_state.selected()?;
        self.districts.iter().nth(i).map(|d| d.name.as_str())
    }

    fn next_district(&mut self) {
        if self.districts.is_empty() {
            return;
        }
        let i = match self.district_state.selected() {
            Some(i) => (i + 1) % self.districts.len(),
            None => 0,
        };
        self.district_state.select(Some(i));
    }

    fn prev_district(&mut self) {
        if self.districts.is_empty() {
            return;
        }
        let i = match self.district_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.districts.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.district_state.select(Some(i));
    }

    /// Repaint the display image (base + markers) when dirty.
    fn update_image(&mut self) {
        if !self.needs_image_update {
            return;
        }
        let Some(base) = &self.base_image else {
            self.needs_image_update = false;
            return;
        };

        let mut img = base.clone();
        for marker in &self.markers {
            draw_disc(&mut img, marker.at, marker.radius, marker.color);
        }

        self.image_state = Some(
            self.picker
                .new_resize_protocol(DynamicImage::ImageRgba8(img)),
        );
        self.needs_image_update = false;
    }

    /// Map a terminal mouse click to display-image pixel coordinates.
    fn click_to_display(&self, column: u16, row: u16) -> Option<Point> {
        let area = self.image_area?;
        let (disp_w, disp_h) = self.display_dims?;

        if column < area.x
            || row < area.y
            || column >= area.x + area.width
            || row >= area.y + area.height
        {
            return None;
        }

        let (font_w, font_h) = self.picker.font_size;
        let avail_w = area.width as f64 * font_w as f64;
        let avail_h = area.height as f64 * font_h as f64;

        // The resize protocol only ever shrinks the picture to fit the
        // viewport; invert that shrink to get display-image pixels.
        let fit = (avail_w / disp_w as f64)
            .min(avail_h / disp_h as f64)
            .min(1.0);

        let px = ((column - area.x) as f64 + 0.5) * font_w as f64;
        let py = ((row - area.y) as f64 + 0.5) * font_h as f64;
        let x = px / fit;
        let y = py / fit;

        if x >= disp_w as f64 || y >= disp_h as f64 {
            return None;
        }
        Some(Point::new(x, y))
    }

    fn on_click(&mut self, column: u16, row: u16) {
        let Some(display) = self.click_to_display(column, row) else {
            return;
        };
        let original = self.scale.to_original(display);

        match self.mode {
            Mode::Locate => self.locate_click(original),
            Mode::Collect => self.collect_click(original),
        }
        self.needs_image_update = true;
    }

    fn locate_click(&mut self, original: Point) {
        self.markers.clear();

        let Some(name) = detect_district(&self.districts, original).map(str::to_string) else {
            self.status = format!(
                "({}, {}) -> no district",
                original.x as i64, original.y as i64
            );
            return;
        };

        let record = self.game.as_ref().and_then(|g| g.for_district(&name));
        self.status = match record {
            Some(r) => match &r.dominant {
                Some(dom) => format!(
                    "({}, {}) -> {} - dominant {}, {} units",
                    original.x as i64,
                    original.y as i64,
                    name,
                    dom,
                    r.unit_count()
                ),
                None => format!(
                    "({}, {}) -> {} - {} units",
                    original.x as i64,
                    original.y as i64,
                    name,
                    r.unit_count()
                ),
            },
            None => format!("({}, {}) -> {}", original.x as i64, original.y as i64, name),
        };

        // Paint unit markers radially around the district centroid, all in
        // display space. The spread is configured in original pixels, so
        // scale it before layout.
        let Some(district) = self.districts.get(&name) else {
            return;
        };
        let Ok(center) = centroid(&district.boundary.points) else {
            return;
        };
        let display_center = self.scale.to_display(center);
        let spread = self.config.marker_spread * self.scale.factor;

        match record {
            Some(record) if record.unit_count() > 0 => {
                let mut slots: Vec<&str> = Vec::new();
                for faction in record.factions_sorted() {
                    for _ in &record.units[faction] {
                        slots.push(faction);
                    }
                }
                let positions = radial_positions(display_center, slots.len(), spread);
                for (faction, pos) in slots.iter().zip(&positions) {
                    let dominant = record.dominant.as_deref() == Some(*faction);
                    self.markers.push(Marker {
                        at: *pos,
                        radius: if dominant { MARKER_RADIUS + 2.0 } else { MARKER_RADIUS },
                        color: hex_to_rgba(faction_color(faction)),
                    });
                }
            }
            _ => {
                // No unit data: mark the centroid so the hit is visible
                self.markers.push(Marker {
                    at: display_center,
                    radius: MARKER_RADIUS,
                    color: [220, 30, 30, 255],
                });
            }
        }
    }

    fn collect_click(&mut self, original: Point) {
        let Some(name) = self.selected_district().map(str::to_string) else {
            self.status = "No district selected".to_string();
            return;
        };

        if self.session.record_click(&name, original) {
            self.status = format!(
                "[{}] Point {}: ({}, {})",
                name,
                self.session.point_count(&name),
                original.x as i64,
                original.y as i64
            );
        } else {
            self.status = format!("[{}] duplicate click ignored", name);
        }

        // Show every collected point of the active district
        self.markers.clear();
        if let Some(district) = self.session.boundaries().get(&name) {
            for p in &district.boundary.points {
                self.markers.push(Marker {
                    at: self.scale.to_display(*p),
                    radius: MARKER_RADIUS / 2.0,
                    color: [255, 0, 0, 255],
                });
            }
        }
    }

    fn undo(&mut self) {
        let Some(name) = self.selected_district().map(str::to_string) else {
            return;
        };
        self.status = match self.session.undo_last(&name) {
            Some(p) => format!("[{}] removed ({}, {})", name, p.x as i64, p.y as i64),
            None => format!("[{}] nothing to undo", name),
        };
        self.refresh_collect_markers(&name);
    }

    fn clear_selected(&mut self) {
        let Some(name) = self.selected_district().map(str::to_string) else {
            return;
        };
        self.session.clear_district(&name);
        self.status = format!("[{}] cleared", name);
        self.refresh_collect_markers(&name);
    }

    fn reset_session(&mut self) {
        self.session.reset();
        self.markers.clear();
        self.status = "Session reset - all collected points dropped".to_string();
        self.needs_image_update = true;
    }

    fn refresh_collect_markers(&mut self, name: &str) {
        self.markers.clear();
        if let Some(district) = self.session.boundaries().get(name) {
            for p in &district.boundary.points {
                self.markers.push(Marker {
                    at: self.scale.to_display(*p),
                    radius: MARKER_RADIUS / 2.0,
                    color: [255, 0, 0, 255],
                });
            }
        }
        self.needs_image_update = true;
    }

    fn export(&mut self) {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = format!("collected_{}.json", stamp);
        let json = self.session.export_json(&Local::now().to_rfc3339());
        self.status = match fs::write(&path, json) {
            Ok(()) => format!("Exported session to {}", path),
            Err(e) => format!("Export failed: {}", e),
        };
    }

    fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            Mode::Locate => Mode::Collect,
            Mode::Collect => Mode::Locate,
        };
        self.markers.clear();
        self.needs_image_update = true;
        self.status = format!("Mode: {}", self.mode.name());
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Check for CLI subcommands
    if args.len() >= 2 {
        match args[1].as_str() {
            "locate" => {
                cmd_locate(&args[2..]);
                return;
            }
            "districts" => {
                cmd_districts(&args[2..]);
                return;
            }
            "overlay" => {
                cmd_overlay(&args[2..]);
                return;
            }
            "collect" => {
                cmd_collect(&args[2..]);
                return;
            }
            "help" | "--help" | "-h" => {
                print_usage(&args[0]);
                return;
            }
            _ => {}
        }
    }

    // Launch TUI
    let config_path = if args.len() >= 2 {
        args[1].as_str()
    } else {
        "board.yaml"
    };

    let config = match BoardConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_tui(config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_usage(prog: &str) {
    eprintln!("wardmap - map-district annotation and lookup");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {} [board.yaml]                    Launch TUI", prog);
    eprintln!("  {} locate <x> <y> [options]        Which district contains a point", prog);
    eprintln!("  {} districts [-d file]             Summarize the district table", prog);
    eprintln!("  {} overlay [options]               Render boundaries + unit markers", prog);
    eprintln!("  {} collect <district> [options]    Collect boundary points from stdin", prog);
    eprintln!();
    eprintln!("Locate options:");
    eprintln!("  -d, --districts <file>   District boundary JSON (default: built-in)");
    eprintln!("  -g, --game <file>        Game-state JSON for unit details");
    eprintln!("  --scale <f>              Treat <x> <y> as display coords at this scale");
    eprintln!();
    eprintln!("Overlay options:");
    eprintln!("  -d, --districts <file>   District boundary JSON (default: built-in)");
    eprintln!("  -g, --game <file>        Game-state JSON for unit markers");
    eprintln!("  -o, --output <file>      Output file (.svg or .png, default: stdout)");
    eprintln!("  --spread <n>             Marker circle radius in board pixels (default: 30)");
    eprintln!();
    eprintln!("Collect options:");
    eprintln!("  -d, --districts <file>   Seed boundaries to resume from");
    eprintln!("  -o, --output <file>      Write the JSON export here");
    eprintln!("  stdin                    One 'x y' per line; 'undo'/'clear' directives");
    eprintln!();
    eprintln!("TUI Controls:");
    eprintln!("  click         Locate district / collect boundary point");
    eprintln!("  Tab           Toggle locate/collect mode");
    eprintln!("  ↑/↓ or j/k    Select district (collect mode)");
    eprintln!("  u             Undo last point   c  Clear district   R  Reset session");
    eprintln!("  e             Export session    q  Quit");
}

fn run_tui(config: BoardConfig) -> Result<(), String> {
    // Initialize terminal
    enable_raw_mode().map_err(|e| e.to_string())?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| e.to_string())?;
    stdout()
        .execute(EnableMouseCapture)
        .map_err(|e| e.to_string())?;
    let mut terminal =
        Terminal::new(CrosstermBackend::new(stdout())).map_err(|e| e.to_string())?;

    let mut app = App::new(config);

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    stdout()
        .execute(DisableMouseCapture)
        .map_err(|e| e.to_string())?;
    disable_raw_mode().map_err(|e| e.to_string())?;
    stdout()
        .execute(LeaveAlternateScreen)
        .map_err(|e| e.to_string())?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), String> {
    loop {
        app.update_image();

        terminal
            .draw(|frame| ui(frame, app))
            .map_err(|_| "Draw error".to_string())?;

        if event::poll(Duration::from_millis(50)).map_err(|e| e.to_string())? {
            match event::read().map_err(|e| e.to_string())? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        app.should_quit = true;
                    }
                    KeyCode::Tab => {
                        app.toggle_mode();
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        app.prev_district();
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        app.next_district();
                    }
                    KeyCode::Char('u') => {
                        app.undo();
                    }
                    KeyCode::Char('c') => {
                        app.clear_selected();
                    }
                    KeyCode::Char('R') => {
                        app.reset_session();
                    }
                    KeyCode::Char('e') => {
                        app.export();
                    }
                    _ => {}
                },
                Event::Mouse(MouseEvent {
                    kind: MouseEventKind::Down(MouseButton::Left),
                    column,
                    row,
                    ..
                }) => {
                    app.on_click(column, row);
                }
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &mut App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(5)])
        .split(frame.area());

    let top_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(40)])
        .split(main_layout[0]);

    // Split left sidebar into district list and stats
    let sidebar_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(8)])
        .split(top_layout[0]);

    // District list with collected point counts
    let items: Vec<ListItem> = app
        .districts
        .iter()
        .map(|d| {
            let count = app.session.point_count(&d.name);
            ListItem::new(format!("{} ({})", d.name, count))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Districts ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("► ");

    frame.render_stateful_widget(list, sidebar_layout[0], &mut app.district_state);

    // Stats panel
    let game_line = match &app.game {
        Some(g) => format!("Game state: {} districts", g.len()),
        None => "Game state: none".to_string(),
    };
    let stats_text = format!(
        "Mode: {}\nScale: {:.2}\n{}\nRecent clicks: {}",
        app.mode.name(),
        app.scale.factor,
        game_line,
        app.session.recent().count(),
    );
    let stats = Paragraph::new(stats_text)
        .block(
            Block::default()
                .title(" Session ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta)),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(stats, sidebar_layout[1]);

    // Board viewport
    let border_color = match app.mode {
        Mode::Locate => Color::Green,
        Mode::Collect => Color::Yellow,
    };
    let image_block = Block::default()
        .title(format!(" {} [{}] ", app.config.image, app.mode.name()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner_area = image_block.inner(top_layout[1]);
    frame.render_widget(image_block, top_layout[1]);
    app.image_area = Some(inner_area);

    match (&mut app.image_state, &app.map_note) {
        (Some(image_state), _) => {
            let image_widget = StatefulImage::new(None);
            frame.render_stateful_widget(image_widget, inner_area, image_state);
        }
        (None, Some(note)) => {
            let msg = Paragraph::new(note.as_str())
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center);
            frame.render_widget(msg, inner_area);
        }
        (None, None) => {}
    }

    // Bottom: status, recent clicks, help
    let bottom_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Percentage(35),
            Constraint::Percentage(20),
        ])
        .split(main_layout[1]);

    let status = Paragraph::new(app.status.as_str())
        .block(Block::default().title(" Status ").borders(Borders::ALL))
        .style(Style::default().fg(Color::White));
    frame.render_widget(status, bottom_layout[0]);

    let recent_text = app
        .session
        .recent()
        .rev()
        .take(3)
        .map(|r| {
            format!(
                "{}: ({}, {})",
                r.district, r.point.x as i64, r.point.y as i64
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let recent = Paragraph::new(recent_text)
        .block(Block::default().title(" Recent ").borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(recent, bottom_layout[1]);

    let help = Paragraph::new("Tab mode  ↑↓ district\nu undo  c clear  R reset\ne export  q quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, bottom_layout[2]);
}

/// Paint a filled disc onto the display image.
fn draw_disc(img: &mut RgbaImage, center: Point, radius: f64, color: [u8; 4]) {
    let (w, h) = img.dimensions();
    let x0 = (center.x - radius).floor().max(0.0) as u32;
    let y0 = (center.y - radius).floor().max(0.0) as u32;
    let x1 = ((center.x + radius).ceil() as u32).min(w.saturating_sub(1));
    let y1 = ((center.y + radius).ceil() as u32).min(h.saturating_sub(1));
    let r2 = radius * radius;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f64 - center.x;
            let dy = y as f64 - center.y;
            if dx * dx + dy * dy <= r2 {
                img.put_pixel(x, y, image::Rgba(color));
            }
        }
    }
}

/// Parse a `#rrggbb` color into RGBA bytes.
fn hex_to_rgba(hex: &str) -> [u8; 4] {
    let hex = hex.trim_start_matches('#');
    let parse = |range| u8::from_str_radix(&hex[range], 16).unwrap_or(0);
    if hex.len() != 6 {
        return [0, 0, 0, 255];
    }
    [parse(0..2), parse(2..4), parse(4..6), 255]
}
