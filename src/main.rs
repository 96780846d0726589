use std::path::PathBuf;
use std::sync::Arc;

use rasterlab::display::{Display, InputEvent, MouseButtonKind, RedrawFlag, RenderTarget, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use rasterlab::paint::{Direction, FourCorner, GradientStop, LinearGradient};
use rasterlab::text::{Alignment, BlockShaper, FontSpec, TextRequest};
use rasterlab::{BlendMode, Color, EngineConfig, Rect, Surface};
use sdl2::keyboard::Keycode;

struct Options {
    width: u32,
    height: u32,
    vsync: bool,
    config: Option<PathBuf>,
}

/// Parse command line arguments
fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut opts = Options {
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        vsync: true,
        config: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--no-vsync" => opts.vsync = false,
            "--width" | "-w" => {
                if i + 1 < args.len() {
                    if let Ok(w) = args[i + 1].parse::<u32>() {
                        opts.width = w;
                    }
                    i += 1;
                }
            },
            "--height" | "-h" => {
                if i + 1 < args.len() {
                    if let Ok(h) = args[i + 1].parse::<u32>() {
                        opts.height = h;
                    }
                    i += 1;
                }
            },
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    opts.config = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            },
            "--help" => {
                println!("Usage: rasterlab-demo [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --width W, -w W       Set window width (default: {})", DEFAULT_WIDTH);
                println!("  --height H, -h H      Set window height (default: {})", DEFAULT_HEIGHT);
                println!("  --config FILE, -c FILE  Engine config JSON");
                println!("  --no-vsync            Disable VSync");
                println!("  --help                Show this help message");
                std::process::exit(0);
            },
            other => log::warn!("ignoring unknown argument {:?}", other),
        }
        i += 1;
    }

    opts
}

/// Background scene: gradient sky, lit ground, outlines and a caption
fn draw_scene(surface: &mut Surface) -> rasterlab::Result<()> {
    let (w, h) = (surface.width(), surface.height());
    let radial = surface.config().radial(Color::from_rgb(255, 240, 180), 200);
    surface.with_draw_mode(|s| {
        let mut canvas = s.canvas()?;
        let horizon = (h * 2 / 3) as i32;

        let mut sky = LinearGradient::new(
            Direction::Vertical,
            &[
                GradientStop::new(0.0, Color::from_rgb(10, 20, 60)),
                GradientStop::new(70.0, Color::from_rgb(90, 60, 140)),
                GradientStop::new(100.0, Color::from_rgb(240, 140, 90)),
            ],
        )?;
        canvas.fill_rect_paint(Rect::new(0, 0, w, horizon as u32), &mut sky);

        let mut ground = FourCorner::new(
            Color::from_rgb(30, 70, 30),
            Color::from_rgb(40, 90, 40),
            Color::from_rgb(10, 30, 10),
            Color::from_rgb(20, 40, 15),
        );
        canvas.fill_rect_paint(Rect::new(0, horizon, w, h - horizon as u32), &mut ground);

        let mut sun = radial;
        let r = (h / 6) as i32;
        canvas.fill_ellipse_paint(Rect::new(w as i32 / 2 - r, horizon - r, 2 * r as u32, 2 * r as u32), &mut sun);

        canvas.fill_polygon(
            &[(40.0, horizon as f32), (140.0, horizon as f32 - 120.0), (260.0, horizon as f32)],
            Color::from_argb(200, 20, 20, 40),
            BlendMode::Alpha,
        )?;
        canvas.draw_circle(w as i32 - 80, 60, 30, Color::WHITE, BlendMode::Overwrite);
        canvas.draw_rect(Rect::new(4, 4, w - 8, h - 8), Color::from_argb(128, 255, 255, 255), BlendMode::Alpha);

        let mut caption = TextRequest::new("RASTERLAB\narrows move  space hide  r raise", FontSpec::new("block", 14));
        caption.alignment = Alignment::Center;
        caption.max_width = Some(w - 20);
        canvas.draw_text(&BlockShaper, &caption, (10, 16), Color::from_rgb(255, 255, 200))?;
        Ok(())
    })
}

/// Two overlapping sprites, drawn into their own buffers
fn create_sprites(surface: &mut Surface) -> rasterlab::Result<()> {
    let a = surface.create_sprite(100, 200, 64, 64)?;
    {
        let mut canvas = surface.sprite_canvas(a)?;
        canvas.fill_circle(32, 32, 30, Color::from_argb(220, 40, 120, 255), BlendMode::Overwrite);
        canvas.draw_circle(32, 32, 30, Color::WHITE, BlendMode::Overwrite);
    }
    let b = surface.create_sprite(140, 220, 48, 48)?;
    {
        let mut canvas = surface.sprite_canvas(b)?;
        canvas.fill_rect(Rect::new(0, 0, 48, 48), Color::from_argb(160, 255, 60, 40), BlendMode::Overwrite);
        canvas.line(0, 0, 47, 47, Color::WHITE);
        canvas.line(47, 0, 0, 47, Color::WHITE);
    }
    surface.set_sprite_visible(a, true)?;
    surface.set_sprite_visible(b, true)?;
    Ok(())
}

fn run(opts: &Options) -> Result<(), String> {
    let config = match &opts.config {
        Some(path) => EngineConfig::load(path).map_err(|e| e.to_string())?,
        None => EngineConfig::default(),
    };
    let mut surface = Surface::with_config(opts.width, opts.height, config).map_err(|e| e.to_string())?;

    let redraw = Arc::new(RedrawFlag::new());
    surface.observers().register(redraw.clone());

    draw_scene(&mut surface).map_err(|e| e.to_string())?;
    create_sprites(&mut surface).map_err(|e| e.to_string())?;
    // stack index; raising moves the selection along with the sprite
    let mut selected = 0;

    let (mut display, texture_creator) = Display::open("rasterlab", opts.width, opts.height, opts.vsync)?;
    let mut target = RenderTarget::with_size(&texture_creator, opts.width, opts.height)?;

    println!("=== rasterlab ===");
    println!("Resolution: {}x{}", opts.width, opts.height);
    println!("Controls:");
    println!("  Arrows      - Move selected sprite");
    println!("  Tab         - Select other sprite");
    println!("  Space       - Toggle selected sprite");
    println!("  R           - Raise selected sprite");
    println!("  B           - Blur background");
    println!("  I           - Invert background");
    println!("  Left click  - Flood fill background");
    println!("  Escape      - Quit");

    'main: loop {
        for event in display.poll_events() {
            let index = selected;
            let outcome = match event {
                InputEvent::Quit | InputEvent::KeyDown(Keycode::Escape) => break 'main,
                InputEvent::KeyDown(Keycode::Tab) => {
                    selected = (selected + 1) % surface.sprite_count();
                    Ok(())
                },
                InputEvent::KeyDown(key @ (Keycode::Left | Keycode::Right | Keycode::Up | Keycode::Down)) => {
                    let (dx, dy) = match key {
                        Keycode::Left => (-8, 0),
                        Keycode::Right => (8, 0),
                        Keycode::Up => (0, -8),
                        _ => (0, 8),
                    };
                    surface
                        .sprite(index)
                        .map(|s| (s.x(), s.y()))
                        .and_then(|(x, y)| surface.move_sprite(index, x + dx, y + dy))
                        .map(|()| surface.update())
                },
                InputEvent::KeyDown(Keycode::Space) => surface
                    .sprite(index)
                    .map(|s| s.is_visible())
                    .and_then(|visible| surface.set_sprite_visible(index, !visible))
                    .map(|()| surface.update()),
                InputEvent::KeyDown(Keycode::R) => surface.raise_sprite(index).map(|()| {
                    selected = surface.sprite_count() - 1;
                    surface.update();
                }),
                InputEvent::KeyDown(Keycode::B) => surface.with_draw_mode(|s| s.blur()),
                InputEvent::KeyDown(Keycode::I) => surface.with_draw_mode(|s| {
                    s.canvas()?.invert();
                    Ok(())
                }),
                InputEvent::MouseDown {
                    x,
                    y,
                    button: MouseButtonKind::Left,
                } => surface
                    .with_draw_mode(|s| s.flood_fill(x, y, Color::from_rgb(255, 200, 0)))
                    .map(|n| log::info!("flood filled {} pixels at ({}, {})", n, x, y)),
                _ => Ok(()),
            };
            if let Err(e) = outcome {
                log::warn!("{}", e);
            }
        }

        if redraw.take() {
            display.present(&mut target, surface.buffer())?;
        } else {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
    }

    Ok(())
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = parse_args();
    run(&opts)
}
