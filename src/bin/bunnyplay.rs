use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use bunnyplay::{
    Canvas, Clock as _, FrameRGBA, FsLoader, ManualClock, MediaLoader, MemoryLoader, Player,
    PlayerConfig, PlayerEvent, PlayerPhase, Playlist, PlaylistEntry, SyntheticVideo, VisualFrame,
};
use clap::{Parser, Subcommand};

/// Upper bound on real time spent waiting for one load while simulated time is held.
const LOAD_WAIT: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(name = "bunnyplay", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a playlist headlessly on a manual clock and print the status log.
    Simulate(SimulateArgs),
    /// Render one composited frame at a point in time as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct SourceArgs {
    /// Playlist JSON. Without it a built-in synthetic playlist is used.
    #[arg(long)]
    playlist: Option<PathBuf>,

    /// Player config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory relative urls are resolved against (defaults to the playlist's directory).
    #[arg(long)]
    assets_root: Option<PathBuf>,

    /// Viewport width.
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Viewport height.
    #[arg(long, default_value_t = 360)]
    height: u32,

    /// Tick interval in milliseconds.
    #[arg(long, default_value_t = 50)]
    step_ms: u64,

    /// Simulated user gesture time in milliseconds. Without it autoplay stays locked unless the
    /// config allows it.
    #[arg(long)]
    gesture_at_ms: Option<u64>,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Simulated duration in seconds.
    #[arg(long, default_value_t = 30.0)]
    seconds: f64,

    /// Write a PNG every `frame_every_ms` into this directory.
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 500)]
    frame_every_ms: u64,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Time to render at, in milliseconds from start.
    #[arg(long)]
    at_ms: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Simulate(args) => cmd_simulate(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn demo_playlist() -> anyhow::Result<(Playlist, Box<dyn MediaLoader>)> {
    let playlist = Playlist::new(vec![
        PlaylistEntry::video("demo://clip-a"),
        PlaylistEntry::image("demo://still-b", 5.0),
        PlaylistEntry::video("demo://clip-c"),
    ])?;
    let loader = MemoryLoader::new()
        .with_video(
            "demo://clip-a",
            SyntheticVideo::new(1280, 720, 10.0, [180, 40, 60, 255]),
        )
        .with_image("demo://still-b", VisualFrame::solid(800, 800, [40, 90, 200, 255]))
        .with_video(
            "demo://clip-c",
            SyntheticVideo::new(960, 540, 6.0, [30, 160, 90, 255]),
        );
    Ok((playlist, Box::new(loader)))
}

fn build_player(source: &SourceArgs, clock: &ManualClock) -> anyhow::Result<Player> {
    let config = match &source.config {
        Some(path) => PlayerConfig::from_json_file(path)?,
        None => PlayerConfig::default(),
    };
    let (playlist, loader) = match &source.playlist {
        Some(path) => {
            let playlist = Playlist::from_json_file(path)?;
            let root = source
                .assets_root
                .clone()
                .or_else(|| path.parent().map(Path::to_path_buf))
                .unwrap_or_else(|| PathBuf::from("."));
            (playlist, Box::new(FsLoader::new(root)) as Box<dyn MediaLoader>)
        }
        None => demo_playlist()?,
    };
    Ok(Player::new(playlist, loader, Box::new(clock.clone()), config)?)
}

/// Step the player from its current time to `until_ms`, starting playback as soon as the first
/// item is in and replaying the simulated gesture.
fn drive(
    player: &mut Player,
    clock: &ManualClock,
    source: &SourceArgs,
    until_ms: u64,
    mut on_step: impl FnMut(&mut Player, u64) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let step = source.step_ms.max(1);
    let mut started = false;
    let mut gestured = false;
    let mut t = clock.now().as_millis() as u64;
    while t < until_ms {
        if !gestured && source.gesture_at_ms.is_some_and(|g| t >= g) {
            gestured = true;
            player.user_gesture();
            if !player.is_playing() {
                let _ = player.play();
            }
        }
        tick_logged(player);
        // Loads run on worker threads; hold simulated time until they resolve.
        let wait_start = std::time::Instant::now();
        while matches!(player.phase(), PlayerPhase::Loading { .. })
            && wait_start.elapsed() < LOAD_WAIT
        {
            std::thread::sleep(Duration::from_millis(2));
            tick_logged(player);
        }
        if !started && player.current_kind().is_some() {
            started = true;
            let _ = player.play();
        }
        on_step(player, t)?;
        clock.advance_ms(step);
        t += step;
    }
    Ok(())
}

fn tick_logged(player: &mut Player) {
    if let Err(e) = player.tick() {
        tracing::debug!(error = %e, "tick reported a recoverable error");
    }
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let clock = ManualClock::new();
    let mut player = build_player(&args.source, &clock)?;
    let log_clock = clock.clone();
    let _sub = player.subscribe(move |e| match e {
        PlayerEvent::StatusChanged(status) => {
            println!("[{:>8.3}s] {status}", log_clock.now().as_secs_f64());
        }
        PlayerEvent::Switched { index, kind } => {
            println!(
                "[{:>8.3}s] -> item {} ({kind})",
                log_clock.now().as_secs_f64(),
                index + 1
            );
        }
        _ => {}
    });

    if let Some(dir) = &args.frames_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create frames dir '{}'", dir.display()))?;
    }
    let viewport = Canvas::new(args.source.width, args.source.height)?;
    let every = args.frame_every_ms.max(1);
    let until_ms = (args.seconds.max(0.0) * 1000.0) as u64;
    let mut written = 0usize;

    drive(&mut player, &clock, &args.source, until_ms, |player, t| {
        let Some(dir) = &args.frames_dir else {
            return Ok(());
        };
        if t % every != 0 {
            return Ok(());
        }
        let frame = player.render(viewport)?;
        write_png(&frame, &dir.join(format!("frame_{t:08}.png")))?;
        written += 1;
        Ok(())
    })?;

    println!(
        "done: item {}/{}, playing={}, music volume {:.2}",
        player.current_index() + 1,
        player.playlist().len(),
        player.is_playing(),
        player.audio_volume()
    );
    if written > 0 {
        eprintln!("wrote {written} frames");
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let clock = ManualClock::new();
    let mut player = build_player(&args.source, &clock)?;
    drive(&mut player, &clock, &args.source, args.at_ms, |_, _| Ok(()))?;
    player.tick()?;

    let viewport = Canvas::new(args.source.width, args.source.height)?;
    let frame = player.render(viewport)?;
    write_png(&frame, &args.out)?;
    eprintln!("wrote {} ({})", args.out.display(), player.status());
    Ok(())
}

fn write_png(frame: &FrameRGBA, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))?;
    Ok(())
}
