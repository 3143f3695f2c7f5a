use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use stewie::input::{ControllerDriver, Extras, InputMapper, LineDriver, Normalize, ResponseCurve};
use stewie::{
    LineSink, Program, Runtime, StewieResult, SystemClock, TeeSink, TransformSink, presets, replay,
};

#[derive(Parser, Debug)]
#[command(name = "stewie", version, about = "Transform streams for a Stewart platform")]
struct Cli {
    /// Raise the stderr log level (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Box in three planes, wave, spin; loops forever.
    Motions,
    /// Fast X-Y box; loops forever.
    BoxXy,
    /// Neutral, then waves forever.
    Wave,
    /// Tilted circle at 100 Hz, forever.
    Circle,
    /// Four tilted corners at 100 Hz; loops forever.
    Sweep,
    /// Rock about Z with a shrinking tick interval, then stop.
    Rock(TiltArgs),
    /// Spin the tilt axis while the angle ramps up, then stop.
    Spin(TiltArgs),
    /// Map controller sticks and triggers to transforms.
    Ds3(Ds3Args),
    /// Print every controller event.
    Ds3Dump(EventArgs),
    /// Run a JSON motion program.
    Play(PlayArgs),
    /// Print a built-in program as JSON.
    Export(ExportArgs),
    /// Prefix each stdin line with the milliseconds since start.
    Record(RecordArgs),
    /// Replay a recording at its recorded pace.
    Playback(PlaybackArgs),
}

#[derive(Parser, Debug)]
struct TiltArgs {
    /// Tilt angle in degrees.
    #[arg(default_value_t = 10.0, allow_negative_numbers = true)]
    tilt: f64,
}

#[derive(Parser, Debug)]
struct EventArgs {
    /// Read the controller line protocol from a file instead of stdin.
    #[arg(long)]
    events: Option<PathBuf>,

    /// Read a physical gamepad.
    #[cfg(feature = "gamepad")]
    #[arg(long, conflicts_with = "events")]
    gamepad: bool,
}

#[derive(Parser, Debug)]
struct Ds3Args {
    /// Rotation magnitude in degrees.
    #[arg(default_value_t = 3.0, allow_negative_numbers = true)]
    max_angle: f64,

    /// Translation magnitude.
    #[arg(default_value_t = 0.5, allow_negative_numbers = true)]
    max_distance: f64,

    /// Response curve applied to each axis before scaling.
    #[arg(long, value_enum, default_value_t = Curve::Linear)]
    curve: Curve,

    /// How stick and trigger positions become a transform.
    #[arg(long, value_enum, default_value_t = NormalizeMode::Clamp)]
    normalize: NormalizeMode,

    #[command(flatten)]
    source: EventArgs,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Curve {
    Linear,
    Expo,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum NormalizeMode {
    /// Fixed rotation and translation magnitude; only direction survives.
    Clamp,
    /// Per-axis scaling by `max_angle` and `max_distance`.
    Linear,
    /// Left stick tilts the platform, up to `max_angle`, as an axis-angle vector.
    AxisAngle,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Input program JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Preset {
    Motions,
    BoxXy,
    Wave,
    Circle,
    Sweep,
    Rock,
    Spin,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[arg(value_enum)]
    preset: Preset,

    /// Tilt for `rock` and `spin`.
    #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
    tilt: f64,
}

#[derive(Parser, Debug)]
struct RecordArgs {
    /// Write the recording here and echo stdin to stdout; without it the recording goes to
    /// stdout.
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlaybackArgs {
    /// Recording to replay; stdin when omitted.
    input: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.cmd {
        Command::Motions => run_program(&presets::motions()),
        Command::BoxXy => run_program(&presets::box_xy()),
        Command::Wave => run_program(&presets::wave()),
        Command::Circle => run_program(&presets::circle()),
        Command::Sweep => run_program(&presets::sweep()),
        Command::Rock(args) => run_program(&presets::rock(args.tilt)),
        Command::Spin(args) => run_program(&presets::spin(args.tilt)),
        Command::Ds3(args) => return cmd_ds3(args),
        Command::Ds3Dump(args) => return cmd_dump(args),
        Command::Play(args) => {
            let program = Program::from_path(&args.in_path)?;
            run_program(&program)
        }
        Command::Export(args) => return cmd_export(args),
        Command::Record(args) => return cmd_record(args),
        Command::Playback(args) => return cmd_playback(args),
    };
    finish(result)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_max_level(level)
        .init();
}

/// A downstream reader hanging up (`stewie circle | head`) is a normal way to stop.
fn finish<T>(result: StewieResult<T>) -> anyhow::Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(err) if err.is_broken_pipe() => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn run_program(program: &Program) -> StewieResult<()> {
    let mut rt = Runtime::new(SystemClock::new(), LineSink::stdout());
    program.sequencer().run(&mut rt).map(|_| ())
}

#[cfg(feature = "gamepad")]
fn open_gamepad(args: &EventArgs) -> anyhow::Result<Option<Box<dyn ControllerDriver>>> {
    if !args.gamepad {
        return Ok(None);
    }
    Ok(Some(Box::new(stewie::input::GilrsDriver::new()?)))
}

#[cfg(not(feature = "gamepad"))]
fn open_gamepad(_args: &EventArgs) -> anyhow::Result<Option<Box<dyn ControllerDriver>>> {
    Ok(None)
}

fn open_driver(args: &EventArgs) -> anyhow::Result<Box<dyn ControllerDriver>> {
    if let Some(pad) = open_gamepad(args)? {
        return Ok(pad);
    }
    Ok(match &args.events {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("open events '{}'", path.display()))?;
            Box::new(LineDriver::new(file))
        }
        None => Box::new(LineDriver::new(std::io::stdin())),
    })
}

fn cmd_ds3(args: Ds3Args) -> anyhow::Result<()> {
    tracing::info!("Max angle: {}", args.max_angle);
    tracing::info!("Max distance: {}", args.max_distance);

    let mut driver = open_driver(&args.source)?;
    if let Err(err) = driver.set_extras(Extras::quiet()) {
        tracing::warn!(%err, "failed to set controller extras");
    }

    let curve = match args.curve {
        Curve::Linear => ResponseCurve::Linear,
        Curve::Expo => ResponseCurve::Expo,
    };
    let normalize = match args.normalize {
        NormalizeMode::Clamp => Normalize::ClampDirection {
            max_angle: args.max_angle,
            max_distance: args.max_distance,
        },
        NormalizeMode::Linear => Normalize::Linear {
            angle_scale: args.max_angle,
            distance_scale: args.max_distance,
        },
        NormalizeMode::AxisAngle => Normalize::AxisAngle {
            max_angle: args.max_angle,
        },
    };
    let mut mapper = InputMapper::new(normalize).with_curve(curve);

    let sink = TeeSink::new(LineSink::stdout(), std::io::stderr());
    let mut rt = Runtime::new(SystemClock::new(), sink);
    finish(stewie::input::run_mapper(&mut rt, &mut driver, &mut mapper))
}

fn cmd_dump(args: EventArgs) -> anyhow::Result<()> {
    let mut driver = open_driver(&args)?;
    let mut rt = Runtime::new(SystemClock::new(), LineSink::stdout());
    finish(stewie::input::run_dump(&mut rt, &mut driver))
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let program = match args.preset {
        Preset::Motions => presets::motions(),
        Preset::BoxXy => presets::box_xy(),
        Preset::Wave => presets::wave(),
        Preset::Circle => presets::circle(),
        Preset::Sweep => presets::sweep(),
        Preset::Rock => presets::rock(args.tilt),
        Preset::Spin => presets::spin(args.tilt),
    };
    let json = program.to_json_pretty()?;
    println!("{json}");
    Ok(())
}

fn cmd_record(args: RecordArgs) -> anyhow::Result<()> {
    let input = std::io::stdin().lock();
    let result = match &args.out {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("create recording '{}'", path.display()))?;
            let mut rt = Runtime::new(SystemClock::new(), LineSink::new(file));
            let mut echo = LineSink::stdout();
            replay::record(&mut rt, input, Some(&mut echo as &mut dyn TransformSink))
        }
        None => {
            let mut rt = Runtime::new(SystemClock::new(), LineSink::stdout());
            replay::record(&mut rt, input, None)
        }
    };
    if let Ok(lines) = &result {
        tracing::debug!(lines, "recording finished");
    }
    finish(result)
}

fn cmd_playback(args: PlaybackArgs) -> anyhow::Result<()> {
    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("open recording '{}'", path.display()))?;
            Box::new(std::io::BufReader::new(file))
        }
        None => Box::new(std::io::stdin().lock()),
    };
    let mut rt = Runtime::new(SystemClock::new(), LineSink::stdout());
    let result = replay::playback(&mut rt, input);
    if let Ok(stats) = &result {
        tracing::info!(
            lines = stats.lines,
            late = stats.late,
            max_behind_ms = stats.max_behind.as_millis() as u64,
            "playback finished"
        );
    }
    finish(result)
}
