use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use ledanim::{
    Animation, AnimationDocument, AppConfig, PortFilter, PreviewClock, PreviewFrame, SectionMode,
    SystemPorts, SystemSerial, Tick, UploadService,
};

#[derive(Parser, Debug)]
#[command(name = "ledanim", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty animation file.
    New(NewArgs),
    /// Print an animation as JSON.
    Show(FileArgs),
    /// Add a section to a channel.
    Add(AddArgs),
    /// Cycle the mode of the section covering a division.
    Mode(AtArgs),
    /// Delete the section covering a division.
    Delete(AtArgs),
    /// Print per-channel brightness for a range of ticks.
    Preview(PreviewArgs),
    /// Run the real-time preview clock and print every frame.
    Play(PlayArgs),
    /// List serial ports that may belong to a controller.
    Ports(PortsArgs),
    /// Upload an animation to a controller.
    Upload(UploadArgs),
    /// Convert between `.cla` and JSON, by input extension.
    Convert(ConvertArgs),
}

#[derive(Parser, Debug)]
struct NewArgs {
    /// Output `.cla` path (the extension is added when missing).
    file: PathBuf,

    /// Number of channels.
    #[arg(long, default_value_t = ledanim::DEFAULT_CHANNEL_COUNT)]
    channels: usize,
}

#[derive(Parser, Debug)]
struct FileArgs {
    /// Animation `.cla` file.
    file: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    On,
    FadeOff,
    FadeOn,
}

impl From<ModeChoice> for SectionMode {
    fn from(m: ModeChoice) -> Self {
        match m {
            ModeChoice::On => SectionMode::On,
            ModeChoice::FadeOff => SectionMode::FadeOff,
            ModeChoice::FadeOn => SectionMode::FadeOn,
        }
    }
}

#[derive(Parser, Debug)]
struct AddArgs {
    /// Animation `.cla` file.
    file: PathBuf,

    /// Channel index (0-based).
    #[arg(long)]
    channel: usize,

    /// First division.
    #[arg(long)]
    start: u8,

    /// Last division.
    #[arg(long)]
    end: u8,

    /// Section mode.
    #[arg(long, value_enum, default_value_t = ModeChoice::On)]
    mode: ModeChoice,
}

#[derive(Parser, Debug)]
struct AtArgs {
    /// Animation `.cla` file.
    file: PathBuf,

    /// Channel index (0-based).
    #[arg(long)]
    channel: usize,

    /// Any division inside the section.
    #[arg(long)]
    at: u8,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Animation `.cla` file.
    file: PathBuf,

    /// First tick to print.
    #[arg(long, default_value_t = 0)]
    from: u32,

    /// Last tick to print; defaults to the end of the loop.
    #[arg(long)]
    to: Option<u32>,

    /// Print every n-th tick.
    #[arg(long, default_value_t = 1)]
    step: u32,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Animation `.cla` file.
    file: PathBuf,

    /// How long to play, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    duration_ms: u64,
}

#[derive(Parser, Debug)]
struct PortsArgs {
    /// Show every port instead of only likely controllers.
    #[arg(long)]
    all: bool,
}

#[derive(Parser, Debug)]
struct UploadArgs {
    /// Animation `.cla` file.
    file: PathBuf,

    /// Serial port name.
    #[arg(long)]
    port: String,

    /// Override the baud rate.
    #[arg(long)]
    baud: Option<u32>,

    /// Override the settle delay after opening the port, in milliseconds.
    #[arg(long)]
    settle_ms: Option<u64>,

    /// Override the echo deadline, in milliseconds.
    #[arg(long)]
    echo_timeout_ms: Option<u64>,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input `.cla` or `.json` file.
    input: PathBuf,

    /// Output path.
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::default(),
    };

    match cli.cmd {
        Command::New(args) => cmd_new(args),
        Command::Show(args) => cmd_show(args),
        Command::Add(args) => cmd_add(args),
        Command::Mode(args) => cmd_mode(args),
        Command::Delete(args) => cmd_delete(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Play(args) => cmd_play(args, &config),
        Command::Ports(args) => cmd_ports(args),
        Command::Upload(args) => cmd_upload(args, config),
        Command::Convert(args) => cmd_convert(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn open_doc(path: &Path) -> anyhow::Result<AnimationDocument> {
    AnimationDocument::open(path).with_context(|| format!("open animation '{}'", path.display()))
}

fn cmd_new(args: NewArgs) -> anyhow::Result<()> {
    let mut doc = AnimationDocument::with_animation(Animation::with_channels(args.channels));
    let written = doc.save_as(&args.file)?;
    println!("{}", written.display());
    Ok(())
}

fn cmd_show(args: FileArgs) -> anyhow::Result<()> {
    let doc = open_doc(&args.file)?;
    println!("{}", ledanim::to_json(doc.animation())?);
    Ok(())
}

fn cmd_add(args: AddArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.start < args.end,
        "section must span at least one division ({}..{})",
        args.start,
        args.end
    );
    anyhow::ensure!(
        args.end <= ledanim::MAX_DIVISION,
        "end must be at most {}",
        ledanim::MAX_DIVISION
    );

    let mut doc = open_doc(&args.file)?;
    {
        let mut ed = doc.edit();
        anyhow::ensure!(
            ed.animation().channel(args.channel).is_some(),
            "channel {} does not exist",
            args.channel
        );
        let r = ed.insert_point(args.channel, args.start).with_context(|| {
            format!(
                "division {} on channel {} is inside another section",
                args.start, args.channel
            )
        })?;
        if !ed.resize_end(r, i32::from(args.end)) {
            ed.delete_section(r);
            anyhow::bail!(
                "section {}..{} overlaps another section on channel {}",
                args.start,
                args.end,
                args.channel
            );
        }
        let mode = SectionMode::from(args.mode);
        // New sections start as `On`; at most two cycles reach any mode.
        for _ in 0..2 {
            if ed.section(r).map(|s| s.mode) == Some(mode) {
                break;
            }
            ed.change_mode(r);
        }
        ed.commit(args.channel);
    }
    doc.save()?;
    Ok(())
}

fn cmd_mode(args: AtArgs) -> anyhow::Result<()> {
    let mut doc = open_doc(&args.file)?;
    let mode = {
        let mut ed = doc.edit();
        let r = ed
            .select_at(args.channel, args.at)
            .with_context(|| format!("no section at {} on channel {}", args.at, args.channel))?;
        ed.change_mode(r)
            .with_context(|| format!("no section at {} on channel {}", args.at, args.channel))?
    };
    doc.save()?;
    println!("{mode:?}");
    Ok(())
}

fn cmd_delete(args: AtArgs) -> anyhow::Result<()> {
    let mut doc = open_doc(&args.file)?;
    {
        let mut ed = doc.edit();
        let r = ed
            .select_at(args.channel, args.at)
            .with_context(|| format!("no section at {} on channel {}", args.at, args.channel))?;
        ed.delete_section(r);
        ed.commit(args.channel);
    }
    doc.save()?;
    Ok(())
}

fn print_frame(out: &mut impl std::io::Write, frame: &PreviewFrame) -> std::io::Result<()> {
    write!(out, "{}", frame.tick.0)?;
    for level in &frame.levels {
        write!(out, "\t{level}")?;
    }
    writeln!(out)
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.step > 0, "--step must be non-zero");
    let doc = open_doc(&args.file)?;
    let anim = doc.animation();
    let to = args.to.unwrap_or(ledanim::loop_end(anim).0);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for t in (args.from..=to).step_by(args.step as usize) {
        print_frame(&mut out, &ledanim::sample(anim, Tick(t)))?;
    }
    out.flush()?;
    Ok(())
}

fn cmd_play(args: PlayArgs, config: &AppConfig) -> anyhow::Result<()> {
    let doc = open_doc(&args.file)?.into_shared();
    let frames = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&frames);
    let clock = PreviewClock::spawn_with_observer(
        doc,
        config.preview.clone(),
        move |frame: &PreviewFrame| {
            if let Ok(mut frames) = sink.lock() {
                frames.push(frame.clone());
            }
        },
    )?;
    clock.play();
    std::thread::sleep(Duration::from_millis(args.duration_ms));
    clock.stop();
    drop(clock);

    let frames = frames
        .lock()
        .map_err(|_| anyhow::anyhow!("frame buffer poisoned"))?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for frame in frames.iter() {
        print_frame(&mut out, frame)?;
    }
    out.flush()?;
    Ok(())
}

fn cmd_ports(args: PortsArgs) -> anyhow::Result<()> {
    let filter = if args.all {
        PortFilter::Any
    } else {
        PortFilter::current()
    };
    let ports = ledanim::spawn_discovery(Arc::new(SystemPorts), filter)?
        .wait()
        .context("port discovery was cancelled")??;
    for port in ports {
        println!("{port}");
    }
    Ok(())
}

fn cmd_upload(args: UploadArgs, config: AppConfig) -> anyhow::Result<()> {
    let mut opts = config.upload;
    if let Some(baud) = args.baud {
        opts.link.baud_rate = baud;
    }
    if let Some(ms) = args.settle_ms {
        opts.settle_ms = ms;
    }
    if let Some(ms) = args.echo_timeout_ms {
        opts.echo_timeout_ms = ms;
    }

    let doc = open_doc(&args.file)?.into_shared();
    let service = UploadService::new(Arc::new(SystemSerial), opts);
    service
        .start(&doc, &args.port)?
        .wait()
        .with_context(|| format!("upload to '{}'", args.port))?;
    println!("upload verified");
    Ok(())
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let is_json = args
        .input
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        let f = File::open(&args.input)
            .with_context(|| format!("open '{}'", args.input.display()))?;
        let anim = ledanim::from_json_reader(BufReader::new(f))?;
        let written = AnimationDocument::with_animation(anim).save_as(&args.output)?;
        println!("{}", written.display());
    } else {
        let doc = open_doc(&args.input)?;
        let json = ledanim::to_json(doc.animation())?;
        std::fs::write(&args.output, json)
            .with_context(|| format!("write '{}'", args.output.display()))?;
        println!("{}", args.output.display());
    }
    Ok(())
}
