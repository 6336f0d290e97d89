use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use overlay_timeline::{
    ElementId, KeyframeId, Phase, PropertyKey, PropertyValue, SelectionContext, Workspace,
    format_ms, parse_time_input,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "overlay-timeline", version)]
struct Cli {
    /// Log engine decisions to stderr (repeat for more detail).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the display value and diamond state of one property.
    Resolve(PropertyArgs),
    /// Add a keyframe at the playhead (the diamond button).
    AddKeyframe(WriteArgs),
    /// Apply a property edit and report where it landed.
    Commit(WriteArgs),
    /// Parse a typed time against a phase duration.
    ParseTime(ParseTimeArgs),
    /// Print a map element's flight path in time order.
    Flight(FlightArgs),
}

#[derive(Args, Debug)]
struct PropertyArgs {
    /// Input workspace JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Element id.
    #[arg(long)]
    element: String,

    /// Property key, e.g. `opacity`.
    #[arg(long)]
    property: String,

    /// Phase shown on the timeline.
    #[arg(long, default_value = "in")]
    phase: String,

    /// Playhead in ms from the start of the phase.
    #[arg(long, default_value_t = 0.0)]
    playhead: f64,

    /// Selected keyframe id.
    #[arg(long)]
    selected: Option<u64>,
}

#[derive(Args, Debug)]
struct WriteArgs {
    #[command(flatten)]
    target: PropertyArgs,

    /// New value; parsed as a number when possible.
    #[arg(long)]
    value: String,

    /// Where to write the updated workspace (defaults to `--in`).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ParseTimeArgs {
    /// Time text: `500ms`, `1.5s`, `1.5` or `50%`.
    text: String,

    /// Phase duration in ms.
    #[arg(long)]
    duration: f64,
}

#[derive(Args, Debug)]
struct FlightArgs {
    /// Input workspace JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Map element id.
    #[arg(long)]
    element: String,

    /// Only list stops tagged with this phase.
    #[arg(long)]
    phase: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Resolve(args) => cmd_resolve(args),
        Command::AddKeyframe(args) => cmd_add_keyframe(args),
        Command::Commit(args) => cmd_commit(args),
        Command::ParseTime(args) => cmd_parse_time(args),
        Command::Flight(args) => cmd_flight(args),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

struct Target {
    element: ElementId,
    key: PropertyKey,
    ctx: SelectionContext,
}

fn load(args: &PropertyArgs) -> anyhow::Result<(Workspace, Target)> {
    let ws = Workspace::from_path(&args.in_path)
        .with_context(|| format!("load workspace '{}'", args.in_path.display()))?;
    let phase: Phase = args.phase.parse()?;
    let mut ctx = SelectionContext::at(phase, args.playhead);
    ctx.selected_keyframe = args.selected.map(KeyframeId);
    let target = Target {
        element: ElementId::new(args.element.clone()),
        key: args.property.parse()?,
        ctx,
    };
    Ok((ws, target))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{s}");
    Ok(())
}

fn save(ws: &Workspace, args: &WriteArgs) -> anyhow::Result<()> {
    let out = args.out.as_ref().unwrap_or(&args.target.in_path);
    ws.to_path(out)
        .with_context(|| format!("write workspace '{}'", out.display()))?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_resolve(args: PropertyArgs) -> anyhow::Result<()> {
    let (ws, t) = load(&args)?;
    let r = ws.resolver().resolve(&t.element, &t.key, &t.ctx);
    print_json(&r)
}

fn cmd_add_keyframe(args: WriteArgs) -> anyhow::Result<()> {
    let (mut ws, t) = load(&args.target)?;
    let out = ws.router().add_keyframe(
        &t.element,
        &t.key,
        PropertyValue::from_input(&args.value),
        &t.ctx,
    )?;
    save(&ws, &args)?;
    print_json(&serde_json::json!({
        "animation": out.animation,
        "keyframe": out.keyframe,
        "merged": out.merged,
    }))
}

fn cmd_commit(args: WriteArgs) -> anyhow::Result<()> {
    let (mut ws, t) = load(&args.target)?;
    let target = ws.router().commit(
        &t.element,
        &t.key,
        PropertyValue::from_input(&args.value),
        &t.ctx,
    )?;
    save(&ws, &args)?;
    print_json(&target)
}

fn cmd_parse_time(args: ParseTimeArgs) -> anyhow::Result<()> {
    let ms = parse_time_input(&args.text, args.duration)
        .with_context(|| format!("cannot parse '{}' as a time", args.text))?;
    println!("{ms} ({})", format_ms(ms));
    Ok(())
}

fn cmd_flight(args: FlightArgs) -> anyhow::Result<()> {
    let ws = Workspace::from_path(&args.in_path)
        .with_context(|| format!("load workspace '{}'", args.in_path.display()))?;
    let phase = args.phase.as_deref().map(str::parse::<Phase>).transpose()?;
    let element = ElementId::new(args.element);
    let summary = ws
        .flight_paths
        .get(&element)
        .map(|p| p.sequence_summary(phase))
        .with_context(|| format!("element '{element}' has no flight path"))?;
    print_json(&summary)
}
