mod render;

use std::fs;
use std::io::{self, Read};
use std::ops::ControlFlow;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use openlabel_core::template::parse_assignment;
use openlabel_core::{
    Placeholders, Resolution, TemplateError, prepare, render as render_template, scale_commands,
};
use openlabel_print_client::PrinterConfig;
use openlabel_profile::{Profile, load_profile_from_str};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::render::{Format, print_json, render_command_error, render_template_error};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "openlabel",
    version,
    about = "Render ZPL label templates, rescale them for a printer's resolution, and print them"
)]
struct Cli {
    /// Output mode for status and errors: "pretty" for coloured terminal
    /// output, "json" for machine-readable JSON. Defaults to "pretty" when
    /// stderr is a TTY, "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG`
    /// takes precedence when set.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Expand a template: resolve {{IF}} blocks and substitute placeholders.
    Render {
        /// Template file, or `-` for stdin.
        file: String,
        #[command(flatten)]
        vars: VarArgs,
    },

    /// Rescale the geometry of a ZPL command stream for another resolution.
    Scale {
        /// ZPL file, or `-` for stdin.
        file: String,
        #[command(flatten)]
        resolution: ResolutionArgs,
    },

    /// Render a template, then rescale it (render + scale).
    Prepare {
        /// Template file, or `-` for stdin.
        file: String,
        #[command(flatten)]
        vars: VarArgs,
        #[command(flatten)]
        resolution: ResolutionArgs,
    },

    /// Render, optionally rescale, and send a label to a network printer.
    Print {
        /// Template file, or `-` for stdin.
        file: String,
        /// Printer address: IP, IP:PORT, hostname, hostname:PORT, or
        /// \\server\printer. Defaults to the profile's address.
        #[arg(long, short)]
        printer: Option<String>,
        /// Number of copies to send.
        #[arg(long, short = 'n', default_value_t = 1)]
        copies: u32,
        #[command(flatten)]
        vars: VarArgs,
        #[command(flatten)]
        resolution: ResolutionArgs,
        /// Prepare the label and report what would be sent, without
        /// connecting.
        #[arg(long)]
        dry_run: bool,
        /// Connect timeout in seconds.
        #[arg(long, value_name = "SECS", default_value_t = 5)]
        timeout: u64,
        /// Extra attempts after a transient connect or write failure.
        #[arg(long, default_value_t = 2)]
        retries: u32,
    },
}

/// Placeholder values for template rendering.
#[derive(Args, Debug)]
struct VarArgs {
    /// Placeholder value as KEY=VALUE. Repeatable. The key is matched
    /// literally in the template and doubles as an {{IF KEY}} condition.
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    vars: Vec<(String, String)>,

    /// JSON file with an object of placeholder values. `--var` entries
    /// override keys from the file.
    #[arg(long = "vars", value_name = "FILE")]
    vars_file: Option<String>,
}

/// Source and target resolution for scaling.
#[derive(Args, Debug)]
struct ResolutionArgs {
    /// Resolution (dpi) the label was designed for.
    #[arg(long = "from", value_name = "DPI")]
    from: Option<u32>,

    /// Resolution (dpi) of the target printer.
    #[arg(long = "to", value_name = "DPI", conflicts_with = "profile")]
    to: Option<u32>,

    /// Printer profile JSON; its `dpi` is the target resolution.
    #[arg(long, value_name = "FILE")]
    profile: Option<String>,
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    parse_assignment(s).ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let format = Format::resolve_or_detect(cli.output.as_deref());

    if let Err(e) = run(cli.cmd, format) {
        render_command_error(&e, format);
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cmd: Cmd, format: Format) -> Result<()> {
    match cmd {
        Cmd::Render { file, vars } => cmd_render(&file, &vars, format),
        Cmd::Scale { file, resolution } => cmd_scale(&file, &resolution),
        Cmd::Prepare {
            file,
            vars,
            resolution,
        } => cmd_prepare(&file, &vars, &resolution, format),
        Cmd::Print {
            file,
            printer,
            copies,
            vars,
            resolution,
            dry_run,
            timeout,
            retries,
        } => cmd_print(
            &file,
            PrintOptions {
                printer,
                copies,
                dry_run,
                timeout: Duration::from_secs(timeout),
                retries,
            },
            &vars,
            &resolution,
            format,
        ),
    }
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_render(file: &str, vars: &VarArgs, format: Format) -> Result<()> {
    let input = read_input(file)?;
    let placeholders = load_placeholders(vars)?;
    let rendered = render_or_exit(&input, file, &placeholders, format);
    print!("{rendered}");
    Ok(())
}

fn cmd_scale(file: &str, resolution: &ResolutionArgs) -> Result<()> {
    let input = read_input(file)?;
    let res = require_resolution(resolution)?;
    print!("{}", scale_commands(&input, res.source, res.target));
    Ok(())
}

fn cmd_prepare(
    file: &str,
    vars: &VarArgs,
    resolution: &ResolutionArgs,
    format: Format,
) -> Result<()> {
    let input = read_input(file)?;
    let placeholders = load_placeholders(vars)?;
    let res = require_resolution(resolution)?;
    match prepare(&input, &placeholders, res) {
        Ok(zpl) => print!("{zpl}"),
        Err(err) => exit_on_template_error(&input, file, &err, format),
    }
    Ok(())
}

struct PrintOptions {
    printer: Option<String>,
    copies: u32,
    dry_run: bool,
    timeout: Duration,
    retries: u32,
}

fn cmd_print(
    file: &str,
    opts: PrintOptions,
    vars: &VarArgs,
    resolution: &ResolutionArgs,
    format: Format,
) -> Result<()> {
    let input = read_input(file)?;
    let placeholders = load_placeholders(vars)?;
    let profile = load_profile(resolution.profile.as_deref())?;
    let res = optional_resolution(resolution, profile.as_ref())?;

    let Some(address) = opts
        .printer
        .or_else(|| profile.as_ref().and_then(|p| p.address.clone()))
    else {
        bail!("no printer address: pass --printer or use a profile with an address");
    };

    let rendered = render_or_exit(&input, file, &placeholders, format);
    let zpl = match res {
        Some(res) => scale_commands(&rendered, res.source, res.target),
        None => rendered,
    };

    if opts.dry_run {
        match format {
            Format::Json => print_json(&serde_json::json!({
                "success": true,
                "dry_run": true,
                "printer": address,
                "transport": "tcp",
                "copies": opts.copies,
                "bytes": zpl.len(),
                "zpl": zpl,
            })),
            Format::Pretty => {
                eprintln!(
                    "dry run: would send {} cop{} ({} bytes) to {address} via tcp",
                    opts.copies,
                    if opts.copies == 1 { "y" } else { "ies" },
                    zpl.len(),
                );
                print!("{zpl}");
            }
        }
        return Ok(());
    }

    let mut config = PrinterConfig::default();
    config.timeouts.connect = opts.timeout;
    config.retry.max_attempts = opts.retries.saturating_add(1);

    let summary = send(&address, opts.copies, &zpl, config, format)?;
    info!(printer = %address, sent = summary.sent, "print complete");

    match format {
        Format::Json => print_json(&serde_json::json!({
            "success": true,
            "printer": address,
            "summary": summary,
        })),
        Format::Pretty => eprintln!("sent {}/{} to {address}", summary.sent, summary.total),
    }
    Ok(())
}

/// Send the label, reporting each copy on stderr in pretty mode.
#[cfg(feature = "tcp")]
fn send(
    address: &str,
    copies: u32,
    zpl: &str,
    config: PrinterConfig,
    format: Format,
) -> Result<openlabel_print_client::PrintSummary> {
    openlabel_print_client::print_label_with_progress(address, copies, zpl, config, |progress| {
        if format == Format::Pretty {
            eprintln!("copy {}/{} sent", progress.sent, progress.total);
        }
        ControlFlow::Continue(())
    })
    .with_context(|| format!("failed to print to '{address}'"))
}

#[cfg(not(feature = "tcp"))]
fn send(
    _address: &str,
    _copies: u32,
    _zpl: &str,
    _config: PrinterConfig,
    _format: Format,
) -> Result<openlabel_print_client::PrintSummary> {
    bail!("this build has no TCP transport; rebuild with the `tcp` feature")
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Read a file, or stdin when `file` is `-`.
fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(file).with_context(|| format!("failed to read '{file}'"))
}

/// Expand a template, or report the template error and exit with code 1.
fn render_or_exit(input: &str, file: &str, placeholders: &Placeholders, format: Format) -> String {
    match render_template(input, placeholders) {
        Ok(text) => text,
        Err(err) => exit_on_template_error(input, file, &err, format),
    }
}

fn exit_on_template_error(input: &str, file: &str, err: &TemplateError, format: Format) -> ! {
    render_template_error(input, file, err, format);
    process::exit(1);
}

/// Merge placeholder values from `--vars FILE` and `--var KEY=VALUE`.
fn load_placeholders(args: &VarArgs) -> Result<Placeholders> {
    let mut placeholders = match &args.vars_file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read vars file '{path}'"))?;
            serde_json::from_str::<Placeholders>(&text).with_context(|| {
                format!("vars file '{path}' must be a JSON object of string values")
            })?
        }
        None => Placeholders::new(),
    };
    placeholders.extend(args.vars.iter().cloned());
    debug!(count = placeholders.len(), "loaded placeholders");
    Ok(placeholders)
}

fn load_profile(path: Option<&str>) -> Result<Option<Profile>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read profile '{path}'"))?;
    let profile =
        load_profile_from_str(&text).with_context(|| format!("invalid profile '{path}'"))?;
    debug!(id = %profile.id, dpi = profile.dpi, "loaded printer profile");
    Ok(Some(profile))
}

/// Resolve `--from` plus `--to`/`--profile`; both ends are required.
fn require_resolution(args: &ResolutionArgs) -> Result<Resolution> {
    let profile = load_profile(args.profile.as_deref())?;
    match optional_resolution(args, profile.as_ref())? {
        Some(res) => Ok(res),
        None => bail!("--from and one of --to or --profile are required"),
    }
}

/// Resolve the scaling pair. `None` means no scaling was requested.
fn optional_resolution(
    args: &ResolutionArgs,
    profile: Option<&Profile>,
) -> Result<Option<Resolution>> {
    let target = args.to.or(profile.map(|p| p.dpi));
    match (args.from, target) {
        (Some(0), _) | (_, Some(0)) => bail!("resolutions must be greater than zero"),
        (Some(source), Some(target)) => Ok(Some(Resolution::new(source, target))),
        (None, None) => Ok(None),
        (Some(_), None) => bail!("--from needs a target resolution: pass --to or --profile"),
        (None, Some(_)) => bail!("a target resolution needs --from (the label's design dpi)"),
    }
}
