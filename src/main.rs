#![cfg_attr(target_os = "android", allow(unused_imports, dead_code))]

use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info, warn};
use owo_colors::OwoColorize;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use mobileinfo::App;
use mobileinfo::permission::SdkVersion;
use mobileinfo::report::{DeviceReport, ReportOptions};
use mobileinfo::system::Platform;
use mobileinfo::system::fixed::FixedPlatform;

#[derive(Parser)]
#[command(name = "mobileinfo")]
#[command(version, about = "Print a device and connectivity report", long_about = None)]
struct Cli {
    /// Append the device identity and app version sections
    #[arg(short, long)]
    extended: bool,

    /// Print the report and permission outcome as JSON
    #[arg(long)]
    json: bool,

    /// Pick required permissions for this API level instead of the device's
    #[arg(long, value_name = "LEVEL")]
    sdk_version: Option<u32>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,

    /// Do not color section labels
    #[arg(long)]
    no_color: bool,

    /// Report on a built-in sample phone instead of this machine
    #[arg(long)]
    sample: bool,
}

#[cfg(not(target_os = "android"))]
fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_logging(cli.verbose)?;

    if cli.sample {
        run(&cli, FixedPlatform::sample())
    } else {
        run(&cli, mobileinfo::system::sys::NativePlatform::new())
    }
}

#[cfg(target_os = "android")]
fn main() -> Result<()> {
    let _ = Cli::parse();
    anyhow::bail!("on Android the report runs inside the app through NativeBridge")
}

fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("Failed to initialize logger")
}

#[cfg(not(target_os = "android"))]
fn run<P: Platform>(cli: &Cli, platform: P) -> Result<()> {
    use mobileinfo::notification::sys::NativeToaster;
    use mobileinfo::permission::sys::NativeBackend;

    let mut app = App::new(platform, NativeBackend::new(), NativeToaster::new("mobileinfo"))
        .options(ReportOptions {
            extended: cli.extended,
        });
    if let Some(level) = cli.sdk_version {
        app = app.sdk_version(SdkVersion(level));
    }

    pollster::block_on(app.start())?;
    let report = app.report().context("report was not built")?;
    let permissions = app.permissions().context("permissions were not resolved")?;

    if !permissions.all_granted() {
        warn!(
            "Missing permissions: {}",
            permissions
                .denied()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    if cli.json {
        let value = serde_json::json!({
            "permissions": permissions,
            "sections": report,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("Failed to serialize report")?
        );
    } else if cli.no_color || !std::io::stdout().is_terminal() {
        println!("{report}");
    } else {
        print_colored(report);
    }

    info!("Done");
    Ok(())
}

fn print_colored(report: &DeviceReport) {
    for section in report.sections() {
        let label = section.kind().label();
        let indent = label.len() + 2;
        let mut lines = section.lines().iter();
        println!(
            "{} {}",
            format!("{label}:").cyan().bold(),
            lines.next().map_or("", String::as_str)
        );
        for line in lines {
            println!("{:indent$}{line}", "");
        }
    }
}
