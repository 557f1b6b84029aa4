// src/main.rs

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use zenstab::{
    actions::{plan_from_flags, plan_from_settings, FeatureFlags, Toolbox},
    config::Settings,
    constants::{PROGRAM, VERSION},
    tweaks::{
        aslr::AslrControl,
        cpu::{c6_cstate, core_performance_boost},
        MsrFeatureControl,
    },
    utils::{
        cpu::{effective_uid, online_cores, sanity_check, ProcessorIdentity},
        msr::MsrDevice,
    },
};

/// Toggles C6 C-state, core performance boost and kernel ASLR on AMD Zen
/// (family 17h) processors.
#[derive(Parser, Debug)]
#[command(name = PROGRAM, version)]
struct Cli {
    /// Configuration file; takes precedence over the individual flags
    #[arg(long, value_name = "path")]
    config: Option<PathBuf>,

    /// Enable C6 C-state
    #[arg(long)]
    enable_c6: bool,

    /// Disable C6 C-state
    #[arg(long)]
    disable_c6: bool,

    /// Enable processor boosting
    #[arg(long)]
    enable_boosting: bool,

    /// Disable processor boosting
    #[arg(long)]
    disable_boosting: bool,

    /// Enable address space layout randomization (ASLR)
    #[arg(long)]
    enable_aslr: bool,

    /// Disable address space layout randomization (ASLR)
    #[arg(long)]
    disable_aslr: bool,
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    println!("{PROGRAM} {VERSION}");
    println!();

    // Diagnostics are printed and the process still exits normally; the
    // status report is the contract, not the exit code.
    if let Err(err) = run(&cli) {
        println!("Error: {err:#}.");
    }
}

fn init_tracing() {
    let level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let identity = ProcessorIdentity::detect();
    sanity_check(&identity, effective_uid())?;

    let cores = online_cores()?;
    let driver = MsrDevice;
    let toolbox = Toolbox {
        boosting: MsrFeatureControl::new(core_performance_boost(), &cores, &driver),
        c6: MsrFeatureControl::new(c6_cstate(), &cores, &driver),
        aslr: AslrControl::new(),
    };

    let plan = match &cli.config {
        Some(path) => {
            let settings = Settings::load(path)?;
            println!("Config file: {path:?}");
            plan_from_settings(&settings)
        }
        None => plan_from_flags(&FeatureFlags {
            enable_c6: cli.enable_c6,
            disable_c6: cli.disable_c6,
            enable_boosting: cli.enable_boosting,
            disable_boosting: cli.disable_boosting,
            enable_aslr: cli.enable_aslr,
            disable_aslr: cli.disable_aslr,
        }),
    };

    for action in plan {
        toolbox.run(action);
    }

    toolbox.show_status();
    Ok(())
}
