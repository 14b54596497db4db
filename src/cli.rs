use anyhow::{Result, anyhow};
use log::{info, warn};
use pico_args::Arguments;
use std::{
    collections::BTreeMap,
    env,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use crate::config::{self, ConfigState};
use crate::input;
use crate::session::Session;

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    let subcmd: Option<String> = pargs.subcommand()?;

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.opt_free_from_str()?;
            match topic {
                Some(t) => print_subcmd_help(&t),
                None => print_help(),
            }
            Ok(())
        }

        Some("run") => {
            let profile: Option<String> = pargs.opt_value_from_str("--profile")?;
            let input: Option<PathBuf> = pargs.opt_value_from_str("--input")?;
            run_stream(profile.as_deref(), input)
        }

        Some("list") => {
            let st = ConfigState::load_or_install_default()?;
            for name in st.list_profiles() {
                let mark = if name == st.active_name { "*" } else { " " };
                println!("{mark} {name}");
            }
            Ok(())
        }

        Some("use") => {
            let name: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: signctl use <profile_name>"))?;
            let mut st = ConfigState::load_or_install_default()?;
            st.set_active(&name)?;
            println!("active profile: {}", st.active_name);
            Ok(())
        }

        Some("show") => {
            let st = ConfigState::load_or_install_default()?;
            let v = serde_json::json!({
                "active_profile": st.active_name,
                "config_dir": st.config_dir,
                "profile": st.profile,
            });
            println!("{}", serde_json::to_string_pretty(&v)?);
            Ok(())
        }

        Some("check") => {
            let path: PathBuf = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: signctl check <profile.toml>"))?;
            let profile = config::load_profile_file(&path)?;
            println!("ok: {}", path.display());
            println!("{}", serde_json::to_string_pretty(&profile.session)?);
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

fn run_stream(profile: Option<&str>, input: Option<PathBuf>) -> Result<()> {
    let st = ConfigState::load_or_install_default()?;
    let profile = match profile {
        Some(name) => st.load_profile(name)?,
        None => st.profile.clone(),
    };
    let name = profile.meta.name.as_deref().unwrap_or(&st.active_name);
    info!("run: profile '{name}'");

    let mut session = Session::new(profile.session);
    let mut reader = input::open(input.as_deref())?;
    let mut out = BufWriter::new(io::stdout().lock());

    let mut processed = 0u64;
    let mut discarded = 0u64;
    let mut seen: BTreeMap<String, u64> = BTreeMap::new();

    for item in reader.by_ref() {
        let frame = match item? {
            Ok(frame) => frame,
            Err(e) => {
                warn!("discarding frame: {e}");
                discarded += 1;
                continue;
            }
        };
        let report = session.process(frame);
        processed += 1;
        if let Some(g) = report.gesture {
            *seen.entry(g.to_string()).or_default() += 1;
        }
        serde_json::to_writer(&mut out, &report)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    info!(
        "run: {processed} frames processed, {discarded} discarded over {} lines, gestures {seen:?}",
        reader.line_no()
    );
    Ok(())
}

fn print_help() {
    println!(
        r#"signctl — hand-sign recognizer over landmark streams

USAGE:
  signctl help [command]                        Show general or command-specific help
  signctl run [--profile NAME] [--input PATH]   Classify a JSON Lines frame stream
  signctl list                                  List profiles
  signctl use <name>                            Switch active profile
  signctl show                                  Print the active profile
  signctl check <path>                          Validate a profile file

TIPS:
  - Profiles: ~/.config/signctl/profiles
  - Active profile pointer: ~/.config/signctl/active
  - Input: one {{"hands": [[21 landmarks], ...]}} object per line, stdin by default
  - Logging: RUST_LOG=debug for per-frame detail (stderr)
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "run" => println!(
            "usage: signctl run [--profile NAME] [--input PATH]\nReads frames (stdin unless --input), writes one JSON report per frame to stdout."
        ),
        "list" => {
            println!("usage: signctl list\nLists available profiles; marks active with '*'.")
        }
        "use" => println!("usage: signctl use <name>\nSwitches active profile to <name>."),
        "show" => println!("usage: signctl show\nPrints the active profile and config location."),
        "check" => println!(
            "usage: signctl check <path>\nParses and validates a profile file without installing it."
        ),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}
