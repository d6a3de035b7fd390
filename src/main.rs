// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use anyhow::{anyhow, Result};
use chart_remap::{driver, Pipeline, Profile};
use std::env;
use std::path::PathBuf;
use tracing::{info, Level};

fn print_usage() {
    println!("CHART-REMAP - gh2 to ms chart converter");
    println!();
    println!("Usage: chart-remap [OPTIONS] [DIR]");
    println!();
    println!("Converts every chart in DIR (default: current directory) whose name");
    println!("ends with the profile's input suffix (default _gh2.mid).");
    println!();
    println!("Options:");
    println!("  --file <PATH>       Convert this chart (repeatable, skips discovery)");
    println!("  --profile <PATH>    Load a conversion profile (.yaml or .toml)");
    println!("  --dump-profile      Print the built-in profile as YAML and exit");
    println!("  --verbose           Log every pipeline step");
    println!("  --quiet             Only log warnings and errors");
    println!("  --help              Show this help message");
}

/// Parsed command line
struct Args {
    dir: PathBuf,
    files: Vec<PathBuf>,
    profile: Option<PathBuf>,
    dump_profile: bool,
    level: Level,
    help: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut parsed = Args {
        dir: PathBuf::from("."),
        files: Vec::new(),
        profile: None,
        dump_profile: false,
        level: Level::INFO,
        help: false,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--file" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--file requires a path"))?;
                parsed.files.push(PathBuf::from(path));
            }
            "--profile" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--profile requires a path"))?;
                parsed.profile = Some(PathBuf::from(path));
            }
            "--dump-profile" => parsed.dump_profile = true,
            "--verbose" | "-v" => parsed.level = Level::DEBUG,
            "--quiet" | "-q" => parsed.level = Level::WARN,
            "--help" | "-h" => parsed.help = true,
            other if other.starts_with('-') => {
                return Err(anyhow!("Unknown option: {}", other));
            }
            dir => parsed.dir = PathBuf::from(dir),
        }
    }
    Ok(parsed)
}

fn main() -> Result<()> {
    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("Error: {}", err);
            print_usage();
            std::process::exit(1);
        }
    };

    if args.help {
        print_usage();
        return Ok(());
    }

    if args.dump_profile {
        print!("{}", Profile::builtin().to_yaml()?);
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_max_level(args.level)
        .with_target(false)
        .init();

    let profile = match &args.profile {
        Some(path) => Profile::load(path)?,
        None => Profile::builtin(),
    };
    let pipeline = Pipeline::new(&profile)?;
    info!("Using profile '{}'", profile.name);

    let inputs = if args.files.is_empty() {
        driver::discover(&args.dir, &profile.naming)?
    } else {
        args.files.clone()
    };

    let summary = driver::run_batch(&inputs, &pipeline, &profile.naming);
    info!(
        "{} converted, {} failed",
        summary.converted.len(),
        summary.failed.len()
    );

    if !summary.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.dir, PathBuf::from("."));
        assert!(args.files.is_empty());
        assert!(args.profile.is_none());
        assert_eq!(args.level, Level::INFO);
    }

    #[test]
    fn test_options() {
        let args = parse(&[
            "--file", "a_gh2.mid", "--file", "b_gh2.mid", "--profile", "p.yaml", "-v", "charts",
        ])
        .unwrap();
        assert_eq!(
            args.files,
            vec![PathBuf::from("a_gh2.mid"), PathBuf::from("b_gh2.mid")]
        );
        assert_eq!(args.profile, Some(PathBuf::from("p.yaml")));
        assert_eq!(args.level, Level::DEBUG);
        assert_eq!(args.dir, PathBuf::from("charts"));
    }

    #[test]
    fn test_bad_options() {
        assert!(parse(&["--file"]).is_err());
        assert!(parse(&["--bogus"]).is_err());
    }
}
