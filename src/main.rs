// Copyright 2024-2026 the asdmkit collaborators
// Licensed under the MIT License.

/*! The main asdmkit driver command

Command-line access to ASDM dataset directories: summarize a dataset's
tables, or dump particular tables in human-readable form.

*/

use anyhow::{Context, Result};
use asdm::Dataset;
use clap::{arg, command, value_parser, ArgMatches, Command};
use std::path::PathBuf;
use std::process;

fn main() {
    let matches = command!()
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("summarize")
                .about("Print each table's row count in a dataset")
                .arg(
                    arg!(<DIR> "The path to the dataset directory")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("antennas")
                .about("List a dataset's antennas and the stations they sit on")
                .arg(
                    arg!(<DIR> "The path to the dataset directory")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("flags")
                .about("Print a dataset's flagging commands in time order")
                .arg(
                    arg!(<DIR> "The path to the dataset directory")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .get_matches();

    process::exit(match inner(matches) {
        Ok(code) => code,

        Err(e) => {
            eprintln!("error: {}", e);

            for cause in e.chain().skip(1) {
                eprintln!("  caused by: {}", cause);
            }

            1
        }
    });
}

fn inner(matches: ArgMatches) -> Result<i32> {
    match matches.subcommand() {
        Some(("summarize", sub)) => do_summarize(sub),
        Some(("antennas", sub)) => do_antennas(sub),
        Some(("flags", sub)) => do_flags(sub),
        _ => unreachable!(),
    }
}

fn load_dataset(matches: &ArgMatches) -> Result<Dataset> {
    let dir = matches
        .get_one::<PathBuf>("DIR")
        .expect("DIR is a required argument");

    Dataset::load(dir).with_context(|| format!("failed to load the dataset in {}", dir.display()))
}

fn do_summarize(matches: &ArgMatches) -> Result<i32> {
    let dataset = load_dataset(matches)?;

    for (name, count) in dataset.table_counts() {
        let rows = if count == 1 { "row" } else { "rows" };
        println!("{:16} {:6} {}", name, count, rows);
    }

    Ok(0)
}

fn do_antennas(matches: &ArgMatches) -> Result<i32> {
    let dataset = load_dataset(matches)?;

    for antenna in dataset.antenna().get() {
        let pad = antenna
            .station(dataset.station())
            .map(|s| s.name().to_owned())
            .unwrap_or_else(|_| format!("<dangling: {}>", antenna.station_id()));

        println!(
            "{:12} {:8} {:6.2} m  {:14} on {}",
            antenna.antenna_id(),
            antenna.name(),
            antenna.dish_diameter(),
            antenna.antenna_make(),
            pad
        );
    }

    Ok(0)
}

fn do_flags(matches: &ArgMatches) -> Result<i32> {
    let dataset = load_dataset(matches)?;

    for flag in dataset.flag_cmd().time_ordered() {
        println!(
            "MJD {:12.6} {:8} applied={:5} reason=\"{}\" {}",
            flag.time_interval().start().mjd(),
            flag.kind(),
            flag.applied(),
            flag.reason(),
            flag.command()
        );
    }

    Ok(0)
}
