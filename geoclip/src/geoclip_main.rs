/*
 * Copyright 2021 Boyd Johnson
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use clap::{
    app_from_crate, crate_authors, crate_description, crate_name, crate_version, App, AppSettings,
    Arg, SubCommand,
};
use geoclip_common::error::GeoClipError;
use geojson::feature::Id;
use ops::Operation;
use std::{
    path::{Path, PathBuf},
    process::exit,
};

mod input;
mod ops;

fn main() {
    let matches = parse_args();
    let (name, sub_matches) = matches.subcommand();
    let sub_matches = sub_matches.expect("subcommand is required");
    let operation = name
        .parse::<Operation>()
        .expect("subcommand names match operations");

    let positionals: Vec<PathBuf> = sub_matches
        .values_of("INPUT")
        .map(|values| values.map(PathBuf::from).collect())
        .unwrap_or_default();
    let subject = sub_matches.value_of("subject").map(PathBuf::from);
    let stdin_is_tty = atty::is(atty::Stream::Stdin);

    // nothing piped in and no GeoJSON named on the command line
    if stdin_is_tty && positionals.is_empty() && subject.is_none() {
        eprintln!("{}", matches.usage());
        eprintln!("Please provide some GeoJSON via stdin or positionals");
        exit(1);
    }

    // difference requires a distinguished base operand
    if operation == Operation::Difference && stdin_is_tty && subject.is_none() {
        eprintln!("{}", matches.usage());
        eprintln!("difference requires either input on stdin or -s / --subject to be set");
        exit(1);
    }

    let points_goal = match sub_matches
        .value_of("points")
        .expect("points has a default")
        .parse::<usize>()
    {
        Ok(points) => points,
        Err(_) => {
            eprintln!("Error: -p / --points requires a whole number");
            exit(1);
        }
    };
    let id = sub_matches.value_of("id").map(parse_feature_id);
    let output = sub_matches.value_of("output").map(PathBuf::from);

    let quiet = sub_matches.is_present("quiet");
    let mut warn: Box<dyn FnMut(&str)> = if quiet {
        Box::new(|_: &str| {})
    } else {
        Box::new(|msg: &str| eprintln!("Warning: {}", msg))
    };

    let opts = input::GatherOptions {
        subject,
        read_stdin: !stdin_is_tty,
        use_bboxes: sub_matches.is_present("bboxes"),
    };

    if let Err(err) = run(
        operation,
        &positionals,
        &opts,
        points_goal,
        id,
        output.as_deref(),
        &mut *warn,
    ) {
        eprintln!("Error: {}", err);
        exit(1);
    }
}

fn run(
    operation: Operation,
    positionals: &[PathBuf],
    opts: &input::GatherOptions,
    points_goal: usize,
    id: Option<Id>,
    output: Option<&Path>,
    warn: &mut dyn FnMut(&str),
) -> Result<(), GeoClipError> {
    let multi_polys = input::gather_inputs(positionals, opts, warn)?;
    let result = ops::apply_batched(operation, multi_polys, points_goal);
    let feature = ops::to_feature(result, id);
    ops::write_feature(&feature, output)
}

/// A feature id is numeric when it parses as one, a plain string otherwise.
fn parse_feature_id(raw: &str) -> Id {
    if let Ok(n) = raw.parse::<i64>() {
        return Id::Number(n.into());
    }
    match raw.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
        Some(n) => Id::Number(n),
        None => Id::String(raw.to_string()),
    }
}

fn parse_args<'a>() -> clap::ArgMatches<'a> {
    app_from_crate!()
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .global(true)
                .help("File to write resulting GeoJSON out to"),
        )
        .arg(
            Arg::with_name("id")
                .short("i")
                .long("id")
                .takes_value(true)
                .global(true)
                .help("GeoJSON Feature id to add to output GeoJSON"),
        )
        .arg(
            Arg::with_name("points")
                .short("p")
                .long("points")
                .takes_value(true)
                .default_value("1000")
                .global(true)
                .help("Goal number of points to process at a time"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .global(true)
                .help("Suppress warnings"),
        )
        .subcommand(operation_subcommand("union", "Compute the union"))
        .subcommand(operation_subcommand("intersection", "Compute the intersection"))
        .subcommand(
            operation_subcommand("difference", "Compute the difference")
                .arg(
                    Arg::with_name("subject")
                        .short("s")
                        .long("subject")
                        .takes_value(true)
                        .help("GeoJSON file containing the subject"),
                )
                .arg(
                    Arg::with_name("bboxes")
                        .short("b")
                        .long("bboxes")
                        .help("Respect any pre-computed bounding boxes found"),
                ),
        )
        .subcommand(operation_subcommand("xor", "Compute the xor"))
        .get_matches()
}

fn operation_subcommand<'a, 'b>(name: &'static str, about: &'static str) -> App<'a, 'b> {
    SubCommand::with_name(name).about(about).arg(
        Arg::with_name("INPUT")
            .multiple(true)
            .help("GeoJSON files, or directories of .geojson files"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feature_id_integer() {
        assert_eq!(parse_feature_id("7"), Id::Number(7.into()));
    }

    #[test]
    fn test_parse_feature_id_decimal() {
        assert_eq!(
            parse_feature_id("7.5"),
            Id::Number(serde_json::Number::from_f64(7.5).unwrap())
        );
    }

    #[test]
    fn test_parse_feature_id_string() {
        assert_eq!(parse_feature_id("yup"), Id::String("yup".to_string()));
    }
}
