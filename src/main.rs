//! Línea de comandos del traductor.
//!
//! Este módulo lee el archivo fuente, invoca la traducción y escribe
//! el resultado. La salida solo se crea si la traducción fue exitosa.

use anyhow::{self, Context};
use bbc::{
    options::{Format, Options, Trace},
    translate,
};
use clap::{self, crate_version, Arg, ArgAction, Command};

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process,
};

fn main() -> anyhow::Result<()> {
    // Argumentos
    let args = Command::new("Bare bones to C translator")
        .version(crate_version!())
        .arg(
            Arg::new("input")
                .required(true)
                .value_name("INPUT")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Bare bones source file"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .takes_value(true)
                .value_name("FILE")
                .default_value("out.c")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Output file ('-' for stdout)"),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .action(ArgAction::SetTrue)
                .conflicts_with("compact")
                .help("One statement per line, indented blocks"),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .action(ArgAction::SetTrue)
                .help("Minimal whitespace"),
        )
        .arg(
            Arg::new("trace-tokens")
                .long("trace-tokens")
                .action(ArgAction::SetTrue)
                .help("Print every token to stderr"),
        )
        .arg(
            Arg::new("trace-productions")
                .long("trace-productions")
                .action(ArgAction::SetTrue)
                .help("Print every grammar production to stderr"),
        )
        .get_matches();

    // El formato de la línea de comandos tiene prioridad sobre el de compilación
    let flag = |name: &str| args.get_one::<bool>(name).copied().unwrap_or(false);

    let mut options = Options::default();
    if flag("pretty") {
        options.format = Format::Pretty;
    } else if flag("compact") {
        options.format = Format::Compact;
    }

    if flag("trace-tokens") {
        options.trace |= Trace::TOKENS;
    }

    if flag("trace-productions") {
        options.trace |= Trace::PRODUCTIONS;
    }

    let input = args
        .get_one::<PathBuf>("input")
        .context("Missing input file")?;

    let output = args
        .get_one::<PathBuf>("output")
        .context("Missing output file")?;

    let text = fs::read_to_string(input)
        .with_context(|| format!("Cannot access the input file: {}", input.display()))?;

    let name = input.display().to_string();
    let translated = match translate(&name, &text, &options) {
        Ok(translated) => translated,
        Err(diagnostics) => {
            eprint!("{}", diagnostics);
            process::exit(1);
        }
    };

    if output == Path::new("-") {
        io::stdout()
            .write_all(translated.as_bytes())
            .context("Failed to write to stdout")?;
    } else {
        fs::write(output, translated)
            .with_context(|| format!("Failed to write output file: {}", output.display()))?;
    }

    Ok(())
}
