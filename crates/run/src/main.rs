/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use mc64k_run::{ENTRY_POINT, standard_test_host};
use mc64k_runtime::prelude::*;
use pico_args::Arguments;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_STACK_SIZE: usize = 64 * 1024;

pub fn init_logger() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::OFF.into())
        .from_env_lossy();

    fmt()
        .with_env_filter(filter)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage<W: Write>(mut out: W) {
    let _ = write!(
        out,
        "\
Usage: mc64k-run <object-file> [OPTIONS]\n\n\
Options:\n\
  --stack-size <bytes>    (machine stack size, default 65536)\n\
  --stats                 (print instruction count, elapsed time and MIPS)\n\
  --dump                  (dump the machine state to stderr after the run)\n\
  -h, --help              (print this help and exit)\n"
    );
}

fn main() -> ExitCode {
    let mut args = Arguments::from_env();

    if args.contains(["-h", "--help"]) {
        print_usage(io::stdout());
        return ExitCode::from(1);
    }

    let stack_size: usize = match args.opt_value_from_str("--stack-size") {
        Ok(size) => size.unwrap_or(DEFAULT_STACK_SIZE),
        Err(e) => {
            eprintln!("error: invalid value for `--stack-size`: {e}\n");
            print_usage(io::stderr());
            return ExitCode::from(1);
        }
    };

    let show_stats = args.contains("--stats");
    let dump = args.contains("--dump");

    let object_path: PathBuf = match args.free_from_str::<String>() {
        Ok(path) => PathBuf::from(path),
        Err(_) => {
            eprintln!("error: missing <object-file>\n");
            print_usage(io::stderr());
            return ExitCode::from(1);
        }
    };

    let leftover = args.finish();
    if !leftover.is_empty() {
        eprintln!("error: unexpected arguments: {leftover:?}\n");
        print_usage(io::stderr());
        return ExitCode::from(1);
    }

    init_logger();

    let host = standard_test_host();
    let setup = InterpreterSetup {
        stack_size,
        stats_enabled: show_stats,
    };

    let mut runtime = match Runtime::new(&host, &object_path, &setup) {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(1);
        }
    };

    let (status, timing) = match runtime.invoke_timed(ENTRY_POINT) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(1);
        }
    };

    if show_stats {
        eprintln!("{timing}");
    }

    if dump {
        let _ = runtime.interpreter().dump_state(&mut io::stderr().lock());
    }

    if status == Status::Completed {
        ExitCode::SUCCESS
    } else {
        eprintln!("error: execution ended with status: {status}");
        ExitCode::from(1)
    }
}
