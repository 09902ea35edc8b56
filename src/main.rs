use clap::error::ErrorKind;
use std::process::exit;

use getcertexpiry::cli::parse_args;
use getcertexpiry::logging::init_tracing;
use getcertexpiry::{check, Outcome, Status};

fn main() {
    let cli = match parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            let rendered = err.to_string();
            let mut lines = rendered.lines();
            println!("{}", lines.next().unwrap_or("invalid arguments"));
            for line in lines.filter(|l| !l.trim().is_empty()) {
                eprintln!("{}", line);
            }
            exit(Status::ArgumentsInvalid.exit_code());
        }
    };

    init_tracing(cli.verbose);

    let outcome = match cli.into_request() {
        Ok(request) => check(&request),
        Err(err) => Outcome::from(err),
    };

    println!("{}", outcome.report_line());
    exit(outcome.exit_code());
}
