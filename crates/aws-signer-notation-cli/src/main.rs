//! `notation-aws-signer`: Notation plugin executable backed by AWS Signer.
//!
//! The first argument names the contract command. Requests arrive on stdin,
//! responses leave on stdout and failures leave as a JSON error object on
//! stderr with exit status 1.

use std::io::Write;

use aws_signer_notation::{PluginError, SignerPlugin};
use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;

mod args;
mod commands;
mod logging;

use args::Cli;
use commands::{dispatch, Output};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_LOG_FILE: i32 = 100;

fn main() {
    if logging::debug_enabled() {
        let opened = logging::log_path().and_then(|path| logging::open_log_file(&path));
        match opened {
            Ok(file) => {
                // stderr is reserved for the contract's error object.
                let _ = logging::init(file);
            }
            Err(_) => std::process::exit(EXIT_LOG_FILE),
        }
    }

    std::process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e)
            if matches!(
                e.kind(),
                ClapErrorKind::DisplayHelp
                    | ClapErrorKind::DisplayVersion
                    | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            e.exit()
        }
        Err(e) => {
            let command = std::env::args().nth(1).unwrap_or_default();
            tracing::debug!(error = %e, "invalid command line");
            return fail(&PluginError::validation(format!(
                "{:?} is not a supported command",
                command
            )));
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => return fail(&PluginError::generic(format!("failed to start runtime: {}", e))),
    };

    let plugin = SignerPlugin::for_cli();
    let result = runtime.block_on(dispatch(&plugin, cli.cmd, tokio::io::stdin()));

    match result {
        Ok(output) => match write_output(&output) {
            Ok(()) => EXIT_SUCCESS,
            Err(e) => fail(&PluginError::generic(format!("failed to write response: {}", e))),
        },
        Err(e) => fail(&e),
    }
}

fn write_output(output: &Output) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    match output {
        Output::Json(value) => serde_json::to_writer(&mut stdout, value)?,
        Output::Text(text) => writeln!(stdout, "{}", text)?,
    }
    stdout.flush()?;
    Ok(())
}

fn fail(err: &PluginError) -> i32 {
    tracing::debug!(code = err.kind().wire_code(), error = %err, "request failed");

    let mut stderr = std::io::stderr().lock();
    // Nothing more to report if stderr itself is gone.
    let _ = serde_json::to_writer(&mut stderr, &err.to_response());
    let _ = stderr.flush();
    EXIT_FAILURE
}
