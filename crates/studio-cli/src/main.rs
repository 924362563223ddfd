mod cli;

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::FromArgMatches;

use studio_core::client::SessionClient;
use studio_core::config::JsonFileStore;
use studio_core::execute::execute;
use studio_core::ir::HttpMethod;
use studio_core::render::RenderOptions;
use studio_core::transform::CommandRegistry;

use cli::GlobalArgs;

fn main() -> ExitCode {
    let globals = GlobalArgs::bootstrap(std::env::args_os());
    init_logging(globals.debug);

    match run(&globals) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` applies unless `--debug` forces debug level everywhere.
fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn run(bootstrap: &GlobalArgs) -> Result<ExitCode> {
    let store = JsonFileStore::new(&bootstrap.config);
    let mut client = SessionClient::with_default_transport(Box::new(store))?;

    let schema = client
        .fetch_schema()
        .context("could not load the API description")?;
    let registry = CommandRegistry::build_with_reserved(&schema, &cli::BUILTINS)?;

    let mut app = cli::build_cli(&registry);
    let matches = app.get_matches_mut();
    let globals = GlobalArgs::from_arg_matches(&matches)?;

    let Some((name, sub)) = matches.subcommand() else {
        eprint!("{}", app.render_help());
        return Ok(ExitCode::FAILURE);
    };

    match name {
        "completions" => {
            let shell = sub
                .get_one::<clap_complete::Shell>("shell")
                .copied()
                .context("missing shell")?;
            clap_complete::generate(shell, &mut app, "studio", &mut io::stdout());
        }
        "verify_access" => verify_access(&mut client)?,
        _ => {
            let command = registry
                .get(name)
                .with_context(|| format!("unknown command {name}"))?;
            let args = cli::collect_args(command, sub);
            let options = RenderOptions {
                table_format: globals.table_format,
                output_dir: globals.output_dir,
            };
            let output = execute(&mut client, command, &args, &options)
                .with_context(|| format!("{name} failed"))?;
            println!("{output}");
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Prove the stored credentials work end to end: the refresh grant is
/// accepted and an authorized `ping` answers `pong`.
fn verify_access(client: &mut SessionClient) -> Result<()> {
    client.refresh().context("token refresh failed")?;

    let response = client.call(HttpMethod::Get, "ping", &[])?;
    let body = response.text();
    if response.status.as_u16() != 200 || body.trim() != "pong" {
        bail!(
            "ping returned {} with body {body:?}, expected 200 pong",
            response.status
        );
    }

    println!("Access verified for {}", client.credentials().origin());
    Ok(())
}
