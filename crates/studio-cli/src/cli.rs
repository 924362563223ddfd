use std::path::PathBuf;

use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{Arg, ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser, value_parser};
use clap_complete::Shell;

use studio_core::config::DEFAULT_CONFIG_FILE;
use studio_core::execute::CallArgs;
use studio_core::ir::{ArgKind, ArgSpec, Command};
use studio_core::render::TableFormat;
use studio_core::transform::CommandRegistry;

/// Subcommands that exist regardless of the API description.
pub const BUILTINS: [&str; 2] = ["completions", "verify_access"];

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "studio",
    about = "Command-line client for the Studio public API",
    version
)]
pub struct GlobalArgs {
    /// Credentials file
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Log every request and token refresh
    #[arg(long)]
    pub debug: bool,

    /// Render CSV analytics reports as a table
    #[arg(long, alias = "table_format", value_name = "STYLE", value_parser = table_format_parser())]
    pub table_format: Option<TableFormat>,

    /// Where downloaded media and caption files are written
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,
}

impl Default for GlobalArgs {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG_FILE),
            debug: false,
            table_format: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl GlobalArgs {
    /// Read the global flags before the command tree exists.
    ///
    /// Anything unrecognised (including the subcommand and its flags) is
    /// skipped; the full parse later reports real usage errors.
    pub fn bootstrap<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        GlobalArgs::command()
            .disable_help_flag(true)
            .disable_version_flag(true)
            .ignore_errors(true)
            .allow_external_subcommands(true)
            .try_get_matches_from(args)
            .ok()
            .and_then(|matches| GlobalArgs::from_arg_matches(&matches).ok())
            .unwrap_or_default()
    }
}

fn table_format_parser() -> impl TypedValueParser<Value = TableFormat> {
    PossibleValuesParser::new(TableFormat::ALL.map(|f| f.name()))
        .try_map(|name| name.parse::<TableFormat>())
}

/// The full command tree: global flags, built-ins, then one subcommand per
/// registered API operation.
pub fn build_cli(registry: &CommandRegistry) -> clap::Command {
    let mut cli = GlobalArgs::command()
        .subcommand(
            clap::Command::new("completions")
                .about("Print a shell completion script")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(value_parser!(Shell)),
                ),
        )
        .subcommand(
            clap::Command::new("verify_access")
                .about("Refresh tokens and check that the API answers ping"),
        );

    for command in registry.iter() {
        cli = cli.subcommand(build_operation_command(command));
    }
    cli
}

fn build_operation_command(command: &Command) -> clap::Command {
    let mut cmd = clap::Command::new(command.name.clone()).about(command.summary().to_string());
    for spec in command.arg_specs() {
        cmd = cmd.arg(build_arg(&spec));
    }
    cmd
}

fn build_arg(spec: &ArgSpec) -> Arg {
    let arg = Arg::new(spec.name.clone())
        .long(spec.name.clone())
        .help(spec.help.clone())
        .required(spec.required)
        .action(ArgAction::Set);

    if !spec.allowed_values.is_empty() {
        return arg.value_parser(PossibleValuesParser::new(spec.allowed_values.clone()));
    }
    match spec.kind {
        ArgKind::Integer => arg.value_parser(value_parser!(i64)),
        ArgKind::Text => arg,
    }
}

/// Supplied flag values as the user typed them, keyed by parameter name.
pub fn collect_args(command: &Command, matches: &ArgMatches) -> CallArgs {
    command
        .operation
        .parameter_names()
        .filter_map(|name| {
            let value = matches.get_raw(name)?.next()?.to_str()?;
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use studio_core::parse;

    const STUDIO: &str = include_str!("../tests/fixtures/studio-apidocs.json");

    fn registry() -> CommandRegistry {
        let schema = parse::from_json(STUDIO).unwrap();
        CommandRegistry::build_with_reserved(&schema, &BUILTINS).unwrap()
    }

    fn parse(args: &[&str]) -> Result<ArgMatches, clap::Error> {
        build_cli(&registry()).try_get_matches_from(args)
    }

    #[test]
    fn test_command_tree_is_consistent() {
        build_cli(&registry()).debug_assert();
    }

    #[test]
    fn test_one_subcommand_per_operation() {
        let registry = registry();
        let cli = build_cli(&registry);
        let names: Vec<&str> = cli.get_subcommands().map(|c| c.get_name()).collect();
        assert_eq!(names.len(), registry.len() + BUILTINS.len());
        assert!(names.contains(&"show_collections_media"));
        assert!(names.contains(&"verify_access"));
        assert!(!names.contains(&"add_media"));
    }

    #[test]
    fn test_collect_args() {
        let registry = registry();
        let matches = build_cli(&registry)
            .try_get_matches_from([
                "studio",
                "show_collections_media",
                "--collection_id",
                "3",
                "--sort",
                "title",
            ])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        let args = collect_args(registry.get(name).unwrap(), sub);

        assert_eq!(args.len(), 2);
        assert_eq!(args["collection_id"], "3");
        assert_eq!(args["sort"], "title");
    }

    #[test]
    fn test_integer_flag_rejects_text() {
        let err = parse(&["studio", "show_media", "--media_id", "abc"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_required_flag_enforced() {
        let err = parse(&["studio", "search_media"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_enum_flag_rejects_unknown_value() {
        let err = parse(&[
            "studio",
            "add_collections_permissions",
            "--collection_id",
            "1",
            "--user_email",
            "a@example.test",
            "--role",
            "owner",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_global_flags() {
        let matches = parse(&[
            "studio",
            "--table_format",
            "fancy_grid",
            "--output-dir",
            "/tmp/out",
            "show_perspectives_insights_users",
            "--perspective_id",
            "p1",
        ])
        .unwrap();
        let globals = GlobalArgs::from_arg_matches(&matches).unwrap();
        assert_eq!(globals.table_format, Some(TableFormat::FancyGrid));
        assert_eq!(globals.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(globals.config, PathBuf::from("config.json"));
    }

    #[test]
    fn test_unknown_table_format() {
        let err = parse(&["studio", "--table-format", "html", "ping"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_bootstrap_ignores_subcommand() {
        let globals = GlobalArgs::bootstrap([
            "studio",
            "--config",
            "/etc/studio.json",
            "--debug",
            "show_media",
            "--media_id",
            "5",
        ]);
        assert_eq!(globals.config, PathBuf::from("/etc/studio.json"));
        assert!(globals.debug);
    }

    #[test]
    fn test_bootstrap_defaults_on_help() {
        let globals = GlobalArgs::bootstrap(["studio", "--help"]);
        assert_eq!(globals, GlobalArgs::default());
    }
}
