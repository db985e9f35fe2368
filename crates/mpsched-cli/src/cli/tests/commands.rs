use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use clap_complete::Shell;
use std::path::PathBuf;

#[test]
fn cli_parse_simulate_defaults() {
    match parse(&["mpsched", "simulate"]) {
        CliCommand::Simulate { config, json } => {
            assert!(config.is_none());
            assert!(!json);
        }
        _ => panic!("expected Simulate"),
    }
}

#[test]
fn cli_parse_simulate_with_config_and_json() {
    match parse(&["mpsched", "simulate", "--config", "/tmp/paths.toml", "--json"]) {
        CliCommand::Simulate { config, json } => {
            assert_eq!(config, Some(PathBuf::from("/tmp/paths.toml")));
            assert!(json);
        }
        _ => panic!("expected Simulate with --config and --json"),
    }
}

#[test]
fn cli_parse_config() {
    match parse(&["mpsched", "config"]) {
        CliCommand::Config => {}
        _ => panic!("expected Config"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["mpsched", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_rejects_unknown_shell() {
    assert!(Cli::try_parse_from(["mpsched", "completions", "cmd"]).is_err());
}

#[test]
fn cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["mpsched"]).is_err());
}

#[test]
fn cli_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
