//! Tests for the get and plan subcommands.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_get() {
    match parse(&["splitdl", "get", "https://example.com/file.iso"]) {
        CliCommand::Get { url, dir, workers } => {
            assert_eq!(url, "https://example.com/file.iso");
            assert!(dir.is_none());
            assert!(workers.is_none());
        }
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_parse_get_dir_and_workers() {
    match parse(&[
        "splitdl",
        "get",
        "https://example.com/x",
        "--dir",
        "/tmp",
        "-p",
        "12",
    ]) {
        CliCommand::Get { url, dir, workers } => {
            assert_eq!(url, "https://example.com/x");
            assert_eq!(dir.as_deref(), Some(Path::new("/tmp")));
            assert_eq!(workers, Some(12));
        }
        _ => panic!("expected Get with --dir and -p"),
    }
}

#[test]
fn cli_parse_get_requires_url() {
    assert!(Cli::try_parse_from(["splitdl", "get"]).is_err());
}

#[test]
fn cli_parse_plan() {
    match parse(&["splitdl", "plan", "1000", "--workers", "4"]) {
        CliCommand::Plan {
            total_size,
            workers,
        } => {
            assert_eq!(total_size, 1000);
            assert_eq!(workers, Some(4));
        }
        _ => panic!("expected Plan"),
    }
}

#[test]
fn cli_parse_plan_rejects_negative_size() {
    assert!(Cli::try_parse_from(["splitdl", "plan", "-5"]).is_err());
}
