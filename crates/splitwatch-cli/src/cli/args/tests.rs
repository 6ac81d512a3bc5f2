use super::*;
use clap::CommandFactory;
use clap::Parser;

#[test]
fn cli_debug_assert() {
    Cli::command().debug_assert();
}

#[test]
fn run_parses_flags() {
    let cli = Cli::try_parse_from([
        "splitwatch",
        "run",
        "--config",
        "cfg.yaml",
        "--rows-file",
        "rows.json",
        "--no-notify",
    ])
    .expect("parse should succeed");

    match cli.cmd {
        Command::Run(args) => {
            assert_eq!(args.config, Some(PathBuf::from("cfg.yaml")));
            assert_eq!(args.rows_file, Some(PathBuf::from("rows.json")));
            assert!(args.no_notify);
            assert!(!args.json);
        }
        _ => panic!("expected Command::Run"),
    }
}

#[test]
fn parse_splits_ticker_list() {
    let cli = Cli::try_parse_from([
        "splitwatch",
        "parse",
        "--response",
        "raw.txt",
        "--tickers",
        "ABCD,WXYZ",
    ])
    .expect("parse should succeed");

    match cli.cmd {
        Command::Parse(args) => {
            assert_eq!(args.tickers, vec!["ABCD", "WXYZ"]);
            assert_eq!(args.config, None);
        }
        _ => panic!("expected Command::Parse"),
    }
}

#[test]
fn parse_requires_tickers() {
    assert!(Cli::try_parse_from(["splitwatch", "parse", "--response", "raw.txt"]).is_err());
}

#[test]
fn classify_requires_input() {
    assert!(Cli::try_parse_from(["splitwatch", "classify"]).is_err());
}
