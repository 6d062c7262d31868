//! Tests for CLI parsing and command dispatch

use std::sync::Once;

use clap::{CommandFactory, Parser};
use rstest::rstest;

use hipstree::cli::commands::execute_command;
use hipstree::cli::{Cli, CliError, Commands};
use hipstree::config::global_config_path;
use hipstree::exitcode;

const SUITE: &str = "cli-test";

/// Points the global config lookup at an empty per-process directory and
/// clears `HIPSTREE_*` overrides, so the host's settings never leak in.
fn isolate_settings() {
    static ISOLATE: Once = Once::new();
    ISOLATE.call_once(|| {
        let dir = std::env::temp_dir().join(format!("hipstree-{}-{}", SUITE, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::env::set_var("XDG_CONFIG_HOME", &dir);
        for (key, _) in std::env::vars() {
            if key.starts_with("HIPSTREE_") {
                std::env::remove_var(key);
            }
        }
    });
}

#[cfg(target_os = "linux")]
#[test]
fn given_isolated_environment_then_global_config_is_absent() {
    isolate_settings();

    let path = global_config_path().expect("config dir");

    assert!(path.starts_with(std::env::temp_dir()), "{}", path.display());
    assert!(!path.exists());
}

#[test]
fn given_cli_definition_then_debug_assert_passes() {
    Cli::command().debug_assert();
}

#[test]
fn given_shuffle_args_when_parsing_then_fields_are_set() {
    let cli = Cli::try_parse_from([
        "hipstree", "-dd", "--seed", "7", "shuffle", "a", "b", "c", "d", "-n", "3", "-l", "1", "-g",
    ])
    .unwrap();

    assert_eq!(cli.debug, 2);
    assert_eq!(cli.seed, Some(7));
    match cli.command {
        Some(Commands::Shuffle {
            values,
            swaps,
            level,
            grandchildren,
        }) => {
            assert_eq!(values, vec!["a", "b", "c", "d"]);
            assert_eq!(swaps, 3);
            assert_eq!(level, Some(1));
            assert!(grandchildren);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[rstest]
#[case(&["hipstree", "--seed", "1", "shuffle", "1", "2", "3", "4"])]
#[case(&["hipstree", "--seed", "1", "shuffle", "1", "2", "3", "4", "-g", "-l", "0"])]
#[case(&["hipstree", "--seed", "1", "shuffle", "1", "2", "3", "4", "5", "6", "7", "8", "-g"])]
#[case(&["hipstree", "--seed", "1", "show", "--depth", "3"])]
#[case(&["hipstree", "--seed", "1", "demo", "--depth", "5", "--swaps", "2"])]
fn given_valid_command_when_executing_then_succeeds(#[case] args: &[&str]) {
    isolate_settings();
    let mut args = args.to_vec();
    // Keep the demo's print window inside a depth-5 tree.
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("hipstree.toml");
    std::fs::write(&path, "[demo]\nprint_count = 4\n").unwrap();
    let path = path.to_string_lossy().to_string();
    args.extend(["--config", path.as_str()]);

    let cli = Cli::try_parse_from(args).unwrap();

    execute_command(&cli).unwrap();
}

#[test]
fn given_non_power_of_two_values_when_shuffling_then_data_error() {
    isolate_settings();
    let cli = Cli::try_parse_from(["hipstree", "--seed", "1", "shuffle", "1", "2", "3"]).unwrap();

    let err = execute_command(&cli).unwrap_err();

    assert!(matches!(err, CliError::Tree(_)));
    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[test]
fn given_out_of_range_level_when_shuffling_then_data_error() {
    isolate_settings();
    let cli = Cli::try_parse_from(["hipstree", "shuffle", "1", "2", "3", "4", "-l", "3"]).unwrap();

    let err = execute_command(&cli).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[test]
fn given_zero_depth_when_showing_then_usage_error() {
    isolate_settings();
    let cli = Cli::try_parse_from(["hipstree", "show", "--depth", "0"]).unwrap();

    let err = execute_command(&cli).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
}
