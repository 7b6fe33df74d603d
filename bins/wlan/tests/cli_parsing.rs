//! CLI tests for the wlan command.
//!
//! Profiles are attached to an in-memory interface, so none of these tests
//! need hardware or privileges.

use assert_cmd::Command;
use predicates::prelude::*;

fn wlan_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_wlan"))
}

fn data(name: &str) -> String {
    format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), name)
}

mod global_flags {
    use super::*;

    #[test]
    fn test_help() {
        wlan_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("802.11 interface configuration tool"));
    }

    #[test]
    fn test_version() {
        wlan_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("wlan"));
    }

    #[test]
    fn test_invalid_subcommand() {
        wlan_cmd()
            .arg("invalid_command")
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }
}

mod rates_command {
    use super::*;

    #[test]
    fn test_rates_for_mode() {
        wlan_cmd()
            .args(["rates", "--mode", "11b"])
            .assert()
            .success()
            .stdout(predicate::str::contains("11b"))
            .stdout(predicate::str::contains("11g").not());
    }

    #[test]
    fn test_rates_json() {
        wlan_cmd()
            .args(["--json", "rates", "--mode", "11a"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""rate":108"#));
    }

    #[test]
    fn test_rates_unknown_mode() {
        wlan_cmd()
            .args(["rates", "--mode", "11z"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown PHY mode"));
    }

    #[test]
    fn test_commands_list() {
        wlan_cmd()
            .arg("commands")
            .assert()
            .success()
            .stdout(predicate::str::contains("set-nwid"))
            .stdout(predicate::str::contains("get-allnodes"));
    }
}

mod profile_commands {
    use super::*;

    #[test]
    fn test_validate_ok() {
        wlan_cmd()
            .args(["validate", &data("office.json")])
            .assert()
            .success()
            .stdout(predicate::str::contains("0 error(s), reset required"));
    }

    #[test]
    fn test_validate_stops_at_first_error() {
        wlan_cmd()
            .args(["validate", &data("broken.json")])
            .assert()
            .failure()
            .stderr(predicate::str::contains("channel 36"));
    }

    #[test]
    fn test_validate_keep_going() {
        wlan_cmd()
            .args(["validate", "--keep-going", &data("broken.json")])
            .assert()
            .failure()
            .stdout(predicate::str::contains("1 change(s), 2 error(s)"))
            .stderr(predicate::str::contains("2 command(s) failed"));
    }

    #[test]
    fn test_validate_dry_run() {
        wlan_cmd()
            .args(["validate", "--dry-run", &data("broken.json")])
            .assert()
            .success()
            .stdout(predicate::str::contains("Would set channel 36"));
    }

    #[test]
    fn test_show_json() {
        wlan_cmd()
            .args(["--json", "show", &data("office.json")])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""ssid":"office""#))
            .stdout(predicate::str::contains(r#""channel":6"#))
            .stdout(predicate::str::contains(r#""fixed_rate":108"#));
    }

    #[test]
    fn test_show_missing_profile() {
        wlan_cmd()
            .args(["show", "/nonexistent/profile.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("loading"));
    }
}
