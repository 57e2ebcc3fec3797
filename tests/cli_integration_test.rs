//! CLI integration tests: real INI and CSV files on disk.

mod common;

use common::*;
use std::process::ExitCode;
use tempfile::TempDir;
use trendswap::adapters::csv_report_adapter::{SERIES_FILE, SUMMARY_FILE, TRADES_FILE};
use trendswap::adapters::file_config_adapter::FileConfigAdapter;
use trendswap::cli::{self, Cli, Command};
use trendswap::domain::config_validation::{load_run_config, validate_config};
use trendswap::domain::error::TrendswapError;
use trendswap::domain::exit_policy::ExitPolicy;
use trendswap::domain::pipeline::DirectionMode;

const VALID_INI: &str = r#"
[indicators]
cci_period = 2
slow_kalman_window = 32
direction_mode = kalman

[session]
start = 09:17
end = 15:25
utc_offset = +05:30

[engine]
deviation_low = 7
deviation_high = 15
exit_policy = mfe_capture
capture_ratio = 0.4
confirm_bars = 1

[trailing]
use_atr = true
"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(ini: &str, bars: usize) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("run.ini"), ini).unwrap();
        write_bars_csv(&dir.path().join("bars.csv"), &wave_bars(bars));
        Workspace { dir }
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, command: Command) -> ExitCode {
        cli::run(Cli {
            verbose: false,
            command,
        })
    }
}

mod config_loading {
    use super::*;

    #[test]
    fn valid_ini_loads() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = load_run_config(&adapter).unwrap();
        assert_eq!(config.indicators.slow_kalman_window, 32);
        assert_eq!(config.indicators.direction_mode, DirectionMode::Kalman);
        assert!(matches!(config.engine.exit_policy, ExitPolicy::MfeCapture(_)));
        assert_eq!(config.session().start_minute(), 9 * 60 + 17);
    }

    #[test]
    fn config_from_disk() {
        let file = write_temp_ini(VALID_INI);
        let config = cli::load_config(file.path()).unwrap();
        assert_eq!(config.engine.deviation_high, 15.0);
    }

    #[test]
    fn bad_session_time_is_invalid() {
        let adapter =
            FileConfigAdapter::from_string("[session]\nstart = 9h17\n").unwrap();
        let err = validate_config(&adapter).unwrap_err();
        assert!(matches!(err, TrendswapError::ConfigInvalid { .. }));
        assert_eq!(ExitCode::from(&err), ExitCode::from(2));
    }
}

mod commands {
    use super::*;

    #[test]
    fn validate_succeeds_on_valid_config() {
        let ws = Workspace::new(VALID_INI, 0);
        let code = ws.run(Command::Validate {
            config: ws.path("run.ini"),
        });
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn validate_reports_config_error_code() {
        let ws = Workspace::new("[engine]\nexit_policy = hodl\n", 0);
        let code = ws.run(Command::Validate {
            config: ws.path("run.ini"),
        });
        assert_eq!(code, ExitCode::from(2));
    }

    #[test]
    fn backtest_writes_all_reports() {
        let ws = Workspace::new(VALID_INI, 150);
        let out = ws.path("out");
        let code = ws.run(Command::Backtest {
            config: ws.path("run.ini"),
            data: Some(ws.path("bars.csv")),
            output: Some(out.clone()),
        });
        assert_eq!(code, ExitCode::SUCCESS);
        for file in [TRADES_FILE, SERIES_FILE, SUMMARY_FILE] {
            assert!(out.join(file).is_file(), "{file} missing");
        }
        let series = std::fs::read_to_string(out.join(SERIES_FILE)).unwrap();
        assert_eq!(series.lines().count(), 151);
    }

    #[test]
    fn backtest_without_bar_source_is_config_error() {
        let ws = Workspace::new(VALID_INI, 10);
        let code = ws.run(Command::Backtest {
            config: ws.path("run.ini"),
            data: None,
            output: Some(ws.path("out")),
        });
        assert_eq!(code, ExitCode::from(2));
    }

    #[test]
    fn bar_source_from_config_section() {
        let ws = Workspace::new("", 30);
        let ini = format!("{VALID_INI}\n[data]\nbars = {}\n", ws.path("bars.csv").display());
        std::fs::write(ws.path("run.ini"), ini).unwrap();
        let code = ws.run(Command::Indicators {
            config: ws.path("run.ini"),
            data: None,
            output: Some(ws.path("ind")),
        });
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(ws.path("ind").join(SERIES_FILE).is_file());
    }

    #[test]
    fn live_replay_succeeds() {
        let ws = Workspace::new(VALID_INI, 40);
        let code = ws.run(Command::Live {
            config: ws.path("run.ini"),
            data: Some(ws.path("bars.csv")),
        });
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn date_filter_excluding_everything_is_data_error() {
        let ini = format!("{VALID_INI}\n[data]\nstart_date = 2030-01-01\n");
        let ws = Workspace::new(&ini, 10);
        let code = ws.run(Command::Indicators {
            config: ws.path("run.ini"),
            data: Some(ws.path("bars.csv")),
            output: Some(ws.path("ind")),
        });
        assert_eq!(code, ExitCode::from(3));
    }

    #[test]
    fn unordered_bar_file_is_data_error() {
        let ws = Workspace::new(VALID_INI, 0);
        let mut bars = wave_bars(5);
        bars.swap(1, 3);
        write_bars_csv(&ws.path("bars.csv"), &bars);
        let code = ws.run(Command::Indicators {
            config: ws.path("run.ini"),
            data: Some(ws.path("bars.csv")),
            output: Some(ws.path("ind")),
        });
        assert_eq!(code, ExitCode::from(3));
    }
}
