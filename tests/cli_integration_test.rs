//! CLI integration tests for the report pipeline.
//!
//! Tests cover:
//! - Config loading from INI files on disk
//! - Token resolution
//! - Pipeline stages with MockOperationPort (account, fetch, summarize, report)
//! - CSV import end-to-end, including CSV report output
//! - Argument parsing and exit status mapping

mod common;

use clap::{CommandFactory, Parser};
use common::*;
use rust_decimal_macros::dec;
use std::io::Write;
use std::path::PathBuf;
use tinvest_reporter::adapters::csv_adapter::CsvOperationAdapter;
use tinvest_reporter::adapters::file_config_adapter::FileConfigAdapter;
use tinvest_reporter::cli::{self, Cli, Command, ReportOutcome};
use tinvest_reporter::domain::config_validation::{ReportConfig, build_report_config};
use tinvest_reporter::domain::error::{ReporterError, SummaryError};

fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[report]
start_date = 2019-01-01
end_date = 2021-01-01
account_type = Tinkoff

[api]
sandbox = false
timeout_secs = 10

[logging]
level = warn
"#;

const OPERATIONS_CSV: &str = "\
account_id,account_type,id,status,operation_type,figi,quantity,payment,commission,currency,date
2001,TinkoffIis,1,Done,Buy,BBG000BPH459,3,-300,-1,USD,2019-02-01T10:00:00+03:00
2000,Tinkoff,10,Done,PayIn,,,5000,,RUB,2019-02-01T09:00:00+03:00
2000,Tinkoff,11,Done,Buy,BBG000B9XRY4,10,-1000,-5,USD,2019-03-01T10:00:00+03:00
2000,Tinkoff,12,Decline,Sell,BBG000B9XRY4,10,1500,-7,USD,2019-04-01T10:00:00+03:00
2000,Tinkoff,13,Done,Sell,BBG000B9XRY4,10,1200,-6,USD,2019-06-09T10:00:00+03:00
2000,Tinkoff,14,Done,Buy,BBG004730N88,100,-25000,-75,RUB,2019-05-01T10:00:00+03:00
2000,Tinkoff,15,Done,Sell,BBG004730N88,40,11000,-33,RUB,2019-07-01T10:00:00+03:00
2000,Tinkoff,16,Done,Buy,BBG0013HGFT4,1,-70,,USD,2019-08-01T10:00:00+03:00
2000,Tinkoff,17,Done,Sell,BBG0013HGFT4,1,72,,USD,2019-08-01T16:00:00+03:00
";

fn default_config() -> ReportConfig {
    build_report_config(&FileConfigAdapter::from_string(VALID_INI).unwrap()).unwrap()
}

mod config_loading {
    use super::*;

    #[test]
    fn load_settings_reads_file() {
        let file = write_temp_file(VALID_INI);
        let path = file.path().to_path_buf();
        let settings = cli::load_settings(Some(&path)).unwrap();
        let config = build_report_config(&settings).unwrap();
        assert_eq!(config.start_date.to_rfc3339(), "2019-01-01T00:00:00+00:00");
        assert_eq!(config.end_date.to_rfc3339(), "2021-01-01T00:00:00+00:00");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn load_settings_without_path_uses_defaults() {
        let settings = cli::load_settings(None).unwrap();
        let config = build_report_config(&settings).unwrap();
        assert_eq!(config.account_type, "Tinkoff");
        assert_eq!(config.start_date.to_rfc3339(), "2018-01-01T00:00:00+00:00");
    }

    #[test]
    fn load_settings_missing_file_is_config_error() {
        let path = PathBuf::from("/nonexistent/tinvest.ini");
        let err = cli::load_settings(Some(&path)).unwrap_err();
        assert!(matches!(err, ReporterError::ConfigParse { .. }));
        assert_eq!(err.exit_status(), 2);
    }
}

mod token {
    use super::*;

    #[test]
    fn present_token_is_trimmed() {
        assert_eq!(
            cli::resolve_token(Some("  t.abc123 \n".into())).unwrap(),
            "t.abc123"
        );
    }

    #[test]
    fn absent_or_blank_token_is_missing() {
        assert!(matches!(
            cli::resolve_token(None),
            Err(ReporterError::MissingToken)
        ));
        assert!(matches!(
            cli::resolve_token(Some("   ".into())),
            Err(ReporterError::MissingToken)
        ));
    }
}

mod pipeline {
    use super::*;

    #[test]
    fn reports_closed_positions_of_resolved_account() {
        let port = MockOperationPort::new()
            .with_account(
                "iis",
                "TinkoffIis",
                vec![buy("IIS", 1, dec!(-10), 0), sell("IIS", 1, dec!(20), 50)],
            )
            .with_account(
                "main",
                "Tinkoff",
                vec![
                    with_commission(buy("X", 10, dec!(-1000), 0), dec!(-5)),
                    with_commission(sell("X", 10, dec!(1200), 100), dec!(-6)),
                    buy("OPEN", 3, dec!(-30), 5),
                ],
            );
        let mut reporter = RecordingReporter::default();

        let outcome = cli::run_report_pipeline(&port, &mut reporter, &default_config()).unwrap();

        assert_eq!(
            outcome,
            ReportOutcome {
                operations: 3,
                reported: 1,
                skipped: vec![],
            }
        );
        assert_eq!(reporter.emitted.len(), 1);
        assert_eq!(reporter.emitted[0].figi, "X");
        assert_eq!(reporter.emitted[0].income, dec!(189));
        assert!(reporter.finished);
    }

    #[test]
    fn failing_group_is_skipped_and_others_reported() {
        let port = MockOperationPort::new().with_account(
            "main",
            "Tinkoff",
            vec![
                buy("DAY", 1, dec!(-100), 3),
                sell("DAY", 1, dec!(105), 3),
                buy("OK", 1, dec!(-100), 0),
                sell("OK", 1, dec!(110), 365),
            ],
        );
        let mut reporter = RecordingReporter::default();

        let outcome = cli::run_report_pipeline(&port, &mut reporter, &default_config()).unwrap();

        assert_eq!(outcome.reported, 1);
        assert_eq!(
            reporter.skipped,
            vec![SummaryError::ZeroPeriod {
                figi: "DAY".to_string()
            }]
        );
        assert_eq!(reporter.emitted[0].figi, "OK");

        let err = outcome.into_result().unwrap_err();
        assert!(matches!(
            err,
            ReporterError::Incomplete {
                closed: 2,
                skipped: 1
            }
        ));
        assert_eq!(err.exit_status(), 6);
    }

    #[test]
    fn missing_account_type_aborts() {
        let port = MockOperationPort::new().with_account("iis", "TinkoffIis", vec![]);
        let mut reporter = RecordingReporter::default();

        let err = cli::run_report_pipeline(&port, &mut reporter, &default_config()).unwrap_err();

        assert!(matches!(err, ReporterError::AccountNotFound { .. }));
        assert_eq!(err.exit_status(), 4);
        assert!(reporter.emitted.is_empty());
        assert!(!reporter.finished);
    }

    #[test]
    fn fetch_failure_propagates() {
        let port = MockOperationPort::new()
            .with_account("main", "Tinkoff", vec![])
            .with_fetch_error("connection reset");
        let mut reporter = RecordingReporter::default();

        let err = cli::run_report_pipeline(&port, &mut reporter, &default_config()).unwrap_err();
        assert!(matches!(err, ReporterError::Api { .. }));
        assert_eq!(err.exit_status(), 3);
    }

    #[test]
    fn operations_outside_window_are_not_fetched() {
        let mut config = default_config();
        config.end_date = at(50);
        let port = MockOperationPort::new().with_account(
            "main",
            "Tinkoff",
            vec![buy("X", 1, dec!(-10), 0), sell("X", 1, dec!(12), 100)],
        );
        let mut reporter = RecordingReporter::default();

        let outcome = cli::run_report_pipeline(&port, &mut reporter, &config).unwrap();
        assert_eq!(outcome.operations, 1);
        assert!(reporter.emitted.is_empty());
    }
}

mod csv_import {
    use super::*;

    #[test]
    fn import_reports_only_closed_positions() {
        let file = write_temp_file(OPERATIONS_CSV);
        let source = CsvOperationAdapter::new(file.path().to_path_buf());
        let mut reporter = RecordingReporter::default();

        let outcome = cli::run_report_pipeline(&source, &mut reporter, &default_config()).unwrap();

        assert_eq!(outcome.operations, 8);
        assert_eq!(reporter.emitted.len(), 1);
        let s = &reporter.emitted[0];
        assert_eq!(s.figi, "BBG000B9XRY4");
        assert_eq!(s.operation_count, 2);
        assert_eq!(s.income, dec!(189));
        assert_eq!(s.invested, dec!(1000));
        assert_eq!(s.period_days, 100);
        assert_eq!(
            reporter.skipped,
            vec![SummaryError::ZeroPeriod {
                figi: "BBG0013HGFT4".to_string()
            }]
        );
    }

    #[test]
    fn report_to_sink_writes_csv_and_flags_incomplete_run() {
        let file = write_temp_file(OPERATIONS_CSV);
        let source = CsvOperationAdapter::new(file.path().to_path_buf());
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("report.csv");

        let err = cli::report_to_sink(&source, &default_config(), Some(&output)).unwrap_err();
        assert!(matches!(err, ReporterError::Incomplete { skipped: 1, .. }));

        let text = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "BBG000B9XRY4,2,189,1000,18.90,100,68.99,USD");
    }

    #[test]
    fn import_with_unknown_account_type() {
        let file = write_temp_file(OPERATIONS_CSV);
        let source = CsvOperationAdapter::new(file.path().to_path_buf());
        let mut config = default_config();
        config.account_type = "TinkoffInvest".to_string();
        let mut reporter = RecordingReporter::default();

        let err = cli::run_report_pipeline(&source, &mut reporter, &config).unwrap_err();
        assert!(matches!(err, ReporterError::AccountNotFound { .. }));
    }
}

mod arguments {
    use super::*;

    #[test]
    fn parses_report_with_token_and_overrides() {
        let cli = Cli::try_parse_from([
            "tinvest-reporter",
            "report",
            "t.secret",
            "--sandbox",
            "--from",
            "2020-01-01",
            "--account-type",
            "TinkoffIis",
        ])
        .unwrap();
        match cli.command {
            Command::Report {
                token,
                sandbox,
                args,
            } => {
                assert_eq!(token.as_deref(), Some("t.secret"));
                assert!(sandbox);
                assert_eq!(args.from.as_deref(), Some("2020-01-01"));
                assert_eq!(args.account_type.as_deref(), Some("TinkoffIis"));
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn import_requires_operations_file() {
        assert!(Cli::try_parse_from(["tinvest-reporter", "import"]).is_err());
    }

    #[test]
    fn import_run_exits_with_incomplete_status() {
        let file = write_temp_file(OPERATIONS_CSV);
        let cli = Cli::try_parse_from([
            "tinvest-reporter",
            "import",
            "--operations",
            file.path().to_str().unwrap(),
            "--from",
            "2019-01-01",
        ])
        .unwrap();
        let code = cli::run(cli);
        assert_eq!(format!("{code:?}"), format!("{:?}", std::process::ExitCode::from(6)));
    }

    #[test]
    fn validate_accepts_good_config() {
        let file = write_temp_file(VALID_INI);
        let cli = Cli::try_parse_from([
            "tinvest-reporter",
            "validate",
            "--config",
            file.path().to_str().unwrap(),
        ])
        .unwrap();
        let code = cli::run(cli);
        assert_eq!(
            format!("{code:?}"),
            format!("{:?}", std::process::ExitCode::SUCCESS)
        );
    }

    #[test]
    fn validate_rejects_unknown_log_level() {
        let file = write_temp_file("[logging]\nlevel = verbose\n");
        let cli = Cli::try_parse_from([
            "tinvest-reporter",
            "validate",
            "--config",
            file.path().to_str().unwrap(),
        ])
        .unwrap();
        let code = cli::run(cli);
        assert_eq!(format!("{code:?}"), format!("{:?}", std::process::ExitCode::from(2)));
    }

    #[test]
    fn help_lists_exit_statuses() {
        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("Exit status:"));
        assert!(help.contains("6  some closed instruments were skipped"));
    }
}
