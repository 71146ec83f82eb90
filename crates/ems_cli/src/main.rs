//! `ems` command-line entry point.
//!
//! # Responsibility
//! - Load configuration, start logging and build the connection provider.
//! - Wire repositories into services explicitly and print results.
//!
//! # Invariants
//! - Every command goes through the core services, so validation and SSN
//!   canonicalization apply to CLI input too.
//! - Failures print their error kind and exit non-zero.

mod commands;

use anyhow::{anyhow, Context};
use commands::{CommandLine, Commands, ReportCommand};
use ems_core::{
    init_logging, ConfigError, ConfigSource, DatabaseSettings, DbError, Employee,
    EmployeeService, LogSettings, ReportService, SalaryService, ServiceError,
    SqliteConnectionProvider, SqliteEmployeeRepository, SqlitePayStatementRepository,
};
use log::{error, info};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

const DEFAULT_CONFIG_FILE: &str = "ems.toml";

fn main() -> ExitCode {
    let commands = CommandLine::parse_args();
    match run(commands) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("[{}] {err:#}", error_kind(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(commands: CommandLine) -> anyhow::Result<()> {
    let config = load_config(commands.config.as_deref())?;
    let log_settings = LogSettings::from_config(&config).map_err(|err| anyhow!(err))?;
    init_logging(&log_settings).map_err(|err| anyhow!(err))?;

    if let Commands::Ping = commands.command {
        println!("ems_core ping={}", ems_core::ping());
        println!("ems_core version={}", ems_core::core_version());
    }

    let settings = DatabaseSettings::from_config(&config)?;
    let provider = SqliteConnectionProvider::new(settings).context("opening employee store")?;

    let command = commands.command.name();
    let started_at = Instant::now();
    let result = execute(commands.command, &provider);
    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(()) => info!(
            "event=cli_command module=cli status=ok command={command} duration_ms={duration_ms}"
        ),
        Err(err) => error!(
            "event=cli_command module=cli status=error command={command} duration_ms={duration_ms} error_kind={}",
            error_kind(err)
        ),
    }
    result
}

fn execute(command: Commands, provider: &SqliteConnectionProvider) -> anyhow::Result<()> {
    let employees = SqliteEmployeeRepository::new(provider);
    let pay_statements = SqlitePayStatementRepository::new(provider);

    match command {
        Commands::Ping => {
            println!("{}", provider.connection_info());
            println!("connected={}", provider.test_connection());
        }
        Commands::Search { term, search_type } => {
            let found = EmployeeService::new(employees).search_employee(&term, &search_type)?;
            if found.is_empty() {
                println!("no employees found");
            }
            for employee in &found {
                print_employee(employee);
            }
        }
        Commands::Add(fields) => {
            let mut employee = fields.into_employee();
            let emp_id = EmployeeService::new(employees).add_employee(&mut employee)?;
            println!("added employee {emp_id}");
        }
        Commands::Update { emp_id, fields } => {
            let mut employee = fields.into_employee();
            employee.emp_id = Some(emp_id);
            EmployeeService::new(employees).update_employee(&mut employee)?;
            println!("updated employee {emp_id}");
        }
        Commands::Raise { percent, min, max } => {
            let affected = SalaryService::new(employees).apply_salary_increase(percent, min, max)?;
            println!("updated {affected} employee(s)");
        }
        Commands::Report(report) => {
            let reports = ReportService::new(employees, pay_statements);
            match report {
                ReportCommand::Employees => {
                    for employee in reports.generate_employee_report()? {
                        println!(
                            "{:>6}  {}  ({}, {})",
                            employee.emp_id.unwrap_or_default(),
                            employee.full_name(),
                            employee.job_title,
                            employee.division
                        );
                        for statement in &employee.pay_statements {
                            println!(
                                "        {}  {:<16} {:>12.2}",
                                statement.pay_date, statement.pay_period, statement.amount
                            );
                        }
                    }
                }
                ReportCommand::JobTitle { month, year } => {
                    print_totals(&reports.generate_pay_by_job_title_report(month, year)?);
                }
                ReportCommand::Division { month, year } => {
                    print_totals(&reports.generate_pay_by_division_report(month, year)?);
                }
            }
        }
        Commands::Delete { emp_id } => {
            EmployeeService::new(employees).delete_employee(emp_id)?;
            println!("deleted employee {emp_id}");
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ConfigSource> {
    match path {
        Some(path) => Ok(ConfigSource::load(path)?),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            Ok(ConfigSource::load(DEFAULT_CONFIG_FILE)?)
        }
        // Environment-only configuration (`DB_URL`, `LOG_LEVEL`, ...).
        None => Ok(ConfigSource::from_pairs(Vec::<(String, String)>::new())),
    }
}

fn error_kind(err: &anyhow::Error) -> &'static str {
    if let Some(service_err) = err.downcast_ref::<ServiceError>() {
        return service_err.kind().as_str();
    }
    if let Some(db_err) = err.downcast_ref::<DbError>() {
        return db_err.kind().as_str();
    }
    if let Some(config_err) = err.downcast_ref::<ConfigError>() {
        return config_err.kind().as_str();
    }
    "error"
}

fn print_employee(employee: &Employee) {
    println!(
        "{:>6}  {:<28} {:<20} {:<16} {:>12.2}",
        employee.emp_id.unwrap_or_default(),
        employee.full_name(),
        employee.job_title,
        employee.division,
        employee.salary
    );
}

fn print_totals(totals: &BTreeMap<String, f64>) {
    if totals.is_empty() {
        println!("no pay statements for that period");
    }
    for (label, total) in totals {
        println!("{label:<24} {total:>14.2}");
    }
}

#[cfg(test)]
mod tests {
    use super::{error_kind, execute};
    use crate::commands::{CommandLine, Commands};
    use clap::Parser;
    use ems_core::{EmployeeService, SqliteConnectionProvider, SqliteEmployeeRepository, FULL_TIME};

    fn parse(args: &[&str]) -> Commands {
        CommandLine::try_parse_from(args).unwrap().command
    }

    const ADD_ARGS: &[&str] = &[
        "ems",
        "add",
        "--first-name",
        "Grace",
        "--last-name",
        "Hopper",
        "--ssn",
        "123-45-6789",
        "--job-title",
        "Engineer",
        "--division",
        "Navy",
        "--salary",
        "80000",
    ];

    #[test]
    fn add_defaults_employment_type_to_full_time() {
        let Commands::Add(fields) = parse(ADD_ARGS) else {
            panic!("expected add command");
        };
        assert_eq!(fields.employment_type, FULL_TIME);
        assert_eq!(fields.into_employee().first_name, "Grace");
    }

    #[test]
    fn add_and_update_go_through_service_validation() {
        let provider = SqliteConnectionProvider::in_memory().unwrap();
        execute(parse(ADD_ARGS), &provider).unwrap();

        let service = EmployeeService::new(SqliteEmployeeRepository::new(&provider));
        let stored = service.get_all_employees().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].ssn, "123456789");
        let emp_id = stored[0].emp_id.unwrap().to_string();

        let update = parse(&[
            "ems",
            "update",
            emp_id.as_str(),
            "--first-name",
            "Grace",
            "--last-name",
            "Hopper",
            "--ssn",
            "987 65 4321",
            "--job-title",
            "Admiral",
            "--division",
            "Navy",
            "--salary",
            "120000",
            "--employment-type",
            "CONTRACT",
        ]);
        execute(update, &provider).unwrap();

        let updated = service.get_all_employees().unwrap();
        assert_eq!(updated[0].ssn, "987654321");
        assert_eq!(updated[0].job_title, "Admiral");
        assert_eq!(updated[0].employment_type, "CONTRACT");
    }

    #[test]
    fn invalid_add_and_missing_update_report_their_kind() {
        let provider = SqliteConnectionProvider::in_memory().unwrap();

        let mut bad_ssn = ADD_ARGS.to_vec();
        bad_ssn[7] = "12-345";
        let err = execute(parse(&bad_ssn), &provider).unwrap_err();
        assert_eq!(error_kind(&err), "validation");

        let mut missing = vec!["ems", "update", "42"];
        missing.extend_from_slice(&ADD_ARGS[2..]);
        let err = execute(parse(&missing), &provider).unwrap_err();
        assert_eq!(error_kind(&err), "not_found");
    }

    #[test]
    fn command_names_are_stable() {
        assert_eq!(parse(&["ems", "ping"]).name(), "ping");
        assert_eq!(parse(&["ems", "delete", "3"]).name(), "delete");
        assert_eq!(parse(ADD_ARGS).name(), "add");
    }
}
