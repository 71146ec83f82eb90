use clap::{Args, Parser, Subcommand};
use ems_core::{Employee, FULL_TIME};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ems")]
#[command(about = "Employee records, salary adjustments and payroll reports.")]
pub struct CommandLine {
    /// TOML config file; `ems.toml` is used when present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check core linkage and store connectivity
    Ping,
    /// Search employees by name, SSN or employee id
    #[command(alias = "s")]
    Search {
        term: String,
        #[arg(long = "by", default_value = "name")]
        search_type: String,
    },
    /// Add a new employee
    #[command(alias = "a")]
    Add(EmployeeArgs),
    /// Replace every field of an existing employee
    Update {
        emp_id: i64,
        #[command(flatten)]
        fields: EmployeeArgs,
    },
    /// Raise salaries in [min, max) by a percentage
    Raise {
        #[arg(long)]
        percent: f64,
        #[arg(long)]
        min: f64,
        #[arg(long)]
        max: f64,
    },
    /// Payroll reports
    #[command(subcommand)]
    Report(ReportCommand),
    /// Delete one employee and their pay statements
    Delete { emp_id: i64 },
}

/// Employee fields shared by `add` and `update`.
#[derive(Args)]
pub struct EmployeeArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    /// Dashes and spaces are accepted and stripped
    #[arg(long)]
    pub ssn: String,
    #[arg(long)]
    pub job_title: String,
    #[arg(long)]
    pub division: String,
    #[arg(long)]
    pub salary: f64,
    #[arg(long, default_value = FULL_TIME)]
    pub employment_type: String,
}

impl EmployeeArgs {
    pub fn into_employee(self) -> Employee {
        Employee::new(
            self.first_name,
            self.last_name,
            self.ssn,
            self.job_title,
            self.division,
            self.salary,
        )
        .with_employment_type(self.employment_type)
    }
}

#[derive(Subcommand)]
pub enum ReportCommand {
    /// Full-time employees with pay history
    Employees,
    /// Monthly pay totals per job title
    JobTitle {
        #[arg(long)]
        month: u32,
        #[arg(long)]
        year: i32,
    },
    /// Monthly pay totals per division
    Division {
        #[arg(long)]
        month: u32,
        #[arg(long)]
        year: i32,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Commands {
    /// Stable label for log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Search { .. } => "search",
            Self::Add(_) => "add",
            Self::Update { .. } => "update",
            Self::Raise { .. } => "raise",
            Self::Report(_) => "report",
            Self::Delete { .. } => "delete",
        }
    }
}
