use crate::demo::{
    run_compliance_report, run_demo, run_financial_report, ComplianceReportArgs, DemoArgs,
    FinancialReportArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rent_manager::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Rent Manager",
    about = "Run the affordable housing compliance and financial analytics service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print compliance or financial reports from the command line
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
    /// Seed a sample portfolio and print both analyses
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Consolidated compliance issues for the sample portfolio
    Compliance(ComplianceReportArgs),
    /// Occupancy, rent roll, operating summary, NOI, and budget variance
    Financials(FinancialReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Load the sample portfolio into the in-memory store before serving
    #[arg(long)]
    pub(crate) seed_demo: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report {
            command: ReportCommand::Compliance(args),
        } => run_compliance_report(args),
        Command::Report {
            command: ReportCommand::Financials(args),
        } => run_financial_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
