use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use sysreport::constants::report::{
    DEFAULT_DATA_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_TEMPLATE_PATH,
};
use sysreport::{ReportConfig, ReportDriver, RunSummary};

#[derive(Debug, Parser)]
#[command(
    name = "sysreport",
    disable_help_subcommand = true,
    about = "Generate per-system summary workbooks from CSV test data",
    long_about = "Classify CSV test results by system hostname and firmware version, merge \
                  same-kind files, and populate the summary workbook template once per \
                  system and firmware combination.",
    after_help = "Examples:\n  \
                  sysreport\n  \
                  sysreport --systems bh-glx-b02u02\n  \
                  sysreport --systems bh-glx-b02u02 bh-glx-b03u02 --json"
)]
struct Cli {
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        default_value = DEFAULT_DATA_DIR,
        help = "Directory scanned (non-recursively) for input csv files"
    )]
    data_dir: PathBuf,
    #[arg(
        long = "template",
        value_name = "FILE",
        default_value = DEFAULT_TEMPLATE_PATH,
        help = "Template workbook loaded fresh for every report"
    )]
    template: PathBuf,
    #[arg(
        long = "output-dir",
        value_name = "DIR",
        default_value = DEFAULT_OUTPUT_DIR,
        help = "Directory receiving one workbook per system and firmware combination"
    )]
    output_dir: PathBuf,
    #[arg(
        long = "systems",
        value_name = "HOSTNAME",
        num_args = 1..,
        help = "Restrict processing to these system hostnames"
    )]
    systems: Vec<String>,
    #[arg(long, help = "Print the final tally as JSON instead of text")]
    json: bool,
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let cli = Cli::parse();
    let config = ReportConfig::new(cli.data_dir, cli.template, cli.output_dir)
        .with_host_filter(cli.systems);

    let driver = match ReportDriver::new(config.clone()) {
        Ok(driver) => driver,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match driver.run() {
        Ok(summary) => {
            print_summary(&config, &summary, cli.json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn print_summary(config: &ReportConfig, summary: &RunSummary, json: bool) {
    if json {
        let rendered =
            serde_json::to_string_pretty(summary).expect("run summary serializes to json");
        println!("{rendered}");
        return;
    }
    println!();
    println!("{}", "=".repeat(60));
    println!("SUMMARY");
    println!("{}", "=".repeat(60));
    println!(
        "System and firmware combinations processed: {}",
        summary.attempted
    );
    println!("Successfully generated: {}", summary.succeeded);
    println!("Errors: {}", summary.failed);
    if !summary.unmatched_hosts.is_empty() {
        println!(
            "No data found for systems: {}",
            summary.unmatched_hosts.join(", ")
        );
    }
    println!("Output directory: {}", config.output_dir.display());
}
