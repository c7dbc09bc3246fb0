use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use chembl_explorer::chembl::ChemblHttpClient;
use chembl_explorer::config::{ConfigLoader, ResolvedConfig};
use chembl_explorer::dashboard::{Dashboard, Interaction, Render};
use chembl_explorer::domain::{ColumnSelection, OutputFormat, TargetChemblId};
use chembl_explorer::error::ExplorerError;
use chembl_explorer::output::{HtmlOutput, JsonOutput, OutputMode};
use chembl_explorer::tui::Tui;

#[derive(Parser)]
#[command(name = "chembl-explorer")]
#[command(about = "Search ChEMBL targets, preview IC50 bioactivity and export it as CSV")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run one search and print the resulting dashboard")]
    Query(QueryArgs),
}

#[derive(Args)]
struct QueryArgs {
    /// Disease or target name
    text: String,

    /// Target to fetch activities for (defaults to the first search hit)
    #[arg(long)]
    target: Option<String>,

    /// Comma separated export columns, in export order
    #[arg(long)]
    columns: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<ExplorerError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ExplorerError) -> u8 {
    match error {
        ExplorerError::ConfigRead(_)
        | ExplorerError::ConfigParse(_)
        | ExplorerError::InvalidConfig(_)
        | ExplorerError::InvalidTargetId(_) => 2,
        ExplorerError::ChemblHttp(_) | ExplorerError::ChemblStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let resolved = ConfigLoader::resolve(cli.config.as_deref())?;
    tracing::debug!(
        schema_version = resolved.schema_version,
        base_url = %resolved.chembl.base_url,
        "config resolved"
    );

    match cli.command {
        Some(Commands::Query(args)) => run_query(args, &resolved),
        None => match output_mode {
            OutputMode::Interactive => run_interactive(&resolved),
            OutputMode::NonInteractive => Err(miette::Report::msg(
                "command required (try `chembl-explorer query --help`)",
            )),
        },
    }
}

fn build_dashboard(resolved: &ResolvedConfig) -> miette::Result<Dashboard<ChemblHttpClient>> {
    let client = ChemblHttpClient::new(resolved.chembl.clone())?;
    Ok(Dashboard::new(client))
}

fn run_query(args: QueryArgs, resolved: &ResolvedConfig) -> miette::Result<()> {
    let mut interaction = Interaction::new(args.text);
    if let Some(target) = args.target {
        interaction = interaction.with_target(target.parse::<TargetChemblId>()?);
    }
    if let Some(columns) = args.columns {
        interaction = interaction.with_columns(columns.parse::<ColumnSelection>()?);
    }

    let dashboard = build_dashboard(resolved)?;
    let render = dashboard.handle(&interaction, &JsonOutput)?;

    match args.format {
        OutputFormat::Json => JsonOutput::print_render(&render).into_diagnostic(),
        OutputFormat::Html => HtmlOutput::print_render(&render).into_diagnostic(),
    }
}

fn run_interactive(resolved: &ResolvedConfig) -> miette::Result<()> {
    let dashboard = build_dashboard(resolved)?;
    let mut tui = Tui::new();
    let last = tui.run(&dashboard)?;
    if let Some(render) = last {
        print_session_summary(&render);
    }
    Ok(())
}

fn print_session_summary(render: &Render) {
    let green = "\x1b[32m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    let Some(link) = render.download() else {
        return;
    };
    let target = render
        .selected_target()
        .map(|(id, _)| id)
        .unwrap_or("unknown target");
    println!("{cyan}Chembl Explorer export for {target}{reset}");
    println!(
        "{green}{}: {} rows x {} columns{reset}",
        link.file_name,
        link.row_count,
        link.columns.len()
    );
    println!("{}", link.html);
}
