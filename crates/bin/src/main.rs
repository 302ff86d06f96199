//! custseg CLI binary.
//!
//! Segments customers by RFM score and projects their lifetime value from a
//! customer CSV export.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use custseg::cltv::CltvTable;
use custseg::output::{
    CategoryFilter, ExportFormat, Exporter, SegmentQuery, TextTable, segment_table, tier_table,
    top_customers_table, write_customer_ids,
};
use custseg::rfm::{Segment, segment_summary};
use custseg::{Analysis, Dataset, PipelineConfig, TOP_CUSTOMERS, run_cltv, run_rfm};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "custseg")]
#[command(about = "RFM segmentation and customer lifetime value", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reference date for recency and tenure (YYYY-MM-DD)
    #[arg(long, global = true)]
    anchor_date: Option<NaiveDate>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ExportArgs {
    /// Write the table to this file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Format of the exported table
    #[arg(long, value_enum, default_value = "csv")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
    PrettyJson,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => Self::Csv,
            OutputFormat::Json => Self::Json,
            OutputFormat::PrettyJson => Self::PrettyJson,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Score customers and assign RFM segments
    Rfm {
        /// Customer CSV file
        #[arg(long)]
        input: PathBuf,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Fit the purchase and spend models and project CLTV
    Cltv {
        /// Customer CSV file
        #[arg(long)]
        input: PathBuf,

        /// Lifetime horizon in weeks
        #[arg(long)]
        horizon_weeks: Option<f64>,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Select customers by segment and category interest
    Query {
        /// Customer CSV file
        #[arg(long)]
        input: PathBuf,

        /// Segments to keep, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        segments: Vec<Segment>,

        /// Categories that must all be present
        #[arg(long, value_delimiter = ',', conflicts_with = "any_of")]
        all_of: Vec<String>,

        /// Categories of which at least one must be present
        #[arg(long, value_delimiter = ',')]
        any_of: Vec<String>,

        /// Write the ids here instead of printing them
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run both analyses and write every table
    Run {
        /// Customer CSV file
        #[arg(long)]
        input: PathBuf,

        /// Directory for the exported tables
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if cli.anchor_date.is_some() {
        config.anchor_date = cli.anchor_date;
    }

    match cli.command {
        Commands::Rfm { input, export } => {
            config.validate()?;
            rfm_command(&input, &config, &export)?;
        }
        Commands::Cltv {
            input,
            horizon_weeks,
            export,
        } => {
            if let Some(weeks) = horizon_weeks {
                config.cltv.horizon_weeks = weeks;
            }
            config.validate()?;
            cltv_command(&input, &config, &export)?;
        }
        Commands::Query {
            input,
            segments,
            all_of,
            any_of,
            output,
        } => {
            config.validate()?;
            let categories = if !all_of.is_empty() {
                CategoryFilter::AllOf(all_of)
            } else if !any_of.is_empty() {
                CategoryFilter::AnyOf(any_of)
            } else {
                CategoryFilter::Any
            };
            let query = SegmentQuery::new(segments, categories);
            query_command(&input, &config, &query, output.as_deref())?;
        }
        Commands::Run { input, output_dir } => {
            config.validate()?;
            run_command(&input, &config, output_dir.as_deref())?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `custseg=info`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        ["custseg", "custseg_data", "custseg_rfm", "custseg_cltv", "custseg_output"]
            .map(|target| format!("{target}={level}"))
            .join(",")
            .into()
    });

    let fmt_layer = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn load(input: &Path, config: &PipelineConfig) -> Result<Dataset, custseg::Error> {
    let dataset = Dataset::load(input, config)?;
    println!(
        "Loaded {} rows from {} (anchor date {})\n",
        dataset.records().len(),
        input.display(),
        dataset.anchor()
    );
    Ok(dataset)
}

fn export(table: &impl Exporter, args: &ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = &args.export {
        table.export_to_file(path, args.format.into())?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn rfm_command(
    input: &Path,
    config: &PipelineConfig,
    args: &ExportArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load(input, config)?;
    let rfm = run_rfm(&dataset, config)?;
    print!("{}", segment_table(&segment_summary(&rfm)?));
    println!("{} customers scored", rfm.len());
    export(&rfm, args)
}

fn cltv_command(
    input: &Path,
    config: &PipelineConfig,
    args: &ExportArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load(input, config)?;

    let pb = spinner("Fitting BG/NBD and Gamma-Gamma models...");
    let cltv = match run_cltv(&dataset, config) {
        Ok(cltv) => {
            pb.finish_with_message(format!("Projected {} repeat customers", cltv.len()));
            cltv
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };

    print_models(&cltv);
    print!("{}", tier_table(&cltv.tier_summary()?));
    println!();
    print!("{}", top_cltv_table(&cltv));
    export(&cltv, args)
}

fn query_command(
    input: &Path,
    config: &PipelineConfig,
    query: &SegmentQuery,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load(input, config)?;
    let rfm = run_rfm(&dataset, config)?;
    let ids = query.select(dataset.records(), &rfm);

    match output {
        Some(path) => {
            write_customer_ids(path, &ids)?;
            println!("Wrote {} customer ids to {}", ids.len(), path.display());
        }
        None => {
            for id in &ids {
                println!("{id}");
            }
        }
    }
    Ok(())
}

fn run_command(
    input: &Path,
    config: &PipelineConfig,
    output_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load(input, config)?;

    let pb = spinner("Scoring customers and fitting CLTV models...");
    let analysis = match Analysis::run(&dataset, config) {
        Ok(analysis) => {
            pb.finish_with_message(format!(
                "Scored {} customers, projected {}",
                analysis.rfm.len(),
                analysis.cltv.len()
            ));
            analysis
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Customer Segmentation                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Anchor date: {}\n", analysis.anchor);

    print!(
        "{}",
        top_customers_table("Top customers by total value", &analysis.top_by_value)
    );
    println!();
    print!(
        "{}",
        top_customers_table("Top customers by total orders", &analysis.top_by_orders)
    );
    println!();
    print!("{}", segment_table(&analysis.segments));
    println!();
    print_models(&analysis.cltv);
    print!("{}", tier_table(&analysis.tiers));
    println!();
    print!("{}", top_cltv_table(&analysis.cltv));

    if let Some(dir) = output_dir {
        write_outputs(&dataset, &analysis, dir)?;
    }
    Ok(())
}

fn write_outputs(
    dataset: &Dataset,
    analysis: &Analysis,
    dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    let csv = ExportFormat::Csv;

    let files: [(&str, &dyn Exporter); 4] = [
        ("rfm", &analysis.rfm),
        ("segments", &analysis.segments),
        ("cltv", &analysis.cltv),
        ("tiers", &analysis.tiers),
    ];
    println!();
    for (name, table) in files {
        let path = dir.join(format!("{name}.{}", csv.extension()));
        table.export_to_file(&path, csv)?;
        println!("  Wrote {}", path.display());
    }
    for (path, customers) in custseg::write_sample_queries(dataset, &analysis.rfm, dir)? {
        println!("  Wrote {} ({} customers)", path.display(), customers);
    }
    info!(dir = %dir.display(), "exported analysis");
    Ok(())
}

fn print_models(cltv: &CltvTable) {
    let bg = cltv.purchase_model().params();
    let gg = cltv.spend_model().params();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("MODEL PARAMETERS");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    println!(
        "  BG/NBD:       r = {:.4}, alpha = {:.4}, a = {:.4}, b = {:.4}",
        bg.r, bg.alpha, bg.a, bg.b
    );
    println!(
        "  Gamma-Gamma:  p = {:.4}, q = {:.4}, v = {:.4}\n",
        gg.p, gg.q, gg.v
    );
}

fn top_cltv_table(cltv: &CltvTable) -> TextTable {
    let mut ranked: Vec<_> = cltv.iter().collect();
    ranked.sort_by(|a, b| b.cltv.total_cmp(&a.cltv));

    let mut table = TextTable::new(
        "Top customers by CLTV",
        &["master_id", "frequency", "p_alive", "avg_value", "cltv", "tier"],
    );
    for record in ranked.into_iter().take(TOP_CUSTOMERS) {
        table.push_row(vec![
            record.customer_id.clone(),
            record.frequency.to_string(),
            format!("{:.3}", record.probability_alive),
            format!("{:.2}", record.expected_average_value),
            format!("{:.2}", record.cltv),
            record.tier.to_string(),
        ]);
    }
    table
}
