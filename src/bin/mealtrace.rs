use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mealtrace::correlation::{TargetSelector, Timeframe, DEFAULT_TIMEFRAME_HOURS};
use mealtrace::derive::{derive_items_with, item_suggestions, unique_items, DeriveOptions, VariantPolicy};
use mealtrace::entry::SearchStatus;
use mealtrace::store::{run_pipeline, JsonSnapshot, Snapshot};
use mealtrace::timeline::{plot_points, PlotMode};

#[derive(Parser, Debug)]
#[command(name = "mealtrace", version, about = "Which logged items tend to precede a symptom")]
struct Cli {
    /// Exported entries: JSON array of {"time", "text"}
    #[arg(long = "entries", short = 'e')]
    entries: PathBuf,

    /// Categories: JSON array of {"key", "name", "color", "items"}
    #[arg(long = "categories", short = 'c')]
    categories: Option<PathBuf>,

    /// Keep every spelling variant instead of collapsing to the most frequent one
    #[arg(long = "keep-variants", default_value_t = false)]
    keep_variants: bool,

    /// Output format: json | table
    #[arg(long = "format", default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank items by how often they closely precede the target
    Analyze {
        /// item:<text> or category:<key>
        #[arg(long = "target", short = 't')]
        target: TargetSelector,
        /// Lookback window in hours, clamped to 1..=720
        #[arg(long = "hours", default_value_t = DEFAULT_TIMEFRAME_HOURS, allow_negative_numbers = true)]
        hours: i64,
    },
    /// Distinct item texts
    Items,
    /// Most logged items, optionally filtered
    Suggest {
        #[arg(long = "filter", default_value = "")]
        filter: String,
        #[arg(long = "top")]
        top: Option<usize>,
    },
    /// Day/hour plot coordinates
    Plot {
        #[arg(long = "by-category", default_value_t = false)]
        by_category: bool,
    },
    /// Entry count and time span, optionally for entries matching a search
    Stats {
        #[arg(long = "search", default_value = "")]
        search: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let json = match cli.format.as_str() {
        "json" => true,
        "table" => false,
        other => anyhow::bail!("unknown --format {other:?} (expected json or table)"),
    };
    let opts = DeriveOptions {
        variant_policy: if cli.keep_variants { VariantPolicy::KeepAll } else { VariantPolicy::MostFrequent },
    };
    let source = JsonSnapshot::new(&cli.entries, cli.categories.clone());

    match cli.command {
        Command::Analyze { target, hours } => {
            let out = run_pipeline(&source, &target, Timeframe::new(hours), opts)
                .with_context(|| format!("analyzing {}", cli.entries.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&out.result)?);
            } else {
                match out.report {
                    Some(report) => print!("{}", report.render_text()),
                    None => println!("Target category not found."),
                }
            }
        }
        Command::Items => {
            let items = derive_items_with(&source.get_all_entries()?, opts).items;
            let unique = unique_items(&items);
            if json {
                println!("{}", serde_json::to_string_pretty(&unique)?);
            } else {
                unique.iter().for_each(|t| println!("{t}"));
            }
        }
        Command::Suggest { filter, top } => {
            let items = derive_items_with(&source.get_all_entries()?, opts).items;
            let mut counts = item_suggestions(&items, &filter);
            if let Some(n) = top {
                counts.truncate(n);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else {
                counts.iter().for_each(|c| println!("{:>5}  {}", c.count, c.text));
            }
        }
        Command::Plot { by_category } => {
            let items = derive_items_with(&source.get_all_entries()?, opts).items;
            let categories = source.get_all_categories()?;
            let mode = if by_category { PlotMode::Categories } else { PlotMode::Items };
            let layout = plot_points(&items, &categories, mode);
            if json {
                println!("{}", serde_json::to_string_pretty(&layout)?);
            } else {
                for p in &layout.points {
                    println!("day {:>3}  {:>5.2}h  {}", p.day, p.hour_start, p.label);
                }
            }
        }
        Command::Stats { search } => {
            let entries = source.get_all_entries()?;
            let status = SearchStatus::for_query(&entries, &search);
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("{}", status.summary());
                if let (Some(first), Some(last)) = (status.matching.first, status.matching.last) {
                    println!("First: {first} | Last: {last}");
                }
            }
        }
    }
    Ok(())
}
