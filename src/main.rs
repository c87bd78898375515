use clap::Parser;
use std::path::PathBuf;
use trendline::config::Config;
use trendline::error::{Error, Result};
use trendline::ingest::{load_file, Aggregation};
use trendline::logger::LogReporter;
use trendline::series::export::{render_csv, render_json, render_reports_json};
use trendline::series::{export_to_csv, export_to_json, ExportFormat};
use trendline::trends::{sort_by_similarity, DistanceEngine, DistanceReport};

#[derive(Parser, Debug)]
#[command(name = "trendline")]
#[command(author, version, about = "Topic trend line aggregation and comparison", long_about = None)]
struct Args {
    #[arg(help = "TSV file of topic<TAB>timestamp<TAB>count<TAB>trending records")]
    file: Option<PathBuf>,

    #[arg(short, long, help = "Path to custom config file")]
    config: Option<PathBuf>,

    #[arg(long, num_args = 2, value_names = ["TOPIC_A", "TOPIC_B"], help = "Compare two topics")]
    compare: Option<Vec<String>>,

    #[arg(long, help = "Compare every pair of topics")]
    pairwise: bool,

    #[arg(long, help = "Worker threads for --pairwise (0 = all cores)", default_value = "1")]
    threads: usize,

    #[arg(long, help = "Compare over all timestamps, treating missing points as zero")]
    zero_fill: bool,

    #[arg(long, help = "Drop topics with fewer points than this", value_name = "N")]
    min_points: Option<usize>,

    #[arg(long, help = "Output format (text, csv, json)", value_name = "FORMAT")]
    format: Option<String>,

    #[arg(long, help = "Write trend lines to file (csv or json)", value_name = "FILE")]
    export: Option<PathBuf>,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    run(args)
}

fn run(args: Args) -> Result<()> {
    let Some(file) = args.file.clone() else {
        println!("Please provide a file name");
        println!("Usage: trendline <FILE> (see --help)");
        return Ok(());
    };

    let mut config = if let Some(config_path) = &args.config {
        log::info!("Loading config from: {}", config_path.display());
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    if args.zero_fill {
        config.distance.zero_fill = true;
    }
    if let Some(min_points) = args.min_points {
        config.loader.min_points = min_points;
    }
    if let Some(format) = &args.format {
        config.output.format = format.parse()?;
    }
    let engine = DistanceEngine::new(config.distance.clone(), LogReporter)?;

    log::info!("Reading data from file {}", file.display());
    let mut aggregation = load_file(&file, config.loader.file_type, LogReporter)?;
    report_problems(&aggregation);

    let pruned = aggregation.prune_short(config.loader.min_points);
    if pruned > 0 {
        log::info!("Dropped {} topics with fewer than {} points", pruned, config.loader.min_points);
    }
    aggregation.sort_by_topic();

    if let Some(path) = &args.export {
        match config.output.format {
            ExportFormat::Json => export_to_json(&aggregation.trend_lines, path)?,
            ExportFormat::Csv | ExportFormat::Text => export_to_csv(&aggregation.trend_lines, path)?,
        }
        log::info!("Exported {} trend lines to {}", aggregation.trend_lines.len(), path.display());
    }

    if let Some(topics) = &args.compare {
        let (a, b) = match topics.as_slice() {
            [a, b] => (a, b),
            _ => return Err(Error::Parse("--compare takes exactly two topics".to_string())),
        };
        let left = aggregation.find(a).ok_or_else(|| Error::UnknownTopic(a.clone()))?;
        let right = aggregation.find(b).ok_or_else(|| Error::UnknownTopic(b.clone()))?;
        let report = left.distance(right, &engine);
        print_reports(&[report], config.output.format)?;
    } else if args.pairwise {
        let mut reports = if args.threads == 1 {
            engine.pairwise(&aggregation.trend_lines)
        } else {
            engine.pairwise_parallel(&aggregation.trend_lines, args.threads)
        };
        sort_by_similarity(&mut reports);
        print_reports(&reports, config.output.format)?;
    } else if args.export.is_none() {
        print_trend_lines(&aggregation, config.output.format)?;
    }

    Ok(())
}

fn report_problems(aggregation: &Aggregation) {
    for warning in &aggregation.warnings {
        log::warn!("{}", warning);
    }
    if !aggregation.parse_errors.is_empty() {
        log::warn!("{} lines could not be parsed", aggregation.parse_errors.len());
    }
}

fn print_trend_lines(aggregation: &Aggregation, format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Json => println!("{}", render_json(&aggregation.trend_lines)?),
        ExportFormat::Csv => print!("{}", render_csv(&aggregation.trend_lines)),
        ExportFormat::Text => {
            println!("{} topics from {} records", aggregation.trend_lines.len(), aggregation.records);
            for line in &aggregation.trend_lines {
                let span = match (line.first_timestamp(), line.last_timestamp()) {
                    (Some(first), Some(last)) => format!("{}..{}", first, last),
                    _ => "-".to_string(),
                };
                println!(
                    "{} | points: {} | span: {} | trending: {}",
                    line.topic(),
                    line.len(),
                    span,
                    line.trending_points()
                );
            }
        }
    }
    Ok(())
}

fn print_reports(reports: &[DistanceReport], format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Json => println!("{}", render_reports_json(reports)?),
        ExportFormat::Csv => {
            println!("left,right,compared_points,total,normalized");
            for report in reports {
                println!(
                    "{},{},{},{},{}",
                    report.left(),
                    report.right(),
                    report.compared_points(),
                    report.total().map(|t| t.to_string()).unwrap_or_else(|| "undefined".to_string()),
                    report.normalized().map(|n| n.to_string()).unwrap_or_else(|| "undefined".to_string())
                );
            }
        }
        ExportFormat::Text => {
            for report in reports {
                println!(
                    "{} <-> {} | compared: {} | distance: {}",
                    report.left(),
                    report.right(),
                    report.compared_points(),
                    report.distance()
                );
            }
        }
    }
    Ok(())
}
