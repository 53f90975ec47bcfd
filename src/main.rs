use anyhow::{bail, Result};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shift_report::{ReportConfig, ReportPipeline, VERSION};

const USAGE: &str = "usage: shift-report [INPUT.json] [OUTPUT.csv] [--config CONFIG.json]";

struct Args {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        input: None,
        output: None,
        config: None,
    };

    let mut raw = env::args().skip(1);
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--config" | "-c" => match raw.next() {
                Some(path) => args.config = Some(PathBuf::from(path)),
                None => bail!("--config needs a file path\n{}", USAGE),
            },
            "--help" | "-h" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            flag if flag.starts_with('-') => bail!("unknown flag: {}\n{}", flag, USAGE),
            _ if args.input.is_none() => args.input = Some(PathBuf::from(&arg)),
            _ if args.output.is_none() => args.output = Some(PathBuf::from(&arg)),
            _ => bail!("unexpected argument: {}\n{}", arg, USAGE),
        }
    }

    Ok(args)
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let args = parse_args()?;

    println!("🧾 Shift Report v{}", VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Configuration
    let mut config = match &args.config {
        Some(path) => ReportConfig::from_file(path)?,
        None => ReportConfig::default(),
    };
    if let Some(input) = args.input {
        // A new input without an explicit output writes next to the input
        if args.output.is_none() {
            config.output_path = None;
        }
        config.input_path = input;
    }
    if let Some(output) = args.output {
        config.output_path = Some(output);
    }

    let input = config.input_path.clone();
    let output = config.resolved_output_path();
    let pipeline = ReportPipeline::new(config)?;

    let teams: Vec<String> = pipeline
        .config()
        .teams
        .iter()
        .map(|t| format!("{} ← {}", t.team, t.tax_types.join(", ")))
        .collect();
    println!("\n⚙️  Teams: {}", teams.join(" | "));

    // 2. Transform + write
    println!("\n📂 {} → {}", input.display(), output.display());
    let report = pipeline.run_files(&input, &output)?;

    // 3. Summary
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✓ {}", report.summary.summary());
    for team in &report.teams {
        if let Some(total) = report.team_total(team) {
            println!("  {}: {:.2}", team, total);
        }
    }
    if report.summary.has_unmapped() {
        println!("⚠️  Unmapped tax types (not in any team column):");
        for (code, amount) in &report.summary.unmapped_tax_types {
            println!("  {}: {:.2}", code, amount);
        }
    }

    println!("...Done");

    Ok(())
}
