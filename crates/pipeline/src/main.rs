use arrow::util::pretty::pretty_format_batches;
use txc_common::ReportConfig;
use txc_ops::RowSet;
use txc_pipeline::{build_monthly_artifact, compare_channels, monthly_growth, top_groups};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args
        .first()
        .map(|a| a == "--help" || a == "-h")
        .unwrap_or(false)
    {
        print_usage();
        return Ok(());
    }

    let opts = parse_opts(&args)?;
    let cfg = match &opts.config {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };

    match opts.stage {
        Stage::TopGroups => render("top groups", top_groups(&cfg)?)?,
        Stage::Compare => render("channel comparison", compare_channels(&cfg)?)?,
        Stage::Materialize => {
            let path = build_monthly_artifact(&cfg)?;
            println!("materialized {} -> {}", cfg.artifact.name, path.display());
        }
        Stage::Growth => render("monthly growth", monthly_growth(&cfg)?)?,
        Stage::All => {
            render("top groups", top_groups(&cfg)?)?;
            render("channel comparison", compare_channels(&cfg)?)?;
            let path = build_monthly_artifact(&cfg)?;
            println!("materialized {} -> {}", cfg.artifact.name, path.display());
            render("monthly growth", monthly_growth(&cfg)?)?;
        }
    }
    Ok(())
}

fn render(title: &str, rows: RowSet) -> Result<(), Box<dyn std::error::Error>> {
    println!("== {title} ==");
    if rows.is_empty() {
        println!("OK: 0 rows");
        return Ok(());
    }
    let batch = rows.to_batch()?;
    let rendered = pretty_format_batches(&[batch])?;
    println!("{rendered}");
    Ok(())
}

#[derive(Debug, Clone)]
struct CliOpts {
    config: Option<String>,
    stage: Stage,
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    All,
    TopGroups,
    Compare,
    Materialize,
    Growth,
}

fn parse_opts(args: &[String]) -> Result<CliOpts, Box<dyn std::error::Error>> {
    let mut config = None;
    let mut stage = Stage::All;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config = Some(
                    args.get(i)
                        .ok_or("--config requires a path argument")?
                        .clone(),
                );
            }
            "all" => stage = Stage::All,
            "top-groups" => stage = Stage::TopGroups,
            "compare" => stage = Stage::Compare,
            "materialize" => stage = Stage::Materialize,
            "growth" => stage = Stage::Growth,
            other => return Err(format!("unknown argument: {other}").into()),
        }
        i += 1;
    }
    Ok(CliOpts { config, stage })
}

fn print_usage() {
    println!("txcube [--config PATH] [STAGE]");
    println!();
    println!("STAGE:");
    println!("  all          run the full walkthrough (default)");
    println!("  top-groups   grouped totals, having-filtered, top-N ranked");
    println!("  compare      full outer comparison of the two channels");
    println!("  materialize  build the monthly aggregate artifact");
    println!("  growth       month index and growth over the artifact");
    println!();
    println!("Without --config the built-in defaults are used.");
}
