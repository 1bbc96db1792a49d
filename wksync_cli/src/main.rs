use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use wksync_core::*;

#[derive(Parser)]
#[command(name = "wksync")]
#[command(about = "Workout plan converter and scheduler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a workout document and print the execution plan as JSON
    Convert {
        /// Workout JSON file, or '-' for stdin
        input: PathBuf,

        /// Print on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Validate a workout document and print a summary
    Check {
        /// Workout JSON file, or '-' for stdin
        input: PathBuf,
    },

    /// Convert a workout document and save it to the plan store
    Schedule {
        /// Workout JSON file, or '-' for stdin
        input: PathBuf,

        /// Local start time (YYYY-MM-DDTHH:MM); defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Show what would be scheduled without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// List plans in the plan store
    List,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    wksync_core::logging::init_with_level(wksync_core::logging::level_for_verbosity(cli.verbose));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data dir {:?}", data_dir);

    match cli.command {
        Commands::Convert { input, compact } => cmd_convert(&input, compact, &config),
        Commands::Check { input } => cmd_check(&input, &config),
        Commands::Schedule { input, at, dry_run } => {
            cmd_schedule(&input, at.as_deref(), dry_run, &data_dir, &config)
        }
        Commands::List => cmd_list(&data_dir),
    }
}

fn cmd_convert(input: &Path, compact: bool, config: &Config) -> Result<()> {
    let plan = load_plan(input, config)?;

    let json = if compact {
        serde_json::to_string(&plan)?
    } else {
        serde_json::to_string_pretty(&plan)?
    };
    println!("{}", json);
    Ok(())
}

fn cmd_check(input: &Path, config: &Config) -> Result<()> {
    let plan = load_plan(input, config)?;
    display_summary(&plan);
    Ok(())
}

fn cmd_schedule(
    input: &Path,
    at: Option<&str>,
    dry_run: bool,
    data_dir: &Path,
    config: &Config,
) -> Result<()> {
    let schedule_at = at.map(parse_schedule_time).transpose()?;
    let bytes = read_input(input)?;

    let mut sync = WorkoutSync::with_options(
        config.builder.clone(),
        JsonlPlanStore::in_data_dir(data_dir),
    );

    if dry_run {
        let document = sync.parse(&bytes)?;
        let plan = sync.convert(&document)?;
        display_summary(&plan);
        match schedule_at {
            Some(when) => println!("\n[Dry run - would schedule for {}]", when),
            None => println!("\n[Dry run - would schedule for now]"),
        }
        return Ok(());
    }

    let record = sync.parse_and_save(&bytes, schedule_at)?;

    println!("✓ Scheduled {:?} for {}", record.plan.title, record.scheduled_for);
    println!("  Id:    {}", record.id);
    println!("  Store: {}", sync.sink().path().display());
    Ok(())
}

fn cmd_list(data_dir: &Path) -> Result<()> {
    let store = JsonlPlanStore::in_data_dir(data_dir);
    let plans = read_scheduled(store.path())?;

    if plans.is_empty() {
        println!("No scheduled plans.");
        return Ok(());
    }

    for record in &plans {
        println!(
            "{}  {}  {:?}, {} blocks, {} steps",
            record.scheduled_for.format("%Y-%m-%d %H:%M"),
            record.plan.title,
            record.plan.activity,
            record.plan.blocks.len(),
            record.plan.step_count()
        );
    }
    Ok(())
}

fn load_plan(input: &Path, config: &Config) -> Result<ExecutionPlan> {
    let bytes = read_input(input)?;
    let document = decode(&bytes)?;
    Ok(PlanBuilder::new(config.builder.clone()).build(&document)?)
}

/// Read a file, or stdin when the path is '-'
fn read_input(input: &Path) -> Result<Vec<u8>> {
    if input.as_os_str() == "-" {
        let mut bytes = Vec::new();
        io::stdin().read_to_end(&mut bytes)?;
        Ok(bytes)
    } else {
        Ok(std::fs::read(input)?)
    }
}

fn parse_schedule_time(text: &str) -> Result<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .ok_or_else(|| {
            Error::Schedule(format!(
                "invalid start time {:?}, expected YYYY-MM-DDTHH:MM",
                text
            ))
        })
}

fn display_summary(plan: &ExecutionPlan) {
    let seconds = plan.timed_seconds();

    println!("Title: {}", plan.title);
    println!("Activity: {:?}", plan.activity);
    println!("Warmup: {}", edge_label(plan.warmup.as_ref()));
    println!("Cooldown: {}", edge_label(plan.cooldown.as_ref()));
    println!("Blocks: {}", plan.blocks.len());
    for (i, block) in plan.blocks.iter().enumerate() {
        println!(
            "  {}. {} x {} steps",
            i + 1,
            block.iterations,
            block.steps.len()
        );
    }
    println!("Steps: {}", plan.step_count());
    println!("Timed: {}s ({} min)", seconds, seconds / 60);
}

fn edge_label(step: Option<&WorkStep>) -> String {
    match step.map(|s| s.goal) {
        Some(Goal::Time { seconds }) => format!("{}s", seconds),
        Some(Goal::Distance { meters }) => format!("{}m", meters),
        Some(Goal::Open) => "open".into(),
        None => "none".into(),
    }
}
