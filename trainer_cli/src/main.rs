use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use trainer_core::*;

#[derive(Parser)]
#[command(name = "artrain")]
#[command(about = "SmartARTrainer progress tracking and plan promotion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrol a trainee on the plan matching their experience
    Enroll {
        #[arg(long)]
        id: TraineeId,

        #[arg(long)]
        name: String,

        /// Workout experience (beginner, intermediate, advanced, ...)
        #[arg(long)]
        experience: Option<String>,
    },

    /// Record a finished exercise
    Log {
        #[arg(long)]
        id: TraineeId,

        /// Exercise name, e.g. "Push-up" or "Plank"
        #[arg(long)]
        exercise: String,

        /// Correct repetitions (rep-based exercises)
        #[arg(long, conflicts_with = "duration")]
        correct: Option<u32>,

        /// Wrong repetitions (rep-based exercises)
        #[arg(long, conflicts_with = "duration")]
        wrong: Option<u32>,

        /// Seconds held (time-based exercises)
        #[arg(long)]
        duration: Option<u32>,
    },

    /// Show score, success rates and analytics without changing anything
    Status {
        #[arg(long)]
        id: TraineeId,
    },

    /// Run the promotion check and apply its outcome
    Evaluate {
        #[arg(long)]
        id: TraineeId,

        /// Show the outcome without saving it
        #[arg(long)]
        dry_run: bool,
    },

    /// List plans and their targets
    Plans,

    /// Append sessions from a CSV file
    Import {
        #[arg(long)]
        id: TraineeId,

        file: PathBuf,
    },

    /// Write a trainee's session history to CSV
    Export {
        #[arg(long)]
        id: TraineeId,

        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    trainer_core::logging::init_for_verbosity(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.validate()?;

    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let plans = config.plan_catalog();
    let mut store = FileStore::new(data_dir);

    match cli.command {
        Commands::Enroll {
            id,
            name,
            experience,
        } => cmd_enroll(&mut store, &plans, &config, id, &name, experience.as_deref()),
        Commands::Log {
            id,
            exercise,
            correct,
            wrong,
            duration,
        } => cmd_log(
            &mut store, &plans, &config, id, &exercise, correct, wrong, duration,
        ),
        Commands::Status { id } => cmd_status(&mut store, &plans, &config, id),
        Commands::Evaluate { id, dry_run } => cmd_evaluate(&mut store, &plans, &config, id, dry_run),
        Commands::Plans => {
            display_plans(&plans);
            Ok(())
        }
        Commands::Import { id, file } => cmd_import(&mut store, &plans, &config, id, &file),
        Commands::Export { id, file } => cmd_export(&store, id, &file),
    }
}

fn cmd_enroll(
    store: &mut FileStore,
    plans: &PlanCatalog,
    config: &Config,
    id: TraineeId,
    name: &str,
    experience: Option<&str>,
) -> Result<()> {
    let profile =
        ProgressEngine::new(store, plans, &config.promotion).enroll(id, name, experience, Utc::now())?;

    println!(
        "✓ Enrolled {} (trainee {}) on plan {}: {}",
        profile.name, profile.trainee_id, profile.plan_id, profile.fitness_level
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_log(
    store: &mut FileStore,
    plans: &PlanCatalog,
    config: &Config,
    id: TraineeId,
    exercise: &str,
    correct: Option<u32>,
    wrong: Option<u32>,
    duration: Option<u32>,
) -> Result<()> {
    let exercise: Exercise = exercise.parse()?;
    let now = Utc::now();

    let record = match (correct, wrong, duration) {
        (None, None, None) => {
            return Err(Error::InvalidSession(format!(
                "nothing to log for {}: pass --correct/--wrong or --duration",
                exercise
            )));
        }
        (_, _, Some(seconds)) => SessionRecord::timed(exercise, seconds, now)?,
        (correct, wrong, None) => {
            SessionRecord::reps(exercise, correct.unwrap_or(0), wrong.unwrap_or(0), now)?
        }
    };

    let reset =
        ProgressEngine::new(store, plans, &config.promotion).record_session(id, &record, now)?;

    if let Some(outcome) = reset {
        println!("! Progress reset first: {}", outcome);
    }

    match record.measurement() {
        Measurement::Reps { correct, wrong } => {
            println!("✓ Logged {}: {} correct, {} wrong", exercise, correct, wrong)
        }
        Measurement::Seconds(seconds) => println!("✓ Logged {}: {} sec", exercise, seconds),
        Measurement::Empty => println!("✓ Logged {}: no activity", exercise),
    }
    Ok(())
}

fn cmd_status(
    store: &mut FileStore,
    plans: &PlanCatalog,
    config: &Config,
    id: TraineeId,
) -> Result<()> {
    let snapshot = store.get_trainee(id)?;
    let evaluation = ProgressEngine::new(store, plans, &config.promotion).preview(id, Utc::now())?;
    let plan = plans.resolve(evaluation.decided_on.plan_id)?;

    println!(
        "Trainee {} ({}): plan {} - {}",
        id, snapshot.profile.name, plan.id, snapshot.profile.fitness_level
    );
    match snapshot.last_activity {
        Some(date) => println!("Last activity: {}", date),
        None => println!("Last activity: none"),
    }
    println!();
    display_scorecard(&evaluation.decided_on, plan);
    println!();
    display_analytics(&AnalyticsSummary::from_totals(&evaluation.totals));

    if evaluation.rejected_rows > 0 {
        println!("\n({} malformed session rows ignored)", evaluation.rejected_rows);
    }
    println!("\nIf evaluated now: {}", evaluation.outcome);
    Ok(())
}

fn cmd_evaluate(
    store: &mut FileStore,
    plans: &PlanCatalog,
    config: &Config,
    id: TraineeId,
    dry_run: bool,
) -> Result<()> {
    let mut engine = ProgressEngine::new(store, plans, &config.promotion);
    let now = Utc::now();
    let evaluation = if dry_run {
        engine.preview(id, now)?
    } else {
        engine.evaluate(id, now)?
    };

    let card = &evaluation.decided_on;
    println!(
        "Plan {}: {} / {} points over {} sessions",
        card.plan_id, card.total_points, card.max_points, card.total_sessions
    );
    println!("Outcome: {}", evaluation.outcome);

    if dry_run {
        println!("\n[Dry run - nothing saved]");
        return Ok(());
    }

    if evaluation.applied {
        let active = &evaluation.active;
        let plan = plans.resolve(active.plan_id)?;
        println!(
            "Now on plan {} ({}): {} / {} points",
            plan.id, plan.label, active.total_points, active.max_points
        );
    }
    Ok(())
}

fn cmd_import(
    store: &mut FileStore,
    plans: &PlanCatalog,
    config: &Config,
    id: TraineeId,
    file: &Path,
) -> Result<()> {
    let rows = trainer_core::import::read_sessions_csv(file)?;
    let summary =
        ProgressEngine::new(store, plans, &config.promotion).import_sessions(id, rows)?;

    println!(
        "✓ Imported {} sessions ({} skipped)",
        summary.imported, summary.skipped
    );
    Ok(())
}

fn cmd_export(store: &FileStore, id: TraineeId, file: &Path) -> Result<()> {
    store.get_trainee(id)?;
    let records = trainer_core::aggregate::ingest(store.load_sessions(id)?).records;
    let count = trainer_core::report::export_sessions_csv(&records, file)?;

    println!("✓ Exported {} sessions to {}", count, file.display());
    Ok(())
}

fn display_scorecard(card: &Scorecard, plan: &PlanTargets) {
    println!(
        "Points: {} / {} ({} sessions)",
        card.total_points, card.max_points, card.total_sessions
    );
    println!("Success rates:");
    for target in &plan.targets {
        println!(
            "  {:<14} {:>5.1}%   target {} {}",
            target.exercise.name(),
            card.rates.display_value(target.exercise),
            target.target,
            target.exercise.unit()
        );
    }
}

fn display_analytics(summary: &AnalyticsSummary) {
    println!("Total sessions: {}", summary.total_sessions);

    println!("Rep-based workouts:");
    if summary.rep_rows.is_empty() {
        println!("  (none yet)");
    }
    for row in &summary.rep_rows {
        println!(
            "  {:<14} total {:>4}   correct {:>4}   wrong {:>4}",
            row.exercise.name(),
            row.total,
            row.correct,
            row.wrong
        );
    }

    println!("Time-based workouts:");
    if summary.time_rows.is_empty() {
        println!("  (none yet)");
    }
    for row in &summary.time_rows {
        println!("  {:<14} {} sec", row.exercise.name(), row.total_seconds);
    }
}

fn display_plans(plans: &PlanCatalog) {
    for plan in plans.plans() {
        println!(
            "Plan {}: {} (promotion at {} points)",
            plan.id,
            plan.label,
            trainer_core::scoring::max_points(plan)
        );
        for target in &plan.targets {
            println!(
                "  {:<14} {} {}",
                target.exercise.name(),
                target.target,
                target.exercise.unit()
            );
        }
    }
}
