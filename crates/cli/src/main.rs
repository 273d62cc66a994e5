//! The `pipeline` binary — a subcommand per stage plus a `run` driver that
//! walks the full dependency DAG (or a `--from`/`--to` slice of it) for one
//! academic year: an operator-run batch tool, not a long-lived server.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pipeline_config::{load_policy, EnvConfig, PolicyConfig};
use pipeline_domain::EngineError;
use pipeline_engines::{run_with_retry, sql_stages, topological_order, Stage};
use pipeline_ml::MlForecastStage;
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "pipeline", about = "School infrastructure risk and forecasting pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct YearArgs {
    /// Academic year in YYYY-YY form (e.g. 2023-24).
    #[arg(long)]
    year: String,
    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args)]
struct ConfigArgs {
    /// Optional TOML file overlaying policy defaults (spec.md §6).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full DAG, or a `--from`/`--to` slice of it, for one academic year.
    Run {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        year: String,
        #[command(flatten)]
        config: ConfigArgs,
        /// Print the resolved stage order without executing anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Create or update the twelve pipeline tables (idempotent).
    Bootstrap {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Stage 1 — classroom gap per school-year (spec.md §4.1).
    InfraGap(YearArgs),
    /// Stage 2 — teacher gap per school-year (spec.md §4.2).
    TeacherAdequacy(YearArgs),
    /// Stage 3 — deficit ratios, growth rate and composite risk score (spec.md §4.3–§4.4).
    ComplianceRisk(YearArgs),
    /// Stage 4 — priority bucket assignment (spec.md §4.5).
    Prioritisation(YearArgs),
    /// Stage 5 — budget allocation simulation (spec.md §4.6).
    BudgetAllocation(YearArgs),
    /// Stage 6 — year-over-year risk trend (spec.md §4.7).
    RiskTrend(YearArgs),
    /// Stage 7 — district compliance index (spec.md §4.8, grading pass).
    DistrictCompliance(YearArgs),
    /// Stage 8 — synthetic proposal generation and validation (spec.md §4.8).
    ProposalValidation(YearArgs),
    /// Stage 9 — weighted moving-average enrolment forecast, whole series (spec.md §4.9).
    WmaForecast {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Stage 10 — gradient-boosted growth-rate forecast, whole series (spec.md §4.10).
    MlForecast {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Print the stages in resolved dependency order and exit.
    ListStages,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let env = EnvConfig::from_env().context("loading environment configuration")?;
    let pool = pipeline_storage::create_pool(&env.database_url)
        .await
        .context("connecting to the database")?;
    pipeline_storage::check_connection(&pool)
        .await
        .context("checking database connectivity")?;

    match cli.command {
        Command::Run {
            from,
            to,
            year,
            config,
            dry_run,
        } => {
            let policy = load_policy(config.config.as_deref())?;
            let stages = full_stage_list();
            let refs: Vec<&dyn Stage> = stages.iter().map(|s| s.as_ref()).collect();
            let ordered = topological_order(&refs, from.as_deref(), to.as_deref())?;

            if dry_run {
                for stage in &ordered {
                    println!("{}", stage.name());
                }
                return Ok(());
            }

            for stage in ordered {
                run_one(stage, &pool, &year, &policy, env.max_batch_retries).await?;
            }
        }
        Command::Bootstrap { config } => {
            let policy = load_policy(config.config.as_deref())?;
            run_one(&pipeline_engines::BootstrapStage, &pool, "", &policy, env.max_batch_retries).await?;
        }
        Command::InfraGap(args) => {
            let policy = load_policy(args.config.config.as_deref())?;
            run_one(&pipeline_engines::InfraGapStage, &pool, &args.year, &policy, env.max_batch_retries).await?;
        }
        Command::TeacherAdequacy(args) => {
            let policy = load_policy(args.config.config.as_deref())?;
            run_one(&pipeline_engines::TeacherAdequacyStage, &pool, &args.year, &policy, env.max_batch_retries).await?;
        }
        Command::ComplianceRisk(args) => {
            let policy = load_policy(args.config.config.as_deref())?;
            run_one(&pipeline_engines::ComplianceRiskStage, &pool, &args.year, &policy, env.max_batch_retries).await?;
        }
        Command::Prioritisation(args) => {
            let policy = load_policy(args.config.config.as_deref())?;
            run_one(&pipeline_engines::PrioritisationStage, &pool, &args.year, &policy, env.max_batch_retries).await?;
        }
        Command::BudgetAllocation(args) => {
            let policy = load_policy(args.config.config.as_deref())?;
            run_one(&pipeline_engines::BudgetAllocationStage, &pool, &args.year, &policy, env.max_batch_retries).await?;
        }
        Command::RiskTrend(args) => {
            let policy = load_policy(args.config.config.as_deref())?;
            run_one(&pipeline_engines::RiskTrendStage, &pool, &args.year, &policy, env.max_batch_retries).await?;
        }
        Command::DistrictCompliance(args) => {
            let policy = load_policy(args.config.config.as_deref())?;
            run_one(&pipeline_engines::DistrictComplianceStage, &pool, &args.year, &policy, env.max_batch_retries).await?;
        }
        Command::ProposalValidation(args) => {
            let policy = load_policy(args.config.config.as_deref())?;
            run_one(&pipeline_engines::ProposalValidationStage, &pool, &args.year, &policy, env.max_batch_retries).await?;
        }
        Command::WmaForecast { config } => {
            let policy = load_policy(config.config.as_deref())?;
            run_one(&pipeline_engines::WmaForecastStage, &pool, "", &policy, env.max_batch_retries).await?;
        }
        Command::MlForecast { config } => {
            let policy = load_policy(config.config.as_deref())?;
            run_one(&MlForecastStage, &pool, "", &policy, env.max_batch_retries).await?;
        }
        Command::ListStages => {
            let stages = full_stage_list();
            let refs: Vec<&dyn Stage> = stages.iter().map(|s| s.as_ref()).collect();
            for stage in topological_order(&refs, None, None)? {
                println!("{}", stage.name());
            }
        }
    }

    Ok(())
}

/// All ten SQL stages plus the ML forecast stage that lives in its own
/// crate, in one dependency-sortable list.
fn full_stage_list() -> Vec<Box<dyn Stage>> {
    let mut stages = sql_stages();
    stages.push(Box::new(MlForecastStage));
    stages
}

async fn run_one(
    stage: &dyn Stage,
    pool: &PgPool,
    year: &str,
    policy: &PolicyConfig,
    max_retries: u32,
) -> Result<(), EngineError> {
    let report = run_with_retry(stage, pool, year, policy, max_retries).await?;
    report.log();
    Ok(())
}
