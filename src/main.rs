use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, CommandFactory, Parser, Subcommand};
use ratkiez::accounts::resolve;
use ratkiez::audit::Warning;
use ratkiez::aws::client::AwsSessionProvider;
use ratkiez::aws::profiles::ConfigFileStore;
use ratkiez::commands::Command;
use ratkiez::config::{
    AuditConfig, FailurePolicy, ProfileSelection, DEFAULT_PROFILE, DEFAULT_REGION,
    DEFAULT_ROLE_NAME, DEFAULT_USER_CONCURRENCY,
};
use ratkiez::context::CredentialContext;
use ratkiez::engine::execute_with_progress;
use ratkiez::error::AuditError;
use ratkiez::output::{render, OutputFormat};
use ratkiez::utils::format::plural;
use ratkiez::utils::progress::ProgressBar;
use ratkiez::utils::time::duration_human;
use std::fs::File;
use std::io::BufWriter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ratkiez")]
#[command(about = "Audit IAM users and access keys across AWS profiles and accounts", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// AWS region used for every session
    #[arg(long, global = true, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    region: String,

    /// AWS profile to audit (repeat for several profiles)
    #[arg(short, long = "profile", global = true, default_value = DEFAULT_PROFILE)]
    profiles: Vec<String>,

    /// Audit every profile in the local AWS config
    #[arg(long, global = true)]
    all_profiles: bool,

    /// Also audit every member account of each profile's organization
    #[arg(long, global = true)]
    org: bool,

    /// Role assumed in member accounts with --org
    #[arg(long, global = true, default_value = DEFAULT_ROLE_NAME)]
    role_name: String,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Sort records by profile, user and key
    #[arg(long, global = true)]
    sort: bool,

    /// Include account ID and name columns in table and CSV output
    #[arg(long, global = true)]
    account_columns: bool,

    /// What to do when a profile or account cannot be audited
    #[arg(long, global = true, value_enum, default_value_t = FailurePolicy::BestEffort)]
    failure_policy: FailurePolicy,

    /// Users collected concurrently within each account
    #[arg(long, global = true, default_value_t = DEFAULT_USER_CONCURRENCY)]
    user_concurrency: usize,

    /// Debug logging and a list of resolved contexts
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Hide the progress bar
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit every IAM user
    Scan,

    /// Audit specific users by name
    ///
    /// Users that do not exist in an account are skipped.
    User {
        /// User names to audit
        #[arg(required = true)]
        usernames: Vec<String>,
    },

    /// Audit the owners of specific access keys
    ///
    /// Keys that belong to other accounts are skipped.
    Key {
        /// Access key IDs to look up
        #[arg(required = true)]
        key_ids: Vec<String>,
    },

    /// Generate shell completion scripts
    GenerateCompletion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "ratkiez=debug" } else { "ratkiez=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let command = match cli.command {
        Commands::Scan => Command::ScanAll,
        Commands::User { usernames } => Command::ByUsernames(usernames),
        Commands::Key { key_ids } => Command::ByKeyIds(key_ids),
        Commands::GenerateCompletion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "ratkiez", &mut std::io::stdout());
            return Ok(());
        }
    };

    run(&cli.global, command).await
}

async fn run(args: &GlobalArgs, command: Command) -> Result<()> {
    let selection = ProfileSelection {
        profiles: args.profiles.clone(),
        all_profiles: args.all_profiles,
        expand_organization: args.org,
    };
    let config = AuditConfig {
        region: args.region.clone(),
        role_name: args.role_name.clone(),
        failure_policy: args.failure_policy,
        user_concurrency: args.user_concurrency,
    };

    eprintln!("Resolving credential contexts in {}...", config.region);
    let resolution = resolve(
        &selection,
        &config,
        &AwsSessionProvider::default(),
        &ConfigFileStore::from_env(),
    )
    .await
    .context("Failed to resolve credential contexts")?;

    let mut warnings = resolution.warnings;
    let contexts = resolution.contexts;
    let context_count = contexts.len();

    eprintln!(
        "Running {} across {}",
        command.name(),
        plural(context_count, "context")
    );
    if args.verbose {
        print_contexts(&contexts);
    }

    let progress = if args.quiet || context_count < 2 {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(context_count, "Auditing")
    };

    let mut report = match execute_with_progress(contexts, command, &config, progress).await {
        Ok(report) => report,
        Err(err) => {
            if let AuditError::NoData { warnings: failed } = &err {
                warnings.extend(failed.iter().cloned());
            }
            print_warnings(&warnings);
            return Err(err.into());
        }
    };
    warnings.append(&mut report.warnings);

    if args.sort {
        report.sort();
    }

    if let Some(output_path) = &args.output {
        let file = File::create(output_path)
            .with_context(|| format!("Failed to create output file: {}", output_path))?;
        render(
            &report.records,
            args.format,
            args.account_columns,
            BufWriter::new(file),
        )
        .with_context(|| format!("Failed to write output to: {}", output_path))?;
        eprintln!("Output written to: {}", output_path);
    } else {
        render(
            &report.records,
            args.format,
            args.account_columns,
            std::io::stdout().lock(),
        )?;
    }

    print_warnings(&warnings);
    eprintln!(
        "\nSummary: {} from {}, {}",
        plural(report.records.len(), "key record"),
        plural(context_count, "context"),
        plural(warnings.len(), "warning")
    );

    Ok(())
}

fn print_contexts(contexts: &[CredentialContext]) {
    let now = Utc::now();
    for ctx in contexts {
        match ctx.expires_at() {
            Some(expiry) => eprintln!(
                "  {} (credentials expire in {})",
                ctx.scope(),
                duration_human(&now, &expiry)
            ),
            None => eprintln!("  {}", ctx.scope()),
        }
    }
}

fn print_warnings(warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }
    eprintln!("\nWarnings ({}):", warnings.len());
    for warning in warnings {
        eprintln!("  - {}", warning);
    }
}
