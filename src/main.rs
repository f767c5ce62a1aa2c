use mutjudge::error::JudgeError;
use mutjudge::judge::{Judge, JudgeConfig};
use mutjudge::mutants;
use mutjudge::output;
use mutjudge::probe::{self, ProbeConfig};
use mutjudge::state;
use mutjudge::suite::VectorSuite;

use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

const EXIT_USAGE: i32 = 2;
const EXIT_INCOMPLETE: i32 = 4;

#[derive(Parser)]
#[command(name = "mutjudge", version, about = "Mutation-adequacy judge for student test suites")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Judge a test suite against the reference and the known mutants
    Run {
        /// Problem id (see `mutjudge problems`)
        #[arg(short, long, default_value = "max-seq")]
        problem: String,
        /// JSON suite file; omit to judge the problem's hidden suite
        #[arg(short, long)]
        suite: Option<PathBuf>,
        /// Minimum fraction of mutants that must be killed
        #[arg(long, env = "MUTJUDGE_THRESHOLD", default_value = "1.0")]
        threshold: f64,
        /// Worker threads (default: available parallelism)
        #[arg(short, long, env = "MUTJUDGE_WORKERS")]
        workers: Option<usize>,
        /// Abandon the run after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Random inputs to try per surviving mutant when looking for hints
        #[arg(long, default_value = "500")]
        probe: usize,
        /// Seed for hint probing
        #[arg(long)]
        seed: Option<u64>,
        /// Output JSON instead of human-readable text
        #[arg(long)]
        json: bool,
        /// Exit code only, no output
        #[arg(short, long)]
        quiet: bool,
    },
    /// Show the kill record of one mutant from the last run
    Show {
        /// Mutant ref (e.g. @m1 or mutant1)
        #[arg(name = "ref")]
        mutant_ref: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Summary of last run
    Status {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// List built-in problems
    Problems,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MUTJUDGE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    mutants::silence_captured_panics();
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Run {
            problem,
            suite,
            threshold,
            workers,
            timeout_ms,
            probe,
            seed,
            json,
            quiet,
        } => {
            let config = JudgeConfig {
                threshold,
                workers,
                timeout: timeout_ms.map(Duration::from_millis),
            };
            let mut probe_config = ProbeConfig {
                attempts: probe,
                ..ProbeConfig::default()
            };
            if let Some(seed) = seed {
                probe_config.seed = seed;
            }
            cmd_run(&problem, suite, config, probe_config, json, quiet)
        }
        Commands::Show { mutant_ref, json } => cmd_show(&mutant_ref, json),
        Commands::Status { json } => cmd_status(json),
        Commands::Problems => cmd_problems(),
    };

    process::exit(exit_code);
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(s) => println!("{s}"),
        Err(e) => output::print_error(&format!("Failed to serialize report: {e}")),
    }
}

fn cmd_run(
    problem_id: &str,
    suite_file: Option<PathBuf>,
    config: JudgeConfig,
    probe_config: ProbeConfig,
    json_mode: bool,
    quiet: bool,
) -> i32 {
    let problem = match mutjudge::lookup_problem(problem_id) {
        Ok(p) => p,
        Err(e) => {
            let known: Vec<_> = mutjudge::PROBLEMS.iter().map(|p| p.id()).collect();
            output::print_error(&format!("{e}. Available: {}", known.join(", ")));
            return EXIT_USAGE;
        }
    };

    let judge = match Judge::new(config) {
        Ok(j) => j,
        Err(e) => {
            output::print_error(&e.to_string());
            return EXIT_USAGE;
        }
    };

    let suite = match &suite_file {
        Some(path) => match VectorSuite::load(path) {
            Ok(s) => s,
            Err(e) => {
                output::print_error(&format!("{e}. Pass --suite <path> with a JSON array of {{\"input\": [...], \"expected\": n}}."));
                return EXIT_USAGE;
            }
        },
        None => problem.hidden_suite(),
    };

    let reference = problem.reference();
    let corpus = match problem.corpus() {
        Ok(c) => c,
        Err(e) => {
            output::print_error(&e.to_string());
            return EXIT_USAGE;
        }
    };

    let start = Instant::now();
    let verdict = match judge.judge(&reference, &corpus, &suite) {
        Ok(v) => v,
        Err(JudgeError::Incomplete { reason }) => {
            if !quiet {
                output::print_incomplete(reason);
            }
            return EXIT_INCOMPLETE;
        }
        Err(e) => {
            output::print_error(&e.to_string());
            return EXIT_USAGE;
        }
    };

    let hints = if verdict.reference_all_pass && probe_config.attempts > 0 {
        let survivors = verdict.survivors().filter_map(|r| corpus.get(&r.mutant_id));
        probe::hints(&reference, survivors, &probe_config)
    } else {
        vec![]
    };

    let label = suite_file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| format!("{} (hidden suite)", problem.id()));
    let last_run = state::LastRun {
        problem: problem.id().to_string(),
        suite_file: suite_file.as_ref().map(|p| p.display().to_string()),
        verdict,
        hints,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    state::save_last_run(&last_run);

    if !quiet {
        if json_mode {
            print_json(&last_run);
        } else {
            output::print_verdict(&last_run.verdict, &suite, &last_run.hints, &label);
        }
    }

    last_run.verdict.exit_code()
}

fn cmd_show(mutant_ref: &str, json_mode: bool) -> i32 {
    let last_run = match state::load_last_run() {
        Some(r) => r,
        None => {
            output::print_error("No previous run found. Run `mutjudge run` first.");
            return EXIT_USAGE;
        }
    };

    match last_run.find_mutant(mutant_ref) {
        Some(record) => {
            let hint = last_run.hint_for(&record.mutant_id);
            if json_mode {
                print_json(&serde_json::json!({ "record": record, "hint": hint }));
            } else {
                output::print_mutant_detail(record, hint);
            }
            0
        }
        None => {
            let valid: Vec<_> = last_run
                .verdict
                .per_mutant
                .iter()
                .map(|r| r.mutant_id.as_str())
                .collect();
            output::print_error(&format!(
                "Mutant {} not found. Valid ids: {}",
                mutant_ref,
                valid.join(", ")
            ));
            EXIT_USAGE
        }
    }
}

fn cmd_status(json_mode: bool) -> i32 {
    match state::load_last_run() {
        Some(run) => {
            if json_mode {
                print_json(&run);
            } else {
                output::print_status(&run);
            }
            0
        }
        None => {
            output::print_error("No previous run found. Run `mutjudge run` first.");
            EXIT_USAGE
        }
    }
}

fn cmd_problems() -> i32 {
    for problem in mutjudge::PROBLEMS {
        println!("{:<10} {}", problem.id(), problem.summary());
    }
    0
}
