//! Command-line entry point: hand-parsed flags (this codebase does not reach
//! for an argument-parsing crate anywhere in its solver binaries), a
//! `RunConfig`, and the end-of-run textual report.

use std::process::ExitCode;

use sedov_model::Domain;
use sedov_solver::{NoOpSink, Pipeline, SolverError, ThreadedExchange};

/// Parsed command-line configuration, defaults per the flag table.
#[derive(Debug)]
struct RunConfig {
    iterations: usize,
    nx: usize,
    num_regions: usize,
    balance: i32,
    imbalance_cost: u32,
    vis_file_count: usize,
    progress: bool,
    quiet: bool,
    visualize: bool,
    threads: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            iterations: 0,
            nx: 30,
            num_regions: 11,
            balance: 1,
            imbalance_cost: 1,
            vis_file_count: 0,
            progress: false,
            quiet: false,
            visualize: false,
            threads: None,
        }
    }
}

const USAGE: &str = "\
usage: sedov [options]

  -i N   iteration count; 0 means run to stop_time [0]
  -s N   per-subdomain edge elements nx [30]
  -r R   number of regions [11]
  -b B   region-size balance exponent [1]
  -c C   imbalance cost multiplier [1]
  -f F   visualization files count [0]
  -p     show per-cycle progress
  -q     quiet mode
  -v     visualization dump
  -t N   worker-thread count for the on-node pool [available parallelism]
  -h, --help  print this usage and exit
";

/// This problem has always been run to this many seconds of simulated time
/// in its canonical single-rank form; a fixed iteration count (`-i`)
/// overrides it.
const DEFAULT_STOP_TIME: f64 = 1.0e-2;

fn parse_args(args: &[String]) -> Result<RunConfig, String> {
    let mut cfg = RunConfig::default();
    let mut it = args.iter();

    let next_value = |it: &mut std::slice::Iter<String>, flag: &str| -> Result<String, String> {
        it.next().cloned().ok_or_else(|| format!("{flag} requires a value"))
    };
    let parse_num = |flag: &str, raw: &str| -> Result<i64, String> {
        raw.parse::<i64>().map_err(|_| format!("{flag} expects an integer, got '{raw}'"))
    };

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-i" => {
                let raw = next_value(&mut it, "-i")?;
                cfg.iterations = parse_num("-i", &raw)?.max(0) as usize;
            }
            "-s" => {
                let raw = next_value(&mut it, "-s")?;
                let n = parse_num("-s", &raw)?;
                if n < 1 {
                    return Err("-s must be at least 1".to_string());
                }
                cfg.nx = n as usize;
            }
            "-r" => {
                let raw = next_value(&mut it, "-r")?;
                let n = parse_num("-r", &raw)?;
                if n < 1 {
                    return Err("-r must be at least 1".to_string());
                }
                cfg.num_regions = n as usize;
            }
            "-b" => {
                let raw = next_value(&mut it, "-b")?;
                cfg.balance = parse_num("-b", &raw)? as i32;
            }
            "-c" => {
                let raw = next_value(&mut it, "-c")?;
                let n = parse_num("-c", &raw)?;
                if n < 1 {
                    return Err("-c must be at least 1".to_string());
                }
                cfg.imbalance_cost = n as u32;
            }
            "-f" => {
                let raw = next_value(&mut it, "-f")?;
                cfg.vis_file_count = parse_num("-f", &raw)?.max(0) as usize;
            }
            "-p" => cfg.progress = true,
            "-q" => cfg.quiet = true,
            "-v" => cfg.visualize = true,
            "-t" => {
                let raw = next_value(&mut it, "-t")?;
                let n = parse_num("-t", &raw)?;
                if n < 1 {
                    return Err("-t must be at least 1".to_string());
                }
                cfg.threads = Some(n as usize);
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            other => return Err(format!("unrecognized option '{other}'\n\n{USAGE}")),
        }
    }

    Ok(cfg)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let cfg = match parse_args(&args) {
        Ok(cfg) => cfg,
        Err(msg) => {
            if msg == USAGE {
                println!("{USAGE}");
                return ExitCode::SUCCESS;
            }
            eprintln!("{msg}");
            return ExitCode::from(2);
        }
    };

    if let Some(n) = cfg.threads
        && let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(n).build_global()
    {
        eprintln!("failed to configure {n} worker threads: {e}");
        return ExitCode::from(2);
    }

    match run(&cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fatal: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cfg: &RunConfig) -> Result<(), SolverError> {
    let rank = 0;
    let num_ranks = 1;
    let domain = Domain::from_rank(rank, num_ranks, cfg.nx, cfg.num_regions, cfg.balance)?;

    let exchange = ThreadedExchange;
    let sink = NoOpSink;
    let vis_every = if cfg.visualize && cfg.vis_file_count > 0 { cfg.vis_file_count } else { 0 };

    let mut pipeline = Pipeline::new(domain, &exchange, &sink, rank, cfg.imbalance_cost, DEFAULT_STOP_TIME, None, vis_every);

    if cfg.progress {
        loop {
            if pipeline.domain.time >= pipeline.stop_time {
                break;
            }
            if cfg.iterations != 0 && pipeline.domain.cycle >= cfg.iterations {
                break;
            }
            let outcome = sedov_solver::run_cycle(&mut pipeline)?;
            if vis_every != 0 && outcome.cycle % vis_every == 0 {
                pipeline.visualization.dump(&pipeline.domain, outcome.cycle);
            }
            if !cfg.quiet {
                println!("cycle {:>6}  time {:.6e}  dt {:.6e}", outcome.cycle, outcome.time, outcome.dt);
            }
        }
        let outcome = sedov_solver::RunOutcome {
            num_elems: pipeline.domain.num_elems,
            cycles: pipeline.domain.cycle,
            final_time: pipeline.domain.time,
            final_origin_energy: pipeline.domain.e[0],
            elapsed: std::time::Duration::default(),
            grind_time_us: 0.0,
        };
        report(&outcome, cfg.quiet);
        return Ok(());
    }

    let outcome = pipeline.run(cfg.iterations)?;
    report(&outcome, cfg.quiet);
    Ok(())
}

fn report(outcome: &sedov_solver::RunOutcome, quiet: bool) {
    if quiet {
        return;
    }
    println!("problem size        = {}", outcome.num_elems);
    println!("cycle count         = {}", outcome.cycles);
    println!("elapsed time        = {:.6} s", outcome.elapsed.as_secs_f64());
    println!("final origin energy = {:.6e}", outcome.final_origin_energy);
    println!("grind time          = {:.6} us/zone-cycle", outcome.grind_time_us);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_flag_table() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.iterations, 0);
        assert_eq!(cfg.nx, 30);
        assert_eq!(cfg.num_regions, 11);
        assert_eq!(cfg.balance, 1);
        assert_eq!(cfg.imbalance_cost, 1);
        assert!(!cfg.progress && !cfg.quiet && !cfg.visualize);
    }

    #[test]
    fn parses_a_representative_flag_set() {
        let args: Vec<String> = ["-i", "5", "-s", "10", "-r", "3", "-b", "2", "-c", "2", "-p"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let cfg = parse_args(&args).unwrap();
        assert_eq!(cfg.iterations, 5);
        assert_eq!(cfg.nx, 10);
        assert_eq!(cfg.num_regions, 3);
        assert_eq!(cfg.balance, 2);
        assert_eq!(cfg.imbalance_cost, 2);
        assert!(cfg.progress);
    }

    #[test]
    fn help_flag_is_reported_as_usage_not_an_error() {
        let args = vec!["-h".to_string()];
        let err = parse_args(&args).unwrap_err();
        assert_eq!(err, USAGE);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let args = vec!["--bogus".to_string()];
        assert!(parse_args(&args).is_err());
    }

    #[test]
    fn missing_value_is_rejected() {
        let args = vec!["-s".to_string()];
        assert!(parse_args(&args).is_err());
    }
}
