use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use clap::Parser;
use log::{error, info};
use simple_logger::SimpleLogger;

use mh_rust::mh_config::{seed_to_hex, SimConfig};
use mh_rust::mh_display::{breakdown, headline, render_chart, summary_line};
use mh_rust::{Event, EventSink, RunningStats, Session, SleepPacer, Speed, Strategy, TrialCount};

const CHART_WIDTH: usize = 40;

#[derive(Parser)]
#[command(author, version, about = "Interactive Monty Hall simulator", long_about = None)]
struct Args {
    /// YAML file with session defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial strategy (stay or switch)
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Trials per batch run (1-100)
    #[arg(long)]
    runs: Option<TrialCount>,

    /// Animation speed (fast, normal, slow)
    #[arg(long)]
    speed: Option<Speed>,

    /// Hex encoded 32 byte seed
    #[arg(long)]
    seed: Option<String>,
}

/// Mirrors the session's counters from events and redraws after each trial
struct TerminalView {
    stats: RunningStats,
    strategy: Strategy,
    live: bool,
    drawn_lines: usize,
}

impl TerminalView {
    fn new(session: &Session) -> Self {
        Self {
            stats: session.stats().clone(),
            strategy: session.strategy(),
            live: io::stdout().is_terminal(),
            drawn_lines: 0,
        }
    }

    fn draw(&mut self) {
        let frame = format!(
            "{}\n{}{}\n",
            headline(&self.stats, self.strategy),
            render_chart(&breakdown(&self.stats, self.strategy), CHART_WIDTH),
            summary_line(&self.stats.snapshot(self.strategy))
        );

        let mut out = io::stdout().lock();
        if self.live && self.drawn_lines > 0 {
            // overwrite the previous frame in place
            let _ = write!(out, "\x1b[{}A\x1b[J", self.drawn_lines);
        }
        let _ = write!(out, "{}", frame);
        let _ = out.flush();
        self.drawn_lines = frame.lines().count();
    }

    /// Next frame starts below whatever was printed since
    fn detach(&mut self) {
        self.drawn_lines = 0;
    }
}

impl EventSink for TerminalView {
    fn log(&mut self, event: Event) {
        match event {
            Event::TrialRecorded { outcome, .. } => {
                self.stats.record(outcome);
                self.draw();
            }
            Event::CapacityExceeded { strategy, limit } => {
                println!(
                    "Strategy '{}' has reached {} runs. Reset to run it again.",
                    strategy, limit
                );
                self.detach();
            }
            Event::BatchFinished { .. } => {}
            Event::Reset => {
                self.stats.reset();
                self.detach();
                self.draw();
            }
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  stay | switch   select strategy");
    println!("  one             run a single trial");
    println!("  run             run the configured number of trials");
    println!("  runs N          set trials per run (1-100)");
    println!("  speed S         fast | normal | slow");
    println!("  stats           show both strategies");
    println!("  reset           clear all results");
    println!("  quit");
}

fn main() {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimConfig::load(path).unwrap_or_else(|e| {
            eprintln!("{}", e);
            std::process::exit(1);
        }),
        None => SimConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    if let Some(runs) = args.runs {
        config.runs = runs;
    }
    if let Some(speed) = args.speed {
        config.speed = speed;
    }
    if args.seed.is_some() {
        config.seed = args.seed.clone();
    }

    let level = config.level_filter().unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });
    SimpleLogger::new().with_level(level).init().unwrap();

    let mut session = config.build_session().unwrap_or_else(|e| {
        error!("{}", e);
        std::process::exit(1);
    });

    info!("starting");

    println!("Monty Hall - pick a strategy and run trials (type 'help')");
    let mut view = TerminalView::new(&session);
    view.draw();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("failed to read input: {}", e);
                break;
            }
        };
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let arg = words.next();
        view.detach();

        match command {
            "stay" | "switch" => {
                if let Ok(strategy) = command.parse() {
                    session.select_strategy(strategy);
                    view.strategy = strategy;
                    view.draw();
                }
            }
            "one" => {
                // errors were already reported through the view
                let _ = session.run_once(&mut view);
            }
            "run" => {
                if let Ok(report) = session.run_batch(&mut SleepPacer, &mut view) {
                    if report.capped {
                        println!(
                            "Only {} of {} runs fit under the limit.",
                            report.executed, report.requested
                        );
                    }
                }
            }
            "runs" => match arg.map(str::parse::<TrialCount>) {
                Some(Ok(runs)) => match session.set_batch_size(runs) {
                    Ok(()) => println!("Runs per batch: {}", runs),
                    Err(e) => println!("{}", e),
                },
                _ => println!("usage: runs N"),
            },
            "speed" => match arg.map(str::parse::<Speed>) {
                Some(Ok(speed)) => {
                    session.set_speed(speed);
                    println!("Speed: {}", speed);
                }
                Some(Err(e)) => println!("{}", e),
                None => println!("usage: speed fast|normal|slow"),
            },
            "stats" => {
                for strategy in Strategy::ALL {
                    println!("{:>6}: {}", strategy, summary_line(&session.stats().snapshot(strategy)));
                }
            }
            "reset" => session.reset(&mut view),
            "help" => print_help(),
            "quit" | "exit" => break,
            other => println!("unknown command '{}' (type 'help')", other),
        }
    }

    info!("let seed = {};", seed_to_hex(&session.seed()));
    info!(
        "done. stay: {} runs, switch: {} runs",
        session.stats().trials(Strategy::Stay),
        session.stats().trials(Strategy::Switch)
    );
}
