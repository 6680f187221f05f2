// Animation Runner - step through population dynamics frame by frame
//
// Usage:
//   cargo run --bin animation_runner line <N> <mutation_rate>
//   cargo run --bin animation_runner burst <N> <mutation_rate>
//   cargo run --bin animation_runner moran <graph_name> <N> <fitness>
//
// Options: --frames N (default 200), --csv FILE, --seed HEX, --delay MS

use std::env;
use std::thread;
use std::time::Duration;

use log::{info, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use simple_logger::SimpleLogger;

use eg_rust::eg_animation::{
    animate_moran, animate_mutation_drift, AnimationSummary, ConsoleFrameSink, CsvFrameSink,
};
use eg_rust::eg_catalog::{burst_graph, line_graph, GraphKind};
use eg_rust::eg_interface::{Frame, FrameSink, DEFAULT_MAX_FRAMES};
use eg_rust::eg_moran::MoranSimulator;
use eg_rust::eg_scenario::{format_seed, RunConfig};

/// Console output, optional CSV copy, optional pause between frames
struct AnimationSink {
    console: ConsoleFrameSink,
    csv: Option<CsvFrameSink>,
    delay: Duration,
}

impl FrameSink for AnimationSink {
    fn frame(&mut self, frame: &Frame) {
        self.console.frame(frame);
        if let Some(csv) = self.csv.as_mut() {
            csv.frame(frame);
        }
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}

fn usage(program: &str) -> ! {
    eprintln!("Usage:");
    eprintln!("  {} line <N> <mutation_rate>", program);
    eprintln!("  {} burst <N> <mutation_rate>", program);
    eprintln!("  {} moran <graph_name> <N> <fitness>", program);
    eprintln!("\nOptions: --frames N, --csv FILE, --seed HEX, --delay MS");
    std::process::exit(1);
}

fn parse_or_exit<T: std::str::FromStr>(program: &str, what: &str, value: Option<&String>) -> T {
    match value.map(|v| v.parse::<T>()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("Error: invalid or missing <{}>\n", what);
            usage(program)
        }
    }
}

fn main() {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
        .unwrap();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut max_frames = DEFAULT_MAX_FRAMES;
    let mut csv_path: Option<String> = None;
    let mut config = RunConfig::default();
    let mut delay_ms: u64 = 0;
    let mut positional: Vec<String> = Vec::new();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--frames" => max_frames = parse_or_exit(&program, "frames", iter.next()),
            "--csv" => csv_path = Some(parse_or_exit(&program, "file", iter.next())),
            "--seed" => config.seed = Some(parse_or_exit(&program, "seed", iter.next())),
            "--delay" => delay_ms = parse_or_exit(&program, "delay", iter.next()),
            _ => positional.push(arg.clone()),
        }
    }

    if positional.is_empty() {
        usage(&program);
    }

    let seed = config.resolve_seed().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    info!("seed = {}", format_seed(&seed));
    let mut rng = StdRng::from_seed(seed);

    let csv = csv_path.as_ref().map(|path| {
        CsvFrameSink::new(path).unwrap_or_else(|e| {
            eprintln!("Failed to create {}: {}", path, e);
            std::process::exit(1);
        })
    });
    let mut sink = AnimationSink {
        console: ConsoleFrameSink::new(true),
        csv,
        delay: Duration::from_millis(delay_ms),
    };

    let summary: AnimationSummary = match positional[0].as_str() {
        "line" | "burst" => {
            let n: usize = parse_or_exit(&program, "N", positional.get(1));
            let rate: f64 = parse_or_exit(&program, "mutation_rate", positional.get(2));
            let graph = if positional[0] == "line" {
                line_graph(n)
            } else {
                burst_graph(n)
            };
            animate_mutation_drift(&graph, rate, max_frames, &mut rng, &mut sink).unwrap_or_else(
                |e| {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                },
            )
        }
        "moran" => {
            let kind: GraphKind = parse_or_exit(&program, "graph_name", positional.get(1));
            let n: usize = parse_or_exit(&program, "N", positional.get(2));
            let fitness: f64 = parse_or_exit(&program, "fitness", positional.get(3));
            let graph = kind.build(n);
            let sim = MoranSimulator::new(&graph, fitness).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });
            animate_moran(&sim, max_frames, &mut rng, &mut sink)
        }
        other => {
            eprintln!("Error: unknown dynamics '{}'\n", other);
            usage(&program)
        }
    };

    if let Some(csv) = sink.csv.as_mut() {
        if let Err(e) = csv.flush() {
            eprintln!("Failed to write CSV: {}", e);
        }
    }

    println!();
    match summary.outcome {
        Some(outcome) => println!(
            "Stopped after {} frames: {:?} ({} mutants)",
            summary.frames, outcome, summary.mutants
        ),
        None => println!(
            "Frame limit reached after {} frames ({} mutants)",
            summary.frames, summary.mutants
        ),
    }
}
