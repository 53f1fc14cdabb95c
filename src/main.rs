mod cli;

use std::process;
use std::sync::Arc;

use clap::Parser;

use cli::{Cli, Config};
use treesame::compare::{self, VerifyOptions};
use treesame::error::VerifyError;
use treesame::mount;
use treesame::precision::Capabilities;
use treesame::stats::Stats;

fn main() {
    // Replace the default panic hook to handle broken pipes cleanly.
    // Rust ignores SIGPIPE, so writing to a broken pipe (e.g. piping to
    // `head` or `grep`) causes println! to panic. Catch that and exit
    // with a visible message instead of a traceback.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe") {
            eprintln!("Broken pipe: output was truncated");
            process::exit(141); // 128 + SIGPIPE(13)
        }
        default_hook(info);
    }));

    // Print the command-line we were run with
    let cmd: Vec<String> = std::env::args()
        .map(|a| {
            if a.contains(|c: char| c.is_whitespace() || "\"'\\$`!#&|;(){}[]<>?*~".contains(c)) {
                format!("'{}'", a.replace('\'', "'\\''"))
            } else {
                a
            }
        })
        .collect();
    println!("CMD: {}", cmd.join(" "));

    let cli = Cli::parse();

    let config = match Config::from_cli(cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    if let Some(timeout) = config.wait_mount {
        if let Err(e) = mount::wait_for_mount(&config.right, timeout) {
            println!("TIMEOUT: {}", e);
            process::exit(2);
        }
    }

    if !config.left.is_dir() {
        eprintln!("Error: {:?} is not a directory", config.left);
        process::exit(2);
    }

    if !config.right.is_dir() {
        eprintln!("Error: {:?} is not a directory", config.right);
        process::exit(2);
    }

    if config.left == config.right {
        eprintln!("Warning: left and right are the same directory");
    }

    let caps = match Capabilities::probe() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: cannot probe timestamp capabilities: {}", e);
            process::exit(2);
        }
    };

    let stats = Arc::new(Stats::new());
    let stats_ctrlc = Arc::clone(&stats);

    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted!");
        stats_ctrlc.eprint_summary();
        eprintln!("WARNING: EXITING BEFORE VERIFICATION WAS COMPLETE!");
        process::exit(130);
    })
    .expect("Error setting Ctrl-C handler");

    let opts = VerifyOptions {
        virtualized: config.virtualized,
        caps,
        samples: config.samples,
        hash: config.all,
        verbosity: config.verbosity,
    };

    let code = match compare::verify(&config.left, &config.right, &opts, &stats) {
        Ok(()) => 0,
        Err(err) => {
            report(&err);
            if err.is_mismatch() {
                1
            } else {
                2
            }
        }
    };

    stats.print_summary();

    if code != 0 {
        process::exit(code);
    }
}

fn report(err: &VerifyError) {
    match err {
        VerifyError::LeftOnly { path } => println!("LEFT-ONLY: {}", path.display()),
        VerifyError::RightOnly { path } => println!("RIGHT-ONLY: {}", path.display()),
        VerifyError::Different { path, reasons } => {
            println!("DIFFERENT-FILE [{}]: {}", reasons, path.display())
        }
        VerifyError::Funny { path, detail } => {
            println!("UNCOMPARABLE: {} ({})", path.display(), detail)
        }
        VerifyError::Metadata {
            path,
            fields,
            left,
            right,
        } => {
            println!("METADATA [{}]: {}", fields, path.display());
            println!("    left:  {}", left);
            println!("    right: {}", right);
        }
        VerifyError::Io { path, source } => println!("ERROR: {}: {}", path.display(), source),
    }
}
