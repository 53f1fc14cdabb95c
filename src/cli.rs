use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use treesame::Verbosity;

#[derive(Parser, Debug)]
#[command(
    name = "treesame",
    about = "Verify two directory trees match in structure and filesystem metadata",
    arg_required_else_help = true,
    after_help = "\
WARNING: Output behavior is currently NOT STABLE between releases.

Verbosity levels:
  (default)  Report the first mismatch only.
  -v         Add DEBUG lines showing each directory comparison.
  -vv        Add DEBUG lines for file comparisons. With --all, show BLAKE3
             hashes.

Output prefixes (grep-friendly):
  LEFT-ONLY:                Entry present only in the left tree
  RIGHT-ONLY:               Entry present only in the right tree
  DIFFERENT-FILE [reason]:  Content differs (first mismatch of SIZE, SAMPLE,
                            HASH; TARGET for symlink pairs)
  UNCOMPARABLE:             Same name but incompatible entry types, or content
                            could not be read
  METADATA [fields]:        A metadata field differs after precision
                            reduction; both records follow on indented lines
  TIMEOUT:                  Mount not observed within the --wait-mount deadline
  ERROR:                    Fatal I/O error
  DEBUG:                    Verbose logging (-v dirs, -vv files and hashes)
  SUMMARY:                  Final counters

Exit codes: 0 trees identical, 1 mismatch, 2 usage, probe, I/O, or mount
timeout failure."
)]
pub struct Cli {
    /// Left (original) directory
    pub left: PathBuf,

    /// Right (restored) directory
    pub right: PathBuf,

    /// Verbose output (-v for dirs, -vv for files and hashes, see below)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Number of random samples to compare per file
    #[arg(short, long, default_value_t = 0)]
    pub samples: u32,

    /// Full BLAKE3 content comparison
    #[arg(short, long)]
    pub all: bool,

    /// Right tree is served through a virtualizing filesystem layer: accept
    /// its synthesized directory link counts and coarser mtime precision
    #[arg(long)]
    pub virtualized: bool,

    /// Wait up to SECS for a filesystem to be mounted on the right directory
    /// before comparing
    #[arg(long, value_name = "SECS")]
    pub wait_mount: Option<u64>,
}

pub struct Config {
    pub left: PathBuf,
    pub right: PathBuf,
    pub verbosity: Verbosity,
    pub samples: u32,
    pub all: bool,
    pub virtualized: bool,
    pub wait_mount: Option<Duration>,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, String> {
        let left = cli
            .left
            .canonicalize()
            .map_err(|e| format!("Cannot resolve left directory {:?}: {}", cli.left, e))?;
        let right = cli
            .right
            .canonicalize()
            .map_err(|e| format!("Cannot resolve right directory {:?}: {}", cli.right, e))?;

        let verbosity = match cli.verbose {
            0 => Verbosity::Quiet,
            1 => Verbosity::Dirs,
            2 => Verbosity::Entries,
            n => {
                return Err(format!(
                    "-v can be specified at most twice, but was specified {} times",
                    n
                ))
            }
        };

        Ok(Config {
            left,
            right,
            verbosity,
            samples: cli.samples,
            all: cli.all,
            virtualized: cli.virtualized,
            wait_mount: cli.wait_mount.map(Duration::from_secs),
        })
    }
}
