use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Walk counters, shared with the Ctrl-C handler.
pub struct Stats {
    dirs_compared: AtomicU64,
    entries_compared: AtomicU64,
    xattr_downgraded: AtomicU64,
}

impl Stats {
    pub fn new() -> Self {
        Stats {
            dirs_compared: AtomicU64::new(0),
            entries_compared: AtomicU64::new(0),
            xattr_downgraded: AtomicU64::new(0),
        }
    }

    pub fn inc_dirs(&self) {
        self.dirs_compared.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_entries(&self) {
        self.entries_compared.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_xattr_downgraded(&self) {
        self.xattr_downgraded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dirs_compared(&self) -> u64 {
        self.dirs_compared.load(Ordering::Relaxed)
    }

    pub fn entries_compared(&self) -> u64 {
        self.entries_compared.load(Ordering::Relaxed)
    }

    pub fn xattr_downgraded(&self) -> u64 {
        self.xattr_downgraded.load(Ordering::Relaxed)
    }

    fn format_summary(&self) -> String {
        format!(
            "SUMMARY:\n\
             \x20   Directories compared: {}\n\
             \x20   Entries compared: {}\n\
             \x20   Xattr lookups downgraded: {}",
            self.dirs_compared(),
            self.entries_compared(),
            self.xattr_downgraded(),
        )
    }

    pub fn print_summary(&self) {
        println!("{}", self.format_summary());
    }

    /// Print summary to stderr (for ctrl-c handler when stdout may be broken).
    pub fn eprint_summary(&self) {
        eprintln!("{}", self.format_summary());
    }
}

impl Default for Stats {
    fn default() -> Self {
        Stats::new()
    }
}

/// Which quick content check tripped for a file or symlink pair.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiffReasons {
    pub size: bool,
    pub sample: bool,
    pub hash: bool,
    pub target: bool,
}

impl DiffReasons {
    pub fn any(&self) -> bool {
        self.size || self.sample || self.hash || self.target
    }

    /// Symlink pair pointing at different targets.
    pub fn target() -> Self {
        DiffReasons {
            target: true,
            ..DiffReasons::default()
        }
    }
}

impl fmt::Display for DiffReasons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.size {
            parts.push("SIZE");
        }
        if self.sample {
            parts.push("SAMPLE");
        }
        if self.hash {
            parts.push("HASH");
        }
        if self.target {
            parts.push("TARGET");
        }
        write!(f, "{}", parts.join(", "))
    }
}
