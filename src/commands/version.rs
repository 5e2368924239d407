//! Command: print version information.

/// Version string: `RWR_VERSION` from the build, else the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("RWR_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the rwr version to stdout.
pub fn run() {
    println!("rwr {}", version());
}
