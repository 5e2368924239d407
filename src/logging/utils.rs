//! Run log location, ANSI stripping, and timestamps.
use std::path::PathBuf;

/// Remove CSI escape sequences (colours, cursor movement) from `s`.
///
/// A lone `ESC` swallows the following character.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find('\x1b') {
        let (text, escape) = rest.split_at(start);
        out.push_str(text);
        let mut tail = escape.chars();
        tail.next();
        if tail.next() == Some('[') {
            // Parameters and intermediates run up to the final byte in `@..=~`.
            tail.by_ref().find(|c| ('@'..='~').contains(c));
        }
        rest = tail.as_str();
    }
    out.push_str(rest);
    out
}

/// `<cache>/rwr/<command>.log`, where `<cache>` is `$XDG_CACHE_HOME` or
/// `~/.cache`. Creates the directory; `None` if that fails.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let cache = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME")
                .or_else(|| std::env::var_os("USERPROFILE"))
                .map(|home| PathBuf::from(home).join(".cache"))
        })
        .unwrap_or_else(|| PathBuf::from(".cache"));
    let dir = cache.join("rwr");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

/// Current UTC time rendered with a `strftime` pattern.
pub(super) fn timestamp(pattern: &str) -> String {
    chrono::Utc::now().format(pattern).to_string()
}
