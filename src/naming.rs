//! Deterministic download filenames: `{base}_to_pdf_{YYYYMMDD-HHMM}.pdf`
//! for a single input, `images_to_pdf_{YYYYMMDD-HHMM}.pdf` for a batch.

use chrono::{DateTime, Local};

/// Derive the output filename from the input name set at minute
/// resolution. The timestamp is injected so callers stay deterministic.
pub fn output_filename(filenames: &[&str], now: DateTime<Local>) -> String {
    let timestamp = now.format("%Y%m%d-%H%M");
    match filenames {
        [single] => format!("{}_to_pdf_{}.pdf", sanitize_base(single), timestamp),
        _ => format!("images_to_pdf_{timestamp}.pdf"),
    }
}

/// Convenience wrapper over the local wall clock.
pub fn output_filename_now(filenames: &[&str]) -> String {
    output_filename(filenames, Local::now())
}

/// Strip any path and all extensions, map everything outside
/// `[A-Za-z0-9_-]` to `_`, collapse runs, drop leading separators.
/// A trailing separator produced by a trailing stripped character is
/// kept. Empty results become `image`.
fn sanitize_base(name: &str) -> String {
    let mut base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    while let Some(dot) = base.rfind('.') {
        base = &base[..dot];
    }

    let mut out = String::with_capacity(base.len());
    for ch in base.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
            out.push(ch);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let out = out.trim_start_matches('_');
    if out.is_empty() {
        "image".to_string()
    } else {
        out.to_string()
    }
}
