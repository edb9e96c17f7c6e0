//! `ls -l` style listing lines

use crate::attrs::{LocalAttributes, S_IFDIR, S_IFMT, S_IFREG};
use chrono::DateTime;

/// Entries modified within this many seconds show a time instead of a year
const RECENT_SECS: i64 = 180 * 24 * 60 * 60;

/// Format one listing line for `name`
///
/// `now` is the current time in POSIX seconds.
pub fn format_line(
    name: &str,
    attrs: &LocalAttributes,
    owner: &str,
    group: &str,
    now: i64,
) -> String {
    format!(
        "{} {:>3} {:<8} {:<8} {:>8} {} {}",
        mode_string(attrs.mode),
        attrs.link_count,
        owner,
        group,
        attrs.size_bytes,
        format_time(attrs.modify_time, now),
        name
    )
}

/// Ten-character mode string such as `drwxr-xr-x`
///
/// Unknown file types are shown as `?`.
pub fn mode_string(mode: u32) -> String {
    let kind = match mode & S_IFMT {
        S_IFDIR => 'd',
        S_IFREG => '-',
        _ => '?',
    };

    let mut out = String::with_capacity(10);
    out.push(kind);
    for shift in [6u32, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

fn format_time(mtime: i64, now: i64) -> String {
    let Some(time) = DateTime::from_timestamp(mtime, 0) else {
        return mtime.to_string();
    };
    if (now - mtime).abs() > RECENT_SECS {
        time.format("%b %d  %Y").to_string()
    } else {
        time.format("%b %d %H:%M").to_string()
    }
}
