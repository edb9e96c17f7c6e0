//! Translation of remote attribute records into stat-like values
//!
//! The protocol engine expects POSIX `lstat` results; the remote API hands out
//! string-typed records with ISO-8601 timestamps. Everything here is pure and
//! performs no network I/O.

use crate::remote::{FileType, RemoteAttributes};
use crate::{Error, Result};
use chrono::{DateTime, FixedOffset};

/// Regular file type bits
pub const S_IFREG: u32 = 0o100_000;
/// Directory type bits
pub const S_IFDIR: u32 = 0o040_000;
/// Mask selecting the file type bits of a mode
pub const S_IFMT: u32 = 0o170_000;

/// Fixed-shape stat value derived from a [`RemoteAttributes`] record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalAttributes {
    /// File type bits OR'd with permission bits
    pub mode: u32,
    /// Remote file number
    pub inode: u64,
    /// Always 0; the remote namespace has no device concept
    pub device: u64,
    /// Hard link count
    pub link_count: u64,
    /// Numeric owner id
    pub owner_id: u64,
    /// Numeric group id
    pub group_id: u64,
    /// Size in bytes
    pub size_bytes: u64,
    /// Access time, POSIX seconds (taken from the remote change time)
    pub access_time: i64,
    /// Modification time, POSIX seconds
    pub modify_time: i64,
    /// Change time, POSIX seconds (taken from the remote creation time)
    pub change_time: i64,
}

impl LocalAttributes {
    /// True if the file type bits denote a regular file
    pub const fn is_file(&self) -> bool {
        self.mode & S_IFMT == S_IFREG
    }

    /// True if the file type bits denote a directory
    pub const fn is_dir(&self) -> bool {
        self.mode & S_IFMT == S_IFDIR
    }

    /// Permission bits without the file type
    pub const fn permissions(&self) -> u32 {
        self.mode & !S_IFMT
    }
}

/// Translate a remote attribute record into a [`LocalAttributes`] value
///
/// # Errors
///
/// Returns [`Error::InvalidAttributes`] if the mode is not octal, a numeric
/// field does not parse, or a timestamp is not ISO-8601. An unrecognized file
/// type is not an error; it yields zero file type bits.
pub fn translate(record: &RemoteAttributes) -> Result<LocalAttributes> {
    Ok(LocalAttributes {
        mode: st_mode(record)?,
        inode: parse_u64("file_number", &record.file_number)?,
        device: 0,
        link_count: record.num_links,
        owner_id: parse_u64("owner", &record.owner)?,
        group_id: parse_u64("group", &record.group)?,
        size_bytes: parse_u64("size", &record.size)?,
        access_time: epoch_seconds_truncated(&record.change_time)?,
        modify_time: epoch_seconds_truncated(&record.modification_time)?,
        change_time: epoch_seconds_truncated(&record.creation_time)?,
    })
}

/// Combine the file type bits selected by the record's type with its octal mode
pub fn st_mode(record: &RemoteAttributes) -> Result<u32> {
    let permissions = u32::from_str_radix(&record.mode, 8)
        .map_err(|e| Error::InvalidAttributes(format!("mode {:?}: {}", record.mode, e)))?;

    let type_bits = match record.file_type {
        FileType::File => S_IFREG,
        FileType::Directory => S_IFDIR,
        FileType::Other => 0,
    };

    // Type bits come from the record type only.
    Ok(type_bits | (permissions & !S_IFMT))
}

/// Seconds since the Unix epoch for an ISO-8601 timestamp, fraction preserved
pub fn epoch_seconds(timestamp: &str) -> Result<f64> {
    let instant = parse_timestamp(timestamp)?;
    #[allow(clippy::cast_precision_loss)]
    let seconds = instant.timestamp() as f64 + f64::from(instant.timestamp_subsec_nanos()) / 1e9;
    Ok(seconds)
}

/// Seconds since the Unix epoch, truncated toward zero
///
/// Computed from the whole-second and nanosecond parts directly, so a fraction
/// just below the next second never rounds up.
pub fn epoch_seconds_truncated(timestamp: &str) -> Result<i64> {
    let instant = parse_timestamp(timestamp)?;
    let seconds = instant.timestamp();
    if seconds < 0 && instant.timestamp_subsec_nanos() > 0 {
        Ok(seconds + 1)
    } else {
        Ok(seconds)
    }
}

fn parse_timestamp(timestamp: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(timestamp)
        .map_err(|e| Error::InvalidAttributes(format!("timestamp {:?}: {}", timestamp, e)))
}

fn parse_u64(field: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|e| Error::InvalidAttributes(format!("{} {:?}: {}", field, value, e)))
}
