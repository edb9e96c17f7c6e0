//! Protocol path handling
//!
//! The remote namespace is a single rooted tree addressed with `/`-separated
//! absolute paths. Normalization is purely lexical: there are no symbolic links
//! to resolve and `..` never climbs above the root.

/// Namespace root
pub const ROOT: &str = "/";

/// Normalize `path` against `cwd` into an absolute path without trailing `/`
///
/// ```
/// use qftpd::path::normalize;
///
/// assert_eq!(normalize("/home", "docs/../a.txt"), "/home/a.txt");
/// assert_eq!(normalize("/home", "/../../etc"), "/etc");
/// ```
pub fn normalize(cwd: &str, path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();

    let base = if path.starts_with('/') { "" } else { cwd };
    for segment in base.split('/').chain(path.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            name => parts.push(name),
        }
    }

    if parts.is_empty() {
        ROOT.to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Split an absolute path into its parent directory and final name
///
/// Trailing separators are ignored. The root has an empty name.
pub fn split_parent(path: &str) -> (String, String) {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => (ROOT.to_string(), trimmed[1..].to_string()),
        Some(idx) => (trimmed[..idx].to_string(), trimmed[idx + 1..].to_string()),
        None if trimmed.is_empty() => (ROOT.to_string(), String::new()),
        None => (ROOT.to_string(), trimmed.to_string()),
    }
}

/// Join a directory and an entry name
pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Form of `path` addressing a directory: exactly one trailing separator
pub fn as_directory(path: &str) -> String {
    format!("{}/", path.trim_end_matches('/'))
}
