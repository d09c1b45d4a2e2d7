use crate::error::{FileError, Result};

/// Windows long path limit
pub const WINDOWS_MAX_PATH: usize = 260;

/// Windows extended path prefix
pub const EXTENDED_PATH_PREFIX: &str = r"\\?\";

/// Extended prefix for UNC shares (`\\server\share\...`)
pub const EXTENDED_UNC_PREFIX: &str = r"\\?\UNC\";

const SEPARATOR: char = '\\';

/// Rewrite `path` into the extended-length canonical form, resolving
/// relative paths against the process working directory.
///
/// Idempotent: an already-canonical path comes back unchanged.
pub fn canonicalize(path: &str) -> Result<String> {
    if path.is_empty() {
        return Err(FileError::InvalidPath("empty path".to_string()));
    }
    if path.starts_with(EXTENDED_PATH_PREFIX) {
        return Ok(path.to_string());
    }
    // Relative paths need the working directory; the other shapes do not.
    if path.starts_with(SEPARATOR) || path.contains(':') {
        return Ok(canonicalize_from(path, ""));
    }
    let cwd = std::env::current_dir()
        .map_err(|e| FileError::InvalidPath(format!("cannot resolve working directory: {}", e)))?;
    let cwd = cwd.to_string_lossy();
    Ok(canonicalize_from(path, &cwd))
}

/// Pure core of [`canonicalize`]: `cwd` is only consulted for relative
/// input. No filesystem access, no side effects.
pub fn canonicalize_from(path: &str, cwd: &str) -> String {
    if path.starts_with(EXTENDED_PATH_PREFIX) {
        return path.to_string();
    }

    let rewritten = if path.starts_with(SEPARATOR) {
        // UNC share: strip the leading separators, keep server\share\...
        format!("{}{}", EXTENDED_UNC_PREFIX, path.trim_start_matches(SEPARATOR))
    } else if path.contains(':') {
        format!("{}{}", EXTENDED_PATH_PREFIX, path)
    } else {
        let mut joined = combine(cwd, path);
        // Collapse self-reference segments left over from inputs like `.\x`
        while joined.contains(r"\.\") {
            joined = joined.replace(r"\.\", r"\");
        }
        format!("{}{}", EXTENDED_PATH_PREFIX, joined)
    };

    // Win32 silently drops trailing dots on conventional paths; strip them
    // here so both code paths agree on the target name.
    rewritten.trim_end_matches('.').to_string()
}

/// Join two path fragments with exactly one separator between them.
pub fn combine(left: &str, right: &str) -> String {
    format!(
        "{}\\{}",
        left.trim_end_matches(SEPARATOR),
        right.trim_start_matches(SEPARATOR)
    )
}

/// Substring before the last separator; empty when there is none.
pub fn parent(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Leaf name: substring after the last separator, or the whole string.
pub fn file_name(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Leaf name with its extension removed. A dot at position 0 marks a
/// hidden file, not an extension, so `.hidden` stays whole.
pub fn file_name_without_extension(path: &str) -> &str {
    let name = file_name(path);
    match name.find('.') {
        Some(0) | None => name,
        Some(_) => match name.rfind('.') {
            Some(last) => &name[..last],
            None => name,
        },
    }
}

/// Extension of the leaf name, including the dot; empty when there is none.
pub fn extension(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(idx) => &name[idx..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_drive_rooted() {
        assert_eq!(
            canonicalize_from(r"C:\data\report.txt", r"C:\ignored"),
            r"\\?\C:\data\report.txt"
        );
    }

    #[test]
    fn test_canonicalize_unc_share() {
        assert_eq!(
            canonicalize_from(r"\\server\share\file.bin", ""),
            r"\\?\UNC\server\share\file.bin"
        );
    }

    #[test]
    fn test_canonicalize_relative_resolves_against_cwd() {
        assert_eq!(
            canonicalize_from(r"sub\file.txt", r"C:\work"),
            r"\\?\C:\work\sub\file.txt"
        );
    }

    #[test]
    fn test_canonicalize_already_extended_unchanged() {
        let p = r"\\?\C:\data\report.txt";
        assert_eq!(canonicalize_from(p, r"C:\other"), p);
    }

    #[test]
    fn test_canonicalize_idempotent_for_all_shapes() {
        let cwd = r"C:\work";
        for input in [
            r"C:\data\report.txt",
            r"\\server\share\file.bin",
            r"sub\file.txt",
            r"\\?\C:\already\done",
        ] {
            let once = canonicalize_from(input, cwd);
            let twice = canonicalize_from(&once, cwd);
            assert_eq!(once, twice, "Not idempotent for: {}", input);
        }
    }

    #[test]
    fn test_equivalent_shapes_share_canonical_form() {
        let rooted = canonicalize_from(r"C:\work\sub\file.txt", "");
        let relative = canonicalize_from(r"sub\file.txt", r"C:\work");
        assert_eq!(rooted, relative);
        assert_eq!(rooted, r"\\?\C:\work\sub\file.txt");
    }

    #[test]
    fn test_canonicalize_strips_trailing_dots() {
        assert_eq!(canonicalize_from(r"C:\data\name...", ""), r"\\?\C:\data\name");
    }

    #[test]
    fn test_canonicalize_collapses_self_reference_segments() {
        assert_eq!(
            canonicalize_from(r".\a\.\b.txt", r"C:\work"),
            r"\\?\C:\work\a\b.txt"
        );
    }

    #[test]
    fn test_canonicalize_all_dots_stays_well_formed() {
        let result = canonicalize_from("...", r"C:\work");
        assert!(result.starts_with(r"\\?\C:\work"));
        assert!(!result.trim_start_matches(r"\\?\").is_empty());
    }

    #[test]
    fn test_canonicalize_rejects_empty_path() {
        assert!(matches!(canonicalize(""), Err(FileError::InvalidPath(_))));
    }

    #[test]
    fn test_combine_never_duplicates_separators() {
        assert_eq!(combine(r"C:\work\", r"\sub\file"), r"C:\work\sub\file");
        assert_eq!(combine(r"C:\work", r"sub\file"), r"C:\work\sub\file");
    }

    #[test]
    fn test_parent_and_file_name() {
        assert_eq!(parent(r"\a\b\c.txt"), r"\a\b");
        assert_eq!(parent("c.txt"), "");
        assert_eq!(file_name(r"\a\b\c.txt"), "c.txt");
        assert_eq!(file_name("c.txt"), "c.txt");
    }

    #[test]
    fn test_extension_includes_dot() {
        assert_eq!(extension(r"\a\b\c.txt"), ".txt");
        assert_eq!(extension(r"\a\b\archive.tar.gz"), ".gz");
        assert_eq!(extension(r"\a\b\noext"), "");
    }

    #[test]
    fn test_file_name_without_extension() {
        assert_eq!(file_name_without_extension(r"\a\b\c.txt"), "c");
        assert_eq!(file_name_without_extension(r"\a\b\archive.tar.gz"), "archive.tar");
        assert_eq!(file_name_without_extension("noext"), "noext");
    }

    #[test]
    fn test_hidden_file_dot_is_not_an_extension_marker() {
        assert_eq!(file_name(".hidden"), ".hidden");
        assert_eq!(file_name_without_extension(".hidden"), ".hidden");
        assert_eq!(file_name_without_extension(r"\home\.hidden"), ".hidden");
    }
}
