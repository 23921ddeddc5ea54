//! Editing of the comma-separated module path list in Slicer's settings file.
//!
//! The key line looks like `AdditionalPaths=C:/a/Foo, E:/BainesImageQuizzer/ImageQuizzer/Code`.
//! Earlier runs may have left entries for the module under a different drive
//! letter or parent folder, so entries are recognised by the module sentinel
//! (`/ImageQuizzer/Code`) at their end rather than by the full path.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePatch {
    pub line: String,
    pub removed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePatch {
    pub contents: String,
    pub removed: usize,
}

/// Remove every list entry ending in `sentinel` and append `new_entry` as the
/// last entry. Returns `None` when `line` is not the `key_prefix` line.
pub fn patch_line(line: &str, key_prefix: &str, sentinel: &str, new_entry: &str) -> Option<LinePatch> {
    if !line.starts_with(key_prefix) || sentinel.is_empty() {
        return None;
    }
    let value_start = key_prefix.len();
    let mut text = line.to_string();
    let mut cursor = value_start;
    let mut removed = 0;

    while let Some(found) = text[cursor..].find(sentinel) {
        let at = cursor + found;
        let end = at + sentinel.len();
        let next_comma = text[end..].find(',').map(|i| end + i);
        let tail = &text[end..next_comma.unwrap_or(text.len())];

        // `/ImageQuizzer/Code/...` or `/ImageQuizzer/Codebase` belong to
        // some other entry.
        if tail.starts_with(['/', '\\']) || !tail.trim().is_empty() {
            cursor = end;
            continue;
        }

        let prev_comma = text[value_start..at].rfind(',').map(|i| value_start + i);
        cursor = match (prev_comma, next_comma) {
            (Some(comma), None) => {
                text.truncate(comma);
                comma
            }
            (None, None) => {
                text.truncate(value_start);
                value_start
            }
            (Some(comma), Some(next)) => {
                text.replace_range(comma..next, "");
                comma
            }
            (None, Some(next)) => {
                let after = next + 1;
                let blanks = text[after..].len() - text[after..].trim_start_matches([' ', '\t']).len();
                text.replace_range(value_start..after + blanks, "");
                value_start
            }
        };
        removed += 1;
    }

    let kept = text[value_start..]
        .trim_end_matches(|c: char| c == ',' || c.is_whitespace())
        .len();
    text.truncate(value_start + kept);
    if kept > 0 {
        text.push_str(", ");
    }
    text.push_str(new_entry);

    Some(LinePatch { line: text, removed })
}

/// Split `segment` into its content and its line ending (`\r\n`, `\n` or none).
fn split_ending(segment: &str) -> (&str, &str) {
    if let Some(content) = segment.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = segment.strip_suffix('\n') {
        (content, "\n")
    } else {
        (segment, "")
    }
}

/// Patch the first key line of a settings file, passing every other line
/// through untouched. Returns `None` when the file has no key line.
pub fn patch_contents(
    contents: &str,
    key_prefix: &str,
    sentinel: &str,
    new_entry: &str,
) -> Option<FilePatch> {
    let mut out = String::with_capacity(contents.len() + new_entry.len() + 2);
    let mut removed = None;

    for segment in contents.split_inclusive('\n') {
        if removed.is_none() {
            let (content, ending) = split_ending(segment);
            if let Some(patch) = patch_line(content, key_prefix, sentinel, new_entry) {
                out.push_str(&patch.line);
                out.push_str(ending);
                removed = Some(patch.removed);
                continue;
            }
        }
        out.push_str(segment);
    }

    removed.map(|removed| FilePatch {
        contents: out,
        removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "AdditionalPaths=";
    const SENTINEL: &str = "/ImageQuizzer/Code";

    fn patch(line: &str, entry: &str) -> LinePatch {
        patch_line(line, KEY, SENTINEL, entry).unwrap()
    }

    #[test]
    fn appends_to_empty_list() {
        let out = patch("AdditionalPaths=", "E:/IQ/ImageQuizzer/Code");
        assert_eq!(out.line, "AdditionalPaths=E:/IQ/ImageQuizzer/Code");
        assert_eq!(out.removed, 0);
    }

    #[test]
    fn appends_after_unrelated_entries() {
        let out = patch("AdditionalPaths=C:/a/Foo, C:/b/Bar", "E:/IQ/ImageQuizzer/Code");
        assert_eq!(
            out.line,
            "AdditionalPaths=C:/a/Foo, C:/b/Bar, E:/IQ/ImageQuizzer/Code"
        );
    }

    #[test]
    fn replaces_entry_with_old_drive_letter() {
        let out = patch(
            "AdditionalPaths=C:/a/Foo, X:/old/ImageQuizzer/Code",
            "Y:/new/ImageQuizzer/Code",
        );
        assert_eq!(out.line, "AdditionalPaths=C:/a/Foo, Y:/new/ImageQuizzer/Code");
        assert_eq!(out.removed, 1);
    }

    #[test]
    fn removes_mid_list_entry_keeping_neighbours() {
        let out = patch(
            "AdditionalPaths=/a/Foo, /b/ImageQuizzer/Code, /c/Bar",
            "/d/ImageQuizzer/Code",
        );
        assert_eq!(out.line, "AdditionalPaths=/a/Foo, /c/Bar, /d/ImageQuizzer/Code");
    }

    #[test]
    fn removes_first_entry() {
        let out = patch(
            "AdditionalPaths=X:/ImageQuizzer/Code, /c/Bar",
            "Y:/ImageQuizzer/Code",
        );
        assert_eq!(out.line, "AdditionalPaths=/c/Bar, Y:/ImageQuizzer/Code");
    }

    #[test]
    fn removes_sole_entry() {
        let out = patch("AdditionalPaths=X:/ImageQuizzer/Code", "Y:/ImageQuizzer/Code");
        assert_eq!(out.line, "AdditionalPaths=Y:/ImageQuizzer/Code");
        assert_eq!(out.removed, 1);
    }

    #[test]
    fn removes_three_or_more_duplicates_anywhere() {
        let out = patch(
            "AdditionalPaths=D:/ImageQuizzer/Code, /a/Foo, E:/x/ImageQuizzer/Code, F:/ImageQuizzer/Code, /b/Bar, G:/ImageQuizzer/Code",
            "H:/IQ/ImageQuizzer/Code",
        );
        assert_eq!(
            out.line,
            "AdditionalPaths=/a/Foo, /b/Bar, H:/IQ/ImageQuizzer/Code"
        );
        assert_eq!(out.removed, 4);
    }

    #[test]
    fn adjacent_duplicates_are_all_removed() {
        let out = patch(
            "AdditionalPaths=A:/ImageQuizzer/Code, B:/ImageQuizzer/Code, C:/ImageQuizzer/Code",
            "D:/ImageQuizzer/Code",
        );
        assert_eq!(out.line, "AdditionalPaths=D:/ImageQuizzer/Code");
        assert_eq!(out.removed, 3);
    }

    #[test]
    fn leaves_longer_paths_sharing_the_sentinel() {
        let line = "AdditionalPaths=C:/ImageQuizzer/Code/Extra, C:/ImageQuizzer/Codebase, C:/MyImageQuizzer/Code";
        let out = patch(line, "E:/ImageQuizzer/Code");
        assert_eq!(out.line, format!("{line}, E:/ImageQuizzer/Code"));
        assert_eq!(out.removed, 0);
    }

    #[test]
    fn second_patch_is_identical() {
        let first = patch("AdditionalPaths=/a/Foo", "/d/ImageQuizzer/Code");
        let second = patch(&first.line, "/d/ImageQuizzer/Code");
        assert_eq!(first.line, second.line);
        assert_eq!(second.line.matches("/d/ImageQuizzer/Code").count(), 1);
    }

    #[test]
    fn tolerates_trailing_comma_and_blanks() {
        let out = patch("AdditionalPaths=/a/Foo,  ", "/d/ImageQuizzer/Code");
        assert_eq!(out.line, "AdditionalPaths=/a/Foo, /d/ImageQuizzer/Code");
    }

    #[test]
    fn blank_or_comma_only_list_gets_a_single_entry() {
        for line in ["AdditionalPaths=,", "AdditionalPaths= , ,", "AdditionalPaths=   "] {
            let out = patch(line, "Y:/ImageQuizzer/Code");
            assert_eq!(out.line, "AdditionalPaths=Y:/ImageQuizzer/Code", "from {line:?}");
        }
    }

    #[test]
    fn non_key_lines_are_rejected() {
        assert!(patch_line("[Modules]", KEY, SENTINEL, "/x").is_none());
        assert!(patch_line("HomeModule=Welcome", KEY, SENTINEL, "/x").is_none());
    }

    #[test]
    fn contents_keep_crlf_and_missing_final_newline() {
        let contents = "[Modules]\r\nAdditionalPaths=/a/Foo\r\nHomeModule=Welcome";
        let out = patch_contents(contents, KEY, SENTINEL, "/d/ImageQuizzer/Code").unwrap();
        assert_eq!(
            out.contents,
            "[Modules]\r\nAdditionalPaths=/a/Foo, /d/ImageQuizzer/Code\r\nHomeModule=Welcome"
        );
    }

    #[test]
    fn contents_without_key_line() {
        assert!(patch_contents("[General]\nfoo=bar\n", KEY, SENTINEL, "/x").is_none());
    }
}
