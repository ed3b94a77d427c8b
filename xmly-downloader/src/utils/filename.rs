//! File-system-safe names from remote metadata.

/// Characters replaced by a space.
const INVALID_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Make a remote title usable as a file name.
///
/// Each of `/ \ : * ? " < > |` becomes a single space, tabs are removed and
/// surrounding whitespace is trimmed. Other characters, including CJK text,
/// are kept as-is.
///
/// ```
/// use xmly_downloader::utils::format_file_name;
///
/// assert_eq!(format_file_name("A/B:C*D?E"), "A B C D E");
/// assert_eq!(format_file_name("  x\ty  "), "xy");
/// ```
pub fn format_file_name(input: &str) -> String {
    let replaced: String = input
        .chars()
        .filter(|&c| c != '\t')
        .map(|c| if INVALID_CHARS.contains(&c) { ' ' } else { c })
        .collect();
    replaced.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_each_invalid_char_with_space() {
        assert_eq!(format_file_name("A/B:C*D?E"), "A B C D E");
        assert_eq!(format_file_name(r#"a\b"c<d>e|f"#), "a b c d e f");
        assert_eq!(format_file_name("a//b"), "a  b");
    }

    #[test]
    fn removes_tabs_and_trims() {
        assert_eq!(format_file_name("  x\ty  "), "xy");
        assert_eq!(format_file_name("\t第1集 开端\t"), "第1集 开端");
        assert_eq!(format_file_name(" :title: "), "title");
    }

    #[test]
    fn keeps_valid_text() {
        assert_eq!(format_file_name("观看一只青蛙"), "观看一只青蛙");
        assert_eq!(format_file_name("Episode 01 - Intro.m4a"), "Episode 01 - Intro.m4a");
        assert_eq!(format_file_name(""), "");
    }
}
