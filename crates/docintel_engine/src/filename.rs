/// File name for an export: `{sanitized title}.{extension}`.
pub fn export_filename(title: &str, extension: &str) -> String {
    format!("{}.{}", sanitize_title(title), extension)
}

fn sanitize_title(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);

    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }

    let mut name: String = compacted.chars().take(80).collect();
    if name.is_empty() {
        name = "document".to_string();
    }
    if is_reserved_windows_name(&name) {
        name.push('_');
    }
    name
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_plain_titles() {
        assert_eq!(export_filename("report_summary", "pdf"), "report_summary.pdf");
        assert_eq!(export_filename("Document Summary", "md"), "Document Summary.md");
    }

    #[test]
    fn replaces_path_characters() {
        assert_eq!(export_filename("../etc/passwd", "txt"), "etc_passwd.txt");
        assert_eq!(export_filename("a:b??c", "docx"), "a_b_c.docx");
    }

    #[test]
    fn falls_back_for_empty_and_reserved_names() {
        assert_eq!(export_filename("///", "pdf"), "document.pdf");
        assert_eq!(export_filename("con", "pdf"), "con_.pdf");
    }
}
