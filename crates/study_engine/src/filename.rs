use sha2::{Digest, Sha256};

const MAX_STEM_CHARS: usize = 80;

/// Deterministic, filesystem-safe name: `{sanitized_topic}--{short_hash(session_id)}.md`.
pub fn report_filename(topic: &str, session_id: &str) -> String {
    format!("{}--{}.md", sanitize_topic(topic), short_hash(session_id))
}

fn sanitize_topic(input: &str) -> String {
    let replaced: String = input
        .chars()
        .map(|c| if is_forbidden(c) || c.is_whitespace() { '_' } else { c })
        .collect();

    let mut compacted = String::with_capacity(replaced.len());
    let mut prev_underscore = false;
    for c in replaced.trim_matches(&['_', '.'][..]).chars() {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }

    let mut stem: String = compacted.chars().take(MAX_STEM_CHARS).collect();
    if stem.is_empty() {
        stem = "report".to_string();
    }
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    stem
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}')
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    Sha256::digest(input.as_bytes())
        .iter()
        .take(4)
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn korean_topic_is_kept_and_separators_collapse() {
        let name = report_filename("원격 근무 / 하이브리드?", "abc123");
        assert!(name.starts_with("원격_근무_하이브리드--"), "{name}");
        assert!(name.ends_with(".md"));
    }

    #[test]
    fn long_topic_truncates_on_char_boundary() {
        let topic = "가".repeat(120);
        let name = report_filename(&topic, "s");
        let stem = name.split("--").next().unwrap_or_default();
        assert_eq!(stem.chars().count(), MAX_STEM_CHARS);
    }

    #[test]
    fn blank_and_reserved_topics_get_safe_stems() {
        assert!(report_filename("  ", "s").starts_with("report--"));
        assert!(report_filename("con", "s").starts_with("con_--"));
    }

    #[test]
    fn hash_depends_only_on_session() {
        assert_eq!(report_filename("a", "x"), report_filename("a", "x"));
        assert_ne!(report_filename("a", "x"), report_filename("a", "y"));
    }
}
