//! Text encoding, wrapping and fitting helpers shared by all documents.

use encoding_rs::WINDOWS_1252;

const ELLIPSIS: &str = "...";

/// Encodes text for the WinAnsi built-in fonts; unmappable characters become `?`.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        let (bytes, _, had_errors) = WINDOWS_1252.encode(ch.encode_utf8(&mut buf));
        match bytes.as_ref() {
            [byte] if !had_errors => out.push(*byte),
            _ => out.push(b'?'),
        }
    }
    out
}

/// The text as it will appear under a WinAnsi font.
pub fn sanitize_win_ansi(text: &str) -> String {
    let bytes = to_win_ansi(text);
    let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(&bytes);
    decoded.into_owned()
}

/// Greedy word wrap. Line breaks in the input are kept, blank lines included.
/// Words wider than the line are split by character.
pub fn wrap_text<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if measure(&candidate) <= max_width {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if measure(word) <= max_width {
                line = word.to_string();
                continue;
            }
            for ch in word.chars() {
                let mut next = line.clone();
                next.push(ch);
                if !line.is_empty() && measure(&next) > max_width {
                    lines.push(std::mem::take(&mut line));
                    line.push(ch);
                } else {
                    line = next;
                }
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

/// Makes `text` fit `max_width`: first by shrinking the font size down to `min_size`,
/// then by truncating with an ellipsis. Returns the text and the size to use.
pub fn fit_text<F>(text: &str, max_width: f32, size: f32, min_size: f32, measure: F) -> (String, f32)
where
    F: Fn(&str, f32) -> f32,
{
    if measure(text, size) <= max_width {
        return (text.to_string(), size);
    }

    let mut current = size;
    while current - 0.5 >= min_size {
        current -= 0.5;
        if measure(text, current) <= max_width {
            return (text.to_string(), current);
        }
    }

    let chars: Vec<char> = text.chars().collect();
    for keep in (0..chars.len()).rev() {
        let candidate: String = chars[..keep].iter().collect::<String>().trim_end().to_string() + ELLIPSIS;
        if measure(&candidate, current) <= max_width {
            return (candidate, current);
        }
    }
    (String::new(), current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monospace(text: &str) -> f32 {
        text.chars().count() as f32
    }

    #[test]
    fn test_win_ansi_replacement() {
        assert_eq!(to_win_ansi("Müller €"), vec![b'M', 0xFC, b'l', b'l', b'e', b'r', b' ', 0x80]);
        assert_eq!(sanitize_win_ansi("Şule Çelik ✔"), "?ule Çelik ?");
        assert_eq!(sanitize_win_ansi("김민규"), "???");
    }

    #[test]
    fn test_wrap_keeps_paragraph_breaks() {
        let lines = wrap_text("aaa bbb ccc\n\nddd", 7.0, monospace);
        assert_eq!(lines, vec!["aaa bbb", "ccc", "", "ddd"]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap_text("abcdefghij", 4.0, monospace);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_fit_shrinks_before_truncating() {
        let measure = |text: &str, size: f32| text.chars().count() as f32 * size;

        let (text, size) = fit_text("abcd", 40.0, 10.0, 5.0, measure);
        assert_eq!((text.as_str(), size), ("abcd", 10.0));

        let (text, size) = fit_text("abcd", 30.0, 10.0, 5.0, measure);
        assert_eq!((text.as_str(), size), ("abcd", 7.5));

        let (text, size) = fit_text("abcdefghij", 30.0, 10.0, 5.0, measure);
        assert_eq!(size, 5.0);
        assert_eq!(text, "abc...");
    }
}
