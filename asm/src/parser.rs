// ----------------------------------------------------------------------------
// Line

/// One physical source line together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    path: String,
    idx: usize,
    raw: String,
}

impl Line {
    pub fn new(path: &str, idx: usize, raw: &str) -> Self {
        Self {
            path: path.to_string(),
            idx,
            raw: raw.trim_end_matches(['\r', '\n']).to_string(),
        }
    }

    pub fn split(path: &str, text: &str) -> Vec<Line> {
        text.lines()
            .enumerate()
            .map(|(idx, raw)| Line::new(path, idx, raw))
            .collect()
    }

    pub fn pos(&self) -> String {
        format!("{}:{}", self.path, self.idx + 1)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn no(&self) -> usize {
        self.idx + 1
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Blank, or first non-blank character is `;`.
    pub fn is_blank_or_comment(&self) -> bool {
        match self.raw.trim_start().chars().next() {
            None => true,
            Some(c) => c == ';',
        }
    }
}

// ----------------------------------------------------------------------------
// Tokens

/// First whitespace-delimited word and the rest of the text after it.
pub fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], &text[end..]),
        None => (text, ""),
    }
}

/// Tokens separated by whitespace and/or commas.
pub fn tokens(text: &str) -> Vec<&str> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_blanks() {
        assert!(Line::new("a.am", 0, "").is_blank_or_comment());
        assert!(Line::new("a.am", 0, "   \t").is_blank_or_comment());
        assert!(Line::new("a.am", 0, "  ; note").is_blank_or_comment());
        assert!(!Line::new("a.am", 0, "stop ; trailing").is_blank_or_comment());
    }

    #[test]
    fn split_lines() {
        let lines = Line::split("p.am", "MAIN: stop\r\n\n.data 1\n");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].raw(), "MAIN: stop");
        assert_eq!(lines[2].no(), 3);
        assert_eq!(lines[2].pos(), "p.am:3");
    }

    #[test]
    fn words() {
        assert_eq!(split_word("  MAIN: mov r1, r2"), ("MAIN:", " mov r1, r2"));
        assert_eq!(split_word("stop"), ("stop", ""));
        assert_eq!(split_word("   "), ("", ""));
        assert_eq!(tokens(" #5 ,r2"), vec!["#5", "r2"]);
        assert_eq!(tokens("7,-1,  3"), vec!["7", "-1", "3"]);
        assert_eq!(tokens(""), Vec::<&str>::new());
    }
}
