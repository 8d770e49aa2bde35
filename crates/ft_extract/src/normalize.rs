use ft_core::config::NormalizeSettings;
use ft_core::services::TextNormalizer;
use std::collections::BTreeMap;

/// Line-ending cleanup plus whole-word spelling corrections.
#[derive(Debug, Clone, Default)]
pub struct DefaultNormalizer {
    pub replacements: BTreeMap<String, String>,
}

impl DefaultNormalizer {
    pub fn from_settings(settings: &NormalizeSettings) -> Self {
        Self {
            replacements: settings.replacements.clone(),
        }
    }

    fn replace_words(&self, line: &str) -> String {
        if self.replacements.is_empty() {
            return line.to_string();
        }
        let mut out = String::with_capacity(line.len());
        let mut word = String::new();
        for ch in line.chars() {
            if ch.is_alphanumeric() || ch == '\'' {
                word.push(ch);
                continue;
            }
            self.flush_word(&mut word, &mut out);
            out.push(ch);
        }
        self.flush_word(&mut word, &mut out);
        out
    }

    fn flush_word(&self, word: &mut String, out: &mut String) {
        if word.is_empty() {
            return;
        }
        match self.replacements.get(word.as_str()) {
            Some(fixed) => out.push_str(fixed),
            None => out.push_str(word),
        }
        word.clear();
    }
}

/// Unifies line endings and trims trailing whitespace of every terminated line.
/// An unterminated last line keeps its trailing spaces so that concatenated
/// blocks stay separated.
pub fn normalize_line_endings(input: &str) -> String {
    let unified = input.replace("\r\n", "\n").replace('\r', "\n");
    let lines = unified.split('\n').collect::<Vec<_>>();
    let last = lines.len() - 1;
    let mut out = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| if idx == last { *line } else { line.trim_end() })
        .collect::<Vec<_>>()
        .join("\n");
    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

impl TextNormalizer for DefaultNormalizer {
    fn normalize(&self, text: &str) -> String {
        let cleaned = normalize_line_endings(text);
        cleaned
            .split('\n')
            .map(|line| self.replace_words(line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
