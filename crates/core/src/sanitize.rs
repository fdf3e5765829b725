//! Block-list filtering for image prompts.

use regex::Regex;

/// Default terms removed from image prompts before they reach a provider.
pub const DEFAULT_BLOCKLIST: &[&str] = &["young", "girl", "boy", "child", "baby", "kid", "teen"];

/// Removes block-listed whole words (case-insensitive) from prompts.
#[derive(Debug, Clone)]
pub struct PromptSanitizer {
    terms: Vec<String>,
    pattern: Option<Regex>,
}

impl PromptSanitizer {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: Vec<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        let pattern = if terms.is_empty() {
            None
        } else {
            let alternation = terms
                .iter()
                .map(|t| regex::escape(t))
                .collect::<Vec<_>>()
                .join("|");
            // Optional plural suffix so "kids" and "teens" match too.
            Regex::new(&format!(r"(?i)\b(?:{alternation})(?:s|es|ies)?\b")).ok()
        };

        Self { terms, pattern }
    }

    /// Terms this sanitizer filters, lowercased.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Return `prompt` with block-listed words removed and whitespace
    /// collapsed.
    pub fn sanitize(&self, prompt: &str) -> String {
        let stripped = match &self.pattern {
            Some(re) => re.replace_all(prompt, ""),
            None => prompt.into(),
        };
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Whether `prompt` contains any block-listed word.
    pub fn contains_blocked(&self, prompt: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(prompt))
    }
}

impl Default for PromptSanitizer {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKLIST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_whole_words_case_insensitively() {
        let s = PromptSanitizer::default();
        assert_eq!(
            s.sanitize("A Young girl reading by the window"),
            "A reading by the window"
        );
    }

    #[test]
    fn plurals_are_removed() {
        let s = PromptSanitizer::default();
        assert_eq!(s.sanitize("kids and teens at the beach"), "and at the beach");
    }

    #[test]
    fn substrings_inside_other_words_are_kept() {
        let s = PromptSanitizer::default();
        assert_eq!(s.sanitize("a boyish grin on a kidney bean"), "a boyish grin on a kidney bean");
        assert!(!s.contains_blocked("kidney"));
    }

    #[test]
    fn empty_blocklist_is_a_no_op() {
        let s = PromptSanitizer::new(Vec::<String>::new());
        assert_eq!(s.sanitize("  a   child  "), "a child");
        assert!(!s.contains_blocked("child"));
    }

    #[test]
    fn custom_terms_are_normalized() {
        let s = PromptSanitizer::new([" Puppy ", ""]);
        assert_eq!(s.terms(), ["puppy"]);
        assert!(s.contains_blocked("a PUPPY"));
    }
}
