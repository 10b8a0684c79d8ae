//! Turning the model's free-text reply into classifications
//!
//! Questions of the form `Is this a <description>? Answer YES or NO.` switch
//! parsing into yes/no mode: an affirmative reply yields `<description>` as the
//! single label and anything else yields no label at all. Every other question
//! is free-form and the trimmed reply itself becomes the label.

use regex::Regex;
use std::sync::LazyLock;

use crate::model::Classification;

static YES_NO_QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^Is this an? (.*?)(?:,|\?)\s*answer YES or NO\.?$")
        .expect("yes/no question pattern is valid")
});

/// How a question asks to be answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionMode {
    /// `Is this a|an <description>...Answer YES or NO`
    YesNo { description: String },
    /// Anything else
    FreeForm,
}

impl QuestionMode {
    /// Detect the mode of a question
    pub fn detect(question: &str) -> Self {
        match YES_NO_QUESTION.captures(question.trim()) {
            Some(caps) => QuestionMode::YesNo {
                description: caps
                    .get(1)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default(),
            },
            None => QuestionMode::FreeForm,
        }
    }
}

/// Whether a reply opens with "yes", ignoring case and markdown emphasis
pub fn is_affirmative(reply: &str) -> bool {
    let lowered = reply.to_lowercase();
    lowered
        .trim()
        .trim_end_matches(['.', '!', '?'])
        .trim_matches(['*', '_'])
        .starts_with("yes")
}

/// Parse a reply to `question` into zero or one classification
pub fn parse_reply(question: &str, reply: &str) -> Vec<Classification> {
    match QuestionMode::detect(question) {
        QuestionMode::YesNo { description } => {
            if is_affirmative(reply) {
                vec![Classification::new(description)]
            } else {
                vec![]
            }
        }
        QuestionMode::FreeForm => vec![Classification::new(reply.trim())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PLACEHOLDER_CONFIDENCE;

    fn description(question: &str) -> Option<String> {
        match QuestionMode::detect(question) {
            QuestionMode::YesNo { description } => Some(description),
            QuestionMode::FreeForm => None,
        }
    }

    #[test]
    fn test_detects_both_articles() {
        assert_eq!(
            description("Is this a red ball? Answer YES or NO."),
            Some("red ball".to_string())
        );
        assert_eq!(
            description("Is this an apple? Answer YES or NO."),
            Some("apple".to_string())
        );
    }

    #[test]
    fn test_detection_is_case_insensitive_and_accepts_comma() {
        assert_eq!(
            description("is this a dog, answer yes or no"),
            Some("dog".to_string())
        );
        assert_eq!(
            description("  IS THIS AN owl?   ANSWER YES OR NO.  "),
            Some("owl".to_string())
        );
    }

    #[test]
    fn test_description_keeps_internal_punctuation() {
        assert_eq!(
            description("Is this a cat, or a dog? Answer YES or NO."),
            Some("cat, or a dog".to_string())
        );
        assert_eq!(
            description("Is this a 3.5\" floppy disk? Answer YES or NO."),
            Some("3.5\" floppy disk".to_string())
        );
    }

    #[test]
    fn test_other_questions_are_free_form() {
        assert_eq!(description("What is in this image?"), None);
        assert_eq!(description("describe this image"), None);
        assert_eq!(description("Is this a dog? Answer YES or NO. Explain why."), None);
        assert_eq!(description("Is this a dog? Please answer yes or no."), None);
        assert_eq!(description("Is that a dog? Answer YES or NO."), None);
    }

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("YES, it is a dog."));
        assert!(is_affirmative("yes"));
        assert!(is_affirmative("  Yes!  "));
        assert!(is_affirmative("**Yes**"));
        assert!(is_affirmative("_yes_."));

        assert!(!is_affirmative("No, it is a dog."));
        assert!(!is_affirmative("NO"));
        assert!(!is_affirmative("I think so, yes"));
        assert!(!is_affirmative(""));
    }

    #[test]
    fn test_yes_no_affirmative_reply() {
        let result = parse_reply("Is this a dog? Answer YES or NO.", "YES, it is a dog.");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].class_name, "dog");
        assert_eq!(result[0].confidence, PLACEHOLDER_CONFIDENCE);
    }

    #[test]
    fn test_yes_no_negative_reply_is_empty() {
        let result = parse_reply("Is this a cat? Answer YES or NO.", "No, it is a dog.");
        assert!(result.is_empty());

        let result = parse_reply("Is this a cat? Answer YES or NO.", "Maybe.");
        assert!(result.is_empty());
    }

    #[test]
    fn test_free_form_reply_is_trimmed() {
        let result = parse_reply("What is in this image?", "  a red bicycle\n");
        assert_eq!(result, vec![Classification::new("a red bicycle")]);
    }

    #[test]
    fn test_free_form_empty_reply_yields_empty_label() {
        let result = parse_reply("What is in this image?", "   ");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].class_name, "");
    }
}
