//! Context-stuffing prompt: every passage goes into one request

use crate::index::RetrievedPassage;

/// Instruction placed before the context block
pub const SYSTEM_INSTRUCTION: &str = "You are the assistant for Aroma restaurant. \
Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

/// Separator between passages
const PASSAGE_SEPARATOR: &str = "\n\n";

/// Join passage texts, nearest first
pub fn context_block(passages: &[RetrievedPassage]) -> String {
    passages
        .iter()
        .map(|p| p.document.text.trim())
        .collect::<Vec<_>>()
        .join(PASSAGE_SEPARATOR)
}

/// User message carrying the context and the question
pub fn user_message(query: &str, passages: &[RetrievedPassage]) -> String {
    format!(
        "{}\n\nQuestion: {}\nHelpful Answer:",
        context_block(passages),
        query.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn passage(text: &str, rank: usize) -> RetrievedPassage {
        RetrievedPassage {
            document: Document::new(format!("d{}", rank), text),
            rank,
            distance: rank as f32,
        }
    }

    #[test]
    fn test_context_block_order() {
        let passages = vec![passage("first ", 1), passage(" second", 2)];
        assert_eq!(context_block(&passages), "first\n\nsecond");
    }

    #[test]
    fn test_user_message_contains_question() {
        let msg = user_message(" What are your hours? ", &[passage("Open 9am.", 1)]);
        assert!(msg.starts_with("Open 9am."));
        assert!(msg.contains("Question: What are your hours?\n"));
        assert!(msg.ends_with("Helpful Answer:"));
    }
}
