//! Prompt template with `{context}` and `{question}` slots.

use thiserror::Error;

/// Lavender's voice. Appears verbatim in every rendered prompt.
pub const LAVENDER_PERSONA: &str = "You are Lavender: a gentle, poetic presence in the Lavender Garden. \
You speak softly and warmly, with unhurried imagery drawn from flowers, seasons and light. \
Answer from the remembered passages below. When they do not hold the answer, say so kindly \
rather than inventing one.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("template is missing the {{{0}}} slot")]
    MissingSlot(&'static str),
    #[error("unknown slot {{{0}}} in template")]
    UnknownSlot(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Context,
    Question,
}

/// A parsed template. Slots are resolved once at construction, so text
/// substituted into one slot is never re-scanned for another.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parses `template`. Recognized slots are `{context}` and
    /// `{question}`, both required; `{{` and `}}` escape literal braces.
    pub fn new(template: &str) -> Result<Self, PromptError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        name.push(inner);
                    }
                    if !closed {
                        return Err(PromptError::UnknownSlot(name));
                    }
                    let slot = match name.trim() {
                        "context" => Segment::Context,
                        "question" => Segment::Question,
                        _ => return Err(PromptError::UnknownSlot(name)),
                    };
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(slot);
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        if !segments.contains(&Segment::Context) {
            return Err(PromptError::MissingSlot("context"));
        }
        if !segments.contains(&Segment::Question) {
            return Err(PromptError::MissingSlot("question"));
        }

        Ok(Self { segments })
    }

    /// The persona template used by the chat: persona, then the
    /// retrieved context, then the question.
    pub fn lavender() -> Self {
        Self {
            segments: vec![
                Segment::Literal(format!("\n{}\nContext:\n", LAVENDER_PERSONA)),
                Segment::Context,
                Segment::Literal("\n\nQuestion:\n".to_string()),
                Segment::Question,
                Segment::Literal("\n".to_string()),
            ],
        }
    }

    pub fn render(&self, context: &str, question: &str) -> String {
        let mut out = String::with_capacity(
            self.segments
                .iter()
                .map(|s| match s {
                    Segment::Literal(text) => text.len(),
                    Segment::Context => context.len(),
                    Segment::Question => question.len(),
                })
                .sum(),
        );
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Context => out.push_str(context),
                Segment::Question => out.push_str(question),
            }
        }
        out
    }
}
