//! Request classifier: decides which API operation a user turn implies.
//!
//! Pure and deterministic -- no side effects, no IO. Matching is broad
//! case-insensitive substring search over a configurable phrase table
//! ([`ClassifierRules`]); false positives such as "I created an image in my
//! mind" are an accepted cost of simplicity.

use glimmer_types::config::ClassifierRules;
use glimmer_types::turn::{ImageRef, Turn};

/// The API operation a classified turn dispatches to.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Plain text completion over the conversation history.
    Text,
    /// Image generation from the turn's text as prompt.
    GenerateImage,
    /// Image edit, with the source image to operate on.
    EditImage { source: ImageRef },
}

/// Classify a user turn into the operation it implies.
///
/// Decision order, first match wins:
/// 1. An attached image always means "do something with this image".
/// 2. A generation trigger phrase in the text means image generation.
/// 3. An edit trigger phrase, when a turn inside the history window still
///    carries an image, means editing the most recent such image.
/// 4. Anything else is plain text.
///
/// The blank-text-with-attached-image case is not dispatched at all; the
/// conversation controller short-circuits it before classification.
pub fn classify(
    rules: &ClassifierRules,
    text: &str,
    attached_image: Option<&ImageRef>,
    recent_turns: &[Turn],
) -> Operation {
    if let Some(image) = attached_image {
        return Operation::EditImage {
            source: image.clone(),
        };
    }

    let lower = text.to_lowercase();

    if matches_any(&lower, &rules.generation_triggers) {
        return Operation::GenerateImage;
    }

    // Most recent image inside the window, scanning backwards.
    let window_image = recent_turns
        .iter()
        .rev()
        .take(rules.history_window)
        .find_map(|turn| turn.image.clone());

    if let Some(image) = window_image {
        if matches_any(&lower, &rules.edit_triggers) {
            return Operation::EditImage { source: image };
        }
    }

    Operation::Text
}

fn matches_any(lower_text: &str, phrases: &[String]) -> bool {
    phrases
        .iter()
        .any(|phrase| lower_text.contains(&phrase.to_lowercase()))
}
