//! Prompt construction for the transcription and minutes stages.

use chrono::{DateTime, Utc};

/// Preamble steering the speech model toward meeting audio.
const TRANSCRIPTION_PREAMBLE: &str = "This is a recording of a meeting.";

/// System prompt for the minutes model. The summarizer fills the fixed
/// structure from the transcript and leaves sections it cannot populate
/// out rather than inventing content.
pub const MINUTES_SYSTEM_PROMPT: &str = "You are an expert minute-taker. \
From the given transcript, produce meeting minutes in exactly this format:

# Minutes

## Meeting information
- Date: [date, if mentioned]
- Agenda: [identify and state the agenda]

## Participants
[list participants, if mentioned]

## Key topics and decisions
[important topics and decisions as bullet points]

## Detailed discussion
[the discussion in detail, split into paragraphs]

## Action items
[tasks and follow-ups for the next meeting, if mentioned]

## Next meeting
[the next meeting's schedule, if mentioned]
";

/// Assemble the initial prompt for the transcription call from the
/// optional submission hints. Empty or whitespace-only hints are ignored.
pub fn build_transcription_prompt(
    meeting_summary: Option<&str>,
    key_terms: Option<&str>,
) -> String {
    let mut prompt = String::from(TRANSCRIPTION_PREAMBLE);

    if let Some(summary) = meeting_summary.map(str::trim).filter(|s| !s.is_empty()) {
        prompt.push(' ');
        prompt.push_str(summary);
    }

    if let Some(terms) = key_terms.map(str::trim).filter(|s| !s.is_empty()) {
        prompt.push_str(" The following terms and names may come up: ");
        prompt.push_str(terms);
        prompt.push('.');
    }

    prompt
}

/// Render minimal minutes locally, without a language model: a dated
/// header followed by one bullet per sentence of the transcript.
pub fn render_basic_minutes(transcript: &str, now: DateTime<Utc>) -> String {
    let mut minutes = String::from("# Minutes\n\n");
    minutes.push_str("## Date\n");
    minutes.push_str(&now.format("%Y-%m-%d %H:%M UTC").to_string());
    minutes.push_str("\n\n## Discussion\n\n");

    for sentence in split_sentences(transcript) {
        minutes.push_str("- ");
        minutes.push_str(sentence);
        minutes.push('\n');
    }

    minutes
}

/// Split on sentence-ending punctuation, keeping the terminator attached.
/// Handles both Western full stops and the ideographic full stop so
/// Japanese transcripts format sensibly.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if matches!(c, '.' | '!' | '?' | '。' | '！' | '？') {
            let end = i + c.len_utf8();
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- transcription prompt -------------------------------------------------

    #[test]
    fn prompt_without_hints_is_just_the_preamble() {
        assert_eq!(
            build_transcription_prompt(None, None),
            TRANSCRIPTION_PREAMBLE
        );
    }

    #[test]
    fn prompt_includes_summary_and_key_terms() {
        let prompt = build_transcription_prompt(
            Some("Quarterly planning for the storage team."),
            Some("RAID, erasure coding, Watanabe"),
        );
        assert!(prompt.starts_with(TRANSCRIPTION_PREAMBLE));
        assert!(prompt.contains("Quarterly planning for the storage team."));
        assert!(prompt.contains("RAID, erasure coding, Watanabe"));
    }

    #[test]
    fn blank_hints_are_ignored() {
        assert_eq!(
            build_transcription_prompt(Some("   "), Some("")),
            TRANSCRIPTION_PREAMBLE
        );
    }

    // -- basic minutes --------------------------------------------------------

    #[test]
    fn basic_minutes_bullet_each_sentence() {
        let minutes = render_basic_minutes(
            "We shipped the release. QA starts Monday.",
            Utc::now(),
        );
        assert!(minutes.starts_with("# Minutes"));
        assert!(minutes.contains("- We shipped the release."));
        assert!(minutes.contains("- QA starts Monday."));
    }

    #[test]
    fn basic_minutes_handle_ideographic_full_stops() {
        let minutes = render_basic_minutes("予算を承認した。次回は金曜日。", Utc::now());
        assert!(minutes.contains("- 予算を承認した。"));
        assert!(minutes.contains("- 次回は金曜日。"));
    }

    #[test]
    fn trailing_text_without_terminator_is_kept() {
        let minutes = render_basic_minutes("First point. second point without a stop", Utc::now());
        assert!(minutes.contains("- second point without a stop\n"));
    }
}
