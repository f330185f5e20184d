//! Structural trimming of `Human: ... / ChatBot: ...` transcripts.
//!
//! A turn starts at a line beginning with the human marker, must contain a later line
//! beginning with the robot marker, and runs up to the next human-marker line or the end
//! of the transcript. Unlike a plain `Human:.*?ChatBot:` scan, markers only count at the
//! start of a line; markers in the middle of a line are ordinary content. Human lines that
//! arrive before any robot line belong to the turn they open, so a model reply that
//! continues the dialogue with its own `Human:` line is trimmed together with the next turn
//! instead of piling up.
//!
//! ```rust
//! use kchat::{TranscriptMarkers, trim_history};
//!
//! let transcript = "Human: hi\nChatBot: hello\nHuman: bye\nChatBot: goodbye";
//! let outcome = trim_history(transcript, &TranscriptMarkers::default(), 1);
//!
//! assert_eq!(outcome.transcript, "Human: bye\nChatBot: goodbye");
//! assert_eq!(outcome.removed, 1);
//! ```

use std::ops::Range;

pub const DEFAULT_HUMAN_ID: &str = "Human";
pub const DEFAULT_ROBOT_ID: &str = "ChatBot";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptMarkers {
    pub human_id: String,
    pub robot_id: String,
}

impl Default for TranscriptMarkers {
    fn default() -> Self {
        Self::new(DEFAULT_HUMAN_ID, DEFAULT_ROBOT_ID)
    }
}

impl TranscriptMarkers {
    pub fn new(human_id: impl Into<String>, robot_id: impl Into<String>) -> Self {
        Self {
            human_id: human_id.into(),
            robot_id: robot_id.into(),
        }
    }

    /// `"{human}: {input}\n{robot}: {output}"`.
    pub fn format_turn(&self, input: &str, output: &str) -> String {
        format!(
            "{}: {input}\n{}: {output}",
            self.human_id, self.robot_id
        )
    }

    fn human_prefix(&self) -> String {
        format!("{}:", self.human_id)
    }

    fn robot_prefix(&self) -> String {
        format!("{}:", self.robot_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimOutcome {
    pub transcript: String,
    /// Complete turns found before trimming.
    pub turns: usize,
    pub removed: usize,
}

impl TrimOutcome {
    pub fn kept(&self) -> usize {
        self.turns - self.removed
    }
}

/// Byte ranges of every complete turn, oldest first.
pub fn turn_spans(transcript: &str, markers: &TranscriptMarkers) -> Vec<Range<usize>> {
    let human = markers.human_prefix();
    let robot = markers.robot_prefix();

    let mut spans = Vec::new();
    let mut open: Option<usize> = None;
    let mut answered = false;
    let mut offset = 0;

    for line in transcript.split_inclusive('\n') {
        if line.starts_with(&human) {
            match open {
                Some(start) if answered => {
                    spans.push(start..offset);
                    open = Some(offset);
                }
                Some(_) => {}
                None => open = Some(offset),
            }
            answered = false;
        } else if open.is_some() && line.starts_with(&robot) {
            answered = true;
        }
        offset += line.len();
    }

    if let Some(start) = open
        && answered
    {
        spans.push(start..transcript.len());
    }

    spans
}

pub fn count_turns(transcript: &str, markers: &TranscriptMarkers) -> usize {
    turn_spans(transcript, markers).len()
}

/// Keeps the newest `max_turns` complete turns; 0 removes every turn.
///
/// Text outside complete turns is never touched and the result is stable under repeated
/// trimming with the same cap.
pub fn trim_history(transcript: &str, markers: &TranscriptMarkers, max_turns: usize) -> TrimOutcome {
    let spans = turn_spans(transcript, markers);
    let turns = spans.len();
    if turns <= max_turns {
        return TrimOutcome {
            transcript: transcript.to_string(),
            turns,
            removed: 0,
        };
    }

    let removed = turns - max_turns;
    let mut trimmed = String::with_capacity(transcript.len());
    let mut cursor = 0;
    for span in spans.iter().take(removed) {
        trimmed.push_str(&transcript[cursor..span.start]);
        cursor = span.end;
    }
    trimmed.push_str(&transcript[cursor..]);

    TrimOutcome {
        transcript: trimmed,
        turns,
        removed,
    }
}
