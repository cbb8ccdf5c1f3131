//! Turns dictated phrases such as "roll number 12 question 3 7 marks" into
//! marks updates. Speech recognisers often mishear "roll", so a few
//! near-homophones are accepted as well.

use crate::core::MarksUpdate;
use crate::utils::error::{MarksError, Result};
use regex::Regex;
use std::sync::LazyLock;

pub const USAGE_HINT: &str =
    "Could not understand input. Please use format: \"Roll number X question Y Z marks\"";

static SPOKEN_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:roll|role|rol|rule|rel)\s*(?:number)?\s*(\d+)\s*(?:question|q)\s*([1-4])\s*(\d+)\s*(?:marks?)?",
    )
    .expect("spoken command pattern is valid")
});

pub fn parse_spoken_command(transcript: &str) -> Result<MarksUpdate> {
    let caps = SPOKEN_COMMAND
        .captures(transcript)
        .ok_or_else(|| MarksError::bad_request(USAGE_HINT))?;

    let roll_number = &caps[1];
    let question: i64 = caps[2]
        .parse()
        .map_err(|_| MarksError::bad_request(USAGE_HINT))?;
    // 超長數字視為超出範圍，而不是無法辨識
    let marks: i64 = caps[3].parse().unwrap_or(i64::MAX);

    tracing::debug!(
        "Parsed spoken command: roll {}, Q{}, {} marks",
        roll_number,
        question,
        &caps[3]
    );

    MarksUpdate::new(roll_number, question, marks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Question;

    #[test]
    fn test_parses_canonical_phrase() {
        let update = parse_spoken_command("roll number 101 question 3 6 marks").unwrap();
        assert_eq!(update.roll_number, "101");
        assert_eq!(update.question, Question::Q3);
        assert_eq!(update.marks.value(), 6);
    }

    #[test]
    fn test_accepts_misheard_variants() {
        let update = parse_spoken_command("Role 7 q 2 10").unwrap();
        assert_eq!(update.roll_number, "7");
        assert_eq!(update.question, Question::Q2);
        assert_eq!(update.marks.value(), 10);

        let update = parse_spoken_command("okay rule number 42 question 4 0 mark").unwrap();
        assert_eq!(update.roll_number, "42");
        assert_eq!(update.question, Question::Q4);
        assert_eq!(update.marks.value(), 0);
    }

    #[test]
    fn test_out_of_range_marks_is_validation_error() {
        let err = parse_spoken_command("role 7 q 2 11").unwrap_err();
        assert!(matches!(err, MarksError::ValidationError { .. }));
        assert_eq!(err.to_string(), "Marks must be between 0 and 10");

        let err = parse_spoken_command("roll 7 q 2 99999999999999999999999").unwrap_err();
        assert!(matches!(err, MarksError::ValidationError { .. }));
    }

    #[test]
    fn test_unrecognised_phrase_is_bad_request() {
        let err = parse_spoken_command("hello there").unwrap_err();
        assert!(matches!(err, MarksError::BadRequest { .. }));
        assert_eq!(err.to_string(), USAGE_HINT);

        // 題號只能是 1 到 4
        assert!(parse_spoken_command("roll 3 question 5 6").is_err());
    }
}
