use crate::utils::error::{MarksError, Result};
use crate::utils::validation::validate_range;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

pub const MIN_MARKS: u8 = 0;
pub const MAX_MARKS: u8 = 10;

/// One of the four question slots on a student's sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Question {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Question {
    pub const ALL: [Question; 4] = [Question::Q1, Question::Q2, Question::Q3, Question::Q4];

    pub fn from_index(index: i64) -> Result<Self> {
        match index {
            1 => Ok(Self::Q1),
            2 => Ok(Self::Q2),
            3 => Ok(Self::Q3),
            4 => Ok(Self::Q4),
            _ => Err(MarksError::validation("Question must be between 1 and 4")),
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Self::Q1 => 1,
            Self::Q2 => 2,
            Self::Q3 => 3,
            Self::Q4 => 4,
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.index())
    }
}

/// A score in `MIN_MARKS..=MAX_MARKS`. The only way to build one is through
/// [`Marks::new`], so every stored slot is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Marks(u8);

impl Marks {
    pub fn new(value: i64) -> Result<Self> {
        validate_range(
            value,
            i64::from(MIN_MARKS),
            i64::from(MAX_MARKS),
            "Marks must be between 0 and 10",
        )?;
        // 範圍已驗證，轉換不會失敗
        Ok(Self(value as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Marks {
    type Error = MarksError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Marks> for u8 {
    fn from(marks: Marks) -> Self {
        marks.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub q1: Option<Marks>,
    pub q2: Option<Marks>,
    pub q3: Option<Marks>,
    pub q4: Option<Marks>,
}

impl StudentRecord {
    pub fn get(&self, question: Question) -> Option<Marks> {
        match question {
            Question::Q1 => self.q1,
            Question::Q2 => self.q2,
            Question::Q3 => self.q3,
            Question::Q4 => self.q4,
        }
    }

    pub fn set(&mut self, question: Question, marks: Marks) {
        let slot = match question {
            Question::Q1 => &mut self.q1,
            Question::Q2 => &mut self.q2,
            Question::Q3 => &mut self.q3,
            Question::Q4 => &mut self.q4,
        };
        *slot = Some(marks);
    }

    /// Best-of-pair total. See [`crate::core::aggregation::best_of_pair`].
    pub fn total(&self) -> u8 {
        crate::core::aggregation::best_of_pair(self)
    }
}

/// Full store contents, keyed by roll number.
pub type MarksSnapshot = BTreeMap<String, StudentRecord>;

/// A validated request to write one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarksUpdate {
    pub roll_number: String,
    pub question: Question,
    pub marks: Marks,
}

impl MarksUpdate {
    pub fn new(roll_number: impl Into<String>, question: i64, marks: i64) -> Result<Self> {
        // 學號以原字串為鍵，不做修剪；只拒絕空白
        let roll_number = roll_number.into();
        if roll_number.trim().is_empty() {
            return Err(MarksError::bad_request("rollNumber cannot be empty"));
        }

        Ok(Self {
            roll_number,
            question: Question::from_index(question)?,
            marks: Marks::new(marks)?,
        })
    }
}

/// What an update hands back: the post-update snapshot and the new total for
/// the roll number that was written.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub success: bool,
    pub marks_data: MarksSnapshot,
    pub total: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub roll_number: String,
    pub scores: [Option<u8>; 4],
    pub total: u8,
}

impl ExportRow {
    pub const HEADERS: [&'static str; 6] = ["Roll Number", "Q1", "Q2", "Q3", "Q4", "Total"];

    pub fn from_record(roll_number: &str, record: &StudentRecord) -> Self {
        let scores = Question::ALL.map(|q| record.get(q).map(Marks::value));
        Self {
            roll_number: roll_number.to_string(),
            scores,
            total: record.total(),
        }
    }
}

/// Orders roll numbers numerically when both parse as integers, falling
/// back to plain string order otherwise. Numeric keys sort before the rest.
pub fn compare_roll_numbers(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
