use crate::domain::model::{Marks, Question, StudentRecord};

fn score(record: &StudentRecord, question: Question) -> u8 {
    record.get(question).map(Marks::value).unwrap_or(0)
}

/// `max(q1, q2) + max(q3, q4)`, unset slots counting as 0. Always in `0..=20`.
pub fn best_of_pair(record: &StudentRecord) -> u8 {
    let first_pair = score(record, Question::Q1).max(score(record, Question::Q2));
    let second_pair = score(record, Question::Q3).max(score(record, Question::Q4));
    first_pair + second_pair
}
