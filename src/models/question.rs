use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    ShortText,
    LongText,
    Email,
    Choice,
    File,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortText => "short_text",
            Self::LongText => "long_text",
            Self::Email => "email",
            Self::Choice => "choice",
            Self::File => "file",
        }
    }
}

impl FromStr for QuestionType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short_text" => Ok(Self::ShortText),
            "long_text" => Ok(Self::LongText),
            "email" => Ok(Self::Email),
            "choice" => Ok(Self::Choice),
            "file" => Ok(Self::File),
            _ => Err(Error::InvalidInput(format!("invalid question type({})", s))),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, Default)]
pub struct Question {
    pub id: i32,
    pub name: String,
    #[sqlx(rename = "type")]
    pub type_: String,
    pub required: bool,
    pub text: String,
    pub description: Option<String>,
    pub multiple_choice: bool,
    pub file_format: Option<String>,
    pub max_file_size: Option<i32>,
    pub max_file_size_unit: Option<String>,
    pub multiple_files: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct QuestionOption {
    pub id: i32,
    pub question_id: i32,
    pub value: String,
    pub text: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_question_type_round_trip() {
        for s in ["short_text", "long_text", "email", "choice", "file"] {
            let t: QuestionType = s.parse().unwrap();
            assert_eq!(t.as_str(), s);
        }
        assert!("single".parse::<QuestionType>().is_err());
    }
}
