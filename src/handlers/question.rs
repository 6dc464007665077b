use actix_web::web::{Data, Json};
use serde::Serialize;
use sqlx::{query_as, PgPool};

use crate::error::Error;
use crate::handlers::yes_no;
use crate::models::question::{Question, QuestionOption, QuestionType};

#[derive(Debug, Serialize)]
pub struct OptionItem {
    value: String,
    text: String,
}

#[derive(Debug, Serialize)]
pub struct OptionBlock {
    multiple: String,
    option: Vec<OptionItem>,
}

#[derive(Debug, Serialize)]
pub struct FileProperties {
    format: String,
    max_file_size: i32,
    max_file_size_unit: String,
    multiple: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionItem {
    name: String,
    #[serde(rename = "type")]
    type_: String,
    required: String,
    text: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OptionBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_properties: Option<FileProperties>,
}

#[derive(Debug, Serialize)]
pub struct QuestionList {
    question: Vec<QuestionItem>,
}

pub async fn list(db: Data<PgPool>) -> Result<Json<QuestionList>, Error> {
    let mut conn = db.acquire().await?;
    let questions: Vec<Question> = query_as("SELECT * FROM questions ORDER BY id").fetch_all(&mut conn).await?;
    let mut items = Vec::with_capacity(questions.len());
    for q in questions {
        let options = if q.type_ == QuestionType::Choice.as_str() {
            let opts: Vec<QuestionOption> = query_as("SELECT * FROM question_options WHERE question_id = $1 ORDER BY id")
                .bind(q.id)
                .fetch_all(&mut conn)
                .await?;
            Some(OptionBlock {
                multiple: yes_no(q.multiple_choice),
                option: opts.into_iter().map(|o| OptionItem { value: o.value, text: o.text }).collect(),
            })
        } else {
            None
        };
        let file_properties = if q.type_ == QuestionType::File.as_str() {
            Some(FileProperties {
                format: q.file_format.unwrap_or_default(),
                max_file_size: q.max_file_size.unwrap_or_default(),
                max_file_size_unit: q.max_file_size_unit.unwrap_or_default(),
                multiple: yes_no(q.multiple_files),
            })
        } else {
            None
        };
        items.push(QuestionItem {
            name: q.name,
            type_: q.type_,
            required: yes_no(q.required),
            text: q.text,
            description: q.description.unwrap_or_default(),
            options,
            file_properties,
        });
    }
    Ok(Json(QuestionList { question: items }))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_choice_question_serialization() {
        let item = QuestionItem {
            name: "gender".into(),
            type_: "choice".into(),
            required: yes_no(true),
            text: "What is your gender?".into(),
            description: "".into(),
            options: Some(OptionBlock {
                multiple: yes_no(false),
                option: vec![OptionItem {
                    value: "MALE".into(),
                    text: "Male".into(),
                }],
            }),
            file_properties: None,
        };
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v["type"], "choice");
        assert_eq!(v["required"], "yes");
        assert_eq!(v["options"]["multiple"], "no");
        assert_eq!(v["options"]["option"][0]["value"], "MALE");
        // file_properties must be absent, not null
        assert!(v.get("file_properties").is_none());
    }

    #[test]
    fn test_plain_question_serialization() {
        let item = QuestionItem {
            name: "full_name".into(),
            type_: "short_text".into(),
            required: yes_no(true),
            text: "What is your full name?".into(),
            description: "[Surname] [First Name] [Other Names]".into(),
            options: None,
            file_properties: None,
        };
        let v = serde_json::to_value(&item).unwrap();
        assert!(v.get("options").is_none());
        assert!(v.get("file_properties").is_none());
    }
}
