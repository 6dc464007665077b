use log::info;
use sqlx::{query, query_as, query_scalar, PgPool, Postgres, QueryBuilder, Transaction};

use crate::error::Error;
use crate::models::question::QuestionType;

const SCHEMA: [&str; 5] = [
    "CREATE TABLE IF NOT EXISTS questions (
        id SERIAL PRIMARY KEY,
        name VARCHAR(100) UNIQUE NOT NULL,
        type VARCHAR(20) NOT NULL,
        required BOOLEAN NOT NULL DEFAULT TRUE,
        text VARCHAR(500) NOT NULL,
        description TEXT,
        multiple_choice BOOLEAN NOT NULL DEFAULT FALSE,
        file_format VARCHAR(20),
        max_file_size INTEGER,
        max_file_size_unit VARCHAR(5),
        multiple_files BOOLEAN NOT NULL DEFAULT FALSE
    )",
    "CREATE TABLE IF NOT EXISTS question_options (
        id SERIAL PRIMARY KEY,
        question_id INTEGER NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
        value VARCHAR(100) NOT NULL,
        text VARCHAR(200) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS responses (
        id SERIAL PRIMARY KEY,
        full_name VARCHAR(200) NOT NULL,
        email_address VARCHAR(100) NOT NULL,
        description TEXT NOT NULL,
        gender VARCHAR(20) NOT NULL,
        programming_stack VARCHAR(500) NOT NULL,
        date_responded TIMESTAMP NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS responses_email_address_idx ON responses (email_address)",
    "CREATE TABLE IF NOT EXISTS certificates (
        id SERIAL PRIMARY KEY,
        response_id INTEGER NOT NULL REFERENCES responses(id) ON DELETE CASCADE,
        filename VARCHAR(255) NOT NULL,
        filepath VARCHAR(500) UNIQUE NOT NULL
    )",
];

pub async fn ensure_schema(pool: &PgPool) -> Result<(), Error> {
    let mut conn = pool.acquire().await?;
    for stmt in SCHEMA {
        query(stmt).execute(&mut conn).await?;
    }
    Ok(())
}

#[derive(Debug)]
pub struct FileRules {
    pub format: &'static str,
    pub max_file_size: i32,
    pub max_file_size_unit: &'static str,
    pub multiple: bool,
}

#[derive(Debug)]
pub struct SeedQuestion {
    pub name: &'static str,
    pub type_: QuestionType,
    pub required: bool,
    pub text: &'static str,
    pub description: &'static str,
    pub multiple_choice: bool,
    pub file: Option<FileRules>,
    pub options: &'static [(&'static str, &'static str)],
}

/// The fixed six-question survey definition.
pub fn questionnaire() -> Vec<SeedQuestion> {
    vec![
        SeedQuestion {
            name: "full_name",
            type_: QuestionType::ShortText,
            required: true,
            text: "What is your full name?",
            description: "[Surname] [First Name] [Other Names]",
            multiple_choice: false,
            file: None,
            options: &[],
        },
        SeedQuestion {
            name: "email_address",
            type_: QuestionType::Email,
            required: true,
            text: "What is your email address?",
            description: "",
            multiple_choice: false,
            file: None,
            options: &[],
        },
        SeedQuestion {
            name: "description",
            type_: QuestionType::LongText,
            required: true,
            text: "Tell us a bit more about yourself",
            description: "",
            multiple_choice: false,
            file: None,
            options: &[],
        },
        SeedQuestion {
            name: "gender",
            type_: QuestionType::Choice,
            required: true,
            text: "What is your gender?",
            description: "",
            multiple_choice: false,
            file: None,
            options: &[("MALE", "Male"), ("FEMALE", "Female"), ("OTHER", "Other")],
        },
        SeedQuestion {
            name: "programming_stack",
            type_: QuestionType::Choice,
            required: true,
            text: "What programming stack are you familiar with?",
            description: "You can select multiple",
            multiple_choice: true,
            file: None,
            options: &[
                ("REACT", "React JS"),
                ("ANGULAR", "Angular JS"),
                ("VUE", "Vue JS"),
                ("SVELTE", "Svelte"),
                ("SQL", "SQL"),
                ("POSTGRES", "Postgres"),
                ("MYSQL", "MySQL"),
                ("MSSQL", "Microsoft SQL Server"),
                ("JAVA", "Java"),
                ("PHP", "PHP"),
                ("GO", "Go"),
                ("RUST", "Rust"),
                ("PYTHON", "Python"),
            ],
        },
        SeedQuestion {
            name: "certificates",
            type_: QuestionType::File,
            required: true,
            text: "Upload any of your certificates?",
            description: "You can upload multiple (.pdf)",
            multiple_choice: false,
            file: Some(FileRules {
                format: ".pdf",
                max_file_size: 1,
                max_file_size_unit: "mb",
                multiple: true,
            }),
            options: &[],
        },
    ]
}

async fn insert_question(tx: &mut Transaction<'_, Postgres>, q: &SeedQuestion) -> Result<i32, Error> {
    let (id,): (i32,) = query_as(
        "INSERT INTO questions (name, type, required, text, description, multiple_choice, file_format, max_file_size, max_file_size_unit, multiple_files)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING id",
    )
    .bind(q.name)
    .bind(q.type_.as_str())
    .bind(q.required)
    .bind(q.text)
    .bind((!q.description.is_empty()).then_some(q.description))
    .bind(q.multiple_choice)
    .bind(q.file.as_ref().map(|f| f.format))
    .bind(q.file.as_ref().map(|f| f.max_file_size))
    .bind(q.file.as_ref().map(|f| f.max_file_size_unit))
    .bind(q.file.as_ref().map(|f| f.multiple).unwrap_or(false))
    .fetch_one(tx)
    .await?;
    Ok(id)
}

/// Idempotent: an already-populated questions table is left untouched.
pub async fn seed_questions(pool: &PgPool) -> Result<(), Error> {
    let mut conn = pool.acquire().await?;
    let existing: i64 = query_scalar("SELECT COUNT(*) FROM questions").fetch_one(&mut conn).await?;
    drop(conn);
    if existing > 0 {
        info!("questions table already populated, skipping seeding");
        return Ok(());
    }
    let questions = questionnaire();
    let mut tx = pool.begin().await?;
    for q in &questions {
        let id = insert_question(&mut tx, q).await?;
        if !q.options.is_empty() {
            QueryBuilder::new("INSERT INTO question_options (question_id, value, text)")
                .push_values(q.options, |mut b, (value, text)| {
                    b.push_bind(id).push_bind(*value).push_bind(*text);
                })
                .build()
                .execute(&mut tx)
                .await?;
        }
    }
    tx.commit().await?;
    info!("seeded {} questions", questions.len());
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_questionnaire_shape() {
        let questions = questionnaire();
        assert_eq!(questions.len(), 6);
        for q in &questions {
            match q.type_ {
                QuestionType::Choice => assert!(!q.options.is_empty()),
                QuestionType::File => assert!(q.file.is_some()),
                _ => {
                    assert!(q.options.is_empty());
                    assert!(q.file.is_none());
                }
            }
        }
    }

    #[test]
    fn test_questionnaire_names_are_unique() {
        let questions = questionnaire();
        let mut names: Vec<_> = questions.iter().map(|q| q.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), questions.len());
    }

    #[test]
    fn test_gender_and_stack_options() {
        let questions = questionnaire();
        let gender = questions.iter().find(|q| q.name == "gender").unwrap();
        assert_eq!(gender.options.len(), 3);
        assert!(!gender.multiple_choice);
        let stack = questions.iter().find(|q| q.name == "programming_stack").unwrap();
        assert_eq!(stack.options.len(), 13);
        assert!(stack.multiple_choice);
    }
}
