use std::path::Path;

use actix_multipart::Multipart;
use actix_web::web::{Data, Json, Query};
use chrono::Utc;
use futures_util::TryStreamExt;
use serde::Serialize;
use sqlx::{query, query_as, query_scalar, FromRow, PgPool, Postgres, Transaction};

use crate::error::Error;
use crate::models::response::SurveyResponse;
use crate::request::ListParams;
use crate::storer::{FileStorer, StagedFile};

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug)]
struct UploadedFile {
    filename: String,
    content: Vec<u8>,
}

#[derive(Debug)]
struct SubmissionForm {
    full_name: String,
    email_address: String,
    description: String,
    gender: String,
    programming_stack: String,
    certificates: Vec<UploadedFile>,
}

fn text_field(name: &str, content: Vec<u8>) -> Result<String, Error> {
    String::from_utf8(content).map_err(|_| Error::InvalidInput(format!("field {} is not valid utf-8", name)))
}

fn required(name: &str, value: Option<String>) -> Result<String, Error> {
    value.filter(|v| !v.is_empty()).ok_or_else(|| Error::InvalidInput(format!("field {} is required", name)))
}

impl SubmissionForm {
    async fn parse(mut payload: Multipart) -> Result<Self, Error> {
        let mut full_name = None;
        let mut email_address = None;
        let mut description = None;
        let mut gender = None;
        let mut programming_stack = None;
        let mut certificates = Vec::new();
        while let Some(mut field) = payload.try_next().await? {
            let name = field.name().to_owned();
            let filename = field.content_disposition().get_filename().map(|f| f.to_owned());
            let mut content = Vec::new();
            while let Some(chunk) = field.try_next().await? {
                content.extend_from_slice(&chunk);
            }
            match name.as_str() {
                "certificates" => {
                    let filename = filename.ok_or_else(|| Error::InvalidInput("certificates must be file fields".into()))?;
                    certificates.push(UploadedFile { filename, content });
                }
                "full_name" => full_name = Some(text_field(&name, content)?),
                "email_address" => email_address = Some(text_field(&name, content)?),
                "description" => description = Some(text_field(&name, content)?),
                "gender" => gender = Some(text_field(&name, content)?),
                "programming_stack" => programming_stack = Some(text_field(&name, content)?),
                _ => {}
            }
        }
        if certificates.is_empty() {
            return Err(Error::InvalidInput("at least one certificate file is required".into()));
        }
        Ok(Self {
            full_name: required("full_name", full_name)?,
            email_address: required("email_address", email_address)?,
            description: required("description", description)?,
            gender: required("gender", gender)?,
            programming_stack: required("programming_stack", programming_stack)?,
            certificates,
        })
    }
}

fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename).extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase())
}

async fn stage_certificate<S: FileStorer>(
    tx: &mut Transaction<'_, Postgres>,
    storer: &S,
    response_id: i32,
    cert: &UploadedFile,
) -> Result<StagedFile, Error> {
    if file_extension(&cert.filename).as_deref() != Some("pdf") {
        return Err(Error::InvalidInput("Only PDF files are allowed".into()));
    }
    let file = storer.stage(&cert.content, "pdf")?;
    if let Err(e) = query("INSERT INTO certificates (response_id, filename, filepath) VALUES ($1, $2, $3)")
        .bind(response_id)
        .bind(&cert.filename)
        .bind(file.final_path().display().to_string())
        .execute(&mut *tx)
        .await
    {
        storer.discard(&file).ok();
        return Err(e.into());
    }
    Ok(file)
}

// Files are staged in submission order; the first invalid one aborts the whole
// batch and discards everything staged so far.
async fn stage_certificates<S: FileStorer>(
    tx: &mut Transaction<'_, Postgres>,
    storer: &S,
    response_id: i32,
    certificates: &[UploadedFile],
) -> Result<Vec<StagedFile>, Error> {
    let mut staged = Vec::with_capacity(certificates.len());
    for cert in certificates {
        match stage_certificate(tx, storer, response_id, cert).await {
            Ok(file) => staged.push(file),
            Err(e) => {
                for f in &staged {
                    storer.discard(f).ok();
                }
                return Err(e);
            }
        }
    }
    Ok(staged)
}

#[derive(Debug, Serialize)]
pub struct CertificateNames {
    certificate: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionReply {
    full_name: String,
    email_address: String,
    description: String,
    gender: String,
    programming_stack: String,
    certificates: CertificateNames,
    date_responded: String,
}

pub async fn submit<S: FileStorer + 'static>(payload: Multipart, db: Data<PgPool>, storer: Data<S>) -> Result<Json<SubmissionReply>, Error> {
    let form = SubmissionForm::parse(payload).await?;
    let now = Utc::now().naive_utc();
    let mut tx = db.begin().await?;
    let (response_id,): (i32,) = query_as(
        "INSERT INTO responses (full_name, email_address, description, gender, programming_stack, date_responded)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id",
    )
    .bind(&form.full_name)
    .bind(&form.email_address)
    .bind(&form.description)
    .bind(&form.gender)
    .bind(&form.programming_stack)
    .bind(now)
    .fetch_one(&mut tx)
    .await?;
    let staged = match stage_certificates(&mut tx, storer.get_ref(), response_id, &form.certificates).await {
        Ok(staged) => staged,
        Err(e) => {
            tx.rollback().await.ok();
            return Err(e);
        }
    };
    if let Err(e) = tx.commit().await {
        for f in &staged {
            storer.discard(f).ok();
        }
        return Err(e.into());
    }
    for f in &staged {
        storer.promote(f)?;
    }
    Ok(Json(SubmissionReply {
        full_name: form.full_name,
        email_address: form.email_address,
        description: form.description,
        gender: form.gender,
        programming_stack: form.programming_stack,
        certificates: CertificateNames {
            certificate: form.certificates.into_iter().map(|c| c.filename).collect(),
        },
        date_responded: now.format(DATE_FORMAT).to_string(),
    }))
}

#[derive(Debug, Serialize, FromRow)]
pub struct CertificateRef {
    id: i32,
    text: String,
}

#[derive(Debug, Serialize)]
pub struct CertificateRefs {
    certificate: Vec<CertificateRef>,
}

#[derive(Debug, Serialize)]
pub struct ResponseItem {
    response_id: i32,
    full_name: String,
    email_address: String,
    description: String,
    gender: String,
    programming_stack: String,
    certificates: CertificateRefs,
    date_responded: String,
}

#[derive(Debug, Serialize)]
pub struct ResponsePage {
    current_page: i64,
    last_page: i64,
    page_size: i64,
    total_count: i64,
    question_response: Vec<ResponseItem>,
}

fn last_page(total: i64, page_size: i64) -> i64 {
    (total + page_size - 1) / page_size
}

pub async fn list(params: Query<ListParams>, db: Data<PgPool>) -> Result<Json<ResponsePage>, Error> {
    let pagination = params.into_inner().validate()?;
    let mut conn = db.acquire().await?;
    let total: i64 = match &pagination.email_address {
        Some(email) => {
            query_scalar("SELECT COUNT(*) FROM responses WHERE email_address = $1")
                .bind(email)
                .fetch_one(&mut conn)
                .await?
        }
        None => query_scalar("SELECT COUNT(*) FROM responses").fetch_one(&mut conn).await?,
    };
    let offset = (pagination.page - 1) * pagination.page_size;
    let rows: Vec<SurveyResponse> = match &pagination.email_address {
        Some(email) => {
            query_as("SELECT * FROM responses WHERE email_address = $1 ORDER BY date_responded DESC OFFSET $2 LIMIT $3")
                .bind(email)
                .bind(offset)
                .bind(pagination.page_size)
                .fetch_all(&mut conn)
                .await?
        }
        None => {
            query_as("SELECT * FROM responses ORDER BY date_responded DESC OFFSET $1 LIMIT $2")
                .bind(offset)
                .bind(pagination.page_size)
                .fetch_all(&mut conn)
                .await?
        }
    };
    let mut items = Vec::with_capacity(rows.len());
    for r in rows {
        let certs: Vec<CertificateRef> = query_as("SELECT id, filename AS text FROM certificates WHERE response_id = $1 ORDER BY id")
            .bind(r.id)
            .fetch_all(&mut conn)
            .await?;
        items.push(ResponseItem {
            response_id: r.id,
            full_name: r.full_name,
            email_address: r.email_address,
            description: r.description,
            gender: r.gender,
            programming_stack: r.programming_stack,
            certificates: CertificateRefs { certificate: certs },
            date_responded: r.date_responded.format(DATE_FORMAT).to_string(),
        });
    }
    Ok(Json(ResponsePage {
        current_page: pagination.page,
        last_page: last_page(total, pagination.page_size),
        page_size: pagination.page_size,
        total_count: total,
        question_response: items,
    }))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("cert.pdf").as_deref(), Some("pdf"));
        assert_eq!(file_extension("CERT.PDF").as_deref(), Some("pdf"));
        assert_eq!(file_extension("resume.docx").as_deref(), Some("docx"));
        assert_eq!(file_extension("noextension"), None);
        assert_eq!(file_extension("archive.tar.pdf").as_deref(), Some("pdf"));
    }

    #[test]
    fn test_last_page() {
        assert_eq!(last_page(25, 10), 3);
        assert_eq!(last_page(30, 10), 3);
        assert_eq!(last_page(31, 10), 4);
        assert_eq!(last_page(0, 10), 0);
        assert_eq!(last_page(1, 100), 1);
    }

    #[test]
    fn test_required_rejects_empty() {
        assert!(required("gender", None).is_err());
        assert!(required("gender", Some("".into())).is_err());
        assert_eq!(required("gender", Some("MALE".into())).unwrap(), "MALE");
    }

    #[test]
    fn test_submission_reply_shape() {
        let reply = SubmissionReply {
            full_name: "Jane Doe".into(),
            email_address: "jane@example.com".into(),
            description: "hello".into(),
            gender: "FEMALE".into(),
            programming_stack: "RUST,SQL".into(),
            certificates: CertificateNames {
                certificate: vec!["cert.pdf".into()],
            },
            date_responded: "2024-01-01 12:00:00".into(),
        };
        let v = serde_json::to_value(&reply).unwrap();
        assert_eq!(v["certificates"]["certificate"][0], "cert.pdf");
        assert_eq!(v["date_responded"], "2024-01-01 12:00:00");
    }
}
