use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::web::{Data, Path};
use actix_web::{HttpRequest, HttpResponse};
use sqlx::{query_as, PgPool};

use crate::error::Error;
use crate::models::certificate::Certificate;

pub async fn download(req: HttpRequest, id: Path<(i32,)>, db: Data<PgPool>) -> Result<HttpResponse, Error> {
    let id = id.into_inner().0;
    let mut conn = db.acquire().await?;
    let cert: Option<Certificate> = query_as("SELECT * FROM certificates WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut conn)
        .await?;
    let cert = cert.ok_or_else(|| Error::NotFound("Certificate not found".into()))?;
    // content type comes from the stored .pdf extension
    let file = NamedFile::open(&cert.filepath)?.set_content_disposition(ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(cert.filename)],
    });
    Ok(file.into_response(&req))
}
