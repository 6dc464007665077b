mod error;
mod handlers;
pub mod models;
pub mod request;
mod seed;
mod storer;

use actix_web::middleware::Logger;
use actix_web::web::{get, put, scope, Data};
use actix_web::{App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use storer::LocalStorer;

#[actix_web::main]
async fn main() -> Result<(), std::io::Error> {
    dotenv::dotenv().ok();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "actix_web=info,intake=info");
    }
    env_logger::init();
    let database_url = dotenv::var("DATABASE_URL").expect("environment variable DATABASE_URL not been set");
    let upload_path = dotenv::var("UPLOAD_PATH").expect("environment variable UPLOAD_PATH not been set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("failed to connect to database");
    seed::ensure_schema(&pool).await.expect("failed to create tables");
    seed::seed_questions(&pool).await.expect("failed to seed questions");
    let storer = Data::new(LocalStorer::new(&upload_path));
    storer.ensure_dirs().expect("failed to create upload directories");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(Data::new(pool.clone()))
            .app_data(storer.clone())
            .route("/", get().to(handlers::index))
            .service(
                scope("api").service(
                    scope("questions")
                        .route("", get().to(handlers::question::list))
                        .service(
                            scope("responses")
                                .route("", put().to(handlers::response::submit::<LocalStorer>))
                                .route("", get().to(handlers::response::list))
                                .route("certificates/{id}", get().to(handlers::certificate::download)),
                        ),
                ),
            )
    })
    .bind(("0.0.0.0", 8000))?
    .run()
    .await
}
