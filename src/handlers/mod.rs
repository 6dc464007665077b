pub mod certificate;
pub mod question;
pub mod response;

use actix_web::web::Json;
use serde_json::{json, Value};

pub async fn index() -> Json<Value> {
    Json(json!({ "message": "Survey API is running" }))
}

pub(crate) fn yes_no(b: bool) -> String {
    if b {
        "yes".into()
    } else {
        "no".into()
    }
}

#[cfg(test)]
mod test {
    use super::yes_no;

    #[test]
    fn test_yes_no() {
        assert_eq!(yes_no(true), "yes");
        assert_eq!(yes_no(false), "no");
    }
}
