pub mod certificate;
pub mod question;
pub mod response;
