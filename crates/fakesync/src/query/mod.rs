//! Query filters accepted by the listing endpoints

mod mail_query;

pub use mail_query::{MailQuery, parse_mail_query};
