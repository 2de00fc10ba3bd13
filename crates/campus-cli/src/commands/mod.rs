pub mod auth;
pub mod dispatch;
pub mod grade;
pub mod profile;
pub mod serve;
