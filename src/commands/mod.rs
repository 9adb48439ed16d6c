pub mod attachments;
pub mod auth;
pub mod comments;
pub mod cycles;
pub mod documents;
pub mod favorites;
pub mod initiatives;
pub mod issues;
pub mod labels;
pub mod notifications;
pub mod projects;
pub mod teams;
pub mod users;
pub mod views;
