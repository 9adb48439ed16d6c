mod attachment;
mod comment;
mod custom_view;
mod cycle;
mod document;
mod favorite;
mod initiative;
mod issue;
mod label;
mod milestone;
mod notification;
mod priority;
mod project;
mod team;
mod user;

pub use attachment::Attachment;
pub use comment::Comment;
pub use custom_view::CustomView;
pub use cycle::Cycle;
pub use document::Document;
pub use favorite::{Favorite, FavoriteIssueRef, FavoriteProjectRef};
pub use initiative::Initiative;
pub use issue::{Issue, IssueRef, WorkflowState};
pub use label::Label;
pub use milestone::ProjectMilestone;
pub use notification::Notification;
pub use priority::Priority;
pub use project::Project;
pub use team::Team;
pub use user::User;
