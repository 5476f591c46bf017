pub mod comments;
pub mod likes;
pub mod notifications;
pub mod videos;

pub use comments::CommentRepository;
pub use likes::{LikeRepository, LikeToggle};
pub use notifications::NotificationRepository;
pub use videos::VideoRepository;
