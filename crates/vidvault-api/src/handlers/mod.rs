pub mod health;
pub mod video_sign;
pub mod video_upload;
