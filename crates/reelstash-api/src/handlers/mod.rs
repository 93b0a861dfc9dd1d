pub mod thumbnails;
pub mod video_create;
pub mod video_get;
pub mod video_upload;
