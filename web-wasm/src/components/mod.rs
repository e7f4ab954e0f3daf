pub mod header;
pub mod progress_bar;
pub mod recipe_detail;
pub mod recipe_gallery;
pub mod upload_modal;
