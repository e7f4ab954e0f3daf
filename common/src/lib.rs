//! Recipe Gallery Common Library
//!
//! Web(WASM)とCLIで共有されるレシピ型・ストア・状態機械

pub mod types;
pub mod error;
pub mod config;
pub mod image_ref;
pub mod templates;
pub mod dataset;
pub mod store;
pub mod scheduler;
pub mod clock;
pub mod upload;
pub mod session;
pub mod gallery;
pub mod detail;

pub use types::{Cuisine, Difficulty, Recipe, RecipePatch};
pub use error::{Error, Result, ValidationError};
pub use config::GalleryConfig;
pub use image_ref::{ImageRef, ImageRefs, MemoryImageRefs};
pub use templates::TemplateCatalog;
pub use dataset::StaticDataset;
pub use store::{RecipeStore, Subscription, WeakRecipeStore};
pub use scheduler::{Scheduler, VirtualScheduler, VirtualTimer};
pub use clock::{Clock, FixedClock};
#[cfg(feature = "clock")]
pub use clock::SystemClock;
pub use upload::{SelectedFile, TickOutcome, UploadFlow, UploadPhase, UploadState, UploadTicket};
pub use session::{SaveBackend, SessionParts, SimulatedSave, UploadSession};
pub use gallery::{merge_recipes, GalleryState, GalleryViewModel};
pub use detail::{DetailState, RecipeDetail};
