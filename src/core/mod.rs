pub mod engine;
pub mod fetcher;
pub mod rank;
pub mod render;

pub use crate::domain::model::{DeliveryReceipt, Digest, LookbackWindow, Paper, Source};
pub use crate::domain::ports::{PaperSource, Pipeline, Storage};
pub use crate::utils::error::Result;
