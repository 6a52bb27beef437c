pub mod etl;
pub mod freshness;
pub mod image_resolver;
pub mod normalizer;
pub mod pipeline;
pub mod text_extractor;

pub use crate::domain::model::{
    AggregateReport, ExtractedContent, Menu, Placeholder, Restaurant, ScrapingMode,
};
pub use crate::domain::ports::{
    Browser, Delivery, DeliveryStatus, Element, LoadOutcome, Locator, Pipeline, Storage,
    UrlShortener,
};
pub use crate::utils::error::Result;
