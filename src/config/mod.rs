//! Configuration module

mod site;

pub use site::FetchConfig;
pub use site::HighlightConfig;
pub use site::ImageSizeConfig;
pub use site::MarkdownConfig;
pub use site::SiteConfig;
