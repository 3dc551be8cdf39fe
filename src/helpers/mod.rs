//! Helper functions shared by the renderers

mod html;

pub use html::*;
