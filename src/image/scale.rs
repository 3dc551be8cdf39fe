//! Density suffixes in image filenames (`photo_2x.png`)

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SCALE_SUFFIX: Regex = Regex::new(r"_([0-9])x").expect("valid scale regex");
}

/// Divisor applied to measured dimensions of high-density assets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleFactor(u8);

impl ScaleFactor {
    /// Parse the scale from the last `_<digit>x` in the URL's filename.
    ///
    /// Returns `None` when there is no marker, or the last marker is `_0x`.
    pub fn from_url(url: &str) -> Option<Self> {
        let normalized = url.replace('\\', "/");
        let file_name = normalized.rsplit('/').next().unwrap_or_default();

        let digit = SCALE_SUFFIX
            .captures_iter(file_name)
            .last()
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u8>().ok())?;

        (digit > 0).then_some(ScaleFactor(digit))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn apply(self, width: usize, height: usize) -> (f64, f64) {
        let scale = f64::from(self.0);
        (width as f64 / scale, height as f64 / scale)
    }
}
