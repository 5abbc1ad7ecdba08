//! Providers of raw depth frames. Real sensing sessions live outside this
//! crate; anything that can hand over a [`RawDepthSample`] on demand plugs in
//! through [`DepthSource`].

mod manifest;
mod synthetic;

pub use manifest::{parse_manifest, ManifestEntry, ManifestSource};
pub use synthetic::SyntheticSource;

use crate::depth::RawDepthSample;
use crate::error::Result;

pub trait DepthSource {
    /// Next frame, or `None` once the source is exhausted.
    fn next_sample(&mut self) -> Result<Option<RawDepthSample>>;
}
