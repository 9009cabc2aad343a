/// Image sources for ansimage: decoding from disk and pre-scaling to the
/// character grid.

pub mod image;
pub mod resize;
