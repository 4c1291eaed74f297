//! Submittal packet assembly.
//!
//! A packet is a cover page, a table of contents page, and the pages of
//! each resolved document in reference order. Front matter always fills
//! pages 1 and 2; the first document starts on page 3.
//!
//! - [`builder`]: the three-pass build driver.
//! - [`front_matter`]: cover and table of contents drawing.
//! - [`pages`]: the output page tree and page import.
//! - [`accounting`]: start-page numbering.
//! - [`bookmarks`] and [`metadata`]: outline and Info dictionary.

pub mod accounting;
pub mod bookmarks;
pub mod builder;
pub mod front_matter;
pub mod metadata;
pub mod pages;

pub use accounting::{PageContribution, ResolutionReport};
pub use builder::{BuildOptions, PacketBuilder, PacketOutput};
