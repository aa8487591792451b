//! Pure computations turning activity entries into dashboard statistics.
//!
//! Everything here is synchronous and free of I/O. The current moment is always passed in by the
//! caller, so results depend on nothing but the arguments.
//!
//! [normalize::normalize] produces the [entry::ActivityEntry] list every other module consumes.
//! Apart from sharing [rollup::rollup] and [streak::active_dates] as building blocks, the
//! computations are independent of each other.

pub mod comparison;
pub mod entry;
pub mod goals;
pub mod heatmap;
pub mod normalize;
pub mod periods;
pub mod rollup;
pub mod streak;
