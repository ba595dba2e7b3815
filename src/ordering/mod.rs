//! Reading-order rules for chapter files.
//!
//! Chapter and volume numbers embedded in file and folder names
//! (`第十二章`, `第三卷`, `卷三`) decide the order; a natural string
//! comparison breaks ties and orders everything without a marker.

pub mod compare;
pub mod marker;
pub mod natural;
pub mod numeral;

pub use compare::{UNCATEGORIZED, compare_chapter_paths, folder_of};
pub use marker::{MarkerKind, OrderKey, extract_order, last_segment};
pub use natural::natural_cmp;
pub use numeral::{parse_numeral, parse_tens_numeral};
