pub mod gallery_item;
pub mod identity;
pub mod records;

pub use gallery_item::*;
pub use identity::*;
pub use records::*;
