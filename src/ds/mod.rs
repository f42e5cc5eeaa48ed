pub mod indexed_heap;
pub mod item;
pub mod sequence;

pub use indexed_heap::IndexedHeap;
pub use item::{Item, ItemKey, Moved};
pub use sequence::PersistentSequence;
