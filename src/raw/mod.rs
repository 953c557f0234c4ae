mod arena;
mod compact;
mod handle;
mod node;
mod raw_avl_tree_map;
mod rotation;

pub(crate) use handle::Handle;
pub(crate) use raw_avl_tree_map::{InsertOutcome, RawAvlTreeMap};
