//! An AVL tree map that remembers insertion order.
//!
//! This crate provides [`AvlTreeMap`], a self-balancing ordered map whose nodes are also
//! threaded into two circular doubly linked lists: one in ascending key order and one in
//! insertion order. On top of the usual O(log n) lookup, insertion and removal it offers:
//!
//! - [`get_at`](AvlTreeMap::get_at) - Get the entry at a given sorted position
//! - [`rank_of`](AvlTreeMap::rank_of) - Get the sorted position of a key
//! - Indexing by [`Rank`] - e.g., `map[Rank(0)]` for the smallest key
//! - [`first_inserted`](AvlTreeMap::first_inserted) and
//!   [`last_inserted`](AvlTreeMap::last_inserted) - The oldest and newest entries
//! - [`for_each`](AvlTreeMap::for_each) and [`iter`](AvlTreeMap::iter) - Walks in key or
//!   insertion order, either direction, in O(1) per step (see [`ForEachMode`])
//! - [`compact_balance`](AvlTreeMap::compact_balance) - Rebuild into a minimal-height tree
//!
//! # Example
//!
//! ```
//! use chrono_avl::{AvlTreeMap, CollisionPolicy, Config, ForEachMode, Rank};
//!
//! let config = Config::ordered(0).on_collision(CollisionPolicy::Replace);
//! let mut scores = AvlTreeMap::new(config).unwrap();
//! scores.put("Carol", 92);
//! scores.put("Alice", 100);
//! scores.put("Bob", 85);
//!
//! // Keyed access.
//! assert_eq!(scores.get(&"Bob"), Some(&85));
//! assert_eq!(scores.len(), 3);
//!
//! // Order-statistic access (O(log n)).
//! assert_eq!(scores.get_at(1), Ok((&"Bob", &85)));
//! assert_eq!(scores.rank_of(&"Carol"), Some(2));
//! assert_eq!(scores[Rank(0)], 100);
//!
//! // Insertion order is tracked alongside key order.
//! let newest_first: Vec<_> = scores.iter(ForEachMode::Stack).map(|(name, _)| *name).collect();
//! assert_eq!(newest_first, ["Bob", "Alice", "Carol"]);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Pluggable ordering** - Keys are compared by a caller-supplied comparator
//! - **Collision policies** - Replace the stored value, or keep it and ignore the insert
//!
//! # Implementation
//!
//! Nodes live in a slot arena and refer to each other through compact handles instead of
//! pointers. Each node caches its height and the sizes of both subtrees, so rebalancing and
//! rank queries never walk more than one root-to-leaf path.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod config;
mod error;
mod order_statistic;
mod raw;
mod traversal;

pub mod avl_tree_map;

pub use avl_tree_map::AvlTreeMap;
pub use config::{CollisionPolicy, Comparator, Config, KeyExtractor};
pub use error::Error;
pub use order_statistic::Rank;
pub use traversal::ForEachMode;
