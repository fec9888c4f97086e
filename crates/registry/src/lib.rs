//! Registry crate for the console's command definitions.
//!
//! Holds the static [`CommandCatalog`] and the command subsets that group its
//! entries, predefined and user-created.

pub mod catalog;
pub mod subsets;

pub use catalog::{CommandCatalog, command_ids};
pub use subsets::{
    InMemorySubsetStore, JsonSubsetStore, SubsetStore, SubsetStoreError, all_subsets_for_user, find_subset,
    predefined_subsets,
};
