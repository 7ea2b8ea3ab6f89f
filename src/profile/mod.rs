// Shopline CLI — Profile Module
//
// Picks the one store profile an invocation runs against.

mod alias;
mod error;
mod matching;
mod resolver;

pub use alias::StoreAliases;
pub use error::ProfileError;
pub use matching::{find_matches, is_service_label, lookup_keys, normalize_handle};
pub use resolver::{MatchKind, ProfileResolver, ResolvedProfile, Selector, SelectorSource};
