//! `ax-network`: the road-network graph store and everything that mutates
//! or slices it.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`network`]    | `RoadNetworkBuilder` (append phase), `RoadNetwork` (CSR + R-tree, read-only) |
//! | [`subgraph`]   | `Subgraph`: bounded, locally re-indexed view for routing   |
//! | [`components`] | Union-find connected components                            |
//! | [`attach`]     | Network attachment of off-network points                   |
//! | [`links`]      | Merging disconnected links (ferries) into the network      |
//! | [`loader`]     | CSV loaders for node, edge, point and link tables          |
//! | [`error`]      | `NetworkError`, `NetworkResult<T>`                         |
//!
//! # Lifecycle
//!
//! ```text
//! loader ─▶ RoadNetworkBuilder ─▶ merge_links / attach ─▶ build() ─▶ RoadNetwork
//!                (append-only)                                     (read-only, shareable)
//! ```

pub mod attach;
pub mod components;
pub mod error;
pub mod links;
pub mod loader;
pub mod network;
pub mod subgraph;

#[cfg(test)]
mod tests;

pub use attach::{AttachParams, attach};
pub use components::{ComponentSummary, DisjointSet};
pub use error::{NetworkError, NetworkResult};
pub use links::{Link, merge_links};
pub use network::{Edge, RoadNetwork, RoadNetworkBuilder};
pub use subgraph::Subgraph;
