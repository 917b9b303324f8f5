//! CSV loaders for the network, point and link tables.
//!
//! # CSV formats
//!
//! ```csv
//! # nodes.csv
//! node_id,easting,northing
//! 0,530000.0,180000.0
//! 1,530120.5,180010.0
//!
//! # edges.csv (length in metres, time in minutes)
//! source,target,length,time_weighted
//! 0,1,120.9,0.29
//!
//! # points (sources or targets); node_id is optional
//! id,easting,northing,node_id
//! E01000001,530050.0,180200.0,
//! E01000002,530300.0,179900.0,17
//!
//! # links.csv (ferries)
//! from_easting,from_northing,to_easting,to_northing,length,time_weighted
//! 530000.0,180000.0,540000.0,175000.0,11180.3,45.0
//! ```
//!
//! Node ids must form the dense range `0..N` (in any row order) so that they
//! map one-to-one onto builder-assigned [`NodeId`]s.

use std::io::Read;
use std::path::Path;

use log::info;
use serde::Deserialize;

use ax_core::{Coord, NodeId, Point};

use crate::links::Link;
use crate::network::{Edge, RoadNetworkBuilder};
use crate::{NetworkError, NetworkResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    node_id:  u32,
    easting:  f64,
    northing: f64,
}

#[derive(Deserialize)]
struct EdgeRecord {
    source:        u32,
    target:        u32,
    length:        f64,
    time_weighted: f64,
}

#[derive(Deserialize)]
struct PointRecord {
    id:       String,
    easting:  f64,
    northing: f64,
    #[serde(default)]
    node_id:  Option<u32>,
}

#[derive(Deserialize)]
struct LinkRecord {
    from_easting:  f64,
    from_northing: f64,
    to_easting:    f64,
    to_northing:   f64,
    length:        f64,
    time_weighted: f64,
}

// ── Network ───────────────────────────────────────────────────────────────────

/// Load a node table and an edge table into a fresh builder.
pub fn load_network_csv(nodes: &Path, edges: &Path) -> NetworkResult<RoadNetworkBuilder> {
    let builder = read_network(std::fs::File::open(nodes)?, std::fs::File::open(edges)?)?;
    info!(
        "loaded network from {}: {} nodes, {} edges",
        nodes.display(),
        builder.node_count(),
        builder.edge_count()
    );
    Ok(builder)
}

/// Like [`load_network_csv`] but accepts any `Read` sources.
pub fn read_network<N: Read, E: Read>(nodes: N, edges: E) -> NetworkResult<RoadNetworkBuilder> {
    let mut rows: Vec<NodeRecord> = csv::Reader::from_reader(nodes)
        .deserialize()
        .collect::<Result<_, _>>()?;
    rows.sort_unstable_by_key(|r| r.node_id);

    let edge_rows: Vec<EdgeRecord> = csv::Reader::from_reader(edges)
        .deserialize()
        .collect::<Result<_, _>>()?;

    let mut builder = RoadNetworkBuilder::with_capacity(rows.len(), edge_rows.len());
    for (expected, row) in rows.iter().enumerate() {
        if row.node_id as usize != expected {
            return Err(NetworkError::NonDenseNodeIds {
                expected: expected as u32,
                found:    row.node_id,
            });
        }
        let coord = Coord::new(row.easting, row.northing);
        if !coord.is_finite() {
            return Err(NetworkError::NonFiniteCoord { id: row.node_id.to_string() });
        }
        builder.add_node(coord);
    }

    builder.add_edges(edge_rows.into_iter().map(|r| {
        Edge::new(NodeId(r.source), NodeId(r.target), r.length, r.time_weighted)
    }))?;
    Ok(builder)
}

// ── Points ────────────────────────────────────────────────────────────────────

/// Load a point table (sources or targets).
pub fn load_points_csv(path: &Path) -> NetworkResult<Vec<Point>> {
    read_points(std::fs::File::open(path)?)
}

/// Like [`load_points_csv`] but accepts any `Read` source.
pub fn read_points<R: Read>(reader: R) -> NetworkResult<Vec<Point>> {
    let mut points = Vec::new();
    for result in csv::Reader::from_reader(reader).deserialize::<PointRecord>() {
        let r = result?;
        let point = Point::new(r.id, Coord::new(r.easting, r.northing));
        points.push(match r.node_id {
            Some(n) => point.with_node(NodeId(n)),
            None => point,
        });
    }
    Ok(points)
}

// ── Links ─────────────────────────────────────────────────────────────────────

/// Load a link (ferry) table.
pub fn load_links_csv(path: &Path) -> NetworkResult<Vec<Link>> {
    read_links(std::fs::File::open(path)?)
}

/// Like [`load_links_csv`] but accepts any `Read` source.
pub fn read_links<R: Read>(reader: R) -> NetworkResult<Vec<Link>> {
    csv::Reader::from_reader(reader)
        .deserialize::<LinkRecord>()
        .map(|result| {
            let r = result?;
            Ok(Link {
                from:     Coord::new(r.from_easting, r.from_northing),
                to:       Coord::new(r.to_easting, r.to_northing),
                length_m: r.length,
                time_min: r.time_weighted,
            })
        })
        .collect()
}
