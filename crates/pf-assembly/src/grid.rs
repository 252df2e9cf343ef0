//! Two-point flux connectivity: cells, connections and boundary connections.

use pf_core::{DofId, FaceId, Real};
use pf_residual::FaceGeometry;
use serde::{Deserialize, Serialize};

/// A control volume.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub id: DofId,
    pub name: String,
    /// Bulk volume [m³].
    pub volume: Real,
    /// Depth of the cell center [m], positive downwards.
    pub depth: Real,
    pub pvt_region: usize,
}

/// Geometric and rock factors of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionProps {
    /// Face area [m²].
    pub area: Real,
    /// Unit normal pointing away from the first cell.
    pub normal: [Real; 3],
    /// Darcy transmissibility [m³].
    pub transmissibility: Real,
    /// Minimum potential difference for flow [Pa].
    pub threshold_pressure: Real,
    /// Conductive heat transfer factor [m].
    pub thermal_transmissibility: Real,
    /// Molecular diffusion factor [m].
    pub diffusivity: Real,
}

impl Default for ConnectionProps {
    fn default() -> Self {
        Self {
            area: 1.0,
            normal: [1.0, 0.0, 0.0],
            transmissibility: 0.0,
            threshold_pressure: 0.0,
            thermal_transmissibility: 0.0,
            diffusivity: 0.0,
        }
    }
}

impl ConnectionProps {
    pub fn new(area: Real, transmissibility: Real) -> Self {
        Self {
            area,
            transmissibility,
            ..Self::default()
        }
    }

    pub fn geometry(&self) -> FaceGeometry {
        FaceGeometry {
            area: self.area,
            normal: self.normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionKind {
    /// Connection between two cells; flux is positive from `a` to `b`.
    Interior { a: DofId, b: DofId },
    /// Connection from a cell to a prescribed exterior state at `depth`.
    Boundary { cell: DofId, depth: Real },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub id: FaceId,
    pub kind: ConnectionKind,
    pub props: ConnectionProps,
}

impl Connection {
    pub fn is_boundary(&self) -> bool {
        matches!(self.kind, ConnectionKind::Boundary { .. })
    }

    /// Whether `cell` is one of the cells this connection touches.
    pub fn touches(&self, cell: DofId) -> bool {
        match self.kind {
            ConnectionKind::Interior { a, b } => a == cell || b == cell,
            ConnectionKind::Boundary { cell: c, .. } => c == cell,
        }
    }

    /// The cell across this connection as seen from `cell`.
    ///
    /// `None` for boundary connections and for cells the connection doesn't touch.
    pub fn other(&self, cell: DofId) -> Option<DofId> {
        match self.kind {
            ConnectionKind::Interior { a, b } if a == cell => Some(b),
            ConnectionKind::Interior { a, b } if b == cell => Some(a),
            _ => None,
        }
    }
}

/// A validated, immutable set of cells and connections.
///
/// Connection ids share one index space for interior and boundary
/// connections, so per-face problem data can be keyed on the id alone.
#[derive(Debug, Clone)]
pub struct Grid {
    pub(crate) cells: Vec<Cell>,
    pub(crate) connections: Vec<Connection>,

    /// Cell i's connections are in cell_conns[cell_conn_offsets[i]..cell_conn_offsets[i+1]].
    pub(crate) cell_conn_offsets: Vec<usize>,

    /// Flat list of connection ids incident to cells, sorted by cell then id.
    pub(crate) cell_conns: Vec<FaceId>,
}

impl Grid {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn cell(&self, id: DofId) -> Option<&Cell> {
        self.cells.get(id.as_usize())
    }

    pub fn connection(&self, id: FaceId) -> Option<&Connection> {
        self.connections.get(id.as_usize())
    }

    /// Connection ids incident to a cell, interior and boundary alike.
    pub fn cell_connections(&self, cell: DofId) -> &[FaceId] {
        let idx = cell.as_usize();
        if idx >= self.cells.len() {
            return &[];
        }
        let start = self.cell_conn_offsets[idx];
        let end = self.cell_conn_offsets[idx + 1];
        &self.cell_conns[start..end]
    }

    /// Interior neighbours of `cell` with the connection leading to them.
    pub fn neighbors(&self, cell: DofId) -> impl Iterator<Item = (&Connection, DofId)> + '_ {
        self.cell_connections(cell).iter().filter_map(move |&id| {
            let conn = self.connection(id)?;
            conn.other(cell).map(|n| (conn, n))
        })
    }

    pub fn boundary_connections(&self) -> impl Iterator<Item = &Connection> + '_ {
        self.connections.iter().filter(|c| c.is_boundary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::Id;

    #[test]
    fn connection_accessors() {
        let conn = Connection {
            id: Id::from_index(0).unwrap(),
            kind: ConnectionKind::Interior {
                a: Id::from_index(3).unwrap(),
                b: Id::from_index(4).unwrap(),
            },
            props: ConnectionProps::new(2.0, 1.0e-12),
        };
        assert!(!conn.is_boundary());
        assert!(conn.touches(Id::from_index(4).unwrap()));
        assert_eq!(conn.other(Id::from_index(3).unwrap()), Some(Id::from_index(4).unwrap()));
        assert_eq!(conn.other(Id::from_index(4).unwrap()), Some(Id::from_index(3).unwrap()));
        assert_eq!(conn.other(Id::from_index(9).unwrap()), None);
        assert_eq!(conn.props.geometry().area, 2.0);
    }

    #[test]
    fn props_deserialize_with_defaults() {
        let props: ConnectionProps = serde_json::from_str(r#"{"transmissibility": 1e-12}"#).unwrap();
        assert_eq!(props.area, 1.0);
        assert_eq!(props.normal, [1.0, 0.0, 0.0]);
        assert_eq!(props.transmissibility, 1e-12);
    }
}
