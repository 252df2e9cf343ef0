//! Incremental grid builder.

use pf_core::{DofId, FaceId, Id, PfError, Real};
use std::collections::HashMap;

use crate::error::AssemblyResult;
use crate::grid::{Cell, Connection, ConnectionKind, ConnectionProps, Grid};
use crate::validate;

/// Builder for constructing a grid incrementally.
///
/// Use `add_cell`, `add_connection` and `add_boundary` to build up the grid,
/// then call `build()` to validate and freeze it into an immutable `Grid`.
#[derive(Debug, Default)]
pub struct GridBuilder {
    cells: Vec<Cell>,
    connections: Vec<Connection>,
    /// First id that did not fit; reported by `build`.
    overflow: Option<PfError>,
}

impl GridBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell in PVT region 0 and return its id.
    pub fn add_cell(&mut self, name: impl Into<String>, volume: Real, depth: Real) -> DofId {
        let id = self.next_id(self.cells.len());
        self.cells.push(Cell {
            id,
            name: name.into(),
            volume,
            depth,
            pvt_region: 0,
        });
        id
    }

    pub fn set_pvt_region(&mut self, cell: DofId, region: usize) {
        if let Some(c) = self.cells.get_mut(cell.as_usize()) {
            c.pvt_region = region;
        }
    }

    pub fn rename_cell(&mut self, cell: DofId, new_name: impl Into<String>) {
        if let Some(c) = self.cells.get_mut(cell.as_usize()) {
            c.name = new_name.into();
        }
    }

    /// Connect two cells; the flux across it is positive from `a` to `b`.
    pub fn add_connection(&mut self, a: DofId, b: DofId, props: ConnectionProps) -> FaceId {
        self.push(ConnectionKind::Interior { a, b }, props)
    }

    /// Connect a cell to a prescribed exterior state located at `depth`.
    pub fn add_boundary(&mut self, cell: DofId, depth: Real, props: ConnectionProps) -> FaceId {
        self.push(ConnectionKind::Boundary { cell, depth }, props)
    }

    fn push(&mut self, kind: ConnectionKind, props: ConnectionProps) -> FaceId {
        let id = self.next_id(self.connections.len());
        self.connections.push(Connection { id, kind, props });
        id
    }

    fn next_id(&mut self, index: usize) -> Id {
        Id::try_from(index).unwrap_or_else(|err| {
            self.overflow.get_or_insert(err);
            Id::LAST
        })
    }

    /// Validate and build the grid, including its cell-to-connection adjacency.
    pub fn build(self) -> AssemblyResult<Grid> {
        if let Some(err) = self.overflow {
            return Err(err.into());
        }
        validate::validate_structure(&self.cells, &self.connections)?;

        let (cell_conn_offsets, cell_conns) = Self::build_adjacency(&self.cells, &self.connections);

        validate::validate_adjacency(
            &self.cells,
            &self.connections,
            &cell_conn_offsets,
            &cell_conns,
        )?;

        tracing::debug!(
            cells = self.cells.len(),
            connections = self.connections.len(),
            "grid built"
        );

        Ok(Grid {
            cells: self.cells,
            connections: self.connections,
            cell_conn_offsets,
            cell_conns,
        })
    }

    fn build_adjacency(cells: &[Cell], connections: &[Connection]) -> (Vec<usize>, Vec<FaceId>) {
        let mut cell_to_conns: HashMap<DofId, Vec<FaceId>> = HashMap::new();
        for conn in connections {
            match conn.kind {
                ConnectionKind::Interior { a, b } => {
                    cell_to_conns.entry(a).or_default().push(conn.id);
                    cell_to_conns.entry(b).or_default().push(conn.id);
                }
                ConnectionKind::Boundary { cell, .. } => {
                    cell_to_conns.entry(cell).or_default().push(conn.id);
                }
            }
        }

        for list in cell_to_conns.values_mut() {
            list.sort();
        }

        let mut offsets = Vec::with_capacity(cells.len() + 1);
        let mut flat = Vec::new();
        offsets.push(0);
        for cell in cells {
            if let Some(list) = cell_to_conns.get(&cell.id) {
                flat.extend_from_slice(list);
            }
            offsets.push(flat.len());
        }

        (offsets, flat)
    }
}
