//! Grid validation logic.

use pf_core::{FaceId, Id, finite_non_negative, finite_positive};
use std::collections::HashMap;

use crate::error::{AssemblyError, AssemblyResult};
use crate::grid::{Cell, Connection, ConnectionKind};

/// Validate cells and connections: ids, references and physical values.
pub(crate) fn validate_structure(cells: &[Cell], connections: &[Connection]) -> AssemblyResult<()> {
    for (i, cell) in cells.iter().enumerate() {
        if cell.id.as_usize() != i {
            return Err(AssemblyError::NonPhysical {
                what: "cell id",
                entity: "cell",
                index: i,
            });
        }
        if !finite_positive(cell.volume) {
            return Err(AssemblyError::NonPhysical {
                what: "volume",
                entity: "cell",
                index: i,
            });
        }
        if !cell.depth.is_finite() {
            return Err(AssemblyError::NonPhysical {
                what: "depth",
                entity: "cell",
                index: i,
            });
        }
    }

    let cell_exists = |face: FaceId, cell: Id| {
        if cell.as_usize() < cells.len() {
            Ok(())
        } else {
            Err(AssemblyError::InvalidCellRef { face, cell })
        }
    };

    for (i, conn) in connections.iter().enumerate() {
        let non_physical = |what| AssemblyError::NonPhysical {
            what,
            entity: "connection",
            index: i,
        };
        if conn.id.as_usize() != i {
            return Err(non_physical("connection id"));
        }
        match conn.kind {
            ConnectionKind::Interior { a, b } => {
                cell_exists(conn.id, a)?;
                cell_exists(conn.id, b)?;
                if a == b {
                    return Err(AssemblyError::SelfConnection {
                        face: conn.id,
                        cell: a,
                    });
                }
            }
            ConnectionKind::Boundary { cell, depth } => {
                cell_exists(conn.id, cell)?;
                if !depth.is_finite() {
                    return Err(non_physical("depth"));
                }
            }
        }

        let props = &conn.props;
        if !finite_positive(props.area) {
            return Err(non_physical("area"));
        }
        if !props.normal.iter().all(|x| x.is_finite()) {
            return Err(non_physical("normal"));
        }
        for (what, value) in [
            ("transmissibility", props.transmissibility),
            ("threshold pressure", props.threshold_pressure),
            ("thermal transmissibility", props.thermal_transmissibility),
            ("diffusivity", props.diffusivity),
        ] {
            if !finite_non_negative(value) {
                return Err(non_physical(what));
            }
        }
    }

    Ok(())
}

/// Validate adjacency lists for consistency.
pub(crate) fn validate_adjacency(
    cells: &[Cell],
    connections: &[Connection],
    cell_conn_offsets: &[usize],
    cell_conns: &[FaceId],
) -> AssemblyResult<()> {
    if cell_conn_offsets.len() != cells.len() + 1 {
        return Err(AssemblyError::DimensionMismatch {
            what: "adjacency offsets",
            expected: cells.len() + 1,
            actual: cell_conn_offsets.len(),
        });
    }

    let mut seen: HashMap<FaceId, usize> = HashMap::new();
    for cell in cells {
        let idx = cell.id.as_usize();
        let start = cell_conn_offsets[idx];
        let end = cell_conn_offsets[idx + 1];

        for &face in &cell_conns[start..end] {
            let touches = connections
                .get(face.as_usize())
                .is_some_and(|c| c.touches(cell.id));
            if !touches {
                return Err(AssemblyError::InconsistentAdjacency {
                    face,
                    cell: cell.id,
                });
            }
            *seen.entry(face).or_default() += 1;
        }
    }

    // Interior connections appear in two lists, boundary connections in one.
    for conn in connections {
        let expected = if conn.is_boundary() { 1 } else { 2 };
        if seen.get(&conn.id).copied().unwrap_or(0) != expected {
            let cell = match conn.kind {
                ConnectionKind::Interior { a, .. } => a,
                ConnectionKind::Boundary { cell, .. } => cell,
            };
            return Err(AssemblyError::InconsistentAdjacency {
                face: conn.id,
                cell,
            });
        }
    }

    Ok(())
}
