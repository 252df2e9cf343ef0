use crate::error::{PfError, PfResult};
use core::fmt;
use core::num::NonZeroU32;

/// Compact, stable identifier for grid entities.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<Id>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    /// Largest 0-based index an `Id` can hold.
    pub const MAX_INDEX: u32 = u32::MAX - 1;

    /// The id with index [`Id::MAX_INDEX`].
    pub const LAST: Id = Id(NonZeroU32::MAX);

    /// Create an Id from a 0-based index by storing index+1.
    ///
    /// Fails for `u32::MAX`, which has no successor to store.
    pub fn from_index(index: u32) -> PfResult<Self> {
        index
            .checked_add(1)
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(PfError::IndexOob {
                what: "id",
                index: index as usize,
                len: Self::MAX_INDEX as usize + 1,
            })
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// The 0-based index as `usize`, for slice access.
    pub fn as_usize(self) -> usize {
        self.index() as usize
    }
}

impl TryFrom<usize> for Id {
    type Error = PfError;

    fn try_from(index: usize) -> PfResult<Self> {
        let narrow = u32::try_from(index).map_err(|_| PfError::IndexOob {
            what: "id",
            index,
            len: Self::MAX_INDEX as usize + 1,
        })?;
        Self::from_index(narrow)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Control volume (cell) index.
pub type DofId = Id;
/// Connection index; interior and boundary connections share one space.
pub type FaceId = Id;
