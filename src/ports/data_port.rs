//! Price data access port trait.

use crate::domain::error::AlgotraderError;
use crate::domain::table::PriceTable;

pub trait DataPort {
    /// Loads the full price table, wide or long layout.
    fn load_table(&self) -> Result<PriceTable, AlgotraderError>;
}
