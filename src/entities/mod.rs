//! Entity module - SeaORM definitions for the console's local store.
//! The backend owns every business record; locally we keep only operator
//! sessions and stock-correction drafts that have not been saved yet.

pub mod operator_session;
pub mod stock_correction;

pub use operator_session::{
    Column as OperatorSessionColumn, Entity as OperatorSession, Model as OperatorSessionModel,
};
pub use stock_correction::{
    Column as StockCorrectionColumn, Entity as StockCorrection, Model as StockCorrectionModel,
};
