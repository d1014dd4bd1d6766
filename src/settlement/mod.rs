pub mod batch;
pub mod error;
pub mod grant;
pub mod in_flight;
pub mod settler;

pub use batch::{ConsumedSlate, SettlementBatch};
pub use error::SettlementError;
pub use grant::OperatorGrant;
pub use in_flight::{InFlightRounds, RoundReservation};
pub use settler::Settler;
