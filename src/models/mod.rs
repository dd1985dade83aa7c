//! Domain models for one evaluation cycle.
//!
//! Nothing here outlives the cycle that fetched it: positions, bars and the
//! market clock are re-read from the broker every time.

pub mod bar;
pub mod clock;
pub mod gate;
pub mod order;
pub mod position;

pub use bar::{BarsRequest, PriceBar};
pub use clock::MarketClock;
pub use gate::GateDecision;
pub use order::{OrderAck, OrderRequest};
pub use position::{parse_decimal, Position, PositionSide};
