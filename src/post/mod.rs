//! Optional passes over the tracked table: unit conversions and region flags
mod data_converter;
mod position_bounder;

pub use self::{data_converter::*, position_bounder::*};
