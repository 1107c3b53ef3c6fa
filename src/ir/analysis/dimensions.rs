//! Dimension compatibility of analog connections.

use crate::ir::ast::AnalogPort;

/// Decides whether an analog send port may drive an analog receive port.
pub trait DimensionChecker: Sync {
    fn dimensions_match(&self, send: &AnalogPort, receive: &AnalogPort) -> bool;
}

/// Compares SI base exponents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiDimensions;

impl DimensionChecker for SiDimensions {
    fn dimensions_match(&self, send: &AnalogPort, receive: &AnalogPort) -> bool {
        send.dimension.matches(&receive.dimension)
    }
}
