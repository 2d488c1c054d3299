//! Errors reported by the driver

/// Everything a [`Lcd`](crate::lcd::Lcd) operation can fail with
///
/// The bus is write-only, so a missing or miswired controller is never reported,
/// it only shows up as garbage on the panel.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error<E> {
    /// The transport refused or failed to transmit, passed on unchanged
    #[error("transport error: {0:?}")]
    Transport(E),
    /// Row index has no entry in the row address table (valid rows are 0..4)
    #[error("row {0} out of range")]
    InvalidRow(u8),
    /// CGRAM only holds 8 custom graphs
    #[error("graph index {0} out of range")]
    InvalidGraphIndex(u8),
    /// A `Display` impl inside the format arguments reported an error
    #[error("formatting failed")]
    Format,
}

#[cfg(feature = "defmt")]
impl<E> defmt::Format for Error<E> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Error::Transport(_e) => defmt::write!(fmt, "transport error"),
            Error::InvalidRow(row) => defmt::write!(fmt, "row {} out of range", row),
            Error::InvalidGraphIndex(index) => {
                defmt::write!(fmt, "graph index {} out of range", index)
            }
            Error::Format => defmt::write!(fmt, "formatting failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::ToString;

    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            Error::<()>::InvalidRow(4).to_string(),
            "row 4 out of range"
        );
        assert_eq!(
            Error::<()>::InvalidGraphIndex(9).to_string(),
            "graph index 9 out of range"
        );
        assert_eq!(Error::<()>::Format.to_string(), "formatting failed");
        assert_eq!(
            Error::Transport("nak").to_string(),
            "transport error: \"nak\""
        );
    }
}
