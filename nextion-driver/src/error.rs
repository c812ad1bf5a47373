//! Driver errors

use embedded_io::ErrorKind;
use nextion_protocol::{CommandError, ResponseCode};

/// Errors returned by the driver
///
/// `E` is the error type of the underlying UART.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError<E> {
    /// The UART reported an error
    Io(E),
    /// The instruction could not be formatted
    Command(CommandError),
    /// The display answered with a failure code
    Rejected(ResponseCode),
    /// No reply arrived in time
    Timeout,
    /// The reply does not match the request, e.g. a number for a text attribute
    UnexpectedResponse,
}

impl<E> From<CommandError> for DriverError<E> {
    fn from(e: CommandError) -> Self {
        DriverError::Command(e)
    }
}

impl<E: embedded_io::Error> embedded_io::Error for DriverError<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            DriverError::Io(e) => e.kind(),
            DriverError::Command(_) | DriverError::Rejected(_) => ErrorKind::InvalidInput,
            DriverError::Timeout => ErrorKind::TimedOut,
            DriverError::UnexpectedResponse => ErrorKind::InvalidData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::Error;

    #[derive(Debug)]
    struct Overrun;

    impl embedded_io::Error for Overrun {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(DriverError::Io(Overrun).kind(), ErrorKind::Other);
        assert_eq!(
            DriverError::<Overrun>::from(CommandError::TooLong).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            DriverError::<Overrun>::Rejected(ResponseCode::InvalidVariable).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(DriverError::<Overrun>::Timeout.kind(), ErrorKind::TimedOut);
    }
}
