use std::fmt::{Debug, Display, Error, Formatter};

// Error
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum QRError {
    EmptyData,
    VersionUnavailable,
    LevelUnavailable,
    PayloadTooLarge,
    ModeViolation,
    NotImplemented,
}

impl Display for QRError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let msg = match *self {
            Self::EmptyData => "Empty data",
            Self::VersionUnavailable => "No version fits the payload",
            Self::LevelUnavailable => "No level fits the payload at the requested version",
            Self::PayloadTooLarge => "Payload exceeds capacity of requested version and level",
            Self::ModeViolation => "Payload contains characters outside the mode alphabet",
            Self::NotImplemented => "Kanji mode is not implemented",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for QRError {}

pub type QRResult<T> = Result<T, QRError>;
