//! QR code symbol encoder for versions 1 through 40: payload in, module
//! matrix out. Rendering is left to the caller via [`QRCode::is_dark`].

pub mod builder;
mod common;

pub use builder::{Module, QRBuilder, QRCode};
pub use common::codec::Mode;
pub use common::error::{QRError, QRResult};
pub use common::mask::MaskPattern;
pub use common::metadata::{Color, ECLevel, Version};
