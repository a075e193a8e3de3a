//! # Symbologies
//!
//! The code standards a batch can be rendered in.
//!
//! | Symbology | Kind | Encoder |
//! |-----------|------|---------|
//! | Code128 | linear | `barcoders` (set C for digit pairs, else set B) |
//! | Code39 | linear | `barcoders` |
//! | EAN13 | linear | `barcoders` |
//! | EAN8 | linear | `barcoders` |
//! | UPC-A | linear | `barcoders` (as EAN-13 with leading zero) |
//! | ITF | linear | `barcoders` (interleaved 2 of 5) |
//! | DataMatrix | matrix | `qrcode` (QR substitute) |
//! | PDF417 | matrix | `pdf417` |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A code standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Symbology {
    #[default]
    Code128,
    Code39,
    #[serde(rename = "EAN13")]
    Ean13,
    #[serde(rename = "EAN8")]
    Ean8,
    #[serde(rename = "UPC-A")]
    UpcA,
    #[serde(rename = "ITF")]
    Itf,
    DataMatrix,
    #[serde(rename = "PDF417")]
    Pdf417,
}

impl Symbology {
    pub const ALL: [Symbology; 8] = [
        Symbology::Code128,
        Symbology::Code39,
        Symbology::Ean13,
        Symbology::Ean8,
        Symbology::UpcA,
        Symbology::Itf,
        Symbology::DataMatrix,
        Symbology::Pdf417,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Symbology::Code128 => "Code128",
            Symbology::Code39 => "Code39",
            Symbology::Ean13 => "EAN13",
            Symbology::Ean8 => "EAN8",
            Symbology::UpcA => "UPC-A",
            Symbology::Itf => "ITF",
            Symbology::DataMatrix => "DataMatrix",
            Symbology::Pdf417 => "PDF417",
        }
    }

    /// One-dimensional bar/space symbology.
    pub fn is_linear(self) -> bool {
        !self.is_matrix()
    }

    /// Two-dimensional symbology.
    pub fn is_matrix(self) -> bool {
        matches!(self, Symbology::DataMatrix | Symbology::Pdf417)
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Symbology {
    type Err = String;

    /// Case-insensitive; `-` and `_` are ignored, so `upc-a`, `UPC_A` and `upca` all match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        Symbology::ALL
            .into_iter()
            .find(|sym| sym.name().replace('-', "").to_ascii_lowercase() == wanted)
            .ok_or_else(|| format!("unknown symbology '{s}'"))
    }
}
