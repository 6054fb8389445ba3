//! Part classification and value parsing used by the ERC rules.

use serde::{Deserialize, Serialize};

use crate::schematic::Symbol;

const MCU_NAME_MARKERS: &[&str] = &["RP2040"];
const MCU_LIBRARY_MARKERS: &[&str] = &["MCU", "IC"];
const LED_LIBRARY_MARKERS: &[&str] = &["LED"];
const LED_NAME_MARKERS: &[&str] = &["APA102", "SK9822"];

/// The part classes the rules care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartClass {
    Capacitor,
    Resistor,
    /// MCU or other IC that needs local decoupling.
    Mcu,
    /// Addressable LED that needs bulk capacitance on its rail.
    AddressableLed,
    Other,
}

impl PartClass {
    /// Classify by library and name (and value, for MCU part numbers).
    /// Passives are recognized first so a `Device:C` never counts as an IC.
    pub fn classify(symbol: &Symbol) -> Self {
        match (symbol.library.as_str(), symbol.name.as_str()) {
            ("Device", "C") => return PartClass::Capacitor,
            ("Device", "R") => return PartClass::Resistor,
            _ => {}
        }

        let value = symbol.value_str();
        if MCU_NAME_MARKERS
            .iter()
            .any(|m| symbol.name.contains(m) || value.contains(m))
            || MCU_LIBRARY_MARKERS.iter().any(|m| symbol.library.contains(m))
        {
            return PartClass::Mcu;
        }

        if LED_LIBRARY_MARKERS.iter().any(|m| symbol.library.contains(m))
            || LED_NAME_MARKERS.iter().any(|m| symbol.name.contains(m))
        {
            return PartClass::AddressableLed;
        }

        PartClass::Other
    }
}

/// Fold the micro sign (U+00B5) and Greek mu (U+03BC) into ASCII `u`.
pub fn normalize_micro(value: &str) -> String {
    value.replace(|c: char| c == '\u{b5}' || c == '\u{3bc}', "u")
}

/// True if `value` contains any of `tags`, comparing with micro signs folded.
pub fn value_has_tag<S: AsRef<str>>(value: &str, tags: &[S]) -> bool {
    let value = normalize_micro(value);
    tags.iter()
        .any(|tag| value.contains(normalize_micro(tag.as_ref()).as_str()))
}

/// Resistance in kΩ.
///
/// `4.7k`, `4.7K` and `4.7kΩ` are kΩ; `470Ω` is Ω; a bare number is already kΩ.
/// Anything that does not parse is 0.
pub fn parse_kilohms(raw: &str) -> f64 {
    let raw = raw.trim();
    let kilo = ["kΩ", "KΩ", "k", "K"]
        .iter()
        .find_map(|suffix| raw.strip_suffix(suffix));

    let parsed = if let Some(number) = kilo {
        number.trim().parse::<f64>().ok()
    } else if let Some(number) = raw.strip_suffix('Ω') {
        number.trim().parse::<f64>().ok().map(|ohms| ohms / 1000.0)
    } else {
        raw.parse::<f64>().ok()
    };

    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}
