pub use coordinate::{parse_coordinate_block, Coordinate, CoordinateError};
pub use crate_name::{CrateName, InvalidNameError};

mod coordinate;
mod crate_name;

/// Validate a crate name against the registry's naming grammar.
///
/// Names are ASCII alphanumerics plus `-` and `_`, must start with an
/// alphanumeric character, and are kept verbatim: unlike some ecosystems,
/// the registry treats `foo-bar` and `foo_bar` as distinct crates, so no
/// case or separator normalization is applied.
pub(crate) fn validate_name(name: impl AsRef<str>) -> Result<String, InvalidNameError> {
    let name = name.as_ref();

    let mut first = true;
    for char in name.bytes() {
        match char {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => {}
            b'-' | b'_' => {
                // Names can't start with punctuation.
                if first {
                    return Err(InvalidNameError(name.to_string()));
                }
            }
            _ => return Err(InvalidNameError(name.to_string())),
        }
        first = false;
    }

    if first {
        // Empty names are invalid.
        return Err(InvalidNameError(name.to_string()));
    }

    Ok(name.to_string())
}
