use super::DictError;
use crate::codec::CharacterCodec;
use crate::index::entry::{is_header_line, lines, parse_entry};

/// Check that `bytes` looks like an EDICT file by parsing its first
/// `sample_lines` non-blank entry lines.
///
/// A leading header line is not sampled. The file is rejected when nothing
/// could be sampled or when more than half of the sample fails to parse, so
/// that a stray bad line near the top does not make a whole file unusable.
pub fn validate_format(
    bytes: &[u8],
    codec: &dyn CharacterCodec,
    sample_lines: usize,
) -> Result<(), DictError> {
    let mut checked = 0usize;
    let mut failed = 0usize;
    let mut first_error = None;

    for (n, line) in lines(bytes).enumerate() {
        if checked == sample_lines {
            break;
        }
        if line.is_blank() || (n == 0 && is_header_line(bytes, line, codec)) {
            continue;
        }
        checked += 1;
        if let Err(e) = parse_entry(bytes, line, codec) {
            failed += 1;
            first_error.get_or_insert(e);
        }
    }

    if checked == 0 {
        return Err(DictError::InvalidFormat("no entry lines".to_string()));
    }
    if failed * 2 > checked {
        let detail = first_error.map(|e| e.to_string()).unwrap_or_default();
        return Err(DictError::InvalidFormat(format!(
            "{failed} of {checked} sampled lines are not dictionary entries (first: {detail})"
        )));
    }
    Ok(())
}
