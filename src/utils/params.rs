use crate::api::response::ApiError;

/// A query parameter counts as present only when it is not blank.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Returns every parameter, or a bad request carrying `message` if any is
/// missing.
pub fn require_all<'a, const N: usize>(
    values: [&'a Option<String>; N],
    message: &str,
) -> Result<[&'a str; N], ApiError> {
    let mut out = [""; N];
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = present(value).ok_or_else(|| ApiError::BadRequest(message.to_string()))?;
    }
    Ok(out)
}

pub fn parse_id(value: &str, message: &str) -> Result<u64, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(message.to_string()))
}
