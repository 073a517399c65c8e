use crate::{
    foundation::error::{LedAnimError, LedAnimResult},
    model::animation::Animation,
};

/// Render an animation as pretty-printed JSON.
pub fn to_json(anim: &Animation) -> LedAnimResult<String> {
    serde_json::to_string_pretty(anim)
        .map_err(|e| LedAnimError::serde(format!("serialize animation JSON: {e}")))
}

/// Parse an animation from a JSON reader and check it fits the binary format.
pub fn from_json_reader<R: std::io::Read>(r: R) -> LedAnimResult<Animation> {
    let anim: Animation = serde_json::from_reader(r)
        .map_err(|e| LedAnimError::serde(format!("parse animation JSON: {e}")))?;
    anim.validate()?;
    Ok(anim)
}

/// Parse an animation from a JSON string.
pub fn from_json_str(s: &str) -> LedAnimResult<Animation> {
    from_json_reader(s.as_bytes())
}

#[cfg(test)]
#[path = "../../tests/unit/codec/json.rs"]
mod tests;
