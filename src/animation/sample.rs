//! Preview sampling of keyframed properties.
//!
//! The editing engine never calls this; it exists for the playback/scrub layer that
//! feeds interpolated values back into the element's base properties.

use crate::{
    foundation::core::{ElementId, Phase, PropertyKey, PropertyValue},
    store::keyframes::{Keyframe, KeyframeStore},
};

/// Interpolated value of `key` at `ms` within `phase`, or `None` when no keyframe
/// of that animation defines the key.
///
/// Holds the first value before the first key and the last value after the last key.
/// Numbers interpolate using the earlier keyframe's easing; text switches when the
/// next keyframe is reached.
pub fn sample_property<K>(
    store: &K,
    element: &ElementId,
    phase: Phase,
    key: &PropertyKey,
    ms: f64,
) -> Option<PropertyValue>
where
    K: KeyframeStore + ?Sized,
{
    let anim = store.find_animation(element, phase)?;
    let keys: Vec<&Keyframe> = store
        .keyframes_for(anim.id)
        .into_iter()
        .filter(|kf| kf.defines(key))
        .collect();
    sample_keys(&keys, key, ms)
}

fn sample_keys(keys: &[&Keyframe], key: &PropertyKey, ms: f64) -> Option<PropertyValue> {
    let first = keys.first()?;
    let idx = keys.partition_point(|k| k.position_ms <= ms);

    if idx == 0 {
        return first.value(key).cloned();
    }
    if idx >= keys.len() {
        return keys[keys.len() - 1].value(key).cloned();
    }

    let a = keys[idx - 1];
    let b = keys[idx];
    let (va, vb) = (a.value(key)?, b.value(key)?);
    let span = b.position_ms - a.position_ms;
    if span <= 0.0 {
        return Some(va.clone());
    }

    let t = (ms - a.position_ms) / span;
    let te = a.easing.unwrap_or_default().apply(t);
    match (va, vb) {
        (PropertyValue::Number(x), PropertyValue::Number(y)) => {
            Some(PropertyValue::Number(x + (y - x) * te))
        }
        _ => Some(va.clone()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/sample.rs"]
mod tests;
