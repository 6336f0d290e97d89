use std::collections::{BTreeMap, BTreeSet};

use crate::{
    animation::ease::Ease,
    foundation::core::{
        AnimationId, ElementId, KeyframeId, Phase, PropertyKey, PropertyValue, validate_duration,
    },
    foundation::error::{TimelineError, TimelineResult},
    time::algebra::clamp_to_phase,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Keyframe container for one element in one phase.
pub struct Animation {
    /// Store-issued id.
    pub id: AnimationId,
    /// Owning element.
    pub element_id: ElementId,
    /// Phase this animation plays in.
    pub phase: Phase,
    /// Last known phase duration; corrected whenever it drifts from the configured one.
    pub duration_ms: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A timestamped, sparse set of property overrides.
pub struct Keyframe {
    /// Store-issued id.
    pub id: KeyframeId,
    /// Owning animation.
    pub animation_id: AnimationId,
    /// Position in milliseconds from the start of the phase.
    pub position_ms: f64,
    /// Animated properties at this instant. Absent keys are not animated here.
    #[serde(default)]
    pub properties: BTreeMap<PropertyKey, PropertyValue>,
    /// Easing toward the next keyframe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<Ease>,
    /// Optional display name for the timeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Keyframe {
    /// Whether this keyframe animates `key`.
    pub fn defines(&self, key: &PropertyKey) -> bool {
        self.properties.contains_key(key)
    }

    /// Value of `key` at this keyframe, if animated here.
    pub fn value(&self, key: &PropertyKey) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

/// Timing edits made directly from the timeline.
///
/// `None` leaves a field unchanged; `Some(None)` clears an optional field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyframePatch {
    /// New position; clamped into the animation's duration.
    pub position_ms: Option<f64>,
    /// New easing.
    pub easing: Option<Option<Ease>>,
    /// New display name.
    pub name: Option<Option<String>>,
}

/// Where a write-merge landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// Animation the keyframe belongs to.
    pub animation: AnimationId,
    /// Keyframe that now holds the property.
    pub keyframe: KeyframeId,
    /// `true` when an existing keyframe within tolerance absorbed the write.
    pub merged: bool,
}

/// Authoritative collection of animations and keyframes.
///
/// Implementors provide the primitive lookups and mutations; the find-or-create and
/// write-merge logic is shared through the provided methods.
pub trait KeyframeStore {
    /// Look up an animation by id.
    fn animation(&self, id: AnimationId) -> Option<&Animation>;

    /// The animation bound to `(element, phase)`, if one was created.
    fn find_animation(&self, element: &ElementId, phase: Phase) -> Option<&Animation>;

    /// Every animation, ordered by id.
    fn animations(&self) -> Vec<&Animation>;

    /// Look up a keyframe by id.
    fn keyframe(&self, id: KeyframeId) -> Option<&Keyframe>;

    /// Keyframes of one animation, sorted by position (ties by id).
    fn keyframes_for(&self, animation: AnimationId) -> Vec<&Keyframe>;

    /// Create the animation for `(element, phase)`. Fails if one already exists.
    fn create_animation(
        &mut self,
        element: &ElementId,
        phase: Phase,
        duration_ms: f64,
    ) -> TimelineResult<AnimationId>;

    /// Overwrite the stored duration. Returns `true` when it changed.
    fn sync_duration(&mut self, animation: AnimationId, duration_ms: f64) -> TimelineResult<bool>;

    /// Insert a keyframe; `position_ms` is clamped into the animation's duration.
    fn insert_keyframe(
        &mut self,
        animation: AnimationId,
        position_ms: f64,
        properties: BTreeMap<PropertyKey, PropertyValue>,
    ) -> TimelineResult<KeyframeId>;

    /// Add or overwrite one property on a keyframe.
    fn set_property(
        &mut self,
        keyframe: KeyframeId,
        key: PropertyKey,
        value: PropertyValue,
    ) -> TimelineResult<()>;

    /// Remove one property from a keyframe. The keyframe is kept even when it ends up empty.
    fn remove_property(
        &mut self,
        keyframe: KeyframeId,
        key: &PropertyKey,
    ) -> TimelineResult<Option<PropertyValue>>;

    /// Apply a timeline edit (position, easing, name).
    fn update_keyframe(&mut self, keyframe: KeyframeId, patch: KeyframePatch)
    -> TimelineResult<()>;

    /// Remove a keyframe outright.
    fn delete_keyframe(&mut self, keyframe: KeyframeId) -> TimelineResult<Keyframe>;

    /// Remove an animation together with all of its keyframes.
    fn delete_animation(&mut self, animation: AnimationId) -> TimelineResult<Animation>;

    /// Locate the animation for `(element, phase)`, creating it lazily, and bring its
    /// duration in line with the configured phase duration.
    fn find_or_create_animation(
        &mut self,
        element: &ElementId,
        phase: Phase,
        duration_ms: f64,
    ) -> TimelineResult<AnimationId> {
        let duration_ms = validate_duration(duration_ms)?;
        if let Some(id) = self.find_animation(element, phase).map(|a| a.id) {
            self.sync_duration(id, duration_ms)?;
            return Ok(id);
        }
        self.create_animation(element, phase, duration_ms)
    }

    /// Nearest keyframe strictly within `tolerance_ms` of `position_ms`.
    fn find_keyframe_near(
        &self,
        animation: AnimationId,
        position_ms: f64,
        tolerance_ms: f64,
    ) -> Option<&Keyframe> {
        let mut best: Option<(&Keyframe, f64)> = None;
        for kf in self.keyframes_for(animation) {
            let dist = (kf.position_ms - position_ms).abs();
            if dist >= tolerance_ms {
                continue;
            }
            if best.is_none_or(|(_, d)| dist < d) {
                best = Some((kf, dist));
            }
        }
        best.map(|(kf, _)| kf)
    }

    /// Write `key = value` at `position_ms`, merging into a keyframe within
    /// `tolerance_ms` or creating a new keyframe holding only this property.
    fn upsert_property_at(
        &mut self,
        animation: AnimationId,
        position_ms: f64,
        key: PropertyKey,
        value: PropertyValue,
        tolerance_ms: f64,
    ) -> TimelineResult<UpsertOutcome> {
        value.validate()?;
        let duration = self
            .animation(animation)
            .map(|a| a.duration_ms)
            .ok_or_else(|| TimelineError::not_found(format!("animation {animation}")))?;
        let position = clamp_to_phase(position_ms, duration);

        if let Some(id) = self
            .find_keyframe_near(animation, position, tolerance_ms)
            .map(|kf| kf.id)
        {
            self.set_property(id, key, value)?;
            return Ok(UpsertOutcome {
                animation,
                keyframe: id,
                merged: true,
            });
        }

        let mut properties = BTreeMap::new();
        properties.insert(key, value);
        let id = self.insert_keyframe(animation, position, properties)?;
        Ok(UpsertOutcome {
            animation,
            keyframe: id,
            merged: false,
        })
    }

    /// Remove every animation of `element` across all phases. Returns how many were removed.
    fn delete_animations_for_element(&mut self, element: &ElementId) -> usize {
        let ids: Vec<AnimationId> = self
            .animations()
            .into_iter()
            .filter(|a| &a.element_id == element)
            .map(|a| a.id)
            .collect();
        ids.into_iter()
            .filter(|id| self.delete_animation(*id).is_ok())
            .count()
    }
}

/// In-memory [`KeyframeStore`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(into = "StoreDef", try_from = "StoreDef")]
pub struct MemoryKeyframeStore {
    animations: BTreeMap<AnimationId, Animation>,
    keyframes: BTreeMap<KeyframeId, Keyframe>,
    next_animation: u64,
    next_keyframe: u64,
}

impl MemoryKeyframeStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total keyframe count across all animations.
    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    fn keyframe_mut(&mut self, id: KeyframeId) -> TimelineResult<&mut Keyframe> {
        self.keyframes
            .get_mut(&id)
            .ok_or_else(|| TimelineError::not_found(format!("keyframe {id}")))
    }

    fn duration_of(&self, id: AnimationId) -> TimelineResult<f64> {
        self.animations
            .get(&id)
            .map(|a| a.duration_ms)
            .ok_or_else(|| TimelineError::not_found(format!("animation {id}")))
    }
}

fn next_id(id: u64, what: &str) -> TimelineResult<u64> {
    id.checked_add(1)
        .ok_or_else(|| TimelineError::validation(format!("{what} id {id} leaves no room")))
}

fn finite_position(position_ms: f64) -> TimelineResult<f64> {
    if !position_ms.is_finite() {
        return Err(TimelineError::validation(format!(
            "keyframe position must be finite, got {position_ms}"
        )));
    }
    Ok(position_ms)
}

impl KeyframeStore for MemoryKeyframeStore {
    fn animation(&self, id: AnimationId) -> Option<&Animation> {
        self.animations.get(&id)
    }

    fn find_animation(&self, element: &ElementId, phase: Phase) -> Option<&Animation> {
        self.animations
            .values()
            .find(|a| &a.element_id == element && a.phase == phase)
    }

    fn animations(&self) -> Vec<&Animation> {
        self.animations.values().collect()
    }

    fn keyframe(&self, id: KeyframeId) -> Option<&Keyframe> {
        self.keyframes.get(&id)
    }

    fn keyframes_for(&self, animation: AnimationId) -> Vec<&Keyframe> {
        let mut out: Vec<&Keyframe> = self
            .keyframes
            .values()
            .filter(|kf| kf.animation_id == animation)
            .collect();
        // BTreeMap iteration already orders by id, and the sort is stable.
        out.sort_by(|a, b| a.position_ms.total_cmp(&b.position_ms));
        out
    }

    fn create_animation(
        &mut self,
        element: &ElementId,
        phase: Phase,
        duration_ms: f64,
    ) -> TimelineResult<AnimationId> {
        let duration_ms = validate_duration(duration_ms)?;
        if self.find_animation(element, phase).is_some() {
            return Err(TimelineError::validation(format!(
                "element '{element}' already has an animation for phase '{phase}'"
            )));
        }
        let id = AnimationId(self.next_animation);
        self.next_animation = next_id(id.0, "animation")?;
        self.animations.insert(
            id,
            Animation {
                id,
                element_id: element.clone(),
                phase,
                duration_ms,
            },
        );
        tracing::debug!(
            animation = %id,
            element = %element,
            %phase,
            duration_ms,
            "created animation"
        );
        Ok(id)
    }

    fn sync_duration(&mut self, animation: AnimationId, duration_ms: f64) -> TimelineResult<bool> {
        let duration_ms = validate_duration(duration_ms)?;
        let anim = self
            .animations
            .get_mut(&animation)
            .ok_or_else(|| TimelineError::not_found(format!("animation {animation}")))?;
        if anim.duration_ms == duration_ms {
            return Ok(false);
        }
        tracing::warn!(
            animation = %animation,
            stored_ms = anim.duration_ms,
            configured_ms = duration_ms,
            "animation duration drifted from phase duration; correcting"
        );
        anim.duration_ms = duration_ms;
        for kf in self
            .keyframes
            .values_mut()
            .filter(|kf| kf.animation_id == animation && kf.position_ms > duration_ms)
        {
            kf.position_ms = duration_ms;
        }
        Ok(true)
    }

    fn insert_keyframe(
        &mut self,
        animation: AnimationId,
        position_ms: f64,
        properties: BTreeMap<PropertyKey, PropertyValue>,
    ) -> TimelineResult<KeyframeId> {
        let duration = self.duration_of(animation)?;
        let position_ms = clamp_to_phase(finite_position(position_ms)?, duration);
        for v in properties.values() {
            v.validate()?;
        }
        let id = KeyframeId(self.next_keyframe);
        self.next_keyframe = next_id(id.0, "keyframe")?;
        self.keyframes.insert(
            id,
            Keyframe {
                id,
                animation_id: animation,
                position_ms,
                properties,
                easing: None,
                name: None,
            },
        );
        Ok(id)
    }

    fn set_property(
        &mut self,
        keyframe: KeyframeId,
        key: PropertyKey,
        value: PropertyValue,
    ) -> TimelineResult<()> {
        value.validate()?;
        self.keyframe_mut(keyframe)?.properties.insert(key, value);
        Ok(())
    }

    fn remove_property(
        &mut self,
        keyframe: KeyframeId,
        key: &PropertyKey,
    ) -> TimelineResult<Option<PropertyValue>> {
        Ok(self.keyframe_mut(keyframe)?.properties.remove(key))
    }

    fn update_keyframe(
        &mut self,
        keyframe: KeyframeId,
        patch: KeyframePatch,
    ) -> TimelineResult<()> {
        let animation = self
            .keyframes
            .get(&keyframe)
            .map(|kf| kf.animation_id)
            .ok_or_else(|| TimelineError::not_found(format!("keyframe {keyframe}")))?;
        let position = match patch.position_ms {
            Some(p) => Some(clamp_to_phase(
                finite_position(p)?,
                self.duration_of(animation)?,
            )),
            None => None,
        };

        let kf = self.keyframe_mut(keyframe)?;
        if let Some(p) = position {
            kf.position_ms = p;
        }
        if let Some(easing) = patch.easing {
            kf.easing = easing;
        }
        if let Some(name) = patch.name {
            kf.name = name;
        }
        Ok(())
    }

    fn delete_keyframe(&mut self, keyframe: KeyframeId) -> TimelineResult<Keyframe> {
        self.keyframes
            .remove(&keyframe)
            .ok_or_else(|| TimelineError::not_found(format!("keyframe {keyframe}")))
    }

    fn delete_animation(&mut self, animation: AnimationId) -> TimelineResult<Animation> {
        let removed = self
            .animations
            .remove(&animation)
            .ok_or_else(|| TimelineError::not_found(format!("animation {animation}")))?;
        self.keyframes.retain(|_, kf| kf.animation_id != animation);
        Ok(removed)
    }
}

/// JSON shape of [`MemoryKeyframeStore`]: flat lists, validated on load.
#[derive(serde::Serialize, serde::Deserialize)]
struct StoreDef {
    #[serde(default)]
    animations: Vec<Animation>,
    #[serde(default)]
    keyframes: Vec<Keyframe>,
}

impl From<MemoryKeyframeStore> for StoreDef {
    fn from(store: MemoryKeyframeStore) -> Self {
        Self {
            animations: store.animations.into_values().collect(),
            keyframes: store.keyframes.into_values().collect(),
        }
    }
}

impl TryFrom<StoreDef> for MemoryKeyframeStore {
    type Error = TimelineError;

    fn try_from(def: StoreDef) -> Result<Self, Self::Error> {
        let mut store = MemoryKeyframeStore::new();
        let mut pairs = BTreeSet::new();

        for anim in def.animations {
            validate_duration(anim.duration_ms)?;
            if !pairs.insert((anim.element_id.clone(), anim.phase)) {
                return Err(TimelineError::validation(format!(
                    "duplicate animation for element '{}' phase '{}'",
                    anim.element_id, anim.phase
                )));
            }
            store.next_animation = store.next_animation.max(next_id(anim.id.0, "animation")?);
            if store.animations.insert(anim.id, anim).is_some() {
                return Err(TimelineError::validation("duplicate animation id"));
            }
        }

        for kf in def.keyframes {
            let position = finite_position(kf.position_ms)?;
            for v in kf.properties.values() {
                v.validate()?;
            }
            let Some(anim) = store.animations.get(&kf.animation_id) else {
                return Err(TimelineError::validation(format!(
                    "keyframe {} references missing animation {}",
                    kf.id, kf.animation_id
                )));
            };
            if !(0.0..=anim.duration_ms).contains(&position) {
                return Err(TimelineError::validation(format!(
                    "keyframe {} at {position}ms lies outside animation {} (0..={}ms)",
                    kf.id, anim.id, anim.duration_ms
                )));
            }
            store.next_keyframe = store.next_keyframe.max(next_id(kf.id.0, "keyframe")?);
            if store.keyframes.insert(kf.id, kf).is_some() {
                return Err(TimelineError::validation("duplicate keyframe id"));
            }
        }

        Ok(store)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/keyframes.rs"]
mod tests;
