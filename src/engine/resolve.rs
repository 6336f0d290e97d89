use crate::{
    engine::opts::EngineOpts,
    foundation::core::{
        AnimationId, ElementId, KeyframeId, Phase, PhaseDurations, PropertyKey, PropertyValue,
    },
    store::elements::ElementStore,
    store::keyframes::KeyframeStore,
    time::algebra::clamp_to_phase,
};

/// Editor selection and playhead, snapshotted fresh for every call.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SelectionContext {
    /// Phase currently shown on the timeline.
    pub phase: Phase,
    /// Playhead in ms from the start of `phase`.
    pub playhead_ms: f64,
    /// Keyframe selected on the timeline, if any.
    #[serde(default)]
    pub selected_keyframe: Option<KeyframeId>,
    /// Element selected on the canvas, if any.
    #[serde(default)]
    pub selected_element: Option<ElementId>,
}

impl SelectionContext {
    /// Context with nothing selected.
    pub fn at(phase: Phase, playhead_ms: f64) -> Self {
        Self {
            phase,
            playhead_ms,
            selected_keyframe: None,
            selected_element: None,
        }
    }

    /// Same context with `keyframe` selected.
    pub fn with_selected(mut self, keyframe: KeyframeId) -> Self {
        self.selected_keyframe = Some(keyframe);
        self
    }
}

/// Animation status of a property, driving the keyframe toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiamondState {
    /// Not animated in this phase; adding creates the first keyframe.
    None,
    /// Keyframes exist elsewhere on the timeline.
    Exists,
    /// A keyframe for this property sits under the playhead.
    AtPlayhead,
    /// The selected keyframe of this element animates this property.
    Selected,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// What a property editor should show.
pub struct Resolution {
    /// Value to display; `None` when the element has no base value for the key.
    pub display_value: Option<PropertyValue>,
    /// Animation status affordance.
    pub diamond: DiamondState,
}

/// Facts about one property derived from current store state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropertyFacts {
    /// The element's animation for the context phase.
    pub animation: Option<AnimationId>,
    /// Some keyframe of that animation defines the property.
    pub has_keyframes: bool,
    /// Keyframe under the playhead that defines the property.
    pub keyframe_at_playhead: Option<KeyframeId>,
    /// Selected keyframe, only if it belongs to this element's animation for the phase.
    pub selected_for_element: Option<KeyframeId>,
    /// `selected_for_element` defines the property.
    pub has_value_in_selected: bool,
}

impl PropertyFacts {
    /// Classify in priority order: selected, at-playhead, exists, none.
    pub fn diamond(&self) -> DiamondState {
        if self.has_value_in_selected {
            DiamondState::Selected
        } else if self.keyframe_at_playhead.is_some() {
            DiamondState::AtPlayhead
        } else if self.has_keyframes {
            DiamondState::Exists
        } else {
            DiamondState::None
        }
    }
}

pub(crate) fn derive_facts<K>(
    keyframes: &K,
    durations: &PhaseDurations,
    opts: &EngineOpts,
    element: &ElementId,
    key: &PropertyKey,
    ctx: &SelectionContext,
) -> PropertyFacts
where
    K: KeyframeStore + ?Sized,
{
    let Some(anim) = keyframes.find_animation(element, ctx.phase) else {
        if let Some(sel) = ctx.selected_keyframe {
            note_foreign_selection(keyframes, sel);
        }
        return PropertyFacts::default();
    };
    let kfs = keyframes.keyframes_for(anim.id);
    let has_keyframes = kfs.iter().any(|kf| kf.defines(key));

    // Compared unrounded: the 0.1% display rounding is coarser than the tolerance.
    let keyframe_at_playhead = match durations.require(ctx.phase) {
        Ok(d) if ctx.playhead_ms.is_finite() => {
            let playhead = clamp_to_phase(ctx.playhead_ms, d);
            kfs.iter()
                .filter(|kf| kf.defines(key))
                .find(|kf| {
                    ((kf.position_ms - playhead) / d * 100.0).abs()
                        < opts.playhead_tolerance_percent
                })
                .map(|kf| kf.id)
        }
        Ok(_) => {
            tracing::debug!(playhead_ms = ctx.playhead_ms, "skipping playhead match");
            None
        }
        Err(err) => {
            tracing::debug!(%err, "skipping playhead match");
            None
        }
    };

    let selected = ctx.selected_keyframe.and_then(|sel| {
        let kf = keyframes.keyframe(sel);
        match kf {
            Some(kf) if kf.animation_id == anim.id => Some(kf),
            _ => {
                note_foreign_selection(keyframes, sel);
                None
            }
        }
    });

    PropertyFacts {
        animation: Some(anim.id),
        has_keyframes,
        keyframe_at_playhead,
        selected_for_element: selected.map(|kf| kf.id),
        has_value_in_selected: selected.is_some_and(|kf| kf.defines(key)),
    }
}

fn note_foreign_selection<K>(keyframes: &K, sel: KeyframeId)
where
    K: KeyframeStore + ?Sized,
{
    match keyframes.keyframe(sel) {
        None => tracing::debug!(keyframe = %sel, "orphan selection: keyframe no longer exists"),
        Some(kf) if keyframes.animation(kf.animation_id).is_none() => {
            tracing::debug!(keyframe = %sel, "orphan selection: animation no longer exists")
        }
        Some(_) => {}
    }
}

/// Read side of the engine: effective display value and diamond state.
pub struct Resolver<'a, K: ?Sized, E: ?Sized> {
    keyframes: &'a K,
    elements: &'a E,
    durations: &'a PhaseDurations,
    opts: EngineOpts,
}

impl<'a, K, E> Resolver<'a, K, E>
where
    K: KeyframeStore + ?Sized,
    E: ElementStore + ?Sized,
{
    /// Borrow the stores with default tolerances.
    pub fn new(keyframes: &'a K, elements: &'a E, durations: &'a PhaseDurations) -> Self {
        Self {
            keyframes,
            elements,
            durations,
            opts: EngineOpts::default(),
        }
    }

    /// Override tolerances.
    pub fn with_opts(mut self, opts: EngineOpts) -> Self {
        self.opts = opts;
        self
    }

    /// Facts behind [`Resolver::resolve`], for callers that need more than the affordance.
    pub fn facts(
        &self,
        element: &ElementId,
        key: &PropertyKey,
        ctx: &SelectionContext,
    ) -> PropertyFacts {
        derive_facts(self.keyframes, self.durations, &self.opts, element, key, ctx)
    }

    /// Resolve what the editor for `key` on `element` should display.
    ///
    /// The selected keyframe's value wins only when that keyframe belongs to this
    /// element's animation for the context phase and animates the key; everything
    /// else shows the base value. Being under the playhead changes the affordance, not
    /// the value.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn resolve(
        &self,
        element: &ElementId,
        key: &PropertyKey,
        ctx: &SelectionContext,
    ) -> Resolution {
        let facts = self.facts(element, key, ctx);
        let selected_value = facts
            .selected_for_element
            .filter(|_| facts.has_value_in_selected)
            .and_then(|id| self.keyframes.keyframe(id))
            .and_then(|kf| kf.value(key).cloned());

        Resolution {
            display_value: selected_value.or_else(|| self.elements.get_property(element, key)),
            diamond: facts.diamond(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/resolve.rs"]
mod tests;
