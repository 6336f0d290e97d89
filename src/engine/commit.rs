use crate::{
    engine::opts::EngineOpts,
    engine::resolve::{PropertyFacts, Resolution, Resolver, SelectionContext, derive_facts},
    foundation::core::{ElementId, KeyframeId, PhaseDurations, PropertyKey, PropertyValue},
    foundation::error::{TimelineError, TimelineResult},
    store::elements::ElementStore,
    store::keyframes::{KeyframeStore, UpsertOutcome},
};

/// Where a committed edit was written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "target", content = "keyframe")]
pub enum CommitTarget {
    /// The selected keyframe's existing override was overwritten.
    Keyframe(KeyframeId),
    /// The element's base value was written.
    Base,
}

/// Write side of the engine.
///
/// Every call re-derives selection facts from the stores as they are at that moment;
/// nothing is cached between calls.
pub struct CommitRouter<'a, K: ?Sized, E: ?Sized> {
    keyframes: &'a mut K,
    elements: &'a mut E,
    durations: &'a PhaseDurations,
    opts: EngineOpts,
}

impl<'a, K, E> CommitRouter<'a, K, E>
where
    K: KeyframeStore + ?Sized,
    E: ElementStore + ?Sized,
{
    /// Borrow the stores with default tolerances.
    pub fn new(keyframes: &'a mut K, elements: &'a mut E, durations: &'a PhaseDurations) -> Self {
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

    /// Resolve against the same stores this router writes to.
    pub fn resolve(
        &self,
        element: &ElementId,
        key: &PropertyKey,
        ctx: &SelectionContext,
    ) -> Resolution {
        Resolver::new(&*self.keyframes, &*self.elements, self.durations)
            .with_opts(self.opts)
            .resolve(element, key, ctx)
    }

    fn facts(
        &self,
        element: &ElementId,
        key: &PropertyKey,
        ctx: &SelectionContext,
    ) -> PropertyFacts {
        derive_facts(&*self.keyframes, self.durations, &self.opts, element, key, ctx)
    }

    /// Apply an edit from a property editor.
    ///
    /// Overwrites the selected keyframe's value only when that keyframe belongs to
    /// this element's animation for the phase and already animates `key`. Otherwise
    /// the base value is written; a selected keyframe that lacks the key is not
    /// extended.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn commit(
        &mut self,
        element: &ElementId,
        key: &PropertyKey,
        value: PropertyValue,
        ctx: &SelectionContext,
    ) -> TimelineResult<CommitTarget> {
        value.validate()?;
        let facts = self.facts(element, key, ctx);

        if let Some(kf) = facts
            .selected_for_element
            .filter(|_| facts.has_value_in_selected)
        {
            self.keyframes.set_property(kf, key.clone(), value)?;
            tracing::debug!(keyframe = %kf, "committed to selected keyframe");
            return Ok(CommitTarget::Keyframe(kf));
        }

        self.elements.set_property(element, key.clone(), value)?;
        tracing::debug!("committed to base value");
        Ok(CommitTarget::Base)
    }

    /// The explicit "add keyframe" action.
    ///
    /// Writes `value` at the playhead (rounded, clamped to the phase) through the
    /// store's find-or-create and write-merge logic, regardless of selection.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn add_keyframe(
        &mut self,
        element: &ElementId,
        key: &PropertyKey,
        value: PropertyValue,
        ctx: &SelectionContext,
    ) -> TimelineResult<UpsertOutcome> {
        if !ctx.playhead_ms.is_finite() {
            return Err(TimelineError::validation(format!(
                "playhead must be finite, got {}",
                ctx.playhead_ms
            )));
        }
        value.validate()?;
        let duration = self.durations.require(ctx.phase)?;
        let position = ctx.playhead_ms.round().clamp(0.0, duration);

        let animation = self
            .keyframes
            .find_or_create_animation(element, ctx.phase, duration)?;
        let out = self.keyframes.upsert_property_at(
            animation,
            position,
            key.clone(),
            value,
            self.opts.write_merge_tolerance_ms,
        )?;
        tracing::debug!(keyframe = %out.keyframe, merged = out.merged, position, "added keyframe");
        Ok(out)
    }

    /// Stop animating `key` at one keyframe. The keyframe itself stays on the timeline.
    pub fn remove_keyframe_property(
        &mut self,
        keyframe: KeyframeId,
        key: &PropertyKey,
    ) -> TimelineResult<Option<PropertyValue>> {
        self.keyframes.remove_property(keyframe, key)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/commit.rs"]
mod tests;
