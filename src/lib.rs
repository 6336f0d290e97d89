//! Keyframe resolution and commit engine for timed broadcast overlays.
//!
//! Overlay elements (titles, tickers, maps, charts) animate through three phases:
//! `in`, `loop` and `out`. Each animatable property either holds a static base value
//! or is overridden by keyframes positioned inside a phase. This crate answers the
//! two questions an inspector panel asks for every property:
//!
//! 1. **Resolve**: what value should the editor show, and what is the property's
//!    animation status ([`DiamondState`])?
//! 2. **Commit**: when the user edits the field, should the edit land on the selected
//!    keyframe or on the element's base value?
//!
//! # Layout
//!
//! - Time algebra: [`ms_to_percent`], [`parse_time_input`], [`format_ms`].
//! - Stores: [`KeyframeStore`] / [`ElementStore`] traits with in-memory implementations.
//! - Engine: [`Resolver`] (read side) and [`CommitRouter`] (write side). Both borrow the
//!   stores and a [`PhaseDurations`] map, and take a fresh [`SelectionContext`] on every call.
//! - Flight paths: [`FlightPath`], the camera keyframe sequence of map elements.
//!
//! Rendering, undo/redo and scene persistence live outside this crate.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod engine;
mod flight;
mod foundation;
mod store;
mod time;
mod workspace;

pub use animation::ease::Ease;
pub use animation::sample::sample_property;
pub use engine::commit::{CommitRouter, CommitTarget};
pub use engine::opts::EngineOpts;
pub use engine::resolve::{DiamondState, PropertyFacts, Resolution, Resolver, SelectionContext};
pub use flight::camera::{CameraState, LocationCandidate};
pub use flight::path::{
    FlightPath, FlightPathOpts, LocationKeyframe, LocationPatch, SequenceSummary,
    parse_seconds_input,
};
pub use foundation::core::{
    AnimationId, ElementId, KeyframeId, LocationKeyframeId, Phase, PhaseDurations, PropertyKey,
    PropertyValue,
};
pub use foundation::error::{TimelineError, TimelineResult};
pub use store::elements::{Element, ElementStore, MemoryElementStore};
pub use store::keyframes::{
    Animation, Keyframe, KeyframePatch, KeyframeStore, MemoryKeyframeStore, UpsertOutcome,
};
pub use time::algebra::{clamp_to_phase, format_ms, ms_to_percent, parse_time_input, percent_to_ms};
pub use workspace::Workspace;
