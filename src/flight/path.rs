use crate::{
    animation::ease::Ease,
    flight::camera::{CameraState, LocationCandidate},
    foundation::core::{LocationKeyframeId, Phase},
    foundation::error::{TimelineError, TimelineResult},
};

/// Options for [`FlightPath`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FlightPathOpts {
    /// Time step between successive appended keyframes.
    pub append_spacing_ms: f64,
}

impl Default for FlightPathOpts {
    fn default() -> Self {
        Self {
            append_spacing_ms: 2000.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One camera stop on a map flight.
pub struct LocationKeyframe {
    /// Id unique within the path.
    pub id: LocationKeyframeId,
    /// Absolute time from the start of the flight.
    pub time_ms: f64,
    /// Camera at this stop.
    #[serde(flatten)]
    pub camera: CameraState,
    /// Easing toward the next stop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<Ease>,
    /// Human label, e.g. the searched place name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Display / filter tag; never affects ordering or timing.
    pub phase: Phase,
}

/// Field edits for a [`LocationKeyframe`]; `None` leaves a field as is.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocationPatch {
    /// New time.
    pub time_ms: Option<f64>,
    /// New longitude.
    pub longitude: Option<f64>,
    /// New latitude.
    pub latitude: Option<f64>,
    /// New zoom.
    pub zoom: Option<f64>,
    /// New pitch; `Some(None)` clears it.
    pub pitch: Option<Option<f64>>,
    /// New bearing; `Some(None)` clears it.
    pub bearing: Option<Option<f64>>,
    /// New easing; `Some(None)` clears it.
    pub easing: Option<Option<Ease>>,
    /// New label; `Some(None)` clears it.
    pub label: Option<Option<String>>,
    /// New phase tag.
    pub phase: Option<Phase>,
}

/// Read model for the preview panel.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SequenceSummary {
    /// Keyframes in time order, optionally filtered by phase.
    pub keyframes: Vec<LocationKeyframe>,
    /// Latest time across all keyframes, filtered or not.
    pub total_duration_ms: f64,
}

/// Ordered camera keyframes stored on a map element.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlightPath {
    /// Keyframes in insertion order.
    #[serde(default)]
    pub keyframes: Vec<LocationKeyframe>,
    #[serde(skip)]
    opts: FlightPathOpts,
}

impl FlightPath {
    /// Empty path with default spacing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override options.
    pub fn with_opts(mut self, opts: FlightPathOpts) -> Self {
        self.opts = opts;
        self
    }

    fn next_id(&self) -> TimelineResult<LocationKeyframeId> {
        match self.keyframes.iter().map(|k| k.id.0).max() {
            None => Ok(LocationKeyframeId(0)),
            Some(max) => max.checked_add(1).map(LocationKeyframeId).ok_or_else(|| {
                TimelineError::validation(format!("location keyframe id {max} leaves no room"))
            }),
        }
    }

    /// Append the current camera, spaced after the existing stops.
    pub fn append(
        &mut self,
        camera: CameraState,
        phase: Phase,
    ) -> TimelineResult<LocationKeyframeId> {
        camera.validate()?;
        let id = self.next_id()?;
        let time_ms = self.keyframes.len() as f64 * self.opts.append_spacing_ms;
        self.keyframes.push(LocationKeyframe {
            id,
            time_ms,
            camera,
            easing: None,
            label: None,
            phase,
        });
        tracing::debug!(id = %id, time_ms, %phase, "appended location keyframe");
        Ok(id)
    }

    /// Append a search result as a stop labelled with its name.
    pub fn append_candidate(
        &mut self,
        candidate: &LocationCandidate,
        phase: Phase,
    ) -> TimelineResult<LocationKeyframeId> {
        let id = self.append(candidate.camera(), phase)?;
        if let Some(kf) = self.keyframes.iter_mut().find(|k| k.id == id) {
            kf.label = Some(candidate.name.clone());
        }
        Ok(id)
    }

    /// Look up a stop.
    pub fn get(&self, id: LocationKeyframeId) -> Option<&LocationKeyframe> {
        self.keyframes.iter().find(|k| k.id == id)
    }

    /// Edit fields of a stop. The edit is rejected as a whole if the result is invalid.
    pub fn update(&mut self, id: LocationKeyframeId, patch: LocationPatch) -> TimelineResult<()> {
        let kf = self
            .keyframes
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or_else(|| TimelineError::not_found(format!("location keyframe {id}")))?;

        let mut next = kf.clone();
        if let Some(t) = patch.time_ms {
            if !t.is_finite() || t < 0.0 {
                return Err(TimelineError::validation(format!(
                    "location keyframe time must be a non-negative number, got {t}"
                )));
            }
            next.time_ms = t;
        }
        if let Some(v) = patch.longitude {
            next.camera.longitude = v;
        }
        if let Some(v) = patch.latitude {
            next.camera.latitude = v;
        }
        if let Some(v) = patch.zoom {
            next.camera.zoom = v;
        }
        if let Some(v) = patch.pitch {
            next.camera.pitch = v;
        }
        if let Some(v) = patch.bearing {
            next.camera.bearing = v;
        }
        if let Some(v) = patch.easing {
            next.easing = v;
        }
        if let Some(v) = patch.label {
            next.label = v;
        }
        if let Some(v) = patch.phase {
            next.phase = v;
        }
        next.camera.validate()?;

        *kf = next;
        Ok(())
    }

    /// Remove a stop.
    pub fn remove(&mut self, id: LocationKeyframeId) -> TimelineResult<LocationKeyframe> {
        let idx = self
            .keyframes
            .iter()
            .position(|k| k.id == id)
            .ok_or_else(|| TimelineError::not_found(format!("location keyframe {id}")))?;
        Ok(self.keyframes.remove(idx))
    }

    /// All stops by ascending time; equal times keep insertion order.
    pub fn sorted(&self) -> Vec<&LocationKeyframe> {
        let mut out: Vec<&LocationKeyframe> = self.keyframes.iter().collect();
        out.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));
        out
    }

    /// Sorted stops, restricted to one phase tag when given.
    pub fn filtered(&self, phase: Option<Phase>) -> Vec<&LocationKeyframe> {
        self.sorted()
            .into_iter()
            .filter(|k| phase.is_none_or(|p| k.phase == p))
            .collect()
    }

    /// Latest stop time; zero for an empty path.
    pub fn total_duration_ms(&self) -> f64 {
        self.keyframes
            .iter()
            .map(|k| k.time_ms)
            .fold(0.0, f64::max)
    }

    /// Sorted, optionally filtered stops plus the total duration.
    pub fn sequence_summary(&self, phase: Option<Phase>) -> SequenceSummary {
        SequenceSummary {
            keyframes: self.filtered(phase).into_iter().cloned().collect(),
            total_duration_ms: self.total_duration_ms(),
        }
    }

    /// Interpolated camera at `ms`, ignoring phase tags.
    ///
    /// Holds the first stop before it and the last stop after it.
    pub fn camera_at(&self, ms: f64) -> Option<CameraState> {
        let keys = self.sorted();
        let first = keys.first()?;
        let idx = keys.partition_point(|k| k.time_ms <= ms);
        if idx == 0 {
            return Some(first.camera);
        }
        if idx >= keys.len() {
            return Some(keys[keys.len() - 1].camera);
        }

        let (a, b) = (keys[idx - 1], keys[idx]);
        let span = b.time_ms - a.time_ms;
        if span <= 0.0 {
            return Some(a.camera);
        }
        let t = a.easing.unwrap_or_default().apply((ms - a.time_ms) / span);
        Some(a.camera.lerp(&b.camera, t))
    }
}

/// Parse the inspector's time field: seconds, optionally suffixed with `s`.
///
/// Returns milliseconds, or `None` for negative or unparseable input.
pub fn parse_seconds_input(text: &str) -> Option<f64> {
    let t = text.trim();
    let t = t.strip_suffix('s').unwrap_or(t).trim();
    if t.is_empty() || !t.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    t.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|secs| secs * 1000.0)
}

#[cfg(test)]
#[path = "../../tests/unit/flight/path.rs"]
mod tests;
