use crate::foundation::error::{TimelineError, TimelineResult};

/// Map camera as captured from the map editor.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraState {
    /// Degrees east, `[-180, 180]`.
    pub longitude: f64,
    /// Degrees north, `[-90, 90]`.
    pub latitude: f64,
    /// Web-map zoom level.
    pub zoom: f64,
    /// Tilt in degrees, `[0, 85]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    /// Heading in degrees clockwise from north.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
}

pub(crate) const MAX_PITCH_DEG: f64 = 85.0;

impl CameraState {
    /// Camera looking straight down with no rotation.
    pub fn new(longitude: f64, latitude: f64, zoom: f64) -> Self {
        Self {
            longitude,
            latitude,
            zoom,
            pitch: None,
            bearing: None,
        }
    }

    /// Check coordinate ranges.
    pub fn validate(&self) -> TimelineResult<()> {
        let finite = [self.longitude, self.latitude, self.zoom]
            .into_iter()
            .chain(self.pitch)
            .chain(self.bearing)
            .all(f64::is_finite);
        if !finite {
            return Err(TimelineError::validation("camera values must be finite"));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(TimelineError::validation(format!(
                "longitude {} outside [-180, 180]",
                self.longitude
            )));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(TimelineError::validation(format!(
                "latitude {} outside [-90, 90]",
                self.latitude
            )));
        }
        if self.zoom < 0.0 {
            return Err(TimelineError::validation(format!(
                "zoom {} must not be negative",
                self.zoom
            )));
        }
        if let Some(p) = self.pitch
            && !(0.0..=MAX_PITCH_DEG).contains(&p)
        {
            return Err(TimelineError::validation(format!(
                "pitch {p} outside [0, {MAX_PITCH_DEG}]"
            )));
        }
        Ok(())
    }

    /// Interpolate toward `other`. Longitude and bearing take the shorter way round.
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        let opt = |a: Option<f64>, b: Option<f64>, f: &dyn Fn(f64, f64) -> f64| match (a, b) {
            (None, None) => None,
            (a, b) => Some(f(a.unwrap_or(0.0), b.unwrap_or(0.0))),
        };
        let angle = |a: f64, b: f64| lerp_angle(a, b, t);
        Self {
            longitude: lerp_angle(self.longitude, other.longitude, t),
            latitude: lerp(self.latitude, other.latitude),
            zoom: lerp(self.zoom, other.zoom),
            pitch: opt(self.pitch, other.pitch, &lerp),
            bearing: opt(self.bearing, other.bearing, &angle),
        }
    }
}

fn wrap_degrees(deg: f64) -> f64 {
    let w = (deg + 180.0).rem_euclid(360.0) - 180.0;
    // Keep +180 reachable so an endpoint of exactly 180 survives t = 1.
    if w == -180.0 && deg > 0.0 { 180.0 } else { w }
}

fn lerp_angle(a: f64, b: f64, t: f64) -> f64 {
    let delta = wrap_degrees(b - a);
    wrap_degrees(a + delta * t)
}

/// A place returned by the map search collaborator.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LocationCandidate {
    /// Display name of the place.
    pub name: String,
    /// Degrees east.
    pub longitude: f64,
    /// Degrees north.
    pub latitude: f64,
    /// Suggested zoom.
    pub zoom: f64,
    /// Suggested tilt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    /// Suggested heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
}

impl LocationCandidate {
    /// Camera framing this candidate ("jump to").
    pub fn camera(&self) -> CameraState {
        CameraState {
            longitude: self.longitude,
            latitude: self.latitude,
            zoom: self.zoom,
            pitch: self.pitch,
            bearing: self.bearing,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/flight/camera.rs"]
mod tests;
