/// Tolerances used by resolution and commit.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineOpts {
    /// Distance in ms under which an added keyframe merges into an existing one.
    pub write_merge_tolerance_ms: f64,
    /// Distance in percent of the phase under which a keyframe counts as under the playhead.
    pub playhead_tolerance_percent: f64,
}

impl Default for EngineOpts {
    fn default() -> Self {
        Self {
            write_merge_tolerance_ms: 5.0,
            playhead_tolerance_percent: 0.05,
        }
    }
}
