use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

use crate::{
    engine::commit::CommitRouter,
    engine::opts::EngineOpts,
    engine::resolve::Resolver,
    flight::path::FlightPath,
    foundation::core::{ElementId, PhaseDurations},
    foundation::error::{TimelineError, TimelineResult},
    store::elements::MemoryElementStore,
    store::keyframes::MemoryKeyframeStore,
};

/// Everything the engine reads, bundled as one JSON document.
///
/// Used by the command-line tool and test fixtures. It is not the scene file format;
/// scene persistence belongs to the document layer.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Workspace {
    /// Configured phase durations.
    #[serde(default)]
    pub durations: PhaseDurations,
    /// Tolerances.
    #[serde(default)]
    pub opts: EngineOpts,
    /// Elements and their base values.
    #[serde(default)]
    pub elements: MemoryElementStore,
    /// Animations and keyframes.
    #[serde(default)]
    pub keyframes: MemoryKeyframeStore,
    /// Flight paths of map elements.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub flight_paths: BTreeMap<ElementId, FlightPath>,
}

impl Workspace {
    /// Parse a workspace from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> TimelineResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| TimelineError::serde(format!("parse workspace JSON: {e}")))
    }

    /// Parse a workspace from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> TimelineResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            TimelineError::validation(format!("open workspace JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Write pretty-printed JSON.
    pub fn to_writer<W: std::io::Write>(&self, w: W) -> TimelineResult<()> {
        serde_json::to_writer_pretty(w, self)
            .map_err(|e| TimelineError::serde(format!("write workspace JSON: {e}")))
    }

    /// Write pretty-printed JSON to a file, replacing it.
    pub fn to_path(&self, path: impl AsRef<Path>) -> TimelineResult<()> {
        let path = path.as_ref();
        let f = File::create(path).map_err(|e| {
            TimelineError::validation(format!("create workspace JSON '{}': {e}", path.display()))
        })?;
        let mut w = BufWriter::new(f);
        self.to_writer(&mut w)?;
        w.flush()
            .map_err(|e| TimelineError::Other(anyhow::Error::new(e)))
    }

    /// Read side over this workspace's stores.
    pub fn resolver(&self) -> Resolver<'_, MemoryKeyframeStore, MemoryElementStore> {
        Resolver::new(&self.keyframes, &self.elements, &self.durations).with_opts(self.opts)
    }

    /// Write side over this workspace's stores.
    pub fn router(&mut self) -> CommitRouter<'_, MemoryKeyframeStore, MemoryElementStore> {
        CommitRouter::new(&mut self.keyframes, &mut self.elements, &self.durations)
            .with_opts(self.opts)
    }

    /// Flight path of a map element, created empty on first access.
    pub fn flight_path_mut(&mut self, element: &ElementId) -> &mut FlightPath {
        self.flight_paths.entry(element.clone()).or_default()
    }
}

#[cfg(test)]
#[path = "../tests/unit/workspace.rs"]
mod tests;
