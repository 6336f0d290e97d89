use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{TimelineError, TimelineResult};

/// Animation stage of an overlay element.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Entrance.
    In,
    /// Hold / loop while on air.
    Loop,
    /// Exit.
    Out,
}

impl Phase {
    /// All phases in timeline order.
    pub const ALL: [Phase; 3] = [Phase::In, Phase::Loop, Phase::Out];

    /// Lowercase name used in JSON and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Loop => "loop",
            Self::Out => "out",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" => Ok(Self::In),
            "loop" => Ok(Self::Loop),
            "out" => Ok(Self::Out),
            other => Err(TimelineError::validation(format!(
                "unknown phase '{other}' (expected in, loop or out)"
            ))),
        }
    }
}

/// Configured duration of each phase, in milliseconds.
///
/// Owned by the editor shell; the engine only reads it. A phase may be absent, in
/// which case any math against it reports [`TimelineError::InvalidDuration`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PhaseDurations(BTreeMap<Phase, f64>);

impl Default for PhaseDurations {
    fn default() -> Self {
        Self::new(1000.0, 5000.0, 1000.0)
    }
}

impl PhaseDurations {
    /// Build a map with all three phases configured.
    pub fn new(in_ms: f64, loop_ms: f64, out_ms: f64) -> Self {
        let mut map = BTreeMap::new();
        map.insert(Phase::In, in_ms);
        map.insert(Phase::Loop, loop_ms);
        map.insert(Phase::Out, out_ms);
        Self(map)
    }

    /// Build a map with no phases configured.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Raw configured value, if any.
    pub fn get(&self, phase: Phase) -> Option<f64> {
        self.0.get(&phase).copied()
    }

    /// Configure one phase.
    pub fn set(&mut self, phase: Phase, duration_ms: f64) {
        self.0.insert(phase, duration_ms);
    }

    /// Duration of `phase`, rejecting missing, zero, negative, or non-finite values.
    pub fn require(&self, phase: Phase) -> TimelineResult<f64> {
        let Some(ms) = self.get(phase) else {
            return Err(TimelineError::invalid_duration(format!(
                "phase '{phase}' has no configured duration"
            )));
        };
        validate_duration(ms).map_err(|_| {
            TimelineError::invalid_duration(format!("phase '{phase}' duration {ms}ms is unusable"))
        })
    }
}

pub(crate) fn validate_duration(ms: f64) -> TimelineResult<f64> {
    if !ms.is_finite() || ms <= 0.0 {
        return Err(TimelineError::invalid_duration(format!(
            "duration must be a positive number of milliseconds, got {ms}"
        )));
    }
    Ok(ms)
}

/// Stable element identifier issued by the surrounding editor.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    /// Wrap an id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            Debug,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Store-issued animation identifier.
    AnimationId
);
numeric_id!(
    /// Store-issued keyframe identifier.
    KeyframeId
);
numeric_id!(
    /// Flight-path location keyframe identifier.
    LocationKeyframeId
);

/// An animatable property of an overlay element.
///
/// The set is closed for the built-in properties; element kinds that need more can use
/// namespaced [`PropertyKey::Extension`] keys such as `"chart.progress"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PropertyKey {
    /// Horizontal position.
    X,
    /// Vertical position.
    Y,
    /// Box width.
    Width,
    /// Box height.
    Height,
    /// Rotation in degrees.
    Rotation,
    /// Opacity in `[0, 1]`.
    Opacity,
    /// Uniform scale.
    Scale,
    /// Horizontal scale.
    ScaleX,
    /// Vertical scale.
    ScaleY,
    /// Fill / text color.
    Color,
    /// Background color.
    BackgroundColor,
    /// Border color.
    BorderColor,
    /// Border width.
    BorderWidth,
    /// Corner radius.
    BorderRadius,
    /// Font size.
    FontSize,
    /// Letter spacing.
    LetterSpacing,
    /// Line height.
    LineHeight,
    /// Blur radius.
    Blur,
    /// Progress of charts, bars and tickers.
    Progress,
    /// Numeric value shown by counters and gauges.
    Value,
    /// Text content.
    Text,
    /// Namespaced element-specific key (`"<namespace>.<name>"`).
    Extension(String),
}

const BUILTIN_KEYS: &[(&str, PropertyKey)] = &[
    ("x", PropertyKey::X),
    ("y", PropertyKey::Y),
    ("width", PropertyKey::Width),
    ("height", PropertyKey::Height),
    ("rotation", PropertyKey::Rotation),
    ("opacity", PropertyKey::Opacity),
    ("scale", PropertyKey::Scale),
    ("scaleX", PropertyKey::ScaleX),
    ("scaleY", PropertyKey::ScaleY),
    ("color", PropertyKey::Color),
    ("backgroundColor", PropertyKey::BackgroundColor),
    ("borderColor", PropertyKey::BorderColor),
    ("borderWidth", PropertyKey::BorderWidth),
    ("borderRadius", PropertyKey::BorderRadius),
    ("fontSize", PropertyKey::FontSize),
    ("letterSpacing", PropertyKey::LetterSpacing),
    ("lineHeight", PropertyKey::LineHeight),
    ("blur", PropertyKey::Blur),
    ("progress", PropertyKey::Progress),
    ("value", PropertyKey::Value),
    ("text", PropertyKey::Text),
];

impl PropertyKey {
    /// Parse and validate a property key.
    pub fn parse(s: &str) -> TimelineResult<Self> {
        if let Some((_, key)) = BUILTIN_KEYS.iter().find(|(name, _)| *name == s) {
            return Ok(key.clone());
        }
        if let Some((ns, name)) = s.split_once('.') {
            let valid_part = |p: &str| {
                !p.is_empty()
                    && p.chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            };
            if valid_part(ns) && valid_part(name) {
                return Ok(Self::Extension(s.to_owned()));
            }
        }
        Err(TimelineError::unknown_property(format!(
            "'{s}' is not an animatable property"
        )))
    }

    /// Canonical string form.
    pub fn as_str(&self) -> &str {
        if let Self::Extension(s) = self {
            return s;
        }
        BUILTIN_KEYS
            .iter()
            .find(|(_, key)| key == self)
            .map(|(name, _)| *name)
            .unwrap_or_default()
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyKey {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PropertyKey {
    type Error = TimelineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<PropertyKey> for String {
    fn from(key: PropertyKey) -> Self {
        key.as_str().to_owned()
    }
}

/// Value of a property, either on an element or inside a keyframe.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Numeric value.
    Number(f64),
    /// String value (colors, text content).
    Text(String),
}

impl PropertyValue {
    /// Numeric payload, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// String payload, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }

    /// Reject non-finite numbers.
    pub fn validate(&self) -> TimelineResult<()> {
        if let Self::Number(v) = self
            && !v.is_finite()
        {
            return Err(TimelineError::validation(format!(
                "property value must be finite, got {v}"
            )));
        }
        Ok(())
    }

    /// Interpret CLI/text-field input: numbers when they parse, text otherwise.
    pub fn from_input(s: &str) -> Self {
        match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Self::Number(v),
            _ => Self::Text(s.to_owned()),
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
