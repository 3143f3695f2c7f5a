use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::core::Transform;
use crate::foundation::error::{StewieError, StewieResult};
use crate::sequence::{Sequencer, Step};

/// Serializable motion program: the JSON form of a [`Sequencer`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Program {
    #[serde(default)]
    pub looping: bool,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default)]
    pub initial: Transform,
    /// Steps run once before the (possibly looping) body.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intro: Vec<Step>,
    pub steps: Vec<Step>,
}

fn default_tick_ms() -> u64 {
    20
}

impl Program {
    pub fn new(initial: Transform, steps: Vec<Step>) -> Self {
        Self {
            looping: false,
            tick_ms: default_tick_ms(),
            initial,
            intro: Vec::new(),
            steps,
        }
    }

    pub fn from_json_str(s: &str) -> StewieResult<Self> {
        let program: Self = serde_json::from_str(s)?;
        program.validate()?;
        Ok(program)
    }

    pub fn from_path(path: &Path) -> StewieResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read program '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> StewieResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> StewieResult<()> {
        if self.tick_ms == 0 {
            return Err(StewieError::validation("tick_ms must be > 0"));
        }
        self.sequencer().validate()
    }

    pub fn sequencer(&self) -> Sequencer {
        Sequencer::new(self.initial.clone(), self.steps.clone())
            .with_intro(self.intro.clone())
            .with_tick(Duration::from_millis(self.tick_ms))
            .looping(self.looping)
    }
}
