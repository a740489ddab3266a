use serde::{Deserialize, Serialize};

/// One named stage of the transform chain.
///
/// `filter` is the resolved FFmpeg filter text (a single filter, or a
/// comma-joined pair when a stage needs a matching crop); `name` is a
/// stable identifier used for inspection and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterStage {
    pub name: String,
    pub filter: String,
}

/// An ordered, immutable chain of filter stages.
///
/// Built once per render request and consumed exactly once by the render
/// orchestrator. Omitted stages simply never enter the chain; rendering
/// re-labels the remaining stages so the graph always stays connected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterGraph {
    stages: Vec<FilterStage>,
}

/// Label of the graph's video input stream.
pub const INPUT_LABEL: &str = "[0:v]";
/// Label the finished chain leaves its output on.
pub const OUTPUT_LABEL: &str = "[vout]";

impl FilterGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage to the end of the chain.
    pub fn push(&mut self, name: impl Into<String>, filter: impl Into<String>) {
        self.stages.push(FilterStage {
            name: name.into(),
            filter: filter.into(),
        });
    }

    /// The ordered stages.
    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    /// Find a stage by name.
    pub fn stage(&self, name: &str) -> Option<&FilterStage> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// True when no stage was emitted.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Render the chain as an FFmpeg `-filter_complex` argument:
    /// `[0:v]f1[v0];[v0]f2[v1];...;[vN]fLast[vout]`.
    pub fn to_filter_complex(&self) -> String {
        if self.stages.is_empty() {
            return format!("{}null{}", INPUT_LABEL, OUTPUT_LABEL);
        }
        let mut out = String::new();
        let last = self.stages.len() - 1;
        for (i, stage) in self.stages.iter().enumerate() {
            let input = if i == 0 {
                INPUT_LABEL.to_string()
            } else {
                format!("[v{}]", i - 1)
            };
            let output = if i == last {
                OUTPUT_LABEL.to_string()
            } else {
                format!("[v{}]", i)
            };
            if i > 0 {
                out.push(';');
            }
            out.push_str(&input);
            out.push_str(&stage.filter);
            out.push_str(&output);
        }
        out
    }
}

impl Default for FilterGraph {
    fn default() -> Self {
        Self::new()
    }
}
