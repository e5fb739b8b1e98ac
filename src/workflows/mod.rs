//! The three analysis workflows.
//!
//! Each workflow is a single-shot request-response: build a prompt from its
//! template plus the dataset context, invoke the completion backend once,
//! and pipe the raw text through the extraction layer into a typed result
//! or a typed failure. No retry, no streaming, no queuing of in-flight
//! requests.

mod design;
mod hypotheses;
mod literature;

pub use design::*;
pub use hypotheses::*;
pub use literature::*;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A generated hypothesis. Produced only from extractor output; fields the
/// model omitted (or that were lost to truncation salvage) default to
/// empty rather than failing the whole response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Hypothesis {
    pub rank: u32,
    pub title: String,
    pub statement: String,
    pub evidence: Vec<String>,
    pub mechanism: String,
    pub bayesian: BayesianEstimate,
    pub predictions: Vec<String>,
    pub literature_support: String,
    pub alternatives: String,
}

/// Subjective Bayesian probability estimate attached to a hypothesis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BayesianEstimate {
    pub prior: f64,
    pub prior_rationale: String,
    pub likelihood: f64,
    pub likelihood_rationale: String,
    pub posterior: f64,
    pub confidence_interval: [f64; 2],
}

/// Preset research focus for hypothesis generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HypothesisFocus {
    PathwayDysregulation,
    EnzymeActivity,
    OxidativeStress,
    EnergyMetabolism,
    DiseaseBiomarkers,
}

impl HypothesisFocus {
    /// Research question this focus expands to.
    pub fn question(self) -> &'static str {
        match self {
            Self::PathwayDysregulation => {
                "Which metabolic pathways are dysregulated, and what upstream \
                 regulation explains the observed pattern?"
            }
            Self::EnzymeActivity => {
                "Which enzyme activity changes would produce the observed \
                 substrate and product shifts?"
            }
            Self::OxidativeStress => {
                "Does the metabolite pattern indicate an oxidative-stress \
                 response, and through which redox couples?"
            }
            Self::EnergyMetabolism => {
                "How has central energy metabolism shifted between the two \
                 conditions?"
            }
            Self::DiseaseBiomarkers => {
                "Which changed metabolites are plausible disease biomarkers, \
                 and by what mechanism?"
            }
        }
    }
}

impl fmt::Display for HypothesisFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PathwayDysregulation => "pathway-dysregulation",
            Self::EnzymeActivity => "enzyme-activity",
            Self::OxidativeStress => "oxidative-stress",
            Self::EnergyMetabolism => "energy-metabolism",
            Self::DiseaseBiomarkers => "disease-biomarkers",
        };
        f.write_str(name)
    }
}

impl FromStr for HypothesisFocus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pathway-dysregulation" => Ok(Self::PathwayDysregulation),
            "enzyme-activity" => Ok(Self::EnzymeActivity),
            "oxidative-stress" => Ok(Self::OxidativeStress),
            "energy-metabolism" => Ok(Self::EnergyMetabolism),
            "disease-biomarkers" => Ok(Self::DiseaseBiomarkers),
            other => Err(format!("unknown hypothesis focus: {}", other)),
        }
    }
}

/// What to ask for during hypothesis generation: a preset focus or a
/// custom research question.
#[derive(Debug, Clone, PartialEq)]
pub enum HypothesisQuery {
    Focus(HypothesisFocus),
    Custom(String),
}

impl HypothesisQuery {
    /// Combine an optional focus selection with a free-text question.
    ///
    /// Returns `None` when neither is provided; the workflow is then a
    /// no-op rather than an error. A non-empty custom question wins over
    /// the preset.
    pub fn from_parts(focus: Option<HypothesisFocus>, custom: &str) -> Option<Self> {
        let custom = custom.trim();
        if !custom.is_empty() {
            Some(Self::Custom(custom.to_string()))
        } else {
            focus.map(Self::Focus)
        }
    }

    /// The research question to put in the prompt.
    pub fn question(&self) -> &str {
        match self {
            Self::Focus(focus) => focus.question(),
            Self::Custom(question) => question,
        }
    }
}
