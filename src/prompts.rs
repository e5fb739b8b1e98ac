//! Centralized prompt definitions for the three analysis workflows.
//!
//! Each system prompt pins the JSON shape the workflow expects back; the
//! schemas are a contract offered to the model, not enforced here. The
//! extraction layer salvages whatever structured data actually comes back.

/// System prompt for hypothesis generation. Expects a JSON array.
pub const HYPOTHESIS_SYSTEM_PROMPT: &str = r#"You are a metabolomics research scientist generating mechanistic hypotheses from differential-abundance data.

Your response MUST be a valid JSON array of exactly 3 hypothesis objects, ranked by posterior probability, in this exact format:
[
  {
    "rank": 1,
    "title": "short hypothesis title",
    "statement": "one-sentence falsifiable hypothesis",
    "evidence": ["observation from the dataset supporting this"],
    "mechanism": "proposed biochemical mechanism",
    "bayesian": {
      "prior": 0.3,
      "priorRationale": "why this prior",
      "likelihood": 0.7,
      "likelihoodRationale": "why this likelihood",
      "posterior": 0.6,
      "confidenceInterval": [0.4, 0.8]
    },
    "predictions": ["testable prediction"],
    "literatureSupport": "known findings consistent with this hypothesis",
    "alternatives": "competing explanations and why they are less likely"
  }
]

Guidelines:
- Ground every hypothesis in the metabolites listed in the dataset summary
- Probabilities are subjective Bayesian estimates between 0.0 and 1.0
- rank 1 is the highest-posterior hypothesis
- Respond with the JSON array only, no other text."#;

/// System prompt for experimental design. Expects a JSON object.
pub const DESIGN_SYSTEM_PROMPT: &str = r#"You are a metabolomics research scientist designing a validation experiment for a given hypothesis.

Your response MUST be a single valid JSON object in this format:
{
  "title": "protocol title",
  "objective": "what the experiment will establish",
  "phases": [
    {
      "name": "phase name",
      "duration": "estimated duration",
      "steps": ["ordered step"],
      "controls": ["control condition"],
      "readouts": ["measured variable"]
    }
  ],
  "equipment": ["required instrument"],
  "expectedOutcomes": {
    "ifSupported": "observation if the hypothesis holds",
    "ifRefuted": "observation if it does not"
  },
  "pitfalls": ["likely failure mode and mitigation"]
}

Respond with the JSON object only, no other text."#;

/// System prompt for literature analysis. Expects a JSON object.
pub const LITERATURE_SYSTEM_PROMPT: &str = r#"You are a metabolomics literature analyst summarizing published work relevant to a differential-abundance dataset.

Your response MUST be a single valid JSON object in this format:
{
  "overview": "summary of the relevant literature landscape",
  "keyFindings": [
    {
      "finding": "published result relevant to the dataset",
      "relevance": "how it relates to the observed changes",
      "citation": "author-year style reference"
    }
  ],
  "consensusAreas": ["points of agreement in the field"],
  "controversies": ["open disputes or conflicting results"],
  "gaps": ["questions the literature does not answer"]
}

Respond with the JSON object only, no other text."#;

/// Task instructions appended after the dataset context for hypothesis
/// generation.
pub fn hypothesis_task(question: &str) -> String {
    format!(
        "TASK\nGenerate 3 ranked mechanistic hypotheses for this research question: {}\n\
         Base them on the dataset summary above.",
        question
    )
}

/// Task instructions for experimental design.
pub fn design_task(title: &str, statement: &str) -> String {
    format!(
        "TASK\nDesign a validation experiment for this hypothesis.\n\
         Hypothesis: {}\nStatement: {}",
        title, statement
    )
}

/// Task instructions for literature analysis.
pub fn literature_task() -> String {
    "TASK\nSummarize the published literature most relevant to the significant \
     metabolite changes in the dataset summary above."
        .to_string()
}
