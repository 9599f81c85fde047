//! One-shot annotation command.

use console::style;
use serde::Serialize;

use crate::config::Settings;
use crate::gateway::{self, GatewayError, SimilarityRequest, TextRequest};
use crate::pipeline::{self, Pipeline, PipelineError};

/// Gateway operation selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Task {
    /// Named entities
    Ner,
    /// Part-of-speech tags
    Pos,
    /// Similarity of two texts
    Similarity,
    /// Tokens, lemmas, sentences and noun phrases
    BasicAnalysis,
    /// Dependency parse
    DependencyParse,
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, GatewayError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.map_err(|e| PipelineError::Failed(e.to_string()).into())
}

/// Command-line words form a single text.
fn text_request(texts: &[String]) -> TextRequest {
    TextRequest {
        text: texts.join(" "),
    }
}

/// Run `task` over `texts` and render the response as JSON.
pub fn annotate(
    pipeline: &dyn Pipeline,
    task: Task,
    texts: Vec<String>,
    pretty: bool,
) -> Result<String, GatewayError> {
    match task {
        Task::Ner => to_json(&gateway::extract_entities(pipeline, &text_request(&texts))?, pretty),
        Task::Pos => to_json(&gateway::tag_pos(pipeline, &text_request(&texts))?, pretty),
        Task::Similarity => to_json(
            &gateway::compute_similarity(pipeline, &SimilarityRequest { texts })?,
            pretty,
        ),
        Task::BasicAnalysis => {
            to_json(&gateway::basic_analysis(pipeline, &text_request(&texts))?, pretty)
        }
        Task::DependencyParse => {
            to_json(&gateway::dependency_parse(pipeline, &text_request(&texts))?, pretty)
        }
    }
}

pub async fn cmd_annotate(
    settings: &Settings,
    task: Task,
    texts: Vec<String>,
    pretty: bool,
) -> anyhow::Result<()> {
    let pipeline = pipeline::load(&settings.model, &settings.pipeline_config())?;

    match tokio::task::spawn_blocking(move || annotate(pipeline.as_ref(), task, texts, pretty))
        .await?
    {
        Ok(json) => {
            println!("{}", json);
            Ok(())
        }
        Err(GatewayError::Validation(e)) => {
            eprintln!("{} Invalid input for {}: {}", style("✗").red(), e.field, e.message);
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
