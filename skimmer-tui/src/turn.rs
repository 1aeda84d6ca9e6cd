use skimmer_common::{LlmProvider, Result};
use skimmer_llm::ConversationHandle;
use skimmer_pipeline::{Digest, DigestRequest, Pipeline, PipelineEvent, PipelineFactory};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Input of one chat turn, snapshotted from the session when it starts.
pub struct TurnRequest {
    pub provider: LlmProvider,
    pub prompt: String,
    pub conversation: Option<ConversationHandle>,
    /// Cached pipeline for `provider`, if one was built earlier.
    pub pipeline: Option<Arc<Pipeline>>,
    /// Stops the run early; the extractor is still closed.
    pub cancel: CancellationToken,
}

pub struct TurnOutcome {
    pub provider: LlmProvider,
    /// The pipeline used, handed back for caching.
    pub pipeline: Option<Arc<Pipeline>>,
    /// `None` when the turn was cancelled before it finished.
    pub result: Option<Result<Digest>>,
}

/// Build (or reuse) the pipeline, launch a fresh extractor, run the prompt,
/// and close the extractor again.
pub async fn run_turn(
    factory: &dyn PipelineFactory,
    request: TurnRequest,
    events: Option<&UnboundedSender<PipelineEvent>>,
) -> TurnOutcome {
    let provider = request.provider;
    let cancel = request.cancel;
    let pipeline = match request.pipeline {
        Some(p) => p,
        None => {
            let built = tokio::select! {
                built = factory.pipeline(provider) => built,
                _ = cancel.cancelled() => {
                    return TurnOutcome { provider, pipeline: None, result: None };
                }
            };
            match built {
                Ok(p) => Arc::new(p),
                Err(e) => {
                    return TurnOutcome {
                        provider,
                        pipeline: None,
                        result: Some(Err(e)),
                    };
                }
            }
        }
    };

    let digest_request =
        DigestRequest::prompt(request.prompt).with_conversation(request.conversation);
    let result = digest(factory, &pipeline, &digest_request, events, &cancel).await;

    TurnOutcome {
        provider,
        pipeline: Some(pipeline),
        result,
    }
}

async fn digest(
    factory: &dyn PipelineFactory,
    pipeline: &Pipeline,
    request: &DigestRequest,
    events: Option<&UnboundedSender<PipelineEvent>>,
    cancel: &CancellationToken,
) -> Option<Result<Digest>> {
    let mut extractor = match factory.extractor().await {
        Ok(extractor) => extractor,
        Err(e) => return Some(Err(e)),
    };

    let result = if cancel.is_cancelled() {
        None
    } else {
        let run = pipeline.run(request, &mut *extractor, events);
        tokio::select! {
            result = run => Some(result),
            _ = cancel.cancelled() => None,
        }
    };
    if result.is_none() {
        tracing::info!(target: "tui", "chat.turn.cancelled");
    }

    if let Err(e) = extractor.close().await {
        tracing::warn!(target: "tui", error = %e, "chat.extractor.close_failed");
    }
    result
}
