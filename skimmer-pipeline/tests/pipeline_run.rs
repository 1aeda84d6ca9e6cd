use async_trait::async_trait;
use skimmer_common::{LlmProvider, Result, SkimmerError};
use skimmer_llm::{ConversationHandle, GenerateOptions, LlmClient, LlmResponse};
use skimmer_pipeline::prompts::FORMULATOR_INSTRUCTIONS;
use skimmer_pipeline::{
    DigestRequest, EmptyPagePolicy, Pipeline, PipelineEvent, PipelineSettings, QueryFormulator,
    Summarizer,
};
use skimmer_web::{ExtractedPage, PageExtractor, SearchClient, SearchResult};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Pops one canned response per call; empty once exhausted.
#[derive(Default)]
struct ScriptedSearch {
    responses: Mutex<VecDeque<Vec<SearchResult>>>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedSearch {
    fn new(responses: Vec<Vec<SearchResult>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            queries: Mutex::new(Vec::new()),
        })
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchClient for ScriptedSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.responses.lock().unwrap().pop_front().unwrap_or_default())
    }
}

#[derive(Default)]
struct FixtureExtractor {
    pages: HashMap<String, ExtractedPage>,
    visited: Vec<(String, Duration)>,
}

impl FixtureExtractor {
    fn with_page(mut self, url: &str, paragraphs: &[&str]) -> Self {
        let page = ExtractedPage {
            paragraphs: paragraphs.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        };
        self.pages.insert(url.to_string(), page);
        self
    }

    fn visited_urls(&self) -> Vec<&str> {
        self.visited.iter().map(|(u, _)| u.as_str()).collect()
    }
}

#[async_trait]
impl PageExtractor for FixtureExtractor {
    async fn extract_page(&mut self, url: &str, settle: Duration) -> Option<ExtractedPage> {
        self.visited.push((url.to_string(), settle));
        self.pages.get(url).cloned()
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Answers formulator calls with `formulated` and records summarizer prompts.
struct FakeLlm {
    formulated: String,
    summarizer_prompts: Mutex<Vec<String>>,
    summarizer_handles: Mutex<Vec<Option<ConversationHandle>>>,
}

impl FakeLlm {
    fn new(formulated: &str) -> Arc<Self> {
        Arc::new(Self {
            formulated: formulated.to_string(),
            summarizer_prompts: Mutex::new(Vec::new()),
            summarizer_handles: Mutex::new(Vec::new()),
        })
    }

    fn summarizer_prompts(&self) -> Vec<String> {
        self.summarizer_prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: GenerateOptions<'_>,
    ) -> Result<LlmResponse> {
        let text = if system_prompt == Some(FORMULATOR_INSTRUCTIONS) {
            self.formulated.clone()
        } else {
            self.summarizer_prompts
                .lock()
                .unwrap()
                .push(prompt.to_string());
            self.summarizer_handles
                .lock()
                .unwrap()
                .push(options.conversation.cloned());
            "A short digest.".to_string()
        };
        Ok(LlmResponse {
            text,
            conversation: Some(ConversationHandle::ollama(vec![42])),
        })
    }

    fn model_name(&self) -> &str {
        "fake"
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::Ollama
    }
}

fn pipeline(search: Arc<ScriptedSearch>, llm: Arc<FakeLlm>, settings: PipelineSettings) -> Pipeline {
    Pipeline::new(
        search,
        QueryFormulator::new(llm.clone()).unwrap(),
        Summarizer::new(llm, None).unwrap(),
        settings,
    )
}

fn hits(n: usize) -> Vec<SearchResult> {
    (1..=n)
        .map(|i| SearchResult::new(format!("T{i}"), format!("http://site{i}.example/")))
        .collect()
}

#[tokio::test]
async fn single_result_content_is_title_then_paragraph() {
    let search = ScriptedSearch::new(vec![vec![SearchResult::new("A", "http://x")]]);
    let llm = FakeLlm::new("unused");
    let mut extractor = FixtureExtractor::default().with_page("http://x", &["Hello world."]);

    let digest = pipeline(search.clone(), llm.clone(), PipelineSettings::default())
        .run(&DigestRequest::literal("anything"), &mut extractor, None)
        .await
        .unwrap();

    assert_eq!(digest.content, "A\nHello world.");
    assert_eq!(llm.summarizer_prompts(), vec!["A\nHello world."]);
    assert_eq!(digest.summary, "A short digest.");
    assert_eq!(digest.search_attempts, 1);
    assert_eq!(search.queries(), vec!["anything"]);
    assert_eq!(extractor.visited, vec![("http://x".to_string(), Duration::from_secs(1))]);
}

#[tokio::test]
async fn empty_first_search_reformulates_once_then_proceeds() {
    let search = ScriptedSearch::new(vec![vec![], vec![SearchResult::new("B", "http://b")]]);
    let llm = FakeLlm::new("  Better query, please?! ");
    let mut extractor = FixtureExtractor::default().with_page("http://b", &["Body."]);

    let digest = pipeline(search.clone(), llm, PipelineSettings::default())
        .run(&DigestRequest::literal("first try"), &mut extractor, None)
        .await
        .unwrap();

    assert_eq!(search.queries(), vec!["first try", "Better query please"]);
    assert_eq!(digest.search_attempts, 2);
    assert_eq!(digest.query, "Better query please");
    assert_eq!(extractor.visited_urls(), vec!["http://b"]);
}

#[tokio::test]
async fn never_finding_results_ends_with_no_results() {
    let search = ScriptedSearch::new(vec![]);
    let llm = FakeLlm::new("still nothing");
    let mut extractor = FixtureExtractor::default();

    let err = pipeline(search.clone(), llm.clone(), PipelineSettings::default())
        .run(&DigestRequest::prompt("obscure thing"), &mut extractor, None)
        .await
        .unwrap_err();

    assert!(matches!(err, SkimmerError::NoResults { attempts: 3 }));
    assert_eq!(search.queries().len(), 3);
    assert!(extractor.visited.is_empty());
    assert!(llm.summarizer_prompts().is_empty());
}

#[tokio::test]
async fn reads_at_most_n_results_in_provider_order() {
    for available in [2, 4, 7] {
        let search = ScriptedSearch::new(vec![hits(available)]);
        let mut extractor = FixtureExtractor::default();
        let digest = pipeline(search, FakeLlm::new("q"), PipelineSettings::default())
            .run(&DigestRequest::literal("q"), &mut extractor, None)
            .await
            .unwrap();

        let expected: Vec<String> = (1..=available.min(4))
            .map(|i| format!("http://site{i}.example/"))
            .collect();
        assert_eq!(extractor.visited_urls(), expected);
        assert_eq!(digest.outcomes.len(), available.min(4));
    }
}

#[tokio::test]
async fn failed_pages_follow_the_empty_page_policy() {
    let run = |policy| async move {
        let search = ScriptedSearch::new(vec![hits(3)]);
        let mut extractor = FixtureExtractor::default()
            .with_page("http://site1.example/", &["one", "uno"])
            .with_page("http://site3.example/", &[]);
        let settings = PipelineSettings {
            empty_page_policy: policy,
            content_delimiter: ";".into(),
            ..Default::default()
        };
        pipeline(search, FakeLlm::new("q"), settings)
            .run(&DigestRequest::literal("q"), &mut extractor, None)
            .await
            .unwrap()
    };

    let kept = run(EmptyPagePolicy::KeepTitle).await;
    assert_eq!(kept.content, "T1;one;uno;T2;T3");
    assert_eq!(kept.coverage().to_string(), "2 of 3 pages read");
    assert!(kept.outcomes[1].page.is_none());

    let skipped = run(EmptyPagePolicy::Skip).await;
    assert_eq!(skipped.content, "T1;one;uno");
}

#[tokio::test]
async fn chat_prompt_is_formulated_and_asked_as_question() {
    let search = ScriptedSearch::new(vec![vec![SearchResult::new("A", "http://x")]]);
    let llm = FakeLlm::new("election results.");
    let mut extractor = FixtureExtractor::default().with_page("http://x", &["Hello world."]);
    let previous = ConversationHandle::ollama(vec![1, 2, 3]);

    let request = DigestRequest::prompt("Who won the election?")
        .with_conversation(Some(previous.clone()));
    let digest = pipeline(search.clone(), llm.clone(), PipelineSettings::default())
        .run(&request, &mut extractor, None)
        .await
        .unwrap();

    assert_eq!(search.queries(), vec!["election results"]);
    assert_eq!(
        llm.summarizer_prompts(),
        vec!["Question: Who won the election?\n\nA\nHello world."]
    );
    assert_eq!(digest.content, "A\nHello world.");
    assert_eq!(
        llm.summarizer_handles.lock().unwrap().clone(),
        vec![Some(previous)]
    );
    assert_eq!(digest.conversation, Some(ConversationHandle::ollama(vec![42])));
}

#[tokio::test]
async fn progress_events_arrive_in_order_and_closed_receiver_is_harmless() {
    let search = ScriptedSearch::new(vec![vec![
        SearchResult::new("A", "http://x"),
        SearchResult::new("B", "http://y"),
    ]]);
    let mut extractor = FixtureExtractor::default().with_page("http://x", &["p"]);
    let p = pipeline(search, FakeLlm::new("q"), PipelineSettings::default());

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    p.run(&DigestRequest::literal("q"), &mut extractor, Some(&tx))
        .await
        .unwrap();
    drop(tx);

    let mut events = Vec::new();
    while let Some(e) = rx.recv().await {
        events.push(e);
    }
    assert_eq!(
        events,
        vec![
            PipelineEvent::QueryChosen { attempt: 1, query: "q".into() },
            PipelineEvent::SearchCompleted { attempt: 1, results: 2 },
            PipelineEvent::Reading {
                index: 1,
                total: 2,
                title: "A".into(),
                url: "http://x".into()
            },
            PipelineEvent::PageRead { index: 1, paragraphs: 1 },
            PipelineEvent::Reading {
                index: 2,
                total: 2,
                title: "B".into(),
                url: "http://y".into()
            },
            PipelineEvent::PageFailed { index: 2, url: "http://y".into() },
            PipelineEvent::Summarizing { pages_read: 1, total: 2 },
        ]
    );

    let search = ScriptedSearch::new(vec![vec![SearchResult::new("A", "http://x")]]);
    let p = pipeline(search, FakeLlm::new("q"), PipelineSettings::default());
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    drop(rx);
    assert!(p
        .run(&DigestRequest::literal("q"), &mut extractor, Some(&tx))
        .await
        .is_ok());
}
