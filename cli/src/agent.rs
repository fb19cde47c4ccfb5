//! Agent orchestration: indexing the document corpus and answering
//! questions with retrieved context.

use std::path::Path;

use aadhaar_core::{ChatModel, EmbeddingModel, Message};
use aadhaar_openai::{OpenAI, OpenAIError};
use aadhaar_pdf::{ExtractedDocument, PdfError, PdfLoader};
use aadhaar_rag::{Document, Metadata, RagError, RagStore, SearchResult};
use thiserror::Error;
use tracing::warn;

use crate::session::Session;

/// Behavior and constraint instructions sent with every completion.
const SYSTEM_PROMPT: &str = "\
You are a specialized Aadhaar assistant that ONLY answers questions based on the provided official Aadhaar documents.

STRICT RULES:
1. ONLY use information from the provided Aadhaar documents
2. If information is NOT in the provided documents, respond with: \"Information unavailable at the moment.\"
3. Do NOT provide any external knowledge or general information
4. Do NOT answer questions unrelated to Aadhaar processes
5. Always cite the specific document source when providing information

You have access to:
1. Official Aadhaar documents (provided as context)
2. Conversation history (previous questions and answers in this chat)

For questions about the conversation itself (like \"when did we discuss X?\" or \"what did you say about Y?\"), refer to the conversation history.

Stay strictly within the bounds of the provided Aadhaar documents.";

/// Inserted in place of document context when retrieval found nothing.
const NO_CONTEXT_NOTE: &str =
    "No matching document context was found for this question.";

/// Messages of recent history included verbatim in each prompt.
const HISTORY_WINDOW: usize = 20;

/// History length multiple at which the rolling summary is refreshed.
const SUMMARY_INTERVAL: usize = 20;

const SUMMARY_MAX_TOKENS: u32 = 200;
const SUMMARY_TEMPERATURE: f32 = 0.3;

/// Auxiliary short-completion seam used for history summarization.
///
/// Split from [`ChatModel`] because summaries want their own token budget
/// and temperature, which the core trait deliberately does not expose.
pub trait Summarize {
    /// Produces a concise summary for the given prompt.
    fn summarize(
        &self,
        prompt: &str,
    ) -> impl core::future::Future<Output = Result<String, OpenAIError>> + Send;
}

impl Summarize for OpenAI {
    async fn summarize(&self, prompt: &str) -> Result<String, OpenAIError> {
        self.complete_with(
            &[Message::user(prompt)],
            SUMMARY_MAX_TOKENS,
            SUMMARY_TEMPERATURE,
        )
        .await
    }
}

/// Failures surfaced while answering a question.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The chat completion failed.
    #[error(transparent)]
    Chat(#[from] OpenAIError),

    /// Retrieval or indexing failed.
    #[error(transparent)]
    Retrieval(RagError),

    /// Document extraction failed.
    #[error(transparent)]
    Documents(#[from] PdfError),
}

impl AgentError {
    /// Whether this failure means the API key was rejected.
    ///
    /// A bad key can surface from the chat call directly or from inside an
    /// embedding request made during retrieval.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        match self {
            Self::Chat(OpenAIError::Auth(_)) => true,
            Self::Retrieval(RagError::Embedding(source)) => {
                matches!(source.downcast_ref::<OpenAIError>(), Some(OpenAIError::Auth(_)))
            }
            _ => false,
        }
    }
}

/// Indexing progress reported while the corpus is prepared.
#[derive(Debug, Clone)]
pub enum IndexProgress<'a> {
    /// A persisted index was found; documents are not re-processed.
    Restored {
        /// Number of chunks restored from disk.
        chunks: usize,
    },
    /// Scanning the documents directory.
    Extracting,
    /// Text extraction finished.
    Extracted {
        /// Number of readable documents found.
        documents: usize,
    },
    /// Embedding and indexing one document.
    Indexing {
        /// Source file name.
        file: &'a str,
        /// 1-based position within the corpus.
        position: usize,
        /// Total documents to index.
        total: usize,
    },
    /// The index was persisted.
    Saved {
        /// Number of chunks in the index.
        chunks: usize,
    },
    /// No readable documents; the agent runs without document context.
    NoDocuments,
}

/// The conversational agent: a chat model, a retrieval store, and the
/// prompt discipline that ties them together.
#[derive(Debug)]
pub struct AadhaarAgent<C, M>
where
    C: ChatModel<Error = OpenAIError> + Summarize,
    M: EmbeddingModel + Send + Sync + 'static,
{
    chat: C,
    store: RagStore<M>,
    top_k: usize,
}

impl<C, M> AadhaarAgent<C, M>
where
    C: ChatModel<Error = OpenAIError> + Summarize,
    M: EmbeddingModel + Send + Sync + 'static,
{
    /// Creates an agent over an opened store.
    pub fn new(chat: C, store: RagStore<M>, top_k: usize) -> Self {
        Self { chat, store, top_k }
    }

    /// Replaces both clients after a credential change. The index and its
    /// database handle are kept as-is.
    pub fn reauthenticate(&mut self, chat: C, embedder: M) {
        self.chat = chat;
        self.store.replace_embedder(embedder);
    }

    /// Prepares the index: restores the persisted snapshot when present,
    /// otherwise extracts, embeds, and persists the corpus.
    ///
    /// A missing or empty documents directory is not fatal; the agent then
    /// answers without document context.
    pub async fn init(
        &self,
        docs_dir: &Path,
        mut progress: impl FnMut(IndexProgress<'_>),
    ) -> Result<(), AgentError> {
        let restored = self.store.load().map_err(AgentError::Retrieval)?;
        if restored > 0 {
            progress(IndexProgress::Restored { chunks: restored });
            return Ok(());
        }

        progress(IndexProgress::Extracting);
        let loader = PdfLoader::new(docs_dir);
        let documents = match loader.load_all() {
            Ok(documents) => documents,
            Err(PdfError::MissingDirectory(dir)) => {
                warn!(dir = %dir.display(), "documents directory not found");
                progress(IndexProgress::NoDocuments);
                return Ok(());
            }
            Err(PdfError::NoDocuments(dir)) => {
                warn!(dir = %dir.display(), "no readable documents");
                progress(IndexProgress::NoDocuments);
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        progress(IndexProgress::Extracted {
            documents: documents.len(),
        });

        self.index_documents(documents, &mut progress).await
    }

    /// Embeds and indexes extracted documents, then persists the snapshot.
    ///
    /// A document the chunker rejects is skipped with a warning; the rest
    /// of the corpus still gets indexed.
    async fn index_documents(
        &self,
        documents: Vec<ExtractedDocument>,
        progress: &mut impl FnMut(IndexProgress<'_>),
    ) -> Result<(), AgentError> {
        let total = documents.len();
        for (idx, extracted) in documents.into_iter().enumerate() {
            progress(IndexProgress::Indexing {
                file: &extracted.file_name,
                position: idx + 1,
                total,
            });
            let mut metadata = Metadata::new();
            metadata.insert("filename".into(), extracted.file_name.clone());
            let file_name = extracted.file_name.clone();
            let document =
                Document::with_metadata(extracted.file_name, extracted.text, metadata);
            match self.store.insert(document).await {
                Ok(_) => {}
                Err(RagError::Chunking(reason)) => {
                    warn!(file = %file_name, %reason, "could not chunk, skipping");
                }
                Err(err) => return Err(AgentError::Retrieval(err)),
            }
        }

        self.store.save().map_err(AgentError::Retrieval)?;
        progress(IndexProgress::Saved {
            chunks: self.store.len(),
        });
        Ok(())
    }

    /// Answers one question within the session.
    ///
    /// Retrieves context, assembles the prompt, completes, and appends the
    /// successful turn to history. A failed turn leaves the session
    /// untouched.
    pub async fn ask(
        &self,
        session: &mut Session,
        question: &str,
    ) -> Result<String, AgentError> {
        let results = match self.store.search_with_k(question, self.top_k).await {
            Ok(results) => results,
            Err(RagError::EmptyStore) => Vec::new(),
            Err(err) => return Err(AgentError::Retrieval(err)),
        };

        let messages = build_messages(session, &results, question);
        let answer = self.chat.complete(&messages).await?;

        session.history.push(Message::user(question));
        session.history.push(Message::assistant(answer.clone()));
        self.maybe_summarize(session).await;

        Ok(answer)
    }

    /// Refreshes the rolling summary every [`SUMMARY_INTERVAL`] messages.
    /// Summarization failures are logged, never surfaced.
    async fn maybe_summarize(&self, session: &mut Session) {
        if session.history.is_empty() || session.history.len() % SUMMARY_INTERVAL != 0 {
            return;
        }

        let window_start = session.history.len().saturating_sub(SUMMARY_INTERVAL);
        let conversation = session.history[window_start..]
            .iter()
            .map(|message| {
                let role = match message.role() {
                    aadhaar_core::Role::User => "user",
                    aadhaar_core::Role::Assistant => "assistant",
                    aadhaar_core::Role::System => "system",
                };
                format!("{role}: {}", message.content())
            })
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Summarize the key topics and information discussed in this Aadhaar-related conversation. Focus on:\n\
             1. Main topics discussed\n\
             2. Key information provided\n\
             3. User's specific needs or questions\n\
             4. Important details that should be remembered\n\n\
             Conversation:\n{conversation}\n\n\
             Provide a concise summary:"
        );

        match self.chat.summarize(&prompt).await {
            Ok(summary) => session.summary = summary,
            Err(error) => warn!(%error, "could not update conversation summary"),
        }
    }
}

/// Formats retrieved chunks as a numbered, source-attributed context block.
fn prepare_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(idx, result)| {
            let source = result
                .chunk
                .metadata
                .get("filename")
                .map_or(result.chunk.source_id.as_str(), String::as_str);
            format!("Source {} ({}):\n{}\n", idx + 1, source, result.chunk.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assembles the full prompt: system instructions, optional summary,
/// bounded history, then the context-bearing user turn.
pub(crate) fn build_messages(
    session: &Session,
    results: &[SearchResult],
    question: &str,
) -> Vec<Message> {
    let mut messages = vec![Message::system(SYSTEM_PROMPT)];

    if !session.summary.is_empty() {
        messages.push(Message::system(format!(
            "CONVERSATION SUMMARY: {}",
            session.summary
        )));
    }

    let window_start = session.history.len().saturating_sub(HISTORY_WINDOW);
    messages.extend(session.history[window_start..].iter().cloned());

    let context = if results.is_empty() {
        NO_CONTEXT_NOTE.to_string()
    } else {
        prepare_context(results)
    };
    messages.push(Message::user(format!(
        "RELEVANT DOCUMENT CONTEXT:\n{context}\n\n\
         CURRENT QUESTION: {question}\n\n\
         IMPORTANT: Only answer if the information is available in the document context above. \
         If not available, respond with \"Information unavailable at the moment.\" \
         Do not provide any external knowledge."
    )));

    messages
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use aadhaar_rag::{Chunk, Chunker, RagConfig, WordChunker};
    use tempfile::TempDir;

    use super::*;

    fn result(source: &str, text: &str) -> SearchResult {
        let mut metadata = Metadata::new();
        metadata.insert("filename".into(), source.to_string());
        SearchResult {
            chunk: Chunk {
                id: format!("{source}#chunk_0"),
                text: text.into(),
                source_id: source.into(),
                index: 0,
                start_word: 0,
                overlap_words: 0,
                metadata,
                content_hash: 0,
            },
            score: 0.9,
        }
    }

    #[test]
    fn fresh_session_prompt_is_system_plus_question() {
        let session = Session::new();
        let messages = build_messages(&session, &[], "What is Aadhaar?");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role(), aadhaar_core::Role::System);
        assert!(messages[0].content().starts_with("You are a specialized Aadhaar assistant"));
        assert!(messages[1].content().contains("CURRENT QUESTION: What is Aadhaar?"));
    }

    #[test]
    fn empty_retrieval_notes_missing_context() {
        let session = Session::new();
        let messages = build_messages(&session, &[], "Anything?");
        assert!(messages[1].content().contains(NO_CONTEXT_NOTE));
    }

    #[test]
    fn context_cites_numbered_sources() {
        let session = Session::new();
        let results = [
            result("enrolment.pdf", "Enrolment is free."),
            result("update.pdf", "Updates may carry a fee."),
        ];
        let messages = build_messages(&session, &results, "What does enrolment cost?");

        let content = messages[1].content();
        assert!(content.contains("Source 1 (enrolment.pdf):\nEnrolment is free."));
        assert!(content.contains("Source 2 (update.pdf):\nUpdates may carry a fee."));
    }

    #[test]
    fn history_window_is_bounded() {
        let mut session = Session::new();
        for i in 0..30 {
            session.history.push(Message::user(format!("q{i}")));
            session.history.push(Message::assistant(format!("a{i}")));
        }

        let messages = build_messages(&session, &[], "latest");
        // System prompt + 20 history messages + the current question.
        assert_eq!(messages.len(), 22);
        assert_eq!(messages[1].content(), "q20");
    }

    #[test]
    fn summary_appears_after_system_prompt() {
        let mut session = Session::new();
        session.summary = "Earlier we discussed enrolment fees.".into();

        let messages = build_messages(&session, &[], "next question");
        assert!(messages[1]
            .content()
            .starts_with("CONVERSATION SUMMARY: Earlier we discussed"));
    }

    /// Chat model that records the final user turn of every prompt.
    #[derive(Debug, Clone, Default)]
    struct CannedChat {
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl CannedChat {
        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    impl ChatModel for CannedChat {
        type Error = OpenAIError;

        fn complete(
            &self,
            messages: &[Message],
        ) -> impl core::future::Future<Output = Result<String, Self::Error>> + Send {
            let last = messages
                .last()
                .map(|message| message.content().to_owned())
                .unwrap_or_default();
            let prompts = Arc::clone(&self.prompts);
            async move {
                prompts.lock().unwrap().push(last);
                Ok("canned answer".into())
            }
        }
    }

    impl Summarize for CannedChat {
        async fn summarize(&self, _prompt: &str) -> Result<String, OpenAIError> {
            Ok("summary".into())
        }
    }

    #[derive(Debug, Clone)]
    struct StaticEmbedder;

    impl EmbeddingModel for StaticEmbedder {
        fn dim(&self) -> usize {
            4
        }

        fn embed(
            &self,
            _text: &str,
        ) -> impl core::future::Future<Output = aadhaar_core::Result<Vec<f32>>> + Send {
            async { Ok(vec![1.0, 0.0, 0.0, 0.0]) }
        }
    }

    /// Owned snapshot of emitted progress, comparable in assertions.
    #[derive(Debug, PartialEq, Eq)]
    enum Step {
        Restored(usize),
        Extracting,
        Extracted(usize),
        Indexing(String),
        Saved(usize),
        NoDocuments,
    }

    fn record(steps: &mut Vec<Step>) -> impl FnMut(IndexProgress<'_>) + '_ {
        |progress| {
            steps.push(match progress {
                IndexProgress::Restored { chunks } => Step::Restored(chunks),
                IndexProgress::Extracting => Step::Extracting,
                IndexProgress::Extracted { documents } => Step::Extracted(documents),
                IndexProgress::Indexing { file, .. } => Step::Indexing(file.to_string()),
                IndexProgress::Saved { chunks } => Step::Saved(chunks),
                IndexProgress::NoDocuments => Step::NoDocuments,
            });
        }
    }

    fn agent_at(index_dir: &Path) -> AadhaarAgent<CannedChat, StaticEmbedder> {
        let config = RagConfig::builder().index_dir(index_dir).build();
        let store = RagStore::open(StaticEmbedder, config).unwrap();
        AadhaarAgent::new(CannedChat::default(), store, 3)
    }

    #[tokio::test]
    async fn missing_docs_dir_still_answers_without_context() {
        let index_dir = TempDir::new().unwrap();
        let agent = agent_at(index_dir.path());

        let mut steps = Vec::new();
        agent
            .init(Path::new("/definitely/not/here"), record(&mut steps))
            .await
            .unwrap();
        assert_eq!(steps, [Step::Extracting, Step::NoDocuments]);

        let mut session = Session::new();
        let answer = agent.ask(&mut session, "What is Aadhaar?").await.unwrap();
        assert_eq!(answer, "canned answer");
        assert!(agent.chat.last_prompt().contains(NO_CONTEXT_NOTE));
        assert_eq!(session.history.len(), 2);
    }

    #[tokio::test]
    async fn empty_docs_dir_still_answers_without_context() {
        let index_dir = TempDir::new().unwrap();
        let docs_dir = TempDir::new().unwrap();
        let agent = agent_at(index_dir.path());

        let mut steps = Vec::new();
        agent
            .init(docs_dir.path(), record(&mut steps))
            .await
            .unwrap();
        assert_eq!(steps, [Step::Extracting, Step::NoDocuments]);

        let mut session = Session::new();
        let answer = agent.ask(&mut session, "Anything?").await.unwrap();
        assert_eq!(answer, "canned answer");
        assert!(agent.chat.last_prompt().contains(NO_CONTEXT_NOTE));
    }

    #[tokio::test]
    async fn persisted_index_short_circuits_document_processing() {
        let index_dir = TempDir::new().unwrap();
        {
            let config = RagConfig::builder().index_dir(index_dir.path()).build();
            let store = RagStore::open(StaticEmbedder, config).unwrap();
            store
                .insert(Document::new("guide.pdf", "enrolment is free for residents"))
                .await
                .unwrap();
            store.save().unwrap();
        }

        let agent = agent_at(index_dir.path());
        let mut steps = Vec::new();
        // Documents directory is absent, but the restored index wins.
        agent
            .init(Path::new("/definitely/not/here"), record(&mut steps))
            .await
            .unwrap();
        assert_eq!(steps, [Step::Restored(1)]);

        let mut session = Session::new();
        let answer = agent.ask(&mut session, "Is enrolment free?").await.unwrap();
        assert_eq!(answer, "canned answer");
        assert!(agent.chat.last_prompt().contains("guide.pdf"));
    }

    /// Chunker that rejects one specific document.
    #[derive(Debug)]
    struct RejectBad;

    impl Chunker for RejectBad {
        fn chunk(&self, doc: &Document) -> aadhaar_rag::Result<Vec<Chunk>> {
            if doc.id == "bad.pdf" {
                return Err(RagError::Chunking("unsplittable document".into()));
            }
            WordChunker::default_settings().chunk(doc)
        }

        fn name(&self) -> &'static str {
            "reject-bad"
        }
    }

    #[tokio::test]
    async fn chunking_failure_skips_document_and_continues() {
        let index_dir = TempDir::new().unwrap();
        let config = RagConfig::builder().index_dir(index_dir.path()).build();
        let store = RagStore::open(StaticEmbedder, config)
            .unwrap()
            .with_chunker(RejectBad);
        let agent = AadhaarAgent::new(CannedChat::default(), store, 3);

        let documents = vec![
            ExtractedDocument {
                file_name: "bad.pdf".into(),
                text: "rejected".into(),
            },
            ExtractedDocument {
                file_name: "good.pdf".into(),
                text: "aadhaar enrolment is free".into(),
            },
        ];

        let mut steps = Vec::new();
        agent
            .index_documents(documents, &mut record(&mut steps))
            .await
            .unwrap();
        assert_eq!(
            steps,
            [
                Step::Indexing("bad.pdf".into()),
                Step::Indexing("good.pdf".into()),
                Step::Saved(1),
            ]
        );

        let mut session = Session::new();
        agent.ask(&mut session, "Is enrolment free?").await.unwrap();
        assert!(agent.chat.last_prompt().contains("good.pdf"));
    }
}
