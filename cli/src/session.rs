//! Interactive chat session state and the REPL loop.

use aadhaar_core::{ChatModel, EmbeddingModel, Message};
use aadhaar_openai::OpenAIError;
use anyhow::Result;

use crate::agent::{AadhaarAgent, AgentError, Summarize};
use crate::input::read_line;

const GOODBYE: &str = "Goodbye! Thanks for using Aadhaar Chat Agent.";

const HELP_TEXT: &str = "\
Aadhaar Chat Agent Help

This agent can help you with questions about:
  - Aadhaar enrollment process
  - Document requirements
  - Update procedures
  - Supporting documents
  - General Aadhaar information

Commands:
  'quit', 'exit', 'bye'  End conversation
  'clear'                Clear conversation history
  'help'                 Show this help message

The agent uses official Aadhaar documents to provide accurate information.";

/// Conversation state for one chat session: the turn history and the
/// rolling summary of older turns.
#[derive(Debug, Default)]
pub struct Session {
    /// Alternating user and assistant turns, oldest first.
    pub history: Vec<Message>,
    /// Summary of conversation so far, empty until first refresh.
    pub summary: String,
}

impl Session {
    /// Starts an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets everything discussed so far.
    pub fn clear(&mut self) {
        self.history.clear();
        self.summary.clear();
    }
}

/// Asks a question, and on an authentication failure gives the user one
/// chance to supply a fresh key.
///
/// `reauth` yields a fresh chat client and embedder built around the new
/// credential. The same question is retried exactly once; a second
/// failure is surfaced.
pub async fn ask_with_reauth<C, M, F>(
    agent: &mut AadhaarAgent<C, M>,
    session: &mut Session,
    question: &str,
    reauth: &mut F,
) -> Result<String, AgentError>
where
    C: ChatModel<Error = OpenAIError> + Summarize,
    M: EmbeddingModel + Send + Sync + 'static,
    F: FnMut() -> Option<(C, M)>,
{
    match agent.ask(session, question).await {
        Err(error) if error.is_auth() => {
            let Some((chat, embedder)) = reauth() else {
                return Err(error);
            };
            agent.reauthenticate(chat, embedder);
            agent.ask(session, question).await
        }
        other => other,
    }
}

/// Runs the interactive loop until the user quits or cancels input.
pub async fn run_chat<C, M, F>(agent: &mut AadhaarAgent<C, M>, reauth: &mut F) -> Result<()>
where
    C: ChatModel<Error = OpenAIError> + Summarize,
    M: EmbeddingModel + Send + Sync + 'static,
    F: FnMut() -> Option<(C, M)>,
{
    let mut session = Session::new();

    println!();
    println!("Aadhaar Chat Agent");
    println!("Type 'quit', 'exit', or 'bye' to end the conversation");
    println!("Type 'clear' to clear conversation history");
    println!("Type 'help' for more information");
    println!();

    loop {
        let Some(line) = read_line("You: ")? else {
            println!();
            println!("{GOODBYE}");
            break;
        };
        let line = line.trim();

        match line.to_lowercase().as_str() {
            "" => continue,
            "quit" | "exit" | "bye" => {
                println!();
                println!("{GOODBYE}");
                break;
            }
            "clear" => {
                session.clear();
                println!("Conversation history cleared!");
                continue;
            }
            "help" => {
                println!("{HELP_TEXT}");
                continue;
            }
            _ => {}
        }

        println!("Searching relevant documents...");
        println!("Generating response...");
        match ask_with_reauth(agent, &mut session, line, reauth).await {
            Ok(answer) => {
                println!();
                println!("{answer}");
                println!();
            }
            // A failed turn is reported and dropped; the session stays usable.
            Err(error) => eprintln!("Error: {error}"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use aadhaar_core::Role;
    use aadhaar_rag::{RagConfig, RagStore};
    use tempfile::TempDir;

    use super::*;

    /// Deterministic embedder so stores can be opened without a network.
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

    /// Chat model that fails with an auth error a fixed number of times,
    /// then answers.
    #[derive(Debug, Clone)]
    struct FlakyAuthChat {
        failures_left: Arc<AtomicUsize>,
    }

    impl FlakyAuthChat {
        fn failing(times: usize) -> Self {
            Self {
                failures_left: Arc::new(AtomicUsize::new(times)),
            }
        }
    }

    impl ChatModel for FlakyAuthChat {
        type Error = OpenAIError;

        fn complete(
            &self,
            _messages: &[Message],
        ) -> impl core::future::Future<Output = Result<String, Self::Error>> + Send {
            let failures = Arc::clone(&self.failures_left);
            async move {
                if failures
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok()
                {
                    Err(OpenAIError::Auth("invalid api key".into()))
                } else {
                    Ok("answer".into())
                }
            }
        }
    }

    impl Summarize for FlakyAuthChat {
        async fn summarize(&self, _prompt: &str) -> Result<String, OpenAIError> {
            Ok("summary".into())
        }
    }

    fn agent_in(
        dir: &TempDir,
        chat: FlakyAuthChat,
    ) -> AadhaarAgent<FlakyAuthChat, StaticEmbedder> {
        let config = RagConfig::builder().index_dir(dir.path()).build();
        let store = RagStore::open(StaticEmbedder, config).unwrap();
        AadhaarAgent::new(chat, store, 3)
    }

    #[tokio::test]
    async fn auth_failure_triggers_one_rebuild() {
        let dir = TempDir::new().unwrap();
        let mut agent = agent_in(&dir, FlakyAuthChat::failing(1));
        let mut session = Session::new();

        let mut rebuilds = 0;
        let mut reauth = || {
            rebuilds += 1;
            Some((FlakyAuthChat::failing(0), StaticEmbedder))
        };

        let answer = ask_with_reauth(&mut agent, &mut session, "question", &mut reauth)
            .await
            .unwrap();
        assert_eq!(answer, "answer");
        assert_eq!(rebuilds, 1);
        // The successful retry recorded the turn.
        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history[0].role(), Role::User);
    }

    #[tokio::test]
    async fn declined_reauth_surfaces_the_auth_error() {
        let dir = TempDir::new().unwrap();
        let mut agent = agent_in(&dir, FlakyAuthChat::failing(usize::MAX));
        let mut session = Session::new();

        let mut reauth = || None;
        let error = ask_with_reauth(&mut agent, &mut session, "question", &mut reauth)
            .await
            .unwrap_err();
        assert!(error.is_auth());
        assert!(session.history.is_empty());
    }

    #[tokio::test]
    async fn second_auth_failure_is_not_retried_again() {
        let dir = TempDir::new().unwrap();
        let mut agent = agent_in(&dir, FlakyAuthChat::failing(1));
        let mut session = Session::new();

        let mut rebuilds = 0;
        let mut reauth = || {
            rebuilds += 1;
            Some((FlakyAuthChat::failing(usize::MAX), StaticEmbedder))
        };

        let error = ask_with_reauth(&mut agent, &mut session, "question", &mut reauth)
            .await
            .unwrap_err();
        assert!(error.is_auth());
        assert_eq!(rebuilds, 1);
    }

    #[tokio::test]
    async fn successful_turn_skips_reauth() {
        let dir = TempDir::new().unwrap();
        let mut agent = agent_in(&dir, FlakyAuthChat::failing(0));
        let mut session = Session::new();

        let mut rebuilds = 0;
        let mut reauth = || {
            rebuilds += 1;
            None
        };

        let answer = ask_with_reauth(&mut agent, &mut session, "question", &mut reauth)
            .await
            .unwrap();
        assert_eq!(answer, "answer");
        assert_eq!(rebuilds, 0);
    }

    #[test]
    fn clear_resets_history_and_summary() {
        let mut session = Session::new();
        session.history.push(Message::user("q"));
        session.history.push(Message::assistant("a"));
        session.summary = "old summary".into();

        session.clear();
        assert!(session.history.is_empty());
        assert!(session.summary.is_empty());
    }
}
