//! Remote instrumentation agent protocol and content source.
//!
//! The agent runs inside a live target VM and answers synchronous request/reply pairs.
//! Only the message shape lives here; the transport (socket, pipe, test double) is
//! behind [`AgentTransport`]. A reply of an unexpected kind is logged and treated as
//! "no data", never as an error: agents of mismatched versions degrade instead of
//! breaking the whole ingest.

use crate::ingest::{ContentCollection, ContentSource, SourceType};
use crate::Result;

/// One request to the remote agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentRequest {
    /// Names of every class currently loaded in the target VM.
    ListLoadedClasses,
    /// Names of classes loaded since the previous poll.
    ListNewClasses,
    /// Current bytecode of one named class.
    GetClassBytes(String),
}

/// One reply from the remote agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentReply {
    /// Answer to [`AgentRequest::ListLoadedClasses`].
    LoadedClasses(Vec<String>),
    /// Answer to [`AgentRequest::ListNewClasses`].
    NewClasses(Vec<String>),
    /// Answer to [`AgentRequest::GetClassBytes`]; `bytes` is `None` when the class is
    /// not retrievable (unloaded, hidden, or instrumentation-restricted).
    ClassBytes {
        /// The requested class name, echoed back.
        name: String,
        /// The current bytecode, when available.
        bytes: Option<Vec<u8>>,
    },
}

/// Blocking request/reply channel to a remote agent.
pub trait AgentTransport: Send {
    /// Send one request and wait for its reply.
    ///
    /// # Errors
    /// [`crate::Error::Agent`] when the connection is unusable; this is fatal to the
    /// ingest, unlike a reply of the wrong kind.
    fn exchange(&mut self, request: AgentRequest) -> Result<AgentReply>;
}

/// Content source backed by a live remote agent.
pub struct AgentContentSource {
    transport: Box<dyn AgentTransport>,
}

impl AgentContentSource {
    /// Create a source over the given transport.
    #[must_use]
    pub fn new(transport: Box<dyn AgentTransport>) -> Self {
        Self { transport }
    }

    /// Poll for classes loaded since the last poll.
    ///
    /// # Errors
    /// Transport failures only; an unexpected reply kind yields an empty list.
    pub fn poll_new_classes(&mut self) -> Result<Vec<String>> {
        match self.transport.exchange(AgentRequest::ListNewClasses)? {
            AgentReply::NewClasses(names) => Ok(names),
            other => {
                log::warn!("unexpected agent reply to new-class poll: {other:?}");
                Ok(Vec::new())
            }
        }
    }

    fn fetch_class(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        match self
            .transport
            .exchange(AgentRequest::GetClassBytes(name.to_string()))?
        {
            AgentReply::ClassBytes { bytes, .. } => Ok(bytes),
            other => {
                log::warn!("unexpected agent reply fetching '{name}': {other:?}");
                Ok(None)
            }
        }
    }
}

impl ContentSource for AgentContentSource {
    fn source_type(&self) -> SourceType {
        SourceType::Agent
    }

    fn read_into(&mut self, collection: &mut ContentCollection) -> Result<()> {
        let names = match self.transport.exchange(AgentRequest::ListLoadedClasses)? {
            AgentReply::LoadedClasses(names) => names,
            other => {
                log::warn!("unexpected agent reply to loaded-class listing: {other:?}");
                Vec::new()
            }
        };
        for name in names {
            match self.fetch_class(&name)? {
                Some(bytes) => collection.add_entry(&format!("{name}.class"), bytes),
                None => log::debug!("agent has no bytecode for '{name}'"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ClassBuilder;

    /// Scripted transport double.
    struct ScriptedTransport {
        classes: Vec<(String, Option<Vec<u8>>)>,
        misbehave: bool,
    }

    impl AgentTransport for ScriptedTransport {
        fn exchange(&mut self, request: AgentRequest) -> Result<AgentReply> {
            if self.misbehave {
                // Wrong reply kind for everything.
                return Ok(AgentReply::NewClasses(Vec::new()));
            }
            Ok(match request {
                AgentRequest::ListLoadedClasses => AgentReply::LoadedClasses(
                    self.classes.iter().map(|(name, _)| name.clone()).collect(),
                ),
                AgentRequest::ListNewClasses => AgentReply::NewClasses(Vec::new()),
                AgentRequest::GetClassBytes(name) => {
                    let bytes = self
                        .classes
                        .iter()
                        .find(|(candidate, _)| *candidate == name)
                        .and_then(|(_, bytes)| bytes.clone());
                    AgentReply::ClassBytes { name, bytes }
                }
            })
        }
    }

    #[test]
    fn test_reads_loaded_classes() {
        let transport = ScriptedTransport {
            classes: vec![
                (
                    "com/example/Live".to_string(),
                    Some(ClassBuilder::new("com/example/Live").build()),
                ),
                ("com/example/Hidden".to_string(), None),
            ],
            misbehave: false,
        };
        let mut source = AgentContentSource::new(Box::new(transport));
        let mut collection = ContentCollection::new();
        source.read_into(&mut collection).unwrap();
        assert!(collection.classes().contains_key("com/example/Live"));
        assert_eq!(collection.classes().len(), 1);
    }

    #[test]
    fn test_unexpected_reply_is_no_data() {
        let transport = ScriptedTransport {
            classes: Vec::new(),
            misbehave: true,
        };
        let mut source = AgentContentSource::new(Box::new(transport));
        let mut collection = ContentCollection::new();
        source.read_into(&mut collection).unwrap();
        assert!(collection.classes().is_empty());
        assert!(source.poll_new_classes().unwrap().is_empty());
    }
}
