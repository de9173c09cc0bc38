use serde_json::{json, Value};

use crate::catalog::Category;
use crate::events::{EventPayload, EventWriter};
use crate::payload::{GeneratedResult, PromptRequestPayload, ToolType};

pub const GENERATION_ERROR_MESSAGE: &str = "Erro ao gerar resposta. Tente novamente.";

/// Anything that can turn a request payload into a result. The engine's
/// adapter never fails, but the workspace does not rely on that.
pub trait ResponseSource {
    fn respond(&self, payload: &PromptRequestPayload) -> anyhow::Result<GeneratedResult>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
}

/// Handed out by [`Workspace::begin_generation`]; settling with a ticket from
/// an older epoch is a no-op.
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    epoch: u64,
    payload: PromptRequestPayload,
}

impl GenerationTicket {
    pub fn payload(&self) -> &PromptRequestPayload {
        &self.payload
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// In-memory state of one workspace: selection, input, staged image, output
/// and the loading phase.
#[derive(Debug, Clone)]
pub struct Workspace {
    category: Category,
    tool: ToolType,
    input: String,
    image: Option<String>,
    output: Option<GeneratedResult>,
    phase: Phase,
    epoch: u64,
}

impl Workspace {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            tool: ToolType::Generator,
            input: String::new(),
            image: None,
            output: None,
            phase: Phase::Idle,
            epoch: 0,
        }
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn tool(&self) -> ToolType {
        self.tool
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn output(&self) -> Option<&GeneratedResult> {
        self.output.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Clears input, output and staged image; the tool survives. Any request
    /// still in flight belongs to the previous epoch and will be dropped.
    pub fn select_category(&mut self, category: Category) {
        self.category = category;
        self.input.clear();
        self.output = None;
        self.image = None;
        self.phase = Phase::Idle;
        self.epoch += 1;
    }

    pub fn select_tool(&mut self, tool: ToolType) {
        self.tool = tool;
        self.output = None;
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Last write wins. No size or type limit is enforced here.
    pub fn stage_image(&mut self, data_url: impl Into<String>) {
        self.image = Some(data_url.into());
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    pub fn can_generate(&self) -> bool {
        if self.is_loading() {
            return false;
        }
        if self.tool.is_image_editor() {
            self.image
                .as_deref()
                .map(|image| !image.is_empty())
                .unwrap_or(false)
        } else {
            !self.input.trim().is_empty()
        }
    }

    pub fn begin_generation(&mut self) -> Option<GenerationTicket> {
        if !self.can_generate() {
            return None;
        }
        self.phase = Phase::Loading;
        self.output = None;
        let mut payload =
            PromptRequestPayload::new(self.input.clone(), self.category.clone(), self.tool);
        payload.image = self.image.clone();
        Some(GenerationTicket {
            epoch: self.epoch,
            payload,
        })
    }

    /// Stores the result and returns to idle. Returns `false` when the ticket
    /// is stale and the result was discarded.
    pub fn settle(&mut self, ticket: GenerationTicket, result: GeneratedResult) -> bool {
        if ticket.epoch != self.epoch {
            return false;
        }
        self.output = Some(result);
        self.phase = Phase::Idle;
        true
    }

    /// Settles with the outcome of a [`ResponseSource`] call. Errors are
    /// logged and replaced by [`GENERATION_ERROR_MESSAGE`] as a text result.
    pub fn settle_outcome(
        &mut self,
        ticket: GenerationTicket,
        outcome: anyhow::Result<GeneratedResult>,
        events: &EventWriter,
    ) -> bool {
        let result = match outcome {
            Ok(result) => result,
            Err(err) => {
                eprintln!("generation failed: {err:#}");
                let _ = events.emit(
                    "generation_failed",
                    failure_payload(ticket.payload(), "workspace", &format!("{err:#}")),
                );
                GeneratedResult::text(GENERATION_ERROR_MESSAGE)
            }
        };
        self.settle(ticket, result)
    }

    /// Synchronous begin, respond, settle. `None` when the generate guard
    /// rejects the request.
    pub fn run_generation<S: ResponseSource + ?Sized>(
        &mut self,
        source: &S,
        events: &EventWriter,
    ) -> Option<&GeneratedResult> {
        let ticket = self.begin_generation()?;
        let outcome = source.respond(ticket.payload());
        self.settle_outcome(ticket, outcome, events);
        self.output.as_ref()
    }
}

pub fn failure_payload(payload: &PromptRequestPayload, stage: &str, error: &str) -> EventPayload {
    let value = json!({
        "stage": stage,
        "category": payload.category.id,
        "tool": payload.tool_type.id(),
        "error": error,
    });
    match value {
        Value::Object(map) => map,
        _ => EventPayload::new(),
    }
}
