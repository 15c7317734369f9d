//! # Thoughts Panel
//!
//! Picks which assistant reasoning to show in the side panel and turns raw
//! `Thought` / `Function` parts into displayable entries.
//!
//! Selection: with no question selected the latest assistant message that
//! carries parts is shown; selecting the i-th user question shows the first
//! assistant message with parts in that question's turn, up to the next user
//! message. A turn whose replies carry no parts shows nothing.

use std::collections::HashSet;

use serde_json::Value;

use crate::api::{Message, Part, Role};

/// Backend sentinel meaning "retrieval found nothing".
const NOT_FOUND: &str = "Không tìm thấy tài liệu nào liên quan đến yêu cầu của bạn.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Thought,
    Function,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelEntry {
    pub kind: EntryKind,
    pub title: String,
    pub body: String,
}

/// View over `data.functionCall` of a function part.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall<'a> {
    pub name: &'a str,
    pub args: Option<&'a serde_json::Map<String, Value>>,
}

impl<'a> FunctionCall<'a> {
    pub fn from_data(data: &'a Value) -> Option<Self> {
        let call = data.get("functionCall")?;
        Some(Self {
            name: call.get("name").and_then(Value::as_str).unwrap_or_default(),
            args: call.get("args").and_then(Value::as_object),
        })
    }

    /// Calls with no arguments or a lone single-element `queries` list carry
    /// nothing worth showing.
    fn is_trivial(&self) -> bool {
        let Some(args) = self.args else {
            return true;
        };
        args.len() == 1
            && args
                .get("queries")
                .and_then(Value::as_array)
                .is_some_and(|q| q.len() == 1)
    }
}

/// User questions in transcript order, for the history tab.
pub fn question_list(messages: &[Message]) -> Vec<&str> {
    messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .collect()
}

/// Entries for the panel given the current selection.
pub fn panel_entries(messages: &[Message], selected_question: Option<usize>) -> Vec<PanelEntry> {
    let Some(source) = source_message(messages, selected_question) else {
        return Vec::new();
    };

    let mut seen: HashSet<(&str, Option<&str>)> = HashSet::new();
    source
        .parts
        .iter()
        .filter(|part| match part {
            Part::Thought { .. } => true,
            Part::Function { content, author, .. } => seen.insert((content.as_str(), author.as_deref())),
            Part::Text { .. } => false,
        })
        .filter_map(entry_for)
        .collect()
}

fn has_parts(m: &Message) -> bool {
    m.role == Role::Assistant && !m.parts.is_empty()
}

fn source_message(messages: &[Message], selected_question: Option<usize>) -> Option<&Message> {
    match selected_question {
        None => messages.iter().rev().find(|m| has_parts(m)),
        Some(index) => {
            let position = messages
                .iter()
                .enumerate()
                .filter(|(_, m)| m.role == Role::User)
                .nth(index)
                .map(|(pos, _)| pos)?;
            messages[position + 1..]
                .iter()
                .take_while(|m| m.role != Role::User)
                .find(|m| has_parts(m))
        }
    }
}

fn entry_for(part: &Part) -> Option<PanelEntry> {
    let entry = match part {
        Part::Thought { content, author } => PanelEntry {
            kind: EntryKind::Thought,
            title: format!("Suy nghĩ ({})", author.as_deref().unwrap_or("Agent")),
            body: content.clone(),
        },
        Part::Function { content, data, .. } => {
            if let Some(call) = data.as_ref().and_then(FunctionCall::from_data) {
                if call.is_trivial() {
                    return None;
                }
            }
            PanelEntry {
                kind: EntryKind::Function,
                title: content.clone(),
                body: function_body(content, data.as_ref()),
            }
        }
        Part::Text { .. } => return None,
    };

    if entry.body.trim().is_empty() {
        None
    } else {
        Some(entry)
    }
}

fn function_body(content: &str, data: Option<&Value>) -> String {
    // Descriptive content from the backend wins over the raw payload.
    if !content.is_empty() && !content.starts_with('🔧') && !content.starts_with('📊') {
        return content.to_string();
    }
    let Some(data) = data else {
        return content.to_string();
    };

    if let Some(call) = FunctionCall::from_data(data) {
        return match call.args {
            Some(args) => render_args(args),
            None => format!("Gọi function: {}", call.name),
        };
    }

    if let Some(results) = data.pointer("/response/result").and_then(Value::as_array) {
        return render_results(results);
    }

    serde_json::to_string_pretty(data).unwrap_or_default()
}

fn render_args(args: &serde_json::Map<String, Value>) -> String {
    args.iter()
        .map(|(key, value)| match value {
            Value::Array(items) => {
                let joined: Vec<String> = items.iter().map(plain).collect();
                format!("{key}: {}", joined.join(", "))
            }
            other => format!(
                "{key}: {}",
                serde_json::to_string_pretty(other).unwrap_or_default()
            ),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_results(results: &[Value]) -> String {
    let mut sections = Vec::with_capacity(results.len());
    for item in results {
        let mut section = String::new();
        if let Some(query) = item.get("query").and_then(Value::as_str) {
            section.push_str(&format!("🔍 Truy vấn: {query}\n\n"));
        }
        if let Some(found) = item.get("results") {
            let faq = found.get("faq").and_then(Value::as_str);
            let document = found.get("document").and_then(Value::as_str);
            if let Some(faq) = faq.filter(|f| *f != NOT_FOUND) {
                section.push_str(&format!("📋 FAQ:\n{faq}\n\n"));
            }
            if let Some(doc) = document.filter(|d| *d != NOT_FOUND) {
                section.push_str(&format!("📄 Tài liệu:\n{doc}\n\n"));
            }
            if faq == Some(NOT_FOUND) && document == Some(NOT_FOUND) {
                section.push_str("⚠️ Không tìm thấy tài liệu liên quan\n\n");
            }
        }
        sections.push(section);
    }

    let rendered = sections.join("---\n\n");
    let trimmed = rendered.trim();
    if trimmed.is_empty() {
        "Không có kết quả".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Strings are shown bare, everything else as JSON.
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
