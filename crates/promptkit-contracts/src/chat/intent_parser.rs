use std::collections::BTreeMap;

use serde_json::Value;

use super::command_registry::{
    CommandSpec, NO_ARG_COMMANDS, RAW_ARG_COMMANDS, SINGLE_PATH_COMMANDS,
};

/// One parsed workspace line. Plain text becomes `generate` with the text as
/// `prompt`; slash commands carry their argument in `command_args`.
#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub action: String,
    pub raw: String,
    pub prompt: Option<String>,
    pub command_args: BTreeMap<String, Value>,
}

impl Intent {
    fn new(action: &str, raw: &str) -> Self {
        Self {
            action: action.to_string(),
            raw: raw.to_string(),
            prompt: None,
            command_args: BTreeMap::new(),
        }
    }

    pub fn arg(&self, key: &str) -> Option<&str> {
        self.command_args
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

fn find_spec(command: &str, specs: &'static [CommandSpec]) -> Option<&'static CommandSpec> {
    specs.iter().find(|spec| spec.command == command)
}

fn parse_path_args(arg: &str) -> Vec<String> {
    if arg.trim().is_empty() {
        return Vec::new();
    }
    match shell_words::split(arg) {
        Ok(parts) => parts
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect(),
        Err(_) => arg
            .split_whitespace()
            .map(str::to_string)
            .filter(|value| !value.is_empty())
            .collect(),
    }
}

fn parse_single_path_arg(arg: &str) -> String {
    let parts = parse_path_args(arg);
    match parts.len() {
        0 => String::new(),
        1 => parts[0].clone(),
        _ => parts.join(" "),
    }
}

pub fn parse_intent(text: &str) -> Intent {
    let raw_trimmed = text.trim();
    if raw_trimmed.is_empty() {
        return Intent::new("noop", text);
    }

    if let Some(slash_tail) = raw_trimmed.strip_prefix('/') {
        let command_len = slash_tail
            .chars()
            .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
            .count();
        if command_len > 0 {
            let command = slash_tail[..command_len].to_ascii_lowercase();
            let remainder = &slash_tail[command_len..];
            let arg = remainder.trim();

            if let Some(spec) = find_spec(&command, RAW_ARG_COMMANDS) {
                let mut intent = Intent::new(spec.action, text);
                intent
                    .command_args
                    .insert(spec.arg_key.to_string(), Value::String(arg.to_string()));
                return intent;
            }

            if let Some(spec) = find_spec(&command, SINGLE_PATH_COMMANDS) {
                let mut intent = Intent::new(spec.action, text);
                intent.command_args.insert(
                    spec.arg_key.to_string(),
                    Value::String(parse_single_path_arg(arg)),
                );
                return intent;
            }

            if let Some(spec) = find_spec(&command, NO_ARG_COMMANDS) {
                return Intent::new(spec.action, text);
            }

            let mut intent = Intent::new("unknown", text);
            intent
                .command_args
                .insert("command".to_string(), Value::String(command));
            intent
                .command_args
                .insert("arg".to_string(), Value::String(arg.to_string()));
            return intent;
        }
    }

    let mut intent = Intent::new("generate", text);
    intent.prompt = Some(raw_trimmed.to_string());
    intent
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_intent;

    #[test]
    fn blank_line_is_noop() {
        assert_eq!(parse_intent("   ").action, "noop");
    }

    #[test]
    fn plain_text_generates_with_prompt() {
        let intent = parse_intent("  write a haiku about rust  ");
        assert_eq!(intent.action, "generate");
        assert_eq!(intent.prompt.as_deref(), Some("write a haiku about rust"));
    }

    #[test]
    fn parse_selection_commands() {
        let category = parse_intent("/category rpg");
        assert_eq!(category.action, "select_category");
        assert_eq!(category.arg("category"), Some("rpg"));

        let tool = parse_intent("/TOOL refine");
        assert_eq!(tool.action, "select_tool");
        assert_eq!(tool.command_args["tool"], json!("refine"));
    }

    #[test]
    fn parse_input_keeps_raw_text() {
        let intent = parse_intent("/input  Act as a \"senior\" reviewer ");
        assert_eq!(intent.action, "set_input");
        assert_eq!(intent.arg("text"), Some("Act as a \"senior\" reviewer"));
        assert!(intent.prompt.is_none());
    }

    #[test]
    fn parse_model_commands() {
        let text_model = parse_intent("/text_model gemini-2.5-pro");
        assert_eq!(text_model.action, "set_text_model");
        assert_eq!(text_model.arg("model"), Some("gemini-2.5-pro"));

        let image_model = parse_intent("/image_model");
        assert_eq!(image_model.action, "set_image_model");
        assert_eq!(image_model.arg("model"), None);
    }

    #[test]
    fn parse_quoted_image_path() {
        let intent = parse_intent("/image \"/tmp/my photo.png\"");
        assert_eq!(intent.action, "stage_image");
        assert_eq!(intent.command_args["path"], json!("/tmp/my photo.png"));
    }

    #[test]
    fn parse_save_with_and_without_path() {
        assert_eq!(parse_intent("/save out.png").arg("path"), Some("out.png"));
        let bare = parse_intent("/save");
        assert_eq!(bare.action, "save_output");
        assert_eq!(bare.arg("path"), None);
    }

    #[test]
    fn parse_no_arg_commands() {
        assert_eq!(parse_intent("/generate").action, "generate");
        assert!(parse_intent("/generate").prompt.is_none());
        assert_eq!(parse_intent("/clear_image").action, "clear_image");
        assert_eq!(parse_intent("/copy").action, "copy_output");
        assert_eq!(parse_intent("/show").action, "show_output");
        assert_eq!(parse_intent("/instruction").action, "show_instruction");
        assert_eq!(parse_intent("/exit").action, "quit");
    }

    #[test]
    fn parse_unknown_command() {
        let intent = parse_intent("/magic foo bar");
        assert_eq!(intent.action, "unknown");
        assert_eq!(intent.command_args["command"], json!("magic"));
        assert_eq!(intent.command_args["arg"], json!("foo bar"));
    }

    #[test]
    fn lone_slash_is_plain_text() {
        let intent = parse_intent("/ hello");
        assert_eq!(intent.action, "generate");
        assert_eq!(intent.prompt.as_deref(), Some("/ hello"));
    }
}
