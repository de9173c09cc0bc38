#[derive(Clone, Copy, Debug)]
pub(crate) struct CommandSpec {
    pub command: &'static str,
    pub action: &'static str,
    /// Key the argument is stored under in `Intent::command_args`.
    pub arg_key: &'static str,
}

pub(crate) const RAW_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "category",
        action: "select_category",
        arg_key: "category",
    },
    CommandSpec {
        command: "tool",
        action: "select_tool",
        arg_key: "tool",
    },
    CommandSpec {
        command: "input",
        action: "set_input",
        arg_key: "text",
    },
    CommandSpec {
        command: "text_model",
        action: "set_text_model",
        arg_key: "model",
    },
    CommandSpec {
        command: "image_model",
        action: "set_image_model",
        arg_key: "model",
    },
];

pub(crate) const SINGLE_PATH_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "image",
        action: "stage_image",
        arg_key: "path",
    },
    CommandSpec {
        command: "save",
        action: "save_output",
        arg_key: "path",
    },
];

pub(crate) const NO_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "help",
        action: "help",
        arg_key: "",
    },
    CommandSpec {
        command: "categories",
        action: "list_categories",
        arg_key: "",
    },
    CommandSpec {
        command: "tools",
        action: "list_tools",
        arg_key: "",
    },
    CommandSpec {
        command: "generate",
        action: "generate",
        arg_key: "",
    },
    CommandSpec {
        command: "clear_image",
        action: "clear_image",
        arg_key: "",
    },
    CommandSpec {
        command: "show",
        action: "show_output",
        arg_key: "",
    },
    CommandSpec {
        command: "copy",
        action: "copy_output",
        arg_key: "",
    },
    CommandSpec {
        command: "instruction",
        action: "show_instruction",
        arg_key: "",
    },
    CommandSpec {
        command: "quit",
        action: "quit",
        arg_key: "",
    },
    CommandSpec {
        command: "exit",
        action: "quit",
        arg_key: "",
    },
];

pub const CHAT_HELP_COMMANDS: &[&str] = &[
    "/categories",
    "/category <id>",
    "/tools",
    "/tool <id>",
    "/input <text>",
    "/generate",
    "/image <path>",
    "/clear_image",
    "/show",
    "/copy",
    "/save [path]",
    "/instruction",
    "/text_model <name>",
    "/image_model <name>",
    "/quit",
];
