use crate::payload::ToolType;

#[derive(Clone, Copy, Debug)]
pub struct ToolSpec {
    pub tool: ToolType,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub placeholder: &'static str,
}

impl ToolSpec {
    pub fn action_label(&self) -> &'static str {
        if self.tool.is_image_editor() {
            "Magic Edit"
        } else {
            "Generate Output"
        }
    }
}

pub const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        tool: ToolType::Generator,
        name: "Gerador",
        icon: "Sparkles",
        description: "Crie um prompt do zero a partir de uma ideia simples.",
        placeholder: "// Describe your idea here...",
    },
    ToolSpec {
        tool: ToolType::Refiner,
        name: "Refinador",
        icon: "Zap",
        description: "Melhore um prompt existente para máxima eficácia.",
        placeholder: "// Paste the prompt you want to refine...",
    },
    ToolSpec {
        tool: ToolType::Persona,
        name: "Persona",
        icon: "UserCheck",
        description: "Crie instruções de sistema para personas específicas.",
        placeholder: "// Describe the persona or role...",
    },
    ToolSpec {
        tool: ToolType::Analyzer,
        name: "Analisador",
        icon: "Search",
        description: "Receba feedback crítico sobre seus prompts atuais.",
        placeholder: "// Paste prompt for analysis...",
    },
    ToolSpec {
        tool: ToolType::ImageEditor,
        name: "Editor Mágico",
        icon: "Wand2",
        description: "Edite imagens reais usando instruções de texto.",
        placeholder: "// Describe how you want to edit the image (e.g. 'Add a retro filter', 'Remove the background')...",
    },
];

pub fn tool_spec(tool: ToolType) -> &'static ToolSpec {
    TOOLS
        .iter()
        .find(|spec| spec.tool == tool)
        .unwrap_or(&TOOLS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tool_type_has_a_spec() {
        for tool in ToolType::ALL {
            assert_eq!(tool_spec(tool).tool, tool);
        }
        assert_eq!(TOOLS.len(), ToolType::ALL.len());
    }

    #[test]
    fn action_label_switches_for_image_editor() {
        assert_eq!(tool_spec(ToolType::ImageEditor).action_label(), "Magic Edit");
        assert_eq!(tool_spec(ToolType::Persona).action_label(), "Generate Output");
    }
}
