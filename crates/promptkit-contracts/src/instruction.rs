//! System-instruction assembly for the text model.
//!
//! The instruction is the preamble, the category context and, for the four
//! text tools, one objective block. The layout, indentation included, is
//! byte-stable.

use crate::catalog::Category;
use crate::payload::ToolType;

const PREAMBLE_HEAD: &str = "Você é o \"Canivete Suíço AI\", um assistente especializado em Engenharia de Prompts. \n  Sua tarefa é ajudar o usuário a obter o melhor resultado possível de LLMs.\n  Responda sempre em Português do Brasil (PT-BR).\n  \n  Contexto da Categoria: ";

const GENERATOR_BLOCK: &str = "\n      OBJETIVO: Crie um prompt altamente detalhado e estruturado com base na ideia do usuário.\n      ESTRUTURA: Use técnicas como Persona, Contexto, Tarefa, Restrições e Formato de Saída.\n      SAÍDA: Forneça apenas o prompt otimizado, pronto para ser copiado.";

const REFINER_BLOCK: &str = "\n      OBJETIVO: Reescreva o prompt do usuário para torná-lo mais claro, específico e eficaz.\n      AÇÃO: Identifique ambiguidades e remova redundâncias. Adicione diretrizes de estilo se necessário.\n      SAÍDA: Forneça a versão melhorada do prompt.";

const PERSONA_BLOCK: &str = "\n      OBJETIVO: Crie uma \"System Instruction\" ou definição de Persona robusta.\n      DETALHES: Inclua tom de voz, base de conhecimento permitida e restrições de comportamento.\n      SAÍDA: O texto da persona pronto para uso.";

const ANALYZER_BLOCK: &str = "\n      OBJETIVO: Analise o prompt do usuário e dê notas de 0 a 10 em: Clareza, Especificidade e Contexto.\n      AÇÃO: Liste 3 pontos fortes e 3 sugestões de melhoria.\n      SAÍDA: Um relatório estruturado de análise.";

/// Preamble plus category context, with no tool block.
pub fn base_instruction(category: &Category) -> String {
    format!("{PREAMBLE_HEAD}{}\n  ", category.system_context)
}

/// Objective block for a tool, `None` for tools that have no text template.
pub fn tool_block(tool: ToolType) -> Option<&'static str> {
    match tool {
        ToolType::Generator => Some(GENERATOR_BLOCK),
        ToolType::Refiner => Some(REFINER_BLOCK),
        ToolType::Persona => Some(PERSONA_BLOCK),
        ToolType::Analyzer => Some(ANALYZER_BLOCK),
        ToolType::ImageEditor => None,
    }
}

pub fn build_system_instruction(category: &Category, tool: ToolType) -> String {
    let base = base_instruction(category);
    match tool_block(tool) {
        Some(block) => format!("{base}{block}"),
        None => base,
    }
}

/// Same as [`build_system_instruction`] for a raw tool id. Ids that do not
/// name a tool take the default arm: preamble and category context only.
pub fn instruction_for_tool_id(category: &Category, raw_tool: &str) -> String {
    match ToolType::parse(raw_tool) {
        Some(tool) => build_system_instruction(category, tool),
        None => base_instruction(category),
    }
}
