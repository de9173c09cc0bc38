use serde::{Deserialize, Serialize};

/// Domain preset shown in the sidebar. `system_context` is injected verbatim
/// into every text instruction built for the category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub system_context: String,
}

#[derive(Clone, Copy, Debug)]
struct CategorySpec {
    id: &'static str,
    name: &'static str,
    icon: &'static str,
    description: &'static str,
    system_context: &'static str,
}

const CATEGORY_SPECS: &[CategorySpec] = &[
    CategorySpec {
        id: "coding",
        name: "Programação",
        icon: "Code",
        description: "Prompts para gerar código, debugging e arquitetura.",
        system_context: "Você é um Engenheiro de Software Sênior e Arquiteto de Soluções.",
    },
    CategorySpec {
        id: "writing",
        name: "Escrita Criativa",
        icon: "PenTool",
        description: "Storytelling, copywriting e roteiros.",
        system_context: "Você é um Escritor Best-Seller e Copywriter premiado.",
    },
    CategorySpec {
        id: "image",
        name: "Arte Digital",
        icon: "Image",
        description: "Prompts detalhados para Midjourney, e Edição de Imagem AI.",
        system_context:
            "Você é um Especialista em Prompts de IA Generativa de Imagem e Diretor de Arte.",
    },
    CategorySpec {
        id: "business",
        name: "Negócios",
        icon: "Briefcase",
        description: "Estratégias, e-mails corporativos e análise de mercado.",
        system_context: "Você é um Consultor de Negócios e Estrategista Corporativo.",
    },
    CategorySpec {
        id: "education",
        name: "Educação",
        icon: "GraduationCap",
        description: "Planos de aula, resumos e explicações didáticas.",
        system_context: "Você é um Pedagogo experiente e Professor Universitário.",
    },
    CategorySpec {
        id: "rpg",
        name: "RPG & Jogos",
        icon: "Gamepad2",
        description: "Criação de mundos, NPCs e mecânicas de jogo.",
        system_context: "Você é um Dungeon Master lendário e Game Designer.",
    },
];

impl From<&CategorySpec> for Category {
    fn from(spec: &CategorySpec) -> Self {
        Self {
            id: spec.id.to_string(),
            name: spec.name.to_string(),
            icon: spec.icon.to_string(),
            description: spec.description.to_string(),
            system_context: spec.system_context.to_string(),
        }
    }
}

/// All categories in sidebar order.
pub fn categories() -> Vec<Category> {
    CATEGORY_SPECS.iter().map(Category::from).collect()
}

pub fn category_by_id(id: &str) -> Option<Category> {
    let wanted = id.trim().to_ascii_lowercase();
    CATEGORY_SPECS
        .iter()
        .find(|spec| spec.id == wanted)
        .map(Category::from)
}

/// The workspace opens on the first sidebar entry.
pub fn default_category() -> Category {
    Category::from(&CATEGORY_SPECS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_keep_sidebar_order() {
        let ids = categories()
            .into_iter()
            .map(|category| category.id)
            .collect::<Vec<String>>();
        assert_eq!(
            ids,
            vec!["coding", "writing", "image", "business", "education", "rpg"]
        );
    }

    #[test]
    fn lookup_is_case_insensitive_and_rejects_unknown_ids() {
        let rpg = category_by_id(" RPG ").map(|category| category.name);
        assert_eq!(rpg.as_deref(), Some("RPG & Jogos"));
        assert!(category_by_id("cooking").is_none());
    }

    #[test]
    fn default_category_is_coding() {
        let category = default_category();
        assert_eq!(category.id, "coding");
        assert_eq!(
            category.system_context,
            "Você é um Engenheiro de Software Sênior e Arquiteto de Soluções."
        );
    }
}
