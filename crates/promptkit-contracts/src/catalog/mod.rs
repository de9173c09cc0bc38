mod categories;
mod icons;
mod tools;

pub use categories::{categories, category_by_id, default_category, Category};
pub use icons::IconKey;
pub use tools::{tool_spec, ToolSpec, TOOLS};
