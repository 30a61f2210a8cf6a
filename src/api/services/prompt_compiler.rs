//! Prompt compiler: assembles the system instruction and user turn.

use std::sync::Arc;

use crate::models::{DiagramStyle, Template};

use super::prompt_catalog::PromptCatalog;

/// Messages ready to send to the completion service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPrompt {
    pub system: String,
    pub user: String,
    pub template: Option<Template>,
}

#[derive(Debug, Clone)]
pub struct PromptCompiler {
    catalog: Arc<PromptCatalog>,
}

impl PromptCompiler {
    pub fn new(catalog: Arc<PromptCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PromptCatalog {
        &self.catalog
    }

    /// Role statement, one style clause, syntax rules, output directive.
    pub fn system_instruction(&self, style: DiagramStyle) -> String {
        [
            self.catalog.role_statement.clone(),
            self.catalog.style_clause(style),
            self.catalog.syntax_rules_block(),
            self.catalog.output_directive.clone(),
        ]
        .join("\n\n")
    }

    /// The user's prompt, with the detected template block prepended.
    pub fn user_message(&self, prompt: &str) -> (String, Option<Template>) {
        let template = self.catalog.detect_template(prompt);
        match template.and_then(|t| self.catalog.template_block(t)) {
            Some(block) => (format!("{block}\n\n{prompt}"), template),
            None => (prompt.to_string(), None),
        }
    }

    pub fn compile(&self, prompt: &str, style: DiagramStyle) -> CompiledPrompt {
        let (user, template) = self.user_message(prompt);
        CompiledPrompt {
            system: self.system_instruction(style),
            user,
            template,
        }
    }
}

impl Default for PromptCompiler {
    fn default() -> Self {
        Self::new(Arc::new(PromptCatalog::default()))
    }
}
