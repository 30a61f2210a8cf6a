//! Prompt catalog: the static text the compiler assembles instructions from.
//!
//! Everything here is plain data. The built-in catalog comes from
//! `PromptCatalog::default()`; tests and deployments can construct their own.

use std::collections::HashMap;

use crate::models::{CloudProvider, DiagramStyle, Template};

/// One provider service and the icon the model must embed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconEntry {
    pub service: String,
    pub url: String,
}

impl IconEntry {
    pub fn new(service: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            url: url.into(),
        }
    }
}

/// Trigger keywords and instruction text for one template.
#[derive(Debug, Clone)]
pub struct TemplateRule {
    pub template: Template,
    /// Lower-case keywords matched as substrings of the lower-cased prompt
    pub triggers: Vec<String>,
    pub instructions: String,
}

#[derive(Debug, Clone)]
pub struct PromptCatalog {
    pub role_statement: String,
    pub colored_clause: String,
    pub hand_drawn_clause: String,
    /// Cloud style clause; `{provider}` is replaced with the provider name
    pub cloud_clause: String,
    /// Node label format required when icons are embedded
    pub icon_label_format: String,
    pub icons: HashMap<CloudProvider, Vec<IconEntry>>,
    pub syntax_rules: Vec<String>,
    pub output_directive: String,
    pub templates: Vec<TemplateRule>,
}

impl PromptCatalog {
    /// Find the first template, in `Template::PRECEDENCE` order, whose triggers
    /// occur in the prompt.
    pub fn detect_template(&self, prompt: &str) -> Option<Template> {
        let lowered = prompt.to_lowercase();
        Template::PRECEDENCE.into_iter().find(|template| {
            self.template_rule(*template).is_some_and(|rule| {
                rule.triggers
                    .iter()
                    .any(|trigger| !trigger.is_empty() && lowered.contains(trigger.as_str()))
            })
        })
    }

    pub fn template_rule(&self, template: Template) -> Option<&TemplateRule> {
        self.templates.iter().find(|rule| rule.template == template)
    }

    /// Instruction block for a template, with the provider icon table appended
    /// for cloud templates.
    pub fn template_block(&self, template: Template) -> Option<String> {
        let rule = self.template_rule(template)?;
        let mut block = rule.instructions.trim_end().to_string();
        if let Some(provider) = template.cloud_provider() {
            block.push_str("\n\n");
            block.push_str(&self.icon_section(provider));
        }
        Some(block)
    }

    pub fn icons_for(&self, provider: CloudProvider) -> &[IconEntry] {
        self.icons
            .get(&provider)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Icon URL table followed by the mandatory label format.
    pub fn icon_section(&self, provider: CloudProvider) -> String {
        let mut section = format!("{} icon URLs (use these exact URLs):\n", provider.display_name());
        for entry in self.icons_for(provider) {
            section.push_str(&format!("- {}: {}\n", entry.service, entry.url));
        }
        section.push_str("Node label format (mandatory for every service node):\n");
        section.push_str(&self.icon_label_format);
        section
    }

    /// The single style clause for `style`.
    pub fn style_clause(&self, style: DiagramStyle) -> String {
        match style.cloud_provider() {
            Some(provider) => format!(
                "{}\n\n{}",
                self.cloud_clause
                    .replace("{provider}", provider.display_name()),
                self.icon_section(provider)
            ),
            None if style == DiagramStyle::HandDrawn => self.hand_drawn_clause.clone(),
            None => self.colored_clause.clone(),
        }
    }

    pub fn syntax_rules_block(&self) -> String {
        let mut block = String::from("Syntax rules:");
        for rule in &self.syntax_rules {
            block.push_str("\n- ");
            block.push_str(rule);
        }
        block
    }
}

const ICON_BASE: &str = "https://icon.icepanel.io";

fn icon(service: &str, path: &str) -> IconEntry {
    IconEntry::new(service, format!("{ICON_BASE}/{path}"))
}

fn default_icons() -> HashMap<CloudProvider, Vec<IconEntry>> {
    let mut icons = HashMap::new();
    icons.insert(
        CloudProvider::Aws,
        vec![
            icon("EC2", "AWS/svg/Compute/EC2.svg"),
            icon("Lambda", "AWS/svg/Compute/Lambda.svg"),
            icon("S3", "AWS/svg/Storage/Simple-Storage-Service.svg"),
            icon("RDS", "AWS/svg/Database/RDS.svg"),
            icon("DynamoDB", "AWS/svg/Database/DynamoDB.svg"),
            icon("API Gateway", "AWS/svg/App-Integration/API-Gateway.svg"),
            icon("SQS", "AWS/svg/App-Integration/Simple-Queue-Service.svg"),
            icon("SNS", "AWS/svg/App-Integration/Simple-Notification-Service.svg"),
            icon("CloudFront", "AWS/svg/Networking-Content-Delivery/CloudFront.svg"),
            icon("VPC", "AWS/svg/Networking-Content-Delivery/Virtual-Private-Cloud.svg"),
            icon("Elastic Load Balancing", "AWS/svg/Networking-Content-Delivery/Elastic-Load-Balancing.svg"),
        ],
    );
    icons.insert(
        CloudProvider::Azure,
        vec![
            icon("Virtual Machine", "Azure/svg/Compute/Virtual-Machine.svg"),
            icon("Function Apps", "Azure/svg/Compute/Function-Apps.svg"),
            icon("App Service", "Azure/svg/Web/App-Services.svg"),
            icon("Cosmos DB", "Azure/svg/Databases/Azure-Cosmos-DB.svg"),
            icon("SQL Database", "Azure/svg/Databases/SQL-Database.svg"),
            icon("Storage Account", "Azure/svg/Storage/Storage-Accounts.svg"),
            icon("AKS", "Azure/svg/Containers/Kubernetes-Services.svg"),
            icon("API Management", "Azure/svg/Integration/API-Management-Services.svg"),
            icon("Front Door", "Azure/svg/Networking/Front-Door-and-CDN-Profiles.svg"),
        ],
    );
    icons.insert(
        CloudProvider::Gcp,
        vec![
            icon("Compute Engine", "GCP/svg/Compute-Engine.svg"),
            icon("Cloud Run", "GCP/svg/Cloud-Run.svg"),
            icon("Cloud Functions", "GCP/svg/Cloud-Functions.svg"),
            icon("Cloud Storage", "GCP/svg/Cloud-Storage.svg"),
            icon("Cloud SQL", "GCP/svg/Cloud-SQL.svg"),
            icon("BigQuery", "GCP/svg/BigQuery.svg"),
            icon("GKE", "GCP/svg/Google-Kubernetes-Engine.svg"),
            icon("Pub/Sub", "GCP/svg/Pub-Sub.svg"),
            icon("Cloud Load Balancing", "GCP/svg/Cloud-Load-Balancing.svg"),
        ],
    );
    icons
}

fn rule(template: Template, instructions: &str) -> TemplateRule {
    TemplateRule {
        template,
        triggers: template
            .default_triggers()
            .iter()
            .map(|trigger| trigger.to_string())
            .collect(),
        instructions: instructions.to_string(),
    }
}

fn default_templates() -> Vec<TemplateRule> {
    vec![
        rule(
            Template::Kubernetes,
            r#"Template: Kubernetes cluster architecture.
Use `graph TD` with one subgraph per namespace.
Show the Ingress controller as the entry point, then Services, Deployments and Pods.
Draw ConfigMaps, Secrets and PersistentVolumeClaims attached to the workloads that mount them.
Label traffic edges with the protocol and port, for example HTTP 443."#,
        ),
        rule(
            Template::Aws,
            r#"Template: AWS cloud architecture.
Use `graph TD` with a subgraph for the VPC and nested subgraphs for public and private subnets.
Place edge services such as CloudFront and API Gateway outside the VPC.
Put compute (EC2, Lambda) in the subnets and data stores (RDS, DynamoDB, S3) next to the services that use them."#,
        ),
        rule(
            Template::Azure,
            r#"Template: Azure cloud architecture.
Use `graph TD` with a subgraph per resource group.
Show Front Door or API Management as the entry point, then App Service, Function Apps or Virtual Machines.
Connect data services such as Cosmos DB, SQL Database and Storage Accounts to their consumers."#,
        ),
        rule(
            Template::Gcp,
            r#"Template: Google Cloud architecture.
Use `graph TD` with a subgraph per project or VPC network.
Show Cloud Load Balancing as the entry point, then Cloud Run, GKE or Compute Engine.
Connect Cloud SQL, Cloud Storage, BigQuery and Pub/Sub to the services that use them."#,
        ),
        rule(
            Template::Microservices,
            r#"Template: microservices architecture.
Use `graph LR`. Start with clients, then the API gateway, then one node per service.
Give every service its own database node.
Draw asynchronous messaging through a message broker node with dotted arrows."#,
        ),
        rule(
            Template::CiCd,
            r#"Template: CI/CD pipeline.
Use `graph LR` with one node per stage: source, build, test, security scan, artifact registry, deploy to staging, approval, deploy to production.
Show failure paths back to the developer with dotted arrows."#,
        ),
    ]
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self {
            role_statement: "You are an expert diagram generator. You turn architecture descriptions into diagrams using Mermaid syntax. Produce clear, well-structured diagrams with correct relationships between components, and pick the Mermaid diagram type (flowchart, sequence, class, ER, gantt) that fits the request.".to_string(),
            colored_clause: "Style: use clear, colored boxes and connectors. Group related components in subgraphs and use classDef to give each group a distinct fill color.".to_string(),
            hand_drawn_clause: "Style: use a hand-drawn, sketch-like notation. Start the diagram with the init directive %%{init: {'look': 'handDrawn'}}%% and keep shapes simple.".to_string(),
            cloud_clause: "Style: {provider} architecture with official service icons. Every cloud service node must embed its icon using the exact URL from the table below; do not invent or shorten URLs.".to_string(),
            icon_label_format: "ServiceId[\"<img src='ICON_URL' width='40' height='40' /><br/>Service Name\"]".to_string(),
            icons: default_icons(),
            syntax_rules: vec![
                "Edge labels use the form A -->|label| B.".to_string(),
                "Never put parentheses inside edge labels.".to_string(),
                "Do not use special punctuation such as quotes, colons, semicolons, braces or pipes inside edge labels.".to_string(),
                "Node IDs must be alphanumeric without spaces.".to_string(),
                "Wrap node text containing special characters in double quotes.".to_string(),
            ],
            output_directive: "Output format: respond with the Mermaid diagram code only. No explanations, no markdown headings, no text before or after the diagram.".to_string(),
            templates: default_templates(),
        }
    }
}
