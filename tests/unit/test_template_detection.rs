//! Template detection tests.

use diagram_gen_api::models::Template;
use diagram_gen_api::services::{PromptCatalog, TemplateRule};

#[test]
fn test_detects_each_template() {
    let catalog = PromptCatalog::default();

    let cases = [
        ("A kubernetes cluster with two namespaces", Template::Kubernetes),
        ("Ingress routing to a frontend service", Template::Kubernetes),
        ("Serverless app on AWS with Lambda", Template::Aws),
        ("Static site hosted on S3 behind a CDN", Template::Aws),
        ("Web app on Azure with Cosmos DB", Template::Azure),
        ("Batch jobs on Google Cloud", Template::Gcp),
        ("Compute Engine instances behind a load balancer", Template::Gcp),
        ("Online shop built as microservices", Template::Microservices),
        ("Clients calling an API gateway", Template::Microservices),
        ("CI/CD with Jenkins and GitHub Actions", Template::CiCd),
    ];

    for (prompt, expected) in cases {
        assert_eq!(
            catalog.detect_template(prompt),
            Some(expected),
            "prompt: {prompt}"
        );
    }
}

#[test]
fn test_no_template_for_generic_prompt() {
    let catalog = PromptCatalog::default();
    assert_eq!(catalog.detect_template("A blog with a comment section"), None);
    assert_eq!(catalog.detect_template(""), None);
}

#[test]
fn test_detection_is_case_insensitive() {
    let catalog = PromptCatalog::default();
    assert_eq!(
        catalog.detect_template("KUBERNETES operators"),
        Some(Template::Kubernetes)
    );
    assert_eq!(catalog.detect_template("Deploy on GCP"), Some(Template::Gcp));
}

#[test]
fn test_kubernetes_wins_over_aws() {
    let catalog = PromptCatalog::default();
    // Both keyword sets present; precedence puts Kubernetes first
    assert_eq!(
        catalog.detect_template("EKS: kubernetes on AWS with an S3 bucket"),
        Some(Template::Kubernetes)
    );
    assert_eq!(
        catalog.detect_template("aws account running k8s"),
        Some(Template::Kubernetes)
    );
}

#[test]
fn test_cloud_templates_win_over_microservices_and_cicd() {
    let catalog = PromptCatalog::default();
    assert_eq!(
        catalog.detect_template("Microservices on Azure with a build pipeline"),
        Some(Template::Azure)
    );
    assert_eq!(
        catalog.detect_template("Microservices with a Jenkins pipeline"),
        Some(Template::Microservices)
    );
}

#[test]
fn test_precedence_order_is_fixed() {
    assert_eq!(
        Template::PRECEDENCE,
        [
            Template::Kubernetes,
            Template::Aws,
            Template::Azure,
            Template::Gcp,
            Template::Microservices,
            Template::CiCd,
        ]
    );
}

#[test]
fn test_fixture_catalog_substitutes_triggers() {
    let mut catalog = PromptCatalog::default();
    catalog.templates = vec![TemplateRule {
        template: Template::CiCd,
        triggers: vec!["deploy train".to_string()],
        instructions: "Fixture pipeline instructions".to_string(),
    }];

    assert_eq!(
        catalog.detect_template("Our deploy train for mobile apps"),
        Some(Template::CiCd)
    );
    // Built-in triggers are gone with the built-in rules
    assert_eq!(catalog.detect_template("kubernetes cluster"), None);
    assert_eq!(
        catalog.template_block(Template::CiCd).as_deref(),
        Some("Fixture pipeline instructions")
    );
}

#[test]
fn test_cloud_template_block_includes_icon_table() {
    let catalog = PromptCatalog::default();

    let aws = catalog.template_block(Template::Aws).unwrap();
    assert!(aws.starts_with("Template: AWS cloud architecture."));
    assert!(aws.contains("https://icon.icepanel.io/AWS/svg/Compute/EC2.svg"));
    assert!(aws.contains("https://icon.icepanel.io/AWS/svg/Storage/Simple-Storage-Service.svg"));

    let gcp = catalog.template_block(Template::Gcp).unwrap();
    assert!(gcp.contains("https://icon.icepanel.io/GCP/svg/Compute-Engine.svg"));
    assert!(!gcp.contains("icon.icepanel.io/AWS"));

    let k8s = catalog.template_block(Template::Kubernetes).unwrap();
    assert!(!k8s.contains("icon.icepanel.io"));
}
