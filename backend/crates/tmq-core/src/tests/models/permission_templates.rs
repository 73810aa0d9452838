use crate::PermissionTemplates;

use proptest::prelude::*;

const TEMPLATE: &str = "^(queue/{{namespace}}/.*|exchange/{{namespace}}/.*)";

fn templates() -> PermissionTemplates {
    PermissionTemplates::new(TEMPLATE, TEMPLATE, TEMPLATE).unwrap()
}

#[test]
fn test_render_substitutes_every_placeholder() {
    let rule = templates().render("tc-foo").unwrap();

    assert_eq!(rule.configure, "^(queue/tc-foo/.*|exchange/tc-foo/.*)");
    assert_eq!(rule.write, rule.configure);
    assert_eq!(rule.read, rule.configure);
}

#[test]
fn test_render_rejects_invalid_namespace_name() {
    assert!(templates().render("tc-foo/.*").is_err());
}

#[test]
fn test_template_without_placeholder_is_rejected() {
    let result = PermissionTemplates::new("^queue/.*", TEMPLATE, TEMPLATE);
    assert!(result.is_err());
}

#[test]
fn test_unanchored_template_is_rejected() {
    let result = PermissionTemplates::new(TEMPLATE, "queue/{{namespace}}/.*", TEMPLATE);
    assert!(result.is_err());
}

#[test]
fn test_template_that_does_not_compile_is_rejected_on_render() {
    let broken = PermissionTemplates::new("^(queue/{{namespace}}/.*", TEMPLATE, TEMPLATE).unwrap();
    assert!(broken.render("tc-foo").is_err());
}

#[test]
fn test_rule_does_not_reach_sibling_with_shared_prefix() {
    let rule = templates().render("tc-foo").unwrap();

    assert!(!rule
        .grants_foreign_access("tc-foobar", "queue/", "exchange/")
        .unwrap());
    assert!(rule
        .grants_foreign_access("tc-foo", "queue/", "exchange/")
        .unwrap());
}

#[test]
fn test_over_broad_read_template_is_detected() {
    let broad = PermissionTemplates::new(TEMPLATE, TEMPLATE, "^(queue/{{namespace}}/.*|exchange/.*)")
        .unwrap()
        .render("tc-foo")
        .unwrap();

    assert!(broad
        .grants_foreign_access("tc-bar", "queue/", "exchange/")
        .unwrap());
}

proptest! {
    #[test]
    fn rendered_rule_never_matches_another_namespace(
        owner in "tc-[a-z0-9_-]{1,20}",
        other in "tc-[a-z0-9_-]{1,20}",
    ) {
        prop_assume!(owner != other);
        let rule = templates().render(&owner).unwrap();
        prop_assert!(!rule.grants_foreign_access(&other, "queue/", "exchange/").unwrap());
    }
}
